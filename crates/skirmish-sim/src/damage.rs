//! Central damage application and the exactly-once kill transition.
//!
//! All damage (direct hits, melee, explosions, damage-over-time) funnels
//! through `apply_damage`, which clamps hp, updates statistics, and on the
//! `Alive -> Dying` transition runs the death side effects (kill credit,
//! bounty, role-specific on-kill hooks) exactly once. The cull step later
//! performs `Dying -> Removed`.

use std::collections::HashMap;

use hecs::{Entity, World};

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::{Faction, LifeState, UnitRole, WeaponKind};
use skirmish_core::events::CombatEvent;
use skirmish_core::types::Position;

use crate::report::WeaponStatBook;
use crate::spatial::Quadtree;
use crate::{ballistics, weapons};

/// Player economy and battle score, updated by kill side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreState {
    pub money: f64,
    pub units_lost: u32,
    pub enemies_killed: u32,
}

/// Mutable engine services threaded through damage resolution.
pub struct CombatCtx<'a> {
    pub lookup: &'a HashMap<UnitId, Entity>,
    pub book: &'a mut WeaponStatBook,
    pub events: &'a mut Vec<CombatEvent>,
    pub score: &'a mut ScoreState,
}

/// Apply damage to a unit. A handle that no longer resolves is logged and
/// ignored rather than propagated.
pub fn apply_damage(
    world: &mut World,
    ctx: &mut CombatCtx,
    target: UnitId,
    amount: f64,
    source_unit: Option<UnitId>,
    source_weapon: Option<WeaponKind>,
) {
    let Some(&entity) = ctx.lookup.get(&target) else {
        log::warn!("damage applied with no live target ({target:?}), dropping");
        return;
    };

    let killed = {
        let Ok(mut vitals) = world.get::<&mut Vitals>(entity) else {
            log::warn!("damage target {target:?} has no vitals, dropping");
            return;
        };
        if vitals.life != LifeState::Alive {
            return;
        }
        vitals.hp = (vitals.hp - amount).max(0.0);
        vitals.hp <= 0.0
    };

    if let Some(kind) = source_weapon {
        ctx.book.weapon_hit(kind, amount);
        if let Some(shooter) = source_unit.and_then(|id| ctx.lookup.get(&id)) {
            if let Ok(mut weapon) = world.get::<&mut Weapon>(*shooter) {
                weapon.stats.shots_hit += 1;
                weapon.stats.damage_dealt += amount;
            }
        }
    }

    if killed {
        kill_unit(world, ctx, entity, target, source_unit, source_weapon);
    }
}

/// Run the `Alive -> Dying` transition and its side effects.
fn kill_unit(
    world: &mut World,
    ctx: &mut CombatCtx,
    victim_entity: Entity,
    victim: UnitId,
    source_unit: Option<UnitId>,
    source_weapon: Option<WeaponKind>,
) {
    let bounty = unit_value(world, victim_entity);
    let victim_faction = world
        .get::<&Faction>(victim_entity)
        .map(|f| *f)
        .unwrap_or_default();
    let victim_pos = world
        .get::<&Position>(victim_entity)
        .map(|p| *p)
        .unwrap_or_default();

    if let Ok(mut vitals) = world.get::<&mut Vitals>(victim_entity) {
        vitals.life = LifeState::Dying;
    }

    ctx.events.push(CombatEvent::UnitKilled {
        victim,
        killer: source_unit,
        weapon: source_weapon,
    });

    if victim_faction == Faction::Black {
        ctx.score.units_lost += 1;
    } else {
        ctx.score.enemies_killed += 1;
    }

    let Some(killer) = source_unit else {
        return;
    };
    let Some(&killer_entity) = ctx.lookup.get(&killer) else {
        return;
    };

    if let Ok(mut weapon) = world.get::<&mut Weapon>(killer_entity) {
        weapon.stats.kills += 1;
    }

    let killer_faction = world
        .get::<&Faction>(killer_entity)
        .map(|f| *f)
        .unwrap_or_default();
    let killer_role = world
        .get::<&UnitRole>(killer_entity)
        .map(|r| *r)
        .unwrap_or_default();

    match killer_role {
        UnitRole::Fighter => fighter_on_kill(world, ctx, killer_entity, killer, bounty),
        UnitRole::Monster => monster_on_kill(world, killer_entity),
        _ => {}
    }

    // Bounty for player kills of non-player units.
    if killer_faction == Faction::Black && victim_faction != Faction::Black {
        ctx.score.money += bounty;
        ctx.events.push(CombatEvent::BountyAwarded {
            amount: bounty,
            x: victim_pos.x,
            y: victim_pos.y,
        });
    }
}

/// Fighter kill reward: experience, a discounted next reload, and possibly
/// a level-up with stat growth.
fn fighter_on_kill(
    world: &mut World,
    ctx: &mut CombatCtx,
    killer_entity: Entity,
    killer: UnitId,
    victim_value: f64,
) {
    if let Ok(mut weapon) = world.get::<&mut Weapon>(killer_entity) {
        weapons::boost_reload(&mut *weapon);
    }
    ctx.events.push(CombatEvent::ReloadBoosted { unit: killer });

    let leveled = {
        let Ok(mut levels) = world.get::<&mut Levels>(killer_entity) else {
            return;
        };
        levels.exp += victim_value;
        let needed = LEVEL_EXP_BASE + levels.level as f64 * LEVEL_EXP_PER_LEVEL;
        if levels.exp >= needed {
            levels.level += 1;
            levels.exp -= needed;
            Some(levels.level)
        } else {
            None
        }
    };

    let Some(level) = leveled else {
        return;
    };

    if let Ok(mut vitals) = world.get::<&mut Vitals>(killer_entity) {
        vitals.max_hp += 100.0;
        vitals.hp = (vitals.hp + vitals.max_hp * 0.25).min(vitals.max_hp);
    }
    if let Ok(mut mobility) = world.get::<&mut Mobility>(killer_entity) {
        mobility.speed = (mobility.speed + 0.2).min(5.0);
    }
    if let Ok(mut regen) = world.get::<&mut Regenerates>(killer_entity) {
        regen.hp_per_second += 2.0;
    }
    if let Ok(mut weapon) = world.get::<&mut Weapon>(killer_entity) {
        weapon.reload_secs = (weapon.reload_secs * 0.95).max(0.5);
        weapon.recoil_deg = (weapon.recoil_deg * 0.9).max(0.1);
    }
    if level >= PREAIM_UNLOCK_LEVEL {
        if let Ok(mut ai) = world.get::<&mut CombatAi>(killer_entity) {
            ai.can_preaim = true;
        }
    }

    ctx.events.push(CombatEvent::LevelUp {
        unit: killer,
        level,
    });
}

/// Monster kill reward: the pack grows meaner.
fn monster_on_kill(world: &mut World, killer_entity: Entity) {
    if let Ok(mut weapon) = world.get::<&mut Weapon>(killer_entity) {
        weapon.damage += 50.0;
    }
    if let Ok(mut mobility) = world.get::<&mut Mobility>(killer_entity) {
        mobility.speed += 0.5;
    }
    if let Ok(mut vitals) = world.get::<&mut Vitals>(killer_entity) {
        vitals.max_hp *= 1.1;
        vitals.hp = (vitals.hp * 1.5 + vitals.max_hp * 0.1).min(vitals.max_hp);
    }
}

/// Kill bounty of a unit: fixed when configured, otherwise a function of
/// its combat record (threat, damage dealt, kills) and its stat line.
pub fn unit_value(world: &World, entity: Entity) -> f64 {
    if let Ok(fixed) = world.get::<&FixedValue>(entity) {
        return fixed.0;
    }

    let threat = world.get::<&CombatAi>(entity).map(|a| a.threat).unwrap_or(0.0);
    let (damage_dealt, kills) = world
        .get::<&Weapon>(entity)
        .map(|w| (w.stats.damage_dealt, w.stats.kills as f64))
        .unwrap_or((0.0, 0.0));
    let max_hp = world.get::<&Vitals>(entity).map(|v| v.max_hp).unwrap_or(0.0);
    let speed = world.get::<&Mobility>(entity).map(|m| m.speed).unwrap_or(0.0);
    let size = world.get::<&Body>(entity).map(|b| b.size).unwrap_or(0.0);

    let attack_value = threat / 100.0 + damage_dealt / 10.0 + kills * 20.0;
    let unit_value = max_hp / 10.0 + speed * 10.0 + size * 5.0;
    attack_value + unit_value
}

/// Kill a projectile: the `Alive -> Dying` transition detonates exploding
/// kinds exactly once; the cull step removes the entity.
pub fn kill_projectile(
    world: &mut World,
    ctx: &mut CombatCtx,
    unit_index: &Quadtree,
    entity: Entity,
) {
    let (explosion, position, state_faction, source_unit, source_weapon, threat_level, kind) = {
        let Ok(mut state) = world.get::<&mut ProjectileState>(entity) else {
            return;
        };
        if state.life != LifeState::Alive {
            return;
        }
        state.life = LifeState::Dying;
        let Ok(pos) = world.get::<&Position>(entity) else {
            return;
        };
        (
            state.explosion,
            *pos,
            state.faction,
            state.source_unit,
            state.source_weapon,
            state.threat_level,
            state.kind,
        )
    };

    let Some(spec) = explosion else {
        return;
    };

    ctx.events.push(CombatEvent::Explosion {
        kind,
        x: position.x,
        y: position.y,
        radius: spec.radius,
    });

    // Blast query: pad the half-extent so the largest unit bodies whose
    // edges reach into the radius are still candidates.
    let half = spec.radius * 1.05 + 50.0;
    let candidates = unit_index.retrieve(skirmish_core::types::Rect::centered(
        position.x, position.y, half, half,
    ));

    let mut victims: Vec<(UnitId, f64)> = Vec::new();
    for candidate in candidates {
        let Ok(id) = world.get::<&UnitId>(candidate) else {
            continue;
        };
        let Ok(vitals) = world.get::<&Vitals>(candidate) else {
            continue;
        };
        if vitals.life != LifeState::Alive {
            continue;
        }
        let Ok(faction) = world.get::<&Faction>(candidate) else {
            continue;
        };
        if !spec.friendly_fire && !faction.is_hostile_to(state_faction) {
            continue;
        }
        let (unit_pos, size) = {
            let Ok(pos) = world.get::<&Position>(candidate) else {
                continue;
            };
            let size = world.get::<&Body>(candidate).map(|b| b.size).unwrap_or(0.0);
            (*pos, size)
        };
        // Edge-to-center distance, never negative.
        let distance = (position.distance_to(&unit_pos) - size).max(0.0);
        if distance <= spec.radius {
            let damage =
                ballistics::explosion_damage(spec.damage, spec.minimum_percent, distance, spec.radius);
            victims.push((*id, damage));
        }
    }

    for (victim, damage) in victims {
        apply_damage(world, ctx, victim, damage, source_unit, source_weapon);
        // Area damage keeps raising the shooter's threat profile.
        if let Some(shooter) = source_unit.and_then(|id| ctx.lookup.get(&id)) {
            if let Ok(mut ai) = world.get::<&mut CombatAi>(*shooter) {
                ai.threat += damage * threat_level;
            }
        }
    }
}
