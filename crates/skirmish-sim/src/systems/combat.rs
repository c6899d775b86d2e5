//! Weapon fire: drives every armed unit's trigger against its target.
//!
//! Ranged weapons emit projectile bursts with recoil scatter (and
//! predictive aim for capable units); instant-hit weapons apply damage
//! directly. Firing feeds the statistics book and the shooter's threat.

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::enums::{Faction, LifeState, UnitRole};
use skirmish_core::events::CombatEvent;
use skirmish_core::types::{Position, Velocity};

use skirmish_ai::profiles::get_profile;

use crate::damage::{self, CombatCtx};
use crate::{ballistics, weapons};

struct FirePlan {
    entity: Entity,
    shooter: UnitId,
    position: Position,
    faction: Faction,
    target: UnitId,
    target_pos: Position,
    /// Actual displacement of the target last tick (predictive aim input).
    target_moved: Velocity,
    distance: f64,
    can_preaim: bool,
}

/// Run the firing pass for every armed unit with a live target.
pub fn run(world: &mut World, ctx: &mut CombatCtx, rng: &mut ChaCha8Rng, now: f64) {
    let mut plans: Vec<FirePlan> = Vec::new();

    for (entity, (_unit, id, pos, faction, vitals, ai, role)) in world
        .query::<(&Unit, &UnitId, &Position, &Faction, &Vitals, &CombatAi, &UnitRole)>()
        .iter()
    {
        if vitals.life != LifeState::Alive || !get_profile(*role).fights {
            continue;
        }
        let Some(target) = ai.target else {
            continue;
        };
        let Some(&target_entity) = ctx.lookup.get(&target) else {
            continue;
        };
        let Ok(target_pos) = world.get::<&Position>(target_entity) else {
            continue;
        };
        let target_moved = world
            .get::<&Mobility>(target_entity)
            .map(|m| m.moved)
            .unwrap_or_default();

        plans.push(FirePlan {
            entity,
            shooter: *id,
            position: *pos,
            faction: *faction,
            target,
            target_pos: *target_pos,
            target_moved,
            distance: pos.distance_to(&target_pos),
            can_preaim: ai.can_preaim,
        });
    }

    for plan in plans {
        fire_one(world, ctx, rng, now, &plan);
    }
}

fn fire_one(world: &mut World, ctx: &mut CombatCtx, rng: &mut ChaCha8Rng, now: f64, plan: &FirePlan) {
    let (result, reload_started, reload_duration, projectile_kind, weapon_snapshot) = {
        let Ok(mut weapon) = world.get::<&mut Weapon>(plan.entity) else {
            return;
        };
        let was_reloading = weapon.reloading;
        let result = weapons::try_trigger(&mut *weapon, now, plan.distance);
        let reload_started = !was_reloading && weapon.reloading;
        (
            result,
            reload_started,
            weapons::reload_remaining(&weapon, now),
            weapon.projectile,
            weapon.clone(),
        )
    };

    if reload_started {
        ctx.events.push(CombatEvent::ReloadStarted {
            unit: plan.shooter,
            duration_secs: reload_duration,
        });
    }

    if result != weapons::TriggerResult::Fired {
        return;
    }

    ctx.events.push(CombatEvent::ShotFired {
        weapon: weapon_snapshot.kind,
        x: plan.position.x,
        y: plan.position.y,
    });

    match projectile_kind {
        None => fire_instant(world, ctx, plan, &weapon_snapshot),
        Some(kind) => fire_burst(world, ctx, rng, now, plan, &weapon_snapshot, kind),
    }
}

/// Instant-hit burst: damage lands immediately, no projectile entity.
fn fire_instant(world: &mut World, ctx: &mut CombatCtx, plan: &FirePlan, weapon: &Weapon) {
    for _ in 0..weapon.burst {
        {
            let Ok(mut w) = world.get::<&mut Weapon>(plan.entity) else {
                return;
            };
            w.stats.shots_fired += 1;
            w.stats.damage_estimated += w.damage;
        }
        if let Ok(mut ai) = world.get::<&mut CombatAi>(plan.entity) {
            ai.threat += weapon.damage;
        }
        ctx.book.weapon_fired(weapon.kind, weapon.damage);

        damage::apply_damage(
            world,
            ctx,
            plan.target,
            weapon.damage,
            Some(plan.shooter),
            Some(weapon.kind),
        );
    }
}

/// Projectile burst: one round per pellet, each with its own recoil draw.
#[allow(clippy::too_many_arguments)]
fn fire_burst(
    world: &mut World,
    ctx: &mut CombatCtx,
    rng: &mut ChaCha8Rng,
    now: f64,
    plan: &FirePlan,
    weapon: &Weapon,
    kind: skirmish_core::enums::ProjectileKind,
) {
    // Elite shooters lead the target using its measured displacement.
    let aim_point = if plan.can_preaim {
        ballistics::intercept_point(
            &plan.position,
            &plan.target_pos,
            &plan.target_moved,
            weapons::projectile_speed(kind),
        )
    } else {
        plan.target_pos
    };
    let base_angle = plan.position.angle_to(&aim_point);

    for _ in 0..weapon.burst {
        let angle = base_angle + weapons::recoil_deviation(rng, weapon.recoil_deg);
        let (origin, velocity, state) = weapons::make_projectile(
            rng,
            kind,
            plan.position,
            angle,
            weapon,
            plan.shooter,
            plan.faction,
            now,
        );

        {
            let Ok(mut w) = world.get::<&mut Weapon>(plan.entity) else {
                return;
            };
            w.stats.shots_fired += 1;
            w.stats.damage_estimated += w.damage;
        }
        if let Ok(mut ai) = world.get::<&mut CombatAi>(plan.entity) {
            ai.threat += state.damage * state.threat_level;
        }
        ctx.book.weapon_fired(weapon.kind, weapon.damage);

        world.spawn((Projectile, origin, velocity, state));
    }
}
