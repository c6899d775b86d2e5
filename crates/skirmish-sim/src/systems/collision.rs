//! Broad-phase retrieval and narrow-phase resolution.
//!
//! For every unit, candidates come from the per-tick spatial indexes:
//! unit-unit overlap resolves by separating along the connecting vector
//! with displacement split inversely to the mass proxy, and
//! unit-projectile hits use the swept segment test so fast rounds land
//! exactly once.

use hecs::{Entity, World};

use skirmish_core::components::*;
use skirmish_core::constants::{MAP_HEIGHT, MAP_WIDTH};
use skirmish_core::enums::{Faction, LifeState, ProjectileKind};
use skirmish_core::types::{Position, Rect};

use crate::damage::{self, CombatCtx};
use crate::spatial::Quadtree;
use crate::{ballistics, effects};

/// Run the collision phase for all units.
pub fn run(
    world: &mut World,
    ctx: &mut CombatCtx,
    unit_index: &Quadtree,
    projectile_index: &Quadtree,
    now: f64,
) {
    let units: Vec<(Entity, UnitId)> = world
        .query::<(&Unit, &UnitId)>()
        .iter()
        .map(|(entity, (_unit, id))| (entity, *id))
        .collect();

    for &(entity, id) in &units {
        let Some((position, size, alive)) = unit_shape(world, entity) else {
            continue;
        };
        let half = size * 1.1;
        let area = Rect::centered(position.x, position.y, half, half);

        for candidate in unit_index.retrieve(area) {
            if candidate != entity {
                separate_pair(world, entity, candidate);
            }
        }

        // Only live units absorb hits; a unit dying earlier this tick
        // stays in the index but stops blocking shots.
        if alive {
            for projectile in projectile_index.retrieve(area) {
                try_projectile_hit(world, ctx, unit_index, projectile, entity, id, now);
            }
        }
    }
}

fn unit_shape(world: &World, entity: Entity) -> Option<(Position, f64, bool)> {
    let pos = world.get::<&Position>(entity).ok()?;
    let body = world.get::<&Body>(entity).ok()?;
    let vitals = world.get::<&Vitals>(entity).ok()?;
    Some((*pos, body.size, vitals.life == LifeState::Alive))
}

/// Push two overlapping units apart along their connecting vector. The
/// displacement is split inversely to each body's weight, so heavy units
/// barely budge. Coincident centers get a fixed diagonal separation.
fn separate_pair(world: &mut World, a: Entity, b: Entity) {
    let Some((pos_a, size_a, _)) = unit_shape(world, a) else {
        return;
    };
    let Some((pos_b, size_b, _)) = unit_shape(world, b) else {
        return;
    };
    let weight_a = world.get::<&Body>(a).map(|body| body.weight()).unwrap_or(1.0);
    let weight_b = world.get::<&Body>(b).map(|body| body.weight()).unwrap_or(1.0);

    let combined = size_a + size_b;

    if pos_a.x == pos_b.x && pos_a.y == pos_b.y {
        let shift = combined / 2.0;
        write_position(world, a, Position::new(pos_a.x - shift, pos_a.y - shift));
        write_position(world, b, Position::new(pos_b.x + shift, pos_b.y + shift));
        return;
    }

    let distance = pos_a.distance_to(&pos_b);
    if distance >= combined {
        return;
    }

    // Big pushes small: order the pair by size.
    let (big, big_pos, big_weight, small, small_pos, small_weight) = if size_a > size_b {
        (a, pos_a, weight_a, b, pos_b, weight_b)
    } else {
        (b, pos_b, weight_b, a, pos_a, weight_a)
    };

    let mut dx = small_pos.x - big_pos.x;
    let mut dy = small_pos.y - big_pos.y;
    let norm = (dx * dx + dy * dy).sqrt();
    dx /= norm;
    dy /= norm;

    let overlap = (combined - distance) / 2.0 + 1.0;
    let total_weight = big_weight + small_weight;
    let move_small = overlap * (big_weight / total_weight);
    let move_big = overlap * (small_weight / total_weight);

    write_position(
        world,
        small,
        Position::new(small_pos.x + dx * move_small, small_pos.y + dy * move_small),
    );
    write_position(
        world,
        big,
        Position::new(big_pos.x - dx * move_big, big_pos.y - dy * move_big),
    );
}

fn write_position(world: &mut World, entity: Entity, new_pos: Position) {
    if let Ok(mut pos) = world.get::<&mut Position>(entity) {
        pos.x = new_pos.x.clamp(0.0, MAP_WIDTH);
        pos.y = new_pos.y.clamp(0.0, MAP_HEIGHT);
    }
}

/// Swept projectile-versus-unit test and hit resolution.
fn try_projectile_hit(
    world: &mut World,
    ctx: &mut CombatCtx,
    unit_index: &Quadtree,
    projectile: Entity,
    unit: Entity,
    unit_id: UnitId,
    now: f64,
) {
    let Some((unit_pos, unit_size, _)) = unit_shape(world, unit) else {
        return;
    };
    let unit_faction = match world.get::<&Faction>(unit) {
        Ok(f) => *f,
        Err(_) => return,
    };

    let hit = {
        let Ok(state) = world.get::<&ProjectileState>(projectile) else {
            return;
        };
        if state.life != LifeState::Alive
            || !state.faction.is_hostile_to(unit_faction)
            || state.damaged.contains(&unit_id)
        {
            return;
        }
        let Ok(pos) = world.get::<&Position>(projectile) else {
            return;
        };
        ballistics::swept_hit(&state.prev_pos, &pos, &unit_pos, unit_size + state.size)
    };

    if !hit {
        return;
    }

    let (damage_amount, kind, source_unit, source_weapon) = {
        let Ok(state) = world.get::<&ProjectileState>(projectile) else {
            return;
        };
        let amount = ballistics::travel_attenuation(
            state.damage,
            state.travel,
            state.attenuation_start,
            state.attenuation_end,
            state.attenuation,
        );
        (amount, state.kind, state.source_unit, state.source_weapon)
    };

    damage::apply_damage(world, ctx, unit_id, damage_amount, source_unit, source_weapon);

    // Variant on-hit effect: incendiary pellets leave a burn.
    if kind == ProjectileKind::DragonBreath {
        if let Ok(mut stack) = world.get::<&mut EffectStack>(unit) {
            effects::apply_effect(
                &mut *stack,
                effects::burning(now, source_unit, source_weapon),
                now,
            );
        }
    }

    // One damage application per (projectile, unit) pair; the pierce
    // budget burns down and the round dies when it is spent.
    let exhausted = {
        let Ok(mut state) = world.get::<&mut ProjectileState>(projectile) else {
            return;
        };
        state.damaged.insert(unit_id);
        if state.pierce > 0 {
            state.pierce -= 1;
            false
        } else {
            true
        }
    };

    if exhausted {
        damage::kill_projectile(world, ctx, unit_index, projectile);
    }
}
