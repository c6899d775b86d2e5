//! Movement integration for units and projectiles.
//!
//! Units walk the AI decision ladder (or its melee variant) and clamp to
//! the map; projectiles integrate acceleration, advance, and die at the
//! padded map border or at end of life.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::{LifeState, UnitRole};
use skirmish_core::types::{Position, Velocity};

use skirmish_ai::fsm::{self, MovementContext, MovementDecision};
use skirmish_ai::profiles::get_profile;

use crate::damage::{self, CombatCtx};
use crate::spatial::Quadtree;

/// Advance one step along `angle`.
fn step(pos: &mut Position, mobility: &mut Mobility, angle: f64) {
    mobility.heading = angle;
    pos.x += angle.cos() * mobility.speed;
    pos.y += angle.sin() * mobility.speed;
}

/// Step toward a point, snapping onto it when within one step.
fn move_to(pos: &mut Position, mobility: &mut Mobility, x: f64, y: f64) {
    let dest = Position::new(x, y);
    if pos.distance_to(&dest) < mobility.speed {
        *pos = dest;
    } else {
        let angle = pos.angle_to(&dest);
        step(pos, mobility, angle);
    }
}

fn clamp_to_map(pos: &mut Position) {
    pos.x = pos.x.clamp(0.0, MAP_WIDTH);
    pos.y = pos.y.clamp(0.0, MAP_HEIGHT);
}

/// Per-tick unit movement.
pub fn run_units(world: &mut World, rng: &mut ChaCha8Rng, tick: u64, now: f64, half_second: bool) {
    // Live positions of potential targets, resolved before mutation.
    let mut targets: HashMap<UnitId, (Position, bool)> = HashMap::new();
    for (_entity, (id, pos, role, vitals)) in world
        .query::<(&UnitId, &Position, &UnitRole, &Vitals)>()
        .iter()
    {
        if vitals.life == LifeState::Alive {
            targets.insert(*id, (*pos, get_profile(*role).melee));
        }
    }

    let sample_tick = tick % STUCK_SAMPLE_INTERVAL_TICKS == 0;

    for (_entity, (_unit, pos, mobility, ai, ovr, weapon, vitals, stuck, immobile)) in world
        .query_mut::<(
            &Unit,
            &mut Position,
            &mut Mobility,
            &mut CombatAi,
            &mut ManualOverride,
            &Weapon,
            &Vitals,
            Option<&mut StuckTracker>,
            Option<&Immobile>,
        )>()
    {
        mobility.moved = Velocity::default();
        if vitals.life != LifeState::Alive || immobile.is_some() {
            continue;
        }

        let start = *pos;
        let target_info = ai.target.and_then(|id| targets.get(&id)).copied();
        let target_distance = target_info
            .map(|(tp, _)| start.distance_to(&tp))
            .unwrap_or(0.0);

        if let Some(tracker) = stuck {
            // Melee pursuit with stuck recovery instead of strafing.
            if sample_tick {
                fsm::sample_stuck(tracker, start);
            }
            if tracker.counter > STUCK_COUNTER_LIMIT {
                fsm::try_stuck_recovery(tracker, rng.gen::<f64>());
            }

            let decision = fsm::evaluate_melee_movement(
                start,
                weapon.range,
                target_info.map(|(tp, _)| tp),
                target_distance,
                tracker.offset_angle,
            );
            if let MovementDecision::MoveHeading { angle } = decision {
                step(pos, mobility, angle);
                fsm::decay_stuck_offset(tracker);
            }
        } else {
            // Commanded destination arrival clears the order and falls
            // through to the rest of the ladder this tick.
            if let Some(dest) = ovr.move_dest {
                if start.distance_to(&dest) < mobility.speed {
                    ovr.move_dest = None;
                }
            }

            let manual_mode = ovr.is_active(now);
            let forced_pos = ovr
                .forced_target
                .and_then(|id| targets.get(&id))
                .map(|(tp, _)| *tp);

            let ctx = MovementContext {
                position: start,
                weapon_range: weapon.range,
                override_dest: ovr.move_dest,
                manual_mode,
                forced_target: forced_pos,
                target: target_info.map(|(tp, _)| tp),
                target_distance,
                target_is_melee: target_info.map(|(_, melee)| melee).unwrap_or(false),
                dodge_moving: ai.dodge_moving,
                dodge_left: ai.dodge_left,
            };

            match fsm::evaluate_movement(&ctx) {
                MovementDecision::Hold => {}
                MovementDecision::MoveTo { x, y } => move_to(pos, mobility, x, y),
                MovementDecision::MoveAwayFrom { x, y } => {
                    let angle = Position::new(x, y).angle_to(&start);
                    step(pos, mobility, angle);
                }
                MovementDecision::Strafe { x, y, left } => {
                    let mut angle = start.angle_to(&Position::new(x, y));
                    if left {
                        angle += std::f64::consts::FRAC_PI_2;
                    } else {
                        angle -= std::f64::consts::FRAC_PI_2;
                    }
                    step(pos, mobility, angle);
                }
                MovementDecision::MoveHeading { angle } => step(pos, mobility, angle),
            }

            // Strafe state flips at the half-second cadence, only while
            // holding in range under AI control.
            let in_range_idle = !manual_mode
                && ovr.move_dest.is_none()
                && target_info.is_some()
                && target_distance <= weapon.range
                && !(ctx.target_is_melee
                    && weapon.range * MELEE_RETREAT_RANGE_FRACTION > target_distance);
            if half_second && in_range_idle && ai.dodge_chance > 0.0 {
                let (moving, left) = fsm::update_dodge(
                    ai.dodge_moving,
                    ai.dodge_left,
                    ai.dodge_chance,
                    rng.gen::<f64>(),
                    rng.gen::<f64>(),
                );
                ai.dodge_moving = moving;
                ai.dodge_left = left;
            }
        }

        clamp_to_map(pos);
        mobility.moved = Velocity::new(pos.x - start.x, pos.y - start.y);
    }
}

/// Per-tick projectile integration, bounds check, and lifetime expiry.
pub fn run_projectiles(world: &mut World, ctx: &mut CombatCtx, unit_index: &Quadtree, now: f64) {
    let mut deaths: Vec<(Entity, bool)> = Vec::new();

    for (entity, (_proj, pos, vel, state)) in world
        .query_mut::<(&Projectile, &mut Position, &mut Velocity, &mut ProjectileState)>()
    {
        if state.life != LifeState::Alive {
            continue;
        }

        state.prev_pos = *pos;
        vel.dx += state.accel.dx;
        vel.dy += state.accel.dy;
        pos.x += vel.dx;
        pos.y += vel.dy;
        state.travel += vel.speed();

        let out_of_bounds = pos.x < -PROJECTILE_BORDER_MARGIN
            || pos.x > MAP_WIDTH + PROJECTILE_BORDER_MARGIN
            || pos.y < -PROJECTILE_BORDER_MARGIN
            || pos.y > MAP_HEIGHT + PROJECTILE_BORDER_MARGIN;

        if out_of_bounds {
            deaths.push((entity, false));
        } else if now > state.expires_at {
            deaths.push((entity, true));
        }
    }

    for (entity, expired) in deaths {
        if expired {
            if let Ok(state) = world.get::<&ProjectileState>(entity) {
                log::debug!("projectile {:?} expired in flight", state.kind);
            }
        }
        damage::kill_projectile(world, ctx, unit_index, entity);
    }
}
