//! Target upkeep and slow-cadence acquisition.
//!
//! `refresh` runs every tick: dead targets and dead forced targets are
//! dropped immediately, and a live forced target overrides the AI's pick.
//! `acquire` runs at the half-second cadence and re-evaluates units that
//! have no target, querying the spatial index within weapon range and
//! falling back to a full-population scan for non-melee roles.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::enums::{Faction, LifeState, UnitRole};
use skirmish_core::types::{Position, Rect};

use skirmish_ai::fsm::{self, TargetCandidate};
use skirmish_ai::profiles::get_profile;

use crate::spatial::Quadtree;

fn is_live(world: &World, lookup: &HashMap<UnitId, Entity>, id: UnitId) -> bool {
    lookup
        .get(&id)
        .and_then(|&e| world.get::<&Vitals>(e).ok().map(|v| v.life == LifeState::Alive))
        .unwrap_or(false)
}

/// Per-tick target/forced-target liveness and override-expiry upkeep.
pub fn refresh(world: &mut World, lookup: &HashMap<UnitId, Entity>, now: f64) {
    struct Update {
        entity: Entity,
        forced: Option<UnitId>,
        move_dest: Option<Position>,
        target: Option<UnitId>,
    }

    let mut updates: Vec<Update> = Vec::new();

    for (entity, (ai, ovr)) in world.query::<(&CombatAi, &ManualOverride)>().iter() {
        let mut forced = ovr.forced_target;
        let mut move_dest = ovr.move_dest;
        let mut target = ai.target;

        // An expired override window reverts the unit to full AI control
        // and drops any stale command state with it.
        if !ovr.is_active(now) && (forced.is_some() || move_dest.is_some()) {
            forced = None;
            move_dest = None;
        }

        if let Some(f) = forced {
            if is_live(world, lookup, f) {
                target = Some(f);
            } else {
                // Forced target died: drop it and let acquisition rerun.
                forced = None;
                target = None;
            }
        }

        if let Some(t) = target {
            if !is_live(world, lookup, t) {
                target = None;
            }
        }

        if forced != ovr.forced_target || move_dest != ovr.move_dest || target != ai.target {
            updates.push(Update {
                entity,
                forced,
                move_dest,
                target,
            });
        }
    }

    for update in updates {
        if let Ok(mut ovr) = world.get::<&mut ManualOverride>(update.entity) {
            ovr.forced_target = update.forced;
            ovr.move_dest = update.move_dest;
        }
        if let Ok(mut ai) = world.get::<&mut CombatAi>(update.entity) {
            ai.target = update.target;
        }
    }
}

/// A unit looking for a target.
pub(crate) struct Seeker {
    pub entity: Entity,
    pub position: Position,
    pub faction: Faction,
    pub weapon_range: f64,
    pub threat_chance: f64,
    pub threat_range: f64,
}

/// Half-second acquisition pass over targetless units.
pub fn acquire(world: &mut World, index: &Quadtree, rng: &mut ChaCha8Rng) {
    let mut seekers: Vec<Seeker> = Vec::new();
    for (entity, (_unit, pos, faction, vitals, ai, weapon, role)) in world
        .query::<(&Unit, &Position, &Faction, &Vitals, &CombatAi, &Weapon, &UnitRole)>()
        .iter()
    {
        if vitals.life != LifeState::Alive || ai.target.is_some() {
            continue;
        }
        if !get_profile(*role).fights {
            continue;
        }
        seekers.push(Seeker {
            entity,
            position: *pos,
            faction: *faction,
            weapon_range: weapon.range,
            threat_chance: ai.threat_chance,
            threat_range: ai.threat_range,
        });
    }

    for seeker in seekers {
        if let Some(target) = find_target(world, index, &seeker, 1.0, rng) {
            if let Ok(mut ai) = world.get::<&mut CombatAi>(seeker.entity) {
                ai.target = Some(target);
                ai.dodge_moving = false;
            }
        }
    }
}

/// Search for a target around a seeker.
///
/// Queries the index within `weapon_range * range_mul`; an empty result
/// falls back to the full opposing population for the standard search
/// (`range_mul == 1`), while a widened melee re-search gives up instead so
/// the pursuer keeps its current prey.
pub(crate) fn find_target(
    world: &World,
    index: &Quadtree,
    seeker: &Seeker,
    range_mul: f64,
    rng: &mut ChaCha8Rng,
) -> Option<UnitId> {
    let half = seeker.weapon_range * range_mul;
    let area = Rect::centered(seeker.position.x, seeker.position.y, half, half);

    let mut candidates: Vec<TargetCandidate> = Vec::new();
    for entity in index.retrieve(area) {
        if entity == seeker.entity {
            continue;
        }
        if let Some(candidate) = candidate_info(world, entity, seeker) {
            candidates.push(candidate);
        }
    }

    if candidates.is_empty() {
        if range_mul != 1.0 {
            return None;
        }
        // Nothing nearby: scan the whole opposing population.
        for (entity, _unit) in world.query::<&Unit>().iter() {
            if entity == seeker.entity {
                continue;
            }
            if let Some(candidate) = candidate_info(world, entity, seeker) {
                candidates.push(candidate);
            }
        }
    }

    let roll = rng.gen::<f64>();
    fsm::select_target(&candidates, seeker.threat_chance, seeker.threat_range, roll)
}

fn candidate_info(world: &World, entity: Entity, seeker: &Seeker) -> Option<TargetCandidate> {
    let faction = world.get::<&Faction>(entity).ok()?;
    if !faction.is_hostile_to(seeker.faction) {
        return None;
    }
    let vitals = world.get::<&Vitals>(entity).ok()?;
    if vitals.life != LifeState::Alive {
        return None;
    }
    let id = world.get::<&UnitId>(entity).ok()?;
    let pos = world.get::<&Position>(entity).ok()?;
    let threat = world.get::<&CombatAi>(entity).map(|a| a.threat).unwrap_or(0.0);
    Some(TargetCandidate {
        id: *id,
        position: *pos,
        distance: seeker.position.distance_to(&pos),
        threat,
    })
}
