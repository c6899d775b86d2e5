//! Full-second upkeep: regeneration, threat decay, monster frenzy and
//! re-targeting, stuck-counter decay.

use std::collections::HashMap;

use hecs::{Entity, World};
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::{Faction, LifeState};
use skirmish_core::types::Position;

use skirmish_ai::fsm;

use crate::spatial::Quadtree;
use crate::systems::targeting::{self, Seeker};

/// Run the full-second upkeep pass.
pub fn run(
    world: &mut World,
    index: &Quadtree,
    lookup: &HashMap<UnitId, Entity>,
    rng: &mut ChaCha8Rng,
) {
    // Threat bleeds off over time.
    for (_entity, ai) in world.query_mut::<&mut CombatAi>() {
        if ai.threat > 0.0 {
            ai.threat = (ai.threat - THREAT_DECAY_PER_SECOND).max(0.0);
        }
    }

    // Regeneration, clamped to max hp.
    for (_entity, (vitals, regen)) in world.query_mut::<(&mut Vitals, &Regenerates)>() {
        if vitals.life == LifeState::Alive {
            vitals.hp = (vitals.hp + regen.hp_per_second).min(vitals.max_hp);
        }
    }

    // Monsters keep speeding up, and brief snags stop accumulating.
    for (_entity, (mobility, frenzy)) in world.query_mut::<(&mut Mobility, &Frenzy)>() {
        mobility.speed += frenzy.speed_up_per_second;
    }
    for (_entity, tracker) in world.query_mut::<&mut StuckTracker>() {
        fsm::decay_stuck_counter(tracker);
    }

    retarget_melee(world, index, lookup, rng);
}

/// Melee pursuers drop a target that wandered beyond three weapon ranges
/// and re-search a widened area; if the search comes up empty they keep
/// chasing their current prey.
fn retarget_melee(
    world: &mut World,
    index: &Quadtree,
    lookup: &HashMap<UnitId, Entity>,
    rng: &mut ChaCha8Rng,
) {
    struct Retarget {
        seeker: Seeker,
        mul: f64,
    }

    let mut retargets: Vec<Retarget> = Vec::new();
    for (entity, (pos, faction, vitals, ai, weapon, _tracker)) in world
        .query::<(&Position, &Faction, &Vitals, &CombatAi, &Weapon, &StuckTracker)>()
        .iter()
    {
        if vitals.life != LifeState::Alive {
            continue;
        }
        let Some(target) = ai.target else {
            continue;
        };
        let Some(target_pos) = target_position(world, lookup, target) else {
            continue;
        };
        if fsm::should_retarget(pos.distance_to(&target_pos), weapon.range) {
            retargets.push(Retarget {
                seeker: Seeker {
                    entity,
                    position: *pos,
                    faction: *faction,
                    weapon_range: weapon.range,
                    threat_chance: ai.threat_chance,
                    threat_range: ai.threat_range,
                },
                mul: ai.retarget_search_mul,
            });
        }
    }

    for r in retargets {
        if let Some(new_target) = targeting::find_target(world, index, &r.seeker, r.mul, rng) {
            if let Ok(mut ai) = world.get::<&mut CombatAi>(r.seeker.entity) {
                ai.target = Some(new_target);
            }
        }
    }
}

fn target_position(
    world: &World,
    lookup: &HashMap<UnitId, Entity>,
    id: UnitId,
) -> Option<Position> {
    let &entity = lookup.get(&id)?;
    let vitals = world.get::<&Vitals>(entity).ok()?;
    if vitals.life != LifeState::Alive {
        return None;
    }
    world.get::<&Position>(entity).ok().map(|p| *p)
}
