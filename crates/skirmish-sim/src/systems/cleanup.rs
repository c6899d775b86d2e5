//! Cull: the `Dying -> Removed` half of the entity lifecycle.
//!
//! Death side effects already ran at the `Alive -> Dying` transition; this
//! system only despawns. Uses a pre-allocated buffer to avoid per-tick
//! allocation.

use std::collections::HashMap;

use hecs::{Entity, World};

use skirmish_core::components::{Projectile, ProjectileState, Unit, UnitId, Vitals};
use skirmish_core::enums::LifeState;

/// Remove entities whose death transition ran this tick.
pub fn run(
    world: &mut World,
    lookup: &mut HashMap<UnitId, Entity>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    for (entity, (_unit, id, vitals)) in world.query_mut::<(&Unit, &UnitId, &mut Vitals)>() {
        if vitals.life == LifeState::Dying {
            vitals.life = LifeState::Removed;
            lookup.remove(id);
            despawn_buffer.push(entity);
        }
    }

    for (entity, (_proj, state)) in world.query_mut::<(&Projectile, &mut ProjectileState)>() {
        if state.life == LifeState::Dying {
            state.life = LifeState::Removed;
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
