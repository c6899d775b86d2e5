//! Damage-over-time ticking.
//!
//! Fixed and percent-of-current-hp channels apply every tick; the
//! per-second channels apply at the full-second cadence. Expired effects
//! are dropped afterward, freeing their stacking identity.

use hecs::World;

use skirmish_core::components::{EffectStack, UnitId, Vitals};
use skirmish_core::enums::{LifeState, WeaponKind};

use crate::damage::{self, CombatCtx};
use crate::effects;

struct Application {
    unit: UnitId,
    amount: f64,
    source_unit: Option<UnitId>,
    source_weapon: Option<WeaponKind>,
}

/// Tick every unit's effect stack.
pub fn run(world: &mut World, ctx: &mut CombatCtx, now: f64, full_second: bool) {
    let mut applications: Vec<Application> = Vec::new();

    for (_entity, (id, stack, vitals)) in
        world.query::<(&UnitId, &EffectStack, &Vitals)>().iter()
    {
        if vitals.life != LifeState::Alive {
            continue;
        }
        for effect in &stack.effects {
            if now > effect.expires_at {
                continue;
            }
            // Percent channels read the current hp at application time.
            let mut amount = effect.damage_per_tick + effect.percent_per_tick * vitals.hp;
            if full_second {
                amount += effect.damage_per_second + effect.percent_per_second * vitals.hp;
            }
            if amount > 0.0 {
                applications.push(Application {
                    unit: *id,
                    amount,
                    source_unit: effect.source_unit,
                    source_weapon: effect.source_weapon,
                });
            }
        }
    }

    for app in applications {
        damage::apply_damage(
            world,
            ctx,
            app.unit,
            app.amount,
            app.source_unit,
            app.source_weapon,
        );
    }

    for (_entity, stack) in world.query_mut::<&mut EffectStack>() {
        effects::expire(stack, now);
    }
}
