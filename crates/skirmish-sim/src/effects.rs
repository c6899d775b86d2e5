//! Damage-over-time effects: construction, stacking, and the merge law.
//!
//! A unit's stack holds at most one live effect per identity key. Applying
//! a matching effect merges instead of stacking: the remaining fixed-damage
//! potential of the old effect is absorbed into the new one's duration, and
//! percent-of-hp rates are simply replaced.

use skirmish_core::components::{Effect, EffectStack, UnitId};
use skirmish_core::constants::DT;
use skirmish_core::enums::{EffectKind, WeaponKind};

/// The standard burn applied by incendiary rounds: 3 seconds of 10 damage
/// plus 1% of current hp per second.
pub fn burning(now_secs: f64, source_unit: Option<UnitId>, source_weapon: Option<WeaponKind>) -> Effect {
    Effect {
        kind: EffectKind::Burning,
        damage_per_tick: 0.0,
        damage_per_second: 10.0,
        percent_per_tick: 0.0,
        percent_per_second: 0.01,
        lifetime_secs: 3.0,
        expires_at: now_secs + 3.0,
        source_unit,
        source_weapon,
    }
}

/// Remaining fixed-damage potential: what the fixed channels would still
/// deal over the effect's remaining lifetime.
pub fn remaining_fixed_potential(effect: &Effect, now_secs: f64) -> f64 {
    let remaining = (effect.expires_at - now_secs).max(0.0);
    effect.damage_per_tick * (remaining / DT) + effect.damage_per_second * remaining
}

/// Full fixed-damage potential of an effect over its stated lifetime.
pub fn full_fixed_potential(effect: &Effect) -> f64 {
    effect.damage_per_tick * (effect.lifetime_secs / DT) + effect.damage_per_second * effect.lifetime_secs
}

/// Apply `effect` to the stack, merging into any live effect with the same
/// identity key.
pub fn apply_effect(stack: &mut EffectStack, effect: Effect, now_secs: f64) {
    match stack
        .effects
        .iter_mut()
        .find(|e| e.kind == effect.kind && e.expires_at > now_secs)
    {
        Some(existing) => merge(existing, effect, now_secs),
        None => stack.effects.push(effect),
    }
}

/// Merge a freshly applied effect into the live one sharing its key.
///
/// The combined fixed potential (old remaining + new full) is redistributed
/// across the new duration over whichever fixed channel(s) the new effect
/// uses, preserving the new effect's channel ratio when it uses both.
/// Percent rates are replaced outright, and the lifetime refreshes.
fn merge(existing: &mut Effect, new: Effect, now_secs: f64) {
    let combined = remaining_fixed_potential(existing, now_secs) + full_fixed_potential(&new);

    let ticks = new.lifetime_secs / DT;
    let tick_potential = new.damage_per_tick * ticks;
    let second_potential = new.damage_per_second * new.lifetime_secs;

    let (per_tick, per_second) = if tick_potential > 0.0 && second_potential > 0.0 {
        let ratio = tick_potential / (tick_potential + second_potential);
        (
            combined * ratio / ticks,
            combined * (1.0 - ratio) / new.lifetime_secs,
        )
    } else if tick_potential > 0.0 {
        (combined / ticks, 0.0)
    } else if new.lifetime_secs > 0.0 {
        (0.0, combined / new.lifetime_secs)
    } else {
        (0.0, 0.0)
    };

    existing.damage_per_tick = per_tick;
    existing.damage_per_second = per_second;
    existing.percent_per_tick = new.percent_per_tick;
    existing.percent_per_second = new.percent_per_second;
    existing.lifetime_secs = new.lifetime_secs;
    existing.expires_at = now_secs + new.lifetime_secs;
    existing.source_unit = new.source_unit;
    existing.source_weapon = new.source_weapon;
}

/// Drop expired effects; the identity key frees with the entry.
pub fn expire(stack: &mut EffectStack, now_secs: f64) {
    stack.effects.retain(|e| now_secs <= e.expires_at);
}
