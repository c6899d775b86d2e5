//! Process-scoped reporting services: the weapon statistics book and the
//! per-tick performance counters.
//!
//! Both are owned by the engine and passed down by reference; they have an
//! explicit reset lifecycle instead of living as ambient globals.

use std::collections::HashMap;

use skirmish_core::enums::WeaponKind;
use skirmish_core::state::{PerfView, WeaponStatView};

#[derive(Debug, Clone, Copy, Default)]
struct BookEntry {
    shots_fired: u64,
    shots_hit: u64,
    damage_fired: f64,
    damage_hit: f64,
}

/// Cumulative statistics per weapon kind, across every instance that has
/// fired this battle.
#[derive(Debug, Default)]
pub struct WeaponStatBook {
    entries: HashMap<WeaponKind, BookEntry>,
}

impl WeaponStatBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything (battle restart).
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Record one round leaving the muzzle.
    pub fn weapon_fired(&mut self, kind: WeaponKind, damage: f64) {
        let entry = self.entries.entry(kind).or_default();
        entry.shots_fired += 1;
        entry.damage_fired += damage;
    }

    /// Record one round connecting.
    pub fn weapon_hit(&mut self, kind: WeaponKind, damage: f64) {
        let entry = self.entries.entry(kind).or_default();
        entry.shots_hit += 1;
        entry.damage_hit += damage;
    }

    /// Build the HUD report, sorted by weapon name for stable output.
    pub fn report(&self) -> Vec<WeaponStatView> {
        let mut views: Vec<WeaponStatView> = self
            .entries
            .iter()
            .map(|(kind, e)| WeaponStatView {
                name: kind.name().to_string(),
                shots_fired: e.shots_fired,
                shots_hit: e.shots_hit,
                damage_fired: e.damage_fired,
                damage_hit: e.damage_hit,
                accuracy: ratio(e.shots_hit as f64, e.shots_fired as f64),
                efficiency: ratio(e.damage_hit, e.damage_fired),
            })
            .collect();
        views.sort_by(|a, b| a.name.cmp(&b.name));
        views
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Wall-clock timings of the tick stages, refreshed every tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerfCounters {
    pub unit_update_micros: u64,
    pub projectile_update_micros: u64,
    pub collision_micros: u64,
    pub snapshot_micros: u64,
    pub unit_count: usize,
    pub projectile_count: usize,
}

impl PerfCounters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn view(&self) -> PerfView {
        PerfView {
            unit_update_micros: self.unit_update_micros,
            projectile_update_micros: self.projectile_update_micros,
            collision_micros: self.collision_micros,
            snapshot_micros: self.snapshot_micros,
            unit_count: self.unit_count,
            projectile_count: self.projectile_count,
        }
    }
}
