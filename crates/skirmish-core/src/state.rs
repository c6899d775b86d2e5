//! World snapshot: the complete visible state produced after each tick.

use serde::{Deserialize, Serialize};

use crate::components::UnitId;
use crate::enums::*;
use crate::events::CombatEvent;
use crate::types::SimTime;

/// Complete engine state broadcast to collaborators after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub units: Vec<UnitView>,
    pub projectiles: Vec<ProjectileView>,
    pub weapon_stats: Vec<WeaponStatView>,
    pub perf: PerfView,
    pub score: ScoreView,
    pub events: Vec<CombatEvent>,
}

/// A visible unit on the tactical display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitView {
    pub id: UnitId,
    pub role: UnitRole,
    pub faction: Faction,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub hp: f64,
    pub max_hp: f64,
    pub threat: f64,
    /// Kill bounty if this unit were destroyed now.
    pub value: f64,
    pub target: Option<UnitId>,
    pub manual_mode: bool,
    pub level: Option<u32>,
    pub weapon: WeaponView,
}

/// Weapon status for the unit readout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponView {
    pub kind: Option<WeaponKind>,
    pub rounds: u32,
    pub magazine: u32,
    pub reloading: bool,
    /// Seconds until the current reload completes (0 when not reloading).
    pub reload_remaining_secs: f64,
    /// Actual damage over theoretical damage fired.
    pub efficiency: f64,
}

/// A projectile in flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub kind: ProjectileKind,
    pub faction: Faction,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub heading: f64,
    pub tracer: Option<u8>,
}

/// Aggregate statistics for one weapon kind, for HUD reporting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeaponStatView {
    pub name: String,
    pub shots_fired: u64,
    pub shots_hit: u64,
    pub damage_fired: f64,
    pub damage_hit: f64,
    /// shots_hit / shots_fired.
    pub accuracy: f64,
    /// damage_hit / damage_fired.
    pub efficiency: f64,
}

/// Per-tick timing counters for the performance display.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PerfView {
    pub unit_update_micros: u64,
    pub projectile_update_micros: u64,
    pub collision_micros: u64,
    pub snapshot_micros: u64,
    pub unit_count: usize,
    pub projectile_count: usize,
}

/// Player economy and battle score.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ScoreView {
    pub money: f64,
    pub units_lost: u32,
    pub enemies_killed: u32,
}
