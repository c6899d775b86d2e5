//! ECS components for hecs entities.
//!
//! Components are plain data structs; game logic lives in the simulation
//! systems. Cross-entity references are `UnitId` handles, never raw entity
//! ids, so a handle to a removed unit simply fails to resolve.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{Position, Velocity};

/// Stable public identifier of a unit, assigned at spawn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct UnitId(pub u32);

/// Marks an entity as a combat unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Unit;

/// Marks an entity as a projectile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile;

/// Hit points and lifecycle state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: f64,
    pub max_hp: f64,
    pub life: LifeState,
}

impl Vitals {
    pub fn full(max_hp: f64) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            life: LifeState::Alive,
        }
    }
}

/// Physical footprint. `size` is the bounding-circle radius; heavy roles
/// (turrets, bases) resist displacement with a cubic mass proxy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Body {
    pub size: f64,
    pub heavy: bool,
}

impl Body {
    /// Mass proxy used when splitting collision displacement.
    pub fn weight(&self) -> f64 {
        if self.heavy {
            self.size * self.size * self.size
        } else {
            self.size * self.size
        }
    }
}

/// Movement state. `moved` is the actual displacement of the last tick,
/// which predictive aim uses instead of the commanded velocity (a unit that
/// has stopped still carries a stale heading).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Mobility {
    pub speed: f64,
    pub heading: f64,
    pub moved: Velocity,
}

impl Mobility {
    pub fn new(speed: f64) -> Self {
        Self {
            speed,
            heading: 0.0,
            moved: Velocity::default(),
        }
    }
}

/// Targeting and combat-behavior state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatAi {
    /// Current target handle; tolerates target death.
    pub target: Option<UnitId>,
    /// Accumulated threat score from recent offensive activity.
    pub threat: f64,
    /// Probability of starting a strafe at each half-second check.
    pub dodge_chance: f64,
    pub dodge_moving: bool,
    pub dodge_left: bool,
    /// Probability of preferring the most dangerous candidate over the nearest.
    pub threat_chance: f64,
    /// Radius of the dangerous-candidate search.
    pub threat_range: f64,
    /// Widened search multiple used when a melee pursuer re-acquires after
    /// dropping a target that wandered off.
    pub retarget_search_mul: f64,
    /// Predictive-aim capability (elite units).
    pub can_preaim: bool,
}

/// Player command override state. Active while `until_secs` is in the
/// future; every new command refreshes the window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ManualOverride {
    pub move_dest: Option<Position>,
    pub forced_target: Option<UnitId>,
    pub until_secs: f64,
}

impl ManualOverride {
    pub fn is_active(&self, now_secs: f64) -> bool {
        now_secs < self.until_secs
    }
}

/// Stuck-detection state for melee pursuers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StuckTracker {
    pub last_pos: Position,
    pub counter: u32,
    pub offset_angle: f64,
    /// Squared displacement below which a sample counts as stuck.
    pub min_move_sq: f64,
}

impl StuckTracker {
    pub fn new(pos: Position, speed: f64) -> Self {
        Self {
            last_pos: pos,
            counter: 0,
            offset_angle: 0.0,
            min_move_sq: speed * speed * 0.01,
        }
    }
}

// --- Optional capability blocks ---

/// Restores hp at the full-second cadence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Regenerates {
    pub hp_per_second: f64,
}

/// Experience and level progression (player elites).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Levels {
    pub level: u32,
    pub exp: f64,
}

/// The unit never moves, regardless of AI decisions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Immobile;

/// Fixed kill bounty overriding the computed unit value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedValue(pub f64);

/// Monster self-acceleration: speed gained per full-second tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Frenzy {
    pub speed_up_per_second: f64,
}

// --- Weapons ---

/// Cumulative per-weapon-instance statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WeaponStats {
    pub shots_fired: u64,
    pub shots_hit: u64,
    /// Theoretical damage of every round fired.
    pub damage_estimated: f64,
    /// Damage actually applied to targets.
    pub damage_dealt: f64,
    pub kills: u64,
}

/// A unit's weapon: catalog parameters plus firing/reload state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub kind: WeaponKind,

    // Catalog parameters.
    pub damage: f64,
    /// Rounds emitted per trigger pull (shotgun pellets).
    pub burst: u32,
    pub rpm: f64,
    pub magazine: u32,
    /// Angular scatter in degrees.
    pub recoil_deg: f64,
    /// Range the unit AI tries to hold.
    pub range: f64,
    /// Firing is refused beyond this distance.
    pub prefire_range: f64,
    /// Projectiles die after traveling this far.
    pub max_travel: f64,
    pub reload_secs: f64,
    /// Travel-attenuation factor: 0 = none, 1 = full linear decay.
    pub attenuation: f64,
    /// Emitted projectile variant; `None` for instant-hit weapons.
    pub projectile: Option<ProjectileKind>,

    // Firing state.
    pub rounds: u32,
    pub reloading: bool,
    pub reload_done_at: f64,
    pub reload_boost: bool,
    pub last_shot_at: f64,

    pub stats: WeaponStats,
}

impl Weapon {
    /// Seconds between trigger pulls, normalized to the logical frame rate.
    pub fn fire_interval_secs(&self) -> f64 {
        (60.0 / self.rpm) * (crate::constants::TICK_RATE as f64 / 60.0)
    }

    /// Damage per second while the magazine lasts.
    pub fn dps_burst(&self) -> f64 {
        self.burst as f64 * self.damage * (self.rpm / 60.0)
    }

    /// Total damage in one magazine.
    pub fn mag_damage(&self) -> f64 {
        self.magazine as f64 * self.burst as f64 * self.damage
    }

    /// Damage per second averaged over a full fire-and-reload cycle.
    pub fn dps_average(&self) -> f64 {
        let cycle = (self.magazine as f64 / self.rpm) * 60.0 + self.reload_secs;
        self.mag_damage() / cycle
    }
}

// --- Effects ---

/// A timed damage-over-time effect. Fixed channels deal flat damage; the
/// percent channels are evaluated against the owner's *current* hp at every
/// application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub damage_per_tick: f64,
    pub damage_per_second: f64,
    pub percent_per_tick: f64,
    pub percent_per_second: f64,
    pub lifetime_secs: f64,
    pub expires_at: f64,
    pub source_unit: Option<UnitId>,
    pub source_weapon: Option<WeaponKind>,
}

/// Per-unit effect collection. At most one live effect per `EffectKind`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectStack {
    pub effects: Vec<Effect>,
}

// --- Projectiles ---

/// Area detonation parameters for exploding projectile kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExplosionSpec {
    pub radius: f64,
    pub damage: f64,
    /// Damage fraction remaining at the blast edge.
    pub minimum_percent: f64,
    pub friendly_fire: bool,
}

/// Full projectile state: motion extras, damage payload, and bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileState {
    pub kind: ProjectileKind,
    pub faction: Faction,
    pub damage: f64,
    pub size: f64,
    /// Remaining additional hits before the projectile dies.
    pub pierce: u32,
    pub expires_at: f64,
    pub accel: Velocity,
    pub explosion: Option<ExplosionSpec>,
    /// Tracer segment count, consumed by the render collaborator.
    pub tracer: Option<u8>,
    /// Threat added to the shooter per point of damage.
    pub threat_level: f64,
    pub source_unit: Option<UnitId>,
    pub source_weapon: Option<WeaponKind>,
    /// Position at the start of the current tick (swept collision).
    pub prev_pos: Position,
    /// Total distance traveled, for damage attenuation.
    pub travel: f64,
    /// Attenuation parameters copied from the firing weapon.
    pub attenuation: f64,
    pub attenuation_start: f64,
    pub attenuation_end: f64,
    /// Units already damaged by this projectile (collision only; explosions
    /// ignore this set).
    pub damaged: HashSet<UnitId>,
    pub life: LifeState,
}
