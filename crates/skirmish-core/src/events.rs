//! Events emitted by the simulation for audio and UI collaborators.

use serde::{Deserialize, Serialize};

use crate::components::UnitId;
use crate::enums::{ProjectileKind, WeaponKind};

/// One-shot events drained from the engine with each snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CombatEvent {
    /// A unit entered the battle.
    UnitSpawned { unit: UnitId, x: f64, y: f64 },
    /// A weapon fired (one event per trigger pull, not per pellet).
    ShotFired { weapon: WeaponKind, x: f64, y: f64 },
    /// A unit was destroyed.
    UnitKilled {
        victim: UnitId,
        killer: Option<UnitId>,
        weapon: Option<WeaponKind>,
    },
    /// Bounty paid to the player for an enemy kill.
    BountyAwarded { amount: f64, x: f64, y: f64 },
    /// A detonating projectile exploded.
    Explosion {
        kind: ProjectileKind,
        x: f64,
        y: f64,
        radius: f64,
    },
    /// A player elite gained a level.
    LevelUp { unit: UnitId, level: u32 },
    /// A kill granted a discounted next reload.
    ReloadBoosted { unit: UnitId },
    /// A reload began.
    ReloadStarted { unit: UnitId, duration_secs: f64 },
}
