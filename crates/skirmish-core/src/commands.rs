//! Player commands sent from control collaborators to the simulation.
//!
//! Commands are queued and applied at the next tick boundary. Unit
//! references are `UnitId` handles; commands naming a removed unit are
//! logged and dropped by the engine.

use serde::{Deserialize, Serialize};

use crate::components::UnitId;

/// All possible player actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    /// Order a unit to a destination. Refreshes the manual-override window
    /// and keeps any forced target (attack-move).
    Move { unit: UnitId, x: f64, y: f64 },
    /// Force-attack a target. Refreshes the window and keeps any move order.
    Attack { unit: UnitId, target: UnitId },
    /// Clear the move order but hold position under manual control.
    StopMove { unit: UnitId },
    /// Return the unit to full AI control immediately.
    ResumeAi { unit: UnitId },
    /// Begin a tactical reload if the magazine is not full.
    ManualReload { unit: UnitId },
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}
