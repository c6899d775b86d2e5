//! Targeting and movement decision functions.
//!
//! Pure functions that compute target choices and per-tick movement
//! decisions from plain data. No ECS dependency and no internal randomness:
//! probabilistic choices take pre-drawn rolls in [0, 1).

use skirmish_core::components::{StuckTracker, UnitId};
use skirmish_core::constants::*;
use skirmish_core::types::Position;

/// A targetable opponent, as seen by the acquisition query.
#[derive(Debug, Clone, Copy)]
pub struct TargetCandidate {
    pub id: UnitId,
    pub position: Position,
    pub distance: f64,
    pub threat: f64,
}

/// Choose a target from `candidates`.
///
/// With probability `threat_chance` the most dangerous candidate within
/// `threat_range` is preferred; when the roll misses, or no candidate has
/// positive threat in range, the nearest candidate wins. Ties go to the
/// first candidate encountered.
pub fn select_target(
    candidates: &[TargetCandidate],
    threat_chance: f64,
    threat_range: f64,
    threat_roll: f64,
) -> Option<UnitId> {
    if threat_roll < threat_chance {
        if let Some(id) = most_dangerous(candidates, threat_range) {
            return Some(id);
        }
    }
    nearest(candidates)
}

/// Nearest candidate by Euclidean distance.
pub fn nearest(candidates: &[TargetCandidate]) -> Option<UnitId> {
    let mut best: Option<&TargetCandidate> = None;
    for c in candidates {
        match best {
            Some(b) if c.distance >= b.distance => {}
            _ => best = Some(c),
        }
    }
    best.map(|c| c.id)
}

/// Highest-threat candidate within `max_distance`, requiring positive threat.
pub fn most_dangerous(candidates: &[TargetCandidate], max_distance: f64) -> Option<UnitId> {
    let mut best: Option<&TargetCandidate> = None;
    let mut highest = 0.0;
    for c in candidates {
        if c.distance < max_distance && c.threat > highest {
            highest = c.threat;
            best = Some(c);
        }
    }
    best.map(|c| c.id)
}

/// The movement the unit should perform this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementDecision {
    Hold,
    /// Step toward a point, arriving exactly when within one step.
    MoveTo { x: f64, y: f64 },
    /// Step directly away from a point.
    MoveAwayFrom { x: f64, y: f64 },
    /// Step perpendicular to the line toward a point.
    Strafe { x: f64, y: f64, left: bool },
    /// Step along an absolute heading (melee pursuit with stuck offset).
    MoveHeading { angle: f64 },
}

/// Inputs to the ranged-unit movement ladder.
#[derive(Debug, Clone, Copy)]
pub struct MovementContext {
    pub position: Position,
    pub weapon_range: f64,
    /// Player-ordered destination, highest priority.
    pub override_dest: Option<Position>,
    /// Whether the manual-override window is active.
    pub manual_mode: bool,
    /// Position of a live forced-attack target, if any.
    pub forced_target: Option<Position>,
    /// Position of the current AI target, if any.
    pub target: Option<Position>,
    pub target_distance: f64,
    pub target_is_melee: bool,
    pub dodge_moving: bool,
    pub dodge_left: bool,
}

/// Evaluate the movement priority ladder for a ranged unit:
/// commanded destination, then manual-mode behavior, then AI
/// approach/retreat/strafe against the current target.
pub fn evaluate_movement(ctx: &MovementContext) -> MovementDecision {
    if let Some(dest) = ctx.override_dest {
        return MovementDecision::MoveTo {
            x: dest.x,
            y: dest.y,
        };
    }

    if ctx.manual_mode {
        // Holding under manual control: close on a forced target that is
        // out of range, otherwise stand and shoot.
        if let Some(t) = ctx.forced_target {
            if ctx.weapon_range < ctx.target_distance {
                return MovementDecision::MoveTo { x: t.x, y: t.y };
            }
        }
        return MovementDecision::Hold;
    }

    let Some(t) = ctx.target else {
        return MovementDecision::Hold;
    };

    if ctx.weapon_range < ctx.target_distance {
        MovementDecision::MoveTo { x: t.x, y: t.y }
    } else if ctx.target_is_melee
        && ctx.weapon_range * MELEE_RETREAT_RANGE_FRACTION > ctx.target_distance
    {
        MovementDecision::MoveAwayFrom { x: t.x, y: t.y }
    } else if ctx.dodge_moving {
        MovementDecision::Strafe {
            x: t.x,
            y: t.y,
            left: ctx.dodge_left,
        }
    } else {
        MovementDecision::Hold
    }
}

/// Melee pursuit: head for the target with the current recovery offset
/// applied, or hold when already in range.
pub fn evaluate_melee_movement(
    position: Position,
    weapon_range: f64,
    target: Option<Position>,
    target_distance: f64,
    offset_angle: f64,
) -> MovementDecision {
    let Some(t) = target else {
        return MovementDecision::Hold;
    };
    if weapon_range < target_distance {
        MovementDecision::MoveHeading {
            angle: position.angle_to(&t) + offset_angle,
        }
    } else {
        MovementDecision::Hold
    }
}

/// Update dodge-strafe state at the half-second cadence. Starting a strafe
/// flips the direction; an active strafe stops with half the start chance.
pub fn update_dodge(
    moving: bool,
    left: bool,
    dodge_chance: f64,
    start_roll: f64,
    stop_roll: f64,
) -> (bool, bool) {
    if dodge_chance > start_roll {
        if moving && dodge_chance / 2.0 > stop_roll {
            (false, left)
        } else {
            (true, !left)
        }
    } else {
        (moving, left)
    }
}

/// Record a stuck-detection displacement sample.
pub fn sample_stuck(tracker: &mut StuckTracker, pos: Position) {
    let moved_sq = tracker.last_pos.distance_sq_to(&pos);
    if moved_sq < tracker.min_move_sq {
        tracker.counter += 1;
    } else {
        tracker.counter = 0;
    }
    tracker.last_pos = pos;
}

/// Apply a recovery heading offset once the stuck counter trips, resetting
/// the counter. `roll` is a uniform draw in [0, 1); the offset lands in
/// (-pi/2, pi/2).
pub fn try_stuck_recovery(tracker: &mut StuckTracker, roll: f64) -> bool {
    if tracker.counter > STUCK_COUNTER_LIMIT {
        tracker.offset_angle = (roll - 0.5) * std::f64::consts::PI;
        tracker.counter = 0;
        true
    } else {
        false
    }
}

/// Geometric per-tick decay of the recovery offset.
pub fn decay_stuck_offset(tracker: &mut StuckTracker) {
    tracker.offset_angle *= STUCK_OFFSET_DECAY;
}

/// Full-second decay of the stuck counter, so brief snags don't accumulate.
pub fn decay_stuck_counter(tracker: &mut StuckTracker) {
    tracker.counter = tracker.counter.saturating_sub(STUCK_COUNTER_DECAY);
}

/// Whether a melee pursuer should abandon a target that wandered beyond
/// `MONSTER_RETARGET_RANGE_MUL` times its weapon range.
pub fn should_retarget(target_distance: f64, weapon_range: f64) -> bool {
    target_distance > weapon_range * MONSTER_RETARGET_RANGE_MUL
}
