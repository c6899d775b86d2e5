//! Role-specific behavioral profiles.
//!
//! Consolidates per-role AI parameters for unit construction and the
//! movement/targeting decision functions.

use skirmish_core::constants::MONSTER_RETARGET_SEARCH_MUL;
use skirmish_core::enums::UnitRole;

/// Behavioral profile for a unit role.
pub struct BehaviorProfile {
    /// Probability of starting a strafe at each half-second check.
    pub dodge_chance: f64,
    /// Probability of preferring the most dangerous candidate over the nearest.
    pub threat_chance: f64,
    /// Dangerous-candidate search radius as a multiple of weapon range.
    pub threat_range_mul: f64,
    /// Re-acquisition search radius multiple used after dropping a target
    /// that wandered too far (melee pursuers only).
    pub retarget_search_mul: f64,
    /// Whether this role fights in melee (opponents back away from it, and
    /// it runs stuck recovery instead of strafing).
    pub melee: bool,
    /// Whether the role ever moves.
    pub immobile: bool,
    /// Heavy roles use a cubic mass proxy in collision separation.
    pub heavy: bool,
    /// Hp restored per full-second tick (0 = no regeneration).
    pub hp_regen: f64,
    /// Whether the role gains experience and levels.
    pub levels: bool,
    /// Whether the role attacks at all.
    pub fights: bool,
}

/// Get the behavioral profile for a given role.
pub fn get_profile(role: UnitRole) -> BehaviorProfile {
    match role {
        UnitRole::Soldier => BehaviorProfile {
            dodge_chance: 0.15,
            threat_chance: 0.25,
            threat_range_mul: 3.0,
            retarget_search_mul: 1.0,
            melee: false,
            immobile: false,
            heavy: false,
            hp_regen: 0.0,
            levels: false,
            fights: true,
        },
        UnitRole::Fighter => BehaviorProfile {
            dodge_chance: 0.3,
            threat_chance: 0.25,
            threat_range_mul: 3.0,
            retarget_search_mul: 1.0,
            melee: false,
            immobile: false,
            heavy: false,
            hp_regen: 5.0,
            levels: true,
            fights: true,
        },
        UnitRole::Turret => BehaviorProfile {
            dodge_chance: 0.0,
            threat_chance: 0.25,
            threat_range_mul: 3.0,
            retarget_search_mul: 1.0,
            melee: false,
            immobile: true,
            heavy: true,
            hp_regen: 0.0,
            levels: false,
            fights: true,
        },
        UnitRole::Monster => BehaviorProfile {
            dodge_chance: 0.0,
            threat_chance: 0.1,
            threat_range_mul: 10.0,
            retarget_search_mul: MONSTER_RETARGET_SEARCH_MUL,
            melee: true,
            immobile: false,
            heavy: false,
            hp_regen: 0.0,
            levels: false,
            fights: true,
        },
        UnitRole::Dummy => BehaviorProfile {
            dodge_chance: 0.0,
            threat_chance: 0.0,
            threat_range_mul: 0.0,
            retarget_search_mul: 1.0,
            melee: false,
            immobile: true,
            heavy: false,
            hp_regen: 0.0,
            levels: false,
            fights: false,
        },
        UnitRole::Base => BehaviorProfile {
            dodge_chance: 0.0,
            threat_chance: 0.0,
            threat_range_mul: 0.0,
            retarget_search_mul: 1.0,
            melee: false,
            immobile: true,
            heavy: true,
            hp_regen: 20.0,
            levels: false,
            fights: false,
        },
    }
}
