//! Weapon catalog and the firing/reload state machine.
//!
//! Weapons are value objects owned by their unit. The catalog is the closed
//! set of named kinds; asking for an unknown name fails at the boundary.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::{ExplosionSpec, ProjectileState, UnitId, Weapon, WeaponStats};
use skirmish_core::constants::*;
use skirmish_core::enums::{Faction, ProjectileKind, WeaponKind};
use skirmish_core::types::{Position, Velocity};

use crate::error::SimError;

/// Catalog entry for one weapon kind.
pub struct WeaponSpec {
    pub kind: WeaponKind,
    pub damage: f64,
    pub burst: u32,
    pub rpm: f64,
    pub magazine: u32,
    pub recoil_deg: f64,
    pub range: f64,
    /// `None` derives the reload from damage, magazine, and rate.
    pub reload_secs: Option<f64>,
    /// `None` uses the default pre-fire multiple (instant-hit: range + 1).
    pub prefire_range: Option<f64>,
    pub attenuation: f64,
    pub projectile: Option<ProjectileKind>,
    /// Drafted only on a special-weapon roll.
    pub special: bool,
}

/// The full weapon catalog.
pub const CATALOG: &[WeaponSpec] = &[
    WeaponSpec {
        kind: WeaponKind::AssaultRifle,
        damage: 20.0,
        burst: 1,
        rpm: 600.0,
        magazine: 30,
        recoil_deg: 5.0,
        range: 600.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 1.0,
        projectile: Some(ProjectileKind::Rifle),
        special: false,
    },
    WeaponSpec {
        kind: WeaponKind::Pistol,
        damage: 15.0,
        burst: 1,
        rpm: 350.0,
        magazine: 12,
        recoil_deg: 4.0,
        range: 400.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 1.0,
        projectile: Some(ProjectileKind::Pistol),
        special: false,
    },
    WeaponSpec {
        kind: WeaponKind::Shotgun,
        damage: 8.0,
        burst: 9,
        rpm: 70.0,
        magazine: 6,
        recoil_deg: 12.0,
        range: 450.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 1.0,
        projectile: Some(ProjectileKind::Buckshot),
        special: false,
    },
    WeaponSpec {
        kind: WeaponKind::SilencedSmg,
        damage: 12.0,
        burst: 1,
        rpm: 900.0,
        magazine: 35,
        recoil_deg: 6.0,
        range: 500.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 1.0,
        projectile: Some(ProjectileKind::Subsonic),
        special: false,
    },
    WeaponSpec {
        kind: WeaponKind::Marksman,
        damage: 70.0,
        burst: 1,
        rpm: 80.0,
        magazine: 5,
        recoil_deg: 1.0,
        range: 900.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 0.5,
        projectile: Some(ProjectileKind::HighCaliber),
        special: false,
    },
    WeaponSpec {
        kind: WeaponKind::DragonBreath,
        damage: 10.0,
        burst: 7,
        rpm: 60.0,
        magazine: 5,
        recoil_deg: 14.0,
        range: 350.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 1.0,
        projectile: Some(ProjectileKind::DragonBreath),
        special: true,
    },
    WeaponSpec {
        kind: WeaponKind::GrenadeLauncher,
        damage: 40.0,
        burst: 1,
        rpm: 45.0,
        magazine: 4,
        recoil_deg: 8.0,
        range: 550.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 0.0,
        projectile: Some(ProjectileKind::Grenade),
        special: true,
    },
    WeaponSpec {
        kind: WeaponKind::Rpg7,
        damage: 50.0,
        burst: 1,
        rpm: 20.0,
        magazine: 1,
        recoil_deg: 3.0,
        range: 700.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 0.0,
        projectile: Some(ProjectileKind::Rocket),
        special: true,
    },
    WeaponSpec {
        kind: WeaponKind::Railgun,
        damage: 120.0,
        burst: 1,
        rpm: 30.0,
        magazine: 3,
        recoil_deg: 0.5,
        range: 1200.0,
        reload_secs: None,
        prefire_range: None,
        attenuation: 0.0,
        projectile: Some(ProjectileKind::Magnetic),
        special: true,
    },
    WeaponSpec {
        kind: WeaponKind::Melee,
        damage: 50.0,
        burst: 1,
        rpm: 100.0,
        magazine: 100,
        recoil_deg: 0.0,
        range: 35.0,
        reload_secs: Some(0.1),
        prefire_range: None,
        attenuation: 0.0,
        projectile: None,
        special: false,
    },
];

/// Look up the catalog entry for a kind.
pub fn spec(kind: WeaponKind) -> &'static WeaponSpec {
    CATALOG
        .iter()
        .find(|s| s.kind == kind)
        .expect("every WeaponKind has a catalog entry")
}

/// Resolve a weapon by catalog name. Unknown names fail loudly.
pub fn from_name(name: &str) -> Result<WeaponKind, SimError> {
    CATALOG
        .iter()
        .find(|s| s.kind.name() == name)
        .map(|s| s.kind)
        .ok_or_else(|| SimError::UnknownWeapon(name.to_string()))
}

/// Build a ready weapon from its catalog entry.
pub fn build(kind: WeaponKind) -> Weapon {
    let spec = spec(kind);
    build_from_spec(spec)
}

fn build_from_spec(spec: &WeaponSpec) -> Weapon {
    let mut weapon = Weapon {
        kind: spec.kind,
        damage: spec.damage,
        burst: spec.burst,
        rpm: spec.rpm,
        magazine: spec.magazine,
        recoil_deg: spec.recoil_deg,
        range: spec.range,
        prefire_range: 0.0,
        max_travel: spec.range * DEFAULT_MAX_RANGE_MUL,
        reload_secs: 0.0,
        attenuation: spec.attenuation,
        projectile: spec.projectile,
        rounds: spec.magazine,
        reloading: false,
        reload_done_at: 0.0,
        reload_boost: false,
        last_shot_at: 0.0,
        stats: WeaponStats::default(),
    };

    weapon.prefire_range = spec.prefire_range.unwrap_or(if spec.projectile.is_some() {
        spec.range * DEFAULT_PREFIRE_RANGE_MUL
    } else {
        // Instant-hit weapons must be essentially in range, so they never
        // swing at air from the default two-range threshold.
        spec.range + 1.0
    });

    weapon.reload_secs = spec.reload_secs.unwrap_or_else(|| {
        (weapon.dps_burst() * 0.01 + weapon.damage * 0.09).min(MAX_DERIVED_RELOAD_SECS)
    });

    weapon
}

/// Build the melee weapon scaled by a monster strength multiplier.
pub fn melee(strength_mul: f64, damage: f64) -> Weapon {
    let mut weapon = build(WeaponKind::Melee);
    weapon.damage = damage * strength_mul;
    weapon.magazine = (weapon.magazine as f64 * strength_mul) as u32;
    weapon.rounds = weapon.magazine;
    weapon.range *= strength_mul;
    weapon.prefire_range = weapon.range + 1.0;
    weapon
}

/// Draft a random catalog weapon, with a chance of a special kind.
pub fn random_weapon(rng: &mut ChaCha8Rng, special_chance: f64) -> Weapon {
    let special = rng.gen::<f64>() < special_chance;
    let pool: Vec<&WeaponSpec> = CATALOG
        .iter()
        .filter(|s| s.special == special && s.kind != WeaponKind::Melee)
        .collect();
    let spec = pool[rng.gen_range(0..pool.len())];
    build_from_spec(spec)
}

/// Turret guns are drafted with a high special chance and then tuned up.
pub fn turret_weapon(rng: &mut ChaCha8Rng) -> Weapon {
    let mut weapon = random_weapon(rng, 0.5);
    weapon.recoil_deg /= 1.2;
    weapon.reload_secs /= 1.2;
    weapon.burst *= 2;
    weapon.magazine *= 2;
    weapon.rounds = weapon.magazine;
    weapon.prefire_range *= 3.0;
    weapon
}

/// Outcome of a trigger pull attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerResult {
    /// A burst should be emitted now.
    Fired,
    /// Waiting out the fire interval.
    NotReady,
    /// Mid-reload (possibly just entered).
    Reloading,
    /// Target beyond the pre-fire threshold.
    OutOfRange,
}

/// Advance the firing state machine by one trigger attempt.
///
/// Handles reload completion and entry, the pre-fire range refusal, and
/// remainder-preserving rate limiting: the fractional overshoot past the
/// fire interval carries into the next check instead of resetting, so the
/// long-run rate stays accurate under variable tick timing.
pub fn try_trigger(weapon: &mut Weapon, now_secs: f64, target_distance: f64) -> TriggerResult {
    if weapon.reloading {
        if now_secs >= weapon.reload_done_at {
            weapon.reloading = false;
            weapon.rounds = weapon.magazine;
            weapon.reload_boost = false;
        } else {
            return TriggerResult::Reloading;
        }
    }

    if weapon.rounds == 0 {
        start_reload(weapon, now_secs);
        return TriggerResult::Reloading;
    }

    if target_distance > weapon.prefire_range {
        return TriggerResult::OutOfRange;
    }

    let elapsed = now_secs - weapon.last_shot_at;
    let interval = weapon.fire_interval_secs();
    if elapsed > interval {
        weapon.rounds -= 1;
        weapon.last_shot_at = now_secs - (elapsed % interval);
        TriggerResult::Fired
    } else {
        TriggerResult::NotReady
    }
}

/// Enter the reloading state, honoring any pending reload boost.
pub fn start_reload(weapon: &mut Weapon, now_secs: f64) {
    weapon.reloading = true;
    let duration = if weapon.reload_boost {
        weapon.reload_secs / 2.0
    } else {
        weapon.reload_secs
    };
    weapon.reload_done_at = now_secs + duration;
}

/// Tactical reload request: refused mid-reload or with a full magazine.
pub fn start_manual_reload(weapon: &mut Weapon, now_secs: f64) -> bool {
    if weapon.rounds >= weapon.magazine || weapon.reloading {
        return false;
    }
    start_reload(weapon, now_secs);
    true
}

/// Grant a discounted next reload (kill reward). Cleared on completion.
pub fn boost_reload(weapon: &mut Weapon) {
    weapon.reload_boost = true;
}

/// Seconds left on the current reload.
pub fn reload_remaining(weapon: &Weapon, now_secs: f64) -> f64 {
    if weapon.reloading {
        (weapon.reload_done_at - now_secs).max(0.0)
    } else {
        0.0
    }
}

/// Projectile flight speed for a kind (world units per tick), before jitter.
pub fn projectile_speed(kind: ProjectileKind) -> f64 {
    match kind {
        ProjectileKind::Rifle => 40.0,
        ProjectileKind::Pistol => 34.0,
        ProjectileKind::Buckshot => 24.0,
        ProjectileKind::DragonBreath => 22.0,
        ProjectileKind::HighCaliber => 50.0,
        ProjectileKind::Grenade => 15.0,
        ProjectileKind::Rocket => 3.0,
        ProjectileKind::Magnetic => 120.0,
        ProjectileKind::Subsonic => 25.0,
    }
}

/// Construct one projectile of the weapon's kind, launched from `origin`
/// along `angle`. Variant-specific behavior (speed jitter, pierce budget,
/// detonation, range-limited lifetime, applied effects) is fixed here at
/// creation time.
pub fn make_projectile(
    rng: &mut ChaCha8Rng,
    kind: ProjectileKind,
    origin: Position,
    angle: f64,
    weapon: &Weapon,
    source_unit: UnitId,
    faction: Faction,
    now_secs: f64,
) -> (Position, Velocity, ProjectileState) {
    let base_speed = projectile_speed(kind);

    let (speed, size, pierce, lifetime_secs, accel, explosion, tracer, threat_level) = match kind {
        ProjectileKind::Rifle => (
            base_speed,
            1.0,
            1,
            DEFAULT_PROJECTILE_LIFETIME_SECS,
            0.0,
            None,
            None,
            1.0,
        ),
        ProjectileKind::Pistol => (
            base_speed,
            0.9,
            0,
            DEFAULT_PROJECTILE_LIFETIME_SECS,
            0.0,
            None,
            None,
            1.0,
        ),
        ProjectileKind::Buckshot => {
            // Pellet speed wanders a little; the lifetime caps flight at
            // just short of the pre-fire range.
            let speed = base_speed + rng.gen::<f64>() * 2.0 - 1.0;
            let range_limit = weapon.prefire_range - 50.0;
            (
                speed,
                0.65,
                0,
                range_limit / base_speed * DT,
                0.0,
                None,
                None,
                1.0,
            )
        }
        ProjectileKind::DragonBreath => {
            let speed = 20.0 + rng.gen::<f64>() * 4.0;
            let range_limit = weapon.prefire_range - 50.0;
            (
                speed,
                0.9,
                0,
                range_limit / base_speed * DT,
                0.0,
                None,
                None,
                1.0,
            )
        }
        ProjectileKind::HighCaliber => (
            base_speed,
            2.0,
            2,
            DEFAULT_PROJECTILE_LIFETIME_SECS,
            0.0,
            None,
            None,
            1.0,
        ),
        ProjectileKind::Grenade => {
            let range_limit = weapon.prefire_range + rng.gen::<f64>() * 100.0 - 100.0;
            (
                base_speed,
                4.0,
                0,
                range_limit / base_speed * DT,
                0.0,
                Some(ExplosionSpec {
                    radius: 75.0,
                    damage: 75.0,
                    minimum_percent: 0.3,
                    friendly_fire: true,
                }),
                None,
                1.0,
            )
        }
        ProjectileKind::Rocket => (
            base_speed,
            5.0,
            0,
            DEFAULT_PROJECTILE_LIFETIME_SECS,
            0.5,
            Some(ExplosionSpec {
                radius: 150.0,
                damage: 300.0,
                minimum_percent: 0.4,
                friendly_fire: true,
            }),
            None,
            1.0,
        ),
        ProjectileKind::Magnetic => (
            base_speed,
            0.9,
            0,
            DEFAULT_PROJECTILE_LIFETIME_SECS,
            0.0,
            None,
            Some(4),
            1.0,
        ),
        ProjectileKind::Subsonic => (
            base_speed,
            0.95,
            0,
            DEFAULT_PROJECTILE_LIFETIME_SECS,
            0.0,
            None,
            None,
            0.15,
        ),
    };

    let velocity = Velocity::from_angle(angle, speed);
    let attenuation_start = weapon.range * ATTENUATION_START_RANGE_MUL;

    let state = ProjectileState {
        kind,
        faction,
        damage: weapon.damage,
        size,
        pierce,
        expires_at: now_secs + lifetime_secs,
        accel: Velocity::from_angle(angle, accel),
        explosion,
        tracer,
        threat_level,
        source_unit: Some(source_unit),
        source_weapon: Some(weapon.kind),
        prev_pos: origin,
        travel: 0.0,
        attenuation: weapon.attenuation,
        attenuation_start,
        attenuation_end: weapon.max_travel,
        damaged: Default::default(),
        life: skirmish_core::enums::LifeState::Alive,
    };

    (origin, velocity, state)
}

/// Angular recoil deviation for one round, in radians.
pub fn recoil_deviation(rng: &mut ChaCha8Rng, recoil_deg: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * recoil_deg * (std::f64::consts::PI / 180.0)
}
