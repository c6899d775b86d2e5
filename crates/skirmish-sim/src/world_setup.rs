//! Unit spawn factories and battlefield placement helpers.
//!
//! Factories build `UnitBlueprint`s; the engine's validated insert turns a
//! blueprint into an entity with the component set its role calls for.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::components::Weapon;
use skirmish_core::constants::{MAP_HEIGHT, MAP_WIDTH};
use skirmish_core::enums::{Faction, SpawnRegion, UnitRole, WeaponKind};
use skirmish_core::types::Position;

use crate::error::SimError;
use crate::weapons;

/// Everything needed to spawn one unit.
pub struct UnitBlueprint {
    pub role: UnitRole,
    pub faction: Faction,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub speed: f64,
    pub max_hp: f64,
    pub weapon: Weapon,
    /// Overrides the role profile's dodge probability.
    pub dodge_chance: Option<f64>,
    /// Overrides the role profile's threat-preference probability.
    pub threat_chance: Option<f64>,
    /// Fixed kill bounty instead of the computed unit value.
    pub fixed_value: Option<f64>,
}

impl UnitBlueprint {
    fn new(role: UnitRole, faction: Faction, x: f64, y: f64, weapon: Weapon) -> Self {
        Self {
            role,
            faction,
            x,
            y,
            size: 9.0,
            speed: 2.0,
            max_hp: 500.0,
            weapon,
            dodge_chance: None,
            threat_chance: None,
            fixed_value: None,
        }
    }
}

/// Line infantry with a random standard-issue gun.
pub fn infantry(rng: &mut ChaCha8Rng, x: f64, y: f64, faction: Faction) -> UnitBlueprint {
    let mut bp = UnitBlueprint::new(UnitRole::Soldier, faction, x, y, weapons::random_weapon(rng, 0.1));
    bp.threat_chance = Some(0.25);
    bp.dodge_chance = Some(0.15);
    bp
}

/// Cheap, hesitant militia.
pub fn militia(rng: &mut ChaCha8Rng, x: f64, y: f64, faction: Faction) -> UnitBlueprint {
    let mut bp = UnitBlueprint::new(UnitRole::Soldier, faction, x, y, weapons::random_weapon(rng, 0.1));
    bp.speed = 1.5;
    bp.max_hp = 300.0;
    bp.threat_chance = Some(0.15);
    bp.dodge_chance = Some(0.05);
    bp
}

/// Veteran infantry: tougher, better drafted gear.
pub fn veteran(rng: &mut ChaCha8Rng, x: f64, y: f64, faction: Faction) -> UnitBlueprint {
    let mut bp =
        UnitBlueprint::new(UnitRole::Soldier, faction, x, y, weapons::random_weapon(rng, 0.25));
    bp.size = 8.5;
    bp.speed = 2.5;
    bp.max_hp = 700.0;
    bp.threat_chance = Some(0.3);
    bp.dodge_chance = Some(0.25);
    bp
}

/// Special forces: fast, evasive, well armed.
pub fn spec_ops(rng: &mut ChaCha8Rng, x: f64, y: f64, faction: Faction) -> UnitBlueprint {
    let mut bp =
        UnitBlueprint::new(UnitRole::Soldier, faction, x, y, weapons::random_weapon(rng, 0.25));
    bp.size = 8.0;
    bp.speed = 3.0;
    bp.max_hp = 800.0;
    bp.threat_chance = Some(0.3);
    bp.dodge_chance = Some(0.3);
    bp
}

/// Player elite with a chosen weapon.
pub fn fighter(x: f64, y: f64, weapon: Weapon) -> UnitBlueprint {
    let mut bp = UnitBlueprint::new(UnitRole::Fighter, Faction::Black, x, y, weapon);
    bp.size = 8.0;
    bp.speed = 3.0;
    bp.max_hp = 1500.0;
    bp
}

/// Immobile gun emplacement with a tuned-up random gun.
pub fn turret(rng: &mut ChaCha8Rng, x: f64, y: f64, faction: Faction) -> UnitBlueprint {
    let mut bp = UnitBlueprint::new(UnitRole::Turret, faction, x, y, weapons::turret_weapon(rng));
    bp.size = 25.0;
    bp.speed = 0.01;
    bp.max_hp = 8000.0;
    bp
}

/// Fast melee monster. `strength_mul` scales size, hp, and melee reach.
pub fn monster_fast(x: f64, y: f64, strength_mul: f64) -> UnitBlueprint {
    monster(x, y, 4.0, 6.0, 120.0, 25.0, strength_mul)
}

/// Standard melee monster.
pub fn monster_normal(x: f64, y: f64, strength_mul: f64) -> UnitBlueprint {
    monster(x, y, 2.5, 9.0, 350.0, 50.0, strength_mul)
}

/// Big, slow melee monster.
pub fn monster_big(x: f64, y: f64, strength_mul: f64) -> UnitBlueprint {
    monster(x, y, 0.5, 13.0, 700.0, 100.0, strength_mul)
}

fn monster(
    x: f64,
    y: f64,
    speed: f64,
    size: f64,
    max_hp: f64,
    damage: f64,
    strength_mul: f64,
) -> UnitBlueprint {
    let weapon = weapons::melee(strength_mul, damage);
    let mut bp = UnitBlueprint::new(UnitRole::Monster, Faction::Purple, x, y, weapon);
    bp.size = size * strength_mul;
    bp.speed = speed;
    bp.max_hp = max_hp * strength_mul;
    bp
}

/// Inert practice target with a fixed bounty.
pub fn dummy(x: f64, y: f64) -> UnitBlueprint {
    let mut bp = UnitBlueprint::new(UnitRole::Dummy, Faction::Red, x, y, weapons::build(WeaponKind::Pistol));
    bp.size = 15.0;
    bp.speed = 3.0;
    bp.max_hp = 10_000.0;
    bp.fixed_value = Some(5000.0);
    bp
}

/// Regenerating headquarters.
pub fn base(rng: &mut ChaCha8Rng, x: f64, y: f64, faction: Faction) -> UnitBlueprint {
    let mut bp =
        UnitBlueprint::new(UnitRole::Base, faction, x, y, weapons::random_weapon(rng, 0.5));
    bp.size = 40.0;
    bp.speed = 0.0;
    bp.max_hp = 20_000.0;
    bp
}

/// Resolve a map-edge keyword, failing loudly on anything unrecognized.
pub fn parse_region(keyword: &str) -> Result<SpawnRegion, SimError> {
    keyword
        .parse()
        .map_err(|_| SimError::UnknownRegion(keyword.to_string()))
}

/// Random placement point inside one edge band of the map. `narrow`
/// squeezes the band from a third to a quarter of the map extent.
pub fn random_point(rng: &mut ChaCha8Rng, region: SpawnRegion, narrow: bool) -> Position {
    let x_band = if narrow { MAP_WIDTH / 4.0 } else { MAP_WIDTH / 3.0 };
    let y_band = if narrow { MAP_HEIGHT / 4.0 } else { MAP_HEIGHT / 3.0 };

    match region {
        SpawnRegion::Left => Position::new(rng.gen::<f64>() * x_band, rng.gen::<f64>() * MAP_HEIGHT),
        SpawnRegion::Right => Position::new(
            MAP_WIDTH - rng.gen::<f64>() * x_band,
            rng.gen::<f64>() * MAP_HEIGHT,
        ),
        SpawnRegion::Top => Position::new(rng.gen::<f64>() * MAP_WIDTH, rng.gen::<f64>() * y_band),
        SpawnRegion::Bottom => Position::new(
            rng.gen::<f64>() * MAP_WIDTH,
            MAP_HEIGHT - rng.gen::<f64>() * y_band,
        ),
    }
}
