//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Faction tag. Factions are color-coded; any two different factions are
/// hostile to each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// The player's units.
    #[default]
    Black,
    /// Opposing soldiers.
    Blue,
    /// Monsters.
    Purple,
    /// Practice targets.
    Red,
}

impl Faction {
    pub fn is_hostile_to(&self, other: Faction) -> bool {
        *self != other
    }
}

/// Unit behavior role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitRole {
    /// Baseline ranged combatant.
    #[default]
    Soldier,
    /// Player elite: regenerates, gains experience, levels up.
    Fighter,
    /// Immobile heavy gun emplacement.
    Turret,
    /// Melee attacker with stuck recovery and on-kill self-buffs.
    Monster,
    /// Inert practice target.
    Dummy,
    /// Immobile regenerating headquarters.
    Base,
}

/// Entity lifecycle. `Alive -> Dying` runs death side effects exactly once;
/// `Dying -> Removed` is performed only by the cull step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeState {
    #[default]
    Alive,
    Dying,
    Removed,
}

/// Weapon catalog identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    AssaultRifle,
    Pistol,
    Shotgun,
    SilencedSmg,
    Marksman,
    DragonBreath,
    GrenadeLauncher,
    Rpg7,
    Railgun,
    Melee,
}

impl WeaponKind {
    /// Display name, matching the catalog entry.
    pub fn name(&self) -> &'static str {
        match self {
            WeaponKind::AssaultRifle => "AssaultRifle",
            WeaponKind::Pistol => "Pistol",
            WeaponKind::Shotgun => "Shotgun",
            WeaponKind::SilencedSmg => "SilencedSmg",
            WeaponKind::Marksman => "Marksman",
            WeaponKind::DragonBreath => "DragonBreath",
            WeaponKind::GrenadeLauncher => "GrenadeLauncher",
            WeaponKind::Rpg7 => "Rpg7",
            WeaponKind::Railgun => "Railgun",
            WeaponKind::Melee => "Melee",
        }
    }
}

/// Projectile variants emitted by the weapon catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Rifle,
    Pistol,
    Buckshot,
    DragonBreath,
    HighCaliber,
    Grenade,
    Rocket,
    Magnetic,
    Subsonic,
}

/// Identity keys for damage-over-time effects. At most one live effect per
/// key exists on a unit; re-application merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    Burning,
}

/// Top-level engine phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Active,
    Paused,
}

/// Map edge keywords accepted by the random spawn-point helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnRegion {
    Left,
    Right,
    Top,
    Bottom,
}

impl std::str::FromStr for SpawnRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" => Ok(SpawnRegion::Left),
            "right" => Ok(SpawnRegion::Right),
            "top" => Ok(SpawnRegion::Top),
            "bottom" => Ok(SpawnRegion::Bottom),
            other => Err(format!("unknown spawn region keyword: {other}")),
        }
    }
}
