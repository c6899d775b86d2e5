//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 30;

/// Seconds per tick.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

// --- World bounds ---

/// Battle plane width in world units.
pub const MAP_WIDTH: f64 = 5000.0;

/// Battle plane height in world units.
pub const MAP_HEIGHT: f64 = 3000.0;

/// Projectiles survive this far beyond the map edge before dying.
pub const PROJECTILE_BORDER_MARGIN: f64 = MAP_WIDTH / 8.0;

// --- Spatial index ---

/// Entries a quadtree node holds before subdividing.
pub const QUADTREE_NODE_CAPACITY: usize = 10;

/// Maximum quadtree subdivision depth.
pub const QUADTREE_MAX_DEPTH: usize = 5;

/// Minimum extent applied to degenerate (zero-size) query rectangles.
pub const MIN_QUERY_EXTENT: f64 = 1.0;

// --- Weapons ---

/// Default pre-fire threshold as a multiple of weapon range.
pub const DEFAULT_PREFIRE_RANGE_MUL: f64 = 2.0;

/// Default maximum projectile travel as a multiple of weapon range.
pub const DEFAULT_MAX_RANGE_MUL: f64 = 3.5;

/// Travel distance at which damage attenuation begins (multiple of range).
pub const ATTENUATION_START_RANGE_MUL: f64 = 1.5;

/// Maximum fraction of damage lost to travel attenuation.
pub const MAX_DAMAGE_DROP: f64 = 0.75;

/// Ceiling on auto-derived reload durations (seconds).
pub const MAX_DERIVED_RELOAD_SECS: f64 = 15.0;

/// Default projectile lifetime when the catalog gives none (seconds).
pub const DEFAULT_PROJECTILE_LIFETIME_SECS: f64 = 10.0;

// --- AI ---

/// Threat drained from a unit per full-second tick.
pub const THREAT_DECAY_PER_SECOND: f64 = 30.0;

/// Manual-override window refreshed by each player command (seconds).
pub const MANUAL_OVERRIDE_SECS: f64 = 120.0;

/// Ticks between stuck-detection displacement samples.
pub const STUCK_SAMPLE_INTERVAL_TICKS: u64 = 3;

/// Stuck samples tolerated before a recovery heading offset is applied.
pub const STUCK_COUNTER_LIMIT: u32 = 10;

/// Per-tick geometric decay applied to the recovery heading offset.
pub const STUCK_OFFSET_DECAY: f64 = 0.95;

/// Stuck counter decay per full-second tick.
pub const STUCK_COUNTER_DECAY: u32 = 2;

/// Fraction of weapon range inside which ranged units back away from melee.
pub const MELEE_RETREAT_RANGE_FRACTION: f64 = 0.85;

/// Melee units drop a target beyond this multiple of weapon range and
/// re-search at `MONSTER_RETARGET_SEARCH_MUL` times range.
pub const MONSTER_RETARGET_RANGE_MUL: f64 = 3.0;
pub const MONSTER_RETARGET_SEARCH_MUL: f64 = 5.0;

// --- Economy ---

/// Starting funds for the player faction.
pub const STARTING_MONEY: f64 = 6000.0;

/// Fighter experience curve: base cost plus per-level increment.
pub const LEVEL_EXP_BASE: f64 = 1000.0;
pub const LEVEL_EXP_PER_LEVEL: f64 = 350.0;

/// Fighter level at which predictive aim unlocks.
pub const PREAIM_UNLOCK_LEVEL: u32 = 7;
