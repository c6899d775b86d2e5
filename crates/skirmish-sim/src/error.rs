//! Engine boundary errors.

use thiserror::Error;

/// Errors surfaced at the engine's public boundary. Everything internal to
/// a tick degrades gracefully instead (logged no-ops and fallback math).
#[derive(Debug, Error)]
pub enum SimError {
    #[error("{0} is not a valid weapon name")]
    UnknownWeapon(String),

    #[error("unknown spawn region keyword: {0}")]
    UnknownRegion(String),

    #[error("invalid spawn request: {0}")]
    InvalidSpawn(String),
}
