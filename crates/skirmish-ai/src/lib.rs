//! Unit behavior AI for SKIRMISH.
//!
//! Implements target selection, the movement decision ladder, dodge-strafe
//! state, and stuck recovery as pure functions over plain data. Randomness
//! is supplied by callers as pre-drawn rolls, so every decision here is
//! deterministic and directly testable.

pub mod fsm;
pub mod profiles;

pub use skirmish_core as core;

#[cfg(test)]
mod tests;
