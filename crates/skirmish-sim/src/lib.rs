//! Simulation engine for SKIRMISH.
//!
//! Owns the hecs ECS world, rebuilds the quadtree spatial indexes every
//! tick, runs the combat systems at a fixed tick rate, and produces
//! `WorldSnapshot`s for the rendering and control collaborators.

pub mod ballistics;
pub mod damage;
pub mod effects;
pub mod engine;
pub mod error;
pub mod report;
pub mod spatial;
pub mod systems;
pub mod weapons;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use skirmish_core as core;

#[cfg(test)]
mod tests;
