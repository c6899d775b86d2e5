//! Fixed-timestep driver for the simulation engine.
//!
//! The engine only advances when accumulated wall-clock time passes the
//! logical frame duration; scheduling is against an absolute next-tick
//! deadline so fractional remainders carry over instead of resetting,
//! with a reset branch when the loop falls too far behind.

use std::time::{Duration, Instant};

use skirmish_core::constants::TICK_RATE;
use skirmish_core::state::WorldSnapshot;
use skirmish_sim::SimulationEngine;

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Loop pacing configuration.
pub struct LoopConfig {
    /// Simulation speed multiplier (1.0 = real time).
    pub time_scale: f64,
    /// Stop after this many ticks.
    pub max_ticks: u64,
    /// Sleep between ticks to hold real-time pacing; off = run flat out.
    pub realtime: bool,
}

/// Run the engine until `max_ticks`, handing each snapshot to the caller.
pub fn run(
    engine: &mut SimulationEngine,
    config: &LoopConfig,
    mut on_snapshot: impl FnMut(&WorldSnapshot),
) {
    let effective_tick = if config.time_scale > 0.001 {
        TICK_DURATION.div_f64(config.time_scale)
    } else {
        TICK_DURATION
    };

    let mut next_tick_time = Instant::now();
    for _ in 0..config.max_ticks {
        let snapshot = engine.tick();
        on_snapshot(&snapshot);

        if !config.realtime {
            continue;
        }

        next_tick_time += effective_tick;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick * 2 {
            // Too far behind; reset to avoid a catch-up spiral.
            next_tick_time = now;
        }
    }
}
