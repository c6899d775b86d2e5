//! The simulation engine.
//!
//! `SimulationEngine` owns the hecs ECS world, the per-tick spatial
//! indexes, the seeded RNG, and the reporting services. It processes
//! queued player commands, runs the tick pipeline, and produces
//! `WorldSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::{HashMap, VecDeque};
use std::time::Instant;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use skirmish_core::commands::PlayerCommand;
use skirmish_core::components::*;
use skirmish_core::constants::*;
use skirmish_core::enums::{Faction, GamePhase, LifeState};
use skirmish_core::events::CombatEvent;
use skirmish_core::state::WorldSnapshot;
use skirmish_core::types::{Position, Rect, SimTime, Velocity};

use crate::damage::{CombatCtx, ScoreState};
use crate::error::SimError;
use crate::report::{PerfCounters, WeaponStatBook};
use crate::spatial::Quadtree;
use crate::systems;
use crate::weapons;
use crate::world_setup::UnitBlueprint;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Player faction starting funds.
    pub starting_money: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            starting_money: STARTING_MONEY,
        }
    }
}

/// Externally spawned projectile description (spawn interface).
pub struct ProjectileBlueprint {
    pub kind: skirmish_core::enums::ProjectileKind,
    pub faction: Faction,
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub speed: f64,
    pub damage: f64,
    pub size: f64,
    pub pierce: u32,
    pub lifetime_secs: f64,
    pub explosion: Option<ExplosionSpec>,
    pub source_unit: Option<UnitId>,
    pub source_weapon: Option<skirmish_core::enums::WeaponKind>,
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    rng: ChaCha8Rng,
    next_unit_id: u32,
    /// Handle resolution for `UnitId` cross-references.
    lookup: HashMap<UnitId, Entity>,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<CombatEvent>,
    unit_index: Quadtree,
    projectile_index: Quadtree,
    book: WeaponStatBook,
    perf: PerfCounters,
    score: ScoreState,
    /// Cycles 1..=TICK_RATE; drives the half/full-second cadences.
    slow_counter: u32,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let bounds = Rect::new(0.0, 0.0, MAP_WIDTH, MAP_HEIGHT);
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            next_unit_id: 0,
            lookup: HashMap::new(),
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            unit_index: Quadtree::new(bounds),
            projectile_index: Quadtree::new(bounds),
            book: WeaponStatBook::new(),
            perf: PerfCounters::default(),
            score: ScoreState {
                money: config.starting_money,
                ..Default::default()
            },
            slow_counter: 0,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems();
            self.time.advance();
        }

        let started = Instant::now();
        let events = std::mem::take(&mut self.events);
        let snapshot = systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.book,
            &self.perf,
            &self.score,
            events,
        );
        // Recorded for the next tick's snapshot; the current one cannot
        // contain its own build time.
        self.perf.snapshot_micros = started.elapsed().as_micros() as u64;
        snapshot
    }

    // --- Spawn interface ---

    /// Validated unit insertion. Rejects malformed blueprints at the
    /// boundary instead of coercing them.
    pub fn insert_unit(&mut self, bp: UnitBlueprint) -> Result<UnitId, SimError> {
        if !bp.x.is_finite() || !bp.y.is_finite() {
            return Err(SimError::InvalidSpawn("non-finite position".into()));
        }
        if !(bp.max_hp.is_finite() && bp.max_hp > 0.0) {
            return Err(SimError::InvalidSpawn("max hp must be positive".into()));
        }
        if !(bp.speed.is_finite() && bp.speed >= 0.0) {
            return Err(SimError::InvalidSpawn("speed must be non-negative".into()));
        }
        if !(bp.size.is_finite() && bp.size > 0.0) {
            return Err(SimError::InvalidSpawn("size must be positive".into()));
        }
        if !bp.weapon.damage.is_finite() || bp.weapon.damage < 0.0 {
            return Err(SimError::InvalidSpawn("weapon damage out of range".into()));
        }

        let profile = skirmish_ai::profiles::get_profile(bp.role);
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;

        let x = bp.x.clamp(0.0, MAP_WIDTH);
        let y = bp.y.clamp(0.0, MAP_HEIGHT);
        let threat_range = bp.weapon.range * profile.threat_range_mul;

        let ai = CombatAi {
            target: None,
            threat: 0.0,
            dodge_chance: bp.dodge_chance.unwrap_or(profile.dodge_chance),
            dodge_moving: false,
            dodge_left: true,
            threat_chance: bp.threat_chance.unwrap_or(profile.threat_chance),
            threat_range,
            retarget_search_mul: profile.retarget_search_mul,
            can_preaim: false,
        };

        let speed = bp.speed;
        let entity = self.world.spawn((
            Unit,
            id,
            bp.role,
            bp.faction,
            Position::new(x, y),
            Vitals::full(bp.max_hp),
            Body {
                size: bp.size,
                heavy: profile.heavy,
            },
            Mobility::new(speed),
            ai,
            ManualOverride::default(),
            EffectStack::default(),
            bp.weapon,
        ));

        if profile.hp_regen > 0.0 {
            let _ = self.world.insert_one(
                entity,
                Regenerates {
                    hp_per_second: profile.hp_regen,
                },
            );
        }
        if profile.levels {
            let _ = self.world.insert_one(entity, Levels::default());
        }
        if profile.immobile {
            let _ = self.world.insert_one(entity, Immobile);
        }
        if profile.melee {
            let _ = self
                .world
                .insert_one(entity, StuckTracker::new(Position::new(x, y), speed));
            let _ = self.world.insert_one(
                entity,
                Frenzy {
                    speed_up_per_second: 0.07,
                },
            );
        }
        if let Some(value) = bp.fixed_value {
            let _ = self.world.insert_one(entity, FixedValue(value));
        }

        self.lookup.insert(id, entity);
        self.events.push(CombatEvent::UnitSpawned { unit: id, x, y });
        Ok(id)
    }

    /// Validated projectile insertion (spawn interface).
    pub fn insert_projectile(&mut self, bp: ProjectileBlueprint) -> Result<(), SimError> {
        if !bp.x.is_finite() || !bp.y.is_finite() || !bp.angle.is_finite() {
            return Err(SimError::InvalidSpawn("non-finite projectile pose".into()));
        }
        if !(bp.damage.is_finite() && bp.damage >= 0.0) {
            return Err(SimError::InvalidSpawn("damage must be non-negative".into()));
        }
        if !(bp.speed.is_finite() && bp.speed >= 0.0) {
            return Err(SimError::InvalidSpawn("speed must be non-negative".into()));
        }

        let state = ProjectileState {
            kind: bp.kind,
            faction: bp.faction,
            damage: bp.damage,
            size: bp.size,
            pierce: bp.pierce,
            expires_at: self.time.elapsed_secs + bp.lifetime_secs,
            accel: Velocity::default(),
            explosion: bp.explosion,
            tracer: None,
            threat_level: 1.0,
            source_unit: bp.source_unit,
            source_weapon: bp.source_weapon,
            prev_pos: Position::new(bp.x, bp.y),
            travel: 0.0,
            attenuation: 0.0,
            attenuation_start: 0.0,
            attenuation_end: 0.0,
            damaged: Default::default(),
            life: LifeState::Alive,
        };

        self.world.spawn((
            Projectile,
            Position::new(bp.x, bp.y),
            Velocity::from_angle(bp.angle, bp.speed),
            state,
        ));
        Ok(())
    }

    // --- Query interface ---

    /// Candidate units for an arbitrary rectangle (drag selection). The
    /// caller performs exact containment filtering.
    pub fn units_in_rect(&self, rect: Rect) -> Vec<UnitId> {
        self.unit_index
            .retrieve(rect)
            .into_iter()
            .filter_map(|entity| self.world.get::<&UnitId>(entity).ok().map(|id| *id))
            .collect()
    }

    // --- Accessors ---

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn money(&self) -> f64 {
        self.score.money
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    /// The engine RNG, shared with spawn factories so a seed fixes the
    /// whole battle.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Resolve a unit handle to its live entity, if still present.
    pub fn resolve(&self, id: UnitId) -> Option<Entity> {
        self.lookup.get(&id).copied()
    }

    // --- Internals ---

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        let now = self.time.elapsed_secs;
        match command {
            PlayerCommand::Move { unit, x, y } => {
                let Some(entity) = self.resolve(unit) else {
                    log::warn!("move command for unknown unit {unit:?}");
                    return;
                };
                if let Ok(mut ovr) = self.world.get::<&mut ManualOverride>(entity) {
                    ovr.move_dest = Some(Position::new(
                        x.clamp(0.0, MAP_WIDTH),
                        y.clamp(0.0, MAP_HEIGHT),
                    ));
                    ovr.until_secs = now + MANUAL_OVERRIDE_SECS;
                }
            }
            PlayerCommand::Attack { unit, target } => {
                let Some(entity) = self.resolve(unit) else {
                    log::warn!("attack command for unknown unit {unit:?}");
                    return;
                };
                if let Ok(mut ovr) = self.world.get::<&mut ManualOverride>(entity) {
                    ovr.forced_target = Some(target);
                    ovr.until_secs = now + MANUAL_OVERRIDE_SECS;
                }
            }
            PlayerCommand::StopMove { unit } => {
                let Some(entity) = self.resolve(unit) else {
                    log::warn!("stop command for unknown unit {unit:?}");
                    return;
                };
                if let Ok(mut ovr) = self.world.get::<&mut ManualOverride>(entity) {
                    ovr.move_dest = None;
                    ovr.until_secs = now + MANUAL_OVERRIDE_SECS;
                }
            }
            PlayerCommand::ResumeAi { unit } => {
                let Some(entity) = self.resolve(unit) else {
                    log::warn!("resume-ai command for unknown unit {unit:?}");
                    return;
                };
                if let Ok(mut ovr) = self.world.get::<&mut ManualOverride>(entity) {
                    *ovr = ManualOverride::default();
                }
                if let Ok(mut ai) = self.world.get::<&mut CombatAi>(entity) {
                    ai.target = None;
                }
            }
            PlayerCommand::ManualReload { unit } => {
                let Some(entity) = self.resolve(unit) else {
                    log::warn!("reload command for unknown unit {unit:?}");
                    return;
                };
                let started = self
                    .world
                    .get::<&mut Weapon>(entity)
                    .map(|mut w| weapons::start_manual_reload(&mut *w, now))
                    .unwrap_or(false);
                if started {
                    if let Ok(weapon) = self.world.get::<&Weapon>(entity) {
                        self.events.push(CombatEvent::ReloadStarted {
                            unit,
                            duration_secs: weapon.reload_done_at - now,
                        });
                    }
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
        }
    }

    /// Run the full tick pipeline in order: index rebuild, unit updates,
    /// projectile updates, slow-cadence logic, collision resolution, cull.
    fn run_systems(&mut self) {
        self.slow_counter = if self.slow_counter >= TICK_RATE {
            1
        } else {
            self.slow_counter + 1
        };
        let full_second = self.slow_counter == TICK_RATE;
        let half_second = self.slow_counter % (TICK_RATE / 2) == 0;
        let now = self.time.elapsed_secs;

        self.rebuild_indexes();

        // Unit updates: target upkeep, acquisition, movement, weapon fire.
        let started = Instant::now();
        systems::targeting::refresh(&mut self.world, &self.lookup, now);
        if half_second {
            systems::targeting::acquire(&mut self.world, &self.unit_index, &mut self.rng);
        }
        systems::movement::run_units(&mut self.world, &mut self.rng, self.time.tick, now, half_second);
        {
            let mut ctx = CombatCtx {
                lookup: &self.lookup,
                book: &mut self.book,
                events: &mut self.events,
                score: &mut self.score,
            };
            systems::combat::run(&mut self.world, &mut ctx, &mut self.rng, now);
            self.perf.unit_update_micros = started.elapsed().as_micros() as u64;

            let started = Instant::now();
            systems::movement::run_projectiles(&mut self.world, &mut ctx, &self.unit_index, now);
            systems::effects::run(&mut self.world, &mut ctx, now, full_second);
            self.perf.projectile_update_micros = started.elapsed().as_micros() as u64;

            if full_second {
                systems::upkeep::run(&mut self.world, &self.unit_index, &self.lookup, &mut self.rng);
            }

            let started = Instant::now();
            systems::collision::run(
                &mut self.world,
                &mut ctx,
                &self.unit_index,
                &self.projectile_index,
                now,
            );
            self.perf.collision_micros = started.elapsed().as_micros() as u64;
        }

        systems::cleanup::run(&mut self.world, &mut self.lookup, &mut self.despawn_buffer);
    }

    /// Clear and repopulate both spatial indexes from the live populations.
    /// Happens-before any retrieval within the tick.
    fn rebuild_indexes(&mut self) {
        self.unit_index.clear();
        self.projectile_index.clear();

        let mut unit_count = 0;
        for (entity, (_unit, pos, body)) in self.world.query::<(&Unit, &Position, &Body)>().iter() {
            let half = body.size * 1.1;
            self.unit_index
                .insert(entity, Rect::centered(pos.x, pos.y, half, half));
            unit_count += 1;
        }

        let mut projectile_count = 0;
        for (entity, (_proj, pos, vel, state)) in self
            .world
            .query::<(&Projectile, &Position, &Velocity, &ProjectileState)>()
            .iter()
        {
            let half = match state.explosion {
                Some(spec) => spec.radius * 1.05,
                None => state.size * 1.05,
            };
            // Index the full motion span of the coming tick, so the swept
            // narrow phase is never starved of fast-moving candidates.
            let min_x = pos.x.min(pos.x + vel.dx) - half;
            let min_y = pos.y.min(pos.y + vel.dy) - half;
            let rect = Rect::new(
                min_x,
                min_y,
                vel.dx.abs() + half * 2.0,
                vel.dy.abs() + half * 2.0,
            );
            self.projectile_index.insert(entity, rect);
            projectile_count += 1;
        }

        self.perf.unit_count = unit_count;
        self.perf.projectile_count = projectile_count;
    }
}
