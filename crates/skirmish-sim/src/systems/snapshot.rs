//! Snapshot system: queries the ECS world and builds a complete
//! `WorldSnapshot`. Read-only; it never modifies the world.

use hecs::World;

use skirmish_core::components::*;
use skirmish_core::enums::*;
use skirmish_core::events::CombatEvent;
use skirmish_core::state::*;
use skirmish_core::types::{Position, SimTime, Velocity};

use crate::damage::{self, ScoreState};
use crate::report::{PerfCounters, WeaponStatBook};
use crate::weapons;

/// Build a complete snapshot of the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    book: &WeaponStatBook,
    perf: &PerfCounters,
    score: &ScoreState,
    events: Vec<CombatEvent>,
) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        phase,
        units: build_units(world, time.elapsed_secs),
        projectiles: build_projectiles(world),
        weapon_stats: book.report(),
        perf: perf.view(),
        score: ScoreView {
            money: score.money,
            units_lost: score.units_lost,
            enemies_killed: score.enemies_killed,
        },
        events,
    }
}

fn build_units(world: &World, now: f64) -> Vec<UnitView> {
    let mut units: Vec<UnitView> = world
        .query::<(
            &Unit,
            &UnitId,
            &UnitRole,
            &Faction,
            &Position,
            &Body,
            &Vitals,
            &CombatAi,
            &ManualOverride,
            &Weapon,
        )>()
        .iter()
        .map(
            |(entity, (_unit, id, role, faction, pos, body, vitals, ai, ovr, weapon))| UnitView {
                id: *id,
                role: *role,
                faction: *faction,
                x: pos.x,
                y: pos.y,
                size: body.size,
                hp: vitals.hp,
                max_hp: vitals.max_hp,
                threat: ai.threat,
                value: damage::unit_value(world, entity),
                target: ai.target,
                manual_mode: ovr.is_active(now),
                level: world.get::<&Levels>(entity).ok().map(|l| l.level),
                weapon: WeaponView {
                    kind: Some(weapon.kind),
                    rounds: weapon.rounds,
                    magazine: weapon.magazine,
                    reloading: weapon.reloading,
                    reload_remaining_secs: weapons::reload_remaining(weapon, now),
                    efficiency: if weapon.stats.damage_estimated > 0.0 {
                        weapon.stats.damage_dealt / weapon.stats.damage_estimated
                    } else {
                        0.0
                    },
                },
            },
        )
        .collect();

    units.sort_by_key(|u| u.id);
    units
}

fn build_projectiles(world: &World) -> Vec<ProjectileView> {
    world
        .query::<(&Projectile, &Position, &Velocity, &ProjectileState)>()
        .iter()
        .map(|(_entity, (_proj, pos, vel, state))| ProjectileView {
            kind: state.kind,
            faction: state.faction,
            x: pos.x,
            y: pos.y,
            size: state.size,
            heading: vel.dy.atan2(vel.dx),
            tracer: state.tracer,
        })
        .collect()
}
