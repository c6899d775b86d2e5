#[cfg(test)]
mod tests {
    use crate::commands::PlayerCommand;
    use crate::components::UnitId;
    use crate::constants::*;
    use crate::enums::*;
    use crate::events::CombatEvent;
    use crate::types::{Position, Rect, SimTime, Velocity};

    /// Verify all enums round-trip through serde_json.
    #[test]
    fn test_faction_serde() {
        let variants = vec![Faction::Black, Faction::Blue, Faction::Purple, Faction::Red];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: Faction = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_unit_role_serde() {
        let variants = vec![
            UnitRole::Soldier,
            UnitRole::Fighter,
            UnitRole::Turret,
            UnitRole::Monster,
            UnitRole::Dummy,
            UnitRole::Base,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: UnitRole = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_weapon_kind_serde() {
        let variants = vec![
            WeaponKind::AssaultRifle,
            WeaponKind::Pistol,
            WeaponKind::Shotgun,
            WeaponKind::SilencedSmg,
            WeaponKind::Marksman,
            WeaponKind::DragonBreath,
            WeaponKind::GrenadeLauncher,
            WeaponKind::Rpg7,
            WeaponKind::Railgun,
            WeaponKind::Melee,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: WeaponKind = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    /// Verify PlayerCommand round-trips through serde (tagged union).
    #[test]
    fn test_player_command_serde() {
        let commands = vec![
            PlayerCommand::Move {
                unit: UnitId(3),
                x: 100.0,
                y: 200.0,
            },
            PlayerCommand::Attack {
                unit: UnitId(3),
                target: UnitId(9),
            },
            PlayerCommand::StopMove { unit: UnitId(3) },
            PlayerCommand::ResumeAi { unit: UnitId(3) },
            PlayerCommand::ManualReload { unit: UnitId(3) },
            PlayerCommand::Pause,
            PlayerCommand::Resume,
        ];
        for cmd in commands {
            let json = serde_json::to_string(&cmd).unwrap();
            let back: PlayerCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(cmd, back);
        }
    }

    #[test]
    fn test_combat_event_serde() {
        let events = vec![
            CombatEvent::ShotFired {
                weapon: WeaponKind::Shotgun,
                x: 1.0,
                y: 2.0,
            },
            CombatEvent::UnitKilled {
                victim: UnitId(4),
                killer: Some(UnitId(1)),
                weapon: Some(WeaponKind::Rpg7),
            },
            CombatEvent::Explosion {
                kind: ProjectileKind::Grenade,
                x: 50.0,
                y: 60.0,
                radius: 75.0,
            },
        ];
        for ev in events {
            let json = serde_json::to_string(&ev).unwrap();
            let back: CombatEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(ev, back);
        }
    }

    #[test]
    fn test_spawn_region_keywords() {
        assert_eq!("left".parse::<SpawnRegion>().unwrap(), SpawnRegion::Left);
        assert_eq!("bottom".parse::<SpawnRegion>().unwrap(), SpawnRegion::Bottom);
        assert!("center".parse::<SpawnRegion>().is_err());
    }

    // ---- Geometry ----

    #[test]
    fn test_position_distance_and_angle() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert!((a.distance_sq_to(&b) - 25.0).abs() < 1e-12);

        let east = Position::new(10.0, 0.0);
        assert!((a.angle_to(&east)).abs() < 1e-12);
    }

    #[test]
    fn test_velocity_from_angle() {
        let v = Velocity::from_angle(std::f64::consts::FRAC_PI_2, 2.0);
        assert!(v.dx.abs() < 1e-12);
        assert!((v.dy - 2.0).abs() < 1e-12);
        assert!((v.speed() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rect_centered_and_intersects() {
        let r = Rect::centered(100.0, 100.0, 50.0, 50.0);
        assert!((r.x - 50.0).abs() < 1e-12);
        assert!((r.width - 100.0).abs() < 1e-12);
        assert!(r.contains_point(100.0, 100.0));
        assert!(r.contains_point(50.0, 50.0));
        assert!(!r.contains_point(200.0, 100.0));

        let other = Rect::new(140.0, 140.0, 100.0, 100.0);
        assert!(r.intersects(&other));
        let far = Rect::new(500.0, 500.0, 10.0, 10.0);
        assert!(!r.intersects(&far));
    }

    #[test]
    fn test_sim_time_advance() {
        let mut t = SimTime::default();
        for _ in 0..TICK_RATE {
            t.advance();
        }
        assert_eq!(t.tick, TICK_RATE as u64);
        assert!((t.elapsed_secs - 1.0).abs() < 1e-9);
    }
}
