#[cfg(test)]
mod tests {
    use skirmish_core::components::{StuckTracker, UnitId};
    use skirmish_core::constants::*;
    use skirmish_core::enums::UnitRole;
    use skirmish_core::types::Position;

    use crate::fsm::*;
    use crate::profiles::get_profile;

    fn candidate(id: u32, distance: f64, threat: f64) -> TargetCandidate {
        TargetCandidate {
            id: UnitId(id),
            position: Position::new(distance, 0.0),
            distance,
            threat,
        }
    }

    // ---- Target selection ----

    #[test]
    fn test_select_nearest_when_roll_misses() {
        let candidates = vec![
            candidate(1, 300.0, 500.0),
            candidate(2, 100.0, 0.0),
            candidate(3, 200.0, 50.0),
        ];
        // Roll above threat_chance: nearest wins regardless of threat.
        let picked = select_target(&candidates, 0.25, 1000.0, 0.9);
        assert_eq!(picked, Some(UnitId(2)));
    }

    #[test]
    fn test_select_dangerous_when_roll_hits() {
        let candidates = vec![
            candidate(1, 300.0, 500.0),
            candidate(2, 100.0, 0.0),
            candidate(3, 200.0, 50.0),
        ];
        let picked = select_target(&candidates, 0.25, 1000.0, 0.1);
        assert_eq!(picked, Some(UnitId(1)));
    }

    #[test]
    fn test_dangerous_requires_positive_threat_in_range() {
        // Highest-threat candidate is outside the threat radius; the other
        // has zero threat, so the search falls back to nearest.
        let candidates = vec![candidate(1, 900.0, 500.0), candidate(2, 100.0, 0.0)];
        let picked = select_target(&candidates, 0.25, 500.0, 0.1);
        assert_eq!(picked, Some(UnitId(2)));
    }

    #[test]
    fn test_select_empty_candidates() {
        assert_eq!(select_target(&[], 0.25, 500.0, 0.1), None);
    }

    #[test]
    fn test_nearest_tie_first_encountered_wins() {
        let candidates = vec![candidate(7, 100.0, 0.0), candidate(8, 100.0, 0.0)];
        assert_eq!(nearest(&candidates), Some(UnitId(7)));
    }

    // ---- Movement ladder ----

    fn base_ctx() -> MovementContext {
        MovementContext {
            position: Position::new(0.0, 0.0),
            weapon_range: 600.0,
            override_dest: None,
            manual_mode: false,
            forced_target: None,
            target: None,
            target_distance: 0.0,
            target_is_melee: false,
            dodge_moving: false,
            dodge_left: true,
        }
    }

    #[test]
    fn test_override_dest_takes_precedence() {
        let mut ctx = base_ctx();
        ctx.override_dest = Some(Position::new(50.0, 60.0));
        ctx.target = Some(Position::new(2000.0, 0.0));
        ctx.target_distance = 2000.0;
        assert_eq!(
            evaluate_movement(&ctx),
            MovementDecision::MoveTo { x: 50.0, y: 60.0 }
        );
    }

    #[test]
    fn test_manual_mode_holds_without_forced_target() {
        let mut ctx = base_ctx();
        ctx.manual_mode = true;
        ctx.target = Some(Position::new(2000.0, 0.0));
        ctx.target_distance = 2000.0;
        assert_eq!(evaluate_movement(&ctx), MovementDecision::Hold);
    }

    #[test]
    fn test_manual_mode_closes_on_out_of_range_forced_target() {
        let mut ctx = base_ctx();
        ctx.manual_mode = true;
        ctx.forced_target = Some(Position::new(900.0, 0.0));
        ctx.target = Some(Position::new(900.0, 0.0));
        ctx.target_distance = 900.0;
        assert_eq!(
            evaluate_movement(&ctx),
            MovementDecision::MoveTo { x: 900.0, y: 0.0 }
        );

        // In range: stand and shoot, no strafing.
        ctx.target_distance = 300.0;
        ctx.dodge_moving = true;
        assert_eq!(evaluate_movement(&ctx), MovementDecision::Hold);
    }

    #[test]
    fn test_ai_approaches_when_out_of_range() {
        let mut ctx = base_ctx();
        ctx.target = Some(Position::new(900.0, 0.0));
        ctx.target_distance = 900.0;
        assert_eq!(
            evaluate_movement(&ctx),
            MovementDecision::MoveTo { x: 900.0, y: 0.0 }
        );
    }

    #[test]
    fn test_ai_retreats_from_close_melee() {
        let mut ctx = base_ctx();
        ctx.target = Some(Position::new(100.0, 0.0));
        ctx.target_distance = 100.0;
        ctx.target_is_melee = true;
        assert_eq!(
            evaluate_movement(&ctx),
            MovementDecision::MoveAwayFrom { x: 100.0, y: 0.0 }
        );
    }

    #[test]
    fn test_ai_strafes_in_range() {
        let mut ctx = base_ctx();
        ctx.target = Some(Position::new(500.0, 0.0));
        ctx.target_distance = 500.0;
        ctx.dodge_moving = true;
        ctx.dodge_left = false;
        assert_eq!(
            evaluate_movement(&ctx),
            MovementDecision::Strafe {
                x: 500.0,
                y: 0.0,
                left: false
            }
        );
    }

    #[test]
    fn test_melee_pursuit_applies_offset() {
        let decision = evaluate_melee_movement(
            Position::new(0.0, 0.0),
            35.0,
            Some(Position::new(100.0, 0.0)),
            100.0,
            0.5,
        );
        match decision {
            MovementDecision::MoveHeading { angle } => assert!((angle - 0.5).abs() < 1e-12),
            other => panic!("expected MoveHeading, got {other:?}"),
        }
    }

    #[test]
    fn test_melee_holds_in_range() {
        let decision = evaluate_melee_movement(
            Position::new(0.0, 0.0),
            35.0,
            Some(Position::new(20.0, 0.0)),
            20.0,
            0.0,
        );
        assert_eq!(decision, MovementDecision::Hold);
    }

    // ---- Dodge state ----

    #[test]
    fn test_dodge_start_flips_direction() {
        let (moving, left) = update_dodge(false, true, 0.3, 0.1, 0.9);
        assert!(moving);
        assert!(!left);
    }

    #[test]
    fn test_dodge_stop_keeps_direction() {
        let (moving, left) = update_dodge(true, false, 0.3, 0.1, 0.05);
        assert!(!moving);
        assert!(!left);
    }

    #[test]
    fn test_dodge_unchanged_when_roll_misses() {
        let (moving, left) = update_dodge(true, true, 0.3, 0.9, 0.0);
        assert!(moving);
        assert!(left);
    }

    // ---- Stuck recovery ----

    #[test]
    fn test_stuck_counter_accumulates_and_recovers() {
        let mut tracker = StuckTracker::new(Position::new(0.0, 0.0), 2.0);

        // Unit barely moves: counter climbs past the limit.
        for _ in 0..=STUCK_COUNTER_LIMIT {
            sample_stuck(&mut tracker, Position::new(0.0, 0.0));
        }
        assert!(tracker.counter > STUCK_COUNTER_LIMIT);

        assert!(try_stuck_recovery(&mut tracker, 1.0));
        assert_eq!(tracker.counter, 0);
        assert!(tracker.offset_angle.abs() <= std::f64::consts::FRAC_PI_2);
        assert!(tracker.offset_angle != 0.0);

        // Offset decays geometrically.
        let before = tracker.offset_angle;
        decay_stuck_offset(&mut tracker);
        assert!((tracker.offset_angle - before * STUCK_OFFSET_DECAY).abs() < 1e-12);
    }

    #[test]
    fn test_stuck_counter_resets_on_real_movement() {
        let mut tracker = StuckTracker::new(Position::new(0.0, 0.0), 2.0);
        sample_stuck(&mut tracker, Position::new(0.0, 0.0));
        assert_eq!(tracker.counter, 1);
        sample_stuck(&mut tracker, Position::new(10.0, 0.0));
        assert_eq!(tracker.counter, 0);
    }

    #[test]
    fn test_stuck_counter_decays_over_time() {
        let mut tracker = StuckTracker::new(Position::new(0.0, 0.0), 2.0);
        tracker.counter = 5;
        decay_stuck_counter(&mut tracker);
        assert_eq!(tracker.counter, 3);
        tracker.counter = 1;
        decay_stuck_counter(&mut tracker);
        assert_eq!(tracker.counter, 0);
    }

    #[test]
    fn test_should_retarget_beyond_three_ranges() {
        assert!(!should_retarget(100.0, 35.0));
        assert!(should_retarget(106.0, 35.0));
    }

    // ---- Profiles ----

    #[test]
    fn test_profiles_match_roles() {
        let monster = get_profile(UnitRole::Monster);
        assert!(monster.melee);
        assert_eq!(monster.dodge_chance, 0.0);
        assert_eq!(monster.threat_range_mul, 10.0);

        let fighter = get_profile(UnitRole::Fighter);
        assert!(fighter.levels);
        assert!(fighter.hp_regen > 0.0);
        assert!(!fighter.melee);

        let base = get_profile(UnitRole::Base);
        assert!(base.immobile);
        assert!(base.heavy);
        assert!(!base.fights);

        let turret = get_profile(UnitRole::Turret);
        assert!(turret.immobile);
        assert!(turret.fights);
    }
}
