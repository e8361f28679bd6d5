//! Property-based tests for the command validator and telemetry ingestion.

#[cfg(test)]
mod proptest_safety {
    use cangate_kernel::codec::{accel_payload, cruise_state_payload, ids, steer_payload};
    use cangate_kernel::ingest::{ingest, scale_measured_torque};
    use cangate_kernel::validator::validate;
    use cangate_kernel::{LimitConfig, SafetyState, SampleWindow};
    use cangate_types::{CanFrame, Violation};
    use proptest::prelude::*;

    const LIMITS: LimitConfig = LimitConfig::HYUNDAI;

    fn steer(torque: i16) -> CanFrame {
        CanFrame::new(ids::STEER_CMD, 0, &steer_payload(torque)).unwrap()
    }

    fn engaged() -> SafetyState {
        SafetyState {
            controls_allowed: true,
            cruise_engaged_last: true,
            ..SafetyState::default()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(500))]

        // --- Disengaged: only zero passes ---

        #[test]
        fn disengaged_torque_accepted_iff_zero(
            v in any::<i16>(),
            d in -102i32..=102,
            rt in -102i32..=102,
            now in any::<u32>(),
        ) {
            let mut state = SafetyState {
                desired_torque_last: d,
                rt_torque_last: rt,
                ..SafetyState::default()
            };
            let ok = validate(&steer(v), &mut state, &SampleWindow::new(), &LIMITS, now).is_ok();
            prop_assert_eq!(ok, v == 0);
            prop_assert_eq!(state.desired_torque_last, 0);
            prop_assert_eq!(state.rt_torque_last, 0);
            prop_assert_eq!(state.ts_last, now);
        }

        #[test]
        fn disengaged_accel_accepted_iff_zero(v in any::<i16>()) {
            let mut state = SafetyState::new();
            let f = CanFrame::new(ids::ACCEL_CMD, 0, &accel_payload(v)).unwrap();
            let ok = validate(&f, &mut state, &SampleWindow::new(), &LIMITS, 0).is_ok();
            prop_assert_eq!(ok, v == 0);
        }

        // --- Absolute limit ---

        #[test]
        fn over_max_torque_always_rejected(
            v in prop_oneof![i16::MIN..=-103i16, 103i16..=i16::MAX],
            measured in -2000i32..2000,
            d in -102i32..=102,
        ) {
            let mut state = SafetyState { desired_torque_last: d, rt_torque_last: i32::from(v), ..engaged() };
            let mut window = SampleWindow::new();
            window.push(measured);
            let result = validate(&steer(v), &mut state, &window, &LIMITS, 0);
            prop_assert!(
                matches!(result, Err(Violation::SteerLimits { faults, .. }) if faults.absolute),
                "expected absolute violation for {}", v
            );
        }

        // --- Rate vs measurement: either band permits ---

        #[test]
        fn rate_or_measurement_band_decides(
            v in -102i16..=102,
            d in -102i32..=102,
            measured in -300i32..300,
        ) {
            // Checkpoint at v isolates the rate check.
            let mut state = SafetyState { desired_torque_last: d, rt_torque_last: i32::from(v), ..engaged() };
            let mut window = SampleWindow::new();
            window.push(measured);

            let t = i32::from(v);
            let highest = (d + LIMITS.max_rate_up).max(measured + LIMITS.max_torque_error);
            let lowest = (d - LIMITS.max_rate_down).min(measured - LIMITS.max_torque_error);
            let expect_reject = t > highest || t < lowest;

            let result = validate(&steer(v), &mut state, &window, &LIMITS, 0);
            prop_assert_eq!(result.is_err(), expect_reject);
            if expect_reject {
                prop_assert_eq!(state.desired_torque_last, 0);
            } else {
                prop_assert_eq!(state.desired_torque_last, t);
            }
        }

        // --- Real-time delta ---

        #[test]
        fn real_time_delta_decides_when_other_checks_pass(
            v in -102i16..=102,
            rt in -150i32..=150,
        ) {
            let t = i32::from(v);
            // Measured == commanded and baseline == commanded: rate check passes.
            let mut state = SafetyState { desired_torque_last: t, rt_torque_last: rt, ..engaged() };
            let mut window = SampleWindow::new();
            window.push(t);

            let result = validate(&steer(v), &mut state, &window, &LIMITS, 0);
            prop_assert_eq!(result.is_err(), (t - rt).abs() > LIMITS.max_rt_delta);
        }

        // --- Checkpoint refresh tracks the commanded value ---

        #[test]
        fn checkpoint_advances_to_commanded_value(
            v in -50i16..=50,
            ts_last in any::<u32>(),
            extra in 1u32..1_000_000,
        ) {
            let t = i32::from(v);
            let mut state = SafetyState { desired_torque_last: t, ts_last, ..engaged() };
            let mut window = SampleWindow::new();
            window.push(t);
            let now = ts_last.wrapping_add(LIMITS.rt_interval_us).wrapping_add(extra);

            prop_assert!(validate(&steer(v), &mut state, &window, &LIMITS, now).is_ok());
            prop_assert_eq!(state.rt_torque_last, t);
            prop_assert_eq!(state.ts_last, now);
        }

        // --- Any rejected steering command leaves zero history ---

        #[test]
        fn rejected_steer_leaves_zero_history(
            v in any::<i16>(),
            d in -200i32..200,
            rt in -200i32..200,
            measured in -200i32..200,
            allowed in any::<bool>(),
        ) {
            let mut state = SafetyState {
                controls_allowed: allowed,
                desired_torque_last: d,
                rt_torque_last: rt,
                ..SafetyState::default()
            };
            let mut window = SampleWindow::new();
            window.push(measured);
            if validate(&steer(v), &mut state, &window, &LIMITS, 1).is_err() {
                prop_assert_eq!(state.desired_torque_last, 0);
                prop_assert_eq!(state.rt_torque_last, 0);
            }
        }

        // --- Deny list ---

        #[test]
        fn deny_list_rejected_on_primary_bus(
            idx in 0usize..2,
            payload in proptest::collection::vec(any::<u8>(), 0..=8),
        ) {
            let id = ids::DENIED[idx];
            let mut state = engaged();
            let f = CanFrame::new(id, 0, &payload).unwrap();
            prop_assert_eq!(
                validate(&f, &mut state, &SampleWindow::new(), &LIMITS, 0),
                Err(Violation::DenyListed { id })
            );
        }

        // --- Ingestion: engagement edges ---

        #[test]
        fn disengaged_frame_always_clears_controls(
            allowed in any::<bool>(),
            last in any::<bool>(),
        ) {
            let mut state = SafetyState { controls_allowed: allowed, cruise_engaged_last: last, ..SafetyState::default() };
            let f = CanFrame::new(ids::CRUISE_STATE, 0, &cruise_state_payload(false)).unwrap();
            ingest(&f, &mut state, &mut SampleWindow::new(), &LIMITS);
            prop_assert!(!state.controls_allowed);
        }

        #[test]
        fn measured_torque_is_never_zero(raw in any::<i16>(), factor in -200i32..=200) {
            prop_assert_ne!(scale_measured_torque(raw, factor), 0);
        }
    }
}
