use harness_core::prelude::*;
use harness_core::{allowed_transitions, validate_transition, ExecutionMode, TestId};
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = TestStatus> {
    prop_oneof![
        Just(TestStatus::NotRun),
        Just(TestStatus::Running),
        Just(TestStatus::Passed),
        Just(TestStatus::Failed),
        Just(TestStatus::Skipped),
    ]
}

proptest! {
    #[test]
    fn prop_transitions_match_allowed_list(from in any_status(), to in any_status()) {
        let res = validate_transition(from, to);
        let allowed = allowed_transitions(from);

        if res.is_ok() {
            prop_assert!(allowed.contains(&to));
        } else {
            prop_assert!(!allowed.contains(&to));
        }
    }

    #[test]
    fn prop_terminal_states_have_no_exits(from in any_status()) {
        prop_assert_eq!(from.is_terminal(), allowed_transitions(from).is_empty());
    }

    #[test]
    fn prop_nan_never_equal(x in any::<f64>(), tolerance in 0.0..1e6_f64, ulps in 0u32..1000) {
        for policy in [
            FloatPolicy::Exact,
            FloatPolicy::Ulps(ulps),
            FloatPolicy::tolerance(tolerance).unwrap(),
        ] {
            prop_assert!(!policy.equal(f64::NAN, x));
            prop_assert!(!policy.equal(x, f64::NAN));
        }
    }

    #[test]
    fn prop_infinity_never_equals_finite(x in -1e300..1e300_f64, tolerance in 0.0..f64::MAX) {
        let policy = FloatPolicy::tolerance(tolerance).unwrap();
        prop_assert!(!policy.equal(f64::INFINITY, x));
        prop_assert!(!policy.equal(x, f64::NEG_INFINITY));
        prop_assert!(!FloatPolicy::Exact.equal(f64::INFINITY, x));
    }

    #[test]
    fn prop_finite_values_equal_themselves(x in -1e300..1e300_f64) {
        prop_assert!(FloatPolicy::Exact.equal(x, x));
        prop_assert!(FloatPolicy::ALMOST_EQ.equal(x, x));
        prop_assert!(FloatPolicy::tolerance(0.0).unwrap().equal(x, x));
    }

    #[test]
    fn prop_literal_filter_selects_exactly_one(
        fixture in "[A-Za-z][A-Za-z0-9_]{0,8}",
        test in "[A-Za-z][A-Za-z0-9_]{0,8}",
        other in "[A-Za-z][A-Za-z0-9_]{0,8}",
    ) {
        let filter = TestFilter::parse(&format!("{fixture}.{test}")).unwrap();
        prop_assert!(filter.matches(&TestId::new(fixture.as_str(), test.as_str()).unwrap()));
        if other != test {
            prop_assert!(!filter.matches(&TestId::new(fixture.as_str(), other.as_str()).unwrap()));
        }
    }

    #[test]
    fn prop_every_valid_name_selects_itself(
        fixture in "[!-~]{1,8}",
        test in "[!-~]{1,8}",
    ) {
        let id = TestId::new(fixture.as_str(), test.as_str());
        prop_assume!(id.is_ok());
        let id = id.unwrap();

        let filter = TestFilter::parse(&id.full_name()).unwrap();
        prop_assert!(filter.matches(&id));
    }

    #[test]
    fn prop_summary_order_independent_of_workers(
        outcomes in proptest::collection::vec(0u8..3, 1..24),
        workers in 1usize..6,
    ) {
        let mut builder = Registry::builder();
        for (i, outcome) in outcomes.iter().copied().enumerate() {
            let name = format!("t{i}");
            builder
                .register("P", &name, || NoFixture, move |_, ctx| {
                    ctx.expect_true(outcome != 1, "outcome");
                    Ok(())
                }, outcome == 2)
                .unwrap();
        }
        let registry = builder.build();

        let sequential = Runner::default().run_all(&registry);
        let parallel = Runner::new(RunnerConfig::new().with_mode(ExecutionMode::from_workers(workers)))
            .run_all(&registry);

        let names = |s: &RunSummary| s.records().iter().map(|r| (r.id().to_string(), r.status())).collect::<Vec<_>>();
        prop_assert_eq!(names(&sequential), names(&parallel));
        prop_assert_eq!(parallel.total(), outcomes.len());
        prop_assert_eq!(parallel.skipped(), outcomes.iter().filter(|o| **o == 2).count());
        prop_assert_eq!(parallel.failed(), outcomes.iter().filter(|o| **o == 1).count());
    }
}
