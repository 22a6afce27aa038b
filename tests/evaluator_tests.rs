mod common;

use cardforge::config::Config;
use common::{combo, mixed_cards, session, EXAMPLE_BASELINE};
use rstest::rstest;

#[test]
fn test_single_card_repeated_eight_times() {
    let s = session(
        vec![vec![1, 1, 0, 0, 0, 0, 0, 0]],
        &EXAMPLE_BASELINE,
        Config::default(),
    );
    let e = s.evaluator().evaluate(&combo(&[0; 8], s.evaluator()));

    assert!(e.valid);
    assert_eq!(e.final_state.as_slice(), &[38, 38, 0, 0, 2, 0, 0, 0]);
    assert_eq!(e.net_gain.as_slice(), &[8, 8, 0, 0, 0, 0, 0, 0]);
    assert_eq!(e.score, 16);
}

#[test]
fn test_step_trace_starts_at_baseline() {
    let s = session(mixed_cards(), &EXAMPLE_BASELINE, Config::default());
    let ids = [0, 1, 2, 3, 4, 5, 6, 7];
    let e = s.evaluator().evaluate(&combo(&ids, s.evaluator()));

    assert_eq!(e.step_trace.len(), 9);
    assert_eq!(e.step_trace[0].as_slice(), &EXAMPLE_BASELINE);
    assert_eq!(e.step_trace[8], e.final_state);
    // Each step adds exactly one card.
    for (i, &id) in ids.iter().enumerate() {
        let delta = &s.catalog().card(id).delta;
        for d in 0..8 {
            assert_eq!(e.step_trace[i + 1][d], e.step_trace[i][d] + delta[d]);
        }
    }
}

#[test]
fn test_net_gain_and_score_invariants() {
    let s = session(mixed_cards(), &EXAMPLE_BASELINE, Config::default());
    let e = s
        .evaluator()
        .evaluate(&combo(&[0, 0, 2, 3, 5, 7, 8, 1], s.evaluator()));

    for d in 0..8 {
        assert_eq!(e.net_gain[d], e.final_state[d] - EXAMPLE_BASELINE[d]);
    }
    assert_eq!(e.score, e.net_gain.as_slice().iter().sum::<i64>());
}

// Card 0 drains 5 from dimension 0; the baseline only holds 3.
#[rstest]
#[case(&[0, 0, 1, 1, 1, 1, 1, 1])]
#[case(&[1, 1, 1, 1, 1, 1, 0, 0])]
#[case(&[0, 1, 0, 1, 1, 1, 1, 1])]
#[case(&[1, 0, 1, 1, 1, 1, 1, 0])]
#[case(&[0, 0, 0, 1, 1, 1, 1, 1])]
fn test_overdrawn_dimension_is_invalid_in_any_order(#[case] ids: &[usize]) {
    let s = session(
        vec![vec![-5, 0, 0, 0, 0, 0, 0, 0], vec![0, 0, 0, 0, 0, 0, 0, 1]],
        &[3, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let e = s.evaluator().evaluate(&combo(ids, s.evaluator()));
    assert!(e.final_state[0] < 0);
    assert!(!e.valid);
    assert_eq!(e.fitness(), None);
}

#[test]
fn test_negative_prefix_with_non_negative_final_is_valid() {
    let s = session(
        vec![vec![-5, 0, 0, 0, 0, 0, 0, 0], vec![10, 0, 0, 0, 0, 0, 0, 0]],
        &[3, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let e = s
        .evaluator()
        .evaluate(&combo(&[0, 1, 0, 1, 0, 0, 1, 1], s.evaluator()));

    assert!(e.step_trace[1][0] < 0, "prefix should dip negative");
    assert!(e.valid);
    assert_eq!(e.final_state[0], 3 - 20 + 40);
}

#[test]
fn test_strict_rules_still_check_final_state() {
    let mut config = Config::default();
    config.rules.allow_intermediate_negative = false;
    let s = session(
        vec![vec![-5, 0, 0, 0, 0, 0, 0, 0], vec![1, 0, 0, 0, 0, 0, 0, 0]],
        &[3, 0, 0, 0, 0, 0, 0, 0],
        config,
    );
    // Cards 1 first keep every prefix non-negative but the final is -1.
    let e = s
        .evaluator()
        .evaluate(&combo(&[1, 1, 1, 1, 1, 1, 0, 0], s.evaluator()));
    assert!(!e.valid);

    // Positive prefix throughout and final non-negative.
    let e = s
        .evaluator()
        .evaluate(&combo(&[1, 1, 1, 1, 1, 1, 1, 0], s.evaluator()));
    assert!(e.valid);

    // Negative right away.
    let e = s
        .evaluator()
        .evaluate(&combo(&[0, 1, 1, 1, 1, 1, 1, 1], s.evaluator()));
    assert!(!e.valid);
}

#[test]
fn test_cached_result_matches_fresh_computation() {
    let s = session(mixed_cards(), &EXAMPLE_BASELINE, Config::default());
    let c = combo(&[9, 0, 1, 2, 3, 4, 5, 6], s.evaluator());

    let first = s.evaluator().evaluate(&c);
    let second = s.evaluator().evaluate(&c);
    let fresh = s.evaluator().compute(&c);

    assert_eq!(*first, *second);
    assert_eq!(*first, fresh);
    assert_eq!(s.evaluator().cache_stats().hits, 1);
}

#[test]
fn test_sessions_do_not_share_cache() {
    let a = session(mixed_cards(), &EXAMPLE_BASELINE, Config::default());
    let b = session(mixed_cards(), &[0, 0, 0, 0, 0, 0, 0, 0], Config::default());
    let ids = [0, 1, 0, 1, 0, 1, 0, 1];

    let ea = a.evaluator().evaluate(&combo(&ids, a.evaluator()));
    let eb = b.evaluator().evaluate(&combo(&ids, b.evaluator()));

    assert_eq!(ea.net_gain, eb.net_gain);
    assert_ne!(ea.final_state, eb.final_state);
    assert_eq!(b.evaluator().cache_stats().hits, 0);
}

#[test]
fn test_display_trace_clamps_negatives() {
    let s = session(
        vec![vec![-5, 0, 0, 0, 0, 0, 0, 0], vec![10, 0, 0, 0, 0, 0, 0, 0]],
        &[3, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let e = s
        .evaluator()
        .evaluate(&combo(&[0, 1, 1, 1, 1, 1, 1, 1], s.evaluator()));
    let shown = e.display_trace();
    assert_eq!(shown[1][0], 0);
    assert_eq!(e.step_trace[1][0], -2);
}

#[test]
fn test_evaluate_ids_checks_length_and_range() {
    let s = session(mixed_cards(), &EXAMPLE_BASELINE, Config::default());
    assert!(s.evaluate_ids(vec![0, 1, 2]).is_err());
    assert!(s.evaluate_ids(vec![0, 1, 2, 3, 4, 5, 6, 99]).is_err());
    assert!(s.evaluate_ids(vec![0, 1, 2, 3, 4, 5, 6, 7]).is_ok());
}

#[test]
fn test_overflowing_state_is_invalid_without_panicking() {
    let s = session(
        vec![vec![i64::MAX, 0, 0, 0, 0, 0, 0, 0]],
        &[1, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let e = s.evaluator().evaluate(&combo(&[0; 8], s.evaluator()));

    assert!(!e.valid);
    assert_eq!(e.fitness(), None);
    assert_eq!(e.final_state[0], i64::MAX);
    assert_eq!(e.step_trace.len(), 9);
}

#[test]
fn test_large_values_in_range_stay_exact() {
    let big = 1i64 << 59;
    let s = session(
        vec![vec![big, 0, 0, 0, 0, 0, 0, 0]],
        &[0, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let e = s.evaluator().evaluate(&combo(&[0; 8], s.evaluator()));

    assert!(e.valid);
    assert_eq!(e.final_state[0], 1i64 << 62);
    assert_eq!(e.score, 1i64 << 62);
}

#[test]
fn test_cancelling_extremes_are_order_independent() {
    let s = session(
        vec![
            vec![i64::MAX, 0, 0, 0, 0, 0, 0, 0],
            vec![-i64::MAX, 0, 0, 0, 0, 0, 0, 0],
        ],
        &[1, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let ev = s.evaluator();
    let highs_first = ev.evaluate(&combo(&[0, 0, 0, 0, 1, 1, 1, 1], ev));
    let lows_first = ev.evaluate(&combo(&[1, 1, 1, 1, 0, 0, 0, 0], ev));

    for e in [&highs_first, &lows_first] {
        assert!(e.valid);
        assert_eq!(e.final_state.as_slice(), &[1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(e.score, 0);
    }
}

#[test]
fn test_net_gain_or_score_out_of_range_is_invalid() {
    // Final state fits, but the gain over a negative baseline does not.
    let s = session(
        vec![
            vec![i64::MAX, 0, 0, 0, 0, 0, 0, 0],
            vec![5, 0, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0],
        ],
        &[-10, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let e = s
        .evaluator()
        .evaluate(&combo(&[0, 1, 2, 2, 2, 2, 2, 2], s.evaluator()));
    assert!(!e.valid);

    // Every dimension fits, the sum does not.
    let s = session(
        vec![
            vec![i64::MAX, i64::MAX, 0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0, 0, 0],
        ],
        &[0, 0, 0, 0, 0, 0, 0, 0],
        Config::default(),
    );
    let e = s
        .evaluator()
        .evaluate(&combo(&[0, 1, 1, 1, 1, 1, 1, 1], s.evaluator()));
    assert!(!e.valid);
    assert_eq!(e.score, i64::MAX);
}
