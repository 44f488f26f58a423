//! Span sequence tests: cumulative positions, hit testing, and clamping.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation
)]

mod common;

use proptest::prelude::*;
use test_case::test_case;
use xltiles::layout::SpanSequence;

fn rows_of_24() -> SpanSequence {
    SpanSequence::new(10, 24.0)
}

#[test_case(0, 0.0 ; "first span starts at zero")]
#[test_case(5, 120.0 ; "middle span")]
#[test_case(10, 240.0 ; "one past end is total")]
fn positions_on_uniform_sequence(i: u32, expected: f64) {
    assert_eq!(rows_of_24().position_at(i), expected);
}

#[test_case(119.9, 4 ; "just before boundary")]
#[test_case(120.0, 5 ; "exactly on boundary")]
#[test_case(-5.0, 0 ; "negative clamps to first")]
#[test_case(1240.0, 9 ; "past end clamps to last")]
#[test_case(240.0, 9 ; "total size clamps to last")]
fn index_lookup_on_uniform_sequence(p: f64, expected: u32) {
    assert_eq!(rows_of_24().index_at_position(p), expected);
}

#[test]
fn override_shifts_later_positions() {
    let mut spans = rows_of_24();
    spans.set_size(2, 48.0);
    assert_eq!(spans.position_at(3), 96.0);
    assert_eq!(spans.position_at(4), 120.0);
    assert_eq!(spans.total_size(), 264.0);
    assert_eq!(spans.index_at_position(95.0), 2);

    spans.reset_size(2);
    assert_eq!(spans.position_at(4), 96.0);
}

#[test]
fn batched_overrides() {
    let mut spans = rows_of_24();
    spans.set_sizes([(0, 10.0), (1, 10.0), (9, 100.0)]);
    assert_eq!(spans.position_at(2), 20.0);
    assert_eq!(spans.total_size(), 20.0 + 7.0 * 24.0 + 100.0);
}

#[test]
fn hidden_spans_collapse_and_restore() {
    let mut spans = rows_of_24();
    spans.set_size(3, 30.0);
    spans.set_hidden(3, true);
    assert!(spans.is_hidden(3));
    assert_eq!(spans.size_at(3), 0.0);
    assert_eq!(spans.position_at(4), spans.position_at(3));
    // The span after the hidden one owns the shared start position.
    assert_eq!(spans.index_at_position(72.0), 4);

    spans.set_hidden(3, false);
    assert_eq!(spans.size_at(3), 30.0);
}

#[test]
fn visible_range_is_inclusive() {
    let spans = rows_of_24();
    assert_eq!(spans.visible_range(30.0, 50.0), (1, 3));
    assert_eq!(spans.visible_range(30.0, 1.0), (1, 1));
    assert_eq!(spans.visible_range(0.0, 10_000.0), (0, 9));
}

#[test]
fn index_range_excludes_span_starting_at_end() {
    let spans = rows_of_24();
    assert_eq!(spans.index_range(0.0, 48.0), (0, 1));
    assert_eq!(spans.index_range(0.0, 48.5), (0, 2));
    assert_eq!(spans.index_range(200.0, 9_999.0), (8, 9));
}

#[test]
fn empty_sequence_is_safe() {
    let spans = SpanSequence::new(0, 24.0);
    assert!(spans.is_empty());
    assert_eq!(spans.total_size(), 0.0);
    assert_eq!(spans.index_at_position(50.0), 0);
    assert_eq!(spans.position_at(0), 0.0);
}

#[test]
fn large_axis() {
    let mut rows = SpanSequence::new(1_048_576, 20.0);
    rows.set_size(500_000, 40.0);
    assert_eq!(rows.total_size(), 1_048_576.0 * 20.0 + 20.0);
    assert_eq!(rows.index_at_position(500_000.0 * 20.0 + 39.0), 500_000);
    assert_eq!(rows.index_at_position(500_000.0 * 20.0 + 40.0), 500_001);
}

fn sequence_strategy() -> impl Strategy<Value = SpanSequence> {
    (1u32..200, 1.0f64..50.0, prop::collection::vec((0u32..200, 0.0f64..80.0), 0..40)).prop_map(
        |(count, default, overrides)| {
            let mut spans = SpanSequence::new(count, default);
            spans.set_sizes(overrides.into_iter().filter(|(i, _)| *i < count));
            spans
        },
    )
}

proptest! {
    #[test]
    fn cumulative_invariant(spans in sequence_strategy()) {
        for i in 0..spans.count() {
            let step = spans.position_at(i + 1) - spans.position_at(i);
            prop_assert!(common::approx_eq(step, spans.size_at(i)));
        }
        prop_assert_eq!(spans.position_at(spans.count()), spans.total_size());
    }

    #[test]
    fn lookup_round_trips(spans in sequence_strategy(), frac in 0.0f64..1.0) {
        let total = spans.total_size();
        prop_assume!(total > 0.0);
        let p = frac * total;
        let i = spans.index_at_position(p);
        let start = spans.position_at(i);
        prop_assert!(start <= p);
        prop_assert!(p < start + spans.size_at(i));
    }

    #[test]
    fn lookup_clamps(spans in sequence_strategy(), overshoot in 0.0f64..1e6) {
        prop_assert_eq!(spans.index_at_position(-overshoot - 1.0), 0);
        prop_assert_eq!(
            spans.index_at_position(spans.total_size() + overshoot),
            spans.count() - 1
        );
    }
}
