//! Property-based tests for the overlap metrics and percentiles.

use proptest::prelude::*;

use rageval_core::aggregate::percentile;
use rageval_core::{LatencyPercentiles, context_precision, faithfulness, relevance};

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z]{1,8}[.,;]?", 0..20).prop_map(|words| words.join(" "))
}

fn chunks() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(text(), 0..5)
}

// --- Range properties ---

proptest! {
    #[test]
    fn metrics_stay_in_unit_interval(answer in text(), question in text(), ctx in chunks()) {
        for score in [
            faithfulness(&answer, &ctx),
            relevance(&answer, &question),
            context_precision(&answer, &ctx),
        ] {
            prop_assert!(score.is_finite());
            prop_assert!((0.0..=1.0).contains(&score));
        }
    }

    #[test]
    fn empty_inputs_score_zero(answer in text(), question in text(), ctx in chunks()) {
        prop_assert_eq!(faithfulness(&answer, &[]), 0.0);
        prop_assert_eq!(context_precision(&answer, &[]), 0.0);
        prop_assert_eq!(faithfulness("", &ctx), 0.0);
        prop_assert_eq!(context_precision("", &ctx), 0.0);
        prop_assert_eq!(relevance(&answer, ""), 0.0);
        prop_assert_eq!(relevance("", &question), 0.0);
    }

    #[test]
    fn answer_copied_from_context_is_fully_faithful(chunk in "[a-z]{4,8}( [a-z]{4,8}){1,10}") {
        let ctx = vec![chunk.clone()];
        prop_assert_eq!(faithfulness(&chunk, &ctx), 1.0);
        prop_assert_eq!(context_precision(&chunk, &ctx), 1.0);
    }
}

// --- Context precision monotonicity ---

proptest! {
    #[test]
    fn context_precision_never_drops_when_adding_chunks(
        answer in text(),
        ctx in chunks(),
        extra in text(),
    ) {
        let before = context_precision(&answer, &ctx);
        let mut more = ctx.clone();
        more.push(extra);
        prop_assert!(context_precision(&answer, &more) >= before);
    }
}

// --- Percentiles ---

proptest! {
    #[test]
    fn percentiles_are_observed_values(latencies in prop::collection::vec(0.0f64..5000.0, 1..50)) {
        let p = LatencyPercentiles::from_latencies(latencies.iter().copied());
        prop_assert!(latencies.contains(&p.p50));
        prop_assert!(latencies.contains(&p.p90));
        prop_assert!(p.p50 <= p.p90);
    }

    #[test]
    fn percentile_index_is_clamped(latencies in prop::collection::vec(0.0f64..5000.0, 1..50)) {
        let mut sorted = latencies.clone();
        sorted.sort_by(f64::total_cmp);
        prop_assert_eq!(percentile(&sorted, 1.0), *sorted.last().unwrap());
        prop_assert_eq!(percentile(&sorted, 0.0), sorted[0]);
    }
}
