//! Property tests - summary identities hold for arbitrary string populations

mod common;

use common::{assert_summary_invariants, fixture};
use heaplens_analysis::{CancellationToken, StringDedupAnalyzer};
use proptest::prelude::*;
use std::collections::HashMap;

/// Size model: content-equal instances share one allocation size
fn instance_size(content: &str) -> u64 {
    20 + content.chars().count() as u64 * 2
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn summary_invariants_hold(contents in prop::collection::vec("[a-e]{0,6}", 0..120)) {
        let mut f = fixture();
        let seg = f.builder.regular_segment();
        for (i, content) in contents.iter().enumerate() {
            f.builder.push_string(
                seg,
                0x1000 + i as u64 * 0x40,
                f.string_ty,
                instance_size(content),
                (i % 3) as i8,
                content.clone(),
            );
        }
        let snapshot = f.builder.build();

        let summary = StringDedupAnalyzer::default()
            .analyze(&snapshot, &CancellationToken::new())
            .unwrap();

        assert_summary_invariants(&summary);
        prop_assert_eq!(summary.total_string_count, contents.len() as u64);

        // model the expected waste independently
        let mut occurrences: HashMap<&str, u64> = HashMap::new();
        for content in &contents {
            *occurrences.entry(content.as_str()).or_default() += 1;
        }
        let expected_waste: u64 = occurrences
            .iter()
            .map(|(content, n)| (n - 1) * instance_size(content))
            .sum();
        prop_assert_eq!(summary.total_wasted_bytes, expected_waste);
        prop_assert_eq!(summary.unique_string_count, occurrences.len() as u64);
    }

    #[test]
    fn scans_are_idempotent(contents in prop::collection::vec("[a-c]{0,4}", 0..40)) {
        let mut f = fixture();
        let seg = f.builder.regular_segment();
        for (i, content) in contents.iter().enumerate() {
            f.builder.push_string(
                seg,
                0x1000 + i as u64 * 0x40,
                f.string_ty,
                instance_size(content),
                0,
                content.clone(),
            );
        }
        let snapshot = f.builder.build();
        let analyzer = StringDedupAnalyzer::default();
        let token = CancellationToken::new();

        let first = analyzer.analyze(&snapshot, &token).unwrap();
        let second = analyzer.analyze(&snapshot, &token).unwrap();
        prop_assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
