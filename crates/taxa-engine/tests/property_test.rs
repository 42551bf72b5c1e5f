//! Property tests for the replace-set contract.

use std::sync::Arc;

use proptest::prelude::*;
use taxa_core::types::TaxonomyParams;
use taxa_engine::TaggingEngine;
use taxa_storage::DatabaseManager;

fn dedup_preserving_order(values: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .iter()
        .filter(|v| seen.insert(v.as_str()))
        .cloned()
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// The binding set after tag_object is exactly the deduplicated input,
    /// in input order, and re-tagging with the same input is a no-op.
    #[test]
    fn replace_set_equals_deduplicated_input(
        rounds in prop::collection::vec(
            prop::collection::vec("[a-z]{1,8}", 0..6),
            1..4,
        )
    ) {
        let engine = TaggingEngine::new(Arc::new(DatabaseManager::open_in_memory().unwrap()));
        let taxonomy = engine
            .create_taxonomy(&TaxonomyParams::new("Keywords").free_text().multiple())
            .unwrap();

        for values in &rounds {
            engine.tag_object(&taxonomy, values, "obj").unwrap();

            let stored: Vec<String> = engine
                .get_object_tags("obj", None)
                .unwrap()
                .into_iter()
                .map(|b| b.value)
                .collect();
            prop_assert_eq!(&stored, &dedup_preserving_order(values));

            // Idempotence.
            engine.tag_object(&taxonomy, values, "obj").unwrap();
            let again: Vec<String> = engine
                .get_object_tags("obj", None)
                .unwrap()
                .into_iter()
                .map(|b| b.value)
                .collect();
            prop_assert_eq!(&again, &stored);
        }
    }
}
