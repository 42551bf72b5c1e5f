//! Autocomplete engine tests.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use taxa_core::types::{TagId, Taxonomy, TaxonomyParams};
use taxa_engine::variants::{Enumeration, ModelBackedVariant};
use taxa_engine::{AutocompleteEntry, TaggingEngine};
use taxa_storage::DatabaseManager;

const VALUES: [&str; 8] = [
    "Animalia",
    "Archaea",
    "Archaebacteria",
    "Arthropoda",
    "Gastrotrich",
    "Monera",
    "Placozoa",
    "Plantae",
];

fn engine() -> TaggingEngine {
    TaggingEngine::new(Arc::new(DatabaseManager::open_in_memory().unwrap()))
}

fn vals(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// A closed taxonomy holding the fixture values, plus the id of each tag.
fn seed_closed(engine: &TaggingEngine) -> (Taxonomy, FxHashMap<String, TagId>) {
    let params = TaxonomyParams::new("Life on Earth").multiple();
    let taxonomy = engine.create_taxonomy(&params).unwrap();
    let mut ids = FxHashMap::default();
    for value in VALUES {
        let tag = engine.add_tag(&taxonomy, value, None, None).unwrap();
        ids.insert(value.to_string(), tag.id.unwrap());
    }
    (taxonomy, ids)
}

/// A free-text taxonomy whose bindings carry the fixture values, with
/// duplicates across objects.
fn seed_free_text(engine: &TaggingEngine) -> Taxonomy {
    let params = TaxonomyParams::new("Free_Text_Taxonomy").free_text().multiple();
    let taxonomy = engine.create_taxonomy(&params).unwrap();
    for (index, value) in VALUES.iter().chain(VALUES.iter().take(3)).enumerate() {
        engine
            .tag_object(&taxonomy, &vals(&[value]), &format!("object_id_{index}"))
            .unwrap();
    }
    taxonomy
}

fn values_of(entries: &[AutocompleteEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.value.as_str()).collect()
}

#[test]
fn closed_autocomplete_returns_values_with_tag_ids() {
    let engine = engine();
    let (taxonomy, ids) = seed_closed(&engine);

    for (search, expected) in [
        ("ChA", vec!["Archaea", "Archaebacteria"]),
        ("ar", vec!["Archaea", "Archaebacteria", "Arthropoda"]),
        ("aE", vec!["Archaea", "Archaebacteria", "Plantae"]),
        (
            "a",
            vec![
                "Animalia",
                "Archaea",
                "Archaebacteria",
                "Arthropoda",
                "Gastrotrich",
                "Monera",
                "Placozoa",
                "Plantae",
            ],
        ),
    ] {
        let result = engine
            .autocomplete_tags(&taxonomy, search, None, false)
            .unwrap();
        assert_eq!(values_of(&result), expected, "search {search:?}");
        for entry in &result {
            assert_eq!(entry.tag_id, Some(ids[&entry.value]), "{}", entry.value);
            assert!(entry
                .value
                .to_lowercase()
                .contains(&search.to_lowercase()));
        }
    }
}

#[test]
fn free_text_autocomplete_returns_historical_values_without_ids() {
    let engine = engine();
    let taxonomy = seed_free_text(&engine);

    let result = engine
        .autocomplete_tags(&taxonomy, "ar", None, false)
        .unwrap();
    assert_eq!(
        values_of(&result),
        ["Archaea", "Archaebacteria", "Arthropoda"],
        "deduplicated despite repeated bindings"
    );
    assert!(result.iter().all(|e| e.tag_id.is_none()));
}

#[test]
fn autocomplete_excludes_values_bound_to_the_object() {
    let engine = engine();
    let (taxonomy, _) = seed_closed(&engine);

    engine
        .tag_object(&taxonomy, &vals(&["Archaea"]), "new_object")
        .unwrap();

    let result = engine
        .autocomplete_tags(&taxonomy, "ar", Some("new_object"), false)
        .unwrap();
    assert_eq!(values_of(&result), ["Archaebacteria", "Arthropoda"]);

    // Other objects still see the full set.
    let result = engine
        .autocomplete_tags(&taxonomy, "ar", Some("other_object"), false)
        .unwrap();
    assert_eq!(values_of(&result), ["Archaea", "Archaebacteria", "Arthropoda"]);
}

#[test]
fn object_tags_only_mode_is_reserved() {
    let engine = engine();
    let (taxonomy, _) = seed_closed(&engine);

    let err = engine
        .autocomplete_tags(&taxonomy, "ar", None, true)
        .unwrap_err();
    assert!(matches!(
        err,
        taxa_core::errors::TaggingError::AutocompleteUnsupported { .. }
    ));
}

#[test]
fn model_backed_autocomplete_requires_opt_in() {
    struct Directory;
    impl Enumeration for Directory {
        fn entries(&self) -> Vec<(String, String)> {
            vec![
                ("17".to_string(), "ada".to_string()),
                ("42".to_string(), "adrian".to_string()),
            ]
        }
    }

    let mut engine = engine();
    engine
        .registry_mut()
        .register(Arc::new(ModelBackedVariant::new("user", Arc::new(Directory))));
    let closed_off = engine
        .create_taxonomy(&TaxonomyParams::new("Owner").with_variant("user"))
        .unwrap();

    let err = engine
        .autocomplete_tags(&closed_off, "ad", None, false)
        .unwrap_err();
    assert!(matches!(
        err,
        taxa_core::errors::TaggingError::AutocompleteUnsupported { .. }
    ));

    // Registering the opted-in variant turns autocomplete on.
    let mut engine = TaggingEngine::new(Arc::new(DatabaseManager::open_in_memory().unwrap()));
    engine.registry_mut().register(Arc::new(
        ModelBackedVariant::new("user", Arc::new(Directory)).with_autocomplete(),
    ));
    let taxonomy = engine
        .create_taxonomy(&TaxonomyParams::new("Owner").with_variant("user"))
        .unwrap();

    let result = engine.autocomplete_tags(&taxonomy, "AD", None, false).unwrap();
    assert_eq!(values_of(&result), ["ada", "adrian"]);
    assert!(result.iter().all(|e| e.tag_id.is_none()), "nothing materialized yet");

    // Once a binding materializes a row, the suggestion carries its id.
    engine.tag_object(&taxonomy, &vals(&["ada"]), "obj_x").unwrap();
    let result = engine.autocomplete_tags(&taxonomy, "ada", None, false).unwrap();
    assert_eq!(result.len(), 1);
    assert!(result[0].tag_id.is_some());
}
