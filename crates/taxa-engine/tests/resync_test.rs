//! Resync reconciler tests: vocabulary drift and repair.

use std::sync::Arc;

use taxa_core::types::{TagId, Taxonomy, TaxonomyParams};
use taxa_engine::TaggingEngine;
use taxa_storage::DatabaseManager;

fn engine() -> TaggingEngine {
    TaggingEngine::new(Arc::new(DatabaseManager::open_in_memory().unwrap()))
}

fn vals(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn seed(engine: &TaggingEngine) -> (Taxonomy, TagId) {
    let params = TaxonomyParams::new("Life on Earth").multiple();
    let taxonomy = engine.create_taxonomy(&params).unwrap();
    engine.add_tag(&taxonomy, "Archaea", None, None).unwrap();
    let bacteria = engine.add_tag(&taxonomy, "Bacteria", None, None).unwrap();
    (taxonomy, bacteria.id.unwrap())
}

fn state(engine: &TaggingEngine, object_id: &str) -> Vec<(String, bool)> {
    engine
        .get_object_tags(object_id, None)
        .unwrap()
        .into_iter()
        .map(|b| (b.value, b.is_deleted))
        .collect()
}

#[test]
fn resync_relinks_reappeared_tags_exactly_once() {
    let engine = engine();
    let (taxonomy, bacteria_id) = seed(&engine);
    let open = engine
        .create_taxonomy(&TaxonomyParams::new("Freetext Life").free_text().multiple())
        .unwrap();

    engine
        .tag_object(&taxonomy, &vals(&["Archaea", "Bacteria"]), "obj1")
        .unwrap();
    engine.tag_object(&open, &vals(&["foo", "bar"]), "obj1").unwrap();

    // At first, nothing is deleted.
    assert_eq!(
        state(&engine, "obj1"),
        [
            ("Archaea".to_string(), false),
            ("Bacteria".to_string(), false),
            ("foo".to_string(), false),
            ("bar".to_string(), false),
        ]
    );

    // Deleting the tag marks the binding deleted but preserves the value.
    engine.delete_tag(bacteria_id).unwrap();
    assert_eq!(
        state(&engine, "obj1"),
        [
            ("Archaea".to_string(), false),
            ("Bacteria".to_string(), true),
            ("foo".to_string(), false),
            ("bar".to_string(), false),
        ]
    );

    // Re-syncing while the tag is still gone does nothing.
    assert_eq!(engine.resync_object_tags(None).unwrap(), 0);
    assert_eq!(state(&engine, "obj1")[1], ("Bacteria".to_string(), true));

    // Recreate the tag, then resync: exactly the affected binding flips.
    engine.add_tag(&taxonomy, "Bacteria", None, None).unwrap();
    assert_eq!(engine.resync_object_tags(None).unwrap(), 1);
    assert_eq!(
        state(&engine, "obj1"),
        [
            ("Archaea".to_string(), false),
            ("Bacteria".to_string(), false),
            ("foo".to_string(), false),
            ("bar".to_string(), false),
        ]
    );

    // A second run has nothing left to repair.
    assert_eq!(engine.resync_object_tags(None).unwrap(), 0);
}

#[test]
fn resync_does_not_rewrite_the_stored_value() {
    let engine = engine();
    let (taxonomy, bacteria_id) = seed(&engine);

    engine
        .tag_object(&taxonomy, &vals(&["Bacteria"]), "obj1")
        .unwrap();
    engine.delete_tag(bacteria_id).unwrap();

    // The reappeared tag has drifted spelling; repair is by exact stored
    // value, so this binding stays deleted and keeps its display text.
    engine.add_tag(&taxonomy, "Eubacteria", None, None).unwrap();
    assert_eq!(engine.resync_object_tags(None).unwrap(), 0);

    let bindings = engine.get_object_tags("obj1", None).unwrap();
    assert!(bindings[0].is_deleted);
    assert_eq!(bindings[0].value, "Bacteria");

    // Lineage falls back to the stored value while the link dangles.
    assert_eq!(engine.get_lineage(&bindings[0]).unwrap().to_vec(), ["Bacteria"]);
}

#[test]
fn resync_can_target_specific_bindings() {
    let engine = engine();
    let (taxonomy, bacteria_id) = seed(&engine);

    engine.tag_object(&taxonomy, &vals(&["Bacteria"]), "obj1").unwrap();
    engine.tag_object(&taxonomy, &vals(&["Bacteria"]), "obj2").unwrap();
    engine.delete_tag(bacteria_id).unwrap();
    engine.add_tag(&taxonomy, "Bacteria", None, None).unwrap();

    let obj1_binding = engine.get_object_tags("obj1", None).unwrap()[0].id;
    assert_eq!(engine.resync_object_tags(Some(&[obj1_binding])).unwrap(), 1);

    assert!(!engine.get_object_tags("obj1", None).unwrap()[0].is_deleted);
    assert!(engine.get_object_tags("obj2", None).unwrap()[0].is_deleted);

    // The untargeted binding repairs on the next full pass.
    assert_eq!(engine.resync_object_tags(None).unwrap(), 1);
}

#[test]
fn resync_repairs_model_backed_bindings_via_external_id() {
    use taxa_engine::variants::{Enumeration, ModelBackedVariant};

    struct Directory;
    impl Enumeration for Directory {
        fn entries(&self) -> Vec<(String, String)> {
            vec![("17".to_string(), "ada".to_string())]
        }
    }

    let mut engine = engine();
    engine
        .registry_mut()
        .register(Arc::new(ModelBackedVariant::new("user", Arc::new(Directory))));
    let taxonomy = engine
        .create_taxonomy(&TaxonomyParams::new("Owner").with_variant("user"))
        .unwrap();

    engine.tag_object(&taxonomy, &vals(&["ada"]), "obj1").unwrap();
    let old_tag_id = engine.get_object_tags("obj1", None).unwrap()[0]
        .tag_id
        .unwrap();

    engine.delete_tag(old_tag_id).unwrap();
    assert!(engine.get_object_tags("obj1", None).unwrap()[0].is_deleted);

    // Repair re-materializes the row from the enumeration.
    assert_eq!(engine.resync_object_tags(None).unwrap(), 1);
    let bindings = engine.get_object_tags("obj1", None).unwrap();
    let binding = &bindings[0];
    assert!(!binding.is_deleted);
    assert_ne!(binding.tag_id.unwrap(), old_tag_id, "fresh row, same external id");
    assert_eq!(binding.value, "ada");
}
