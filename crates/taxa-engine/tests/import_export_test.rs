//! Import/export pipeline tests.

use std::sync::Arc;

use taxa_core::errors::TaggingError;
use taxa_core::types::{Taxonomy, TaxonomyParams};
use taxa_engine::{ImportAction, ParserFormat, TaggingEngine};
use taxa_storage::queries::import_tasks::ImportTaskStatus;
use taxa_storage::DatabaseManager;

fn engine() -> TaggingEngine {
    TaggingEngine::new(Arc::new(DatabaseManager::open_in_memory().unwrap()))
}

fn closed_taxonomy(engine: &TaggingEngine, name: &str) -> Taxonomy {
    engine.create_taxonomy(&TaxonomyParams::new(name)).unwrap()
}

const INITIAL: &[u8] = br#"{"tags": [
    {"id": "life", "value": "Life on Earth"},
    {"id": "arch", "value": "Archaea", "parent_id": "life"},
    {"id": "bact", "value": "Bacteria", "parent_id": "life"}
]}"#;

#[test]
fn import_creates_the_tree_and_logs_the_run() {
    let engine = engine();
    let taxonomy = closed_taxonomy(&engine, "Import Taxonomy Test");

    let (ok, task, plan) = engine
        .import_tags(&taxonomy, INITIAL, ParserFormat::Json, false, false)
        .unwrap();
    assert!(ok);
    assert_eq!(task.status, ImportTaskStatus::Success);
    assert_eq!(plan.unwrap().actions.len(), 3);

    let tags = engine.get_tags(&taxonomy).unwrap();
    let values: Vec<_> = tags.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["Life on Earth", "Archaea", "Bacteria"]);

    let log = engine.get_last_import_log(taxonomy.id).unwrap().unwrap();
    assert!(log.contains("starting import parse"));
    assert!(log.contains("create tag `Archaea` (arch) under life"));
    assert_eq!(
        engine.get_last_import_status(taxonomy.id).unwrap(),
        Some(ImportTaskStatus::Success)
    );
}

#[test]
fn reimport_renames_moves_and_deletes() {
    let engine = engine();
    let taxonomy = closed_taxonomy(&engine, "Import Taxonomy Test");
    engine
        .import_tags(&taxonomy, INITIAL, ParserFormat::Json, false, false)
        .unwrap();

    // Rename bacteria, move archaea to the root, drop life (replace).
    let updated = br#"{"tags": [
        {"id": "arch", "value": "Archaea"},
        {"id": "bact", "value": "Eubacteria", "parent_id": "arch"}
    ]}"#;
    let (ok, _, plan) = engine
        .import_tags(&taxonomy, updated, ParserFormat::Json, true, false)
        .unwrap();
    assert!(ok);

    let plan = plan.unwrap();
    assert!(plan
        .actions
        .iter()
        .any(|a| matches!(a, ImportAction::RenameTag { .. })));
    assert!(plan
        .actions
        .iter()
        .any(|a| matches!(a, ImportAction::UpdateParent { .. })));
    assert!(plan
        .actions
        .iter()
        .any(|a| matches!(a, ImportAction::DeleteTag { .. })));

    let tags = engine.get_tags(&taxonomy).unwrap();
    let values: Vec<_> = tags.iter().map(|t| t.value.as_str()).collect();
    assert_eq!(values, ["Archaea", "Eubacteria"]);
}

#[test]
fn plan_only_leaves_the_vocabulary_untouched() {
    let engine = engine();
    let taxonomy = closed_taxonomy(&engine, "Import Taxonomy Test");

    let (ok, task, plan) = engine
        .import_tags(&taxonomy, INITIAL, ParserFormat::Json, false, true)
        .unwrap();
    assert!(ok);
    assert_eq!(task.status, ImportTaskStatus::Success);
    assert_eq!(plan.unwrap().actions.len(), 3);
    assert!(engine.get_tags(&taxonomy).unwrap().is_empty());
}

#[test]
fn parse_errors_end_the_task_in_error_state() {
    let engine = engine();
    let taxonomy = closed_taxonomy(&engine, "Import Taxonomy Test");

    let (ok, task, plan) = engine
        .import_tags(&taxonomy, b"not json", ParserFormat::Json, false, false)
        .unwrap();
    assert!(!ok);
    assert!(plan.is_none());
    assert_eq!(task.status, ImportTaskStatus::Error);
    assert!(task.log.contains("parse error"));

    // A terminal failed task does not block the next import.
    let (ok, _, _) = engine
        .import_tags(&taxonomy, INITIAL, ParserFormat::Json, false, false)
        .unwrap();
    assert!(ok);
}

#[test]
fn unknown_parent_is_a_plan_error() {
    let engine = engine();
    let taxonomy = closed_taxonomy(&engine, "Import Taxonomy Test");

    let data = br#"{"tags": [
        {"id": "arch", "value": "Archaea", "parent_id": "missing"}
    ]}"#;
    let (ok, task, plan) = engine
        .import_tags(&taxonomy, data, ParserFormat::Json, false, false)
        .unwrap();
    assert!(!ok);
    assert_eq!(task.status, ImportTaskStatus::Error);
    let plan = plan.unwrap();
    assert!(plan.errors[0].contains("unknown parent"));
    assert!(engine.get_tags(&taxonomy).unwrap().is_empty());
}

#[test]
fn import_rejects_free_text_and_system_taxonomies() {
    let engine = engine();

    let free = engine
        .create_taxonomy(&TaxonomyParams::new("Keywords").free_text())
        .unwrap();
    let err = engine
        .import_tags(&free, INITIAL, ParserFormat::Json, false, false)
        .unwrap_err();
    assert!(matches!(err, TaggingError::ImportNotAllowed { .. }));

    let mut params = TaxonomyParams::new("Platform");
    params.system_defined = true;
    let system = engine.create_taxonomy(&params).unwrap();
    let err = engine
        .import_tags(&system, INITIAL, ParserFormat::Json, false, false)
        .unwrap_err();
    assert!(matches!(err, TaggingError::ImportNotAllowed { .. }));
}

#[test]
fn export_round_trips_through_import() {
    let engine = engine();
    let taxonomy = closed_taxonomy(&engine, "Import Taxonomy Test");
    engine
        .import_tags(&taxonomy, INITIAL, ParserFormat::Json, false, false)
        .unwrap();

    let exported = engine.export_tags(&taxonomy, ParserFormat::Json).unwrap();

    let other = closed_taxonomy(&engine, "Copy");
    let (ok, _, _) = engine
        .import_tags(&other, exported.as_bytes(), ParserFormat::Json, false, false)
        .unwrap();
    assert!(ok);

    let original: Vec<_> = engine
        .get_tags(&taxonomy)
        .unwrap()
        .into_iter()
        .map(|t| (t.value, t.external_id))
        .collect();
    let copied: Vec<_> = engine
        .get_tags(&other)
        .unwrap()
        .into_iter()
        .map(|t| (t.value, t.external_id))
        .collect();
    assert_eq!(original, copied);
}
