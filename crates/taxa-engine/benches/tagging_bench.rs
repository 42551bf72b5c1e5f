//! Binding engine benchmark: replace-set writes and reads.

use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use taxa_core::types::TaxonomyParams;
use taxa_engine::TaggingEngine;
use taxa_storage::DatabaseManager;

fn bench_tag_object(c: &mut Criterion) {
    let engine = TaggingEngine::new(Arc::new(DatabaseManager::open_in_memory().unwrap()));
    let taxonomy = engine
        .create_taxonomy(&TaxonomyParams::new("Keywords").free_text().multiple())
        .unwrap();

    let values: Vec<String> = (0..10).map(|i| format!("keyword-{i}")).collect();

    c.bench_function("tag_object_replace_10", |b| {
        let mut round = 0u64;
        b.iter(|| {
            // Alternate between two sets so every call does real replace work.
            let offset = (round % 2) as usize;
            round += 1;
            engine
                .tag_object(&taxonomy, &values[offset..offset + 8], "bench-object")
                .unwrap();
        });
    });

    c.bench_function("get_object_tags", |b| {
        b.iter(|| engine.get_object_tags("bench-object", None).unwrap());
    });
}

criterion_group!(benches, bench_tag_object);
criterion_main!(benches);
