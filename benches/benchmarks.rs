//! Performance benchmarks for Flowdeck.
//!
//! This module contains benchmarks for:
//! - Workflow validation over growing node counts
//! - Listing a root with many project records
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use flowdeck::core::{validate, CreateOptions, ListMode, ProjectStore, StoreLayout, StoreOptions};
use serde_json::{json, Value};

// ============================================================================
// Mock Data Fixtures
// ============================================================================

mod fixtures {
    use super::*;

    /// Generate a linear workflow with `num_nodes` nodes.
    pub fn generate_workflow(num_nodes: usize) -> Value {
        let nodes: Vec<Value> = (0..num_nodes)
            .map(|i| {
                json!({
                    "id": format!("node-{i}"),
                    "name": format!("Step {i}"),
                    "type": "n8n-nodes-base.set",
                    "position": [i * 200, 0]
                })
            })
            .collect();

        let connections: serde_json::Map<String, Value> = (1..num_nodes)
            .map(|i| {
                (
                    format!("Step {}", i - 1),
                    json!({"main": [[{"node": format!("Step {i}"), "type": "main", "index": 0}]]}),
                )
            })
            .collect();

        json!({"name": "Bench", "active": false, "nodes": nodes, "connections": connections})
    }
}

// ============================================================================
// Validation Benchmarks
// ============================================================================

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");

    for size in [10, 100, 1000] {
        let workflow = fixtures::generate_workflow(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &workflow, |b, workflow| {
            b.iter(|| validate(black_box(Some(workflow))));
        });
    }

    group.finish();
}

// ============================================================================
// Listing Benchmarks
// ============================================================================

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");

    for count in [10, 100] {
        let temp = tempfile::TempDir::new().unwrap();
        let store = ProjectStore::new(StoreLayout::new(temp.path()), StoreOptions::default())
            .unwrap();
        let workflow = fixtures::generate_workflow(20);
        for i in 0..count {
            store
                .create(&format!("project-{i}"), Some(workflow.clone()), CreateOptions::default())
                .unwrap();
        }

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &store, |b, store| {
            b.iter(|| store.list(black_box(ListMode::Strict)).unwrap());
        });
    }

    group.finish();
}

criterion_group!(validator_benches, bench_validate,);

criterion_group!(store_benches, bench_list,);

criterion_main!(validator_benches, store_benches,);
