//! Scan benchmarks over synthetic heaps
//!
//! Measures the two full-heap passes: deduplication aggregation and
//! reference-graph inversion. Populations are shaped like real dumps:
//! a heavy-tailed mix of hot duplicates and unique strings.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heaplens_analysis::{CancellationToken, ReferenceGraphBuilder, StringDedupAnalyzer};
use heaplens_snapshot::{FieldSlot, MemorySnapshot, SnapshotBuilder, TypeRecord};
use rustc_hash::FxHashSet;

fn synthetic_heap(string_count: u64, unique: u64) -> MemorySnapshot {
    let mut b = SnapshotBuilder::new();
    let string_ty = b.add_type(TypeRecord::string("System.String"));
    let holder_ty = b.add_type(TypeRecord::new("Holder"));

    let seg = b.ephemeral_segment();
    for i in 0..string_count {
        let content = format!("payload-{}", i % unique);
        let size = 22 + content.len() as u64 * 2;
        b.push_string(seg, 0x10000 + i * 0x40, string_ty, size, (i % 3) as i8, content);
    }

    // referrers pointing into the string population
    let refs = b.regular_segment();
    for i in 0..string_count / 4 {
        b.push_object_with_fields(
            refs,
            0x4000_0000 + i * 0x40,
            holder_ty,
            32,
            1,
            vec![FieldSlot {
                offset: 0x8,
                value: Some(0x10000 + (i * 4) * 0x40),
            }],
        );
    }
    b.build()
}

fn bench_dedup_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("dedup_scan");
    for &count in &[10_000u64, 100_000] {
        let snapshot = synthetic_heap(count, count / 10);
        let analyzer = StringDedupAnalyzer::default();
        let token = CancellationToken::new();

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |bencher, _| {
            bencher.iter(|| {
                let summary = analyzer.analyze(black_box(&snapshot), &token).unwrap();
                black_box(summary.total_wasted_bytes)
            })
        });
    }
    group.finish();
}

fn bench_reference_graph(c: &mut Criterion) {
    let snapshot = synthetic_heap(50_000, 5_000);
    let builder = ReferenceGraphBuilder::default();
    let token = CancellationToken::new();
    let targets: FxHashSet<u64> = (0..64u64).map(|i| 0x10000 + i * 0x40).collect();

    c.bench_function("reference_graph_64_targets", |bencher| {
        bencher.iter(|| {
            let graph = builder
                .build(black_box(&snapshot), &targets, &token)
                .unwrap();
            black_box(graph.stats.edges_total)
        })
    });
}

criterion_group!(benches, bench_dedup_scan, bench_reference_graph);
criterion_main!(benches);
