//! Benchmarks for the incremental filter index and the window computation.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use logria::filter::FilterIndex;
use logria::tui::render::{determine_position, visible_indices, Follow, SeqRef};

/// Synthetic log lines, roughly one in eight matching `ERROR`.
fn generate_lines(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let level = match i % 8 {
                0 => "ERROR",
                1 | 2 => "WARN",
                _ => "INFO",
            };
            format!("2023-01-01 00:00:{:02} - worker-{} - {level} - handled request {i}", i % 60, i % 4)
        })
        .collect()
}

fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    for size in [1_000, 10_000, 100_000] {
        let lines = generate_lines(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("extend_from", size), &lines, |b, lines| {
            b.iter(|| {
                let mut filter = FilterIndex::compile("ERROR").unwrap();
                filter.extend_from(black_box(lines));
                black_box(filter.len())
            });
        });
    }

    group.finish();
}

fn bench_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("window");

    let lines = generate_lines(100_000);
    let seq = SeqRef::Slice(&lines);

    group.bench_function("tail_window", |b| {
        b.iter(|| {
            let window = determine_position(black_box(&seq), Follow::Tail, 0, 50, 120);
            visible_indices(&seq, window, 50, 120)
        });
    });

    group.bench_function("top_window", |b| {
        b.iter(|| {
            let window = determine_position(black_box(&seq), Follow::Top, 0, 50, 120);
            visible_indices(&seq, window, 50, 120)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_filter, bench_window);
criterion_main!(benches);
