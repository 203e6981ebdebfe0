//! Benchmarks for the matching engine: join throughput and the cost of
//! a matching pass over a queue of waiting players.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gridmatch::engine::Matcher;

fn bench_join_queue(c: &mut Criterion) {
    c.bench_function("join_queue_1000_players", |b| {
        b.iter(|| {
            let mut matcher = Matcher::new(180, 300, 10).unwrap();
            for i in 0..1000 {
                let id = format!("player-{i}");
                matcher.join_queue(&id, 0, (i % 300) as i64).unwrap();
            }
            black_box(matcher.player_in_queue_count());
        });
    });
}

fn bench_match_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_pass");
    for &size in &[100usize, 1_000, 5_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let mut matcher = Matcher::new(180, 300, 10).unwrap();
                    for i in 0..size {
                        let id = format!("player-{i}");
                        matcher.join_queue(&id, 0, (i % 300) as i64).unwrap();
                    }
                    matcher
                },
                |mut matcher| {
                    matcher.run_match(0, 25);
                    black_box(matcher.group_count());
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_join_queue, bench_match_pass);
criterion_main!(benches);
