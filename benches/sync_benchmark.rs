/*!
 * Synchronized Container Benchmarks
 *
 * Queue hand-off latency, batch tail pops, and map reader throughput
 */

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use std::thread;
use threadsafe_containers::{SyncMap, SyncQueue, SyncVec};

fn bench_queue_hand_off(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_hand_off");

    for items in [100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, &items| {
            b.iter(|| {
                let queue = Arc::new(SyncQueue::new());
                let consumer = {
                    let queue = queue.clone();
                    thread::spawn(move || (0..items).map(|_| queue.wait_and_pop()).sum::<u64>())
                };

                for i in 0..items {
                    queue.push(i);
                }
                black_box(consumer.join().unwrap());
            });
        });
    }

    group.finish();
}

fn bench_vector_batch_pop(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_batch_pop");

    for batch in [1usize, 16, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &batch| {
            let v: SyncVec<u64> = SyncVec::with_capacity(4_096);
            b.iter(|| {
                v.extend(0..4_096);
                while !v.try_pop(batch).is_empty() {}
                black_box(v.len());
            });
        });
    }

    group.finish();
}

fn bench_map_readers(c: &mut Criterion) {
    let mut group = c.benchmark_group("map_readers");

    let map: Arc<SyncMap<u64, u64>> = Arc::new((0..1_024).map(|k| (k, k)).collect());

    for readers in [1usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(readers),
            &readers,
            |b, &readers| {
                b.iter(|| {
                    let handles: Vec<_> = (0..readers)
                        .map(|_| {
                            let map = map.clone();
                            thread::spawn(move || {
                                (0..1_024u64).filter(|k| map.contains_key(k)).count()
                            })
                        })
                        .collect();

                    for handle in handles {
                        black_box(handle.join().unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_queue_hand_off,
    bench_vector_batch_pop,
    bench_map_readers
);
criterion_main!(benches);
