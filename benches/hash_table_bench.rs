use chained_collections::{HashTable, Iterable, NativeEq, StringHash};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

fn filled(seed: u64, n: usize) -> (HashTable<String, u64>, Vec<String>) {
    let mut t = HashTable::empty();
    let keys: Vec<String> = lcg(seed).take(n).map(key).collect();
    for (i, k) in keys.iter().enumerate() {
        t.add(k.clone(), i as u64);
    }
    (t, keys)
}

fn sample<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    let mut s = 0x9e3779b97f4a7c15u64;
    (0..n)
        .map(|_| {
            s = s.wrapping_mul(2862933555777941757).wrapping_add(3037000493);
            items[(s as usize) % items.len()].clone()
        })
        .collect()
}

fn bench_add_fresh_100k(c: &mut Criterion) {
    c.bench_function("table::add_fresh_100k", |b| {
        b.iter_batched(
            HashTable::<String, u64>::empty,
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    t.add(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("table::add_fresh_100k_string_hash", |b| {
        b.iter_batched(
            || HashTable::<String, u64, _, _>::empty_under(NativeEq, StringHash),
            |mut t| {
                for (i, x) in lcg(1).take(100_000).enumerate() {
                    t.add(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_add_presized_100k(c: &mut Criterion) {
    c.bench_function("table::add_presized_100k", |b| {
        b.iter_batched(
            || {
                // Grown once and cleared; capacity survives `clear`.
                let (mut t, _) = filled(2, 110_000);
                t.clear();
                t
            },
            |mut t| {
                for (i, x) in lcg(3).take(100_000).enumerate() {
                    t.add(key(x), i as u64);
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_remove_random_10k(c: &mut Criterion) {
    c.bench_function("table::remove_random_10k_of_110k", |b| {
        b.iter_batched(
            || {
                let (t, keys) = filled(5, 110_000);
                let to_remove = sample(&keys, 10_000);
                (t, to_remove)
            },
            |(mut t, to_remove)| {
                for k in &to_remove {
                    black_box(t.remove(k));
                }
                black_box(t)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit_10k(c: &mut Criterion) {
    c.bench_function("table::get_hit_10k_on_100k", |b| {
        let (t, keys) = filled(7, 100_000);
        let queries = sample(&keys, 10_000);
        b.iter(|| {
            for k in &queries {
                black_box(t.get(k));
            }
        })
    });
}

fn bench_get_miss_10k(c: &mut Criterion) {
    c.bench_function("table::get_miss_10k_on_100k", |b| {
        let (t, _) = filled(11, 100_000);
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            for _ in 0..10_000 {
                let k = key(miss.next().unwrap_or_default());
                black_box(t.get(&k));
            }
        })
    });
}

fn bench_traverse_100k(c: &mut Criterion) {
    let (t, _) = filled(999, 100_000);

    c.bench_function("table::iter_all_100k", |b| {
        b.iter(|| {
            let mut sum = 0u64;
            for (_k, v) in t.iter() {
                sum = sum.wrapping_add(*v);
            }
            black_box(sum)
        })
    });

    c.bench_function("table::values_fold_100k", |b| {
        b.iter(|| black_box(t.values().fold_left(0u64, |acc, v| acc.wrapping_add(*v))))
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(12)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(1))
}

criterion_group! {
    name = benches_add;
    config = bench_config();
    targets = bench_add_fresh_100k, bench_add_presized_100k
}
criterion_group! {
    name = benches_ops;
    config = bench_config();
    targets = bench_remove_random_10k,
              bench_get_hit_10k,
              bench_get_miss_10k,
              bench_traverse_100k
}
criterion_main!(benches_add, benches_ops);
