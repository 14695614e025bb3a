use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fmalloc::{free, malloc};
use std::os::raw::c_void;

fn bench_tiny_round_trip(c: &mut Criterion) {
    c.bench_function("malloc_free_tiny_64", |b| {
        b.iter(|| unsafe {
            let p = malloc(black_box(64));
            free(p);
        })
    });
}

fn bench_small_round_trip(c: &mut Criterion) {
    c.bench_function("malloc_free_small_512", |b| {
        b.iter(|| unsafe {
            let p = malloc(black_box(512));
            free(p);
        })
    });
}

fn bench_large_round_trip(c: &mut Criterion) {
    c.bench_function("malloc_free_large_8192", |b| {
        b.iter(|| unsafe {
            let p = malloc(black_box(8192));
            free(p);
        })
    });
}

fn bench_sustained_tiny_churn(c: &mut Criterion) {
    c.bench_function("malloc_free_tiny_churn_200", |b| {
        b.iter(|| unsafe {
            let mut pointers: Vec<*mut c_void> = Vec::with_capacity(200);
            for _ in 0..200 {
                pointers.push(malloc(black_box(48)));
            }
            for p in pointers {
                free(p);
            }
        })
    });
}

criterion_group!(
    benches,
    bench_tiny_round_trip,
    bench_small_round_trip,
    bench_large_round_trip,
    bench_sustained_tiny_churn
);
criterion_main!(benches);
