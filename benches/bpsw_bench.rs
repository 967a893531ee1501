//! Benchmarks for the Miller / strong Lucas-Selfridge / BPSW primality
//! stack and Pollard-Rho factoring.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rug::Integer;
use weirdodd::{bpsw, lucas, miller, rho};

fn bench_miller_mersenne_prime(c: &mut Criterion) {
    let n = Integer::from(1u32) << 127u32;
    let n = n - 1u32; // 2^127 - 1, a Mersenne prime
    c.bench_function("miller(M127, base 2)", |b| {
        b.iter(|| miller::is_strong_probable_prime(black_box(&n), 2));
    });
}

fn bench_lucas_mersenne_prime(c: &mut Criterion) {
    let n = Integer::from(1u32) << 127u32;
    let n = n - 1u32;
    c.bench_function("lucas(M127)", |b| {
        b.iter(|| lucas::is_strong_probable_prime(black_box(&n)).unwrap());
    });
}

fn bench_bpsw_mersenne_prime(c: &mut Criterion) {
    let n = Integer::from(1u32) << 127u32;
    let n = n - 1u32;
    c.bench_function("bpsw(M127)", |b| {
        b.iter(|| bpsw::is_probable_prime(black_box(&n)).unwrap());
    });
}

fn bench_bpsw_carmichael_561(c: &mut Criterion) {
    let n = Integer::from(561u32);
    c.bench_function("bpsw(561, Carmichael)", |b| {
        b.iter(|| bpsw::is_probable_prime(black_box(&n)).unwrap());
    });
}

fn bench_rho_semiprime(c: &mut Criterion) {
    let n = Integer::from(1_000_003u64) * Integer::from(1_000_033u64);
    c.bench_function("rho::find_factor(1000003*1000033, c=1)", |b| {
        b.iter(|| rho::find_factor(black_box(&n), 1));
    });
}

criterion_group!(
    benches,
    bench_miller_mersenne_prime,
    bench_lucas_mersenne_prime,
    bench_bpsw_mersenne_prime,
    bench_bpsw_carmichael_561,
    bench_rho_semiprime
);
criterion_main!(benches);
