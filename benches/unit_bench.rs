//! Unit Engine Benchmarks
//!
//! - Unit-string parsing against a registry
//! - Conversion of arrays between units
//! - Arithmetic on unit-carrying arrays

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use ndarray::Array1;
use simunits::{CodeScales, Dataset, Unit, UnitArray, UnitRegistry, make_value};

const UNIT_STRINGS: &[&str] = &[
    "cm",
    "km/s",
    "kg*m**2/s**3",
    "erg/(cm**2*s)",
    "g**(1/2)/(cm**(1/2)*s)",
    "Msun/kpc**3",
];

// ============================================================================
// Parsing
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let registry = UnitRegistry::new();
    let mut group = c.benchmark_group("parse");

    for spec in UNIT_STRINGS {
        group.throughput(Throughput::Bytes(spec.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(spec), spec, |b, s| {
            b.iter(|| Unit::parse(black_box(s), &registry))
        });
    }

    let ds = Dataset::new("bench", CodeScales::new(3.0e24, 2.0e43, 3.15e16)).unwrap();
    group.bench_function("code_units", |b| {
        b.iter(|| ds.unit(black_box("code_mass/code_length**3")))
    });

    group.finish();
}

// ============================================================================
// Conversion
// ============================================================================

fn payload(n: usize) -> Array1<f64> {
    Array1::linspace(1.0, n as f64, n)
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");

    for n in [1_000usize, 100_000] {
        let values = make_value(payload(n), "kpc").unwrap();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("in_units", n), &values, |b, v| {
            b.iter(|| v.in_units(black_box("km")))
        });
        group.bench_with_input(BenchmarkId::new("in_cgs", n), &values, |b, v| {
            b.iter(|| v.in_cgs())
        });
    }

    group.finish();
}

// ============================================================================
// Arithmetic
// ============================================================================

fn bench_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("arithmetic");

    for n in [1_000usize, 100_000] {
        let mass: UnitArray<_> = make_value(payload(n), "Msun").unwrap();
        let volume = make_value(payload(n), "kpc**3").unwrap();
        let other = make_value(payload(n), "g").unwrap();
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(BenchmarkId::new("divide", n), |b| {
            b.iter(|| black_box(&mass / &volume))
        });
        group.bench_function(BenchmarkId::new("add_mixed_units", n), |b| {
            b.iter(|| black_box(mass.try_add(&other)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_convert, bench_arithmetic);

criterion_main!(benches);
