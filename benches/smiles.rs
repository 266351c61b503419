use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cansmi::{generate, parse, Molecule};

const METHANE: &str = "C";
const CAFFEINE: &str = "Cn1cnc2c1c(=O)n(C)c(=O)n2C";
const ATORVASTATIN: &str =
    "CC(C)c1c(C(=O)Nc2ccccc2)c(-c2ccccc2)c(-c2ccc(F)cc2)n1CC[C@@H](O)C[C@@H](O)CC(=O)O";

fn molecules(smiles: &str) -> Vec<Molecule> {
    let result = parse(smiles);
    assert!(result.errors.is_empty(), "bench input failed: {:?}", result.errors);
    result.molecules
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("methane", |b| {
        b.iter(|| black_box(parse(black_box(METHANE))))
    });
    group.bench_function("caffeine", |b| {
        b.iter(|| black_box(parse(black_box(CAFFEINE))))
    });
    group.bench_function("atorvastatin", |b| {
        b.iter(|| black_box(parse(black_box(ATORVASTATIN))))
    });

    group.finish();
}

fn bench_write(c: &mut Criterion) {
    let methane = molecules(METHANE);
    let caffeine = molecules(CAFFEINE);
    let atorvastatin = molecules(ATORVASTATIN);

    let mut group = c.benchmark_group("write");

    group.bench_function("methane", |b| {
        b.iter(|| black_box(generate(black_box(&methane), false)))
    });
    group.bench_function("caffeine", |b| {
        b.iter(|| black_box(generate(black_box(&caffeine), false)))
    });
    group.bench_function("atorvastatin", |b| {
        b.iter(|| black_box(generate(black_box(&atorvastatin), false)))
    });

    group.finish();
}

fn bench_canonical(c: &mut Criterion) {
    let methane = molecules(METHANE);
    let caffeine = molecules(CAFFEINE);
    let atorvastatin = molecules(ATORVASTATIN);

    let mut group = c.benchmark_group("canonical");

    group.bench_function("methane", |b| {
        b.iter(|| black_box(generate(black_box(&methane), true)))
    });
    group.bench_function("caffeine", |b| {
        b.iter(|| black_box(generate(black_box(&caffeine), true)))
    });
    group.bench_function("atorvastatin", |b| {
        b.iter(|| black_box(generate(black_box(&atorvastatin), true)))
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_write, bench_canonical);
criterion_main!(benches);
