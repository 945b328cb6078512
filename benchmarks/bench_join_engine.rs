use std::hint::black_box;
use std::io::{self, Cursor};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use fieldjoin::cancel::CancellationToken;
use fieldjoin::config::{JoinOptions, UnpairedSides};
use fieldjoin::pipeline::{run_join, Diagnostics, NamedInput};

/// `rows` lines keyed round-robin over `keys` distinct keys
fn keyed_input(rows: usize, keys: usize, payload: &str) -> Vec<u8> {
    let mut text = String::with_capacity(rows * 16);
    for i in 0..rows {
        text.push_str(&format!("key{} {}{}\n", i % keys, payload, i));
    }
    text.into_bytes()
}

fn join_once(options: &JoinOptions, left: &[u8], right: &[u8]) -> usize {
    let token = CancellationToken::new();
    let mut out = io::sink();
    let mut diag = Diagnostics::new(io::sink(), false);
    let stats = run_join(
        options,
        NamedInput::new("left", Cursor::new(left)),
        NamedInput::new("right", Cursor::new(right)),
        &mut out,
        &mut diag,
        &token,
    )
    .unwrap();
    stats.rows_written()
}

fn bench_one_to_one(c: &mut Criterion) {
    let mut group = c.benchmark_group("one_to_one");
    for rows in [1_000usize, 10_000, 100_000] {
        let left = keyed_input(rows, rows, "l");
        let right = keyed_input(rows, rows, "r");
        let options = JoinOptions::default();
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, _| {
            b.iter(|| black_box(join_once(&options, &left, &right)));
        });
    }
    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    // 10_000 rows per side over 100 keys: 100 x 100 products per key
    let left = keyed_input(10_000, 100, "l");
    let right = keyed_input(10_000, 100, "r");
    let options = JoinOptions::default();
    c.bench_function("fan_out_100_keys", |b| {
        b.iter(|| black_box(join_once(&options, &left, &right)));
    });
}

fn bench_outer_mostly_unpaired(c: &mut Criterion) {
    let left = keyed_input(50_000, 50_000, "l");
    let right: Vec<u8> = keyed_input(50_000, 50_000, "r")
        .split(|b| *b == b'\n')
        .filter(|line| !line.is_empty())
        .flat_map(|line| [b"x".as_slice(), line, b"\n"].concat())
        .collect();
    let options = JoinOptions {
        unpaired: UnpairedSides::both(),
        ..JoinOptions::default()
    };
    c.bench_function("outer_disjoint_50k", |b| {
        b.iter(|| black_box(join_once(&options, &left, &right)));
    });
}

fn bench_ignore_case(c: &mut Criterion) {
    let left = keyed_input(20_000, 20_000, "l");
    let right = String::from_utf8(keyed_input(20_000, 20_000, "r"))
        .unwrap()
        .to_uppercase()
        .into_bytes();
    let options = JoinOptions {
        ignore_case: true,
        ..JoinOptions::default()
    };
    c.bench_function("ignore_case_20k", |b| {
        b.iter(|| black_box(join_once(&options, &left, &right)));
    });
}

criterion_group!(
    benches,
    bench_one_to_one,
    bench_fan_out,
    bench_outer_mostly_unpaired,
    bench_ignore_case
);
criterion_main!(benches);
