use aquabus_rs::meter::frame::parse_response;
use aquabus_rs::payload::decode::decode_reading;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn hex_to_bytes(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

fn benchmark_parse_response(c: &mut Criterion) {
    let data = hex_to_bytes("681313680801780F12345678841C130000123402064C574816");

    c.bench_function("parse_response", |b| {
        b.iter(|| {
            let result = parse_response(black_box(&data));
            let _ = black_box(result);
        })
    });
}

fn benchmark_decode_reading(c: &mut Criterion) {
    let data = hex_to_bytes("681313680801780F12345678841C130000123402064C574816");
    let frame = parse_response(&data).unwrap();

    c.bench_function("decode_reading", |b| {
        b.iter(|| {
            let result = decode_reading(black_box(&frame));
            let _ = black_box(result);
        })
    });
}

criterion_group!(benches, benchmark_parse_response, benchmark_decode_reading);
criterion_main!(benches);
