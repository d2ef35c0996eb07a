//! Lexer Benchmarks
//!
//! Throughput of tokenizing object-heavy input, xref tables and raw stream data.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use oxidize_pdf_lexer::{read_xref_table, Lexer, LexerOptions, Token};
use std::io::Cursor;

/// Generate object-heavy input of roughly `objects * 90` bytes
fn generate_objects(objects: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..objects {
        data.extend_from_slice(
            format!(
                "{i} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612.0 792] /Name (Page#{i}) >>\nendobj\n"
            )
            .as_bytes(),
        );
    }
    data
}

fn generate_xref(entries: usize) -> Vec<u8> {
    let mut data = format!("xref\n0 {entries}\n").into_bytes();
    for i in 0..entries {
        data.extend_from_slice(format!("{:010} 00000 n\r\n", i * 97).as_bytes());
    }
    data.extend_from_slice(b"trailer\n");
    data
}

fn count_tokens(data: &[u8], options: LexerOptions) -> usize {
    let mut lexer = Lexer::with_options(Cursor::new(data), options);
    let mut count = 0;
    while lexer.next_token().unwrap() != Token::Eof {
        count += 1;
    }
    count
}

/// Benchmark tokenizing with different chunk sizes
fn benchmark_tokenize(c: &mut Criterion) {
    let data = generate_objects(2_000);
    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk_size in [256usize, 1024, 64 * 1024] {
        let options = LexerOptions::default().with_chunk_size(chunk_size);
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &options,
            |b, options| b.iter(|| count_tokens(black_box(&data), options.clone())),
        );
    }

    group.finish();
}

/// Benchmark reading a classic xref table
fn benchmark_xref(c: &mut Criterion) {
    let data = generate_xref(10_000);
    let mut group = c.benchmark_group("xref");
    group.throughput(Throughput::Elements(10_000));

    group.bench_function("read_xref_table", |b| {
        b.iter(|| {
            let mut lexer = Lexer::new(Cursor::new(black_box(&data[..])));
            read_xref_table(&mut lexer).unwrap().len()
        })
    });

    group.finish();
}

/// Benchmark raw byte reads of stream payloads
fn benchmark_raw_reads(c: &mut Criterion) {
    let mut data = b"stream\n".to_vec();
    data.extend((0..1_000_000u32).map(|i| (i % 251) as u8));
    data.extend_from_slice(b"\nendstream");

    c.bench_function("read_until_endstream", |b| {
        b.iter(|| {
            let mut lexer = Lexer::with_options(Cursor::new(black_box(&data[..])), LexerOptions::large_file());
            lexer.expect_keyword("stream").unwrap();
            lexer.read_newline().unwrap();
            lexer.read_until_sequence(b"endstream").unwrap().len()
        })
    });
}

criterion_group!(benches, benchmark_tokenize, benchmark_xref, benchmark_raw_reads);
criterion_main!(benches);
