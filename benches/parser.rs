//! Parser and screen throughput benchmarks

use std::io::Write;

use ansi_screen::Screen;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn bench_plain_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Plain ASCII text
    let plain_text = "Hello, World! ".repeat(1000);
    group.throughput(Throughput::Bytes(plain_text.len() as u64));

    group.bench_function("plain_text", |b| {
        b.iter(|| {
            let mut screen = Screen::new();
            screen.write_all(black_box(plain_text.as_bytes())).unwrap();
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_csi_sequences(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // CSI sequences (cursor movement, SGR)
    let csi_heavy = "\x1b[1;31mRed\x1b[0m \x1b[5;10H\x1b[2J".repeat(100);
    group.throughput(Throughput::Bytes(csi_heavy.len() as u64));

    group.bench_function("csi_sequences", |b| {
        b.iter(|| {
            let mut screen = Screen::new();
            screen.write_all(black_box(csi_heavy.as_bytes())).unwrap();
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_mixed_content(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Mixed content (typical build log output)
    let mixed = "Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n".repeat(500);
    group.throughput(Throughput::Bytes(mixed.len() as u64));

    group.bench_function("mixed_content", |b| {
        b.iter(|| {
            let mut screen = Screen::new();
            screen.write_all(black_box(mixed.as_bytes())).unwrap();
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_scroll_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // A capped buffer constantly evicting and recycling lines
    let log = "a line of build output that scrolls away\n".repeat(1000);
    group.throughput(Throughput::Bytes(log.len() as u64));

    group.bench_function("scroll_out", |b| {
        b.iter(|| {
            let mut screen = Screen::builder().max_size(0, 100).build().unwrap();
            screen.write_all(black_box(log.as_bytes())).unwrap();
            black_box(screen.lines_scrolled_out)
        })
    });

    group.finish();
}

fn bench_render_html(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let mixed = "Line 1: \x1b[32mOK\x1b[0m\r\nLine 2: \x1b[31mERROR\x1b[0m\r\n".repeat(500);
    let mut screen = Screen::new();
    screen.write_all(mixed.as_bytes()).unwrap();

    group.bench_function("as_html", |b| b.iter(|| black_box(screen.as_html())));
    group.bench_function("as_plain_text", |b| {
        b.iter(|| black_box(screen.as_plain_text()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_plain_text,
    bench_csi_sequences,
    bench_mixed_content,
    bench_scroll_out,
    bench_render_html
);

criterion_main!(benches);
