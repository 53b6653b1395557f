//! Text Segmentation Benchmarks
//!
//! Performance benchmarks for HFML page splitting and volume assembly.
//!
//! Run with: `cargo bench --bench text_segmentation`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use pecha_server::opf::{PageRecord, PaginationLayer, PechaMeta, Span};
use pecha_server::text::segment::{split_durchen, split_pages};
use pecha_server::text::{construct_text, page_index, VolumeSource};

/// Synthetic volume with `pages` body pages of five lines each and a durchen block
fn create_volume(pages: i64) -> String {
    let mut hfml = String::new();
    for n in 1..=pages {
        let index = page_index(n);
        hfml.push_str(&format!("[{}]\n", index));
        for line in 1..=5 {
            hfml.push_str(&format!("[{}.{}]བཅོམ་ལྡན་འདས་ཀྱིས་བཀའ་སྩལ་པ།\n", index, line));
        }
    }
    let durchen = page_index(pages + 1);
    hfml.push_str(&format!("<d[{}]\n[{}.1]མཆན་ d>", durchen, durchen));
    hfml
}

fn create_pagination(pages: i64) -> PaginationLayer {
    let mut layer = PaginationLayer::default();
    for n in 1..=pages + 1 {
        let start = n as usize * 100;
        layer.annotations.insert(
            format!("page-{}", n),
            PageRecord::new(page_index(n), Span { start, end: start + 99 }),
        );
    }
    layer
}

/// Benchmark page splitting
fn bench_split_pages(c: &mut Criterion) {
    let mut group = c.benchmark_group("split_pages");
    group.measurement_time(Duration::from_secs(10));

    for pages in [10, 100, 1000] {
        let hfml = create_volume(pages);
        group.throughput(Throughput::Bytes(hfml.len() as u64));
        group.bench_with_input(BenchmarkId::new("volume", pages), &hfml, |b, text| {
            b.iter(|| {
                let split = split_durchen(black_box(text));
                black_box(split_pages(split.body))
            })
        });
    }

    group.finish();
}

/// Benchmark full assembly against a pagination layer
fn bench_construct_text(c: &mut Criterion) {
    let meta = PechaMeta {
        work_id: "W1PD96682".to_string(),
        img_grp_offset: 0,
        pref: "I1PD".to_string(),
        ..Default::default()
    };

    let mut group = c.benchmark_group("construct_text");

    for pages in [10, 100, 500] {
        let volumes = vec![VolumeSource {
            vol: 1,
            hfml: create_volume(pages),
            pagination: create_pagination(pages),
        }];
        group.bench_with_input(BenchmarkId::new("volume", pages), &volumes, |b, volumes| {
            b.iter(|| black_box(construct_text("bench-text", &meta, black_box(volumes))))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_split_pages, bench_construct_text);
criterion_main!(benches);
