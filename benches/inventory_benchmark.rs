//! Benchmarks for presentation inspection and editing.
//!
//! Run with: cargo bench
//!
//! Decks are generated with the create operation at several slide counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;
use slidedeck::create::{build_presentation, PresentationSpec};
use slidedeck::inventory::{inventory_of, to_json, JsonFormat};
use slidedeck::Presentation;

/// Creates a deck with a title, a body box and an overlapping note per slide.
fn create_test_deck(slide_count: usize) -> Vec<u8> {
    let slides: Vec<_> = (0..slide_count)
        .map(|i| {
            json!({"shapes": [
                {"type": "textbox", "left": 0.5, "top": 0.4, "width": 9, "height": 0.8,
                 "text": format!("Slide {} title", i), "font_size": 32, "bold": true},
                {"type": "textbox", "left": 0.5, "top": 1.5, "width": 6, "height": 2,
                 "paragraphs": [
                    {"text": "First point with enough words to wrap across the box width", "bullet": true},
                    {"text": "Second point", "bullet": true},
                    {"text": "Third point", "bullet": true}
                 ]},
                {"type": "rectangle", "left": 5, "top": 3, "width": 3, "height": 1,
                 "text": "Note", "fill": "#FFEEAA"}
            ]})
        })
        .collect();
    let spec: PresentationSpec = serde_json::from_value(json!({ "slides": slides })).unwrap();
    build_presentation(&spec).unwrap().to_bytes().unwrap()
}

/// Benchmark opening a deck and building its inventory.
fn bench_inventory(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory");

    for slide_count in [1, 10, 50, 200].iter() {
        let data = create_test_deck(*slide_count);
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::new("slides", slide_count), &data, |b, data| {
            b.iter(|| {
                let pres = Presentation::from_bytes(black_box(data.clone())).unwrap();
                let _ = inventory_of(&pres, false);
            });
        });
    }

    group.finish();
}

/// Benchmark inventory serialization.
fn bench_inventory_json(c: &mut Criterion) {
    let mut group = c.benchmark_group("inventory_json");

    for slide_count in [10, 200].iter() {
        let pres = Presentation::from_bytes(create_test_deck(*slide_count)).unwrap();
        let inventory = inventory_of(&pres, false).unwrap();
        group.bench_with_input(BenchmarkId::new("slides", slide_count), &inventory, |b, inv| {
            b.iter(|| {
                let _ = to_json(black_box(inv), JsonFormat::Pretty);
            });
        });
    }

    group.finish();
}

/// Benchmark duplicating and reordering slides.
fn bench_rearrange(c: &mut Criterion) {
    let data = create_test_deck(50);
    let sequence: Vec<i64> = (0..50).rev().chain(0..10).collect();

    c.bench_function("rearrange_50_slides", |b| {
        b.iter(|| {
            let mut pres = Presentation::from_bytes(data.clone()).unwrap();
            slidedeck::rearrange::rearrange(&mut pres, black_box(&sequence)).unwrap();
        });
    });
}

criterion_group!(benches, bench_inventory, bench_inventory_json, bench_rearrange);
criterion_main!(benches);
