#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for full render requests (parse, composite, quantize).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use epd_render::renderer::Renderer;
use serde_json::{json, Value};

fn dashboard(count: usize) -> Vec<Value> {
    let mut elements = vec![json!({"type": "debug_grid", "spacing": 40})];
    for i in 0..count {
        let x = (i * 37) % 700;
        let y = (i * 53) % 400;
        elements.push(match i % 5 {
            0 => json!({"type": "text", "x": x, "y": y, "value": format!("[red]{i}[/red] items"), "size": 16}),
            1 => json!({"type": "rectangle", "x_start": x, "y_start": y, "x_end": x + 60, "y_end": y + 30, "outline": "black", "width": 2, "radius": 6}),
            2 => json!({"type": "arc", "x": x + 20, "y": y + 20, "radius": 20, "start_angle": 0, "end_angle": 270, "width": 3}),
            3 => json!({"type": "line", "x_start": x, "y_start": y, "x_end": x + 80, "y_end": y + 40, "dashed": true, "width": 2}),
            _ => json!({"type": "progress_bar", "x_start": x, "y_start": y, "x_end": x + 90, "y_end": y + 12, "progress": 64, "opacity": 0.7}),
        });
    }
    elements
}

fn render_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let renderer = Renderer::new();
    let canvas = json!({"width": 800, "height": 480, "palette": "bwr"});

    for count in [10, 50, 200] {
        let elements = dashboard(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &elements, |b, els| {
            b.iter(|| renderer.render(black_box(&canvas), black_box(els), None).expect("render should succeed"));
        });
    }

    group.finish();
}

fn rotation_benchmark(c: &mut Criterion) {
    let renderer = Renderer::new();
    let elements: Vec<Value> = dashboard(20)
        .into_iter()
        .map(|mut e| {
            e["rotate"] = json!(30);
            e
        })
        .collect();
    let canvas = json!({"width": 800, "height": 480, "palette": "bwr", "rotation": 90});

    c.bench_function("render_rotated_20", |b| {
        b.iter(|| renderer.render(black_box(&canvas), black_box(&elements), None).expect("render should succeed"));
    });
}

criterion_group!(benches, render_benchmark, rotation_benchmark);
criterion_main!(benches);
