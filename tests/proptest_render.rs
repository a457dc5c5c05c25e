//! Property tests for render determinism and visibility.

#![allow(clippy::unwrap_used, missing_docs)]

use epd_render::framebuffer::Framebuffer;
use epd_render::prelude::*;
use proptest::prelude::*;
use serde_json::{json, Value};

fn dither_strategy() -> impl Strategy<Value = Dither> {
    prop_oneof![
        Just(Dither::None),
        Just(Dither::Ordered),
        Just(Dither::FloydSteinberg),
        Just(Dither::Atkinson),
        Just(Dither::Burkes),
    ]
}

fn palette_strategy() -> impl Strategy<Value = PaletteId> {
    (0..PaletteId::ALL.len()).prop_map(|i| PaletteId::ALL[i])
}

fn shape_strategy() -> impl Strategy<Value = Value> {
    let color = prop_oneof![Just("black"), Just("red"), Just("white"), Just("yellow")];
    (0u32..48, 0u32..32, 1u32..24, 1u32..24, color, 0u32..4, -90i32..90).prop_map(|(x, y, w, h, c, kind, rot)| {
        match kind {
            0 => json!({"type": "rectangle", "x_start": x, "y_start": y, "x_end": x + w, "y_end": y + h, "fill": c, "rotate": rot}),
            1 => json!({"type": "circle", "x": x, "y": y, "radius": w / 2, "outline": c, "width": 2}),
            2 => json!({"type": "line", "x_start": x, "y_start": y, "x_end": x + w, "y_end": y + h, "color": c, "dashed": true}),
            _ => json!({"type": "text", "x": x, "y": y, "value": format!("[{c}]{w}[/{c}]"), "anchor": "center"}),
        }
    })
}

fn extreme_number() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(-1e300),
        Just(-1e12),
        Just(-3e9),
        Just(-1.0),
        Just(0.0),
        Just(7.5),
        Just(3e9),
        Just(1e12),
        Just(1e300),
        -100.0..100.0f64,
    ]
}

fn extreme_size() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(1.0), Just(3.0), Just(80_000.0), Just(3e9), Just(1e12)]
}

/// One record of any kind with numeric fields drawn from far outside the canvas.
fn extreme_element_strategy() -> impl Strategy<Value = Value> {
    (prop::array::uniform8(extreme_number()), extreme_size(), extreme_size(), 0u32..13, any::<bool>()).prop_map(
        |(n, size, width, kind, dashed)| {
            let [x0, y0, x1, y1, a, b, c, d] = n;
            match kind {
                0 => json!({"type": "text", "x": x0, "y": y0, "value": "[red]Wide[/red]\nline", "size": size, "rotate": a}),
                1 => json!({"type": "line", "points": [[x0, y0], [x1, y1], [a, b]], "width": width, "dashed": dashed}),
                2 => json!({"type": "rectangle", "x_start": x0, "y_start": y0, "x_end": x1, "y_end": y1,
                            "fill": "red", "outline": "black", "width": width, "radius": size, "dashed": dashed}),
                3 => json!({"type": "circle", "x": x0, "y": y0, "radius": size, "outline": "black", "width": width}),
                4 => json!({"type": "ellipse", "x_start": x0, "y_start": y0, "x_end": x1, "y_end": y1, "fill": "black"}),
                5 => json!({"type": "arc", "x": x0, "y": y0, "radius": size, "start_angle": a, "end_angle": b,
                            "width": width, "dashed": dashed}),
                6 => json!({"type": "polygon", "points": [[x0, y0], [x1, y1], [a, b], [c, d]], "fill": "red",
                            "outline": "black", "width": width}),
                7 => json!({"type": "plot", "x_start": x0, "y_start": y0, "x_end": x1, "y_end": y1,
                            "data": [[a, b], [c, d], [0, null], [1, 1e300]], "width": width, "x_grid": size,
                            "y_grid": width, "frame": "black", "labels": true, "size": size, "y_min": c}),
                8 => json!({"type": "icon", "x": x0, "y": y0, "value": "mdi:home", "size": size}),
                9 => json!({"type": "dlimg", "x": x0, "y": y0, "url": "a.png", "xsize": size, "ysize": width}),
                10 => json!({"type": "progress_bar", "x_start": x0, "y_start": y0, "x_end": x1, "y_end": y1,
                             "progress": a, "width": width, "show_percentage": true, "size": size}),
                11 => json!({"type": "debug_grid", "spacing": size, "font_size": width, "label_step": size}),
                _ => json!({"type": "text", "x": x0, "y": y0, "value": "wrapped words here", "max_width": x1,
                            "spacing": size, "anchor": "br"}),
            }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_quantize_deterministic(
        pixels in prop::collection::vec(any::<[u8; 4]>(), 12 * 9),
        palette in palette_strategy(),
        dither in dither_strategy(),
    ) {
        let flat: Vec<u8> = pixels.concat();
        let fb = Framebuffer::from_rgba(12, 9, &flat).unwrap();
        let a = quantize(&fb, palette, dither);
        let b = quantize(&fb, palette, dither);
        prop_assert_eq!(a.indices(), b.indices());
        let p = palette.palette();
        prop_assert!(a.indices().iter().all(|&i| p.is_target(i)));
    }

    #[test]
    fn prop_render_deterministic(
        shapes in prop::collection::vec(shape_strategy(), 0..6),
        dither in dither_strategy(),
    ) {
        let canvas = json!({"width": 64, "height": 40, "palette": "bwry", "dither": dither.name()});
        let renderer = Renderer::new();
        let a = renderer.render(&canvas, &shapes, None).unwrap();
        let b = renderer.render(&canvas, &shapes, Some(&a.raster)).unwrap();
        prop_assert_eq!(a.raster.indices(), b.raster.indices());
        prop_assert_eq!(b.refresh, RefreshScope::Unchanged);
    }

    #[test]
    fn prop_hidden_element_has_no_effect(
        shapes in prop::collection::vec(shape_strategy(), 1..5),
        hidden in shape_strategy(),
        at in 0usize..5,
    ) {
        let canvas = json!({"width": 64, "height": 40, "palette": "bwr"});
        let renderer = Renderer::new();

        let mut hidden = hidden;
        hidden["visible"] = json!(false);
        let mut with_hidden = shapes.clone();
        with_hidden.insert(at.min(shapes.len()), hidden);

        let a = renderer.render(&canvas, &shapes, None).unwrap();
        let b = renderer.render(&canvas, &with_hidden, None).unwrap();
        prop_assert_eq!(a.raster.indices(), b.raster.indices());
    }

    #[test]
    fn prop_extreme_numbers_render(
        elements in prop::collection::vec(extreme_element_strategy(), 1..4),
        quarter in 0u32..4,
    ) {
        let canvas = json!({"width": 32, "height": 24, "palette": "bwr", "rotation": quarter * 90});
        let icons = MemoryResources::new().with_icon("home", IconBitmap::from_ascii(&["#.", ".#"]));
        let out = Renderer::with_resources(icons).render(&canvas, &elements, None);
        prop_assert!(out.is_ok(), "{:?}", out.err());
        let out = out.unwrap();
        prop_assert_eq!(out.raster.indices().len(), 32 * 24);
    }
}
