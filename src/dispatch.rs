// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Primitive dispatcher (C7): resolves inputs, computes bounds, calls the
//! per-kind algorithm, clips to the resolved subregion, and stores the
//! result.

use crate::bounds::resolve_subregion;
use crate::context::FilterContext;
use crate::geom::IRect;
use crate::input::resolve_input;
use crate::primitive::{Kind, Primitive, TransferFunction};
use crate::primitives::{
    blend, color_matrix, component_transfer, composite, convolve_matrix, displacement_map, flood, gaussian_blur,
    image, lighting, merge, morphology, offset, tile, turbulence,
};
use crate::raster::Raster;

/// Runs one primitive against `ctx`, storing its (clipped) output as the new
/// last-result and, if named, in the cache.
///
/// `filter_region` is the whole-filter device-space clip rectangle.
/// `ctx.paffine()` must already be composed with the object bounding box
/// when `primitiveUnits = objectBoundingBox` (see `bounds::resolve_subregion`).
pub fn run_primitive(ctx: &mut FilterContext, primitive: &Primitive, filter_region: IRect) {
    let (mut raster, _input_bounds) = compute(ctx, &primitive.kind, filter_region);

    let subregion = resolve_subregion(primitive, filter_region, ctx.paffine());
    raster.clip_to(subregion);

    ctx.store_result(&primitive.result, raster, subregion);
}

fn compute(ctx: &mut FilterContext, kind: &Kind, filter_region: IRect) -> (Raster, IRect) {
    let (w, h) = (ctx.source_graphic().width(), ctx.source_graphic().height());

    match kind {
        Kind::Blend(k) => {
            let a = resolve_input(ctx, &k.input1);
            let b = resolve_input(ctx, &k.input2);
            (blend::apply(&a.raster, &b.raster, k.mode), a.bounds.union(b.bounds))
        }
        Kind::ColorMatrix(k) => {
            let a = resolve_input(ctx, &k.input);
            (color_matrix::apply(&a.raster, &k.kind), a.bounds)
        }
        Kind::ComponentTransfer(k) => {
            let a = resolve_input(ctx, &k.input);
            let max_len = ctx.limits().max_component_transfer_table_len;
            let (fr, fg, fb, fa) = (
                clamp_transfer_function(&k.func_r, max_len),
                clamp_transfer_function(&k.func_g, max_len),
                clamp_transfer_function(&k.func_b, max_len),
                clamp_transfer_function(&k.func_a, max_len),
            );
            (component_transfer::apply(&a.raster, &fr, &fg, &fb, &fa), a.bounds)
        }
        Kind::Composite(k) => {
            let a = resolve_input(ctx, &k.input1);
            let b = resolve_input(ctx, &k.input2);
            (composite::apply(&a.raster, &b.raster, &k.operator), a.bounds.union(b.bounds))
        }
        Kind::ConvolveMatrix(k) => {
            let a = resolve_input(ctx, &k.input);
            let max_order = ctx.limits().max_convolve_order;
            if k.matrix.columns > max_order || k.matrix.rows > max_order {
                log::warn!(
                    "feConvolveMatrix: kernel order {}x{} exceeds the configured limit of {max_order}; passing input through unchanged",
                    k.matrix.columns,
                    k.matrix.rows,
                );
                (a.raster.clone(), a.bounds)
            } else {
                let divisor = resolve_divisor(k.divisor, &k.matrix.data);
                (
                    convolve_matrix::apply(&a.raster, &k.matrix, divisor, k.bias, k.edge_mode, k.preserve_alpha),
                    a.bounds,
                )
            }
        }
        Kind::DiffuseLighting(k) => {
            let a = resolve_input(ctx, &k.input);
            (
                lighting::diffuse(&a.raster, k.surface_scale, k.diffuse_constant, k.lighting_color, &k.light_source),
                a.bounds,
            )
        }
        Kind::DisplacementMap(k) => {
            let a = resolve_input(ctx, &k.input1);
            let b = resolve_input(ctx, &k.input2);
            (
                displacement_map::apply(ctx, &a.raster, &b.raster, k.scale, k.x_channel_selector, k.y_channel_selector),
                a.bounds,
            )
        }
        Kind::Flood(k) => {
            let raster = flood::apply(ctx, w, h, k.color, k.opacity).unwrap_or_else(|e| {
                log::warn!("feFlood: raster allocation failed ({e}); passing source through unchanged");
                ctx.source_graphic().clone()
            });
            (raster, filter_region)
        }
        Kind::GaussianBlur(k) => {
            let a = resolve_input(ctx, &k.input);
            let raster = gaussian_blur::apply(ctx, &a.raster, k.std_dev_x, k.std_dev_y).unwrap_or_else(|e| {
                log::warn!("feGaussianBlur: scratch raster allocation failed ({e}); passing input through unchanged");
                a.raster.clone()
            });
            (raster, a.bounds)
        }
        Kind::Image(k) => (image::apply(ctx, &k.href, w, h), filter_region),
        Kind::Merge(k) => {
            let inputs: Vec<_> = k.inputs.iter().map(|i| resolve_input(ctx, i)).collect();
            let bounds = inputs.iter().fold(IRect::EMPTY, |acc, o| acc.union(o.bounds));
            let rasters: Vec<Raster> = inputs.into_iter().map(|o| o.raster).collect();
            let raster = merge::apply(&rasters).unwrap_or_else(|| {
                ctx.new_raster(w, h).unwrap_or_else(|e| {
                    log::warn!("feMerge: empty merge node and raster allocation failed ({e}); passing source through unchanged");
                    ctx.source_graphic().clone()
                })
            });
            (raster, bounds)
        }
        Kind::Morphology(k) => {
            let a = resolve_input(ctx, &k.input);
            let (rx, ry) = ctx.paffine().transform_distance(k.radius_x, k.radius_y);
            (morphology::apply(&a.raster, k.operator, rx.abs(), ry.abs()), a.bounds)
        }
        Kind::Offset(k) => {
            let a = resolve_input(ctx, &k.input);
            (offset::apply(ctx, &a.raster, k.dx, k.dy), a.bounds)
        }
        Kind::SpecularLighting(k) => {
            let a = resolve_input(ctx, &k.input);
            (
                lighting::specular(
                    &a.raster,
                    k.surface_scale,
                    k.specular_constant,
                    k.specular_exponent,
                    k.lighting_color,
                    &k.light_source,
                ),
                a.bounds,
            )
        }
        Kind::Tile(k) => {
            let a = resolve_input(ctx, &k.input);
            (tile::apply(&a.raster, a.bounds), filter_region)
        }
        Kind::Turbulence(k) => {
            let raster = turbulence::apply(ctx, w, h, k).unwrap_or_else(|e| {
                log::warn!("feTurbulence: raster allocation failed ({e}); passing source through unchanged");
                ctx.source_graphic().clone()
            });
            (raster, filter_region)
        }
    }
}

/// Falls back to the identity function when a `table`/`discrete` transfer
/// function's value list exceeds the configured limit, per spec.md §5's
/// "component-transfer table length bounded".
fn clamp_transfer_function(func: &TransferFunction, max_len: usize) -> TransferFunction {
    let len = match func {
        TransferFunction::Table(v) | TransferFunction::Discrete(v) => v.len(),
        _ => return func.clone(),
    };
    if len > max_len {
        log::warn!("feComponentTransfer: table length {len} exceeds the configured limit of {max_len}; using identity");
        TransferFunction::Identity
    } else {
        func.clone()
    }
}

/// Resolves `divisor=0` (the "not specified" sentinel) to the sum of the
/// kernel's entries, falling back to `1.0` when that sum is also zero, per
/// spec.md §4.9.
fn resolve_divisor(divisor: f64, kernel: &[f64]) -> f64 {
    if divisor != 0.0 {
        return divisor;
    }
    let sum: f64 = kernel.iter().sum();
    if sum == 0.0 {
        1.0
    } else {
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Affine;
    use crate::limits::Limits;
    use crate::primitive::{Color, Flood, Input, Offset};
    use crate::raster::ChannelMap;

    fn ctx() -> FilterContext<'static> {
        let src = Raster::new(4, 4, ChannelMap::RGBA, &Limits::default()).unwrap();
        FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default())
    }

    #[test]
    fn flood_fills_the_full_filter_region() {
        let mut c = ctx();
        let region = IRect::new(0, 0, 4, 4);
        let p = Primitive {
            x: None,
            y: None,
            width: None,
            height: None,
            result: "flood1".to_string(),
            kind: Kind::Flood(Flood { color: Color { r: 255, g: 0, b: 0 }, opacity: 1.0 }),
        };
        run_primitive(&mut c, &p, region);
        let out = c.result("flood1").unwrap();
        assert_eq!(out.raster.pixel(0, 0), (255, 0, 0, 255));
        assert_eq!(out.bounds, region);
    }

    #[test]
    fn subregion_clips_offset_output() {
        let mut c = ctx();
        c.store_result("", {
            let mut r = Raster::new(4, 4, ChannelMap::RGBA, &Limits::default()).unwrap();
            for y in 0..4 {
                for x in 0..4 {
                    r.set_pixel(x, y, 10, 20, 30, 255);
                }
            }
            r
        }, IRect::new(0, 0, 4, 4));

        let region = IRect::new(0, 0, 4, 4);
        let p = Primitive {
            x: Some(0.0),
            y: Some(0.0),
            width: Some(2.0),
            height: Some(2.0),
            result: String::new(),
            kind: Kind::Offset(Offset { input: Input::LastResult, dx: 0.0, dy: 0.0 }),
        };
        run_primitive(&mut c, &p, region);
        let out = c.last_result().unwrap();
        assert_eq!(out.raster.pixel(0, 0), (10, 20, 30, 255));
        assert_eq!(out.raster.pixel(3, 3), (0, 0, 0, 0));
    }

    #[test]
    fn divisor_zero_falls_back_to_kernel_sum() {
        assert_eq!(resolve_divisor(0.0, &[1.0, 1.0, 1.0, 1.0]), 4.0);
        assert_eq!(resolve_divisor(0.0, &[1.0, -1.0]), 1.0);
        assert_eq!(resolve_divisor(2.0, &[1.0, 1.0]), 2.0);
    }

    #[test]
    fn transfer_table_over_the_limit_falls_back_to_identity() {
        let oversized = TransferFunction::Table(vec![0.0; 10]);
        match clamp_transfer_function(&oversized, 8) {
            TransferFunction::Identity => {}
            _ => panic!("expected identity fallback"),
        }
    }

    #[test]
    fn transfer_table_within_the_limit_is_unchanged() {
        let table = TransferFunction::Discrete(vec![0.0, 0.5, 1.0]);
        match clamp_transfer_function(&table, 8) {
            TransferFunction::Discrete(v) => assert_eq!(v, vec![0.0, 0.5, 1.0]),
            _ => panic!("expected the table to pass through"),
        }
    }

    #[test]
    fn oversized_convolve_kernel_passes_input_through_unchanged() {
        use crate::primitive::{ConvolveMatrix, ConvolveMatrixData, EdgeMode};

        let mut limits = Limits::default();
        limits.max_convolve_order = 2;
        let mut small_ctx = FilterContext::new(
            Raster::new(4, 4, ChannelMap::RGBA, &limits).unwrap(),
            Affine::IDENTITY,
            ChannelMap::RGBA,
            limits,
        );
        let mut source = Raster::new(4, 4, ChannelMap::RGBA, &limits).unwrap();
        source.set_pixel(1, 1, 9, 9, 9, 255);
        small_ctx.store_result("", source, IRect::new(0, 0, 4, 4));

        let matrix = ConvolveMatrixData::new(1, 1, 3, 3, vec![1.0; 9]).unwrap();
        let p = Primitive {
            x: None,
            y: None,
            width: None,
            height: None,
            result: String::new(),
            kind: Kind::ConvolveMatrix(ConvolveMatrix {
                input: Input::LastResult,
                matrix,
                divisor: 0.0,
                bias: 0.0,
                edge_mode: EdgeMode::None,
                preserve_alpha: false,
                kernel_unit_length: None,
            }),
        };
        run_primitive(&mut small_ctx, &p, IRect::new(0, 0, 4, 4));
        let out = small_ctx.last_result().unwrap();
        assert_eq!(out.raster.pixel(1, 1), (9, 9, 9, 255));
    }
}
