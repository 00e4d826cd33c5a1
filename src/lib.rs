// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The core filter-graph evaluation engine of an SVG filter effects
//! subsystem: given a built filter graph, a source raster, and the current
//! transform, produces the rasterized result of applying that filter.
//!
//! SVG/XML parsing, attribute binding, and the broader rendering pipeline
//! (path rasterization, stroking, text shaping) are out of scope — callers
//! hand this crate an already-built [`Filter`] and a source [`Raster`].

#![forbid(unsafe_code)]

pub mod bounds;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod geom;
pub mod input;
pub mod limits;
pub mod primitive;
pub mod primitives;
pub mod raster;
pub mod sampler;

pub use context::{BackgroundLoader, FilterContext, FilterOutput, ImageLoader};
pub use error::AllocError;
pub use geom::{Affine, IRect, Rect};
pub use limits::Limits;
pub use primitive::{Filter, Input, Kind, Primitive, Units};
pub use raster::{ChannelMap, Raster};

/// Runs the whole filter graph against `source`, returning a canvas-sized
/// result raster (spec.md §6, §4.1, §4.24).
///
/// `ctm` is the current user-space-to-device transform in effect where the
/// filter is applied (spec.md §3's "state"). `bbox` is the filtered
/// element's bounding box in user space; it is required when either
/// `filter.filter_units` or `filter.primitive_units` is
/// `ObjectBoundingBox` and otherwise ignored. `background_loader` backs
/// `BackgroundImage`/`BackgroundAlpha`; `image_loader` resolves `feImage`
/// `href`s. Both are optional — absent, their inputs degrade to
/// transparent black per spec.md §7.
///
/// Never fails: a filter invocation always returns a raster, possibly
/// pixel-identical to `source` (spec.md §7's "the invocation always
/// returns a raster").
pub fn render<'a, B, I>(
    filter: &Filter,
    source: Raster,
    ctm: Affine,
    bbox: Option<Rect>,
    channels: ChannelMap,
    limits: Limits,
    background_loader: Option<B>,
    image_loader: Option<I>,
) -> Raster
where
    B: FnMut() -> Option<Raster> + 'a,
    I: FnMut(&str) -> Option<Raster> + 'a,
{
    let canvas = IRect::new(0, 0, source.width() as i32, source.height() as i32);

    let affine = units_affine(ctm, filter.filter_units, bbox);
    let paffine = units_affine(ctm, filter.primitive_units, bbox);

    let filter_region_device = IRect::from(affine.transform_rect_bbox(filter.region)).intersect(canvas);

    let mut ctx = FilterContext::new(source.clone(), affine, channels, limits);
    ctx.set_paffine(paffine);

    if let Some(loader) = background_loader {
        ctx = ctx.with_background_loader(loader);
    }
    if let Some(loader) = image_loader {
        ctx = ctx.with_image_loader(loader);
    }

    // Seeds `last-result` to the source with filter-region bounds, per
    // spec.md §4.1 step 3, so a first primitive with an empty `in` resolves
    // against the filter region rather than the source's full bounds.
    ctx.store_result("", source, filter_region_device);

    for primitive in &filter.primitives {
        dispatch::run_primitive(&mut ctx, primitive, filter_region_device);
    }

    let last = ctx.last_result().expect("seeded above; always Some");
    let mut dest = ctx.new_raster(canvas.width() as u32, canvas.height() as u32).unwrap_or_else(|_| last.raster.clone());
    blit(&mut dest, &last.raster, last.bounds);
    dest
}

/// Builds the affine per spec.md §3: `state · [[w,0,x],[0,h,y]]` when `units`
/// is `ObjectBoundingBox`, otherwise `state` unchanged.
fn units_affine(ctm: Affine, units: Units, bbox: Option<Rect>) -> Affine {
    match units {
        Units::UserSpaceOnUse => ctm,
        Units::ObjectBoundingBox => {
            let bbox = bbox.unwrap_or(Rect::new(0.0, 0.0, 1.0, 1.0));
            let bbox_matrix = Affine { xx: bbox.width, yx: 0.0, xy: 0.0, yy: bbox.height, x0: bbox.x, y0: bbox.y };
            ctm.pre_concat(&bbox_matrix)
        }
    }
}

/// Source-over blits `src` onto `dst` at `bounds`, per spec.md §4.21/§4.24:
/// `D' = S + D·(255−S.α)/255`, in premultiplied form.
fn blit(dst: &mut Raster, src: &Raster, bounds: IRect) {
    let x0 = bounds.x0.max(0) as u32;
    let y0 = bounds.y0.max(0) as u32;
    let x1 = (bounds.x1.max(0) as u32).min(dst.width());
    let y1 = (bounds.y1.max(0) as u32).min(dst.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let (sr, sg, sb, sa) = src.pixel(x, y);
            let (dr, dg, db, da) = dst.pixel(x, y);
            let inv = 255 - sa as u32;
            let blend = |s: u8, d: u8| -> u8 { (s as u32 + (d as u32 * inv) / 255).min(255) as u8 };
            dst.set_pixel(x, y, blend(sr, dr), blend(sg, dg), blend(sb, db), blend(sa, da));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive::{Color, Flood, Input, Offset};

    fn no_background() -> Option<fn() -> Option<Raster>> {
        None
    }

    fn no_image_loader() -> Option<fn(&str) -> Option<Raster>> {
        None
    }

    fn solid_source(size: u32, px: (u8, u8, u8, u8)) -> Raster {
        let mut r = Raster::new(size, size, ChannelMap::RGBA, &Limits::default()).unwrap();
        for y in 0..size {
            for x in 0..size {
                r.set_pixel(x, y, px.0, px.1, px.2, px.3);
            }
        }
        r
    }

    #[test]
    fn empty_graph_is_identity_on_source() {
        let src = solid_source(4, (10, 20, 30, 255));
        let filter = Filter { region: Rect::default_filter_region(), filter_units: Units::ObjectBoundingBox, primitive_units: Units::UserSpaceOnUse, primitives: vec![] };
        let bbox = Some(Rect::new(0.0, 0.0, 4.0, 4.0));
        let out = render(&filter, src.clone(), Affine::IDENTITY, bbox, ChannelMap::RGBA, Limits::default(), no_background(), no_image_loader());
        assert_eq!(out.pixel(1, 1), src.pixel(1, 1));
    }

    #[test]
    fn flood_scenario_matches_spec_s1() {
        let src = solid_source(10, (0, 0, 0, 0));
        let filter = Filter {
            region: Rect::new(0.0, 0.0, 10.0, 10.0),
            filter_units: Units::UserSpaceOnUse,
            primitive_units: Units::UserSpaceOnUse,
            primitives: vec![Primitive {
                x: None,
                y: None,
                width: None,
                height: None,
                result: String::new(),
                kind: Kind::Flood(Flood { color: Color { r: 255, g: 0, b: 0 }, opacity: 0.5 }),
            }],
        };
        let out = render(&filter, src, Affine::IDENTITY, None, ChannelMap::RGBA, Limits::default(), no_background(), no_image_loader());
        assert_eq!(out.pixel(0, 0), (128, 0, 0, 128));
        assert_eq!(out.pixel(9, 9), (128, 0, 0, 128));
    }

    #[test]
    fn offset_scenario_matches_spec_s2() {
        let mut src = Raster::new(4, 1, ChannelMap::RGBA, &Limits::default()).unwrap();
        src.set_pixel(0, 0, 255, 0, 0, 255);
        src.set_pixel(1, 0, 0, 255, 0, 255);
        src.set_pixel(2, 0, 0, 0, 255, 255);
        src.set_pixel(3, 0, 255, 255, 255, 255);

        let filter = Filter {
            region: Rect::new(0.0, 0.0, 4.0, 1.0),
            filter_units: Units::UserSpaceOnUse,
            primitive_units: Units::UserSpaceOnUse,
            primitives: vec![Primitive {
                x: None,
                y: None,
                width: None,
                height: None,
                result: String::new(),
                kind: Kind::Offset(Offset { input: Input::SourceGraphic, dx: 1.0, dy: 0.0 }),
            }],
        };
        let out = render(&filter, src, Affine::IDENTITY, None, ChannelMap::RGBA, Limits::default(), no_background(), no_image_loader());
        assert_eq!(out.pixel(0, 0).3, 0);
        assert_eq!(out.pixel(1, 0), (255, 0, 0, 255));
        assert_eq!(out.pixel(2, 0), (0, 255, 0, 255));
        assert_eq!(out.pixel(3, 0), (0, 0, 255, 255));
    }

    #[test]
    fn dimension_preservation_holds() {
        let src = solid_source(6, (1, 2, 3, 200));
        let filter = Filter { region: Rect::default_filter_region(), filter_units: Units::ObjectBoundingBox, primitive_units: Units::UserSpaceOnUse, primitives: vec![] };
        let bbox = Some(Rect::new(0.0, 0.0, 6.0, 6.0));
        let out = render(&filter, src, Affine::IDENTITY, bbox, ChannelMap::RGBA, Limits::default(), no_background(), no_image_loader());
        assert_eq!(out.width(), 6);
        assert_eq!(out.height(), 6);
    }
}
