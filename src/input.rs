// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `in`/`in2` resolution against the running context (C6).

use crate::context::{FilterContext, FilterOutput};
use crate::primitive::Input;
use crate::raster::Raster;

/// Resolves one named input to a raster plus its subregion, per spec.md
/// §4.3.
///
/// A dangling [`Input::Reference`] (a name never produced earlier in the
/// primitive list) degrades to the last result, same as an empty `in`;
/// an unavailable `BackgroundImage`/`BackgroundAlpha` degrades to
/// transparent black over the whole raster — callers that need stricter
/// validation should reject such graphs before calling [`crate::render`].
pub fn resolve_input(ctx: &mut FilterContext, input: &Input) -> FilterOutput {
    match input {
        Input::LastResult => ctx.last_result().cloned().unwrap_or_else(|| whole_raster(ctx.source_graphic())),
        Input::SourceGraphic => whole_raster(ctx.source_graphic()),
        Input::SourceAlpha => whole_raster(ctx.source_alpha()),
        Input::BackgroundImage => {
            let absent = ctx.background_image().is_none();
            if absent {
                log::warn!("BackgroundImage requested but no background loader produced one; using transparent black");
            }
            ctx.background_image()
                .cloned()
                .map(|r| whole_raster(&r))
                .unwrap_or_else(|| whole_raster(ctx.source_graphic()))
                .transparent_if_absent(absent)
        }
        Input::BackgroundAlpha => {
            let absent = ctx.background_alpha().is_none();
            if absent {
                log::warn!("BackgroundAlpha requested but no background loader produced one; using transparent black");
            }
            ctx.background_alpha()
                .cloned()
                .map(|r| whole_raster(&r))
                .unwrap_or_else(|| whole_raster(ctx.source_graphic()))
                .transparent_if_absent(absent)
        }
        Input::Reference(name) => match ctx.result(name) {
            Some(output) => output.clone(),
            None => {
                log::warn!("dangling input reference {name:?}; using last result");
                ctx.last_result().cloned().unwrap_or_else(|| whole_raster(ctx.source_graphic()))
            }
        },
    }
}

fn whole_raster(r: &Raster) -> FilterOutput {
    FilterOutput { raster: r.clone(), bounds: r.bounds() }
}

fn transparent_black_like(mut output: FilterOutput) -> FilterOutput {
    for px in output.raster.data_mut().chunks_exact_mut(4) {
        px.fill(0);
    }
    output
}

trait TransparentIfAbsent {
    fn transparent_if_absent(self, absent: bool) -> Self;
}

impl TransparentIfAbsent for FilterOutput {
    fn transparent_if_absent(self, absent: bool) -> Self {
        if absent {
            transparent_black_like(self)
        } else {
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Affine;
    use crate::limits::Limits;
    use crate::raster::ChannelMap;

    fn ctx_with(px: (u8, u8, u8, u8)) -> FilterContext<'static> {
        let mut src = Raster::new(1, 1, ChannelMap::RGBA, &Limits::default()).unwrap();
        src.set_pixel(0, 0, px.0, px.1, px.2, px.3);
        FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default())
    }

    #[test]
    fn source_graphic_is_returned_verbatim() {
        let mut ctx = ctx_with((10, 20, 30, 255));
        let out = resolve_input(&mut ctx, &Input::SourceGraphic);
        assert_eq!(out.raster.pixel(0, 0), (10, 20, 30, 255));
    }

    #[test]
    fn source_alpha_zeroes_color() {
        let mut ctx = ctx_with((10, 20, 30, 200));
        let out = resolve_input(&mut ctx, &Input::SourceAlpha);
        assert_eq!(out.raster.pixel(0, 0), (0, 0, 0, 200));
    }

    #[test]
    fn last_result_before_any_primitive_is_source_graphic() {
        let mut ctx = ctx_with((5, 5, 5, 5));
        let out = resolve_input(&mut ctx, &Input::LastResult);
        assert_eq!(out.raster.pixel(0, 0), (5, 5, 5, 5));
    }

    #[test]
    fn dangling_reference_falls_back_to_last_result() {
        let mut ctx = ctx_with((10, 20, 30, 255));
        let mut last = Raster::new(1, 1, ChannelMap::RGBA, &Limits::default()).unwrap();
        last.set_pixel(0, 0, 1, 2, 3, 4);
        let bounds = ctx.source_graphic().bounds();
        ctx.store_result("earlier", last, bounds);

        let out = resolve_input(&mut ctx, &Input::Reference("nope".to_string()));
        assert_eq!(out.raster.pixel(0, 0), (1, 2, 3, 4));
    }

    #[test]
    fn dangling_reference_before_any_primitive_is_source_graphic() {
        let mut ctx = ctx_with((10, 20, 30, 255));
        let out = resolve_input(&mut ctx, &Input::Reference("nope".to_string()));
        assert_eq!(out.raster.pixel(0, 0), (10, 20, 30, 255));
    }

    #[test]
    fn unavailable_background_is_transparent_black() {
        let mut ctx = ctx_with((10, 20, 30, 255));
        let out = resolve_input(&mut ctx, &Input::BackgroundImage);
        assert_eq!(out.raster.pixel(0, 0), (0, 0, 0, 0));
    }
}
