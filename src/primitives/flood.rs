// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feFlood` (C18): a uniform premultiplied fill, not covered by
//! `svgfilters` ("it's just a simple fill").

use crate::context::FilterContext;
use crate::error::AllocError;
use crate::primitive::Color;
use crate::raster::Raster;

pub fn apply(ctx: &FilterContext, width: u32, height: u32, color: Color, opacity: f64) -> Result<Raster, AllocError> {
    let a = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    let premultiply = |c: u8| ((c as f64 / 255.0) * (a as f64 / 255.0) * 255.0).round() as u8;

    let mut out = ctx.new_raster(width, height)?;
    let (r, g, b) = (premultiply(color.r), premultiply(color.g), premultiply(color.b));
    for y in 0..height {
        for x in 0..width {
            out.set_pixel(x, y, r, g, b, a);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Affine;
    use crate::limits::Limits;
    use crate::raster::ChannelMap;

    #[test]
    fn opaque_flood_is_unpremultiplied_unchanged() {
        let src = Raster::new(1, 1, ChannelMap::RGBA, &Limits::default()).unwrap();
        let ctx = FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default());
        let out = apply(&ctx, 2, 2, Color { r: 255, g: 0, b: 0 }, 1.0).unwrap();
        assert_eq!(out.pixel(0, 0), (255, 0, 0, 255));
        assert_eq!(out.pixel(1, 1), (255, 0, 0, 255));
    }

    #[test]
    fn half_opacity_premultiplies_color() {
        let src = Raster::new(1, 1, ChannelMap::RGBA, &Limits::default()).unwrap();
        let ctx = FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default());
        let out = apply(&ctx, 1, 1, Color { r: 255, g: 255, b: 255 }, 0.5).unwrap();
        let (r, g, b, a) = out.pixel(0, 0);
        assert_eq!(a, 128);
        assert_eq!(r, 128);
        assert_eq!(g, 128);
        assert_eq!(b, 128);
    }
}
