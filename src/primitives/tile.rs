// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feTile` (C22): repeats the input's resolved subregion across the whole
//! raster. Not covered by `svgfilters`.

use crate::geom::IRect;
use crate::raster::Raster;

/// `bounds` is the subregion the input was clipped to (its [`crate::context::FilterOutput::bounds`]),
/// in the same device-pixel coordinate space as `input` itself.
pub fn apply(input: &Raster, bounds: IRect) -> Raster {
    let mut out = input.clone();
    for px in out.data_mut().chunks_exact_mut(4) {
        px.fill(0);
    }

    if bounds.is_empty() {
        return out;
    }

    let (tw, th) = (bounds.width(), bounds.height());
    for y in 0..input.height() as i32 {
        for x in 0..input.width() as i32 {
            let sx = bounds.x0 + (x - bounds.x0).rem_euclid(tw);
            let sy = bounds.y0 + (y - bounds.y0).rem_euclid(th);
            if (sx as u32) < input.width() && (sy as u32) < input.height() {
                let (r, g, b, a) = input.pixel(sx as u32, sy as u32);
                out.set_pixel(x as u32, y as u32, r, g, b, a);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;
    use crate::raster::ChannelMap;

    #[test]
    fn tiles_a_single_pixel_subregion_across_the_raster() {
        let mut src = Raster::new(4, 4, ChannelMap::RGBA, &Limits::default()).unwrap();
        src.set_pixel(1, 1, 10, 20, 30, 255);
        let bounds = IRect::new(1, 1, 2, 2);
        let out = apply(&src, bounds);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(out.pixel(x, y), (10, 20, 30, 255));
            }
        }
    }

    #[test]
    fn preserves_a_two_by_two_pattern() {
        let mut src = Raster::new(4, 4, ChannelMap::RGBA, &Limits::default()).unwrap();
        src.set_pixel(0, 0, 255, 0, 0, 255);
        src.set_pixel(1, 0, 0, 255, 0, 255);
        let bounds = IRect::new(0, 0, 2, 1);
        let out = apply(&src, bounds);
        assert_eq!(out.pixel(2, 0), (255, 0, 0, 255));
        assert_eq!(out.pixel(3, 0), (0, 255, 0, 255));
        assert_eq!(out.pixel(0, 3), (255, 0, 0, 255));
    }

    #[test]
    fn empty_bounds_yields_transparent_black() {
        let src = Raster::new(2, 2, ChannelMap::RGBA, &Limits::default()).unwrap();
        let out = apply(&src, IRect::EMPTY);
        assert_eq!(out.pixel(0, 0), (0, 0, 0, 0));
    }
}
