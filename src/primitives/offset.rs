// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feOffset` (C20): an integer-pixel shift. Not covered by `svgfilters`
//! ("it's just a layer compositing with offset").

use crate::context::FilterContext;
use crate::raster::Raster;

pub fn apply(ctx: &FilterContext, input: &Raster, dx: f64, dy: f64) -> Raster {
    let (dx, dy) = ctx.paffine().transform_distance(dx, dy);
    let dx = dx.round() as i32;
    let dy = dy.round() as i32;

    let mut out = input.clone();
    for px in out.data_mut().chunks_exact_mut(4) {
        px.fill(0);
    }

    for y in 0..input.height() as i32 {
        for x in 0..input.width() as i32 {
            let (sx, sy) = (x - dx, y - dy);
            if sx >= 0 && sy >= 0 && (sx as u32) < input.width() && (sy as u32) < input.height() {
                let (r, g, b, a) = input.pixel(sx as u32, sy as u32);
                out.set_pixel(x as u32, y as u32, r, g, b, a);
            }
        }
    }
    out
}
