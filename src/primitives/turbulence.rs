// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feTurbulence` (C21), delegating to `svgfilters::turbulence`.
//!
//! This primitive takes no input: it synthesizes noise across the whole
//! raster in device space.

use crate::context::FilterContext;
use crate::error::AllocError;
use crate::primitive::{Turbulence, TurbulenceKind};
use crate::raster::Raster;

pub fn apply(ctx: &FilterContext, width: u32, height: u32, t: &Turbulence) -> Result<Raster, AllocError> {
    let mut out = ctx.new_raster(width, height)?;

    let paffine = ctx.paffine();
    let sx = paffine.xx;
    let sy = paffine.yy;
    if sx == 0.0 || sy == 0.0 {
        return Ok(out);
    }

    let mut buf = out.to_rgba8_vec();
    svgfilters::turbulence(
        0.0,
        0.0,
        sx,
        sy,
        t.base_frequency_x,
        t.base_frequency_y,
        t.num_octaves,
        t.seed,
        t.stitch_tiles,
        t.kind == TurbulenceKind::FractalNoise,
        svgfilters::ImageRefMut::new(&mut buf, width, height),
    );
    svgfilters::multiply_alpha(&mut buf);
    out.copy_from_rgba8(&buf);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Affine;
    use crate::limits::Limits;
    use crate::raster::ChannelMap;

    #[test]
    fn fills_the_whole_raster() {
        let src = Raster::new(1, 1, ChannelMap::RGBA, &Limits::default()).unwrap();
        let ctx = FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default());
        let t = Turbulence {
            base_frequency_x: 0.1,
            base_frequency_y: 0.1,
            num_octaves: 2,
            seed: 0,
            stitch_tiles: false,
            kind: TurbulenceKind::Turbulence,
        };
        let out = apply(&ctx, 8, 8, &t).unwrap();
        assert_eq!(out.width(), 8);
        assert_eq!(out.height(), 8);
    }
}
