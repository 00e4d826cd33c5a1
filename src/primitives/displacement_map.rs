// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feDisplacementMap` (C16), delegating to `svgfilters::displacement_map`.

use svgfilters::demultiply_alpha;

use crate::context::FilterContext;
use crate::primitive::ColorChannel;
use crate::raster::Raster;

fn to_svgfilters(c: ColorChannel) -> svgfilters::ColorChannel {
    match c {
        ColorChannel::R => svgfilters::ColorChannel::R,
        ColorChannel::G => svgfilters::ColorChannel::G,
        ColorChannel::B => svgfilters::ColorChannel::B,
        ColorChannel::A => svgfilters::ColorChannel::A,
    }
}

pub fn apply(
    ctx: &FilterContext,
    input1: &Raster,
    input2: &Raster,
    scale: f64,
    x_channel_selector: ColorChannel,
    y_channel_selector: ColorChannel,
) -> Raster {
    let (sx, sy) = ctx.paffine().transform_distance(scale, scale);

    let src_buf = input1.to_rgba8_vec();
    let mut map_buf = input2.to_rgba8_vec();
    demultiply_alpha(&mut map_buf);

    let mut out_buf = vec![rgb::RGBA8::default(); src_buf.len()];

    svgfilters::displacement_map(
        to_svgfilters(x_channel_selector),
        to_svgfilters(y_channel_selector),
        sx,
        sy,
        svgfilters::ImageRef::new(&src_buf, input1.width(), input1.height()),
        svgfilters::ImageRef::new(&map_buf, input2.width(), input2.height()),
        svgfilters::ImageRefMut::new(&mut out_buf, input1.width(), input1.height()),
    );

    let mut out = input1.clone();
    out.copy_from_rgba8(&out_buf);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Affine;
    use crate::limits::Limits;
    use crate::raster::ChannelMap;

    #[test]
    fn zero_scale_is_identity() {
        let mut src = Raster::new(3, 3, ChannelMap::RGBA, &Limits::default()).unwrap();
        src.set_pixel(1, 1, 10, 20, 30, 255);
        let map = Raster::new(3, 3, ChannelMap::RGBA, &Limits::default()).unwrap();
        let ctx = FilterContext::new(src.clone(), Affine::IDENTITY, ChannelMap::RGBA, Limits::default());
        let out = apply(&ctx, &src, &map, 0.0, ColorChannel::R, ColorChannel::G);
        assert_eq!(out.pixel(1, 1), src.pixel(1, 1));
    }
}
