// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feMorphology` (C15), delegating to `svgfilters::morphology`.

use crate::primitive::MorphologyOperator;
use crate::raster::{with_svgfilters_buffer, Raster};

pub fn apply(input: &Raster, operator: MorphologyOperator, radius_x: f64, radius_y: f64) -> Raster {
    if radius_x <= 0.0 || radius_y <= 0.0 {
        // A non-positive radius on either axis disables the primitive entirely
        // (transparent black), per spec.md §4.15.
        let mut out = input.clone();
        for px in out.data_mut().chunks_exact_mut(4) {
            px.fill(0);
        }
        return out;
    }

    let op = match operator {
        MorphologyOperator::Erode => svgfilters::MorphologyOperator::Erode,
        MorphologyOperator::Dilate => svgfilters::MorphologyOperator::Dilate,
    };

    let mut out = input.clone();
    with_svgfilters_buffer(&mut out, |img| svgfilters::morphology(op, radius_x, radius_y, img));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;
    use crate::raster::ChannelMap;

    #[test]
    fn dilate_spreads_a_lit_pixel() {
        let mut src = Raster::new(5, 5, ChannelMap::RGBA, &Limits::default()).unwrap();
        src.set_pixel(2, 2, 255, 255, 255, 255);
        let out = apply(&src, MorphologyOperator::Dilate, 1.0, 1.0);
        assert!(out.pixel(1, 2).3 > 0);
    }

    #[test]
    fn zero_radius_is_transparent_black() {
        let mut src = Raster::new(2, 2, ChannelMap::RGBA, &Limits::default()).unwrap();
        src.set_pixel(0, 0, 10, 10, 10, 255);
        let out = apply(&src, MorphologyOperator::Erode, 0.0, 1.0);
        assert_eq!(out.pixel(0, 0), (0, 0, 0, 0));
    }
}
