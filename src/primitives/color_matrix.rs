// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feColorMatrix` (C11), delegating the math to `svgfilters::color_matrix`.

use svgfilters::{demultiply_alpha, multiply_alpha};

use crate::primitive::ColorMatrixKind;
use crate::raster::Raster;

pub fn apply(input: &Raster, kind: &ColorMatrixKind) -> Raster {
    let mut buf = input.to_rgba8_vec();
    demultiply_alpha(&mut buf);

    let cm = match kind {
        ColorMatrixKind::Matrix(m) => svgfilters::ColorMatrix::Matrix(m.as_ref()),
        ColorMatrixKind::Saturate(v) => svgfilters::ColorMatrix::Saturate(*v),
        ColorMatrixKind::HueRotate(a) => svgfilters::ColorMatrix::HueRotate(*a),
        ColorMatrixKind::LuminanceToAlpha => svgfilters::ColorMatrix::LuminanceToAlpha,
    };

    svgfilters::color_matrix(cm, svgfilters::ImageRefMut::new(&mut buf, input.width(), input.height()));

    multiply_alpha(&mut buf);
    let mut out = input.clone();
    out.copy_from_rgba8(&buf);
    out
}
