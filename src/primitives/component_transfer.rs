// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feComponentTransfer` (C12), delegating to `svgfilters::component_transfer`.

use svgfilters::{demultiply_alpha, multiply_alpha};

use crate::primitive::TransferFunction as Func;
use crate::raster::Raster;

fn to_svgfilters(f: &Func) -> svgfilters::TransferFunction {
    match f {
        Func::Identity => svgfilters::TransferFunction::Identity,
        Func::Table(v) => svgfilters::TransferFunction::Table(v),
        Func::Discrete(v) => svgfilters::TransferFunction::Discrete(v),
        Func::Linear { slope, intercept } => svgfilters::TransferFunction::Linear { slope: *slope, intercept: *intercept },
        Func::Gamma { amplitude, exponent, offset } => {
            svgfilters::TransferFunction::Gamma { amplitude: *amplitude, exponent: *exponent, offset: *offset }
        }
    }
}

pub fn apply(input: &Raster, func_r: &Func, func_g: &Func, func_b: &Func, func_a: &Func) -> Raster {
    let mut buf = input.to_rgba8_vec();
    demultiply_alpha(&mut buf);

    svgfilters::component_transfer(
        to_svgfilters(func_b),
        to_svgfilters(func_g),
        to_svgfilters(func_r),
        to_svgfilters(func_a),
        svgfilters::ImageRefMut::new(&mut buf, input.width(), input.height()),
    );

    multiply_alpha(&mut buf);
    let mut out = input.clone();
    out.copy_from_rgba8(&buf);
    out
}
