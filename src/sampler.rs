// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bilinear sampling with explicit boundary policy (C3).

use crate::raster::Raster;

/// Samples `raster` at fractional coordinates `(ox, oy)`, per spec.md §4.22:
/// any of the four integer-coordinate neighbours falling outside the raster
/// contributes `0` rather than being clamped or wrapped.
///
/// Returns premultiplied `(r, g, b, a)` as `f64` in `0.0..=255.0`.
pub fn bilinear_sample(raster: &Raster, ox: f64, oy: f64) -> (f64, f64, f64, f64) {
    let x0 = ox.floor();
    let y0 = oy.floor();
    let xmod = ox - x0;
    let ymod = oy - y0;
    let x0 = x0 as i32;
    let y0 = y0 as i32;

    let w00 = (1.0 - xmod) * (1.0 - ymod);
    let w10 = xmod * (1.0 - ymod);
    let w11 = xmod * ymod;
    let w01 = (1.0 - xmod) * ymod;

    let get = |x: i32, y: i32| -> (f64, f64, f64, f64) {
        if x < 0 || y < 0 || x as u32 >= raster.width() || y as u32 >= raster.height() {
            (0.0, 0.0, 0.0, 0.0)
        } else {
            let (r, g, b, a) = raster.pixel(x as u32, y as u32);
            (r as f64, g as f64, b as f64, a as f64)
        }
    };

    let p00 = get(x0, y0);
    let p10 = get(x0 + 1, y0);
    let p11 = get(x0 + 1, y0 + 1);
    let p01 = get(x0, y0 + 1);

    (
        p00.0 * w00 + p10.0 * w10 + p11.0 * w11 + p01.0 * w01,
        p00.1 * w00 + p10.1 * w10 + p11.1 * w11 + p01.1 * w01,
        p00.2 * w00 + p10.2 * w10 + p11.2 * w11 + p01.2 * w01,
        p00.3 * w00 + p10.3 * w10 + p11.3 * w11 + p01.3 * w01,
    )
}
