// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feConvolveMatrix` (C14).
//!
//! Reimplemented in-crate rather than delegating to
//! `svgfilters::convolve_matrix`: that function expects premultiplied input
//! when `preserveAlpha=false`, but a kernel with a negative coefficient can
//! then sample a premultiplied color greater than its own alpha once the
//! weighted sum is renormalized, producing invalid (non-premultiplied-safe)
//! output. Convolving against unpremultiplied samples throughout keeps every
//! produced pixel within the `R,G,B <= A` invariant after re-premultiplying.

use svgfilters::demultiply_alpha;

use crate::primitive::{ConvolveMatrixData, EdgeMode};
use crate::raster::Raster;

pub fn apply(
    input: &Raster,
    matrix: &ConvolveMatrixData,
    divisor: f64,
    bias: f64,
    edge_mode: EdgeMode,
    preserve_alpha: bool,
) -> Raster {
    let mut buf = input.to_rgba8_vec();
    demultiply_alpha(&mut buf);

    let w = input.width() as i32;
    let h = input.height() as i32;
    let width_max = w - 1;
    let height_max = h - 1;

    let sample = |tx: i32, ty: i32| -> Option<rgb::RGBA8> {
        let (tx, ty) = match edge_mode {
            EdgeMode::None => {
                if tx < 0 || tx > width_max || ty < 0 || ty > height_max {
                    return None;
                }
                (tx, ty)
            }
            EdgeMode::Duplicate => (tx.clamp(0, width_max), ty.clamp(0, height_max)),
            EdgeMode::Wrap => (tx.rem_euclid(w), ty.rem_euclid(h)),
        };
        Some(buf[(ty * w + tx) as usize])
    };

    let mut out_buf = buf.clone();
    for y in 0..h {
        for x in 0..w {
            let mut new_r = 0.0;
            let mut new_g = 0.0;
            let mut new_b = 0.0;
            let mut new_a = 0.0;

            for oy in 0..matrix.rows {
                for ox in 0..matrix.columns {
                    let tx = x - matrix.target_x as i32 + ox as i32;
                    let ty = y - matrix.target_y as i32 + oy as i32;

                    let Some(p) = sample(tx, ty) else { continue };
                    // The kernel is applied rotated 180 degrees, per the filter spec.
                    let k = matrix.get(matrix.columns - ox - 1, matrix.rows - oy - 1);

                    new_r += (p.r as f64 / 255.0) * k;
                    new_g += (p.g as f64 / 255.0) * k;
                    new_b += (p.b as f64 / 255.0) * k;
                    if !preserve_alpha {
                        new_a += (p.a as f64 / 255.0) * k;
                    }
                }
            }

            let in_p = buf[(y * w + x) as usize];
            let new_a = if preserve_alpha { in_p.a as f64 / 255.0 } else { (new_a / divisor + bias).clamp(0.0, 1.0) };

            let clamp_color = |v: f64| -> u8 {
                let v = v / divisor + bias;
                (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
            };

            out_buf[(y * w + x) as usize] = rgb::RGBA8 {
                r: clamp_color(new_r),
                g: clamp_color(new_g),
                b: clamp_color(new_b),
                a: (new_a * 255.0 + 0.5) as u8,
            };
        }
    }

    svgfilters::multiply_alpha(&mut out_buf);
    let mut out = input.clone();
    out.copy_from_rgba8(&out_buf);
    out
}
