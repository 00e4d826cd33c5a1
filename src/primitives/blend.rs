// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feBlend` (C9): the separable blend modes from the CSS compositing
//! model, alpha-composited with Porter-Duff "over".
//!
//! Not covered by `svgfilters` (it leaves blending to the caller's 2D
//! library), so implemented directly against the standard
//! `Co = Cs*as*(1-ab) + Cb*ab*(1-as) + as*ab*B(Cb,Cs)` formula.

use crate::primitive::BlendMode;
use crate::raster::Raster;

pub fn apply(input1: &Raster, input2: &Raster, mode: BlendMode) -> Raster {
    let mut out = input1.clone();
    for y in 0..input1.height() {
        for x in 0..input1.width() {
            let s = unpremultiplied(input1.pixel(x, y));
            let b = unpremultiplied(input2.pixel(x, y));

            let as_ = s.3;
            let ab = b.3;
            let ao = as_ + ab - as_ * ab;

            let blend_channel = |cb: f64, cs: f64| -> f64 {
                let blended = blend_fn(mode, cb, cs);
                cs * as_ * (1.0 - ab) + cb * ab * (1.0 - as_) + as_ * ab * blended
            };

            let r = blend_channel(b.0, s.0);
            let g = blend_channel(b.1, s.1);
            let bl = blend_channel(b.2, s.2);

            out.set_pixel(x, y, to_u8(r), to_u8(g), to_u8(bl), to_u8(ao));
        }
    }
    out
}

#[inline]
fn unpremultiplied(p: (u8, u8, u8, u8)) -> (f64, f64, f64, f64) {
    let a = p.3 as f64 / 255.0;
    if a == 0.0 {
        (0.0, 0.0, 0.0, 0.0)
    } else {
        (p.0 as f64 / 255.0 / a, p.1 as f64 / 255.0 / a, p.2 as f64 / 255.0 / a, a)
    }
}

#[inline]
fn to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn blend_fn(mode: BlendMode, cb: f64, cs: f64) -> f64 {
    match mode {
        BlendMode::Normal => cs,
        BlendMode::Multiply => cb * cs,
        BlendMode::Screen => cb + cs - cb * cs,
        BlendMode::Darken => cb.min(cs),
        BlendMode::Lighten => cb.max(cs),
        BlendMode::Overlay => hard_light(cs, cb),
        BlendMode::HardLight => hard_light(cb, cs),
        BlendMode::SoftLight => soft_light(cb, cs),
        BlendMode::ColorDodge => {
            if cb == 0.0 {
                0.0
            } else if cs == 1.0 {
                1.0
            } else {
                (cb / (1.0 - cs)).min(1.0)
            }
        }
        BlendMode::ColorBurn => {
            if cb == 1.0 {
                1.0
            } else if cs == 0.0 {
                0.0
            } else {
                1.0 - ((1.0 - cb) / cs).min(1.0)
            }
        }
        BlendMode::Difference => (cb - cs).abs(),
        BlendMode::Exclusion => cb + cs - 2.0 * cb * cs,
    }
}

fn hard_light(cb: f64, cs: f64) -> f64 {
    if cs <= 0.5 {
        cb * (2.0 * cs)
    } else {
        cb + (2.0 * cs - 1.0) - cb * (2.0 * cs - 1.0)
    }
}

fn soft_light(cb: f64, cs: f64) -> f64 {
    fn d(x: f64) -> f64 {
        if x <= 0.25 {
            ((16.0 * x - 12.0) * x + 4.0) * x
        } else {
            x.sqrt()
        }
    }

    if cs <= 0.5 {
        cb - (1.0 - 2.0 * cs) * cb * (1.0 - cb)
    } else {
        cb + (2.0 * cs - 1.0) * (d(cb) - cb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;
    use crate::raster::ChannelMap;

    fn solid(r: u8, g: u8, b: u8, a: u8) -> Raster {
        let mut ras = Raster::new(1, 1, ChannelMap::RGBA, &Limits::default()).unwrap();
        ras.set_pixel(0, 0, r, g, b, a);
        ras
    }

    #[test]
    fn normal_mode_over_opaque_backdrop_is_source() {
        let s = solid(10, 20, 30, 255);
        let b = solid(200, 200, 200, 255);
        let out = apply(&s, &b, BlendMode::Normal);
        assert_eq!(out.pixel(0, 0), (10, 20, 30, 255));
    }

    #[test]
    fn multiply_black_over_anything_is_black() {
        let s = solid(0, 0, 0, 255);
        let b = solid(200, 200, 200, 255);
        let out = apply(&s, &b, BlendMode::Multiply);
        assert_eq!(out.pixel(0, 0), (0, 0, 0, 255));
    }

    #[test]
    fn transparent_source_leaves_backdrop_unchanged() {
        let s = solid(0, 0, 0, 0);
        let b = solid(100, 150, 200, 255);
        let out = apply(&s, &b, BlendMode::Normal);
        assert_eq!(out.pixel(0, 0), (100, 150, 200, 255));
    }
}
