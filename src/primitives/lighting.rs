// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feDiffuseLighting`/`feSpecularLighting` (C17, C23), delegating the
//! per-pixel normal/light math to `svgfilters::lighting`.

use svgfilters::multiply_alpha;

use crate::primitive::{Color, LightSource};
use crate::raster::Raster;

fn to_svgfilters(light: &LightSource) -> svgfilters::LightSource {
    match *light {
        LightSource::Distant { azimuth, elevation } => svgfilters::LightSource::DistantLight { azimuth, elevation },
        LightSource::Point { x, y, z } => svgfilters::LightSource::PointLight { x, y, z },
        LightSource::Spot { x, y, z, points_at_x, points_at_y, points_at_z, specular_exponent, limiting_cone_angle } => {
            svgfilters::LightSource::SpotLight {
                x,
                y,
                z,
                points_at_x,
                points_at_y,
                points_at_z,
                specular_exponent,
                limiting_cone_angle,
            }
        }
    }
}

pub fn diffuse(input: &Raster, surface_scale: f64, diffuse_constant: f64, color: Color, light: &LightSource) -> Raster {
    let src_buf = input.to_rgba8_vec();
    let mut dest_buf = vec![rgb::RGBA8::default(); src_buf.len()];

    svgfilters::diffuse_lighting(
        surface_scale,
        diffuse_constant,
        rgb::RGB8 { r: color.r, g: color.g, b: color.b },
        to_svgfilters(light),
        svgfilters::ImageRef::new(&src_buf, input.width(), input.height()),
        svgfilters::ImageRefMut::new(&mut dest_buf, input.width(), input.height()),
    );

    // diffuse_lighting's output is unpremultiplied; our invariant is premultiplied.
    multiply_alpha(&mut dest_buf);
    let mut out = input.clone();
    out.copy_from_rgba8(&dest_buf);
    out
}

pub fn specular(
    input: &Raster,
    surface_scale: f64,
    specular_constant: f64,
    specular_exponent: f64,
    color: Color,
    light: &LightSource,
) -> Raster {
    let src_buf = input.to_rgba8_vec();
    let mut dest_buf = vec![rgb::RGBA8::default(); src_buf.len()];

    svgfilters::specular_lighting(
        surface_scale,
        specular_constant,
        specular_exponent,
        rgb::RGB8 { r: color.r, g: color.g, b: color.b },
        to_svgfilters(light),
        svgfilters::ImageRef::new(&src_buf, input.width(), input.height()),
        svgfilters::ImageRefMut::new(&mut dest_buf, input.width(), input.height()),
    );

    // specular_lighting's output is already premultiplied.
    let mut out = input.clone();
    out.copy_from_rgba8(&dest_buf);
    out
}
