// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Primitive subregion resolution (C5).
//!
//! Deliberately simpler than a general bbox-growing builder: per spec.md
//! §4.2 a primitive's subregion is either its own explicit `x/y/width/height`
//! (in `primitive_units`) or, per missing side, the filter region — always
//! finally intersected with the filter region (spec.md §3: `canvas ∩
//! filter_rect(affine) ∩ (has subregion ? primitive_rect(paffine) : canvas)`;
//! `filter_region` here already is `canvas ∩ filter_rect`, so the no-subregion
//! case is just that rectangle, never a prior primitive's own bounds).
//!
//! `affine` must already be the caller's `paffine` (spec.md §3: composed
//! with the object bounding box when `primitiveUnits = objectBoundingBox`,
//! equal to the plain user-space transform otherwise) — this function never
//! applies bbox scaling itself, since a pre-composed `paffine` already maps
//! primitive-unit fractions straight to device space.

use crate::geom::{Affine, IRect, Rect};
use crate::primitive::Primitive;

/// Resolves one primitive's device-space subregion.
///
/// `filter_region` is already in device pixels.
pub fn resolve_subregion(primitive: &Primitive, filter_region: IRect, affine: Affine) -> IRect {
    if !primitive.has_subregion() {
        return filter_region;
    }

    // Fall back, per missing side, to the filter region (mapped back into
    // primitive-unit space), never to an input's own bounds.
    let default_unit = device_rect_to_unit(filter_region, affine);

    let user_rect = Rect {
        x: primitive.x.unwrap_or(default_unit.x),
        y: primitive.y.unwrap_or(default_unit.y),
        width: primitive.width.unwrap_or(default_unit.width),
        height: primitive.height.unwrap_or(default_unit.height),
    };

    let device_rect = affine.transform_rect_bbox(user_rect);
    IRect::from(device_rect).intersect(filter_region)
}

fn device_rect_to_unit(r: IRect, affine: Affine) -> Rect {
    match affine.invert() {
        Some(inv) => inv.transform_rect_bbox(Rect::new(r.x0 as f64, r.y0 as f64, r.width() as f64, r.height() as f64)),
        None => Rect::new(r.x0 as f64, r.y0 as f64, r.width() as f64, r.height() as f64),
    }
}
