// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feImage` (C8-adjacent, external-resource references only). In-document
//! node references are out of scope (see [`crate::primitive::Image`]).

use crate::context::FilterContext;
use crate::raster::Raster;

/// Resolves `href` through the context's [`crate::context::ImageLoader`],
/// falling back to a transparent-black raster of `width`x`height` when the
/// loader is absent or returns `None`, per spec.md §4.19.
pub fn apply(ctx: &mut FilterContext, href: &str, width: u32, height: u32) -> Raster {
    match ctx.load_image(href) {
        Some(r) => r,
        None => ctx.new_raster(width, height).unwrap_or_else(|_| {
            log::warn!("feImage: failed to allocate fallback raster for {href:?}");
            ctx.source_graphic().clone()
        }),
    }
}
