// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! `feMerge` (C19): successive "over" of each merge node's input, in order.
//!
//! `svgfilters` doesn't cover this ("it's just a layer compositing"), so
//! it's implemented here by folding the Porter-Duff `Over` operator.

use crate::primitive::CompositeOperator;
use crate::primitives::composite;
use crate::raster::Raster;

/// `layers` is already resolved in merge-node order (first is painted first,
/// i.e. ends up at the bottom).
pub fn apply(layers: &[Raster]) -> Option<Raster> {
    let mut iter = layers.iter();
    let mut acc = iter.next()?.clone();
    for layer in iter {
        acc = composite::apply(layer, &acc, &CompositeOperator::Over);
    }
    Some(acc)
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
    fn later_layers_paint_over_earlier_ones() {
        let bottom = solid(255, 0, 0, 255);
        let top = solid(0, 255, 0, 255);
        let out = apply(&[bottom, top]).unwrap();
        assert_eq!(out.pixel(0, 0), (0, 255, 0, 255));
    }

    #[test]
    fn empty_merge_is_none() {
        assert!(apply(&[]).is_none());
    }
}
