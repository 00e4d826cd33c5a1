// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The fixed-format premultiplied raster buffer (C1).

use rgb::RGBA8;
use svgfilters::{ImageRef, ImageRefMut};

use crate::error::AllocError;
use crate::geom::IRect;
use crate::limits::Limits;

/// A permutation from logical `{R,G,B,A}` to byte positions in storage.
///
/// Picked once at context construction (see the design note in SPEC_FULL.md
/// §D) so that per-pixel code never branches on it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ChannelMap(pub [usize; 4]);

impl ChannelMap {
    pub const RGBA: ChannelMap = ChannelMap([0, 1, 2, 3]);
    pub const BGRA: ChannelMap = ChannelMap([2, 1, 0, 3]);

    #[inline]
    pub fn r(&self) -> usize {
        self.0[0]
    }

    #[inline]
    pub fn g(&self) -> usize {
        self.0[1]
    }

    #[inline]
    pub fn b(&self) -> usize {
        self.0[2]
    }

    #[inline]
    pub fn a(&self) -> usize {
        self.0[3]
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        ChannelMap::RGBA
    }
}

/// A fixed-format 4-channel 8-bit premultiplied image with a row stride that
/// may exceed `4 * width`.
///
/// Invariant: for every pixel, `R <= A`, `G <= A`, `B <= A` (premultiplication).
/// Freshly allocated rasters are always cleared to `(0,0,0,0)`.
#[derive(Clone, Debug)]
pub struct Raster {
    data: Vec<u8>,
    width: u32,
    height: u32,
    stride: u32,
    channels: ChannelMap,
}

impl Raster {
    /// Allocates a new raster cleared to transparent black.
    pub fn new(width: u32, height: u32, channels: ChannelMap, limits: &Limits) -> Result<Self, AllocError> {
        if width == 0 || height == 0 {
            return Err(AllocError::ZeroSized);
        }

        if width > limits.max_raster_dimension || height > limits.max_raster_dimension {
            return Err(AllocError::TooLarge { width, height });
        }

        let stride = width.checked_mul(4).ok_or(AllocError::DimensionOverflow)?;
        let len = (stride as usize)
            .checked_mul(height as usize)
            .ok_or(AllocError::DimensionOverflow)?;

        Ok(Raster { data: vec![0u8; len], width, height, stride, channels })
    }

    /// Wraps existing, already-formatted pixel data without reallocating.
    ///
    /// `data.len()` must equal `stride * height`. Used by the caller to hand
    /// the source raster to the engine without a copy.
    pub fn from_raw(data: Vec<u8>, width: u32, height: u32, stride: u32, channels: ChannelMap) -> Self {
        debug_assert_eq!(data.len(), stride as usize * height as usize);
        Raster { data, width, height, stride, channels }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> u32 {
        self.stride
    }

    #[inline]
    pub fn channels(&self) -> ChannelMap {
        self.channels
    }

    #[inline]
    pub fn bounds(&self) -> IRect {
        IRect::new(0, 0, self.width as i32, self.height as i32)
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride as usize + x as usize * 4
    }

    /// Reads a pixel as `(r, g, b, a)` in logical channel order, regardless of
    /// storage permutation.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let o = self.offset(x, y);
        let px = &self.data[o..o + 4];
        (px[self.channels.r()], px[self.channels.g()], px[self.channels.b()], px[self.channels.a()])
    }

    /// Writes a pixel given in logical `(r, g, b, a)` order.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, r: u8, g: u8, b: u8, a: u8) {
        let o = self.offset(x, y);
        let px = &mut self.data[o..o + 4];
        px[self.channels.r()] = r;
        px[self.channels.g()] = g;
        px[self.channels.b()] = b;
        px[self.channels.a()] = a;
    }

    #[inline]
    pub fn alpha(&self, x: u32, y: u32) -> u8 {
        let o = self.offset(x, y);
        self.data[o + self.channels.a()]
    }

    /// Returns a zero-initialized raster of the same dimensions and channel map.
    pub fn new_like(&self, limits: &Limits) -> Result<Self, AllocError> {
        Raster::new(self.width, self.height, self.channels, limits)
    }

    /// Clears every pixel outside `bounds` to transparent black, per spec.md
    /// §4.4's "a fresh raster... cleared to zero" outside the primitive's
    /// resolved subregion.
    pub fn clip_to(&mut self, bounds: IRect) {
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                if !bounds.contains(x, y) {
                    self.set_pixel(x as u32, y as u32, 0, 0, 0, 0);
                }
            }
        }
    }

    /// An alpha-only copy: RGB channels zeroed, alpha channel copied
    /// (spec.md §4.3, `SourceAlpha`/`BackgroundAlpha`).
    pub fn alpha_only(&self) -> Self {
        let mut out = self.clone();
        for px in out.data.chunks_exact_mut(4) {
            let a = px[self.channels.a()];
            px[self.channels.r()] = 0;
            px[self.channels.g()] = 0;
            px[self.channels.b()] = 0;
            px[self.channels.a()] = a;
        }
        out
    }

    /// Builds a borrowed `svgfilters::ImageRef` over a tightly-packed RGBA
    /// copy of this raster's pixels, for delegating to `svgfilters`
    /// algorithms that assume a contiguous `&[RGBA8]` buffer in canonical
    /// channel order. Used only where the channel map isn't RGBA or the
    /// stride isn't tight; callers on the hot RGBA/tight-stride path should
    /// prefer operating on `data()` directly.
    pub fn to_rgba8_vec(&self) -> Vec<RGBA8> {
        let mut out = Vec::with_capacity((self.width * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let (r, g, b, a) = self.pixel(x, y);
                out.push(RGBA8 { r, g, b, a });
            }
        }
        out
    }

    /// Overwrites this raster's pixels from a tightly-packed canonical-order
    /// RGBA buffer of matching dimensions.
    pub fn copy_from_rgba8(&mut self, src: &[RGBA8]) {
        debug_assert_eq!(src.len(), (self.width * self.height) as usize);
        let mut i = 0;
        for y in 0..self.height {
            for x in 0..self.width {
                let p = src[i];
                self.set_pixel(x, y, p.r, p.g, p.b, p.a);
                i += 1;
            }
        }
    }

    #[inline]
    pub fn is_tight_rgba(&self) -> bool {
        self.channels == ChannelMap::RGBA && self.stride == self.width * 4
    }
}

/// Runs an `svgfilters` algorithm that operates on a borrowed
/// `ImageRefMut<'_>` against a [`Raster`], regardless of its channel map or
/// stride: copies out to a tight canonical-order buffer, calls `f`, copies
/// the (possibly modified) result back in.
///
/// This crate forbids `unsafe`, so the RGBA8/byte reinterpretation that a
/// zero-copy view would need is done as an explicit, safe copy instead.
pub fn with_svgfilters_buffer<F>(raster: &mut Raster, f: F)
where
    F: FnOnce(ImageRefMut),
{
    let mut buf = raster.to_rgba8_vec();
    f(ImageRefMut::new(&mut buf, raster.width, raster.height));
    raster.copy_from_rgba8(&buf);
}

/// Read-only counterpart of [`with_svgfilters_buffer`].
pub fn with_svgfilters_buffer_ref<F, T>(raster: &Raster, f: F) -> T
where
    F: FnOnce(ImageRef) -> T,
{
    let buf = raster.to_rgba8_vec();
    f(ImageRef::new(&buf, raster.width, raster.height))
}
