// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Evaluation state threaded through a single filter run (C4).

use std::collections::HashMap;

use crate::geom::{Affine, IRect};
use crate::limits::Limits;
use crate::raster::{ChannelMap, Raster};

/// A primitive's result, paired with the subregion it was clipped to (C5) —
/// `feTile` needs the latter to know what rectangle of pixels to repeat.
#[derive(Clone)]
pub struct FilterOutput {
    pub raster: Raster,
    pub bounds: IRect,
}

/// Resolves an `feImage` `href` to a rendered raster, already in the
/// context's device space. Returning `None` degrades that primitive to a
/// transparent-black result per spec.md §4.19, rather than aborting the run.
pub type ImageLoader<'a> = dyn FnMut(&str) -> Option<Raster> + 'a;

/// Lazily materialises `BackgroundImage`/`BackgroundAlpha`. Most callers
/// never reference either, so this only runs when first asked for; `None`
/// means "no background available", which also degrades to transparent
/// black rather than failing the run.
pub type BackgroundLoader<'a> = dyn FnMut() -> Option<Raster> + 'a;

/// All the state one `render` call needs: the named-result cache (C4), the
/// two always-available pseudo-inputs, the lazily-materialised background
/// pair, and the transforms/limits every primitive consults.
pub struct FilterContext<'a> {
    source_graphic: Raster,
    source_alpha: Raster,

    background: Option<Raster>,
    background_alpha: Option<Raster>,
    background_loader: Option<Box<BackgroundLoader<'a>>>,
    background_resolved: bool,

    image_loader: Option<Box<ImageLoader<'a>>>,

    results: HashMap<String, FilterOutput>,
    last_result: Option<FilterOutput>,

    /// user space -> device space.
    affine: Affine,
    /// The subregion-local transform used for kernel-unit-scaled primitives;
    /// equal to `affine` unless a primitive sets its own `kernelUnitLength`.
    paffine: Affine,

    channels: ChannelMap,
    limits: Limits,
}

impl<'a> FilterContext<'a> {
    pub fn new(source_graphic: Raster, affine: Affine, channels: ChannelMap, limits: Limits) -> Self {
        let source_alpha = source_graphic.alpha_only();
        FilterContext {
            source_graphic,
            source_alpha,
            background: None,
            background_alpha: None,
            background_loader: None,
            background_resolved: false,
            image_loader: None,
            results: HashMap::new(),
            last_result: None,
            paffine: affine,
            affine,
            channels,
            limits,
        }
    }

    pub fn with_background_loader<F>(mut self, loader: F) -> Self
    where
        F: FnMut() -> Option<Raster> + 'a,
    {
        self.background_loader = Some(Box::new(loader));
        self
    }

    pub fn with_image_loader<F>(mut self, loader: F) -> Self
    where
        F: FnMut(&str) -> Option<Raster> + 'a,
    {
        self.image_loader = Some(Box::new(loader));
        self
    }

    pub fn affine(&self) -> Affine {
        self.affine
    }

    pub fn paffine(&self) -> Affine {
        self.paffine
    }

    pub fn set_paffine(&mut self, paffine: Affine) {
        self.paffine = paffine;
    }

    pub fn channels(&self) -> ChannelMap {
        self.channels
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn source_graphic(&self) -> &Raster {
        &self.source_graphic
    }

    pub fn source_alpha(&self) -> &Raster {
        &self.source_alpha
    }

    /// Materialises the background pair on first use and caches it for the
    /// rest of the run, per spec.md §4.3's "BackgroundImage is evaluated at
    /// most once".
    fn ensure_background(&mut self) {
        if self.background_resolved {
            return;
        }
        self.background_resolved = true;

        let bg = self.background_loader.as_mut().and_then(|f| f());
        self.background_alpha = bg.as_ref().map(Raster::alpha_only);
        self.background = bg;
    }

    pub fn background_image(&mut self) -> Option<&Raster> {
        self.ensure_background();
        self.background.as_ref()
    }

    pub fn background_alpha(&mut self) -> Option<&Raster> {
        self.ensure_background();
        self.background_alpha.as_ref()
    }

    pub fn load_image(&mut self, href: &str) -> Option<Raster> {
        self.image_loader.as_mut().and_then(|f| f(href))
    }

    pub fn result(&self, name: &str) -> Option<&FilterOutput> {
        self.results.get(name)
    }

    pub fn last_result(&self) -> Option<&FilterOutput> {
        self.last_result.as_ref()
    }

    /// Stores a primitive's output as the new last-result, and additionally
    /// under `name` when non-empty, per spec.md §4.1.
    pub fn store_result(&mut self, name: &str, raster: Raster, bounds: IRect) {
        let output = FilterOutput { raster, bounds };
        if !name.is_empty() {
            self.results.insert(name.to_string(), output.clone());
        }
        self.last_result = Some(output);
    }

    pub fn new_raster(&self, width: u32, height: u32) -> Result<Raster, crate::error::AllocError> {
        Raster::new(width, height, self.channels, &self.limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::Limits;

    fn blank(w: u32, h: u32) -> Raster {
        Raster::new(w, h, ChannelMap::RGBA, &Limits::default()).unwrap()
    }

    #[test]
    fn source_alpha_is_derived_at_construction() {
        let mut src = blank(2, 2);
        src.set_pixel(0, 0, 10, 20, 30, 40);
        let ctx = FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default());
        assert_eq!(ctx.source_alpha().pixel(0, 0), (0, 0, 0, 40));
    }

    #[test]
    fn background_loader_runs_at_most_once() {
        let src = blank(1, 1);
        let mut calls = 0;
        let mut ctx = FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default())
            .with_background_loader(|| {
                calls += 1;
                Some(Raster::new(1, 1, ChannelMap::RGBA, &Limits::default()).unwrap())
            });

        assert!(ctx.background_image().is_some());
        assert!(ctx.background_alpha().is_some());
        assert!(ctx.background_image().is_some());
        drop(ctx);
        assert_eq!(calls, 1);
    }

    #[test]
    fn store_result_updates_last_and_named_cache() {
        let src = blank(1, 1);
        let mut ctx = FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default());
        ctx.store_result("blur1", blank(1, 1), IRect::new(0, 0, 1, 1));
        assert!(ctx.result("blur1").is_some());
        assert!(ctx.last_result().is_some());
        assert!(ctx.result("missing").is_none());
    }

    #[test]
    fn unnamed_result_is_not_cached_by_name() {
        let src = blank(1, 1);
        let mut ctx = FilterContext::new(src, Affine::IDENTITY, ChannelMap::RGBA, Limits::default());
        ctx.store_result("", blank(1, 1), IRect::new(0, 0, 1, 1));
        assert!(ctx.last_result().is_some());
    }
}
