// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The only fallible surface of this crate: raster allocation.
//!
//! Everything below allocation (malformed parameters, degenerate geometry,
//! resolution misses) degrades locally per the primitive dispatch rules and
//! never returns an `Err`.

use std::fmt;

/// Failure to allocate a [`crate::Raster`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AllocError {
    /// `width * height` overflows `usize`, or the stride computation does.
    DimensionOverflow,

    /// The requested dimensions exceed [`crate::Limits::max_raster_dimension`].
    TooLarge { width: u32, height: u32 },

    /// Either dimension is zero.
    ZeroSized,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AllocError::DimensionOverflow => {
                write!(f, "raster dimensions overflow an allocation size")
            }
            AllocError::TooLarge { width, height } => {
                write!(f, "raster dimensions {}x{} exceed the configured limit", width, height)
            }
            AllocError::ZeroSized => write!(f, "raster dimensions must be non-zero"),
        }
    }
}

impl std::error::Error for AllocError {}
