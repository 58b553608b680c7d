// This file is part of the binlayout project.
//
// Copyright (C) 2024-2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Histogram bin layouts with guaranteed error bounds
//!
//! A [`Layout`] maps every `f64` to a bin index.  The bins of an
//! [`ErrorLimitingLayout`] are either at most `absolute_error` wide or at most
//! `relative_error` wide relative to their magnitude, whichever allows the
//! wider bin.  Two variants trade speed for compactness:
//!
//! - [`LogLinearLayout`] approximates log<sub>2</sub> linearly from the
//!   fraction bits of the value.
//! - [`LogQuadraticLayout`] uses a quadratic approximation and needs 25%
//!   fewer bins for the same error bound.
//!
//! ```
//! use binlayout::{Layout, LogLinearLayout};
//!
//! let layout = LogLinearLayout::create(1.0, 0.01, 0.0, 2000.0).unwrap();
//! let index = layout.map_to_bin_index(1234.5);
//! assert!(layout.bin_lower_bound(index) <= 1234.5);
//! assert!(layout.bin_upper_bound(index) >= 1234.5);
//! ```
#![no_std]

mod approx;
mod config;
pub mod detail;
mod error;
mod layout;

pub use approx::{LogApproximation, LogLinear, LogQuadratic};
pub use config::LayoutConfig;
pub use error::LayoutError;
pub use layout::{ErrorLimitingLayout, LogLinearLayout, LogQuadraticLayout};

/// Mapping from values to contiguous bin indices
///
/// Indices from [`underflow_bin_index`](Layout::underflow_bin_index) to
/// [`overflow_bin_index`](Layout::overflow_bin_index) are valid bins.  The
/// bins strictly between the two sentinels are ordinary bins.
///
/// Implementors supply the mapping and a cheap approximation of its inverse;
/// the exact bounds are derived from them.
pub trait Layout {
    /// Index of the bin containing `value`
    ///
    /// This is total and monotone, and not clamped to the sentinels.  For every
    /// `value` other than NaN, `map_to_bin_index(-value)` equals
    /// `-map_to_bin_index(value) - 1`, so no bin contains both signs.
    fn map_to_bin_index(&self, value: f64) -> i32;

    /// Index of the bin that collects everything below the ordinary bins
    fn underflow_bin_index(&self) -> i32;

    /// Index of the bin that collects everything above the ordinary bins
    fn overflow_bin_index(&self) -> i32;

    /// Cheap approximation of the transition into bin `bin_index`
    ///
    /// Values slightly below the returned value map to `bin_index - 1` and
    /// values slightly above map to `bin_index`.
    fn bin_lower_bound_approximation(&self, bin_index: i32) -> f64;

    /// Smallest value mapped to `bin_index`
    ///
    /// # Panics
    ///
    /// Panics if `bin_index` is not in the sentinel range.
    fn bin_lower_bound(&self, bin_index: i32) -> f64 {
        assert_bin_index(self, bin_index);

        if bin_index == self.underflow_bin_index() {
            return f64::NEG_INFINITY;
        }

        detail::from_ordered(detail::find_first(
            |x| self.map_to_bin_index(detail::from_ordered(x)) >= bin_index,
            detail::to_ordered(f64::NEG_INFINITY),
            detail::to_ordered(f64::INFINITY),
            detail::to_ordered(self.bin_lower_bound_approximation(bin_index)),
        ))
    }

    /// Largest value mapped to `bin_index`
    ///
    /// The lower bound of the next bin is the next representable double.
    ///
    /// # Panics
    ///
    /// Panics if `bin_index` is not in the sentinel range.
    fn bin_upper_bound(&self, bin_index: i32) -> f64 {
        assert_bin_index(self, bin_index);

        if bin_index == self.overflow_bin_index() {
            return f64::INFINITY;
        }

        let next = detail::find_first(
            |x| self.map_to_bin_index(detail::from_ordered(x)) > bin_index,
            detail::to_ordered(f64::NEG_INFINITY),
            detail::to_ordered(f64::INFINITY),
            detail::to_ordered(self.bin_lower_bound_approximation(bin_index + 1)),
        );
        detail::from_ordered(next - 1)
    }

    /// Lower bound of the first ordinary bin
    fn normal_range_lower_bound(&self) -> f64 {
        self.bin_lower_bound(self.underflow_bin_index() + 1)
    }

    /// Upper bound of the last ordinary bin
    fn normal_range_upper_bound(&self) -> f64 {
        self.bin_upper_bound(self.overflow_bin_index() - 1)
    }

    /// Number of bins including both sentinels
    fn bin_count(&self) -> u64 {
        u64::from(self.overflow_bin_index().abs_diff(self.underflow_bin_index())) + 1
    }
}

fn assert_bin_index<L: Layout + ?Sized>(layout: &L, bin_index: i32) {
    assert!(
        (layout.underflow_bin_index()..=layout.overflow_bin_index()).contains(&bin_index),
        "bin index {bin_index} is outside [{}, {}]",
        layout.underflow_bin_index(),
        layout.overflow_bin_index(),
    );
}
