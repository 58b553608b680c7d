// This file is part of the binlayout project.
//
// Copyright (C) 2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Piecewise approximations of log<sub>2</sub> from exponent and fraction bits

use crate::detail;
use num_traits::Float;

/// Monotone approximation of log<sub>2</sub> evaluated on decomposed doubles
///
/// An approximation has the form `exponent + g(m)` where `m` is the
/// significand in [1, 2) and `g` is increasing with `g(1) = 0` and `g(2) = 1`,
/// so it is continuous across octaves and exact at powers of two.
///
/// Every approximation reads all 52 fraction bits.  Fewer bits would only
/// coarsen the mapping; the bin width is governed by `MIN_SLOPE` instead.
pub trait LogApproximation {
    /// Human-readable name of the layout built on this approximation
    const NAME: &'static str;

    /// Minimum of `m * g'(m)` over [1, 2]
    ///
    /// This is the least rate at which the approximation grows per unit of
    /// natural logarithm, which bounds the relative width of a bin.
    const MIN_SLOPE: f64;

    /// Approximate log<sub>2</sub> of `significand(fraction) * 2^exponent`
    fn log2(exponent: i32, fraction: u64) -> f64;

    /// Significand `m` in [1, 2] such that `g(m) == t` for `t` in [0, 1]
    fn significand(t: f64) -> f64;
}

/// Linear interpolation between powers of two
///
/// This is the fast variant: the fraction bits are the approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogLinear;

impl LogApproximation for LogLinear {
    const NAME: &'static str = "LogLinearLayout";
    const MIN_SLOPE: f64 = 1.0;

    #[inline]
    fn log2(exponent: i32, fraction: u64) -> f64 {
        f64::from(exponent) + (detail::significand(fraction) - 1.0)
    }

    #[inline]
    fn significand(t: f64) -> f64 {
        1.0 + t
    }
}

/// Quadratic interpolation `g(m) = (m - 1)(5 - m) / 3`
///
/// Closer to the true logarithm than [`LogLinear`], so bins are more uniform
/// in relative width and fewer are needed for the same error bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogQuadratic;

impl LogApproximation for LogQuadratic {
    const NAME: &'static str = "LogQuadraticLayout";
    const MIN_SLOPE: f64 = 4.0 / 3.0;

    #[inline]
    fn log2(exponent: i32, fraction: u64) -> f64 {
        let m = detail::significand(fraction);
        f64::from(exponent) + (m - 1.0) * (5.0 - m) / 3.0
    }

    #[inline]
    fn significand(t: f64) -> f64 {
        3.0 - (4.0 - 3.0 * t).sqrt()
    }
}
