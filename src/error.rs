// This file is part of the binlayout project.
//
// Copyright (C) 2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Reasons a layout configuration is rejected
///
/// Every variant is a deterministic function of the configuration, so
/// retrying with the same values fails the same way.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum LayoutError {
    /// The absolute error is not a finite positive number with a finite reciprocal
    #[error("absolute error must be finite and positive, got {0}")]
    InvalidAbsoluteError(f64),

    /// The relative error is not in [0, 1)
    #[error("relative error must be finite and in [0, 1), got {0}")]
    InvalidRelativeError(f64),

    /// A bound is not finite, or the range contains no ordinary bin
    #[error("invalid value range [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    /// A bin index or the number of bins would not fit in `i32`
    #[error("layout requires {required:e} bins, which exceeds the i32 range")]
    BinCountOverflow { required: f64 },

    /// The geometric regime would be finer than the double lattice can resolve
    #[error(
        "relative error {relative_error:e} is too small to join the absolute error {absolute_error:e}"
    )]
    InconsistentErrorBounds {
        absolute_error: f64,
        relative_error: f64,
    },
}
