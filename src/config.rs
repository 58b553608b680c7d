// This file is part of the binlayout project.
//
// Copyright (C) 2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Layout configuration and construction-time validation

use crate::LayoutError;
use num_traits::Float;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest admissible `log_factor`
///
/// Beyond this, neighboring doubles in the geometric regime may be more than a
/// fraction of a bin apart in coordinate space.
const MAX_LOG_FACTOR: f64 = 68_719_476_736.0; // 2^36

/// The four scalars that fully determine a layout
///
/// Layout construction is deterministic, so persisting a `LayoutConfig` is
/// enough to rebuild a layout with identical mapping behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LayoutConfig {
    pub absolute_error: f64,
    pub relative_error: f64,
    pub min_value: f64,
    pub max_value: f64,
}

/// Scales derived from a validated configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Scales {
    /// Bins per unit of value in the linear regime
    pub linear_factor: f64,
    /// Bins per unit of approximate log<sub>2</sub> in the geometric regime
    pub log_factor: f64,
    /// First bin of the geometric regime, infinite if there is none
    pub first_normal_index: f64,
}

impl LayoutConfig {
    /// Collect a configuration without validating it
    #[must_use]
    pub const fn new(absolute_error: f64, relative_error: f64, min_value: f64, max_value: f64) -> Self {
        Self {
            absolute_error,
            relative_error,
            min_value,
            max_value,
        }
    }

    /// Largest magnitude in the value range
    #[must_use]
    pub fn max_magnitude(&self) -> f64 {
        self.min_value.abs().max(self.max_value.abs())
    }

    /// Bins per unit of natural logarithm that keep the relative width in bounds
    ///
    /// A bin `[lo, hi]` with `ln(hi / lo) <= 1 / k` has
    /// `(hi - lo) / hi <= 1 - exp(-1 / k)`, which equals the relative error
    /// for this `k`.
    fn bins_per_log_unit(&self) -> f64 {
        -(-self.relative_error).ln_1p().recip()
    }

    /// Closed-form lower estimate of the bin index of a positive magnitude
    ///
    /// The realized layouts advance at least `bins_per_log_unit` bins per
    /// unit of `ln x` above the seam, so an estimate that overflows proves the
    /// layout overflows.
    fn estimated_bin_index(&self, magnitude: f64, first_normal_index: f64) -> f64 {
        let seam = first_normal_index * self.absolute_error;

        if magnitude <= seam {
            magnitude / self.absolute_error
        } else {
            // The quotient overflows for wide ranges, the difference does not.
            first_normal_index + (magnitude.ln() - seam.ln()) * self.bins_per_log_unit()
        }
    }

    /// Closed-form lower estimate of the larger of the sentinel magnitude and
    /// the total bin count
    ///
    /// A range spanning zero needs the bins of both halves.
    fn estimated_bin_count(&self, first_normal_index: f64) -> f64 {
        if self.min_value < 0.0 && self.max_value > 0.0 {
            self.estimated_bin_index(-self.min_value, first_normal_index)
                + self.estimated_bin_index(self.max_value, first_normal_index)
                + 2.0
        } else {
            self.estimated_bin_index(self.max_magnitude(), first_normal_index)
        }
    }

    /// Run every construction check for an approximation with `min_slope`
    pub(crate) fn validate(&self, min_slope: f64) -> Result<Scales, LayoutError> {
        let &Self {
            absolute_error,
            relative_error,
            min_value,
            max_value,
        } = self;

        if !(absolute_error.is_finite() && absolute_error > 0.0 && absolute_error.recip().is_finite()) {
            return Err(LayoutError::InvalidAbsoluteError(absolute_error));
        }

        if !(relative_error.is_finite() && (0.0..1.0).contains(&relative_error)) {
            return Err(LayoutError::InvalidRelativeError(relative_error));
        }

        if !(min_value.is_finite() && max_value.is_finite() && min_value <= max_value) {
            return Err(LayoutError::InvalidRange {
                min: min_value,
                max: max_value,
            });
        }

        let (log_factor, first_normal_index) = if relative_error > 0.0 {
            (
                self.bins_per_log_unit() / min_slope,
                relative_error.recip().ceil(),
            )
        } else {
            (0.0, f64::INFINITY)
        };

        let required = self.estimated_bin_count(first_normal_index);

        if !(required <= f64::from(i32::MAX)) {
            return Err(LayoutError::BinCountOverflow { required });
        }

        if !(log_factor < MAX_LOG_FACTOR) {
            return Err(LayoutError::InconsistentErrorBounds {
                absolute_error,
                relative_error,
            });
        }

        Ok(Scales {
            linear_factor: absolute_error.recip(),
            log_factor,
            first_normal_index,
        })
    }
}
