// This file is part of the binlayout project.
//
// Copyright (C) 2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error-limiting layouts

use crate::approx::{LogApproximation, LogLinear, LogQuadratic};
use crate::detail;
use crate::{Layout, LayoutConfig, LayoutError};
use core::fmt;
use core::marker::PhantomData;
use num_traits::{Float, ToPrimitive};

/// Layout whose bins satisfy an absolute or a relative error bound
///
/// Near zero, bins are `absolute_error` wide.  From `first_normal_index` on,
/// bins follow a bit-level approximation of the logarithm supplied by `A`, so
/// their width relative to their upper bound never exceeds `relative_error`.
/// The index of a value is computed in constant time without any search.
///
/// Infinities and NaNs map to `i32::MAX`, or to `i32::MIN` with the sign bit
/// set, which lies beyond both sentinels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorLimitingLayout<A> {
    config: LayoutConfig,
    linear_factor: f64,
    log_factor: f64,
    offset: f64,
    first_normal_index: f64,
    normal_limit_bits: u64,
    underflow_bin_index: i32,
    overflow_bin_index: i32,
    approximation: PhantomData<A>,
}

/// Fast layout with linear interpolation of log<sub>2</sub>
pub type LogLinearLayout = ErrorLimitingLayout<LogLinear>;

/// Compact layout with quadratic interpolation of log<sub>2</sub>
pub type LogQuadraticLayout = ErrorLimitingLayout<LogQuadratic>;

impl<A: LogApproximation> ErrorLimitingLayout<A> {
    /// Create a layout covering `[min_value, max_value]` with ordinary bins
    ///
    /// # Errors
    ///
    /// See [`LayoutError`] for the rejected configurations.
    pub fn create(
        absolute_error: f64,
        relative_error: f64,
        min_value: f64,
        max_value: f64,
    ) -> Result<Self, LayoutError> {
        Self::from_config(LayoutConfig::new(
            absolute_error,
            relative_error,
            min_value,
            max_value,
        ))
    }

    /// Create a layout from a (possibly persisted) configuration
    ///
    /// # Errors
    ///
    /// See [`LayoutError`] for the rejected configurations.
    pub fn from_config(config: LayoutConfig) -> Result<Self, LayoutError> {
        let result = Self::build(config);

        match &result {
            Ok(layout) => log::debug!(
                "created {} for {:?} with bins [{}, {}]",
                A::NAME,
                config,
                layout.underflow_bin_index,
                layout.overflow_bin_index,
            ),
            Err(e) => log::debug!("rejected {} for {:?}: {}", A::NAME, config, e),
        }
        result
    }

    fn build(config: LayoutConfig) -> Result<Self, LayoutError> {
        let scales = config.validate(A::MIN_SLOPE)?;

        let mut layout = Self {
            config,
            linear_factor: scales.linear_factor,
            log_factor: scales.log_factor,
            offset: 0.0,
            first_normal_index: scales.first_normal_index,
            normal_limit_bits: detail::INFINITY_BITS,
            underflow_bin_index: 0,
            overflow_bin_index: 0,
            approximation: PhantomData,
        };

        if layout.first_normal_index.is_finite() {
            layout.normal_limit_bits = layout.find_normal_limit();
            layout.offset = layout.find_offset();
        }

        let required = layout.signed_coordinate(config.max_value) + 1.0;
        layout.overflow_bin_index = required
            .to_i32()
            .ok_or(LayoutError::BinCountOverflow { required })?;

        let required = layout.signed_coordinate(config.min_value) - 1.0;
        layout.underflow_bin_index = required
            .to_i32()
            .ok_or(LayoutError::BinCountOverflow { required })?;

        let span = i64::from(layout.overflow_bin_index) - i64::from(layout.underflow_bin_index);

        if span < 2 {
            return Err(LayoutError::InvalidRange {
                min: config.min_value,
                max: config.max_value,
            });
        }

        // Every bin, sentinels included, must be countable in `i32`.
        if span >= i64::from(i32::MAX) {
            #[allow(clippy::cast_precision_loss)]
            let required = (span + 1) as f64;
            return Err(LayoutError::BinCountOverflow { required });
        }

        Ok(layout)
    }

    /// Smallest magnitude whose linear coordinate reaches `first_normal_index`
    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn find_normal_limit(&self) -> u64 {
        let guess = (self.first_normal_index * self.config.absolute_error).to_bits();

        detail::find_first(
            |bits| f64::from_bits(bits as u64) * self.linear_factor >= self.first_normal_index,
            0,
            detail::INFINITY_BITS as i64,
            guess as i64,
        ) as u64
    }

    /// Smallest offset placing the normal limit at `first_normal_index`
    fn find_offset(&self) -> f64 {
        let (exponent, fraction) = detail::decompose(self.normal_limit_bits);
        let scaled = self.log_factor * A::log2(exponent, fraction);

        detail::from_ordered(detail::find_first(
            |offset| scaled + detail::from_ordered(offset) >= self.first_normal_index,
            detail::to_ordered(f64::MIN),
            detail::to_ordered(f64::MAX),
            detail::to_ordered(self.first_normal_index - scaled),
        ))
    }

    /// Non-negative, unfloored bin coordinate of a magnitude
    ///
    /// Infinity and NaN have an infinite coordinate, which saturates to
    /// `i32::MAX` when narrowed.
    #[inline]
    fn coordinate(&self, magnitude_bits: u64) -> f64 {
        if magnitude_bits >= self.normal_limit_bits {
            if magnitude_bits >= detail::INFINITY_BITS {
                return f64::INFINITY;
            }
            let (exponent, fraction) = detail::decompose(magnitude_bits);
            self.log_factor * A::log2(exponent, fraction) + self.offset
        } else {
            f64::from_bits(magnitude_bits) * self.linear_factor
        }
    }

    /// Bin index of `value` as a float, not narrowed to `i32`
    fn signed_coordinate(&self, value: f64) -> f64 {
        let bits = value.to_bits();
        let coordinate = self.coordinate(bits & !detail::SIGN_MASK).floor();

        if bits & detail::SIGN_MASK == 0 {
            coordinate
        } else {
            -coordinate - 1.0
        }
    }

    /// Approximate lower bound of a bin with non-negative index
    fn magnitude_lower_bound_approximation(&self, index: f64) -> f64 {
        if index < self.first_normal_index {
            return index / self.linear_factor;
        }

        let log2 = (index - self.offset) / self.log_factor;
        let exponent = log2.floor();

        #[allow(clippy::cast_possible_truncation)]
        let power = detail::exp2i(exponent as i32);
        A::significand(log2 - exponent) * power
    }

    /// The configuration this layout was built from
    #[must_use]
    pub const fn config(&self) -> LayoutConfig {
        self.config
    }

    #[must_use]
    pub const fn absolute_error(&self) -> f64 {
        self.config.absolute_error
    }

    #[must_use]
    pub const fn relative_error(&self) -> f64 {
        self.config.relative_error
    }

    #[must_use]
    pub const fn min_value(&self) -> f64 {
        self.config.min_value
    }

    #[must_use]
    pub const fn max_value(&self) -> f64 {
        self.config.max_value
    }
}

impl<A: LogApproximation> Layout for ErrorLimitingLayout<A> {
    #[inline]
    fn map_to_bin_index(&self, value: f64) -> i32 {
        let bits = value.to_bits();

        #[allow(clippy::cast_possible_truncation)]
        let index = self.coordinate(bits & !detail::SIGN_MASK) as i32;

        if bits & detail::SIGN_MASK == 0 {
            index
        } else {
            !index
        }
    }

    fn underflow_bin_index(&self) -> i32 {
        self.underflow_bin_index
    }

    fn overflow_bin_index(&self) -> i32 {
        self.overflow_bin_index
    }

    fn bin_lower_bound_approximation(&self, bin_index: i32) -> f64 {
        let index = f64::from(bin_index);

        if bin_index >= 0 {
            self.magnitude_lower_bound_approximation(index)
        } else {
            -self.magnitude_lower_bound_approximation(-index)
        }
    }
}

impl<A: LogApproximation> fmt::Display for ErrorLimitingLayout<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [absolute_error={}, relative_error={}, min_value={}, max_value={}]",
            A::NAME,
            self.config.absolute_error,
            self.config.relative_error,
            self.config.min_value,
            self.config.max_value,
        )
    }
}
