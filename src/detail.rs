// This file is part of the binlayout project.
//
// Copyright (C) 2025 Chen-Pang He <jdh8@skymizer.com>
//
// This Source Code Form is subject to the terms of the Mozilla
// Public License v. 2.0. If a copy of the MPL was not distributed
// with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bit-level helpers for IEEE 754 binary64
//!
//! This module is not considered part of the stable API.  Symbols here are
//! public so that tests and downstream histograms can reason about the double
//! lattice the same way the layouts do.

/// Sign bit of a binary64
pub const SIGN_MASK: u64 = 0x8000_0000_0000_0000;

/// Explicit fraction bits of a binary64
pub const FRACTION_MASK: u64 = 0x000F_FFFF_FFFF_FFFF;

/// Bits of `+inf`, the largest non-NaN magnitude
pub const INFINITY_BITS: u64 = 0x7FF0_0000_0000_0000;

/// Exponent reported by [`decompose`] for the smallest subnormal
pub const MIN_EXPONENT: i32 = -1074;

const ONE_BITS: u64 = 0x3FF0_0000_0000_0000;
const BIAS: i32 = 0x3FF;

/// Split the magnitude of `bits` into an unbiased exponent and a 52-bit fraction
///
/// The sign bit is ignored.  Subnormals are normalized, so for every positive
/// finite `x`, `x == significand(fraction) * 2^exponent` holds exactly.  Zero
/// yields `(MIN_EXPONENT - 1, 0)`, which sits just below the smallest
/// subnormal.  Infinity yields `(1024, 0)` and NaN `(1024, payload)`.
#[must_use]
pub const fn decompose(bits: u64) -> (i32, u64) {
    let bits = bits & !SIGN_MASK;
    #[allow(clippy::cast_possible_truncation)]
    let biased = (bits >> 52) as i32;
    let fraction = bits & FRACTION_MASK;

    if biased != 0 {
        return (biased - BIAS, fraction);
    }

    if fraction == 0 {
        return (MIN_EXPONENT - 1, 0);
    }

    let shift = fraction.leading_zeros() - 11;
    #[allow(clippy::cast_possible_wrap)]
    let exponent = 1 - BIAS - shift as i32;
    (exponent, (fraction << shift) & FRACTION_MASK)
}

/// Significand in [1, 2) with the given explicit fraction bits
#[must_use]
pub const fn significand(fraction: u64) -> f64 {
    f64::from_bits(ONE_BITS | (fraction & FRACTION_MASK))
}

/// Fast 2<sup>`x`</sup> with bit manipulation
#[must_use]
pub const fn exp2i(x: i32) -> f64 {
    f64::from_bits(match x.saturating_add(BIAS) {
        0x7FF.. => INFINITY_BITS,
        #[allow(clippy::cast_sign_loss)]
        s @ 1..=0x7FE => (s as u64) << 52,
        s @ -51..=0 => 1 << (51 + s),
        _ => 0,
    })
}

/// Map a double to an integer such that the order of doubles is preserved
///
/// `-0.0` maps to `-1` and `+0.0` to `0`, so adjacent doubles (including the
/// two zeros) map to adjacent integers.  NaNs land outside the range spanned
/// by the infinities.
#[must_use]
pub const fn to_ordered(x: f64) -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let bits = x.to_bits() as i64;
    bits ^ (((bits >> 63) as u64) >> 1) as i64
}

/// Inverse of [`to_ordered`]
#[must_use]
pub const fn from_ordered(x: i64) -> f64 {
    #[allow(clippy::cast_sign_loss)]
    f64::from_bits((x ^ (((x >> 63) as u64) >> 1) as i64) as u64)
}

/// Find the smallest integer in `[min, max]` satisfying a monotone predicate
///
/// The predicate must be false below some threshold and true from there on,
/// and it must hold at `max`.  The search gallops away from `guess` until it
/// brackets the threshold and then bisects, so a good guess costs only a few
/// evaluations.
pub fn find_first(predicate: impl Fn(i64) -> bool, min: i64, max: i64, guess: i64) -> i64 {
    debug_assert!(min <= max);
    let guess = guess.clamp(min, max);
    let mut low: i64;
    let mut high: i64;

    if predicate(guess) {
        high = guess;
        let mut step = 1_u64;
        loop {
            if high == min {
                return min;
            }
            let candidate = high.saturating_sub_unsigned(step).max(min);
            if predicate(candidate) {
                high = candidate;
                step = step.saturating_mul(2);
            } else {
                low = candidate;
                break;
            }
        }
    } else {
        low = guess;
        let mut step = 1_u64;
        loop {
            if low == max {
                return max;
            }
            let candidate = low.saturating_add_unsigned(step).min(max);
            if predicate(candidate) {
                high = candidate;
                break;
            }
            low = candidate;
            step = step.saturating_mul(2);
        }
    }

    while high.abs_diff(low) > 1 {
        #[allow(clippy::cast_possible_wrap)]
        let middle = low + (high.abs_diff(low) / 2) as i64;
        if predicate(middle) {
            high = middle;
        } else {
            low = middle;
        }
    }
    high
}
