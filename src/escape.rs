// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluators.
//!
//! All three variants approximate the same recurrence, z' = z² + c
//! from z = 0, and report how many steps a point survives before its
//! magnitude exceeds [`ESCAPE_RADIUS`].  They are deliberately not
//! identical:
//!
//! * [`Variant::Complex`] steps first and then tests the magnitude,
//!   so the step that escapes is never counted.  It also rounds the
//!   components of z after every step.
//! * [`Variant::Naive`] and [`Variant::Optimized`] test the magnitude
//!   before stepping and count every step they take, so the step that
//!   escapes is counted.  At points near the escape boundary they can
//!   read one higher than the complex variant.
//!
//! The two real-arithmetic variants are interchangeable; the
//! optimized one performs the same operations in the same order and
//! only skips the redundant squarings.

use std::str::FromStr;

use num::Complex;

use error::Error;

/// Magnitude threshold beyond which a point is classified as
/// diverging.  Once |z| passes 2 the recurrence grows without bound.
pub const ESCAPE_RADIUS: f64 = 2.0;

const ESCAPE_RADIUS_SQR: f64 = ESCAPE_RADIUS * ESCAPE_RADIUS;

// The complex variant rounds the components of z to ten decimal
// digits after every step.  Squaring near the escape boundary is
// chaotic in the low-order bits, and the rounding keeps the escape
// decision stable there.
const ROUND_SCALE: f64 = 1e10;

/// One of the interchangeable arithmetic strategies for computing the
/// same escape count.  All return values in `[0, max_iterations]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Iterates `Complex<f64>` values directly, rounding the
    /// components of z after every step.  The escaping step is not
    /// counted.
    Complex,
    /// Textbook real-arithmetic decomposition of the recurrence.  The
    /// escaping step is counted.
    Naive,
    /// Same guard and step order as `Naive`, with x² and y² cached
    /// between iterations.
    Optimized,
}

impl Variant {
    /// Every supported variant, in declaration order.
    pub fn all() -> [Variant; 3] {
        [Variant::Complex, Variant::Naive, Variant::Optimized]
    }

    // Dispatch without revalidating; the budget was checked at the
    // entry point.
    pub(crate) fn count(self, c: Complex<f64>, max_iterations: u32) -> u32 {
        match self {
            Variant::Complex => complex_count(c, max_iterations),
            Variant::Naive => naive_count(c, max_iterations),
            Variant::Optimized => optimized_count(c, max_iterations),
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Variant, Error> {
        match s {
            "complex" => Ok(Variant::Complex),
            "naive" => Ok(Variant::Naive),
            "optimized" => Ok(Variant::Optimized),
            _ => Err(Error::invalid_argument(format!(
                "unknown variant '{}', expected complex, naive, or optimized",
                s
            ))),
        }
    }
}

/// The number of recurrence steps `c` survives before escaping,
/// capped at `max_iterations`.  A zero budget is an error; nothing
/// else can fail.
pub fn escape_count(
    c: Complex<f64>,
    max_iterations: u32,
    variant: Variant,
) -> Result<u32, Error> {
    if max_iterations == 0 {
        return Err(Error::invalid_argument(
            "iteration budget must be at least 1",
        ));
    }
    Ok(variant.count(c, max_iterations))
}

pub(crate) fn round10(value: f64) -> f64 {
    (value * ROUND_SCALE).round() / ROUND_SCALE
}

fn complex_count(c: Complex<f64>, max_iterations: u32) -> u32 {
    let mut z: Complex<f64> = Complex { re: 0.0, im: 0.0 };
    let mut iterations = 0;
    while iterations < max_iterations {
        let stepped = z * z + c;
        let stepped = Complex {
            re: round10(stepped.re),
            im: round10(stepped.im),
        };
        // NaN compares false on both sides, so an unrepresentable
        // magnitude exits here as an escape.
        if !(stepped.norm() <= ESCAPE_RADIUS) {
            break;
        }
        z = stepped;
        iterations += 1;
    }
    iterations
}

fn naive_count(c: Complex<f64>, max_iterations: u32) -> u32 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;
    let mut iterations = 0;
    while x * x + y * y <= ESCAPE_RADIUS_SQR && iterations < max_iterations {
        let xtemp = x * x - y * y + c.re;
        y = 2.0 * x * y + c.im;
        x = xtemp;
        iterations += 1;
    }
    iterations
}

fn optimized_count(c: Complex<f64>, max_iterations: u32) -> u32 {
    let mut x = 0.0_f64;
    let mut y = 0.0_f64;
    let mut xsqr = 0.0_f64;
    let mut ysqr = 0.0_f64;
    let mut iterations = 0;
    while xsqr + ysqr <= ESCAPE_RADIUS_SQR && iterations < max_iterations {
        y = (x + x) * y + c.im;
        x = xsqr - ysqr + c.re;
        xsqr = x * x;
        ysqr = y * y;
        iterations += 1;
    }
    iterations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minus_one_never_escapes() {
        // c = -1 cycles between -1 and 0 forever.
        let c = Complex::new(-1.0, 0.0);
        for &budget in &[1, 10, 500] {
            for &variant in &Variant::all() {
                assert_eq!(escape_count(c, budget, variant).unwrap(), budget);
            }
        }
    }

    #[test]
    fn one_survives_two_steps_under_the_complex_variant() {
        // z walks 1, 2, 5; |2| is not past the radius, |5| is, and
        // the escaping step is not counted.
        let c = Complex::new(1.0, 0.0);
        assert_eq!(escape_count(c, 5, Variant::Complex).unwrap(), 2);
        assert_eq!(escape_count(c, 100, Variant::Complex).unwrap(), 2);
    }

    #[test]
    fn one_counts_the_escaping_step_under_the_real_variants() {
        let c = Complex::new(1.0, 0.0);
        assert_eq!(escape_count(c, 100, Variant::Naive).unwrap(), 3);
        assert_eq!(escape_count(c, 100, Variant::Optimized).unwrap(), 3);
    }

    #[test]
    fn naive_and_optimized_are_numerically_identical() {
        // A raster over the whole classical window, border included.
        for i in 0..41 {
            for j in 0..41 {
                let c = Complex::new(-2.0 + 0.1 * (i as f64), -2.0 + 0.1 * (j as f64));
                assert_eq!(
                    escape_count(c, 64, Variant::Naive).unwrap(),
                    escape_count(c, 64, Variant::Optimized).unwrap(),
                    "diverged at {}",
                    c
                );
            }
        }
    }

    #[test]
    fn counts_never_exceed_the_budget() {
        for i in 0..17 {
            for j in 0..17 {
                let c = Complex::new(-2.0 + 0.25 * (i as f64), -2.0 + 0.25 * (j as f64));
                for &variant in &Variant::all() {
                    assert!(escape_count(c, 30, variant).unwrap() <= 30);
                }
            }
        }
    }

    #[test]
    fn zero_budget_is_rejected() {
        let c = Complex::new(0.0, 0.0);
        for &variant in &Variant::all() {
            match escape_count(c, 0, variant) {
                Err(Error::InvalidArgument(_)) => (),
                other => panic!("expected InvalidArgument, got {:?}", other),
            }
        }
    }

    #[test]
    fn nan_input_terminates_immediately() {
        let c = Complex::new(::std::f64::NAN, 0.0);
        assert_eq!(escape_count(c, 1000, Variant::Complex).unwrap(), 0);
        // The real variants take the one step that poisons x, then
        // fail the guard.
        assert_eq!(escape_count(c, 1000, Variant::Naive).unwrap(), 1);
        assert_eq!(escape_count(c, 1000, Variant::Optimized).unwrap(), 1);
    }

    #[test]
    fn variants_parse_from_str() {
        assert_eq!("complex".parse::<Variant>().unwrap(), Variant::Complex);
        assert_eq!("naive".parse::<Variant>().unwrap(), Variant::Naive);
        assert_eq!("optimized".parse::<Variant>().unwrap(), Variant::Optimized);
        assert!("cubic".parse::<Variant>().is_err());
    }

    #[test]
    fn rounding_truncates_to_ten_digits() {
        assert_eq!(round10(1.0 / 3.0), 0.333_333_333_3);
        assert_eq!(round10(0.123_456_789_06), 0.123_456_789_1);
        assert_eq!(round10(-2.0), -2.0);
    }
}
