// SPDX-License-Identifier: GPL-3.0-or-later
use crate::common::{normalize_360, normalize_signed};
use approx::AbsDiffEq;
use num_complex::Complex;
use std::fmt;
use std::ops::{Add, Sub};

/// Two angles closer than this (degrees) compare equal.
pub const ANGLE_EPS: f64 = 1e-9;

/// Heading or bearing, stored in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct Angle {
    deg: f64,
}

impl Angle {
    pub fn from_degrees(deg: f64) -> Angle {
        Angle { deg }
    }
    pub fn from_radians(rad: f64) -> Angle {
        Angle { deg: rad.to_degrees() }
    }
    pub fn degrees(&self) -> f64 {
        self.deg
    }
    pub fn radians(&self) -> f64 {
        self.deg.to_radians()
    }
    pub fn normalized_360(&self) -> Angle {
        Angle::from_degrees(normalize_360(self.deg))
    }
    pub fn normalized_signed(&self) -> Angle {
        Angle::from_degrees(normalize_signed(self.deg))
    }
    pub fn half(&self) -> Angle {
        Angle::from_degrees(self.deg * 0.5)
    }
    /**
        strictly between @left and @right after both are normalized to [-180, 180),
        the bounds are swapped if given in the wrong order
    */
    pub fn is_between(&self, left: Angle, right: Angle) -> bool {
        let mut lo = normalize_signed(left.deg);
        let mut hi = normalize_signed(right.deg);
        if lo > hi {
            std::mem::swap(&mut lo, &mut hi);
        }
        let me = normalize_signed(self.deg);
        lo < me && me < hi
    }
}

impl Add for Angle {
    type Output = Angle;
    fn add(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.deg + rhs.deg)
    }
}

impl Sub for Angle {
    type Output = Angle;
    fn sub(self, rhs: Angle) -> Angle {
        Angle::from_degrees(self.deg - rhs.deg)
    }
}

impl PartialEq for Angle {
    fn eq(&self, other: &Angle) -> bool {
        (self.deg - other.deg).abs() <= ANGLE_EPS
    }
}

impl AbsDiffEq for Angle {
    type Epsilon = f64;
    fn default_epsilon() -> f64 {
        ANGLE_EPS
    }
    fn abs_diff_eq(&self, other: &Angle, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.deg, &other.deg, epsilon)
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}\u{00b0}", self.deg)
    }
}

/**
    alpha filter on the circle: moves @current towards @newer by @alpha
    the two headings are blended as unit vectors, result in [-180, 180)
    opposite headings at alpha 0.5 have no mean, @current is kept then
*/
pub fn blend_headings(current: f64, newer: f64, alpha: f64) -> f64 {
    let a = Complex::from_polar(1.0 - alpha, current.to_radians());
    let b = Complex::from_polar(alpha, newer.to_radians());
    let sum = a + b;
    if sum.norm() < 1e-12 {
        return normalize_signed(current);
    }
    normalize_signed(sum.arg().to_degrees())
}
