// SPDX-License-Identifier: GPL-3.0-or-later
use crate::common::PROB_EPSILON;
use crate::error::UncertaintyError;

/// Probability strictly inside (0, 1).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Probability(f64);

impl Probability {
    pub fn new(p: f64) -> Result<Probability, UncertaintyError> {
        if p > 0.0 && p < 1.0 {
            Ok(Probability(p))
        } else {
            Err(UncertaintyError::OutOfRange(p))
        }
    }
    /**
        never fails, @p is railed to [PROB_EPSILON, 1 - PROB_EPSILON], NaN counts as maximal uncertainty
    */
    pub fn clamped(p: f64) -> Probability {
        Probability(clamp_probability(p))
    }
    pub fn value(&self) -> f64 {
        self.0
    }
    pub fn complement(&self) -> Probability {
        Probability(1.0 - self.0)
    }
    pub fn uncertainty(&self) -> f64 {
        normalized_entropy(self.0)
    }
}

pub fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.5
    } else {
        p.clamp(PROB_EPSILON, 1.0 - PROB_EPSILON)
    }
}

/// Binary entropy in bits.
fn binary_entropy(p: f64) -> f64 {
    let q = 1.0 - p;
    -p * p.log2() - q * q.log2()
}

fn normalized_entropy(p: f64) -> f64 {
    // H(0.5) is exactly one bit, kept explicit so the base can't drift from the normalizer
    let max_uncertainty = binary_entropy(0.5);
    binary_entropy(p) / max_uncertainty
}

/**
    normalized binary entropy of @p: 1.0 at 0.5, approaching 0.0 near either bound
    p <= 0, p >= 1 and NaN are rejected, see `clamp_probability` for callers that would rather clamp
*/
pub fn shannon_uncertainty(p: f64) -> Result<f64, UncertaintyError> {
    Ok(Probability::new(p)?.uncertainty())
}

/**
    samples the uncertainty curve on @num_pts even steps over (0, 1]
    first sample sits just above zero and the endpoint 1.0 reports 0.0
*/
pub fn shannon_curve(num_pts: usize) -> Vec<(f64, f64)> {
    if num_pts == 0 {
        return vec![];
    }
    (0..=num_pts)
        .map(|i| {
            let x = if i == 0 { 1e-16 } else { i as f64 / num_pts as f64 };
            (x, shannon_uncertainty(x).unwrap_or(0.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_shape() {
        let curve = shannon_curve(100);
        assert_eq!(curve.len(), 101);
        assert_eq!(curve[50].1, 1.0);
        assert_eq!(curve[100], (1.0, 0.0));
        assert!(curve[0].1 < 1e-12);
        assert!(shannon_curve(0).is_empty());
    }

    #[test]
    fn clamp_handles_nan() {
        assert_eq!(clamp_probability(f64::NAN), 0.5);
        assert_eq!(clamp_probability(0.0), PROB_EPSILON);
        assert_eq!(clamp_probability(2.0), 1.0 - PROB_EPSILON);
        assert!(Probability::clamped(1.0).uncertainty() > 0.0);
    }
}
