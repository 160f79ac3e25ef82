// SPDX-License-Identifier: GPL-3.0-or-later

/// Lower bound used when a probability must stay clear of zero before a log.
pub const PROB_EPSILON: f64 = 1e-15;
/// Bayesian results are railed into [MIN_BAYES_LIMIT, MAX_BAYES_LIMIT], keeps NaN and inf out.
pub const MIN_BAYES_LIMIT: f64 = 1e-12;
pub const MAX_BAYES_LIMIT: f64 = 1.0 - 1e-12;
/// Cells this close to certain report zero uncertainty.
pub const SHANNON_ZERO_THRESHOLD: f64 = 1e-6;
/// Type probabilities are only renormalized when their sum exceeds this.
pub const PROB_NORM_ZERO_THRESHOLD: f64 = 1e-6;
/// Floor for misclassification when the sensor has no data for a pair.
pub const MIN_MISCLASSIFY_PROB: f64 = 1e-7;

/**
    bounds @deg to [0, 360)
*/
pub fn normalize_360(deg: f64) -> f64 {
    let n = deg.rem_euclid(360.0);
    // rem_euclid may round up to the modulus for tiny negative inputs
    if n >= 360.0 { 0.0 } else { n }
}

/**
    bounds @deg to [-180, 180)
*/
pub fn normalize_signed(deg: f64) -> f64 {
    normalize_360(deg + 180.0) - 180.0
}

/**
    shortest signed rotation taking @from onto @to, in [-180, 180)
    positive means counter clockwise
*/
pub fn signed_delta(from: f64, to: f64) -> f64 {
    normalize_signed(to - from)
}

/**
    unsigned distance on the circle, in [0, 180]
*/
pub fn abs_delta(a: f64, b: f64) -> f64 {
    signed_delta(a, b).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn normalize_ranges() {
        assert_eq!(normalize_360(-90.0), 270.0);
        assert_eq!(normalize_360(720.0), 0.0);
        assert_eq!(normalize_360(-1e-20), 0.0);
        assert_eq!(normalize_signed(180.0), -180.0);
        assert_eq!(normalize_signed(-180.0), -180.0);
        assert_eq!(normalize_signed(190.0), -170.0);
        assert_eq!(normalize_signed(-540.0), -180.0);
    }

    #[test]
    fn deltas_take_short_way_round() {
        assert_eq!(signed_delta(350.0, 10.0), 20.0);
        assert_eq!(signed_delta(10.0, 350.0), -20.0);
        assert_eq!(abs_delta(-170.0, 170.0), 20.0);
        assert_eq!(abs_delta(0.0, 180.0), 180.0);
        assert_abs_diff_eq!(abs_delta(45.3, 45.3 + 3600.0), 0.0, epsilon = 1e-9);
    }
}
