// SPDX-License-Identifier: GPL-3.0-or-later
use approx::{assert_abs_diff_eq, assert_relative_eq};
use target_search::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_at_half() {
        assert_eq!(shannon_uncertainty(0.5).unwrap(), 1.0);
    }

    #[test]
    fn known_values() {
        assert_abs_diff_eq!(shannon_uncertainty(0.03).unwrap(), 0.1941, epsilon = 1e-3);
        assert_relative_eq!(shannon_uncertainty(0.7).unwrap(), 0.881291, max_relative = 1e-5);
        assert_relative_eq!(shannon_uncertainty(0.95).unwrap(), shannon_uncertainty(0.05).unwrap(), max_relative = 1e-12);
    }

    #[test]
    fn symmetric_about_half() {
        for i in 1..1000 {
            let p = i as f64 / 1000.0;
            assert_abs_diff_eq!(shannon_uncertainty(p).unwrap(), shannon_uncertainty(1.0 - p).unwrap(), epsilon = 1e-12);
        }
    }

    #[test]
    /**
        strictly decreasing away from 0.5 on both sides, vanishing at the bounds
    */
    fn monotonic_to_zero() {
        let mut prev = 1.0;
        for i in 1..500 {
            let p = 0.5 + i as f64 / 1000.0;
            let u = shannon_uncertainty(p).unwrap();
            assert!(u < prev, "not decreasing at {p}");
            prev = u;
            assert_abs_diff_eq!(u, shannon_uncertainty(1.0 - p).unwrap(), epsilon = 1e-12);
        }
        assert!(shannon_uncertainty(1e-15).unwrap() < 1e-12);
        assert!(shannon_uncertainty(1.0 - 1e-15).unwrap() < 1e-12);
    }

    #[test]
    fn rejects_bounds() {
        for p in [0.0, 1.0, -0.1, 1.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(shannon_uncertainty(p), Err(UncertaintyError::OutOfRange(_))), "{p} accepted");
        }
        assert_eq!(Probability::new(0.0), Err(UncertaintyError::OutOfRange(0.0)));
        assert!(shannon_uncertainty(clamp_probability(0.0)).is_ok());
        assert!(shannon_uncertainty(clamp_probability(1.0)).is_ok());
    }

    #[test]
    fn curve_json() {
        let jobj = shannon_curve_json(100);
        assert_eq!(jobj["prob_empty"].len(), 101);
        assert_eq!(jobj["uncertainty"][50].as_f64(), Some(1.0));
        assert_eq!(jobj["meta"]["base"].as_u32(), Some(2));
    }
}
