// SPDX-License-Identifier: GPL-3.0-or-later
use crate::common::{MIN_MISCLASSIFY_PROB, abs_delta};
use json::JsonValue;
use log::warn;
use rand::Rng;

pub const DEFAULT_BEST_ANGLE: f64 = 45.0;
pub const DEFAULT_DEGRADATION_SLOPE: f64 = -1.0 / 180.0;
pub const DEFAULT_MIN_DETECT_VALUE: f64 = 0.001;
/// Finer sweeps than this (degrees) are refused.
pub const MIN_SWEEP_STEP: f64 = 1e-3;

/**
    Scales a baseline detection probability by the sensor-to-target heading (degrees).
    Results are not clamped, callers rail them where a probability is needed.
*/
pub trait DetectionModel {
    fn scale(&self, heading: f64) -> f64;
    fn name(&self) -> &'static str;
}

pub struct ModelFactory {}

/// Peaks at both +best_angle and -best_angle, either flank is as good.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BimodalBestAngle {
    pub best_angle: f64, // degrees, > 0
    pub degradation_slope: f64, // per degree, < 0
}

/// Single peak at +best_angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SingleFlankBestAngle {
    pub best_angle: f64,
    pub degradation_slope: f64,
}

/// Aspect does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlatModel;

impl Default for BimodalBestAngle {
    fn default() -> Self {
        BimodalBestAngle {
            best_angle: DEFAULT_BEST_ANGLE,
            degradation_slope: DEFAULT_DEGRADATION_SLOPE,
        }
    }
}

impl ModelFactory {
    pub fn make_bimodal_boxed(best_angle: f64, degradation_slope: f64) -> Box<dyn DetectionModel> {
        Box::new(BimodalBestAngle { best_angle, degradation_slope })
    }
    pub fn make_single_flank_boxed(best_angle: f64, degradation_slope: f64) -> Box<dyn DetectionModel> {
        Box::new(SingleFlankBestAngle { best_angle, degradation_slope })
    }
    pub fn make_flat_boxed() -> Box<dyn DetectionModel> {
        Box::new(FlatModel)
    }
    /**
        @jobj is the model name, unknown names fall back to the bimodal model
    */
    pub fn make_boxed_from_json(jobj: &JsonValue, best_angle: f64, degradation_slope: f64) -> Box<dyn DetectionModel> {
        match jobj.as_str() {
            Some("Bimodal") | None => ModelFactory::make_bimodal_boxed(best_angle, degradation_slope),
            Some("SingleFlank") => ModelFactory::make_single_flank_boxed(best_angle, degradation_slope),
            Some("Flat") => ModelFactory::make_flat_boxed(),
            Some(other) => {
                warn!("unknown detection model {other:?}, using Bimodal");
                ModelFactory::make_bimodal_boxed(best_angle, degradation_slope)
            }
        }
    }
}

impl DetectionModel for BimodalBestAngle {
    fn scale(&self, heading: f64) -> f64 {
        let p1 = self.degradation_slope * abs_delta(heading, self.best_angle) + 1.0;
        let p2 = self.degradation_slope * abs_delta(heading, -self.best_angle) + 1.0;
        f64::max(p1, p2)
    }
    fn name(&self) -> &'static str {
        "Bimodal"
    }
}

impl DetectionModel for SingleFlankBestAngle {
    fn scale(&self, heading: f64) -> f64 {
        self.degradation_slope * abs_delta(heading, self.best_angle) + 1.0
    }
    fn name(&self) -> &'static str {
        "SingleFlank"
    }
}

impl DetectionModel for FlatModel {
    fn scale(&self, _heading: f64) -> f64 {
        1.0
    }
    fn name(&self) -> &'static str {
        "Flat"
    }
}

/**
    bimodal best-angle scaling factor, multiply by 100 for a percentage
*/
pub fn angle_detection_scale(heading: f64, best_angle: f64, slope: f64) -> f64 {
    BimodalBestAngle { best_angle, degradation_slope: slope }.scale(heading)
}

pub fn detection_probability(model: &dyn DetectionModel, base: f64, heading: f64, min_detect: f64) -> f64 {
    ((model.scale(heading) + min_detect) * base).clamp(0.0, 1.0)
}

/**
    chance the sensor reports the wrong type, worst when looking furthest from a best angle
    @worst <= 0 means no data for the pair, the floor is returned then
*/
pub fn misclassification_probability(model: &dyn DetectionModel, worst: f64, heading: f64, min_detect: f64) -> f64 {
    if worst <= 0.0 {
        return MIN_MISCLASSIFY_PROB;
    }
    ((1.0 - model.scale(heading) + min_detect) * worst).clamp(0.0, 1.0)
}

/**
    (heading, percent) samples over [-180, 180) every @step_deg degrees,
    empty when @step_deg is under MIN_SWEEP_STEP or not finite
*/
pub fn sweep(model: &dyn DetectionModel, step_deg: f64) -> Vec<(f64, f64)> {
    if !(step_deg >= MIN_SWEEP_STEP) || !step_deg.is_finite() {
        return vec![];
    }
    let n = (360.0 / step_deg).ceil() as usize;
    (0..n)
        .map(|i| -180.0 + i as f64 * step_deg)
        .filter(|h| *h < 180.0)
        .map(|h| (h, model.scale(h) * 100.0))
        .collect()
}

pub fn sample_detection<R: Rng>(rng: &mut R, p: f64) -> bool {
    rng.random::<f64>() < p
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn factory_names() {
        let b = ModelFactory::make_boxed_from_json(&"SingleFlank".into(), 45.0, -1.0 / 180.0);
        assert_eq!(b.name(), "SingleFlank");
        let b = ModelFactory::make_boxed_from_json(&JsonValue::Null, 45.0, -1.0 / 180.0);
        assert_eq!(b.name(), "Bimodal");
        let b = ModelFactory::make_boxed_from_json(&"Sonar".into(), 45.0, -1.0 / 180.0);
        assert_eq!(b.name(), "Bimodal");
        assert_eq!(ModelFactory::make_boxed_from_json(&"Flat".into(), 45.0, -1.0).scale(123.0), 1.0);
    }

    #[test]
    fn single_flank_has_one_peak() {
        let m = SingleFlankBestAngle { best_angle: 45.0, degradation_slope: -1.0 / 180.0 };
        assert_eq!(m.scale(45.0), 1.0);
        assert_abs_diff_eq!(m.scale(-45.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(m.scale(-135.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn sweep_covers_circle_once() {
        let s = sweep(&BimodalBestAngle::default(), 1.0);
        assert_eq!(s.len(), 360);
        assert_eq!(s[0].0, -180.0);
        assert_eq!(s[359].0, 179.0);
        assert_eq!(s[225], (45.0, 100.0));
        assert!(sweep(&FlatModel, 0.0).is_empty());
        assert!(sweep(&FlatModel, 1e-300).is_empty());
        assert!(sweep(&FlatModel, f64::NAN).is_empty());
        assert_eq!(sweep(&FlatModel, 400.0), vec![(-180.0, 100.0)]);
        assert_eq!(sweep(&FlatModel, 7.0).len(), 52);
    }
}
