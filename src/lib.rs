// SPDX-License-Identifier: GPL-3.0-or-later
pub mod angle;
pub mod belief;
pub mod common;
pub mod detection;
pub mod error;
pub mod scan;
pub mod sensor;
pub mod setting;
pub mod uncertainty;

pub use angle::{Angle, blend_headings};
pub use belief::{CellBelief, Observation, TargetBelief, WorldBelief};
pub use common::{abs_delta, normalize_360, normalize_signed, signed_delta};
pub use detection::{
    BimodalBestAngle, DetectionModel, FlatModel, MIN_SWEEP_STEP, ModelFactory, SingleFlankBestAngle, angle_detection_scale,
    detection_probability, misclassification_probability, sample_detection, sweep,
};
pub use error::{BeliefError, ConfigError, UncertaintyError};
pub use scan::{ScanLogic, ScanOutcome, TruthTarget};
pub use sensor::SensorProbs;
pub use setting::SearchSetting;
pub use uncertainty::{Probability, clamp_probability, shannon_curve, shannon_uncertainty};

use json::{JsonValue, object};

fn points_json(points: &[(f64, f64)], x: &str, y: &str) -> JsonValue {
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let mut jobj = JsonValue::new_object();
    jobj[x] = xs.into();
    jobj[y] = ys.into();
    jobj
}

/**
    detection scaling percentages around the circle for the model in @setting
*/
pub fn angle_sweep_json(setting: &SearchSetting, step_deg: f64) -> JsonValue {
    let model = setting.make_model_boxed();
    let mut jobj = points_json(&sweep(model.as_ref(), step_deg), "heading", "percent");
    jobj["model"] = model.name().into();
    jobj["best_angle"] = setting.best_angle.into();
    jobj["degradation_slope"] = setting.degradation_slope.into();
    jobj
}

pub fn shannon_curve_json(num_pts: usize) -> JsonValue {
    let mut jobj = points_json(&shannon_curve(num_pts), "prob_empty", "uncertainty");
    jobj["meta"] = object! {
        base: 2,
        num_pts: num_pts,
    };
    jobj
}
