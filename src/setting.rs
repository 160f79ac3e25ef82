// SPDX-License-Identifier: GPL-3.0-or-later
use crate::detection::{DEFAULT_BEST_ANGLE, DEFAULT_DEGRADATION_SLOPE, DEFAULT_MIN_DETECT_VALUE, DetectionModel, ModelFactory};
use crate::error::{ConfigError, Result};
use crate::sensor::SensorProbs;
use json::{JsonValue, object};
use std::fs;

#[derive(Debug, Clone)]
pub struct SearchSetting {
    pub model: String, // "Bimodal", "SingleFlank" or "Flat"
    pub best_angle: f64, // degrees, (0, 180]
    pub degradation_slope: f64, // per degree, < 0
    pub min_detect_value: f64, // added to the angular scale before applying the base probability
    pub newer_alpha: f64, // weight of newer data when merging beliefs
    pub decay_rate: f64, // cell belief drift towards 0.5, per second
    pub known_world_threshold: f64, // uncertainty under which a cell counts as known
    pub rows: usize,
    pub cols: usize,
    pub n_target_types: usize,
    pub sensor_probs: SensorProbs,
}

impl Default for SearchSetting {
    fn default() -> SearchSetting {
        SearchSetting {
            model: "Bimodal".to_string(),
            best_angle: DEFAULT_BEST_ANGLE,
            degradation_slope: DEFAULT_DEGRADATION_SLOPE,
            min_detect_value: DEFAULT_MIN_DETECT_VALUE,
            newer_alpha: 0.5,
            decay_rate: 0.0,
            known_world_threshold: 0.1,
            rows: 10,
            cols: 10,
            n_target_types: 1,
            sensor_probs: SensorProbs::new(),
        }
    }
}

fn f64_or(jobj: &JsonValue, key: &'static str, default: f64) -> Result<f64> {
    if !jobj.has_key(key) {
        return Ok(default);
    }
    jobj[key].as_f64().ok_or(ConfigError::Key(key))
}

fn usize_or(jobj: &JsonValue, key: &'static str, default: usize) -> Result<usize> {
    if !jobj.has_key(key) {
        return Ok(default);
    }
    jobj[key].as_usize().ok_or(ConfigError::Key(key))
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { key, reason: reason.to_string() }
}

impl SearchSetting {
    pub fn to_json(&self) -> JsonValue {
        object! {
            model: self.model.clone(),
            best_angle: self.best_angle,
            degradation_slope: self.degradation_slope,
            min_detect_value: self.min_detect_value,
            newer_alpha: self.newer_alpha,
            decay_rate: self.decay_rate,
            known_world_threshold: self.known_world_threshold,
            rows: self.rows,
            cols: self.cols,
            n_target_types: self.n_target_types,
            sensor_probs: self.sensor_probs.to_json(),
        }
    }
    /**
        keys missing from @jobj keep their default
    */
    pub fn new(jobj: &JsonValue) -> Result<SearchSetting> {
        let d = SearchSetting::default();
        let model = if jobj.has_key("model") {
            jobj["model"].as_str().ok_or(ConfigError::Key("model"))?.to_string()
        } else {
            d.model
        };
        let ret = SearchSetting {
            model,
            best_angle: f64_or(jobj, "best_angle", d.best_angle)?,
            degradation_slope: f64_or(jobj, "degradation_slope", d.degradation_slope)?,
            min_detect_value: f64_or(jobj, "min_detect_value", d.min_detect_value)?,
            newer_alpha: f64_or(jobj, "newer_alpha", d.newer_alpha)?,
            decay_rate: f64_or(jobj, "decay_rate", d.decay_rate)?,
            known_world_threshold: f64_or(jobj, "known_world_threshold", d.known_world_threshold)?,
            rows: usize_or(jobj, "rows", d.rows)?,
            cols: usize_or(jobj, "cols", d.cols)?,
            n_target_types: usize_or(jobj, "n_target_types", d.n_target_types)?,
            sensor_probs: SensorProbs::from_json(&jobj["sensor_probs"])?,
        };
        ret.validate()?;
        Ok(ret)
    }
    pub fn from_file(filename: &str) -> Result<SearchSetting> {
        let contents = fs::read_to_string(filename)?;
        SearchSetting::new(&json::parse(&contents)?)
    }
    pub fn validate(&self) -> Result<()> {
        if !(self.best_angle > 0.0 && self.best_angle <= 180.0) {
            return Err(invalid("best_angle", "should be in (0, 180]"));
        }
        if !(self.degradation_slope < 0.0) {
            return Err(invalid("degradation_slope", "should be negative"));
        }
        if !(self.min_detect_value >= 0.0) {
            return Err(invalid("min_detect_value", "should be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.newer_alpha) {
            return Err(invalid("newer_alpha", "should be in [0, 1]"));
        }
        if !(self.decay_rate >= 0.0) {
            return Err(invalid("decay_rate", "should be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.known_world_threshold) {
            return Err(invalid("known_world_threshold", "should be in [0, 1]"));
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(invalid("rows", "grid should have at least one cell"));
        }
        if self.n_target_types == 0 {
            return Err(invalid("n_target_types", "should be > 0"));
        }
        Ok(())
    }
    pub fn make_model_boxed(&self) -> Box<dyn DetectionModel> {
        ModelFactory::make_boxed_from_json(&self.model.as_str().into(), self.best_angle, self.degradation_slope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_keys() {
        let s = SearchSetting::new(&json::parse(r#"{"best_angle": 30, "rows": 4}"#).unwrap()).unwrap();
        assert_eq!(s.best_angle, 30.0);
        assert_eq!(s.rows, 4);
        assert_eq!(s.cols, 10);
        assert_eq!(s.model, "Bimodal");
    }

    #[test]
    fn rejects_bad_values() {
        for bad in [
            r#"{"best_angle": 0}"#,
            r#"{"degradation_slope": 0.1}"#,
            r#"{"newer_alpha": 1.5}"#,
            r#"{"cols": 0}"#,
            r#"{"n_target_types": 0}"#,
        ] {
            let jobj = json::parse(bad).unwrap();
            assert!(matches!(SearchSetting::new(&jobj), Err(ConfigError::Invalid { .. })), "{bad}");
        }
        let jobj = json::parse(r#"{"rows": "many"}"#).unwrap();
        assert!(matches!(SearchSetting::new(&jobj), Err(ConfigError::Key("rows"))));
    }

    #[test]
    fn json_round_trip_keeps_model() {
        let s = SearchSetting { model: "Flat".to_string(), ..SearchSetting::default() };
        let back = SearchSetting::new(&s.to_json()).unwrap();
        assert_eq!(back.make_model_boxed().name(), "Flat");
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(SearchSetting::from_file("no/such/setting.json"), Err(ConfigError::Io(_))));
    }
}
