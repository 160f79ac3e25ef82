// SPDX-License-Identifier: GPL-3.0-or-later
use crate::error::{ConfigError, Result};
use json::{JsonValue, object};
use std::collections::HashMap;

/// Per sensor type / target type probability tables.
#[derive(Debug, Default, Clone)]
pub struct SensorProbs {
    detect: HashMap<(usize, usize), f64>, // (sensor, target)
    identify: HashMap<(usize, usize), f64>,
    misclassify: HashMap<(usize, usize, usize), f64>, // (sensor, true target, detected as)
    heading_coeff: HashMap<(usize, usize), f64>,
    detect_empty: HashMap<usize, f64>, // sensor
}

fn entry_json(sensor: usize, target: usize, prob: f64) -> JsonValue {
    object! {
        sensor: sensor,
        target: target,
        prob: prob,
    }
}

fn usize_key(jobj: &JsonValue, key: &'static str) -> Result<usize> {
    jobj[key].as_usize().ok_or(ConfigError::Key(key))
}

fn prob_key(jobj: &JsonValue, key: &'static str) -> Result<f64> {
    let p = jobj[key].as_f64().ok_or(ConfigError::Key(key))?;
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::Invalid { key, reason: format!("{p} is not a probability") });
    }
    Ok(p)
}

impl SensorProbs {
    pub fn new() -> SensorProbs {
        SensorProbs::default()
    }
    pub fn reset(&mut self) {
        *self = SensorProbs::default();
    }
    pub fn set_detection_prob(&mut self, sensor: usize, target: usize, prob: f64) {
        self.detect.insert((sensor, target), prob);
    }
    pub fn detection_prob(&self, sensor: usize, target: usize) -> Option<f64> {
        self.detect.get(&(sensor, target)).copied()
    }
    pub fn set_identification_prob(&mut self, sensor: usize, target: usize, prob: f64) {
        self.identify.insert((sensor, target), prob);
    }
    pub fn identification_prob(&self, sensor: usize, target: usize) -> Option<f64> {
        self.identify.get(&(sensor, target)).copied()
    }
    pub fn set_misclassify_prob(&mut self, sensor: usize, true_target: usize, detected: usize, prob: f64) {
        self.misclassify.insert((sensor, true_target, detected), prob);
    }
    pub fn misclassify_prob(&self, sensor: usize, true_target: usize, detected: usize) -> Option<f64> {
        self.misclassify.get(&(sensor, true_target, detected)).copied()
    }
    pub fn set_heading_coeff(&mut self, sensor: usize, target: usize, coeff: f64) {
        self.heading_coeff.insert((sensor, target), coeff);
    }
    pub fn heading_coeff(&self, sensor: usize, target: usize) -> Option<f64> {
        self.heading_coeff.get(&(sensor, target)).copied()
    }
    pub fn set_detect_empty_prob(&mut self, sensor: usize, prob: f64) {
        self.detect_empty.insert(sensor, prob);
    }
    pub fn detect_empty_prob(&self, sensor: usize) -> Option<f64> {
        self.detect_empty.get(&sensor).copied()
    }

    pub fn to_json(&self) -> JsonValue {
        let pairs = |m: &HashMap<(usize, usize), f64>| {
            let mut v: Vec<_> = m.iter().collect();
            v.sort_by_key(|(k, _)| **k);
            JsonValue::Array(v.into_iter().map(|(&(s, t), &p)| entry_json(s, t, p)).collect())
        };
        let mut misclassify: Vec<_> = self.misclassify.iter().collect();
        misclassify.sort_by_key(|(k, _)| **k);
        let mut detect_empty: Vec<_> = self.detect_empty.iter().collect();
        detect_empty.sort_by_key(|(k, _)| **k);
        object! {
            detect: pairs(&self.detect),
            identify: pairs(&self.identify),
            heading_coeff: pairs(&self.heading_coeff),
            misclassify: JsonValue::Array(misclassify.into_iter().map(|(&(s, t, d), &p)| object! {
                sensor: s,
                target: t,
                detected: d,
                prob: p,
            }).collect()),
            detect_empty: JsonValue::Array(detect_empty.into_iter().map(|(&s, &p)| object! {
                sensor: s,
                prob: p,
            }).collect()),
        }
    }

    /**
        every table is optional, entries missing a key or holding a value outside [0, 1] are errors
    */
    pub fn from_json(jobj: &JsonValue) -> Result<SensorProbs> {
        let mut probs = SensorProbs::new();
        for it in jobj["detect"].members() {
            probs.set_detection_prob(usize_key(it, "sensor")?, usize_key(it, "target")?, prob_key(it, "prob")?);
        }
        for it in jobj["identify"].members() {
            probs.set_identification_prob(usize_key(it, "sensor")?, usize_key(it, "target")?, prob_key(it, "prob")?);
        }
        for it in jobj["heading_coeff"].members() {
            probs.set_heading_coeff(usize_key(it, "sensor")?, usize_key(it, "target")?, prob_key(it, "prob")?);
        }
        for it in jobj["misclassify"].members() {
            probs.set_misclassify_prob(
                usize_key(it, "sensor")?,
                usize_key(it, "target")?,
                usize_key(it, "detected")?,
                prob_key(it, "prob")?,
            );
        }
        for it in jobj["detect_empty"].members() {
            probs.set_detect_empty_prob(usize_key(it, "sensor")?, prob_key(it, "prob")?);
        }
        Ok(probs)
    }
}
