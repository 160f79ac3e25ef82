// SPDX-License-Identifier: GPL-3.0-or-later
use crate::angle::blend_headings;
use crate::belief::{Observation, WorldBelief};
use crate::common::signed_delta;
use crate::detection::{DetectionModel, detection_probability, misclassification_probability, sample_detection};
use crate::sensor::SensorProbs;
use crate::setting::SearchSetting;
use log::{debug, trace};
use rand::Rng;

/// Worst case heading error span (degrees) of any sensor.
const HEADING_ERROR_RANGE: f64 = 90.0;

/// Ground truth target sitting in the scanned cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TruthTarget {
    pub id: usize,
    pub target_type: usize,
    pub heading: f64, // degrees
}

/// What came out of one cell scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanOutcome {
    Empty,
    Detected { id: usize, detected_type: usize },
}

pub struct ScanLogic {
    model: Box<dyn DetectionModel>,
    probs: SensorProbs,
    min_detect: f64,
}

impl ScanLogic {
    pub fn new(model: Box<dyn DetectionModel>, probs: SensorProbs, min_detect: f64) -> ScanLogic {
        ScanLogic { model, probs, min_detect }
    }
    pub fn from_setting(setting: &SearchSetting) -> ScanLogic {
        ScanLogic::new(setting.make_model_boxed(), setting.sensor_probs.clone(), setting.min_detect_value)
    }
    pub fn sensor_probs(&self) -> &SensorProbs {
        &self.probs
    }

    fn prob_detect(&self, sensor: usize, target_type: usize, sensor_hdg: f64, target_hdg: f64) -> f64 {
        let base = self.probs.detection_prob(sensor, target_type).unwrap_or(0.0);
        detection_probability(self.model.as_ref(), base, signed_delta(target_hdg, sensor_hdg), self.min_detect)
    }
    /**
        chance @true_type is reported as @detected
    */
    fn prob_misclassify(&self, sensor: usize, true_type: usize, detected: usize, sensor_hdg: f64, target_hdg: f64) -> f64 {
        let worst = self.probs.misclassify_prob(sensor, true_type, detected).unwrap_or(-1.0);
        misclassification_probability(self.model.as_ref(), worst, signed_delta(target_hdg, sensor_hdg), self.min_detect)
    }
    /// P(scan reports @detected | truth is @true_type)
    fn prob_report(&self, sensor: usize, true_type: usize, detected: usize, sensor_hdg: f64, target_hdg: f64) -> f64 {
        if true_type == detected {
            self.prob_detect(sensor, detected, sensor_hdg, target_hdg)
        } else {
            self.prob_misclassify(sensor, true_type, detected, sensor_hdg, target_hdg)
        }
    }

    // TODO: types are tried in id order, which biases misclassification towards low ids
    fn classify<R: Rng>(&self, rng: &mut R, sensor: usize, n_types: usize, sensor_hdg: f64, est_hdg: f64, true_type: usize) -> usize {
        for other in (0..n_types).filter(|t| *t != true_type) {
            let p = self.prob_misclassify(sensor, true_type, other, sensor_hdg, est_hdg);
            if sample_detection(rng, p) {
                return other;
            }
        }
        true_type
    }

    /**
        one @sensor pointing @sensor_hdg at cell (@row, @col) holding @truth
        updates the target and cell beliefs of @world, returns None for cells outside the grid
    */
    #[allow(clippy::too_many_arguments)]
    pub fn scan_cell<R: Rng>(
        &self,
        rng: &mut R,
        world: &mut WorldBelief,
        sensor: usize,
        sensor_hdg: f64,
        row: usize,
        col: usize,
        truth: &[TruthTarget],
        time: u64,
    ) -> Option<ScanOutcome> {
        world.cell(row, col)?;
        let mut detected = None;
        if let Some(tgt) = truth.first() {
            // never seen targets are assumed to face north
            let est_hdg = world.target_belief(tgt.id).map_or(0.0, |b| b.heading());
            let p = self.prob_detect(sensor, tgt.target_type, sensor_hdg, est_hdg);
            trace!("target {} at ({row}, {col}): P(detect) = {p}", tgt.id);
            if sample_detection(rng, p) {
                detected = Some((*tgt, est_hdg));
            }
        }

        let Some((tgt, est_hdg)) = detected else {
            let prob_miss_targets = if truth.is_empty() {
                0.5
            } else {
                truth
                    .iter()
                    .map(|t| {
                        let est_hdg = world.target_belief(t.id).map_or(0.0, |b| b.heading());
                        1.0 - self.prob_detect(sensor, t.target_type, sensor_hdg, est_hdg)
                    })
                    .product::<f64>()
            };
            let observation = Observation::Empty {
                prob_detect_empty: self.probs.detect_empty_prob(sensor).unwrap_or(0.5),
                prob_miss_targets,
            };
            world.cell_mut(row, col)?.bayes_update(time, observation);
            return Some(ScanOutcome::Empty);
        };

        let n_types = world.target_belief_mut(tgt.id).type_probabilities().len();
        let detected_type = self.classify(rng, sensor, n_types, sensor_hdg, est_hdg, tgt.target_type);
        let prob_scan = self.prob_report(sensor, tgt.target_type, detected_type, sensor_hdg, est_hdg);

        // heading measurement, noisier the further from a best angle
        let coeff = (self.model.scale(signed_delta(est_hdg, sensor_hdg)) + self.min_detect)
            * self.probs.heading_coeff(sensor, detected_type).unwrap_or(0.0);
        let coeff = coeff.clamp(0.0, 1.0);
        let half_range = HEADING_ERROR_RANGE * (1.0 - coeff) / 2.0;
        let error = rng.random_range(-1.0f64..=1.0) * half_range;
        let measured_hdg = tgt.heading + error;

        let belief = world.target_belief_mut(tgt.id);
        let prior: Vec<f64> = belief.type_probabilities().to_vec();
        let numerator = prob_scan * prior.get(detected_type).copied().unwrap_or(0.0);
        let denominator: f64 = prior
            .iter()
            .enumerate()
            .map(|(i, p)| self.prob_report(sensor, i, detected_type, sensor_hdg, est_hdg) * p)
            .sum();
        if denominator > 0.0 {
            belief.set_type_probability(detected_type, numerator / denominator);
        }
        belief.set_heading(blend_headings(est_hdg, measured_hdg, coeff));
        belief.set_timestamp(time);
        debug!(
            "target {} seen as type {detected_type} (P = {prob_scan:.3}), heading {:.1}",
            tgt.id,
            belief.heading()
        );

        world.cell_mut(row, col)?.bayes_update(time, Observation::Target { prob_scan, prob_false_alarm: 0.0 });
        Some(ScanOutcome::Detected { id: tgt.id, detected_type })
    }
}
