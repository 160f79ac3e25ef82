// SPDX-License-Identifier: GPL-3.0-or-later
use crate::angle::blend_headings;
use crate::common::{MAX_BAYES_LIMIT, MIN_BAYES_LIMIT, PROB_NORM_ZERO_THRESHOLD, SHANNON_ZERO_THRESHOLD};
use crate::error::BeliefError;
use crate::setting::SearchSetting;
use crate::uncertainty::shannon_uncertainty;
use json::{JsonValue, object};
use log::debug;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BTreeMap;

/**
    moves a pseudo timestamp towards a newer one,
    transitive merges through a third agent then don't oscillate
*/
fn advance_pseudo_time(mine: u64, newer: u64, alpha: f64) -> u64 {
    let diff = mine.abs_diff(newer) as f64;
    mine + ((1.0 - alpha) * diff) as u64
}

#[derive(Debug, Clone, PartialEq)]
pub struct TargetBelief {
    id: usize, // ground truth id, stands in for track correlation
    type_probs: Vec<f64>,
    heading: f64, // degrees
    pseudo_timestamp: u64, // ms
}

impl TargetBelief {
    pub fn new(n_target_types: usize, id: usize) -> TargetBelief {
        let mut belief = TargetBelief {
            id,
            type_probs: vec![0.0; n_target_types],
            heading: 0.0,
            pseudo_timestamp: 0,
        };
        belief.reset();
        belief
    }
    pub fn reset(&mut self) {
        self.pseudo_timestamp = 0;
        self.heading = 0.0;
        let equal = 1.0 / self.type_probs.len() as f64;
        self.type_probs.iter_mut().for_each(|p| *p = equal);
    }
    pub fn id(&self) -> usize {
        self.id
    }
    pub fn type_probability(&self, target_type: usize) -> Option<f64> {
        self.type_probs.get(target_type).copied()
    }
    pub fn type_probabilities(&self) -> &[f64] {
        &self.type_probs
    }
    /**
        sets one type then renormalizes so all types sum to 1,
        unless the total is too small to divide by
    */
    pub fn set_type_probability(&mut self, target_type: usize, prob: f64) {
        let Some(slot) = self.type_probs.get_mut(target_type) else {
            return;
        };
        *slot = prob;
        let total: f64 = self.type_probs.iter().sum();
        if total > PROB_NORM_ZERO_THRESHOLD {
            self.type_probs.iter_mut().for_each(|p| *p /= total);
        }
    }
    /// Most likely type and its probability, ties go to the lowest type id.
    pub fn likely_type(&self) -> Option<(usize, f64)> {
        self.type_probs
            .iter()
            .copied()
            .enumerate()
            .rev()
            .max_by_key(|(_, p)| OrderedFloat(*p))
    }
    pub fn heading(&self) -> f64 {
        self.heading
    }
    pub fn set_heading(&mut self, heading: f64) {
        self.heading = heading;
    }
    pub fn pseudo_timestamp(&self) -> u64 {
        self.pseudo_timestamp
    }
    pub fn set_timestamp(&mut self, time: u64) {
        self.pseudo_timestamp = time;
    }
    /**
        alpha filter towards @other, ignored if @other is older or a different target
    */
    pub fn merge(&mut self, other: &TargetBelief, alpha: f64) {
        if other.pseudo_timestamp < self.pseudo_timestamp || other.id != self.id {
            return;
        }
        self.heading = blend_headings(self.heading, other.heading, alpha);
        for (mine, theirs) in self.type_probs.iter_mut().zip(other.type_probs.iter()) {
            *mine = alpha * theirs + (1.0 - alpha) * *mine;
        }
        self.pseudo_timestamp = advance_pseudo_time(self.pseudo_timestamp, other.pseudo_timestamp, alpha);
    }
}

/// What a sensor reported for a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Observation {
    Empty {
        prob_detect_empty: f64,
        prob_miss_targets: f64, // chance every target actually present was missed
    },
    Target {
        prob_scan: f64,
        prob_false_alarm: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellBelief {
    row: usize,
    col: usize,
    prob_empty: f64,
    pseudo_timestamp: u64, // ms, approximated when merged
    decay_rate: f64, // drift towards 0.5 per second
}

impl CellBelief {
    pub fn new(row: usize, col: usize, decay_rate: f64) -> CellBelief {
        CellBelief {
            row,
            col,
            prob_empty: 0.5,
            pseudo_timestamp: 0,
            decay_rate,
        }
    }
    pub fn reset(&mut self) {
        self.prob_empty = 0.5;
        self.pseudo_timestamp = 0;
    }
    pub fn coordinate(&self) -> (usize, usize) {
        (self.row, self.col)
    }
    pub fn prob_empty(&self) -> f64 {
        self.prob_empty
    }
    pub fn prob_not_empty(&self) -> f64 {
        1.0 - self.prob_empty
    }
    pub fn pseudo_timestamp(&self) -> u64 {
        self.pseudo_timestamp
    }
    /**
        Shannon uncertainty of the cell holding a target, 0 when nearly certain
    */
    pub fn uncertainty(&self) -> f64 {
        let p = self.prob_empty;
        if p <= SHANNON_ZERO_THRESHOLD || p >= 1.0 - SHANNON_ZERO_THRESHOLD {
            return 0.0;
        }
        shannon_uncertainty(p).unwrap_or(0.0)
    }
    pub fn update_empty(&mut self, time: u64, prob_empty: f64) {
        self.pseudo_timestamp = time;
        self.prob_empty = prob_empty;
    }
    /**
        only strictly newer data is merged in
    */
    pub fn merge(&mut self, other: &CellBelief, alpha: f64) {
        if other.pseudo_timestamp <= self.pseudo_timestamp {
            return;
        }
        self.prob_empty = alpha * other.prob_empty + (1.0 - alpha) * self.prob_empty;
        self.pseudo_timestamp = advance_pseudo_time(self.pseudo_timestamp, other.pseudo_timestamp, alpha);
    }
    /**
        drifts towards 0.5, a negative or NaN step budget leaves the cell alone
    */
    pub fn step(&mut self, dt_secs: f64) {
        let max_move = (self.decay_rate * dt_secs).max(0.0);
        let gap = 0.5 - self.prob_empty;
        self.prob_empty += gap.clamp(-max_move, max_move);
    }
    pub fn bayes_update(&mut self, time: u64, observation: Observation) {
        let prev_empty = self.prob_empty;
        let prev_not_empty = 1.0 - prev_empty;
        let (numerator, denominator) = match observation {
            Observation::Empty { prob_detect_empty, prob_miss_targets } => (
                prob_detect_empty * prev_empty,
                prob_detect_empty * prev_empty + prob_miss_targets * prev_not_empty,
            ),
            Observation::Target { prob_scan, prob_false_alarm } => (
                prob_scan * prev_not_empty,
                prob_scan * prev_not_empty + prob_false_alarm * prev_empty,
            ),
        };
        if !(denominator > 0.0) {
            debug!("cell ({}, {}): degenerate update {observation:?}, skipped", self.row, self.col);
            return;
        }
        let bayes = (numerator / denominator).clamp(MIN_BAYES_LIMIT, MAX_BAYES_LIMIT);
        let prob_empty = match observation {
            Observation::Empty { .. } => bayes,
            Observation::Target { .. } => 1.0 - bayes,
        };
        self.update_empty(time, prob_empty);
    }
    pub fn to_json(&self) -> JsonValue {
        object! {
            row: self.row,
            col: self.col,
            prob_empty: self.prob_empty,
            uncertainty: self.uncertainty(),
            ts: self.pseudo_timestamp,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WorldBelief {
    rows: usize,
    cols: usize,
    cells: Vec<CellBelief>, // row major
    targets: Vec<TargetBelief>,
    n_target_types: usize,
    newer_alpha: f64,
    known_threshold: f64,
    first_clear_time: Option<u64>,
}

impl WorldBelief {
    pub fn new(rows: usize, cols: usize, n_target_types: usize, decay_rate: f64) -> WorldBelief {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(CellBelief::new(row, col, decay_rate));
            }
        }
        WorldBelief {
            rows,
            cols,
            cells,
            targets: vec![],
            n_target_types,
            newer_alpha: 0.5,
            known_threshold: 0.0,
            first_clear_time: None,
        }
    }
    pub fn from_setting(setting: &SearchSetting) -> WorldBelief {
        WorldBelief {
            newer_alpha: setting.newer_alpha,
            known_threshold: setting.known_world_threshold,
            ..WorldBelief::new(setting.rows, setting.cols, setting.n_target_types, setting.decay_rate)
        }
    }
    pub fn rows(&self) -> usize {
        self.rows
    }
    pub fn cols(&self) -> usize {
        self.cols
    }
    pub fn cell(&self, row: usize, col: usize) -> Option<&CellBelief> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get(row * self.cols + col)
    }
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut CellBelief> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells.get_mut(row * self.cols + col)
    }
    pub fn cells(&self) -> impl Iterator<Item = &CellBelief> {
        self.cells.iter()
    }

    pub fn target_belief(&self, id: usize) -> Option<&TargetBelief> {
        self.targets.iter().find(|t| t.id == id)
    }
    /**
        creates a uniform belief the first time @id is seen
    */
    pub fn target_belief_mut(&mut self, id: usize) -> &mut TargetBelief {
        let idx = match self.targets.iter().position(|t| t.id == id) {
            Some(idx) => idx,
            None => {
                self.targets.push(TargetBelief::new(self.n_target_types, id));
                self.targets.len() - 1
            }
        };
        &mut self.targets[idx]
    }
    pub fn target_beliefs(&self) -> &[TargetBelief] {
        &self.targets
    }
    pub fn has_detected_target(&self, id: usize) -> bool {
        self.targets.iter().any(|t| t.id == id)
    }
    pub fn remove_target(&mut self, id: usize) {
        self.targets.retain(|t| t.id != id);
    }

    pub fn merge(&mut self, other: &WorldBelief) -> Result<(), BeliefError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(BeliefError::Shape(self.rows, self.cols, other.rows, other.cols));
        }
        let alpha = self.newer_alpha;
        for (mine, theirs) in self.cells.iter_mut().zip(other.cells.iter()) {
            mine.merge(theirs, alpha);
        }
        for theirs in &other.targets {
            match self.targets.iter_mut().find(|t| t.id == theirs.id) {
                Some(mine) => mine.merge(theirs, alpha),
                None => {
                    debug!("adopting belief of target {}", theirs.id);
                    self.targets.push(theirs.clone());
                }
            }
        }
        Ok(())
    }
    pub fn step(&mut self, dt_secs: f64) {
        self.cells.iter_mut().for_each(|c| c.step(dt_secs));
    }
    /**
        latches true the first time every cell is at or under the known threshold
    */
    pub fn believes_all_known(&mut self, time: u64) -> bool {
        if self.first_clear_time.is_none() && self.cells.iter().all(|c| c.uncertainty() <= self.known_threshold) {
            debug!("world believed known at t={time}");
            self.first_clear_time = Some(time);
        }
        self.first_clear_time.is_some()
    }
    pub fn first_clear_time(&self) -> Option<u64> {
        self.first_clear_time
    }
    /**
        the @n most uncertain cells as ((row, col), uncertainty), ties in row major order
    */
    pub fn most_uncertain(&self, n: usize) -> Vec<((usize, usize), f64)> {
        let mut ranked = BTreeMap::<(Reverse<OrderedFloat<f64>>, usize), &CellBelief>::new();
        for (i, cell) in self.cells.iter().enumerate() {
            ranked.insert((Reverse(OrderedFloat(cell.uncertainty())), i), cell);
        }
        ranked
            .into_iter()
            .take(n)
            .map(|((Reverse(u), _), cell)| (cell.coordinate(), u.into_inner()))
            .collect()
    }
    pub fn mean_uncertainty(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        self.cells.iter().map(CellBelief::uncertainty).sum::<f64>() / self.cells.len() as f64
    }
    pub fn to_json(&self) -> JsonValue {
        let mut grid = JsonValue::new_array();
        for row in self.cells.chunks(self.cols.max(1)) {
            let row: Vec<f64> = row.iter().map(CellBelief::uncertainty).collect();
            // push only fails on non-arrays
            let _ = grid.push(row);
        }
        object! {
            rows: self.rows,
            cols: self.cols,
            uncertainty: grid,
            n_targets: self.targets.len(),
        }
    }
}
