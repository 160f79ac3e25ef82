// SPDX-License-Identifier: GPL-3.0-or-later
use thiserror::Error;

/// Shannon uncertainty is only defined strictly inside (0, 1).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum UncertaintyError {
    #[error("probability {0} is outside the open interval (0, 1)")]
    OutOfRange(f64),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] json::Error),

    #[error("missing or malformed key `{0}`")]
    Key(&'static str),

    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeliefError {
    #[error("belief grid shape mismatch: {0}x{1} vs {2}x{3}")]
    Shape(usize, usize, usize, usize),
}
