//! Error type shared by the fatigue pipeline and its input/configuration layers.

use thiserror::Error;

/// Errors raised by the damage pipeline.
///
/// The first three variants are contract violations of the numeric core; the
/// remaining ones come from reading configuration and history files.
#[derive(Debug, Error)]
pub enum FatigueError {
    /// The sample sequence cannot be processed, e.g. it holds fewer than two samples.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The curve selector is neither `DIRECT` nor `SHEAR`.
    #[error("unsupported stress type: {0}")]
    UnsupportedStressType(String),
    /// A stress range or detail category outside the domain of the endurance curve.
    #[error("domain error: {0}")]
    Domain(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FatigueError>;
