//! Error types for the configuration and settings boundary
//!
//! The analytics themselves never fail; insufficient data is expressed as
//! `None`/zero values and asset-level fetch failures travel as
//! [`crate::summary::SignalSummary::Error`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid mode: {0} (expected quiet, normal or aggressive)")]
    InvalidMode(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidConfig { key: String, value: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;
