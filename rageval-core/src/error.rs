//! Error types for the rageval core library.
//!
//! Only loading and persistence can fail. Scoring, aggregation and rendering
//! resolve every degraded input to a defined default instead of erroring.

use std::path::PathBuf;

/// Top-level error type for the rageval core library.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("Missing case set: {}", path.display())]
    CaseSetMissing { path: PathBuf },

    #[error("Failed to parse case set {}: {message}", path.display())]
    CaseSetParse { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Config file already exists: {}", path.display())]
    ConfigExists { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;
