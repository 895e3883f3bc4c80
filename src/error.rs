//! Error types shared across the crate.
//!
//! The pipeline fails fast and atomically: no partial series is ever
//! surfaced alongside an error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed input series or configuration (e.g. zero volumes,
    /// non-positive repetition time, low-pass at or below high-pass).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A numeric parameter is outside its documented valid range.
    #[error("unsupported parameter `{name}` = {value}: {reason}")]
    UnsupportedParameter {
        name: &'static str,
        value: f64,
        reason: String,
    },

    /// Dataset path does not exist.
    #[error("data not found: {0}")]
    DataNotFound(PathBuf),

    /// Dataset exists but cannot be parsed as a volumetric container.
    #[error("format error: {0}")]
    Format(String),

    /// An optional collaborator (visualization backend, neuron simulator)
    /// was not supplied. The orchestrator skips the stage and continues.
    #[error("optional dependency `{0}` is unavailable")]
    MissingOptionalDependency(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn unsupported(name: &'static str, value: f64, reason: impl Into<String>) -> Self {
        Self::UnsupportedParameter {
            name,
            value,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_parameter() {
        let e = PipelineError::unsupported("fwhm", -1.0, "must be non-negative");
        let msg = e.to_string();
        assert!(msg.contains("fwhm"), "message was: {msg}");
        assert!(msg.contains("-1"), "message was: {msg}");
    }

    #[test]
    fn missing_dependency_names_the_collaborator() {
        let e = PipelineError::MissingOptionalDependency("neuron simulator");
        assert!(e.to_string().contains("neuron simulator"));
    }
}
