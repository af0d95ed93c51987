//! Error types for Dockerfile generation.
//!
//! This module defines [`DockerfileError`], the error type returned by every
//! detection and generation operation, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - A missing convention file is never an error; probes treat it as "no data"
//! - A convention file that exists but cannot be decoded aborts generation
//! - Filesystem errors are propagated unchanged through `DockerfileError::Io`

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for detection and generation.
#[derive(Debug, Error)]
pub enum DockerfileError {
    /// No runtime claimed the project directory.
    #[error(
        "A Dockerfile was not detected in the project and we could not auto-generate one for you. \
         Supported runtimes: {}. Use --runtime to pick one manually.",
        .supported.join(", ")
    )]
    RuntimeNotDetected { supported: Vec<String> },

    /// The caller forced a runtime name that does not exist.
    #[error("Runtime \"{name}\" not found. Expected one of:\n  - {}", .expected.join("\n  - "))]
    UnknownRuntime { name: String, expected: Vec<String> },

    /// A convention file exists but could not be decoded.
    #[error("Failed to decode {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A built-in template is missing or malformed.
    #[error("Failed to render template '{name}': {message}")]
    Template { name: String, message: String },

    /// A template override was not given as KEY=VALUE.
    #[error("Invalid template argument '{raw}', expected KEY=VALUE")]
    InvalidOverride { raw: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DockerfileError {
    /// Build a [`DockerfileError::ConfigParse`] from any displayable decode error.
    pub fn parse(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        DockerfileError::ConfigParse {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for Dockerfile generation.
pub type Result<T> = std::result::Result<T, DockerfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_not_detected_lists_supported_runtimes() {
        let err = DockerfileError::RuntimeNotDetected {
            supported: vec!["Go".into(), "Node".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Go, Node"));
        assert!(msg.contains("--runtime"));
    }

    #[test]
    fn unknown_runtime_displays_name_and_choices() {
        let err = DockerfileError::UnknownRuntime {
            name: "cobol".into(),
            expected: vec!["Go".into(), "Rust".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"cobol\""));
        assert!(msg.contains("  - Go"));
        assert!(msg.contains("  - Rust"));
    }

    #[test]
    fn config_parse_displays_path_and_message() {
        let err = DockerfileError::parse("/app/package.json", "expected value at line 1");
        let msg = err.to_string();
        assert!(msg.contains("/app/package.json"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn template_error_displays_name() {
        let err = DockerfileError::Template {
            name: "node".into(),
            message: "unterminated placeholder".into(),
        };
        assert!(err.to_string().contains("'node'"));
    }

    #[test]
    fn invalid_override_displays_raw_value() {
        let err = DockerfileError::InvalidOverride {
            raw: "BuildMounts".into(),
        };
        assert!(err.to_string().contains("BuildMounts"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DockerfileError = io_err.into();
        assert!(matches!(err, DockerfileError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(DockerfileError::RuntimeNotDetected { supported: vec![] })
        }
        assert!(returns_error().is_err());
    }
}
