//! Error types for the MCP database launcher.
//!
//! This module defines all error types using `thiserror`. Variants that an operator
//! can act on carry the remediation text directly in their message.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },

    #[error("Unsupported architecture: {arch}")]
    UnsupportedArchitecture { arch: String },

    /// The message is the full multi-paragraph installation guide.
    #[error("{message}")]
    BinaryNotFound { message: String },

    #[error("Binary verification failed with {}{}", exit_label(.exit_code), stderr_suffix(.stderr))]
    VerificationFailed {
        /// `None` when the process was terminated by a signal
        exit_code: Option<i32>,
        stderr: Option<String>,
    },

    #[error("Failed to execute binary: {message}")]
    SpawnFailed { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Config file does not exist: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Engine failed to start: {message}")]
    EngineStartup { message: String, suggestion: String },

    #[error("Engine exited with {}", exit_label(.exit_code))]
    EngineExited { exit_code: Option<i32> },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr.as_deref() {
        Some(text) if !text.is_empty() => format!("\nError: {}", text),
        _ => String::new(),
    }
}

impl LauncherError {
    /// Create an unsupported platform error.
    pub fn unsupported_platform(os: impl Into<String>) -> Self {
        Self::UnsupportedPlatform { os: os.into() }
    }

    /// Create an unsupported architecture error.
    pub fn unsupported_architecture(arch: impl Into<String>) -> Self {
        Self::UnsupportedArchitecture { arch: arch.into() }
    }

    /// Create a binary not found error carrying installation instructions.
    pub fn binary_not_found(message: impl Into<String>) -> Self {
        Self::BinaryNotFound {
            message: message.into(),
        }
    }

    /// Create a verification error from a non-zero exit.
    pub fn verification_failed(exit_code: Option<i32>, stderr: Option<String>) -> Self {
        Self::VerificationFailed { exit_code, stderr }
    }

    /// Create a spawn failure error.
    pub fn spawn_failed(message: impl Into<String>) -> Self {
        Self::SpawnFailed {
            message: message.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a config not found error.
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an engine startup error with a helpful suggestion.
    pub fn engine_startup(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::EngineStartup {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an engine exit error.
    pub fn engine_exited(exit_code: Option<i32>) -> Self {
        Self::EngineExited { exit_code }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::EngineStartup { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Whether this error must stop the launcher.
    ///
    /// Verification errors are advisory: a binary whose `--version` fails may still
    /// serve requests.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::VerificationFailed { .. } | Self::SpawnFailed { .. }
        )
    }
}

/// Result type alias for launcher operations.
pub type LauncherResult<T> = Result<T, LauncherError>;
