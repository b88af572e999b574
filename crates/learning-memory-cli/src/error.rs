//! CLI errors and exit codes.
//!
//! Exit codes:
//! - 0: Success (JSON on stdout)
//! - 1: Recoverable error (bad input, rejected value, missing data)
//! - 2: Blocking failure (unreadable or corrupt snapshot/config)

use std::process::ExitCode;

use learning_memory_core::error::{ConfigError, LearningError, StorageError};
use thiserror::Error;

/// Exit codes for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CliExitCode {
    /// Success
    Success = 0,
    /// Recoverable error, does not block
    Warning = 1,
    /// Corrupt or unreadable state; proceeding would be unsafe
    Blocking = 2,
}

impl From<CliExitCode> for ExitCode {
    fn from(code: CliExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<CliExitCode> for i32 {
    fn from(code: CliExitCode) -> Self {
        code as i32
    }
}

/// Errors surfaced by command handlers.
#[derive(Debug, Error)]
pub enum CliError {
    /// Engine error.
    #[error(transparent)]
    Learning(#[from] LearningError),

    /// Input file could not be read.
    #[error("Failed to read '{path}': {message}")]
    Io {
        /// Path, or `-` for stdin
        path: String,
        /// IO failure
        message: String,
    },

    /// A line of import input was rejected.
    #[error("Line {line}: {message}")]
    Input {
        /// 1-based line number
        line: usize,
        /// What is wrong
        message: String,
    },

    /// Arguments are individually valid but do not fit together.
    #[error("{0}")]
    Usage(String),

    /// Output could not be serialized.
    #[error("Failed to render output: {0}")]
    Output(String),
}

impl From<StorageError> for CliError {
    fn from(err: StorageError) -> Self {
        CliError::Learning(err.into())
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::Learning(err.into())
    }
}

impl From<&StorageError> for CliExitCode {
    fn from(err: &StorageError) -> Self {
        match err {
            StorageError::Snapshot { .. } => CliExitCode::Blocking,
            StorageError::Serialization(msg) if is_corruption_indicator(msg) => {
                CliExitCode::Blocking
            }
            StorageError::CollectionNotFound(_)
            | StorageError::CollectionAlreadyExists(_)
            | StorageError::DimensionMismatch { .. }
            | StorageError::Serialization(_)
            | StorageError::Backend(_) => CliExitCode::Warning,
        }
    }
}

impl From<&LearningError> for CliExitCode {
    fn from(err: &LearningError) -> Self {
        match err {
            LearningError::Storage(storage) => CliExitCode::from(storage),
            LearningError::Config(ConfigError::Read { .. } | ConfigError::Parse(_)) => {
                CliExitCode::Blocking
            }
            _ => CliExitCode::Warning,
        }
    }
}

impl From<&CliError> for CliExitCode {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::Learning(e) => CliExitCode::from(e),
            CliError::Io { .. }
            | CliError::Input { .. }
            | CliError::Usage(_)
            | CliError::Output(_) => CliExitCode::Warning,
        }
    }
}

/// Check if an error message indicates corrupt stored data.
#[inline]
pub fn is_corruption_indicator(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    CORRUPTION_INDICATORS
        .iter()
        .any(|&indicator| lower.contains(indicator))
}

/// Corruption indicator strings (lowercase).
const CORRUPTION_INDICATORS: &[&str] = &[
    "corruption",
    "corrupted",
    "malformed",
    "truncated",
    "eof while parsing",
    "missing field",
];
