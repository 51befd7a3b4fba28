//! Error types for pass bundling operations.
//!
//! Every stage of the pipeline (model validation, manifest hashing, signing,
//! packaging) reports failures through [`Error`]. Nothing is retried and no
//! stage swallows an error from the one before it.

use std::{path::PathBuf, time::Duration};
use thiserror::Error;

/// Result type alias for bundling operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while building, signing or packaging a pass.
#[derive(Error, Debug)]
pub enum Error {
    /// A required pass-level or field-level value is absent or empty.
    #[error("missing required field: {field}")]
    MissingRequiredField {
        /// JSON key of the missing value
        field: String,
    },

    /// A structural constraint of the pass format is violated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Plain I/O failure (e.g. an asset reader returned an error).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// I/O failure tied to a specific path.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being done when the failure happened
        context: &'static str,
        /// Path involved
        path: PathBuf,
        /// Underlying error
        error: std::io::Error,
    },

    /// The signer program could not be started at all.
    #[error("failed to run `{command}`: {error}")]
    CommandFailed {
        /// Program that failed to start
        command: String,
        /// Underlying error
        error: std::io::Error,
    },

    /// The signer ran and exited unsuccessfully.
    #[error("signing failed (exit code {code:?}): {diagnostic}")]
    Signing {
        /// Exit code, if the process exited normally
        code: Option<i32>,
        /// Diagnostic output of the signer, verbatim
        diagnostic: String,
    },

    /// The signer did not finish within the configured bound.
    #[error("signer did not finish within {timeout:?}")]
    SigningTimeout {
        /// The bound that was exceeded
        timeout: Duration,
    },

    /// JSON encoding/decoding failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive failure.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Shorthand for [`Error::MissingRequiredField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Error::MissingRequiredField {
            field: field.into(),
        }
    }

    /// Returns true for errors caused by the pass content rather than the
    /// environment (bad input that no retry can fix).
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingRequiredField { .. } | Error::Validation(_)
        )
    }
}

/// Extension for attaching path context to I/O results.
pub trait ErrorExt<T> {
    /// Converts an I/O error into [`Error::Fs`] naming the action and path.
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Returns early with an [`Error::Validation`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::Validation(format!($($arg)*)))
    };
}
