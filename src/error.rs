//! Top-level error types for the `pkpass` binary and definition loading.
//!
//! Pipeline failures live in [`crate::bundler::Error`]; this module wraps them
//! together with CLI and configuration errors.

use thiserror::Error;

/// Result type alias for CLI-level operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all CLI-level operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Missing required argument
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as PassError;

        match self {
            BundlerError::Bundler(PassError::Signing { .. }) => vec![
                "Check that the certificate, key and WWDR certificate belong together".to_string(),
                "Check the key passphrase (PKPASS_KEY_PASSPHRASE)".to_string(),
            ],
            BundlerError::Bundler(PassError::SigningTimeout { .. }) => {
                vec!["Raise --sign-timeout-secs or check that openssl is not prompting".to_string()]
            }
            BundlerError::Bundler(PassError::CommandFailed { .. }) => {
                vec!["Install openssl or pass --openssl <path>".to_string()]
            }
            BundlerError::Toml(_) => {
                vec!["Check the pass definition file against the documented keys".to_string()]
            }
            BundlerError::Bundler(e) if e.is_validation() => {
                vec!["Fix the pass content; nothing was signed or written".to_string()]
            }
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
