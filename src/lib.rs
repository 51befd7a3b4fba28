//! Apple Wallet pass bundler
//!
//! This library builds signed `.pkpass` archives:
//! - a typed pass model serialized to canonical `pass.json`
//! - a SHA-1 `manifest.json` over every bundled file
//! - a detached PKCS#7 signature produced by `openssl smime`
//! - the final ZIP archive, plus a consistency check for existing archives
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
