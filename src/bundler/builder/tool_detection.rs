//! External tool detection and availability checking.
//!
//! Signing shells out to `openssl smime`; this module locates the binary once
//! per process.

use std::{path::PathBuf, sync::LazyLock};

/// Location of the `openssl` binary, if one is on `PATH` and runs.
///
/// Cached result to avoid repeated subprocess calls.
pub static OPENSSL: LazyLock<Option<PathBuf>> = LazyLock::new(|| match which::which("openssl") {
    Ok(path) => {
        log::debug!("Found openssl at: {}", path.display());

        match std::process::Command::new(&path).arg("version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                log::debug!("openssl available: {}", version.trim());
                Some(path)
            }
            Ok(output) => {
                log::warn!(
                    "openssl found at {} but `openssl version` failed (exit code: {:?}). \
                         Stderr: {}",
                    path.display(),
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr)
                );
                None
            }
            Err(e) => {
                log::warn!(
                    "openssl found at {} but failed to execute: {}. Check file permissions.",
                    path.display(),
                    e
                );
                None
            }
        }
    }
    Err(e) => {
        log::debug!("openssl not found in PATH: {}", e);
        None
    }
});

/// True when a working `openssl` binary was found.
pub fn openssl_available() -> bool {
    OPENSSL.is_some()
}

/// Program used by the default signer: the detected binary, or plain
/// `openssl` so that spawn errors name the missing tool.
pub(crate) fn default_openssl_program() -> PathBuf {
    OPENSSL.clone().unwrap_or_else(|| PathBuf::from("openssl"))
}
