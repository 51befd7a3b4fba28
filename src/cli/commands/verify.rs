//! `pkpass verify`: check an archive against its own manifest.
//!
//! This does not validate the CMS signature; it only reports whether every
//! entry is listed with a matching SHA-1 and a signature is present.

use crate::{
    bundler::{error::ErrorExt, verify_archive},
    cli::{RuntimeConfig, VerifyArgs},
    error::Result,
};
use std::fs::File;

/// Returns exit code 0 when the archive is consistent, 1 otherwise.
pub fn verify(args: &VerifyArgs, config: &RuntimeConfig) -> Result<i32> {
    let file = File::open(&args.archive).fs_context("opening archive", &args.archive)?;
    let report = verify_archive(file)?;

    for entry in &report.entries {
        config.verbose_println(entry)?;
    }
    for name in &report.mismatched {
        config.warn(&format!("{name}: hash does not match manifest.json"))?;
    }
    for name in &report.missing {
        config.warn(&format!("{name}: listed in manifest.json but not in the archive"))?;
    }
    for name in &report.unlisted {
        config.warn(&format!("{name}: not listed in manifest.json"))?;
    }
    if report.signature_len == 0 {
        config.warn("signature is empty")?;
    }

    if report.is_valid() {
        config.success(&format!(
            "{}: {} entries match manifest.json",
            args.archive.display(),
            report.entries.len()
        ))?;
        Ok(0)
    } else {
        Ok(1)
    }
}
