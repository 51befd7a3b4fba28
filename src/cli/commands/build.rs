//! `pkpass build`: definition + assets + credentials to a signed archive.

use crate::{
    bundler::{
        CertSource, OpensslSigner, PassBundler, SigningCredentials,
        builder::{signing::check_credential_paths, tool_detection::openssl_available},
        utils::fs::list_asset_files,
    },
    cli::{BuildArgs, RuntimeConfig},
    error::{BundlerError, CliError, Result},
    metadata::PassDefinition,
};
use anyhow::Context;
use std::time::Duration;

/// Builds and signs the pass described by `args`. Returns the exit code.
pub fn build(args: &BuildArgs, config: &RuntimeConfig) -> Result<i32> {
    let credentials = signing_credentials(args)?;
    check_credential_paths(&credentials)?;

    config.progress(&format!("Loading {}", args.definition.display()))?;
    let document = PassDefinition::load(&args.definition)?.into_document()?;
    config.verbose_println(&format!(
        "{} pass, serial {}",
        document.style().kind().json_key(),
        document.serial_number()
    ))?;

    let mut bundler = PassBundler::new(document);
    if let Some(dir) = &args.assets {
        for (name, path) in list_asset_files(dir)? {
            config.verbose_println(&format!("asset {name}"))?;
            bundler.add_file_from_path(name, &path)?;
        }
    }
    for asset in &args.extra_assets {
        let (name, path) = asset
            .split_once('=')
            .ok_or_else(|| BundlerError::Cli(CliError::InvalidArguments {
                reason: format!("Invalid --asset '{asset}': expected NAME=PATH"),
            }))?;
        config.verbose_println(&format!("asset {name} from {path}"))?;
        bundler
            .add_file_from_path(name, path)
            .with_context(|| format!("adding --asset {asset}"))?;
    }
    if bundler.files().is_empty() {
        config.warn("No assets given; Wallet rejects passes without icon.png")?;
    }

    let mut signer = OpensslSigner::new(credentials)
        .with_timeout(Duration::from_secs(args.sign_timeout_secs));
    match &args.openssl {
        Some(program) => signer = signer.with_program(program),
        None if !openssl_available() => {
            config.warn("openssl was not found on PATH; signing will fail")?;
        }
        None => {}
    }

    config.progress("Signing manifest")?;
    let path = bundler.create_to_path(&signer, &args.output)?;
    config.success(&format!("Wrote {}", path.display()))?;
    config.indent(&format!("serial number: {}", bundler.document().serial_number()))?;
    for file in bundler.files() {
        config.indent(&format!("{} ({} bytes)", file.name(), file.data().len()))?;
    }
    Ok(0)
}

/// Resolves the three credentials and the optional passphrase.
///
/// Each value may be a path, inline PEM, or base64-encoded PEM.
pub fn signing_credentials(args: &BuildArgs) -> Result<SigningCredentials> {
    let required = |value: &Option<String>, argument: &str| {
        value
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(CertSource::from_value)
            .ok_or_else(|| {
                BundlerError::Cli(CliError::MissingArgument {
                    argument: argument.to_string(),
                })
            })
    };

    Ok(SigningCredentials {
        certificate: required(&args.certificate, "--certificate (PKPASS_CERTIFICATE)")?,
        key: required(&args.key, "--key (PKPASS_KEY)")?,
        wwdr_certificate: required(&args.wwdr, "--wwdr (PKPASS_WWDR_CERTIFICATE)")?,
        passphrase: args.passphrase.clone().filter(|p| !p.is_empty()),
    })
}
