//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation
//! and environment fallbacks for signing credentials.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Apple Wallet pass bundler
#[derive(Parser, Debug)]
#[command(
    name = "pkpass",
    version,
    about = "Builds signed Apple Wallet passes (.pkpass)",
    long_about = "Builds signed Apple Wallet passes (.pkpass) from TOML pass definitions.

The pass definition is serialized to pass.json, every file is hashed into
manifest.json, the manifest is signed with `openssl smime`, and everything is
packed into a .pkpass archive.

Usage:
  pkpass build --definition member.toml --assets assets/ --output member.pkpass
  pkpass render --definition member.toml
  pkpass verify member.pkpass

Credentials may be given as paths, inline PEM, or base64-encoded PEM, either
as flags or through PKPASS_CERTIFICATE, PKPASS_KEY, PKPASS_WWDR_CERTIFICATE
and PKPASS_KEY_PASSPHRASE."
)]
pub struct Args {
    /// Print progress details
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and sign a .pkpass archive
    Build(BuildArgs),
    /// Print the canonical pass.json of a definition
    Render(RenderArgs),
    /// Check an archive's files against its manifest
    Verify(VerifyArgs),
}

/// Arguments of `pkpass build`
#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Pass definition file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub definition: PathBuf,

    /// Directory whose top-level files are bundled as assets
    #[arg(short, long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Additional asset, added after the directory contents (repeatable)
    #[arg(long = "asset", value_name = "NAME=PATH")]
    pub extra_assets: Vec<String>,

    /// Pass type certificate (path, PEM or base64 PEM)
    #[arg(long, env = "PKPASS_CERTIFICATE", hide_env_values = true)]
    pub certificate: Option<String>,

    /// Private key of the pass type certificate
    #[arg(long, env = "PKPASS_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Apple WWDR intermediate certificate
    #[arg(long, env = "PKPASS_WWDR_CERTIFICATE", hide_env_values = true)]
    pub wwdr: Option<String>,

    /// Passphrase of the private key
    #[arg(long, env = "PKPASS_KEY_PASSPHRASE", hide_env_values = true)]
    pub passphrase: Option<String>,

    /// openssl binary to sign with (default: found on PATH)
    #[arg(long, value_name = "PATH")]
    pub openssl: Option<PathBuf>,

    /// Seconds the signer may run before it is killed
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    pub sign_timeout_secs: u64,

    /// Where to write the archive
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments of `pkpass render`
#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Pass definition file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub definition: PathBuf,
}

/// Arguments of `pkpass verify`
#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// Archive to check
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Build(build) = &self.command {
            if build.sign_timeout_secs == 0 {
                return Err("--sign-timeout-secs must be at least 1".to_string());
            }
            for asset in &build.extra_assets {
                match asset.split_once('=') {
                    Some((name, path)) if !name.is_empty() && !path.is_empty() => {}
                    _ => return Err(format!("Invalid --asset '{asset}': expected NAME=PATH")),
                }
            }
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message if not in quiet mode
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message if not in quiet mode
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print progress message
    pub fn progress(&self, message: &str) -> std::io::Result<()> {
        self.output.progress(message)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}
