//! Command line interface for the pass bundler.
//!
//! This module parses arguments, validates them, and dispatches to the
//! `build`, `render` and `verify` commands.

mod args;
pub mod commands;
mod output;

pub use args::{Args, BuildArgs, Command, RenderArgs, RuntimeConfig, VerifyArgs};
pub use output::OutputManager;

use crate::error::{BundlerError, CliError, Result};

/// Main CLI entry point
pub fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| BundlerError::Cli(CliError::InvalidArguments { reason }))?;

    let config = RuntimeConfig::from(&args);
    match &args.command {
        Command::Build(build) => commands::build(build, &config),
        Command::Render(render) => commands::render(render, &config),
        Command::Verify(verify) => commands::verify(verify, &config),
    }
}
