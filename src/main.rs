//! pkpass - builds signed Apple Wallet passes.
//!
//! This binary turns a TOML pass definition and a directory of images into a
//! signed `.pkpass` archive, and can render or verify passes.

use std::process;

fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match pkpass_bundler::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
