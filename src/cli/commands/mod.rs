//! Command execution functions for pass operations.

mod build;
mod render;
mod verify;

pub use build::{build, signing_credentials};
pub use render::render;
pub use verify::verify;
