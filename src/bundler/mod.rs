//! Apple Wallet pass bundling.
//!
//! This module holds the pass content model ([`model`]) and the pipeline that
//! turns it into a signed `.pkpass` archive ([`builder`]).
//!
//! It can be used directly as a library or through the `pkpass` binary.

pub mod builder;
pub mod error;
pub mod model;
pub mod utils;

pub use builder::{
    ArchiveReport, AssetFile, CertSource, Manifest, ManifestSigner, OpensslSigner, PassBundler,
    SigningCredentials, verify_archive,
};
pub use error::{Error, Result};
