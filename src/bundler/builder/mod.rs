//! Pass bundle assembly.
//!
//! This module provides the [`PassBundler`] that turns a
//! [`PassDocument`](crate::bundler::model::PassDocument) plus asset files into
//! a signed `.pkpass` archive.
//!
//! # Overview
//!
//! The bundler runs a fixed pipeline:
//! 1. Serializes the document to canonical `pass.json`
//! 2. Hashes `pass.json` and every asset into `manifest.json`
//! 3. Signs the manifest through a [`ManifestSigner`]
//! 4. Packs `signature`, `manifest.json`, `pass.json` and the assets into
//!    a ZIP archive
//!
//! # Example
//!
//! ```no_run
//! use pkpass_bundler::bundler::{
//!     CertSource, OpensslSigner, PassBundler, SigningCredentials,
//!     model::{PassDocument, PassIdentity, PassStyle},
//! };
//!
//! # fn example() -> pkpass_bundler::bundler::Result<()> {
//! let document = PassDocument::new(
//!     PassIdentity {
//!         team_identifier: "A1B2C3D4E5".into(),
//!         pass_type_identifier: "pass.com.example.member".into(),
//!         organization_name: "Example".into(),
//!         serial_number: "0001".into(),
//!         description: "Membership card".into(),
//!     },
//!     PassStyle::store_card(),
//! )?;
//!
//! let mut bundler = PassBundler::new(document);
//! bundler.add_file_from_path("icon.png", "assets/icon.png")?;
//!
//! let signer = OpensslSigner::new(SigningCredentials {
//!     certificate: CertSource::Path("certs/pass.pem".into()),
//!     key: CertSource::Path("certs/pass.key".into()),
//!     wwdr_certificate: CertSource::Path("certs/wwdr.pem".into()),
//!     passphrase: Some("secret".into()),
//! });
//! bundler.create_to_path(&signer, "member.pkpass")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`archive`] - ZIP packaging and archive verification
//! - [`checksum`] - SHA-1 manifest calculation
//! - [`orchestrator`] - Main [`PassBundler`] struct and pipeline
//! - [`signing`] - Manifest signing through `openssl smime`
//! - [`tool_detection`] - External tool availability checking

pub mod archive;
pub mod checksum;
mod orchestrator;
pub mod signing;
pub mod tool_detection;

pub use archive::{ArchiveReport, verify_archive};
pub use checksum::Manifest;
pub use orchestrator::{AssetFile, PassBundler};
pub use signing::{CertSource, ManifestSigner, OpensslSigner, SigningCredentials};

/// Archive entry holding the pass document.
pub const PASS_JSON: &str = "pass.json";
/// Archive entry holding the manifest.
pub const MANIFEST_JSON: &str = "manifest.json";
/// Archive entry holding the detached signature.
pub const SIGNATURE: &str = "signature";

/// Names assets may not use.
pub const RESERVED_NAMES: [&str; 3] = [PASS_JSON, MANIFEST_JSON, SIGNATURE];
