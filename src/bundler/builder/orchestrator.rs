//! Main bundle orchestration.
//!
//! This module provides the [`PassBundler`], which owns one pass document and
//! its asset files for the duration of an assembly.

use super::{
    RESERVED_NAMES,
    archive::write_archive,
    checksum::Manifest,
    signing::ManifestSigner,
};
use crate::bundler::{
    Result,
    error::ErrorExt,
    model::PassDocument,
    utils::fs,
};
use std::{
    io::{Cursor, Read, Seek, Write},
    path::{Path, PathBuf},
};

/// A named file stored in the bundle next to `pass.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFile {
    name: String,
    data: Vec<u8>,
}

impl AssetFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Outputs of the first three pipeline steps.
struct SignedParts {
    pass_json: Vec<u8>,
    manifest: Vec<u8>,
    signature: Vec<u8>,
}

/// Assembles a signed pass archive.
///
/// Assets are read eagerly when added. Adding a file under a name that is
/// already present replaces its bytes and keeps its position.
#[derive(Debug, Clone)]
pub struct PassBundler {
    document: PassDocument,
    files: Vec<AssetFile>,
}

impl PassBundler {
    pub fn new(document: PassDocument) -> Self {
        Self {
            document,
            files: Vec::new(),
        }
    }

    pub fn document(&self) -> &PassDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut PassDocument {
        &mut self.document
    }

    /// Asset files in the order they were first added.
    pub fn files(&self) -> &[AssetFile] {
        &self.files
    }

    /// Reads `reader` to completion and stores the bytes under `name`.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`](crate::bundler::Error::Validation) for empty names, names with path separators,
    ///   or reserved names (`pass.json`, `manifest.json`, `signature`)
    /// * [`Error::IoError`](crate::bundler::Error::IoError) when the reader fails
    pub fn add_file<R: Read>(&mut self, name: impl Into<String>, mut reader: R) -> Result<()> {
        let name = name.into();
        check_asset_name(&name)?;
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.store(name, data);
        Ok(())
    }

    /// Stores `data` under `name`.
    pub fn add_file_bytes(&mut self, name: impl Into<String>, data: impl Into<Vec<u8>>) -> Result<()> {
        let name = name.into();
        check_asset_name(&name)?;
        self.store(name, data.into());
        Ok(())
    }

    /// Reads the file at `path` and stores it under `name`.
    pub fn add_file_from_path(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let name = name.into();
        check_asset_name(&name)?;
        let path = path.as_ref();
        let data = std::fs::read(path).fs_context("reading asset", path)?;
        self.store(name, data);
        Ok(())
    }

    fn store(&mut self, name: String, data: Vec<u8>) {
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(existing) => {
                log::debug!("Replacing asset {} ({} bytes)", name, data.len());
                existing.data = data;
            }
            None => {
                log::debug!("Adding asset {} ({} bytes)", name, data.len());
                self.files.push(AssetFile { name, data });
            }
        }
    }

    /// Canonical `pass.json` bytes.
    pub fn pass_json(&self) -> Result<Vec<u8>> {
        self.document.to_json_bytes()
    }

    /// Manifest over `pass_json` and the current assets.
    pub fn manifest(&self, pass_json: &[u8]) -> Manifest {
        Manifest::calculate(pass_json, self.assets())
    }

    fn assets(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|f| (f.name.as_str(), f.data.as_slice()))
    }

    fn sign_parts(&self, signer: &dyn ManifestSigner) -> Result<SignedParts> {
        let pass_json = self.pass_json()?;
        log::debug!("pass.json is {} bytes", pass_json.len());

        let manifest = self.manifest(&pass_json).to_json_bytes()?;
        log::debug!("manifest.json lists {} files", self.files.len() + 1);

        let signature = signer.sign(&manifest)?;

        Ok(SignedParts {
            pass_json,
            manifest,
            signature,
        })
    }

    /// Runs the whole pipeline and writes the archive to `writer`.
    pub fn create_to_writer<W: Write + Seek>(
        &self,
        signer: &dyn ManifestSigner,
        writer: W,
    ) -> Result<W> {
        let parts = self.sign_parts(signer)?;
        write_archive(
            writer,
            &parts.signature,
            &parts.manifest,
            &parts.pass_json,
            self.assets(),
        )
    }

    /// Runs the whole pipeline and returns the archive bytes.
    pub fn create(&self, signer: &dyn ManifestSigner) -> Result<Vec<u8>> {
        Ok(self
            .create_to_writer(signer, Cursor::new(Vec::new()))?
            .into_inner())
    }

    /// Runs the whole pipeline and writes the archive to `path`.
    ///
    /// The archive is staged next to `path` and moved into place only once it
    /// is complete; on failure nothing is left at `path`.
    pub fn create_to_path(
        &self,
        signer: &dyn ManifestSigner,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let path = path.as_ref();
        let parts = self.sign_parts(signer)?;
        fs::write_atomically(path, |file| {
            write_archive(
                file,
                &parts.signature,
                &parts.manifest,
                &parts.pass_json,
                self.assets(),
            )
            .map(|_| ())
        })?;
        log::info!(
            "Created pass {} at {}",
            self.document.serial_number(),
            path.display()
        );
        Ok(path.to_path_buf())
    }
}

fn check_asset_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        crate::bail!("asset name must not be empty");
    }
    if name.contains(['/', '\\']) {
        crate::bail!("asset name '{name}' must not contain path separators");
    }
    if RESERVED_NAMES.contains(&name) {
        crate::bail!("asset name '{name}' is reserved for the bundle itself");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Error;
    use crate::bundler::model::{PassIdentity, PassStyle};

    fn bundler() -> PassBundler {
        let document = PassDocument::new(
            PassIdentity {
                team_identifier: "T1".into(),
                pass_type_identifier: "P1".into(),
                organization_name: "Org".into(),
                serial_number: "S1".into(),
                description: "d".into(),
            },
            PassStyle::store_card(),
        )
        .unwrap();
        PassBundler::new(document)
    }

    #[test]
    fn add_file_reads_eagerly_and_keeps_order() {
        let mut bundler = bundler();
        bundler.add_file("icon.png", Cursor::new(b"icon".to_vec())).unwrap();
        bundler.add_file_bytes("logo.png", b"logo".to_vec()).unwrap();
        bundler.add_file_bytes("strip.png", b"strip".to_vec()).unwrap();
        let names: Vec<_> = bundler.files().iter().map(AssetFile::name).collect();
        assert_eq!(names, ["icon.png", "logo.png", "strip.png"]);
    }

    #[test]
    fn duplicate_name_replaces_bytes_in_place() {
        let mut bundler = bundler();
        bundler.add_file_bytes("icon.png", b"first".to_vec()).unwrap();
        bundler.add_file_bytes("logo.png", b"logo".to_vec()).unwrap();
        bundler.add_file_bytes("icon.png", b"second".to_vec()).unwrap();
        assert_eq!(bundler.files().len(), 2);
        assert_eq!(bundler.files()[0].data(), b"second");
    }

    #[test]
    fn reserved_and_nested_names_are_rejected() {
        let mut bundler = bundler();
        for name in ["pass.json", "manifest.json", "signature", "en.lproj/logo.png", ""] {
            assert!(
                matches!(bundler.add_file_bytes(name, b"x".to_vec()), Err(Error::Validation(_))),
                "{name:?} accepted"
            );
        }
    }

    #[test]
    fn missing_asset_path_is_an_io_error() {
        let mut bundler = bundler();
        let err = bundler
            .add_file_from_path("icon.png", "/nonexistent/icon.png")
            .unwrap_err();
        assert!(matches!(err, Error::Fs { .. }));
    }

    #[test]
    fn failing_reader_is_an_io_error() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("unreadable"))
            }
        }
        let mut bundler = bundler();
        assert!(matches!(bundler.add_file("icon.png", Broken), Err(Error::IoError(_))));
        assert!(bundler.files().is_empty());
    }
}
