//! `.pkpass` archive packaging and verification.

use super::{MANIFEST_JSON, PASS_JSON, SIGNATURE, checksum::Manifest, checksum::sha1_hex};
use crate::bundler::{Error, Result};
use std::io::{Read, Seek, Write};
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

/// Writes a pass archive to `writer` and returns the writer.
///
/// Entry order: `signature`, `manifest.json`, `pass.json`, then assets in
/// the order given. Entries are deflated and carry the DOS epoch timestamp,
/// so identical inputs give identical archives.
pub fn write_archive<'a, W: Write + Seek>(
    writer: W,
    signature: &'a [u8],
    manifest: &'a [u8],
    pass_json: &'a [u8],
    assets: impl IntoIterator<Item = (&'a str, &'a [u8])>,
) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    for (name, data) in [
        (SIGNATURE, signature),
        (MANIFEST_JSON, manifest),
        (PASS_JSON, pass_json),
    ]
    .into_iter()
    .chain(assets)
    {
        log::debug!("Adding {} ({} bytes)", name, data.len());
        zip.start_file(name, entry_options())?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?)
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
}

/// Outcome of checking an archive against its own manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Entry names in archive order.
    pub entries: Vec<String>,
    /// Listed entries whose bytes do not match the manifest hash.
    pub mismatched: Vec<String>,
    /// Listed in the manifest but absent from the archive.
    pub missing: Vec<String>,
    /// Present in the archive but not listed in the manifest.
    pub unlisted: Vec<String>,
    /// Size of the `signature` entry.
    pub signature_len: usize,
}

impl ArchiveReport {
    pub fn is_valid(&self) -> bool {
        self.mismatched.is_empty()
            && self.missing.is_empty()
            && self.unlisted.is_empty()
            && self.signature_len > 0
    }
}

/// Reads a `.pkpass` archive and checks every entry against `manifest.json`.
///
/// Fails outright when `signature`, `manifest.json` or `pass.json` is absent
/// or the manifest cannot be parsed; hash problems are collected in the
/// returned report instead.
pub fn verify_archive<R: Read + Seek>(reader: R) -> Result<ArchiveReport> {
    let mut archive = ZipArchive::new(reader)?;
    let mut report = ArchiveReport::default();
    let mut contents = Vec::with_capacity(archive.len());

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        report.entries.push(entry.name().to_string());
        contents.push((entry.name().to_string(), data));
    }

    let find = |name: &str| {
        contents
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    };
    for required in [SIGNATURE, MANIFEST_JSON, PASS_JSON] {
        if find(required).is_none() {
            return Err(Error::Validation(format!("archive has no '{required}' entry")));
        }
    }

    report.signature_len = find(SIGNATURE).map_or(0, |data| data.len());
    let manifest = Manifest::from_json_bytes(find(MANIFEST_JSON).unwrap_or_default())?;

    for (name, digest) in manifest.entries() {
        match find(name) {
            Some(data) if sha1_hex(data) == digest.to_ascii_lowercase() => {}
            Some(_) => report.mismatched.push(name.to_string()),
            None => report.missing.push(name.to_string()),
        }
    }
    for (name, _) in &contents {
        if name != SIGNATURE && name != MANIFEST_JSON && manifest.get(name).is_none() {
            report.unlisted.push(name.clone());
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn build(pass_json: &[u8], assets: &[(&str, &[u8])], tamper: Option<(&str, &[u8])>) -> Vec<u8> {
        let manifest = Manifest::calculate(pass_json, assets.iter().copied());
        let manifest = manifest.to_json_bytes().unwrap();
        let mut files: Vec<(&str, &[u8])> = assets.to_vec();
        if let Some((name, data)) = tamper {
            files.retain(|(n, _)| *n != name);
            files.push((name, data));
        }
        write_archive(Cursor::new(Vec::new()), b"sig", &manifest, pass_json, files)
            .unwrap()
            .into_inner()
    }

    #[test]
    fn entries_are_written_in_canonical_order() {
        let bytes = build(
            b"{}",
            &[("icon.png", b"icon".as_slice()), ("logo.png", b"logo".as_slice())],
            None,
        );
        let report = verify_archive(Cursor::new(bytes)).unwrap();
        assert_eq!(
            report.entries,
            ["signature", "manifest.json", "pass.json", "icon.png", "logo.png"]
        );
        assert!(report.is_valid());
    }

    #[test]
    fn identical_inputs_produce_identical_archives() {
        let assets = [("icon.png", b"icon".as_slice())];
        assert_eq!(build(b"{}", &assets, None), build(b"{}", &assets, None));
    }

    #[test]
    fn tampered_asset_is_reported() {
        let bytes = build(
            b"{}",
            &[("icon.png", b"icon".as_slice())],
            Some(("icon.png", b"evil".as_slice())),
        );
        let report = verify_archive(Cursor::new(bytes)).unwrap();
        assert_eq!(report.mismatched, ["icon.png"]);
        assert!(!report.is_valid());
    }

    #[test]
    fn archive_without_manifest_is_rejected() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("pass.json", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"{}").unwrap();
        let bytes = zip.finish().unwrap().into_inner();
        assert!(matches!(
            verify_archive(Cursor::new(bytes)),
            Err(Error::Validation(_))
        ));
    }
}
