//! Manifest calculation.
//!
//! The manifest maps every file of the bundle to the hex SHA-1 of its bytes.
//! `pass.json` comes first, assets follow in the order they were added.

use crate::bundler::{Error, Result};
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};

/// Hex-encoded SHA-1 of `data` (40 lowercase characters).
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Ordered `filename -> sha1` listing of a bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<(String, String)>,
}

impl Manifest {
    /// Hashes `pass.json` followed by each asset.
    pub fn calculate<'a>(
        pass_json: &[u8],
        assets: impl IntoIterator<Item = (&'a str, &'a [u8])>,
    ) -> Self {
        let mut manifest = Self::default();
        manifest.insert(super::PASS_JSON, sha1_hex(pass_json));
        for (name, data) in assets {
            manifest.insert(name, sha1_hex(data));
        }
        manifest
    }

    /// Last insert wins for a repeated name; position is kept.
    fn insert(&mut self, name: &str, digest: String) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = digest,
            None => self.entries.push((name.to_string(), digest)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, digest)| digest.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compact `manifest.json` bytes.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, digest)| (name.clone(), Value::from(digest.as_str())))
            .collect();
        Ok(serde_json::to_vec(&Value::Object(map))?)
    }

    /// Parses `manifest.json` bytes read back from an archive.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        let Value::Object(map) = value else {
            return Err(Error::Validation("manifest.json is not a JSON object".into()));
        };

        let mut manifest = Self::default();
        for (name, digest) in map {
            let Value::String(digest) = digest else {
                return Err(Error::Validation(format!(
                    "manifest entry '{name}' is not a string"
                )));
            };
            manifest.insert(&name, digest);
        }
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_matches_known_vector() {
        assert_eq!(sha1_hex(b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn pass_json_is_listed_first() {
        let manifest = Manifest::calculate(
            b"{}",
            [("icon.png", b"icon".as_slice()), ("logo.png", b"logo".as_slice())],
        );
        let names: Vec<_> = manifest.entries().map(|(n, _)| n).collect();
        assert_eq!(names, ["pass.json", "icon.png", "logo.png"]);
        assert_eq!(manifest.get("icon.png"), Some(sha1_hex(b"icon").as_str()));
    }

    #[test]
    fn json_round_trip_keeps_order() {
        let manifest = Manifest::calculate(b"{}", [("strip.png", b"s".as_slice())]);
        let bytes = manifest.to_json_bytes().unwrap();
        assert!(bytes.starts_with(br#"{"pass.json":""#));
        assert_eq!(Manifest::from_json_bytes(&bytes).unwrap(), manifest);
    }

    #[test]
    fn non_object_manifest_is_rejected() {
        assert!(Manifest::from_json_bytes(b"[]").is_err());
        assert!(Manifest::from_json_bytes(br#"{"a":1}"#).is_err());
    }
}
