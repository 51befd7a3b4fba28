//! Integration tests for the `pkpass` binary.

use assert_cmd::Command;
use pkpass_bundler::bundler::{
    ManifestSigner, PassBundler, Result,
    builder::archive::write_archive,
    model::{PassDocument, PassIdentity, PassStyle},
};
use predicates::prelude::*;
use std::{io::Cursor, path::Path};

const DEFINITION: &str = r#"
team_identifier = "T1"
pass_type_identifier = "P1"
organization_name = "Org"
description = "d"
serial_number = "S1"

[style]
kind = "storeCard"
"#;

struct EchoSigner;

impl ManifestSigner for EchoSigner {
    fn sign(&self, manifest: &[u8]) -> Result<Vec<u8>> {
        Ok(manifest.to_vec())
    }
}

fn pkpass() -> Command {
    let mut cmd = Command::cargo_bin("pkpass").unwrap();
    for var in [
        "PKPASS_CERTIFICATE",
        "PKPASS_KEY",
        "PKPASS_WWDR_CERTIFICATE",
        "PKPASS_KEY_PASSPHRASE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn write_definition(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("pass.toml");
    std::fs::write(&path, DEFINITION).unwrap();
    path
}

fn sample_archive() -> Vec<u8> {
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
    let mut bundler = PassBundler::new(document);
    bundler.add_file_bytes("icon.png", b"icon".to_vec()).unwrap();
    bundler.create(&EchoSigner).unwrap()
}

#[test]
fn render_prints_canonical_pass_json() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    pkpass()
        .args(["render", "--definition"])
        .arg(&definition)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            r#"{"storeCard":{"headerFields":[],"primaryFields":[],"secondaryFields":[],"backFields":[],"auxiliaryFields":[]},"description":"d","formatVersion":1"#,
        ));
}

#[test]
fn render_rejects_unknown_definition_keys() {
    let dir = tempfile::tempdir().unwrap();
    let definition = dir.path().join("pass.toml");
    std::fs::write(&definition, format!("colour = \"red\"\n{DEFINITION}")).unwrap();

    pkpass()
        .args(["render", "--definition"])
        .arg(&definition)
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn verify_accepts_consistent_archive() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("member.pkpass");
    std::fs::write(&archive, sample_archive()).unwrap();

    pkpass()
        .arg("verify")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 entries match manifest.json"));
}

#[test]
fn verify_flags_tampered_asset() {
    let dir = tempfile::tempdir().unwrap();
    let archive = dir.path().join("tampered.pkpass");
    let manifest = format!(
        r#"{{"pass.json":"{}","icon.png":"{}"}}"#,
        hex::encode(<sha1::Sha1 as sha1::Digest>::digest(b"{}")),
        hex::encode(<sha1::Sha1 as sha1::Digest>::digest(b"original icon")),
    );
    let bytes = write_archive(
        Cursor::new(Vec::new()),
        b"sig",
        manifest.as_bytes(),
        b"{}",
        [("icon.png", b"swapped icon".as_slice())],
    )
    .unwrap()
    .into_inner();
    std::fs::write(&archive, bytes).unwrap();

    pkpass()
        .arg("verify")
        .arg(&archive)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("icon.png: hash does not match"));
}

#[test]
fn build_without_credentials_names_missing_argument() {
    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());

    pkpass()
        .args(["build", "--definition"])
        .arg(&definition)
        .arg("--output")
        .arg(dir.path().join("out.pkpass"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--certificate"));
    assert!(!dir.path().join("out.pkpass").exists());
}

#[test]
fn build_rejects_malformed_asset_flag() {
    pkpass()
        .args(["build", "-d", "pass.toml", "--asset", "icon.png", "-o", "out.pkpass"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME=PATH"));
}

#[cfg(unix)]
#[test]
fn build_bundles_asset_directory_with_custom_signer() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let definition = write_definition(dir.path());
    let assets = dir.path().join("assets");
    std::fs::create_dir(&assets).unwrap();
    std::fs::write(assets.join("icon.png"), b"icon").unwrap();
    std::fs::write(assets.join("logo.png"), b"logo").unwrap();

    let signer = dir.path().join("signer.sh");
    std::fs::write(&signer, "#!/bin/sh\ncat\n").unwrap();
    std::fs::set_permissions(&signer, std::fs::Permissions::from_mode(0o755)).unwrap();

    let output = dir.path().join("dist").join("member.pkpass");
    pkpass()
        .args(["build", "--definition"])
        .arg(&definition)
        .arg("--assets")
        .arg(&assets)
        .arg("--openssl")
        .arg(&signer)
        .arg("--output")
        .arg(&output)
        .env("PKPASS_CERTIFICATE", &definition)
        .env("PKPASS_KEY", &definition)
        .env("PKPASS_WWDR_CERTIFICATE", &definition)
        .assert()
        .success()
        .stdout(predicate::str::contains("serial number: S1"))
        .stdout(predicate::str::contains("icon.png (4 bytes)"));

    pkpass()
        .arg("verify")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("5 entries match manifest.json"));
}
