//! Manifest signing.
//!
//! The manifest is signed with a detached PKCS#7 signature in DER form. The
//! default [`OpensslSigner`] delegates to `openssl smime` as a one-shot
//! subprocess: manifest bytes go to its stdin, the signature comes back on
//! stdout, and a non-zero exit is a fatal [`Error::Signing`].
//!
//! Certificates and keys can be given as paths or inline PEM. Inline PEM is
//! written to private temporary files that live only for the duration of one
//! [`ManifestSigner::sign`] call.

use super::tool_detection::default_openssl_program;
use crate::bundler::{Error, Result, error::ErrorExt};
use base64::Engine;
use std::{
    io::{Read, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread::JoinHandle,
    time::Duration,
};
use tempfile::NamedTempFile;
use wait_timeout::ChildExt;

/// Default bound on how long the signer may run.
pub const DEFAULT_SIGN_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable through which the key passphrase reaches openssl.
const PASSPHRASE_ENV: &str = "PKPASS_SIGNER_PASSPHRASE";

const PEM_MARKER: &str = "-----BEGIN";

/// Something that produces a detached signature over manifest bytes.
pub trait ManifestSigner {
    /// Signs `manifest` and returns the raw signature bytes.
    fn sign(&self, manifest: &[u8]) -> Result<Vec<u8>>;
}

/// Where certificate or key material comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum CertSource {
    /// PEM file on disk
    Path(PathBuf),
    /// PEM content held in memory
    Pem(String),
}

impl std::fmt::Debug for CertSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CertSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            CertSource::Pem(_) => f.write_str("Pem(<redacted>)"),
        }
    }
}

impl CertSource {
    /// Interprets a user-supplied value.
    ///
    /// Inline PEM is used as-is; base64 that decodes to PEM (as stored in CI
    /// secrets) is decoded; anything else is taken as a path.
    pub fn from_value(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.starts_with(PEM_MARKER) {
            return CertSource::Pem(trimmed.to_string());
        }
        if !Path::new(trimmed).exists() {
            let compact: String = trimmed.split_whitespace().collect();
            if let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(compact)
                && let Ok(text) = String::from_utf8(decoded)
                && text.trim_start().starts_with(PEM_MARKER)
            {
                return CertSource::Pem(text);
            }
        }
        CertSource::Path(PathBuf::from(trimmed))
    }
}

impl From<PathBuf> for CertSource {
    fn from(path: PathBuf) -> Self {
        CertSource::Path(path)
    }
}

impl From<&Path> for CertSource {
    fn from(path: &Path) -> Self {
        CertSource::Path(path.to_path_buf())
    }
}

/// Material needed to sign a pass.
#[derive(Clone)]
pub struct SigningCredentials {
    /// Pass type certificate
    pub certificate: CertSource,
    /// Private key of the pass type certificate
    pub key: CertSource,
    /// Apple WWDR intermediate certificate
    pub wwdr_certificate: CertSource,
    /// Passphrase of the private key, if it is encrypted
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for SigningCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningCredentials")
            .field("certificate", &self.certificate)
            .field("key", &self.key)
            .field("wwdr_certificate", &self.wwdr_certificate)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A credential resolved to a path the signer can read.
enum CredentialFile<'a> {
    Existing(&'a Path),
    /// Removed from disk when dropped.
    Ephemeral(NamedTempFile),
}

impl CredentialFile<'_> {
    fn path(&self) -> &Path {
        match self {
            CredentialFile::Existing(path) => path,
            CredentialFile::Ephemeral(file) => file.path(),
        }
    }
}

fn materialize<'a>(source: &'a CertSource, label: &str) -> Result<CredentialFile<'a>> {
    match source {
        CertSource::Path(path) => Ok(CredentialFile::Existing(path)),
        CertSource::Pem(pem) => {
            let mut file = tempfile::Builder::new()
                .prefix(&format!("pkpass-{label}-"))
                .suffix(".pem")
                .tempfile()?;
            file.write_all(pem.as_bytes())?;
            file.flush()?;
            log::debug!("Materialized inline {} at {}", label, file.path().display());
            Ok(CredentialFile::Ephemeral(file))
        }
    }
}

/// Signs manifests with `openssl smime -sign`.
#[derive(Debug, Clone)]
pub struct OpensslSigner {
    credentials: SigningCredentials,
    program: PathBuf,
    timeout: Duration,
}

impl OpensslSigner {
    pub fn new(credentials: SigningCredentials) -> Self {
        Self {
            credentials,
            program: default_openssl_program(),
            timeout: DEFAULT_SIGN_TIMEOUT,
        }
    }

    /// Uses a different openssl-compatible program.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn command(&self, certificate: &Path, key: &Path, wwdr: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(["smime", "-binary", "-sign", "-certfile"])
            .arg(wwdr)
            .arg("-signer")
            .arg(certificate)
            .arg("-inkey")
            .arg(key)
            .args(["-outform", "DER"]);
        if let Some(passphrase) = &self.credentials.passphrase {
            command
                .arg("-passin")
                .arg(format!("env:{PASSPHRASE_ENV}"))
                .env(PASSPHRASE_ENV, passphrase);
        }
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl ManifestSigner for OpensslSigner {
    fn sign(&self, manifest: &[u8]) -> Result<Vec<u8>> {
        // Guards stay alive until this function returns, on every path.
        let certificate = materialize(&self.credentials.certificate, "certificate")?;
        let key = materialize(&self.credentials.key, "key")?;
        let wwdr = materialize(&self.credentials.wwdr_certificate, "wwdr")?;

        let command_name = self.program.display().to_string();
        log::debug!(
            "Signing manifest ({} bytes) with {}",
            manifest.len(),
            command_name
        );

        let mut child = self
            .command(certificate.path(), key.path(), wwdr.path())
            .spawn()
            .map_err(|error| Error::CommandFailed {
                command: command_name.clone(),
                error,
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let stdin = feed(child.stdin.take(), manifest.to_vec());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                log::warn!("{} killed after {:?}", command_name, self.timeout);
                return Err(Error::SigningTimeout {
                    timeout: self.timeout,
                });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::CommandFailed {
                    command: command_name,
                    error: e,
                });
            }
        };

        let fed = stdin
            .join()
            .map_err(|_| std::io::Error::other("signer input writer panicked"))?;
        let signature = join(stdout)?;
        let diagnostic = String::from_utf8_lossy(&join(stderr)?).trim().to_string();

        if !status.success() {
            return Err(Error::Signing {
                code: status.code(),
                diagnostic,
            });
        }
        fed?;
        if signature.is_empty() {
            return Err(Error::Signing {
                code: status.code(),
                diagnostic: format!("signer produced no output. {diagnostic}")
                    .trim()
                    .to_string(),
            });
        }

        log::debug!("Signature is {} bytes", signature.len());
        Ok(signature)
    }
}

/// Writes the manifest to the child's stdin on its own thread, so a signer
/// that never reads cannot hold up the timeout.
///
/// A closed pipe is not an error: the exit status explains why the signer
/// stopped reading.
fn feed<W: Write + Send + 'static>(
    pipe: Option<W>,
    data: Vec<u8>,
) -> JoinHandle<std::io::Result<()>> {
    std::thread::spawn(move || {
        if let Some(mut pipe) = pipe {
            match pipe.write_all(&data) {
                Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                _ => {}
            }
        }
        Ok(())
    })
}

/// Reads a child pipe to completion on its own thread so that neither pipe
/// can fill up while we wait on the process.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buffer)?;
        }
        Ok(buffer)
    })
}

fn join(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| std::io::Error::other("signer output reader panicked"))?
        .map_err(Error::IoError)
}

/// Checks that every path-based credential exists before signing starts.
pub fn check_credential_paths(credentials: &SigningCredentials) -> Result<()> {
    for source in [
        &credentials.certificate,
        &credentials.key,
        &credentials.wwdr_certificate,
    ] {
        if let CertSource::Path(path) = source {
            std::fs::metadata(path).fs_context("reading signing credential", path)?;
        }
    }
    Ok(())
}
