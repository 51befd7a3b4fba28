//! Barcodes.

use super::Serializable;
use crate::bundler::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Symbology of a barcode. Unrecognized names fall back to QR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BarcodeFormat {
    Pdf417,
    #[default]
    Qr,
    Aztec,
}

impl BarcodeFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            BarcodeFormat::Pdf417 => "PKBarcodeFormatPDF417",
            BarcodeFormat::Qr => "PKBarcodeFormatQR",
            BarcodeFormat::Aztec => "PKBarcodeFormatAztec",
        }
    }
}

impl From<&str> for BarcodeFormat {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "pdf417" => BarcodeFormat::Pdf417,
            "aztec" => BarcodeFormat::Aztec,
            _ => BarcodeFormat::Qr,
        }
    }
}

impl From<String> for BarcodeFormat {
    fn from(name: String) -> Self {
        BarcodeFormat::from(name.as_str())
    }
}

/// Construction parameters for a [`Barcode`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BarcodeSpec {
    pub format: BarcodeFormat,
    /// Payload encoded in the barcode. Required.
    pub message: String,
    /// IANA character set of `message`.
    pub message_encoding: String,
    /// Text shown near the barcode.
    pub alt_text: String,
}

impl Default for BarcodeSpec {
    fn default() -> Self {
        Self {
            format: BarcodeFormat::Qr,
            message: String::new(),
            message_encoding: "iso-8859-1".to_string(),
            alt_text: String::new(),
        }
    }
}

impl BarcodeSpec {
    pub fn new(format: impl Into<BarcodeFormat>, message: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            message: message.into(),
            ..Default::default()
        }
    }
}

/// A validated barcode.
#[derive(Debug, Clone, PartialEq)]
pub struct Barcode {
    format: BarcodeFormat,
    message: String,
    message_encoding: String,
    alt_text: String,
}

impl Barcode {
    /// Fails with [`Error::MissingRequiredField`] when the message is empty.
    pub fn new(spec: BarcodeSpec) -> Result<Self> {
        if spec.message.is_empty() {
            return Err(Error::missing("barcode.message"));
        }
        let message_encoding = if spec.message_encoding.is_empty() {
            BarcodeSpec::default().message_encoding
        } else {
            spec.message_encoding
        };
        Ok(Self {
            format: spec.format,
            message: spec.message,
            message_encoding,
            alt_text: spec.alt_text,
        })
    }

    pub fn format(&self) -> BarcodeFormat {
        self.format
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Serializable for Barcode {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("format".into(), Value::from(self.format.as_str()));
        map.insert("message".into(), Value::from(self.message.as_str()));
        map.insert(
            "messageEncoding".into(),
            Value::from(self.message_encoding.as_str()),
        );
        map.insert("altText".into(), Value::from(self.alt_text.as_str()));
        Value::Object(map)
    }
}
