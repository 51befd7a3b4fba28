//! Near-field-communication payload.

use super::Serializable;
use crate::bundler::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Payload handed to an NFC terminal (Value Added Services).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NearFieldPayload {
    /// Base64 public key used by the terminal to encrypt its request.
    encryption_public_key: String,
    message: String,
    #[serde(default)]
    requires_authentication: bool,
}

impl NearFieldPayload {
    pub fn new(encryption_public_key: impl Into<String>, message: impl Into<String>) -> Result<Self> {
        let payload = Self {
            encryption_public_key: encryption_public_key.into(),
            message: message.into(),
            requires_authentication: false,
        };
        payload.validate()?;
        Ok(payload)
    }

    pub fn requiring_authentication(mut self) -> Self {
        self.requires_authentication = true;
        self
    }

    /// Checks required values; deserialized payloads go through this too.
    pub fn validate(&self) -> Result<()> {
        if self.encryption_public_key.is_empty() {
            return Err(Error::missing("nfc.encryptionPublicKey"));
        }
        if self.message.is_empty() {
            return Err(Error::missing("nfc.message"));
        }
        Ok(())
    }
}

impl Serializable for NearFieldPayload {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "encryptionPublicKey".into(),
            Value::from(self.encryption_public_key.as_str()),
        );
        map.insert("message".into(), Value::from(self.message.as_str()));
        map.insert(
            "requiresAuthentication".into(),
            Value::Bool(self.requires_authentication),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_authentication_flag() {
        let nfc = NearFieldPayload::new("MDkwEwYHKoZIzj0CAQ==", "member-42")
            .unwrap()
            .requiring_authentication();
        assert_eq!(
            serde_json::to_string(&nfc.to_json()).unwrap(),
            r#"{"encryptionPublicKey":"MDkwEwYHKoZIzj0CAQ==","message":"member-42","requiresAuthentication":true}"#
        );
    }

    #[test]
    fn empty_message_is_rejected() {
        assert!(matches!(
            NearFieldPayload::new("key", ""),
            Err(Error::MissingRequiredField { .. })
        ));
    }
}
