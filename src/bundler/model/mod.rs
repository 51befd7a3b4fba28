//! Pass content model.
//!
//! Value objects for everything that ends up in `pass.json`: display fields,
//! barcodes, locations, beacons, NFC payloads, the style variant that owns
//! the field groups, and the top-level [`PassDocument`].
//!
//! Every value object implements [`Serializable`], which maps it to a JSON
//! object whose key order is fixed by the implementation. The document
//! encoder only ever goes through that trait.

mod barcode;
mod document;
mod field;
mod location;
mod nfc;
mod style;

pub use barcode::{Barcode, BarcodeFormat, BarcodeSpec};
pub use document::{PassDocument, PassIdentity, WebService, generate_serial_number};
pub use field::{
    Alignment, DateStyle, DisplayHint, Field, FieldSpec, FieldValue, NumberStyle,
    parse_timestamp,
};
pub use location::{Beacon, BeaconSpec, Location, LocationSpec};
pub use nfc::NearFieldPayload;
pub use style::{FieldGroup, PassStyle, StyleKind, TransitType};

use serde::Deserialize;
use serde_json::{Map, Value};

/// Capability of mapping a value object to its wire JSON.
///
/// Implementations omit keys whose optional value is absent.
pub trait Serializable {
    /// Returns the JSON representation of this value.
    fn to_json(&self) -> Value;
}

impl<T: Serializable> Serializable for [T] {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(Serializable::to_json).collect())
    }
}

/// Loosely-typed numeric input, as found in hand-written definition files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    /// Integer literal
    Integer(i64),
    /// Floating point literal
    Float(f64),
    /// Anything else; parsed on demand
    Text(String),
}

impl NumericInput {
    /// Finite floating point value, if the input is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumericInput::Integer(i) => *i as f64,
            NumericInput::Float(f) => *f,
            NumericInput::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for NumericInput {
    fn from(value: f64) -> Self {
        NumericInput::Float(value)
    }
}

impl From<&str> for NumericInput {
    fn from(value: &str) -> Self {
        NumericInput::Text(value.to_string())
    }
}

/// Inserts `value` under `key` only when it is present.
pub(crate) fn insert_opt(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::from(value));
    }
}

/// JSON-compatible float; non-finite values never reach this point.
pub(crate) fn float(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_input_coerces_strings_and_rejects_garbage() {
        assert_eq!(NumericInput::Text(" 12.5 ".into()).as_f64(), Some(12.5));
        assert_eq!(NumericInput::Integer(3).as_f64(), Some(3.0));
        assert_eq!(NumericInput::Text("north".into()).as_f64(), None);
        assert_eq!(NumericInput::Float(f64::NAN).as_f64(), None);
    }
}
