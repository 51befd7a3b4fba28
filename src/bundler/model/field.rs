//! Display fields.
//!
//! A [`Field`] is a key/value pair shown in one of the five field groups of a
//! pass. Date, number and currency fields are the same base field carrying a
//! [`DisplayHint`] that tells the wallet how to format the value.

use super::{Serializable, float, insert_opt};
use crate::bundler::{Error, Result};
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static CURRENCY_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("static regex"));

/// Alternate layout accepted after RFC 3339 (`+hhmm` offsets).
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Parses an ISO-8601 timestamp that carries a timezone offset.
///
/// Accepts RFC 3339 (`2024-05-01T18:30:00+02:00`, `...Z`, optional fraction)
/// and the compact offset form `2024-05-01T18:30:00.000+0200`.
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, COMPACT_OFFSET_FORMAT))
        .map_err(|_| {
            Error::Validation(format!(
                "'{value}' is not an ISO-8601 timestamp with timezone offset"
            ))
        })
}

/// Text alignment of a field value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justified,
    Natural,
}

impl Alignment {
    /// Wire name of the alignment.
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "PKTextAlignmentLeft",
            Alignment::Center => "PKTextAlignmentCenter",
            Alignment::Right => "PKTextAlignmentRight",
            Alignment::Justified => "PKTextAlignmentJustified",
            Alignment::Natural => "PKTextAlignmentNatural",
        }
    }
}

/// Unrecognized names fall back to [`Alignment::Left`].
impl From<&str> for Alignment {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "center" => Alignment::Center,
            "right" => Alignment::Right,
            "justified" => Alignment::Justified,
            "natural" => Alignment::Natural,
            _ => Alignment::Left,
        }
    }
}

impl From<String> for Alignment {
    fn from(name: String) -> Self {
        Alignment::from(name.as_str())
    }
}

/// Date or time display style. Unrecognized names fall back to `Short`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum DateStyle {
    None,
    #[default]
    Short,
    Medium,
    Long,
    Full,
}

impl DateStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            DateStyle::None => "PKDateStyleNone",
            DateStyle::Short => "PKDateStyleShort",
            DateStyle::Medium => "PKDateStyleMedium",
            DateStyle::Long => "PKDateStyleLong",
            DateStyle::Full => "PKDateStyleFull",
        }
    }
}

impl From<&str> for DateStyle {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" => DateStyle::None,
            "medium" => DateStyle::Medium,
            "long" => DateStyle::Long,
            "full" => DateStyle::Full,
            _ => DateStyle::Short,
        }
    }
}

impl From<String> for DateStyle {
    fn from(name: String) -> Self {
        DateStyle::from(name.as_str())
    }
}

/// Number display style. Unrecognized names fall back to `Decimal`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NumberStyle {
    #[default]
    Decimal,
    Percent,
    Scientific,
    SpellOut,
}

impl NumberStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            NumberStyle::Decimal => "PKNumberStyleDecimal",
            NumberStyle::Percent => "PKNumberStylePercent",
            NumberStyle::Scientific => "PKNumberStyleScientific",
            NumberStyle::SpellOut => "PKNumberStyleSpellOut",
        }
    }
}

impl From<&str> for NumberStyle {
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "percent" => NumberStyle::Percent,
            "scientific" => NumberStyle::Scientific,
            "spellout" => NumberStyle::SpellOut,
            _ => NumberStyle::Decimal,
        }
    }
}

impl From<String> for NumberStyle {
    fn from(name: String) -> Self {
        NumberStyle::from(name.as_str())
    }
}

/// Formatting hint that turns a plain field into a date, number or
/// currency field.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayHint {
    Date {
        date_style: DateStyle,
        time_style: DateStyle,
        is_relative: bool,
    },
    Number {
        number_style: NumberStyle,
    },
    Currency {
        /// ISO 4217 code, e.g. `EUR`
        currency_code: String,
    },
}

impl DisplayHint {
    /// Date hint with `Short` date and time styles.
    pub fn date() -> Self {
        DisplayHint::Date {
            date_style: DateStyle::Short,
            time_style: DateStyle::Short,
            is_relative: false,
        }
    }

    pub fn number(number_style: NumberStyle) -> Self {
        DisplayHint::Number { number_style }
    }

    pub fn currency(code: impl Into<String>) -> Self {
        DisplayHint::Currency {
            currency_code: code.into(),
        }
    }
}

/// Construction parameters for a [`Field`].
///
/// # Examples
///
/// ```
/// use pkpass_bundler::bundler::model::{Field, FieldSpec, DisplayHint};
///
/// let balance = Field::new(FieldSpec {
///     label: Some("Balance".into()),
///     display: Some(DisplayHint::currency("USD")),
///     ..FieldSpec::new("balance", "21.75")
/// })
/// .unwrap();
/// assert_eq!(balance.key(), "balance");
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    /// Key, unique within the containing group. Required.
    pub key: String,
    /// Raw value. Required.
    pub value: String,
    pub label: Option<String>,
    /// Value with HTML links, shown on the back of the pass.
    pub attributed_value: Option<String>,
    /// Message shown when the value changes; `%@` is replaced by the value.
    pub change_message: Option<String>,
    pub text_alignment: Alignment,
    pub display: Option<DisplayHint>,
}

impl FieldSpec {
    /// Spec with the given key and value and everything else defaulted.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Default::default()
        }
    }
}

/// A field value after coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

/// A validated display field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: String,
    value: FieldValue,
    label: Option<String>,
    attributed_value: Option<String>,
    change_message: Option<String>,
    text_alignment: Alignment,
    display: Option<DisplayHint>,
}

impl Field {
    /// Validates and normalizes a [`FieldSpec`].
    ///
    /// # Errors
    ///
    /// * [`Error::MissingRequiredField`] when `key` or `value` is empty
    /// * [`Error::Validation`] when a number/currency value is not numeric,
    ///   a currency code is malformed, or a date field's value is not a
    ///   timestamp with timezone
    pub fn new(spec: FieldSpec) -> Result<Self> {
        if spec.key.trim().is_empty() {
            return Err(Error::missing("key"));
        }
        if spec.value.is_empty() {
            return Err(Error::missing(format!("{}.value", spec.key)));
        }

        let value = match &spec.display {
            None => FieldValue::Text(spec.value),
            Some(DisplayHint::Date { .. }) => {
                parse_timestamp(&spec.value).map_err(|e| {
                    Error::Validation(format!("date field '{}': {e}", spec.key))
                })?;
                FieldValue::Text(spec.value)
            }
            Some(DisplayHint::Number { .. }) => FieldValue::Number(coerce(&spec.key, &spec.value)?),
            Some(DisplayHint::Currency { currency_code }) => {
                if !CURRENCY_CODE.is_match(currency_code) {
                    return Err(Error::Validation(format!(
                        "field '{}': '{currency_code}' is not an ISO 4217 currency code",
                        spec.key
                    )));
                }
                FieldValue::Number(coerce(&spec.key, &spec.value)?)
            }
        };

        Ok(Self {
            key: spec.key,
            value,
            label: spec.label,
            attributed_value: spec.attributed_value,
            change_message: spec.change_message,
            text_alignment: spec.text_alignment,
            display: spec.display,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn display(&self) -> Option<&DisplayHint> {
        self.display.as_ref()
    }
}

fn coerce(key: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Validation(format!("field '{key}': '{raw}' is not a number")))
}

impl Serializable for Field {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("key".into(), Value::from(self.key.as_str()));
        insert_opt(&mut map, "attributedValue", self.attributed_value.as_deref());
        let value = match &self.value {
            FieldValue::Text(text) => Value::from(text.as_str()),
            FieldValue::Number(n) => float(*n),
        };
        map.insert("value".into(), value);
        insert_opt(&mut map, "label", self.label.as_deref());
        insert_opt(&mut map, "changeMessage", self.change_message.as_deref());
        map.insert(
            "textAlignment".into(),
            Value::from(self.text_alignment.as_str()),
        );

        match &self.display {
            Some(DisplayHint::Date {
                date_style,
                time_style,
                is_relative,
            }) => {
                map.insert("dateStyle".into(), Value::from(date_style.as_str()));
                map.insert("timeStyle".into(), Value::from(time_style.as_str()));
                map.insert("isRelative".into(), Value::Bool(*is_relative));
            }
            Some(DisplayHint::Number { number_style }) => {
                map.insert("numberStyle".into(), Value::from(number_style.as_str()));
            }
            Some(DisplayHint::Currency { currency_code }) => {
                map.insert("currencyCode".into(), Value::from(currency_code.as_str()));
            }
            None => {}
        }

        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_field_omits_absent_optionals() {
        let field = Field::new(FieldSpec::new("member", "Jane")).unwrap();
        assert_eq!(
            serde_json::to_string(&field.to_json()).unwrap(),
            r#"{"key":"member","value":"Jane","textAlignment":"PKTextAlignmentLeft"}"#
        );
    }

    #[test]
    fn change_message_is_emitted_only_when_set() {
        let field = Field::new(FieldSpec {
            label: Some("Gate".into()),
            change_message: Some("Gate changed to %@".into()),
            text_alignment: Alignment::from("center"),
            ..FieldSpec::new("gate", "B12")
        })
        .unwrap();
        assert_eq!(
            serde_json::to_string(&field.to_json()).unwrap(),
            r#"{"key":"gate","value":"B12","label":"Gate","changeMessage":"Gate changed to %@","textAlignment":"PKTextAlignmentCenter"}"#
        );
    }

    #[test]
    fn missing_key_or_value_is_rejected() {
        assert!(matches!(
            Field::new(FieldSpec::new("", "x")),
            Err(Error::MissingRequiredField { field }) if field == "key"
        ));
        assert!(matches!(
            Field::new(FieldSpec::new("k", "")),
            Err(Error::MissingRequiredField { .. })
        ));
    }

    #[test]
    fn enum_names_coerce_with_safe_defaults() {
        assert_eq!(Alignment::from("RIGHT"), Alignment::Right);
        assert_eq!(Alignment::from("diagonal"), Alignment::Left);
        assert_eq!(DateStyle::from("full"), DateStyle::Full);
        assert_eq!(DateStyle::from("enormous"), DateStyle::Short);
        assert_eq!(NumberStyle::from("spellout"), NumberStyle::SpellOut);
        assert_eq!(NumberStyle::from("roman"), NumberStyle::Decimal);
    }

    #[test]
    fn number_and_currency_values_become_floats() {
        let points = Field::new(FieldSpec {
            display: Some(DisplayHint::number(NumberStyle::Percent)),
            ..FieldSpec::new("points", "42")
        })
        .unwrap();
        assert_eq!(points.value(), &FieldValue::Number(42.0));
        assert_eq!(points.to_json()["numberStyle"], "PKNumberStylePercent");

        let balance = Field::new(FieldSpec {
            display: Some(DisplayHint::currency("EUR")),
            ..FieldSpec::new("balance", "12.50")
        })
        .unwrap();
        let json = balance.to_json();
        assert_eq!(json["value"], 12.5);
        assert_eq!(json["currencyCode"], "EUR");
    }

    #[test]
    fn non_numeric_number_field_is_a_validation_error() {
        let err = Field::new(FieldSpec {
            display: Some(DisplayHint::number(NumberStyle::Decimal)),
            ..FieldSpec::new("points", "many")
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn malformed_currency_code_is_rejected() {
        let err = Field::new(FieldSpec {
            display: Some(DisplayHint::currency("euro")),
            ..FieldSpec::new("balance", "1")
        })
        .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn date_field_requires_timestamp_with_offset() {
        let ok = Field::new(FieldSpec {
            display: Some(DisplayHint::date()),
            ..FieldSpec::new("departs", "2024-05-01T18:30:00+02:00")
        })
        .unwrap();
        let json = ok.to_json();
        assert_eq!(json["dateStyle"], "PKDateStyleShort");
        assert_eq!(json["isRelative"], false);

        for bad in ["tomorrow", "2024-05-01T18:30:00", "2024-05-01"] {
            let err = Field::new(FieldSpec {
                display: Some(DisplayHint::date()),
                ..FieldSpec::new("departs", bad)
            })
            .unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad} accepted");
        }
    }

    #[test]
    fn timestamp_accepts_compact_offset_and_utc() {
        assert!(parse_timestamp("2024-05-01T18:30:00.123+0200").is_ok());
        assert!(parse_timestamp("2024-05-01T16:30:00Z").is_ok());
    }
}
