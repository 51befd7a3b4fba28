//! Pass definitions loaded from TOML files.
//!
//! A definition describes one pass: identifiers, style, field groups,
//! barcodes, relevance triggers and appearance. It maps one-to-one onto
//! [`PassDocument`].
//!
//! ```toml
//! team_identifier = "A1B2C3D4E5"
//! pass_type_identifier = "pass.com.example.member"
//! organization_name = "Example"
//! description = "Membership card"
//!
//! [style]
//! kind = "boardingPass"
//! transit_type = "train"
//!
//! [[fields.primary]]
//! key = "from"
//! value = "Berlin"
//! ```

use crate::bundler::model::{
    Alignment, Barcode, BarcodeSpec, Beacon, BeaconSpec, DateStyle, DisplayHint, FieldGroup,
    FieldSpec, Location, LocationSpec, NearFieldPayload, NumberStyle, NumericInput, PassDocument,
    PassIdentity, PassStyle, StyleKind, TransitType, WebService, generate_serial_number,
    parse_timestamp,
};
use crate::error::{BundlerError, CliError, Result};
use serde::Deserialize;
use std::path::Path;

/// Parsed pass definition file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PassDefinition {
    pub team_identifier: String,
    pub pass_type_identifier: String,
    pub organization_name: String,
    pub description: String,
    /// Generated per pass when absent.
    pub serial_number: Option<String>,

    pub style: StyleDefinition,
    #[serde(default)]
    pub fields: FieldGroupsDefinition,

    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    pub label_color: Option<String>,
    pub logo_text: Option<String>,
    #[serde(default)]
    pub suppress_strip_shine: bool,

    pub web_service_url: Option<String>,
    pub authentication_token: Option<String>,

    pub barcode: Option<BarcodeSpec>,
    #[serde(default)]
    pub barcodes: Vec<BarcodeSpec>,
    #[serde(default)]
    pub locations: Vec<LocationSpec>,
    #[serde(default)]
    pub beacons: Vec<BeaconSpec>,
    pub relevant_date: Option<String>,
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub voided: bool,

    #[serde(default)]
    pub associated_store_identifiers: Vec<u64>,
    pub app_launch_url: Option<String>,
    pub user_info: Option<toml::Table>,
    pub nfc: Option<NearFieldPayload>,
}

/// `[style]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleDefinition {
    pub kind: StyleName,
    /// Boarding passes only; defaults to `air`.
    #[serde(default)]
    pub transit_type: Option<TransitType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleName {
    Generic,
    StoreCard,
    Coupon,
    EventTicket,
    BoardingPass,
}

/// `[fields]` table: one array per group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldGroupsDefinition {
    pub header: Vec<FieldDefinition>,
    pub primary: Vec<FieldDefinition>,
    pub secondary: Vec<FieldDefinition>,
    pub back: Vec<FieldDefinition>,
    pub auxiliary: Vec<FieldDefinition>,
}

/// Kind of a field entry; selects its display hint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Date,
    Number,
    Currency,
}

/// One `[[fields.<group>]]` entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDefinition {
    pub key: String,
    pub value: NumericInput,
    #[serde(default)]
    pub kind: FieldKind,
    pub label: Option<String>,
    pub attributed_value: Option<String>,
    pub change_message: Option<String>,
    #[serde(default)]
    pub text_alignment: Alignment,
    #[serde(default)]
    pub date_style: DateStyle,
    #[serde(default)]
    pub time_style: DateStyle,
    #[serde(default)]
    pub is_relative: bool,
    #[serde(default)]
    pub number_style: NumberStyle,
    pub currency_code: Option<String>,
}

impl FieldDefinition {
    fn into_spec(self) -> std::result::Result<FieldSpec, CliError> {
        let display = match self.kind {
            FieldKind::Text => None,
            FieldKind::Date => Some(DisplayHint::Date {
                date_style: self.date_style,
                time_style: self.time_style,
                is_relative: self.is_relative,
            }),
            FieldKind::Number => Some(DisplayHint::number(self.number_style)),
            FieldKind::Currency => Some(DisplayHint::currency(self.currency_code.ok_or_else(
                || CliError::InvalidArguments {
                    reason: format!("currency field '{}' needs a currency_code", self.key),
                },
            )?)),
        };
        let value = match self.value {
            NumericInput::Integer(i) => i.to_string(),
            // Debug keeps the decimal point, so `3.0` stays "3.0".
            NumericInput::Float(f) => format!("{f:?}"),
            NumericInput::Text(s) => s,
        };
        Ok(FieldSpec {
            key: self.key,
            value,
            label: self.label,
            attributed_value: self.attributed_value,
            change_message: self.change_message,
            text_alignment: self.text_alignment,
            display,
        })
    }
}

impl PassDefinition {
    /// Parses a definition from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a definition file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BundlerError::Cli(CliError::ExecutionFailed {
                command: "read_pass_definition".to_string(),
                reason: format!("Failed to read {}: {}", path.display(), e),
            })
        })?;
        Self::from_toml(&text)
    }

    /// Builds the validated pass document this definition describes.
    pub fn into_document(self) -> Result<PassDocument> {
        let kind = match self.style.kind {
            StyleName::Generic => StyleKind::Generic,
            StyleName::StoreCard => StyleKind::StoreCard,
            StyleName::Coupon => StyleKind::Coupon,
            StyleName::EventTicket => StyleKind::EventTicket,
            StyleName::BoardingPass => {
                StyleKind::BoardingPass(self.style.transit_type.unwrap_or_default())
            }
        };
        if self.style.transit_type.is_some() && !matches!(kind, StyleKind::BoardingPass(_)) {
            log::warn!("transit_type is ignored for {} passes", kind.json_key());
        }

        let mut style = PassStyle::new(kind);
        let groups = self.fields;
        for (group, fields) in [
            (FieldGroup::Header, groups.header),
            (FieldGroup::Primary, groups.primary),
            (FieldGroup::Secondary, groups.secondary),
            (FieldGroup::Back, groups.back),
            (FieldGroup::Auxiliary, groups.auxiliary),
        ] {
            for field in fields {
                style.add_field(group, field.into_spec()?)?;
            }
        }

        let serial_number = self
            .serial_number
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                let serial = generate_serial_number();
                log::info!("No serial_number given; generated {}", serial);
                serial
            });

        let mut document = PassDocument::new(
            PassIdentity {
                team_identifier: self.team_identifier,
                pass_type_identifier: self.pass_type_identifier,
                organization_name: self.organization_name,
                serial_number,
                description: self.description,
            },
            style,
        )?;

        document.background_color = self.background_color;
        document.foreground_color = self.foreground_color;
        document.label_color = self.label_color;
        document.logo_text = self.logo_text;
        document.suppress_strip_shine = self.suppress_strip_shine;

        document.web_service = match (self.web_service_url, self.authentication_token) {
            (Some(url), token) => Some(WebService::new(&url, token.unwrap_or_default())?),
            (None, Some(_)) => {
                return Err(CliError::InvalidArguments {
                    reason: "authentication_token given without web_service_url".to_string(),
                }
                .into());
            }
            (None, None) => None,
        };

        document.barcode = self.barcode.map(Barcode::new).transpose()?;
        document.barcodes = self
            .barcodes
            .into_iter()
            .map(Barcode::new)
            .collect::<crate::bundler::Result<_>>()?;
        for location in self.locations {
            document.add_location(Location::new(location))?;
        }
        document.beacons = self
            .beacons
            .into_iter()
            .map(Beacon::new)
            .collect::<crate::bundler::Result<_>>()?;

        document.relevant_date = self.relevant_date.as_deref().map(parse_timestamp).transpose()?;
        document.expiration_date = self
            .expiration_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()?;
        document.voided = self.voided;

        document.associated_store_identifiers = self.associated_store_identifiers;
        document.app_launch_url = self.app_launch_url;
        document.user_info = self.user_info.map(serde_json::to_value).transpose()?;
        if let Some(nfc) = &self.nfc {
            nfc.validate()?;
        }
        document.nfc = self.nfc;

        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARDING: &str = r#"
        team_identifier = "T1"
        pass_type_identifier = "pass.com.example.rail"
        organization_name = "Rail"
        description = "Ticket"
        serial_number = "R-1"
        background_color = "rgb(0, 0, 0)"
        relevant_date = "2024-05-01T18:30:00+02:00"

        [style]
        kind = "boardingPass"
        transit_type = "train"

        [[fields.primary]]
        key = "from"
        value = "Berlin"

        [[fields.auxiliary]]
        key = "departs"
        value = "2024-05-01T18:30:00+02:00"
        kind = "date"
        time_style = "long"

        [[fields.back]]
        key = "price"
        value = 49.9
        kind = "currency"
        currency_code = "EUR"

        [barcode]
        format = "aztec"
        message = "R-1"

        [[locations]]
        latitude = 52.525
        longitude = "13.369"
        relevant_text = "Berlin Hbf"

        [user_info]
        coach = 7
    "#;

    #[test]
    fn boarding_pass_definition_maps_to_document() {
        let document = PassDefinition::from_toml(BOARDING)
            .unwrap()
            .into_document()
            .unwrap();
        let json = document.to_document().unwrap();

        assert_eq!(json["boardingPass"]["transitType"], "PKTransitTypeTrain");
        assert_eq!(json["boardingPass"]["primaryFields"][0]["value"], "Berlin");
        assert_eq!(
            json["boardingPass"]["auxiliaryFields"][0]["timeStyle"],
            "PKDateStyleLong"
        );
        assert_eq!(json["boardingPass"]["backFields"][0]["value"], 49.9);
        assert_eq!(json["barcode"]["format"], "PKBarcodeFormatAztec");
        assert_eq!(json["locations"][0]["longitude"], 13.369);
        assert_eq!(json["relevantDate"], "2024-05-01T18:30:00+02:00");
        assert_eq!(json["userInfo"]["coach"], 7);
    }

    #[test]
    fn float_text_values_keep_their_decimal_point() {
        let text = r#"
            team_identifier = "T1"
            pass_type_identifier = "P1"
            organization_name = "Org"
            description = "d"
            serial_number = "S1"
            [style]
            kind = "generic"
            [[fields.primary]]
            key = "version"
            value = 3.0
            [[fields.secondary]]
            key = "rating"
            value = 4.25
        "#;
        let json = PassDefinition::from_toml(text)
            .unwrap()
            .into_document()
            .unwrap()
            .to_document()
            .unwrap();
        assert_eq!(json["generic"]["primaryFields"][0]["value"], "3.0");
        assert_eq!(json["generic"]["secondaryFields"][0]["value"], "4.25");
    }

    #[test]
    fn missing_serial_number_is_generated_per_pass() {
        let text = r#"
            team_identifier = "T1"
            pass_type_identifier = "P1"
            organization_name = "Org"
            description = "d"
            [style]
            kind = "generic"
        "#;
        let first = PassDefinition::from_toml(text).unwrap().into_document().unwrap();
        let second = PassDefinition::from_toml(text).unwrap().into_document().unwrap();
        assert!(!first.serial_number().is_empty());
        assert_ne!(first.serial_number(), second.serial_number());
    }

    #[test]
    fn insecure_web_service_is_rejected() {
        let text = r#"
            team_identifier = "T1"
            pass_type_identifier = "P1"
            organization_name = "Org"
            description = "d"
            serial_number = "S1"
            web_service_url = "http://example.com"
            authentication_token = "0123456789abcdef"
            [style]
            kind = "coupon"
        "#;
        let err = PassDefinition::from_toml(text)
            .unwrap()
            .into_document()
            .unwrap_err();
        assert!(matches!(
            err,
            BundlerError::Bundler(crate::bundler::Error::Validation(_))
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let text = r#"
            team_identifier = "T1"
            pass_type_identifier = "P1"
            organization_name = "Org"
            description = "d"
            colour = "red"
            [style]
            kind = "coupon"
        "#;
        assert!(matches!(
            PassDefinition::from_toml(text),
            Err(BundlerError::Toml(_))
        ));
    }
}
