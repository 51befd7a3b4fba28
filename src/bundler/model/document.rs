//! The top-level pass document and its canonical JSON encoding.

use super::{Barcode, Beacon, Location, NearFieldPayload, PassStyle, Serializable, insert_opt};
use crate::bundler::{Error, Result};
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

/// Value of the `formatVersion` key.
pub const FORMAT_VERSION: u32 = 1;

/// Maximum number of locations a pass may carry.
pub const MAX_LOCATIONS: usize = 9;

/// Keys that must be present in the final document.
const REQUIRED_KEYS: [&str; 6] = [
    "description",
    "formatVersion",
    "organizationName",
    "passTypeIdentifier",
    "serialNumber",
    "teamIdentifier",
];

/// Returns a new random serial number.
///
/// Every call yields a fresh value; passes never share a default serial.
pub fn generate_serial_number() -> String {
    Uuid::new_v4().to_string()
}

/// Identifiers every pass must carry.
#[derive(Debug, Clone, Default)]
pub struct PassIdentity {
    /// Team identifier of the signing organization, as issued by Apple.
    pub team_identifier: String,
    /// Pass type identifier; must match the signing certificate.
    pub pass_type_identifier: String,
    /// Display name of the issuing organization.
    pub organization_name: String,
    /// Unique per pass (together with the pass type identifier).
    pub serial_number: String,
    /// Accessibility description of the pass.
    pub description: String,
}

/// Update web service endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WebService {
    /// As given; Wallet appends `/v1/...` to this text.
    url: String,
    authentication_token: String,
}

impl WebService {
    /// Fails unless `url` parses, uses `https`, and a token is given.
    ///
    /// The URL is emitted exactly as given, without normalization.
    pub fn new(url: &str, authentication_token: impl Into<String>) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::Validation(format!("webServiceURL '{url}' is invalid: {e}")))?;
        if parsed.scheme() != "https" {
            return Err(Error::Validation(format!(
                "webServiceURL must use https, got '{}'",
                parsed.scheme()
            )));
        }
        let authentication_token = authentication_token.into();
        if authentication_token.is_empty() {
            return Err(Error::missing("authenticationToken"));
        }
        Ok(Self {
            url: url.to_string(),
            authentication_token,
        })
    }
}

/// Everything that goes into `pass.json`.
///
/// Identifiers are fixed at construction; optional keys are public and may
/// be set freely. Validation that spans several keys runs in
/// [`PassDocument::to_json_bytes`].
#[derive(Debug, Clone)]
pub struct PassDocument {
    identity: PassIdentity,
    style: PassStyle,

    pub background_color: Option<String>,
    pub foreground_color: Option<String>,
    pub label_color: Option<String>,
    pub logo_text: Option<String>,
    pub suppress_strip_shine: bool,

    pub web_service: Option<WebService>,

    /// Primary barcode (the legacy single-barcode key).
    pub barcode: Option<Barcode>,
    pub barcodes: Vec<Barcode>,
    pub locations: Vec<Location>,
    pub beacons: Vec<Beacon>,
    pub relevant_date: Option<DateTime<FixedOffset>>,
    pub expiration_date: Option<DateTime<FixedOffset>>,
    pub voided: bool,

    /// App Store identifiers of associated apps.
    pub associated_store_identifiers: Vec<u64>,
    pub app_launch_url: Option<String>,
    /// Opaque data for companion apps.
    pub user_info: Option<Value>,
    pub nfc: Option<NearFieldPayload>,
}

impl PassDocument {
    /// Creates a document; team, pass type and organization must be
    /// non-empty. Serial number and description are checked at
    /// serialization time.
    pub fn new(identity: PassIdentity, style: PassStyle) -> Result<Self> {
        for (key, value) in [
            ("teamIdentifier", &identity.team_identifier),
            ("passTypeIdentifier", &identity.pass_type_identifier),
            ("organizationName", &identity.organization_name),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing(key));
            }
        }

        Ok(Self {
            identity,
            style,
            background_color: None,
            foreground_color: None,
            label_color: None,
            logo_text: None,
            suppress_strip_shine: false,
            web_service: None,
            barcode: None,
            barcodes: Vec::new(),
            locations: Vec::new(),
            beacons: Vec::new(),
            relevant_date: None,
            expiration_date: None,
            voided: false,
            associated_store_identifiers: Vec::new(),
            app_launch_url: None,
            user_info: None,
            nfc: None,
        })
    }

    pub fn identity(&self) -> &PassIdentity {
        &self.identity
    }

    pub fn serial_number(&self) -> &str {
        &self.identity.serial_number
    }

    pub fn set_serial_number(&mut self, serial_number: impl Into<String>) {
        self.identity.serial_number = serial_number.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.identity.description = description.into();
    }

    pub fn style(&self) -> &PassStyle {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut PassStyle {
        &mut self.style
    }

    /// Appends a location, enforcing [`MAX_LOCATIONS`].
    pub fn add_location(&mut self, location: Location) -> Result<()> {
        if self.locations.len() >= MAX_LOCATIONS {
            return Err(too_many_locations(self.locations.len() + 1));
        }
        self.locations.push(location);
        Ok(())
    }

    /// Assembles and validates the document as a JSON value.
    ///
    /// Key order: the style key, the identifier keys, the remaining scalar
    /// keys, then `barcode`, `barcodes`, `locations`, `beacons`, `nfc`.
    /// Empty and false values are left out.
    pub fn to_document(&self) -> Result<Value> {
        if self.locations.len() > MAX_LOCATIONS {
            return Err(too_many_locations(self.locations.len()));
        }

        let mut data = Map::new();
        data.insert(self.style.kind().json_key().into(), self.style.to_json());

        let identity = &self.identity;
        insert_non_empty(&mut data, "description", &identity.description);
        data.insert("formatVersion".into(), Value::from(FORMAT_VERSION));
        insert_non_empty(&mut data, "organizationName", &identity.organization_name);
        insert_non_empty(&mut data, "passTypeIdentifier", &identity.pass_type_identifier);
        insert_non_empty(&mut data, "serialNumber", &identity.serial_number);
        insert_non_empty(&mut data, "teamIdentifier", &identity.team_identifier);

        if self.suppress_strip_shine {
            data.insert("suppressStripShine".into(), Value::Bool(true));
        }
        if let Some(date) = &self.relevant_date {
            data.insert("relevantDate".into(), Value::from(date.to_rfc3339()));
        }
        insert_opt_non_empty(&mut data, "backgroundColor", self.background_color.as_deref());
        insert_opt_non_empty(&mut data, "foregroundColor", self.foreground_color.as_deref());
        insert_opt_non_empty(&mut data, "labelColor", self.label_color.as_deref());
        insert_opt_non_empty(&mut data, "logoText", self.logo_text.as_deref());
        if let Some(user_info) = self.user_info.as_ref().filter(|v| is_truthy(v)) {
            data.insert("userInfo".into(), user_info.clone());
        }
        if self.voided {
            data.insert("voided".into(), Value::Bool(true));
        }
        if !self.associated_store_identifiers.is_empty() {
            data.insert(
                "associatedStoreIdentifiers".into(),
                Value::from(self.associated_store_identifiers.clone()),
            );
        }
        insert_opt_non_empty(&mut data, "appLaunchURL", self.app_launch_url.as_deref());
        if let Some(date) = &self.expiration_date {
            data.insert("expirationDate".into(), Value::from(date.to_rfc3339()));
        }
        if let Some(service) = &self.web_service {
            data.insert("webServiceURL".into(), Value::from(service.url.as_str()));
            insert_opt(
                &mut data,
                "authenticationToken",
                Some(service.authentication_token.as_str()),
            );
        }

        if let Some(barcode) = &self.barcode {
            data.insert("barcode".into(), barcode.to_json());
        }
        if !self.barcodes.is_empty() {
            data.insert("barcodes".into(), self.barcodes.to_json());
        }
        if !self.locations.is_empty() {
            data.insert("locations".into(), self.locations.to_json());
        }
        if !self.beacons.is_empty() {
            data.insert("beacons".into(), self.beacons.to_json());
        }
        if let Some(nfc) = &self.nfc {
            data.insert("nfc".into(), nfc.to_json());
        }

        for key in REQUIRED_KEYS {
            if !data.contains_key(key) {
                return Err(Error::missing(key));
            }
        }

        Ok(Value::Object(data))
    }

    /// Canonical `pass.json` bytes: compact UTF-8 JSON in the key order of
    /// [`PassDocument::to_document`].
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        let document = self.to_document()?;
        Ok(serde_json::to_vec(&document)?)
    }
}

fn too_many_locations(count: usize) -> Error {
    Error::Validation(format!(
        "a pass may have at most {MAX_LOCATIONS} locations, got {count}"
    ))
}

fn insert_non_empty(map: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key.to_string(), Value::from(value));
    }
}

fn insert_opt_non_empty(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    insert_opt(map, key, value.filter(|v| !v.is_empty()));
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::model::{BarcodeSpec, FieldSpec};

    fn identity() -> PassIdentity {
        PassIdentity {
            team_identifier: "T1".into(),
            pass_type_identifier: "P1".into(),
            organization_name: "Org".into(),
            serial_number: "S1".into(),
            description: "d".into(),
        }
    }

    #[test]
    fn minimal_store_card_is_canonical() {
        let document = PassDocument::new(identity(), PassStyle::store_card()).unwrap();
        assert_eq!(
            String::from_utf8(document.to_json_bytes().unwrap()).unwrap(),
            r#"{"storeCard":{"headerFields":[],"primaryFields":[],"secondaryFields":[],"backFields":[],"auxiliaryFields":[]},"description":"d","formatVersion":1,"organizationName":"Org","passTypeIdentifier":"P1","serialNumber":"S1","teamIdentifier":"T1"}"#
        );
    }

    #[test]
    fn optional_keys_follow_identifiers_in_fixed_order() {
        let mut document = PassDocument::new(identity(), PassStyle::store_card()).unwrap();
        document.logo_text = Some("Sharks".into());
        document.background_color = Some("rgb(38, 93, 205)".into());
        document.foreground_color = Some("rgb(255, 255, 255)".into());
        document.label_color = Some("rgb(189, 189, 189)".into());

        let keys: Vec<String> = match document.to_document().unwrap() {
            Value::Object(map) => map.keys().cloned().collect(),
            other => panic!("unexpected {other}"),
        };
        assert_eq!(
            keys,
            [
                "storeCard",
                "description",
                "formatVersion",
                "organizationName",
                "passTypeIdentifier",
                "serialNumber",
                "teamIdentifier",
                "backgroundColor",
                "foregroundColor",
                "labelColor",
                "logoText",
            ]
        );
    }

    #[test]
    fn serialization_is_deterministic() {
        let mut document = PassDocument::new(identity(), PassStyle::generic()).unwrap();
        document.style_mut().add_primary_field(FieldSpec::new("name", "Jane")).unwrap();
        document.barcodes.push(Barcode::new(BarcodeSpec::new("qr", "x")).unwrap());
        document.user_info = Some(serde_json::json!({"tier": "gold", "since": 2019}));
        assert_eq!(
            document.to_json_bytes().unwrap(),
            document.to_json_bytes().unwrap()
        );
    }

    #[test]
    fn missing_serial_number_fails_until_supplied() {
        let mut document = PassDocument::new(
            PassIdentity {
                serial_number: String::new(),
                ..identity()
            },
            PassStyle::coupon(),
        )
        .unwrap();
        assert!(matches!(
            document.to_json_bytes(),
            Err(Error::MissingRequiredField { field }) if field == "serialNumber"
        ));

        document.set_serial_number("S2");
        assert!(document.to_json_bytes().is_ok());
    }

    #[test]
    fn missing_description_fails() {
        let document = PassDocument::new(
            PassIdentity {
                description: String::new(),
                ..identity()
            },
            PassStyle::coupon(),
        )
        .unwrap();
        assert!(matches!(
            document.to_document(),
            Err(Error::MissingRequiredField { field }) if field == "description"
        ));
    }

    #[test]
    fn empty_team_identifier_fails_at_construction() {
        let err = PassDocument::new(
            PassIdentity {
                team_identifier: " ".into(),
                ..identity()
            },
            PassStyle::generic(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField { field } if field == "teamIdentifier"));
    }

    #[test]
    fn location_bound_is_enforced() {
        let mut document = PassDocument::new(identity(), PassStyle::generic()).unwrap();
        for i in 0..MAX_LOCATIONS {
            document.add_location(Location::at(i as f64, 0.0)).unwrap();
        }
        assert!(document.to_document().is_ok());
        assert!(document.add_location(Location::at(0.0, 0.0)).is_err());

        document.locations.push(Location::at(0.0, 0.0));
        assert!(matches!(document.to_document(), Err(Error::Validation(_))));
    }

    #[test]
    fn web_service_requires_https_and_token() {
        assert!(WebService::new("http://example.com/passes", "0123456789abcdef").is_err());
        assert!(WebService::new("https://example.com/passes", "").is_err());
        assert!(WebService::new("not a url", "0123456789abcdef").is_err());

        let mut document = PassDocument::new(identity(), PassStyle::generic()).unwrap();
        document.web_service =
            Some(WebService::new("https://example.com/passes/", "0123456789abcdef").unwrap());
        let json = document.to_document().unwrap();
        assert_eq!(json["webServiceURL"], "https://example.com/passes/");
        assert_eq!(json["authenticationToken"], "0123456789abcdef");
    }

    #[test]
    fn web_service_url_is_emitted_verbatim() {
        let mut document = PassDocument::new(identity(), PassStyle::generic()).unwrap();
        document.web_service =
            Some(WebService::new("https://Example.com", "0123456789abcdef").unwrap());
        let json = document.to_document().unwrap();
        assert_eq!(json["webServiceURL"], "https://Example.com");
    }

    #[test]
    fn falsy_optionals_are_omitted() {
        let mut document = PassDocument::new(identity(), PassStyle::generic()).unwrap();
        document.logo_text = Some(String::new());
        document.user_info = Some(serde_json::json!({}));
        document.voided = false;
        let json = document.to_document().unwrap();
        assert!(json.get("logoText").is_none());
        assert!(json.get("userInfo").is_none());
        assert!(json.get("voided").is_none());

        document.voided = true;
        assert_eq!(document.to_document().unwrap()["voided"], true);
    }

    #[test]
    fn generated_serial_numbers_are_fresh() {
        assert_ne!(generate_serial_number(), generate_serial_number());
    }
}
