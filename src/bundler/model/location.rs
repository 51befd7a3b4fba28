//! Relevance triggers: geographic locations and iBeacons.

use super::{NumericInput, Serializable, float};
use crate::bundler::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Construction parameters for a [`Location`].
///
/// Coordinates accept anything numeric-looking; missing or non-numeric
/// coordinates become `0.0`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LocationSpec {
    pub latitude: Option<NumericInput>,
    pub longitude: Option<NumericInput>,
    pub altitude: Option<NumericInput>,
    /// Maximum distance in meters from the location.
    pub distance: Option<f64>,
    pub relevant_text: String,
}

/// A point where the pass becomes relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    distance: Option<f64>,
    relevant_text: String,
}

impl Location {
    pub fn new(spec: LocationSpec) -> Self {
        let coordinate =
            |input: &Option<NumericInput>| input.as_ref().and_then(NumericInput::as_f64).unwrap_or(0.0);
        Self {
            latitude: coordinate(&spec.latitude),
            longitude: coordinate(&spec.longitude),
            altitude: coordinate(&spec.altitude),
            distance: spec.distance.filter(|d| d.is_finite()),
            relevant_text: spec.relevant_text,
        }
    }

    /// Location at the given coordinates with no altitude or text.
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::new(LocationSpec {
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
            ..Default::default()
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}

impl Serializable for Location {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("latitude".into(), float(self.latitude));
        map.insert("longitude".into(), float(self.longitude));
        map.insert("altitude".into(), float(self.altitude));
        if let Some(distance) = self.distance {
            map.insert("distance".into(), float(distance));
        }
        map.insert("relevantText".into(), Value::from(self.relevant_text.as_str()));
        Value::Object(map)
    }
}

/// Construction parameters for a [`Beacon`].
#[derive(Debug, Clone, Deserialize)]
pub struct BeaconSpec {
    pub proximity_uuid: String,
    pub major: u16,
    pub minor: u16,
    #[serde(default)]
    pub relevant_text: String,
}

/// An iBeacon near which the pass becomes relevant.
#[derive(Debug, Clone, PartialEq)]
pub struct Beacon {
    proximity_uuid: String,
    major: u16,
    minor: u16,
    relevant_text: String,
}

impl Beacon {
    /// Fails when the proximity UUID is empty or not a UUID.
    pub fn new(spec: BeaconSpec) -> Result<Self> {
        if spec.proximity_uuid.trim().is_empty() {
            return Err(Error::missing("beacon.proximityUUID"));
        }
        Uuid::parse_str(spec.proximity_uuid.trim()).map_err(|e| {
            Error::Validation(format!(
                "beacon proximityUUID '{}' is not a UUID: {e}",
                spec.proximity_uuid
            ))
        })?;
        Ok(Self {
            proximity_uuid: spec.proximity_uuid.trim().to_string(),
            major: spec.major,
            minor: spec.minor,
            relevant_text: spec.relevant_text,
        })
    }
}

impl Serializable for Beacon {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(
            "proximityUUID".into(),
            Value::from(self.proximity_uuid.as_str()),
        );
        map.insert("major".into(), Value::from(self.major));
        map.insert("minor".into(), Value::from(self.minor));
        map.insert("relevantText".into(), Value::from(self.relevant_text.as_str()));
        Value::Object(map)
    }
}
