//! Pass style variants and their field groups.

use super::{Field, FieldSpec, Serializable};
use crate::bundler::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Maximum number of header fields a pass may show.
pub const MAX_HEADER_FIELDS: usize = 3;

/// Kind of transport for boarding passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitType {
    #[default]
    Air,
    Train,
    Bus,
    Boat,
    Generic,
}

impl TransitType {
    pub fn as_str(self) -> &'static str {
        match self {
            TransitType::Air => "PKTransitTypeAir",
            TransitType::Train => "PKTransitTypeTrain",
            TransitType::Bus => "PKTransitTypeBus",
            TransitType::Boat => "PKTransitTypeBoat",
            TransitType::Generic => "PKTransitTypeGeneric",
        }
    }
}

/// Layout family of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Generic,
    StoreCard,
    Coupon,
    EventTicket,
    BoardingPass(TransitType),
}

impl StyleKind {
    /// Key under which the field groups nest in `pass.json`.
    pub fn json_key(self) -> &'static str {
        match self {
            StyleKind::Generic => "generic",
            StyleKind::StoreCard => "storeCard",
            StyleKind::Coupon => "coupon",
            StyleKind::EventTicket => "eventTicket",
            StyleKind::BoardingPass(_) => "boardingPass",
        }
    }
}

/// One of the five display regions of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldGroup {
    Header,
    Primary,
    Secondary,
    Back,
    Auxiliary,
}

impl FieldGroup {
    /// All groups, in wire order.
    pub const ALL: [FieldGroup; 5] = [
        FieldGroup::Header,
        FieldGroup::Primary,
        FieldGroup::Secondary,
        FieldGroup::Back,
        FieldGroup::Auxiliary,
    ];

    pub fn json_key(self) -> &'static str {
        match self {
            FieldGroup::Header => "headerFields",
            FieldGroup::Primary => "primaryFields",
            FieldGroup::Secondary => "secondaryFields",
            FieldGroup::Back => "backFields",
            FieldGroup::Auxiliary => "auxiliaryFields",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A style variant together with its ordered field groups.
///
/// # Examples
///
/// ```
/// use pkpass_bundler::bundler::model::{FieldSpec, PassStyle, TransitType};
///
/// let mut style = PassStyle::boarding_pass(TransitType::Train);
/// style.add_primary_field(FieldSpec::new("from", "Berlin")).unwrap();
/// style.add_primary_field(FieldSpec::new("to", "Hamburg")).unwrap();
/// assert_eq!(style.fields(pkpass_bundler::bundler::model::FieldGroup::Primary).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PassStyle {
    kind: StyleKind,
    groups: [Vec<Field>; 5],
}

impl PassStyle {
    pub fn new(kind: StyleKind) -> Self {
        Self {
            kind,
            groups: Default::default(),
        }
    }

    pub fn generic() -> Self {
        Self::new(StyleKind::Generic)
    }

    pub fn store_card() -> Self {
        Self::new(StyleKind::StoreCard)
    }

    pub fn coupon() -> Self {
        Self::new(StyleKind::Coupon)
    }

    pub fn event_ticket() -> Self {
        Self::new(StyleKind::EventTicket)
    }

    pub fn boarding_pass(transit_type: TransitType) -> Self {
        Self::new(StyleKind::BoardingPass(transit_type))
    }

    pub fn kind(&self) -> StyleKind {
        self.kind
    }

    pub fn fields(&self, group: FieldGroup) -> &[Field] {
        &self.groups[group.index()]
    }

    pub fn add_header_field(&mut self, spec: FieldSpec) -> Result<()> {
        self.add_field(FieldGroup::Header, spec)
    }

    pub fn add_primary_field(&mut self, spec: FieldSpec) -> Result<()> {
        self.add_field(FieldGroup::Primary, spec)
    }

    pub fn add_secondary_field(&mut self, spec: FieldSpec) -> Result<()> {
        self.add_field(FieldGroup::Secondary, spec)
    }

    pub fn add_back_field(&mut self, spec: FieldSpec) -> Result<()> {
        self.add_field(FieldGroup::Back, spec)
    }

    pub fn add_auxiliary_field(&mut self, spec: FieldSpec) -> Result<()> {
        self.add_field(FieldGroup::Auxiliary, spec)
    }

    /// Validates `spec` and appends the field to `group`.
    ///
    /// Fails when the field itself is invalid, when its key already exists in
    /// the group, or when the header group is full.
    pub fn add_field(&mut self, group: FieldGroup, spec: FieldSpec) -> Result<()> {
        let field = Field::new(spec)?;
        let fields = &mut self.groups[group.index()];

        if group == FieldGroup::Header && fields.len() >= MAX_HEADER_FIELDS {
            return Err(Error::Validation(format!(
                "at most {MAX_HEADER_FIELDS} header fields are allowed"
            )));
        }
        if fields.iter().any(|f| f.key() == field.key()) {
            return Err(Error::Validation(format!(
                "duplicate key '{}' in {}",
                field.key(),
                group.json_key()
            )));
        }

        fields.push(field);
        Ok(())
    }
}

impl Serializable for PassStyle {
    fn to_json(&self) -> Value {
        let mut map = Map::new();
        for group in FieldGroup::ALL {
            map.insert(group.json_key().into(), self.fields(group).to_json());
        }
        if let StyleKind::BoardingPass(transit_type) = self.kind {
            map.insert("transitType".into(), Value::from(transit_type.as_str()));
        }
        Value::Object(map)
    }
}
