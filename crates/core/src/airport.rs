//! Airport reference data: code validation, the editable field allow-list,
//! field-level diffing and typed patches.
//!
//! Field values travel through the system in their *canonical* text form
//! (`Option<String>`): that is what gets compared during diffing and what is
//! written into audit rows. Numeric fields are rendered with Rust's shortest
//! round-trip formatting, so `51.0` and `"51"` compare equal.

use std::collections::BTreeMap;
use std::fmt;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::error::CoreError;

/// Length of an IATA location identifier.
pub const IATA_LEN: usize = 3;

/// Minimum and maximum ICAO code length accepted for the secondary code.
pub const ICAO_MIN_LEN: usize = 3;
pub const ICAO_MAX_LEN: usize = 4;

// ---------------------------------------------------------------------------
// Code and value validation
// ---------------------------------------------------------------------------

/// Returns `true` if `code` is exactly three ASCII alphanumerics.
pub fn is_valid_iata(code: &str) -> bool {
    code.len() == IATA_LEN && code.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Trim and upper-case an IATA code, rejecting anything that is not three
/// ASCII alphanumerics.
pub fn normalize_iata(raw: &str) -> Result<String, CoreError> {
    let code = raw.trim().to_ascii_uppercase();
    if is_valid_iata(&code) {
        Ok(code)
    } else {
        Err(CoreError::Validation("Invalid IATA".into()))
    }
}

/// Normalize an optional ICAO code. Blank input means "no code".
pub fn normalize_icao(raw: &str) -> Result<Option<String>, CoreError> {
    let code = raw.trim().to_ascii_uppercase();
    if code.is_empty() {
        return Ok(None);
    }
    let len_ok = (ICAO_MIN_LEN..=ICAO_MAX_LEN).contains(&code.len());
    if len_ok && code.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(Some(code))
    } else {
        Err(CoreError::Validation(format!(
            "Invalid ICAO code '{raw}'. Expected {ICAO_MIN_LEN}-{ICAO_MAX_LEN} letters or digits"
        )))
    }
}

/// Parse an IANA timezone name (e.g. `Asia/Singapore`).
pub fn validate_timezone(name: &str) -> Result<Tz, CoreError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| CoreError::Validation(format!("Unknown IANA timezone '{name}'")))
}

/// Latitude must lie within `-90..=90`.
pub fn validate_latitude(lat: f64) -> Result<(), CoreError> {
    if lat.is_finite() && (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Latitude {lat} is out of range (-90 to 90)"
        )))
    }
}

/// Longitude must lie within `-180..=180`.
pub fn validate_longitude(lon: f64) -> Result<(), CoreError> {
    if lon.is_finite() && (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Longitude {lon} is out of range (-180 to 180)"
        )))
    }
}

/// Canonical text rendering of a coordinate.
pub fn render_number(value: f64) -> String {
    value.to_string()
}

// ---------------------------------------------------------------------------
// Editable fields
// ---------------------------------------------------------------------------

/// The allow-list of airport fields that edits, rollbacks and restores may
/// touch. The IATA code itself is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportField {
    Name,
    City,
    Country,
    Timezone,
    Icao,
    Lat,
    Lon,
}

impl AirportField {
    /// Every editable field, in display order.
    pub const ALL: [AirportField; 7] = [
        Self::Name,
        Self::City,
        Self::Country,
        Self::Timezone,
        Self::Icao,
        Self::Lat,
        Self::Lon,
    ];

    /// Column / JSON key name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::City => "city",
            Self::Country => "country",
            Self::Timezone => "timezone",
            Self::Icao => "icao",
            Self::Lat => "lat",
            Self::Lon => "lon",
        }
    }

    /// Look up a field by its column name. Returns `None` for anything
    /// outside the allow-list (including `iata`).
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Lat | Self::Lon)
    }

    /// Validate and canonicalize a raw value for this field.
    pub fn canonicalize(&self, raw: FieldValue) -> Result<FieldValue, CoreError> {
        match self {
            Self::Name | Self::City | Self::Country => match raw {
                Some(text) => Ok(Some(text.trim().to_string())),
                None => Err(CoreError::Validation(format!(
                    "Field '{}' cannot be null",
                    self.as_str()
                ))),
            },
            Self::Timezone => match raw {
                Some(text) => Ok(Some(validate_timezone(&text)?.name().to_string())),
                None => Err(CoreError::Validation(
                    "Field 'timezone' cannot be null".into(),
                )),
            },
            Self::Icao => match raw {
                Some(text) => normalize_icao(&text),
                None => Ok(None),
            },
            Self::Lat | Self::Lon => {
                let Some(text) = raw.filter(|t| !t.trim().is_empty()) else {
                    return Ok(None);
                };
                let value: f64 = text.trim().parse().map_err(|_| {
                    CoreError::Validation(format!(
                        "Field '{}' must be a number, got '{text}'",
                        self.as_str()
                    ))
                })?;
                if *self == Self::Lat {
                    validate_latitude(value)?;
                } else {
                    validate_longitude(value)?;
                }
                Ok(Some(render_number(value)))
            }
        }
    }
}

impl fmt::Display for AirportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical text value of a single field. `None` is SQL NULL.
pub type FieldValue = Option<String>;

/// Anything that can report the canonical value of each editable field.
///
/// Implemented by the persisted airport row and by [`Blank`], which stands in
/// for the "before" side when an airport is first created.
pub trait FieldValues {
    fn field_value(&self, field: AirportField) -> FieldValue;
}

/// An airport with every field unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blank;

impl FieldValues for Blank {
    fn field_value(&self, _field: AirportField) -> FieldValue {
        None
    }
}

// ---------------------------------------------------------------------------
// Field-level diff
// ---------------------------------------------------------------------------

/// One field whose canonical value differs between two states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: AirportField,
    pub old_value: FieldValue,
    pub new_value: FieldValue,
}

/// Compare `before` and `after` over `fields`, emitting a change only where
/// the canonical values differ.
pub fn diff_fields<B, A, I>(before: &B, after: &A, fields: I) -> Vec<FieldChange>
where
    B: FieldValues + ?Sized,
    A: FieldValues + ?Sized,
    I: IntoIterator<Item = AirportField>,
{
    fields
        .into_iter()
        .filter_map(|field| {
            let old_value = before.field_value(field);
            let new_value = after.field_value(field);
            (old_value != new_value).then_some(FieldChange {
                field,
                old_value,
                new_value,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Patch
// ---------------------------------------------------------------------------

/// A set of canonical field assignments to apply to one airport.
///
/// Every value stored in a patch has already passed
/// [`AirportField::canonicalize`], so applying it cannot produce an invalid row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AirportPatch {
    values: BTreeMap<AirportField, FieldValue>,
}

impl AirportPatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate, canonicalize and store `raw` for `field`, replacing any
    /// earlier assignment.
    pub fn set(&mut self, field: AirportField, raw: FieldValue) -> Result<&mut Self, CoreError> {
        let value = field.canonicalize(raw)?;
        self.values.insert(field, value);
        Ok(self)
    }

    /// Store `raw` only if the field has no assignment yet. Returns whether
    /// the value was taken.
    pub fn set_if_absent(&mut self, field: AirportField, raw: FieldValue) -> Result<bool, CoreError> {
        if self.values.contains_key(&field) {
            return Ok(false);
        }
        self.set(field, raw)?;
        Ok(true)
    }

    pub fn get(&self, field: AirportField) -> Option<&FieldValue> {
        self.values.get(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AirportField, &FieldValue)> {
        self.values.iter().map(|(f, v)| (*f, v))
    }

    /// Build a patch from a JSON object, keeping only allow-listed keys.
    ///
    /// Text fields accept strings or null. Numeric fields additionally accept
    /// numbers and numeric strings. Any other JSON type is rejected.
    pub fn from_json(map: &Map<String, Value>) -> Result<Self, CoreError> {
        let mut patch = Self::new();
        for (key, value) in map {
            let Some(field) = AirportField::parse(key) else {
                continue;
            };
            let raw = match value {
                Value::Null => None,
                Value::String(text) => Some(text.clone()),
                Value::Number(n) if field.is_numeric() => Some(n.to_string()),
                _ => {
                    return Err(CoreError::Validation(format!(
                        "Field '{key}' has an unsupported value type"
                    )))
                }
            };
            patch.set(field, raw)?;
        }
        Ok(patch)
    }
}

impl FieldValues for AirportPatch {
    /// Reports only the patched value; unpatched fields read as unset.
    fn field_value(&self, field: AirportField) -> FieldValue {
        self.values.get(&field).cloned().flatten()
    }
}

// ---------------------------------------------------------------------------
// Creation input
// ---------------------------------------------------------------------------

/// A coordinate as sent by a client: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Coordinate {
    Number(f64),
    Text(String),
}

impl Coordinate {
    fn into_raw(self) -> String {
        match self {
            Self::Number(n) => render_number(n),
            Self::Text(text) => text,
        }
    }
}

/// Request body for creating a new airport.
///
/// Codes and coordinates are checked by [`normalize_iata`] and
/// [`AirportField::canonicalize`], the same path an edit takes, so create
/// and edit accept the same inputs.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAirport {
    pub iata: String,
    pub icao: Option<String>,
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    pub lat: Option<Coordinate>,
    pub lon: Option<Coordinate>,
    pub timezone: String,
}

impl NewAirport {
    /// Validate the input and split it into the normalized IATA code and a
    /// patch assigning every editable field.
    pub fn into_parts(self) -> Result<(String, AirportPatch), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        let iata = normalize_iata(&self.iata)?;

        let mut patch = AirportPatch::new();
        patch.set(AirportField::Name, Some(self.name))?;
        patch.set(AirportField::City, Some(self.city))?;
        patch.set(AirportField::Country, Some(self.country))?;
        patch.set(AirportField::Timezone, Some(self.timezone))?;
        patch.set(AirportField::Icao, self.icao)?;
        patch.set(AirportField::Lat, self.lat.map(Coordinate::into_raw))?;
        patch.set(AirportField::Lon, self.lon.map(Coordinate::into_raw))?;
        Ok((iata, patch))
    }
}
