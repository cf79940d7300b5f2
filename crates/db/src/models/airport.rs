//! Airport entity model.

use flightclock_core::airport::{render_number, AirportField, AirportPatch, FieldValue, FieldValues};
use flightclock_core::error::CoreError;
use flightclock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `airports` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Airport {
    pub id: DbId,
    pub iata: String,
    pub icao: Option<String>,
    pub name: String,
    pub city: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Airport {
    /// An unsaved airport with only its code set. Used as the starting point
    /// for creation; `id` is assigned by the database on insert.
    pub fn draft(iata: String, now: Timestamp) -> Self {
        Self {
            id: 0,
            iata,
            icao: None,
            name: String::new(),
            city: String::new(),
            country: String::new(),
            lat: None,
            lon: None,
            timezone: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy every field assigned by `patch` onto this row.
    pub fn apply_patch(&mut self, patch: &AirportPatch) -> Result<(), CoreError> {
        for (field, value) in patch.iter() {
            match field {
                AirportField::Name => self.name = value.clone().unwrap_or_default(),
                AirportField::City => self.city = value.clone().unwrap_or_default(),
                AirportField::Country => self.country = value.clone().unwrap_or_default(),
                AirportField::Timezone => self.timezone = value.clone().unwrap_or_default(),
                AirportField::Icao => self.icao = value.clone(),
                AirportField::Lat => self.lat = parse_coordinate(field, value)?,
                AirportField::Lon => self.lon = parse_coordinate(field, value)?,
            }
        }
        Ok(())
    }
}

fn parse_coordinate(field: AirportField, value: &FieldValue) -> Result<Option<f64>, CoreError> {
    value
        .as_deref()
        .map(|text| {
            text.parse::<f64>().map_err(|_| {
                CoreError::Validation(format!("Field '{field}' must be a number, got '{text}'"))
            })
        })
        .transpose()
}

impl FieldValues for Airport {
    fn field_value(&self, field: AirportField) -> FieldValue {
        match field {
            AirportField::Name => Some(self.name.clone()),
            AirportField::City => Some(self.city.clone()),
            AirportField::Country => Some(self.country.clone()),
            AirportField::Timezone => Some(self.timezone.clone()),
            AirportField::Icao => self.icao.clone(),
            AirportField::Lat => self.lat.map(render_number),
            AirportField::Lon => self.lon.map(render_number),
        }
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// One page of the admin airport listing.
#[derive(Debug, Clone, Serialize)]
pub struct AirportPage {
    pub items: Vec<Airport>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

/// Timezone lookup result.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AirportTimezone {
    pub iata: String,
    pub timezone: String,
}
