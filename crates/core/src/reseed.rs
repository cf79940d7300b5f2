//! Reseed input normalization and chunk planning.
//!
//! A reseed replays an external airport list into the database in fixed-size
//! chunks so that each HTTP request stays short. The caller polls with the
//! returned `next_offset` until `done` is reported.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::airport::{is_valid_iata, normalize_icao, validate_latitude, validate_longitude, validate_timezone};

/// Default number of rows written per reseed request.
pub const DEFAULT_CHUNK_SIZE: i64 = 500;

/// Upper bound on rows written per reseed request.
pub const MAX_CHUNK_SIZE: i64 = 2_000;

/// One airport as found in the source data file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SourceAirport {
    #[serde(default)]
    pub iata: Option<String>,
    #[serde(default)]
    pub icao: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default, alias = "tz")]
    pub timezone: Option<String>,
}

/// A source row that passed normalization and is ready to upsert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedAirport {
    pub iata: String,
    pub icao: Option<String>,
    pub name: String,
    pub city: String,
    pub country: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: String,
}

fn normalize_row(row: SourceAirport) -> Option<SeedAirport> {
    let iata = row.iata?.trim().to_ascii_uppercase();
    if !is_valid_iata(&iata) {
        return None;
    }

    let timezone = validate_timezone(row.timezone.as_deref()?).ok()?.name().to_string();

    // Over-long codes are truncated rather than dropped; the source mixes
    // ICAO and local identifiers.
    let icao = row
        .icao
        .map(|c| c.trim().chars().take(4).collect::<String>())
        .and_then(|c| normalize_icao(&c).ok().flatten());

    if row.lat.is_some_and(|lat| validate_latitude(lat).is_err())
        || row.lon.is_some_and(|lon| validate_longitude(lon).is_err())
    {
        return None;
    }

    Some(SeedAirport {
        iata,
        icao,
        name: row.name.unwrap_or_default().trim().to_string(),
        city: row.city.unwrap_or_default().trim().to_string(),
        country: row.country.unwrap_or_default().trim().to_string(),
        lat: row.lat,
        lon: row.lon,
        timezone,
    })
}

/// Clean up raw source rows.
///
/// Drops rows without a three-character IATA code, without a valid IANA
/// zone, or with out-of-range coordinates. Keeps the first row per IATA code
/// and returns the result sorted by code so chunk offsets are stable across
/// requests.
pub fn normalize_rows(rows: Vec<SourceAirport>) -> Vec<SeedAirport> {
    let mut seen = HashSet::new();
    let mut out: Vec<SeedAirport> = rows
        .into_iter()
        .filter_map(normalize_row)
        .filter(|row| seen.insert(row.iata.clone()))
        .collect();
    out.sort_by(|a, b| a.iata.cmp(&b.iata));
    out
}

/// Clamp a requested chunk size to `1..=MAX_CHUNK_SIZE`.
pub fn clamp_chunk_size(requested: Option<i64>, default: i64) -> i64 {
    requested.unwrap_or(default).clamp(1, MAX_CHUNK_SIZE)
}

/// The slice of the source list handled by one reseed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReseedPlan {
    pub total: usize,
    pub offset: usize,
    pub end: usize,
}

impl ReseedPlan {
    pub fn new(total: usize, offset: i64, chunk_size: i64) -> Self {
        let offset = usize::try_from(offset.max(0)).unwrap_or(usize::MAX).min(total);
        let chunk = usize::try_from(chunk_size.max(1)).unwrap_or(1);
        let end = offset.saturating_add(chunk).min(total);
        Self { total, offset, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset the caller should send next.
    pub fn next_offset(&self) -> usize {
        self.end
    }

    pub fn done(&self) -> bool {
        self.end >= self.total
    }
}
