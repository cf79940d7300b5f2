//! Shared query parameter types for API handlers.
//!
//! Numeric parameters arrive as raw strings and are parsed leniently:
//! anything unparseable counts as absent, so a bad `take=` falls back to the
//! default instead of failing the request.

use serde::Deserialize;

/// Parse an optional integer parameter, treating garbage as absent.
pub fn lenient_i64(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|v| v.trim().parse().ok())
}

/// `?q=&take=` for airport searches.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub take: Option<String>,
}

/// `?take=` for snapshot listings.
#[derive(Debug, Default, Deserialize)]
pub struct TakeParams {
    pub take: Option<String>,
}

/// `?page=&take=&q=` for the admin listing.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub take: Option<String>,
}

/// `?reason=` accepted by every mutating endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ReasonParams {
    pub reason: Option<String>,
}

/// Parameters of the history actions (`rollback`, `rollback-to`, `restore`).
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    /// Audit log id (rollback) or snapshot id (restore).
    pub id: Option<String>,
    /// Cutoff for rollback-to.
    pub at: Option<String>,
    pub reason: Option<String>,
}

/// `?field=&user=&from=&to=` for the audit trail.
#[derive(Debug, Default, Deserialize)]
pub struct AuditParams {
    pub field: Option<String>,
    pub user: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// `?iata=` for the timezone lookup.
#[derive(Debug, Default, Deserialize)]
pub struct TimezoneParams {
    pub iata: Option<String>,
}

/// `?offset=&limit=&reset=` for one reseed chunk.
#[derive(Debug, Default, Deserialize)]
pub struct ReseedParams {
    pub offset: Option<String>,
    pub limit: Option<String>,
    pub reset: Option<String>,
}

impl ReseedParams {
    /// Only the literal `true` (any case) requests a reset.
    pub fn reset_requested(&self) -> bool {
        self.reset
            .as_deref()
            .is_some_and(|r| r.trim().eq_ignore_ascii_case("true"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parsing_drops_garbage() {
        assert_eq!(lenient_i64(Some(" 25 ")), Some(25));
        assert_eq!(lenient_i64(Some("lots")), None);
        assert_eq!(lenient_i64(None), None);
    }

    #[test]
    fn reset_needs_literal_true() {
        let params = |v: &str| ReseedParams {
            reset: Some(v.into()),
            ..Default::default()
        };
        assert!(params("TRUE").reset_requested());
        assert!(!params("1").reset_requested());
        assert!(!ReseedParams::default().reset_requested());
    }
}
