//! Repository for the `airports` table.

use flightclock_core::reseed::SeedAirport;
use flightclock_core::types::Timestamp;
use sqlx::SqliteExecutor;

use crate::models::airport::{Airport, AirportPage, AirportTimezone};

// ---------------------------------------------------------------------------
// Column lists and limits
// ---------------------------------------------------------------------------

/// Column list for `airports` SELECT queries.
const COLUMNS: &str = "\
    id, iata, icao, name, city, country, lat, lon, timezone, \
    created_at, updated_at";

/// Default and maximum row count for public searches.
pub const DEFAULT_SEARCH_TAKE: i64 = 20;
pub const MAX_SEARCH_TAKE: i64 = 100;

/// Default and maximum page size for the admin listing.
pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

/// Columns matched by the free-text search.
const SEARCH_COLUMNS: [&str; 5] = ["iata", "icao", "name", "city", "country"];

/// Columns matched by the admin listing filter.
const LISTING_COLUMNS: [&str; 6] = ["iata", "icao", "name", "city", "country", "timezone"];

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`
/// pattern.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// `(col LIKE ? ESCAPE '\' OR ...)` over `columns`. SQLite's LIKE is
/// case-insensitive for ASCII.
fn contains_clause(columns: &[&str]) -> String {
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{c} LIKE ? ESCAPE '\\'"))
        .collect();
    format!("({})", parts.join(" OR "))
}

// ---------------------------------------------------------------------------
// AirportRepo
// ---------------------------------------------------------------------------

/// Provides lookup, search and write operations for airports.
pub struct AirportRepo;

impl AirportRepo {
    /// Find an airport by its (already normalized) IATA code.
    pub async fn find_by_iata<'e, E: SqliteExecutor<'e>>(
        executor: E,
        iata: &str,
    ) -> Result<Option<Airport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM airports WHERE iata = ?");
        sqlx::query_as::<_, Airport>(&query)
            .bind(iata)
            .fetch_optional(executor)
            .await
    }

    /// Case-insensitive substring search over code, name and location.
    ///
    /// An empty query returns the first airports by IATA code with the
    /// default page size, ignoring `take`.
    pub async fn search<'e, E: SqliteExecutor<'e>>(
        executor: E,
        q: &str,
        take: Option<i64>,
    ) -> Result<Vec<Airport>, sqlx::Error> {
        let q = q.trim();
        if q.is_empty() {
            let query = format!("SELECT {COLUMNS} FROM airports ORDER BY iata ASC LIMIT ?");
            return sqlx::query_as::<_, Airport>(&query)
                .bind(DEFAULT_SEARCH_TAKE)
                .fetch_all(executor)
                .await;
        }

        let take = take.unwrap_or(DEFAULT_SEARCH_TAKE).clamp(1, MAX_SEARCH_TAKE);
        let pattern = format!("%{}%", escape_like(q));
        let query = format!(
            "SELECT {COLUMNS} FROM airports WHERE {} ORDER BY iata ASC LIMIT ?",
            contains_clause(&SEARCH_COLUMNS)
        );

        let mut q = sqlx::query_as::<_, Airport>(&query);
        for _ in SEARCH_COLUMNS {
            q = q.bind(pattern.clone());
        }
        q.bind(take).fetch_all(executor).await
    }

    /// Airports whose IATA code starts with `prefix`. An empty prefix
    /// matches nothing.
    pub async fn search_iata_prefix<'e, E: SqliteExecutor<'e>>(
        executor: E,
        prefix: &str,
        take: Option<i64>,
    ) -> Result<Vec<Airport>, sqlx::Error> {
        let prefix = prefix.trim();
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let take = take.unwrap_or(DEFAULT_SEARCH_TAKE).clamp(1, MAX_SEARCH_TAKE);
        let query = format!(
            "SELECT {COLUMNS} FROM airports WHERE iata LIKE ? ESCAPE '\\' \
             ORDER BY iata ASC LIMIT ?"
        );
        sqlx::query_as::<_, Airport>(&query)
            .bind(format!("{}%", escape_like(prefix)))
            .bind(take)
            .fetch_all(executor)
            .await
    }

    /// Count airports, optionally restricted by the listing filter.
    pub async fn count<'e, E: SqliteExecutor<'e>>(
        executor: E,
        q: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        match q.map(str::trim).filter(|q| !q.is_empty()) {
            None => {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM airports")
                    .fetch_one(executor)
                    .await
            }
            Some(q) => {
                let query = format!(
                    "SELECT COUNT(*) FROM airports WHERE {}",
                    contains_clause(&LISTING_COLUMNS)
                );
                let pattern = format!("%{}%", escape_like(q));
                let mut stmt = sqlx::query_scalar::<_, i64>(&query);
                for _ in LISTING_COLUMNS {
                    stmt = stmt.bind(pattern.clone());
                }
                stmt.fetch_one(executor).await
            }
        }
    }

    /// One page of airports ordered by IATA code. `page` is 1-based and
    /// clamped to at least 1; `take` is clamped to `1..=MAX_PAGE_SIZE`.
    pub async fn list_page(
        pool: &sqlx::SqlitePool,
        q: Option<&str>,
        page: Option<i64>,
        take: Option<i64>,
    ) -> Result<AirportPage, sqlx::Error> {
        let page = page.unwrap_or(1).max(1);
        let take = take.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(take);
        let filter = q.map(str::trim).filter(|q| !q.is_empty());

        let total = Self::count(pool, filter).await?;

        let items = match filter {
            None => {
                let query = format!(
                    "SELECT {COLUMNS} FROM airports ORDER BY iata ASC LIMIT ? OFFSET ?"
                );
                sqlx::query_as::<_, Airport>(&query)
                    .bind(take)
                    .bind(offset)
                    .fetch_all(pool)
                    .await?
            }
            Some(q) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM airports WHERE {} \
                     ORDER BY iata ASC LIMIT ? OFFSET ?",
                    contains_clause(&LISTING_COLUMNS)
                );
                let pattern = format!("%{}%", escape_like(q));
                let mut stmt = sqlx::query_as::<_, Airport>(&query);
                for _ in LISTING_COLUMNS {
                    stmt = stmt.bind(pattern.clone());
                }
                stmt.bind(take).bind(offset).fetch_all(pool).await?
            }
        };

        let pages = ((total + take - 1) / take).max(1);
        Ok(AirportPage {
            items,
            total,
            page,
            pages,
        })
    }

    /// Timezone of one airport.
    pub async fn find_timezone<'e, E: SqliteExecutor<'e>>(
        executor: E,
        iata: &str,
    ) -> Result<Option<AirportTimezone>, sqlx::Error> {
        sqlx::query_as::<_, AirportTimezone>(
            "SELECT iata, timezone FROM airports WHERE iata = ?",
        )
        .bind(iata)
        .fetch_optional(executor)
        .await
    }

    /// Insert a new airport, returning the stored row.
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        airport: &Airport,
    ) -> Result<Airport, sqlx::Error> {
        let query = format!(
            "INSERT INTO airports \
             (iata, icao, name, city, country, lat, lon, timezone, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Airport>(&query)
            .bind(&airport.iata)
            .bind(&airport.icao)
            .bind(&airport.name)
            .bind(&airport.city)
            .bind(&airport.country)
            .bind(airport.lat)
            .bind(airport.lon)
            .bind(&airport.timezone)
            .bind(airport.created_at)
            .bind(airport.updated_at)
            .fetch_one(executor)
            .await
    }

    /// Write every editable column of `airport` back to its row.
    pub async fn update<'e, E: SqliteExecutor<'e>>(
        executor: E,
        airport: &Airport,
    ) -> Result<Airport, sqlx::Error> {
        let query = format!(
            "UPDATE airports SET \
             icao = ?, name = ?, city = ?, country = ?, lat = ?, lon = ?, \
             timezone = ?, updated_at = ? \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Airport>(&query)
            .bind(&airport.icao)
            .bind(&airport.name)
            .bind(&airport.city)
            .bind(&airport.country)
            .bind(airport.lat)
            .bind(airport.lon)
            .bind(&airport.timezone)
            .bind(airport.updated_at)
            .bind(airport.id)
            .fetch_one(executor)
            .await
    }

    /// Insert or refresh one seed row keyed by IATA code. `created_at` of an
    /// existing row is preserved.
    pub async fn upsert_seed<'e, E: SqliteExecutor<'e>>(
        executor: E,
        row: &SeedAirport,
        now: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO airports \
             (iata, icao, name, city, country, lat, lon, timezone, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (iata) DO UPDATE SET \
             icao = excluded.icao, name = excluded.name, city = excluded.city, \
             country = excluded.country, lat = excluded.lat, lon = excluded.lon, \
             timezone = excluded.timezone, updated_at = excluded.updated_at",
        )
        .bind(&row.iata)
        .bind(&row.icao)
        .bind(&row.name)
        .bind(&row.city)
        .bind(&row.country)
        .bind(row.lat)
        .bind(row.lon)
        .bind(&row.timezone)
        .bind(now)
        .bind(now)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Remove every airport. Returns the number of rows deleted.
    pub async fn delete_all<'e, E: SqliteExecutor<'e>>(executor: E) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM airports").execute(executor).await?;
        Ok(result.rows_affected())
    }
}
