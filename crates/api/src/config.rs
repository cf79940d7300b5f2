/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. In production,
/// override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// SQLite database URL (default: `sqlite://data/flightclock.db`).
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Basic Auth credentials for admin routes. Admin access is disabled
    /// unless both are set.
    pub admin_user: Option<String>,
    pub admin_pass: Option<String>,
    /// JSON file read by the reseed endpoint.
    pub airports_data_path: String,
    /// Rows written per reseed request when the caller does not pass `limit`.
    pub reseed_chunk_size: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                         |
    /// |------------------------|---------------------------------|
    /// | `HOST`                 | `0.0.0.0`                       |
    /// | `PORT`                 | `3000`                          |
    /// | `DATABASE_URL`         | `sqlite://data/flightclock.db`  |
    /// | `CORS_ORIGINS`         | `http://localhost:3000`         |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                            |
    /// | `ADMIN_USER`           | unset                           |
    /// | `ADMIN_PASS`           | unset                           |
    /// | `AIRPORTS_DATA_PATH`   | `data/airports.json`            |
    /// | `RESEED_CHUNK_SIZE`    | `500`                           |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://data/flightclock.db".into());

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let admin_user = non_empty_var("ADMIN_USER");
        let admin_pass = non_empty_var("ADMIN_PASS");

        let airports_data_path = std::env::var("AIRPORTS_DATA_PATH")
            .unwrap_or_else(|_| "data/airports.json".into());

        let reseed_chunk_size: i64 = std::env::var("RESEED_CHUNK_SIZE")
            .unwrap_or_else(|_| flightclock_core::reseed::DEFAULT_CHUNK_SIZE.to_string())
            .parse()
            .expect("RESEED_CHUNK_SIZE must be a valid i64");

        Self {
            host,
            port,
            database_url,
            cors_origins,
            request_timeout_secs,
            admin_user,
            admin_pass,
            airports_data_path,
            reseed_chunk_size,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
