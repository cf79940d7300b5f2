//! HTTP Basic Auth extractor for admin handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flightclock_core::error::CoreError;

use crate::error::AppError;
use crate::state::AppState;

/// Credentials decoded from an `Authorization: Basic ...` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

/// Decode a `Basic` authorization header value. The password is everything
/// after the first `:` and may itself contain colons.
pub fn parse_basic_header(value: &str) -> Option<BasicCredentials> {
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

/// The admin who authenticated the request.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub username: String,
}

/// Requires Basic Auth credentials matching `ADMIN_USER` / `ADMIN_PASS`.
/// Rejects with 401 and a `WWW-Authenticate` challenge otherwise, and
/// always rejects when either variable is unset.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     tracing::info!(user = %admin.username, "handling admin request");
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AdminUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (Some(expected_user), Some(expected_pass)) =
            (&state.config.admin_user, &state.config.admin_pass)
        else {
            tracing::warn!("Admin request rejected: ADMIN_USER/ADMIN_PASS not configured");
            return Err(unauthorized("Admin access is not configured"));
        };

        let credentials = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_basic_header)
            .ok_or_else(|| unauthorized("Authentication required"))?;

        if credentials.username != *expected_user || credentials.password != *expected_pass {
            tracing::warn!(user = %credentials.username, "Admin authentication failed");
            return Err(unauthorized("Invalid credentials"));
        }

        Ok(RequireAdmin(AdminUser {
            username: credentials.username,
        }))
    }
}

fn unauthorized(msg: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(msg.into()))
}
