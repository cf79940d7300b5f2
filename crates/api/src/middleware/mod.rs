//! Authentication extractors.
//!
//! - [`auth::RequireAdmin`] -- Requires valid admin Basic Auth credentials.

pub mod auth;
