//! Domain logic for the flightclock service.
//!
//! Everything here is pure and database-free: code validation, field-level
//! diffing, rollback reconstruction, journey arithmetic and reseed input
//! normalization. The `db` and `api` crates build on these types.

pub mod airport;
pub mod audit;
pub mod error;
pub mod journey;
pub mod reseed;
pub mod types;
