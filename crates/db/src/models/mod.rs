//! Row structs and DTOs.
//!
//! Each submodule pairs a `FromRow` + `Serialize` entity struct matching the
//! table with the insert DTO the repositories accept.

pub mod airport;
pub mod audit;
pub mod snapshot;
