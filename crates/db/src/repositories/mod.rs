//! Repository layer.
//!
//! Each repository is a zero-sized struct with async methods that take any
//! SQLite executor (`&SqlitePool` or `&mut *tx`) as the first argument.

pub mod airport_repo;
pub mod audit_repo;
pub mod snapshot_repo;

pub use airport_repo::AirportRepo;
pub use audit_repo::AuditLogRepo;
pub use snapshot_repo::SnapshotRepo;
