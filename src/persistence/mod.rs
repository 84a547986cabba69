//! Local persistence and database migrations.
//!
//! Beacon can keep an audit trail of every status it writes in a local
//! `SQLite` database. The schema is managed with Diesel migrations so the
//! database can be created and upgraded consistently across CI runners.

mod error;
mod migrator;
mod status_audit;

pub use error::PersistenceError;
pub use migrator::{INITIAL_SCHEMA_VERSION, SchemaVersion, migrate_database};
pub use status_audit::{NoopStatusAudit, SqliteStatusAudit, StatusAuditRecord, StatusAuditStore};
