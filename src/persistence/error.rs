//! Error types for local persistence operations.

use thiserror::Error;

/// Errors returned while migrating or writing the local `SQLite` database.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// No database URL was configured.
    #[error("database URL is required (use --database-url or BEACON_DATABASE_URL)")]
    MissingDatabaseUrl,

    /// The database URL/path was present but blank.
    #[error("database URL must not be blank")]
    BlankDatabaseUrl,

    /// Establishing a `SQLite` connection failed.
    #[error("failed to connect to SQLite database: {message}")]
    ConnectionFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// Running pending migrations failed.
    #[error("failed to run database migrations: {message}")]
    MigrationFailed {
        /// Error detail from Diesel migrations.
        message: String,
    },

    /// Reading the schema version from the migration table failed.
    #[error("failed to read schema version after migrations: {message}")]
    SchemaVersionQueryFailed {
        /// Error detail from Diesel query execution.
        message: String,
    },

    /// The migrations completed but no schema version could be found.
    #[error("no schema version recorded after migrations ran")]
    MissingSchemaVersion,

    /// The audit table does not exist yet.
    #[error("status audit schema is missing (run `beacon --migrate-db`)")]
    SchemaNotInitialised,

    /// Writing an audit row failed.
    #[error("failed to write status audit row: {message}")]
    WriteFailed {
        /// Error detail from Diesel.
        message: String,
    },

    /// Reading audit rows failed.
    #[error("failed to query status audit rows: {message}")]
    QueryFailed {
        /// Error detail from Diesel.
        message: String,
    },
}
