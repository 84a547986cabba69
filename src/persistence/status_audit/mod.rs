//! Append-only audit trail of status writes backed by `SQLite`.
//!
//! Every status the writer is about to send is recorded here first. The
//! trail is best-effort: callers report failures and carry on with the
//! remote write.

use std::time::{SystemTime, UNIX_EPOCH};

use diesel::OptionalExtension;
use diesel::QueryableByName;
use diesel::RunQueryDsl;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Nullable, Text};
use diesel::sqlite::SqliteConnection;

use crate::status::{ResolvedStatusRequest, StatusContext};

use super::PersistenceError;
use super::migrator::open_database;

const STATUS_AUDIT_TABLE: &str = "status_audit";

/// Destination for the status audit trail.
pub trait StatusAuditStore: Send + Sync {
    /// Records a status that is about to be written under `context`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the record cannot be stored.
    fn persist(
        &self,
        request: &ResolvedStatusRequest,
        context: &StatusContext,
    ) -> Result<(), PersistenceError>;
}

/// Audit store used when no database is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStatusAudit;

impl StatusAuditStore for NoopStatusAudit {
    fn persist(
        &self,
        _request: &ResolvedStatusRequest,
        _context: &StatusContext,
    ) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// One stored audit row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusAuditRecord {
    /// Commit the status was written for.
    pub sha: String,
    /// Branch resolved alongside the commit.
    pub branch: String,
    /// Status state label.
    pub state: String,
    /// Optional status description.
    pub description: Option<String>,
    /// Optional status target URL.
    pub target_url: Option<String>,
    /// Status context label.
    pub context: String,
    /// Unix timestamp when the row was written.
    pub recorded_at_unix: i64,
}

/// SQLite-backed audit store.
///
/// A connection is opened per call; writes are rare and short-lived CI
/// processes gain nothing from pooling.
#[derive(Debug, Clone)]
pub struct SqliteStatusAudit {
    database_url: String,
}

impl SqliteStatusAudit {
    /// Creates a store targeting `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError::BlankDatabaseUrl`] when the URL is blank.
    pub fn new(database_url: impl Into<String>) -> Result<Self, PersistenceError> {
        let database_url_string = database_url.into();
        if database_url_string.trim().is_empty() {
            return Err(PersistenceError::BlankDatabaseUrl);
        }
        Ok(Self {
            database_url: database_url_string,
        })
    }

    /// Returns recorded rows for `sha`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] when the database cannot be opened, the
    /// schema is missing, or the query fails.
    pub fn history(&self, sha: &str) -> Result<Vec<StatusAuditRecord>, PersistenceError> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = Text)]
            sha: String,
            #[diesel(sql_type = Text)]
            branch: String,
            #[diesel(sql_type = Text)]
            state: String,
            #[diesel(sql_type = Nullable<Text>)]
            description: Option<String>,
            #[diesel(sql_type = Nullable<Text>)]
            target_url: Option<String>,
            #[diesel(sql_type = Text)]
            context: String,
            #[diesel(sql_type = BigInt)]
            recorded_at_unix: i64,
        }

        let mut connection = self.establish_connection()?;

        let rows: Vec<Row> = sql_query(
            "SELECT sha, branch, state, description, target_url, context, recorded_at_unix \
             FROM status_audit \
             WHERE sha = ? \
             ORDER BY id ASC;",
        )
        .bind::<Text, _>(sha)
        .load(&mut connection)
        .map_err(|error| Self::map_query_error(&mut connection, &error))?;

        Ok(rows
            .into_iter()
            .map(|row| StatusAuditRecord {
                sha: row.sha,
                branch: row.branch,
                state: row.state,
                description: row.description,
                target_url: row.target_url,
                context: row.context,
                recorded_at_unix: row.recorded_at_unix,
            })
            .collect())
    }

    fn now_unix_seconds() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| i64::try_from(duration.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }

    fn establish_connection(&self) -> Result<SqliteConnection, PersistenceError> {
        open_database(&self.database_url)
    }

    fn audit_table_exists(
        connection: &mut SqliteConnection,
    ) -> Result<bool, diesel::result::Error> {
        #[derive(Debug, QueryableByName)]
        struct Row {
            #[diesel(sql_type = BigInt)]
            one: i64,
        }

        let exists: Option<Row> = sql_query(
            "SELECT 1 AS one FROM sqlite_master WHERE type = 'table' AND name = ? LIMIT 1;",
        )
        .bind::<Text, _>(STATUS_AUDIT_TABLE)
        .get_result(connection)
        .optional()?;

        Ok(exists.is_some_and(|row| row.one == 1))
    }

    fn map_error_with_schema_check<F>(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
        create_error: F,
    ) -> PersistenceError
    where
        F: Fn(String) -> PersistenceError,
    {
        match Self::audit_table_exists(connection) {
            Ok(false) => PersistenceError::SchemaNotInitialised,
            Ok(true) => create_error(error.to_string()),
            Err(check_error) => create_error(format!(
                "schema presence check failed: {check_error}; original error: {error}"
            )),
        }
    }

    fn map_query_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::QueryFailed { message }
        })
    }

    fn map_write_error(
        connection: &mut SqliteConnection,
        error: &diesel::result::Error,
    ) -> PersistenceError {
        Self::map_error_with_schema_check(connection, error, |message| {
            PersistenceError::WriteFailed { message }
        })
    }
}

impl StatusAuditStore for SqliteStatusAudit {
    fn persist(
        &self,
        request: &ResolvedStatusRequest,
        context: &StatusContext,
    ) -> Result<(), PersistenceError> {
        let mut connection = self.establish_connection()?;
        let status = &request.request;

        sql_query(
            "INSERT INTO status_audit \
             (sha, branch, state, description, target_url, context, recorded_at_unix) \
             VALUES (?, ?, ?, ?, ?, ?, ?);",
        )
        .bind::<Text, _>(request.sha.as_str())
        .bind::<Text, _>(request.branch.as_str())
        .bind::<Text, _>(status.state.as_str())
        .bind::<Nullable<Text>, _>(status.description.as_deref())
        .bind::<Nullable<Text>, _>(status.target_url.as_deref())
        .bind::<Text, _>(context.as_str())
        .bind::<BigInt, _>(Self::now_unix_seconds())
        .execute(&mut connection)
        .map(drop)
        .map_err(|error| Self::map_write_error(&mut connection, &error))
    }
}
