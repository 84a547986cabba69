//! `--migrate-db`: create or upgrade the status audit database.

use beacon::persistence::{PersistenceError, SchemaVersion, migrate_database};
use beacon::telemetry::StderrJsonlTelemetrySink;
use beacon::{BeaconConfig, ReportError};

/// Migrates the configured audit database and returns its schema version.
///
/// # Errors
///
/// Returns [`ReportError::Configuration`] if the database URL is missing or
/// blank, and [`ReportError::Io`] for connection or migration failures.
pub fn run(config: &BeaconConfig) -> Result<SchemaVersion, ReportError> {
    let Some(database_url) = config.database_url.as_deref() else {
        return Err(map_persistence_error(&PersistenceError::MissingDatabaseUrl));
    };

    migrate_database(database_url, &StderrJsonlTelemetrySink)
        .map_err(|error| map_persistence_error(&error))
}

/// Maps a persistence error onto the CLI's error kinds.
///
/// An unusable database URL is a configuration problem; anything that goes
/// wrong once the database is reached is I/O.
pub fn map_persistence_error(error: &PersistenceError) -> ReportError {
    let message = error.to_string();
    match error {
        PersistenceError::MissingDatabaseUrl | PersistenceError::BlankDatabaseUrl => {
            ReportError::Configuration { message }
        }
        _ => ReportError::Io { message },
    }
}

#[cfg(test)]
mod tests {
    use beacon::persistence::{INITIAL_SCHEMA_VERSION, PersistenceError};
    use beacon::{BeaconConfig, ReportError};
    use rstest::rstest;
    use tempfile::TempDir;

    use super::{map_persistence_error, run};

    #[rstest]
    #[case::missing(PersistenceError::MissingDatabaseUrl, true)]
    #[case::blank(PersistenceError::BlankDatabaseUrl, true)]
    #[case::connection(
        PersistenceError::ConnectionFailed { message: "locked".to_owned() },
        false
    )]
    #[case::schema(PersistenceError::SchemaNotInitialised, false)]
    fn persistence_errors_are_classified(
        #[case] error: PersistenceError,
        #[case] is_configuration: bool,
    ) {
        let mapped = map_persistence_error(&error);

        assert_eq!(
            matches!(mapped, ReportError::Configuration { .. }),
            is_configuration,
            "unexpected mapping for {error:?}: {mapped:?}"
        );
    }

    #[rstest]
    #[case::missing_database_url(None, "database URL is required")]
    #[case::blank_database_url(Some("   ".to_owned()), "database URL must not be blank")]
    fn migrate_db_rejects_invalid_database_url(
        #[case] database_url: Option<String>,
        #[case] expected_message_prefix: &str,
    ) {
        let config = BeaconConfig {
            database_url,
            migrate_db: true,
            ..Default::default()
        };

        match run(&config) {
            Err(ReportError::Configuration { message }) => {
                assert!(
                    message.starts_with(expected_message_prefix),
                    "expected message starting with {expected_message_prefix:?}, got {message:?}"
                );
            }
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn migrate_db_creates_the_audit_schema() {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let path = temp_dir.path().join("beacon.sqlite");
        let config = BeaconConfig {
            database_url: Some(path.to_string_lossy().to_string()),
            migrate_db: true,
            ..Default::default()
        };

        let version = run(&config).expect("migrations should run");

        assert!(path.exists());
        assert_eq!(version.as_str(), INITIAL_SCHEMA_VERSION);
    }
}
