//! Embedded SQL migration runner.
//!
//! Migrations are SQL files embedded at compile time. They run in order on
//! startup, tracked by the `_gauntlet_migrations` table, and each is applied
//! at most once.

use rusqlite::Connection;
use thiserror::Error;

struct Migration {
    name: &'static str,
    sql: &'static str,
}

/// All migrations in order. New migrations are appended here.
const MIGRATIONS: &[Migration] = &[
    Migration {
        name: "001_sessions",
        sql: include_str!("migrations/001_sessions.sql"),
    },
    Migration {
        name: "002_session_event_log",
        sql: include_str!("migrations/002_session_event_log.sql"),
    },
    Migration {
        name: "003_scorecards",
        sql: include_str!("migrations/003_scorecards.sql"),
    },
];

#[derive(Debug, Error)]
pub enum MigrationError {
    /// A SQL statement within a migration failed.
    #[error("migration '{name}' failed: {source}")]
    ExecutionFailed {
        name: String,
        source: rusqlite::Error,
    },

    #[error("failed to check migration state: {0}")]
    StateQuery(rusqlite::Error),
}

/// Runs all pending migrations and returns how many were applied.
///
/// # Errors
///
/// Returns `MigrationError` if a migration fails or the tracking table
/// cannot be queried. A failed migration leaves no partial schema behind.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    run_migrations_from_list(conn, MIGRATIONS)
}

fn run_migrations_from_list(
    conn: &Connection,
    migrations: &[Migration],
) -> Result<usize, MigrationError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _gauntlet_migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .map_err(|e| MigrationError::ExecutionFailed {
        name: "_gauntlet_migrations_bootstrap".to_string(),
        source: e,
    })?;

    let mut applied = 0;

    for migration in migrations {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _gauntlet_migrations WHERE name = ?1",
                [migration.name],
                |row| row.get(0),
            )
            .map_err(MigrationError::StateQuery)?;

        if already_applied {
            tracing::debug!(migration = migration.name, "migration already applied");
            continue;
        }

        tracing::info!(migration = migration.name, "applying migration");

        let failed = |source| MigrationError::ExecutionFailed {
            name: migration.name.to_string(),
            source,
        };

        let tx = conn.unchecked_transaction().map_err(failed)?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.execute(
            "INSERT INTO _gauntlet_migrations (name) VALUES (?1)",
            [migration.name],
        )
        .map_err(failed)?;
        tx.commit().map_err(failed)?;

        applied += 1;
    }

    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            [name],
            |row| row.get(0),
        )
        .expect("should query sqlite_master")
    }

    #[test]
    fn fresh_db_gets_every_table() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        let applied = run_migrations(&conn).expect("migrations should succeed");
        assert_eq!(applied, MIGRATIONS.len());

        for table in ["sessions", "session_event_log", "scorecards"] {
            assert!(table_exists(&conn, table), "{table} should exist");
        }
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        assert_eq!(run_migrations(&conn).expect("first run"), MIGRATIONS.len());
        assert_eq!(run_migrations(&conn).expect("second run"), 0);
    }

    #[test]
    fn failed_migration_rolls_back() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        let migrations = [Migration {
            name: "900_conflict",
            sql: "
                CREATE TABLE rollback_probe (id INTEGER PRIMARY KEY);
                INSERT INTO _gauntlet_migrations (name) VALUES ('900_conflict');
            ",
        }];

        let err = run_migrations_from_list(&conn, &migrations)
            .expect_err("tracking insert conflict should fail");
        match err {
            MigrationError::ExecutionFailed { name, .. } => assert_eq!(name, "900_conflict"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!table_exists(&conn, "rollback_probe"));
    }

    #[test]
    fn scorecards_are_unique_per_session() {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        conn.execute_batch("PRAGMA foreign_keys = ON;").expect("pragma");
        run_migrations(&conn).expect("migrations should succeed");

        conn.execute(
            "INSERT INTO sessions (session_id, persona_type, company, role, starting_pressure, scenario_json)
             VALUES ('s-1', 'ANGRY_CUSTOMER', 'Acme', 'Support', 0.6, '{}')",
            [],
        )
        .expect("insert session");

        let insert = "INSERT INTO scorecards
            (session_id, overall, clarity, confidence, commitment, adaptability,
             total_exchanges, scorecard_json, transcript_json)
            VALUES ('s-1', 50, 50, 50, 50, 50, 0, '{}', '[]')";
        conn.execute(insert, []).expect("first scorecard");
        assert!(conn.execute(insert, []).is_err());
    }
}
