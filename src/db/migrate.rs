use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result};

/// Columns of `tide_events`, in declaration order.
pub const EVENT_COLUMNS: [&str; 10] = [
    "id",
    "location",
    "epoch",
    "timestamp",
    "zone",
    "kind",
    "label",
    "level_text",
    "raw_line",
    "created_at",
];

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

fn table_columns(conn: &Connection, name: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{name}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    let mut out = Vec::new();
    for c in cols {
        out.push(c?);
    }
    Ok(out)
}

/// Create the `tide_events` table. The UNIQUE constraint is the event
/// identity: `label` is the normalised kind label, so it stands in for the kind.
fn create_events_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tide_events (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            location    TEXT NOT NULL,
            epoch       INTEGER NOT NULL,
            timestamp   TEXT NOT NULL,
            zone        TEXT NOT NULL,
            kind        TEXT NOT NULL,
            label       TEXT NOT NULL,
            level_text  TEXT NOT NULL DEFAULT '',
            raw_line    TEXT NOT NULL DEFAULT '',
            created_at  TEXT NOT NULL,
            UNIQUE(location, epoch, label)
        );

        CREATE INDEX IF NOT EXISTS idx_tide_events_epoch ON tide_events(epoch, id);
        "#,
    )?;
    Ok(())
}

/// Create the `tide_coverage` table: one row per successfully fetched window.
fn create_coverage_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tide_coverage (
            location    TEXT NOT NULL,
            first_day   TEXT NOT NULL,
            last_day    TEXT NOT NULL,
            fetched_at  TEXT NOT NULL,
            PRIMARY KEY (location, first_day)
        );
        "#,
    )?;
    Ok(())
}

/// Refuse to run against a `tide_events` table with a different layout.
fn check_events_schema(conn: &Connection) -> AppResult<()> {
    let found = table_columns(conn, "tide_events")?;
    if found != EVENT_COLUMNS {
        return Err(AppError::Migration(format!(
            "tide_events has columns [{}], expected [{}]; delete the database file and run `init` again",
            found.join(", "),
            EVENT_COLUMNS.join(", ")
        )));
    }
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Events table: create or verify
    if table_exists(conn, "tide_events")? {
        check_events_schema(conn)?;
    } else {
        create_events_table(conn)?;
        conn.execute(
            "INSERT INTO log (date, operation, target, message)
             VALUES (datetime('now'), 'migration_applied', 'tide_events', 'Created tide_events table')",
            [],
        )?;
        log::info!("created tide_events table");
    }

    // 3) Coverage table
    if !table_exists(conn, "tide_coverage")? {
        create_coverage_table(conn)?;
        conn.execute(
            "INSERT INTO log (date, operation, target, message)
             VALUES (datetime('now'), 'migration_applied', 'tide_coverage', 'Created tide_coverage table')",
            [],
        )?;
        log::info!("created tide_coverage table");
    }

    Ok(())
}

/// Same as [`run_pending_migrations`], reporting on the terminal.
pub fn run_migrations_verbose(conn: &Connection) -> AppResult<()> {
    let before = table_exists(conn, "tide_events")? && table_exists(conn, "tide_coverage")?;
    run_pending_migrations(conn)?;
    if before {
        success("Schema is up to date.");
    } else {
        success("Created tide cache schema.");
    }
    Ok(())
}
