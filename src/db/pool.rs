//! SQLite connection wrapper (one connection per process, opened at start).

use rusqlite::{Connection, Result};
use std::path::Path;
use std::time::Duration;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        // The host may read while a refresh commits.
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(Self { conn })
    }

    /// Path of the main database file, empty for in-memory databases.
    pub fn db_path(&self) -> String {
        self.conn.path().unwrap_or_default().to_string()
    }
}
