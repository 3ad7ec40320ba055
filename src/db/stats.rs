use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::{Connection, OptionalExtension};
use std::fs;

pub fn print_db_info(conn: &Connection, db_path: &str) -> AppResult<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    //
    // 2) TOTAL EVENTS
    //
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM tide_events", [], |row| row.get(0))?;
    println!("{}• Total events:{} {}{}{}", CYAN, RESET, GREEN, count, RESET);

    //
    // 3) TIME RANGE
    //
    let first: Option<String> = conn
        .query_row(
            "SELECT timestamp FROM tide_events ORDER BY epoch ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last: Option<String> = conn
        .query_row(
            "SELECT timestamp FROM tide_events ORDER BY epoch DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    let none = || format!("{GREY}--{RESET}");
    println!("{}• Time range:{}", CYAN, RESET);
    println!("    from: {}", first.unwrap_or_else(none));
    println!("    to:   {}", last.unwrap_or_else(none));

    //
    // 4) EVENTS PER KIND
    //
    let mut stmt = conn.prepare(
        "SELECT label, COUNT(*) FROM tide_events GROUP BY label ORDER BY COUNT(*) DESC, label",
    )?;
    let kinds: Vec<(String, i64)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<rusqlite::Result<_>>()?;
    if !kinds.is_empty() {
        println!("{}• Events by kind:{}", CYAN, RESET);
        for (label, n) in kinds {
            println!("    {label:<14} {n}");
        }
    }

    //
    // 5) COVERAGE
    //
    let mut stmt = conn.prepare(
        "SELECT location, first_day, last_day, fetched_at FROM tide_coverage ORDER BY location",
    )?;
    let coverage: Vec<(String, String, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
        })?
        .collect::<rusqlite::Result<_>>()?;

    println!("{}• Coverage:{}", CYAN, RESET);
    if coverage.is_empty() {
        println!("    {GREY}nothing fetched yet{RESET}");
    }
    for (location, first_day, last_day, fetched_at) in coverage {
        println!("    {location}: {first_day} → {last_day} (fetched {fetched_at})");
    }

    println!();
    Ok(())
}

/// `PRAGMA integrity_check`: `Ok(None)` when the database is sound,
/// otherwise SQLite's first complaint.
pub fn integrity_problem(conn: &Connection) -> AppResult<Option<String>> {
    let result: String = conn.query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
    Ok((result != "ok").then_some(result))
}

/// Rebuild the file, returning its size before and after in bytes.
pub fn vacuum(conn: &Connection, db_path: &str) -> AppResult<(u64, u64)> {
    let size = || fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let before = size();
    conn.execute_batch("VACUUM;")?;
    Ok((before, size()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;

    #[test]
    fn fresh_database_passes_integrity_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tides.sqlite");
        let conn = Connection::open(&path).unwrap();
        init_db(&conn).unwrap();

        assert_eq!(integrity_problem(&conn).unwrap(), None);
        let (before, after) = vacuum(&conn, path.to_str().unwrap()).unwrap();
        assert!(before > 0);
        assert!(after <= before);
    }
}
