use crate::errors::StoreError;
use crate::models::event::TideEvent;
use crate::models::event_kind::EventKind;
use chrono::{DateTime, Local};
use rusqlite::{Connection, Result, Row, params};

/// Column list shared by every SELECT that feeds [`map_row`].
pub const SELECT_EVENTS: &str =
    "SELECT id, location, epoch, timestamp, zone, kind, label, level_text, raw_line FROM tide_events";

fn corrupt(msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(StoreError::CorruptRow(msg)),
    )
}

pub fn map_row(row: &Row) -> Result<TideEvent> {
    let ts_str: String = row.get("timestamp")?;
    let timestamp = DateTime::parse_from_rfc3339(&ts_str)
        .map_err(|_| corrupt(format!("invalid timestamp: {ts_str}")))?;

    let kind_str: String = row.get("kind")?;
    let label: String = row.get("label")?;
    let kind = EventKind::from_db_str(&kind_str, &label)
        .ok_or_else(|| corrupt(format!("invalid kind: {kind_str}")))?;

    Ok(TideEvent {
        location: row.get("location")?,
        timestamp,
        zone: row.get("zone")?,
        kind,
        level_text: row.get("level_text")?,
        raw_line: row.get("raw_line")?,
    })
}

/// Insert one event unless its key is already present.
/// Returns 1 when a row was added, 0 when it was a duplicate.
pub fn insert_event(conn: &Connection, ev: &TideEvent) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO tide_events
            (location, epoch, timestamp, zone, kind, label, level_text, raw_line, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    stmt.execute(params![
        ev.location,
        ev.epoch(),
        ev.timestamp.to_rfc3339(),
        ev.zone,
        ev.kind.to_db_str(),
        ev.kind.label(),
        ev.level_text,
        ev.raw_line,
        Local::now().to_rfc3339(),
    ])
}

/// Events with `from_epoch <= epoch < until_epoch`, ascending, insertion
/// order on ties. `limit < 0` means no limit.
pub fn load_events_between(
    conn: &Connection,
    from_epoch: i64,
    until_epoch: i64,
    limit: i64,
) -> Result<Vec<TideEvent>> {
    let sql = format!(
        "{SELECT_EVENTS} WHERE epoch >= ?1 AND epoch < ?2 ORDER BY epoch ASC, id ASC LIMIT ?3"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    let rows = stmt.query_map(params![from_epoch, until_epoch, limit], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
