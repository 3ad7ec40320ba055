//! The tide event store: a keyed, time-ordered SQLite table plus the record
//! of which day ranges have been fetched.

use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::queries::{insert_event, load_events_between};
use crate::errors::{AppResult, StoreError};
use crate::models::event::TideEvent;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashSet;

/// Rows touched by [`TideStore::replace_window`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub inserted: usize,
    pub removed: usize,
}

pub struct TideStore {
    pool: DbPool,
}

/// Whole seconds at or after `t`, so `epoch >= ceil_epoch(t)` ⇔ `timestamp >= t`.
fn ceil_epoch<Tz: TimeZone>(t: &DateTime<Tz>) -> i64 {
    let secs = t.timestamp();
    if t.timestamp_subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

fn limit_sql(limit: Option<i64>) -> i64 {
    match limit {
        Some(n) if n > 0 => n,
        _ => -1,
    }
}

impl TideStore {
    /// Open (creating if needed) the store at `path` and ensure the schema.
    pub fn open(path: &str) -> AppResult<Self> {
        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn conn(&self) -> &Connection {
        &self.pool.conn
    }

    pub fn path(&self) -> String {
        self.pool.db_path()
    }

    /// Close the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> AppResult<()> {
        self.pool.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }

    /// Up to `limit` events with `timestamp >= from`, ascending.
    /// `None` or a non-positive limit returns all of them.
    pub fn query<Tz: TimeZone>(
        &self,
        from: &DateTime<Tz>,
        limit: Option<i64>,
    ) -> Result<Vec<TideEvent>, StoreError> {
        Ok(load_events_between(
            self.conn(),
            ceil_epoch(from),
            i64::MAX,
            limit_sql(limit),
        )?)
    }

    /// Events with `from <= timestamp < until`, ascending.
    pub fn query_range<Tz: TimeZone>(
        &self,
        from: &DateTime<Tz>,
        until: &DateTime<Tz>,
    ) -> Result<Vec<TideEvent>, StoreError> {
        Ok(load_events_between(
            self.conn(),
            ceil_epoch(from),
            ceil_epoch(until),
            -1,
        )?)
    }

    /// Every stored event, ascending.
    pub fn dump(&self) -> Result<Vec<TideEvent>, StoreError> {
        Ok(load_events_between(self.conn(), i64::MIN, i64::MAX, -1)?)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        Ok(self
            .conn()
            .query_row("SELECT COUNT(*) FROM tide_events", [], |row| row.get(0))?)
    }

    /// Insert a batch in one transaction. Events whose key already exists
    /// are skipped; the result counts only new rows.
    pub fn insert(&mut self, events: &[TideEvent]) -> Result<usize, StoreError> {
        let tx = self.pool.conn.transaction()?;
        let mut added = 0;
        for ev in events {
            added += insert_event(&tx, ev)?;
        }
        tx.commit()?;
        Ok(added)
    }

    /// Store the result of one fetch of `location` for `first_day..=last_day`,
    /// all-or-nothing:
    /// - rows of any other location are dropped (one location per cache);
    /// - rows inside the span of `events` that the new batch no longer
    ///   contains are deleted;
    /// - new rows are inserted, existing keys left untouched;
    /// - the window is recorded as covered.
    pub fn replace_window(
        &mut self,
        location: &str,
        first_day: NaiveDate,
        last_day: NaiveDate,
        events: &[TideEvent],
    ) -> Result<ReplaceSummary, StoreError> {
        let tx = self.pool.conn.transaction()?;
        let mut summary = ReplaceSummary::default();

        let stations: HashSet<&str> = events.iter().map(|e| e.location.as_str()).collect();
        let keys: HashSet<(&str, i64, &str)> = events
            .iter()
            .map(|e| (e.location.as_str(), e.epoch(), e.kind.label()))
            .collect();

        {
            let mut stmt = tx.prepare("SELECT DISTINCT location FROM tide_events")?;
            let stored: Vec<String> = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<_>>()?;
            for loc in stored.iter().filter(|l| !stations.contains(l.as_str())) {
                summary.removed +=
                    tx.execute("DELETE FROM tide_events WHERE location = ?1", [loc])?;
            }
        }

        if let (Some(lo), Some(hi)) = (
            events.iter().map(TideEvent::epoch).min(),
            events.iter().map(TideEvent::epoch).max(),
        ) {
            let mut stmt = tx.prepare(
                "SELECT id, location, epoch, label FROM tide_events WHERE epoch BETWEEN ?1 AND ?2",
            )?;
            let existing: Vec<(i64, String, i64, String)> = stmt
                .query_map(params![lo, hi], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })?
                .collect::<rusqlite::Result<_>>()?;

            for (id, loc, epoch, label) in existing {
                if !keys.contains(&(loc.as_str(), epoch, label.as_str())) {
                    summary.removed +=
                        tx.execute("DELETE FROM tide_events WHERE id = ?1", [id])?;
                }
            }
        }

        for ev in events {
            summary.inserted += insert_event(&tx, ev)?;
        }

        tx.execute("DELETE FROM tide_coverage WHERE location <> ?1", [location])?;
        tx.execute(
            "INSERT OR REPLACE INTO tide_coverage (location, first_day, last_day, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                location,
                first_day.format("%Y-%m-%d").to_string(),
                last_day.format("%Y-%m-%d").to_string(),
                Local::now().to_rfc3339(),
            ],
        )?;

        tx.commit()?;
        Ok(summary)
    }

    /// Furthest day for which a complete day of events was fetched.
    pub fn latest_covered_date(&self, location: &str) -> Result<Option<NaiveDate>, StoreError> {
        let last: Option<String> = self
            .conn()
            .query_row(
                "SELECT MAX(last_day) FROM tide_coverage WHERE location = ?1",
                [location],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        match last {
            None => Ok(None),
            Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Some)
                .map_err(|_| StoreError::CorruptRow(format!("invalid coverage day: {s}"))),
        }
    }

    /// Delete events before `cutoff`, and coverage windows that ended
    /// before its date. Returns the number of events removed.
    pub fn purge_older_than<Tz: TimeZone>(
        &mut self,
        cutoff: &DateTime<Tz>,
    ) -> Result<usize, StoreError> {
        let tx = self.pool.conn.transaction()?;
        let removed = tx.execute(
            "DELETE FROM tide_events WHERE epoch < ?1",
            [ceil_epoch(cutoff)],
        )?;
        tx.execute(
            "DELETE FROM tide_coverage WHERE last_day < ?1",
            [cutoff.naive_local().date().format("%Y-%m-%d").to_string()],
        )?;
        tx.commit()?;
        Ok(removed)
    }
}
