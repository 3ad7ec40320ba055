//! The tide cache's process-wide state, made explicit.
//!
//! A [`TideContext`] owns the store connection and the freshness state for
//! the configured location. The host opens one at service start, forwards
//! its scheduling hooks to it, reads events through it for templates, and
//! closes it at shutdown.

use crate::config::Config;
use crate::core::freshness::{FreshnessController, FreshnessState, RefreshOutcome, RefreshPolicy};
use crate::core::invoke::{TideSource, XTideProgram};
use crate::db::store::TideStore;
use crate::errors::{AppError, AppResult};
use crate::models::event::TideEvent;
use chrono::{DateTime, Duration, Local};

pub struct TideContext {
    store: TideStore,
    controller: FreshnessController,
    source: Box<dyn TideSource>,
    checked_this_cycle: bool,
}

impl TideContext {
    /// Open the store named in `cfg` and drive the `tide` program it names.
    pub fn open(cfg: &Config) -> AppResult<Self> {
        let program = XTideProgram::new(&cfg.program, cfg.timeout());
        Self::with_source(cfg, Box::new(program))
    }

    /// Same as [`TideContext::open`] with another event source.
    pub fn with_source(cfg: &Config, source: Box<dyn TideSource>) -> AppResult<Self> {
        cfg.validate()?;
        let store = TideStore::open(&cfg.database)?;
        let controller = FreshnessController::new(RefreshPolicy {
            location: cfg.location.clone(),
            days: cfg.days,
            retention: cfg.retention(),
        });
        log::info!(
            "tide cache for '{}' at {} ({} day horizon)",
            cfg.location,
            cfg.database,
            cfg.days
        );
        Ok(Self {
            store,
            controller,
            source,
            checked_this_cycle: false,
        })
    }

    pub fn store(&self) -> &TideStore {
        &self.store
    }

    pub fn state(&self) -> FreshnessState {
        self.controller.state()
    }

    pub fn failures(&self) -> u64 {
        self.controller.failures()
    }

    /// Why the latest refresh failed; `None` once one succeeds.
    pub fn last_error(&self) -> Option<&str> {
        self.controller.last_error()
    }

    /// Host hook: a new archive record arrived.
    pub fn on_new_archive_record(&mut self, now: DateTime<Local>) -> AppResult<RefreshOutcome> {
        self.refresh_at(now, false)
    }

    /// Host hook: a report generation starts. The next read checks freshness again.
    pub fn begin_report_cycle(&mut self) {
        self.checked_this_cycle = false;
    }

    pub fn refresh_at(&mut self, now: DateTime<Local>, force: bool) -> AppResult<RefreshOutcome> {
        let outcome = if force {
            self.controller
                .force_refresh(&mut self.store, self.source.as_ref(), now)?
        } else {
            self.controller
                .maybe_refresh(&mut self.store, self.source.as_ref(), now)?
        };
        self.checked_this_cycle = true;
        Ok(outcome)
    }

    /// Up to `max_count` events from `from_time` (default: now) onwards.
    pub fn events(
        &mut self,
        max_count: Option<i64>,
        from_time: Option<DateTime<Local>>,
    ) -> AppResult<Vec<TideEvent>> {
        self.events_at(Local::now(), max_count, from_time)
    }

    pub fn events_at(
        &mut self,
        now: DateTime<Local>,
        max_count: Option<i64>,
        from_time: Option<DateTime<Local>>,
    ) -> AppResult<Vec<TideEvent>> {
        self.ensure_checked(now)?;
        let from = from_time.unwrap_or(now);
        Ok(self.store.query(&from, max_count)?)
    }

    /// All events in the next `days` days.
    pub fn events_for_days(&mut self, days: u32) -> AppResult<Vec<TideEvent>> {
        self.events_for_days_at(Local::now(), days)
    }

    pub fn events_for_days_at(
        &mut self,
        now: DateTime<Local>,
        days: u32,
    ) -> AppResult<Vec<TideEvent>> {
        self.ensure_checked(now)?;
        let until = Duration::try_days(i64::from(days))
            .and_then(|span| now.checked_add_signed(span))
            .ok_or_else(|| AppError::InvalidDate(format!("{days} days from {now}")))?;
        Ok(self.store.query_range(&now, &until)?)
    }

    /// Close the store connection.
    pub fn close(self) -> AppResult<()> {
        self.store.close()
    }

    fn ensure_checked(&mut self, now: DateTime<Local>) -> AppResult<()> {
        if self.checked_this_cycle {
            return Ok(());
        }
        match self.refresh_at(now, false)? {
            RefreshOutcome::Failed { reason, .. } => {
                log::warn!("serving cached tides: {reason}");
            }
            outcome => log::debug!("freshness check: {outcome:?}"),
        }
        Ok(())
    }
}

impl std::fmt::Debug for TideContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TideContext")
            .field("location", &self.controller.policy().location)
            .field("state", &self.controller.state())
            .field("checked_this_cycle", &self.checked_this_cycle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InvocationError;
    use crate::models::event_kind::EventKind;
    use chrono::{NaiveDate, TimeZone};
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    const PALO_ALTO: &str = "Palo Alto Yacht Harbor, San Francisco Bay, California";

    struct Canned {
        text: &'static str,
        calls: Rc<Cell<u32>>,
    }

    impl TideSource for Canned {
        fn fetch(&self, _: &str, _: NaiveDate, _: u32) -> Result<String, InvocationError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.text.to_string())
        }
    }

    fn config(dir: &TempDir) -> Config {
        Config {
            database: dir.path().join("xtide.sqlite").to_string_lossy().to_string(),
            location: PALO_ALTO.into(),
            days: 7,
            ..Config::default()
        }
    }

    fn july_10() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 7, 10, 12, 0, 0)
            .earliest()
            .unwrap()
    }

    #[test]
    fn palo_alto_first_event() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Rc::new(Cell::new(0));
        let source = Canned {
            text: "2024-07-11 04:03:00 PDT, High Tide, 6.34 feet\n\
                   2024-07-11 10:40:00 PDT, Low Tide, 0.12 feet\n",
            calls: calls.clone(),
        };
        let mut ctx = TideContext::with_source(&config(&dir), Box::new(source)).unwrap();

        let events = ctx.events_at(july_10(), Some(1), None).unwrap();
        assert_eq!(events.len(), 1);
        let ev = &events[0];
        assert_eq!(ev.kind, EventKind::HighTide);
        assert_eq!(ev.level_text, "6.34 feet");
        assert_eq!(ev.location, PALO_ALTO);
        assert_eq!(
            ev.timestamp,
            DateTime::parse_from_rfc3339("2024-07-11T04:03:00-07:00").unwrap()
        );
        assert_eq!(ev.timestamp.offset().local_minus_utc(), -7 * 3600);

        // one check per reporting cycle
        ctx.events_at(july_10(), None, None).unwrap();
        assert_eq!(calls.get(), 1);
        assert_eq!(ctx.state(), FreshnessState::Fresh);
    }

    #[test]
    fn no_events_yet_is_empty_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Canned {
            text: "",
            calls: Rc::new(Cell::new(0)),
        };
        let mut ctx = TideContext::with_source(&config(&dir), Box::new(source)).unwrap();

        let events = ctx.events_at(july_10(), None, None).unwrap();
        assert!(events.is_empty());
        assert_eq!(ctx.state(), FreshnessState::Stale);
        assert_eq!(ctx.failures(), 1);
        assert!(ctx.last_error().unwrap().contains("format mismatch"));
    }

    #[test]
    fn events_for_days_past_the_calendar_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = Canned {
            text: "2024-07-11 04:03 PDT, High Tide, 6.34 feet\n",
            calls: Rc::new(Cell::new(0)),
        };
        let mut ctx = TideContext::with_source(&config(&dir), Box::new(source)).unwrap();

        assert!(matches!(
            ctx.events_for_days_at(july_10(), u32::MAX),
            Err(AppError::InvalidDate(_))
        ));
        assert_eq!(ctx.events_for_days_at(july_10(), 3650).unwrap().len(), 1);
    }

    #[test]
    fn south_african_station_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            location: "Cape Town, South Africa".into(),
            ..config(&dir)
        };
        let source = Canned {
            text: "Cape Town| South Africa,2024-07-11,5:21 AM SAST,1.71 m,High Tide\n\
                   Cape Town| South Africa,2024-07-11,11:38 AM SAST,0.32 m,Low Tide\n",
            calls: Rc::new(Cell::new(0)),
        };
        let mut ctx = TideContext::with_source(&cfg, Box::new(source)).unwrap();

        let events = ctx.events_at(july_10(), None, None).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].location, "Cape Town, South Africa");
        assert_eq!(events[0].zone, "SAST");
        assert_eq!(
            events[0].timestamp,
            DateTime::parse_from_rfc3339("2024-07-11T05:21:00+02:00").unwrap()
        );
        assert!(ctx.last_error().is_none());
    }

    #[test]
    fn new_cycle_checks_again() {
        let dir = tempfile::tempdir().unwrap();
        let calls = Rc::new(Cell::new(0));
        let source = Canned {
            text: "garbage",
            calls: calls.clone(),
        };
        let mut ctx = TideContext::with_source(&config(&dir), Box::new(source)).unwrap();

        ctx.events_at(july_10(), None, None).unwrap();
        ctx.events_at(july_10(), None, None).unwrap();
        assert_eq!(calls.get(), 1);

        ctx.begin_report_cycle();
        ctx.events_at(july_10(), None, None).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn events_for_days_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let source = Canned {
            text: "2024-07-11 04:03 PDT, High Tide, 6.34 feet\n\
                   2024-07-20 04:03 PDT, High Tide, 6.00 feet\n",
            calls: Rc::new(Cell::new(0)),
        };
        let mut ctx = TideContext::with_source(&config(&dir), Box::new(source)).unwrap();

        let events = ctx.events_for_days_at(july_10(), 2).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(ctx.store().count().unwrap(), 2);
    }

    #[test]
    fn context_reopens_over_persisted_store() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = config(&dir);
        let source = Canned {
            text: "2024-07-11 04:03 PDT, High Tide, 6.34 feet\n",
            calls: Rc::new(Cell::new(0)),
        };
        let mut ctx = TideContext::with_source(&cfg, Box::new(source)).unwrap();
        ctx.on_new_archive_record(july_10()).unwrap();
        ctx.close().unwrap();

        let calls = Rc::new(Cell::new(0));
        let source = Canned {
            text: "",
            calls: calls.clone(),
        };
        let mut ctx = TideContext::with_source(&cfg, Box::new(source)).unwrap();
        assert!(matches!(
            ctx.on_new_archive_record(july_10()).unwrap(),
            RefreshOutcome::Fresh { .. }
        ));
        assert_eq!(calls.get(), 0);
        assert_eq!(ctx.store().count().unwrap(), 1);
    }

    #[test]
    fn missing_location_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config {
            location: String::new(),
            ..config(&dir)
        };
        let source = Canned {
            text: "",
            calls: Rc::new(Cell::new(0)),
        };
        assert!(matches!(
            TideContext::with_source(&cfg, Box::new(source)),
            Err(AppError::Config(_))
        ));
    }
}
