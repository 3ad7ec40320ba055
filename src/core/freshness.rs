//! Decide when the cached tide events are stale and refresh them.
//!
//! The controller holds no timer: the host calls [`FreshnessController::maybe_refresh`]
//! from its scheduling hook, and a failed fetch simply waits for the next call.

use crate::core::invoke::TideSource;
use crate::core::parser;
use crate::db::log::ttlog;
use crate::db::store::TideStore;
use crate::errors::{AppError, AppResult};
use crate::models::event::TideEvent;
use crate::utils::date::add_days;
use chrono::{DateTime, Duration, Local, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessState {
    /// Nothing known yet for the location.
    Unloaded,
    /// Coverage reaches `today + days`.
    Fresh,
    /// Coverage falls short of the horizon, or the last fetch failed.
    Stale,
    /// A fetch is in progress.
    Fetching,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// No fetch needed.
    Fresh {
        covered_through: NaiveDate,
        purged: usize,
    },
    /// Fetched and stored `[today, covered_through]`.
    Refreshed {
        from: FreshnessState,
        inserted: usize,
        removed: usize,
        purged: usize,
        covered_through: NaiveDate,
    },
    /// Fetch failed; the store was left as it was.
    Failed {
        from: FreshnessState,
        reason: String,
    },
}

/// What to fetch and how long to keep it.
#[derive(Debug, Clone)]
pub struct RefreshPolicy {
    pub location: String,
    /// Forecast horizon in days.
    pub days: u32,
    /// Events older than `now - retention` are purged.
    pub retention: Duration,
}

pub struct FreshnessController {
    policy: RefreshPolicy,
    state: FreshnessState,
    failures: u64,
    last_error: Option<String>,
}

impl FreshnessController {
    pub fn new(policy: RefreshPolicy) -> Self {
        Self {
            policy,
            state: FreshnessState::Unloaded,
            failures: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> FreshnessState {
        self.state
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Failed fetches since this controller was created.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Last day a fresh store must cover on `today`.
    pub fn horizon(&self, today: NaiveDate) -> NaiveDate {
        add_days(today, self.policy.days)
    }

    /// Check coverage and fetch when it falls short of the horizon.
    ///
    /// Fetch and parse failures are contained (`RefreshOutcome::Failed`);
    /// store failures propagate.
    pub fn maybe_refresh<S: TideSource + ?Sized>(
        &mut self,
        store: &mut TideStore,
        source: &S,
        now: DateTime<Local>,
    ) -> AppResult<RefreshOutcome> {
        let today = now.date_naive();
        let horizon = self.horizon(today);

        match store.latest_covered_date(&self.policy.location)? {
            Some(covered) if covered >= horizon => {
                self.state = FreshnessState::Fresh;
                let purged = self.purge(store, now)?;
                Ok(RefreshOutcome::Fresh {
                    covered_through: covered,
                    purged,
                })
            }
            Some(covered) => {
                log::info!(
                    "tides for {} cover through {covered}, need {horizon}: refreshing",
                    self.policy.location
                );
                self.state = FreshnessState::Stale;
                self.fetch(store, source, now)
            }
            None => {
                log::info!("no cached tides for {}: fetching", self.policy.location);
                // rows without a coverage record are still rows
                self.state = if store.count()? > 0 {
                    FreshnessState::Stale
                } else {
                    FreshnessState::Unloaded
                };
                self.fetch(store, source, now)
            }
        }
    }

    /// Fetch regardless of coverage.
    pub fn force_refresh<S: TideSource + ?Sized>(
        &mut self,
        store: &mut TideStore,
        source: &S,
        now: DateTime<Local>,
    ) -> AppResult<RefreshOutcome> {
        self.fetch(store, source, now)
    }

    fn fetch<S: TideSource + ?Sized>(
        &mut self,
        store: &mut TideStore,
        source: &S,
        now: DateTime<Local>,
    ) -> AppResult<RefreshOutcome> {
        let from = self.state;
        self.state = FreshnessState::Fetching;

        let first_day = now.date_naive();
        let last_day = self.horizon(first_day);

        let events = match self.acquire(source, first_day) {
            Ok(events) => events,
            Err(e) => return self.fail(store, from, e),
        };

        let summary =
            store.replace_window(&self.policy.location, first_day, last_day, &events)?;
        let purged = self.purge(store, now)?;

        self.state = FreshnessState::Fresh;
        self.last_error = None;

        let message = format!(
            "{} event(s) fetched, {} new, {} superseded, {} purged; covered through {}",
            events.len(),
            summary.inserted,
            summary.removed,
            purged,
            last_day
        );
        log::info!("{}: {message}", self.policy.location);
        ttlog(store.conn(), "refresh", &self.policy.location, &message)?;

        Ok(RefreshOutcome::Refreshed {
            from,
            inserted: summary.inserted,
            removed: summary.removed,
            purged,
            covered_through: last_day,
        })
    }

    /// Run the source and parse its output. Only invocation and format
    /// errors come out of here.
    fn acquire<S: TideSource + ?Sized>(
        &self,
        source: &S,
        start: NaiveDate,
    ) -> AppResult<Vec<TideEvent>> {
        let raw = source.fetch(&self.policy.location, start, self.policy.days)?;
        let report = parser::parse(&raw, &self.policy.location);
        let events = report.into_events()?;
        if events.is_empty() {
            // A multi-day window always has tides; silence is suspicious too.
            return Err(AppError::FormatMismatch { lines: 0 });
        }
        Ok(events)
    }

    fn fail(
        &mut self,
        store: &TideStore,
        from: FreshnessState,
        err: AppError,
    ) -> AppResult<RefreshOutcome> {
        self.state = FreshnessState::Stale;
        self.failures += 1;

        let reason = err.to_string();
        log::warn!(
            "tide refresh for {} failed (attempt {}): {reason}",
            self.policy.location,
            self.failures
        );
        ttlog(store.conn(), "refresh_failed", &self.policy.location, &reason)?;
        self.last_error = Some(reason.clone());

        Ok(RefreshOutcome::Failed { from, reason })
    }

    fn purge(&self, store: &mut TideStore, now: DateTime<Local>) -> AppResult<usize> {
        let Some(cutoff) = now.checked_sub_signed(self.policy.retention) else {
            log::debug!("retention reaches past the calendar: nothing to purge");
            return Ok(0);
        };
        let purged = store.purge_older_than(&cutoff)?;
        if purged > 0 {
            log::debug!("purged {purged} tide event(s) before {cutoff}");
        }
        Ok(purged)
    }
}
