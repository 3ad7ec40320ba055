use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::store::TideStore;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::date;
use chrono::Local;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Purge { before } = cmd {
        let cutoff = match before {
            Some(s) => date::parse_datetime(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => Local::now()
                .checked_sub_signed(cfg.retention())
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "retention_days {} reaches past the calendar",
                        cfg.retention_days
                    ))
                })?,
        };

        let mut store = TideStore::open(&cfg.database)?;
        let removed = store.purge_older_than(&cutoff)?;

        let message = format!("{removed} event(s) before {}", cutoff.format("%Y-%m-%d %H:%M"));
        ttlog(store.conn(), "purge", &cfg.location, &message)?;
        store.close()?;

        success(format!("Purged {message}"));
    }
    Ok(())
}
