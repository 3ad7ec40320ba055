use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::TideContext;
use crate::core::freshness::RefreshOutcome;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use chrono::Local;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Refresh { force } = cmd {
        let mut ctx = TideContext::open(cfg)?;
        let outcome = ctx.refresh_at(Local::now(), *force)?;
        ctx.close()?;

        match outcome {
            RefreshOutcome::Fresh {
                covered_through,
                purged,
            } => {
                success(format!(
                    "Tides for {} already cover through {}",
                    cfg.location, covered_through
                ));
                if purged > 0 {
                    info(format!("{purged} old event(s) purged"));
                }
            }
            RefreshOutcome::Refreshed {
                inserted,
                removed,
                purged,
                covered_through,
                ..
            } => {
                success(format!(
                    "Tides for {} refreshed through {}: {} new, {} superseded, {} purged",
                    cfg.location, covered_through, inserted, removed, purged
                ));
            }
            RefreshOutcome::Failed { reason, .. } => {
                return Err(AppError::RefreshFailed(reason));
            }
        }
    }

    Ok(())
}
