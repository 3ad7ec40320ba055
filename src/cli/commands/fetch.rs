use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::invoke::{TideSource, XTideProgram};
use crate::core::parser;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, warning};
use crate::utils::date;

/// Run the tide program once and print what the parser makes of it.
/// Nothing is written to the store.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Fetch {
        location,
        program,
        days,
        start,
        raw,
    } = cmd
    {
        let location = location.clone().unwrap_or_else(|| cfg.location.clone());
        if location.trim().is_empty() {
            return Err(AppError::Config(
                "no location: pass --location or set `location:` in the config file".into(),
            ));
        }

        let start = match start {
            Some(s) => date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => date::today(),
        };
        let days = days.unwrap_or(cfg.days);
        let program = XTideProgram::new(
            program.as_deref().unwrap_or(cfg.program.as_str()),
            cfg.timeout(),
        );

        let output = program.fetch(&location, start, days)?;

        if *raw {
            print!("{output}");
            return Ok(());
        }

        let report = parser::parse(&output, &location);
        if report.skipped > 0 {
            warning(format!(
                "{} of {} line(s) not understood",
                report.skipped, report.total
            ));
        }
        let events = report.into_events()?;

        for ev in &events {
            println!("{ev}");
        }
        info(format!(
            "{} event(s) for {} from {} over {} day(s)",
            events.len(),
            location,
            start,
            days
        ));
    }

    Ok(())
}
