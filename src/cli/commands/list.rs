use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::context::TideContext;
use crate::errors::{AppError, AppResult};
use crate::models::event::TideEvent;
use crate::ui::messages::{info, warning};
use crate::utils::colors::color_for_kind;
use crate::utils::date;
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        max,
        days,
        from,
        json,
    } = cmd
    {
        let from = match from {
            Some(s) => Some(date::parse_datetime(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?),
            None => None,
        };

        let mut ctx = TideContext::open(cfg)?;
        let events = match days {
            Some(d) => ctx.events_for_days(*d)?,
            None => ctx.events(*max, from)?,
        };
        if let Some(reason) = ctx.last_error() {
            warning(format!("Could not refresh tides, showing cached events: {reason}"));
        }
        ctx.close()?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&events)?);
        } else if events.is_empty() {
            info(format!("No tide events cached for {}", cfg.location));
        } else {
            print!("{}", render(&events, false));
        }
    }
    Ok(())
}

/// Event table shared by `list` and `dump`.
pub fn render(events: &[TideEvent], with_location: bool) -> String {
    let mut headers = vec!["Date", "Time", "Zone", "Event", "Level"];
    if with_location {
        headers.push("Location");
    }

    let mut table = Table::new(&headers);
    for ev in events {
        let mut row = vec![
            ev.date_str(),
            ev.time_str(),
            ev.zone.clone(),
            ev.kind.label().to_string(),
            if ev.level_text.is_empty() {
                "--".to_string()
            } else {
                ev.level_text.clone()
            },
        ];
        if with_location {
            row.push(ev.location.clone());
        }
        table.add_colored_row(row, color_for_kind(&ev.kind));
    }
    table.render()
}
