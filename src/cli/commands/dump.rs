use crate::cli::commands::list::render;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::store::TideStore;
use crate::errors::AppResult;
use crate::ui::messages::info;

/// Print the store as it is, without any freshness check.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Dump { json } = cmd {
        let store = TideStore::open(&cfg.database)?;
        let events = store.dump()?;
        let path = store.path();
        store.close()?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&events)?);
        } else if events.is_empty() {
            info(format!("{path} holds no tide events"));
        } else {
            print!("{}", render(&events, true));
            info(format!("{} event(s)", events.len()));
        }
    }
    Ok(())
}
