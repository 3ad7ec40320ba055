//! tidecache library root.
//! Runs XTide's `tide` program, parses its predictions, keeps them cached in
//! SQLite and serves them to the report templates. Exposes the CLI parser,
//! the high-level run() function, and the internal modules.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

pub use crate::core::context::TideContext;
pub use crate::core::freshness::{FreshnessState, RefreshOutcome};
pub use crate::core::invoke::{TideSource, XTideProgram};
pub use crate::db::store::TideStore;
pub use crate::errors::{AppError, AppResult};
pub use crate::models::event::TideEvent;
pub use crate::models::event_kind::EventKind;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(cli, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Fetch { .. } => cli::commands::fetch::handle(&cli.command, cfg),
        Commands::Refresh { .. } => cli::commands::refresh::handle(&cli.command, cfg),
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg),
        Commands::Dump { .. } => cli::commands::dump::handle(&cli.command, cfg),
        Commands::Purge { .. } => cli::commands::purge::handle(&cli.command, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // configuration is loaded once
    let mut cfg = match &cli.config_file {
        Some(_) => Config::load_from(&cli.config_path())?,
        None => Config::load()?,
    };

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
