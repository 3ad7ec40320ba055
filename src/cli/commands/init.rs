use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::store::TideStore;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the configuration file (skipped with `--test`)
///  - the SQLite database and its schema
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let path = cli.config_path();

    info("Initializing tidecache…");
    cfg.init_all(&path, cli.test)?;

    let store = TideStore::open(&cfg.database)?;

    // the internal log is not worth failing init for
    if let Err(e) = ttlog(
        store.conn(),
        "init",
        "Database initialized",
        &format!("Database initialized at {}", cfg.database),
    ) {
        error(format!("Failed to write internal log: {}", e));
    }

    store.close()?;

    if cfg.location.trim().is_empty() {
        warning(format!(
            "No location configured: set `location:` in {} before running `refresh`",
            path.display()
        ));
    }

    success("tidecache initialization completed!");
    Ok(())
}
