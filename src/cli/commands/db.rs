use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::run_migrations_verbose;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{error, info, success};

/// Database maintenance. Steps run in a fixed order: migrate, info, check, vacuum.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info: show_info,
    } = cmd
    else {
        return Ok(());
    };

    if !(*migrate || *check || *vacuum || *show_info) {
        info("Nothing to do: pass --migrate, --check, --vacuum or --info");
        return Ok(());
    }

    let pool = DbPool::new(&cfg.database)?;

    if *migrate {
        info(format!("Running migrations on {}", cfg.database));
        run_migrations_verbose(&pool.conn)?;
    }

    if *show_info {
        stats::print_db_info(&pool.conn, &cfg.database)?;
    }

    if *check {
        match stats::integrity_problem(&pool.conn)? {
            None => success("Integrity check passed."),
            Some(problem) => error(format!("Integrity check failed: {problem}")),
        }
    }

    if *vacuum {
        let (before, after) = stats::vacuum(&pool.conn, &cfg.database)?;
        success(format!("Vacuum completed: {before} → {after} bytes"));
    }

    Ok(())
}
