use crate::config::{Config, MAX_DAYS};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for tidecache
/// Fetch tide predictions from XTide and keep them cached in SQLite
#[derive(Parser)]
#[command(
    name = "tidecache",
    version = env!("CARGO_PKG_VERSION"),
    about = "Fetch tide predictions from XTide and keep them cached in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Read (and with `init`, write) another configuration file
    #[arg(global = true, long = "config-file", value_name = "FILE")]
    pub config_file: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Day counts accepted on the command line.
fn days_in_range() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(1..=i64::from(MAX_DAYS))
}

impl Cli {
    /// Configuration file in effect: `--config-file`, or the standard one.
    pub fn config_path(&self) -> PathBuf {
        self.config_file
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(Config::config_file)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Show or check the configuration file
    Config {
        #[arg(long = "print", help = "Print the effective configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Run the tide program once and print the parsed events (nothing is stored)
    Fetch {
        /// Station name (default: `location` from the configuration)
        #[arg(long, short)]
        location: Option<String>,

        /// Path of the tide program (default: `program` from the configuration)
        #[arg(long = "prog", value_name = "PATH")]
        program: Option<String>,

        /// Number of days to request (default: `days` from the configuration)
        #[arg(long, short, value_parser = days_in_range())]
        days: Option<u32>,

        /// First day of the window, YYYY-MM-DD (default: today)
        #[arg(long, value_name = "DATE")]
        start: Option<String>,

        #[arg(long = "raw", help = "Print the program output unparsed")]
        raw: bool,
    },

    /// Bring the cache up to the configured horizon
    Refresh {
        #[arg(long, short, help = "Fetch even if the cache is already fresh")]
        force: bool,
    },

    /// List upcoming tide events (refreshing the cache first when stale)
    List {
        /// Show at most N events
        #[arg(long, short = 'n', value_name = "N", conflicts_with = "days")]
        max: Option<i64>,

        /// Show every event of the next N days
        #[arg(long, short, value_name = "N", value_parser = days_in_range())]
        days: Option<u32>,

        /// Start from this time (YYYY-MM-DD, "YYYY-MM-DD HH:MM" or RFC 3339)
        #[arg(long, value_name = "TIME", conflicts_with = "days")]
        from: Option<String>,

        #[arg(long = "json", help = "Print events as JSON")]
        json: bool,
    },

    /// Print every cached event
    Dump {
        #[arg(long = "json", help = "Print events as JSON")]
        json: bool,
    },

    /// Delete cached events older than the retention period (or --before)
    Purge {
        /// Delete events before this time instead
        #[arg(long, value_name = "TIME")]
        before: Option<String>,
    },
}
