use crate::cli::parser::{Cli, Commands};
use crate::config::{CONFIG_KEYS, Config};
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};
use std::fs;

/// Handle the `config` subcommand
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = &cli.command
    {
        let path = cli.config_path();

        if *print_config {
            println!("📄 Current configuration ({}):\n", path.display());
            println!("{}", serde_yaml::to_string(cfg)?);
        }

        if *check {
            if !path.exists() {
                warning(format!(
                    "No configuration file at {}: defaults in use (run `init`)",
                    path.display()
                ));
                return Ok(());
            }

            let content = fs::read_to_string(&path)?;
            let missing = Config::missing_keys(&content)?;
            if missing.is_empty() {
                success(format!(
                    "{} has all {} keys",
                    path.display(),
                    CONFIG_KEYS.len()
                ));
            } else {
                for key in &missing {
                    warning(format!("missing key `{key}` (default applies)"));
                }
            }

            if let Err(e) = cfg.validate() {
                warning(e);
            }
        }

        if !*print_config && !*check {
            info("Nothing to do: pass --print or --check");
        }
    }

    Ok(())
}
