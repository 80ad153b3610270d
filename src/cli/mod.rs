//! CLI argument parsing

mod context;
mod env;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{defaults, env as env_vars};

pub use context::{ContextAction, ListContextArgs};
pub use env::{EnvAction, ExportDbArgs};

/// Reward Cloud CLI
#[derive(Parser, Debug)]
#[command(name = "reward-cloud")]
#[command(version)]
#[command(
    about = "Interact with Reward Cloud environments",
    long_about = "Log in to Reward Cloud, manage operating contexts \
                  (organization / team / project / environment) and drive \
                  long-running environment operations to completion."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Reward Cloud API endpoint (host name, https is implied)
    #[arg(long, global = true, env = env_vars::ENDPOINT)]
    pub endpoint: Option<String>,

    /// Username or email used to log in (skips the interactive prompt)
    #[arg(long, global = true, env = env_vars::ID)]
    pub id: Option<String>,

    /// Password used to log in (skips the interactive prompt)
    #[arg(long, global = true, env = env_vars::PASSWORD, hide_env_values = true)]
    pub password: Option<String>,

    /// App home directory [default: ~/.reward/plugins.conf.d/cloud]
    #[arg(long, global = true, env = env_vars::APP_DIR)]
    pub app_dir: Option<PathBuf>,

    /// Context configuration file [default: <app-dir>/config.yml]
    #[arg(short = 'c', long = "config", global = true, env = env_vars::CONFIG_FILE)]
    pub config: Option<PathBuf>,

    /// Token cache file [default: <app-dir>/.cache/token]
    #[arg(long, global = true, env = env_vars::TOKEN_FILE)]
    pub token_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = defaults::LOG_LEVEL)]
    pub log_level: String,

    /// Enable debug mode (same as --log-level=debug)
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
}

impl Cli {
    /// Effective log filter, honoring --debug
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_level
        }
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and cache an API token
    Login,

    /// Manage operating contexts
    #[command(visible_alias = "ctx")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Inspect and operate the environment of the current context
    #[command(visible_alias = "environment")]
    Env {
        #[command(subcommand)]
        action: EnvAction,
    },

    /// Show project, environment and access details of the current context
    Info,

    /// Manage the local cache
    #[command(visible_alias = "c")]
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Remove every cached file (including the token)
    #[command(visible_alias = "clear", visible_alias = "flush")]
    Clean,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["reward-cloud", "login"]);
        assert_eq!(cli.log_level, defaults::LOG_LEVEL);
        assert!(!cli.debug);
        assert!(cli.app_dir.is_none());
        assert!(cli.config.is_none());
        assert!(matches!(cli.command, Command::Login));
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let cli = Cli::parse_from(["reward-cloud", "--debug", "-l", "error", "login"]);
        assert_eq!(cli.effective_log_level(), "debug");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "reward-cloud",
            "context",
            "list",
            "--endpoint",
            "api.example.com",
            "-c",
            "/tmp/config.yml",
        ]);
        assert_eq!(cli.endpoint, Some("api.example.com".to_string()));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/config.yml")));
    }

    #[test]
    fn test_context_list_full() {
        let cli = Cli::parse_from(["reward-cloud", "context", "list", "--full"]);
        match cli.command {
            Command::Context {
                action: ContextAction::List(args),
            } => assert!(args.full),
            _ => panic!("Expected context list"),
        }
    }

    #[test]
    fn test_env_export_db_strip_flag() {
        let cli = Cli::parse_from(["reward-cloud", "env", "export-db", "--strip-database"]);
        match cli.command {
            Command::Env {
                action: EnvAction::ExportDb(args),
            } => assert!(args.strip_database),
            _ => panic!("Expected env export-db"),
        }
    }

    #[test]
    fn test_cache_clean_alias() {
        let cli = Cli::parse_from(["reward-cloud", "cache", "flush"]);
        assert!(matches!(
            cli.command,
            Command::Cache {
                action: CacheAction::Clean
            }
        ));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
