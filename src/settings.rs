//! Process-wide settings, resolved once at startup
//!
//! Every component receives `&Settings` and reads only the fields it needs.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::cli::Cli;
use crate::config::{defaults, paths};
use crate::context::{ContextDocument, ContextStore};
use crate::error::Result;
use crate::session::TokenStore;

/// Resolved configuration for a single invocation
#[derive(Debug, Clone)]
pub struct Settings {
    /// API host, without scheme
    pub endpoint: String,
    /// Login identifier from flags, env or the context file
    pub id: Option<String>,
    /// Login secret from flags, env or the context file
    pub password: Option<String>,
    /// App home directory
    pub app_dir: PathBuf,
    /// Context configuration file
    pub config_file: PathBuf,
    /// Cache directory (removed by `cache clean`)
    pub cache_dir: PathBuf,
    /// Token cache file
    pub token_file: PathBuf,
}

impl Settings {
    /// Resolve settings from the CLI and the context file it points to
    pub fn load(cli: &Cli) -> Result<Self> {
        let app_dir = cli.app_dir.clone().unwrap_or_else(default_app_dir);
        let config_file = cli
            .config
            .clone()
            .unwrap_or_else(|| app_dir.join(paths::CONFIG_FILE));

        // commands that need contexts reload the file and report the error themselves
        let document = match ContextStore::new(config_file.clone()).load() {
            Ok(document) => document,
            Err(e) => {
                warn!("Ignoring context file {}: {}", config_file.display(), e);
                ContextDocument::default()
            }
        };
        Ok(Self::resolve(cli, &document, app_dir, config_file))
    }

    /// Merge CLI values over the context file, falling back to defaults
    pub fn resolve(
        cli: &Cli,
        document: &ContextDocument,
        app_dir: PathBuf,
        config_file: PathBuf,
    ) -> Self {
        let cache_dir = app_dir.join(paths::CACHE_DIR);
        let token_file = cli
            .token_file
            .clone()
            .unwrap_or_else(|| cache_dir.join(paths::TOKEN_FILE));

        let endpoint = first_non_empty(cli.endpoint.as_deref(), &document.endpoint)
            .unwrap_or_else(|| defaults::ENDPOINT.to_string());
        let id = first_non_empty(cli.id.as_deref(), &document.id);
        let password = first_non_empty(cli.password.as_deref(), &document.password);

        debug!(
            "Settings: endpoint={}, config={}, token_file={}, id_set={}, password_set={}",
            endpoint,
            config_file.display(),
            token_file.display(),
            id.is_some(),
            password.is_some()
        );

        Self {
            endpoint,
            id,
            password,
            app_dir,
            config_file,
            cache_dir,
            token_file,
        }
    }

    /// Store for the context configuration file
    pub fn context_store(&self) -> ContextStore {
        ContextStore::new(self.config_file.clone())
    }

    /// Store for the cached API token
    pub fn token_store(&self) -> TokenStore {
        TokenStore::new(self.token_file.clone())
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }
}

/// ~/.reward/plugins.conf.d/cloud
pub fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(paths::PARENT_DIR)
        .join(paths::PLUGINS_DIR)
        .join(paths::APP_NAME)
}

fn first_non_empty(flag: Option<&str>, file_value: &str) -> Option<String> {
    flag.filter(|v| !v.is_empty())
        .or(Some(file_value).filter(|v| !v.is_empty()))
        .map(str::to_string)
}
