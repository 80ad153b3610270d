//! reward-cloud - Operate Reward Cloud environments from the terminal
//!
//! Logs in against the Reward Cloud API, keeps named contexts (organization,
//! team, project and environment) in a YAML file and drives long-running
//! environment operations to completion.
//!
//! # Example
//!
//! ```bash
//! # Log in and cache a token
//! reward-cloud login
//!
//! # Create a context interactively and make it current
//! reward-cloud context create
//!
//! # Build and deploy the current environment, waiting until it is running
//! reward-cloud env build-and-deploy
//!
//! # Export the database without sensitive data
//! reward-cloud env export-db --strip-database
//! ```

pub mod cache;
pub mod cli;
pub mod cloud;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod session;
pub mod settings;
pub mod ui;

pub use cache::run_cache_clean;
pub use cli::{CacheAction, Cli, Command, ContextAction, EnvAction};
pub use cloud::{CloudClient, CloudResource};
pub use context::{run_context_command, ContextDocument, ContextStore, RcContext};
pub use env::{run_env_command, run_info_command, OperationPoller, ProgressEvent};
pub use error::{CloudError, Result};
pub use session::{run_login_command, SessionManager, TokenStore};
pub use settings::Settings;
