//! Context management CLI arguments

use clap::{Parser, Subcommand};

/// Context subcommands for managing the operating scope
#[derive(Subcommand, Debug)]
pub enum ContextAction {
    /// List configured contexts
    #[command(visible_alias = "ls")]
    List(ListContextArgs),

    /// Interactively create a context (organization, team, project, environment)
    Create,

    /// Delete a context selected by its number
    #[command(visible_alias = "rm")]
    Delete,

    /// Select the context to use
    #[command(visible_alias = "use")]
    Select,

    /// Check that the current context still points to existing entities
    Check,
}

/// Arguments for 'context list' subcommand
#[derive(Parser, Debug)]
pub struct ListContextArgs {
    /// Print organization, team, project and environment names (requires login)
    #[arg(long, default_value_t = false)]
    pub full: bool,
}
