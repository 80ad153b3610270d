//! Environment CLI arguments

use clap::{Parser, Subcommand};

/// Environment subcommands
#[derive(Subcommand, Debug)]
pub enum EnvAction {
    /// Show project and environment state
    Status,

    /// Build and deploy the environment, then wait until it is running again
    #[command(name = "build-and-deploy", visible_alias = "deploy")]
    BuildAndDeploy,

    /// Export the environment database and print the download URL
    #[command(name = "export-db")]
    ExportDb(ExportDbArgs),

    /// Export the environment media files and print the download URL
    #[command(name = "export-media")]
    ExportMedia,
}

/// Arguments for 'env export-db' subcommand
#[derive(Parser, Debug)]
pub struct ExportDbArgs {
    /// Remove sensitive data from the database dump
    #[arg(long, default_value_t = false)]
    pub strip_database: bool,
}
