//! reward-cloud - Main entry point

use clap::Parser;
use log::{debug, error};

use reward_cloud::ui::DialoguerPrompt;
use reward_cloud::{
    run_cache_clean, run_context_command, run_env_command, run_info_command, run_login_command,
    CacheAction, Cli, Command, Settings,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.effective_log_level()),
    )
    .init();

    debug!("reward-cloud v{}", env!("CARGO_PKG_VERSION"));
    debug!("CLI args: {:?}", cli.command);

    if let Err(e) = run(&cli).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load(cli)?;
    let prompt = DialoguerPrompt;

    match &cli.command {
        Command::Login => run_login_command(&settings, &prompt).await,
        Command::Context { action } => run_context_command(action, &settings, &prompt).await,
        Command::Env { action } => run_env_command(action, &settings, &prompt).await,
        Command::Info => run_info_command(&settings, &prompt).await,
        Command::Cache {
            action: CacheAction::Clean,
        } => run_cache_clean(&settings),
    }
}
