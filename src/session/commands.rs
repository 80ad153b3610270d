//! Login command handler

use log::info;

use crate::settings::Settings;
use crate::ui::Prompt;

use super::manager::SessionManager;

/// Make sure a valid token is cached, logging in if needed
pub async fn run_login_command(
    settings: &Settings,
    prompt: &dyn Prompt,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = SessionManager::new(settings, prompt);
    session.ensure_session().await?;

    info!("Logged in to {}", settings.endpoint);
    Ok(())
}
