//! Local cache maintenance

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info};

use crate::error::{Result, ResultExt};
use crate::settings::Settings;

/// Remove the cache directory (token included) and recreate it empty
pub fn clean_cache_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => debug!("Removed {}", dir.display()),
        Err(e) if e.kind() == ErrorKind::NotFound => debug!("{} does not exist", dir.display()),
        Err(e) => return Err(e).context("removing cache directory"),
    }

    fs::create_dir_all(dir).context("creating cache directory")?;
    Ok(())
}

/// `cache clean`
pub fn run_cache_clean(settings: &Settings) -> std::result::Result<(), Box<dyn std::error::Error>> {
    info!("Cleaning cache...");
    clean_cache_dir(settings.cache_dir())?;
    info!("Cache cleaned: {}", settings.cache_dir().display());
    Ok(())
}
