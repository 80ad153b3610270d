//! Context configuration file I/O

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{CloudError, Result};

use super::models::ContextDocument;

/// Handles reading and writing the YAML context configuration file
#[derive(Debug, Clone)]
pub struct ContextStore {
    config_path: PathBuf,
}

impl ContextStore {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load the context configuration from disk.
    /// Returns Default if file doesn't exist, errors on corrupt YAML.
    pub fn load(&self) -> Result<ContextDocument> {
        if !self.config_path.exists() {
            debug!(
                "No context config at {}, using defaults",
                self.config_path.display()
            );
            return Ok(ContextDocument::default());
        }

        let content = fs::read_to_string(&self.config_path).map_err(|e| {
            CloudError::Config(format!(
                "Failed to read context config {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(ContextDocument::default());
        }

        serde_yml::from_str(&content).map_err(|e| {
            CloudError::Config(format!(
                "Failed to parse context config {}: {}",
                self.config_path.display(),
                e
            ))
        })
    }

    /// Save the whole document.
    /// Uses atomic write (tmp file + rename) and creates parent dir if needed.
    pub fn save(&self, document: &ContextDocument) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CloudError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let yaml = serde_yml::to_string(document).map_err(|e| {
            CloudError::Config(format!("Failed to serialize context config: {}", e))
        })?;

        let tmp_path = self.config_path.with_extension("yml.tmp");
        fs::write(&tmp_path, &yaml).map_err(|e| {
            CloudError::Config(format!(
                "Failed to write temp config file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        // The document may carry the login password
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&tmp_path, permissions).map_err(|e| {
                CloudError::Config(format!("Failed to set permissions on config file: {}", e))
            })?;
        }

        fs::rename(&tmp_path, &self.config_path).map_err(|e| {
            CloudError::Config(format!(
                "Failed to rename temp config file to {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        debug!("Context config saved to {}", self.config_path.display());
        Ok(())
    }
}
