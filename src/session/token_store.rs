//! Token cache file I/O

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, warn};

use crate::error::{CloudError, Result};

/// Encode a token the way it is stored on disk
pub fn encode_token(token: &str) -> String {
    STANDARD.encode(token.as_bytes())
}

/// Decode stored token contents
pub fn decode_token(contents: &str) -> Result<String> {
    let bytes = STANDARD
        .decode(contents.trim())
        .map_err(|e| CloudError::Token(format!("Failed to decode cached token: {}", e)))?;
    String::from_utf8(bytes)
        .map_err(|e| CloudError::Token(format!("Cached token is not valid UTF-8: {}", e)))
}

/// Reads and writes the cached bearer token (base64 of the raw token)
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached token.
    /// A missing file is no token. So is an undecodable one, which will be overwritten on login.
    pub fn read(&self) -> Result<Option<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cached token at {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(CloudError::Token(format!(
                    "Failed to read token file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        match decode_token(&content) {
            Ok(token) if token.is_empty() => Ok(None),
            Ok(token) => Ok(Some(token)),
            Err(e) => {
                warn!("Ignoring cached token at {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    /// Persist the token.
    /// Uses atomic write (tmp file + rename) and creates parent dir if needed.
    pub fn write(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CloudError::Token(format!(
                    "Failed to create token directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, encode_token(token)).map_err(|e| {
            CloudError::Token(format!(
                "Failed to write temp token file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                CloudError::Token(format!("Failed to set permissions on token file: {}", e))
            })?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            CloudError::Token(format!(
                "Failed to rename temp token file to {}: {}",
                self.path.display(),
                e
            ))
        })?;

        debug!("Token written to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> TokenStore {
        TokenStore::new(dir.path().join(".cache").join("token"))
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        for token in ["", "abc", "eyJhbGciOiJIUzI1NiJ9.e30.sig", "zażółć 🚀"] {
            assert_eq!(decode_token(&encode_token(token)).unwrap(), token);
        }
    }

    #[test]
    fn test_decode_tolerates_trailing_newline() {
        assert_eq!(decode_token("YWJj\n").unwrap(), "abc");
    }

    #[test]
    fn test_read_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(test_store(&dir).read().unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.write("secret-token").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw, encode_token("secret-token"));
        assert_eq!(store.read().unwrap().as_deref(), Some("secret-token"));
    }

    #[test]
    fn test_read_corrupt_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "!!! not base64").unwrap();
        assert!(store.read().unwrap().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.write("t").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
