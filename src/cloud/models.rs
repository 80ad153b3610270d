//! Reward Cloud data models
//!
//! Collections come back as plain JSON arrays. Related entities are referenced
//! by IRI (for example `/api/states/3`); use [`id_from_path`] to get the id.

use serde::{Deserialize, Serialize};

use super::traits::CloudResource;

/// Last segment of an IRI-style reference
pub fn id_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Login credentials, only ever held in memory
#[derive(Serialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password", &"****")
            .finish()
    }
}

/// Token issuance response
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub token: String,
}

/// Organisation data from the API
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub id: u32,
    pub name: Option<String>,
    pub code_name: Option<String>,
}

/// Team data from the API
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: u32,
    pub name: Option<String>,
    pub code_name: Option<String>,
}

/// Project data from the API
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u32,
    pub name: Option<String>,
    pub code_name: Option<String>,
    pub state: Option<String>,
}

/// Environment data from the API
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    pub id: u32,
    pub name: Option<String>,
    pub code_name: Option<String>,
    pub state: Option<String>,
    pub environment_access: Option<String>,
}

/// Entity state (e.g. "Running", "Deploying")
#[derive(Deserialize, Debug, Clone)]
pub struct State {
    pub id: u32,
    pub name: Option<String>,
}

/// Kind of data transfer ("Database", "Media")
#[derive(Deserialize, Debug, Clone)]
pub struct DataTransferDataType {
    pub id: u32,
    pub name: Option<String>,
}

/// Result of an export
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExportedData {
    pub id: u32,
    pub url: Option<String>,
}

/// Access sub-resources of an environment, all IRIs
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentAccess {
    pub id: u32,
    pub frontend: Option<String>,
    pub backend: Option<String>,
    pub dev_tools: Option<String>,
    pub mailhog: Option<String>,
    pub database: Option<String>,
}

/// URL-only access endpoint (frontend, mailhog)
#[derive(Deserialize, Debug, Clone)]
pub struct AccessEndpoint {
    pub id: u32,
    pub url: Option<String>,
}

/// Access endpoint protected by credentials; the password is base64 encoded
#[derive(Deserialize, Debug, Clone)]
pub struct AccessCredentials {
    pub id: u32,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Optional string attribute as &str, empty when absent
fn attr(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

impl Project {
    pub fn state_ref(&self) -> &str {
        attr(&self.state)
    }
}

impl Environment {
    pub fn state_ref(&self) -> &str {
        attr(&self.state)
    }

    /// Access IRI, `None` when the environment has no access configured
    pub fn access_ref(&self) -> Option<&str> {
        self.environment_access.as_deref().filter(|s| !s.is_empty())
    }
}

impl State {
    pub fn name(&self) -> &str {
        attr(&self.name)
    }
}

impl DataTransferDataType {
    pub fn name(&self) -> &str {
        attr(&self.name)
    }
}

impl ExportedData {
    pub fn url(&self) -> &str {
        attr(&self.url)
    }
}

impl AccessEndpoint {
    pub fn url(&self) -> &str {
        attr(&self.url)
    }
}

impl AccessCredentials {
    pub fn url(&self) -> &str {
        attr(&self.url)
    }

    pub fn username(&self) -> &str {
        attr(&self.username)
    }

    /// Decode the base64 password
    pub fn decoded_password(&self) -> std::result::Result<String, base64::DecodeError> {
        use base64::Engine;
        let bytes = base64::engine::general_purpose::STANDARD.decode(attr(&self.password))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

macro_rules! impl_cloud_resource {
    ($($ty:ty),+) => {
        $(
            impl CloudResource for $ty {
                fn id(&self) -> u32 {
                    self.id
                }

                fn name(&self) -> &str {
                    attr(&self.name)
                }

                fn code_name(&self) -> &str {
                    attr(&self.code_name)
                }
            }
        )+
    };
}

impl_cloud_resource!(Organisation, Team, Project, Environment);
