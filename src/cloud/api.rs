//! Reward Cloud API operations

use log::debug;

use crate::config::api;
use crate::error::{CloudError, Result};

use super::client::CloudClient;
use super::models::{
    id_from_path, AccessCredentials, AccessEndpoint, Credentials, DataTransferDataType,
    Environment, EnvironmentAccess, ExportedData, Organisation, Project, State, Team,
    TokenResponse,
};

impl CloudClient {
    /// Exchange credentials for a bearer token
    pub async fn issue_token(&self, credentials: &Credentials) -> Result<String> {
        let url = self.url(&format!("/{}", api::TOKEN));
        debug!("Requesting token for '{}' from: {}", credentials.id, url);

        let response = self.post(&url).json(credentials).send().await?;
        let token: TokenResponse = self.parse_api_response(response, "token").await?;

        if token.token.is_empty() {
            return Err(CloudError::Token("API returned an empty token".to_string()));
        }
        Ok(token.token)
    }

    /// Get all organisations visible to the session
    pub async fn list_organisations(&self) -> Result<Vec<Organisation>> {
        self.fetch(&format!("/{}", api::ORGANISATIONS), "organisations")
            .await
    }

    /// Get teams of an organisation
    pub async fn list_teams(&self, organisation_id: u32) -> Result<Vec<Team>> {
        let path = format!("/{}?organisation={}", api::TEAMS, organisation_id);
        self.fetch(
            &path,
            &format!("teams for organisation {}", organisation_id),
        )
        .await
    }

    /// Get projects, optionally filtered by organisation and team
    ///
    /// With no filters this is the cheap authenticated read used to check a token.
    pub async fn list_projects(
        &self,
        organisation_id: Option<u32>,
        team_id: Option<u32>,
    ) -> Result<Vec<Project>> {
        let mut params = Vec::new();
        if let Some(org) = organisation_id {
            params.push(format!(
                "{}={}",
                urlencoding::encode("team.organisation.id"),
                org
            ));
        }
        if let Some(team) = team_id {
            params.push(format!("team={}", team));
        }

        let mut path = format!("/{}", api::PROJECTS);
        if !params.is_empty() {
            path.push('?');
            path.push_str(&params.join("&"));
        }

        self.fetch(&path, "projects").await
    }

    /// Get environments of a project
    pub async fn list_environments(&self, project_id: u32, team_id: u32) -> Result<Vec<Environment>> {
        let path = format!(
            "/{}?project={}&{}={}",
            api::ENVIRONMENTS,
            project_id,
            urlencoding::encode("project.team.id"),
            team_id
        );
        self.fetch(&path, &format!("environments for project {}", project_id))
            .await
    }

    pub async fn list_data_transfer_data_types(&self) -> Result<Vec<DataTransferDataType>> {
        self.fetch(
            &format!("/{}", api::DATA_TRANSFER_DATA_TYPES),
            "data transfer data types",
        )
        .await
    }

    /// Exported data of an environment for one data type, newest first
    pub async fn list_exported_datas(
        &self,
        environment_id: u32,
        data_type_id: u32,
    ) -> Result<Vec<ExportedData>> {
        let path = format!(
            "/{}?environment={}&dataTransferDataType={}&{}=desc",
            api::EXPORTED_DATAS,
            environment_id,
            data_type_id,
            urlencoding::encode("order[createdAt]")
        );
        self.fetch(&path, "exported data").await
    }

    pub async fn get_organisation(&self, id: u32) -> Result<Organisation> {
        self.fetch(
            &format!("/{}/{}", api::ORGANISATIONS, id),
            &format!("organisation {}", id),
        )
        .await
    }

    pub async fn get_team(&self, id: u32) -> Result<Team> {
        self.fetch(&format!("/{}/{}", api::TEAMS, id), &format!("team {}", id))
            .await
    }

    pub async fn get_project(&self, id: u32) -> Result<Project> {
        self.fetch(
            &format!("/{}/{}", api::PROJECTS, id),
            &format!("project {}", id),
        )
        .await
    }

    pub async fn get_environment(&self, id: u32) -> Result<Environment> {
        self.fetch(
            &format!("/{}/{}", api::ENVIRONMENTS, id),
            &format!("environment {}", id),
        )
        .await
    }

    /// Resolve a state reference (IRI or bare id) to its name
    pub async fn state_name(&self, state_ref: &str) -> Result<String> {
        let id = id_from_path(state_ref);
        if id.is_empty() {
            return Err(CloudError::Resolution(format!(
                "invalid state reference '{}'",
                state_ref
            )));
        }

        let state: State = self
            .fetch(&format!("/{}/{}", api::STATES, id), &format!("state {}", id))
            .await?;
        Ok(state.name().to_string())
    }

    /// Id of the data transfer data type with the given name
    pub async fn data_transfer_data_type_id(&self, name: &str) -> Result<Option<u32>> {
        let types = self.list_data_transfer_data_types().await?;
        Ok(types.iter().rfind(|t| t.name() == name).map(|t| t.id))
    }

    pub async fn get_environment_access(&self, access_ref: &str) -> Result<EnvironmentAccess> {
        self.fetch_by_ref(api::ENVIRONMENT_ACCESSES, access_ref, "environment access")
            .await
    }

    pub async fn get_access_frontend(&self, access_ref: &str) -> Result<AccessEndpoint> {
        self.fetch_by_ref(api::ENVIRONMENT_ACCESS_FRONTENDS, access_ref, "frontend access")
            .await
    }

    pub async fn get_access_backend(&self, access_ref: &str) -> Result<AccessCredentials> {
        self.fetch_by_ref(api::ENVIRONMENT_ACCESS_BACKENDS, access_ref, "backend access")
            .await
    }

    pub async fn get_access_dev_tools(&self, access_ref: &str) -> Result<AccessCredentials> {
        self.fetch_by_ref(api::ENVIRONMENT_ACCESS_DEV_TOOLS, access_ref, "devtools access")
            .await
    }

    pub async fn get_access_mailhog(&self, access_ref: &str) -> Result<AccessEndpoint> {
        self.fetch_by_ref(api::ENVIRONMENT_ACCESS_MAILHOGS, access_ref, "mailhog access")
            .await
    }

    pub async fn get_access_database(&self, access_ref: &str) -> Result<AccessCredentials> {
        self.fetch_by_ref(api::ENVIRONMENT_ACCESS_DATABASES, access_ref, "database access")
            .await
    }

    /// Trigger a build and deploy of the environment
    pub async fn build_and_deploy(&self, environment_id: u32) -> Result<()> {
        let url = self.url(&format!(
            "/{}/{}/build_and_deploy",
            api::ENVIRONMENTS,
            environment_id
        ));
        debug!("Triggering build and deploy: {}", url);

        let request = self
            .patch(&url)
            .header("Content-Type", "application/merge-patch+json")
            .body("{}");
        self.execute(request, "build and deploy environment").await
    }

    /// Trigger a database export
    pub async fn export_database(&self, environment_id: u32, strip_database: bool) -> Result<()> {
        let url = self.url(&format!(
            "/{}/{}/export_database",
            api::ENVIRONMENTS,
            environment_id
        ));
        debug!("Triggering database export (strip={}): {}", strip_database, url);

        let body = serde_json::json!({ "isStripDatabase": strip_database });
        self.execute(self.put(&url).json(&body), "export database")
            .await
    }

    /// Trigger a media export
    pub async fn export_media(&self, environment_id: u32) -> Result<()> {
        let url = self.url(&format!(
            "/{}/{}/export_media",
            api::ENVIRONMENTS,
            environment_id
        ));
        debug!("Triggering media export: {}", url);

        self.execute(self.put(&url).json(&serde_json::json!({})), "export media")
            .await
    }

    async fn fetch_by_ref<T>(&self, collection: &str, reference: &str, label: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let id = id_from_path(reference);
        if id.is_empty() {
            return Err(CloudError::Resolution(format!(
                "{} is not configured",
                label
            )));
        }
        self.fetch(&format!("/{}/{}", collection, id), label).await
    }
}
