//! Interactive context building and validation against the API

use log::{debug, info};

use crate::cloud::{CloudClient, CloudResource};
use crate::error::{CloudError, Result, ResultExt};
use crate::ui::{select_index, selection_table, Prompt};

use super::models::RcContext;

/// Display names of the entities a context points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextNames {
    pub organization: String,
    pub team: String,
    pub project: String,
    pub environment: String,
}

/// Walks organization → team → project → environment with the operator
pub struct ContextResolver<'a> {
    client: &'a CloudClient,
    prompt: &'a dyn Prompt,
}

impl<'a> ContextResolver<'a> {
    /// `client` must already carry a valid token
    pub fn new(client: &'a CloudClient, prompt: &'a dyn Prompt) -> Self {
        Self { client, prompt }
    }

    /// Four dependent selections, then a name (empty keeps the derived default)
    pub async fn build_interactive(&self) -> Result<RcContext> {
        let mut context = RcContext::default();

        let org = self
            .select_organization(&mut context)
            .await
            .context("selecting organization")?;
        let team = self
            .select_team(&mut context)
            .await
            .context("selecting team")?;
        let project = self
            .select_project(&mut context)
            .await
            .context("selecting project")?;
        let environment = self
            .select_environment(&mut context)
            .await
            .context("selecting environment")?;

        let default_name = RcContext::default_name(&org, &team, &project, &environment);
        let name = self
            .prompt
            .input(
                &format!("Enter the name of the context: [{}]", default_name),
                true,
            )
            .context("getting context name")?;

        context.name = if name.is_empty() { default_name } else { name };
        debug!("Built context {:?}", context);
        Ok(context)
    }

    /// Sets the organization id and returns its code name
    pub async fn select_organization(&self, context: &mut RcContext) -> Result<String> {
        let orgs = self
            .client
            .list_organisations()
            .await
            .context("getting organizations")?;

        let org = self.pick(&orgs, "an", "organization", "organizations")?;
        context.organization = org.id_string();
        Ok(org.code_name().to_string())
    }

    /// Sets the team id and returns its code name
    pub async fn select_team(&self, context: &mut RcContext) -> Result<String> {
        let org_id = context
            .check_organization()
            .context("checking organization")?;

        let teams = self.client.list_teams(org_id).await.context("getting teams")?;

        let team = self.pick(&teams, "a", "team", "teams")?;
        context.team = team.id_string();
        Ok(team.code_name().to_string())
    }

    /// Sets the project id and returns its name
    pub async fn select_project(&self, context: &mut RcContext) -> Result<String> {
        let org_id = context
            .check_organization()
            .context("checking organization")?;
        let team_id = context.check_team().context("checking team")?;

        let projects = self
            .client
            .list_projects(Some(org_id), Some(team_id))
            .await
            .context("getting projects")?;

        let project = self.pick(&projects, "a", "project", "projects")?;
        context.project = project.id_string();
        Ok(project.name().to_string())
    }

    /// Sets the environment id and returns its name
    pub async fn select_environment(&self, context: &mut RcContext) -> Result<String> {
        context
            .check_organization()
            .context("checking organization")?;
        let team_id = context.check_team().context("checking team")?;
        let project_id = context.check_project().context("checking project")?;

        let environments = self
            .client
            .list_environments(project_id, team_id)
            .await
            .context("getting environments")?;

        let environment = self.pick(&environments, "an", "environment", "environments")?;
        context.environment = environment.id_string();
        Ok(environment.name().to_string())
    }

    fn pick<'r, R: CloudResource>(
        &self,
        items: &'r [R],
        article: &str,
        singular: &str,
        plural: &str,
    ) -> Result<&'r R> {
        if items.is_empty() {
            return Err(CloudError::Resolution(format!("no {} found", plural)));
        }

        info!("Select {} {}...", article, singular);
        println!(
            "{}",
            selection_table(items.iter().map(|i| (i.name(), i.code_name())))
        );

        let index = select_index(
            self.prompt,
            &format!("Enter the number of the {}", singular),
            items.len(),
        )
        .context(&format!("getting {} number", singular))?;
        Ok(&items[index])
    }

    /// Names of the four referenced entities; fails if any lookup fails
    pub async fn describe(&self, context: &RcContext) -> Result<ContextNames> {
        let ids = context.ensure_complete()?;

        let (org, team, project, environment) = futures::try_join!(
            async {
                self.client
                    .get_organisation(ids.organization)
                    .await
                    .context("getting organization by ID")
            },
            async {
                self.client
                    .get_team(ids.team)
                    .await
                    .context("getting team by ID")
            },
            async {
                self.client
                    .get_project(ids.project)
                    .await
                    .context("getting project by ID")
            },
            async {
                self.client
                    .get_environment(ids.environment)
                    .await
                    .context("getting environment by ID")
            },
        )?;

        Ok(ContextNames {
            organization: org.name().to_string(),
            team: team.name().to_string(),
            project: project.name().to_string(),
            environment: environment.name().to_string(),
        })
    }

    /// A context is valid while all four entities can still be read
    pub async fn validate(&self, context: &RcContext) -> bool {
        match self.describe(context).await {
            Ok(_) => true,
            Err(e) => {
                debug!("Context '{}' failed validation: {}", context.name, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::ScriptedPrompt;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_json(server: &MockServer, at: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_hierarchy(server: &MockServer) {
        mount_json(
            server,
            "/organisations",
            serde_json::json!([
                {"id": 1, "name": "Acme Inc", "codeName": "acme"},
                {"id": 2, "name": "Globex", "codeName": "globex"}
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/teams"))
            .and(query_param("organisation", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 20, "name": "Web Team", "codeName": "web"}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/projects"))
            .and(query_param("team.organisation.id", "2"))
            .and(query_param("team", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 300, "name": "Shop", "codeName": "shop"},
                {"id": 301, "name": "Blog", "codeName": "blog"}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/environments"))
            .and(query_param("project", "301"))
            .and(query_param("project.team.id", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 4000, "name": "Staging", "codeName": "staging"}
            ])))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_build_interactive_default_name() {
        let server = MockServer::start().await;
        mount_hierarchy(&server).await;
        let client = CloudClient::test_client(&server.uri());
        let prompt = ScriptedPrompt::new(&["2", "1", "2", "1", ""]);

        let context = ContextResolver::new(&client, &prompt)
            .build_interactive()
            .await
            .unwrap();

        assert_eq!(
            context,
            RcContext {
                name: "globex/web:Blog/Staging".to_string(),
                organization: "2".to_string(),
                team: "20".to_string(),
                project: "301".to_string(),
                environment: "4000".to_string(),
            }
        );
        assert_eq!(
            prompt.asked(),
            vec![
                "Enter the number of the organization",
                "Enter the number of the team",
                "Enter the number of the project",
                "Enter the number of the environment",
                "Enter the name of the context: [globex/web:Blog/Staging]",
            ]
        );
    }

    #[tokio::test]
    async fn test_build_interactive_custom_name() {
        let server = MockServer::start().await;
        mount_hierarchy(&server).await;
        let client = CloudClient::test_client(&server.uri());
        let prompt = ScriptedPrompt::new(&["2", "1", "2", "1", "blog-staging"]);

        let context = ContextResolver::new(&client, &prompt)
            .build_interactive()
            .await
            .unwrap();
        assert_eq!(context.name, "blog-staging");
        assert_eq!(context.project, "301");
    }

    #[tokio::test]
    async fn test_out_of_range_selection_is_rejected() {
        let server = MockServer::start().await;
        mount_hierarchy(&server).await;
        let client = CloudClient::test_client(&server.uri());
        let prompt = ScriptedPrompt::new(&["3"]);

        let err = ContextResolver::new(&client, &prompt)
            .build_interactive()
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("selecting organization: getting organization number"));
        assert!(message.contains("out of range"));
    }

    #[tokio::test]
    async fn test_empty_listing_fails() {
        let server = MockServer::start().await;
        mount_json(&server, "/organisations", serde_json::json!([])).await;
        let client = CloudClient::test_client(&server.uri());
        let prompt = ScriptedPrompt::new(&[]);

        let err = ContextResolver::new(&client, &prompt)
            .build_interactive()
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "selecting organization: no organizations found"
        );
        assert!(prompt.asked().is_empty());
    }

    #[tokio::test]
    async fn test_select_team_requires_organization() {
        let client = CloudClient::test_client("http://127.0.0.1:9");
        let prompt = ScriptedPrompt::new(&[]);
        let mut context = RcContext::default();

        let err = ContextResolver::new(&client, &prompt)
            .select_team(&mut context)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "checking organization: no organization selected"
        );
    }

    async fn mount_entities(server: &MockServer, environment_status: u16) {
        mount_json(server, "/organisations/1", serde_json::json!({"id": 1, "name": "Acme"})).await;
        mount_json(server, "/teams/2", serde_json::json!({"id": 2, "name": "Web"})).await;
        mount_json(server, "/projects/3", serde_json::json!({"id": 3, "name": "Shop"})).await;
        Mock::given(method("GET"))
            .and(path("/environments/4"))
            .respond_with(
                ResponseTemplate::new(environment_status)
                    .set_body_json(serde_json::json!({"id": 4, "name": "Prod"})),
            )
            .mount(server)
            .await;
    }

    fn sample_context() -> RcContext {
        RcContext {
            name: "prod".to_string(),
            organization: "1".to_string(),
            team: "2".to_string(),
            project: "3".to_string(),
            environment: "4".to_string(),
        }
    }

    #[tokio::test]
    async fn test_describe_and_validate() {
        let server = MockServer::start().await;
        mount_entities(&server, 200).await;
        let client = CloudClient::test_client(&server.uri());
        let prompt = ScriptedPrompt::new(&[]);
        let resolver = ContextResolver::new(&client, &prompt);

        let names = resolver.describe(&sample_context()).await.unwrap();
        assert_eq!(names.organization, "Acme");
        assert_eq!(names.environment, "Prod");
        assert!(resolver.validate(&sample_context()).await);
    }

    #[tokio::test]
    async fn test_validate_false_when_entity_gone() {
        let server = MockServer::start().await;
        mount_entities(&server, 404).await;
        let client = CloudClient::test_client(&server.uri());
        let prompt = ScriptedPrompt::new(&[]);

        assert!(
            !ContextResolver::new(&client, &prompt)
                .validate(&sample_context())
                .await
        );
    }

    #[tokio::test]
    async fn test_validate_false_for_incomplete_context() {
        let client = CloudClient::test_client("http://127.0.0.1:9");
        let prompt = ScriptedPrompt::new(&[]);
        let mut context = sample_context();
        context.team.clear();

        assert!(
            !ContextResolver::new(&client, &prompt)
                .validate(&context)
                .await
        );
    }
}
