//! Environment command handlers

use comfy_table::Table;
use log::{debug, info};
use reqwest::Url;
use tokio::sync::mpsc;

use crate::cli::EnvAction;
use crate::cloud::models::AccessCredentials;
use crate::cloud::{CloudClient, CloudResource};
use crate::config::poll;
use crate::context::{prepare_context, ContextIds, ContextStore};
use crate::error::{CloudError, Result, ResultExt};
use crate::session::SessionManager;
use crate::settings::Settings;
use crate::ui::{build_table, ctrl_c, ProgressRenderer, Prompt, RenderOutcome};

use super::poller::{cancellation, OperationPoller, WatchTarget};

/// How a watched command is displayed
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    pub poller: OperationPoller,
    /// Draw the spinner and listen for Ctrl+C
    pub interactive: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poller: OperationPoller::default(),
            interactive: true,
        }
    }
}

/// A mutation that leaves the environment busy until it is running again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    BuildAndDeploy,
    ExportDatabase { strip_database: bool },
    ExportMedia,
}

impl Operation {
    /// Data transfer type whose newest export is reported on readiness
    pub fn data_type(&self) -> Option<&'static str> {
        match self {
            Operation::BuildAndDeploy => None,
            Operation::ExportDatabase { .. } => Some(poll::DATATYPE_DATABASE),
            Operation::ExportMedia => Some(poll::DATATYPE_MEDIA),
        }
    }

    pub fn initial_message(&self) -> String {
        match self.data_type() {
            None => "Building environment...".to_string(),
            Some(data_type) => format!("Exporting {}...", data_type),
        }
    }

    async fn trigger(&self, client: &CloudClient, environment_id: u32) -> Result<()> {
        match *self {
            Operation::BuildAndDeploy => client
                .build_and_deploy(environment_id)
                .await
                .context("building environment"),
            Operation::ExportDatabase { strip_database } => client
                .export_database(environment_id, strip_database)
                .await
                .context("exporting database"),
            Operation::ExportMedia => client
                .export_media(environment_id)
                .await
                .context("exporting media"),
        }
    }
}

/// Watches one environment, logging in again on every tick
pub struct EnvironmentTarget<'s, 'a> {
    session: &'s SessionManager<'a>,
    environment_id: u32,
    data_type: Option<&'static str>,
    client: Option<CloudClient>,
}

impl<'s, 'a> EnvironmentTarget<'s, 'a> {
    pub fn new(
        session: &'s SessionManager<'a>,
        environment_id: u32,
        data_type: Option<&'static str>,
    ) -> Self {
        Self {
            session,
            environment_id,
            data_type,
            client: None,
        }
    }
}

impl WatchTarget for EnvironmentTarget<'_, '_> {
    async fn observe(&mut self) -> Result<String> {
        let client = self.session.ensure_session().await?;

        let environment = client
            .get_environment(self.environment_id)
            .await
            .context("getting environment")?;
        let state = client
            .state_name(environment.state_ref())
            .await
            .context("getting state")?;

        self.client = Some(client);
        Ok(state)
    }

    fn status_message(&self, state: &str) -> String {
        format!("Environment status: {}", state)
    }

    async fn on_ready(&mut self) -> Option<String> {
        let data_type = self.data_type?;
        let client = self.client.as_ref()?;
        Some(latest_export(client, self.environment_id, data_type).await)
    }
}

/// Describe the newest exported artifact; lookup failures become the message
pub async fn latest_export(client: &CloudClient, environment_id: u32, data_type: &str) -> String {
    let data_type_id = match client.data_transfer_data_type_id(data_type).await {
        Ok(Some(id)) => id,
        Ok(None) => return format!("No data transfer type named '{}'", data_type),
        Err(e) => return format!("Error getting data type id: {}", e),
    };

    match client.list_exported_datas(environment_id, data_type_id).await {
        Ok(datas) => match datas.first() {
            Some(data) => format!("Exported data: {}", data.url()),
            None => "No exported data found".to_string(),
        },
        Err(e) => format!("Error getting exported data: {}", e),
    }
}

/// Run the poller and the renderer side by side until both have finished
///
/// Ctrl+C stops the renderer and cancels the poller; the watch then fails with
/// `CloudError::Cancelled`.
pub async fn run_watched<T: WatchTarget>(
    target: &mut T,
    options: WatchOptions,
    initial_message: &str,
) -> Result<Option<String>> {
    let (handle, mut token) = cancellation();
    let (tx, mut rx) = mpsc::channel(1);

    let render = async move {
        let outcome = if options.interactive {
            ProgressRenderer::new(initial_message)
                .run(&mut rx, ctrl_c())
                .await
        } else {
            ProgressRenderer::hidden(initial_message)
                .run(&mut rx, std::future::pending())
                .await
        };
        if outcome == RenderOutcome::Cancelled {
            handle.cancel();
        }
        outcome
    };

    let poll = async move {
        let result = options.poller.watch(target, &tx, &mut token).await;
        drop(tx);
        result
    };

    let (outcome, result) = tokio::join!(render, poll);
    debug!("Renderer finished: {:?}", outcome);

    let result = result?;
    if outcome == RenderOutcome::Cancelled {
        return Err(CloudError::Cancelled);
    }
    Ok(result)
}

/// Run an environment subcommand
pub async fn run_env_command(
    action: &EnvAction,
    settings: &Settings,
    prompt: &dyn Prompt,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let store = settings.context_store();
    let session = SessionManager::new(settings, prompt);
    let options = WatchOptions::default();

    let operation = match action {
        EnvAction::Status => {
            let table = run_env_status(&session, &store).await?;
            println!("{}", table);
            return Ok(());
        }
        EnvAction::BuildAndDeploy => Operation::BuildAndDeploy,
        EnvAction::ExportDb(args) => Operation::ExportDatabase {
            strip_database: args.strip_database,
        },
        EnvAction::ExportMedia => Operation::ExportMedia,
    };

    run_operation(&session, &store, operation, options).await?;
    Ok(())
}

/// Trigger an operation on the current environment and watch it to completion
pub async fn run_operation(
    session: &SessionManager<'_>,
    store: &ContextStore,
    operation: Operation,
    options: WatchOptions,
) -> Result<Option<String>> {
    let prepared = prepare_context(session, store)
        .await
        .context("preparing context")?;
    let environment_id = prepared.ids.environment;

    operation.trigger(&prepared.client, environment_id).await?;
    debug!("Triggered {:?} on environment {}", operation, environment_id);

    let mut target = EnvironmentTarget::new(session, environment_id, operation.data_type());
    let result = run_watched(&mut target, options, &operation.initial_message()).await?;

    match result {
        Some(ref message) => info!("Export finished: {}", message),
        None => info!("Build and deploy finished"),
    }
    Ok(result)
}

/// Names and states of the current project and environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSummary {
    pub project_name: String,
    pub project_state: String,
    pub environment_name: String,
    pub environment_state: String,
    pub access_ref: Option<String>,
}

impl EnvironmentSummary {
    pub async fn fetch(client: &CloudClient, ids: &ContextIds) -> Result<Self> {
        let project = client
            .get_project(ids.project)
            .await
            .context("getting project")?;
        let project_state = client
            .state_name(project.state_ref())
            .await
            .context("getting project state")?;

        let environment = client
            .get_environment(ids.environment)
            .await
            .context("getting environment")?;
        let environment_state = client
            .state_name(environment.state_ref())
            .await
            .context("getting state")?;

        Ok(Self {
            project_name: project.name().to_string(),
            project_state,
            environment_name: environment.name().to_string(),
            environment_state,
            access_ref: environment.access_ref().map(str::to_string),
        })
    }

    pub fn rows(&self) -> Vec<(String, String)> {
        vec![
            ("Project Name".to_string(), self.project_name.clone()),
            ("Project State".to_string(), self.project_state.clone()),
            ("Environment Name".to_string(), self.environment_name.clone()),
            ("Environment State".to_string(), self.environment_state.clone()),
        ]
    }
}

fn info_table(rows: Vec<(String, String)>) -> Table {
    build_table(&["INFO", ""], rows.into_iter().map(|(k, v)| vec![k, v]))
}

/// `env status`
pub async fn run_env_status(session: &SessionManager<'_>, store: &ContextStore) -> Result<Table> {
    let prepared = prepare_context(session, store)
        .await
        .context("preparing context")?;
    let summary = EnvironmentSummary::fetch(&prepared.client, &prepared.ids).await?;
    Ok(info_table(summary.rows()))
}

/// `info`: summary plus access details when the environment exposes them
pub async fn run_info(session: &SessionManager<'_>, store: &ContextStore) -> Result<Table> {
    let prepared = prepare_context(session, store)
        .await
        .context("preparing context")?;
    let summary = EnvironmentSummary::fetch(&prepared.client, &prepared.ids).await?;

    let mut rows = summary.rows();
    match summary.access_ref {
        Some(ref access_ref) => rows.extend(access_rows(&prepared.client, access_ref).await?),
        None => debug!("Environment has no access details"),
    }
    Ok(info_table(rows))
}

/// Entry point for the top-level `info` command
pub async fn run_info_command(
    settings: &Settings,
    prompt: &dyn Prompt,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let session = SessionManager::new(settings, prompt);
    let table = run_info(&session, &settings.context_store()).await?;
    println!("{}", table);
    Ok(())
}

/// Frontend, backend, devtools, phpMyAdmin and Mailhog access rows
pub async fn access_rows(client: &CloudClient, access_ref: &str) -> Result<Vec<(String, String)>> {
    let access = client
        .get_environment_access(access_ref)
        .await
        .context("getting accesses")?;

    let frontend = client
        .get_access_frontend(attr(&access.frontend))
        .await
        .context("getting frontend")?;
    let backend = client
        .get_access_backend(attr(&access.backend))
        .await
        .context("getting backend")?;
    let backend_password = decode_password(&backend, "backend")?;

    let dev_tools = client
        .get_access_dev_tools(attr(&access.dev_tools))
        .await
        .context("getting devtools")?;
    let dev_tools_password = decode_password(&dev_tools, "devtools")?;
    let dev_tools_url = url_with_credentials(&dev_tools, &dev_tools_password, "devtools")?;

    let mailhog = client
        .get_access_mailhog(attr(&access.mailhog))
        .await
        .context("getting mailhog")?;

    let database = client
        .get_access_database(attr(&access.database))
        .await
        .context("getting phpmyadmin")?;
    let database_password = decode_password(&database, "phpmyadmin")?;
    let database_url = url_with_credentials(&database, &database_password, "phpmyadmin")?;

    let row = |k: &str, v: &str| (k.to_string(), v.to_string());
    Ok(vec![
        row("Frontend URL", frontend.url()),
        row("Backend URL", backend.url()),
        row("Username", backend.username()),
        row("Password", &backend_password),
        row("Devtools URL", &dev_tools_url),
        row("Devtools Username", dev_tools.username()),
        row("Devtools Password", &dev_tools_password),
        row("PHPMyAdmin URL", &database_url),
        row("PHPMyAdmin Username", database.username()),
        row("PHPMyAdmin Password", &database_password),
        row("Mailhog URL", mailhog.url()),
    ])
}

fn attr(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn decode_password(access: &AccessCredentials, label: &str) -> Result<String> {
    access
        .decoded_password()
        .map_err(|e| CloudError::Resolution(format!("decoding {} password: {}", label, e)))
}

/// The access URL with its own username and password embedded
fn url_with_credentials(access: &AccessCredentials, password: &str, label: &str) -> Result<String> {
    let parse_error = |e: String| CloudError::Resolution(format!("parsing {} url: {}", label, e));

    let mut url = Url::parse(access.url()).map_err(|e| parse_error(e.to_string()))?;
    url.set_username(access.username())
        .map_err(|_| parse_error("cannot carry a username".to_string()))?;
    url.set_password(Some(password))
        .map_err(|_| parse_error("cannot carry a password".to_string()))?;
    Ok(url.to_string())
}
