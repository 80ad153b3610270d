//! Context command handlers

use comfy_table::{Cell, Table};
use log::{debug, info, warn};

use crate::cli::ContextAction;
use crate::cloud::CloudClient;
use crate::error::{Result, ResultExt};
use crate::session::SessionManager;
use crate::settings::Settings;
use crate::ui::{build_table, confirm, select_index, Prompt};

use super::models::{ContextDocument, ContextIds, RcContext};
use super::resolver::{ContextNames, ContextResolver};
use super::store::ContextStore;

/// How a newly built context was merged into the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First context; it also became the current one
    Created,
    /// Added after the existing contexts, current context untouched
    Appended,
    /// Replaced a differing context of the same name
    Overwritten,
    /// Identical context already present
    Unchanged,
    /// Operator declined to overwrite
    Kept,
}

/// Result of `context check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    NoContext,
    Valid,
    Deleted,
    Kept,
}

/// Authenticated client plus the resolved current context
#[derive(Debug)]
pub struct PreparedContext {
    pub client: CloudClient,
    pub context: RcContext,
    pub ids: ContextIds,
}

/// Run a context subcommand
pub async fn run_context_command(
    action: &ContextAction,
    settings: &Settings,
    prompt: &dyn Prompt,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let store = settings.context_store();
    let session = SessionManager::new(settings, prompt);

    match action {
        ContextAction::List(args) => {
            let session = args.full.then_some(&session);
            run_context_list(&store, session, prompt).await?
        }
        ContextAction::Create => {
            run_context_create(&store, &session, prompt).await?;
        }
        ContextAction::Delete => {
            run_context_delete(&store, prompt)?;
        }
        ContextAction::Select => {
            run_context_select(&store, prompt)?;
        }
        ContextAction::Check => {
            run_context_check(&store, &session, prompt).await?;
        }
    }
    Ok(())
}

/// Log in and resolve the current context for an API-backed command
pub async fn prepare_context(
    session: &SessionManager<'_>,
    store: &ContextStore,
) -> Result<PreparedContext> {
    let client = session.ensure_session().await?;

    let document = store.load().context("reading config")?;
    if document.contexts.is_empty() {
        info!("No contexts configured, please run `reward-cloud context create` to create one.");
    }
    let context = document
        .current()
        .context("getting current context")?
        .clone();
    let ids = context
        .ensure_complete()
        .context(&format!("checking context '{}'", context.name))?;

    debug!("Using context '{}' ({:?})", context.name, ids);
    Ok(PreparedContext {
        client,
        context,
        ids,
    })
}

/// Merge a new context into the document
///
/// The first context also becomes current. A same-name context is only replaced
/// when it differs and the operator confirms. Anything else is appended.
pub fn merge_context(
    document: &mut ContextDocument,
    context: RcContext,
    prompt: &dyn Prompt,
) -> Result<MergeOutcome> {
    if document.contexts.is_empty() {
        document.current_context = context.name.clone();
        document.contexts = vec![context];
        return Ok(MergeOutcome::Created);
    }

    let Some(index) = document.position(&context.name) else {
        document.contexts.push(context);
        return Ok(MergeOutcome::Appended);
    };

    if document.contexts[index] == context {
        return Ok(MergeOutcome::Unchanged);
    }

    let question = format!(
        "Context {} already exists. Overwrite? [y/n]",
        context.name
    );
    if confirm(prompt, &question).context("getting overwrite confirmation")? {
        document.contexts[index] = context;
        Ok(MergeOutcome::Overwritten)
    } else {
        Ok(MergeOutcome::Kept)
    }
}

/// Context table, with entity names when `names` is given
pub fn contexts_table(document: &ContextDocument, names: Option<&[ContextNames]>) -> Table {
    let mut header = vec!["#", "Name", "Current"];
    if names.is_some() {
        header.extend(["Organization", "Team", "Project", "Environment"]);
    }

    let rows = document.contexts.iter().enumerate().map(|(i, ctx)| {
        let current = if ctx.name == document.current_context {
            "*"
        } else {
            ""
        };
        let mut row = vec![Cell::new(i + 1), Cell::new(&ctx.name), Cell::new(current)];
        if let Some(detail) = names.and_then(|n| n.get(i)) {
            row.extend([
                Cell::new(&detail.organization),
                Cell::new(&detail.team),
                Cell::new(&detail.project),
                Cell::new(&detail.environment),
            ]);
        }
        row
    });

    build_table(&header, rows)
}

/// List contexts; with a session, resolve entity names too
pub async fn run_context_list(
    store: &ContextStore,
    session: Option<&SessionManager<'_>>,
    prompt: &dyn Prompt,
) -> Result<()> {
    let document = store.load().context("reading config")?;

    if document.contexts.is_empty() {
        info!("No contexts configured, please run `reward-cloud context create` to create one.");
        return Ok(());
    }

    let Some(session) = session else {
        info!("Listing available contexts...");
        println!("{}", contexts_table(&document, None));
        return Ok(());
    };

    let client = session.ensure_session().await.context("checking token")?;
    let resolver = ContextResolver::new(&client, prompt);

    let mut names = Vec::with_capacity(document.contexts.len());
    for ctx in &document.contexts {
        let detail = resolver
            .describe(ctx)
            .await
            .context(&format!("describing context '{}'", ctx.name))?;
        names.push(detail);
    }

    println!("{}", contexts_table(&document, Some(&names)));
    Ok(())
}

/// Build a context interactively and merge it into the config file
pub async fn run_context_create(
    store: &ContextStore,
    session: &SessionManager<'_>,
    prompt: &dyn Prompt,
) -> Result<MergeOutcome> {
    let client = session.ensure_session().await.context("checking token")?;

    let mut document = store.load().context("reading config")?;
    let original = document.clone();

    info!("Creating a new context...");
    let context = ContextResolver::new(&client, prompt)
        .build_interactive()
        .await
        .context("creating cloud context")?;
    let name = context.name.clone();

    let outcome = merge_context(&mut document, context, prompt)?;
    if document == original {
        info!("No changes in configuration. Exiting...");
        return Ok(outcome);
    }

    store.save(&document).context("saving context")?;
    match outcome {
        MergeOutcome::Created => info!("Context {} created and selected", name),
        MergeOutcome::Overwritten => info!("Context {} overwritten", name),
        _ => info!(
            "Context {} created, run `reward-cloud context select` to use it",
            name
        ),
    }
    Ok(outcome)
}

/// Delete a context chosen by number; `currentContext` is not touched
pub fn run_context_delete(store: &ContextStore, prompt: &dyn Prompt) -> Result<Option<RcContext>> {
    info!("Select a context to delete...");
    let mut document = store.load().context("reading config")?;

    if document.contexts.is_empty() {
        info!("No contexts to delete. Exiting...");
        return Ok(None);
    }

    println!("{}", contexts_table(&document, None));
    let index = select_index(
        prompt,
        "Enter the number of the context you want to delete",
        document.contexts.len(),
    )
    .context("getting context number")?;

    let removed = document.remove_at(index);
    store.save(&document).context("saving context")?;

    if let Some(ref ctx) = removed {
        info!("Context {} deleted", ctx.name);
    }
    Ok(removed)
}

/// Make a context chosen by number the current one
pub fn run_context_select(store: &ContextStore, prompt: &dyn Prompt) -> Result<Option<String>> {
    let mut document = store.load().context("reading config")?;

    if document.contexts.is_empty() {
        info!("No contexts configured, please run `reward-cloud context create` to create one.");
        return Ok(None);
    }

    info!("Select a context to use...");
    println!("{}", contexts_table(&document, None));
    let index = select_index(
        prompt,
        "Enter the number of the context you want to use",
        document.contexts.len(),
    )
    .context("getting context number")?;

    document.current_context = document.contexts[index].name.clone();
    store.save(&document).context("saving context")?;

    info!("Context changed to: {}", document.current_context);
    Ok(Some(document.current_context))
}

/// Validate the current context, offering to delete it when stale
pub async fn run_context_check(
    store: &ContextStore,
    session: &SessionManager<'_>,
    prompt: &dyn Prompt,
) -> Result<CheckOutcome> {
    info!("Checking context...");
    let mut document = store.load().context("reading config")?;

    if document.contexts.is_empty() {
        info!("No context selected.");
        return Ok(CheckOutcome::NoContext);
    }

    let current = document
        .current()
        .context("preparing context")?
        .clone();
    let client = session.ensure_session().await?;

    if ContextResolver::new(&client, prompt)
        .validate(&current)
        .await
    {
        info!("Context is valid");
        return Ok(CheckOutcome::Valid);
    }

    warn!("Context is invalid.");
    if !confirm(prompt, "Would you like to delete it? (y/n)").context("getting answer")? {
        return Ok(CheckOutcome::Kept);
    }

    let removed = document.remove_named(&current.name);
    store.save(&document).context("saving context")?;
    info!("Context deleted");
    debug!("Removed {} context(s) named '{}'", removed, current.name);
    Ok(CheckOutcome::Deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TokenStore;
    use crate::ui::ScriptedPrompt;
    use std::fs;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn context(name: &str, env: &str) -> RcContext {
        RcContext {
            name: name.to_string(),
            organization: "1".to_string(),
            team: "2".to_string(),
            project: "3".to_string(),
            environment: env.to_string(),
        }
    }

    fn store_with(dir: &TempDir, document: &ContextDocument) -> ContextStore {
        let store = ContextStore::new(dir.path().join("config.yml"));
        store.save(document).unwrap();
        store
    }

    /// Session whose cached token the mock server accepts
    async fn session<'a>(
        server: &MockServer,
        dir: &TempDir,
        prompt: &'a ScriptedPrompt,
    ) -> SessionManager<'a> {
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(server)
            .await;
        let tokens = TokenStore::new(dir.path().join(".cache").join("token"));
        tokens.write("tok").unwrap();
        SessionManager::with_client(
            CloudClient::test_client(&server.uri()),
            tokens,
            None,
            None,
            prompt,
        )
    }

    #[test]
    fn test_merge_into_empty_sets_current() {
        let mut doc = ContextDocument::default();
        let prompt = ScriptedPrompt::new(&[]);
        let outcome = merge_context(&mut doc, context("prod", "4"), &prompt).unwrap();

        assert_eq!(outcome, MergeOutcome::Created);
        assert_eq!(doc.contexts, vec![context("prod", "4")]);
        assert_eq!(doc.current_context, "prod");
    }

    #[test]
    fn test_merge_identical_is_noop() {
        let mut doc = ContextDocument {
            contexts: vec![context("prod", "4")],
            current_context: "prod".to_string(),
            ..Default::default()
        };
        let before = doc.clone();
        let prompt = ScriptedPrompt::new(&[]);

        let outcome = merge_context(&mut doc, context("prod", "4"), &prompt).unwrap();
        assert_eq!(outcome, MergeOutcome::Unchanged);
        assert_eq!(doc, before);
        assert!(prompt.asked().is_empty());
    }

    #[test]
    fn test_merge_different_same_name_asks() {
        let base = ContextDocument {
            contexts: vec![context("prod", "4")],
            current_context: "prod".to_string(),
            ..Default::default()
        };

        let mut doc = base.clone();
        let prompt = ScriptedPrompt::new(&["y"]);
        let outcome = merge_context(&mut doc, context("prod", "5"), &prompt).unwrap();
        assert_eq!(outcome, MergeOutcome::Overwritten);
        assert_eq!(doc.contexts[0].environment, "5");
        assert_eq!(
            prompt.asked(),
            vec!["Context prod already exists. Overwrite? [y/n]"]
        );

        let mut doc = base.clone();
        let prompt = ScriptedPrompt::new(&["n"]);
        let outcome = merge_context(&mut doc, context("prod", "5"), &prompt).unwrap();
        assert_eq!(outcome, MergeOutcome::Kept);
        assert_eq!(doc, base);
    }

    #[test]
    fn test_merge_new_name_appends_without_selecting() {
        let mut doc = ContextDocument {
            contexts: vec![context("prod", "4")],
            current_context: "prod".to_string(),
            ..Default::default()
        };
        let prompt = ScriptedPrompt::new(&[]);
        let outcome = merge_context(&mut doc, context("dev", "5"), &prompt).unwrap();

        assert_eq!(outcome, MergeOutcome::Appended);
        assert_eq!(doc.contexts.len(), 2);
        assert_eq!(doc.contexts[1].name, "dev");
        assert_eq!(doc.current_context, "prod");
    }

    #[test]
    fn test_delete_only_context_leaves_current_dangling() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            &ContextDocument {
                contexts: vec![context("prod", "4")],
                current_context: "prod".to_string(),
                ..Default::default()
            },
        );
        let prompt = ScriptedPrompt::new(&["1"]);

        let removed = run_context_delete(&store, &prompt).unwrap();
        assert_eq!(removed.unwrap().name, "prod");

        let doc = store.load().unwrap();
        assert!(doc.contexts.is_empty());
        assert_eq!(doc.current_context, "prod");
        assert!(doc.current().is_err());
    }

    #[test]
    fn test_delete_rejects_out_of_range() {
        let dir = TempDir::new().unwrap();
        let original = ContextDocument {
            contexts: vec![context("prod", "4"), context("dev", "5")],
            current_context: "prod".to_string(),
            ..Default::default()
        };
        let store = store_with(&dir, &original);

        for answer in ["0", "3"] {
            let prompt = ScriptedPrompt::new(&[answer]);
            let err = run_context_delete(&store, &prompt).unwrap_err();
            assert!(err.to_string().contains("out of range"));
        }
        assert_eq!(store.load().unwrap(), original);
    }

    #[test]
    fn test_delete_with_no_contexts_does_not_prompt() {
        let dir = TempDir::new().unwrap();
        let store = ContextStore::new(dir.path().join("config.yml"));
        let prompt = ScriptedPrompt::new(&[]);

        assert!(run_context_delete(&store, &prompt).unwrap().is_none());
        assert!(prompt.asked().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_select_sets_current() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            &ContextDocument {
                contexts: vec![context("prod", "4"), context("dev", "5")],
                current_context: "prod".to_string(),
                ..Default::default()
            },
        );
        let prompt = ScriptedPrompt::new(&["2"]);

        let selected = run_context_select(&store, &prompt).unwrap();
        assert_eq!(selected.as_deref(), Some("dev"));
        assert_eq!(store.load().unwrap().current_context, "dev");
    }

    #[test]
    fn test_select_rejects_non_numeric() {
        let dir = TempDir::new().unwrap();
        let store = store_with(
            &dir,
            &ContextDocument {
                contexts: vec![context("prod", "4")],
                current_context: "prod".to_string(),
                ..Default::default()
            },
        );
        let prompt = ScriptedPrompt::new(&["first"]);
        let err = run_context_select(&store, &prompt).unwrap_err();
        assert!(err.to_string().starts_with("getting context number"));
    }

    #[test]
    fn test_contexts_table_marks_current() {
        let doc = ContextDocument {
            contexts: vec![context("prod", "4"), context("dev", "5")],
            current_context: "dev".to_string(),
            ..Default::default()
        };
        let out = contexts_table(&doc, None).to_string();
        assert!(out.contains("Current"));
        assert!(out.contains('*'));
        assert!(!out.contains("Organization"));

        let names = vec![
            ContextNames {
                organization: "Acme".to_string(),
                team: "Web".to_string(),
                project: "Shop".to_string(),
                environment: "Prod".to_string(),
            },
            ContextNames {
                organization: "Acme".to_string(),
                team: "Web".to_string(),
                project: "Shop".to_string(),
                environment: "Dev".to_string(),
            },
        ];
        let out = contexts_table(&doc, Some(&names)).to_string();
        assert!(out.contains("Organization"));
        assert!(out.contains("Dev"));
    }

    async fn mount_hierarchy(server: &MockServer) {
        for (at, body) in [
            ("/organisations", serde_json::json!([{"id": 1, "name": "Acme", "codeName": "acme"}])),
            ("/teams", serde_json::json!([{"id": 2, "name": "Web", "codeName": "web"}])),
            ("/environments", serde_json::json!([{"id": 4, "name": "Prod", "codeName": "prod"}])),
        ] {
            Mock::given(method("GET"))
                .and(path(at))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(server)
                .await;
        }
    }

    #[tokio::test]
    async fn test_create_identical_context_does_not_rewrite() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&["1", "1", "1", "1", "prod"]);
        let session = session_with_projects(&server, &dir, &prompt).await;
        mount_hierarchy(&server).await;

        let existing = ContextDocument {
            contexts: vec![RcContext {
                name: "prod".to_string(),
                organization: "1".to_string(),
                team: "2".to_string(),
                project: "3".to_string(),
                environment: "4".to_string(),
            }],
            current_context: "prod".to_string(),
            ..Default::default()
        };
        let store = store_with(&dir, &existing);
        let before = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), format!("{}\n# keep\n", before)).unwrap();

        let outcome = run_context_create(&store, &session, &prompt).await.unwrap();
        assert_eq!(outcome, MergeOutcome::Unchanged);
        assert!(fs::read_to_string(store.path()).unwrap().contains("# keep"));
    }

    #[tokio::test]
    async fn test_create_into_empty_document() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&["1", "1", "1", "1", ""]);
        let session = session_with_projects(&server, &dir, &prompt).await;
        mount_hierarchy(&server).await;
        let store = ContextStore::new(dir.path().join("config.yml"));

        let outcome = run_context_create(&store, &session, &prompt).await.unwrap();
        assert_eq!(outcome, MergeOutcome::Created);

        let doc = store.load().unwrap();
        assert_eq!(doc.contexts.len(), 1);
        assert_eq!(doc.contexts[0].name, "acme/web:Shop/Prod");
        assert_eq!(doc.current_context, "acme/web:Shop/Prod");
    }

    /// Session whose token check and project selection share one listing
    async fn session_with_projects<'a>(
        server: &MockServer,
        dir: &TempDir,
        prompt: &'a ScriptedPrompt,
    ) -> SessionManager<'a> {
        Mock::given(method("GET"))
            .and(path("/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 3, "name": "Shop", "codeName": "shop"}
            ])))
            .mount(server)
            .await;
        let tokens = TokenStore::new(dir.path().join(".cache").join("token"));
        tokens.write("tok").unwrap();
        SessionManager::with_client(
            CloudClient::test_client(&server.uri()),
            tokens,
            None,
            None,
            prompt,
        )
    }

    #[tokio::test]
    async fn test_check_deletes_invalid_context_on_yes() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&["yes"]);
        let session = session(&server, &dir, &prompt).await;
        // no entity mocks: every lookup is a 404
        let store = store_with(
            &dir,
            &ContextDocument {
                contexts: vec![context("prod", "4"), context("dev", "5")],
                current_context: "prod".to_string(),
                ..Default::default()
            },
        );

        let outcome = run_context_check(&store, &session, &prompt).await.unwrap();
        assert_eq!(outcome, CheckOutcome::Deleted);
        assert_eq!(
            prompt.asked(),
            vec!["Would you like to delete it? (y/n)"]
        );

        let doc = store.load().unwrap();
        assert_eq!(doc.contexts, vec![context("dev", "5")]);
        assert_eq!(doc.current_context, "prod");
    }

    #[tokio::test]
    async fn test_check_keeps_invalid_context_on_no() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&["n"]);
        let session = session(&server, &dir, &prompt).await;
        let original = ContextDocument {
            contexts: vec![context("prod", "4")],
            current_context: "prod".to_string(),
            ..Default::default()
        };
        let store = store_with(&dir, &original);

        let outcome = run_context_check(&store, &session, &prompt).await.unwrap();
        assert_eq!(outcome, CheckOutcome::Kept);
        assert_eq!(store.load().unwrap(), original);
    }

    #[tokio::test]
    async fn test_check_without_contexts_skips_login() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&[]);
        let tokens = TokenStore::new(dir.path().join("token"));
        let session = SessionManager::with_client(
            CloudClient::test_client(&server.uri()),
            tokens,
            None,
            None,
            &prompt,
        );
        let store = ContextStore::new(dir.path().join("config.yml"));

        let outcome = run_context_check(&store, &session, &prompt).await.unwrap();
        assert_eq!(outcome, CheckOutcome::NoContext);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_prepare_context_dangling_current() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&[]);
        let session = session(&server, &dir, &prompt).await;
        let store = store_with(
            &dir,
            &ContextDocument {
                contexts: vec![context("dev", "5")],
                current_context: "prod".to_string(),
                ..Default::default()
            },
        );

        let err = prepare_context(&session, &store).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "getting current context: could not find current context"
        );
    }

    #[tokio::test]
    async fn test_prepare_context_after_deleting_only_context() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&["1"]);
        let session = session(&server, &dir, &prompt).await;
        let store = store_with(
            &dir,
            &ContextDocument {
                contexts: vec![context("prod", "4")],
                current_context: "prod".to_string(),
                ..Default::default()
            },
        );
        run_context_delete(&store, &prompt).unwrap();

        let err = prepare_context(&session, &store).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "getting current context: could not find current context"
        );
    }

    #[tokio::test]
    async fn test_prepare_context_resolves_ids() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let prompt = ScriptedPrompt::new(&[]);
        let session = session(&server, &dir, &prompt).await;
        let store = store_with(
            &dir,
            &ContextDocument {
                contexts: vec![context("prod", "4")],
                current_context: "prod".to_string(),
                ..Default::default()
            },
        );

        let prepared = prepare_context(&session, &store).await.unwrap();
        assert_eq!(prepared.ids.environment, 4);
        assert_eq!(prepared.client.token(), Some("tok"));
        assert_eq!(prepared.context.name, "prod");
    }
}
