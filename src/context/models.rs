//! Context configuration data models

use serde::{Deserialize, Serialize};

use crate::error::{CloudError, Result};

/// Context configuration file
///
/// Read whole, mutated in memory and rewritten whole by every context command.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextDocument {
    /// API host override
    #[serde(default)]
    pub endpoint: String,
    /// Login identifier used instead of prompting
    #[serde(default)]
    pub id: String,
    /// Login secret used instead of prompting
    #[serde(default)]
    pub password: String,
    /// Named contexts, unique by name, in display order
    #[serde(default)]
    pub contexts: Vec<RcContext>,
    /// Name of the context commands operate on
    #[serde(default, rename = "currentContext")]
    pub current_context: String,
}

/// A named organization / team / project / environment selection
///
/// Ids are kept as decimal strings exactly as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RcContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub environment: String,
}

/// Numeric ids of a complete context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextIds {
    pub organization: u32,
    pub team: u32,
    pub project: u32,
    pub environment: u32,
}

fn parse_id(value: &str) -> Option<u32> {
    value.trim().parse().ok()
}

/// Id of a selected level; empty and "0" mean nothing was selected
fn require_id(value: &str, level: &str) -> Result<u32> {
    let value = value.trim();
    if value.is_empty() || value == "0" {
        return Err(CloudError::Selection(format!("no {} selected", level)));
    }
    parse_id(value)
        .ok_or_else(|| CloudError::Selection(format!("invalid {} id '{}'", level, value)))
}

impl RcContext {
    /// `None` when unset or not a valid id
    pub fn organization_id(&self) -> Option<u32> {
        parse_id(&self.organization)
    }

    pub fn team_id(&self) -> Option<u32> {
        parse_id(&self.team)
    }

    pub fn project_id(&self) -> Option<u32> {
        parse_id(&self.project)
    }

    pub fn environment_id(&self) -> Option<u32> {
        parse_id(&self.environment)
    }

    pub fn check_organization(&self) -> Result<u32> {
        require_id(&self.organization, "organization")
    }

    pub fn check_team(&self) -> Result<u32> {
        require_id(&self.team, "team")
    }

    pub fn check_project(&self) -> Result<u32> {
        require_id(&self.project, "project")
    }

    pub fn check_environment(&self) -> Result<u32> {
        require_id(&self.environment, "environment")
    }

    /// All four ids, or the first level that is not selected
    pub fn ensure_complete(&self) -> Result<ContextIds> {
        Ok(ContextIds {
            organization: self.check_organization()?,
            team: self.check_team()?,
            project: self.check_project()?,
            environment: self.check_environment()?,
        })
    }

    /// Default context name: `<org>/<team>:<project>/<env>`
    pub fn default_name(org: &str, team: &str, project: &str, environment: &str) -> String {
        format!("{}/{}:{}/{}", org, team, project, environment)
    }
}

impl ContextDocument {
    /// The context named by `currentContext`
    ///
    /// A dangling name (e.g. after its context was deleted) is an error, not a panic.
    pub fn current(&self) -> Result<&RcContext> {
        self.contexts
            .iter()
            .find(|c| c.name == self.current_context)
            .ok_or_else(|| CloudError::Resolution("could not find current context".to_string()))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.contexts.iter().position(|c| c.name == name)
    }

    /// Remove the context at a 0-based index; `currentContext` is left as is
    pub fn remove_at(&mut self, index: usize) -> Option<RcContext> {
        if index < self.contexts.len() {
            Some(self.contexts.remove(index))
        } else {
            None
        }
    }

    /// Remove every context with the given name, returning how many were removed
    pub fn remove_named(&mut self, name: &str) -> usize {
        let before = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        before - self.contexts.len()
    }
}
