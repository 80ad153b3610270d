//! Operator input: free text, secrets, numbered selections and confirmations

use dialoguer::{Input, Password};

use crate::error::{CloudError, Result};

/// Source of operator input
///
/// Commands only talk to this trait so tests can script the answers.
pub trait Prompt {
    /// Read a line of text, trimmed. Empty input re-prompts unless `allow_empty`.
    fn input(&self, prompt: &str, allow_empty: bool) -> Result<String>;

    /// Read a secret without echo, trimmed
    fn password(&self, prompt: &str) -> Result<String>;
}

/// Interactive terminal prompt
#[derive(Debug, Default, Clone, Copy)]
pub struct DialoguerPrompt;

impl Prompt for DialoguerPrompt {
    fn input(&self, prompt: &str, allow_empty: bool) -> Result<String> {
        loop {
            let value: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(allow_empty)
                .interact_text()?;
            let value = value.trim();
            if allow_empty || !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }

    fn password(&self, prompt: &str) -> Result<String> {
        loop {
            let value = Password::new().with_prompt(prompt).interact()?;
            let value = value.trim();
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }
}

/// Ask for a 1-based choice among `len` items and return its 0-based index
///
/// Out-of-range choices are rejected, never clamped.
pub fn select_index(prompt: &dyn Prompt, label: &str, len: usize) -> Result<usize> {
    let answer = prompt.input(label, false)?;
    let choice: usize = answer.parse().map_err(|_| {
        CloudError::Selection(format!("converting '{}' to a number", answer))
    })?;

    if choice < 1 || choice > len {
        return Err(CloudError::Selection(format!(
            "number {} out of range, expected 1 to {}",
            choice, len
        )));
    }
    Ok(choice - 1)
}

/// Ask a yes/no question; only `y` or `yes` (any case) count as yes
pub fn confirm(prompt: &dyn Prompt, question: &str) -> Result<bool> {
    let answer = prompt.input(question, true)?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
pub use scripted::ScriptedPrompt;
