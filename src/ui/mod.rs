//! UI utilities for terminal interaction
//!
//! Operator prompts, the progress spinner and table rendering.

mod prompt;
mod renderer;
mod table;

pub use prompt::{confirm, select_index, DialoguerPrompt, Prompt};
pub use renderer::{ctrl_c, ProgressRenderer, RenderOutcome};
pub use table::{build_table, selection_table};

#[cfg(test)]
pub use prompt::ScriptedPrompt;
