//! Context management module
//!
//! A context names one organization/team/project/environment selection. Contexts
//! live in the YAML config file together with the name of the current one.

mod commands;
mod models;
mod resolver;
mod store;

pub use commands::{
    contexts_table, merge_context, prepare_context, run_context_check, run_context_command,
    run_context_create, run_context_delete, run_context_list, run_context_select, CheckOutcome,
    MergeOutcome, PreparedContext,
};
pub use models::{ContextDocument, ContextIds, RcContext};
pub use resolver::{ContextNames, ContextResolver};
pub use store::ContextStore;
