//! Environment operations
//!
//! Mutations that leave the environment busy are watched by [`OperationPoller`]
//! while a spinner shows the latest observed state.

mod commands;
mod poller;

pub use commands::{
    access_rows, latest_export, run_env_command, run_env_status, run_info, run_info_command,
    run_operation, run_watched, EnvironmentSummary, EnvironmentTarget, Operation, WatchOptions,
};
pub use poller::{
    cancellation, CancelHandle, CancelToken, OperationPoller, ProgressEvent, ReadinessLatch,
    WatchTarget,
};
