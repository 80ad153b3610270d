//! Session management
//!
//! Owns the bearer token: the on-disk cache, live validation against the API
//! and interactive login when the cached token is missing or rejected.

mod commands;
mod manager;
mod token_store;

pub use commands::run_login_command;
pub use manager::{validate_token, SessionManager};
pub use token_store::{decode_token, encode_token, TokenStore};
