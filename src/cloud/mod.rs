//! Reward Cloud API client and models

mod api;
mod client;
pub mod models;
pub mod traits;

pub use client::CloudClient;
pub use models::{id_from_path, Credentials, Environment, Organisation, Project, Team};
pub use traits::CloudResource;
