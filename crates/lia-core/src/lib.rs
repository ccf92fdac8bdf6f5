//! Shared domain types and configuration for the LinkedIn activity pipeline.

mod app_config;
mod config;
pub mod input;
pub mod posts;
pub mod profile_url;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use input::{
    load_profile_urls, load_profile_urls_csv, parse_profile_urls, InputError, DEFAULT_URL_COLUMN,
};
pub use posts::{Post, ProfileRecord, StoreDocument};
pub use profile_url::{normalize_profile_url, to_recent_activity};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
