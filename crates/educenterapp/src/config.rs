//! # Configuration
//!
//! Configuration is managed by [`confique`], which handles layered loading from TOML files,
//! environment variables, and compiled defaults.
//!
//! ## Resolution Order
//!
//! 1. **Environment variables**: `EDUCENTER_BASE_URL`, `EDUCENTER_APP_NAME`, etc.
//! 2. **Explicit file**: the path given with `--config`. It must exist.
//! 3. **User file**: `educenter.toml` in the OS config directory (via `directories`), if present.
//! 4. **Compiled defaults**: `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `base_url` | `http://localhost:8080` | Backend root; resources live under `api/` |
//! | `app_name` | `jeducenterApp` | Namespace for update channels and alert headers |
//! | `language` | `en` | Initial display language |
//! | `response_ordering` | `latest-applied` | `arrival-order` or `latest-applied` |
//! | `detail_updates` | `any` | `any` or `same-id` |
//! | `timeout_secs` | `30` | HTTP request timeout |

use crate::detail::UpdateMatch;
use crate::error::{EduError, Result};
use crate::sync::ResponseOrdering;
use confique::Config;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE: &str = "educenter.toml";

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Backend root URL. Resources live under `api/`.
    #[config(default = "http://localhost:8080", env = "EDUCENTER_BASE_URL")]
    pub base_url: String,

    /// Application namespace, e.g. for `jeducenterApp:studentUpdate`.
    #[config(default = "jeducenterApp", env = "EDUCENTER_APP_NAME")]
    pub app_name: String,

    #[config(default = "en", env = "EDUCENTER_LANGUAGE")]
    pub language: String,

    /// How overlapping list loads resolve: "arrival-order" or "latest-applied".
    #[config(default = "latest-applied", env = "EDUCENTER_RESPONSE_ORDERING")]
    pub response_ordering: String,

    /// Which broadcasts a detail view accepts: "any" or "same-id".
    #[config(default = "any", env = "EDUCENTER_DETAIL_UPDATES")]
    pub detail_updates: String,

    #[config(default = 30, env = "EDUCENTER_TIMEOUT_SECS")]
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            app_name: "jeducenterApp".to_string(),
            language: "en".to_string(),
            response_ordering: "latest-applied".to_string(),
            detail_updates: "any".to_string(),
            timeout_secs: 30,
        }
    }
}

impl AppConfig {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut builder = AppConfig::builder().env();
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(EduError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.file(path);
        }
        if let Some(path) = user_config_path() {
            builder = builder.file(path);
        }
        let config = builder.load()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the string-typed settings parse.
    pub fn validate(&self) -> Result<()> {
        self.response_ordering()?;
        self.detail_updates()?;
        Ok(())
    }

    pub fn response_ordering(&self) -> Result<ResponseOrdering> {
        match self.response_ordering.trim() {
            "arrival-order" => Ok(ResponseOrdering::ArrivalOrder),
            "latest-applied" => Ok(ResponseOrdering::LatestApplied),
            other => Err(EduError::Config(format!(
                "response_ordering must be \"arrival-order\" or \"latest-applied\", got {other:?}"
            ))),
        }
    }

    pub fn detail_updates(&self) -> Result<UpdateMatch> {
        match self.detail_updates.trim() {
            "any" => Ok(UpdateMatch::Any),
            "same-id" => Ok(UpdateMatch::SameId),
            other => Err(EduError::Config(format!(
                "detail_updates must be \"any\" or \"same-id\", got {other:?}"
            ))),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "jeducenter", "educenter").map(|d| d.config_dir().join(CONFIG_FILE))
}
