//! The server-rendered bootstrap document consumed once at startup

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::routes::SiteType;
use crate::session::Session;

/// Read-mostly facts about the deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppServerInfo {
    #[serde(rename = "originURL")]
    pub origin_url: String,
    #[serde(rename = "staticURL", default)]
    pub static_url: String,
    #[serde(rename = "batchGraphQLURL")]
    pub batch_graphql_url: String,
    #[serde(default)]
    pub site_type: SiteType,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_enabled_locales")]
    pub enabled_locales: Vec<String>,
    #[serde(default)]
    pub is_demo_deployment: bool,
    /// Feature flags switched on for the whole deployment
    #[serde(default)]
    pub active_feature_flags: Vec<String>,
}

fn default_enabled_locales() -> Vec<String> {
    vec!["en".to_string()]
}

impl AppServerInfo {
    /// Absolute batch endpoint; relative URLs are resolved against the origin
    pub fn absolute_batch_url(&self) -> String {
        if self.batch_graphql_url.starts_with("http://")
            || self.batch_graphql_url.starts_with("https://")
        {
            self.batch_graphql_url.clone()
        } else {
            format!(
                "{}/{}",
                self.origin_url.trim_end_matches('/'),
                self.batch_graphql_url.trim_start_matches('/')
            )
        }
    }
}

/// Everything the page hands the client on first load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppBootstrap {
    pub server: AppServerInfo,
    #[serde(default)]
    pub session: Session,
    #[serde(rename = "initialURL", default = "default_initial_url")]
    pub initial_url: String,
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_initial_url() -> String {
    "/".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

impl AppBootstrap {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse bootstrap document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read bootstrap file {}", path.display()))?;
        Self::from_json(&contents)
    }
}
