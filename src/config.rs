use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::forms::{GuardMode, UnsavedChangesGuard, DEFAULT_UNSAVED_CHANGES_MESSAGE};
use crate::graphql::FlushStrategy;
use crate::routes::SiteType;
use crate::storage::{FileStorage, MemoryStorage, StorageBackend};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub graphql: GraphQlConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the site lives and which one it is
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_origin_url")]
    pub origin_url: String,
    /// Batch endpoint, absolute or relative to `origin_url`
    #[serde(default = "default_batch_graphql_url")]
    pub batch_graphql_url: String,
    #[serde(default)]
    pub site_type: SiteType,
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Bootstrap document supplying the session (and CSRF token)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<String>,
}

fn default_origin_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_batch_graphql_url() -> String {
    "/graphql/batch".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            origin_url: default_origin_url(),
            batch_graphql_url: default_batch_graphql_url(),
            site_type: SiteType::default(),
            locale: default_locale(),
            bootstrap: None,
        }
    }
}

/// Batching behavior of the GraphQL client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlConfig {
    /// Coalesce requests into batches (false = one request per HTTP call)
    #[serde(default = "default_batching")]
    pub batching: bool,
    /// How long to collect requests before flushing (default: 0 = next tick)
    #[serde(default)]
    pub batch_delay_ms: u64,
}

fn default_batching() -> bool {
    true
}

impl Default for GraphQlConfig {
    fn default() -> Self {
        Self {
            batching: default_batching(),
            batch_delay_ms: 0,
        }
    }
}

impl GraphQlConfig {
    pub fn flush_strategy(&self) -> FlushStrategy {
        if self.batching {
            FlushStrategy::Timer(Duration::from_millis(self.batch_delay_ms))
        } else {
            FlushStrategy::Immediate
        }
    }
}

/// Unsaved-changes protection for forms
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationConfig {
    #[serde(default)]
    pub guard_mode: GuardMode,
    #[serde(default = "default_unsaved_changes_message")]
    pub unsaved_changes_message: String,
}

fn default_unsaved_changes_message() -> String {
    DEFAULT_UNSAVED_CHANGES_MESSAGE.to_string()
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            guard_mode: GuardMode::default(),
            unsaved_changes_message: default_unsaved_changes_message(),
        }
    }
}

impl NavigationConfig {
    pub fn guard(&self) -> UnsavedChangesGuard {
        UnsavedChangesGuard::new(self.guard_mode, self.unsaved_changes_message.clone())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

/// Persistence for state that should survive a restart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub kind: StorageKind,
    /// Directory for file storage, relative to the working directory
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    ".justfix/storage".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            kind: StorageKind::default(),
            path: default_storage_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a file under `dir` instead of stderr
    #[serde(default)]
    pub to_file: bool,

    #[serde(default = "default_logs_dir")]
    pub dir: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_logs_dir() -> String {
    ".justfix/logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
            dir: default_logs_dir(),
        }
    }
}

fn absolute(path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    }
}

impl Config {
    /// Project config file, relative to the working directory
    pub fn project_config_path() -> PathBuf {
        PathBuf::from(".justfix").join("config.toml")
    }

    /// Load config with layering: embedded defaults, then the project file,
    /// the user file, an explicit file, and finally `JUSTFIX_*` variables
    /// (`JUSTFIX_GRAPHQL__BATCH_DELAY_MS=5`).
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        Self::load_layers(config_path, true)
    }

    /// Embedded defaults plus an explicit file only. Project and user files
    /// and the environment are not consulted.
    pub fn load_isolated(config_path: Option<&str>) -> Result<Self> {
        Self::load_layers(config_path, false)
    }

    fn load_layers(config_path: Option<&str>, ambient: bool) -> Result<Self> {
        // Start with embedded defaults so nothing needs a config file
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        let project_config = Self::project_config_path();
        if ambient && project_config.exists() {
            builder = builder.add_source(config::File::from(project_config));
        }

        // User config in ~/.config/justfix/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir().filter(|_| ambient) {
            let user_config = config_dir.join("justfix").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::with_name(path));
        }

        if ambient {
            builder = builder.add_source(
                config::Environment::with_prefix("JUSTFIX")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to .justfix/config.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::project_config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(config_path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Batch endpoint resolved against the origin
    pub fn batch_url(&self) -> String {
        let url = &self.server.batch_graphql_url;
        if url.starts_with("http://") || url.starts_with("https://") {
            url.clone()
        } else {
            format!(
                "{}/{}",
                self.server.origin_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        absolute(&self.storage.path)
    }

    pub fn logs_path(&self) -> PathBuf {
        absolute(&self.logging.dir)
    }

    pub fn storage_backend(&self) -> Arc<dyn StorageBackend> {
        match self.storage.kind {
            StorageKind::File => Arc::new(FileStorage::new(self.storage_path())),
            StorageKind::Memory => Arc::new(MemoryStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.site_type, SiteType::Justfix);
        assert_eq!(config.graphql.flush_strategy(), FlushStrategy::Timer(Duration::ZERO));
        assert_eq!(config.batch_url(), "http://localhost:8000/graphql/batch");
        assert!(!config.logging.to_file);
    }

    #[test]
    fn test_flush_strategy() {
        let mut graphql = GraphQlConfig::default();
        graphql.batch_delay_ms = 25;
        assert_eq!(
            graphql.flush_strategy(),
            FlushStrategy::Timer(Duration::from_millis(25))
        );
        graphql.batching = false;
        assert_eq!(graphql.flush_strategy(), FlushStrategy::Immediate);
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(
            &path,
            r#"
[server]
site_type = "NORENT"
batch_graphql_url = "https://api.example.org/graphql/batch"

[navigation]
guard_mode = "report_only"
"#,
        )
        .unwrap();

        let config = Config::load_isolated(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.server.site_type, SiteType::Norent);
        assert_eq!(config.server.locale, "en");
        assert_eq!(config.batch_url(), "https://api.example.org/graphql/batch");
        assert_eq!(config.navigation.guard().mode(), GuardMode::ReportOnly);
    }

    #[test]
    fn test_isolated_load_without_file_is_defaults() {
        let config = Config::load_isolated(None).unwrap();
        assert_eq!(config.server.site_type, SiteType::Justfix);
        assert_eq!(config.server.locale, "en");
        assert_eq!(config.graphql.flush_strategy(), FlushStrategy::Timer(Duration::ZERO));
        assert_eq!(config.batch_url(), "http://localhost:8000/graphql/batch");
        assert_eq!(config.storage.kind, StorageKind::File);
    }

    #[test]
    fn test_save_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.graphql.batch_delay_ms = 10;
        config.storage.kind = StorageKind::Memory;
        config.save_to(&path).unwrap();

        let loaded = Config::load_isolated(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.graphql.batch_delay_ms, 10);
        assert_eq!(loaded.storage.kind, StorageKind::Memory);
    }

    #[test]
    fn test_relative_paths_are_absolutized() {
        let config = Config::default();
        assert!(config.storage_path().is_absolute());
        assert!(config.logs_path().ends_with("logs"));
    }
}
