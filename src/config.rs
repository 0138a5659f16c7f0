use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::models::UNSPECIFIED_CONTRIBUTOR;
use crate::validation::{InputValidator, MAX_TEMPLATE_LENGTH, MAX_WORD_LENGTH};

/// Application configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub board: BoardConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: String, // "memory" or "sled"
    pub path: String,
    pub event_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub format: String, // "json" or "text"
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub default_contributor: String,
    pub history_limit: u64,
    pub max_word_length: u64,
    pub max_template_length: u64,
    pub seed_defaults: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                backend: "sled".to_string(),
                path: "./data/motivation".to_string(),
                event_capacity: 64,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
                format: "text".to_string(),
            },
            board: BoardConfig {
                default_contributor: UNSPECIFIED_CONTRIBUTOR.to_string(),
                history_limit: 20,
                max_word_length: MAX_WORD_LENGTH as u64,
                max_template_length: MAX_TEMPLATE_LENGTH as u64,
                seed_defaults: true,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, optionally adding an explicit file on top of the defaults
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        // Start with default values
        let mut builder = Config::builder();
        for (key, value) in Self::default() {
            builder = builder.set_default(key, value)?;
        }

        // Add config files if they exist
        builder = builder
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(File::with_name("config").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        // Add environment variables with prefix, e.g. MOTIVATION__STORAGE__BACKEND
        let config = builder
            .add_source(
                Environment::with_prefix("MOTIVATION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("Failed to deserialize configuration: {}", e))?;

        // Validate configuration
        app_config.validate()?;

        Ok(app_config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate storage config
        let valid_backends = ["memory", "sled"];
        if !valid_backends.contains(&self.storage.backend.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid storage backend: {}. Must be one of: {:?}",
                self.storage.backend,
                valid_backends
            ));
        }
        if self.storage.backend == "sled" && self.storage.path.trim().is_empty() {
            return Err(anyhow::anyhow!("storage.path is required for the sled backend"));
        }
        if self.storage.event_capacity == 0 {
            return Err(anyhow::anyhow!("event_capacity must be greater than 0"));
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log level: {}. Must be one of: {:?}",
                self.logging.level,
                valid_levels
            ));
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow::anyhow!(
                "Invalid log format: {}. Must be one of: {:?}",
                self.logging.format,
                valid_formats
            ));
        }

        // Validate board config
        if self.board.default_contributor.trim().is_empty() {
            return Err(anyhow::anyhow!("default_contributor cannot be empty"));
        }
        if self.board.history_limit == 0 {
            return Err(anyhow::anyhow!("history_limit must be greater than 0"));
        }
        if self.board.max_word_length == 0 {
            return Err(anyhow::anyhow!("max_word_length must be greater than 0"));
        }
        if self.board.max_template_length == 0 {
            return Err(anyhow::anyhow!("max_template_length must be greater than 0"));
        }

        Ok(())
    }

    /// Directory of the sled database
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.path)
    }

    /// Validator with the configured length bounds
    #[must_use]
    pub fn validator(&self) -> InputValidator {
        InputValidator::new(
            usize::try_from(self.board.max_word_length).unwrap_or(MAX_WORD_LENGTH),
            usize::try_from(self.board.max_template_length).unwrap_or(MAX_TEMPLATE_LENGTH),
        )
    }

    /// Broadcast buffer size
    #[must_use]
    pub fn event_capacity(&self) -> usize {
        usize::try_from(self.storage.event_capacity).unwrap_or(crate::events::DEFAULT_EVENT_CAPACITY)
    }

    /// Get log level from environment or config
    pub fn get_log_level(&self) -> String {
        std::env::var("RUST_LOG").unwrap_or_else(|_| self.logging.level.clone())
    }
}

impl IntoIterator for AppConfig {
    type Item = (String, config::Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, config::Value>;

    fn into_iter(self) -> Self::IntoIter {
        let mut map = HashMap::new();

        // Flatten the configuration into key-value pairs
        map.insert("storage.backend".to_string(), config::Value::from(self.storage.backend));
        map.insert("storage.path".to_string(), config::Value::from(self.storage.path));
        map.insert("storage.event_capacity".to_string(), config::Value::from(self.storage.event_capacity));

        map.insert("logging.level".to_string(), config::Value::from(self.logging.level));
        if let Some(file_path) = self.logging.file_path {
            map.insert("logging.file_path".to_string(), config::Value::from(file_path));
        }
        map.insert("logging.format".to_string(), config::Value::from(self.logging.format));

        map.insert("board.default_contributor".to_string(), config::Value::from(self.board.default_contributor));
        map.insert("board.history_limit".to_string(), config::Value::from(self.board.history_limit));
        map.insert("board.max_word_length".to_string(), config::Value::from(self.board.max_word_length));
        map.insert("board.max_template_length".to_string(), config::Value::from(self.board.max_template_length));
        map.insert("board.seed_defaults".to_string(), config::Value::from(self.board.seed_defaults));

        map.into_iter()
    }
}
