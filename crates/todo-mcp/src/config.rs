//! Configuration management for the todo-mcp binary.
//!
//! Configuration is assembled from several sources:
//! 1. Default values
//! 2. User config (`<config_dir>/todo-mcp/config.toml`)
//! 3. Project config (`.todo-mcp/config.toml`)
//! 4. Environment variables (`TODO_MCP_*`)
//! 5. Command-line flags
//!
//! Priority: CLI flags > ENV vars > Project config > User config > Defaults
//!
//! File layers are merged key by key, so a project file that only sets
//! `logging.level` keeps the user's `storage.path`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use todo_core::tasks::DEFAULT_STORE_PATH;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Could not determine the user configuration directory")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Every key accepted by [`TodoConfig::get`] and [`TodoConfig::set`].
pub const KEYS: [&str; 4] = [
    "storage.path",
    "logging.level",
    "logging.format",
    "server.announce_tools",
];

/// todo-mcp configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Task store file
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Write the tool list as the first protocol line
    pub announce_tools: bool,
}

/// Log line format on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "logging.format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { announce_tools: true }
    }
}

impl TodoConfig {
    /// User-level config file path
    pub fn user_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("todo-mcp").join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Project-level config file path
    pub fn project_path() -> PathBuf {
        PathBuf::from(".todo-mcp").join("config.toml")
    }

    /// Load configuration with the full priority chain, except CLI flags.
    ///
    /// With `explicit` set, that file replaces both the user and project
    /// layers and must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut layers = Vec::new();

        match explicit {
            Some(path) => layers.push(read_table(path)?),
            None => {
                if let Ok(user_path) = Self::user_path() {
                    if user_path.exists() {
                        layers.push(read_table(&user_path)?);
                    }
                }

                let project_path = Self::project_path();
                if project_path.exists() {
                    layers.push(read_table(&project_path)?);
                }
            }
        }

        let mut config = Self::from_layers(layers)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a single file
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_layers(vec![read_table(path)?])
    }

    /// Merge TOML tables in order (later wins) on top of the defaults.
    fn from_layers(layers: Vec<toml::Table>) -> Result<Self> {
        let mut merged = toml::Table::new();
        for layer in layers {
            merge(&mut merged, layer);
        }

        toml::Value::Table(merged)
            .try_into()
            .map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<merged>"),
                source,
            })
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `TODO_MCP_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("TODO_MCP_STORE") {
            self.set("storage.path", &val)?;
        }
        if let Some(val) = lookup("TODO_MCP_LOG_LEVEL") {
            self.set("logging.level", &val)?;
        }
        if let Some(val) = lookup("TODO_MCP_LOG_FORMAT") {
            self.set("logging.format", &val)?;
        }
        if let Some(val) = lookup("TODO_MCP_ANNOUNCE_TOOLS") {
            self.set("server.announce_tools", &val)?;
        }
        Ok(())
    }

    /// Get a specific config value
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "storage.path" => Some(self.storage.path.display().to_string()),
            "logging.level" => Some(self.logging.level.clone()),
            "logging.format" => Some(self.logging.format.to_string()),
            "server.announce_tools" => Some(self.server.announce_tools.to_string()),
            _ => None,
        }
    }

    /// Set a specific config value
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "storage.path" => {
                self.storage.path = PathBuf::from(value);
            }
            "logging.level" => {
                self.logging.level = value.to_string();
            }
            "logging.format" => {
                self.logging.format = value.parse()?;
            }
            "server.announce_tools" => {
                self.server.announce_tools = parse_bool(value).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                })?;
            }
            _ => {
                return Err(ConfigError::UnknownKey(key.to_string()));
            }
        }
        Ok(())
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn table(content: &str) -> toml::Table {
        toml::from_str(content).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = TodoConfig::default();
        assert_eq!(config.storage.path, PathBuf::from(".todo-mcp/tasks.json"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.server.announce_tools);
    }

    #[test]
    fn test_get_set() {
        let mut config = TodoConfig::default();

        assert_eq!(config.get("logging.level"), Some("info".to_string()));

        config.set("logging.level", "debug").unwrap();
        assert_eq!(config.get("logging.level"), Some("debug".to_string()));

        config.set("server.announce_tools", "off").unwrap();
        assert_eq!(config.get("server.announce_tools"), Some("false".to_string()));

        config.set("logging.format", "JSON").unwrap();
        assert_eq!(config.get("logging.format"), Some("json".to_string()));

        for key in KEYS {
            assert!(config.get(key).is_some(), "{key}");
        }
    }

    #[test]
    fn test_invalid_key_and_value() {
        let mut config = TodoConfig::default();
        assert_eq!(config.get("invalid.key"), None);
        assert!(matches!(config.set("invalid.key", "x"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            config.set("server.announce_tools", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.set("logging.format", "xml").is_err());
        assert!(config.server.announce_tools);
    }

    #[test]
    fn test_layers_merge_per_key() {
        let user = table(
            r#"
            [storage]
            path = "/home/user/tasks.json"

            [logging]
            level = "warn"
            "#,
        );
        let project = table(
            r#"
            [logging]
            level = "debug"
            "#,
        );

        let config = TodoConfig::from_layers(vec![user, project]).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/home/user/tasks.json"));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = TodoConfig::from_layers(vec![table("[logging]\nlevel = \"warn\"\n")]).unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("TODO_MCP_LOG_LEVEL", "trace"),
            ("TODO_MCP_STORE", "/tmp/elsewhere.json"),
            ("TODO_MCP_ANNOUNCE_TOOLS", "false"),
        ]);

        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.logging.level, "trace");
        assert_eq!(config.storage.path, PathBuf::from("/tmp/elsewhere.json"));
        assert!(!config.server.announce_tools);
    }

    #[test]
    fn test_invalid_env_value_is_error() {
        let mut config = TodoConfig::default();
        let result = config.apply_env_overrides(|key| (key == "TODO_MCP_LOG_FORMAT").then(|| "yaml".to_string()));
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = TodoConfig::default();
        config.set("storage.path", "custom/tasks.json").unwrap();
        config.set("logging.format", "json").unwrap();
        config.save(&path).unwrap();

        let loaded = TodoConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let result = TodoConfig::load(Some(&dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[storage\npath = 1").unwrap();

        let err = TodoConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"), "{err}");
    }
}
