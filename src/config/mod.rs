use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Overrides the configuration directory (handy for tests and portable setups).
pub const HOME_ENV: &str = "LINKVAULT_HOME";
pub const ENDPOINT_ENV: &str = "LINKVAULT_ENDPOINT";
pub const API_KEY_ENV: &str = "LINKVAULT_API_KEY";

/// Name of the local slot; the suffix is the only schema version there is.
pub const DEFAULT_SLOT: &str = "aws_saved_estimates_v2";
pub const DEFAULT_FALLBACK_NAME: &str = "Untitled Estimate";

/// Top-level keys a complete configuration file carries.
const KNOWN_FIELDS: &[&str] = &["database", "slot", "fallback_name", "backend", "selectors"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default = "default_slot")]
    pub slot: String,
    #[serde(default = "default_fallback_name")]
    pub fallback_name: String,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// Remote backend settings. Both values empty means local storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
}

impl BackendConfig {
    pub fn is_remote(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }
}

/// Selectors describing the page controls the watcher looks for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectorConfig {
    #[serde(default = "default_wrapper")]
    pub wrapper: String,
    #[serde(default = "default_trigger")]
    pub trigger: String,
    #[serde(default = "default_field")]
    pub field: String,
    #[serde(default = "default_heading")]
    pub heading: String,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_slot() -> String {
    DEFAULT_SLOT.to_string()
}
fn default_fallback_name() -> String {
    DEFAULT_FALLBACK_NAME.to_string()
}
fn default_wrapper() -> String {
    ".save-share-clipboard-wrapper".to_string()
}
fn default_trigger() -> String {
    ".clipboard-button".to_string()
}
fn default_field() -> String {
    r#"input[type="text"][readonly]"#.to_string()
}
fn default_heading() -> String {
    r#"h1[class*="awsui_h1-variant"]"#.to_string()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            wrapper: default_wrapper(),
            trigger: default_trigger(),
            field: default_field(),
            heading: default_heading(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            slot: default_slot(),
            fallback_name: default_fallback_name(),
            backend: BackendConfig::default(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl Config {
    /// Default configuration pointing at a specific database file.
    pub fn for_database(path: impl AsRef<Path>) -> Self {
        Self {
            database: path.as_ref().to_string_lossy().to_string(),
            ..Self::default()
        }
    }

    /// `$LINKVAULT_HOME`, or `~/.linkvault`
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var(HOME_ENV)
            && !dir.trim().is_empty()
        {
            return PathBuf::from(dir);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".linkvault")
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("linkvault.conf")
    }

    /// Return the full path of the default SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("linkvault.sqlite")
    }

    /// Load the configuration file (defaults when it does not exist), then
    /// apply environment overrides.
    pub fn load() -> AppResult<Self> {
        let mut cfg = Self::load_from(&Self::config_file())?;
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        serde_yaml::from_str(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    fn apply_env(&mut self) {
        if let Ok(endpoint) = env::var(ENDPOINT_ENV) {
            self.backend.endpoint = endpoint;
        }
        if let Ok(key) = env::var(API_KEY_ENV) {
            self.backend.api_key = key;
        }
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        let mut file = fs::File::create(path).map_err(|_| AppError::ConfigSave)?;
        file.write_all(yaml.as_bytes())
            .map_err(|_| AppError::ConfigSave)?;
        Ok(())
    }

    /// Copy safe to print: the API key is reduced to its last 4 characters,
    /// or hidden completely when it is not longer than that.
    pub fn masked(&self) -> Self {
        let mut cfg = self.clone();
        let key = &cfg.backend.api_key;
        let len = key.chars().count();
        if len > 4 {
            let tail: String = key.chars().skip(len - 4).collect();
            cfg.backend.api_key = format!("****{tail}");
        } else if len > 0 {
            cfg.backend.api_key = "****".to_string();
        }
        cfg
    }

    /// Top-level fields absent from a configuration file's content.
    pub fn missing_fields(content: &str) -> AppResult<Vec<&'static str>> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        let Some(map) = value.as_mapping() else {
            return Ok(KNOWN_FIELDS.to_vec());
        };

        Ok(KNOWN_FIELDS
            .iter()
            .copied()
            .filter(|k| !map.contains_key(*k))
            .collect())
    }

    /// Create the config directory, the config file (unless `is_test`) and an
    /// empty database file. Returns the database path.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<PathBuf> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = match custom_db {
            Some(name) => {
                let p = crate::utils::path::expand_tilde(&name);
                if p.is_absolute() { p } else { dir.join(p) }
            }
            None => Self::database_file(),
        };

        if !is_test {
            let cfg = Self::for_database(&db_path);
            cfg.save(&Self::config_file())?;
        }

        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        Ok(db_path)
    }
}
