//! Settings for the command layer.
//!
//! Settings are layered: built-in defaults, then `liftboard.toml` (or the
//! file given with `--config`), then the environment, then CLI flags.
//!
//! ```toml
//! source = "https://docs.google.com/spreadsheets/d/<id>/edit#gid=0"
//! prefix = "!"
//! cache_timeout_secs = 300
//! page_size = 10
//! search_limit = 10
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "liftboard.toml";

/// Location used when nothing else is configured
pub const DEFAULT_SOURCE: &str = "./data/sample.xlsx";

/// Environment variables read for the data source, in priority order
pub const SOURCE_ENV_VARS: [&str; 2] = ["EXCEL_FILE_PATH", "GOOGLE_SHEETS_URL"];

/// Environment variable for the text command prefix
pub const PREFIX_ENV_VAR: &str = "PREFIX";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Workbook path or published spreadsheet URL
    pub source: String,
    /// Prefix for text commands
    pub prefix: String,
    /// Seconds fetched remote data stays fresh
    pub cache_timeout_secs: u64,
    /// Rows shown by `data` when no limit is given
    pub page_size: usize,
    /// Maximum results shown by `search`
    pub search_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            prefix: "!".to_string(),
            cache_timeout_secs: 300,
            page_size: 10,
            search_limit: 10,
        }
    }
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Read settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load settings: an explicit file must exist, the default file is optional.
    /// Environment variables are applied on top.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };

        let env: HashMap<String, String> = std::env::vars().collect();
        Ok(settings.with_env(&env))
    }

    /// Apply environment overrides from a variable map
    pub fn with_env(mut self, env: &HashMap<String, String>) -> Self {
        let source = SOURCE_ENV_VARS
            .iter()
            .filter_map(|key| env.get(*key))
            .find(|value| !value.is_empty());
        if let Some(source) = source {
            self.source = source.clone();
        }

        if let Some(prefix) = env.get(PREFIX_ENV_VAR).filter(|p| !p.is_empty()) {
            self.prefix = prefix.clone();
        }

        self
    }

    pub fn cache_timeout(&self) -> Duration {
        Duration::from_secs(self.cache_timeout_secs)
    }
}
