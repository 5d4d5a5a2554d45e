//! Global user configuration
//!
//! Stored in `~/.config/secretinject/config.toml` (or the platform
//! equivalent):
//!
//! ```toml
//! [defaults]
//! source = "dotenv://.env"
//! template_version = "2"
//! ```

use crate::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The source used when neither a flag, the environment nor the config file names one.
pub const DEFAULT_SOURCE: &str = "env";

/// The template version used when none is configured.
pub const DEFAULT_TEMPLATE_VERSION: &str = "latest";

/// Global user configuration for secretinject.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    #[serde(default)]
    pub defaults: GlobalDefaults,
}

/// Default settings in the global configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GlobalDefaults {
    /// Source URI used when not given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Template syntax version used when not given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,
}

impl GlobalConfig {
    /// Gets the path to the global configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config directory cannot be determined
    pub fn path() -> std::result::Result<PathBuf, io::Error> {
        let dirs = ProjectDirs::from("", "", "secretinject").ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "Could not find config directory")
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Loads the global configuration, or `None` when there is no config file yet.
    pub fn load() -> Result<Option<Self>> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    /// Saves the configuration, creating the config directory if needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Picks the source URI: the explicit value first, then the config file, then `env`.
    ///
    /// The explicit value already covers `SECRETINJECT_SOURCE`, which the CLI
    /// reads into the same flag.
    pub fn source_or_default(&self, explicit: Option<String>) -> String {
        explicit
            .or_else(|| self.defaults.source.clone())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string())
    }

    /// Picks the template version the same way as [`GlobalConfig::source_or_default`].
    pub fn template_version_or_default(&self, explicit: Option<String>) -> String {
        explicit
            .or_else(|| self.defaults.template_version.clone())
            .unwrap_or_else(|| DEFAULT_TEMPLATE_VERSION.to_string())
    }
}
