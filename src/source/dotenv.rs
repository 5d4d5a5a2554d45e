use super::{SecretSource, path_to_env_key};
use crate::{Result, SecretInjectError};
use secretinject_tpl::SecretValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

/// Configuration for the dotenv source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotEnvConfig {
    /// Path of the dotenv file, relative to the working directory unless absolute.
    pub path: PathBuf,
}

impl Default for DotEnvConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".env"),
        }
    }
}

impl TryFrom<&Url> for DotEnvConfig {
    type Error = SecretInjectError;

    /// `dotenv://` uses `.env`, `dotenv://config/.env.prod` a relative path
    /// and `dotenv:///etc/app/.env` an absolute one.
    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "dotenv" {
            return Err(SecretInjectError::SourceOperationFailed(format!(
                "Invalid scheme '{}' for dotenv source",
                url.scheme()
            )));
        }

        let host = url.host_str().unwrap_or("");
        let path = format!("{}{}", host, url.path());
        if path.is_empty() {
            return Ok(Self::default());
        }

        Ok(Self {
            path: PathBuf::from(path),
        })
    }
}

/// A source that reads secrets from a dotenv file.
///
/// Secret paths map to keys the same way the env source does, so
/// `company/app/db/pass` is read from `COMPANY_APP_DB_PASS`. The file is
/// read once, on the first lookup.
pub struct DotEnvSource {
    config: DotEnvConfig,
    vars: OnceLock<HashMap<String, String>>,
}

crate::register_source! {
    struct: DotEnvSource,
    config: DotEnvConfig,
    scheme: "dotenv",
    description: "Values from a dotenv file",
    examples: ["dotenv://.env", "dotenv:.env.production"],
}

impl DotEnvSource {
    pub fn new(config: DotEnvConfig) -> Self {
        Self {
            config,
            vars: OnceLock::new(),
        }
    }

    fn env_vars(&self) -> Result<&HashMap<String, String>> {
        if let Some(vars) = self.vars.get() {
            return Ok(vars);
        }
        let loaded = self.load_env_vars()?;
        Ok(self.vars.get_or_init(|| loaded))
    }

    fn load_env_vars(&self) -> Result<HashMap<String, String>> {
        if !self.config.path.exists() {
            debug!(path = %self.config.path.display(), "dotenv file does not exist");
            return Ok(HashMap::new());
        }

        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(&self.config.path)? {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        Ok(vars)
    }
}

impl SecretSource for DotEnvSource {
    fn name(&self) -> &'static str {
        Self::SOURCE_NAME
    }

    fn get_with_data(&self, path: &str) -> Result<SecretValue> {
        self.env_vars()?
            .get(&path_to_env_key(path))
            .map(|value| SecretValue::from(value.as_str()))
            .ok_or_else(|| SecretInjectError::SecretNotFound(path.to_string()))
    }
}
