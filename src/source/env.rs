use super::{SecretSource, path_to_env_key};
use crate::{Result, SecretInjectError};
use secretinject_tpl::SecretValue;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::trace;
use url::Url;

/// Configuration for the environment variables source.
///
/// `env://` reads `company/app/db/pass` from `COMPANY_APP_DB_PASS`;
/// `env://APP_` reads it from `APP_COMPANY_APP_DB_PASS`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Prefix prepended to every derived variable name.
    pub prefix: Option<String>,
}

impl TryFrom<&Url> for EnvConfig {
    type Error = SecretInjectError;

    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "env" {
            return Err(SecretInjectError::SourceOperationFailed(format!(
                "Invalid scheme '{}' for env source",
                url.scheme()
            )));
        }

        let prefix = url
            .host_str()
            .filter(|host| !host.is_empty())
            .map(|host| host.to_ascii_uppercase());

        Ok(Self { prefix })
    }
}

/// A source that reads secrets from the process environment.
pub struct EnvSource {
    config: EnvConfig,
}

crate::register_source! {
    struct: EnvSource,
    config: EnvConfig,
    scheme: "env",
    description: "Process environment variables",
    examples: ["env://", "env://APP_"],
}

impl EnvSource {
    pub fn new(config: EnvConfig) -> Self {
        Self { config }
    }

    /// The environment variable `path` is looked up in.
    pub fn key_for(&self, path: &str) -> String {
        let key = path_to_env_key(path);
        match &self.config.prefix {
            Some(prefix) => format!("{}{}", prefix, key),
            None => key,
        }
    }
}

impl SecretSource for EnvSource {
    fn name(&self) -> &'static str {
        Self::SOURCE_NAME
    }

    fn get_with_data(&self, path: &str) -> Result<SecretValue> {
        let key = self.key_for(path);
        trace!(path, key = %key, "reading secret from environment");
        env::var_os(&key)
            .map(|value| SecretValue::new(value.to_string_lossy().into_owned()))
            .ok_or_else(|| SecretInjectError::SecretNotFound(path.to_string()))
    }
}
