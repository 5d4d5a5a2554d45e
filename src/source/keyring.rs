use super::SecretSource;
use crate::{Result, SecretInjectError};
use keyring::Entry;
use secretinject_tpl::SecretValue;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for the keyring source.
///
/// No options are needed; the URI is only checked for its scheme.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyringConfig {}

impl TryFrom<&Url> for KeyringConfig {
    type Error = SecretInjectError;

    fn try_from(url: &Url) -> std::result::Result<Self, Self::Error> {
        if url.scheme() != "keyring" {
            return Err(SecretInjectError::SourceOperationFailed(format!(
                "Invalid scheme '{}' for keyring source",
                url.scheme()
            )));
        }

        Ok(Self::default())
    }
}

/// Source reading secrets from the system keychain.
///
/// Uses the operating system's credential store:
/// - macOS: Keychain
/// - Windows: Credential Manager
/// - Linux: Secret Service API (via libsecret)
///
/// Each secret lives in an entry whose service is `secretinject/{path}` and
/// whose account is the current system user.
pub struct KeyringSource {
    _config: KeyringConfig,
}

crate::register_source! {
    struct: KeyringSource,
    config: KeyringConfig,
    scheme: "keyring",
    description: "Uses system keychain",
    examples: ["keyring://"],
}

impl KeyringSource {
    pub fn new(config: KeyringConfig) -> Self {
        Self { _config: config }
    }

    /// The keychain service name a secret path is stored under.
    pub fn service_for(path: &str) -> String {
        format!("secretinject/{}", path)
    }
}

impl SecretSource for KeyringSource {
    fn name(&self) -> &'static str {
        Self::SOURCE_NAME
    }

    fn get_with_data(&self, path: &str) -> Result<SecretValue> {
        let entry = Entry::new(&Self::service_for(path), &whoami::username())?;
        match entry.get_password() {
            Ok(password) => Ok(SecretValue::from(password)),
            Err(keyring::Error::NoEntry) => Err(SecretInjectError::SecretNotFound(path.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}
