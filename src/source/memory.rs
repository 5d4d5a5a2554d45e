use super::SecretSource;
use crate::{Result, SecretInjectError};
use secretinject_tpl::SecretValue;
use std::collections::HashMap;

/// An in-memory source, for embedding the injector in other programs and for tests.
///
/// It is not registered under a URI scheme.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    secrets: HashMap<String, SecretValue>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a secret, replacing any previous value at `path`.
    pub fn with_secret(mut self, path: impl Into<String>, value: impl Into<SecretValue>) -> Self {
        self.insert(path, value);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<SecretValue>) {
        self.secrets.insert(path.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for StaticSource
where
    K: Into<String>,
    V: Into<SecretValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, value) in iter {
            source.insert(path, value);
        }
        source
    }
}

impl SecretSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    fn get_with_data(&self, path: &str) -> Result<SecretValue> {
        self.secrets
            .get(path)
            .cloned()
            .ok_or_else(|| SecretInjectError::SecretNotFound(path.to_string()))
    }
}
