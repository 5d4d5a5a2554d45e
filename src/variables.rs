//! Template variables gathered from the environment and the command line

use crate::{Result, SecretInjectError};
use secretinject_tpl::validation::is_envar_name_posix;
use std::collections::HashMap;

/// Environment variables starting with this prefix become template
/// variables, with the prefix stripped: `SECRETINJECT_VAR_app=x` sets `app`.
pub const VAR_ENV_PREFIX: &str = "SECRETINJECT_VAR_";

/// Builder for the variable mapping handed to the template engine.
///
/// Explicit pairs always win over prefixed environment variables, no matter
/// the order they were added in.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    from_env: HashMap<String, String>,
    explicit: HashMap<String, String>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects prefixed variables from the current process environment.
    pub fn from_process_env() -> Self {
        Self::new().with_env(std::env::vars())
    }

    /// Collects prefixed variables from `env`; other entries are ignored.
    pub fn with_env<I>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in env {
            if let Some(name) = key.strip_prefix(VAR_ENV_PREFIX) {
                self.from_env.insert(name.to_string(), value);
            }
        }
        self
    }

    /// Adds explicit `name = value` pairs, such as those given with `--var`.
    pub fn with_pairs<I>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.explicit.extend(pairs);
        self
    }

    /// Merges and validates the collected variables.
    ///
    /// Returns [`SecretInjectError::InvalidTemplateVar`] for the first name
    /// (in sorted order) that is not a POSIX identifier.
    pub fn build(self) -> Result<HashMap<String, String>> {
        let mut vars = self.from_env;
        vars.extend(self.explicit);

        let mut names: Vec<&String> = vars.keys().collect();
        names.sort();
        if let Some(name) = names.into_iter().find(|name| !is_envar_name_posix(name)) {
            return Err(SecretInjectError::InvalidTemplateVar(name.clone()));
        }

        Ok(vars)
    }
}

/// Parses a `name=value` pair as given to `--var`.
///
/// Only the first `=` separates; the value may contain more of them.
pub fn parse_var(pair: &str) -> std::result::Result<(String, String), String> {
    match pair.split_once('=') {
        Some((name, value)) => Ok((name.to_string(), value.to_string())),
        None => Err(format!("expected name=value, got '{}'", pair)),
    }
}
