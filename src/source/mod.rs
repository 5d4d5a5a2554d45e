//! # Secret sources
//!
//! A secret source answers one question: what is the value stored at a
//! secret path? Sources are built from URI strings and registered in a
//! link-time registry, so adding a backend only takes a new module with a
//! [`register_source!`](crate::register_source) invocation.
//!
//! ```text
//! env://                 process environment
//! env://APP_             process environment, keys prefixed with APP_
//! dotenv://.env.prod     a dotenv file
//! keyring://             the system keychain
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use secretinject::source::SecretSource;
//!
//! let source = Box::<dyn SecretSource>::try_from("dotenv:.env")?;
//! let value = source.get_with_data("company/app/db/pass")?;
//! ```

use crate::{Result, SecretInjectError};
use secretinject_tpl::SecretValue;
use std::convert::TryFrom;
use url::Url;

pub mod dotenv;
pub mod env;
pub mod keyring;
#[macro_use]
pub mod macros;
mod memory;

#[cfg(test)]
pub(crate) mod tests;

pub use memory::StaticSource;

/// Information about a secret source, shown when choosing a default.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// The canonical name of the source (e.g., "keyring", "dotenv").
    pub name: &'static str,
    /// A human-readable description of what the source does.
    pub description: &'static str,
    /// Example URIs showing how to configure this source.
    pub examples: &'static [&'static str],
}

impl SourceInfo {
    /// Formats as `name: description`, followed by examples when there are any.
    pub fn display_with_examples(&self) -> String {
        if self.examples.is_empty() {
            format!("{}: {}", self.name, self.description)
        } else {
            format!(
                "{}: {} (e.g., {})",
                self.name,
                self.description,
                self.examples.join(", ")
            )
        }
    }
}

pub use macros::{SOURCE_REGISTRY, SourceRegistration};

/// Returns metadata for every registered source.
pub fn sources() -> Vec<SourceInfo> {
    SOURCE_REGISTRY.iter().map(SourceRegistration::info).collect()
}

/// A backend that secret values are fetched from.
///
/// Paths are opaque strings such as `company/app/db/pass`; each source decides
/// how to map them onto its own storage. Implementations must be
/// `Send + Sync`.
pub trait SecretSource: Send + Sync {
    /// Fetches the value stored at `path`.
    ///
    /// Returns [`SecretInjectError::SecretNotFound`] when nothing is stored there.
    fn get_with_data(&self, path: &str) -> Result<SecretValue>;

    /// Returns the name of this source.
    ///
    /// This should match the name registered with the source macro.
    fn name(&self) -> &'static str;
}

/// Maps a secret path onto an environment variable name.
///
/// ASCII letters are upper-cased and every other non-alphanumeric character
/// becomes `_`, so `company/app/db-pass` turns into `COMPANY_APP_DB_PASS`.
pub fn path_to_env_key(path: &str) -> String {
    path.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl TryFrom<String> for Box<dyn SecretSource> {
    type Error = SecretInjectError;

    fn try_from(s: String) -> Result<Self> {
        Self::try_from(&s as &str)
    }
}

impl TryFrom<&str> for Box<dyn SecretSource> {
    type Error = SecretInjectError;

    /// Creates a source from a URI string.
    ///
    /// Accepts full URIs (`dotenv://config/.env`), bare names (`keyring`) and
    /// the short `scheme:path` form (`dotenv:.env.production`).
    fn try_from(s: &str) -> Result<Self> {
        let (scheme, rest) = match s.split_once(':') {
            Some((scheme, rest)) => (scheme, rest),
            None => (s, ""),
        };

        if macros::lookup(scheme).is_none() {
            return Err(SecretInjectError::SourceNotFound(scheme.to_string()));
        }

        let url_string = match rest {
            "" => format!("{}://", scheme),
            s if s.starts_with("//") => format!("{}:{}", scheme, s),
            s => format!("{}://{}", scheme, s),
        };

        let url = Url::parse(&url_string).map_err(|e| {
            SecretInjectError::SourceOperationFailed(format!(
                "Invalid source specification '{}': {}",
                s, e
            ))
        })?;

        Self::try_from(&url)
    }
}

impl TryFrom<&Url> for Box<dyn SecretSource> {
    type Error = SecretInjectError;

    fn try_from(url: &Url) -> Result<Self> {
        let scheme = url.scheme();

        let registration = macros::lookup(scheme)
            .ok_or_else(|| SecretInjectError::SourceNotFound(scheme.to_string()))?;

        (registration.factory)(url)
    }
}
