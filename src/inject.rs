//! Parse, inject variables, fetch secrets, render

use crate::source::SecretSource;
use crate::{Result, SecretInjectError};
use indexmap::IndexMap;
use secretinject_tpl::{EnvTemplate, Parser, SecretMap};
use std::collections::HashMap;
use tracing::debug;

/// Creates the parser for a version selector (`"1"`, `"2"` or `"latest"`).
pub fn parser_for(version: &str) -> Result<Box<dyn Parser>> {
    Box::<dyn Parser>::try_from(version).map_err(SecretInjectError::from_template)
}

/// Fetches the value of every path from `source`.
///
/// The source is not touched at all when `paths` is empty.
pub fn fetch_secrets(paths: &[String], source: &dyn SecretSource) -> Result<SecretMap> {
    let mut secrets = SecretMap::new();
    if paths.is_empty() {
        return Ok(secrets);
    }

    debug!(count = paths.len(), source = source.name(), "fetching secrets");
    for path in paths {
        debug!(path = %path, "fetching secret");
        let value = source.get_with_data(path)?;
        secrets.insert(path.clone(), value);
    }
    Ok(secrets)
}

/// Renders a template, replacing variables and secret references.
///
/// ```
/// use secretinject::{inject, parser_for, source::StaticSource};
/// use std::collections::HashMap;
///
/// let parser = parser_for("latest").unwrap();
/// let source = StaticSource::new().with_secret("company/app/db/pass", "hunter2");
/// let mut vars = HashMap::new();
/// vars.insert("app".to_string(), "company/app".to_string());
///
/// let out = inject("pass={{ ${app}/db/pass }}", parser.as_ref(), &vars, &source).unwrap();
/// assert_eq!(out, "pass=hunter2");
/// ```
pub fn inject(
    raw: &str,
    parser: &dyn Parser,
    vars: &HashMap<String, String>,
    source: &dyn SecretSource,
) -> Result<String> {
    let template = parser
        .parse(raw)?
        .inject_vars(vars)
        .map_err(SecretInjectError::from_template)?;
    debug!(segments = template.segments().len(), "template parsed");

    let secrets = fetch_secrets(&template.secrets(), source)?;
    Ok(template.resolve(&secrets)?)
}

/// Renders an env file (`KEY=VALUE` lines or flat YAML) into an ordered mapping.
pub fn resolve_env(
    raw: &str,
    parser: &dyn Parser,
    vars: &HashMap<String, String>,
    source: &dyn SecretSource,
) -> Result<IndexMap<String, String>> {
    let template = EnvTemplate::parse(raw, parser)?
        .inject_vars(vars)
        .map_err(SecretInjectError::from_template)?;
    debug!(keys = template.len(), format = ?template.format(), "env file parsed");

    let secrets = fetch_secrets(&template.secrets(), source)?;
    Ok(template.resolve(&secrets)?)
}
