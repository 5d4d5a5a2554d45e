//! Env-style and YAML-style key/value templates
//!
//! An env file is either a list of `KEY=VALUE` lines or a flat YAML mapping
//! of `KEY: VALUE` pairs. [`EnvTemplate::parse`] tries the env format first
//! and falls back to YAML; every value is itself a [`Template`].

use crate::error::{Result, TemplateError};
use crate::parser::Parser;
use crate::template::{SecretMap, Template};
use crate::validation::validate_variable_name;
use indexmap::{IndexMap, IndexSet};
use serde_yaml::Value;
use std::collections::HashMap;
use tracing::debug;

/// The shape an env file was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `KEY=VALUE` lines.
    Env,
    /// A flat `KEY: VALUE` mapping.
    Yaml,
}

/// An ordered mapping of output keys to value templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvTemplate {
    format: Format,
    vars: IndexMap<String, Template>,
}

impl EnvTemplate {
    /// Parses `raw`, detecting whether it is env-style or YAML-style.
    ///
    /// When neither format fits, the env-style error is returned, since it
    /// carries the line number of the first offending line.
    pub fn parse(raw: &str, parser: &dyn Parser) -> Result<Self> {
        let env_err = match parse_env(raw, parser) {
            Ok(template) => return Ok(template),
            Err(err) => err,
        };

        match parse_yaml(raw, parser) {
            Ok(template) => {
                debug!(keys = template.len(), "env file parsed as YAML");
                Ok(template)
            }
            Err(yaml_err) => {
                debug!(error = %yaml_err, "env file is not valid YAML either");
                Err(env_err)
            }
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn get(&self, key: &str) -> Option<&Template> {
        self.vars.get(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Template)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Distinct secret paths referenced by any value, in order of first use.
    pub fn secrets(&self) -> Vec<String> {
        let mut paths = IndexSet::new();
        for template in self.vars.values() {
            template.collect_secrets(&mut paths);
        }
        paths.into_iter().collect()
    }

    /// Substitutes variables in every value.
    pub fn inject_vars(&self, vars: &HashMap<String, String>) -> Result<EnvTemplate> {
        let injected = self
            .vars
            .iter()
            .map(|(key, template)| -> Result<(String, Template)> {
                Ok((key.clone(), template.inject_vars(vars)?))
            })
            .collect::<Result<IndexMap<_, _>>>()?;

        Ok(EnvTemplate {
            format: self.format,
            vars: injected,
        })
    }

    /// Renders every value, keeping the original key order.
    pub fn resolve(&self, secrets: &SecretMap) -> Result<IndexMap<String, String>> {
        self.vars
            .iter()
            .map(|(key, template)| -> Result<(String, String)> {
                Ok((key.clone(), template.resolve(secrets)?))
            })
            .collect()
    }
}

/// Parses `KEY=VALUE` lines.
///
/// Blank lines and lines starting with `#` are skipped. The first `=` splits
/// key from value and whitespace around both is trimmed. Errors carry the
/// 1-based line number.
pub fn parse_env(raw: &str, parser: &dyn Parser) -> Result<EnvTemplate> {
    let mut vars = IndexMap::new();

    for (index, line) in raw.lines().enumerate() {
        let number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| TemplateError::MalformedEnvLine.at_line(number))?;
        let key = key.trim();
        validate_variable_name(key).map_err(|err| err.at_line(number))?;

        let template = parser
            .parse(value.trim())
            .map_err(|err| err.at_line(number))?;
        vars.insert(key.to_string(), template);
    }

    debug!(keys = vars.len(), "env file parsed as key=value lines");
    Ok(EnvTemplate {
        format: Format::Env,
        vars,
    })
}

/// Parses a flat YAML mapping of `KEY: VALUE` pairs.
///
/// Values must be scalars. Template errors inside a value are returned
/// without a line number, as they are relative to the value and not to the
/// document.
pub fn parse_yaml(raw: &str, parser: &dyn Parser) -> Result<EnvTemplate> {
    let document: Value = serde_yaml::from_str(raw).map_err(malformed)?;
    let mapping = match document {
        Value::Mapping(mapping) => mapping,
        Value::Null => serde_yaml::Mapping::new(),
        _ => {
            return Err(TemplateError::MalformedDocument {
                line: None,
                reason: "expected a mapping of key: value pairs".to_string(),
            });
        }
    };

    let mut vars = IndexMap::new();
    for (key, value) in mapping {
        let key = scalar_to_string(&key).ok_or_else(|| TemplateError::MalformedDocument {
            line: None,
            reason: "keys must be scalars".to_string(),
        })?;
        validate_variable_name(&key)?;

        let value = scalar_to_string(&value).ok_or_else(|| TemplateError::MalformedDocument {
            line: None,
            reason: format!("value of '{}' must be a scalar, nested values are not supported", key),
        })?;

        let template = parser.parse(&value).map_err(TemplateError::into_root)?;
        vars.insert(key, template);
    }

    Ok(EnvTemplate {
        format: Format::Yaml,
        vars,
    })
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

fn malformed(err: serde_yaml::Error) -> TemplateError {
    TemplateError::MalformedDocument {
        line: err.location().map(|location| location.line()),
        reason: err.to_string(),
    }
}
