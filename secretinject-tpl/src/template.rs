//! Parsed templates: literals, variable references and secret references

use crate::error::{Result, TemplateError};
use crate::validation::{validate_secret_path, validate_variable_name};
use indexmap::IndexSet;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// An opaque secret value as returned by a secret source.
///
/// The bytes are never printed by `Debug`, so a value that ends up in a log
/// line or a panic message does not leak.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretValue(Vec<u8>);

impl SecretValue {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decodes the value as UTF-8, replacing invalid sequences.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.0)
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(<redacted>)")
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self(value.into_bytes())
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for SecretValue {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

/// Mapping from fully resolved secret path to its value.
pub type SecretMap = HashMap<String, SecretValue>;

/// A reference to a template variable, e.g. `${app}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    name: String,
    raw: String,
}

impl VariableRef {
    pub(crate) fn new(name: &str, raw: &str) -> Self {
        Self {
            name: name.to_string(),
            raw: raw.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The path of a secret reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretPath {
    /// A path ready to be looked up.
    Literal(String),
    /// A path that still embeds variables, e.g. `${app}/db/pass`.
    Nested(Template),
}

impl SecretPath {
    /// The lookup path, if it no longer depends on any variable.
    pub fn resolved(&self) -> Option<&str> {
        match self {
            SecretPath::Literal(path) => Some(path),
            SecretPath::Nested(_) => None,
        }
    }
}

/// A reference to a secret, e.g. `{{ company/app/db/pass }}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRef {
    path: SecretPath,
    raw: String,
}

impl SecretRef {
    pub(crate) fn new(path: SecretPath, raw: &str) -> Self {
        Self {
            path,
            raw: raw.to_string(),
        }
    }

    pub fn path(&self) -> &SecretPath {
        &self.path
    }
}

/// One piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Variable(VariableRef),
    Secret(SecretRef),
}

/// A parsed template.
///
/// Templates are never modified in place: [`Template::inject_vars`] returns a
/// new template, and [`Template::resolve`] renders the final text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub(crate) fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// A template consisting of `text` only.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Self::default();
        }
        Self {
            segments: vec![Segment::Literal(text)],
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Distinct secret paths referenced by this template, in order of first use.
    ///
    /// Paths that still embed variables are not included; call
    /// [`Template::inject_vars`] first.
    pub fn secrets(&self) -> Vec<String> {
        let mut paths = IndexSet::new();
        self.collect_secrets(&mut paths);
        paths.into_iter().collect()
    }

    pub(crate) fn collect_secrets(&self, paths: &mut IndexSet<String>) {
        for segment in &self.segments {
            if let Segment::Secret(secret) = segment {
                if let Some(path) = secret.path.resolved() {
                    paths.insert(path.to_string());
                }
            }
        }
    }

    /// Distinct variable names used by this template, including those inside secret paths.
    pub fn variables(&self) -> Vec<String> {
        let mut names = IndexSet::new();
        self.collect_variables(&mut names);
        names.into_iter().collect()
    }

    fn collect_variables(&self, names: &mut IndexSet<String>) {
        for segment in &self.segments {
            match segment {
                Segment::Variable(var) => {
                    names.insert(var.name.clone());
                }
                Segment::Secret(SecretRef {
                    path: SecretPath::Nested(nested),
                    ..
                }) => nested.collect_variables(names),
                _ => {}
            }
        }
    }

    /// Substitutes every variable reference with its value from `vars`.
    ///
    /// Secret paths that embed variables are substituted too and flattened to
    /// plain paths, so the result only holds literals and secret references.
    pub fn inject_vars(&self, vars: &HashMap<String, String>) -> Result<Template> {
        for name in vars.keys() {
            validate_variable_name(name)?;
        }
        self.substitute(vars)
    }

    fn substitute(&self, vars: &HashMap<String, String>) -> Result<Template> {
        let segments = self
            .segments
            .iter()
            .map(|segment| -> Result<Segment> {
                match segment {
                    Segment::Literal(text) => Ok(Segment::Literal(text.clone())),
                    Segment::Variable(var) => vars
                        .get(&var.name)
                        .map(|value| Segment::Literal(value.clone()))
                        .ok_or_else(|| TemplateError::UndefinedVariable(var.name.clone())),
                    Segment::Secret(secret) => match &secret.path {
                        SecretPath::Literal(_) => Ok(segment.clone()),
                        SecretPath::Nested(nested) => {
                            let path = nested.substitute(vars)?.render_literals()?;
                            validate_secret_path(&path)?;
                            Ok(Segment::Secret(SecretRef::new(
                                SecretPath::Literal(path),
                                &secret.raw,
                            )))
                        }
                    },
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Template { segments })
    }

    /// Concatenates a template that is known to contain literals only.
    fn render_literals(&self) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(var) => {
                    return Err(TemplateError::UndefinedVariable(var.name.clone()));
                }
                Segment::Secret(secret) => {
                    return Err(TemplateError::InvalidSecretPath(secret.raw.clone()));
                }
            }
        }
        Ok(out)
    }

    /// Renders the template, replacing each secret reference with its value.
    ///
    /// `secrets` must hold a value for every path returned by
    /// [`Template::secrets`]; a missing path is reported as
    /// [`TemplateError::MissingSecretValue`].
    pub fn resolve(&self, secrets: &SecretMap) -> Result<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(var) => {
                    return Err(TemplateError::UndefinedVariable(var.name.clone()));
                }
                Segment::Secret(secret) => match &secret.path {
                    SecretPath::Literal(path) => {
                        let value = secrets
                            .get(path)
                            .ok_or_else(|| TemplateError::MissingSecretValue(path.clone()))?;
                        out.push_str(&value.to_string_lossy());
                    }
                    SecretPath::Nested(nested) => {
                        let name = nested.variables().into_iter().next().unwrap_or_default();
                        return Err(TemplateError::UndefinedVariable(name));
                    }
                },
            }
        }
        Ok(out)
    }
}

/// Writes the template back as source text, references shown as they were written.
impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Variable(var) => f.write_str(&var.raw)?,
                Segment::Secret(secret) => f.write_str(&secret.raw)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Parser, V1Parser, V2Parser};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn secrets(pairs: &[(&str, &str)]) -> SecretMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), SecretValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_identity_for_tag_free_text() {
        let text = "host=localhost\nport=5432\n";
        let template = V2Parser.parse(text).unwrap();
        assert_eq!(template.segments(), &[Segment::Literal(text.to_string())]);
        assert_eq!(template.resolve(&SecretMap::new()).unwrap(), text);
    }

    #[test]
    fn test_literal_constructor() {
        assert!(Template::literal("").is_empty());
        assert_eq!(Template::literal("x").to_string(), "x");
    }

    #[test]
    fn test_secrets_are_distinct_and_ordered() {
        let template = V2Parser
            .parse("{{ b/path }} {{a/path}} {{ b/path }} ${user}")
            .unwrap();
        assert_eq!(template.secrets(), vec!["b/path", "a/path"]);
        assert_eq!(template.variables(), vec!["user"]);
    }

    #[test]
    fn test_inject_vars_into_secret_path() {
        let template = V2Parser.parse("baz={{${app}/db/pass}}").unwrap();
        assert!(template.secrets().is_empty());
        assert_eq!(template.variables(), vec!["app"]);

        let injected = template
            .inject_vars(&vars(&[("app", "company/application")]))
            .unwrap();
        assert_eq!(injected.secrets(), vec!["company/application/db/pass"]);
        assert!(injected.variables().is_empty());

        let rendered = injected
            .resolve(&secrets(&[("company/application/db/pass", "hunter2")]))
            .unwrap();
        assert_eq!(rendered, "baz=hunter2");
    }

    #[test]
    fn test_inject_vars_in_text() {
        let template = V2Parser.parse("user=${ user } host=${host}").unwrap();
        let injected = template
            .inject_vars(&vars(&[("user", "admin"), ("host", "db.local")]))
            .unwrap();
        assert_eq!(
            injected.resolve(&SecretMap::new()).unwrap(),
            "user=admin host=db.local"
        );
    }

    #[test]
    fn test_undefined_variable() {
        let template = V2Parser.parse("{{ ${env}/db/${name} }}").unwrap();
        let err = template
            .inject_vars(&vars(&[("env", "prod")]))
            .unwrap_err();
        assert_eq!(err, TemplateError::UndefinedVariable("name".to_string()));
    }

    #[test]
    fn test_invalid_variable_name_in_mapping() {
        let template = V2Parser.parse("plain").unwrap();
        let err = template
            .inject_vars(&vars(&[("not-valid", "x")]))
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidVariableName("not-valid".to_string())
        );
    }

    #[test]
    fn test_injected_path_is_validated() {
        let template = V2Parser.parse("{{ ${app}/db }}").unwrap();
        let err = template
            .inject_vars(&vars(&[("app", "has space")]))
            .unwrap_err();
        assert_eq!(
            err,
            TemplateError::InvalidSecretPath("has space/db".to_string())
        );
    }

    #[test]
    fn test_inject_vars_leaves_input_untouched() {
        let template = V2Parser.parse("${a}").unwrap();
        let before = template.clone();
        let _ = template.inject_vars(&vars(&[("a", "1")])).unwrap();
        assert_eq!(template, before);
    }

    #[test]
    fn test_missing_secret_value() {
        let template = V2Parser.parse("x={{ path/to/secret }}").unwrap();
        let err = template.resolve(&SecretMap::new()).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingSecretValue("path/to/secret".to_string())
        );
    }

    #[test]
    fn test_resolve_rejects_leftover_variables() {
        let template = V1Parser.parse("${ ${app}/pass }").unwrap();
        let err = template.resolve(&SecretMap::new()).unwrap_err();
        assert_eq!(err, TemplateError::UndefinedVariable("app".to_string()));
    }

    #[test]
    fn test_resolve_is_independent_of_mapping_without_refs() {
        let template = V2Parser.parse("nothing to see").unwrap();
        let a = template.resolve(&SecretMap::new()).unwrap();
        let b = template
            .resolve(&secrets(&[("some/path", "value"), ("other", "x")]))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_round_trips_source() {
        let source = "a={{ ${env}/db/pass }}\nb=${user}\n";
        let template = V2Parser.parse(source).unwrap();
        assert_eq!(template.to_string(), source);
    }

    #[test]
    fn test_secret_value_debug_is_redacted() {
        let value = SecretValue::from("hunter2");
        assert_eq!(format!("{:?}", value), "SecretValue(<redacted>)");
        assert_eq!(value.as_bytes(), b"hunter2");
    }

    #[test]
    fn test_non_utf8_secret_is_rendered_lossily() {
        let template = V2Parser.parse("{{ bin/blob }}").unwrap();
        let mut map = SecretMap::new();
        map.insert("bin/blob".to_string(), SecretValue::new(vec![b'o', b'k', 0xff]));
        assert_eq!(template.resolve(&map).unwrap(), "ok\u{fffd}");
    }
}
