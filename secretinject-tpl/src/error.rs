//! Error types for template parsing, variable injection and secret resolution

use thiserror::Error;

/// Errors produced by the template engine.
///
/// All of them are deterministic: retrying the same input yields the same
/// error, so callers should report them rather than retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// An opening delimiter has no matching closing delimiter.
    #[error("template syntax error: tag not closed, expected '{0}'")]
    TagNotClosed(String),
    /// A variable name does not satisfy the POSIX environment variable grammar.
    #[error("invalid variable name '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidVariableName(String),
    /// A variable is referenced but no value was supplied for it.
    #[error("variable '{0}' is used in the template but no value was supplied")]
    UndefinedVariable(String),
    /// A secret reference does not point at a usable path.
    #[error("invalid secret path '{0}'")]
    InvalidSecretPath(String),
    /// A line of an env-style template is not a `KEY=VALUE` pair.
    #[error("template is not formatted as key=value pairs")]
    MalformedEnvLine,
    /// A YAML-style template could not be parsed into a flat mapping.
    #[error("malformed document: {reason}")]
    MalformedDocument { line: Option<usize>, reason: String },
    /// The resolver was handed a mapping that lacks a referenced path.
    #[error("no value supplied for secret '{0}'; fetch every path returned by secrets() first")]
    MissingSecretValue(String),
    /// The requested syntax version does not exist.
    #[error("unknown template version: '{0}' supported versions are 1, 2 and latest")]
    UnknownVersion(String),
    /// Wraps another error with the 1-based line it occurred on.
    #[error("template error at line {line}: {source}")]
    Template {
        line: usize,
        source: Box<TemplateError>,
    },
}

impl TemplateError {
    /// Attaches a 1-based line number to this error.
    ///
    /// When the error already carries a line, that line is taken to be
    /// relative to a fragment starting at `line`, and the two are combined.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            TemplateError::Template {
                line: inner,
                source,
            } => TemplateError::Template {
                line: line + inner - 1,
                source,
            },
            other => TemplateError::Template {
                line,
                source: Box::new(other),
            },
        }
    }

    /// Returns the line this error is attributed to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            TemplateError::Template { line, .. } => Some(*line),
            TemplateError::MalformedDocument { line, .. } => *line,
            _ => None,
        }
    }

    /// Strips positional wrappers and returns the underlying error.
    pub fn root(&self) -> &TemplateError {
        match self {
            TemplateError::Template { source, .. } => source.root(),
            other => other,
        }
    }

    /// Consumes the error and returns the underlying cause.
    pub fn into_root(self) -> TemplateError {
        match self {
            TemplateError::Template { source, .. } => source.into_root(),
            other => other,
        }
    }
}

/// A type alias for `Result<T, TemplateError>`.
pub type Result<T> = std::result::Result<T, TemplateError>;
