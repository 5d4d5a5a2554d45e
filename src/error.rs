//! Error types for secretinject operations

use secretinject_tpl::TemplateError;
use thiserror::Error;

/// The main error type for secretinject operations
///
/// Template problems are carried through unchanged in [`SecretInjectError::Template`];
/// everything else concerns sources, files and user interaction.
#[derive(Error, Debug)]
pub enum SecretInjectError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("Dotenv error: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("User interaction error: {0}")]
    InquireError(#[from] inquire::InquireError),
    #[error("unknown template version: '{0}' supported versions are 1, 2 and latest")]
    UnknownTemplateVersion(String),
    #[error(
        "template variable '{0}' is invalid, variable names must match [A-Za-z_][A-Za-z0-9_]*"
    )]
    InvalidTemplateVar(String),
    #[error("Secret source '{0}' not found")]
    SourceNotFound(String),
    #[error("Secret source operation failed: {0}")]
    SourceOperationFailed(String),
    #[error("Secret '{0}' not found")]
    SecretNotFound(String),
    #[error("no data on stdin: pipe a template into this command or pass --in-file")]
    NoDataOnStdin,
    #[error("file {0} already exists, use --force to overwrite it")]
    FileAlreadyExists(String),
    #[error("No command specified. Usage: secretinject run -- <command> [args...]")]
    NoCommand,
}

/// A type alias for `Result<T, SecretInjectError>`
pub type Result<T> = std::result::Result<T, SecretInjectError>;

impl SecretInjectError {
    /// Maps engine errors onto the variants the CLI reports for them.
    ///
    /// An unknown version or an invalid variable name is a usage problem, not
    /// a template problem, so it gets its own top-level variant.
    pub(crate) fn from_template(err: TemplateError) -> Self {
        match err {
            TemplateError::UnknownVersion(version) => {
                SecretInjectError::UnknownTemplateVersion(version)
            }
            TemplateError::InvalidVariableName(name) => SecretInjectError::InvalidTemplateVar(name),
            other => SecretInjectError::Template(other),
        }
    }
}
