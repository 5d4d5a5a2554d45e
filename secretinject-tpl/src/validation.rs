//! Name and path validation shared by the parser, the injector and the env parser

use crate::error::{Result, TemplateError};

/// Checks whether `name` is a POSIX environment variable name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_envar_name_posix(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Returns an `InvalidVariableName` error unless `name` is a POSIX name.
pub fn validate_variable_name(name: &str) -> Result<()> {
    if is_envar_name_posix(name) {
        Ok(())
    } else {
        Err(TemplateError::InvalidVariableName(name.to_string()))
    }
}

/// Checks whether `path` can be handed to a secret source.
///
/// Paths are opaque to the engine; it only rejects the empty path and paths
/// containing whitespace or control characters.
pub fn is_valid_secret_path(path: &str) -> bool {
    !path.is_empty() && !path.chars().any(|c| c.is_whitespace() || c.is_control())
}

pub(crate) fn validate_secret_path(path: &str) -> Result<()> {
    if is_valid_secret_path(path) {
        Ok(())
    } else {
        Err(TemplateError::InvalidSecretPath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["FOO", "foo", "_", "_FOO_1", "app", "A1"] {
            assert!(is_envar_name_posix(name), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1FOO", "FOO=", "FOO\0", "foo-bar", "path/to", "é", "FOO BAR"] {
            assert!(!is_envar_name_posix(name), "{name:?} should be invalid");
        }
    }

    #[test]
    fn test_validate_variable_name_error() {
        assert_eq!(
            validate_variable_name("FOO="),
            Err(TemplateError::InvalidVariableName("FOO=".to_string()))
        );
    }

    #[test]
    fn test_secret_paths() {
        assert!(is_valid_secret_path("company/application/db/pass"));
        assert!(is_valid_secret_path("repo/secret:3"));
        assert!(!is_valid_secret_path(""));
        assert!(!is_valid_secret_path("path with/space"));
        assert!(!is_valid_secret_path("tab\there"));
    }
}
