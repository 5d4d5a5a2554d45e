//! Running a command with secrets in its environment

use crate::inject::fetch_secrets;
use crate::source::SecretSource;
use crate::{Result, SecretInjectError};
use indexmap::{IndexMap, IndexSet};
use secretinject_tpl::validation::is_valid_secret_path;
use secretinject_tpl::{EnvTemplate, Parser, TemplateError};
use std::collections::HashMap;
use std::process::Command;
use tracing::debug;

/// Environment values starting with this prefix are secret references:
/// `DB_PASS=secretinject://company/app/db/pass`.
pub const REFERENCE_PREFIX: &str = "secretinject://";

/// Inputs for building a child process environment.
pub struct RunEnv<'a> {
    /// The environment the child would otherwise inherit.
    pub process_env: Vec<(String, String)>,
    /// Raw contents of an env file, if one is used.
    pub env_file: Option<&'a str>,
    pub parser: &'a dyn Parser,
    pub vars: &'a HashMap<String, String>,
}

impl RunEnv<'_> {
    /// Resolves the child environment.
    ///
    /// Env file entries override inherited variables, and resolved
    /// `secretinject://` references override both. All secrets are fetched
    /// in one pass.
    pub fn resolve(self, source: &dyn SecretSource) -> Result<IndexMap<String, String>> {
        let mut env: IndexMap<String, String> = self.process_env.into_iter().collect();

        let env_file = match self.env_file {
            Some(raw) => Some(
                EnvTemplate::parse(raw, self.parser)?
                    .inject_vars(self.vars)
                    .map_err(SecretInjectError::from_template)?,
            ),
            None => None,
        };

        let mut references = Vec::new();
        for (key, value) in &env {
            if let Some(path) = value.strip_prefix(REFERENCE_PREFIX) {
                if !is_valid_secret_path(path) {
                    return Err(TemplateError::InvalidSecretPath(path.to_string()).into());
                }
                references.push((key.clone(), path.to_string()));
            }
        }

        let mut paths: IndexSet<String> = references.iter().map(|(_, p)| p.clone()).collect();
        if let Some(template) = &env_file {
            paths.extend(template.secrets());
        }
        debug!(
            references = references.len(),
            paths = paths.len(),
            "resolving run environment"
        );

        let paths: Vec<String> = paths.into_iter().collect();
        let secrets = fetch_secrets(&paths, source)?;

        if let Some(template) = &env_file {
            env.extend(template.resolve(&secrets)?);
        }
        for (key, path) in references {
            if let Some(value) = secrets.get(&path) {
                env.insert(key, value.to_string_lossy().into_owned());
            }
        }

        Ok(env)
    }
}

/// Runs `command` with exactly the variables in `env` and returns its exit code.
///
/// A child killed by a signal reports exit code 1.
pub fn run(command: &[String], env: &IndexMap<String, String>) -> Result<i32> {
    let (program, args) = command.split_first().ok_or(SecretInjectError::NoCommand)?;
    debug!(program = %program, vars = env.len(), "running command");

    let status = Command::new(program)
        .args(args)
        .env_clear()
        .envs(env)
        .status()?;
    Ok(status.code().unwrap_or(1))
}
