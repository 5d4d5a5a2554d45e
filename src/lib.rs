//! secretinject - Inject secrets into configuration templates and process environments
//!
//! Templates reference secrets by path and may use variables to build those
//! paths:
//!
//! ```text
//! DB_USER=admin
//! DB_PASS={{ ${app}/db/password }}
//! ```
//!
//! The template engine lives in [`secretinject_tpl`]; this crate adds secret
//! sources, configuration, variable collection and the command-line interface.
//!
//! # Features
//!
//! - **Two syntax versions**: `${ path }` (version 1) and `{{ path }}` with
//!   `${ var }` variables (version 2, the default)
//! - **Env files**: `KEY=VALUE` lines or flat YAML, detected automatically
//! - **Multiple sources**: process environment, dotenv files, system keyring
//! - **Run**: start a command with secrets resolved into its environment
//!
//! # Example
//!
//! ```ignore
//! use secretinject::{Variables, inject, parser_for, source::SecretSource};
//!
//! let parser = parser_for("latest")?;
//! let source = Box::<dyn SecretSource>::try_from("dotenv:.env")?;
//! let vars = Variables::from_process_env().build()?;
//!
//! let rendered = inject("pass={{ ${app}/db/pass }}", parser.as_ref(), &vars, source.as_ref())?;
//! ```

mod config;
mod error;
mod inject;
mod run;
mod variables;

pub mod source;

// CLI module (feature-gated)
#[cfg(feature = "cli")]
pub mod cli;

pub use config::{DEFAULT_SOURCE, DEFAULT_TEMPLATE_VERSION, GlobalConfig, GlobalDefaults};
pub use error::{Result, SecretInjectError};
pub use inject::{fetch_secrets, inject, parser_for, resolve_env};
pub use run::{REFERENCE_PREFIX, RunEnv, run};
pub use variables::{VAR_ENV_PREFIX, Variables, parse_var};

pub use secretinject_tpl as tpl;
