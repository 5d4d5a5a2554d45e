//! # secretinject-tpl
//!
//! The template engine behind `secretinject`. A template mixes literal text
//! with two kinds of references:
//!
//! - **variables**, `${ name }`, substituted from a local mapping, and
//! - **secrets**, `{{ path/to/secret }}` (or `${ path/to/secret }` in
//!   version 1 syntax), resolved against values fetched from a secret source.
//!
//! A secret path may itself embed variables: `{{ ${app}/db/password }}`.
//!
//! Resolution happens in two phases. Variables are injected first, which
//! leaves a template that only references fully known secret paths. The
//! caller fetches the values for [`Template::secrets`] and hands them to
//! [`Template::resolve`].
//!
//! ```
//! use secretinject_tpl::{Parser, SecretMap, SecretValue, V2Parser};
//! use std::collections::HashMap;
//!
//! let template = V2Parser.parse("DB_PASS={{ ${app}/db/pass }}").unwrap();
//!
//! let mut vars = HashMap::new();
//! vars.insert("app".to_string(), "company/application".to_string());
//! let template = template.inject_vars(&vars).unwrap();
//! assert_eq!(template.secrets(), vec!["company/application/db/pass"]);
//!
//! let mut secrets = SecretMap::new();
//! secrets.insert("company/application/db/pass".to_string(), SecretValue::from("hunter2"));
//! assert_eq!(template.resolve(&secrets).unwrap(), "DB_PASS=hunter2");
//! ```
//!
//! Env files, used to build process environments, are handled by
//! [`EnvTemplate`], which accepts both `KEY=VALUE` lines and flat YAML.

mod error;
mod envfile;
mod parser;
pub mod scanner;
mod template;
pub mod validation;

pub use envfile::{EnvTemplate, Format, parse_env, parse_yaml};
pub use error::{Result, TemplateError};
pub use parser::{Parser, V1Parser, V2Parser, Version, new_parser};
pub use template::{SecretMap, SecretPath, SecretRef, SecretValue, Segment, Template, VariableRef};
