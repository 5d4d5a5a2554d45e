//! Versioned template parsers
//!
//! Two syntax versions are supported. They produce the same [`Template`]
//! model and only differ in which tag delimiters they recognise:
//!
//! | version | delimiters          | example                                   |
//! |---------|---------------------|-------------------------------------------|
//! | 1       | `${ }`              | `${ company/app/db/pass }`, `${ app }`    |
//! | 2       | `{{ }}` and `${ }`  | `{{ ${app}/db/pass }}`, `${ app }`        |
//!
//! In both versions a tag whose trimmed content is a POSIX identifier is a
//! variable reference. Any other tag is a secret reference, and its content
//! is parsed again with the same grammar so that a path can embed variables.

use crate::error::{Result, TemplateError};
use crate::scanner::{Delimiters, Token, scan};
use crate::template::{SecretPath, SecretRef, Segment, Template, VariableRef};
use crate::validation::{is_envar_name_posix, is_valid_secret_path};
use std::fmt;
use std::str::FromStr;

/// Template syntax versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    V1,
    V2,
}

impl Version {
    /// The newest stable version, selected by `"latest"`.
    pub const LATEST: Version = Version::V2;

    pub fn as_str(&self) -> &'static str {
        match self {
            Version::V1 => "1",
            Version::V2 => "2",
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Version {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "1" => Ok(Version::V1),
            "2" => Ok(Version::V2),
            "latest" => Ok(Version::LATEST),
            other => Err(TemplateError::UnknownVersion(other.to_string())),
        }
    }
}

/// Turns raw template text into a [`Template`].
pub trait Parser: Send + Sync {
    /// Parses `raw`. Errors carry the 1-based line of the offending tag.
    fn parse(&self, raw: &str) -> Result<Template>;

    /// The syntax version this parser implements.
    fn version(&self) -> Version;
}

/// Parser for the legacy `${ path }` syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct V1Parser;

/// Parser for the current `{{ path }}` syntax with `${ var }` variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct V2Parser;

const V1_DELIMITERS: &[Delimiters] = &[Delimiters::DOLLAR_BRACE];
const V2_DELIMITERS: &[Delimiters] = &[Delimiters::DOUBLE_BRACE, Delimiters::DOLLAR_BRACE];

impl Parser for V1Parser {
    fn parse(&self, raw: &str) -> Result<Template> {
        parse_with(raw, V1_DELIMITERS, 0)
    }

    fn version(&self) -> Version {
        Version::V1
    }
}

impl Parser for V2Parser {
    fn parse(&self, raw: &str) -> Result<Template> {
        parse_with(raw, V2_DELIMITERS, 0)
    }

    fn version(&self) -> Version {
        Version::V2
    }
}

/// Creates the parser for `version`.
pub fn new_parser(version: Version) -> Box<dyn Parser> {
    match version {
        Version::V1 => Box::new(V1Parser),
        Version::V2 => Box::new(V2Parser),
    }
}

impl TryFrom<&str> for Box<dyn Parser> {
    type Error = TemplateError;

    /// Creates a parser from a version selector: `"1"`, `"2"` or `"latest"`.
    fn try_from(version: &str) -> Result<Self> {
        Ok(new_parser(version.parse()?))
    }
}

/// Tags nested this deep are only accepted as variables.
const MAX_TAG_DEPTH: usize = 2;

fn parse_with(raw: &str, delimiters: &[Delimiters], depth: usize) -> Result<Template> {
    let mut segments = Vec::new();
    for token in scan(raw, delimiters) {
        match token? {
            Token::Literal { text, .. } => segments.push(Segment::Literal(text.into_owned())),
            Token::Tag {
                content, raw, line, ..
            } => {
                let segment =
                    parse_tag(content, raw, delimiters, depth).map_err(|err| err.at_line(line))?;
                segments.push(segment);
            }
        }
    }
    Ok(Template::from_segments(segments))
}

fn parse_tag(content: &str, raw: &str, delimiters: &[Delimiters], depth: usize) -> Result<Segment> {
    let trimmed = content.trim();
    if is_envar_name_posix(trimmed) {
        return Ok(Segment::Variable(VariableRef::new(trimmed, raw)));
    }
    if depth >= MAX_TAG_DEPTH {
        return Err(TemplateError::InvalidSecretPath(trimmed.to_string()));
    }

    // lines inside the tag count from the line the tag opened on
    let leading = &content[..content.len() - content.trim_start().len()];
    let offset = leading.matches('\n').count();
    let nested = parse_with(trimmed, delimiters, depth + 1).map_err(|err| err.at_line(offset + 1))?;

    let mut has_variables = false;
    for segment in nested.segments() {
        match segment {
            Segment::Literal(text) if text.chars().all(|c| !c.is_whitespace() && !c.is_control()) => {}
            Segment::Variable(_) => has_variables = true,
            _ => return Err(TemplateError::InvalidSecretPath(trimmed.to_string())),
        }
    }

    let path = if has_variables {
        SecretPath::Nested(nested)
    } else {
        let path = nested.to_string();
        if !is_valid_secret_path(&path) {
            return Err(TemplateError::InvalidSecretPath(path));
        }
        SecretPath::Literal(path)
    };

    Ok(Segment::Secret(SecretRef::new(path, raw)))
}
