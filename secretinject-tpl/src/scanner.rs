//! Single-pass lexer splitting template text into literal runs and delimited tags

use crate::error::TemplateError;
use std::borrow::Cow;

/// The escape marker. Placed directly before an opening delimiter it makes
/// the delimiter literal and is itself dropped from the output.
pub const ESCAPE: char = '\\';

/// A pair of opening and closing tag delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: &'static str,
    pub close: &'static str,
}

impl Delimiters {
    /// `${ ... }`
    pub const DOLLAR_BRACE: Delimiters = Delimiters {
        open: "${",
        close: "}",
    };
    /// `{{ ... }}`
    pub const DOUBLE_BRACE: Delimiters = Delimiters {
        open: "{{",
        close: "}}",
    };
}

/// A lexical unit of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text outside of tags, with escape markers removed.
    Literal { text: Cow<'a, str>, raw: &'a str },
    /// A delimited tag. `content` is everything between the delimiters, untouched.
    Tag {
        delimiters: Delimiters,
        content: &'a str,
        raw: &'a str,
        line: usize,
    },
}

impl<'a> Token<'a> {
    /// The exact source text this token was scanned from.
    pub fn raw(&self) -> &'a str {
        match self {
            Token::Literal { raw, .. } | Token::Tag { raw, .. } => raw,
        }
    }
}

/// Iterator over the tokens of a template.
///
/// Yields `Err` at most once, for a tag that is never closed, and stops after it.
pub struct Scanner<'a> {
    input: &'a str,
    delimiters: &'a [Delimiters],
    pos: usize,
    line: usize,
    failed: bool,
}

/// Scans `input`, recognising tags opened by any of `delimiters`.
pub fn scan<'a>(input: &'a str, delimiters: &'a [Delimiters]) -> Scanner<'a> {
    Scanner {
        input,
        delimiters,
        pos: 0,
        line: 1,
        failed: false,
    }
}

impl<'a> Scanner<'a> {
    fn opener_at(&self, pos: usize) -> Option<Delimiters> {
        let rest = &self.input[pos..];
        self.delimiters
            .iter()
            .copied()
            .find(|d| rest.starts_with(d.open))
    }

    fn escaped_opener_at(&self, pos: usize) -> Option<Delimiters> {
        if !self.input[pos..].starts_with(ESCAPE) {
            return None;
        }
        self.opener_at(pos + ESCAPE.len_utf8())
    }

    fn char_len_at(&self, pos: usize) -> usize {
        self.input[pos..].chars().next().map_or(1, char::len_utf8)
    }

    /// Finds the start of the closer matching a tag whose content begins at
    /// `from`. Inner tags are matched first so their closers are skipped.
    fn find_close(&self, from: usize, close: &'static str) -> Option<usize> {
        let mut pending = vec![close];
        let mut i = from;
        while let Some(&expected) = pending.last() {
            if i >= self.input.len() {
                return None;
            }
            if let Some(d) = self.escaped_opener_at(i) {
                i += ESCAPE.len_utf8() + d.open.len();
                continue;
            }
            if self.input[i..].starts_with(expected) {
                pending.pop();
                if pending.is_empty() {
                    return Some(i);
                }
                i += expected.len();
                continue;
            }
            if let Some(d) = self.opener_at(i) {
                pending.push(d.close);
                i += d.open.len();
                continue;
            }
            i += self.char_len_at(i);
        }
        None
    }

    fn advance_to(&mut self, pos: usize) {
        self.line += self.input[self.pos..pos].matches('\n').count();
        self.pos = pos;
    }

    fn scan_tag(&mut self, delimiters: Delimiters) -> Result<Token<'a>, TemplateError> {
        let line = self.line;
        let content_start = self.pos + delimiters.open.len();
        let end = self
            .find_close(content_start, delimiters.close)
            .ok_or_else(|| TemplateError::TagNotClosed(delimiters.close.to_string()).at_line(line))?;
        let stop = end + delimiters.close.len();
        let token = Token::Tag {
            delimiters,
            content: &self.input[content_start..end],
            raw: &self.input[self.pos..stop],
            line,
        };
        self.advance_to(stop);
        Ok(token)
    }

    fn scan_literal(&mut self) -> Token<'a> {
        let start = self.pos;
        let mut unescaped: Option<String> = None;
        let mut run_start = start;
        let mut i = start;

        while i < self.input.len() {
            if let Some(d) = self.escaped_opener_at(i) {
                let buf = unescaped.get_or_insert_with(String::new);
                buf.push_str(&self.input[run_start..i]);
                buf.push_str(d.open);
                i += ESCAPE.len_utf8() + d.open.len();
                run_start = i;
                continue;
            }
            if self.opener_at(i).is_some() {
                break;
            }
            i += self.char_len_at(i);
        }

        let raw = &self.input[start..i];
        let text = match unescaped {
            Some(mut buf) => {
                buf.push_str(&self.input[run_start..i]);
                Cow::Owned(buf)
            }
            None => Cow::Borrowed(raw),
        };
        self.advance_to(i);
        Token::Literal { text, raw }
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>, TemplateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.input.len() {
            return None;
        }

        match self.opener_at(self.pos) {
            Some(delimiters) => {
                let token = self.scan_tag(delimiters);
                self.failed = token.is_err();
                Some(token)
            }
            None => Some(Ok(self.scan_literal())),
        }
    }
}
