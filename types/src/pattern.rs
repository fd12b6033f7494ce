//! Regular-expression patterns carried by context dependencies.

use std::fmt;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// A compiled pattern plus the literal source and flags it came from.
///
/// The literal form is `/source/flags`, which is also how patterns persist.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    flags: String,
    compiled: Regex,
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern literal must look like /source/flags (got {0:?})")]
    Malformed(String),
    #[error("unsupported pattern flag `{0}`")]
    UnsupportedFlag(char),
    #[error("invalid pattern source: {0}")]
    Invalid(#[from] regex::Error),
}

impl Pattern {
    /// Compile `source` with JavaScript-style `flags`.
    ///
    /// `i`, `m` and `s` change matching; `g`, `u` and `y` are accepted and kept
    /// so the literal round-trips, but have no effect on a whole-string test.
    pub fn new(source: impl Into<String>, flags: impl Into<String>) -> Result<Self, PatternError> {
        let source = source.into();
        let flags = flags.into();
        let mut builder = RegexBuilder::new(&source);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'g' | 'u' | 'y' => {}
                other => return Err(PatternError::UnsupportedFlag(other)),
            }
        }
        let compiled = builder.build()?;
        Ok(Self {
            source,
            flags,
            compiled,
        })
    }

    /// Parse a `/source/flags` literal.
    pub fn parse(literal: &str) -> Result<Self, PatternError> {
        let malformed = || PatternError::Malformed(literal.to_string());
        let body = literal.strip_prefix('/').ok_or_else(malformed)?;
        let (source, flags) = body.rsplit_once('/').ok_or_else(malformed)?;
        Self::new(source, flags)
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn flags(&self) -> &str {
        &self.flags
    }

    #[must_use]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.compiled.is_match(haystack)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.source, self.flags)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

impl Eq for Pattern {}
