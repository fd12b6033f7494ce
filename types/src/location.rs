//! Source ranges and locations attached to dependencies.

use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Byte range of a dependency in the module source. Serialized as `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange(pub u32, pub u32);

impl SourceRange {
    #[must_use]
    pub fn new(start: u32, end: u32) -> Self {
        Self(start, end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    #[must_use]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Where a dependency was found.
///
/// A location may inherit unset fields from a base location it was derived
/// from (a sub-expression inside a larger statement, for instance). Persisting
/// it therefore goes through [`SourceLocation::flatten`], which resolves the
/// whole chain into one plain record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    start: Option<Position>,
    end: Option<Position>,
    name: Option<String>,
    index: Option<u32>,
    base: Option<Rc<SourceLocation>>,
}

/// A location with its inheritance chain resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatLocation {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub index: Option<u32>,
}

impl SourceLocation {
    #[must_use]
    pub fn span(start: Position, end: Position) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    /// A synthetic location: a name plus an optional ordinal.
    #[must_use]
    pub fn named(name: impl Into<String>, index: Option<u32>) -> Self {
        Self {
            name: Some(name.into()),
            index,
            ..Self::default()
        }
    }

    /// A location that falls back to `base` for every field it does not set.
    #[must_use]
    pub fn derived_from(base: Rc<SourceLocation>) -> Self {
        Self {
            base: Some(base),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_start(mut self, start: Position) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn flatten(&self) -> FlatLocation {
        let inherited = self
            .base
            .as_deref()
            .map(SourceLocation::flatten)
            .unwrap_or_default();
        FlatLocation {
            start: self.start.or(inherited.start),
            end: self.end.or(inherited.end),
            name: self.name.clone().or(inherited.name),
            index: self.index.or(inherited.index),
        }
    }

    #[must_use]
    pub fn start(&self) -> Option<Position> {
        self.start
            .or_else(|| self.base.as_deref().and_then(SourceLocation::start))
    }

    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.flatten().name
    }
}

impl From<FlatLocation> for SourceLocation {
    fn from(flat: FlatLocation) -> Self {
        Self {
            start: flat.start,
            end: flat.end,
            name: flat.name,
            index: flat.index,
            base: None,
        }
    }
}
