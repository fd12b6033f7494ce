//! Error taxonomy for freezing and thawing.
//!
//! An unknown type is not an error: engines return `Ok(None)` for it. Anything
//! that does surface as an [`Error`] aborts the whole call tree, and whatever
//! was produced before it must be discarded.

use hoard_types::{AttachError, PatternError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("field `{field}` holds a {shape} value and has no codec that can persist it")]
    NotPlain { field: String, shape: &'static str },
    #[error("field `{field}` expected {expected}, found {found}")]
    UnexpectedShape {
        field: String,
        expected: &'static str,
        found: String,
    },
    #[error("malformed pattern in `{field}`: {source}")]
    MalformedPattern {
        field: String,
        #[source]
        source: PatternError,
    },
    #[error("invalid frozen record: {0}")]
    InvalidRecord(String),
    #[error("`{field}` is stored relative to its module but the session has no owner")]
    MissingOwner { field: String },
    #[error("local module index {index} exceeds the limit of {limit}")]
    LocalModuleIndex { index: usize, limit: usize },
    #[error("nesting exceeds the maximum depth of {0}")]
    DepthExceeded(usize),
}

#[derive(Debug, Error)]
pub enum ConstructionError {
    #[error("{type_name}: missing required field `{field}`")]
    MissingField {
        type_name: &'static str,
        field: &'static str,
    },
    #[error("{type_name}: field `{field}` expected {expected}, found {found}")]
    WrongShape {
        type_name: &'static str,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{type_name}: field `{field}` could not be decoded: {source}")]
    Decode {
        type_name: &'static str,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Attach(#[from] AttachError),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Describe a JSON value's type for error messages.
pub(crate) fn json_kind(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
    .to_string()
}
