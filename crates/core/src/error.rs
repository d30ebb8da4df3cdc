//! Typed error types for template handling and compilation.

use std::io;
use std::path::PathBuf;

/// Errors raised while compiling a template or canned label into a device
/// program.
///
/// Every variant is detected before any output is returned, so a failed
/// compilation never yields a partial program.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// A template or element dimension is zero.
    #[error("invalid dimension: {field} must be > 0 (got {value})")]
    InvalidDimension {
        /// Which dimension was rejected (e.g. `"template.width"`).
        field: &'static str,
        /// The rejected value.
        value: u32,
    },

    /// A placeholder token has no entry in the substitution context.
    ///
    /// Only raised under [`MissingFieldPolicy::Fail`](crate::MissingFieldPolicy::Fail).
    #[error("no value for placeholder ${{{name}}}")]
    MissingField {
        /// The placeholder name.
        name: String,
    },

    /// Field data contains a device-control prefix character (`^` or `~`).
    #[error("reserved character {ch:?} at offset {offset} in field data {field_data:?}")]
    ReservedCharacter {
        /// The resolved field data.
        field_data: String,
        /// The offending character.
        ch: char,
        /// Byte offset of `ch` within `field_data`.
        offset: usize,
    },

    /// Field data contains a character outside the single-byte ASCII range.
    #[error("non-ASCII character {ch:?} at offset {offset} in field data {field_data:?}")]
    NonAscii {
        /// The resolved field data.
        field_data: String,
        /// The offending character.
        ch: char,
        /// Byte offset of `ch` within `field_data`.
        offset: usize,
    },
}

/// Errors raised while decoding, encoding, or storing template documents.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The document is not valid JSON or does not match the template shape.
    #[error("malformed template document: {0}")]
    Json(#[from] serde_json::Error),

    /// An element's `type` tag has no registered decoder.
    #[error("unknown element kind {kind:?}")]
    UnknownElementKind {
        /// The unrecognised tag.
        kind: String,
    },

    /// An element object is missing its `type` tag.
    #[error("element {index} has no \"type\" tag")]
    MissingElementKind {
        /// Position of the element in the template.
        index: usize,
    },

    /// The template store could not read or write a file.
    #[error("template store I/O error at {path}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// No stored template has the requested name.
    #[error("template not found: {0}")]
    NotFound(String),
}

/// Error returned by a [`RecordLookup`](crate::RecordLookup) backend.
#[derive(Debug, thiserror::Error)]
#[error("record lookup failed: {message}")]
pub struct LookupError {
    /// Human-readable description of the failure.
    pub message: String,
    /// The backend's underlying error, if any.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LookupError {
    /// Create a lookup error with no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }
}
