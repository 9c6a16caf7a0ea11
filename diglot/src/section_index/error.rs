//! Error types for section index construction

use super::key::SectionKey;
use thiserror::Error;

/// Errors raised while feeding markers into a [`super::SectionIndex`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Marker type or value contains `=` or `|`
    #[error("marker {field} '{text}' must not contain '=' or '|'")]
    ReservedCharacter {
        /// Which half of the marker was rejected ("type" or "value")
        field: &'static str,
        /// The offending text
        text: String,
    },

    /// Marker type is empty
    #[error("marker type must not be empty")]
    EmptyMarkerType,

    /// The same combination of active markers was entered twice
    #[error("section '{0}' was already entered earlier in this document")]
    DuplicateKey(SectionKey),

    /// Hand-written key could not be parsed
    #[error("malformed section key '{0}'")]
    MalformedKey(String),
}
