//! Error and diagnostic types for edition alignment

use crate::markup::MarkupError;
use crate::section_index::{IndexError, SectionKey};
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems; the document yields no aligned output
#[derive(Error, Debug)]
pub enum AlignError {
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// Marker could not be entered (reserved characters, duplicate section)
    #[error("{file}:{line}: {source}", file = .path.display())]
    Index {
        path: PathBuf,
        line: usize,
        #[source]
        source: IndexError,
    },

    #[error("invalid path pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Recoverable problems; the offending patch or section is left out
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentWarning {
    /// An anchor key does not exist in the spine
    #[error("patch at line {line}: anchor '{anchor}' for '{key}' is not in the spine, add dropped")]
    AnchorMissing {
        key: SectionKey,
        anchor: SectionKey,
        line: usize,
    },

    /// Both anchors exist but another section sits between them
    #[error("patch at line {line}: anchors '{after}' and '{before}' for '{key}' are not adjacent, add dropped")]
    AnchorNotAdjacent {
        key: SectionKey,
        after: SectionKey,
        before: SectionKey,
        line: usize,
    },

    #[error("patch at line {line}: add for '{key}' has no anchor, add dropped")]
    NoAnchor { key: SectionKey, line: usize },

    #[error("patch at line {line}: '{key}' already exists in the spine, add dropped")]
    DuplicateAdd { key: SectionKey, line: usize },

    #[error("patch at line {line}: remove for '{key}' ({language}) matches no passage")]
    RemoveMissing {
        key: SectionKey,
        language: String,
        line: usize,
    },

    /// Target section with no counterpart in the source spine
    #[error("target section '{key}' has no source counterpart and was left out")]
    UnmatchedTarget { key: SectionKey },

    /// Text patch whose anchor text does not occur in the edition
    ///
    /// `language` is `None` for a patch addressed to every edition that matched none of them.
    #[error("text patch at line {line} did not match {}", edition_label(.language))]
    TextPatchUnapplied { language: Option<String>, line: usize },
}

fn edition_label(language: &Option<String>) -> String {
    match language {
        Some(language) => format!("the {language} edition"),
        None => "any edition".to_string(),
    }
}
