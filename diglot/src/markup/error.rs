//! Error types for markup parsing

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal problems found while walking one edition
///
/// Every variant carries the file path and the 1-based line of the offending token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// The XML tokenizer rejected the input
    #[error("{file}:{line}: XML syntax error: {message}", file = .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// An element name contains the path delimiter
    #[error("{file}:{line}: element name '{name}' contains the reserved path delimiter '.'", file = .path.display())]
    ReservedDelimiter {
        path: PathBuf,
        line: usize,
        name: String,
    },

    /// A tag that does not belong in a spelling-variant construct
    #[error("{file}:{line}: unexpected <{tag}> inside variant construct <{wrapper}>", file = .path.display())]
    UnexpectedVariantTag {
        path: PathBuf,
        line: usize,
        tag: String,
        wrapper: String,
    },

    /// Closing tag does not match the innermost open element
    #[error("{file}:{line}: closing </{found}> does not match open <{expected}>", file = .path.display())]
    MismatchedClose {
        path: PathBuf,
        line: usize,
        expected: String,
        found: String,
    },

    /// Closing tag with no open element
    #[error("{file}:{line}: closing </{found}> without an open element", file = .path.display())]
    UnexpectedClose {
        path: PathBuf,
        line: usize,
        found: String,
    },

    /// Input ended with elements still open
    #[error("{file}:{line}: document ended inside <{open}>", file = .path.display())]
    UnexpectedEof {
        path: PathBuf,
        line: usize,
        open: String,
    },

    /// A mandatory header field is absent before its boundary element
    #[error("{file}:{line}: mandatory header field '{field}' not found before '{boundary}'", file = .path.display())]
    MissingHeaderField {
        path: PathBuf,
        line: usize,
        field: String,
        boundary: String,
    },
}

impl MarkupError {
    /// File the error was found in
    pub fn path(&self) -> &Path {
        match self {
            Self::Syntax { path, .. }
            | Self::ReservedDelimiter { path, .. }
            | Self::UnexpectedVariantTag { path, .. }
            | Self::MismatchedClose { path, .. }
            | Self::UnexpectedClose { path, .. }
            | Self::UnexpectedEof { path, .. }
            | Self::MissingHeaderField { path, .. } => path,
        }
    }

    /// Line the error was found on
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. }
            | Self::ReservedDelimiter { line, .. }
            | Self::UnexpectedVariantTag { line, .. }
            | Self::MismatchedClose { line, .. }
            | Self::UnexpectedClose { line, .. }
            | Self::UnexpectedEof { line, .. }
            | Self::MissingHeaderField { line, .. } => *line,
        }
    }
}
