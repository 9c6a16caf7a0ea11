//! Error types for patch description parsing

use crate::section_index::IndexError;
use std::path::PathBuf;
use thiserror::Error;

/// Format errors in a patch description
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error reading {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("line {line}: continuation line without a preceding label")]
    OrphanContinuation { line: usize },

    #[error("line {line}: label '{label}' appears twice in one block")]
    DuplicateLabel { line: usize, label: String },

    #[error("line {line}: incomplete patch block, missing '{label}'")]
    MissingLabel { line: usize, label: String },

    #[error("line {line}: label '{label}' is not valid in a {kind} block")]
    UnexpectedLabel {
        line: usize,
        label: String,
        kind: &'static str,
    },

    #[error("line {line}: incomplete patch block, expected 'key', 'match' or 'start'/'end'")]
    UnrecognizedBlock { line: usize },

    #[error("line {line}: unknown action '{action}', expected 'add' or 'remove'")]
    InvalidAction { line: usize, action: String },

    #[error("line {line}: invalid section key: {source}")]
    InvalidKey {
        line: usize,
        #[source]
        source: IndexError,
    },
}
