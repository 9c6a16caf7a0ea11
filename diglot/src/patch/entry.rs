//! Patch entry types

use crate::section_index::SectionKey;
use serde::Serialize;

/// Kind of structural change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Insert a passage that one edition lacks
    Add,
    /// Suppress a passage even if structurally present
    Remove,
}

/// Add or remove a passage by section key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralPatch {
    pub change: ChangeKind,
    /// Document identifier (e.g. `phi0448.phi001`)
    pub document: String,
    /// Language of the edition the change applies to
    pub language: String,
    /// Section the change targets
    pub key: SectionKey,
    /// Key the added passage must follow
    pub after: Option<SectionKey>,
    /// Key the added passage must precede
    pub before: Option<SectionKey>,
    /// Text of an added passage
    pub content: Option<String>,
    /// First line of the block in the patch description
    pub line: usize,
}

/// Raw-text correction applied before an edition is parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEdit {
    /// Replace every occurrence of `pattern`
    Substitute { pattern: String, replacement: String },
    /// Replace the span from `start` through the next `end`
    ReplaceRange {
        start: String,
        end: String,
        replacement: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPatch {
    pub document: String,
    /// Restrict to one edition; `None` patches every edition of the document
    pub language: Option<String>,
    pub edit: TextEdit,
    pub line: usize,
}

impl TextPatch {
    pub fn applies_to(&self, document: &str, language: &str) -> bool {
        self.document == document && self.language.as_deref().map_or(true, |l| l == language)
    }

    /// Apply the edit, or `None` if its anchor text does not occur
    pub fn apply(&self, content: &str) -> Option<String> {
        match &self.edit {
            TextEdit::Substitute {
                pattern,
                replacement,
            } => content
                .contains(pattern.as_str())
                .then(|| content.replace(pattern.as_str(), replacement)),
            TextEdit::ReplaceRange {
                start,
                end,
                replacement,
            } => {
                let from = content.find(start.as_str())?;
                let after_start = from + start.len();
                let to = after_start + content[after_start..].find(end.as_str())? + end.len();
                Some(format!("{}{}{}", &content[..from], replacement, &content[to..]))
            }
        }
    }
}

/// One realized block of a patch description
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchEntry {
    Structural(StructuralPatch),
    Text(TextPatch),
}

impl PatchEntry {
    pub fn document(&self) -> &str {
        match self {
            Self::Structural(patch) => &patch.document,
            Self::Text(patch) => &patch.document,
        }
    }
}
