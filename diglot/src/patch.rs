//! Patch descriptions
//!
//! Patches add or suppress passages that do not exist symmetrically in both
//! editions, and correct raw edition text before it is parsed.

use std::collections::BTreeMap;
use std::path::Path;

mod entry;
mod error;
mod parser;

pub use entry::{ChangeKind, PatchEntry, StructuralPatch, TextEdit, TextPatch};
pub use error::PatchError;
pub use parser::parse_patches;

/// All patch entries of a run, grouped by document
#[derive(Debug, Clone, Default)]
pub struct PatchSet {
    by_document: BTreeMap<String, Vec<PatchEntry>>,
}

impl PatchSet {
    /// An empty patch set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a patch description
    pub fn parse(text: &str) -> Result<Self, PatchError> {
        Ok(Self::from_entries(parse_patches(text)?))
    }

    /// Read and parse a patch description file
    pub fn load(path: &Path) -> Result<Self, PatchError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| PatchError::IoError(path.to_path_buf(), e))?;
        Self::parse(&text)
    }

    pub fn from_entries(entries: Vec<PatchEntry>) -> Self {
        let mut by_document: BTreeMap<String, Vec<PatchEntry>> = BTreeMap::new();
        for entry in entries {
            by_document
                .entry(entry.document().to_string())
                .or_default()
                .push(entry);
        }
        Self { by_document }
    }

    /// Structural entries for one document and language, in input order
    ///
    /// # Parameters
    /// * `language` - Edition language
    /// * `document` - Document identifier
    /// * `change` - Restrict to adds or removes; `None` returns both
    pub fn find(&self, language: &str, document: &str, change: Option<ChangeKind>) -> Vec<&StructuralPatch> {
        self.entries(document)
            .iter()
            .filter_map(|entry| match entry {
                PatchEntry::Structural(patch) => Some(patch),
                PatchEntry::Text(_) => None,
            })
            .filter(|patch| patch.language == language)
            .filter(|patch| change.map_or(true, |c| patch.change == c))
            .collect()
    }

    /// Text patches that apply to one edition, in input order
    pub fn text_patches(&self, document: &str, language: &str) -> Vec<&TextPatch> {
        self.entries(document)
            .iter()
            .filter_map(|entry| match entry {
                PatchEntry::Text(patch) if patch.applies_to(document, language) => Some(patch),
                _ => None,
            })
            .collect()
    }

    /// Apply the edition's text patches in order
    ///
    /// # Returns
    /// * Patched content and the patches whose anchor text was not found
    pub fn apply_text_patches<'p>(
        &'p self,
        document: &str,
        language: &str,
        content: String,
    ) -> (String, Vec<&'p TextPatch>) {
        let mut content = content;
        let mut unapplied = Vec::new();
        for patch in self.text_patches(document, language) {
            match patch.apply(&content) {
                Some(patched) => content = patched,
                None => unapplied.push(patch),
            }
        }
        (content, unapplied)
    }

    /// All entries for a document, in input order
    pub fn entries(&self, document: &str) -> &[PatchEntry] {
        self.by_document
            .get(document)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Documents that have at least one entry
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.by_document.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_document.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_document.is_empty()
    }
}
