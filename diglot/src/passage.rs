//! Aligned output model

use crate::aligner::AlignmentWarning;
use crate::section_index::SectionKey;
use serde::Serialize;

/// Title and author read from an edition header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditionMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// One section of the source spine with both editions' text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignedPassage {
    /// Canonical section key
    pub key: SectionKey,

    /// Marker map (first-entered order) for display labels such as "chapter 4"
    pub labels: Vec<(String, String)>,

    /// Source-edition content elements of the section
    pub source: Vec<String>,

    /// Target-edition content elements; empty when the translation lacks the section
    pub target: Vec<String>,

    /// Whether a patch supplied or suppressed any part of this passage
    pub patched: bool,
}

impl AlignedPassage {
    /// Source content joined into one paragraph-separated string
    pub fn source_text(&self) -> String {
        self.source.join("\n\n")
    }

    /// Target content joined into one paragraph-separated string
    pub fn target_text(&self) -> String {
        self.target.join("\n\n")
    }

    /// Human-readable label, e.g. "book 1, chapter 4"
    pub fn display_label(&self) -> String {
        if self.labels.is_empty() {
            return self.key.to_string();
        }
        self.labels
            .iter()
            .map(|(t, v)| format!("{t} {v}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Result of aligning one document pair
#[derive(Debug, Clone, Serialize)]
pub struct AlignedDocument {
    /// Document identifier, e.g. `phi0448.phi001`
    pub document_id: String,
    pub source_language: String,
    pub target_language: String,
    pub source_metadata: EditionMetadata,
    pub target_metadata: EditionMetadata,
    /// Passages in presentation order
    pub passages: Vec<AlignedPassage>,
    /// Recoverable problems found while merging
    pub warnings: Vec<AlignmentWarning>,
}

impl AlignedDocument {
    /// Number of passages whose target side is empty
    pub fn untranslated(&self) -> usize {
        self.passages.iter().filter(|p| p.target.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_text_and_label() {
        let passage = AlignedPassage {
            key: SectionKey::parse("book=1|chapter=4").unwrap(),
            labels: vec![
                ("book".to_string(), "1".to_string()),
                ("chapter".to_string(), "4".to_string()),
            ],
            source: vec!["Gallia est".to_string(), "omnis divisa".to_string()],
            target: Vec::new(),
            patched: false,
        };
        assert_eq!(passage.source_text(), "Gallia est\n\nomnis divisa");
        assert_eq!(passage.target_text(), "");
        assert_eq!(passage.display_label(), "book 1, chapter 4");
    }
}
