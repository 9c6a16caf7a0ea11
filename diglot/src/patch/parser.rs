//! Line-oriented patch description parser
//!
//! A description is a sequence of blocks separated by blank lines. Each line is
//! either `label: value` or a continuation appended (space-joined) to the value
//! of the previous label. Example:
//!
//! ```text
//! document: phi0448.phi001
//! language: eng
//! key: book=1|chapter=3
//! after: book=1|chapter=2
//! before: book=1|chapter=4
//! content: Orgetorix was by far the most distinguished
//!   and wealthy among the Helvetii.
//! ```

use super::entry::{ChangeKind, PatchEntry, StructuralPatch, TextEdit, TextPatch};
use super::error::PatchError;
use crate::section_index::SectionKey;
use std::collections::BTreeMap;

/// Labels recognized at the start of a line
const LABELS: &[&str] = &[
    "document", "match", "replace", "start", "end", "after", "key", "before", "language",
    "content", "action",
];

const STRUCTURAL_LABELS: &[&str] = &[
    "document", "language", "key", "after", "before", "content", "action",
];
const SUBSTITUTE_LABELS: &[&str] = &["document", "language", "match", "replace"];
const RANGE_LABELS: &[&str] = &["document", "language", "start", "end", "replace"];

/// Labels collected for one block: label -> (value, line)
#[derive(Debug, Default)]
struct Block {
    start_line: usize,
    fields: BTreeMap<&'static str, (String, usize)>,
}

impl Block {
    fn insert(&mut self, label: &'static str, value: &str, line: usize) -> Result<(), PatchError> {
        if self.fields.is_empty() {
            self.start_line = line;
        }
        if self.fields.contains_key(label) {
            return Err(PatchError::DuplicateLabel {
                line,
                label: label.to_string(),
            });
        }
        self.fields.insert(label, (value.trim().to_string(), line));
        Ok(())
    }

    fn continue_value(&mut self, label: &'static str, text: &str) {
        if let Some((value, _)) = self.fields.get_mut(label) {
            if !value.is_empty() {
                value.push(' ');
            }
            value.push_str(text.trim());
        }
    }

    /// Value of a label that must be present and non-empty
    fn required(&self, label: &str) -> Result<String, PatchError> {
        match self.fields.get(label) {
            Some((value, _)) if !value.is_empty() => Ok(value.clone()),
            _ => Err(PatchError::MissingLabel {
                line: self.start_line,
                label: label.to_string(),
            }),
        }
    }

    /// Value of a label that must be present but may be empty
    fn present(&self, label: &str) -> Result<String, PatchError> {
        self.fields
            .get(label)
            .map(|(value, _)| value.clone())
            .ok_or_else(|| PatchError::MissingLabel {
                line: self.start_line,
                label: label.to_string(),
            })
    }

    fn optional(&self, label: &str) -> Option<String> {
        self.fields
            .get(label)
            .map(|(value, _)| value.clone())
            .filter(|value| !value.is_empty())
    }

    fn key(&self, label: &str) -> Result<Option<SectionKey>, PatchError> {
        let Some((value, line)) = self.fields.get(label) else {
            return Ok(None);
        };
        SectionKey::parse(value)
            .map(Some)
            .map_err(|source| PatchError::InvalidKey {
                line: *line,
                source,
            })
    }

    fn only(&self, allowed: &[&str], kind: &'static str) -> Result<(), PatchError> {
        match self.fields.iter().find(|(label, _)| !allowed.contains(*label)) {
            Some((label, (_, line))) => Err(PatchError::UnexpectedLabel {
                line: *line,
                label: label.to_string(),
                kind,
            }),
            None => Ok(()),
        }
    }

    /// Turn the collected labels into an entry
    fn realize(&self) -> Result<Option<PatchEntry>, PatchError> {
        if self.fields.is_empty() {
            return Ok(None);
        }
        if self.fields.contains_key("key") {
            return self.structural().map(Some);
        }
        if self.fields.contains_key("match") {
            self.only(SUBSTITUTE_LABELS, "substitution")?;
            return Ok(Some(PatchEntry::Text(TextPatch {
                document: self.required("document")?,
                language: self.optional("language"),
                edit: TextEdit::Substitute {
                    pattern: self.required("match")?,
                    replacement: self.present("replace")?,
                },
                line: self.start_line,
            })));
        }
        if self.fields.contains_key("start") || self.fields.contains_key("end") {
            self.only(RANGE_LABELS, "range replacement")?;
            return Ok(Some(PatchEntry::Text(TextPatch {
                document: self.required("document")?,
                language: self.optional("language"),
                edit: TextEdit::ReplaceRange {
                    start: self.required("start")?,
                    end: self.required("end")?,
                    replacement: self.present("replace")?,
                },
                line: self.start_line,
            })));
        }
        Err(PatchError::UnrecognizedBlock {
            line: self.start_line,
        })
    }

    fn structural(&self) -> Result<PatchEntry, PatchError> {
        self.only(STRUCTURAL_LABELS, "structural")?;

        let change = match self.fields.get("action") {
            None => ChangeKind::Add,
            Some((action, line)) => match action.to_ascii_lowercase().as_str() {
                "add" => ChangeKind::Add,
                "remove" => ChangeKind::Remove,
                _ => {
                    return Err(PatchError::InvalidAction {
                        line: *line,
                        action: action.clone(),
                    })
                }
            },
        };

        let content = match change {
            ChangeKind::Add => Some(self.required("content")?),
            ChangeKind::Remove => {
                if let Some((_, line)) = self.fields.get("content") {
                    return Err(PatchError::UnexpectedLabel {
                        line: *line,
                        label: "content".to_string(),
                        kind: "remove",
                    });
                }
                None
            }
        };

        let key = self.key("key")?.ok_or_else(|| PatchError::MissingLabel {
            line: self.start_line,
            label: "key".to_string(),
        })?;

        Ok(PatchEntry::Structural(StructuralPatch {
            change,
            document: self.required("document")?,
            language: self.required("language")?,
            key,
            after: self.key("after")?,
            before: self.key("before")?,
            content,
            line: self.start_line,
        }))
    }
}

/// Split `label: value` when the line starts with a known label
fn split_label(line: &str) -> Option<(&'static str, &str)> {
    let (label, value) = line.split_once(':')?;
    LABELS
        .iter()
        .find(|known| **known == label)
        .map(|known| (*known, value))
}

/// Parse a patch description into entries, in input order
///
/// # Parameters
/// * `text` - Whole patch description
///
/// # Returns
/// * `Ok(Vec<PatchEntry>)` - All realized blocks
/// * `Err(PatchError)` - First format error, naming its line
pub fn parse_patches(text: &str) -> Result<Vec<PatchEntry>, PatchError> {
    let mut entries = Vec::new();
    let mut block = Block::default();
    let mut last_label: Option<&'static str> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;

        if raw.trim().is_empty() {
            entries.extend(block.realize()?);
            block = Block::default();
            last_label = None;
            continue;
        }

        match split_label(raw) {
            Some((label, value)) => {
                block.insert(label, value, line)?;
                last_label = Some(label);
            }
            None => {
                let label = last_label.ok_or(PatchError::OrphanContinuation { line })?;
                block.continue_value(label, raw);
            }
        }
    }
    entries.extend(block.realize()?);

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn structural(entry: &PatchEntry) -> &StructuralPatch {
        match entry {
            PatchEntry::Structural(patch) => patch,
            other => panic!("expected structural patch, got {other:?}"),
        }
    }

    #[test]
    fn test_add_block_with_continuation() {
        let text = "\
document: phi0448.phi001
language: eng
key: chapter=3|book=1
after: book=1|chapter=2
content: Orgetorix was by far
  the most distinguished.
";
        let entries = parse_patches(text).unwrap();
        assert_eq!(entries.len(), 1);
        let patch = structural(&entries[0]);
        assert_eq!(patch.change, ChangeKind::Add);
        assert_eq!(patch.key.as_str(), "book=1|chapter=3");
        assert_eq!(patch.after.as_ref().unwrap().as_str(), "book=1|chapter=2");
        assert!(patch.before.is_none());
        assert_eq!(
            patch.content.as_deref(),
            Some("Orgetorix was by far the most distinguished.")
        );
        assert_eq!(patch.line, 1);
    }

    #[test]
    fn test_blocks_in_input_order() {
        let text = "\
document: a.b
language: eng
key: chapter=9
action: remove

document: a.b
match: &c.
replace: etc.

document: a.b
language: lat
start: <gap
end: />
replace:
";
        let entries = parse_patches(text).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(structural(&entries[0]).change, ChangeKind::Remove);
        assert!(matches!(
            &entries[1],
            PatchEntry::Text(TextPatch { edit: TextEdit::Substitute { .. }, language: None, line: 6, .. })
        ));
        match &entries[2] {
            PatchEntry::Text(patch) => {
                assert_eq!(patch.language.as_deref(), Some("lat"));
                assert_eq!(
                    patch.edit,
                    TextEdit::ReplaceRange {
                        start: "<gap".to_string(),
                        end: "/>".to_string(),
                        replacement: String::new(),
                    }
                );
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_incomplete_block_names_line() {
        let text = "document: a.b\nlanguage: eng\n\ndocument: a.b\nlanguage: eng\n";
        let err = parse_patches(text).unwrap_err();
        assert!(matches!(err, PatchError::UnrecognizedBlock { line: 1 }));

        let text = "\n\ndocument: a.b\nmatch: foo\n";
        let err = parse_patches(text).unwrap_err();
        assert!(matches!(err, PatchError::MissingLabel { line: 3, ref label } if label == "replace"));
    }

    #[test]
    fn test_add_without_content_is_incomplete() {
        let text = "document: a.b\nlanguage: eng\nkey: chapter=1\nafter: chapter=0\n";
        assert!(matches!(
            parse_patches(text).unwrap_err(),
            PatchError::MissingLabel { ref label, .. } if label == "content"
        ));
    }

    #[test]
    fn test_orphan_continuation() {
        let err = parse_patches("just some words\n").unwrap_err();
        assert!(matches!(err, PatchError::OrphanContinuation { line: 1 }));
    }

    #[test]
    fn test_duplicate_label() {
        let text = "document: a.b\ndocument: c.d\n";
        assert!(matches!(
            parse_patches(text).unwrap_err(),
            PatchError::DuplicateLabel { line: 2, .. }
        ));
    }

    #[test]
    fn test_invalid_key_and_action() {
        let text = "document: a.b\nlanguage: eng\nkey: chapter\ncontent: x\n";
        assert!(matches!(
            parse_patches(text).unwrap_err(),
            PatchError::InvalidKey { line: 3, .. }
        ));

        let text = "document: a.b\nlanguage: eng\nkey: chapter=1\naction: move\n";
        assert!(matches!(
            parse_patches(text).unwrap_err(),
            PatchError::InvalidAction { line: 4, .. }
        ));
    }

    #[test]
    fn test_mixed_block_is_rejected() {
        let text = "document: a.b\nlanguage: eng\nkey: chapter=1\ncontent: x\nmatch: y\n";
        assert!(matches!(
            parse_patches(text).unwrap_err(),
            PatchError::UnexpectedLabel { line: 5, .. }
        ));
    }

    #[test]
    fn test_unknown_label_is_continuation() {
        let text = "document: a.b\nlanguage: eng\nkey: chapter=1\ncontent: Caesar\nnote: said this\n";
        let entries = parse_patches(text).unwrap();
        assert_eq!(
            structural(&entries[0]).content.as_deref(),
            Some("Caesar note: said this")
        );
    }
}
