//! Edition alignment
//!
//! Runs one [`MarkupParser`] per edition, feeds a [`SectionIndex`] per edition
//! from the configured marker and passage rules, and merges both indexes with
//! the structural patches of the document.

use crate::corpus_config::CorpusConfig;
use crate::markup::{MarkupError, MarkupParser};
use crate::passage::{AlignedDocument, EditionMetadata};
use crate::patch::{PatchSet, TextPatch};
use itertools::Itertools;
use crate::section_index::SectionIndex;
use std::path::{Path, PathBuf};

mod error;
mod merge;
mod profile;

pub use error::{AlignError, AlignmentWarning};

use merge::Side;
use profile::{marker_for, CompiledProfile, Destination, HeaderPatterns, MarkerCounters};

/// Raw text of one edition file
#[derive(Debug, Clone)]
pub struct EditionText {
    pub path: PathBuf,
    pub content: String,
}

/// One parsed edition
#[derive(Debug)]
pub struct IndexedEdition {
    pub metadata: EditionMetadata,
    pub index: SectionIndex,
}

/// Aligns document pairs for one language pair
///
/// Patterns are compiled once; the aligner is shared across worker threads.
#[derive(Debug)]
pub struct EditionAligner {
    source_language: String,
    target_language: String,
    header: HeaderPatterns,
    source_profile: CompiledProfile,
    target_profile: CompiledProfile,
}

impl EditionAligner {
    /// Compile the header and edition profiles of a configuration
    ///
    /// # Returns
    /// * `Err(AlignError::Pattern)` - A configured pattern is not a valid regular expression
    pub fn new(config: &CorpusConfig) -> Result<Self, AlignError> {
        Ok(Self {
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            header: HeaderPatterns::new(&config.header)?,
            source_profile: CompiledProfile::new(config.profile_for(&config.source_language))?,
            target_profile: CompiledProfile::new(config.profile_for(&config.target_language))?,
        })
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Parse one edition into its metadata and section index
    ///
    /// # Parameters
    /// * `path` - Edition file, for error messages
    /// * `content` - Edition text (text patches already applied)
    /// * `language` - Edition language; selects the source or target profile
    ///
    /// # Returns
    /// * `Ok(IndexedEdition)` - Header metadata and filled index
    /// * `Err(AlignError)` - Malformed markup, missing title, or a duplicate section
    pub fn index_edition(&self, path: &Path, content: &str, language: &str) -> Result<IndexedEdition, AlignError> {
        let profile = if language == self.source_language {
            &self.source_profile
        } else {
            &self.target_profile
        };

        let mut parser = MarkupParser::new(path, content, profile.destinations());
        let metadata = self.read_metadata(&mut parser)?;

        let mut index = SectionIndex::new();
        let mut counters = MarkerCounters::default();

        while parser.advance()? {
            let Some(node) = parser.current() else {
                break;
            };
            let line = node.line;

            match node.destination.map(|d| profile.destination(d)) {
                Some(Destination::Marker(rule)) => {
                    let Some((marker_type, value)) = marker_for(rule, node, &mut counters) else {
                        continue;
                    };
                    if rule.resets_subordinates {
                        for subordinate in profile.subordinates(&marker_type) {
                            index.clear_marker(subordinate);
                            counters.reset(subordinate);
                        }
                    }
                    index
                        .enter_marker(&marker_type, &value)
                        .map_err(|source| AlignError::Index {
                            path: path.to_path_buf(),
                            line,
                            source,
                        })?;
                }
                Some(Destination::Passage) => match parser.fetch_content()? {
                    Some(text) => {
                        index.append(text);
                    }
                    None => log::debug!("{}:{}: empty passage", path.display(), line),
                },
                None => {}
            }
        }

        log::info!(
            "Indexed {} ({}): {} sections, {} passages",
            path.display(),
            language,
            index.keys_in_order().len(),
            index.len()
        );

        Ok(IndexedEdition { metadata, index })
    }

    /// Read title and author before the header boundary
    fn read_metadata(&self, parser: &mut MarkupParser<'_>) -> Result<EditionMetadata, AlignError> {
        let boundary = Some(&self.header.boundary);

        if !parser.seek_to(&self.header.title, boundary)? {
            return Err(MarkupError::MissingHeaderField {
                path: parser.source().to_path_buf(),
                line: parser.line(),
                field: self.header.title.as_str().to_string(),
                boundary: self.header.boundary.as_str().to_string(),
            }
            .into());
        }
        let title = parser.fetch_content()?.unwrap_or_default();

        let author = match &self.header.author {
            Some(pattern) if parser.seek_to(pattern, boundary)? => parser.fetch_content()?,
            _ => None,
        };

        Ok(EditionMetadata { title, author })
    }

    /// Align one document pair
    ///
    /// Text patches are applied to the raw editions first; a patch that does not
    /// match becomes a warning.
    ///
    /// # Parameters
    /// * `document` - Document identifier
    /// * `source` - Source-language edition
    /// * `target` - Target-language edition
    /// * `patches` - Patch set of the run
    ///
    /// # Returns
    /// * `Ok(AlignedDocument)` - Passages in spine order plus diagnostics
    /// * `Err(AlignError)` - Either edition is malformed; no partial output
    pub fn align(
        &self,
        document: &str,
        source: EditionText,
        target: EditionText,
        patches: &PatchSet,
    ) -> Result<AlignedDocument, AlignError> {
        let (source_content, source_missed) =
            patches.apply_text_patches(document, &self.source_language, source.content);
        let (target_content, target_missed) =
            patches.apply_text_patches(document, &self.target_language, target.content);

        let mut warnings = unapplied_text_patches(
            document,
            (self.source_language.as_str(), source_missed.as_slice()),
            (self.target_language.as_str(), target_missed.as_slice()),
        );

        let source_edition = self.index_edition(&source.path, &source_content, &self.source_language)?;
        let target_edition = self.index_edition(&target.path, &target_content, &self.target_language)?;

        let (passages, merge_warnings) = merge::merge(
            document,
            Side {
                language: &self.source_language,
                index: &source_edition.index,
            },
            Side {
                language: &self.target_language,
                index: &target_edition.index,
            },
            patches,
        );
        warnings.extend(merge_warnings);

        Ok(AlignedDocument {
            document_id: document.to_string(),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            source_metadata: source_edition.metadata,
            target_metadata: target_edition.metadata,
            passages,
            warnings,
        })
    }
}

/// Warnings for text patches that found no anchor text
///
/// A patch addressed to one edition is reported when it missed that edition. A
/// patch addressed to every edition is reported once, and only when it missed both.
fn unapplied_text_patches(
    document: &str,
    source: (&str, &[&TextPatch]),
    target: (&str, &[&TextPatch]),
) -> Vec<AlignmentWarning> {
    let missed_target = |patch: &TextPatch| target.1.iter().any(|t| std::ptr::eq(*t, patch));

    source
        .1
        .iter()
        .map(|patch| (source.0, *patch))
        .chain(target.1.iter().map(|patch| (target.0, *patch)))
        .filter(|(language, patch)| match patch.language {
            Some(_) => true,
            None => *language == source.0 && missed_target(*patch),
        })
        .sorted_by_key(|(_, patch)| patch.line)
        .map(|(language, patch)| {
            let warning = AlignmentWarning::TextPatchUnapplied {
                language: patch.language.as_ref().map(|_| language.to_string()),
                line: patch.line,
            };
            log::warn!("{}: {}", document, warning);
            warning
        })
        .collect()
}
