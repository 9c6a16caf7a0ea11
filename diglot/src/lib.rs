//! diglot - parallel alignment of classical text editions
//!
//! Aligns a source-language TEI edition and its translation into one ordered
//! list of corresponding passages, keyed by the structural markers (book,
//! chapter, section, speech) both editions share, with a patch list for
//! passages that exist in only one of them.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
// Allow some pedantic lints that are too strict for this project
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::enum_variant_names)]

pub mod aligner;
pub mod corpus_config;
pub mod markup;
pub mod passage;
pub mod patch;
pub mod section_index;
pub mod walker;

// Batch driver
pub mod pipeline;

pub use aligner::{AlignError, AlignmentWarning, EditionAligner, EditionText};
pub use corpus_config::CorpusConfig;
pub use passage::{AlignedDocument, AlignedPassage};
pub use patch::PatchSet;
pub use section_index::{SectionIndex, SectionKey};
