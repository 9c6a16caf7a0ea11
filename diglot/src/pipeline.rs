//! Three-stage corpus alignment pipeline
//!
//! This module orchestrates the three stages of a batch run:
//! 1. **Discovery**: Load diglot.toml, the patch file and the edition pairs
//! 2. **Alignment**: Align every document pair independently
//! 3. **Export**: Write one JSON file per aligned document

use crate::aligner::{AlignError, EditionAligner, EditionText};
use crate::corpus_config::{CorpusConfig, CorpusConfigError, CONFIG_FILE_NAME};
use crate::passage::AlignedDocument;
use crate::patch::{PatchError, PatchSet};
use crate::walker::{self, CorpusListing, EditionFile, EditionPair, WalkerError};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Everything a batch run needs, loaded from the corpus root
#[derive(Debug)]
pub struct Corpus {
    pub root: PathBuf,
    pub config: CorpusConfig,
    pub patches: PatchSet,
    pub listing: CorpusListing,
}

/// Stage 1: Discover the corpus
///
/// # Parameters
/// * `root` - Corpus directory containing diglot.toml and the edition files
///
/// # Returns
/// * `Ok(Corpus)` - Configuration, patches and paired editions
/// * `Err(PipelineError)` - Error loading configuration or patches, or walking the corpus
pub fn discover(root: &Path) -> Result<Corpus, PipelineError> {
    let config = load_config(root)?;

    let patches = match config.patch_path(root) {
        Some(path) => {
            let patches = PatchSet::load(&path)?;
            log::info!("Loaded {} patch entries from {}", patches.len(), path.display());
            patches
        }
        None => PatchSet::new(),
    };

    let editions = walker::walk_corpus(root).map_err(PipelineError::WalkError)?;
    log::info!("Found {} edition files", editions.len());

    let listing = walker::pair_editions(editions, &config.source_language, &config.target_language);

    Ok(Corpus {
        root: root.to_path_buf(),
        config,
        patches,
        listing,
    })
}

/// Load diglot.toml from a corpus root
pub fn load_config(root: &Path) -> Result<CorpusConfig, PipelineError> {
    let config_path = root.join(CONFIG_FILE_NAME);
    CorpusConfig::load(&config_path).map_err(|e| PipelineError::ConfigError(config_path, Box::new(e)))
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successfully aligned documents, ordered by document ID
    pub aligned: Vec<AlignedDocument>,
    /// Failed documents by ID with cause
    pub failures: Vec<(String, PipelineError)>,
    /// Documents lacking a source or target edition
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Stage 2: Align every document pair of the corpus
///
/// Each pair is aligned on its own; a failing document does not stop the others.
///
/// # Parameters
/// * `corpus` - Discovered corpus
///
/// # Returns
/// * `Ok(BatchReport)` - Aligned documents and per-document failures
/// * `Err(PipelineError)` - The configured patterns could not be compiled
pub fn align_corpus(corpus: &Corpus) -> Result<BatchReport, PipelineError> {
    let aligner = EditionAligner::new(&corpus.config)?;

    // Align documents (optionally in parallel)
    #[cfg(feature = "parallel")]
    let results: Vec<_> = corpus
        .listing
        .pairs
        .par_iter()
        .map(|pair| (pair.document_id.clone(), align_pair(&aligner, pair, &corpus.patches)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<_> = corpus
        .listing
        .pairs
        .iter()
        .map(|pair| (pair.document_id.clone(), align_pair(&aligner, pair, &corpus.patches)))
        .collect();

    let mut report = BatchReport {
        skipped: corpus.listing.unpaired.clone(),
        ..BatchReport::default()
    };
    for (document_id, result) in results {
        match result {
            Ok(document) => report.aligned.push(document),
            Err(e) => {
                log::error!("{}: {}", document_id, e);
                report.failures.push((document_id, e));
            }
        }
    }

    Ok(report)
}

/// Read and align one document pair
pub fn align_pair(
    aligner: &EditionAligner,
    pair: &EditionPair,
    patches: &PatchSet,
) -> Result<AlignedDocument, PipelineError> {
    log::info!(
        "Aligning {} ({} <-> {})",
        pair.document_id,
        pair.source.path.display(),
        pair.target.path.display()
    );

    let source = read_edition(&pair.source)?;
    let target = read_edition(&pair.target)?;
    let document = aligner.align(&pair.document_id, source, target, patches)?;

    log::info!(
        "Aligned {}: {} passages, {} warnings",
        pair.document_id,
        document.passages.len(),
        document.warnings.len()
    );
    Ok(document)
}

fn read_edition(edition: &EditionFile) -> Result<EditionText, PipelineError> {
    let content = std::fs::read_to_string(&edition.path)
        .map_err(|e| PipelineError::IoError(edition.path.clone(), e))?;
    Ok(EditionText {
        path: edition.path.clone(),
        content,
    })
}

/// Stage 3: Export aligned documents
pub mod export {
    use super::*;

    /// Export one aligned document as pretty-printed JSON
    ///
    /// # Parameters
    /// * `document` - The aligned document to export
    /// * `output_dir` - Directory where `<document_id>.json` will be written
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path of the written file
    /// * `Err(ExportError)` - Error serializing or writing the file
    pub fn to_json(document: &AlignedDocument, output_dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(output_dir).map_err(ExportError::IoError)?;

        let output_path = output_dir.join(format!("{}.json", document.document_id));
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| ExportError::FormatError(e.to_string()))?;

        log::info!("Writing JSON to: {}", output_path.display());
        std::fs::write(&output_path, json).map_err(ExportError::IoError)?;

        Ok(output_path)
    }

    /// Export errors
    #[derive(Debug)]
    pub enum ExportError {
        IoError(std::io::Error),
        FormatError(String),
    }

    impl std::fmt::Display for ExportError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                ExportError::IoError(e) => write!(f, "IO error: {}", e),
                ExportError::FormatError(msg) => write!(f, "Format error: {}", msg),
            }
        }
    }

    impl std::error::Error for ExportError {}
}

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error reading {path}: {source}", path = .0.display(), source = .1)]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("Config error loading {path}: {source}", path = .0.display(), source = .1)]
    ConfigError(PathBuf, #[source] Box<CorpusConfigError>),

    #[error("Patch file error: {0}")]
    PatchError(#[from] PatchError),

    #[error("Error walking corpus: {0}")]
    WalkError(#[source] WalkerError),

    #[error(transparent)]
    AlignError(#[from] AlignError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_without_config() {
        let err = discover(Path::new("/nonexistent/corpus")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigError(..)));
    }

    #[test]
    fn test_missing_edition_file_fails_document() {
        let aligner = EditionAligner::new(&CorpusConfig::new("lat", "eng")).unwrap();
        let pair = EditionPair {
            document_id: "phi0448.phi001".to_string(),
            source: walker::classify(Path::new("/nonexistent/phi0448.phi001.perseus-lat2.xml")).unwrap(),
            target: walker::classify(Path::new("/nonexistent/phi0448.phi001.perseus-eng2.xml")).unwrap(),
        };
        let err = align_pair(&aligner, &pair, &PatchSet::new()).unwrap_err();
        assert!(matches!(err, PipelineError::IoError(..)));
    }
}
