//! Directory walker for discovering edition files in a corpus

use itertools::Itertools;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Errors that can occur during corpus walking
#[derive(Debug)]
pub enum WalkerError {
    /// IO error
    Io(std::io::Error),
    /// Corpus root does not exist or is not a directory
    NotADirectory(PathBuf),
}

impl From<std::io::Error> for WalkerError {
    fn from(err: std::io::Error) -> Self {
        WalkerError::Io(err)
    }
}

impl std::fmt::Display for WalkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkerError::Io(e) => write!(f, "IO error: {}", e),
            WalkerError::NotADirectory(path) => {
                write!(f, "Corpus root is not a directory: {}", path.display())
            }
        }
    }
}

impl std::error::Error for WalkerError {}

/// One edition file, classified by its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionFile {
    pub path: PathBuf,
    /// `<textgroup>.<work>`, e.g. `phi0448.phi001`
    pub document_id: String,
    /// Edition name, e.g. `perseus`
    pub edition: String,
    /// Language tag, e.g. `lat`
    pub language: String,
    /// Edition version; 0 when the name carries none
    pub version: u32,
}

/// Source and target edition of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditionPair {
    pub document_id: String,
    pub source: EditionFile,
    pub target: EditionFile,
}

/// Result of pairing the editions of a corpus
#[derive(Debug, Default)]
pub struct CorpusListing {
    /// Complete pairs, ordered by document ID
    pub pairs: Vec<EditionPair>,
    /// Document IDs missing their source or target edition
    pub unpaired: Vec<String>,
}

/// Classify an edition file by its name
///
/// Examples:
///   "phi0448.phi001.perseus-lat2.xml" -> ("phi0448.phi001", "perseus", "lat", 2)
///   "tlg0012.tlg001.perseus-eng" -> not an edition file (no `.xml`)
pub fn classify(path: &Path) -> Option<EditionFile> {
    let filename = path.file_name()?.to_str()?;
    let stem = filename.strip_suffix(".xml")?;

    let (name, tag) = stem.rsplit_once('-')?;
    let parts: Vec<&str> = name.splitn(3, '.').collect();
    let [textgroup, work, edition] = parts.as_slice() else {
        return None;
    };
    if [textgroup, work, edition].iter().any(|part| part.is_empty()) {
        return None;
    }

    let split = tag.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(tag.len());
    let (language, version) = tag.split_at(split);
    if language.is_empty() {
        return None;
    }
    let version = match version {
        "" => 0,
        digits => digits.parse().ok()?,
    };

    Some(EditionFile {
        path: path.to_path_buf(),
        document_id: format!("{}.{}", textgroup, work),
        edition: edition.to_string(),
        language: language.to_string(),
        version,
    })
}

/// Walk a corpus directory and classify every edition file
///
/// Files whose names do not follow the edition convention are skipped.
pub fn walk_corpus(root: &Path) -> Result<Vec<EditionFile>, WalkerError> {
    if !root.is_dir() {
        return Err(WalkerError::NotADirectory(root.to_path_buf()));
    }

    let mut editions = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(std::io::Error::other)?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("xml") {
            continue;
        }

        match classify(path) {
            Some(edition) => editions.push(edition),
            None => log::debug!("Skipping {}: not an edition file name", path.display()),
        }
    }

    Ok(editions)
}

/// Pair the newest source and target edition of every document
///
/// # Parameters
/// * `editions` - Classified edition files
/// * `source_language` - Language of the source edition
/// * `target_language` - Language of the target edition
///
/// # Returns
/// * Complete pairs and the IDs of documents lacking a side
pub fn pair_editions(
    editions: Vec<EditionFile>,
    source_language: &str,
    target_language: &str,
) -> CorpusListing {
    let by_document: BTreeMap<String, Vec<EditionFile>> = editions
        .into_iter()
        .filter(|e| e.language == source_language || e.language == target_language)
        .into_group_map_by(|e| e.document_id.clone())
        .into_iter()
        .collect();

    let mut listing = CorpusListing::default();
    for (document_id, files) in by_document {
        let newest = |language: &str| {
            files
                .iter()
                .filter(|e| e.language == language)
                .max_by_key(|e| e.version)
                .cloned()
        };

        match (newest(source_language), newest(target_language)) {
            (Some(source), Some(target)) => listing.pairs.push(EditionPair {
                document_id,
                source,
                target,
            }),
            _ => {
                log::info!("Skipping {}: source or target edition missing", document_id);
                listing.unpaired.push(document_id);
            }
        }
    }

    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edition(name: &str) -> EditionFile {
        classify(Path::new(name)).unwrap()
    }

    #[test]
    fn test_classify() {
        let file = edition("corpus/phi0448.phi001.perseus-lat2.xml");
        assert_eq!(file.document_id, "phi0448.phi001");
        assert_eq!(file.edition, "perseus");
        assert_eq!(file.language, "lat");
        assert_eq!(file.version, 2);

        assert_eq!(edition("tlg0012.tlg001.perseus-grc.xml").version, 0);
        assert_eq!(edition("a.b.first1k-eng10.xml").version, 10);

        assert!(classify(Path::new("README.xml")).is_none());
        assert!(classify(Path::new("phi0448.phi001.perseus-lat2.txt")).is_none());
        assert!(classify(Path::new("phi0448.perseus-lat2.xml")).is_none());
        assert!(classify(Path::new("phi0448.phi001.perseus-2.xml")).is_none());
        assert!(classify(Path::new("phi0448.phi001.perseus-lat2b.xml")).is_none());
    }

    #[test]
    fn test_pair_newest_versions() {
        let editions = vec![
            edition("phi0448.phi001.perseus-lat1.xml"),
            edition("phi0448.phi001.perseus-lat2.xml"),
            edition("phi0448.phi001.perseus-eng1.xml"),
            edition("phi0448.phi001.perseus-ger1.xml"),
            edition("phi0474.phi013.perseus-lat2.xml"),
        ];

        let listing = pair_editions(editions, "lat", "eng");

        assert_eq!(listing.pairs.len(), 1);
        let pair = &listing.pairs[0];
        assert_eq!(pair.document_id, "phi0448.phi001");
        assert_eq!(pair.source.version, 2);
        assert_eq!(pair.target.language, "eng");
        assert_eq!(listing.unpaired, vec!["phi0474.phi013".to_string()]);
    }

    #[test]
    fn test_walk_missing_root() {
        assert!(matches!(
            walk_corpus(Path::new("/nonexistent/corpus")),
            Err(WalkerError::NotADirectory(_))
        ));
    }
}
