//! Corpus configuration from diglot.toml

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the configuration file at the corpus root
pub const CONFIG_FILE_NAME: &str = "diglot.toml";

/// Main corpus configuration from diglot.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Language tag of the authoritative (source) edition, e.g. "lat"
    pub source_language: String,

    /// Language tag of the translated (target) edition, e.g. "eng"
    pub target_language: String,

    /// Optional patch description file, relative to the corpus root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_file: Option<String>,

    /// Paths of the header fields read from every edition
    #[serde(default)]
    pub header: HeaderConfig,

    /// Edition profile used when no language-specific profile exists
    #[serde(default)]
    pub profile: EditionProfile,

    /// Language-specific edition profiles
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, EditionProfile>,
}

/// Header fields, as element path patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    /// Title element (mandatory in every edition)
    pub title: String,

    /// Author element (optional)
    ///
    /// Searched for after the title, so an author placed before the title in
    /// the header is not found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Element the header fields must precede
    pub boundary: String,
}

/// How structural markers and passages are recognized in one kind of edition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditionProfile {
    /// Patterns of elements whose text becomes one content element each
    pub passages: Vec<String>,

    /// Marker types from outermost to innermost
    ///
    /// A marker from a rule with `resets_subordinates` clears the types after its own.
    #[serde(default)]
    pub hierarchy: Vec<String>,

    /// Rules turning matched elements into structural markers
    #[serde(default)]
    pub markers: Vec<MarkerRule>,
}

/// Turns a matched element into a `(type, value)` marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerRule {
    /// Element path pattern
    pub pattern: String,

    /// Fixed marker type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_type: Option<String>,

    /// Attribute holding the marker type (used when `marker_type` is unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_attribute: Option<String>,

    /// Attribute holding the marker value
    #[serde(default = "default_value_attribute")]
    pub value_attribute: String,

    /// Accepted marker types; empty accepts all
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,

    /// Number occurrences when the value attribute is absent
    #[serde(default)]
    pub counter: bool,

    /// Clear the markers ranked below this one in the hierarchy on entry
    ///
    /// Set for container elements (nested divs). Milestones leave it unset, so
    /// a new chapter milestone keeps the active section.
    #[serde(default)]
    pub resets_subordinates: bool,
}

fn default_value_attribute() -> String {
    "n".to_string()
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            title: r"TEI\.teiHeader\.fileDesc\.titleStmt\.title".to_string(),
            author: Some(r"TEI\.teiHeader\.fileDesc\.titleStmt\.author".to_string()),
            boundary: r"TEI\.text".to_string(),
        }
    }
}

impl Default for EditionProfile {
    /// Profile for Perseus-style TEI editions (textpart divs, milestones, speeches)
    fn default() -> Self {
        let levels = vec!["book".to_string(), "chapter".to_string(), "section".to_string()];
        Self {
            passages: vec![r"TEI\.text\.body(\.div)*(\.sp)?(\.lg)?\.(p|l)".to_string()],
            hierarchy: levels.clone(),
            markers: vec![
                MarkerRule {
                    pattern: r"TEI\.text\.body(\.div)+".to_string(),
                    marker_type: None,
                    type_attribute: Some("subtype".to_string()),
                    value_attribute: default_value_attribute(),
                    types: levels.clone(),
                    counter: false,
                    resets_subordinates: true,
                },
                MarkerRule {
                    pattern: r"TEI\.text\.body(\.div)*(\.sp)?\.milestone".to_string(),
                    marker_type: None,
                    type_attribute: Some("unit".to_string()),
                    value_attribute: default_value_attribute(),
                    types: levels,
                    counter: false,
                    resets_subordinates: false,
                },
                MarkerRule {
                    pattern: r"TEI\.text\.body(\.div)*\.sp".to_string(),
                    marker_type: Some("speech".to_string()),
                    type_attribute: None,
                    value_attribute: default_value_attribute(),
                    types: Vec::new(),
                    counter: true,
                    resets_subordinates: false,
                },
            ],
        }
    }
}

impl CorpusConfig {
    /// Default configuration for a language pair
    pub fn new(source_language: &str, target_language: &str) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            patch_file: None,
            header: HeaderConfig::default(),
            profile: EditionProfile::default(),
            profiles: BTreeMap::new(),
        }
    }

    /// Load configuration from a diglot.toml file
    ///
    /// # Parameters
    /// * `path` - Path to the diglot.toml configuration file
    ///
    /// # Returns
    /// * `Ok(CorpusConfig)` - Successfully loaded configuration
    /// * `Err(CorpusConfigError)` - Error reading or parsing the configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusConfigError> {
        let content = fs::read_to_string(&path).map_err(CorpusConfigError::IoError)?;

        let config: CorpusConfig =
            toml::from_str(&content).map_err(CorpusConfigError::ParseError)?;

        Ok(config)
    }

    /// Save configuration to a diglot.toml file
    ///
    /// # Parameters
    /// * `path` - Path where the diglot.toml file will be written
    ///
    /// # Returns
    /// * `Ok(())` - Successfully saved configuration
    /// * `Err(CorpusConfigError)` - Error serializing or writing the configuration file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CorpusConfigError> {
        let content = toml::to_string_pretty(self).map_err(CorpusConfigError::SerializeError)?;

        fs::write(&path, content).map_err(CorpusConfigError::IoError)?;

        Ok(())
    }

    /// Edition profile for a language
    pub fn profile_for(&self, language: &str) -> &EditionProfile {
        self.profiles.get(language).unwrap_or(&self.profile)
    }

    /// Absolute path of the patch file, if one is configured
    pub fn patch_path(&self, root: &Path) -> Option<PathBuf> {
        self.patch_file.as_ref().map(|file| root.join(file))
    }
}

/// Errors that can occur when loading or saving corpus configuration
#[derive(Debug)]
#[allow(clippy::enum_variant_names)]
pub enum CorpusConfigError {
    /// IO error when reading or writing file
    IoError(std::io::Error),

    /// Error parsing TOML
    ParseError(toml::de::Error),

    /// Error serializing to TOML
    SerializeError(toml::ser::Error),
}

impl std::fmt::Display for CorpusConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusConfigError::IoError(e) => write!(f, "IO error: {}", e),
            CorpusConfigError::ParseError(e) => write!(f, "TOML parse error: {}", e),
            CorpusConfigError::SerializeError(e) => write!(f, "TOML serialize error: {}", e),
        }
    }
}

impl std::error::Error for CorpusConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_config_roundtrip() {
        let mut config = CorpusConfig::new("lat", "eng");
        config.patch_file = Some("patches.txt".to_string());
        config.profiles.insert(
            "eng".to_string(),
            EditionProfile {
                passages: vec![r"TEI\.text\.body(\.div)*\.p".to_string()],
                hierarchy: vec!["book".to_string(), "chapter".to_string()],
                markers: Vec::new(),
            },
        );

        // Serialize to TOML
        let toml_str = toml::to_string_pretty(&config).unwrap();
        println!("Generated TOML:\n{}", toml_str);

        // Deserialize back
        let parsed: CorpusConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.source_language, "lat");
        assert_eq!(parsed.target_language, "eng");
        assert_eq!(parsed.patch_file.as_deref(), Some("patches.txt"));
        assert_eq!(parsed.header, HeaderConfig::default());
        assert_eq!(parsed.profile, EditionProfile::default());
        assert_eq!(parsed.profile_for("eng").hierarchy.len(), 2);
        assert_eq!(parsed.profile_for("lat"), &EditionProfile::default());
    }

    #[test]
    fn test_parse_example_toml() {
        let toml_content = r#"
source_language = "grc"
target_language = "eng"

[header]
title = 'TEI\.teiHeader\.fileDesc\.titleStmt\.title'
boundary = 'TEI\.text'

[profile]
passages = ['TEI\.text\.body\.div\.p']
hierarchy = ["book", "chapter"]

[[profile.markers]]
pattern = 'TEI\.text\.body\.div'
type_attribute = "subtype"
resets_subordinates = true

[[profile.markers]]
pattern = 'TEI\.text\.body\.div\.sp'
marker_type = "speech"
counter = true
"#;

        let config: CorpusConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(config.source_language, "grc");
        assert!(config.header.author.is_none());
        assert_eq!(config.profile.markers.len(), 2);
        assert_eq!(config.profile.markers[0].value_attribute, "n");
        assert!(config.profile.markers[0].resets_subordinates);
        assert!(config.profile.markers[1].counter);
        assert!(!config.profile.markers[1].resets_subordinates);
        assert!(config.patch_path(Path::new("/corpus")).is_none());
    }
}
