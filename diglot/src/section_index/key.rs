//! Canonical section keys
//!
//! A section key names a structural position by the full set of markers that are
//! active at that point, independent of the order in which they were entered.

use super::error::IndexError;
use itertools::Itertools;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Separator between `type=value` pairs
pub const PAIR_SEPARATOR: char = '|';

/// Separator between a marker type and its value
pub const VALUE_SEPARATOR: char = '=';

/// Canonical, order-independent identifier of a structural position
///
/// Pairs are sorted by marker type and rendered as `type=value` joined with `|`,
/// e.g. `book=1|chapter=4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct SectionKey(String);

impl SectionKey {
    /// Build the canonical key for a set of active markers
    ///
    /// The markers are assumed to be validated already (see [`validate_marker`]).
    pub fn from_markers<'a, I>(markers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let joined = markers
            .into_iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(marker_type, value)| format!("{marker_type}{VALUE_SEPARATOR}{value}"))
            .join(&PAIR_SEPARATOR.to_string());
        Self(joined)
    }

    /// Parse a key written by hand (patch files, CLI) and canonicalize it
    ///
    /// # Parameters
    /// * `text` - Key text such as `chapter=4|book=1`
    ///
    /// # Returns
    /// * `Ok(SectionKey)` - Canonical key (`book=1|chapter=4`)
    /// * `Err(IndexError)` - Empty key, a pair without `=`, an invalid marker, or a repeated type
    pub fn parse(text: &str) -> Result<Self, IndexError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(IndexError::MalformedKey(text.to_string()));
        }

        let mut pairs = Vec::new();
        let mut seen = BTreeSet::new();
        for pair in text.split(PAIR_SEPARATOR) {
            let (marker_type, value) = pair
                .split_once(VALUE_SEPARATOR)
                .ok_or_else(|| IndexError::MalformedKey(text.to_string()))?;
            let (marker_type, value) = (marker_type.trim(), value.trim());
            validate_marker(marker_type, value)?;
            if !seen.insert(marker_type) {
                return Err(IndexError::MalformedKey(text.to_string()));
            }
            pairs.push((marker_type, value));
        }

        Ok(Self::from_markers(pairs))
    }

    /// The canonical text of the key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the `(type, value)` pairs in canonical order
    pub fn markers(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .split(PAIR_SEPARATOR)
            .filter_map(|pair| pair.split_once(VALUE_SEPARATOR))
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Check that a marker type and value can take part in a canonical key
pub fn validate_marker(marker_type: &str, value: &str) -> Result<(), IndexError> {
    if marker_type.is_empty() {
        return Err(IndexError::EmptyMarkerType);
    }
    for (field, text) in [("type", marker_type), ("value", value)] {
        if text.contains([VALUE_SEPARATOR, PAIR_SEPARATOR]) {
            return Err(IndexError::ReservedCharacter {
                field,
                text: text.to_string(),
            });
        }
    }
    Ok(())
}
