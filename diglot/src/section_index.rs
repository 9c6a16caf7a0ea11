//! Section-keyed alignment index
//!
//! The index is fed a stream of "enter marker" and "append content" events for
//! one edition and afterwards answers, per canonical [`SectionKey`], which run of
//! content elements belongs to that section.
//!
//! Content lives in a single append-only chain (document reading order). A key
//! only stores the half-open range of chain positions it owns; since a key is
//! active exactly once per document, that range is always contiguous.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

mod error;
mod key;

pub use error::IndexError;
pub use key::{validate_marker, SectionKey, PAIR_SEPARATOR, VALUE_SEPARATOR};

/// One unit of extracted text with its place in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentElement {
    /// Position in the chain (reading order)
    pub position: usize,
    /// Key that was active when the element was appended
    pub key: Option<SectionKey>,
    /// Normalized text
    pub text: String,
}

/// Write-once-per-document alignment structure
#[derive(Debug, Default)]
pub struct SectionIndex {
    /// All content in reading order
    chain: Vec<ContentElement>,

    /// Active markers in first-entered order (type, value)
    active: Vec<(String, String)>,

    /// Key computed at the most recent marker entry
    current: Option<SectionKey>,

    /// Every key entered so far
    entered: HashSet<SectionKey>,

    /// Chain range owned by each key that received content
    spans: HashMap<SectionKey, Range<usize>>,

    /// Raw marker map captured when each key was entered
    labels: HashMap<SectionKey, Vec<(String, String)>>,

    /// Keys that received content, in first-seen order
    order: Vec<SectionKey>,
}

impl SectionIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a structural marker and make the resulting key current
    ///
    /// # Parameters
    /// * `marker_type` - Marker type such as `chapter`
    /// * `value` - Marker value such as `4`
    ///
    /// # Returns
    /// * `Ok(SectionKey)` - The canonical key of all markers now active
    /// * `Err(IndexError)` - Invalid marker text, or the key was already entered in this document
    pub fn enter_marker(&mut self, marker_type: &str, value: &str) -> Result<SectionKey, IndexError> {
        validate_marker(marker_type, value)?;

        match self.active.iter_mut().find(|(t, _)| t == marker_type) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.active.push((marker_type.to_string(), value.to_string())),
        }

        let key = SectionKey::from_markers(self.active.iter().map(|(t, v)| (t.as_str(), v.as_str())));
        if !self.entered.insert(key.clone()) {
            return Err(IndexError::DuplicateKey(key));
        }

        log::debug!("entered section {}", key);
        self.labels.insert(key.clone(), self.active.clone());
        self.current = Some(key.clone());
        Ok(key)
    }

    /// Drop a marker type from the active set without entering a new key
    ///
    /// Returns true if the marker was active.
    pub fn clear_marker(&mut self, marker_type: &str) -> bool {
        let before = self.active.len();
        self.active.retain(|(t, _)| t != marker_type);
        self.active.len() != before
    }

    /// Append one content element under the current key
    ///
    /// Content appended before any marker is kept in the chain but belongs to no key.
    ///
    /// # Returns
    /// * Chain position of the new element
    pub fn append(&mut self, text: impl Into<String>) -> usize {
        let position = self.chain.len();
        let key = self.current.clone();

        if let Some(key) = &key {
            match self.spans.get_mut(key) {
                Some(span) => span.end = position + 1,
                None => {
                    self.order.push(key.clone());
                    self.spans.insert(key.clone(), position..position + 1);
                }
            }
        } else {
            log::debug!("content at position {} precedes every marker", position);
        }

        self.chain.push(ContentElement {
            position,
            key,
            text: text.into(),
        });
        position
    }

    /// First content element appended under `key`
    pub fn first_of(&self, key: &SectionKey) -> Option<&ContentElement> {
        self.spans.get(key).map(|span| &self.chain[span.start])
    }

    /// Last content element appended under `key`
    pub fn last_of(&self, key: &SectionKey) -> Option<&ContentElement> {
        self.spans.get(key).map(|span| &self.chain[span.end - 1])
    }

    /// All content elements of `key`, first through last inclusive
    pub fn content(&self, key: &SectionKey) -> &[ContentElement] {
        match self.spans.get(key) {
            Some(span) => &self.chain[span.clone()],
            None => &[],
        }
    }

    /// Texts of all content elements of `key`
    pub fn texts(&self, key: &SectionKey) -> Vec<String> {
        self.content(key).iter().map(|e| e.text.clone()).collect()
    }

    /// The element following `element` in reading order
    pub fn successor(&self, element: &ContentElement) -> Option<&ContentElement> {
        self.chain.get(element.position + 1)
    }

    /// Keys that received content, in first-seen order
    pub fn keys_in_order(&self) -> &[SectionKey] {
        &self.order
    }

    /// Raw marker map (first-entered order) active when `key` was entered
    pub fn labels(&self, key: &SectionKey) -> Option<&[(String, String)]> {
        self.labels.get(key).map(Vec::as_slice)
    }

    /// Whether `key` owns any content
    pub fn contains(&self, key: &SectionKey) -> bool {
        self.spans.contains_key(key)
    }

    /// Whether `key` was ever entered, with or without content
    pub fn was_entered(&self, key: &SectionKey) -> bool {
        self.entered.contains(key)
    }

    /// Key computed at the most recent marker entry
    pub fn current_key(&self) -> Option<&SectionKey> {
        self.current.as_ref()
    }

    /// Number of content elements in the chain
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Whether no content has been appended
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }
}
