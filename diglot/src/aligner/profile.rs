//! Compiled edition profiles
//!
//! Turns the textual marker and passage rules of a configuration into path
//! patterns for the parser, and matched elements into marker events.

use super::error::AlignError;
use crate::corpus_config::{EditionProfile, HeaderConfig, MarkerRule};
use crate::markup::{ParsedNode, PathPattern};
use std::collections::HashMap;

pub(crate) fn compile(pattern: &str) -> Result<PathPattern, AlignError> {
    PathPattern::new(pattern).map_err(|source| AlignError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Header field patterns
#[derive(Debug, Clone)]
pub(crate) struct HeaderPatterns {
    pub title: PathPattern,
    pub author: Option<PathPattern>,
    pub boundary: PathPattern,
}

impl HeaderPatterns {
    pub fn new(config: &HeaderConfig) -> Result<Self, AlignError> {
        Ok(Self {
            title: compile(&config.title)?,
            author: config.author.as_deref().map(compile).transpose()?,
            boundary: compile(&config.boundary)?,
        })
    }
}

/// What a matched destination element stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Destination<'p> {
    Marker(&'p MarkerRule),
    Passage,
}

/// Edition profile with its patterns compiled
///
/// Destination indices `0..markers.len()` are marker rules, the rest are passages,
/// so an element matching both a marker rule and a passage pattern is a marker.
#[derive(Debug, Clone)]
pub(crate) struct CompiledProfile {
    markers: Vec<(PathPattern, MarkerRule)>,
    passages: Vec<PathPattern>,
    hierarchy: Vec<String>,
}

impl CompiledProfile {
    pub fn new(profile: &EditionProfile) -> Result<Self, AlignError> {
        let markers = profile
            .markers
            .iter()
            .map(|rule| Ok((compile(&rule.pattern)?, rule.clone())))
            .collect::<Result<Vec<_>, AlignError>>()?;
        let passages = profile
            .passages
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            markers,
            passages,
            hierarchy: profile.hierarchy.clone(),
        })
    }

    /// Patterns handed to the parser, markers first
    pub fn destinations(&self) -> Vec<PathPattern> {
        self.markers
            .iter()
            .map(|(pattern, _)| pattern.clone())
            .chain(self.passages.iter().cloned())
            .collect()
    }

    pub fn destination(&self, index: usize) -> Destination<'_> {
        match self.markers.get(index) {
            Some((_, rule)) => Destination::Marker(rule),
            None => Destination::Passage,
        }
    }

    /// Marker types ranked below `marker_type` in the hierarchy
    pub fn subordinates(&self, marker_type: &str) -> &[String] {
        match self.hierarchy.iter().position(|t| t == marker_type) {
            Some(rank) => &self.hierarchy[rank + 1..],
            None => &[],
        }
    }
}

/// Running per-type counters for rules with `counter = true`
#[derive(Debug, Default)]
pub(crate) struct MarkerCounters {
    counts: HashMap<String, usize>,
}

impl MarkerCounters {
    pub fn reset(&mut self, marker_type: &str) {
        self.counts.remove(marker_type);
    }

    fn next(&mut self, marker_type: &str) -> usize {
        let count = self.counts.entry(marker_type.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

/// The `(type, value)` marker a matched element stands for, if any
///
/// Elements without a usable type, with a type outside the rule's accepted
/// list, or without a value (and no counter) are not markers.
pub(crate) fn marker_for(
    rule: &MarkerRule,
    node: &ParsedNode,
    counters: &mut MarkerCounters,
) -> Option<(String, String)> {
    let marker_type = match (&rule.marker_type, &rule.type_attribute) {
        (Some(fixed), _) => fixed.clone(),
        (None, Some(attribute)) => node.attribute(attribute)?.trim().to_string(),
        (None, None) => return None,
    };
    if marker_type.is_empty() {
        return None;
    }
    if !rule.types.is_empty() && !rule.types.contains(&marker_type) {
        log::trace!("ignoring {} marker at line {}", marker_type, node.line);
        return None;
    }

    let counted = rule.counter.then(|| counters.next(&marker_type));
    let value = match node.attribute(&rule.value_attribute) {
        Some(value) => value.trim().to_string(),
        None => counted?.to_string(),
    };

    Some((marker_type, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn node(attributes: &[(&str, &str)]) -> ParsedNode {
        ParsedNode {
            path: "TEI.text.body.div".to_string(),
            name: "div".to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            text: None,
            destination: Some(0),
            line: 1,
        }
    }

    fn rule() -> MarkerRule {
        MarkerRule {
            pattern: r"TEI\.text\.body(\.div)+".to_string(),
            marker_type: None,
            type_attribute: Some("subtype".to_string()),
            value_attribute: "n".to_string(),
            types: vec!["book".to_string(), "chapter".to_string()],
            counter: false,
            resets_subordinates: true,
        }
    }

    #[test]
    fn test_marker_from_attributes() {
        let mut counters = MarkerCounters::default();
        assert_eq!(
            marker_for(&rule(), &node(&[("subtype", "chapter"), ("n", "4")]), &mut counters),
            Some(("chapter".to_string(), "4".to_string()))
        );
        assert_eq!(
            marker_for(&rule(), &node(&[("subtype", "edition"), ("n", "1")]), &mut counters),
            None
        );
        assert_eq!(marker_for(&rule(), &node(&[("subtype", "book")]), &mut counters), None);
    }

    #[test]
    fn test_counter_numbers_occurrences() {
        let speech = MarkerRule {
            marker_type: Some("speech".to_string()),
            type_attribute: None,
            types: Vec::new(),
            counter: true,
            ..rule()
        };
        let mut counters = MarkerCounters::default();
        let values: Vec<_> = (0..3)
            .filter_map(|_| marker_for(&speech, &node(&[]), &mut counters))
            .map(|(_, value)| value)
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);

        counters.reset("speech");
        assert_eq!(
            marker_for(&speech, &node(&[]), &mut counters).map(|(_, v)| v),
            Some("1".to_string())
        );
    }

    #[test]
    fn test_destinations_and_hierarchy() {
        let profile = CompiledProfile::new(&EditionProfile::default()).unwrap();
        assert_eq!(profile.destinations().len(), 4);
        assert!(matches!(profile.destination(0), Destination::Marker(_)));
        assert_eq!(profile.destination(3), Destination::Passage);
        assert_eq!(profile.subordinates("book").to_vec(), vec!["chapter", "section"]);
        assert!(profile.subordinates("section").is_empty());
        assert!(profile.subordinates("speech").is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let profile = EditionProfile {
            passages: vec!["(unclosed".to_string()],
            hierarchy: Vec::new(),
            markers: Vec::new(),
        };
        assert!(matches!(
            CompiledProfile::new(&profile),
            Err(AlignError::Pattern { .. })
        ));
    }
}
