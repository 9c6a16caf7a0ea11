//! Merging two section indexes into the aligned passage list
//!
//! The source edition's key order is the spine. Add patches splice new
//! passages between two adjacent spine keys, remove patches suppress a passage
//! (source language) or its translation (target language). Anchor problems drop
//! only the offending patch.

use super::error::AlignmentWarning;
use crate::passage::AlignedPassage;
use crate::patch::{ChangeKind, PatchSet, StructuralPatch};
use crate::section_index::{SectionIndex, SectionKey};
use std::collections::HashSet;

/// One edition of the pair being merged
pub(crate) struct Side<'a> {
    pub language: &'a str,
    pub index: &'a SectionIndex,
}

/// Build the final passage order for one document
///
/// # Parameters
/// * `document` - Document identifier the patches are looked up by
/// * `source` - Source edition (spine)
/// * `target` - Target edition
/// * `patches` - Patch set of the run
///
/// # Returns
/// * Passages in presentation order and the diagnostics raised while merging
pub(crate) fn merge(
    document: &str,
    source: Side<'_>,
    target: Side<'_>,
    patches: &PatchSet,
) -> (Vec<AlignedPassage>, Vec<AlignmentWarning>) {
    let mut spine: Vec<AlignedPassage> = source
        .index
        .keys_in_order()
        .iter()
        .map(|key| AlignedPassage {
            key: key.clone(),
            labels: source.index.labels(key).map(<[_]>::to_vec).unwrap_or_default(),
            source: source.index.texts(key),
            target: target.index.texts(key),
            patched: false,
        })
        .collect();
    let mut warnings = Vec::new();

    for side in [&source, &target] {
        for patch in patches.find(side.language, document, Some(ChangeKind::Add)) {
            let other = if side.language == source.language {
                &target
            } else {
                &source
            };
            if let Err(warning) = splice(&mut spine, patch, side, other, source.language) {
                warnings.push(warning);
            }
        }
    }

    let spine_keys: HashSet<&SectionKey> = spine.iter().map(|p| &p.key).collect();
    warnings.extend(
        target
            .index
            .keys_in_order()
            .iter()
            .filter(|key| !spine_keys.contains(key))
            .map(|key| AlignmentWarning::UnmatchedTarget { key: key.clone() }),
    );

    for side in [&source, &target] {
        for patch in patches.find(side.language, document, Some(ChangeKind::Remove)) {
            let Some(position) = position_of(&spine, &patch.key) else {
                warnings.push(AlignmentWarning::RemoveMissing {
                    key: patch.key.clone(),
                    language: patch.language.clone(),
                    line: patch.line,
                });
                continue;
            };
            if side.language == source.language {
                log::debug!("{}: removing passage {}", document, patch.key);
                spine.remove(position);
            } else {
                log::debug!("{}: removing {} text of {}", document, side.language, patch.key);
                spine[position].target.clear();
                spine[position].patched = true;
            }
        }
    }

    for warning in &warnings {
        log::warn!("{}: {}", document, warning);
    }

    (spine, warnings)
}

fn position_of(spine: &[AlignedPassage], key: &SectionKey) -> Option<usize> {
    spine.iter().position(|p| &p.key == key)
}

/// Insert an added passage between its anchors
fn splice(
    spine: &mut Vec<AlignedPassage>,
    patch: &StructuralPatch,
    side: &Side<'_>,
    other: &Side<'_>,
    source_language: &str,
) -> Result<(), AlignmentWarning> {
    if position_of(spine, &patch.key).is_some() {
        return Err(AlignmentWarning::DuplicateAdd {
            key: patch.key.clone(),
            line: patch.line,
        });
    }

    let current: &[AlignedPassage] = spine;
    let anchor = |anchor: &SectionKey| {
        position_of(current, anchor).ok_or_else(|| AlignmentWarning::AnchorMissing {
            key: patch.key.clone(),
            anchor: anchor.clone(),
            line: patch.line,
        })
    };

    let at = match (&patch.after, &patch.before) {
        (Some(after), Some(before)) => {
            let (a, b) = (anchor(after)?, anchor(before)?);
            if b != a + 1 {
                return Err(AlignmentWarning::AnchorNotAdjacent {
                    key: patch.key.clone(),
                    after: after.clone(),
                    before: before.clone(),
                    line: patch.line,
                });
            }
            b
        }
        (Some(after), None) => anchor(after)? + 1,
        (None, Some(before)) => anchor(before)?,
        (None, None) => {
            return Err(AlignmentWarning::NoAnchor {
                key: patch.key.clone(),
                line: patch.line,
            })
        }
    };

    let added = vec![patch.content.clone().unwrap_or_default()];
    let natural = other.index.texts(&patch.key);
    let (source, target) = if side.language == source_language {
        (added, natural)
    } else {
        (natural, added)
    };

    log::debug!("adding {} ({}) at spine position {}", patch.key, side.language, at);
    spine.insert(
        at,
        AlignedPassage {
            key: patch.key.clone(),
            labels: patch
                .key
                .markers()
                .map(|(t, v)| (t.to_string(), v.to_string()))
                .collect(),
            source,
            target,
            patched: true,
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One paragraph per chapter, chapters numbered as given
    fn edition(chapters: &[(&str, &str)]) -> SectionIndex {
        let mut index = SectionIndex::new();
        for (n, text) in chapters {
            index.enter_marker("chapter", n).unwrap();
            index.append(*text);
        }
        index
    }

    fn keys(passages: &[AlignedPassage]) -> Vec<&str> {
        passages.iter().map(|p| p.key.as_str()).collect()
    }

    fn run(
        source: &SectionIndex,
        target: &SectionIndex,
        patches: &str,
    ) -> (Vec<AlignedPassage>, Vec<AlignmentWarning>) {
        let patches = PatchSet::parse(patches).unwrap();
        merge(
            "d.w",
            Side {
                language: "lat",
                index: source,
            },
            Side {
                language: "eng",
                index: target,
            },
            &patches,
        )
    }

    #[test]
    fn test_spine_follows_source_order() {
        let source = edition(&[("1", "unus"), ("2", "duo"), ("3", "tres")]);
        let target = edition(&[("1", "one"), ("3", "three")]);
        let (passages, warnings) = run(&source, &target, "");

        assert_eq!(keys(&passages), vec!["chapter=1", "chapter=2", "chapter=3"]);
        assert_eq!(passages[0].target, vec!["one"]);
        assert!(passages[1].target.is_empty());
        assert_eq!(passages[2].source, vec!["tres"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_add_between_adjacent_anchors() {
        let source = edition(&[("1", "unus"), ("3", "tres")]);
        let target = edition(&[("1", "one"), ("3", "three")]);
        let patches = "\
document: d.w
language: eng
key: chapter=2
after: chapter=1
before: chapter=3
content: two
";
        let (passages, warnings) = run(&source, &target, patches);

        assert_eq!(keys(&passages), vec!["chapter=1", "chapter=2", "chapter=3"]);
        assert_eq!(passages[1].target, vec!["two"]);
        assert!(passages[1].source.is_empty());
        assert!(passages[1].patched);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_add_with_non_adjacent_anchors_is_dropped() {
        let source = edition(&[("1", "unus"), ("2", "duo"), ("3", "tres")]);
        let target = edition(&[("1", "one"), ("2", "two"), ("3", "three")]);
        let patches = "\
document: d.w
language: eng
key: chapter=2a
after: chapter=1
before: chapter=3
content: inserted
";
        let (passages, warnings) = run(&source, &target, patches);

        assert_eq!(keys(&passages), vec!["chapter=1", "chapter=2", "chapter=3"]);
        assert!(matches!(
            warnings.as_slice(),
            [AlignmentWarning::AnchorNotAdjacent { line: 1, .. }]
        ));
    }

    #[test]
    fn test_add_anchor_problems() {
        let source = edition(&[("1", "unus"), ("2", "duo")]);
        let target = edition(&[("1", "one")]);
        let patches = "\
document: d.w
language: eng
key: chapter=9
after: chapter=8
content: missing anchor

document: d.w
language: eng
key: chapter=2
after: chapter=1
content: already there

document: d.w
language: eng
key: chapter=7
content: nowhere
";
        let (passages, warnings) = run(&source, &target, patches);

        assert_eq!(passages.len(), 2);
        assert!(matches!(warnings[0], AlignmentWarning::AnchorMissing { .. }));
        assert!(matches!(warnings[1], AlignmentWarning::DuplicateAdd { line: 7, .. }));
        assert!(matches!(warnings[2], AlignmentWarning::NoAnchor { line: 13, .. }));
    }

    #[test]
    fn test_unmatched_target_is_warned_and_excluded() {
        let source = edition(&[("1", "unus")]);
        let target = edition(&[("0", "preface"), ("1", "one")]);
        let (passages, warnings) = run(&source, &target, "");

        assert_eq!(keys(&passages), vec!["chapter=1"]);
        assert_eq!(
            warnings,
            vec![AlignmentWarning::UnmatchedTarget {
                key: SectionKey::parse("chapter=0").unwrap()
            }]
        );
    }

    #[test]
    fn test_source_add_explains_target_extra() {
        let source = edition(&[("1", "unus")]);
        let target = edition(&[("0", "preface"), ("1", "one")]);
        let patches = "\
document: d.w
language: lat
key: chapter=0
before: chapter=1
content: praefatio
";
        let (passages, warnings) = run(&source, &target, patches);

        assert_eq!(keys(&passages), vec!["chapter=0", "chapter=1"]);
        assert_eq!(passages[0].source, vec!["praefatio"]);
        assert_eq!(passages[0].target, vec!["preface"]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_remove_by_language() {
        let source = edition(&[("1", "unus"), ("2", "duo"), ("3", "tres")]);
        let target = edition(&[("1", "one"), ("2", "two"), ("3", "three")]);
        let patches = "\
document: d.w
language: lat
key: chapter=2
action: remove

document: d.w
language: eng
key: chapter=3
action: remove

document: d.w
language: eng
key: chapter=5
action: remove
";
        let (passages, warnings) = run(&source, &target, patches);

        assert_eq!(keys(&passages), vec!["chapter=1", "chapter=3"]);
        assert_eq!(passages[1].source, vec!["tres"]);
        assert!(passages[1].target.is_empty());
        assert!(passages[1].patched);
        assert!(matches!(
            warnings.as_slice(),
            [AlignmentWarning::RemoveMissing { line: 11, .. }]
        ));
    }
}
