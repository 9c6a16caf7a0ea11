//! Fixed tag vocabularies used while walking edition markup
//!
//! Tags are compared by local name, so `tei:note` and `note` are the same tag.

/// Elements skipped wholesale (annotation, bibliography, deletions)
pub const IGNORED_TAGS: &[&str] = &["note", "bibl", "del"];

/// Elements that insert a line-break marker into extracted text
pub const LINE_BREAK_TAGS: &[&str] = &["lb"];

/// Elements that open a spelling-variant construct
pub const VARIANT_WRAPPERS: &[&str] = &["choice", "abbr"];

/// Variant readings that are kept (expansion, correction, original spelling)
pub const VARIANT_INNER: &[&str] = &["expan", "corr", "orig", "ex"];

/// Other tags allowed inside a variant construct; their text is discarded
pub const VARIANT_PARTICIPANTS: &[&str] = &["choice", "abbr", "sic", "reg", "am"];

/// Named character entities resolved besides the XML predefined ones
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("lt", "<"),
    ("gt", ">"),
    ("amp", "&"),
    ("apos", "'"),
    ("quot", "\""),
    ("nbsp", "\u{a0}"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("hellip", "\u{2026}"),
    ("middot", "\u{b7}"),
    ("sect", "\u{a7}"),
    ("para", "\u{b6}"),
    ("dagger", "\u{2020}"),
    ("aelig", "\u{e6}"),
    ("AElig", "\u{c6}"),
    ("oelig", "\u{153}"),
    ("OElig", "\u{152}"),
];

/// Strip a namespace prefix from an element name
pub fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn contains(set: &[&str], name: &str) -> bool {
    set.contains(&local_name(name))
}

pub fn is_ignored(name: &str) -> bool {
    contains(IGNORED_TAGS, name)
}

pub fn is_line_break(name: &str) -> bool {
    contains(LINE_BREAK_TAGS, name)
}

pub fn is_variant_wrapper(name: &str) -> bool {
    contains(VARIANT_WRAPPERS, name)
}

pub fn is_variant_inner(name: &str) -> bool {
    contains(VARIANT_INNER, name)
}

pub fn is_variant_participant(name: &str) -> bool {
    contains(VARIANT_PARTICIPANTS, name)
}

/// Resolve a named entity reference (without `&` and `;`)
pub fn resolve_entity(name: &str) -> Option<&'static str> {
    NAMED_ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|(_, value)| *value)
}
