//! Single-pass structural markup parser
//!
//! Walks one edition once, keeps the current element path, resolves inline
//! spelling-variant constructs and stops at elements whose dot-joined path
//! matches a caller-supplied pattern.

use super::cursor::{Cursor, OpenTag, Token};
use super::error::MarkupError;
use super::text::TextCollector;
use super::vocabulary;
use super::PATH_DELIMITER;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Pattern matched against the whole dot-joined element path
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern; it is anchored at both ends
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// The most recently matched element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedNode {
    /// Dot-joined path from the root, including the element itself
    pub path: String,
    /// Element name
    pub name: String,
    /// Attributes, last one wins on duplicates
    pub attributes: BTreeMap<String, String>,
    /// Normalized text, filled in by [`MarkupParser::fetch_content`]
    pub text: Option<String>,
    /// Index of the destination pattern that matched (`None` for [`MarkupParser::seek_to`])
    pub destination: Option<usize>,
    /// Line of the opening tag
    pub line: usize,
}

impl ParsedNode {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Streaming parser over one document
///
/// Not reentrant: one logical thread of control advances it.
pub struct MarkupParser<'a> {
    /// Token source with one-token lookahead
    cursor: Cursor<'a>,

    /// File being parsed (for error reporting)
    source: PathBuf,

    /// Element names from the root to the current node
    path: Vec<String>,

    /// Patterns [`MarkupParser::advance`] stops at
    destinations: Vec<PathPattern>,

    /// Most recently matched element
    current: Option<ParsedNode>,

    /// Whether the matched element's content is still unread
    content_pending: bool,
}

impl<'a> MarkupParser<'a> {
    /// Create a parser over `content`
    ///
    /// # Parameters
    /// * `source` - Path of the document, used in error messages
    /// * `content` - The whole document text
    /// * `destinations` - Patterns for repeated elements reported by [`MarkupParser::advance`]
    pub fn new(source: impl Into<PathBuf>, content: &'a str, destinations: Vec<PathPattern>) -> Self {
        let source = source.into();
        Self {
            cursor: Cursor::new(&source, content),
            source,
            path: Vec::new(),
            destinations,
            current: None,
            content_pending: false,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Line of the most recently read token
    pub fn line(&self) -> usize {
        self.cursor.line()
    }

    /// Dot-joined path of the current position
    pub fn path(&self) -> String {
        self.path.join(&PATH_DELIMITER.to_string())
    }

    /// The most recently matched element, if any
    pub fn current(&self) -> Option<&ParsedNode> {
        self.current.as_ref()
    }

    /// Advance to the first element whose path matches `pattern`
    ///
    /// # Parameters
    /// * `pattern` - Pattern the element path must match exactly
    /// * `stop` - Optional boundary; if reached first, it is left unread and `false` is returned
    ///
    /// # Returns
    /// * `Ok(true)` - Found; attributes are readable through [`MarkupParser::current`]
    /// * `Ok(false)` - Boundary or end of document reached
    /// * `Err(MarkupError)` - Malformed document
    pub fn seek_to(&mut self, pattern: &PathPattern, stop: Option<&PathPattern>) -> Result<bool, MarkupError> {
        self.current = None;
        self.content_pending = false;

        loop {
            match self.cursor.next()? {
                Token::Open(tag) => {
                    self.check_name(&tag)?;
                    if self.divert(&tag, None)? {
                        continue;
                    }
                    let joined = self.joined_with(&tag.name);
                    if stop.is_some_and(|s| s.is_match(&joined)) {
                        self.cursor.unread(Token::Open(tag));
                        return Ok(false);
                    }
                    self.path.push(tag.name.clone());
                    if pattern.is_match(&joined) {
                        self.select(tag, joined, None);
                        return Ok(true);
                    }
                }
                Token::Close(name) => self.leave(&name)?,
                Token::Text(_) => {}
                Token::Eof => return self.end_of_document(),
            }
        }
    }

    /// Advance to the next element matching any destination pattern
    ///
    /// If the previous match's content was not fetched, scanning continues inside it.
    ///
    /// # Returns
    /// * `Ok(true)` - Found; see [`MarkupParser::current`]
    /// * `Ok(false)` - End of document
    /// * `Err(MarkupError)` - Malformed document
    pub fn advance(&mut self) -> Result<bool, MarkupError> {
        self.current = None;
        self.content_pending = false;

        loop {
            match self.cursor.next()? {
                Token::Open(tag) => {
                    self.check_name(&tag)?;
                    if self.divert(&tag, None)? {
                        continue;
                    }
                    let joined = self.joined_with(&tag.name);
                    self.path.push(tag.name.clone());
                    let matched = self.destinations.iter().position(|p| p.is_match(&joined));
                    if let Some(index) = matched {
                        self.select(tag, joined, Some(index));
                        return Ok(true);
                    }
                }
                Token::Close(name) => self.leave(&name)?,
                Token::Text(_) => {}
                Token::Eof => return self.end_of_document(),
            }
        }
    }

    /// Consume the matched element's content and return its normalized text
    ///
    /// Ignored elements are skipped, line-break elements insert a line break,
    /// variant constructs keep only their retained reading. Calling this again
    /// before the next advance returns the same text.
    ///
    /// # Returns
    /// * `Ok(Some(text))` - Normalized text
    /// * `Ok(None)` - Nothing collected, or no element matched
    pub fn fetch_content(&mut self) -> Result<Option<String>, MarkupError> {
        if !self.content_pending {
            return Ok(self.current.as_ref().and_then(|node| node.text.clone()));
        }
        self.content_pending = false;

        let floor = self.path.len();
        let mut collector = TextCollector::new();
        loop {
            match self.cursor.next()? {
                Token::Open(tag) => {
                    self.check_name(&tag)?;
                    if vocabulary::is_line_break(&tag.name) {
                        collector.line_break();
                    }
                    if self.divert(&tag, Some(&mut collector))? {
                        continue;
                    }
                    self.path.push(tag.name);
                }
                Token::Close(name) => {
                    self.leave(&name)?;
                    if self.path.len() < floor {
                        break;
                    }
                }
                Token::Text(text) => collector.push_text(&text),
                Token::Eof => return Err(self.unexpected_eof()),
            }
        }

        let text = collector.finish();
        if let Some(node) = self.current.as_mut() {
            node.text = text.clone();
        }
        Ok(text)
    }

    fn select(&mut self, tag: OpenTag, path: String, destination: Option<usize>) {
        log::trace!("matched {} at line {}", path, tag.line);
        self.current = Some(ParsedNode {
            path,
            name: tag.name,
            attributes: tag.attributes,
            text: None,
            destination,
            line: tag.line,
        });
        self.content_pending = true;
    }

    /// Handle ignored elements and variant constructs; true if the tag was consumed
    fn divert(&mut self, tag: &OpenTag, collector: Option<&mut TextCollector>) -> Result<bool, MarkupError> {
        if vocabulary::is_ignored(&tag.name) {
            self.skip_subtree(tag)?;
            return Ok(true);
        }
        if vocabulary::is_variant_wrapper(&tag.name) {
            self.resolve_variant(tag, collector)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume everything up to and including the close of `tag`
    fn skip_subtree(&mut self, tag: &OpenTag) -> Result<(), MarkupError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.cursor.next()? {
                Token::Open(_) => depth += 1,
                Token::Close(_) => depth -= 1,
                Token::Text(_) => {}
                Token::Eof => {
                    return Err(MarkupError::UnexpectedEof {
                        path: self.source.clone(),
                        line: self.cursor.line(),
                        open: tag.name.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    /// Bounded sub-scan over a spelling-variant construct
    ///
    /// Keeps text only while the innermost open tag is a retained reading.
    fn resolve_variant(
        &mut self,
        wrapper: &OpenTag,
        mut collector: Option<&mut TextCollector>,
    ) -> Result<(), MarkupError> {
        let mut brackets: Vec<(String, bool)> = vec![(wrapper.name.clone(), false)];

        loop {
            let Some(&(_, capturing)) = brackets.last() else {
                break;
            };

            match self.cursor.next()? {
                Token::Open(tag) => {
                    self.check_name(&tag)?;
                    if vocabulary::is_ignored(&tag.name) {
                        self.skip_subtree(&tag)?;
                    } else if vocabulary::is_line_break(&tag.name) {
                        self.skip_subtree(&tag)?;
                        if let (true, Some(c)) = (capturing, collector.as_deref_mut()) {
                            c.line_break();
                        }
                    } else if vocabulary::is_variant_inner(&tag.name) {
                        brackets.push((tag.name, true));
                    } else if vocabulary::is_variant_participant(&tag.name) {
                        brackets.push((tag.name, false));
                    } else {
                        return Err(MarkupError::UnexpectedVariantTag {
                            path: self.source.clone(),
                            line: tag.line,
                            tag: tag.name,
                            wrapper: wrapper.name.clone(),
                        });
                    }
                }
                Token::Close(name) => {
                    if let Some((open, _)) = brackets.pop() {
                        if open != name {
                            return Err(MarkupError::MismatchedClose {
                                path: self.source.clone(),
                                line: self.cursor.line(),
                                expected: open,
                                found: name,
                            });
                        }
                    }
                }
                Token::Text(text) => {
                    if let (true, Some(c)) = (capturing, collector.as_deref_mut()) {
                        c.push_text(&text);
                    }
                }
                Token::Eof => {
                    return Err(MarkupError::UnexpectedEof {
                        path: self.source.clone(),
                        line: self.cursor.line(),
                        open: wrapper.name.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    fn check_name(&self, tag: &OpenTag) -> Result<(), MarkupError> {
        if tag.name.contains(PATH_DELIMITER) {
            return Err(MarkupError::ReservedDelimiter {
                path: self.source.clone(),
                line: tag.line,
                name: tag.name.clone(),
            });
        }
        Ok(())
    }

    fn joined_with(&self, name: &str) -> String {
        if self.path.is_empty() {
            return name.to_string();
        }
        let mut joined = self.path();
        joined.push(PATH_DELIMITER);
        joined.push_str(name);
        joined
    }

    fn leave(&mut self, name: &str) -> Result<(), MarkupError> {
        match self.path.pop() {
            Some(open) if open == name => Ok(()),
            Some(open) => Err(MarkupError::MismatchedClose {
                path: self.source.clone(),
                line: self.cursor.line(),
                expected: open,
                found: name.to_string(),
            }),
            None => Err(MarkupError::UnexpectedClose {
                path: self.source.clone(),
                line: self.cursor.line(),
                found: name.to_string(),
            }),
        }
    }

    fn end_of_document(&mut self) -> Result<bool, MarkupError> {
        if self.path.is_empty() {
            Ok(false)
        } else {
            Err(self.unexpected_eof())
        }
    }

    fn unexpected_eof(&self) -> MarkupError {
        MarkupError::UnexpectedEof {
            path: self.source.clone(),
            line: self.cursor.line(),
            open: self.path.last().cloned().unwrap_or_default(),
        }
    }
}
