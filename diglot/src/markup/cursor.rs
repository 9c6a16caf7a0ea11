//! Pull-style token cursor over an XML document
//!
//! Wraps the quick-xml reader, tracks 1-based line numbers and holds at most one
//! token of lookahead that callers can push back with [`Cursor::unread`].

use super::error::MarkupError;
use super::vocabulary::resolve_entity;
use quick_xml::escape::unescape_with;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An opening element with its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OpenTag {
    pub name: String,
    /// Last attribute wins on duplicates
    pub attributes: BTreeMap<String, String>,
    pub line: usize,
}

/// Simplified document token
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Open(OpenTag),
    Close(String),
    Text(String),
    Eof,
}

pub(crate) struct Cursor<'a> {
    reader: Reader<&'a [u8]>,
    content: &'a str,
    source: PathBuf,
    /// Line of the most recently returned token
    line: usize,
    /// Byte offset up to which newlines have been counted
    counted: usize,
    /// Line count at `counted`
    counted_line: usize,
    lookahead: Option<(Token, usize)>,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &Path, content: &'a str) -> Self {
        let mut reader = Reader::from_str(content);
        let config = reader.config_mut();
        config.trim_text(false);
        config.expand_empty_elements = true;

        Self {
            reader,
            content,
            source: source.to_path_buf(),
            line: 1,
            counted: 0,
            counted_line: 1,
            lookahead: None,
        }
    }

    /// Line of the most recently returned token
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next meaningful token
    ///
    /// Comments, processing instructions, declarations and doctypes are skipped.
    pub fn next(&mut self) -> Result<Token, MarkupError> {
        if let Some((token, line)) = self.lookahead.take() {
            self.line = line;
            return Ok(token);
        }

        loop {
            let start = self.reader.buffer_position() as usize;
            self.line = self.line_at(start);

            let event = match self.reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    let position = self.reader.buffer_position() as usize;
                    let line = self.line_at(position);
                    return Err(self.syntax_error(line, err.to_string()));
                }
            };

            let token = match event {
                Event::Start(e) => Token::Open(self.open_tag(&e)?),
                Event::End(e) => Token::Close(String::from_utf8_lossy(e.name().as_ref()).into_owned()),
                Event::Text(e) => Token::Text(self.unescape(&String::from_utf8_lossy(&e))?),
                Event::CData(e) => Token::Text(String::from_utf8_lossy(&e.into_inner()).into_owned()),
                Event::Eof => Token::Eof,
                _ => continue,
            };
            return Ok(token);
        }
    }

    /// Push one token back; the next call to [`Cursor::next`] returns it
    pub fn unread(&mut self, token: Token) {
        debug_assert!(self.lookahead.is_none(), "only one token of lookahead");
        self.lookahead = Some((token, self.line));
    }

    fn open_tag(&self, e: &BytesStart<'_>) -> Result<OpenTag, MarkupError> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

        let mut attributes = BTreeMap::new();
        for attr in e.attributes().with_checks(false) {
            let attr = attr.map_err(|err| self.syntax_error(self.line, err.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = self.unescape(&String::from_utf8_lossy(&attr.value))?;
            attributes.insert(key, value);
        }

        Ok(OpenTag {
            name,
            attributes,
            line: self.line,
        })
    }

    fn unescape(&self, raw: &str) -> Result<String, MarkupError> {
        unescape_with(raw, resolve_entity)
            .map(|text| text.into_owned())
            .map_err(|err| self.syntax_error(self.line, err.to_string()))
    }

    /// Line number of a byte offset at or after the last counted offset
    fn line_at(&mut self, position: usize) -> usize {
        let position = position.min(self.content.len());
        if position > self.counted {
            let newlines = self.content.as_bytes()[self.counted..position]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.counted_line += newlines;
            self.counted = position;
        }
        self.counted_line
    }

    fn syntax_error(&self, line: usize, message: String) -> MarkupError {
        MarkupError::Syntax {
            path: self.source.clone(),
            line,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(xml: &str) -> Vec<Token> {
        let mut cursor = Cursor::new(Path::new("test.xml"), xml);
        let mut out = Vec::new();
        loop {
            let token = cursor.next().unwrap();
            if token == Token::Eof {
                break;
            }
            out.push(token);
        }
        out
    }

    #[test]
    fn test_empty_elements_are_expanded() {
        let toks = tokens("<p>a<lb/>b</p>");
        assert_eq!(toks.len(), 6);
        assert!(matches!(&toks[2], Token::Open(tag) if tag.name == "lb"));
        assert_eq!(toks[3], Token::Close("lb".to_string()));
    }

    #[test]
    fn test_comments_and_declarations_skipped() {
        let toks = tokens("<?xml version=\"1.0\"?><!-- c --><p>x</p>");
        assert_eq!(toks.len(), 3);
    }

    #[test]
    fn test_entities_resolved() {
        let toks = tokens("<p>a &amp; b&mdash;c &aelig;</p>");
        assert_eq!(toks[1], Token::Text("a & b\u{2014}c æ".to_string()));
    }

    #[test]
    fn test_last_attribute_wins() {
        let toks = tokens("<div n=\"1\" n=\"2\" type=\"book\"></div>");
        let Token::Open(tag) = &toks[0] else {
            panic!("expected open tag");
        };
        assert_eq!(tag.attributes.get("n").map(String::as_str), Some("2"));
        assert_eq!(tag.attributes.get("type").map(String::as_str), Some("book"));
    }

    #[test]
    fn test_line_numbers_and_unread() {
        let xml = "<a>\n<b>\n</b>\n</a>";
        let mut cursor = Cursor::new(Path::new("test.xml"), xml);
        cursor.next().unwrap();
        assert_eq!(cursor.line(), 1);
        cursor.next().unwrap(); // "\n"
        let b = cursor.next().unwrap();
        assert_eq!(cursor.line(), 2);
        cursor.unread(b.clone());
        assert_eq!(cursor.next().unwrap(), b);
        assert_eq!(cursor.line(), 2);
    }

    #[test]
    fn test_unknown_entity_is_syntax_error() {
        let mut cursor = Cursor::new(Path::new("test.xml"), "<p>&bogus;</p>");
        cursor.next().unwrap();
        let err = cursor.next().unwrap_err();
        assert!(matches!(err, MarkupError::Syntax { line: 1, .. }));
    }
}
