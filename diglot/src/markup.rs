//! Streaming structural markup parsing
//!
//! This module walks one XML edition in a single pass:
//! 1. **Path tracking**: the element path from the root is kept as a stack and
//!    matched, dot-joined, against caller-supplied patterns
//! 2. **Variant resolution**: abbreviation/expansion, correction/error and
//!    regularized/original constructs are reduced to the retained reading
//! 3. **Text extraction**: descendant text is collected with ignored elements
//!    skipped and whitespace normalized

mod cursor;
mod error;
mod parser;
mod text;
pub mod vocabulary;

pub use error::MarkupError;
pub use parser::{MarkupParser, ParsedNode, PathPattern};
pub use text::{TextCollector, LINE_BREAK};

/// Delimiter between element names in a joined path
pub const PATH_DELIMITER: char = '.';
