//! Text accumulation with whitespace normalization

/// Marker emitted for line-break elements
pub const LINE_BREAK: char = '\n';

/// Accumulates text runs into normalized text
///
/// Whitespace runs collapse to a single space, leading and trailing whitespace
/// is dropped, and a pending line break replaces the separator before the next
/// non-empty run.
#[derive(Debug, Default)]
pub struct TextCollector {
    text: String,
    pending_space: bool,
    pending_break: bool,
}

impl TextCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw text run
    pub fn push_text(&mut self, raw: &str) {
        for c in raw.chars() {
            if c.is_whitespace() {
                self.pending_space = true;
                continue;
            }
            if !self.text.is_empty() {
                if self.pending_break {
                    self.text.push(LINE_BREAK);
                } else if self.pending_space {
                    self.text.push(' ');
                }
            }
            self.pending_space = false;
            self.pending_break = false;
            self.text.push(c);
        }
    }

    /// Request a line break before the next non-empty run
    pub fn line_break(&mut self) {
        self.pending_break = true;
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The collected text, or `None` when nothing was collected
    pub fn finish(self) -> Option<String> {
        if self.text.is_empty() {
            None
        } else {
            Some(self.text)
        }
    }
}
