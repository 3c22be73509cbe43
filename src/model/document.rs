//! Open document text

use ropey::Rope;

use super::editor::Position;
use super::DocumentId;

/// One content change, expressed against the text before the change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    pub start: Position,
    pub end: Position,
    /// Replacement text
    pub text: String,
}

impl TextDelta {
    pub fn new(start: Position, end: Position, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Pure insertion at `at`
    pub fn insert(at: Position, text: impl Into<String>) -> Self {
        Self::new(at, at, text)
    }

    /// Line breaks in the replacement text
    pub fn inserted_lines(&self) -> usize {
        self.text.matches('\n').count()
    }
}

/// A document the engine knows about
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub id: DocumentId,
    /// Host language identifier (`rust`, `typescript`, `markdown`, ...)
    pub language: String,
    pub text: Rope,
    /// Bumped on every (re)open so a stale open debounce is ignored
    pub open_generation: u64,
    /// An open review is still pending
    pub open_pending: bool,
}

impl DocumentState {
    pub fn new(id: DocumentId, language: impl Into<String>, text: &str) -> Self {
        Self {
            id,
            language: language.into(),
            text: Rope::from_str(text),
            open_generation: 0,
            open_pending: false,
        }
    }

    /// Number of lines, counting an empty last line after a final newline
    pub fn line_count(&self) -> usize {
        self.text.len_lines()
    }

    pub fn byte_len(&self) -> usize {
        self.text.len_bytes()
    }

    /// Text of a line without its line ending
    pub fn line_text(&self, line: usize) -> String {
        if line >= self.line_count() {
            return String::new();
        }
        let mut text = self.text.line(line).to_string();
        while text.ends_with(['\n', '\r']) {
            text.pop();
        }
        text
    }

    /// Length of a line in characters, excluding the line ending
    pub fn line_len(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let slice = self.text.line(line);
        let mut len = slice.len_chars();
        while len > 0 && matches!(slice.char(len - 1), '\n' | '\r') {
            len -= 1;
        }
        len
    }

    /// Char index of a position, clamped to the document
    pub fn char_index(&self, pos: Position) -> usize {
        if pos.line >= self.line_count() {
            return self.text.len_chars();
        }
        self.text.line_to_char(pos.line) + pos.column.min(self.line_len(pos.line))
    }

    /// Apply one delta to the text
    pub fn apply(&mut self, delta: &TextDelta) {
        let start = self.char_index(delta.start);
        let end = self.char_index(delta.end).max(start);

        if start < end {
            self.text.remove(start..end);
        }
        if !delta.text.is_empty() {
            self.text.insert(start, &delta.text);
        }
    }
}
