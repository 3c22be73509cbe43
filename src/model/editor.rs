//! Editor state: selections, viewport and the per-editor scan state

use std::time::Instant;

use serde::Serialize;

use super::scan::ScanState;
use super::{DocumentId, EditorId};

/// A position in the document (line and character column)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters)
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A text selection with anchor (start) and head (cursor end)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    /// Where the selection started (fixed point)
    pub anchor: Position,
    /// Where the cursor is (moving point)
    pub head: Position,
}

impl Selection {
    /// Create a new empty selection at a position
    pub fn new(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Create a selection from anchor to head
    pub fn from_anchor_head(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// Caret at `line`/`column` with nothing selected
    pub fn caret(line: usize, column: usize) -> Self {
        Self::new(Position::new(line, column))
    }

    /// Check if selection is empty (cursor without selection)
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the start position (earlier in document)
    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    /// Get the end position (later in document)
    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }

    /// Whether this selection overlaps or touches the span `start..end` on `line`
    pub fn touches(&self, line: usize, start: usize, end: usize) -> bool {
        self.start() <= Position::new(line, end) && Position::new(line, start) <= self.end()
    }
}

/// Inclusive range of lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub first: usize,
    pub last: usize,
}

impl LineRange {
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }
}

/// One editor (view) showing a document
#[derive(Debug, Clone)]
pub struct EditorState {
    pub id: EditorId,
    pub document: DocumentId,
    pub selections: Vec<Selection>,
    /// Lines the editor itself reports as visible
    pub visible_range: Option<LineRange>,
    /// Most recent visible-range change event and when it arrived
    pub reported_range: Option<(LineRange, Instant)>,
    /// Bumped for every debounced selection change
    pub selection_generation: u64,
    pub scan: ScanState,
}

impl EditorState {
    pub fn new(id: EditorId, document: DocumentId) -> Self {
        Self {
            id,
            document,
            selections: Vec::new(),
            visible_range: None,
            reported_range: None,
            selection_generation: 0,
            scan: ScanState::default(),
        }
    }

    /// Visible lines, preferring a recently reported range over the
    /// editor's own (which can lag behind scrolling)
    pub fn viewport(&self, now: Instant, freshness: std::time::Duration) -> Option<LineRange> {
        match self.reported_range {
            Some((range, at)) if now.saturating_duration_since(at) < freshness => Some(range),
            _ => self.visible_range,
        }
    }

    /// Forget everything computed for the current document
    pub fn discard_scan(&mut self) {
        self.scan.reset();
        self.reported_range = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_selection_start_end_normalized() {
        let sel = Selection::from_anchor_head(Position::new(3, 4), Position::new(1, 2));
        assert_eq!(sel.start(), Position::new(1, 2));
        assert_eq!(sel.end(), Position::new(3, 4));
        assert!(!sel.is_empty());
    }

    #[test]
    fn test_caret_touches_adjacent_span() {
        let caret = Selection::caret(0, 5);
        assert!(caret.touches(0, 3, 5));
        assert!(caret.touches(0, 5, 7));
        assert!(caret.touches(0, 4, 6));
        assert!(!caret.touches(0, 6, 8));
        assert!(!caret.touches(1, 4, 6));
    }

    #[test]
    fn test_multiline_selection_touches_inner_line() {
        let sel = Selection::from_anchor_head(Position::new(1, 8), Position::new(3, 0));
        assert!(sel.touches(2, 0, 2));
        assert!(!sel.touches(1, 2, 4));
    }

    #[test]
    fn test_viewport_prefers_fresh_report() {
        let mut editor = EditorState::new(EditorId(1), DocumentId(1));
        editor.visible_range = Some(LineRange::new(0, 40));
        let now = Instant::now();
        editor.reported_range = Some((LineRange::new(100, 140), now));

        assert_eq!(
            editor.viewport(now, Duration::from_millis(2000)),
            Some(LineRange::new(100, 140))
        );
        assert_eq!(
            editor.viewport(now + Duration::from_secs(3), Duration::from_millis(2000)),
            Some(LineRange::new(0, 40))
        );
    }
}
