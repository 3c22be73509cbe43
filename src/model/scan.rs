//! Per-editor scan bookkeeping

use std::fmt;

use serde::Serialize;

use super::editor::{LineRange, Position, Selection};
use crate::decorations::DecorationKind;

/// A decorated span in character columns
///
/// Glyph ranges always lie on one line; only the background band spans
/// several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LigatureRange {
    pub start: Position,
    pub end: Position,
}

impl LigatureRange {
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// `start..end` on one line
    pub const fn on_line(line: usize, start: usize, end: usize) -> Self {
        Self::new(Position::new(line, start), Position::new(line, end))
    }

    pub fn line(&self) -> usize {
        self.start.line
    }
}

impl fmt::Display for LigatureRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(f, "{}:{}-{}", self.start.line + 1, self.start.column, self.end.column)
        } else {
            write!(
                f,
                "{}:{}-{}:{}",
                self.start.line + 1,
                self.start.column,
                self.end.line + 1,
                self.end.column
            )
        }
    }
}

/// The four range lists one scan produces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeLists {
    pub breaks: Vec<LigatureRange>,
    pub debug_breaks: Vec<LigatureRange>,
    pub highlights: Vec<LigatureRange>,
    pub background: Vec<LigatureRange>,
}

impl RangeLists {
    pub fn get(&self, kind: DecorationKind) -> &[LigatureRange] {
        match kind {
            DecorationKind::Suppress => &self.breaks,
            DecorationKind::DebugSuppress => &self.debug_breaks,
            DecorationKind::DebugHighlight => &self.highlights,
            DecorationKind::Background => &self.background,
        }
    }

    /// Drop glyph ranges starting on `first..=last`, except on lines inside `keep`
    pub fn clear_lines(&mut self, first: usize, last: usize, keep: Option<LineRange>) {
        let doomed = |r: &LigatureRange| {
            let line = r.line();
            first <= line
                && line <= last
                && !keep.is_some_and(|k| k.first <= line && line <= k.last)
        };
        self.breaks.retain(|r| !doomed(r));
        self.debug_breaks.retain(|r| !doomed(r));
        self.highlights.retain(|r| !doomed(r));
    }

    /// Follow an edit that replaced lines `first..=last` with
    /// `inserted + 1` new lines: ranges on the replaced lines are dropped and
    /// ranges below them move with their text
    pub fn splice_lines(&mut self, first: usize, last: usize, inserted: usize) {
        self.clear_lines(first, last, None);

        let new_last = first + inserted;
        if new_last == last {
            return;
        }
        let shift = |r: &mut LigatureRange| {
            if r.start.line > last {
                r.start.line = r.start.line - last + new_last;
                r.end.line = r.end.line - last + new_last;
            }
        };
        self.breaks.iter_mut().for_each(shift);
        self.debug_breaks.iter_mut().for_each(shift);
        self.highlights.iter_mut().for_each(shift);
    }

    pub fn clear_glyphs(&mut self) {
        self.breaks.clear();
        self.debug_breaks.clear();
        self.highlights.clear();
    }

    /// Sort by (line, column)
    pub fn sort(&mut self) {
        self.breaks.sort();
        self.debug_breaks.sort();
        self.highlights.sort();
        self.background.sort();
    }

    pub fn is_empty(&self) -> bool {
        self.breaks.is_empty()
            && self.debug_breaks.is_empty()
            && self.highlights.is_empty()
            && self.background.is_empty()
    }
}

/// A time-sliced scan waiting for its next slice
#[derive(Debug, Clone)]
pub struct InFlightScan {
    /// First line not yet processed
    pub first: usize,
    pub last: usize,
    /// Lines left alone because an earlier scan result is still valid
    pub skip: Option<LineRange>,
    /// Lines already handled by the viewport pass
    pub view: Option<LineRange>,
    pub generation: u64,
    pub lists: RangeLists,
}

impl InFlightScan {
    /// Move the scan's lines and partial results across an edit of
    /// `first..=last` that now spans `inserted + 1` lines
    pub fn splice_lines(&mut self, first: usize, last: usize, inserted: usize) {
        let new_last = first + inserted;
        let moved = |line: usize| {
            if line > last {
                line - last + new_last
            } else if line >= first {
                first
            } else {
                line
            }
        };
        self.first = moved(self.first);
        self.last = moved(self.last).max(self.first);
        self.skip = None;
        self.view = None;
        self.lists.splice_lines(first, last, inserted);
    }

    /// Whether line `i` is handled elsewhere and must not be scanned again
    pub fn skips(&self, i: usize) -> bool {
        [self.skip, self.view]
            .iter()
            .flatten()
            .any(|r| r.first <= i && i <= r.last)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    Idle,
    Yielded,
}

/// Scan state of one editor
#[derive(Debug, Clone, Default)]
pub struct ScanState {
    /// Lists from the last completed scan
    pub saved: Option<RangeLists>,
    pub in_flight: Option<InFlightScan>,
    /// Selections the last review was computed against
    pub saved_selections: Option<Vec<Selection>>,
    generation: u64,
}

impl ScanState {
    pub fn phase(&self) -> ScanPhase {
        if self.in_flight.is_some() {
            ScanPhase::Yielded
        } else {
            ScanPhase::Idle
        }
    }

    /// Generation for a new scan; continuations of older ones become stale
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|scan| scan.generation == generation)
    }

    /// Forget saved results and any in-flight scan, keeping the generation
    /// counter so pending continuations stay stale
    pub fn reset(&mut self) {
        self.saved = None;
        self.in_flight = None;
        self.saved_selections = None;
    }
}
