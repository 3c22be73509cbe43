//! Decoration kinds, user notices and the sink that receives them

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::model::{DocumentId, EditorId, LigatureRange, RangeLists};

/// Visual treatment applied to a set of ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DecorationKind {
    /// Glyph broken apart
    Suppress,
    /// Glyph broken apart and marked for debugging
    DebugSuppress,
    /// Glyph left alone and marked for debugging
    DebugHighlight,
    /// Whole-document band: every ligature renders as-is
    Background,
}

impl DecorationKind {
    pub const ALL: [DecorationKind; 4] = [
        DecorationKind::Suppress,
        DecorationKind::DebugSuppress,
        DecorationKind::DebugHighlight,
        DecorationKind::Background,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DecorationKind::Suppress => "suppress",
            DecorationKind::DebugSuppress => "debug-suppress",
            DecorationKind::DebugHighlight => "debug-highlight",
            DecorationKind::Background => "background",
        }
    }
}

impl fmt::Display for DecorationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All four range lists for one editor, applied together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationUpdate {
    pub document: DocumentId,
    pub editor: EditorId,
    pub lists: RangeLists,
}

/// Message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    ConfigError(String),
    /// The document is too large to scan; answered with `Dismissal::SizeFor*`
    SizeWarning { document: DocumentId },
    /// The host renders no ligatures at all
    LigatureFontsDisabled,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Info(text) | Notice::ConfigError(text) => text.clone(),
            Notice::SizeWarning { .. } => {
                "Because of file size, all ligatures in this document will be displayed.".to_string()
            }
            Notice::LigatureFontsDisabled => "Ligature fonts are not enabled".to_string(),
        }
    }

    /// Choices offered alongside the message
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            Notice::SizeWarning { .. } => &[
                "Don't warn again for this document.",
                "Don't warn again this session.",
            ],
            Notice::LigatureFontsDisabled => &["OK", "Don't warn again this session."],
            _ => &[],
        }
    }
}

/// A user's answer to a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    SizeForDocument(DocumentId),
    SizeForSession,
    FontsForSession,
}

/// Receiver of computed decorations
pub trait DecorationSink {
    /// Replace all ranges of `kind` in `editor`
    fn apply_ranges(
        &mut self,
        document: DocumentId,
        editor: EditorId,
        kind: DecorationKind,
        ranges: &[LigatureRange],
    );

    fn notify(&mut self, notice: &Notice) {
        match notice {
            Notice::Info(_) => tracing::info!("{}", notice.message()),
            Notice::ConfigError(_) => tracing::error!("{}", notice.message()),
            Notice::SizeWarning { .. } | Notice::LigatureFontsDisabled => {
                tracing::warn!("{}", notice.message())
            }
        }
    }
}

/// Sink that keeps the latest ranges per editor and kind
#[derive(Debug, Default)]
pub struct CollectingSink {
    applied: HashMap<(EditorId, DecorationKind), Vec<LigatureRange>>,
    pub notices: Vec<Notice>,
    /// Number of `apply_ranges` calls received
    pub applications: usize,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self, editor: EditorId, kind: DecorationKind) -> &[LigatureRange] {
        self.applied
            .get(&(editor, kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Current decorations of `editor` as one set of lists
    pub fn lists(&self, editor: EditorId) -> RangeLists {
        RangeLists {
            breaks: self.ranges(editor, DecorationKind::Suppress).to_vec(),
            debug_breaks: self.ranges(editor, DecorationKind::DebugSuppress).to_vec(),
            highlights: self.ranges(editor, DecorationKind::DebugHighlight).to_vec(),
            background: self.ranges(editor, DecorationKind::Background).to_vec(),
        }
    }
}

impl DecorationSink for CollectingSink {
    fn apply_ranges(
        &mut self,
        _document: DocumentId,
        editor: EditorId,
        kind: DecorationKind,
        ranges: &[LigatureRange],
    ) {
        self.applications += 1;
        self.applied.insert((editor, kind), ranges.to_vec());
    }

    fn notify(&mut self, notice: &Notice) {
        tracing::debug!("Notice: {}", notice.message());
        self.notices.push(notice.clone());
    }
}
