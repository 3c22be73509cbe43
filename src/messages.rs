//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use crate::config::Settings;
use crate::decorations::Dismissal;
use crate::model::{DocumentId, EditorId, LineRange, Selection, TextDelta};

/// Document lifecycle events from the host
#[derive(Debug, Clone)]
pub enum DocumentMsg {
    Opened {
        id: DocumentId,
        language: String,
        text: String,
    },
    /// One batch of content changes, each against the text before the batch
    Changed {
        id: DocumentId,
        deltas: Vec<TextDelta>,
    },
    Closed(DocumentId),
}

/// Editor (view) events from the host
#[derive(Debug, Clone)]
pub enum EditorMsg {
    /// An editor became visible showing `document`
    Shown {
        editor: EditorId,
        document: DocumentId,
        selections: Vec<Selection>,
        visible_range: Option<LineRange>,
    },
    Hidden(EditorId),
    SelectionChanged {
        editor: EditorId,
        selections: Vec<Selection>,
    },
    VisibleRangeChanged {
        editor: EditorId,
        range: LineRange,
    },
}

/// Continuations the engine schedules for itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMsg {
    /// Debounced first review of a freshly opened document
    OpenReview {
        document: DocumentId,
        generation: u64,
    },
    /// Review again after the provider had no tokens yet
    RetryReview {
        document: DocumentId,
        attempt: u32,
        first: usize,
        last: usize,
        skip: Option<LineRange>,
    },
    /// Next slice of a yielded scan
    Resume { editor: EditorId, generation: u64 },
    /// A selection change debounced while the document was opening
    SelectionSettled { editor: EditorId, generation: u64 },
}

/// User commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleMsg {
    /// by settings -> all on -> all off
    CycleDebug,
    /// by settings -> off -> cursor -> line -> selection
    CycleSelectionMode,
    ToggleSuppression,
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    /// Engine start: warn about disabled fonts and review open documents
    Initialize,
    Document(DocumentMsg),
    Editor(EditorMsg),
    Scan(ScanMsg),
    Toggle(ToggleMsg),
    SettingsChanged(Box<Settings>),
    WarningDismissed(Dismissal),
}

impl Msg {
    /// Short name for log spans
    pub fn name(&self) -> &'static str {
        match self {
            Msg::Initialize => "initialize",
            Msg::Document(DocumentMsg::Opened { .. }) => "document_opened",
            Msg::Document(DocumentMsg::Changed { .. }) => "document_changed",
            Msg::Document(DocumentMsg::Closed(_)) => "document_closed",
            Msg::Editor(EditorMsg::Shown { .. }) => "editor_shown",
            Msg::Editor(EditorMsg::Hidden(_)) => "editor_hidden",
            Msg::Editor(EditorMsg::SelectionChanged { .. }) => "selection_changed",
            Msg::Editor(EditorMsg::VisibleRangeChanged { .. }) => "visible_range_changed",
            Msg::Scan(ScanMsg::OpenReview { .. }) => "open_review",
            Msg::Scan(ScanMsg::RetryReview { .. }) => "retry_review",
            Msg::Scan(ScanMsg::Resume { .. }) => "resume",
            Msg::Scan(ScanMsg::SelectionSettled { .. }) => "selection_settled",
            Msg::Toggle(_) => "toggle",
            Msg::SettingsChanged(_) => "settings_changed",
            Msg::WarningDismissed(_) => "warning_dismissed",
        }
    }
}
