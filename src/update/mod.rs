//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions.

mod decide;
mod document;
mod editor;
mod scan;
mod toggles;

use crate::commands::Cmd;
use crate::messages::{Msg, ScanMsg};
use crate::model::EngineModel;

pub use decide::ScanContext;
pub use document::update_document;
pub use editor::update_editor;
pub use scan::{review_document, review_full};
pub use toggles::update_toggle;

/// Main update function - dispatches to sub-handlers
pub fn update(model: &mut EngineModel, msg: Msg) -> Option<Cmd> {
    let _span = tracing::debug_span!("update", msg = msg.name()).entered();

    match msg {
        Msg::Initialize => toggles::initialize(model),
        Msg::Document(m) => document::update_document(model, m),
        Msg::Editor(m) => editor::update_editor(model, m),
        Msg::Scan(m) => update_scan(model, m),
        Msg::Toggle(m) => toggles::update_toggle(model, m),
        Msg::SettingsChanged(settings) => toggles::settings_changed(model, *settings),
        Msg::WarningDismissed(d) => toggles::warning_dismissed(model, d),
    }
}

/// Continuations scheduled by earlier updates
fn update_scan(model: &mut EngineModel, msg: ScanMsg) -> Option<Cmd> {
    match msg {
        ScanMsg::OpenReview {
            document,
            generation,
        } => document::open_review(model, document, generation),
        ScanMsg::RetryReview {
            document,
            attempt,
            first,
            last,
            skip,
        } => scan::review_document(model, document, attempt, first, last, skip),
        ScanMsg::Resume { editor, generation } => scan::resume_scan(model, editor, generation),
        ScanMsg::SelectionSettled { editor, generation } => {
            editor::selection_settled(model, editor, generation)
        }
    }
}
