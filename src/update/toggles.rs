//! User commands, settings changes and warning dismissals

use crate::commands::Cmd;
use crate::config::Settings;
use crate::decorations::{Dismissal, Notice};
use crate::ligature::SelectionMode;
use crate::messages::ToggleMsg;
use crate::model::{DocumentId, EngineModel};

use super::scan::review_full;

/// Order of the selection mode cycle; `None` defers to settings
const SELECTION_MODES: [Option<SelectionMode>; 5] = [
    None,
    Some(SelectionMode::Off),
    Some(SelectionMode::Cursor),
    Some(SelectionMode::Line),
    Some(SelectionMode::Selection),
];

/// Handle the cycle/toggle commands
pub fn update_toggle(model: &mut EngineModel, msg: ToggleMsg) -> Option<Cmd> {
    let message = match msg {
        ToggleMsg::CycleDebug => {
            model.toggles.debug = match model.toggles.debug {
                None => Some(true),
                Some(true) => Some(false),
                Some(false) => None,
            };
            let state = match model.toggles.debug {
                None => "by settings",
                Some(true) => "all on",
                Some(false) => "all off",
            };
            format!("Ligature debug highlighting: {}", state)
        }
        ToggleMsg::CycleSelectionMode => {
            let index = SELECTION_MODES
                .iter()
                .position(|m| *m == model.toggles.selection_mode)
                .unwrap_or(0);
            model.toggles.selection_mode = SELECTION_MODES[(index + 1) % SELECTION_MODES.len()];
            format!(
                "Ligature selection disable mode: {}",
                model
                    .toggles
                    .selection_mode
                    .map(|m| m.as_str())
                    .unwrap_or("by settings")
            )
        }
        ToggleMsg::ToggleSuppression => {
            model.toggles.suppression = !model.toggles.suppression;
            format!(
                "Ligature suppression by Ligatures Limited has been {}",
                if model.toggles.suppression {
                    "activated"
                } else {
                    "deactivated"
                }
            )
        }
    };

    tracing::info!("{}", message);
    let mut cmds = vec![Cmd::Notify(Notice::Info(message))];
    if let Some(document) = model.current_document {
        cmds.extend(review_full(model, document));
    }
    Cmd::batch(cmds)
}

/// Warn about disabled ligature fonts and review every open document
pub fn initialize(model: &mut EngineModel) -> Option<Cmd> {
    let mut cmds = Vec::new();

    if !model.resolver.settings().host.font_ligatures && model.warnings.font_warning_enabled {
        cmds.push(Cmd::Notify(Notice::LigatureFontsDisabled));
    }

    let mut documents: Vec<DocumentId> = model.documents.keys().copied().collect();
    documents.sort();
    for document in documents {
        cmds.extend(review_full(model, document));
    }

    Cmd::batch(cmds)
}

/// New settings: drop every cached configuration and start over
pub fn settings_changed(model: &mut EngineModel, settings: Settings) -> Option<Cmd> {
    model.timing = settings.timing;
    model.resolver.set_settings(settings);
    tracing::info!("Settings changed, reviewing {} documents", model.documents.len());
    initialize(model)
}

pub fn warning_dismissed(model: &mut EngineModel, dismissal: Dismissal) -> Option<Cmd> {
    match dismissal {
        Dismissal::SizeForDocument(document) => {
            model.warnings.size_warned.insert(document);
        }
        Dismissal::SizeForSession => model.warnings.size_warning_enabled = false,
        Dismissal::FontsForSession => model.warnings.font_warning_enabled = false,
    }
    None
}
