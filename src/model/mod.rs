//! Engine model - the complete state of the ligature engine
//!
//! This module contains all the state types following the Elm Architecture pattern.

pub mod document;
pub mod editor;
pub mod scan;

use std::collections::{BTreeMap, HashMap, HashSet};

pub use document::{DocumentState, TextDelta};
pub use editor::{EditorState, LineRange, Position, Selection};
pub use scan::{InFlightScan, LigatureRange, RangeLists, ScanPhase, ScanState};

use crate::config::{ScanTiming, Settings};
use crate::ligature::{ConfigResolver, SelectionMode};
use crate::scope::ScopeProvider;

/// Unique identifier for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u64);

/// Unique identifier for an editor view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

/// Session-wide overrides set by the cycle/toggle commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalToggles {
    /// `None`: debug highlighting as configured
    pub debug: Option<bool>,
    /// `None`: selection mode as configured
    pub selection_mode: Option<SelectionMode>,
    pub suppression: bool,
}

impl Default for GlobalToggles {
    fn default() -> Self {
        Self {
            debug: None,
            selection_mode: None,
            suppression: true,
        }
    }
}

/// Which warnings the user still wants to see
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarningState {
    pub font_warning_enabled: bool,
    pub size_warning_enabled: bool,
    /// Documents whose size warning was already shown (or dismissed)
    pub size_warned: HashSet<DocumentId>,
}

impl Default for WarningState {
    fn default() -> Self {
        Self {
            font_warning_enabled: true,
            size_warning_enabled: true,
            size_warned: HashSet::new(),
        }
    }
}

/// The complete engine model
pub struct EngineModel {
    pub resolver: ConfigResolver,
    pub provider: Box<dyn ScopeProvider>,
    pub documents: HashMap<DocumentId, DocumentState>,
    pub editors: BTreeMap<EditorId, EditorState>,
    pub toggles: GlobalToggles,
    pub warnings: WarningState,
    pub timing: ScanTiming,
    /// Document most recently reviewed; the cycle commands re-review it
    pub current_document: Option<DocumentId>,
}

impl EngineModel {
    pub fn new(settings: Settings, provider: Box<dyn ScopeProvider>) -> Self {
        let timing = settings.timing;
        Self {
            resolver: ConfigResolver::new(settings),
            provider,
            documents: HashMap::new(),
            editors: BTreeMap::new(),
            toggles: GlobalToggles::default(),
            warnings: WarningState::default(),
            timing,
            current_document: None,
        }
    }

    /// Editors currently showing `document`
    pub fn editors_for(&self, document: DocumentId) -> Vec<EditorId> {
        self.editors
            .values()
            .filter(|e| e.document == document)
            .map(|e| e.id)
            .collect()
    }

    pub fn document(&self, id: DocumentId) -> Option<&DocumentState> {
        self.documents.get(&id)
    }

    pub fn editor(&self, id: EditorId) -> Option<&EditorState> {
        self.editors.get(&id)
    }
}

impl std::fmt::Debug for EngineModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineModel")
            .field("documents", &self.documents.len())
            .field("editors", &self.editors.len())
            .field("toggles", &self.toggles)
            .field("timing", &self.timing)
            .finish_non_exhaustive()
    }
}
