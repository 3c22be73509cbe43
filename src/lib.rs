//! Ligatures Limited - context-aware ligature suppression
//!
//! Decides, for every ligature candidate in a document, whether the editor
//! should render it or break it apart, based on the token it sits in, the
//! language's configuration and where the user's selections are. Built on
//! the Elm Architecture: hosts send `Msg`s, `update` returns `Cmd`s, and the
//! `Runtime` carries them out against a `DecorationSink`.

pub mod commands;
pub mod config;
pub mod config_paths;
pub mod decorations;
pub mod ligature;
pub mod messages;
pub mod model;
pub mod runtime;
pub mod scope;
pub mod syntax;
pub mod tracing;
pub mod update;

// Re-export commonly used types
pub use commands::Cmd;
pub use config::Settings;
pub use decorations::{DecorationKind, DecorationSink, Notice};
pub use messages::Msg;
pub use model::EngineModel;
pub use runtime::Runtime;
pub use scope::{ScopeProvider, ScopeToken};
