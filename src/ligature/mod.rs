//! Ligature configuration: toggle lists, per-language resolution and the
//! compiled scanning pattern

pub mod builtin;
mod error;
pub mod pattern;
pub mod resolver;
pub mod toggle;

pub use error::ConfigError;
pub use pattern::{glyph_in_set, LigaturePattern, Vocabulary};
pub use resolver::{
    ConfigResolver, ContextOverride, ContextSet, LanguageConfig, LigatureSet, ResolvedConfig,
    SelectionMode,
};
