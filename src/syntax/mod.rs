//! Tree-sitter tokenization
//!
//! Provides the default `ScopeProvider`:
//! - Language detection from file extensions and host language ids
//! - Incremental reparsing on every edit
//! - Highlight captures mapped onto TextMate-style scope names
//!
//! ## Supported Languages
//!
//! - Rust, C, Go, Python
//! - JavaScript, TypeScript (and TSX)
//!
//! Anything else is plain text: one `text.plain` token per line.

mod highlights;
mod languages;
mod parser;

pub use highlights::scope_for_capture;
pub use languages::LanguageId;
pub use parser::TreeSitterScopes;
