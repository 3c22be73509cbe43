//! The scope provider seam
//!
//! A provider tokenizes documents and answers "which token covers this
//! column, and what is its scope stack". The engine never tokenizes text
//! itself; it only asks.

use ropey::Rope;
use thiserror::Error;

use super::category::{classify, Category};
use crate::model::{DocumentId, TextDelta};

/// A token as seen by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeToken {
    pub text: String,
    /// Scope names, outermost first
    pub scopes: Vec<String>,
    pub category: Category,
    /// Start column (chars)
    pub start: usize,
    /// End column (chars, exclusive)
    pub end: usize,
}

impl ScopeToken {
    /// Build a token starting at column `start`, classifying it on the way
    pub fn new(text: impl Into<String>, scopes: Vec<String>, start: usize) -> Self {
        let text = text.into();
        let category = classify(&scopes, &text);
        let end = start + text.chars().count();
        Self {
            text,
            scopes,
            category,
            start,
            end,
        }
    }

    /// Innermost scope name, if any
    pub fn specific_scope(&self) -> Option<&str> {
        self.scopes.last().map(String::as_str)
    }

    pub fn contains(&self, column: usize) -> bool {
        self.start <= column && column < self.end
    }
}

/// Failures while scanning a document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// Tokens for the document are not available yet
    #[error("Document tokens are not ready")]
    ParseNotReady,

    /// The provider could not bring its tokens up to date after an edit
    #[error("Reparse failed: {0}")]
    Reparse(String),
}

/// Scope suffix -> language id, for languages embedded in markup documents
const EMBEDDED_LANGUAGES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("jsx", "javascriptreact"),
    ("ts", "typescript"),
    ("tsx", "typescriptreact"),
    ("css", "css"),
    ("scss", "scss"),
    ("less", "less"),
    ("json", "json"),
    ("html", "html"),
    ("xml", "xml"),
    ("markdown", "markdown"),
    ("md", "markdown"),
    ("py", "python"),
    ("python", "python"),
    ("rs", "rust"),
    ("rust", "rust"),
    ("go", "go"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("java", "java"),
    ("php", "php"),
    ("shell", "shellscript"),
    ("sql", "sql"),
    ("yaml", "yaml"),
];

/// Language named by the last dotted segment of a scope (`source.js` -> `javascript`)
pub fn language_for_scope_suffix(scope: &str) -> Option<&'static str> {
    let (_, suffix) = scope.rsplit_once('.')?;
    EMBEDDED_LANGUAGES
        .iter()
        .find(|(s, _)| *s == suffix)
        .map(|(_, language)| *language)
}

/// Source of token scopes for open documents
pub trait ScopeProvider {
    /// Token covering `column` on `line`, or `None` while the document has
    /// not been tokenized
    fn scope_at(&self, document: DocumentId, line: usize, column: usize) -> Option<ScopeToken>;

    fn document_opened(&mut self, _document: DocumentId, _language: &str, _text: &Rope) {}

    /// Called once per delta, after the delta was applied to `text`
    fn document_changed(
        &mut self,
        _document: DocumentId,
        _delta: &TextDelta,
        _text: &Rope,
    ) -> Result<(), ScanError> {
        Ok(())
    }

    fn document_closed(&mut self, _document: DocumentId) {}

    /// Embedded language a scope belongs to
    fn language_for_scope(&self, scope: &str) -> Option<String> {
        language_for_scope_suffix(scope).map(str::to_string)
    }
}
