//! Language identification and detection
//!
//! Maps file extensions and host language ids to the grammars the
//! tokenizer knows.

use std::path::Path;

/// Supported language identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    #[default]
    PlainText,
    Rust,
    JavaScript,
    TypeScript,
    Tsx,
    Python,
    Go,
    C,
}

impl LanguageId {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => LanguageId::Rust,
            "js" | "mjs" | "cjs" | "jsx" => LanguageId::JavaScript,
            "ts" | "mts" | "cts" => LanguageId::TypeScript,
            "tsx" => LanguageId::Tsx,
            "py" | "pyi" => LanguageId::Python,
            "go" => LanguageId::Go,
            "c" | "h" => LanguageId::C,
            _ => LanguageId::PlainText,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(LanguageId::PlainText)
    }

    /// Look up a host language id (`"rust"`, `"typescriptreact"`, ...)
    pub fn from_host_id(id: &str) -> Self {
        match id {
            "rust" => LanguageId::Rust,
            "javascript" | "javascriptreact" => LanguageId::JavaScript,
            "typescript" => LanguageId::TypeScript,
            "typescriptreact" => LanguageId::Tsx,
            "python" => LanguageId::Python,
            "go" => LanguageId::Go,
            "c" => LanguageId::C,
            _ => LanguageId::PlainText,
        }
    }

    /// Host language id, the key language sections are configured under
    pub fn host_id(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "plaintext",
            LanguageId::Rust => "rust",
            LanguageId::JavaScript => "javascript",
            LanguageId::TypeScript => "typescript",
            LanguageId::Tsx => "typescriptreact",
            LanguageId::Python => "python",
            LanguageId::Go => "go",
            LanguageId::C => "c",
        }
    }

    /// Last segment of the scopes tokens in this language carry
    pub fn scope_suffix(&self) -> &'static str {
        match self {
            LanguageId::PlainText => "plain",
            LanguageId::Rust => "rust",
            LanguageId::JavaScript => "js",
            LanguageId::TypeScript => "ts",
            LanguageId::Tsx => "tsx",
            LanguageId::Python => "python",
            LanguageId::Go => "go",
            LanguageId::C => "c",
        }
    }

    /// Check if this language has a grammar
    pub fn has_grammar(&self) -> bool {
        !matches!(self, LanguageId::PlainText)
    }
}
