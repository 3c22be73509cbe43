//! Tree-sitter backed scope provider
//!
//! Manages parsers, trees, and queries per language. Each document keeps its
//! tree and source so edits reparse incrementally, and a per-line token
//! table that answers `scope_at` lookups.

use std::collections::HashMap;

use ropey::Rope;
use streaming_iterator::StreamingIterator;
use tree_sitter::{InputEdit, Parser, Point, Query, QueryCursor, Tree};

use super::highlights::{scope_for_capture, LineToken, LineTokens};
use super::languages::LanguageId;
use crate::model::{DocumentId, TextDelta};
use crate::scope::{ScanError, ScopeProvider, ScopeToken};

/// Cached parse state for a document
struct DocParseState {
    language: LanguageId,
    /// `None` for plain text or when parsing failed
    tree: Option<Tree>,
    /// The source text that was parsed (needed for computing edits)
    source: String,
    /// Line texts, without line endings
    lines: Vec<String>,
    tokens: Vec<LineTokens>,
}

impl DocParseState {
    /// Outermost scope of every token in the document
    fn base_scope(&self) -> String {
        if self.language.has_grammar() {
            format!("source.{}", self.language.scope_suffix())
        } else {
            "text.plain".to_string()
        }
    }
}

/// Convert a byte offset to a tree-sitter Point (row, column in bytes)
fn byte_to_point(text: &str, byte_offset: usize) -> Point {
    let mut row = 0usize;
    let mut col = 0usize;

    for &byte in text.as_bytes().iter().take(byte_offset) {
        if byte == b'\n' {
            row += 1;
            col = 0;
        } else {
            col += 1;
        }
    }

    Point { row, column: col }
}

/// Compute an InputEdit by diffing old and new source text.
/// Returns None if the sources are identical.
fn compute_incremental_edit(old_src: &str, new_src: &str) -> Option<InputEdit> {
    if old_src == new_src {
        return None;
    }

    let old_bytes = old_src.as_bytes();
    let new_bytes = new_src.as_bytes();

    // Common prefix
    let mut start = 0;
    let max_start = old_bytes.len().min(new_bytes.len());
    while start < max_start && old_bytes[start] == new_bytes[start] {
        start += 1;
    }

    // Common suffix, not overlapping the prefix
    let mut old_end = old_bytes.len();
    let mut new_end = new_bytes.len();
    while old_end > start && new_end > start && old_bytes[old_end - 1] == new_bytes[new_end - 1] {
        old_end -= 1;
        new_end -= 1;
    }

    Some(InputEdit {
        start_byte: start,
        old_end_byte: old_end,
        new_end_byte: new_end,
        start_position: byte_to_point(old_src, start),
        old_end_position: byte_to_point(old_src, old_end),
        new_end_position: byte_to_point(new_src, new_end),
    })
}

/// Character column for a byte column, clamped to the line
fn byte_to_char_col(line: &str, byte_col: usize) -> usize {
    let mut valid_byte = byte_col.min(line.len());
    while valid_byte > 0 && !line.is_char_boundary(valid_byte) {
        valid_byte -= 1;
    }
    line[..valid_byte].chars().count()
}

fn split_lines(source: &str) -> Vec<String> {
    source
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

/// Scope provider that tokenizes documents with tree-sitter highlight
/// queries. Languages without a grammar get one plain-text token per line.
pub struct TreeSitterScopes {
    parsers: HashMap<LanguageId, Parser>,
    queries: HashMap<LanguageId, Query>,
    docs: HashMap<DocumentId, DocParseState>,
}

impl TreeSitterScopes {
    pub fn new() -> Self {
        let mut state = Self {
            parsers: HashMap::new(),
            queries: HashMap::new(),
            docs: HashMap::new(),
        };

        for lang in [
            LanguageId::Rust,
            LanguageId::JavaScript,
            LanguageId::TypeScript,
            LanguageId::Tsx,
            LanguageId::Python,
            LanguageId::Go,
            LanguageId::C,
        ] {
            state.init_language(lang);
        }

        state
    }

    fn init_language(&mut self, lang: LanguageId) {
        let typescript_highlights = || {
            format!(
                "{}\n{}",
                tree_sitter_typescript::HIGHLIGHTS_QUERY,
                tree_sitter_javascript::HIGHLIGHT_QUERY
            )
        };

        let (ts_lang, highlights_scm): (tree_sitter::Language, String) = match lang {
            LanguageId::Rust => (
                tree_sitter_rust::LANGUAGE.into(),
                tree_sitter_rust::HIGHLIGHTS_QUERY.to_string(),
            ),
            LanguageId::JavaScript => (
                tree_sitter_javascript::LANGUAGE.into(),
                tree_sitter_javascript::HIGHLIGHT_QUERY.to_string(),
            ),
            LanguageId::TypeScript => (
                tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
                typescript_highlights(),
            ),
            LanguageId::Tsx => (
                tree_sitter_typescript::LANGUAGE_TSX.into(),
                typescript_highlights(),
            ),
            LanguageId::Python => (
                tree_sitter_python::LANGUAGE.into(),
                tree_sitter_python::HIGHLIGHTS_QUERY.to_string(),
            ),
            LanguageId::Go => (
                tree_sitter_go::LANGUAGE.into(),
                tree_sitter_go::HIGHLIGHTS_QUERY.to_string(),
            ),
            LanguageId::C => (
                tree_sitter_c::LANGUAGE.into(),
                tree_sitter_c::HIGHLIGHT_QUERY.to_string(),
            ),
            LanguageId::PlainText => return,
        };

        let mut parser = Parser::new();
        if let Err(e) = parser.set_language(&ts_lang) {
            tracing::error!("Failed to set language for {:?}: {}", lang, e);
            return;
        }
        self.parsers.insert(lang, parser);

        // Without a query the document is still split into operator runs
        match Query::new(&ts_lang, &highlights_scm) {
            Ok(query) => {
                self.queries.insert(lang, query);
            }
            Err(e) => {
                tracing::error!("Failed to compile query for {:?}: {:?}", lang, e);
            }
        }
    }

    /// Parse `source`, reusing `old` when given (already edited)
    fn parse(&mut self, lang: LanguageId, source: &str, old: Option<&Tree>) -> Option<Tree> {
        let parser = self.parsers.get_mut(&lang)?;
        parser.parse(source, old)
    }

    /// Build the per-line token table for a parsed source
    fn build_tokens(
        &self,
        lang: LanguageId,
        lines: &[String],
        source: &str,
        tree: Option<&Tree>,
    ) -> Vec<LineTokens> {
        let suffix = lang.scope_suffix();
        let chars: Vec<Vec<char>> = lines.iter().map(|l| l.chars().collect()).collect();
        let mut paint: Vec<Vec<Option<usize>>> = chars.iter().map(|c| vec![None; c.len()]).collect();
        let mut scopes: Vec<String> = Vec::new();

        if let (Some(tree), Some(query)) = (tree, self.queries.get(&lang)) {
            struct Span {
                start: Point,
                end: Point,
                bytes: usize,
                pattern: usize,
                scope: usize,
            }

            let mut spans = Vec::new();
            let mut cursor = QueryCursor::new();
            let mut captures = cursor.captures(query, tree.root_node(), source.as_bytes());
            while let Some((query_match, capture_idx)) = captures.next() {
                let capture = &query_match.captures[*capture_idx];
                let name = &query.capture_names()[capture.index as usize];
                let Some(scope) = scope_for_capture(name, suffix) else {
                    continue;
                };

                let node = capture.node;
                scopes.push(scope);
                spans.push(Span {
                    start: node.start_position(),
                    end: node.end_position(),
                    bytes: node.end_byte() - node.start_byte(),
                    pattern: query_match.pattern_index,
                    scope: scopes.len() - 1,
                });
            }

            // Outer nodes first so nested captures paint over them; for the
            // same node the earliest pattern paints last and wins
            spans.sort_by(|a, b| b.bytes.cmp(&a.bytes).then(b.pattern.cmp(&a.pattern)));

            for span in &spans {
                for row in span.start.row..=span.end.row.min(lines.len().saturating_sub(1)) {
                    let line = &lines[row];
                    let from = if row == span.start.row {
                        byte_to_char_col(line, span.start.column)
                    } else {
                        0
                    };
                    let to = if row == span.end.row {
                        byte_to_char_col(line, span.end.column)
                    } else {
                        chars[row].len()
                    };
                    for cell in paint[row].iter_mut().take(to).skip(from) {
                        *cell = Some(span.scope);
                    }
                }
            }
        }

        chars
            .iter()
            .zip(&paint)
            .map(|(line, paint)| {
                if lang.has_grammar() {
                    LineTokens::from_paint(line, paint, &scopes, suffix)
                } else {
                    plain_line(line.len())
                }
            })
            .collect()
    }

    /// Parse from scratch and store the document
    fn load(
        &mut self,
        document: DocumentId,
        lang: LanguageId,
        source: String,
    ) -> Result<(), ScanError> {
        let tree = if lang.has_grammar() {
            self.parse(lang, &source, None)
        } else {
            None
        };
        let failed = lang.has_grammar() && tree.is_none();

        let lines = split_lines(&source);
        let tokens = self.build_tokens(lang, &lines, &source, tree.as_ref());
        self.docs.insert(
            document,
            DocParseState {
                language: lang,
                tree,
                source,
                lines,
                tokens,
            },
        );

        if failed {
            return Err(ScanError::Reparse(format!("{:?} parse failed", lang)));
        }
        Ok(())
    }
}

impl Default for TreeSitterScopes {
    fn default() -> Self {
        Self::new()
    }
}

/// One token for the whole line
fn plain_line(len: usize) -> LineTokens {
    let tokens = if len > 0 {
        vec![LineToken {
            start: 0,
            end: len,
            scope: None,
        }]
    } else {
        Vec::new()
    };
    LineTokens { tokens }
}

impl ScopeProvider for TreeSitterScopes {
    fn scope_at(&self, document: DocumentId, line: usize, column: usize) -> Option<ScopeToken> {
        let doc = self.docs.get(&document)?;
        let tokens = doc.tokens.get(line)?;
        let base = doc.base_scope();

        let Some(token) = tokens.token_at(column) else {
            return Some(ScopeToken::new("", vec![base], column));
        };

        let text: String = doc.lines[line]
            .chars()
            .skip(token.start)
            .take(token.end - token.start)
            .collect();
        let mut scopes = vec![base];
        scopes.extend(token.scope.clone());
        Some(ScopeToken::new(text, scopes, token.start))
    }

    fn document_opened(&mut self, document: DocumentId, language: &str, text: &Rope) {
        let lang = LanguageId::from_host_id(language);
        tracing::debug!("Tokenizing {:?} as {:?}", document, lang);
        if let Err(e) = self.load(document, lang, text.to_string()) {
            tracing::warn!("{:?}: {}", document, e);
        }
    }

    fn document_changed(
        &mut self,
        document: DocumentId,
        _delta: &TextDelta,
        text: &Rope,
    ) -> Result<(), ScanError> {
        let source = text.to_string();
        let Some(mut cached) = self.docs.remove(&document) else {
            return Err(ScanError::ParseNotReady);
        };
        let lang = cached.language;

        let tree = match (cached.tree.as_mut(), compute_incremental_edit(&cached.source, &source)) {
            (Some(tree), Some(edit)) => {
                tree.edit(&edit);
                tracing::trace!(
                    "Incremental parse: bytes {}..{} now end at {}",
                    edit.start_byte,
                    edit.old_end_byte,
                    edit.new_end_byte
                );
                self.parse(lang, &source, Some(&*tree))
            }
            (Some(tree), None) => Some(tree.clone()),
            (None, _) => None,
        };

        match tree {
            Some(tree) => {
                let lines = split_lines(&source);
                let tokens = self.build_tokens(lang, &lines, &source, Some(&tree));
                cached.tree = Some(tree);
                cached.source = source;
                cached.lines = lines;
                cached.tokens = tokens;
                self.docs.insert(document, cached);
                Ok(())
            }
            None => {
                if lang.has_grammar() {
                    tracing::warn!(
                        "Incremental parse failed for {:?}, falling back to full parse",
                        lang
                    );
                }
                self.load(document, lang, source)
            }
        }
    }

    fn document_closed(&mut self, document: DocumentId) {
        self.docs.remove(&document);
    }
}
