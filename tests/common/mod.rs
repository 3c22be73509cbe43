//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ligatures_limited::config::{ScanTiming, Settings};
use ligatures_limited::decorations::CollectingSink;
use ligatures_limited::messages::{DocumentMsg, EditorMsg, Msg};
use ligatures_limited::model::{
    DocumentId, EditorId, EngineModel, LigatureRange, LineRange, RangeLists, Selection, TextDelta,
};
use ligatures_limited::runtime::Runtime;
use ligatures_limited::scope::{ScanError, ScopeProvider, ScopeToken};
use ropey::Rope;

pub const DOC: DocumentId = DocumentId(1);
pub const EDITOR: EditorId = EditorId(1);

/// Enough scheduled messages to finish any test document
pub const FLUSH_LIMIT: usize = 100_000;

#[derive(Default)]
pub struct Script {
    suffix: HashMap<DocumentId, String>,
    lines: HashMap<DocumentId, Vec<Vec<ScopeToken>>>,
    /// Hand-written tokens for single lines, as `(text, innermost scope)`
    overrides: HashMap<(DocumentId, usize), Vec<(String, String)>>,
    /// Readiness probes still to be answered with `None`
    not_ready: HashMap<DocumentId, u32>,
    pub changes: usize,
}

/// Scope provider with a tiny built-in lexer plus per-line overrides.
///
/// The lexer knows words, numbers, operator runs, brackets, `//` comments
/// and double-quoted strings. Clones share state, so a test can keep a
/// handle after moving the provider into the model.
#[derive(Clone, Default)]
pub struct ScriptedScopes(pub Rc<RefCell<Script>>);

impl ScriptedScopes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the lexer's tokens for one line; must be set before opening
    pub fn override_line(&self, document: DocumentId, line: usize, pieces: &[(&str, &str)]) {
        self.0.borrow_mut().overrides.insert(
            (document, line),
            pieces
                .iter()
                .map(|(text, scope)| (text.to_string(), scope.to_string()))
                .collect(),
        );
    }

    /// Answer the next `probes` readiness checks with "not tokenized"
    pub fn delay_ready(&self, document: DocumentId, probes: u32) {
        self.0.borrow_mut().not_ready.insert(document, probes);
    }

    pub fn changes(&self) -> usize {
        self.0.borrow().changes
    }

    fn tokenize(&self, document: DocumentId, text: &Rope) {
        let mut script = self.0.borrow_mut();
        let suffix = script.suffix.get(&document).cloned().unwrap_or_default();

        let lines = (0..text.len_lines())
            .map(|i| {
                let line = text.line(i).to_string();
                let line = line.trim_end_matches(['\n', '\r']);
                match script.overrides.get(&(document, i)) {
                    Some(pieces) => from_pieces(pieces, &suffix),
                    None => lex_line(line, &suffix),
                }
            })
            .collect();
        script.lines.insert(document, lines);
    }
}

fn base_scope(suffix: &str) -> String {
    format!("source.{}", suffix)
}

fn from_pieces(pieces: &[(String, String)], suffix: &str) -> Vec<ScopeToken> {
    let mut column = 0;
    pieces
        .iter()
        .map(|(text, scope)| {
            let token = ScopeToken::new(text.clone(), vec![base_scope(suffix), scope.clone()], column);
            column = token.end;
            token
        })
        .collect()
}

const OPERATOR_CHARS: &str = "!#$%&*+-./:<=>?@\\^|~";

/// Split a line into classified tokens
pub fn lex_line(line: &str, suffix: &str) -> Vec<ScopeToken> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let push = |tokens: &mut Vec<ScopeToken>, start: usize, end: usize, scope: Option<String>| {
        let text: String = chars[start..end].iter().collect();
        let mut scopes = vec![base_scope(suffix)];
        scopes.extend(scope);
        tokens.push(ScopeToken::new(text, scopes, start));
    };

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c == '/' && chars.get(i + 1) == Some(&'/') {
            push(&mut tokens, i, i + 2, Some(format!("punctuation.definition.comment.{}", suffix)));
            if i + 2 < chars.len() {
                push(&mut tokens, i + 2, chars.len(), Some(format!("comment.line.double-slash.{}", suffix)));
            }
            break;
        } else if c == '"' {
            i += 1;
            while i < chars.len() && chars[i] != '"' {
                i += 1;
            }
            i = (i + 1).min(chars.len());
            push(&mut tokens, start, i, Some(format!("string.quoted.double.{}", suffix)));
        } else if c.is_whitespace() {
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            push(&mut tokens, start, i, None);
        } else if c.is_alphanumeric() || c == '_' {
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let scope = if c.is_ascii_digit() {
                format!("constant.numeric.{}", suffix)
            } else {
                format!("variable.other.{}", suffix)
            };
            push(&mut tokens, start, i, Some(scope));
        } else if OPERATOR_CHARS.contains(c) {
            while i < chars.len() && OPERATOR_CHARS.contains(chars[i]) {
                i += 1;
            }
            push(&mut tokens, start, i, Some(format!("keyword.operator.{}", suffix)));
        } else {
            i += 1;
            push(&mut tokens, start, i, Some(format!("punctuation.section.{}", suffix)));
        }
    }

    tokens
}

impl ScopeProvider for ScriptedScopes {
    fn scope_at(&self, document: DocumentId, line: usize, column: usize) -> Option<ScopeToken> {
        let mut script = self.0.borrow_mut();
        if let Some(pending) = script.not_ready.get_mut(&document) {
            if *pending > 0 {
                *pending -= 1;
                return None;
            }
        }

        let suffix = script.suffix.get(&document)?.clone();
        let tokens = script.lines.get(&document)?.get(line)?;
        Some(
            tokens
                .iter()
                .find(|t| t.contains(column))
                .cloned()
                .unwrap_or_else(|| ScopeToken::new("", vec![base_scope(&suffix)], column)),
        )
    }

    fn document_opened(&mut self, document: DocumentId, language: &str, text: &Rope) {
        self.0
            .borrow_mut()
            .suffix
            .insert(document, language.to_string());
        self.tokenize(document, text);
    }

    fn document_changed(
        &mut self,
        document: DocumentId,
        _delta: &TextDelta,
        text: &Rope,
    ) -> Result<(), ScanError> {
        self.0.borrow_mut().changes += 1;
        self.tokenize(document, text);
        Ok(())
    }

    fn document_closed(&mut self, document: DocumentId) {
        let mut script = self.0.borrow_mut();
        script.lines.remove(&document);
        script.suffix.remove(&document);
    }
}

/// Settings from YAML; panics on bad YAML
pub fn settings(yaml: &str) -> Settings {
    Settings::from_yaml_str(yaml).unwrap()
}

/// Timing that never waits for a viewport report and slices every line
pub fn slicing_timing() -> ScanTiming {
    ScanTiming {
        slice_budget_ms: 0,
        ..ScanTiming::default()
    }
}

/// A runtime over a scripted provider, plus a handle to that provider
pub fn test_runtime(settings: Settings) -> (Runtime<CollectingSink>, ScriptedScopes) {
    let scopes = ScriptedScopes::new();
    let model = EngineModel::new(settings, Box::new(scopes.clone()));
    (Runtime::new(model, CollectingSink::new()), scopes)
}

/// Open `text` as `DOC` and show it in `EDITOR`, without running timers
pub fn open_and_show(
    runtime: &mut Runtime<CollectingSink>,
    language: &str,
    text: &str,
    selections: Vec<Selection>,
    visible_range: Option<LineRange>,
) {
    runtime.dispatch(Msg::Document(DocumentMsg::Opened {
        id: DOC,
        language: language.to_string(),
        text: text.to_string(),
    }));
    runtime.dispatch(Msg::Editor(EditorMsg::Shown {
        editor: EDITOR,
        document: DOC,
        selections,
        visible_range,
    }));
}

/// Open, show and run every timer; returns the editor's final lists
pub fn scan(
    runtime: &mut Runtime<CollectingSink>,
    language: &str,
    text: &str,
    selections: Vec<Selection>,
) -> RangeLists {
    open_and_show(runtime, language, text, selections, None);
    runtime.flush(FLUSH_LIMIT);
    runtime.sink().lists(EDITOR)
}

/// Ranges as `(line, start, end)` triples
pub fn spans(ranges: &[LigatureRange]) -> Vec<(usize, usize, usize)> {
    ranges
        .iter()
        .map(|r| (r.start.line, r.start.column, r.end.column))
        .collect()
}

/// Lines that carry at least one range
pub fn lines_of(ranges: &[LigatureRange]) -> Vec<usize> {
    let mut lines: Vec<usize> = ranges.iter().map(|r| r.start.line).collect();
    lines.dedup();
    lines
}
