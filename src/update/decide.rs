//! Per-match suppression decisions for one line

use std::sync::LazyLock;

use fancy_regex::Regex;

use crate::ligature::builtin::{BLEED_THROUGHS, SLASH3};
use crate::ligature::{glyph_in_set, ConfigResolver, LanguageConfig, LigaturePattern, SelectionMode};
use crate::model::{DocumentState, GlobalToggles, LigatureRange, Position, RangeLists, Selection};
use crate::scope::{Category, ScopeProvider};

/// `0x`/`0o`/`0b` plus one digit valid for the base
static NUMERIC_PREFIX: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^0(x[0-9a-fA-F]|o[0-7]|b[01])$").ok());

/// Document languages whose tokens may belong to an embedded language
const MARKUP_LANGUAGES: &[&str] = &["html", "markdown", "xhtml", "xml"];

fn is_numeric_prefix(glyph: &str) -> bool {
    NUMERIC_PREFIX
        .as_ref()
        .is_some_and(|re| re.is_match(glyph).unwrap_or(false))
}

/// Whether the only selection is a caret, or lies within the glyph span
fn is_insert(selections: &[Selection], line: usize, index: usize, len: usize) -> bool {
    let [selection] = selections else {
        return false;
    };
    let (s, e) = (selection.start(), selection.end());
    s == e || (s.line == line && e.line == line && s.column >= index && e.column <= index + len)
}

/// Everything the per-line decision needs, borrowed from the model
pub struct ScanContext<'a> {
    pub document: &'a DocumentState,
    pub provider: &'a dyn ScopeProvider,
    pub resolver: &'a mut ConfigResolver,
    pub pattern: &'a LigaturePattern,
    /// Configuration of the document's own language
    pub doc_config: LanguageConfig,
    /// Root selection mode, for languages configured by shortcut
    pub default_selection_mode: SelectionMode,
    pub toggles: GlobalToggles,
    pub selections: Vec<Selection>,
}

/// One line's text with char <-> byte offset lookup
struct LineText {
    text: String,
    /// Byte offset of each char, plus the text length
    offsets: Vec<usize>,
}

impl LineText {
    fn new(text: String) -> Self {
        let mut offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        offsets.push(text.len());
        Self { text, offsets }
    }

    fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn byte(&self, column: usize) -> usize {
        self.offsets[column.min(self.char_len())]
    }

    fn column(&self, byte: usize) -> usize {
        self.offsets.partition_point(|&b| b < byte)
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        &self.text[self.byte(start)..self.byte(end)]
    }
}

impl ScanContext<'_> {
    /// Decide every pattern match on `line` and append the results to `lists`
    pub fn scan_line(&mut self, line: usize, lists: &mut RangeLists) {
        let text = LineText::new(self.document.line_text(line));
        let mut last_highlight: Option<(LigatureRange, Category)> = None;
        let mut embedded: Option<(String, LanguageConfig)> = None;
        let mut pos = 0;

        while let Some(found) = self.pattern.find_from(&text.text, pos) {
            if found.is_empty() {
                break;
            }
            let index = text.column(found.start);
            let end = text.column(found.end);
            pos = found.end;

            let Some(token) = self.provider.scope_at(self.document.id, line, index) else {
                tracing::trace!("No token at {}:{}, skipping match", line, index);
                continue;
            };

            let matched = text.slice(index, end);
            let mut glyph = matched.to_string();
            let mut category = token.category;
            let scope = token.specific_scope();
            let config = self.language_config(scope, &mut embedded);

            let (suppress, is_debug, mode) = match &config {
                LanguageConfig::Shortcut(enabled) => (
                    !enabled,
                    self.toggles.debug.unwrap_or(false),
                    self.toggles
                        .selection_mode
                        .unwrap_or(self.default_selection_mode),
                ),
                LanguageConfig::Resolved(config) => {
                    let mode = self.toggles.selection_mode.unwrap_or(config.selection_mode);
                    let mut shortened = false;

                    if end > token.end
                        && !BLEED_THROUGHS.contains(&matched)
                        && !(category == Category::String && matched == SLASH3)
                    {
                        shortened = true;
                        let token_end = token.end.max(index + 1);
                        glyph = text.slice(index, token_end).to_string();
                        pos = text.byte(token_end);
                    }

                    let glyph_end = index + glyph.chars().count();
                    if category == Category::Keyword
                        && glyph_end < text.char_len()
                        && is_numeric_prefix(&glyph)
                        && self
                            .provider
                            .scope_at(self.document.id, line, glyph_end)
                            .is_some_and(|next| next.category == Category::Number)
                    {
                        category = Category::Number;
                    }

                    let context = config.context_override(scope, category.as_str());
                    let (set, listed_are_enabled) = match context {
                        Some(c) => (&c.ligatures, c.ligatures_listed_are_enabled),
                        None => (&config.ligatures, config.ligatures_listed_are_enabled),
                    };
                    let is_debug = self
                        .toggles
                        .debug
                        .or(context.map(|c| c.debug))
                        .unwrap_or(config.debug);
                    let suppress = shortened
                        || glyph_in_set(set, &glyph) != listed_are_enabled
                        || !config.matches_context(scope, category.as_str());

                    (suppress, is_debug, mode)
                }
            };

            let len = glyph.chars().count();
            let selected = self.is_selected(mode, line, index, len);

            tracing::trace!(
                "{}:{} {:?} {} suppress={} selected={} debug={}",
                line,
                index,
                glyph,
                category,
                suppress,
                selected,
                is_debug
            );

            if suppress || selected {
                let length = len + self.extension(&text, line, index + len, category);
                let target = if is_debug {
                    &mut lists.debug_breaks
                } else {
                    &mut lists.breaks
                };

                if target
                    .last()
                    .is_some_and(|r| r.start == Position::new(line, index))
                {
                    target.pop();
                }
                target.extend((0..length).map(|j| LigatureRange::on_line(line, index + j, index + j + 1)));
            } else if is_debug {
                let length = len + self.extension(&text, line, index + len, category);
                let mut highlight = LigatureRange::on_line(line, index, index + length);

                if let Some((previous, previous_category)) = last_highlight {
                    let touching = previous.end.column == index || previous.end.column == index + 1;
                    if previous_category == category && touching {
                        lists.highlights.pop();
                        highlight.start = previous.start;
                    }
                }

                lists.highlights.push(highlight);
                last_highlight = Some((highlight, category));
            }
        }
    }

    /// Configuration for a token: the document's, or an embedded language's
    /// inside markup documents (cached across hits on one line)
    fn language_config(
        &mut self,
        scope: Option<&str>,
        embedded: &mut Option<(String, LanguageConfig)>,
    ) -> LanguageConfig {
        let doc_language = self.document.language.as_str();
        let language = scope
            .filter(|_| MARKUP_LANGUAGES.contains(&doc_language))
            .and_then(|s| self.provider.language_for_scope(s))
            .filter(|l| l != doc_language);

        let Some(language) = language else {
            return self.doc_config.clone();
        };

        if let Some((cached, config)) = embedded.as_ref() {
            if *cached == language {
                return config.clone();
            }
        }

        let config = self.resolver.resolve_lenient(Some(&language));
        *embedded = Some((language, config.clone()));
        config
    }

    fn is_selected(&self, mode: SelectionMode, line: usize, index: usize, len: usize) -> bool {
        if mode == SelectionMode::Off || self.selections.is_empty() {
            return false;
        }
        if mode == SelectionMode::Cursor && !is_insert(&self.selections, line, index, len) {
            return false;
        }

        self.selections.iter().any(|s| match mode {
            SelectionMode::Line => s.head.line == line,
            _ => s.touches(line, index, index + len),
        })
    }

    /// 1 when the character after a glyph continues it (`==/`), else 0
    fn extension(&self, text: &LineText, line: usize, char_end: usize, category: Category) -> usize {
        if char_end < 2 || char_end + 1 > text.char_len() {
            return 0;
        }

        let window = text.slice(char_end - 2, char_end + 1);
        let from = if window == "==/" {
            0
        } else {
            text.byte(char_end - 1) - text.byte(char_end - 2)
        };

        let continues = self.pattern.find_from(window, from).is_some()
            && self
                .provider
                .scope_at(self.document.id, line, char_end)
                .is_some_and(|t| t.category == category);

        usize::from(continues)
    }
}
