//! Scope tables built from highlight captures
//!
//! Tree-sitter capture names (`@keyword`, `@punctuation.bracket`, ...) are
//! turned into dotted TextMate-style scopes so the classifier sees the same
//! names a grammar-based tokenizer would produce. Text no capture covers is
//! split into operator, bracket and plain runs.

/// Capture name prefix -> scope stem. Longest matching prefix wins.
const CAPTURE_SCOPES: &[(&str, &str)] = &[
    ("attribute", "entity.other.attribute-name"),
    ("boolean", "constant.language"),
    ("comment", "comment.line"),
    ("constant", "constant.other"),
    ("constant.builtin", "constant.language"),
    ("constructor", "entity.name.type"),
    ("escape", "constant.character.escape"),
    ("function", "entity.name.function"),
    ("function.builtin", "support.function"),
    ("function.macro", "entity.name.function.macro"),
    ("keyword", "keyword.control"),
    ("keyword.operator", "keyword.operator"),
    ("label", "entity.name.label"),
    ("module", "entity.name.namespace"),
    ("namespace", "entity.name.namespace"),
    ("number", "constant.numeric"),
    ("operator", "keyword.operator"),
    ("property", "variable.other.property"),
    ("punctuation", "punctuation"),
    ("punctuation.bracket", "punctuation.section"),
    ("punctuation.delimiter", "punctuation.separator"),
    ("punctuation.special", "punctuation.special"),
    ("string", "string.quoted"),
    ("string.escape", "constant.character.escape"),
    ("string.regex", "string.regexp"),
    ("string.regexp", "string.regexp"),
    ("string.special", "string.other"),
    ("tag", "entity.name.tag"),
    ("type", "entity.name.type"),
    ("type.builtin", "support.type"),
    ("variable", "variable.other"),
    ("variable.builtin", "variable.language"),
    ("variable.parameter", "variable.parameter"),
];

/// Comment openers, longest first
const COMMENT_OPENERS: &[&str] = &["///", "//!", "/**", "//", "/*", "#"];

const OPERATOR_CHARS: &str = "!#$%&*+-./:<=>?@\\^|~";
const BRACKET_CHARS: &str = "()[]{}";

/// Scope for a capture name in a language, e.g. `operator` in Rust ->
/// `keyword.operator.rust`
pub fn scope_for_capture(capture: &str, suffix: &str) -> Option<String> {
    CAPTURE_SCOPES
        .iter()
        .filter(|(name, _)| {
            capture == *name
                || capture
                    .strip_prefix(name)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
        .max_by_key(|(name, _)| name.len())
        .map(|(_, stem)| format!("{}.{}", stem, suffix))
}

/// A run of characters sharing one scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineToken {
    /// Start column (chars, inclusive)
    pub start: usize,
    /// End column (chars, exclusive)
    pub end: usize,
    /// Innermost scope; `None` for text only the language scope covers
    pub scope: Option<String>,
}

/// Tokens of one line, covering it without gaps
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTokens {
    pub tokens: Vec<LineToken>,
}

impl LineTokens {
    /// The token covering `column`
    pub fn token_at(&self, column: usize) -> Option<&LineToken> {
        let index = self.tokens.partition_point(|t| t.end <= column);
        self.tokens.get(index).filter(|t| t.start <= column)
    }

    /// Collapse a per-char paint buffer into tokens. `paint[i]` is the
    /// capture covering char `i`, indexing into `scopes`.
    pub fn from_paint(
        chars: &[char],
        paint: &[Option<usize>],
        scopes: &[String],
        suffix: &str,
    ) -> Self {
        let mut tokens = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let capture = paint.get(start).copied().flatten();
            let mut end = start + 1;
            while end < chars.len() && paint.get(end).copied().flatten() == capture {
                end += 1;
            }

            match capture {
                Some(index) => {
                    let scope = &scopes[index];
                    if scope.starts_with("comment.") {
                        split_comment(&chars[start..end], start, scope, suffix, &mut tokens);
                    } else {
                        tokens.push(LineToken {
                            start,
                            end,
                            scope: Some(scope.clone()),
                        });
                    }
                }
                None => split_gap(&chars[start..end], start, suffix, &mut tokens),
            }
            start = end;
        }

        Self { tokens }
    }
}

/// Split a comment run into opener, body and closer tokens
fn split_comment(
    chars: &[char],
    offset: usize,
    scope: &str,
    suffix: &str,
    tokens: &mut Vec<LineToken>,
) {
    let marker = format!("punctuation.definition.comment.{}", suffix);
    let text: String = chars.iter().collect();

    let opener = COMMENT_OPENERS
        .iter()
        .find(|o| text.starts_with(*o))
        .map_or(0, |o| o.chars().count());
    let closer = if text.len() >= opener + 2 && text.ends_with("*/") {
        2
    } else {
        0
    };

    let mut push = |start: usize, end: usize, scope: &str| {
        if start < end {
            tokens.push(LineToken {
                start: offset + start,
                end: offset + end,
                scope: Some(scope.to_string()),
            });
        }
    };

    push(0, opener, &marker);
    push(opener, chars.len() - closer, scope);
    push(chars.len() - closer, chars.len(), &marker);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GapClass {
    Operator,
    Bracket,
    Other,
}

fn gap_class(c: char) -> GapClass {
    if OPERATOR_CHARS.contains(c) {
        GapClass::Operator
    } else if BRACKET_CHARS.contains(c) {
        GapClass::Bracket
    } else {
        GapClass::Other
    }
}

/// Split uncaptured text into operator runs, single brackets and the rest
fn split_gap(chars: &[char], offset: usize, suffix: &str, tokens: &mut Vec<LineToken>) {
    let mut start = 0;
    while start < chars.len() {
        let class = gap_class(chars[start]);
        let mut end = start + 1;
        if class != GapClass::Bracket {
            while end < chars.len() && gap_class(chars[end]) == class {
                end += 1;
            }
        }

        let scope = match class {
            GapClass::Operator => Some(format!("keyword.operator.{}", suffix)),
            GapClass::Bracket => Some(format!("punctuation.section.{}", suffix)),
            GapClass::Other => None,
        };
        tokens.push(LineToken {
            start: offset + start,
            end: offset + end,
            scope,
        });
        start = end;
    }
}
