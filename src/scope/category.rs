//! Scope classification
//!
//! Maps a tokenizer scope stack onto the small set of categories the
//! configuration speaks in. Rules are tried in order and the first match
//! wins, so e.g. `keyword.operator` is an operator before it is a keyword.

use std::fmt;
use std::sync::LazyLock;

use fancy_regex::Regex;

/// Coarse lexical category of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Regexp,
    Operator,
    String,
    CommentMarker,
    Comment,
    PropertyName,
    PropertyValue,
    Type,
    Keyword,
    Variable,
    Number,
    Constant,
    Scope,
    Function,
    Tag,
    AttributeName,
    Text,
    Punctuation,
    Invalid,
    Identifier,
    Other,
}

impl Category {
    /// Name used for this category in context lists
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Regexp => "regexp",
            Category::Operator => "operator",
            Category::String => "string",
            Category::CommentMarker => "comment_marker",
            Category::Comment => "comment",
            Category::PropertyName => "property_name",
            Category::PropertyValue => "property_value",
            Category::Type => "type",
            Category::Keyword => "keyword",
            Category::Variable => "variable",
            Category::Number => "number",
            Category::Constant => "constant",
            Category::Scope => "scope",
            Category::Function => "function",
            Category::Tag => "tag",
            Category::AttributeName => "attribute_name",
            Category::Text => "text",
            Category::Punctuation => "punctuation",
            Category::Invalid => "invalid",
            Category::Identifier => "identifier",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered classification rules over the most specific scope
const RULES: &[(&str, Category)] = &[
    (r"(^|\.)regexp(\.|$)", Category::Regexp),
    (
        r"^(keyword\.operator|punctuation\.accessor|punctuation\.separator\.(arrow|pointer-access|namespace|scope-resolution)|storage\.type\.function\.arrow|punctuation\.definition\.arrow)(\.|$)",
        Category::Operator,
    ),
    (r"^(string|punctuation\.definition\.string)(\.|$)", Category::String),
    (r"^punctuation\.definition\.comment(\.|$)", Category::CommentMarker),
    (r"^comment(\.|$)", Category::Comment),
    (
        r"^(support\.type\.property-name|meta\.object-literal\.key|variable\.other\.(object\.)?property)(\.|$)",
        Category::PropertyName,
    ),
    (
        r"^(support\.constant\.property-value|meta\.property-value|constant\.other\.color)(\.|$)",
        Category::PropertyValue,
    ),
    (
        r"^(entity\.name\.(type|class|namespace)|support\.(type|class)|entity\.other\.inherited-class)(\.|$)",
        Category::Type,
    ),
    (
        r"^(keyword|storage\.(type|modifier)|variable\.language|constant\.language\.(this|super|self))(\.|$)",
        Category::Keyword,
    ),
    (r"^(variable|entity\.name\.variable|meta\.definition\.variable)(\.|$)", Category::Variable),
    (r"^constant\.numeric(\.|$)", Category::Number),
    (r"^(constant|support\.constant)(\.|$)", Category::Constant),
    (
        r"^(punctuation\.separator\.(double-colon|colon\.scope)|meta\.scope-resolution)(\.|$)",
        Category::Scope,
    ),
    (
        r"^(entity\.name\.function|support\.function|meta\.function-call)(\.|$)",
        Category::Function,
    ),
    (r"^(entity\.name\.tag|punctuation\.definition\.tag)(\.|$)", Category::Tag),
    (r"^entity\.other\.attribute-name(\.|$)", Category::AttributeName),
    (r"^text(\.|$)", Category::Text),
    (r"^(punctuation|meta\.brace)(\.|$)", Category::Punctuation),
    (r"\.(markdown|md)$", Category::Text),
];

static COMPILED_RULES: LazyLock<Vec<(Regex, Category)>> = LazyLock::new(|| {
    RULES
        .iter()
        .filter_map(|(pattern, category)| match Regex::new(pattern) {
            Ok(re) => Some((re, *category)),
            Err(e) => {
                tracing::error!("Bad scope rule for {}: {}", category, e);
                None
            }
        })
        .collect()
});

static ESCAPE_SCOPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(constant\.character\.escape|invalid)(\.|$)").ok());

static WRAPPER_SCOPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(meta|source)(\.|$)").ok());

static IDENTIFIER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[\p{L}\p{M}_][\p{L}\p{M}\p{Nd}_]*$").ok());

fn is_match(re: &LazyLock<Option<Regex>>, text: &str) -> bool {
    re.as_ref()
        .is_some_and(|re| re.is_match(text).unwrap_or(false))
}

/// Scope a token is classified by: the innermost one, or its
/// parent when the innermost one is an escape or invalid marker
pub fn effective_scope(scopes: &[String]) -> Option<&str> {
    let (last, rest) = scopes.split_last()?;
    match rest.last() {
        Some(parent) if is_match(&ESCAPE_SCOPE, last) => Some(parent),
        _ => Some(last),
    }
}

/// Classify a token by its scope stack (outermost first) and text
pub fn classify(scopes: &[String], text: &str) -> Category {
    let scope = effective_scope(scopes).unwrap_or("");

    if !scope.is_empty() {
        for (re, category) in COMPILED_RULES.iter() {
            if re.is_match(scope).unwrap_or(false) {
                return *category;
            }
        }
    }

    if text.chars().all(char::is_whitespace) {
        Category::Invalid
    } else if (scope.is_empty() || is_match(&WRAPPER_SCOPE, scope)) && is_match(&IDENTIFIER, text)
    {
        Category::Identifier
    } else {
        Category::Other
    }
}
