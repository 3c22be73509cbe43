//! Built-in ligature vocabulary and root defaults

use std::collections::BTreeMap;

use super::resolver::{ContextOverride, ContextSet, LigatureSet, ResolvedConfig, SelectionMode};

/// Every glyph sequence the engine recognizes out of the box.
///
/// `0xF` and `9x9` stand for whole families (hex/octal/binary prefixes and
/// dimension-like `3x4`), `####` and `====` for unbounded runs; see
/// `pattern::substitution_for`.
pub const BASE_LIGATURES: &[&str] = &[
    ".=", ".-", ":=", "=:=", "==", "!=", "===", "!==", "=/=", "<-<", "<<-", "<--", "<-", "<->",
    "->", "-->", "->>", ">->", "<=<", "<<=", "<==", "<=>", "=>", "==>", "=>>", ">=>", ">>=", ">>-",
    ">-", "<~>", "-<", "-<<", "=<<", "<~~", "<~", "~~", "~>", "~~>", "<<<", "<<", "<=", "<>", ">=",
    ">>", ">>>", "{.", "{|", "[|", "<:", ":>", "|]", "|}", ".}", "<|||", "<||", "<|", "<|>", "|>",
    "||>", "|||>", "<$", "<$>", "$>", "<+", "<+>", "+>", "<*", "<*>", "*>", "\\\\", "\\\\\\",
    "\\*", "/*", "*/", "///", "//", "<//", "<!--", "</>", "/>", ";;", "::", ":::", "..", "...",
    "..<", "!!", "??", "%%", "&&", "||", "?.", "?:", "++", "+++", "--", "---", "**", "***", "~=",
    "~-", "www", "ff", "fi", "fl", "ffi", "ffl", "0xF", "9x9", "-~", "~@", "^=", "?=", "/=", "/==",
    "|=", "||=", "#!", "##", "###", "####", "====", "#{", "#[", "]#", "#(", "#?", "#_", "#_(",
];

/// Glyphs disabled everywhere unless a configuration says otherwise
pub const BASE_DISABLED_LIGATURES: &[&str] = &["ff", "fi", "fl", "ffi", "ffl", "0xF", "9x9"];

/// Contexts in which ligatures render by default
pub const BASE_CONTEXTS: &[&str] = &["operator", "comment_marker", "punctuation", "number"];

/// Glyphs that may legitimately extend past their token's end
pub const BLEED_THROUGHS: &[&str] = &["?:", "+=", "-=", "*=", "/=", "^="];

/// Triple backslash, allowed to run across string token boundaries
pub const SLASH3: &str = "\\\\\\";

pub const DEFAULT_MAX_LINES: usize = 20_000;
pub const DEFAULT_MAX_FILE_SIZE: usize = 35_000_000;

fn to_set(items: &[&str]) -> LigatureSet {
    items.iter().map(|s| s.to_string()).collect()
}

/// The template the root configuration is built from
pub fn base_config() -> ResolvedConfig {
    // Numbers keep 0x-style prefixes as ligatures but still drop the rest
    let mut number_ligatures = to_set(BASE_DISABLED_LIGATURES);
    number_ligatures.remove("0xF");

    let mut ligatures_by_context = BTreeMap::new();
    ligatures_by_context.insert(
        "number".to_string(),
        ContextOverride {
            debug: false,
            ligatures: number_ligatures,
            ligatures_listed_are_enabled: false,
        },
    );

    ResolvedConfig {
        contexts: BASE_CONTEXTS.iter().map(|s| s.to_string()).collect::<ContextSet>(),
        debug: false,
        ligatures: to_set(BASE_DISABLED_LIGATURES),
        ligatures_listed_are_enabled: false,
        selection_mode: SelectionMode::Cursor,
        ligatures_by_context,
        deactivated: false,
        max_lines: DEFAULT_MAX_LINES,
        max_file_size: DEFAULT_MAX_FILE_SIZE,
    }
}
