//! Compiles the ligature vocabulary into a single scanning pattern
//!
//! The pattern is one alternation, longest glyphs first, so a scan prefers
//! `===` over `==` at the same position. Glyphs that also occur inside
//! longer glyphs get negative lookarounds built from the characters that
//! surround them there, so a scan resuming inside `<->` does not report
//! its `->` tail.

use std::collections::{BTreeSet, HashMap};
use std::ops::Range;
use std::sync::LazyLock;

use fancy_regex::Regex;

use super::builtin::BASE_LIGATURES;
use super::error::ConfigError;
use super::resolver::LigatureSet;

/// Characters that chain arrow-like glyphs together
const CONNECTORS: &[char] = &['-', '=', '~'];

/// Hand-authored sub-patterns for glyphs standing in for a family
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("0xF", "0(?:x[0-9a-fA-F]|o[0-7]|b[01])"),
    ("9x9", r"\dx\d"),
    ("####", "#{4,}"),
    ("====", "={4,}"),
];

static SUBSTITUTION_MATCHERS: LazyLock<HashMap<&'static str, Regex>> = LazyLock::new(|| {
    SUBSTITUTIONS
        .iter()
        .filter_map(|(glyph, sub)| match Regex::new(&format!("^(?:{sub})$")) {
            Ok(re) => Some((*glyph, re)),
            Err(e) => {
                tracing::error!("Bad substitution pattern for {}: {}", glyph, e);
                None
            }
        })
        .collect()
});

/// Sub-pattern standing in for `glyph`, if it has one
pub fn substitution_for(glyph: &str) -> Option<&'static str> {
    SUBSTITUTIONS
        .iter()
        .find(|(g, _)| *g == glyph)
        .map(|(_, sub)| *sub)
}

/// The family glyph standing for `glyph`, if its text belongs to one.
///
/// Families are tried in declaration order, so `0x1` is a `0xF` even though
/// `9x9` would also match it.
pub fn family_of(glyph: &str) -> Option<&'static str> {
    SUBSTITUTIONS
        .iter()
        .map(|(member, _)| *member)
        .find(|member| {
            SUBSTITUTION_MATCHERS
                .get(member)
                .is_some_and(|re| re.is_match(glyph).unwrap_or(false))
        })
}

/// Whether `glyph` (as matched in the text) belongs to `set`.
///
/// Family members such as `0xF` match any glyph their sub-pattern matches,
/// so a set listing `0xF` also covers `0x7` and `0b1`.
pub fn glyph_in_set(set: &LigatureSet, glyph: &str) -> bool {
    if set.contains(glyph) {
        return true;
    }

    family_of(glyph).is_some_and(|member| set.contains(member))
}

/// The process-wide set of glyphs the scanning pattern recognizes.
///
/// Grows as configurations mention new glyphs; `generation` changes with
/// every insertion so a stale compiled pattern can be detected.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    glyphs: BTreeSet<String>,
    generation: u64,
}

impl Vocabulary {
    /// Built-in glyphs minus the ones the user asked to disregard
    pub fn with_base(disregarded: &[String]) -> Self {
        let glyphs = BASE_LIGATURES
            .iter()
            .filter(|g| !disregarded.iter().any(|d| d == *g))
            .map(|g| g.to_string())
            .collect();

        Self {
            glyphs,
            generation: 1,
        }
    }

    /// Add a glyph, returning true if it was new
    pub fn insert(&mut self, glyph: &str) -> bool {
        if self.glyphs.contains(glyph) {
            return false;
        }
        self.glyphs.insert(glyph.to_string());
        self.generation += 1;
        true
    }

    pub fn contains(&self, glyph: &str) -> bool {
        self.glyphs.contains(glyph)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.glyphs.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Compiled scanning pattern for one vocabulary generation
#[derive(Debug, Clone)]
pub struct LigaturePattern {
    regex: Regex,
    generation: u64,
}

impl LigaturePattern {
    pub fn compile(vocabulary: &Vocabulary) -> Result<Self, ConfigError> {
        let mut glyphs: Vec<&str> = vocabulary.iter().collect();
        glyphs.sort_by(|a, b| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });

        let source = glyphs
            .iter()
            .map(|glyph| match substitution_for(glyph) {
                Some(sub) => format!("(?:{sub})"),
                None => synthesize(glyph, &glyphs),
            })
            .collect::<Vec<_>>()
            .join("|");

        // Empty alternation would match everywhere
        let source = if source.is_empty() {
            "[^\\s\\S]".to_string()
        } else {
            source
        };

        tracing::debug!(
            "Compiled ligature pattern: {} glyphs, {} bytes",
            glyphs.len(),
            source.len()
        );

        Ok(Self {
            regex: Regex::new(&source)?,
            generation: vocabulary.generation(),
        })
    }

    /// Find the next glyph starting at or after byte offset `pos`.
    ///
    /// Lookbehinds see the text before `pos`, which slicing would hide.
    pub fn find_from(&self, text: &str, pos: usize) -> Option<Range<usize>> {
        if pos > text.len() {
            return None;
        }
        match self.regex.find_from_pos(text, pos) {
            Ok(found) => found.map(|m| m.start()..m.end()),
            Err(e) => {
                tracing::warn!("Ligature scan aborted on line: {}", e);
                None
            }
        }
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Escaped glyph plus lookarounds excluding the characters that surround it
/// inside longer glyphs
fn synthesize(glyph: &str, all: &[&str]) -> String {
    let length = glyph.chars().count();
    let mut before = BTreeSet::new();
    let mut after = BTreeSet::new();

    for other in all.iter().filter(|o| o.chars().count() > length) {
        for (start, _) in other.char_indices() {
            if !other[start..].starts_with(glyph) {
                continue;
            }
            if let Some(c) = other[..start].chars().next_back() {
                before.insert(c);
            }
            if let Some(c) = other[start + glyph.len()..].chars().next() {
                after.insert(c);
            }
        }
    }

    // Bind `<` to a following `|` (and `|` to a following `>`) so `<|>` forms
    if glyph.ends_with('<') {
        after.insert('|');
    }
    if glyph.starts_with('>') {
        before.insert('|');
    }

    if glyph.starts_with(CONNECTORS) {
        before.retain(|c| !CONNECTORS.contains(c));
    }
    if glyph.ends_with(CONNECTORS) {
        after.retain(|c| !CONNECTORS.contains(c));
    }

    let mut out = String::new();
    if !before.is_empty() {
        out.push_str("(?<!");
        out.push_str(&char_class(&before));
        out.push(')');
    }
    out.push_str(&fancy_regex::escape(glyph));
    if !after.is_empty() {
        out.push_str("(?!");
        out.push_str(&char_class(&after));
        out.push(')');
    }
    out
}

fn char_class(chars: &BTreeSet<char>) -> String {
    let mut class = String::from("[");
    for &c in chars {
        if matches!(c, '\\' | '[' | ']' | '^' | '-' | '&' | '~') {
            class.push('\\');
        }
        class.push(c);
    }
    class.push(']');
    class
}
