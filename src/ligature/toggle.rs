//! Toggle-list mini-language for ligature and context sets
//!
//! A specification is a whitespace (or, for contexts, comma) separated list
//! of tokens. Literal tokens are glyphs or context names; single characters
//! are directives:
//!
//! | Token     | Ligature lists                          | Context lists        |
//! |-----------|-----------------------------------------|----------------------|
//! | `+`       | enable the following glyphs             | add following names  |
//! | `-`       | disable the following glyphs            | remove following     |
//! | `0` / `O` | clear, following glyphs are the enabled set | clear, then add  |
//! | `X`       | clear, following glyphs are the disabled set | (invalid)       |
//!
//! Whether "enable" inserts or removes depends on the list's polarity
//! (`listed_are_enabled`), which `0`/`X` switch.

use super::error::ConfigError;
use super::pattern::Vocabulary;
use super::resolver::{ContextSet, LigatureSet};
use crate::config::ListSpec;

/// What the interpreter does with the next literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// No directive seen yet: literals are only registered
    Register,
    Insert,
    Remove,
}

/// Apply a ligature specification to `set`, returning the new polarity.
///
/// Every literal glyph is added to `vocabulary`, whatever the mode, so the
/// scanning pattern can still recognize a glyph this set ends up excluding.
pub fn apply_ligature_list(
    set: &mut LigatureSet,
    spec: Option<&ListSpec>,
    mut listed_are_enabled: bool,
    vocabulary: &mut Vocabulary,
) -> Result<bool, ConfigError> {
    let Some(spec) = spec else {
        return Ok(listed_are_enabled);
    };

    let mut mode = Mode::Register;

    for token in spec.tokens(false) {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (None, _) => continue,
            (Some(c), None) => match c.to_ascii_uppercase() {
                '+' => {
                    mode = if listed_are_enabled {
                        Mode::Insert
                    } else {
                        Mode::Remove
                    };
                }
                '-' => {
                    mode = if listed_are_enabled {
                        Mode::Remove
                    } else {
                        Mode::Insert
                    };
                }
                '0' | 'O' => {
                    set.clear();
                    listed_are_enabled = true;
                    mode = Mode::Insert;
                }
                'X' => {
                    set.clear();
                    listed_are_enabled = false;
                    mode = Mode::Insert;
                }
                _ => return Err(ConfigError::InvalidSpecification(token)),
            },
            _ => {
                vocabulary.insert(&token);

                match mode {
                    Mode::Insert => {
                        set.insert(token);
                    }
                    Mode::Remove => {
                        set.remove(&token);
                    }
                    Mode::Register => {}
                }
            }
        }
    }

    Ok(listed_are_enabled)
}

/// Apply a context specification to `set`. Contexts are additive by default.
pub fn apply_context_list(set: &mut ContextSet, spec: Option<&ListSpec>) -> Result<(), ConfigError> {
    let Some(spec) = spec else {
        return Ok(());
    };

    let mut enable = true;

    for token in spec.tokens(true) {
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (None, _) => continue,
            (Some(c), None) => match c.to_ascii_uppercase() {
                '+' => enable = true,
                '-' => enable = false,
                '0' | 'O' => {
                    set.clear();
                    enable = true;
                }
                _ => return Err(ConfigError::InvalidSpecification(token)),
            },
            _ => {
                if enable {
                    set.insert(token);
                } else {
                    set.remove(&token);
                }
            }
        }
    }

    Ok(())
}
