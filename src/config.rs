//! Settings model and persistence
//!
//! Settings live in `~/.config/ligatures-limited/config.yaml`:
//!
//! ```yaml
//! ligatures:
//!   contexts: "+ string"
//!   ligatures: "- www"
//!   ligaturesByContext:
//!     comment: { debug: true, ligatures: "+ www" }
//!   languages:
//!     "[javascript, typescript]":
//!       selectionMode: line
//!     markdown: false
//! host:
//!   fontLigatures: true
//! timing:
//!   sliceBudgetMs: 100
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// A toggle list: either one string to split, or an explicit list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListSpec {
    Text(String),
    List(Vec<String>),
}

impl ListSpec {
    /// Tokens of this spec. Strings split on whitespace, and also on commas
    /// when `allow_comma`; explicit lists are taken as-is.
    pub fn tokens(&self, allow_comma: bool) -> Vec<String> {
        match self {
            ListSpec::Text(text) => split_list(text, allow_comma),
            ListSpec::List(items) => items.clone(),
        }
    }
}

/// Split a list string into non-empty tokens
pub fn split_list(text: &str, allow_comma: bool) -> Vec<String> {
    text.split(|c: char| c.is_whitespace() || (allow_comma && c == ','))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Per-context ligature override: a bare list, or a list plus a debug flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextSpec {
    List(ListSpec),
    Detailed {
        #[serde(default)]
        debug: Option<bool>,
        #[serde(default)]
        ligatures: Option<ListSpec>,
    },
}

/// A language entry: `true`/`false` shortcut or a full settings block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LanguageOverride {
    Shortcut(bool),
    Settings(Box<LigatureSettings>),
}

/// The ligature configuration block, used both at root and per language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LigatureSettings {
    pub contexts: Option<ListSpec>,
    pub debug: Option<bool>,
    /// Language whose resolved configuration serves as template (not at root)
    pub inherit: Option<String>,
    pub ligatures: Option<ListSpec>,
    /// Keys may name several contexts separated by commas or spaces
    pub ligatures_by_context: BTreeMap<String, ContextSpec>,
    pub selection_mode: Option<String>,
    /// Built-in glyphs the scanner should not know about at all (root only)
    pub disregarded_ligatures: Option<ListSpec>,
    /// Keys may name several languages: `"[javascript, typescript]"`
    pub languages: BTreeMap<String, LanguageOverride>,
    pub max_lines: Option<usize>,
    pub max_file_size: Option<usize>,
}

/// Host editor settings the engine reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostSettings {
    /// Whether the editor renders font ligatures at all
    pub font_ligatures: bool,
    pub languages: BTreeMap<String, HostLanguageSettings>,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            font_ligatures: true,
            languages: BTreeMap::new(),
        }
    }
}

/// Host per-language settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostLanguageSettings {
    pub font_ligatures: Option<bool>,
    /// Ligature settings stored in the host's per-language section
    pub ligatures: Option<LanguageOverride>,
}

/// Scan scheduling constants, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanTiming {
    /// Wall-clock budget of one scan slice
    pub slice_budget_ms: u64,
    /// Pause between slices
    pub yield_ms: u64,
    /// Wait before retrying a review whose tokens aren't ready
    pub parse_retry_ms: u64,
    pub max_parse_attempts: u32,
    /// Debounce after a document opens
    pub open_delay_ms: u64,
    /// How long a reported visible range is preferred over the editor's own
    pub visible_range_freshness_ms: u64,
}

impl Default for ScanTiming {
    fn default() -> Self {
        Self {
            slice_budget_ms: 100,
            yield_ms: 50,
            parse_retry_ms: 250,
            max_parse_attempts: 5,
            open_delay_ms: 100,
            visible_range_freshness_ms: 2000,
        }
    }
}

impl ScanTiming {
    pub fn slice_budget(&self) -> Duration {
        Duration::from_millis(self.slice_budget_ms)
    }

    pub fn yield_delay(&self) -> Duration {
        Duration::from_millis(self.yield_ms)
    }

    pub fn parse_retry(&self) -> Duration {
        Duration::from_millis(self.parse_retry_ms)
    }

    pub fn open_delay(&self) -> Duration {
        Duration::from_millis(self.open_delay_ms)
    }

    pub fn visible_range_freshness(&self) -> Duration {
        Duration::from_millis(self.visible_range_freshness_ms)
    }
}

/// Everything the engine reads from the configuration source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ligatures: LigatureSettings,
    pub host: HostSettings,
    pub timing: ScanTiming,
}

impl Settings {
    /// Load settings from the user config file, or defaults if unavailable
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                tracing::info!("Loaded config from {}", path.display());
                settings
            }
            Err(e) => {
                tracing::warn!("{:#}", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes as null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}
