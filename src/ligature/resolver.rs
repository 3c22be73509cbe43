//! Per-language configuration resolution
//!
//! `ConfigResolver` owns every cache the engine shares across documents:
//! the resolved root configuration, the language→config map, the glyph
//! vocabulary and the compiled scanning pattern. A settings change drops
//! them all and they are rebuilt lazily on the next request.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::builtin::base_config;
use super::error::ConfigError;
use super::pattern::{LigaturePattern, Vocabulary};
use super::toggle::{apply_context_list, apply_ligature_list};
use crate::config::{split_list, ContextSpec, LanguageOverride, LigatureSettings, Settings};

pub type LigatureSet = BTreeSet<String>;
pub type ContextSet = BTreeSet<String>;

/// When the glyph under (or near) the selection is forced apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum SelectionMode {
    /// Only a glyph the single caret touches
    #[default]
    Cursor,
    /// Every glyph on a line holding a caret
    Line,
    Off,
    /// Every glyph a selection range intersects
    Selection,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Cursor => "cursor",
            SelectionMode::Line => "line",
            SelectionMode::Off => "off",
            SelectionMode::Selection => "selection",
        }
    }
}

impl FromStr for SelectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cursor" => Ok(SelectionMode::Cursor),
            "line" => Ok(SelectionMode::Line),
            "off" => Ok(SelectionMode::Off),
            "selection" => Ok(SelectionMode::Selection),
            _ => Err(ConfigError::InvalidSelectionMode(s.to_string())),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ligature rules for one context within a language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOverride {
    pub debug: bool,
    pub ligatures: LigatureSet,
    pub ligatures_listed_are_enabled: bool,
}

/// A fully resolved configuration; nothing is left unset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub contexts: ContextSet,
    pub debug: bool,
    pub ligatures: LigatureSet,
    pub ligatures_listed_are_enabled: bool,
    pub selection_mode: SelectionMode,
    pub ligatures_by_context: BTreeMap<String, ContextOverride>,
    /// Host renders no ligatures for this language
    pub deactivated: bool,
    pub max_lines: usize,
    pub max_file_size: usize,
}

impl ResolvedConfig {
    /// All-empty, all-off configuration answered when the root fails
    pub fn fallback() -> Self {
        Self {
            contexts: ContextSet::new(),
            debug: false,
            ligatures: LigatureSet::new(),
            ligatures_listed_are_enabled: false,
            selection_mode: SelectionMode::Off,
            ligatures_by_context: BTreeMap::new(),
            deactivated: false,
            max_lines: 0,
            max_file_size: 0,
        }
    }

    /// Most specific context override: exact scope, then category, then the
    /// scope with trailing segments dropped one at a time
    pub fn context_override(&self, scope: Option<&str>, category: &str) -> Option<&ContextOverride> {
        if self.ligatures_by_context.is_empty() {
            return None;
        }

        if let Some(found) = scope.and_then(|s| self.ligatures_by_context.get(s)) {
            return Some(found);
        }
        if let Some(found) = self.ligatures_by_context.get(category) {
            return Some(found);
        }

        scope_prefixes(scope?)
            .skip(1)
            .find_map(|prefix| self.ligatures_by_context.get(prefix))
    }

    /// Whether the category, or the scope or any of its prefixes, is a
    /// context in which ligatures may render
    pub fn matches_context(&self, scope: Option<&str>, category: &str) -> bool {
        if self.contexts.contains(category) {
            return true;
        }
        scope.is_some_and(|s| scope_prefixes(s).any(|prefix| self.contexts.contains(prefix)))
    }
}

/// `a.b.c`, `a.b`, `a`
fn scope_prefixes(scope: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(scope), |s| s.rfind('.').map(|i| &s[..i]))
        .filter(|s| !s.is_empty())
}

/// A language's configuration: a plain on/off shortcut or a resolved record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageConfig {
    /// `true`: ligatures render everywhere; `false`: suppressed everywhere
    Shortcut(bool),
    Resolved(Arc<ResolvedConfig>),
}

/// Lazily resolves and caches configurations per language
#[derive(Debug)]
pub struct ConfigResolver {
    settings: Settings,
    /// Individual language name -> key in `settings.ligatures.languages`
    language_keys: HashMap<String, String>,
    vocabulary: Vocabulary,
    pattern: Option<Arc<LigaturePattern>>,
    default: Option<Result<Arc<ResolvedConfig>, ConfigError>>,
    languages: HashMap<String, Result<LanguageConfig, ConfigError>>,
    /// Languages currently being resolved, outermost first
    chain: Vec<String>,
    /// First failure since the last reset, for one user-facing message
    pending_notice: Option<String>,
    fallback: Arc<ResolvedConfig>,
}

impl ConfigResolver {
    pub fn new(settings: Settings) -> Self {
        let mut resolver = Self {
            settings: Settings::default(),
            language_keys: HashMap::new(),
            vocabulary: Vocabulary::default(),
            pattern: None,
            default: None,
            languages: HashMap::new(),
            chain: Vec::new(),
            pending_notice: None,
            fallback: Arc::new(ResolvedConfig::fallback()),
        };
        resolver.set_settings(settings);
        resolver
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings and drop every cached configuration
    pub fn set_settings(&mut self, settings: Settings) {
        self.language_keys = settings
            .ligatures
            .languages
            .keys()
            .flat_map(|key| {
                let names = key.replace(['[', ']'], "");
                split_list(&names, true)
                    .into_iter()
                    .map(move |name| (name, key.clone()))
            })
            .collect();
        self.settings = settings;
        self.reset();
    }

    /// Drop all cached configurations; they are rebuilt on next access
    pub fn reset(&mut self) {
        self.default = None;
        self.languages.clear();
        self.chain.clear();
        self.pattern = None;
        self.pending_notice = None;
        tracing::debug!("Configuration caches cleared");
    }

    /// Resolve the root configuration (`None`) or a language's
    pub fn resolve(&mut self, language: Option<&str>) -> Result<LanguageConfig, ConfigError> {
        let Some(language) = language else {
            return self.resolve_default().map(LanguageConfig::Resolved);
        };

        if let Some(cached) = self.languages.get(language) {
            return cached.clone();
        }

        if self.chain.iter().any(|l| l == language) {
            return Err(ConfigError::UnresolvedInheritance(self.chain.clone()));
        }

        self.chain.push(language.to_string());
        let result = self.build_language(language);
        self.chain.pop();

        if let Err(e) = &result {
            self.record_failure(Some(language), e);
        }
        self.languages.insert(language.to_string(), result.clone());
        result
    }

    /// Resolve, answering failures with a fail-open fallback.
    ///
    /// The failure itself was logged (once) when it was cached.
    pub fn resolve_lenient(&mut self, language: Option<&str>) -> LanguageConfig {
        match self.resolve(language) {
            Ok(config) => config,
            Err(_) if language.is_none() => LanguageConfig::Resolved(self.fallback.clone()),
            Err(_) => LanguageConfig::Shortcut(true),
        }
    }

    /// The root configuration, or the all-off fallback if it failed
    pub fn default_config(&mut self) -> Arc<ResolvedConfig> {
        match self.resolve_default() {
            Ok(config) => config,
            Err(_) => self.fallback.clone(),
        }
    }

    /// Current scanning pattern, compiling it if needed
    pub fn pattern(&mut self) -> Option<Arc<LigaturePattern>> {
        let _ = self.resolve_default();
        if let Err(e) = self.refresh_pattern() {
            tracing::error!("{}", e);
        }
        self.pattern.clone()
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Message for the first resolution failure since the last reset
    pub fn take_notice(&mut self) -> Option<String> {
        self.pending_notice.take()
    }

    fn record_failure(&mut self, language: Option<&str>, error: &ConfigError) {
        match language {
            Some(language) => {
                tracing::error!("Ligature configuration for {} failed: {}", language, error)
            }
            None => tracing::error!("Ligature configuration failed: {}", error),
        }
        if self.pending_notice.is_none() {
            self.pending_notice = Some(format!("Ligatures Limited: {}", error));
        }
    }

    fn resolve_default(&mut self) -> Result<Arc<ResolvedConfig>, ConfigError> {
        if let Some(cached) = &self.default {
            return cached.clone();
        }

        let result = self.build_default();
        if let Err(e) = &result {
            self.record_failure(None, e);
        }
        self.default = Some(result.clone());
        result
    }

    fn build_default(&mut self) -> Result<Arc<ResolvedConfig>, ConfigError> {
        let root = self.settings.ligatures.clone();
        let disregarded = root
            .disregarded_ligatures
            .as_ref()
            .map(|spec| spec.tokens(false))
            .unwrap_or_default();

        self.vocabulary = Vocabulary::with_base(&disregarded);
        self.refresh_pattern()?;

        if root.inherit.is_some() {
            return Err(ConfigError::InvalidRootInherit);
        }

        let config = self.apply_settings(&base_config(), &root)?;
        self.refresh_pattern()?;

        tracing::debug!(
            "Resolved root configuration: {} contexts, {} listed glyphs",
            config.contexts.len(),
            config.ligatures.len()
        );
        Ok(Arc::new(config))
    }

    fn build_language(&mut self, language: &str) -> Result<LanguageConfig, ConfigError> {
        let default = self.resolve_default()?;
        let deactivated = self.host_deactivated(language);

        let settings = match self.language_override(language) {
            None => {
                let mut config = (*default).clone();
                config.deactivated = deactivated;
                return Ok(LanguageConfig::Resolved(Arc::new(config)));
            }
            Some(LanguageOverride::Shortcut(enabled)) => {
                return Ok(LanguageConfig::Shortcut(enabled));
            }
            Some(LanguageOverride::Settings(settings)) => settings,
        };

        let template = match &settings.inherit {
            Some(parent) => match self.resolve(Some(parent))? {
                LanguageConfig::Shortcut(enabled) => return Ok(LanguageConfig::Shortcut(enabled)),
                LanguageConfig::Resolved(config) => config,
            },
            None => default,
        };

        let mut config = self.apply_settings(&template, &settings)?;
        config.deactivated = deactivated;
        self.refresh_pattern()?;

        tracing::debug!(
            "Resolved configuration for {}{}",
            language,
            settings
                .inherit
                .as_ref()
                .map(|p| format!(" (inherits {})", p))
                .unwrap_or_default()
        );
        Ok(LanguageConfig::Resolved(Arc::new(config)))
    }

    /// The language's own override, preferring this engine's `languages`
    /// map over the host's per-language section
    fn language_override(&self, language: &str) -> Option<LanguageOverride> {
        if let Some(key) = self.language_keys.get(language) {
            return self.settings.ligatures.languages.get(key).cloned();
        }
        self.settings
            .host
            .languages
            .get(language)
            .and_then(|host| host.ligatures.clone())
    }

    fn host_deactivated(&self, language: &str) -> bool {
        let host = &self.settings.host;
        !host
            .languages
            .get(language)
            .and_then(|l| l.font_ligatures)
            .unwrap_or(host.font_ligatures)
    }

    /// Clone `template` and apply one settings block on top of it
    fn apply_settings(
        &mut self,
        template: &ResolvedConfig,
        settings: &LigatureSettings,
    ) -> Result<ResolvedConfig, ConfigError> {
        let mut config = template.clone();

        if let Some(debug) = settings.debug {
            config.debug = debug;
        }
        if let Some(mode) = &settings.selection_mode {
            config.selection_mode = mode.parse()?;
        }
        if let Some(max_lines) = settings.max_lines {
            config.max_lines = max_lines;
        }
        if let Some(max_file_size) = settings.max_file_size {
            config.max_file_size = max_file_size;
        }

        apply_context_list(&mut config.contexts, settings.contexts.as_ref())?;
        config.ligatures_listed_are_enabled = apply_ligature_list(
            &mut config.ligatures,
            settings.ligatures.as_ref(),
            config.ligatures_listed_are_enabled,
            &mut self.vocabulary,
        )?;

        for (key, spec) in &settings.ligatures_by_context {
            let contexts = split_list(key, true);
            if contexts.is_empty() {
                continue;
            }

            let (debug, list) = match spec {
                ContextSpec::List(list) => (config.debug, Some(list)),
                ContextSpec::Detailed { debug, ligatures } => {
                    (debug.unwrap_or(config.debug), ligatures.as_ref())
                }
            };

            let mut entry = ContextOverride {
                debug,
                ligatures: config.ligatures.clone(),
                ligatures_listed_are_enabled: config.ligatures_listed_are_enabled,
            };
            entry.ligatures_listed_are_enabled = apply_ligature_list(
                &mut entry.ligatures,
                list,
                entry.ligatures_listed_are_enabled,
                &mut self.vocabulary,
            )?;

            for context in contexts {
                config.contexts.insert(context.clone());
                config.ligatures_by_context.insert(context, entry.clone());
            }
        }

        Ok(config)
    }

    /// Recompile the pattern if the vocabulary grew since the last compile
    fn refresh_pattern(&mut self) -> Result<(), ConfigError> {
        let stale = self
            .pattern
            .as_ref()
            .is_none_or(|p| p.generation() != self.vocabulary.generation());

        if stale {
            self.pattern = Some(Arc::new(LigaturePattern::compile(&self.vocabulary)?));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn resolver(yaml: &str) -> ConfigResolver {
        ConfigResolver::new(Settings::from_yaml_str(yaml).unwrap())
    }

    fn resolved(config: LanguageConfig) -> Arc<ResolvedConfig> {
        match config {
            LanguageConfig::Resolved(c) => c,
            LanguageConfig::Shortcut(b) => panic!("expected resolved config, got shortcut {b}"),
        }
    }

    #[test]
    fn test_selection_mode_parse_is_case_insensitive() {
        assert_eq!("LINE".parse::<SelectionMode>().unwrap(), SelectionMode::Line);
        assert_eq!(
            "sideways".parse::<SelectionMode>().unwrap_err(),
            ConfigError::InvalidSelectionMode("sideways".into())
        );
    }

    #[test]
    fn test_default_config_uses_builtin_base() {
        let mut r = resolver("");
        let config = r.default_config();

        assert!(config.contexts.contains("operator"));
        assert!(config.ligatures.contains("ff"));
        assert!(!config.ligatures_listed_are_enabled);
        assert_eq!(config.selection_mode, SelectionMode::Cursor);
        assert!(r.pattern().is_some());
    }

    #[test]
    fn test_language_without_override_matches_default() {
        let mut r = resolver("ligatures: { contexts: '+ string' }");
        let default = r.default_config();
        let rust = resolved(r.resolve(Some("rust")).unwrap());

        assert_eq!(*rust, *default);
    }

    #[test]
    fn test_language_key_names_several_languages() {
        let mut r = resolver(
            "ligatures: { languages: { '[javascript, typescript]': { selectionMode: line } } }",
        );

        for lang in ["javascript", "typescript"] {
            let config = resolved(r.resolve(Some(lang)).unwrap());
            assert_eq!(config.selection_mode, SelectionMode::Line);
        }
    }

    #[test]
    fn test_host_language_section_is_fallback() {
        let mut r = resolver(
            r#"
host:
  languages:
    python:
      ligatures: false
    go:
      fontLigatures: false
"#,
        );

        assert_eq!(r.resolve(Some("python")).unwrap(), LanguageConfig::Shortcut(false));
        assert!(resolved(r.resolve(Some("go")).unwrap()).deactivated);
        assert!(!resolved(r.resolve(Some("c")).unwrap()).deactivated);
    }

    #[test]
    fn test_inherit_uses_parent_as_template() {
        let mut r = resolver(
            r#"
ligatures:
  languages:
    base: { ligatures: "+ www", debug: true }
    child: { inherit: base, contexts: "+ string" }
"#,
        );

        let child = resolved(r.resolve(Some("child")).unwrap());
        assert!(child.debug);
        assert!(child.contexts.contains("string"));
        // `+` on a disabled-list removes from the suppressed set
        assert!(!child.ligatures.contains("www"));
    }

    #[test]
    fn test_inherit_from_shortcut_short_circuits() {
        let mut r = resolver("ligatures: { languages: { a: false, b: { inherit: a } } }");
        assert_eq!(r.resolve(Some("b")).unwrap(), LanguageConfig::Shortcut(false));
    }

    #[test]
    fn test_inheritance_cycle_names_both_languages() {
        let yaml = "ligatures: { languages: { a: { inherit: b }, b: { inherit: a } } }";

        for entry in ["a", "b"] {
            let mut r = resolver(yaml);
            let err = r.resolve(Some(entry)).unwrap_err();
            let ConfigError::UnresolvedInheritance(chain) = &err else {
                panic!("unexpected error {err:?}");
            };
            assert!(chain.contains(&"a".to_string()));
            assert!(chain.contains(&"b".to_string()));
            assert_eq!(r.resolve_lenient(Some(entry)), LanguageConfig::Shortcut(true));
        }
    }

    #[test]
    fn test_root_inherit_rejected_with_fallback() {
        let mut r = resolver("ligatures: { inherit: rust }");

        assert_eq!(r.resolve(None).unwrap_err(), ConfigError::InvalidRootInherit);
        assert_eq!(*r.default_config(), ResolvedConfig::fallback());
        assert_eq!(r.resolve_lenient(Some("rust")), LanguageConfig::Shortcut(true));
        assert!(r.take_notice().is_some());
        assert!(r.take_notice().is_none());
    }

    #[test]
    fn test_invalid_selection_mode() {
        let mut r = resolver("ligatures: { languages: { rust: { selectionMode: sometimes } } }");
        assert_eq!(
            r.resolve(Some("rust")).unwrap_err(),
            ConfigError::InvalidSelectionMode("sometimes".into())
        );
    }

    #[test]
    fn test_context_overrides_are_seeded_and_added() {
        let mut r = resolver(
            r#"
ligatures:
  ligaturesByContext:
    "comment string": { debug: true, ligatures: "- www" }
"#,
        );
        let config = r.default_config();

        assert!(config.contexts.contains("comment"));
        assert!(config.contexts.contains("string"));
        let comment = &config.ligatures_by_context["comment"];
        assert!(comment.debug);
        assert!(comment.ligatures.contains("www"));
        assert!(comment.ligatures.contains("ff"));
        assert_eq!(comment, &config.ligatures_by_context["string"]);
    }

    #[test]
    fn test_languages_do_not_share_overrides() {
        let mut r = resolver(
            r#"
ligatures:
  languages:
    a: { ligaturesByContext: { number: "+ 9x9" } }
"#,
        );
        let a = resolved(r.resolve(Some("a")).unwrap());
        let b = resolved(r.resolve(Some("b")).unwrap());

        assert!(!a.ligatures_by_context["number"].ligatures.contains("9x9"));
        assert!(b.ligatures_by_context["number"].ligatures.contains("9x9"));
    }

    #[test]
    fn test_new_glyph_recompiles_pattern() {
        let mut r = resolver("");
        let before = r.pattern().unwrap();

        r.set_settings(
            Settings::from_yaml_str("ligatures: { languages: { a: { ligatures: '+ <~~>' } } }")
                .unwrap(),
        );
        r.resolve(Some("a")).unwrap();
        let after = r.pattern().unwrap();

        assert!(r.vocabulary().contains("<~~>"));
        assert_eq!(after.find_from("x <~~> y", 0), Some(2..6));
        assert_eq!(before.find_from("x <~~> y", 0), Some(2..5));
    }

    #[test]
    fn test_disregarded_ligatures_removed_from_vocabulary() {
        let mut r = resolver("ligatures: { disregardedLigatures: 'www ff' }");
        r.default_config();
        assert!(!r.vocabulary().contains("www"));
        assert!(!r.vocabulary().contains("ff"));
        assert!(r.vocabulary().contains("=="));
    }

    #[test]
    fn test_context_override_lookup_order() {
        let mut r = resolver(
            r#"
ligatures:
  ligaturesByContext:
    string: "+ www"
    string.quoted: "- www"
    comment.line: "0 =="
"#,
        );
        let config = r.default_config();

        let by_scope = config
            .context_override(Some("string.quoted.double.js"), "string")
            .unwrap();
        // Category wins over a truncated scope
        assert!(!by_scope.ligatures.contains("www"));

        let truncated = config
            .context_override(Some("comment.line.double-slash.js"), "comment")
            .unwrap();
        assert!(truncated.ligatures_listed_are_enabled);

        assert!(config.context_override(Some("keyword.operator"), "operator").is_none());
    }

    #[test]
    fn test_matches_context_truncates_scope() {
        let mut r = resolver("ligatures: { contexts: '0 markup.heading' }");
        let config = r.default_config();

        assert!(config.matches_context(Some("markup.heading.1.markdown"), "text"));
        assert!(!config.matches_context(Some("markup.bold.markdown"), "text"));
        assert!(!config.matches_context(None, "operator"));
    }
}
