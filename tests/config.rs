//! Configuration system tests
//!
//! Config paths, loading settings files and language resolution through
//! the public resolver.

mod common;

use std::fs;

use common::{scan, settings, spans, test_runtime, EDITOR};
use ligatures_limited::config::{LanguageOverride, ListSpec, Settings};
use ligatures_limited::config_paths;
use ligatures_limited::decorations::Notice;
use ligatures_limited::ligature::{ConfigError, ConfigResolver, LanguageConfig, SelectionMode};
use tempfile::tempdir;

fn resolver(yaml: &str) -> ConfigResolver {
    ConfigResolver::new(settings(yaml))
}

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_file_ends_with_yaml() {
    if let Some(path) = config_paths::config_file() {
        assert!(path.to_string_lossy().ends_with("config.yaml"));
    }
}

#[test]
fn test_logs_dir_is_subdir_of_config() {
    if let (Some(config), Some(logs)) = (config_paths::config_dir(), config_paths::logs_dir()) {
        assert!(logs.starts_with(&config));
    }
}

// ========================================================================
// Loading Tests
// ========================================================================

#[test]
fn test_load_from_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.yaml");
    fs::write(
        &path,
        r#"
ligatures:
  debug: true
  ligatures: "- =>"
  languages:
    "[javascript, typescript]":
      selectionMode: line
    markdown: false
host:
  fontLigatures: true
timing:
  sliceBudgetMs: 20
"#,
    )
    .expect("Failed to write config");

    let loaded = Settings::load_from(&path).unwrap();

    assert_eq!(loaded.ligatures.debug, Some(true));
    assert_eq!(
        loaded.ligatures.ligatures,
        Some(ListSpec::Text("- =>".to_string()))
    );
    assert_eq!(
        loaded.ligatures.languages.get("markdown"),
        Some(&LanguageOverride::Shortcut(false))
    );
    assert_eq!(loaded.timing.slice_budget_ms, 20);
    // Unset timing fields keep their defaults
    assert_eq!(loaded.timing.max_parse_attempts, 5);
}

#[test]
fn test_load_from_empty_file_is_default() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "\n").expect("Failed to write config");

    assert_eq!(Settings::load_from(&path).unwrap(), Settings::default());
}

#[test]
fn test_load_from_missing_file_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("absent.yaml");

    let err = Settings::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read config"));
}

#[test]
fn test_load_from_malformed_file_fails() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.yaml");
    fs::write(&path, "ligatures:\n  debug: [unclosed\n").expect("Failed to write config");

    let err = Settings::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to parse config"));
}

#[test]
fn test_list_specs_accept_sequences() {
    let loaded = settings("ligatures:\n  ligatures: [\"-\", \"=>\", \"->\"]\n");

    assert_eq!(
        loaded.ligatures.ligatures.map(|spec| spec.tokens(false)),
        Some(vec!["-".to_string(), "=>".to_string(), "->".to_string()])
    );
}

// ========================================================================
// Resolution Tests
// ========================================================================

#[test]
fn test_inheritance_chain() {
    let mut resolver = resolver(
        r#"
ligatures:
  languages:
    base:
      debug: true
    middle:
      inherit: base
      selectionMode: selection
    leaf:
      inherit: middle
"#,
    );

    let Ok(LanguageConfig::Resolved(leaf)) = resolver.resolve(Some("leaf")) else {
        panic!("expected resolved config for leaf");
    };
    assert!(leaf.debug);
    assert_eq!(leaf.selection_mode, SelectionMode::Selection);
}

#[test]
fn test_inheritance_cycle_from_either_end() {
    let yaml = r#"
ligatures:
  languages:
    first:
      inherit: second
    second:
      inherit: first
"#;

    let mut forward = resolver(yaml);
    assert_eq!(
        forward.resolve(Some("first")),
        Err(ConfigError::UnresolvedInheritance(vec![
            "first".to_string(),
            "second".to_string()
        ]))
    );
    // The failure is cached for the other language too
    assert!(forward.resolve(Some("second")).is_err());

    let mut backward = resolver(yaml);
    assert_eq!(
        backward.resolve(Some("second")),
        Err(ConfigError::UnresolvedInheritance(vec![
            "second".to_string(),
            "first".to_string()
        ]))
    );
    assert_eq!(backward.resolve_lenient(Some("second")), LanguageConfig::Shortcut(true));
}

#[test]
fn test_root_inherit_is_an_error() {
    let mut resolver = resolver("ligatures:\n  inherit: typescript\n");

    assert_eq!(resolver.resolve(None), Err(ConfigError::InvalidRootInherit));
    assert!(resolver
        .take_notice()
        .is_some_and(|n| n.contains("\"inherit\" is not a valid property")));
}

#[test]
fn test_cycle_fails_open_with_one_notice() {
    let (mut runtime, _) = test_runtime(settings(
        r#"
ligatures:
  languages:
    typescript:
      inherit: javascript
    javascript:
      inherit: typescript
"#,
    ));

    let lists = scan(&mut runtime, "typescript", r#"s = "a->b""#, vec![]);

    // Broken configuration leaves every ligature visible
    assert!(lists.breaks.is_empty());

    let errors: Vec<&Notice> = runtime
        .sink()
        .notices
        .iter()
        .filter(|n| matches!(n, Notice::ConfigError(_)))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message().contains("typescript"));
}

#[test]
fn test_disregarded_glyph_is_never_matched() {
    let (mut runtime, _) = test_runtime(settings(
        r#"
ligatures:
  disregardedLigatures: "->"
"#,
    ));

    let lists = scan(&mut runtime, "typescript", r#"s = "a->b => c""#, vec![]);

    // `->` isn't a glyph any more; `=>` inside the string still breaks
    assert_eq!(spans(&lists.breaks), vec![(0, 10, 11), (0, 11, 12)]);
    assert!(runtime.sink().lists(EDITOR).highlights.is_empty());
}
