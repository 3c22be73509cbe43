//! Selection modes and the user toggles that override them

mod common;

use common::{open_and_show, scan, settings, spans, test_runtime, EDITOR, FLUSH_LIMIT};
use ligatures_limited::config::Settings;
use ligatures_limited::decorations::{CollectingSink, Notice};
use ligatures_limited::messages::{EditorMsg, Msg, ToggleMsg};
use ligatures_limited::model::{Position, Selection};
use ligatures_limited::runtime::Runtime;

fn move_selection(runtime: &mut Runtime<CollectingSink>, selection: Selection) {
    runtime.dispatch(Msg::Editor(EditorMsg::SelectionChanged {
        editor: EDITOR,
        selections: vec![selection],
    }));
    runtime.flush(FLUSH_LIMIT);
}

fn infos(runtime: &Runtime<CollectingSink>) -> Vec<String> {
    runtime
        .sink()
        .notices
        .iter()
        .filter_map(|n| match n {
            Notice::Info(message) => Some(message.clone()),
            _ => None,
        })
        .collect()
}

// ========================================================================
// Cursor mode
// ========================================================================

#[test]
fn test_cursor_move_releases_previous_glyph() {
    let (mut runtime, _) = test_runtime(Settings::default());
    let text = vec!["x => y"; 6].join("\n");

    let lists = scan(&mut runtime, "typescript", &text, vec![Selection::caret(0, 3)]);
    assert_eq!(spans(&lists.breaks), vec![(0, 2, 3), (0, 3, 4)]);

    move_selection(&mut runtime, Selection::caret(3, 3));

    let lists = runtime.sink().lists(EDITOR);
    assert_eq!(spans(&lists.breaks), vec![(3, 2, 3), (3, 3, 4)]);
}

#[test]
fn test_caret_touching_glyph_edge_breaks_it() {
    let (mut runtime, _) = test_runtime(Settings::default());

    let lists = scan(&mut runtime, "typescript", "x => y", vec![Selection::caret(0, 4)]);

    assert_eq!(spans(&lists.breaks), vec![(0, 2, 3), (0, 3, 4)]);
}

#[test]
fn test_cursor_mode_ignores_range_selection() {
    let (mut runtime, _) = test_runtime(Settings::default());
    let selection = Selection::from_anchor_head(Position::new(0, 0), Position::new(0, 5));

    let lists = scan(&mut runtime, "typescript", "a -> b => c", vec![selection]);

    assert!(lists.breaks.is_empty());
}

#[test]
fn test_multiple_carets_disable_cursor_mode() {
    let (mut runtime, _) = test_runtime(Settings::default());

    let lists = scan(
        &mut runtime,
        "typescript",
        "a -> b\nc => d",
        vec![Selection::caret(0, 3), Selection::caret(1, 3)],
    );

    assert!(lists.breaks.is_empty());
}

#[test]
fn test_selection_during_open_is_debounced() {
    let (mut runtime, _) = test_runtime(Settings::default());
    open_and_show(&mut runtime, "typescript", "x => y\nx => y", vec![], None);

    // Both arrive while the document is still opening; only the last counts
    runtime.dispatch(Msg::Editor(EditorMsg::SelectionChanged {
        editor: EDITOR,
        selections: vec![Selection::caret(1, 3)],
    }));
    runtime.dispatch(Msg::Editor(EditorMsg::SelectionChanged {
        editor: EDITOR,
        selections: vec![Selection::caret(0, 3)],
    }));
    runtime.flush(FLUSH_LIMIT);

    let lists = runtime.sink().lists(EDITOR);
    assert_eq!(spans(&lists.breaks), vec![(0, 2, 3), (0, 3, 4)]);
}

// ========================================================================
// Other modes
// ========================================================================

#[test]
fn test_line_mode_breaks_every_glyph_on_caret_line() {
    let (mut runtime, _) = test_runtime(settings("ligatures:\n  selectionMode: line\n"));

    let lists = scan(
        &mut runtime,
        "typescript",
        "a -> b => c\nd -> e",
        vec![Selection::caret(0, 0)],
    );

    assert_eq!(
        spans(&lists.breaks),
        vec![(0, 2, 3), (0, 3, 4), (0, 7, 8), (0, 8, 9)]
    );
}

#[test]
fn test_selection_mode_breaks_intersected_glyphs() {
    let (mut runtime, _) = test_runtime(settings("ligatures:\n  selectionMode: selection\n"));
    let selection = Selection::from_anchor_head(Position::new(0, 5), Position::new(0, 0));

    let lists = scan(&mut runtime, "typescript", "a -> b => c", vec![selection]);

    assert_eq!(spans(&lists.breaks), vec![(0, 2, 3), (0, 3, 4)]);
}

#[test]
fn test_off_mode_ignores_caret() {
    let (mut runtime, _) = test_runtime(settings("ligatures:\n  selectionMode: off\n"));

    let lists = scan(&mut runtime, "typescript", "x => y", vec![Selection::caret(0, 3)]);

    assert!(lists.is_empty());
}

#[test]
fn test_language_selection_mode_overrides_root() {
    let (mut runtime, _) = test_runtime(settings(
        r#"
ligatures:
  selectionMode: off
  languages:
    typescript:
      selectionMode: line
"#,
    ));

    let lists = scan(&mut runtime, "typescript", "x => y", vec![Selection::caret(0, 0)]);

    assert_eq!(spans(&lists.breaks), vec![(0, 2, 3), (0, 3, 4)]);
}

// ========================================================================
// Toggles
// ========================================================================

#[test]
fn test_cycle_selection_mode() {
    let (mut runtime, _) = test_runtime(Settings::default());
    let lists = scan(&mut runtime, "typescript", "x => y", vec![Selection::caret(0, 3)]);
    assert!(!lists.breaks.is_empty());

    runtime.dispatch(Msg::Toggle(ToggleMsg::CycleSelectionMode));
    runtime.flush(FLUSH_LIMIT);
    assert!(runtime.sink().lists(EDITOR).breaks.is_empty());

    runtime.dispatch(Msg::Toggle(ToggleMsg::CycleSelectionMode));
    runtime.flush(FLUSH_LIMIT);
    assert_eq!(
        spans(&runtime.sink().lists(EDITOR).breaks),
        vec![(0, 2, 3), (0, 3, 4)]
    );

    for _ in 0..3 {
        runtime.dispatch(Msg::Toggle(ToggleMsg::CycleSelectionMode));
    }
    assert_eq!(runtime.model().toggles.selection_mode, None);

    assert_eq!(
        infos(&runtime),
        vec![
            "Ligature selection disable mode: off",
            "Ligature selection disable mode: cursor",
            "Ligature selection disable mode: line",
            "Ligature selection disable mode: selection",
            "Ligature selection disable mode: by settings",
        ]
    );
}

#[test]
fn test_cycle_debug() {
    let (mut runtime, _) = test_runtime(Settings::default());
    let lists = scan(&mut runtime, "typescript", "a -> b", vec![]);
    assert!(lists.highlights.is_empty());

    runtime.dispatch(Msg::Toggle(ToggleMsg::CycleDebug));
    runtime.flush(FLUSH_LIMIT);
    assert_eq!(
        spans(&runtime.sink().lists(EDITOR).highlights),
        vec![(0, 2, 4)]
    );

    runtime.dispatch(Msg::Toggle(ToggleMsg::CycleDebug));
    runtime.flush(FLUSH_LIMIT);
    assert!(runtime.sink().lists(EDITOR).highlights.is_empty());

    runtime.dispatch(Msg::Toggle(ToggleMsg::CycleDebug));
    assert_eq!(runtime.model().toggles.debug, None);

    assert_eq!(
        infos(&runtime),
        vec![
            "Ligature debug highlighting: all on",
            "Ligature debug highlighting: all off",
            "Ligature debug highlighting: by settings",
        ]
    );
}
