//! Editor events: visibility, selections and scrolling

use std::time::Instant;

use crate::commands::Cmd;
use crate::messages::{EditorMsg, Msg, ScanMsg};
use crate::model::{EditorId, EditorState, EngineModel, LineRange, Selection};

use super::scan::{review_document, review_full};

/// Handle editor messages
pub fn update_editor(model: &mut EngineModel, msg: EditorMsg) -> Option<Cmd> {
    match msg {
        EditorMsg::Shown {
            editor,
            document,
            selections,
            visible_range,
        } => {
            let state = model
                .editors
                .entry(editor)
                .or_insert_with(|| EditorState::new(editor, document));

            if state.document != document {
                *state = EditorState::new(editor, document);
            }
            state.selections = selections;
            state.visible_range = visible_range;

            tracing::debug!("{:?} showing {:?}", editor, document);
            review_full(model, document)
        }

        EditorMsg::Hidden(editor) => {
            if model.editors.remove(&editor).is_some() {
                tracing::debug!("{:?} hidden", editor);
            }
            None
        }

        EditorMsg::SelectionChanged { editor, selections } => {
            let state = model.editors.get_mut(&editor)?;
            state.selections = selections;

            let opening = model
                .documents
                .get(&state.document)
                .is_some_and(|d| d.open_pending);

            if opening {
                state.selection_generation += 1;
                return Some(Cmd::schedule(
                    model.timing.open_delay(),
                    Msg::Scan(ScanMsg::SelectionSettled {
                        editor,
                        generation: state.selection_generation,
                    }),
                ));
            }
            selection_change(model, editor)
        }

        EditorMsg::VisibleRangeChanged { editor, range } => {
            let state = model.editors.get_mut(&editor)?;
            state.reported_range = Some((range, Instant::now()));
            None
        }
    }
}

/// A selection change debounced during document open has settled
pub fn selection_settled(model: &mut EngineModel, editor: EditorId, generation: u64) -> Option<Cmd> {
    let state = model.editors.get(&editor)?;
    if state.selection_generation != generation {
        return None;
    }
    selection_change(model, editor)
}

/// Lowest and highest line any selection touches
fn selection_bounds(selections: &[Selection]) -> Option<(usize, usize)> {
    selections.iter().fold(None, |bounds, s| {
        let lo = s.anchor.line.min(s.head.line);
        let hi = s.anchor.line.max(s.head.line);
        Some(match bounds {
            Some((first, last)) => (lo.min(first), hi.max(last)),
            None => (lo, hi),
        })
    })
}

/// Rescan the lines whose selection state may have changed: the bounding
/// range of the old and new selections, leaving out the gap between them
/// when they are disjoint
fn selection_change(model: &mut EngineModel, editor: EditorId) -> Option<Cmd> {
    let state = model.editors.get_mut(&editor)?;
    let document = state.document;
    let line_count = model.documents.get(&document)?.line_count();

    let previous = state.scan.saved_selections.replace(state.selections.clone());
    let current = selection_bounds(&state.selections);
    let previous = previous.as_deref().and_then(selection_bounds);

    let (first, last, skip) = match (current, previous) {
        (Some((new_first, new_last)), Some((old_first, old_last))) => {
            if old_first > new_last {
                (new_first, old_last, gap(new_last + 1, old_first - 1))
            } else if old_last < new_first {
                (old_first, new_last, gap(old_last + 1, new_first - 1))
            } else {
                (new_first.min(old_first), new_last.max(old_last), None)
            }
        }
        (Some((first, last)), None) | (None, Some((first, last))) => (first, last, None),
        (None, None) => return None,
    };

    let first = first.min(line_count.saturating_sub(1));
    if first > last {
        return None;
    }
    review_document(model, document, 1, first, last, skip)
}

fn gap(first: usize, last: usize) -> Option<LineRange> {
    (first <= last).then(|| LineRange::new(first, last))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Position;

    #[test]
    fn test_selection_bounds() {
        let selections = [
            Selection::from_anchor_head(Position::new(7, 0), Position::new(5, 2)),
            Selection::caret(9, 1),
        ];
        assert_eq!(selection_bounds(&selections), Some((5, 9)));
        assert_eq!(selection_bounds(&[]), None);
    }

    #[test]
    fn test_gap_requires_lines() {
        assert_eq!(gap(3, 5), Some(LineRange::new(3, 5)));
        assert_eq!(gap(4, 3), None);
    }
}
