//! Scan scheduling: reviews, viewport-first passes and time slicing
//!
//! A review picks the line range to scan for each editor showing a
//! document. The scan itself runs the visible lines first, then the whole
//! range under a wall-clock budget; when the budget runs out the scan is
//! parked in `ScanState::in_flight` and a `ScanMsg::Resume` is scheduled.

use std::time::{Duration, Instant};

use super::decide::ScanContext;
use crate::commands::Cmd;
use crate::decorations::Notice;
use crate::ligature::LanguageConfig;
use crate::messages::{Msg, ScanMsg};
use crate::model::{
    DocumentId, EditorId, EngineModel, InFlightScan, LigatureRange, LineRange, Position, RangeLists,
};

/// Review the whole document in every editor showing it
pub fn review_full(model: &mut EngineModel, document: DocumentId) -> Option<Cmd> {
    let last = model.document(document)?.line_count().saturating_sub(1);
    review_document(model, document, 1, 0, last, None)
}

/// Rescan `first..=last` (minus `skip`) of a document in every editor
/// showing it, widening to a full scan when earlier results can't be reused
pub fn review_document(
    model: &mut EngineModel,
    document: DocumentId,
    attempt: u32,
    first: usize,
    last: usize,
    skip: Option<LineRange>,
) -> Option<Cmd> {
    if attempt > model.timing.max_parse_attempts {
        tracing::debug!(
            "Abandoning review of {:?} after {} attempts",
            document,
            attempt - 1
        );
        return None;
    }

    let line_count = model.document(document)?.line_count();
    let editors = model.editors_for(document);
    if editors.is_empty() {
        return None;
    }

    model.current_document = Some(document);

    if model.provider.scope_at(document, 0, 0).is_none() {
        tracing::debug!(
            "Tokens for {:?} not ready, retry {} in {:?}",
            document,
            attempt,
            model.timing.parse_retry()
        );
        return Some(Cmd::schedule(
            model.timing.parse_retry(),
            Msg::Scan(ScanMsg::RetryReview {
                document,
                attempt: attempt + 1,
                first,
                last,
                skip,
            }),
        ));
    }

    let full = first == 0 && last + 1 >= line_count;
    let mut cmds = Vec::new();

    for id in editors {
        let Some(editor) = model.editors.get_mut(&id) else {
            continue;
        };
        editor.scan.saved_selections = Some(editor.selections.clone());

        if !full {
            if let Some(flight) = editor.scan.in_flight.as_mut() {
                flight.first = flight.first.min(first);
                flight.last = flight.last.max(last);
                flight.lists.clear_lines(flight.first, flight.last, None);
                flight.skip = None;
                flight.view = None;
                tracing::debug!(
                    "Merged lines {}..={} into in-flight scan of {:?}",
                    flight.first,
                    flight.last,
                    id
                );
                continue;
            }
        }

        let reusable = attempt == 1
            && !full
            && editor.scan.in_flight.is_none()
            && editor
                .scan
                .saved
                .as_ref()
                .is_some_and(|saved| saved.background.is_empty());

        let saved = if reusable {
            editor.scan.saved.clone()
        } else {
            None
        };

        let flight = match saved {
            Some(mut lists) => {
                lists.clear_lines(first, last, skip);
                InFlightScan {
                    first,
                    last,
                    skip,
                    view: None,
                    generation: editor.scan.next_generation(),
                    lists,
                }
            }
            None => {
                if editor.scan.in_flight.take().is_some() {
                    tracing::debug!("Restarting in-flight scan of {:?}", id);
                }
                InFlightScan {
                    first: 0,
                    last: line_count.saturating_sub(1),
                    skip: None,
                    view: None,
                    generation: editor.scan.next_generation(),
                    lists: RangeLists::default(),
                }
            }
        };

        cmds.extend(run_scan(model, id, flight, true));
    }

    Cmd::batch(cmds)
}

/// Continue a yielded scan, unless it was superseded or its editor or
/// document went away
pub fn resume_scan(model: &mut EngineModel, editor_id: EditorId, generation: u64) -> Option<Cmd> {
    let Some(editor) = model.editors.get_mut(&editor_id) else {
        tracing::debug!("Editor {:?} hidden, dropping scan", editor_id);
        return None;
    };

    if !editor.scan.is_current(generation) {
        tracing::trace!("Ignoring stale resume {} for {:?}", generation, editor_id);
        return None;
    }

    let flight = editor.scan.in_flight.take()?;
    if !model.documents.contains_key(&editor.document) {
        tracing::debug!("Document of {:?} closed, dropping scan", editor_id);
        return None;
    }

    run_scan(model, editor_id, flight, false)
}

enum Slice {
    Finished,
    /// Budget exhausted; next line to process
    Yielded(usize),
}

fn process_lines(
    ctx: &mut ScanContext<'_>,
    flight: &mut InFlightScan,
    first: usize,
    last: usize,
    budget: Option<(Instant, Duration)>,
) -> Slice {
    for i in first..=last {
        if flight.skips(i) {
            continue;
        }

        ctx.scan_line(i, &mut flight.lists);

        if let Some((started, budget)) = budget {
            if started.elapsed() >= budget {
                return Slice::Yielded(i + 1);
            }
        }
    }
    Slice::Finished
}

/// One slice of a scan. `first_pass` also handles the viewport up front.
fn run_scan(
    model: &mut EngineModel,
    editor_id: EditorId,
    mut flight: InFlightScan,
    first_pass: bool,
) -> Option<Cmd> {
    let EngineModel {
        resolver,
        provider,
        documents,
        editors,
        toggles,
        warnings,
        timing,
        ..
    } = model;

    let editor = editors.get_mut(&editor_id)?;
    let Some(doc) = documents.get(&editor.document) else {
        editor.scan.in_flight = None;
        return None;
    };

    let mut cmds = Vec::new();
    let doc_config = resolver.resolve_lenient(Some(&doc.language));
    if let Some(message) = resolver.take_notice() {
        cmds.push(Cmd::Notify(Notice::ConfigError(message)));
    }

    if matches!(&doc_config, LanguageConfig::Resolved(c) if c.deactivated) {
        tracing::debug!("Ligatures deactivated for {}, clearing {:?}", doc.language, editor_id);
        editor.scan.in_flight = None;
        editor.scan.saved = None;
        cmds.push(Cmd::decorate(doc.id, editor_id, RangeLists::default()));
        return Cmd::batch(cmds);
    }

    let line_count = doc.line_count();
    let default = resolver.default_config();
    let oversized = (default.max_lines > 0 && line_count > default.max_lines)
        || (default.max_file_size > 0 && doc.byte_len() > default.max_file_size);

    if oversized || !toggles.suppression {
        if oversized {
            tracing::debug!(
                "{:?} too large to scan ({} lines, {} bytes)",
                doc.id,
                line_count,
                doc.byte_len()
            );
            if warnings.size_warning_enabled && warnings.size_warned.insert(doc.id) {
                cmds.push(Cmd::Notify(Notice::SizeWarning { document: doc.id }));
            }
        }
        flight.lists.clear_glyphs();
        flight.lists.background = vec![LigatureRange::new(
            Position::new(0, 0),
            Position::new(line_count, 0),
        )];
    } else if let Some(pattern) = resolver.pattern() {
        let default_selection_mode = default.selection_mode;
        let viewport = editor.viewport(Instant::now(), timing.visible_range_freshness());
        let mut ctx = ScanContext {
            document: doc,
            provider: &**provider,
            resolver,
            pattern: &pattern,
            doc_config,
            default_selection_mode,
            toggles: *toggles,
            selections: editor.selections.clone(),
        };

        flight.last = flight.last.min(line_count.saturating_sub(1));

        if first_pass {
            if let Some(view) = viewport {
                let top = view.first.min(view.last);
                let bottom = view.first.max(view.last);
                let view_first = flight.first.max(top.saturating_sub(1));
                let view_last = flight.last.min(bottom + 1);

                if view_first <= view_last {
                    process_lines(&mut ctx, &mut flight, view_first, view_last, None);
                    cmds.push(Cmd::decorate(doc.id, editor_id, flight.lists.clone()));
                    flight.view = Some(LineRange::new(view_first, view_last));
                }
            }
        }

        let budget = Some((Instant::now(), timing.slice_budget()));
        let (first, last) = (flight.first, flight.last);

        if let Slice::Yielded(next) = process_lines(&mut ctx, &mut flight, first, last, budget) {
            tracing::debug!(
                "Scan of {:?} yielding at line {} of {}",
                editor_id,
                next,
                flight.last
            );
            flight.first = next;
            let generation = flight.generation;
            editor.scan.in_flight = Some(flight);
            cmds.push(Cmd::schedule(
                timing.yield_delay(),
                Msg::Scan(ScanMsg::Resume {
                    editor: editor_id,
                    generation,
                }),
            ));
            return Cmd::batch(cmds);
        }
    } else {
        tracing::warn!("No ligature pattern available, leaving {:?} undecorated", doc.id);
    }

    flight.lists.sort();
    tracing::debug!(
        "Scan of {:?} done: {} breaks, {} debug breaks, {} highlights",
        editor_id,
        flight.lists.breaks.len(),
        flight.lists.debug_breaks.len(),
        flight.lists.highlights.len()
    );
    editor.scan.in_flight = None;
    editor.scan.saved = Some(flight.lists.clone());
    cmds.push(Cmd::decorate(doc.id, editor_id, flight.lists));
    Cmd::batch(cmds)
}
