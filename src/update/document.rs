//! Document lifecycle: open, edit, close

use crate::commands::Cmd;
use crate::messages::{DocumentMsg, Msg, ScanMsg};
use crate::model::{DocumentId, DocumentState, EngineModel};

use super::scan::{review_document, review_full};

/// Handle document messages
pub fn update_document(model: &mut EngineModel, msg: DocumentMsg) -> Option<Cmd> {
    match msg {
        DocumentMsg::Opened { id, language, text } => {
            let generation = model
                .document(id)
                .map(|d| d.open_generation + 1)
                .unwrap_or(0);

            let mut doc = DocumentState::new(id, language, &text);
            doc.open_generation = generation;
            doc.open_pending = true;
            model.provider.document_opened(id, &doc.language, &doc.text);

            tracing::debug!(
                "Opened {:?} ({}, {} lines)",
                id,
                doc.language,
                doc.line_count()
            );
            model.documents.insert(id, doc);

            Some(Cmd::schedule(
                model.timing.open_delay(),
                Msg::Scan(ScanMsg::OpenReview {
                    document: id,
                    generation,
                }),
            ))
        }

        DocumentMsg::Changed { id, mut deltas } => {
            if deltas.is_empty() {
                return None;
            }
            let doc = model.documents.get_mut(&id)?;

            // Edited lines in post-edit numbering, plus the line after
            deltas.sort_by(|a, b| a.start.cmp(&b.start));
            let first = deltas[0].start.line;
            let mut last = 0;
            let mut offset = 0isize;
            for delta in &deltas {
                let start = delta.start.line.saturating_add_signed(offset);
                last = last.max(start + delta.inserted_lines() + 1);
                offset += delta.inserted_lines() as isize
                    - delta.end.line.saturating_sub(delta.start.line) as isize;
            }

            // Later deltas first so earlier positions stay valid
            for delta in deltas.iter().rev() {
                doc.apply(delta);
                if let Err(e) = model.provider.document_changed(id, delta, &doc.text) {
                    tracing::warn!("Failed to update tokens for {:?}: {}", id, e);
                }
            }
            let last = last.min(doc.line_count().saturating_sub(1));

            if deltas
                .iter()
                .any(|d| d.inserted_lines() > 0 || d.end.line > d.start.line)
            {
                for editor in model.editors.values_mut().filter(|e| e.document == id) {
                    for delta in deltas.iter().rev() {
                        let (from, to, inserted) =
                            (delta.start.line, delta.end.line, delta.inserted_lines());
                        if let Some(saved) = editor.scan.saved.as_mut() {
                            saved.splice_lines(from, to, inserted);
                        }
                        if let Some(flight) = editor.scan.in_flight.as_mut() {
                            flight.splice_lines(from, to, inserted);
                        }
                    }
                }
            }

            if first > last {
                return None;
            }
            review_document(model, id, 1, first, last, None)
        }

        DocumentMsg::Closed(id) => {
            model.documents.remove(&id)?;
            model.provider.document_closed(id);
            model.warnings.size_warned.remove(&id);
            if model.current_document == Some(id) {
                model.current_document = None;
            }

            for editor in model.editors.values_mut().filter(|e| e.document == id) {
                editor.discard_scan();
                editor.selection_generation += 1;
            }
            tracing::debug!("Closed {:?}", id);
            None
        }
    }
}

/// The debounced first review of an opened document
pub fn open_review(model: &mut EngineModel, document: DocumentId, generation: u64) -> Option<Cmd> {
    let doc = model.documents.get_mut(&document)?;
    if doc.open_generation != generation {
        return None;
    }
    doc.open_pending = false;
    review_full(model, document)
}
