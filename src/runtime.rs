//! Message loop: runs `update`, carries out commands and keeps the timer
//! queue for scheduled messages

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use crate::commands::Cmd;
use crate::decorations::{DecorationKind, DecorationSink};
use crate::messages::Msg;
use crate::model::EngineModel;
use crate::update::update;

/// A message waiting for its timer
#[derive(Debug)]
struct Deferred {
    due: Instant,
    seq: u64,
    msg: Msg,
}

impl PartialEq for Deferred {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Deferred {}

impl PartialOrd for Deferred {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Deferred {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Owns the model and the decoration sink. Hosts feed it messages and
/// either drive the timers in real time (`run_until_idle`, `run_due`) or
/// jump straight to each timer's due time (`flush`, `run_next`).
pub struct Runtime<S: DecorationSink> {
    model: EngineModel,
    sink: S,
    queue: BinaryHeap<Reverse<Deferred>>,
    seq: u64,
    /// Time of the latest timer run; never behind a scheduled message's origin
    clock: Instant,
}

impl<S: DecorationSink> Runtime<S> {
    pub fn new(model: EngineModel, sink: S) -> Self {
        Self {
            model,
            sink,
            queue: BinaryHeap::new(),
            seq: 0,
            clock: Instant::now(),
        }
    }

    pub fn model(&self) -> &EngineModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut EngineModel {
        &mut self.model
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_parts(self) -> (EngineModel, S) {
        (self.model, self.sink)
    }

    fn now(&self) -> Instant {
        self.clock.max(Instant::now())
    }

    /// Run one message through `update` and carry out its commands
    pub fn dispatch(&mut self, msg: Msg) {
        if let Some(cmd) = update(&mut self.model, msg) {
            self.process_cmd(cmd);
        }
    }

    fn process_cmd(&mut self, cmd: Cmd) {
        match cmd {
            Cmd::Decorate(decoration) => {
                for kind in DecorationKind::ALL {
                    self.sink.apply_ranges(
                        decoration.document,
                        decoration.editor,
                        kind,
                        decoration.lists.get(kind),
                    );
                }
            }
            Cmd::Notify(notice) => self.sink.notify(&notice),
            Cmd::Schedule { delay, msg } => {
                let due = self.now() + delay;
                self.seq += 1;
                tracing::trace!("Scheduling {} in {:?}", msg.name(), delay);
                self.queue.push(Reverse(Deferred {
                    due,
                    seq: self.seq,
                    msg: *msg,
                }));
            }
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.process_cmd(cmd);
                }
            }
        }
    }

    /// Number of scheduled messages
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// When the earliest scheduled message is due
    pub fn next_due(&self) -> Option<Instant> {
        self.queue.peek().map(|Reverse(d)| d.due)
    }

    /// Run every scheduled message due at `now`, including ones they
    /// schedule that are also due. Returns how many ran.
    pub fn run_due(&mut self, now: Instant) -> usize {
        let mut ran = 0;
        while self.next_due().is_some_and(|due| due <= now) {
            if self.run_next() {
                ran += 1;
            }
        }
        ran
    }

    /// Run the earliest scheduled message without waiting for it
    pub fn run_next(&mut self) -> bool {
        let Some(Reverse(deferred)) = self.queue.pop() else {
            return false;
        };
        self.clock = self.clock.max(deferred.due);
        self.dispatch(deferred.msg);
        true
    }

    /// Run scheduled messages in due order, skipping the waits, until none
    /// are left or `limit` have run
    pub fn flush(&mut self, limit: usize) -> usize {
        let mut ran = 0;
        while ran < limit && self.run_next() {
            ran += 1;
        }
        if ran == limit && !self.queue.is_empty() {
            tracing::warn!("Stopped after {} scheduled messages, {} left", ran, self.pending());
        }
        ran
    }

    /// Sleep until each scheduled message is due and run it, until the
    /// queue is empty
    pub fn run_until_idle(&mut self) {
        while let Some(due) = self.next_due() {
            let wait = due.saturating_duration_since(Instant::now());
            if wait > Duration::ZERO {
                std::thread::sleep(wait);
            }
            self.run_due(Instant::now());
        }
    }
}
