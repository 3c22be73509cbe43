//! Command types for the Elm-style architecture
//!
//! Commands represent side effects that should be performed after an update.

use std::time::Duration;

use crate::decorations::{DecorationUpdate, Notice};
use crate::messages::Msg;
use crate::model::{DocumentId, EditorId, RangeLists};

/// Side effects returned by update functions
#[derive(Debug, Clone)]
pub enum Cmd {
    /// Apply all four range lists to an editor
    Decorate(DecorationUpdate),
    /// Show a message to the user
    Notify(Notice),
    /// Deliver `msg` after `delay`
    Schedule { delay: Duration, msg: Box<Msg> },
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Combine commands; `None` when there is nothing to do
    pub fn batch(mut cmds: Vec<Cmd>) -> Option<Self> {
        match cmds.len() {
            0 => None,
            1 => cmds.pop(),
            _ => Some(Cmd::Batch(cmds)),
        }
    }

    pub fn decorate(document: DocumentId, editor: EditorId, lists: RangeLists) -> Self {
        Cmd::Decorate(DecorationUpdate {
            document,
            editor,
            lists,
        })
    }

    pub fn schedule(delay: Duration, msg: Msg) -> Self {
        Cmd::Schedule {
            delay,
            msg: Box::new(msg),
        }
    }

    /// Number of leaf commands
    pub fn len(&self) -> usize {
        match self {
            Cmd::Batch(cmds) => cmds.iter().map(Cmd::len).sum(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collapses() {
        assert!(Cmd::batch(vec![]).is_none());
        assert!(matches!(
            Cmd::batch(vec![Cmd::Notify(Notice::Info("a".into()))]),
            Some(Cmd::Notify(_))
        ));
        let cmd = Cmd::batch(vec![
            Cmd::Notify(Notice::Info("a".into())),
            Cmd::Batch(vec![Cmd::Notify(Notice::Info("b".into())), Cmd::Batch(vec![])]),
        ])
        .unwrap();
        assert_eq!(cmd.len(), 2);
        assert!(!cmd.is_empty());
    }
}
