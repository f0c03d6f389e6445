//! Bounded snapshot undo/redo for one chapter.
//!
//! Stacks hold full map copies, not diffs. Chapter maps are small (tens of
//! entries) so copies stay cheap.

use std::collections::VecDeque;

use versemark_primitives::markings::WordMarkings;

/// Deepest either stack gets; the oldest snapshot is evicted first.
pub const HISTORY_LIMIT: usize = 50;

#[derive(Clone, Debug)]
pub struct EditRecord {
    pub snapshot: WordMarkings,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct ChapterHistory {
    undo: VecDeque<EditRecord>,
    redo: VecDeque<EditRecord>,
}

impl ChapterHistory {
    /// Record a state-changing edit: the pre-edit snapshot becomes undoable
    /// and any pending redo branch is abandoned.
    pub fn record(&mut self, snapshot: WordMarkings, description: impl Into<String>) {
        self.redo.clear();

        self.undo.push_back(EditRecord {
            snapshot,
            description: description.into(),
        });

        if self.undo.len() > HISTORY_LIMIT {
            drop(self.undo.pop_front());
        }
    }

    /// Step back one edit. `current` moves onto the redo stack.
    pub fn undo(&mut self, current: WordMarkings) -> Option<EditRecord> {
        let record = self.undo.pop_back()?;

        self.redo.push_back(EditRecord {
            snapshot: current,
            description: record.description.clone(),
        });

        if self.redo.len() > HISTORY_LIMIT {
            drop(self.redo.pop_front());
        }

        Some(record)
    }

    /// Re-apply the most recently undone edit. `current` becomes undoable
    /// again.
    pub fn redo(&mut self, current: WordMarkings) -> Option<EditRecord> {
        let record = self.redo.pop_back()?;

        self.undo.push_back(EditRecord {
            snapshot: current,
            description: record.description.clone(),
        });

        if self.undo.len() > HISTORY_LIMIT {
            drop(self.undo.pop_front());
        }

        Some(record)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    /// Label of the edit an `undo` would revert.
    #[must_use]
    pub fn last_description(&self) -> Option<&str> {
        self.undo.back().map(|record| record.description.as_str())
    }
}
