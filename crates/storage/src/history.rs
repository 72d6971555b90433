#![forbid(unsafe_code)]

use crate::error::PersistenceError;
use crate::events::EventBatch;
use crate::gateway::PersistenceGateway;

/// Linear undo/redo history over event batches.
///
/// `entries[0..cursor)` is exactly the sequence of edits materialized in the
/// database, in order; `entries[cursor..)` is the redoable suffix. There is
/// no branching: a new edit below the top discards the suffix.
pub struct HistoryStack {
    entries: Vec<EventBatch>,
    cursor: usize,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
        }
    }

    /// Applies `batch` and records it as the newest entry, returning the new
    /// cursor. The redoable suffix is discarded only once the batch has
    /// committed; a failed apply leaves the stack exactly as it was.
    pub fn add(
        &mut self,
        mut batch: EventBatch,
        gateway: &mut dyn PersistenceGateway,
    ) -> Result<usize, PersistenceError> {
        batch.apply(gateway)?;
        self.entries.truncate(self.cursor);
        self.entries.push(batch);
        self.cursor += 1;
        Ok(self.cursor)
    }

    /// Reverses the newest done entry. `Ok(false)` when there is nothing to
    /// undo; the database is not touched in that case. The cursor moves only
    /// after the reversal committed.
    pub fn undo(
        &mut self,
        gateway: &mut dyn PersistenceGateway,
    ) -> Result<bool, PersistenceError> {
        if self.cursor == 0 {
            return Ok(false);
        }
        self.entries[self.cursor - 1].reverse(gateway)?;
        self.cursor -= 1;
        Ok(true)
    }

    /// Re-applies the entry just ahead of the cursor. `Ok(false)` when there
    /// is nothing to redo.
    pub fn redo(
        &mut self,
        gateway: &mut dyn PersistenceGateway,
    ) -> Result<bool, PersistenceError> {
        if self.cursor == self.entries.len() {
            return Ok(false);
        }
        self.entries[self.cursor].apply(gateway)?;
        self.cursor += 1;
        Ok(true)
    }

    /// The newest done entry, if any.
    pub fn latest(&self) -> Option<&EventBatch> {
        self.cursor.checked_sub(1).map(|index| &self.entries[index])
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new()
    }
}
