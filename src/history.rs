//! History Manager
//!
//! Linear undo/redo over full forest snapshots. `cursor` counts the entries
//! that can still be undone; entries at and after the cursor are redo
//! targets. Snapshots are owned deep copies and never alias the live forest.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::trace;

use crate::config::DEFAULT_HISTORY_LIMIT;
use crate::node::{CanvasNode, Forest};

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub nodes: Forest,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    fn capture(nodes: &[CanvasNode]) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self { nodes: nodes.to_vec(), timestamp }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Record the pre-mutation forest. Any redo future is discarded and the
    /// oldest entry falls off once the limit is exceeded.
    pub fn push(&mut self, snapshot: &[CanvasNode]) {
        self.entries.truncate(self.cursor);
        self.entries.push(HistoryEntry::capture(snapshot));
        if self.entries.len() > self.limit {
            self.entries.remove(0);
        }
        self.cursor = self.entries.len();
        trace!(entries = self.entries.len(), "history push");
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Snapshot to restore, given the live forest. When nothing has been
    /// undone yet the live forest is saved first so `redo` can return to it.
    pub fn undo(&mut self, current: &[CanvasNode]) -> Option<Forest> {
        if !self.can_undo() {
            return None;
        }
        if self.cursor == self.entries.len() {
            self.entries.push(HistoryEntry::capture(current));
        }
        self.cursor -= 1;
        trace!(cursor = self.cursor, entries = self.entries.len(), "history undo");
        Some(self.entries[self.cursor].nodes.clone())
    }

    pub fn redo(&mut self) -> Option<Forest> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        trace!(cursor = self.cursor, entries = self.entries.len(), "history redo");
        Some(self.entries[self.cursor].nodes.clone())
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }
}
