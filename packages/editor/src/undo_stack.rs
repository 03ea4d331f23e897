//! # Undo/Redo Stack
//!
//! Tracks document history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Trees are immutable, so history is a stack of previous roots. Restoring
//!   one is a pointer swap; nothing is re-applied or inverted.
//! - Undo moves the current root to the redo stack and returns the previous one
//! - Redo does the reverse
//! - New edits clear the redo stack
//! - Batches group several edits into one undo step
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! let next = mutation.apply(&root)?;
//! stack.record(root.clone());
//!
//! let root = stack.undo(next).unwrap();
//! ```

use slim_dom::NodeRef;
use std::sync::Arc;

/// A previous root and what replaced it
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub root: NodeRef,

    /// Optional description of the step
    pub description: Option<String>,
}

impl HistoryEntry {
    pub fn new(root: NodeRef) -> Self {
        Self {
            root,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack of document roots
#[derive(Debug)]
pub struct UndoStack {
    /// Roots before each step (most recent last)
    undo_stack: Vec<HistoryEntry>,

    /// Roots that were undone (most recent last)
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Root at the start of the batch being built
    current_batch: Option<HistoryEntry>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record `previous` as the root to return to on undo. Inside a batch
    /// only the root from before the batch is kept.
    pub fn record(&mut self, previous: NodeRef) {
        if self.current_batch.is_some() {
            self.redo_stack.clear();
            return;
        }
        self.push_entry(HistoryEntry::new(previous));
    }

    /// Start a batch of edits that will be undone/redone together
    pub fn begin_batch(&mut self, current: &NodeRef) {
        if self.current_batch.is_none() {
            self.current_batch = Some(HistoryEntry::new(current.clone()));
        }
    }

    /// End the current batch. Empty batches (root unchanged) are dropped.
    pub fn end_batch(&mut self, current: &NodeRef) {
        if let Some(batch) = self.current_batch.take() {
            if !Arc::ptr_eq(&batch.root, current) {
                self.push_entry(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    fn push_entry(&mut self, entry: HistoryEntry) {
        self.undo_stack.push(entry);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Step back from `current`, returning the root to restore
    pub fn undo(&mut self, current: NodeRef) -> Option<NodeRef> {
        let entry = self.undo_stack.pop()?;
        self.redo_stack.push(HistoryEntry {
            root: current,
            description: entry.description.clone(),
        });
        Some(entry.root)
    }

    /// Step forward from `current`, returning the root to restore
    pub fn redo(&mut self, current: NodeRef) -> Option<NodeRef> {
        let entry = self.redo_stack.pop()?;
        self.undo_stack.push(HistoryEntry {
            root: current,
            description: entry.description.clone(),
        });
        Some(entry.root)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().and_then(|entry| entry.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().and_then(|entry| entry.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
