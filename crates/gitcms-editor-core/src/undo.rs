//! Undo/redo management for editor operations.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `History<T>` - a bounded snapshot history

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// Snapshot history with a bounded undo stack.
///
/// Holds whole states rather than operations; the oldest state is dropped once
/// `max_steps` is exceeded.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo_stack: Vec<T>,
    redo_stack: Vec<T>,
    max_steps: usize,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl<T> History<T> {
    pub fn new(max_steps: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    /// Record the state that existed before an edit.
    pub fn record(&mut self, before: T) {
        // Clear redo stack on new edit
        self.redo_stack.clear();
        self.undo_stack.push(before);

        // Trim if over max
        if self.undo_stack.len() > self.max_steps {
            let excess = self.undo_stack.len() - self.max_steps;
            self.undo_stack.drain(..excess);
        }
    }

    /// Swap `current` for the most recent undo state, keeping `current` for redo.
    pub fn undo(&mut self, current: T) -> Result<T, T> {
        match self.undo_stack.pop() {
            Some(previous) => {
                self.redo_stack.push(current);
                Ok(previous)
            }
            None => Err(current),
        }
    }

    /// Swap `current` for the most recent redo state, keeping `current` for undo.
    pub fn redo(&mut self, current: T) -> Result<T, T> {
        match self.redo_stack.pop() {
            Some(next) => {
                self.undo_stack.push(current);
                Ok(next)
            }
            None => Err(current),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_swap_states() {
        let mut history = History::new(10);
        history.record("a");
        history.record("ab");

        assert_eq!(history.undo("abc"), Ok("ab"));
        assert_eq!(history.undo("ab"), Ok("a"));
        assert_eq!(history.undo("a"), Err("a"));

        assert_eq!(history.redo("a"), Ok("ab"));
        assert_eq!(history.redo("ab"), Ok("abc"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut history = History::new(10);
        history.record(1);
        assert_eq!(history.undo(2), Ok(1));
        assert!(history.can_redo());

        history.record(1);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_is_bounded() {
        let mut history = History::new(3);
        for step in 0..5 {
            history.record(step);
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.undo(5), Ok(4));
        assert_eq!(history.undo(4), Ok(3));
        assert_eq!(history.undo(3), Ok(2));
        assert!(!history.can_undo());
    }
}
