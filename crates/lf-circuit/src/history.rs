//! Undo/redo stacks.

use crate::actions::Action;
use crate::designer::Designer;
use crate::error::CircuitResult;

/// Executed actions available for undo, and undone actions available for
/// redo. Adding a new action discards the redo stack.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Box<dyn Action>>,
    redo: Vec<Box<dyn Action>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an already-executed action. Empty actions are dropped.
    /// Returns whether the action was recorded.
    pub fn add(&mut self, action: impl Action + 'static) -> bool {
        self.add_boxed(Box::new(action))
    }

    pub fn add_boxed(&mut self, action: Box<dyn Action>) -> bool {
        if action.is_empty() {
            return false;
        }
        tracing::debug!(action = %action.name(), "history add");
        self.undo.push(action);
        self.redo.clear();
        true
    }

    /// Execute `action` and record it.
    pub fn perform(&mut self, designer: &mut Designer, mut action: impl Action + 'static) -> CircuitResult<bool> {
        action.execute(designer)?;
        Ok(self.add(action))
    }

    /// Undo the most recent action. Returns `false` when there is nothing
    /// to undo. A failed undo leaves the action on the undo stack.
    pub fn undo(&mut self, designer: &mut Designer) -> CircuitResult<bool> {
        let Some(mut action) = self.undo.pop() else {
            return Ok(false);
        };
        if let Err(err) = action.undo(designer) {
            self.undo.push(action);
            return Err(err);
        }
        tracing::debug!(action = %action.name(), "history undo");
        self.redo.push(action);
        Ok(true)
    }

    /// Redo the most recently undone action.
    pub fn redo(&mut self, designer: &mut Designer) -> CircuitResult<bool> {
        let Some(mut action) = self.redo.pop() else {
            return Ok(false);
        };
        if let Err(err) = action.execute(designer) {
            self.redo.push(action);
            return Err(err);
        }
        tracing::debug!(action = %action.name(), "history redo");
        self.undo.push(action);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Names of undoable actions, oldest first.
    pub fn undo_names(&self) -> Vec<String> {
        self.undo.iter().map(|a| a.name()).collect()
    }

    /// Names of redoable actions, next-to-redo last.
    pub fn redo_names(&self) -> Vec<String> {
        self.redo.iter().map(|a| a.name()).collect()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
