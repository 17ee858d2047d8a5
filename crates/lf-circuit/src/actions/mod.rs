//! Reversible edits.
//!
//! Every change to a [`Designer`] made from outside this crate is an
//! [`Action`]. An action captures whatever it needs to reverse itself the
//! first time it executes, and after that can be undone and redone any
//! number of times. Handles for entities an action creates are reserved
//! when the action is built, so later actions in the same group can refer
//! to them.

mod component;
mod delete;
mod group;
mod ports;
mod property;
mod selection;
mod simulation;
mod template;
mod wiring;

use std::fmt;

use crate::designer::Designer;
use crate::error::CircuitResult;

pub use component::{AddComponent, RemoveComponent};
pub use delete::delete_group;
pub use group::GroupAction;
pub use ports::PortCountChange;
pub use property::SetProperty;
pub use selection::{Select, deselect_all, select_group};
pub use simulation::{SetInputState, TickClocks};
pub use template::AddTemplate;
pub use wiring::{Connect, Disconnect};

pub trait Action: fmt::Debug {
    /// Apply the edit. On error the designer is left as it was.
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()>;

    /// Reverse the last `execute`.
    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()>;

    /// Short description for a history panel.
    fn name(&self) -> String;

    /// Actions that change nothing are not recorded in history.
    fn is_empty(&self) -> bool {
        false
    }

    /// Execute and hand the action back, ready to be added to a history.
    fn executed(mut self, designer: &mut Designer) -> CircuitResult<Self>
    where
        Self: Sized,
    {
        self.execute(designer)?;
        Ok(self)
    }
}

impl<A: Action + ?Sized> Action for Box<A> {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        (**self).execute(designer)
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        (**self).undo(designer)
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}

/// Error for undoing an action that never ran.
pub(crate) fn not_executed(action: &dyn Action) -> crate::error::CircuitError {
    crate::error::CircuitError::NotExecuted {
        action: action.name(),
    }
}
