use crate::designer::Designer;
use crate::error::CircuitResult;

use super::Action;

/// An ordered list of actions that executes and undoes as one.
///
/// Children execute in order and undo in reverse. If a child fails, the
/// children that already ran are undone before the error is returned.
#[derive(Debug, Default)]
pub struct GroupAction {
    name: Option<String>,
    actions: Vec<Box<dyn Action>>,
}

impl GroupAction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: impl Action + 'static) {
        self.actions.push(Box::new(action));
    }

    pub fn push_boxed(&mut self, action: Box<dyn Action>) {
        self.actions.push(action);
    }

    /// Builder-style [`GroupAction::push`].
    pub fn with(mut self, action: impl Action + 'static) -> Self {
        self.push(action);
        self
    }

    /// Append another group's children.
    pub fn extend(&mut self, other: GroupAction) {
        self.actions.extend(other.actions);
    }

    pub fn actions(&self) -> &[Box<dyn Action>] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }
}

impl Action for GroupAction {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        for i in 0..self.actions.len() {
            if let Err(err) = self.actions[i].execute(designer) {
                tracing::debug!(
                    failed = %self.actions[i].name(),
                    rolled_back = i,
                    "group action failed; rolling back"
                );
                for done in self.actions[..i].iter_mut().rev() {
                    done.undo(designer)?;
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        for action in self.actions.iter_mut().rev() {
            action.undo(designer)?;
        }
        Ok(())
    }

    fn name(&self) -> String {
        match (&self.name, self.actions.as_slice()) {
            (Some(name), _) => name.clone(),
            (None, [only]) => only.name(),
            (None, _) => "Group Action".to_string(),
        }
    }

    fn is_empty(&self) -> bool {
        self.actions.iter().all(|a| a.is_empty())
    }
}
