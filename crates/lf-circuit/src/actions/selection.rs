use lf_core::CompId;

use crate::designer::Designer;
use crate::error::CircuitResult;

use super::{Action, GroupAction, not_executed};

/// Add a component to, or remove it from, the selection.
#[derive(Debug)]
pub struct Select {
    comp: CompId,
    selected: bool,
    prior: Option<bool>,
}

impl Select {
    pub fn select(comp: CompId) -> Self {
        Self {
            comp,
            selected: true,
            prior: None,
        }
    }

    pub fn deselect(comp: CompId) -> Self {
        Self {
            comp,
            selected: false,
            prior: None,
        }
    }
}

impl Action for Select {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        self.prior = Some(designer.set_selected(self.comp, self.selected)?);
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let prior = self.prior.ok_or_else(|| not_executed(&*self))?;
        designer.set_selected(self.comp, prior)?;
        Ok(())
    }

    fn name(&self) -> String {
        if self.selected { "Select" } else { "Deselect" }.to_string()
    }

    fn is_empty(&self) -> bool {
        self.prior == Some(self.selected)
    }
}

/// Deselect everything currently selected.
pub fn deselect_all(designer: &Designer) -> GroupAction {
    let mut group = GroupAction::named("Deselect All");
    for comp in designer.selection() {
        group.push(Select::deselect(*comp));
    }
    group
}

/// Make `comps` the whole selection.
pub fn select_group(designer: &Designer, comps: &[CompId]) -> GroupAction {
    let mut group = GroupAction::named("Select Group");
    for comp in designer.selection() {
        if !comps.contains(comp) {
            group.push(Select::deselect(*comp));
        }
    }
    for comp in comps {
        if !designer.is_selected(*comp) {
            group.push(Select::select(*comp));
        }
    }
    group
}
