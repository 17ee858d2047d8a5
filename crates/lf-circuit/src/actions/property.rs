use lf_core::CompId;

use crate::designer::{Designer, Property};
use crate::error::CircuitResult;

use super::{Action, not_executed};

/// Change a component's name, an LED's colour or a clock's period.
#[derive(Debug)]
pub struct SetProperty {
    comp: CompId,
    value: Property,
    prior: Option<Property>,
}

impl SetProperty {
    pub fn new(comp: CompId, value: Property) -> Self {
        Self {
            comp,
            value,
            prior: None,
        }
    }
}

impl Action for SetProperty {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        self.prior = Some(designer.set_property(self.comp, self.value.clone())?);
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let prior = self.prior.clone().ok_or_else(|| not_executed(&*self))?;
        designer.set_property(self.comp, prior)?;
        Ok(())
    }

    fn name(&self) -> String {
        format!("Changed {}", self.value.label())
    }

    fn is_empty(&self) -> bool {
        self.prior.as_ref() == Some(&self.value)
    }
}
