use lf_core::TemplateId;

use crate::designer::Designer;
use crate::error::CircuitResult;
use crate::ic::IcTemplate;

use super::{Action, not_executed};

/// Register an IC template in the designer's library.
#[derive(Debug)]
pub struct AddTemplate {
    id: TemplateId,
    name: String,
    /// Held here while the template is not in the library.
    template: Option<IcTemplate>,
}

impl AddTemplate {
    pub fn new(designer: &mut Designer, template: IcTemplate) -> Self {
        Self {
            id: designer.reserve_template(),
            name: template.name().to_string(),
            template: Some(template),
        }
    }

    /// Handle the template will have once executed.
    pub fn id(&self) -> TemplateId {
        self.id
    }
}

impl Action for AddTemplate {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let template = self.template.take().ok_or(lf_core::LfError::Invariant {
            what: "template is already registered",
        })?;
        if let Err(err) = designer.insert_template(self.id, template.clone()) {
            self.template = Some(template);
            return Err(err);
        }
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        if self.template.is_some() {
            return Err(not_executed(&*self));
        }
        self.template = Some(designer.remove_template(self.id)?);
        Ok(())
    }

    fn name(&self) -> String {
        format!("Added IC {}", self.name)
    }
}
