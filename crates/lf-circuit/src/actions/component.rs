use lf_core::{CompId, PortId};

use crate::component::{ComponentSpec, RemovedComponent};
use crate::designer::Designer;
use crate::error::CircuitResult;

use super::{Action, not_executed};

/// Place a new component.
#[derive(Debug)]
pub struct AddComponent {
    spec: ComponentSpec,
    id: CompId,
    inputs: Vec<PortId>,
    outputs: Vec<PortId>,
}

impl AddComponent {
    /// Reserve handles for the component and its ports.
    pub fn new(designer: &mut Designer, spec: ComponentSpec) -> CircuitResult<Self> {
        let id = designer.reserve_component();
        let inputs = (0..spec.inputs.count()?)
            .map(|_| designer.reserve_port())
            .collect();
        let outputs = (0..spec.outputs.count()?)
            .map(|_| designer.reserve_port())
            .collect();
        Ok(Self {
            spec,
            id,
            inputs,
            outputs,
        })
    }

    /// Handle the component will have once executed.
    pub fn id(&self) -> CompId {
        self.id
    }

    pub fn inputs(&self) -> &[PortId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortId] {
        &self.outputs
    }
}

impl Action for AddComponent {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        designer.add_component(self.id, &self.spec, &self.inputs, &self.outputs)
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        designer.remove_component(self.id)?;
        Ok(())
    }

    fn name(&self) -> String {
        format!("Added {}", self.spec.name)
    }
}

/// Delete a component that has no wires attached.
#[derive(Debug)]
pub struct RemoveComponent {
    id: CompId,
    label: String,
    removed: Option<RemovedComponent>,
}

impl RemoveComponent {
    pub fn new(designer: &Designer, id: CompId) -> CircuitResult<Self> {
        let label = designer.circuit().try_component(id)?.name.clone();
        Ok(Self {
            id,
            label,
            removed: None,
        })
    }

    pub fn id(&self) -> CompId {
        self.id
    }
}

impl Action for RemoveComponent {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        self.removed = Some(designer.remove_component(self.id)?);
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let removed = self
            .removed
            .as_ref()
            .ok_or_else(|| not_executed(&*self))?
            .clone();
        designer.restore_component(removed)?;
        self.removed = None;
        Ok(())
    }

    fn name(&self) -> String {
        format!("Deleted {}", self.label)
    }
}
