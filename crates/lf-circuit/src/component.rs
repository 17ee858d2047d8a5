//! Components: ordered input/output ports plus a transfer function.

use lf_core::{ClampedValue, CompId, PortId};

use crate::kind::ComponentKind;
use crate::port::{Port, PortDirection};

/// A component placed in a circuit.
///
/// Port lists are ordered and their lengths always equal the current values
/// of `input_count` / `output_count`.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub id: CompId,
    pub name: String,
    pub kind: ComponentKind,
    pub(crate) inputs: Vec<PortId>,
    pub(crate) outputs: Vec<PortId>,
    pub(crate) input_count: ClampedValue,
    pub(crate) output_count: ClampedValue,
}

impl Component {
    pub fn inputs(&self) -> &[PortId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[PortId] {
        &self.outputs
    }

    pub fn ports(&self, direction: PortDirection) -> &[PortId] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    pub fn input(&self, index: usize) -> Option<PortId> {
        self.inputs.get(index).copied()
    }

    pub fn output(&self, index: usize) -> Option<PortId> {
        self.outputs.get(index).copied()
    }

    pub fn input_count(&self) -> ClampedValue {
        self.input_count
    }

    pub fn output_count(&self) -> ClampedValue {
        self.output_count
    }

    pub fn count(&self, direction: PortDirection) -> ClampedValue {
        match direction {
            PortDirection::Input => self.input_count,
            PortDirection::Output => self.output_count,
        }
    }

    pub(crate) fn ports_mut(&mut self, direction: PortDirection) -> &mut Vec<PortId> {
        match direction {
            PortDirection::Input => &mut self.inputs,
            PortDirection::Output => &mut self.outputs,
        }
    }

    pub(crate) fn count_mut(&mut self, direction: PortDirection) -> &mut ClampedValue {
        match direction {
            PortDirection::Input => &mut self.input_count,
            PortDirection::Output => &mut self.output_count,
        }
    }
}

/// Everything needed to place a new component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub name: String,
    pub kind: ComponentKind,
    pub inputs: ClampedValue,
    pub outputs: ClampedValue,
}

impl ComponentSpec {
    /// Spec with the kind's default name and port counts.
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            name: kind.label().to_string(),
            inputs: kind.input_count(),
            outputs: kind.output_count(),
            kind,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Request an input count; clamped to the kind's bounds.
    pub fn with_inputs(mut self, count: usize) -> Self {
        self.inputs.set_value(count as i64);
        self
    }

    /// Request an output count; clamped to the kind's bounds.
    pub fn with_outputs(mut self, count: usize) -> Self {
        self.outputs.set_value(count as i64);
        self
    }
}

/// A component taken out of the circuit together with its ports, ready to be
/// put back unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedComponent {
    pub component: Component,
    pub ports: Vec<Port>,
    pub(crate) was_selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_defaults_follow_kind() {
        let spec = ComponentSpec::new(ComponentKind::And);
        assert_eq!(spec.name, "AND Gate");
        assert_eq!(spec.inputs.count(), Ok(2));
        assert_eq!(spec.outputs.count(), Ok(1));
    }

    #[test]
    fn spec_counts_are_clamped() {
        let spec = ComponentSpec::new(ComponentKind::Or)
            .named("wide or")
            .with_inputs(42);
        assert_eq!(spec.inputs.count(), Ok(8));

        let not = ComponentSpec::new(ComponentKind::Not).with_inputs(3);
        assert_eq!(not.inputs.count(), Ok(1));
    }
}
