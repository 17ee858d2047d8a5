//! Integrated circuits: reusable sub-circuit templates and their instances.
//!
//! A template is a settled circuit plus its boundary: the switches and
//! buttons that become the IC's inputs and the LEDs that become its outputs,
//! each in the order given. An instance owns a private copy of the template
//! circuit and evaluates by driving the inner inputs, draining the inner
//! circuit and reading the inner LEDs.

use lf_core::{CompId, TemplateId};

use crate::circuit::Circuit;
use crate::component::ComponentSpec;
use crate::engine::EngineConfig;
use crate::error::{CircuitError, CircuitResult};
use crate::kind::{ComponentKind, Evaluation};
use crate::port::PortDirection;

#[derive(Debug, Clone, PartialEq)]
pub struct IcTemplate {
    name: String,
    circuit: Circuit,
    inputs: Vec<CompId>,
    outputs: Vec<CompId>,
}

impl IcTemplate {
    /// Build a template with an explicit boundary.
    pub fn new(
        name: impl Into<String>,
        circuit: Circuit,
        inputs: Vec<CompId>,
        outputs: Vec<CompId>,
    ) -> CircuitResult<Self> {
        for id in &inputs {
            let component = circuit.component(*id).ok_or_else(|| CircuitError::InvalidTemplate {
                what: format!("input {id} is not in the circuit"),
            })?;
            if !component.kind.is_user_input() {
                return Err(CircuitError::InvalidTemplate {
                    what: format!("input '{}' is not a switch or button", component.name),
                });
            }
        }
        for id in &outputs {
            let component = circuit.component(*id).ok_or_else(|| CircuitError::InvalidTemplate {
                what: format!("output {id} is not in the circuit"),
            })?;
            if !matches!(component.kind, ComponentKind::Led { .. }) {
                return Err(CircuitError::InvalidTemplate {
                    what: format!("output '{}' is not an LED", component.name),
                });
            }
        }
        let mut sorted = inputs.clone();
        sorted.extend(&outputs);
        sorted.sort();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(CircuitError::InvalidTemplate {
                what: "boundary lists a component twice".to_string(),
            });
        }
        Ok(Self {
            name: name.into(),
            circuit,
            inputs,
            outputs,
        })
    }

    /// Build a template whose boundary is every switch/button (inputs) and
    /// every LED (outputs) of the circuit, in creation order.
    pub fn from_circuit(name: impl Into<String>, circuit: Circuit) -> CircuitResult<Self> {
        let inputs = circuit
            .components()
            .filter(|c| c.kind.is_user_input())
            .map(|c| c.id)
            .collect();
        let outputs = circuit
            .components()
            .filter(|c| matches!(c.kind, ComponentKind::Led { .. }))
            .map(|c| c.id)
            .collect();
        Self::new(name, circuit, inputs, outputs)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn inputs(&self) -> &[CompId] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[CompId] {
        &self.outputs
    }

    /// Template ids of IC instances inside this template's circuit.
    pub fn nested_templates(&self) -> Vec<TemplateId> {
        self.circuit
            .components()
            .filter_map(|c| match &c.kind {
                ComponentKind::Ic(ic) => Some(ic.template()),
                _ => None,
            })
            .collect()
    }

    /// A fresh instance of this template registered as `id`.
    pub fn instantiate(&self, id: TemplateId) -> IcInstance {
        IcInstance {
            template: id,
            circuit: self.circuit.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
        }
    }

    /// Spec for placing an instance of this template, named after it.
    pub fn spec(&self, id: TemplateId) -> ComponentSpec {
        ComponentSpec::new(ComponentKind::Ic(Box::new(self.instantiate(id)))).named(self.name.clone())
    }
}

/// Saved state of one component inside an instance: its kind (which
/// carries any latched contents) and its output signals.
#[derive(Debug, Clone, PartialEq)]
pub struct InnerState {
    pub kind: ComponentKind,
    pub outputs: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IcInstance {
    template: TemplateId,
    circuit: Circuit,
    inputs: Vec<CompId>,
    outputs: Vec<CompId>,
}

impl IcInstance {
    pub fn template(&self) -> TemplateId {
        self.template
    }

    /// The instance's private inner circuit.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Put saved state back onto the inner circuit. `states` lists the inner
    /// components in creation order; each must keep its type (and, for
    /// nested instances, its template). Wire signals are resynced from the
    /// restored outputs and nothing is re-evaluated.
    pub fn restore_inner(&mut self, states: Vec<InnerState>) -> CircuitResult<()> {
        let ids: Vec<CompId> = self.circuit.components().map(|c| c.id).collect();
        if ids.len() != states.len() {
            return Err(mismatched_state());
        }
        for (id, state) in ids.into_iter().zip(states) {
            let component = self
                .circuit
                .components
                .get_mut(id)
                .ok_or(CircuitError::UnknownComponent(id))?;
            let same_shape = match (&component.kind, &state.kind) {
                (ComponentKind::Ic(a), ComponentKind::Ic(b)) => a.template() == b.template(),
                (a, b) => a.tag() == b.tag(),
            };
            if !same_shape || state.outputs.len() != component.outputs.len() {
                return Err(mismatched_state());
            }
            component.kind = state.kind;
            self.circuit.set_output_signals(id, &state.outputs)?;
        }
        self.circuit.sync_wire_signals();
        Ok(())
    }

    pub(crate) fn apply(&mut self, inputs: &[bool], config: &EngineConfig) -> CircuitResult<Evaluation> {
        for (i, comp) in self.inputs.iter().enumerate() {
            let value = inputs.get(i).copied().unwrap_or(false);
            self.circuit.set_user_input(*comp, value, config)?;
        }
        let report = self.circuit.drain(config)?;
        Ok(Evaluation {
            outputs: self.read_outputs()?,
            capped: report.is_capped(),
        })
    }

    /// Deliver a clock tick to every clock inside the instance, nested
    /// instances included, and settle the inner circuit. Returns how many
    /// clocks ticked along with the new outputs.
    pub(crate) fn tick(&mut self, config: &EngineConfig) -> CircuitResult<(usize, Evaluation)> {
        let ticked = self.circuit.tick_clocks(None, config)?;
        let report = self.circuit.drain(config)?;
        let evaluation = Evaluation {
            outputs: self.read_outputs()?,
            capped: report.is_capped(),
        };
        Ok((ticked, evaluation))
    }

    fn read_outputs(&self) -> CircuitResult<Vec<bool>> {
        let mut outputs = Vec::with_capacity(self.outputs.len());
        for led in &self.outputs {
            let port = self
                .circuit
                .try_component(*led)?
                .input(0)
                .ok_or(CircuitError::NoSuchPort {
                    comp: *led,
                    direction: PortDirection::Input,
                    index: 0,
                })?;
            outputs.push(self.circuit.signal(port)?);
        }
        Ok(outputs)
    }
}

fn mismatched_state() -> CircuitError {
    lf_core::LfError::InvalidArg {
        what: "saved IC state does not match its template",
    }
    .into()
}
