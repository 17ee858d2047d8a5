//! Building a whole designer from stored parts.
//!
//! Used when loading a saved circuit. Construction is not an edit, so it does
//! not go through actions and records no history.

use lf_core::{CompId, PortId};

use crate::component::ComponentSpec;
use crate::designer::Designer;
use crate::engine::EngineConfig;
use crate::error::{CircuitError, CircuitResult};
use crate::ic::IcTemplate;

/// One stored component.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub spec: ComponentSpec,
    /// Stored output signals. Missing values are computed by evaluating the
    /// component once the wiring is in place.
    pub outputs: Option<Vec<bool>>,
}

impl Part {
    pub fn new(spec: ComponentSpec) -> Self {
        Self {
            spec,
            outputs: None,
        }
    }

    pub fn with_outputs(mut self, outputs: Vec<bool>) -> Self {
        self.outputs = Some(outputs);
        self
    }
}

/// One stored wire, as `(component index, port index)` pairs into the part
/// list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartWire {
    pub from: (usize, usize),
    pub to: (usize, usize),
}

impl Designer {
    /// Build a designer from templates, components and wires.
    ///
    /// Template `i` gets the `i`-th template handle and part `i` the `i`-th
    /// component handle, so indices stored alongside the parts stay valid.
    /// Parts with stored outputs keep them exactly; the rest are evaluated,
    /// and the circuit is settled once at the end.
    pub fn from_parts(
        config: EngineConfig,
        templates: Vec<IcTemplate>,
        parts: &[Part],
        wires: &[PartWire],
    ) -> CircuitResult<Self> {
        let mut designer = Designer::with_config(config);
        for template in templates {
            let id = designer.reserve_template();
            designer.insert_template(id, template)?;
        }

        let mut ids: Vec<CompId> = Vec::with_capacity(parts.len());
        for part in parts {
            let id = designer.reserve_component();
            let inputs: Vec<PortId> = (0..part.spec.inputs.count()?)
                .map(|_| designer.reserve_port())
                .collect();
            let outputs: Vec<PortId> = (0..part.spec.outputs.count()?)
                .map(|_| designer.reserve_port())
                .collect();
            designer
                .circuit_mut()
                .place_component(id, &part.spec, &inputs, &outputs)?;
            ids.push(id);
        }

        for wire in wires {
            let source = port_at(&designer, &ids, wire.from, true)?;
            let target = port_at(&designer, &ids, wire.to, false)?;
            let id = designer.reserve_wire();
            designer.attach(id, source, target)?;
        }

        for (part, id) in parts.iter().zip(&ids) {
            if let Some(values) = &part.outputs {
                designer.circuit_mut().set_output_signals(*id, values)?;
            }
        }
        designer.circuit_mut().sync_wire_signals();

        for (part, id) in parts.iter().zip(&ids) {
            if part.outputs.is_none() {
                designer.circuit_mut().evaluate(*id, &config)?;
            }
        }
        designer.settle()?;
        Ok(designer)
    }
}

fn port_at(
    designer: &Designer,
    ids: &[CompId],
    (comp, port): (usize, usize),
    output: bool,
) -> CircuitResult<PortId> {
    let id = *ids.get(comp).ok_or(lf_core::LfError::InvalidArg {
        what: "wire refers to a missing component",
    })?;
    let component = designer.circuit().try_component(id)?;
    let found = if output {
        component.output(port)
    } else {
        component.input(port)
    };
    found.ok_or(CircuitError::Core(lf_core::LfError::InvalidArg {
        what: "wire refers to a missing port",
    }))
}
