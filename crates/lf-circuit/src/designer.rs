//! The designer session: one circuit plus everything edited alongside it.

use std::collections::BTreeSet;
use std::fmt;

use lf_core::{Arena, CompId, PortId, TemplateId, WireId};

use crate::circuit::Circuit;
use crate::component::{Component, ComponentSpec, RemovedComponent};
use crate::engine::{EngineConfig, PassReport};
use crate::error::{CircuitError, CircuitResult};
use crate::ic::IcTemplate;
use crate::kind::ComponentKind;
use crate::port::{Port, PortDirection};
use crate::snapshot::SignalSnapshot;
use crate::wire::Wire;

/// Called once after every completed propagation pass.
pub type RenderCallback = Box<dyn FnMut(&PassReport)>;

/// An editable property of a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Name(String),
    /// LED colour.
    Color(String),
    /// Clock period in milliseconds.
    ClockPeriod(u32),
}

impl Property {
    pub fn label(&self) -> &'static str {
        match self {
            Property::Name(_) => "Name",
            Property::Color(_) => "Color",
            Property::ClockPeriod(_) => "Clock Period",
        }
    }
}

/// One circuit-editing session.
///
/// Owns the circuit, the IC template library, the selection and the engine
/// configuration. Everything is readable; mutation from outside the crate
/// goes through [`crate::Action`]s, apart from [`Designer::propagate`].
pub struct Designer {
    circuit: Circuit,
    templates: Arena<IcTemplate>,
    selection: BTreeSet<CompId>,
    config: EngineConfig,
    last_pass: Option<PassReport>,
    render: Option<RenderCallback>,
}

impl fmt::Debug for Designer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Designer")
            .field("circuit", &self.circuit)
            .field("templates", &self.templates.len())
            .field("selection", &self.selection)
            .field("config", &self.config)
            .field("last_pass", &self.last_pass)
            .finish_non_exhaustive()
    }
}

impl Default for Designer {
    fn default() -> Self {
        Self::new()
    }
}

impl Designer {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            circuit: Circuit::new(),
            templates: Arena::new("template"),
            selection: BTreeSet::new(),
            config,
            last_pass: None,
            render: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    pub fn set_render_callback(&mut self, callback: impl FnMut(&PassReport) + 'static) {
        self.render = Some(Box::new(callback));
    }

    pub fn clear_render_callback(&mut self) {
        self.render = None;
    }

    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.circuit.component(id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.circuit.port(id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.circuit.wire(id)
    }

    pub fn signal(&self, port: PortId) -> CircuitResult<bool> {
        self.circuit.signal(port)
    }

    /// Signal on input `index` of `comp`.
    pub fn input_signal(&self, comp: CompId, index: usize) -> CircuitResult<bool> {
        let port = self
            .circuit
            .try_component(comp)?
            .input(index)
            .ok_or(CircuitError::NoSuchPort {
                comp,
                direction: PortDirection::Input,
                index,
            })?;
        self.signal(port)
    }

    /// Signal on output `index` of `comp`.
    pub fn output_signal(&self, comp: CompId, index: usize) -> CircuitResult<bool> {
        let port = self
            .circuit
            .try_component(comp)?
            .output(index)
            .ok_or(CircuitError::NoSuchPort {
                comp,
                direction: PortDirection::Output,
                index,
            })?;
        self.signal(port)
    }

    pub fn template(&self, id: TemplateId) -> Option<&IcTemplate> {
        self.templates.get(id)
    }

    /// Registered templates in registration order.
    pub fn templates(&self) -> impl Iterator<Item = (TemplateId, &IcTemplate)> {
        self.templates.iter()
    }

    /// Spec for placing an instance of a registered template.
    pub fn ic_spec(&self, id: TemplateId) -> CircuitResult<ComponentSpec> {
        let template = self
            .templates
            .get(id)
            .ok_or(CircuitError::UnknownTemplate(id))?;
        Ok(template.spec(id))
    }

    pub fn selection(&self) -> &BTreeSet<CompId> {
        &self.selection
    }

    pub fn is_selected(&self, id: CompId) -> bool {
        self.selection.contains(&id)
    }

    pub fn last_pass(&self) -> Option<&PassReport> {
        self.last_pass.as_ref()
    }

    /// Copy of the selected components and the wires between them, for
    /// building an IC template from a selection.
    pub fn selected_circuit(&self) -> CircuitResult<Circuit> {
        let mut circuit = self.circuit.clone();
        let wires: Vec<WireId> = circuit
            .wires()
            .filter(|w| {
                let inside = |port: PortId| {
                    circuit
                        .port(port)
                        .is_some_and(|p| self.selection.contains(&p.parent))
                };
                !(inside(w.source) && inside(w.target))
            })
            .map(|w| w.id)
            .collect();
        for wire in wires {
            let removed = circuit.detach_wire(wire)?;
            circuit.drive_input(removed.target, false, &self.config)?;
        }
        let outside: Vec<CompId> = circuit
            .components()
            .map(|c| c.id)
            .filter(|id| !self.selection.contains(id))
            .collect();
        for comp in outside {
            circuit.remove_component(comp)?;
        }
        circuit.drain(&self.config)?;
        Ok(circuit)
    }

    /// Enqueue `signal` on `wire` and settle. The change is not recorded
    /// in any history.
    pub fn propagate(&mut self, wire: WireId, signal: bool) -> CircuitResult<PassReport> {
        self.circuit.try_wire(wire)?;
        self.circuit.schedule(wire, signal);
        self.settle()
    }

    /// Drain the worklist and notify the render callback.
    pub(crate) fn settle(&mut self) -> CircuitResult<PassReport> {
        let report = self.circuit.drain(&self.config)?;
        if let Some(render) = self.render.as_mut() {
            render(&report);
        }
        self.last_pass = Some(report.clone());
        Ok(report)
    }

    pub(crate) fn circuit_mut(&mut self) -> &mut Circuit {
        &mut self.circuit
    }

    pub(crate) fn reserve_component(&mut self) -> CompId {
        self.circuit.reserve_component()
    }

    pub(crate) fn reserve_port(&mut self) -> PortId {
        self.circuit.reserve_port()
    }

    pub(crate) fn reserve_wire(&mut self) -> WireId {
        self.circuit.reserve_wire()
    }

    pub(crate) fn reserve_template(&mut self) -> TemplateId {
        self.templates.reserve()
    }

    pub(crate) fn add_component(
        &mut self,
        id: CompId,
        spec: &ComponentSpec,
        inputs: &[PortId],
        outputs: &[PortId],
    ) -> CircuitResult<()> {
        if let ComponentKind::Ic(ic) = &spec.kind {
            if !self.templates.contains(ic.template()) {
                return Err(CircuitError::UnknownTemplate(ic.template()));
            }
        }
        self.circuit
            .insert_component(id, spec, inputs, outputs, &self.config)?;
        self.settle()?;
        Ok(())
    }

    pub(crate) fn remove_component(&mut self, id: CompId) -> CircuitResult<RemovedComponent> {
        let mut removed = self.circuit.remove_component(id)?;
        removed.was_selected = self.selection.remove(&id);
        self.settle()?;
        Ok(removed)
    }

    pub(crate) fn restore_component(&mut self, removed: RemovedComponent) -> CircuitResult<()> {
        let id = removed.component.id;
        let selected = removed.was_selected;
        self.circuit.restore_component(removed)?;
        if selected {
            self.selection.insert(id);
        }
        self.settle()?;
        Ok(())
    }

    /// Create a wire, copy the source signal onto it and settle.
    pub(crate) fn connect(&mut self, id: WireId, source: PortId, target: PortId) -> CircuitResult<PassReport> {
        self.attach(id, source, target)?;
        let signal = self.circuit.signal(source)?;
        self.circuit.schedule(id, signal);
        self.settle()
    }

    /// Create a wire without touching any other signal.
    pub(crate) fn attach(&mut self, id: WireId, source: PortId, target: PortId) -> CircuitResult<()> {
        self.circuit.attach_wire(id, source, target)
    }

    /// Remove a wire, drop its input to low and settle.
    pub(crate) fn disconnect(&mut self, id: WireId) -> CircuitResult<Wire> {
        let wire = self.circuit.detach_wire(id)?;
        self.circuit.drive_input(wire.target, false, &self.config)?;
        self.settle()?;
        Ok(wire)
    }

    /// Remove a wire without touching any other signal.
    pub(crate) fn detach(&mut self, id: WireId) -> CircuitResult<Wire> {
        self.circuit.detach_wire(id)
    }

    pub(crate) fn resize_ports(
        &mut self,
        comp: CompId,
        direction: PortDirection,
        requested: i64,
        fresh: &[PortId],
    ) -> CircuitResult<()> {
        self.circuit
            .resize_ports(comp, direction, requested, fresh, &self.config)?;
        self.settle()?;
        Ok(())
    }

    pub(crate) fn set_input_state(&mut self, comp: CompId, on: bool) -> CircuitResult<()> {
        self.circuit.set_user_input(comp, on, &self.config)?;
        self.settle()?;
        Ok(())
    }

    pub(crate) fn tick_clocks(&mut self, target: Option<CompId>) -> CircuitResult<usize> {
        let ticked = self.circuit.tick_clocks(target, &self.config)?;
        self.settle()?;
        Ok(ticked)
    }

    /// Apply a property and return the value it replaced.
    pub(crate) fn set_property(&mut self, comp: CompId, value: Property) -> CircuitResult<Property> {
        let component = self
            .circuit
            .components
            .get_mut(comp)
            .ok_or(CircuitError::UnknownComponent(comp))?;
        let prior = match (value, &mut component.kind) {
            (Property::Name(name), _) => Property::Name(std::mem::replace(&mut component.name, name)),
            (Property::Color(color), ComponentKind::Led { color: current }) => {
                Property::Color(std::mem::replace(current, color))
            }
            (Property::ClockPeriod(period), ComponentKind::Clock { period_ms, .. }) => {
                if period == 0 {
                    return Err(lf_core::LfError::InvalidArg {
                        what: "clock period must be positive",
                    }
                    .into());
                }
                Property::ClockPeriod(std::mem::replace(period_ms, period))
            }
            (Property::Color(_), _) => {
                return Err(CircuitError::InvalidKind {
                    comp,
                    expected: "an LED",
                });
            }
            (Property::ClockPeriod(_), _) => {
                return Err(CircuitError::InvalidKind {
                    comp,
                    expected: "a clock",
                });
            }
        };
        Ok(prior)
    }

    /// Set selection membership and return the previous membership.
    pub(crate) fn set_selected(&mut self, comp: CompId, selected: bool) -> CircuitResult<bool> {
        self.circuit.try_component(comp)?;
        let prior = if selected {
            !self.selection.insert(comp)
        } else {
            self.selection.remove(&comp)
        };
        Ok(prior)
    }

    pub(crate) fn insert_template(&mut self, id: TemplateId, template: IcTemplate) -> CircuitResult<()> {
        if let Some(missing) = template
            .nested_templates()
            .into_iter()
            .find(|t| !self.templates.contains(*t))
        {
            return Err(CircuitError::UnknownTemplate(missing));
        }
        self.templates.insert(id, template)?;
        Ok(())
    }

    /// Take a template out of the library. Fails while any instance, in the
    /// circuit or inside another template, still refers to it.
    pub(crate) fn remove_template(&mut self, id: TemplateId) -> CircuitResult<IcTemplate> {
        if !self.templates.contains(id) {
            return Err(CircuitError::UnknownTemplate(id));
        }
        let used_in_circuit = self
            .circuit
            .components()
            .any(|c| matches!(&c.kind, ComponentKind::Ic(ic) if ic.template() == id));
        let used_in_template = self
            .templates
            .iter()
            .any(|(_, t)| t.nested_templates().contains(&id));
        if used_in_circuit || used_in_template {
            return Err(CircuitError::TemplateInUse(id));
        }
        Ok(self.templates.remove(id)?)
    }

    pub(crate) fn snapshot(&self) -> SignalSnapshot {
        self.circuit.signal_snapshot()
    }

    /// Put signals back to a snapshot and run an (empty) pass so observers
    /// see the change.
    pub(crate) fn restore_snapshot(&mut self, snapshot: &SignalSnapshot) -> CircuitResult<PassReport> {
        self.circuit.restore_signals(snapshot);
        self.settle()
    }
}
