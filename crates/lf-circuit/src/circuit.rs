//! The circuit graph: components, ports and wires in handle-addressed arenas.
//!
//! Components, ports and wires refer to each other by handle only. The
//! circuit is the sole owner of all three arenas, which keeps the graph free
//! of reference cycles and makes snapshots plain data copies.
//!
//! Structural mutators are crate-private: outside this crate the graph only
//! changes through actions.

use std::collections::VecDeque;

use lf_core::{Arena, CompId, PortId, WireId};

use crate::component::{Component, ComponentSpec, RemovedComponent};
use crate::engine::{EngineConfig, Pending, Phase};
use crate::error::{CircuitError, CircuitResult, ConnectionError};
use crate::kind::ComponentKind;
use crate::port::{Port, PortDirection};
use crate::wire::Wire;

#[derive(Debug, Clone)]
pub struct Circuit {
    pub(crate) components: Arena<Component>,
    pub(crate) ports: Arena<Port>,
    pub(crate) wires: Arena<Wire>,
    pub(crate) queue: VecDeque<Pending>,
    pub(crate) phase: Phase,
    /// Set when an IC evaluation outside a pass hit its inner step cap.
    pub(crate) inner_capped: bool,
}

impl Default for Circuit {
    fn default() -> Self {
        Self::new()
    }
}

/// Circuits compare by graph content: components, ports, wires and their
/// signals. Engine bookkeeping is ignored.
impl PartialEq for Circuit {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components && self.ports == other.ports && self.wires == other.wires
    }
}

impl Circuit {
    pub fn new() -> Self {
        Self {
            components: Arena::new("component"),
            ports: Arena::new("port"),
            wires: Arena::new("wire"),
            queue: VecDeque::new(),
            phase: Phase::Idle,
            inner_capped: false,
        }
    }

    pub fn component(&self, id: CompId) -> Option<&Component> {
        self.components.get(id)
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(id)
    }

    pub fn wire(&self, id: WireId) -> Option<&Wire> {
        self.wires.get(id)
    }

    pub fn try_component(&self, id: CompId) -> CircuitResult<&Component> {
        self.components
            .get(id)
            .ok_or(CircuitError::UnknownComponent(id))
    }

    pub fn try_port(&self, id: PortId) -> CircuitResult<&Port> {
        self.ports.get(id).ok_or(CircuitError::UnknownPort(id))
    }

    pub fn try_wire(&self, id: WireId) -> CircuitResult<&Wire> {
        self.wires.get(id).ok_or(CircuitError::UnknownWire(id))
    }

    /// Components in creation order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter().map(|(_, c)| c)
    }

    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter().map(|(_, p)| p)
    }

    /// Wires in creation order.
    pub fn wires(&self) -> impl Iterator<Item = &Wire> {
        self.wires.iter().map(|(_, w)| w)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }

    /// First component with the given name.
    pub fn find(&self, name: &str) -> Option<CompId> {
        self.components().find(|c| c.name == name).map(|c| c.id)
    }

    pub fn signal(&self, port: PortId) -> CircuitResult<bool> {
        Ok(self.try_port(port)?.signal)
    }

    pub fn signals(&self, comp: CompId, direction: PortDirection) -> CircuitResult<Vec<bool>> {
        self.try_component(comp)?
            .ports(direction)
            .iter()
            .map(|p| self.signal(*p))
            .collect()
    }

    /// All wires touching any port of `comp`, in creation order.
    pub fn incident_wires(&self, comp: CompId) -> CircuitResult<Vec<WireId>> {
        let component = self.try_component(comp)?;
        let mut wires: Vec<WireId> = component
            .inputs
            .iter()
            .chain(component.outputs.iter())
            .filter_map(|p| self.ports.get(*p))
            .flat_map(|p| p.wires.iter().copied())
            .collect();
        wires.sort();
        wires.dedup();
        Ok(wires)
    }

    pub(crate) fn reserve_component(&mut self) -> CompId {
        self.components.reserve()
    }

    pub(crate) fn reserve_port(&mut self) -> PortId {
        self.ports.reserve()
    }

    pub(crate) fn reserve_wire(&mut self) -> WireId {
        self.wires.reserve()
    }

    /// Place a component under a reserved handle, creating its ports from
    /// the reserved port handles, and compute its initial outputs.
    pub(crate) fn insert_component(
        &mut self,
        id: CompId,
        spec: &ComponentSpec,
        inputs: &[PortId],
        outputs: &[PortId],
        config: &EngineConfig,
    ) -> CircuitResult<()> {
        self.place_component(id, spec, inputs, outputs)?;
        // No wires yet, so this only sets the component's own outputs.
        self.evaluate(id, config)
    }

    /// Like [`Circuit::insert_component`] but leaves every port low.
    pub(crate) fn place_component(
        &mut self,
        id: CompId,
        spec: &ComponentSpec,
        inputs: &[PortId],
        outputs: &[PortId],
    ) -> CircuitResult<()> {
        let n_in = spec.inputs.count()?;
        let n_out = spec.outputs.count()?;
        if inputs.len() < n_in || outputs.len() < n_out {
            return Err(lf_core::LfError::InvalidArg {
                what: "not enough reserved port handles",
            }
            .into());
        }
        let inputs = &inputs[..n_in];
        let outputs = &outputs[..n_out];
        if self.components.contains(id) || inputs.iter().chain(outputs).any(|p| self.ports.contains(*p)) {
            return Err(lf_core::LfError::Invariant {
                what: "handle already in use",
            }
            .into());
        }

        for (index, port) in inputs.iter().enumerate() {
            self.ports
                .insert(*port, Port::new(*port, id, PortDirection::Input, index))?;
        }
        for (index, port) in outputs.iter().enumerate() {
            self.ports
                .insert(*port, Port::new(*port, id, PortDirection::Output, index))?;
        }
        self.components.insert(
            id,
            Component {
                id,
                name: spec.name.clone(),
                kind: spec.kind.clone(),
                inputs: inputs.to_vec(),
                outputs: outputs.to_vec(),
                input_count: spec.inputs,
                output_count: spec.outputs,
            },
        )?;
        Ok(())
    }

    /// Write output signals directly, without scheduling anything.
    pub(crate) fn set_output_signals(&mut self, comp: CompId, values: &[bool]) -> CircuitResult<()> {
        let outputs = self.try_component(comp)?.outputs.clone();
        for (port, value) in outputs.into_iter().zip(values) {
            if let Some(port) = self.ports.get_mut(port) {
                port.signal = *value;
            }
        }
        Ok(())
    }

    /// Copy every source signal onto its wires and on to the wired inputs,
    /// without re-evaluating anything.
    pub(crate) fn sync_wire_signals(&mut self) {
        let wires: Vec<(WireId, PortId, PortId)> =
            self.wires().map(|w| (w.id, w.source, w.target)).collect();
        for (id, source, target) in wires {
            let signal = self.ports.get(source).is_some_and(|p| p.signal);
            if let Some(wire) = self.wires.get_mut(id) {
                wire.signal = signal;
            }
            if let Some(port) = self.ports.get_mut(target) {
                port.signal = signal;
            }
        }
    }

    /// Take a component and its ports out of the graph. Fails while any wire
    /// is still attached.
    pub(crate) fn remove_component(&mut self, id: CompId) -> CircuitResult<RemovedComponent> {
        let attached = self.incident_wires(id)?.len();
        if attached > 0 {
            return Err(CircuitError::WiresAttached {
                comp: id,
                count: attached,
            });
        }
        let component = self.components.remove(id)?;
        let mut ports = Vec::with_capacity(component.inputs.len() + component.outputs.len());
        for port in component.inputs.iter().chain(component.outputs.iter()) {
            ports.push(self.ports.remove(*port)?);
        }
        Ok(RemovedComponent {
            component,
            ports,
            was_selected: false,
        })
    }

    /// Put a removed component back exactly as it was.
    pub(crate) fn restore_component(&mut self, removed: RemovedComponent) -> CircuitResult<()> {
        let RemovedComponent {
            component, ports, ..
        } = removed;
        if self.components.contains(component.id) || ports.iter().any(|p| self.ports.contains(p.id)) {
            return Err(lf_core::LfError::Invariant {
                what: "handle already in use",
            }
            .into());
        }
        for port in ports {
            self.ports.insert(port.id, port)?;
        }
        self.components.insert(component.id, component)?;
        Ok(())
    }

    /// Add a wire between two existing ports without touching any signal
    /// other than the wire's own.
    pub(crate) fn attach_wire(&mut self, id: WireId, source: PortId, target: PortId) -> CircuitResult<()> {
        let src = self
            .ports
            .get(source)
            .ok_or(ConnectionError::MissingPort { port: source })?;
        let tgt = self
            .ports
            .get(target)
            .ok_or(ConnectionError::MissingPort { port: target })?;
        if !src.is_output() || !tgt.is_input() {
            return Err(ConnectionError::WrongDirection {
                from: source,
                to: target,
            }
            .into());
        }
        if let Some(existing) = tgt.incoming() {
            return Err(ConnectionError::InputOccupied {
                port: target,
                existing,
            }
            .into());
        }
        let signal = src.signal;
        self.wires.insert(
            id,
            Wire {
                id,
                source,
                target,
                signal,
            },
        )?;
        if let Some(port) = self.ports.get_mut(source) {
            port.attach(id);
        }
        if let Some(port) = self.ports.get_mut(target) {
            port.attach(id);
        }
        Ok(())
    }

    /// Remove a wire from the graph and from both of its ports.
    pub(crate) fn detach_wire(&mut self, id: WireId) -> CircuitResult<Wire> {
        let wire = self
            .wires
            .remove(id)
            .map_err(|_| CircuitError::UnknownWire(id))?;
        for port in [wire.source, wire.target] {
            if let Some(port) = self.ports.get_mut(port) {
                port.detach(id);
            }
        }
        Ok(wire)
    }

    /// Change the number of ports on one side of a component.
    ///
    /// The request is clamped by the component's bounds. Shrinking removes
    /// the trailing ports and fails if any of them still has a wire. Growing
    /// takes new port handles from `fresh`, in order. The component is
    /// re-evaluated afterwards.
    pub(crate) fn resize_ports(
        &mut self,
        comp: CompId,
        direction: PortDirection,
        requested: i64,
        fresh: &[PortId],
        config: &EngineConfig,
    ) -> CircuitResult<()> {
        let component = self.try_component(comp)?;
        let current = component.ports(direction).to_vec();
        let mut count = component.count(direction);
        count.set_value(requested);
        let target = count.count()?;

        if target < current.len() {
            let attached: usize = current[target..]
                .iter()
                .filter_map(|p| self.ports.get(*p))
                .map(|p| p.wires.len())
                .sum();
            if attached > 0 {
                return Err(CircuitError::WiresAttached {
                    comp,
                    count: attached,
                });
            }
            for port in &current[target..] {
                self.ports.remove(*port)?;
            }
        } else if target > current.len() {
            let needed = target - current.len();
            if fresh.len() < needed {
                return Err(lf_core::LfError::InvalidArg {
                    what: "not enough reserved port handles",
                }
                .into());
            }
            if fresh[..needed].iter().any(|p| self.ports.contains(*p)) {
                return Err(lf_core::LfError::Invariant {
                    what: "handle already in use",
                }
                .into());
            }
            for (offset, port) in fresh[..needed].iter().enumerate() {
                self.ports.insert(
                    *port,
                    Port::new(*port, comp, direction, current.len() + offset),
                )?;
            }
        }

        let component = self
            .components
            .get_mut(comp)
            .ok_or(CircuitError::UnknownComponent(comp))?;
        let ports = component.ports_mut(direction);
        ports.truncate(target);
        if target > ports.len() {
            let needed = target - ports.len();
            ports.extend_from_slice(&fresh[..needed]);
        }
        *component.count_mut(direction) = count;

        self.evaluate(comp, config)?;
        Ok(())
    }

    /// Set the state of a switch or button and re-evaluate it.
    pub(crate) fn set_user_input(&mut self, comp: CompId, value: bool, config: &EngineConfig) -> CircuitResult<()> {
        let component = self
            .components
            .get_mut(comp)
            .ok_or(CircuitError::UnknownComponent(comp))?;
        match &mut component.kind {
            ComponentKind::Switch { on } => *on = value,
            ComponentKind::Button { pressed } => *pressed = value,
            _ => {
                return Err(CircuitError::InvalidKind {
                    comp,
                    expected: "a switch or button",
                });
            }
        }
        self.evaluate(comp, config)?;
        Ok(())
    }

    /// Deliver a clock-tick event: toggle `target`, or every clock when
    /// `target` is `None`. A tick to every clock also reaches the clocks
    /// inside IC instances. Returns how many clocks ticked.
    pub(crate) fn tick_clocks(&mut self, target: Option<CompId>, config: &EngineConfig) -> CircuitResult<usize> {
        let clocks: Vec<CompId> = match target {
            Some(id) => {
                let component = self.try_component(id)?;
                if !matches!(component.kind, ComponentKind::Clock { .. }) {
                    return Err(CircuitError::InvalidKind {
                        comp: id,
                        expected: "a clock",
                    });
                }
                vec![id]
            }
            None => self
                .components()
                .filter(|c| matches!(c.kind, ComponentKind::Clock { .. }))
                .map(|c| c.id)
                .collect(),
        };
        for id in &clocks {
            if let Some(Component {
                kind: ComponentKind::Clock { on, .. },
                ..
            }) = self.components.get_mut(*id)
            {
                *on = !*on;
            }
            self.evaluate(*id, config)?;
        }

        let mut ticked = clocks.len();
        if target.is_none() {
            let ics: Vec<CompId> = self
                .components()
                .filter(|c| matches!(c.kind, ComponentKind::Ic(_)))
                .map(|c| c.id)
                .collect();
            for id in ics {
                let (count, evaluation, ports) = match self.components.get_mut(id) {
                    Some(Component {
                        kind: ComponentKind::Ic(ic),
                        outputs,
                        ..
                    }) => {
                        let (count, evaluation) = ic.tick(config)?;
                        (count, evaluation, outputs.clone())
                    }
                    _ => continue,
                };
                if count == 0 {
                    continue;
                }
                ticked += count;
                if evaluation.capped {
                    self.inner_capped = true;
                }
                for (port, value) in ports.into_iter().zip(evaluation.outputs) {
                    self.activate_output(port, value)?;
                }
            }
        }
        Ok(ticked)
    }
}
