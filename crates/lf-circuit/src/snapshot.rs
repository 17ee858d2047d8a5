//! Point-in-time copies of simulated state.

use lf_core::{CompId, PortId, WireId};

use crate::circuit::Circuit;
use crate::kind::ComponentKind;

/// Every port and wire signal plus the kind (and so the internal state) of
/// every stateful component.
///
/// Restoring a snapshot after a structural undo puts the circuit back on the
/// exact fixed point it had before, including flip-flop contents that
/// re-propagating from the inputs could not recover.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalSnapshot {
    ports: Vec<(PortId, bool)>,
    wires: Vec<(WireId, bool)>,
    states: Vec<(CompId, ComponentKind)>,
}

impl SignalSnapshot {
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    pub fn wire_count(&self) -> usize {
        self.wires.len()
    }
}

impl Circuit {
    pub fn signal_snapshot(&self) -> SignalSnapshot {
        SignalSnapshot {
            ports: self.ports.iter().map(|(id, p)| (id, p.signal)).collect(),
            wires: self.wires.iter().map(|(id, w)| (id, w.signal)).collect(),
            states: self
                .components
                .iter()
                .filter(|(_, c)| c.kind.is_stateful())
                .map(|(id, c)| (id, c.kind.clone()))
                .collect(),
        }
    }

    /// Write the snapshot back and drop any queued work. Entities that no
    /// longer exist are skipped.
    pub(crate) fn restore_signals(&mut self, snapshot: &SignalSnapshot) {
        self.queue.clear();
        for (id, signal) in &snapshot.ports {
            if let Some(port) = self.ports.get_mut(*id) {
                port.signal = *signal;
            }
        }
        for (id, signal) in &snapshot.wires {
            if let Some(wire) = self.wires.get_mut(*id) {
                wire.signal = *signal;
            }
        }
        for (id, kind) in &snapshot.states {
            if let Some(component) = self.components.get_mut(*id) {
                component.kind = kind.clone();
            }
        }
    }
}
