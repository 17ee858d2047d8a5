//! Wires: directed edges from an output port to an input port.

use lf_core::{PortId, WireId};

/// A wire carries the signal of its source port to its target port.
///
/// `signal` is whatever the source held the last time a propagation pass
/// processed this wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wire {
    pub id: WireId,
    pub source: PortId,
    pub target: PortId,
    pub signal: bool,
}
