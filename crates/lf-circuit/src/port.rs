//! Ports: typed endpoints owned by exactly one component.

use lf_core::{CompId, PortId, WireId};

/// Direction of a port. Also used to pick a side of a component when
/// resizing its port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn label(self) -> &'static str {
        match self {
            PortDirection::Input => "input",
            PortDirection::Output => "output",
        }
    }
}

/// A port of a component.
///
/// An input port has at most one incoming wire; an output port may drive any
/// number of wires. `wires` is kept sorted by handle, which is creation order,
/// so fan-out is always visited in the order the wires were made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub parent: CompId,
    pub direction: PortDirection,
    /// Position within the parent's input or output list.
    pub index: usize,
    pub signal: bool,
    pub(crate) wires: Vec<WireId>,
}

impl Port {
    pub(crate) fn new(id: PortId, parent: CompId, direction: PortDirection, index: usize) -> Self {
        Self {
            id,
            parent,
            direction,
            index,
            signal: false,
            wires: Vec::new(),
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == PortDirection::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == PortDirection::Output
    }

    /// Wires touching this port, in creation order.
    pub fn wires(&self) -> &[WireId] {
        &self.wires
    }

    /// The wire feeding an input port, if any.
    pub fn incoming(&self) -> Option<WireId> {
        if self.is_input() {
            self.wires.first().copied()
        } else {
            None
        }
    }

    pub(crate) fn attach(&mut self, wire: WireId) {
        if let Err(pos) = self.wires.binary_search(&wire) {
            self.wires.insert(pos, wire);
        }
    }

    pub(crate) fn detach(&mut self, wire: WireId) {
        self.wires.retain(|w| *w != wire);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::Id;

    #[test]
    fn attach_keeps_creation_order() {
        let mut port = Port::new(Id::from_index(0), Id::from_index(0), PortDirection::Output, 0);
        port.attach(Id::from_index(5));
        port.attach(Id::from_index(2));
        port.attach(Id::from_index(9));
        port.attach(Id::from_index(2));
        assert_eq!(
            port.wires(),
            &[Id::from_index(2), Id::from_index(5), Id::from_index(9)]
        );
        assert_eq!(port.incoming(), None);

        port.detach(Id::from_index(5));
        assert_eq!(port.wires().len(), 2);
    }

    #[test]
    fn input_reports_incoming() {
        let mut port = Port::new(Id::from_index(1), Id::from_index(0), PortDirection::Input, 0);
        assert_eq!(port.incoming(), None);
        port.attach(Id::from_index(3));
        assert_eq!(port.incoming(), Some(Id::from_index(3)));
    }
}
