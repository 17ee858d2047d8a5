use lf_core::{CompId, PortId};

use crate::designer::Designer;
use crate::error::CircuitResult;
use crate::port::PortDirection;
use crate::snapshot::SignalSnapshot;

use super::{Action, Disconnect, GroupAction, not_executed};

/// Change how many input or output ports a component has.
///
/// The requested count is clamped to the component's bounds. Shrinking
/// disconnects every wire on the truncated ports as part of the same action;
/// undo brings those ports back under their old handles and reconnects them.
#[derive(Debug)]
pub struct PortCountChange {
    comp: CompId,
    direction: PortDirection,
    initial: usize,
    target: usize,
    /// Handles for ports added when growing.
    fresh: Vec<PortId>,
    applied: Option<Applied>,
}

#[derive(Debug)]
struct Applied {
    /// Ports truncated by a shrink, in index order.
    removed: Vec<PortId>,
    disconnects: GroupAction,
    snapshot: SignalSnapshot,
}

impl PortCountChange {
    pub fn new(
        designer: &mut Designer,
        comp: CompId,
        direction: PortDirection,
        requested: usize,
    ) -> CircuitResult<Self> {
        let component = designer.circuit().try_component(comp)?;
        let initial = component.ports(direction).len();
        let mut count = component.count(direction);
        count.set_value(requested as i64);
        let target = count.count()?;
        let fresh = (initial..target).map(|_| designer.reserve_port()).collect();
        Ok(Self {
            comp,
            direction,
            initial,
            target,
            fresh,
            applied: None,
        })
    }

    /// Port count after execution, after clamping.
    pub fn target(&self) -> usize {
        self.target
    }
}

impl Action for PortCountChange {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let snapshot = designer.snapshot();
        let ports = designer
            .circuit()
            .try_component(self.comp)?
            .ports(self.direction)
            .to_vec();
        let removed: Vec<PortId> = ports.iter().skip(self.target).copied().collect();

        let mut disconnects = GroupAction::new();
        for port in &removed {
            for wire in designer.circuit().try_port(*port)?.wires() {
                disconnects.push(Disconnect::new(designer, *wire)?);
            }
        }
        disconnects.execute(designer)?;

        if let Err(err) = designer.resize_ports(self.comp, self.direction, self.target as i64, &self.fresh) {
            disconnects.undo(designer)?;
            designer.restore_snapshot(&snapshot)?;
            return Err(err);
        }
        self.applied = Some(Applied {
            removed,
            disconnects,
            snapshot,
        });
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let Some(applied) = self.applied.as_mut() else {
            return Err(not_executed(&*self));
        };
        designer.resize_ports(self.comp, self.direction, self.initial as i64, &applied.removed)?;
        applied.disconnects.undo(designer)?;
        designer.restore_snapshot(&applied.snapshot)?;
        self.applied = None;
        Ok(())
    }

    fn name(&self) -> String {
        match self.direction {
            PortDirection::Input => "Changed Input Count".to_string(),
            PortDirection::Output => "Changed Output Count".to_string(),
        }
    }

    fn is_empty(&self) -> bool {
        self.initial == self.target
    }
}
