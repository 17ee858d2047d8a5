use lf_core::{PortId, WireId};

use crate::designer::Designer;
use crate::error::CircuitResult;
use crate::snapshot::SignalSnapshot;

use super::{Action, not_executed};

/// Wire an output port to an input port.
#[derive(Debug)]
pub struct Connect {
    id: WireId,
    source: PortId,
    target: PortId,
    snapshot: Option<SignalSnapshot>,
}

impl Connect {
    /// Reserve a handle for the wire. The ports are checked on execute, so
    /// they may belong to components an earlier action will create.
    pub fn new(designer: &mut Designer, source: PortId, target: PortId) -> Self {
        Self {
            id: designer.reserve_wire(),
            source,
            target,
            snapshot: None,
        }
    }

    pub fn wire(&self) -> WireId {
        self.id
    }
}

impl Action for Connect {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let snapshot = designer.snapshot();
        designer.connect(self.id, self.source, self.target)?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let Some(snapshot) = &self.snapshot else {
            return Err(not_executed(&*self));
        };
        designer.detach(self.id)?;
        designer.restore_snapshot(snapshot)?;
        Ok(())
    }

    fn name(&self) -> String {
        "Connected Wire".to_string()
    }
}

/// Remove a wire. The input it fed drops to low.
#[derive(Debug)]
pub struct Disconnect {
    id: WireId,
    source: PortId,
    target: PortId,
    snapshot: Option<SignalSnapshot>,
}

impl Disconnect {
    pub fn new(designer: &Designer, id: WireId) -> CircuitResult<Self> {
        let wire = designer.circuit().try_wire(id)?;
        Ok(Self {
            id,
            source: wire.source,
            target: wire.target,
            snapshot: None,
        })
    }

    pub fn wire(&self) -> WireId {
        self.id
    }
}

impl Action for Disconnect {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let snapshot = designer.snapshot();
        designer.disconnect(self.id)?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let Some(snapshot) = &self.snapshot else {
            return Err(not_executed(&*self));
        };
        designer.attach(self.id, self.source, self.target)?;
        designer.restore_snapshot(snapshot)?;
        Ok(())
    }

    fn name(&self) -> String {
        "Disconnected Wire".to_string()
    }
}
