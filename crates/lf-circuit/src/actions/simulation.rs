use lf_core::CompId;

use crate::designer::Designer;
use crate::error::{CircuitError, CircuitResult};
use crate::kind::ComponentKind;
use crate::snapshot::SignalSnapshot;

use super::{Action, not_executed};

/// Flip a switch or press/release a button.
#[derive(Debug)]
pub struct SetInputState {
    comp: CompId,
    on: bool,
    label: String,
    snapshot: Option<SignalSnapshot>,
}

impl SetInputState {
    pub fn new(designer: &Designer, comp: CompId, on: bool) -> CircuitResult<Self> {
        let component = designer.circuit().try_component(comp)?;
        let label = match (&component.kind, on) {
            (ComponentKind::Switch { .. }, true) => "Switched On",
            (ComponentKind::Switch { .. }, false) => "Switched Off",
            (ComponentKind::Button { .. }, true) => "Pressed",
            (ComponentKind::Button { .. }, false) => "Released",
            _ => {
                return Err(CircuitError::InvalidKind {
                    comp,
                    expected: "a switch or button",
                });
            }
        };
        Ok(Self {
            comp,
            on,
            label: format!("{label} {}", component.name),
            snapshot: None,
        })
    }
}

impl Action for SetInputState {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let snapshot = designer.snapshot();
        designer.set_input_state(self.comp, self.on)?;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let Some(snapshot) = &self.snapshot else {
            return Err(not_executed(&*self));
        };
        designer.restore_snapshot(snapshot)?;
        Ok(())
    }

    fn name(&self) -> String {
        self.label.clone()
    }
}

/// Deliver a clock-tick event to one clock, or to every clock.
#[derive(Debug)]
pub struct TickClocks {
    target: Option<CompId>,
    ticked: Option<usize>,
    snapshot: Option<SignalSnapshot>,
}

impl TickClocks {
    pub fn all() -> Self {
        Self {
            target: None,
            ticked: None,
            snapshot: None,
        }
    }

    pub fn one(clock: CompId) -> Self {
        Self {
            target: Some(clock),
            ..Self::all()
        }
    }

    /// Clocks toggled by the last execute.
    pub fn ticked(&self) -> Option<usize> {
        self.ticked
    }
}

impl Action for TickClocks {
    fn execute(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let snapshot = designer.snapshot();
        self.ticked = Some(designer.tick_clocks(self.target)?);
        self.snapshot = Some(snapshot);
        Ok(())
    }

    fn undo(&mut self, designer: &mut Designer) -> CircuitResult<()> {
        let Some(snapshot) = &self.snapshot else {
            return Err(not_executed(&*self));
        };
        designer.restore_snapshot(snapshot)?;
        Ok(())
    }

    fn name(&self) -> String {
        "Clock Tick".to_string()
    }

    fn is_empty(&self) -> bool {
        self.ticked == Some(0)
    }
}
