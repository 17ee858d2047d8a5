//! Circuit-specific error types.

use lf_core::{CompId, LfError, PortId, TemplateId, WireId};
use thiserror::Error;

use crate::port::PortDirection;

pub type CircuitResult<T> = Result<T, CircuitError>;

/// Why a connect was refused. The graph is unchanged when one of these is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Input port {port} already has an incoming wire ({existing})")]
    InputOccupied { port: PortId, existing: WireId },

    #[error("Wire must run from an output port to an input port (got {from} -> {to})")]
    WrongDirection { from: PortId, to: PortId },

    #[error("Port {port} does not exist")]
    MissingPort { port: PortId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    #[error("Connection refused: {0}")]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Core(#[from] LfError),

    #[error("Unknown component {0}")]
    UnknownComponent(CompId),

    #[error("Unknown port {0}")]
    UnknownPort(PortId),

    #[error("Component {comp} has no {} port {index}", direction.label())]
    NoSuchPort {
        comp: CompId,
        direction: PortDirection,
        index: usize,
    },

    #[error("Unknown wire {0}")]
    UnknownWire(WireId),

    #[error("Unknown IC template {0}")]
    UnknownTemplate(TemplateId),

    #[error("IC template {0} is still used by an instance")]
    TemplateInUse(TemplateId),

    #[error("Component {comp} still has {count} wire(s) attached")]
    WiresAttached { comp: CompId, count: usize },

    #[error("Component {comp} is not {expected}")]
    InvalidKind { comp: CompId, expected: &'static str },

    #[error("Invalid IC template: {what}")]
    InvalidTemplate { what: String },

    #[error("Action '{action}' was undone before it was executed")]
    NotExecuted { action: String },
}
