//! Digital circuit model, propagation engine and undoable editing.
//!
//! Provides:
//! - Component/port/wire graph with handle-addressed storage
//! - Event-driven signal propagation with a step cap
//! - IC templates and instances
//! - Designer session (circuit, templates, selection, render callback)
//! - Construction of a designer from stored parts
//! - Reversible actions, group actions and undo/redo history

pub mod actions;
pub mod circuit;
pub mod component;
pub mod designer;
pub mod engine;
pub mod error;
pub mod history;
pub mod ic;
pub mod kind;
pub mod parts;
pub mod port;
pub mod snapshot;
pub mod wire;

// Re-exports for public API
pub use actions::{
    Action, AddComponent, AddTemplate, Connect, Disconnect, GroupAction, PortCountChange,
    RemoveComponent, Select, SetInputState, SetProperty, TickClocks, delete_group, deselect_all,
    select_group,
};
pub use circuit::Circuit;
pub use component::{Component, ComponentSpec, RemovedComponent};
pub use designer::{Designer, Property, RenderCallback};
pub use engine::{DEFAULT_MAX_STEPS, EngineConfig, PassOutcome, PassReport, Phase};
pub use error::{CircuitError, CircuitResult, ConnectionError};
pub use history::History;
pub use ic::{IcInstance, IcTemplate, InnerState};
pub use kind::{ComponentKind, Evaluation};
pub use parts::{Part, PartWire};
pub use port::{Port, PortDirection};
pub use snapshot::SignalSnapshot;
pub use wire::Wire;
