//! Event-driven propagation over the circuit graph.
//!
//! A pass drains a FIFO worklist of `(wire, signal)` entries. Processing an
//! entry writes the wire and its target input; when the input actually
//! changes, the owning component is re-evaluated from all of its inputs and
//! each output whose value changed enqueues its wires in creation order.
//! Nothing recurses, so feedback loops only grow the queue.

use lf_core::{CompId, PortId, WireId};

use crate::circuit::Circuit;
use crate::error::{CircuitError, CircuitResult};
use crate::port::PortDirection;

/// Default number of worklist entries a single pass may process.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Propagation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worklist entries processed before a pass is abandoned as capped.
    pub max_steps: usize,
    /// Keep the processed wire order in the [`PassReport`].
    pub record_order: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            record_order: false,
        }
    }
}

impl EngineConfig {
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn recording(mut self) -> Self {
        self.record_order = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The worklist emptied: the circuit is at a fixed point.
    Settled,
    /// The step cap was hit (here or inside an IC). The remaining work was
    /// dropped and the circuit keeps its last computed state.
    Capped,
}

/// Summary of one propagation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub steps: usize,
    pub outcome: PassOutcome,
    /// Wires in processing order; empty unless `record_order` is set.
    pub order: Vec<WireId>,
}

impl PassReport {
    pub fn is_capped(&self) -> bool {
        self.outcome == PassOutcome::Capped
    }

    pub fn is_settled(&self) -> bool {
        self.outcome == PassOutcome::Settled
    }
}

/// Where the engine is between and during passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Work is queued but no pass is running.
    Scheduled,
    Draining,
}

/// One worklist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Pending {
    pub wire: WireId,
    pub signal: bool,
}

impl Circuit {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of queued worklist entries.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn schedule(&mut self, wire: WireId, signal: bool) {
        self.queue.push_back(Pending { wire, signal });
        if self.phase == Phase::Idle {
            self.phase = Phase::Scheduled;
        }
    }

    /// Store a new value on an output port and enqueue its wires. A no-op
    /// when the value is unchanged.
    pub(crate) fn activate_output(&mut self, port: PortId, signal: bool) -> CircuitResult<()> {
        let p = self
            .ports
            .get_mut(port)
            .ok_or(CircuitError::UnknownPort(port))?;
        if p.signal == signal {
            return Ok(());
        }
        p.signal = signal;
        let wires = p.wires.clone();
        for wire in wires {
            self.schedule(wire, signal);
        }
        Ok(())
    }

    /// Set an input port and re-evaluate its component if the value changed.
    pub(crate) fn drive_input(
        &mut self,
        port: PortId,
        signal: bool,
        config: &EngineConfig,
    ) -> CircuitResult<()> {
        let p = self
            .ports
            .get_mut(port)
            .ok_or(CircuitError::UnknownPort(port))?;
        if p.signal == signal {
            return Ok(());
        }
        p.signal = signal;
        let parent = p.parent;
        self.evaluate(parent, config)
    }

    /// Run a component's transfer function and activate its outputs.
    pub(crate) fn evaluate(&mut self, comp: CompId, config: &EngineConfig) -> CircuitResult<()> {
        let inputs = self.signals(comp, PortDirection::Input)?;
        let component = self
            .components
            .get_mut(comp)
            .ok_or(CircuitError::UnknownComponent(comp))?;
        let evaluation = component.kind.evaluate(&inputs, config)?;
        let outputs = component.outputs.clone();
        if evaluation.capped {
            self.inner_capped = true;
        }
        for (port, value) in outputs.into_iter().zip(evaluation.outputs) {
            self.activate_output(port, value)?;
        }
        Ok(())
    }

    /// Drain the worklist until it is empty or the step cap is reached.
    ///
    /// On error the worklist is discarded so the next pass starts clean.
    pub(crate) fn drain(&mut self, config: &EngineConfig) -> CircuitResult<PassReport> {
        self.phase = Phase::Draining;
        let result = self.run_pass(config);
        if result.is_err() {
            self.queue.clear();
        }
        self.inner_capped = false;
        self.phase = Phase::Idle;
        result
    }

    fn run_pass(&mut self, config: &EngineConfig) -> CircuitResult<PassReport> {
        let mut steps = 0;
        let mut order = Vec::new();
        let mut hit_cap = false;

        while !self.queue.is_empty() {
            if steps >= config.max_steps {
                hit_cap = true;
                break;
            }
            let Some(Pending { wire, signal }) = self.queue.pop_front() else {
                break;
            };
            steps += 1;

            // The wire may have been removed after the entry was queued.
            let Some(w) = self.wires.get_mut(wire) else {
                continue;
            };
            w.signal = signal;
            let target = w.target;
            if config.record_order {
                order.push(wire);
            }
            tracing::trace!(%wire, signal, "propagate");
            self.drive_input(target, signal, config)?;
        }

        if hit_cap {
            let dropped = self.queue.len();
            self.queue.clear();
            tracing::warn!(
                steps,
                dropped,
                max_steps = config.max_steps,
                "propagation pass capped; circuit may be oscillating"
            );
        } else if self.inner_capped {
            tracing::warn!(steps, "propagation inside an IC was capped");
        }

        let outcome = if hit_cap || self.inner_capped {
            PassOutcome::Capped
        } else {
            PassOutcome::Settled
        };
        tracing::debug!(steps, ?outcome, "propagation pass finished");
        Ok(PassReport {
            steps,
            outcome,
            order,
        })
    }
}
