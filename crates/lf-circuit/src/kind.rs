//! Component kinds and their transfer functions.
//!
//! Kinds are a closed set of variants; evaluation dispatches on the tag.
//! Stateful kinds carry their state inline so a snapshot of the kind is a
//! snapshot of the component's internal state.

use lf_core::ClampedValue;

use crate::engine::EngineConfig;
use crate::error::CircuitResult;
use crate::ic::IcInstance;

/// Smallest and largest input count of the n-input gates.
pub const GATE_MIN_INPUTS: i64 = 2;
pub const GATE_MAX_INPUTS: i64 = 8;

pub const DEFAULT_LED_COLOR: &str = "#ffffff";
pub const DEFAULT_CLOCK_PERIOD_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    ConstantHigh,
    ConstantLow,
    Switch { on: bool },
    Button { pressed: bool },
    /// Clock source. Toggles on every clock-tick event.
    Clock { on: bool, period_ms: u32 },
    Led { color: String },
    Buffer,
    Not,
    And,
    Or,
    Xor,
    Nand,
    Nor,
    Xnor,
    /// Inputs `[D, CLK]`, outputs `[Q, !Q]`. Latches D on a rising clock edge.
    DFlipFlop { q: bool, clk: bool },
    /// Inputs `[T, CLK]`, outputs `[Q, !Q]`. Toggles on a rising edge while T is high.
    TFlipFlop { q: bool, clk: bool },
    /// Inputs `[S, R]`, outputs `[Q, !Q]`. Holds when both are low or both high.
    SrLatch { q: bool },
    Ic(Box<IcInstance>),
}

/// Output of one transfer-function evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub outputs: Vec<bool>,
    /// Set when an IC's inner pass hit the step cap.
    pub capped: bool,
}

impl Evaluation {
    fn plain(outputs: Vec<bool>) -> Self {
        Self {
            outputs,
            capped: false,
        }
    }
}

impl ComponentKind {
    pub fn switch() -> Self {
        ComponentKind::Switch { on: false }
    }

    pub fn button() -> Self {
        ComponentKind::Button { pressed: false }
    }

    pub fn clock() -> Self {
        ComponentKind::Clock {
            on: false,
            period_ms: DEFAULT_CLOCK_PERIOD_MS,
        }
    }

    pub fn led() -> Self {
        ComponentKind::Led {
            color: DEFAULT_LED_COLOR.to_string(),
        }
    }

    pub fn d_flip_flop() -> Self {
        ComponentKind::DFlipFlop { q: false, clk: false }
    }

    pub fn t_flip_flop() -> Self {
        ComponentKind::TFlipFlop { q: false, clk: false }
    }

    pub fn sr_latch() -> Self {
        ComponentKind::SrLatch { q: false }
    }

    /// Stable type tag, used as the key of the persistence codec registry.
    pub fn tag(&self) -> &'static str {
        match self {
            ComponentKind::ConstantHigh => "constant_high",
            ComponentKind::ConstantLow => "constant_low",
            ComponentKind::Switch { .. } => "switch",
            ComponentKind::Button { .. } => "button",
            ComponentKind::Clock { .. } => "clock",
            ComponentKind::Led { .. } => "led",
            ComponentKind::Buffer => "buffer",
            ComponentKind::Not => "not",
            ComponentKind::And => "and",
            ComponentKind::Or => "or",
            ComponentKind::Xor => "xor",
            ComponentKind::Nand => "nand",
            ComponentKind::Nor => "nor",
            ComponentKind::Xnor => "xnor",
            ComponentKind::DFlipFlop { .. } => "d_flip_flop",
            ComponentKind::TFlipFlop { .. } => "t_flip_flop",
            ComponentKind::SrLatch { .. } => "sr_latch",
            ComponentKind::Ic(_) => "ic",
        }
    }

    /// Human-readable name, used for default component names and action names.
    pub fn label(&self) -> &'static str {
        match self {
            ComponentKind::ConstantHigh => "Constant High",
            ComponentKind::ConstantLow => "Constant Low",
            ComponentKind::Switch { .. } => "Switch",
            ComponentKind::Button { .. } => "Button",
            ComponentKind::Clock { .. } => "Clock",
            ComponentKind::Led { .. } => "LED",
            ComponentKind::Buffer => "Buffer",
            ComponentKind::Not => "NOT Gate",
            ComponentKind::And => "AND Gate",
            ComponentKind::Or => "OR Gate",
            ComponentKind::Xor => "XOR Gate",
            ComponentKind::Nand => "NAND Gate",
            ComponentKind::Nor => "NOR Gate",
            ComponentKind::Xnor => "XNOR Gate",
            ComponentKind::DFlipFlop { .. } => "D Flip Flop",
            ComponentKind::TFlipFlop { .. } => "T Flip Flop",
            ComponentKind::SrLatch { .. } => "SR Latch",
            ComponentKind::Ic(_) => "IC",
        }
    }

    /// Kinds whose outputs depend on more than their current inputs.
    pub fn is_stateful(&self) -> bool {
        matches!(
            self,
            ComponentKind::Switch { .. }
                | ComponentKind::Button { .. }
                | ComponentKind::Clock { .. }
                | ComponentKind::DFlipFlop { .. }
                | ComponentKind::TFlipFlop { .. }
                | ComponentKind::SrLatch { .. }
                | ComponentKind::Ic(_)
        )
    }

    /// Kinds a user (or an enclosing IC) drives directly.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            ComponentKind::Switch { .. } | ComponentKind::Button { .. }
        )
    }

    pub fn is_n_input_gate(&self) -> bool {
        matches!(
            self,
            ComponentKind::And
                | ComponentKind::Or
                | ComponentKind::Xor
                | ComponentKind::Nand
                | ComponentKind::Nor
                | ComponentKind::Xnor
        )
    }

    /// Default bounds and value of the input port count.
    pub fn input_count(&self) -> ClampedValue {
        match self {
            ComponentKind::ConstantHigh
            | ComponentKind::ConstantLow
            | ComponentKind::Switch { .. }
            | ComponentKind::Button { .. }
            | ComponentKind::Clock { .. } => ClampedValue::fixed(0),
            ComponentKind::Led { .. } | ComponentKind::Buffer | ComponentKind::Not => {
                ClampedValue::fixed(1)
            }
            ComponentKind::And
            | ComponentKind::Or
            | ComponentKind::Xor
            | ComponentKind::Nand
            | ComponentKind::Nor
            | ComponentKind::Xnor => {
                ClampedValue::new(GATE_MIN_INPUTS, GATE_MIN_INPUTS, GATE_MAX_INPUTS)
            }
            ComponentKind::DFlipFlop { .. }
            | ComponentKind::TFlipFlop { .. }
            | ComponentKind::SrLatch { .. } => ClampedValue::fixed(2),
            ComponentKind::Ic(ic) => ClampedValue::fixed(ic.input_count() as i64),
        }
    }

    /// Default bounds and value of the output port count.
    pub fn output_count(&self) -> ClampedValue {
        match self {
            ComponentKind::Led { .. } => ClampedValue::fixed(0),
            ComponentKind::DFlipFlop { .. }
            | ComponentKind::TFlipFlop { .. }
            | ComponentKind::SrLatch { .. } => ClampedValue::fixed(2),
            ComponentKind::Ic(ic) => ClampedValue::fixed(ic.output_count() as i64),
            _ => ClampedValue::fixed(1),
        }
    }

    /// Run the transfer function against the current input values.
    ///
    /// `outputs` always has one entry per output port. Sequential kinds
    /// update their stored state as a side effect.
    pub fn evaluate(&mut self, inputs: &[bool], config: &EngineConfig) -> CircuitResult<Evaluation> {
        let input = |i: usize| inputs.get(i).copied().unwrap_or(false);
        let outputs = match self {
            ComponentKind::ConstantHigh => vec![true],
            ComponentKind::ConstantLow => vec![false],
            ComponentKind::Switch { on } => vec![*on],
            ComponentKind::Button { pressed } => vec![*pressed],
            ComponentKind::Clock { on, .. } => vec![*on],
            ComponentKind::Led { .. } => Vec::new(),
            ComponentKind::Buffer => vec![input(0)],
            ComponentKind::Not => vec![!input(0)],
            ComponentKind::And => vec![inputs.iter().all(|v| *v)],
            ComponentKind::Or => vec![inputs.iter().any(|v| *v)],
            ComponentKind::Xor => vec![parity(inputs)],
            ComponentKind::Nand => vec![!inputs.iter().all(|v| *v)],
            ComponentKind::Nor => vec![!inputs.iter().any(|v| *v)],
            ComponentKind::Xnor => vec![!parity(inputs)],
            ComponentKind::DFlipFlop { q, clk } => {
                let rising = input(1) && !*clk;
                *clk = input(1);
                if rising {
                    *q = input(0);
                }
                vec![*q, !*q]
            }
            ComponentKind::TFlipFlop { q, clk } => {
                let rising = input(1) && !*clk;
                *clk = input(1);
                if rising && input(0) {
                    *q = !*q;
                }
                vec![*q, !*q]
            }
            ComponentKind::SrLatch { q } => {
                match (input(0), input(1)) {
                    (true, false) => *q = true,
                    (false, true) => *q = false,
                    _ => {}
                }
                vec![*q, !*q]
            }
            ComponentKind::Ic(ic) => return ic.apply(inputs, config),
        };
        Ok(Evaluation::plain(outputs))
    }
}

fn parity(inputs: &[bool]) -> bool {
    inputs.iter().filter(|v| **v).count() % 2 == 1
}
