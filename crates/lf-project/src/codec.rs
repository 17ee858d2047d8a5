//! Per-kind encode/decode functions, keyed by type tag.

use std::collections::BTreeMap;

use lf_circuit::{Circuit, ComponentKind, IcTemplate, InnerState, PortDirection};
use lf_core::TemplateId;

use crate::schema::{InnerDef, StateValue};
use crate::{ProjectError, ProjectResult};

pub type State = BTreeMap<String, StateValue>;

/// What an encoder needs beyond the kind itself.
pub struct EncodeContext<'a> {
    /// File index of each template handle.
    pub template_index: &'a BTreeMap<TemplateId, usize>,
    /// Used for the components inside IC instances.
    pub registry: &'a CodecRegistry,
}

/// What a decoder needs beyond the stored state.
pub struct DecodeContext<'a> {
    /// Templates decoded so far, by file index, with the handle each one
    /// has in the target designer.
    pub templates: &'a [(TemplateId, IcTemplate)],
    pub registry: &'a CodecRegistry,
}

pub type EncodeFn = fn(&ComponentKind, &EncodeContext<'_>) -> ProjectResult<State>;
pub type DecodeFn = fn(&State, &DecodeContext<'_>) -> ProjectResult<ComponentKind>;

#[derive(Clone, Copy)]
pub struct KindCodec {
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

/// Codec table. [`CodecRegistry::standard`] covers every built-in kind.
#[derive(Clone)]
pub struct CodecRegistry {
    codecs: BTreeMap<&'static str, KindCodec>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl CodecRegistry {
    pub fn empty() -> Self {
        Self {
            codecs: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, tag: &'static str, encode: EncodeFn, decode: DecodeFn) {
        self.codecs.insert(tag, KindCodec { encode, decode });
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.codecs.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.codecs.keys().copied()
    }

    pub fn encode(&self, kind: &ComponentKind, ctx: &EncodeContext<'_>) -> ProjectResult<State> {
        let codec = self.lookup(kind.tag())?;
        (codec.encode)(kind, ctx)
    }

    pub fn decode(&self, tag: &str, state: &State, ctx: &DecodeContext<'_>) -> ProjectResult<ComponentKind> {
        let codec = self.lookup(tag)?;
        let kind = (codec.decode)(state, ctx)?;
        if kind.tag() != tag {
            return Err(ProjectError::Decode {
                what: format!("codec for '{tag}' produced a '{}'", kind.tag()),
            });
        }
        Ok(kind)
    }

    fn lookup(&self, tag: &str) -> ProjectResult<&KindCodec> {
        self.codecs.get(tag).ok_or_else(|| ProjectError::Decode {
            what: format!("no codec registered for type '{tag}'"),
        })
    }

    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("constant_high", stateless, |_, _| Ok(ComponentKind::ConstantHigh));
        registry.register("constant_low", stateless, |_, _| Ok(ComponentKind::ConstantLow));
        registry.register("buffer", stateless, |_, _| Ok(ComponentKind::Buffer));
        registry.register("not", stateless, |_, _| Ok(ComponentKind::Not));
        registry.register("and", stateless, |_, _| Ok(ComponentKind::And));
        registry.register("or", stateless, |_, _| Ok(ComponentKind::Or));
        registry.register("xor", stateless, |_, _| Ok(ComponentKind::Xor));
        registry.register("nand", stateless, |_, _| Ok(ComponentKind::Nand));
        registry.register("nor", stateless, |_, _| Ok(ComponentKind::Nor));
        registry.register("xnor", stateless, |_, _| Ok(ComponentKind::Xnor));
        registry.register("switch", encode_switch, |s, _| {
            Ok(ComponentKind::Switch {
                on: bool_field(s, "on", false)?,
            })
        });
        registry.register("button", encode_button, |s, _| {
            Ok(ComponentKind::Button {
                pressed: bool_field(s, "pressed", false)?,
            })
        });
        registry.register("clock", encode_clock, decode_clock);
        registry.register("led", encode_led, decode_led);
        registry.register("d_flip_flop", encode_flip_flop, |s, _| {
            Ok(ComponentKind::DFlipFlop {
                q: bool_field(s, "q", false)?,
                clk: bool_field(s, "clk", false)?,
            })
        });
        registry.register("t_flip_flop", encode_flip_flop, |s, _| {
            Ok(ComponentKind::TFlipFlop {
                q: bool_field(s, "q", false)?,
                clk: bool_field(s, "clk", false)?,
            })
        });
        registry.register("sr_latch", encode_latch, |s, _| {
            Ok(ComponentKind::SrLatch {
                q: bool_field(s, "q", false)?,
            })
        });
        registry.register("ic", encode_ic, decode_ic);
        registry
    }
}

fn stateless(_: &ComponentKind, _: &EncodeContext<'_>) -> ProjectResult<State> {
    Ok(State::new())
}

fn mismatch(expected: &str, kind: &ComponentKind) -> ProjectError {
    ProjectError::Decode {
        what: format!("{expected} codec given a '{}'", kind.tag()),
    }
}

fn encode_switch(kind: &ComponentKind, _: &EncodeContext<'_>) -> ProjectResult<State> {
    match kind {
        ComponentKind::Switch { on } => Ok(State::from([("on".to_string(), StateValue::Bool(*on))])),
        other => Err(mismatch("switch", other)),
    }
}

fn encode_button(kind: &ComponentKind, _: &EncodeContext<'_>) -> ProjectResult<State> {
    match kind {
        ComponentKind::Button { pressed } => Ok(State::from([(
            "pressed".to_string(),
            StateValue::Bool(*pressed),
        )])),
        other => Err(mismatch("button", other)),
    }
}

fn encode_clock(kind: &ComponentKind, _: &EncodeContext<'_>) -> ProjectResult<State> {
    match kind {
        ComponentKind::Clock { on, period_ms } => Ok(State::from([
            ("on".to_string(), StateValue::Bool(*on)),
            ("period_ms".to_string(), StateValue::Int(i64::from(*period_ms))),
        ])),
        other => Err(mismatch("clock", other)),
    }
}

fn decode_clock(state: &State, _: &DecodeContext<'_>) -> ProjectResult<ComponentKind> {
    let period = int_field(state, "period_ms", i64::from(lf_circuit::kind::DEFAULT_CLOCK_PERIOD_MS))?;
    let period_ms = u32::try_from(period)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| ProjectError::Decode {
            what: format!("clock period {period} out of range"),
        })?;
    Ok(ComponentKind::Clock {
        on: bool_field(state, "on", false)?,
        period_ms,
    })
}

fn encode_led(kind: &ComponentKind, _: &EncodeContext<'_>) -> ProjectResult<State> {
    match kind {
        ComponentKind::Led { color } => Ok(State::from([(
            "color".to_string(),
            StateValue::Text(color.clone()),
        )])),
        other => Err(mismatch("led", other)),
    }
}

fn decode_led(state: &State, _: &DecodeContext<'_>) -> ProjectResult<ComponentKind> {
    let color = match state.get("color") {
        None => lf_circuit::kind::DEFAULT_LED_COLOR.to_string(),
        Some(StateValue::Text(color)) => color.clone(),
        Some(other) => {
            return Err(ProjectError::Decode {
                what: format!("led color must be text, got {other:?}"),
            });
        }
    };
    Ok(ComponentKind::Led { color })
}

fn encode_flip_flop(kind: &ComponentKind, _: &EncodeContext<'_>) -> ProjectResult<State> {
    match kind {
        ComponentKind::DFlipFlop { q, clk } | ComponentKind::TFlipFlop { q, clk } => Ok(State::from([
            ("q".to_string(), StateValue::Bool(*q)),
            ("clk".to_string(), StateValue::Bool(*clk)),
        ])),
        other => Err(mismatch("flip-flop", other)),
    }
}

fn encode_latch(kind: &ComponentKind, _: &EncodeContext<'_>) -> ProjectResult<State> {
    match kind {
        ComponentKind::SrLatch { q } => Ok(State::from([("q".to_string(), StateValue::Bool(*q))])),
        other => Err(mismatch("latch", other)),
    }
}

fn encode_ic(kind: &ComponentKind, ctx: &EncodeContext<'_>) -> ProjectResult<State> {
    let ComponentKind::Ic(ic) = kind else {
        return Err(mismatch("ic", kind));
    };
    let index = ctx
        .template_index
        .get(&ic.template())
        .ok_or_else(|| ProjectError::Decode {
            what: format!("IC refers to unknown template {}", ic.template()),
        })?;
    Ok(State::from([
        ("template".to_string(), StateValue::Int(*index as i64)),
        ("inner".to_string(), StateValue::Inner(encode_inner(ic.circuit(), ctx)?)),
    ]))
}

/// State and high outputs of every inner component, in creation order.
fn encode_inner(circuit: &Circuit, ctx: &EncodeContext<'_>) -> ProjectResult<Vec<InnerDef>> {
    circuit
        .components()
        .map(|component| -> ProjectResult<InnerDef> {
            let high = circuit
                .signals(component.id, PortDirection::Output)?
                .into_iter()
                .enumerate()
                .filter_map(|(i, on)| on.then_some(i))
                .collect();
            Ok(InnerDef {
                state: ctx.registry.encode(&component.kind, ctx)?,
                high,
            })
        })
        .collect()
}

fn decode_ic(state: &State, ctx: &DecodeContext<'_>) -> ProjectResult<ComponentKind> {
    let index = int_field(state, "template", -1)?;
    let (id, template) = usize::try_from(index)
        .ok()
        .and_then(|i| ctx.templates.get(i))
        .ok_or_else(|| ProjectError::Decode {
            what: format!("IC refers to template {index}, which is not defined before it"),
        })?;
    let mut instance = template.instantiate(*id);
    match state.get("inner") {
        // Without saved state the instance starts from the template's.
        None => {}
        Some(StateValue::Inner(defs)) => {
            let shapes: Vec<(&'static str, usize)> = instance
                .circuit()
                .components()
                .map(|c| (c.kind.tag(), c.outputs().len()))
                .collect();
            if shapes.len() != defs.len() {
                return Err(ProjectError::Decode {
                    what: format!(
                        "IC '{}' saves {} inner components, template has {}",
                        template.name(),
                        defs.len(),
                        shapes.len()
                    ),
                });
            }
            let states = shapes
                .into_iter()
                .zip(defs)
                .map(|((tag, count), def)| -> ProjectResult<InnerState> {
                    if let Some(bad) = def.high.iter().find(|i| **i >= count) {
                        return Err(ProjectError::Decode {
                            what: format!("inner '{tag}' of IC '{}' has no output {bad}", template.name()),
                        });
                    }
                    Ok(InnerState {
                        kind: ctx.registry.decode(tag, &def.state, ctx)?,
                        outputs: (0..count).map(|i| def.high.contains(&i)).collect(),
                    })
                })
                .collect::<ProjectResult<Vec<_>>>()?;
            instance.restore_inner(states)?;
        }
        Some(other) => {
            return Err(ProjectError::Decode {
                what: format!("IC inner state must be a list, got {other:?}"),
            });
        }
    }
    Ok(ComponentKind::Ic(Box::new(instance)))
}

fn bool_field(state: &State, key: &str, default: bool) -> ProjectResult<bool> {
    match state.get(key) {
        None => Ok(default),
        Some(StateValue::Bool(v)) => Ok(*v),
        Some(other) => Err(ProjectError::Decode {
            what: format!("state field '{key}' must be a boolean, got {other:?}"),
        }),
    }
}

fn int_field(state: &State, key: &str, default: i64) -> ProjectResult<i64> {
    match state.get(key) {
        None => Ok(default),
        Some(StateValue::Int(v)) => Ok(*v),
        Some(other) => Err(ProjectError::Decode {
            what: format!("state field '{key}' must be an integer, got {other:?}"),
        }),
    }
}
