//! Conversion between a live [`Designer`] and a [`CircuitFile`].

use std::collections::BTreeMap;

use lf_circuit::{
    Circuit, ComponentSpec, DEFAULT_MAX_STEPS, Designer, EngineConfig, IcTemplate, Part, PartWire,
    PortDirection,
};
use lf_core::{CompId, ClampedValue, TemplateId};

use crate::codec::{CodecRegistry, DecodeContext, EncodeContext};
use crate::migrate::{LATEST_VERSION, migrate_to_latest};
use crate::schema::{CircuitDef, CircuitFile, ComponentDef, PortRef, SettingsDef, TemplateDef, WireDef};
use crate::validate::validate_with;
use crate::{ProjectError, ProjectResult};

/// Name given to serialized circuits; callers overwrite it as needed.
pub const DEFAULT_NAME: &str = "untitled";

/// Serialize a designer with the standard codecs.
pub fn serialize(designer: &Designer) -> ProjectResult<CircuitFile> {
    serialize_with(designer, &CodecRegistry::standard())
}

pub fn serialize_with(designer: &Designer, registry: &CodecRegistry) -> ProjectResult<CircuitFile> {
    let template_index: BTreeMap<TemplateId, usize> = designer
        .templates()
        .enumerate()
        .map(|(i, (id, _))| (id, i))
        .collect();
    let ctx = EncodeContext {
        template_index: &template_index,
        registry,
    };

    let templates = designer
        .templates()
        .map(|(_, template)| encode_template(template, registry, &ctx))
        .collect::<ProjectResult<Vec<_>>>()?;
    let (circuit, _) = encode_circuit(designer.circuit(), registry, &ctx)?;

    let max_steps = designer.config().max_steps;
    Ok(CircuitFile {
        version: LATEST_VERSION,
        name: DEFAULT_NAME.to_string(),
        settings: SettingsDef {
            max_steps: (max_steps != DEFAULT_MAX_STEPS).then_some(max_steps),
        },
        templates,
        circuit,
    })
}

/// Rebuild a designer from a file with the standard codecs. The file is
/// migrated and validated first.
pub fn deserialize(file: &CircuitFile) -> ProjectResult<Designer> {
    deserialize_with(file, &CodecRegistry::standard())
}

pub fn deserialize_with(file: &CircuitFile, registry: &CodecRegistry) -> ProjectResult<Designer> {
    let file = migrate_to_latest(file.clone())?;
    validate_with(&file, registry)?;

    let mut config = EngineConfig::default();
    if let Some(max_steps) = file.settings.max_steps {
        config = config.with_max_steps(max_steps);
    }

    // A fresh designer hands out template handles in registration order.
    let mut templates: Vec<(TemplateId, IcTemplate)> = Vec::with_capacity(file.templates.len());
    for (i, def) in file.templates.iter().enumerate() {
        let template = decode_template(def, registry, &templates, config)?;
        templates.push((lf_core::Id::from_index(i as u32), template));
    }

    let (parts, wires) = decode_circuit(&file.circuit, registry, &templates, true)?;
    let templates = templates.into_iter().map(|(_, t)| t).collect();
    let designer = Designer::from_parts(config, templates, &parts, &wires)?;
    tracing::debug!(
        name = %file.name,
        components = designer.circuit().component_count(),
        wires = designer.circuit().wire_count(),
        "circuit decoded"
    );
    Ok(designer)
}

pub(crate) fn encode_template(
    template: &IcTemplate,
    registry: &CodecRegistry,
    ctx: &EncodeContext<'_>,
) -> ProjectResult<TemplateDef> {
    let (circuit, index) = encode_circuit(template.circuit(), registry, ctx)?;
    let boundary = |ids: &[CompId]| -> ProjectResult<Vec<usize>> {
        ids.iter()
            .map(|id| {
                index.get(id).copied().ok_or_else(|| ProjectError::Decode {
                    what: format!("template '{}' boundary refers to a missing component", template.name()),
                })
            })
            .collect()
    };
    Ok(TemplateDef {
        name: template.name().to_string(),
        inputs: boundary(template.inputs())?,
        outputs: boundary(template.outputs())?,
        circuit,
    })
}

fn encode_circuit(
    circuit: &Circuit,
    registry: &CodecRegistry,
    ctx: &EncodeContext<'_>,
) -> ProjectResult<(CircuitDef, BTreeMap<CompId, usize>)> {
    let mut index = BTreeMap::new();
    let mut components = Vec::with_capacity(circuit.component_count());
    for (i, component) in circuit.components().enumerate() {
        index.insert(component.id, i);
        let state = registry.encode(&component.kind, ctx)?;
        let high = circuit
            .signals(component.id, PortDirection::Output)?
            .into_iter()
            .enumerate()
            .filter_map(|(i, on)| on.then_some(i))
            .collect();
        components.push(ComponentDef {
            name: component.name.clone(),
            kind: component.kind.tag().to_string(),
            inputs: configurable(component.kind.input_count()).then_some(component.inputs().len()),
            outputs: configurable(component.kind.output_count()).then_some(component.outputs().len()),
            state,
            high: Some(high),
        });
    }

    let mut wires = Vec::with_capacity(circuit.wire_count());
    for wire in circuit.wires() {
        let end = |port| -> ProjectResult<PortRef> {
            let port = circuit.try_port(port)?;
            let component = index.get(&port.parent).copied().ok_or_else(|| ProjectError::Decode {
                what: format!("wire {} touches a missing component", wire.id),
            })?;
            Ok(PortRef {
                component,
                port: port.index,
            })
        };
        wires.push(WireDef {
            from: end(wire.source)?,
            to: end(wire.target)?,
        });
    }
    Ok((CircuitDef { components, wires }, index))
}

fn configurable(count: ClampedValue) -> bool {
    count.min() != count.max()
}

pub(crate) fn decode_template(
    def: &TemplateDef,
    registry: &CodecRegistry,
    templates: &[(TemplateId, IcTemplate)],
    config: EngineConfig,
) -> ProjectResult<IcTemplate> {
    let (parts, wires) = decode_circuit(&def.circuit, registry, templates, true)?;
    // Nested IC instances carry their own copy of the template, so the
    // scratch designer does not need the template list.
    let scratch = Designer::from_parts(config, Vec::new(), &parts, &wires)?;
    let ids: Vec<CompId> = scratch.circuit().components().map(|c| c.id).collect();
    let boundary = |indices: &[usize]| -> ProjectResult<Vec<CompId>> {
        indices
            .iter()
            .map(|i| {
                ids.get(*i).copied().ok_or_else(|| ProjectError::Decode {
                    what: format!("template '{}' boundary index {i} out of range", def.name),
                })
            })
            .collect()
    };
    let inputs = boundary(&def.inputs)?;
    let outputs = boundary(&def.outputs)?;
    Ok(IcTemplate::new(
        def.name.clone(),
        scratch.circuit().clone(),
        inputs,
        outputs,
    )?)
}

/// Decode a circuit's components and wires. With `keep_signals` unset the
/// saved output signals are dropped and every part is evaluated instead.
pub(crate) fn decode_circuit(
    def: &CircuitDef,
    registry: &CodecRegistry,
    templates: &[(TemplateId, IcTemplate)],
    keep_signals: bool,
) -> ProjectResult<(Vec<Part>, Vec<PartWire>)> {
    let ctx = DecodeContext { templates, registry };
    let mut parts = Vec::with_capacity(def.components.len());
    for component in &def.components {
        let spec = decode_spec(component, registry, &ctx)?;
        let mut part = Part::new(spec);
        if let (Some(high), true) = (&component.high, keep_signals) {
            let count = part.spec.outputs.count()?;
            if let Some(bad) = high.iter().find(|i| **i >= count) {
                return Err(ProjectError::Decode {
                    what: format!("'{}' has no output {bad}", component.name),
                });
            }
            part = part.with_outputs((0..count).map(|i| high.contains(&i)).collect());
        }
        parts.push(part);
    }

    let wires = def
        .wires
        .iter()
        .map(|w| PartWire {
            from: (w.from.component, w.from.port),
            to: (w.to.component, w.to.port),
        })
        .collect();
    Ok((parts, wires))
}

pub(crate) fn decode_spec(
    def: &ComponentDef,
    registry: &CodecRegistry,
    ctx: &DecodeContext<'_>,
) -> ProjectResult<ComponentSpec> {
    let kind = registry.decode(&def.kind, &def.state, ctx)?;
    let mut spec = ComponentSpec::new(kind).named(def.name.clone());
    if let Some(n) = def.inputs {
        check_count(&def.name, "input", spec.inputs, n)?;
        spec = spec.with_inputs(n);
    }
    if let Some(n) = def.outputs {
        check_count(&def.name, "output", spec.outputs, n)?;
        spec = spec.with_outputs(n);
    }
    Ok(spec)
}

fn check_count(name: &str, what: &str, bounds: ClampedValue, requested: usize) -> ProjectResult<()> {
    if i64::try_from(requested).is_ok_and(|n| bounds.accepts(n)) {
        return Ok(());
    }
    Err(ProjectError::Decode {
        what: format!(
            "'{name}' cannot have {requested} {what}s (allowed {}..={})",
            bounds.min(),
            bounds.max()
        ),
    })
}
