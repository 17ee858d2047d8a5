//! Circuit file validation logic.
//!
//! Structural checks only: anything that needs the kinds themselves (port
//! ranges, state field types) is reported when the file is decoded.

use std::collections::HashSet;

use crate::codec::CodecRegistry;
use crate::schema::{CircuitDef, CircuitFile, StateValue, TemplateDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_file(file: &CircuitFile) -> Result<(), ValidationError> {
    validate_with(file, &CodecRegistry::standard())
}

/// Validate against a custom codec table.
pub fn validate_with(file: &CircuitFile, registry: &CodecRegistry) -> Result<(), ValidationError> {
    if file.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    if file.settings.max_steps == Some(0) {
        return Err(ValidationError::InvalidValue {
            field: "settings.max_steps".to_string(),
            value: "0".to_string(),
            reason: "step cap must be positive".to_string(),
        });
    }

    for (index, template) in file.templates.iter().enumerate() {
        validate_template(template, index, registry)?;
    }
    validate_circuit(&file.circuit, file.templates.len(), "circuit", registry)
}

fn validate_template(
    template: &TemplateDef,
    index: usize,
    registry: &CodecRegistry,
) -> Result<(), ValidationError> {
    let context = format!("template '{}'", template.name);
    // A template may only instantiate templates defined before it.
    validate_circuit(&template.circuit, index, &context, registry)?;

    let count = template.circuit.components.len();
    let mut seen = HashSet::new();
    for (role, list) in [("input", &template.inputs), ("output", &template.outputs)] {
        for &component in list {
            if component >= count {
                return Err(ValidationError::MissingReference {
                    id: format!("{role} component {component}"),
                    context: context.clone(),
                });
            }
            if !seen.insert(component) {
                return Err(ValidationError::DuplicateId {
                    id: format!("boundary component {component}"),
                    context: context.clone(),
                });
            }
            let kind = template.circuit.components[component].kind.as_str();
            let fits = match role {
                "input" => matches!(kind, "switch" | "button"),
                _ => kind == "led",
            };
            if !fits {
                return Err(ValidationError::InvalidValue {
                    field: format!("{context} {role}s"),
                    value: kind.to_string(),
                    reason: format!("not a valid IC {role}"),
                });
            }
        }
    }
    Ok(())
}

fn validate_circuit(
    circuit: &CircuitDef,
    available_templates: usize,
    context: &str,
    registry: &CodecRegistry,
) -> Result<(), ValidationError> {
    for component in &circuit.components {
        if !registry.contains(&component.kind) {
            return Err(ValidationError::Unsupported {
                feature: component.kind.clone(),
                reason: format!("unknown component type in {context}"),
            });
        }
        if component.kind == "ic" {
            let target = match component.state.get("template") {
                Some(StateValue::Int(i)) => usize::try_from(*i).ok(),
                _ => None,
            };
            if !target.is_some_and(|t| t < available_templates) {
                return Err(ValidationError::MissingReference {
                    id: format!("template of IC '{}'", component.name),
                    context: context.to_string(),
                });
            }
        }
    }

    let count = circuit.components.len();
    let mut driven = HashSet::new();
    for wire in &circuit.wires {
        for end in [wire.from, wire.to] {
            if end.component >= count {
                return Err(ValidationError::MissingReference {
                    id: format!("component {}", end.component),
                    context: format!("{context} wires"),
                });
            }
        }
        if !driven.insert((wire.to.component, wire.to.port)) {
            return Err(ValidationError::DuplicateId {
                id: format!("input {}:{}", wire.to.component, wire.to.port),
                context: format!("{context} wires"),
            });
        }
    }
    Ok(())
}
