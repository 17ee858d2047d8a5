//! Pasting a stored circuit into a live designer as one undoable edit.

use std::collections::BTreeMap;

use lf_circuit::{
    AddComponent, AddTemplate, Connect, Designer, GroupAction, History, IcTemplate, select_group,
};
use lf_core::{CompId, TemplateId};

use crate::codec::{CodecRegistry, EncodeContext};
use crate::convert::{decode_circuit, decode_template, encode_template};
use crate::fingerprint::template_fingerprints;
use crate::migrate::migrate_to_latest;
use crate::schema::CircuitFile;
use crate::validate::validate_with;
use crate::{ProjectError, ProjectResult};

/// Paste `file` into `designer` and record it in `history`.
///
/// Returns `false`, with the designer and history untouched, when the file
/// cannot be decoded or any part of the edit fails.
pub fn paste(designer: &mut Designer, history: &mut History, file: &CircuitFile) -> bool {
    match try_paste(designer, history, file, &CodecRegistry::standard()) {
        Ok(ids) => {
            tracing::info!(components = ids.len(), "pasted circuit '{}'", file.name);
            true
        }
        Err(err) => {
            tracing::warn!(error = %err, "paste of '{}' failed", file.name);
            false
        }
    }
}

/// Like [`paste`], reporting why a paste failed. On success returns the
/// handles of the pasted components, which become the selection.
pub fn try_paste(
    designer: &mut Designer,
    history: &mut History,
    file: &CircuitFile,
    registry: &CodecRegistry,
) -> ProjectResult<Vec<CompId>> {
    let file = migrate_to_latest(file.clone())?;
    validate_with(&file, registry)?;

    let mut group = GroupAction::named(format!("Pasted {}", file.name));
    let templates = transfer_templates(designer, &mut group, &file, registry)?;

    let (parts, wires) = decode_circuit(&file.circuit, registry, &templates, false)?;
    let mut added: Vec<AddComponent> = Vec::with_capacity(parts.len());
    for part in parts {
        added.push(AddComponent::new(designer, part.spec)?);
    }

    let mut connects = Vec::with_capacity(wires.len());
    for wire in &wires {
        let source = added
            .get(wire.from.0)
            .and_then(|a| a.outputs().get(wire.from.1))
            .copied();
        let target = added
            .get(wire.to.0)
            .and_then(|a| a.inputs().get(wire.to.1))
            .copied();
        let (Some(source), Some(target)) = (source, target) else {
            return Err(ProjectError::Decode {
                what: format!(
                    "wire {}:{} -> {}:{} refers to a missing port",
                    wire.from.0, wire.from.1, wire.to.0, wire.to.1
                ),
            });
        };
        connects.push(Connect::new(designer, source, target));
    }

    let ids: Vec<CompId> = added.iter().map(|a| a.id()).collect();
    for add in added {
        group.push(add);
    }
    for connect in connects {
        group.push(connect);
    }
    group.extend(select_group(designer, &ids));

    // A failing child rolls the whole group back before the error returns.
    history.perform(designer, group)?;
    Ok(ids)
}

/// Resolve every template of `file` to a handle in `designer`, queueing an
/// [`AddTemplate`] for each one the designer does not already have.
fn transfer_templates(
    designer: &mut Designer,
    group: &mut GroupAction,
    file: &CircuitFile,
    registry: &CodecRegistry,
) -> ProjectResult<Vec<(TemplateId, IcTemplate)>> {
    let existing_index: BTreeMap<TemplateId, usize> = designer
        .templates()
        .enumerate()
        .map(|(i, (id, _))| (id, i))
        .collect();
    let ctx = EncodeContext {
        template_index: &existing_index,
        registry,
    };
    let existing_defs = designer
        .templates()
        .map(|(_, t)| encode_template(t, registry, &ctx))
        .collect::<ProjectResult<Vec<_>>>()?;
    let existing_ids: Vec<TemplateId> = designer.templates().map(|(id, _)| id).collect();
    let mut known: BTreeMap<String, TemplateId> = template_fingerprints(&existing_defs)
        .into_iter()
        .zip(existing_ids)
        .collect();

    let incoming = template_fingerprints(&file.templates);
    let mut resolved: Vec<(TemplateId, IcTemplate)> = Vec::with_capacity(file.templates.len());
    for (def, print) in file.templates.iter().zip(incoming) {
        if let Some(id) = known.get(&print).copied() {
            let template = designer
                .template(id)
                .cloned()
                .or_else(|| resolved.iter().find(|(r, _)| *r == id).map(|(_, t)| t.clone()))
                .ok_or(lf_circuit::CircuitError::UnknownTemplate(id))?;
            tracing::debug!(template = %def.name, %id, "reusing existing template");
            resolved.push((id, template));
            continue;
        }
        let template = decode_template(def, registry, &resolved, *designer.config())?;
        let add = AddTemplate::new(designer, template.clone());
        known.insert(print, add.id());
        resolved.push((add.id(), template));
        group.push(add);
    }
    Ok(resolved)
}
