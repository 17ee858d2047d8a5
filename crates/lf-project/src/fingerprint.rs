//! Content fingerprints for IC templates.
//!
//! Two template definitions with the same fingerprint describe the same IC.
//! Nested IC references are replaced by the nested template's fingerprint, so
//! the result does not depend on where a template sits in a file's list.

use sha2::{Digest, Sha256};

use crate::schema::{StateValue, TemplateDef};

/// Fingerprint every template of a list, in order.
pub fn template_fingerprints(defs: &[TemplateDef]) -> Vec<String> {
    let mut prints: Vec<String> = Vec::with_capacity(defs.len());
    for def in defs {
        let print = fingerprint(def, &prints);
        prints.push(print);
    }
    prints
}

/// Fingerprint one template. `nested[i]` is the fingerprint of template `i`
/// of the same list.
pub fn fingerprint(def: &TemplateDef, nested: &[String]) -> String {
    let mut canonical = def.clone();
    for component in &mut canonical.circuit.components {
        // Saved signals and IC contents are state, not structure.
        component.high = None;
        if component.kind != "ic" {
            continue;
        }
        component.state.remove("inner");
        if let Some(StateValue::Int(index)) = component.state.get("template") {
            let print = usize::try_from(*index)
                .ok()
                .and_then(|i| nested.get(i))
                .cloned()
                .unwrap_or_default();
            component
                .state
                .insert("template".to_string(), StateValue::Text(print));
        }
    }

    let mut hasher = Sha256::new();
    // Struct fields serialize in declaration order and state maps are
    // sorted, so the JSON text is canonical.
    let json = serde_json::to_string(&canonical).unwrap_or_default();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}
