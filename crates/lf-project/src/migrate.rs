//! Schema migration framework.
//!
//! Version 0 files used the legacy one-word type tags (`andgate`,
//! `consthigh`, ...). Version 1 uses the snake_case tags.

use crate::ProjectError;
use crate::schema::{CircuitDef, CircuitFile};

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut file: CircuitFile) -> Result<CircuitFile, ProjectError> {
    while file.version < LATEST_VERSION {
        file = migrate_one_version(file)?;
    }
    Ok(file)
}

fn migrate_one_version(file: CircuitFile) -> Result<CircuitFile, ProjectError> {
    match file.version {
        0 => migrate_v0_to_v1(file),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Current tag for a version 0 tag, if it was renamed.
pub fn legacy_tag(tag: &str) -> Option<&'static str> {
    let renamed = match tag {
        "consthigh" => "constant_high",
        "constlow" => "constant_low",
        "buffergate" => "buffer",
        "notgate" => "not",
        "andgate" => "and",
        "orgate" => "or",
        "xorgate" => "xor",
        "nandgate" => "nand",
        "norgate" => "nor",
        "xnorgate" => "xnor",
        "dflipflop" => "d_flip_flop",
        "tflipflop" => "t_flip_flop",
        "srlatch" => "sr_latch",
        _ => return None,
    };
    Some(renamed)
}

fn migrate_v0_to_v1(mut file: CircuitFile) -> Result<CircuitFile, ProjectError> {
    fn rename(circuit: &mut CircuitDef) {
        for component in &mut circuit.components {
            if let Some(tag) = legacy_tag(&component.kind) {
                component.kind = tag.to_string();
            }
        }
    }

    rename(&mut file.circuit);
    for template in &mut file.templates {
        rename(&mut template.circuit);
    }
    file.version = 1;
    Ok(file)
}
