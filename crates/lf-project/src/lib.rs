//! lf-project: canonical circuit file format, conversion to and from a live
//! designer, paste, validation and migration.

pub mod codec;
pub mod convert;
pub mod fingerprint;
pub mod migrate;
pub mod paste;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use codec::{CodecRegistry, DecodeContext, EncodeContext, KindCodec};
pub use convert::{deserialize, deserialize_with, serialize, serialize_with};
pub use fingerprint::{fingerprint, template_fingerprints};
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use paste::{paste, try_paste};
pub use schema::*;
pub use validate::{ValidationError, validate_file};

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("Decode error: {what}")]
    Decode { what: String },

    #[error("Circuit error: {0}")]
    Circuit(#[from] lf_circuit::CircuitError),

    #[error(transparent)]
    Core(#[from] lf_core::LfError),

    #[error("Unsupported file extension: {path}")]
    UnknownFormat { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> ProjectResult<CircuitFile> {
    let content = std::fs::read_to_string(path)?;
    let mut file: CircuitFile = serde_yaml::from_str(&content)?;
    file = migrate_to_latest(file)?;
    validate_file(&file)?;
    tracing::info!(path = %path.display(), "loaded circuit '{}'", file.name);
    Ok(file)
}

pub fn save_yaml(path: &Path, file: &CircuitFile) -> ProjectResult<()> {
    validate_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "saved circuit '{}'", file.name);
    Ok(())
}

pub fn load_json(path: &Path) -> ProjectResult<CircuitFile> {
    let content = std::fs::read_to_string(path)?;
    let mut file: CircuitFile = serde_json::from_str(&content)?;
    file = migrate_to_latest(file)?;
    validate_file(&file)?;
    tracing::info!(path = %path.display(), "loaded circuit '{}'", file.name);
    Ok(file)
}

pub fn save_json(path: &Path, file: &CircuitFile) -> ProjectResult<()> {
    validate_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "saved circuit '{}'", file.name);
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> ProjectResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(ProjectError::UnknownFormat {
            path: path.display().to_string(),
        }),
    }
}

/// Load a YAML or JSON file, chosen by extension.
pub fn load(path: &Path) -> ProjectResult<CircuitFile> {
    match format_of(path)? {
        Format::Yaml => load_yaml(path),
        Format::Json => load_json(path),
    }
}

/// Save as YAML or JSON, chosen by extension.
pub fn save(path: &Path, file: &CircuitFile) -> ProjectResult<()> {
    match format_of(path)? {
        Format::Yaml => save_yaml(path, file),
        Format::Json => save_json(path, file),
    }
}
