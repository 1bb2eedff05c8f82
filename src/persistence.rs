use crate::document::Document;
use crate::op::Op;
use crate::util::time;
use image::RgbaImage;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while saving or loading documents and exports.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("failed to encode export: {0}")]
    Export(#[from] image::ImageError),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Serializes the document as a JSON array of op records.
///
/// Image ops are excluded: their bitmaps are externally owned and not
/// portable through this channel. That is a documented limitation of the
/// format, not a defect.
pub fn document_to_json(document: &Document) -> PersistenceResult<String> {
    let portable: Vec<&Op> = document.ops().iter().filter(|op| op.is_portable()).collect();
    Ok(serde_json::to_string_pretty(&portable)?)
}

/// Parses a serialized document.
///
/// Anything whose top level is not an array is rejected outright, so a
/// failed load can never leave a half-applied document: the caller's current
/// document is simply kept.
pub fn document_from_json(json: &str) -> PersistenceResult<Document> {
    let value: Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(PersistenceError::InvalidDocument(
            "top level must be an array of ops".to_string(),
        ));
    }
    let ops: Vec<Op> = serde_json::from_value(value)?;
    Ok(Document::from_ops(ops))
}

pub fn save_document(document: &Document, path: &Path) -> PersistenceResult<()> {
    let json = document_to_json(document)?;
    fs::write(path, json)?;
    log::info!("saved document to {}", path.display());
    Ok(())
}

pub fn load_document(path: &Path) -> PersistenceResult<Document> {
    let json = fs::read_to_string(path)?;
    let document = document_from_json(&json)?;
    log::info!(
        "loaded document with {} ops from {}",
        document.len(),
        path.display()
    );
    Ok(document)
}

/// Writes the rendered surface as a PNG named with a generation timestamp,
/// returning the path written.
pub fn export_png(surface: &RgbaImage, dir: &Path) -> PersistenceResult<PathBuf> {
    let path = dir.join(format!("inkboard-{}.png", time::timestamp_secs()));
    surface.save(&path)?;
    log::info!("exported {}x{} surface to {}", surface.width(), surface.height(), path.display());
    Ok(path)
}
