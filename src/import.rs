use crate::layer::LayerId;
use crate::op::ImageOp;
use egui::{Pos2, Vec2};
use image::RgbaImage;
use std::sync::Arc;
use thiserror::Error;

/// Errors from decoding an imported image file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes an image file's bytes and places it on the surface as an image
/// op: scaled to fit (never upscaled) and centered.
///
/// Decode and file reading happen on the host's schedule; the resulting op
/// is simply appended after whatever the user committed in the meantime.
pub fn import_bytes(
    bytes: &[u8],
    surface_size: Vec2,
    layer: LayerId,
) -> Result<ImageOp, ImportError> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    log::debug!("decoded imported image: {}x{}", decoded.width(), decoded.height());
    Ok(place(Arc::new(decoded), surface_size, layer))
}

/// Places an already-decoded bitmap: `scale = min(sw/iw, sh/ih, 1)`,
/// centered on the surface.
pub fn place(bitmap: Arc<RgbaImage>, surface_size: Vec2, layer: LayerId) -> ImageOp {
    let (iw, ih) = (bitmap.width() as f32, bitmap.height() as f32);
    let scale = (surface_size.x / iw).min(surface_size.y / ih).min(1.0);
    let size = Vec2::new(iw * scale, ih * scale);
    let pos = Pos2::new(
        (surface_size.x - size.x) / 2.0,
        (surface_size.y - size.y) / 2.0,
    );
    ImageOp {
        bitmap: Some(bitmap),
        pos,
        size,
        layer,
    }
}
