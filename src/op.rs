use crate::geometry::StrokePoint;
use crate::layer::LayerId;
use egui::{Color32, Pos2, Vec2};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Freehand tools that produce stroke ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Pen,
    Highlighter,
    Eraser,
}

/// Brush texture applied when rendering a non-smooth stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrushKind {
    Smooth,
    Textured,
    // Currently renders like Smooth; kept so documents round-trip.
    Calligraphy,
}

/// Pixel-combination rule used when painting an op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    /// Source-over alpha blending.
    Normal,
    /// Destination-out: the op's coverage subtracts alpha from the surface.
    Erase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Line,
    Rect,
    Ellipse,
}

/// Highlighter strokes always paint at this alpha.
pub const HIGHLIGHTER_ALPHA: f32 = 0.3;

/// A finalized freehand stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeOp {
    pub tool: Tool,
    pub color: Color32,
    pub width: f32,
    pub alpha: f32,
    pub blend: BlendMode,
    /// At least one sampled point, in device-pixel space.
    pub points: Vec<StrokePoint>,
    pub smooth: bool,
    pub brush: BrushKind,
    /// Seed for the textured brush jitter, fixed at capture time so
    /// re-renders are pixel-identical.
    pub seed: u64,
    pub layer: LayerId,
}

/// A two-point geometric shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeOp {
    pub kind: ShapeKind,
    pub color: Color32,
    pub width: f32,
    pub alpha: f32,
    pub blend: BlendMode,
    pub start: Pos2,
    pub end: Pos2,
    pub layer: LayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOp {
    pub text: String,
    pub pos: Pos2,
    pub color: Color32,
    pub size: f32,
    pub family: String,
    pub layer: LayerId,
}

/// An imported bitmap placed on the surface.
///
/// The decoded pixels are externally owned and are not portable through
/// document serialization; only the placement survives a round-trip.
#[derive(Clone, Serialize, Deserialize)]
pub struct ImageOp {
    #[serde(skip)]
    pub bitmap: Option<Arc<RgbaImage>>,
    pub pos: Pos2,
    pub size: Vec2,
    pub layer: LayerId,
}

impl PartialEq for ImageOp {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos && self.size == other.size && self.layer == other.layer
    }
}

impl fmt::Debug for ImageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageOp")
            .field("bitmap", &self.bitmap.as_ref().map(|_| "<bitmap>"))
            .field("pos", &self.pos)
            .field("size", &self.size)
            .field("layer", &self.layer)
            .finish()
    }
}

/// One atomic drawing instruction in the document, immutable once committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Op {
    Stroke(StrokeOp),
    Shape(ShapeOp),
    Text(TextOp),
    Image(ImageOp),
}

impl Op {
    /// The layer this op belongs to.
    pub fn layer(&self) -> LayerId {
        match self {
            Op::Stroke(s) => s.layer,
            Op::Shape(s) => s.layer,
            Op::Text(t) => t.layer,
            Op::Image(i) => i.layer,
        }
    }

    /// Image ops are excluded from document serialization.
    pub fn is_portable(&self) -> bool {
        !matches!(self, Op::Image(_))
    }
}
