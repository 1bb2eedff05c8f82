//! Core of a layered raster drawing surface.
//!
//! Pointer input becomes immutable drawing ops (strokes, shapes, text,
//! imported images) in an ordered document; the compositor repaints the
//! document deterministically onto a fixed-size raster surface with correct
//! layering and blending. The on-screen control panel, shortcut wiring and
//! event transport live in the host application.

#![warn(clippy::all, rust_2018_idioms)]

pub mod capture;
pub mod constraint;
pub mod document;
pub mod geometry;
pub mod history;
pub mod import;
pub mod input;
pub mod layer;
pub mod op;
pub mod persistence;
pub mod render;
pub mod util;

pub use capture::{StrokeCapture, ToolContext};
pub use constraint::constrain;
pub use document::Document;
pub use geometry::StrokePoint;
pub use history::History;
pub use input::{PointerEvent, PointerSource, SurfaceView};
pub use layer::{Layer, LayerId, LayerStack};
pub use op::{BlendMode, BrushKind, Op, ShapeKind, ShapeOp, StrokeOp, TextOp, Tool};
pub use render::{Background, Compositor};
