//! The compositor: paints the committed op sequence onto a fixed-size raster
//! surface, layer by layer, plus the transient preview overlay used during
//! shape drags.

mod raster;

use crate::document::Document;
use crate::layer::LayerStack;
use crate::op::{BlendMode, BrushKind, ImageOp, Op, ShapeKind, ShapeOp, StrokeOp, TextOp, Tool};
use egui::{Color32, Pos2};
use image::{GrayImage, RgbaImage};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Background pattern painted under all layers, in device-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    #[default]
    Plain,
    Grid,
    Ruled,
    Dot,
}

/// Grid lines are 1px every 32px.
const GRID_SPACING: u32 = 32;
/// Ruled lines every 36px, with one vertical margin line at x = 64.5.
const RULED_SPACING: u32 = 36;
const RULED_MARGIN_X: f32 = 64.5;
/// Dot lattice spacing and dot radius.
const DOT_SPACING: u32 = 24;
const DOT_RADIUS: f32 = 1.0;

const GRID_COLOR: Color32 = Color32::from_rgb(221, 221, 221);
const RULED_COLOR: Color32 = Color32::from_rgb(199, 208, 245);
const MARGIN_COLOR: Color32 = Color32::from_rgb(244, 178, 178);
const DOT_COLOR: Color32 = Color32::from_rgb(203, 211, 225);

/// Owns the persistent and preview surfaces and repaints them from a
/// document snapshot.
///
/// Rendering is deterministic: the same document, layers and background
/// produce pixel-identical output. Nothing else writes to the surfaces.
pub struct Compositor {
    surface: RgbaImage,
    preview: RgbaImage,
    fonts: HashMap<String, ab_glyph::FontArc>,
    default_font: Option<ab_glyph::FontArc>,
}

impl Compositor {
    /// Creates surfaces of a fixed device-pixel size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            surface: RgbaImage::new(width, height),
            preview: RgbaImage::new(width, height),
            fonts: HashMap::new(),
            default_font: default_font(),
        }
    }

    /// The persistent surface holding the last full render.
    pub fn surface(&self) -> &RgbaImage {
        &self.surface
    }

    /// The transient overlay; fully transparent outside a shape drag.
    pub fn preview(&self) -> &RgbaImage {
        &self.preview
    }

    /// Registers a font for a family name used by text ops. Unknown families
    /// fall back to the built-in default.
    pub fn register_font(&mut self, family: &str, font: ab_glyph::FontArc) {
        self.fonts.insert(family.to_string(), font);
    }

    /// Repaints the persistent surface from scratch: background, then every
    /// visible layer bottom-to-top, each layer's ops in insertion order.
    ///
    /// `live` is the in-progress stroke, if any; it paints after the
    /// committed ops of its own layer so an uncommitted erase previews with
    /// correct compositing. The preview overlay is cleared, since it is only
    /// meaningful during a shape drag.
    pub fn render(
        &mut self,
        document: &Document,
        layers: &LayerStack,
        background: Background,
        live: Option<&StrokeOp>,
    ) {
        self.paint_background(background);
        for layer in layers.iter() {
            if !layer.visible {
                continue;
            }
            for op in document.ops_for(layer.id) {
                self.paint_op(op, layer.opacity);
            }
            if let Some(stroke) = live {
                if stroke.layer == layer.id {
                    paint_stroke(&mut self.surface, stroke, layer.opacity);
                }
            }
        }
        raster::clear(&mut self.preview);
    }

    /// Paints a provisional shape onto the preview overlay at exactly the
    /// alpha it would composite with once committed. The persistent surface
    /// is untouched, so cancelling the gesture needs no rollback.
    pub fn preview_shape(&mut self, shape: &ShapeOp, layers: &LayerStack) {
        raster::clear(&mut self.preview);
        if let Some(layer) = layers.get(shape.layer) {
            if layer.visible {
                paint_shape(&mut self.preview, shape, layer.opacity);
            }
        }
    }

    /// Clears the preview overlay, e.g. when a shape gesture is abandoned.
    pub fn clear_preview(&mut self) {
        raster::clear(&mut self.preview);
    }

    fn paint_background(&mut self, background: Background) {
        let (w, h) = (self.surface.width(), self.surface.height());
        raster::fill(&mut self.surface, Color32::WHITE);
        match background {
            Background::Plain => {}
            Background::Grid => {
                for x in (0..w).step_by(GRID_SPACING as usize) {
                    for y in 0..h {
                        raster::blend_pixel(
                            &mut self.surface,
                            x as i32,
                            y as i32,
                            GRID_COLOR,
                            BlendMode::Normal,
                        );
                    }
                }
                for y in (0..h).step_by(GRID_SPACING as usize) {
                    for x in 0..w {
                        raster::blend_pixel(
                            &mut self.surface,
                            x as i32,
                            y as i32,
                            GRID_COLOR,
                            BlendMode::Normal,
                        );
                    }
                }
            }
            Background::Ruled => {
                for y in (RULED_SPACING..h).step_by(RULED_SPACING as usize) {
                    for x in 0..w {
                        raster::blend_pixel(
                            &mut self.surface,
                            x as i32,
                            y as i32,
                            RULED_COLOR,
                            BlendMode::Normal,
                        );
                    }
                }
                let margin_x = RULED_MARGIN_X.floor() as i32;
                for y in 0..h {
                    raster::blend_pixel(
                        &mut self.surface,
                        margin_x,
                        y as i32,
                        MARGIN_COLOR,
                        BlendMode::Normal,
                    );
                }
            }
            Background::Dot => {
                let mut mask = GrayImage::new(w, h);
                for y in (0..h).step_by(DOT_SPACING as usize) {
                    for x in (0..w).step_by(DOT_SPACING as usize) {
                        raster::stamp_dab(&mut mask, Pos2::new(x as f32, y as f32), DOT_RADIUS);
                    }
                }
                raster::composite_mask(&mut self.surface, &mask, DOT_COLOR, BlendMode::Normal);
            }
        }
    }

    fn paint_op(&mut self, op: &Op, layer_opacity: f32) {
        match op {
            Op::Stroke(stroke) => paint_stroke(&mut self.surface, stroke, layer_opacity),
            Op::Shape(shape) => paint_shape(&mut self.surface, shape, layer_opacity),
            Op::Text(text) => self.paint_text(text, layer_opacity),
            Op::Image(image) => paint_image(&mut self.surface, image, layer_opacity),
        }
    }

    fn paint_text(&mut self, text: &TextOp, layer_opacity: f32) {
        let Some(font) = self.fonts.get(&text.family).or(self.default_font.as_ref()) else {
            log::warn!("no font available for family {:?}; skipping text op", text.family);
            return;
        };
        // Text ignores per-op alpha; only the layer's opacity applies.
        let a = (layer_opacity * 255.0).round().clamp(0.0, 255.0) as u8;
        let color =
            Color32::from_rgba_unmultiplied(text.color.r(), text.color.g(), text.color.b(), a);
        raster::draw_text(&mut self.surface, font, text.pos, &text.text, color, text.size);
    }
}

/// Effective paint color: op color at op alpha × layer opacity.
fn paint_color(color: Color32, alpha: f32, layer_opacity: f32) -> Color32 {
    let a = (alpha * layer_opacity * 255.0).round().clamp(0.0, 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a)
}

fn paint_shape(img: &mut RgbaImage, shape: &ShapeOp, layer_opacity: f32) {
    let mut mask = GrayImage::new(img.width(), img.height());
    match shape.kind {
        ShapeKind::Line => raster::draw_line(&mut mask, shape.start, shape.end, shape.width),
        ShapeKind::Rect => raster::draw_rect_outline(&mut mask, shape.start, shape.end, shape.width),
        ShapeKind::Ellipse => {
            raster::draw_ellipse_outline(&mut mask, shape.start, shape.end, shape.width)
        }
    }
    let color = paint_color(shape.color, shape.alpha, layer_opacity);
    raster::composite_mask(img, &mask, color, shape.blend);
}

fn paint_image(img: &mut RgbaImage, image: &ImageOp, layer_opacity: f32) {
    let Some(bitmap) = &image.bitmap else {
        // A document loaded from disk has placement but no pixels.
        return;
    };
    raster::blit_scaled(img, bitmap, image.pos, image.size, layer_opacity);
}

/// Width of one rendered segment: pressure modulates the stored width except
/// for the eraser, which erases at constant width.
fn segment_width(stroke: &StrokeOp, pressure: f32) -> f32 {
    if stroke.tool == Tool::Eraser {
        stroke.width
    } else {
        stroke.width * (0.5 + 0.5 * pressure)
    }
}

/// Paints a stroke as a poly-curve of quadratic segments through the
/// midpoints of consecutive samples. The curve passes near, not exactly
/// through, interior samples; that smoothing is deliberate. The textured
/// brush perturbs each midpoint with jitter from the stroke's stored seed, so
/// repainting the same stroke is pixel-identical.
///
/// The whole stroke accumulates into one coverage mask and composites once,
/// so its alpha does not stack where segments overlap.
fn paint_stroke(img: &mut RgbaImage, stroke: &StrokeOp, layer_opacity: f32) {
    let points = &stroke.points;
    if points.is_empty() {
        return;
    }
    let mut mask = GrayImage::new(img.width(), img.height());
    match points.len() {
        1 => {
            // A tap commits a single visible dab.
            let p = points[0];
            let radius = (segment_width(stroke, p.pressure) / 2.0).max(0.5);
            raster::stamp_dab(&mut mask, p.pos, radius);
        }
        2 => {
            let width = segment_width(stroke, points[0].pressure);
            raster::draw_line(&mut mask, points[0].pos, points[1].pos, width);
        }
        _ => {
            let mut rng = SmallRng::seed_from_u64(stroke.seed);
            let jitter = (stroke.width * 0.25).clamp(0.5, 2.0);
            let mut prev = points[0].pos;
            for i in 1..points.len() - 1 {
                let mut mid = Pos2::new(
                    (points[i].pos.x + points[i + 1].pos.x) / 2.0,
                    (points[i].pos.y + points[i + 1].pos.y) / 2.0,
                );
                if stroke.brush == BrushKind::Textured {
                    mid.x += rng.gen_range(-jitter..=jitter);
                    mid.y += rng.gen_range(-jitter..=jitter);
                }
                let width = segment_width(stroke, points[i].pressure);
                raster::draw_quad(&mut mask, prev, points[i].pos, mid, width);
                prev = mid;
            }
            let last = points[points.len() - 1];
            let width = segment_width(stroke, last.pressure);
            raster::draw_line(&mut mask, prev, last.pos, width);
        }
    }
    let color = paint_color(stroke.color, stroke.alpha, layer_opacity);
    raster::composite_mask(img, &mask, color, stroke.blend);
}

/// The embedded egui proportional font, used when the host registers nothing
/// for a text op's family.
fn default_font() -> Option<ab_glyph::FontArc> {
    let definitions = egui::FontDefinitions::default();
    let family = definitions.families.get(&egui::FontFamily::Proportional)?;
    let name = family.first()?;
    let data = definitions.font_data.get(name)?;
    let font = ab_glyph::FontVec::try_from_vec_and_index(data.font.to_vec(), data.index).ok()?;
    Some(ab_glyph::FontArc::from(font))
}
