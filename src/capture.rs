use crate::geometry::{self, SIMPLIFY_EPSILON, StrokePoint};
use crate::layer::LayerId;
use crate::op::{BlendMode, BrushKind, HIGHLIGHTER_ALPHA, StrokeOp, Tool};
use egui::Color32;

/// Paint color stored on eraser strokes. With destination-out blending only
/// the coverage matters, so the color never shows.
pub const ERASER_COLOR: Color32 = Color32::BLACK;

/// The tool settings in effect for one gesture.
///
/// Callers pass this per invocation instead of the core reading ambient UI
/// state, which keeps capture (and the compositor) pure and testable.
#[derive(Debug, Clone)]
pub struct ToolContext {
    pub tool: Tool,
    pub color: Color32,
    pub width: f32,
    pub alpha: f32,
    pub smooth: bool,
    pub brush: BrushKind,
    pub layer: LayerId,
}

/// Accumulates pointer samples into a stroke while a freehand gesture is
/// active.
///
/// The in-progress stroke lives here, outside the committed document, and is
/// handed over atomically by [`finish`](Self::finish). Document ops therefore
/// stay immutable; the compositor renders the live stroke by taking it as an
/// extra transient op.
#[derive(Debug, Default)]
pub struct StrokeCapture {
    live: Option<StrokeOp>,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.live.is_some()
    }

    /// The stroke being drawn, for incremental rendering.
    pub fn live(&self) -> Option<&StrokeOp> {
        self.live.as_ref()
    }

    /// Starts a gesture at `point` with the given tool settings.
    ///
    /// The eraser paints with a fixed color and subtractive blending; the
    /// highlighter paints at a fixed alpha. Any stale live stroke from an
    /// interrupted gesture is discarded.
    pub fn begin(&mut self, ctx: &ToolContext, point: StrokePoint) {
        if self.live.is_some() {
            log::warn!("stroke gesture started while another was active; discarding the old one");
        }
        let (color, blend) = match ctx.tool {
            Tool::Eraser => (ERASER_COLOR, BlendMode::Erase),
            _ => (ctx.color, BlendMode::Normal),
        };
        let alpha = match ctx.tool {
            Tool::Highlighter => HIGHLIGHTER_ALPHA,
            _ => ctx.alpha,
        };
        self.live = Some(StrokeOp {
            tool: ctx.tool,
            color,
            width: ctx.width,
            alpha,
            blend,
            points: vec![point],
            smooth: ctx.smooth,
            brush: ctx.brush,
            seed: rand::random(),
            layer: ctx.layer,
        });
    }

    /// Appends a sampled point to the live stroke. Ignored when no gesture is
    /// active.
    pub fn push(&mut self, point: StrokePoint) {
        if let Some(stroke) = &mut self.live {
            stroke.points.push(point);
        }
    }

    /// Ends the gesture and returns the finalized stroke for commit.
    ///
    /// Lifting the pointer always commits; there is no cancel path for
    /// strokes, and a single-point tap becomes a stroke that renders as one
    /// dab. Smooth strokes are simplified here so serialized documents and
    /// re-renders pay for far fewer points than raw sampling produced.
    pub fn finish(&mut self) -> Option<StrokeOp> {
        let mut stroke = self.live.take()?;
        if stroke.smooth {
            let raw = stroke.points.len();
            stroke.points = geometry::simplify_rdp(&stroke.points, SIMPLIFY_EPSILON);
            log::debug!(
                "finalized smooth stroke: {} points simplified to {}",
                raw,
                stroke.points.len()
            );
        }
        Some(stroke)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(tool: Tool) -> ToolContext {
        ToolContext {
            tool,
            color: Color32::RED,
            width: 4.0,
            alpha: 0.8,
            smooth: false,
            brush: BrushKind::Smooth,
            layer: LayerId(0),
        }
    }

    #[test]
    fn pen_keeps_tool_color_and_alpha() {
        let mut capture = StrokeCapture::new();
        capture.begin(&ctx(Tool::Pen), StrokePoint::new(0.0, 0.0, 0.5));
        let stroke = capture.finish().unwrap();
        assert_eq!(stroke.color, Color32::RED);
        assert_eq!(stroke.alpha, 0.8);
        assert_eq!(stroke.blend, BlendMode::Normal);
    }

    #[test]
    fn eraser_forces_subtractive_blending() {
        let mut capture = StrokeCapture::new();
        capture.begin(&ctx(Tool::Eraser), StrokePoint::new(0.0, 0.0, 0.5));
        let stroke = capture.finish().unwrap();
        assert_eq!(stroke.color, ERASER_COLOR);
        assert_eq!(stroke.blend, BlendMode::Erase);
    }

    #[test]
    fn highlighter_paints_at_fixed_alpha() {
        let mut capture = StrokeCapture::new();
        capture.begin(&ctx(Tool::Highlighter), StrokePoint::new(0.0, 0.0, 0.5));
        let stroke = capture.finish().unwrap();
        assert_eq!(stroke.alpha, HIGHLIGHTER_ALPHA);
    }

    #[test]
    fn points_accumulate_while_active() {
        let mut capture = StrokeCapture::new();
        capture.begin(&ctx(Tool::Pen), StrokePoint::new(0.0, 0.0, 0.5));
        capture.push(StrokePoint::new(1.0, 1.0, 0.6));
        capture.push(StrokePoint::new(2.0, 2.0, 0.7));
        assert_eq!(capture.live().unwrap().points.len(), 3);

        let stroke = capture.finish().unwrap();
        assert_eq!(stroke.points.len(), 3);
        assert!(!capture.is_active());
    }

    #[test]
    fn push_without_gesture_is_ignored() {
        let mut capture = StrokeCapture::new();
        capture.push(StrokePoint::new(1.0, 1.0, 0.5));
        assert!(capture.finish().is_none());
    }

    #[test]
    fn smooth_stroke_is_simplified_on_finish() {
        let mut capture = StrokeCapture::new();
        let mut smooth_ctx = ctx(Tool::Pen);
        smooth_ctx.smooth = true;
        capture.begin(&smooth_ctx, StrokePoint::new(0.0, 0.0, 0.5));
        // A long, almost straight run of samples.
        for i in 1..50 {
            let wobble = if i % 2 == 0 { 0.2 } else { -0.2 };
            capture.push(StrokePoint::new(i as f32, wobble, 0.5));
        }
        let stroke = capture.finish().unwrap();
        assert!(stroke.points.len() < 10, "kept {} points", stroke.points.len());
        assert_eq!(stroke.points.first().unwrap().pos.x, 0.0);
        assert_eq!(stroke.points.last().unwrap().pos.x, 49.0);
    }

    #[test]
    fn single_point_tap_still_commits() {
        let mut capture = StrokeCapture::new();
        let mut smooth_ctx = ctx(Tool::Pen);
        smooth_ctx.smooth = true;
        capture.begin(&smooth_ctx, StrokePoint::new(3.0, 4.0, 0.5));
        let stroke = capture.finish().unwrap();
        assert_eq!(stroke.points.len(), 1);
    }
}
