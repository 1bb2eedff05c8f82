//! End-to-end gesture flows: pointer events through capture, constraint,
//! history and compositing.

use egui::{Color32, Pos2, Vec2};
use inkboard::{
    Background, BlendMode, BrushKind, Compositor, History, LayerId, LayerStack, Op, PointerEvent,
    PointerSource, ShapeKind, ShapeOp, StrokeCapture, SurfaceView, Tool, ToolContext, constrain,
};

fn pen_context(layer: LayerId) -> ToolContext {
    ToolContext {
        tool: Tool::Pen,
        color: Color32::from_rgb(200, 30, 30),
        width: 6.0,
        alpha: 1.0,
        smooth: true,
        brush: BrushKind::Smooth,
        layer,
    }
}

fn hidpi_view() -> SurfaceView {
    SurfaceView {
        origin: Pos2::ZERO,
        displayed: Vec2::new(32.0, 32.0),
        device: Vec2::new(64.0, 64.0),
    }
}

#[test]
fn pen_gesture_commits_and_renders() {
    let layers = LayerStack::new();
    let mut history = History::new();
    let mut capture = StrokeCapture::new();
    let mut comp = Compositor::new(64, 64);
    let view = hidpi_view();

    // Drag across the displayed surface; coordinates double on the backing
    // store.
    let samples = [(4.0, 16.0), (10.0, 16.0), (16.0, 16.0), (22.0, 16.0), (28.0, 16.0)];
    let mut events = samples.iter().map(|&(x, y)| PointerEvent {
        client: Pos2::new(x, y),
        pressure: None,
        source: PointerSource::Mouse,
    });

    capture.begin(&pen_context(layers.active()), view.to_device(&events.next().unwrap()));
    for event in events {
        capture.push(view.to_device(&event));
        // Incremental rendering sees the live stroke before commit.
        comp.render(history.document(), &layers, Background::Plain, capture.live());
    }
    assert!(comp.surface().get_pixel(32, 32).0[3] > 0);
    assert_ne!(comp.surface().get_pixel(32, 32).0, [255, 255, 255, 255]);

    let stroke = capture.finish().unwrap();
    assert!(stroke.points.first().unwrap().pos == Pos2::new(8.0, 32.0));
    history.commit(Op::Stroke(stroke));

    comp.render(history.document(), &layers, Background::Plain, None);
    assert_ne!(comp.surface().get_pixel(32, 32).0, [255, 255, 255, 255]);
    assert!(history.can_undo());
}

#[test]
fn shape_gesture_previews_then_commits_constrained() {
    let layers = LayerStack::new();
    let mut history = History::new();
    let mut comp = Compositor::new(64, 64);

    let provisional = ShapeOp {
        kind: ShapeKind::Rect,
        color: Color32::BLUE,
        width: 2.0,
        alpha: 1.0,
        blend: BlendMode::Normal,
        start: Pos2::new(10.0, 10.0),
        end: Pos2::new(50.0, 26.0),
        layer: layers.active(),
    };

    // During the drag: constrained preview only.
    let preview = constrain(provisional.clone(), true);
    comp.preview_shape(&preview, &layers);
    assert!(comp.preview().get_pixel(10, 18).0[3] > 0);
    assert_eq!(comp.surface().get_pixel(10, 18).0[3], 0, "persistent surface untouched");

    // On release: the same constraint call commits the same geometry.
    let committed = constrain(provisional, true);
    assert_eq!(committed.end, Pos2::new(26.0, 26.0));
    assert_eq!(committed.end, preview.end);
    history.commit(Op::Shape(committed));

    comp.render(history.document(), &layers, Background::Plain, None);
    assert!(comp.surface().get_pixel(10, 18).0[3] > 0);
    assert_eq!(comp.preview().get_pixel(10, 18).0[3], 0);
}

#[test]
fn abandoned_shape_gesture_leaves_no_trace() {
    let layers = LayerStack::new();
    let history = History::new();
    let mut comp = Compositor::new(64, 64);

    let provisional = ShapeOp {
        kind: ShapeKind::Ellipse,
        color: Color32::BLUE,
        width: 2.0,
        alpha: 1.0,
        blend: BlendMode::Normal,
        start: Pos2::new(8.0, 8.0),
        end: Pos2::new(40.0, 40.0),
        layer: layers.active(),
    };
    comp.preview_shape(&provisional, &layers);

    // Pointer-cancel: discard the provisional op, clear the overlay.
    comp.clear_preview();
    assert!(comp.preview().pixels().all(|p| p.0[3] == 0));
    assert!(history.document().is_empty());
}

#[test]
fn undo_restores_previous_pixels_exactly() {
    let layers = LayerStack::new();
    let mut history = History::new();
    let mut capture = StrokeCapture::new();
    let mut comp = Compositor::new(64, 64);

    capture.begin(&pen_context(layers.active()), inkboard::StrokePoint::new(8.0, 8.0, 0.5));
    capture.push(inkboard::StrokePoint::new(40.0, 40.0, 0.5));
    history.commit(Op::Stroke(capture.finish().unwrap()));

    comp.render(history.document(), &layers, Background::Grid, None);
    let one_stroke = comp.surface().as_raw().clone();

    capture.begin(&pen_context(layers.active()), inkboard::StrokePoint::new(8.0, 40.0, 0.5));
    capture.push(inkboard::StrokePoint::new(40.0, 8.0, 0.5));
    history.commit(Op::Stroke(capture.finish().unwrap()));
    comp.render(history.document(), &layers, Background::Grid, None);
    assert_ne!(comp.surface().as_raw(), &one_stroke);

    assert!(history.undo());
    comp.render(history.document(), &layers, Background::Grid, None);
    assert_eq!(comp.surface().as_raw(), &one_stroke);

    assert!(history.redo());
    assert_eq!(history.document().len(), 2);
}

#[test]
fn deleting_a_layer_removes_its_ops_from_the_render() {
    let mut layers = LayerStack::new();
    let scratch = layers.add("scratch");
    let mut history = History::new();
    let mut capture = StrokeCapture::new();

    // One stroke on each layer.
    let mut base_ctx = pen_context(LayerId(0));
    base_ctx.color = Color32::BLACK;
    capture.begin(&base_ctx, inkboard::StrokePoint::new(8.0, 8.0, 0.5));
    capture.push(inkboard::StrokePoint::new(8.0, 56.0, 0.5));
    history.commit(Op::Stroke(capture.finish().unwrap()));

    capture.begin(&pen_context(scratch), inkboard::StrokePoint::new(56.0, 8.0, 0.5));
    capture.push(inkboard::StrokePoint::new(56.0, 56.0, 0.5));
    history.commit(Op::Stroke(capture.finish().unwrap()));

    assert!(layers.remove(scratch));
    history.remove_layer(scratch);

    let mut comp = Compositor::new(64, 64);
    comp.render(history.document(), &layers, Background::Plain, None);
    assert_eq!(comp.surface().get_pixel(56, 32).0, [255, 255, 255, 255]);
    assert_ne!(comp.surface().get_pixel(8, 32).0, [255, 255, 255, 255]);
    assert_eq!(history.document().len(), 1);

    // The remaining layer is the last one; deleting it is refused.
    assert!(!layers.remove(LayerId(0)));
    assert_eq!(history.document().len(), 1);
}
