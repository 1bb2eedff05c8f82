use crate::geometry::snap_angle;
use crate::op::{ShapeKind, ShapeOp};
use egui::{Pos2, Vec2};

/// Applies the shape-constraint modifier to a provisional shape.
///
/// Lines snap to the nearest of the eight 45°-spaced directions, keeping
/// their length. Rects and ellipses become squares/circles: the side is the
/// smaller of |Δx| and |Δy|, each axis keeping its sign, anchored at the
/// original start point.
///
/// Pure and idempotent; it is called repeatedly during preview and once more
/// at finalize time, and both calls must agree.
pub fn constrain(shape: ShapeOp, active: bool) -> ShapeOp {
    if !active {
        return shape;
    }
    let delta = shape.end - shape.start;
    match shape.kind {
        ShapeKind::Line => {
            let length = delta.length();
            let angle = snap_angle(delta.y.atan2(delta.x));
            ShapeOp {
                end: shape.start + length * Vec2::new(angle.cos(), angle.sin()),
                ..shape
            }
        }
        ShapeKind::Rect | ShapeKind::Ellipse => {
            let side = delta.x.abs().min(delta.y.abs());
            ShapeOp {
                end: Pos2::new(
                    shape.start.x + side * delta.x.signum(),
                    shape.start.y + side * delta.y.signum(),
                ),
                ..shape
            }
        }
    }
}
