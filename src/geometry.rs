use egui::Pos2;
use serde::{Deserialize, Serialize};

/// Tolerance for stroke simplification, in device pixels.
pub const SIMPLIFY_EPSILON: f32 = 0.9;

/// Pressure reported by input devices is clamped to this range so a stroke
/// segment never collapses to zero width.
pub const MIN_PRESSURE: f32 = 0.05;
pub const MAX_PRESSURE: f32 = 1.0;

/// One sampled point of a stroke, in device-pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub pos: Pos2,
    pub pressure: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, pressure: f32) -> Self {
        Self {
            pos: Pos2::new(x, y),
            pressure: pressure.clamp(MIN_PRESSURE, MAX_PRESSURE),
        }
    }
}

/// Squared distance between two points.
pub fn dist_sq(a: Pos2, b: Pos2) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    dx * dx + dy * dy
}

/// Squared perpendicular distance from `p` to the infinite line through `a`
/// and `b`. Falls back to the distance to `a` when the chord is degenerate.
pub fn perp_dist_sq(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let chord_sq = dist_sq(a, b);
    if chord_sq <= f32::EPSILON {
        return dist_sq(p, a);
    }
    // Cross product of (b - a) and (p - a) gives twice the triangle area;
    // area / chord length is the perpendicular height.
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    cross * cross / chord_sq
}

/// Ramer–Douglas–Peucker polyline simplification.
///
/// Keeps the point of maximum perpendicular distance from the current chord
/// whenever that distance exceeds `epsilon`, recursing on both halves;
/// otherwise collapses the run to its endpoints. Every surviving point is one
/// of the input vertices, and no discarded point deviates from the simplified
/// polyline by more than `epsilon`.
pub fn simplify_rdp(points: &[StrokePoint], epsilon: f32) -> Vec<StrokePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len());
    out.push(points[0]);
    rdp_segment(points, epsilon * epsilon, &mut out);
    out
}

/// Appends every kept vertex of `points[1..]` to `out` (the first point is
/// assumed to be pushed already, so split points are shared, not duplicated).
fn rdp_segment(points: &[StrokePoint], epsilon_sq: f32, out: &mut Vec<StrokePoint>) {
    let last = points.len() - 1;
    if last < 2 {
        out.push(points[last]);
        return;
    }
    let a = points[0].pos;
    let b = points[last].pos;
    let mut max_sq = 0.0;
    let mut split = 0;
    for (i, p) in points.iter().enumerate().take(last).skip(1) {
        let d = perp_dist_sq(p.pos, a, b);
        if d > max_sq {
            max_sq = d;
            split = i;
        }
    }
    if max_sq > epsilon_sq {
        rdp_segment(&points[..=split], epsilon_sq, out);
        rdp_segment(&points[split..], epsilon_sq, out);
    } else {
        out.push(points[last]);
    }
}

/// Snaps an angle (radians) to the nearest of the eight 45°-spaced
/// directions.
pub fn snap_angle(angle: f32) -> f32 {
    let step = std::f32::consts::FRAC_PI_4;
    (angle / step).round() * step
}
