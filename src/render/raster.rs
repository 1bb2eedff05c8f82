//! Pixel-level painting primitives for the compositor surfaces.
//!
//! Strokes and shapes are built up as a coverage mask (`GrayImage`) first and
//! composited onto the surface in a single pass, so an op's alpha applies
//! exactly once no matter how its dabs overlap. Everything works in straight
//! (unmultiplied) alpha; coordinates are device pixels and all primitives
//! clip to the surface.

use crate::op::BlendMode;
use egui::{Color32, Pos2};
use image::{GrayImage, Rgba, RgbaImage};

/// Blends one pixel onto the surface. Out-of-bounds coordinates are ignored.
pub fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Color32, mode: BlendMode) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    if a == 0 {
        return;
    }
    let src_a = a as f32 / 255.0;
    let dst = img.get_pixel(x, y).0;
    match mode {
        BlendMode::Normal => {
            let dst_a = dst[3] as f32 / 255.0;
            let out_a = src_a + dst_a * (1.0 - src_a);
            if out_a <= 0.0 {
                return;
            }
            let blend = |src: u8, dst: u8| {
                let src_f = src as f32 / 255.0;
                let dst_f = dst as f32 / 255.0;
                ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            img.put_pixel(
                x,
                y,
                Rgba([
                    blend(r, dst[0]),
                    blend(g, dst[1]),
                    blend(b, dst[2]),
                    (out_a * 255.0).round() as u8,
                ]),
            );
        }
        // Destination-out: coverage subtracts alpha, color is untouched.
        BlendMode::Erase => {
            let out_a = (dst[3] as f32 * (1.0 - src_a)).round().clamp(0.0, 255.0) as u8;
            img.put_pixel(x, y, Rgba([dst[0], dst[1], dst[2], out_a]));
        }
    }
}

/// Overwrites every pixel with `color` at full opacity.
pub fn fill(img: &mut RgbaImage, color: Color32) {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    for pixel in img.pixels_mut() {
        *pixel = Rgba([r, g, b, 255]);
    }
}

/// Resets every pixel to fully transparent.
pub fn clear(img: &mut RgbaImage) {
    for pixel in img.pixels_mut() {
        *pixel = Rgba([0, 0, 0, 0]);
    }
}

/// Composites a coverage mask onto the surface in one pass: each covered
/// pixel blends `color` with its alpha scaled by the mask value.
pub fn composite_mask(img: &mut RgbaImage, mask: &GrayImage, color: Color32, mode: BlendMode) {
    let a = color.a() as f32;
    for (x, y, coverage) in mask.enumerate_pixels() {
        let c = coverage.0[0];
        if c == 0 {
            continue;
        }
        let scaled = (a * c as f32 / 255.0).round().clamp(0.0, 255.0) as u8;
        let shaded = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), scaled);
        blend_pixel(img, x as i32, y as i32, shaded, mode);
    }
}

/// Stamps a filled circle of coverage, the basic brush dab. Overlapping
/// stamps take the maximum, never accumulate.
pub fn stamp_dab(mask: &mut GrayImage, center: Pos2, radius: f32) {
    if radius <= 0.0 {
        return;
    }
    let w = mask.width() as i32;
    let h = mask.height() as i32;
    let min_x = ((center.x - radius).floor() as i32).max(0);
    let max_x = ((center.x + radius).ceil() as i32).min(w - 1);
    let min_y = ((center.y - radius).floor() as i32).max(0);
    let max_y = ((center.y + radius).ceil() as i32).min(h - 1);
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let dx = x as f32 + 0.5 - center.x;
            let dy = y as f32 + 0.5 - center.y;
            let dist = (dx * dx + dy * dy).sqrt();
            // One-pixel anti-aliased rim.
            let coverage = ((radius - dist + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8;
            if coverage > 0 {
                let p = mask.get_pixel_mut(x as u32, y as u32);
                p.0[0] = p.0[0].max(coverage);
            }
        }
    }
}

/// Marks a straight segment by stamping dabs at sub-pixel steps.
pub fn draw_line(mask: &mut GrayImage, a: Pos2, b: Pos2, width: f32) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;
    let radius = (width / 2.0).max(0.5);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp_dab(mask, Pos2::new(a.x + dx * t, a.y + dy * t), radius);
    }
}

/// Marks a quadratic Bézier segment (`a` → `b` with control point `ctrl`),
/// flattened into dab stamps roughly one pixel apart.
pub fn draw_quad(mask: &mut GrayImage, a: Pos2, ctrl: Pos2, b: Pos2, width: f32) {
    let length = (ctrl - a).length() + (b - ctrl).length();
    let steps = length.ceil().max(1.0) as i32;
    let radius = (width / 2.0).max(0.5);
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        let u = 1.0 - t;
        let x = u * u * a.x + 2.0 * u * t * ctrl.x + t * t * b.x;
        let y = u * u * a.y + 2.0 * u * t * ctrl.y + t * t * b.y;
        stamp_dab(mask, Pos2::new(x, y), radius);
    }
}

pub fn draw_rect_outline(mask: &mut GrayImage, a: Pos2, b: Pos2, width: f32) {
    let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
    let (min_y, max_y) = (a.y.min(b.y), a.y.max(b.y));
    let corners = [
        Pos2::new(min_x, min_y),
        Pos2::new(max_x, min_y),
        Pos2::new(max_x, max_y),
        Pos2::new(min_x, max_y),
    ];
    for i in 0..4 {
        draw_line(mask, corners[i], corners[(i + 1) % 4], width);
    }
}

/// Outlines the ellipse inscribed in the rect spanned by `a` and `b`.
pub fn draw_ellipse_outline(mask: &mut GrayImage, a: Pos2, b: Pos2, width: f32) {
    let center = Pos2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    let rx = (b.x - a.x).abs() / 2.0;
    let ry = (b.y - a.y).abs() / 2.0;
    let radius = (width / 2.0).max(0.5);
    // Step count from the Ramanujan perimeter estimate, one dab per pixel.
    let perimeter =
        std::f32::consts::PI * (3.0 * (rx + ry) - ((3.0 * rx + ry) * (rx + 3.0 * ry)).sqrt());
    let steps = perimeter.ceil().max(4.0) as i32;
    for i in 0..steps {
        let angle = i as f32 / steps as f32 * std::f32::consts::TAU;
        let point = Pos2::new(center.x + rx * angle.cos(), center.y + ry * angle.sin());
        stamp_dab(mask, point, radius);
    }
}

/// Blits a bitmap into the destination rect with nearest-neighbour sampling,
/// scaling every source pixel's alpha by `alpha`.
pub fn blit_scaled(
    img: &mut RgbaImage,
    bitmap: &RgbaImage,
    pos: Pos2,
    size: egui::Vec2,
    alpha: f32,
) {
    if size.x < 1.0 || size.y < 1.0 || bitmap.width() == 0 || bitmap.height() == 0 {
        return;
    }
    let min_x = pos.x.floor() as i32;
    let min_y = pos.y.floor() as i32;
    let w = size.x.round() as i32;
    let h = size.y.round() as i32;
    for dy in 0..h {
        for dx in 0..w {
            let sx = (dx as f32 / w as f32 * bitmap.width() as f32) as u32;
            let sy = (dy as f32 / h as f32 * bitmap.height() as f32) as u32;
            let src = bitmap
                .get_pixel(sx.min(bitmap.width() - 1), sy.min(bitmap.height() - 1))
                .0;
            let a = (src[3] as f32 * alpha).round().clamp(0.0, 255.0) as u8;
            let color = Color32::from_rgba_unmultiplied(src[0], src[1], src[2], a);
            blend_pixel(img, min_x + dx, min_y + dy, color, BlendMode::Normal);
        }
    }
}

/// Rasterizes a line of text with its baseline derived from `pos` as the top
/// of the line box.
pub fn draw_text(
    img: &mut RgbaImage,
    font: &ab_glyph::FontArc,
    pos: Pos2,
    text: &str,
    color: Color32,
    size: f32,
) {
    use ab_glyph::{Font, ScaleFont, point};
    if text.is_empty() {
        return;
    }
    let scaled = font.as_scaled(size);
    let mut caret = point(pos.x, pos.y + scaled.ascent());
    for ch in text.chars() {
        let mut glyph = scaled.scaled_glyph(ch);
        glyph.position = caret;
        caret.x += scaled.h_advance(glyph.id);
        if let Some(outlined) = scaled.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = x as i32 + bounds.min.x as i32;
                let py = y as i32 + bounds.min.y as i32;
                let a = (color.a() as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                let shaded = Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), a);
                blend_pixel(img, px, py, shaded, BlendMode::Normal);
            });
        }
    }
}
