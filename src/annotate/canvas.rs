//! Rasterize a [`Scene`] into an RGBA overlay
//!
//! The overlay always has the natural size of the source image, so box
//! coordinates from the service land 1:1. Scaling for display happens when
//! the overlay texture is painted.

use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS,
    MISC_FONTS,
};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, Blend};
use imageproc::rect::Rect;

use super::render::{Label, Scene};
use crate::api::BoxCoords;

/// Glyph cell size of the bitmap font
const GLYPH_PX: i32 = 8;

/// Draw the scene on a cleared, fully transparent canvas
pub fn rasterize(scene: &Scene) -> RgbaImage {
    let mut canvas = Blend(RgbaImage::new(scene.width, scene.height));
    if scene.width == 0 || scene.height == 0 {
        return canvas.0;
    }

    for shape in &scene.shapes {
        let bbox = clip_box(shape.bbox, scene);
        stroke_box(&mut canvas, bbox, scene.stroke_width, shape.stroke);
        if let Some(rect) = box_rect(bbox, 0) {
            draw_filled_rect_mut(&mut canvas, rect, shape.fill);
        }
        if let Some(label) = &shape.label {
            draw_label(&mut canvas, label, shape.stroke);
        }
    }

    canvas.0
}

/// Overlay composited over the source image, for export
pub fn composite(source: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let mut out = source.clone();
    image::imageops::overlay(&mut out, overlay, 0, 0);
    out
}

/// Pull box edges that lie far off the canvas back to just outside it.
/// Edges moved this way stay invisible and pixel math stays in `i32` range.
fn clip_box(bbox: BoxCoords, scene: &Scene) -> BoxCoords {
    let margin = scene.stroke_width as f32 + 1.0;
    let x = |v: f32| v.clamp(-margin, scene.width as f32 + margin);
    let y = |v: f32| v.clamp(-margin, scene.height as f32 + margin);
    let [x1, y1, x2, y2] = bbox;
    [x(x1), y(y1), x(x2), y(y2)]
}

/// Rectangle for a box shrunk by `inset` pixels on every side (negative grows it)
fn box_rect(bbox: BoxCoords, inset: i32) -> Option<Rect> {
    let [x1, y1, x2, y2] = bbox;
    let x = (x1.round() as i32).saturating_add(inset);
    let y = (y1.round() as i32).saturating_add(inset);
    let w = ((x2 - x1).round() as i32).saturating_sub(inset.saturating_mul(2));
    let h = ((y2 - y1).round() as i32).saturating_sub(inset.saturating_mul(2));
    if w <= 0 || h <= 0 {
        return None;
    }
    Some(Rect::at(x, y).of_size(w as u32, h as u32))
}

/// Outline centered on the box edge, `width` pixels thick
fn stroke_box(canvas: &mut Blend<RgbaImage>, bbox: BoxCoords, width: u32, color: Rgba<u8>) {
    let width = width.max(1) as i32;
    let outer = -(width / 2);
    for inset in outer..outer + width {
        if let Some(rect) = box_rect(bbox, inset) {
            draw_hollow_rect_mut(canvas, rect, color);
        }
    }
}

/// 8x8 bitmap for `ch`, searching the Latin, Greek, box, block and kana tables
fn glyph(ch: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| GREEK_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| HIRAGANA_FONTS.get(ch))
        .or_else(|| MISC_FONTS.get(ch))
}

fn draw_label(canvas: &mut Blend<RgbaImage>, label: &Label, color: Rgba<u8>) {
    let (width, height) = (i64::from(canvas.0.width()), i64::from(canvas.0.height()));
    let glyph_px = i64::from(GLYPH_PX);
    let max_scale = width.max(height) / glyph_px + 1;
    let scale = ((label.size_px / GLYPH_PX as f32).round() as i64).clamp(1, max_scale);
    let top = label.baseline.round() as i64 - glyph_px * scale;
    let mut cursor_x = label.x.round() as i64;

    if top >= height || top + glyph_px * scale <= 0 {
        return;
    }

    for ch in label.text.chars() {
        if cursor_x >= width {
            break;
        }
        let cell = glyph_px * scale;
        if cursor_x + cell <= 0 {
            cursor_x += cell;
            continue;
        }
        let Some(bitmap) = glyph(ch).or_else(|| glyph('?')) else {
            cursor_x += cell;
            continue;
        };
        for (row_idx, &row) in bitmap.iter().enumerate() {
            for col in 0..glyph_px {
                if (row >> col) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col * scale;
                let py = top + row_idx as i64 * scale;
                if let Some(rect) = clipped_cell(px, py, scale, width, height) {
                    draw_filled_rect_mut(canvas, rect, color);
                }
            }
        }
        cursor_x += cell;
    }
}

/// A `size`-square glyph cell at `(x, y)` cut to the canvas, if any of it is visible
fn clipped_cell(x: i64, y: i64, size: i64, width: i64, height: i64) -> Option<Rect> {
    let (left, top) = (x.max(0), y.max(0));
    let (right, bottom) = ((x + size).min(width), (y + size).min(height));
    if right <= left || bottom <= top {
        return None;
    }
    Some(Rect::at(left as i32, top as i32).of_size((right - left) as u32, (bottom - top) as u32))
}
