// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! The compositor: rasterizes a background image plus an ordered list of
//! text layers into an RGBA buffer.
//!
//! Each layer is drawn into its own local surface (origin at the layer's
//! visual center) — background box first, then per line a shadow pass, a
//! stroke pass and a fill pass built from fontdue coverage masks — and
//! the finished surface is composited onto the canvas through the
//! inverse of the layer's rotation. Rendering is deterministic: no
//! randomness, no time dependence, stable font fallback.

use crate::models::color::Rgba;
use crate::models::layer::TextLayer;
use crate::render::fonts::FontStore;
use crate::render::layout;
use image::{imageops, RgbaImage};
use thiserror::Error;

/// Canvas fill when no background image is supplied (or it fails to
/// decode).
pub const PLAIN_FILL: Rgba = Rgba::rgb(0x1f, 0x29, 0x37);

/// Upper bound on a layer's local surface edge. A layer whose styled
/// bounds exceed this is skipped rather than allocating absurd buffers.
const MAX_SURFACE_EDGE: u32 = 16_384;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("canvas dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

/// Rasterize `(background, layers, width, height)` into a fresh RGBA
/// buffer. Layers render in order, first at the bottom. Background
/// decode failure degrades to the plain fill; a layer whose font cannot
/// be resolved is skipped. The only hard failure is a zero dimension.
pub fn render(
    background: Option<&[u8]>,
    layers: &[TextLayer],
    width: u32,
    height: u32,
    fonts: &FontStore,
) -> Result<RgbaImage, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }

    let mut canvas = RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([PLAIN_FILL.r, PLAIN_FILL.g, PLAIN_FILL.b, 0xff]),
    );

    if let Some(bytes) = background {
        match image::load_from_memory(bytes) {
            Ok(img) => draw_cover(&mut canvas, &img.to_rgba8()),
            Err(e) => {
                log::warn!("background image decode failed, rendering without background: {e}")
            }
        }
    }

    for layer in layers {
        draw_layer(&mut canvas, layer, fonts);
    }

    Ok(canvas)
}

/// Scale the image to fully cover the canvas (preserving aspect ratio)
/// and center it, cropping the overflow symmetrically.
fn draw_cover(canvas: &mut RgbaImage, img: &RgbaImage) {
    let (cw, ch) = canvas.dimensions();
    let (iw, ih) = img.dimensions();
    if iw == 0 || ih == 0 {
        return;
    }
    let scale = f64::max(cw as f64 / iw as f64, ch as f64 / ih as f64);
    let sw = ((iw as f64 * scale).round() as u32).max(cw);
    let sh = ((ih as f64 * scale).round() as u32).max(ch);
    let scaled = imageops::resize(img, sw, sh, imageops::FilterType::Triangle);
    let dx = (cw as i64 - sw as i64) / 2;
    let dy = (ch as i64 - sh as i64) / 2;
    imageops::overlay(canvas, &scaled, dx, dy);
}

/// Shadow is always configured but acts as "off" when the color is fully
/// transparent or blur and both offsets are zero.
fn shadow_enabled(layer: &TextLayer) -> bool {
    layer.shadow_color.a > 0
        && (layer.shadow_blur > 0.0
            || layer.shadow_offset_x != 0.0
            || layer.shadow_offset_y != 0.0)
}

fn draw_layer(canvas: &mut RgbaImage, layer: &TextLayer, fonts: &FontStore) {
    let Some(font) = fonts.resolve(&layer.font_family, layer.font_weight) else {
        // Measurement failure: no font to measure or draw with. The
        // background box is skipped and the glyph passes degrade to
        // no-ops, so the rest of the render continues untouched.
        log::warn!(
            "no font resolvable for family {:?}; skipping layer {}",
            layer.font_family,
            layer.id
        );
        return;
    };

    let px = layer.font_size as f32;
    let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
    if px <= 0.0 || opacity <= 0.0 {
        return;
    }

    let lines: Vec<&str> = layer.text.split('\n').collect();
    let pitch = layout::line_pitch(layer.font_size) as f32;
    let widths: Vec<f32> = lines
        .iter()
        .map(|l| layout::line_width(font, l, px))
        .collect();
    let max_width = widths.iter().cloned().fold(0.0f32, f32::max);

    let half_em = font
        .horizontal_line_metrics(px)
        .map(|m| (m.ascent - m.descent) / 2.0)
        .unwrap_or(px * 0.5);
    let baseline_off = layout::middle_baseline_offset(font, px);

    let box_rect = layer.background_color.map(|_| {
        layout::background_box(
            layer.text_align,
            max_width as f64,
            lines.len(),
            layer.font_size,
            layer.background_padding,
        )
    });

    // Local bounds: union of the text extents and the background box,
    // inflated for stroke, shadow reach and glyph overhang.
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut include = |x0: f32, y0: f32, x1: f32, y1: f32| {
        min_x = min_x.min(x0);
        min_y = min_y.min(y0);
        max_x = max_x.max(x1);
        max_y = max_y.max(y1);
    };
    for (i, w) in widths.iter().enumerate() {
        let x0 = layout::align_offset(layer.text_align, *w as f64) as f32;
        let yc = i as f32 * pitch;
        include(x0, yc - half_em, x0 + w, yc + half_em);
    }
    if let Some(rect) = box_rect {
        include(
            rect.x as f32,
            rect.y as f32,
            rect.right() as f32,
            rect.bottom() as f32,
        );
    }

    let shadow_on = shadow_enabled(layer);
    let shadow_reach = if shadow_on {
        1.5 * layer.shadow_blur as f32
            + 3.0
            + f32::max(
                layer.shadow_offset_x.abs() as f32,
                layer.shadow_offset_y.abs() as f32,
            )
    } else {
        0.0
    };
    let margin = (layer.stroke_width as f32 / 2.0) + shadow_reach + px * 0.25;
    min_x -= margin;
    min_y -= margin;
    max_x += margin;
    max_y += margin;

    let sw = (max_x - min_x).ceil() as i64 + 1;
    let sh = (max_y - min_y).ceil() as i64 + 1;
    if sw <= 0 || sh <= 0 || sw > MAX_SURFACE_EDGE as i64 || sh > MAX_SURFACE_EDGE as i64 {
        log::warn!("layer {} has degenerate bounds {}x{}; skipping", layer.id, sw, sh);
        return;
    }
    let (sw, sh) = (sw as u32, sh as u32);
    let origin_x = -min_x;
    let origin_y = -min_y;

    let mut surface = RgbaImage::new(sw, sh);

    // Background box goes down first so text sits on top. The box does
    // not cast the layer shadow (shadow only applies to glyph passes).
    if let (Some(color), Some(rect)) = (layer.background_color, box_rect) {
        let alpha = layout::effective_box_alpha(
            layer.opacity.clamp(0.0, 1.0),
            layer.background_opacity.clamp(0.0, 1.0),
        ) as f32
            * color.alpha_f32();
        fill_rect(
            &mut surface,
            rect.x as f32 + origin_x,
            rect.y as f32 + origin_y,
            rect.w as f32,
            rect.h as f32,
            color,
            alpha,
        );
    }

    let stroke = layer
        .stroke_color
        .filter(|_| layer.stroke_width > 0.0);

    for (i, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let pen_x = origin_x + layout::align_offset(layer.text_align, widths[i] as f64) as f32;
        let baseline_y = origin_y + i as f32 * pitch + baseline_off;
        let fill_mask = rasterize_line(font, line, px, pen_x, baseline_y, sw, sh);

        // Stroke pass (outline first, so fill covers its inner half),
        // each pass casting the shadow beneath itself as on a 2D canvas.
        if let Some(stroke_color) = stroke {
            let stroke_mask = dilate(&fill_mask, sw, sh, layer.stroke_width as f32 / 2.0);
            if shadow_on {
                let sh_mask = blur_mask(&stroke_mask, sw, sh, layer.shadow_blur as f32);
                stamp(&mut surface, &sh_mask, sw, sh, layer.shadow_color, opacity,
                    layer.shadow_offset_x as f32, layer.shadow_offset_y as f32);
            }
            stamp(&mut surface, &stroke_mask, sw, sh, stroke_color, opacity, 0.0, 0.0);
        }

        if shadow_on {
            let sh_mask = blur_mask(&fill_mask, sw, sh, layer.shadow_blur as f32);
            stamp(&mut surface, &sh_mask, sw, sh, layer.shadow_color, opacity,
                layer.shadow_offset_x as f32, layer.shadow_offset_y as f32);
        }
        stamp(&mut surface, &fill_mask, sw, sh, layer.color, opacity, 0.0, 0.0);
    }

    composite_rotated(
        canvas,
        &surface,
        layer.x as f32,
        layer.y as f32,
        origin_x,
        origin_y,
        layer.rotation as f32,
    );
}

/// Rasterize one line of text into a coverage mask aligned with the
/// layer surface. `pen_x` is the line's left pen origin, `baseline_y`
/// its baseline row.
fn rasterize_line(
    font: &fontdue::Font,
    text: &str,
    px: f32,
    pen_x: f32,
    baseline_y: f32,
    w: u32,
    h: u32,
) -> Vec<f32> {
    let mut mask = vec![0.0f32; (w * h) as usize];
    let mut cursor = pen_x;
    for ch in text.chars() {
        let (metrics, bitmap) = font.rasterize(ch, px);
        let gx0 = (cursor + metrics.xmin as f32).round() as i32;
        let gy0 = (baseline_y - (metrics.height as i32 + metrics.ymin) as f32).round() as i32;
        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let coverage = bitmap[row * metrics.width + col];
                if coverage == 0 {
                    continue;
                }
                let x = gx0 + col as i32;
                let y = gy0 + row as i32;
                if x >= 0 && (x as u32) < w && y >= 0 && (y as u32) < h {
                    let idx = (y as u32 * w + x as u32) as usize;
                    mask[idx] = mask[idx].max(coverage as f32 / 255.0);
                }
            }
        }
        cursor += metrics.advance_width;
    }
    mask
}

/// Morphological dilation of a coverage mask by a disk, approximating a
/// centered outline stroke of width `2 * radius`.
fn dilate(mask: &[f32], w: u32, h: u32, radius: f32) -> Vec<f32> {
    if radius <= 0.0 {
        return mask.to_vec();
    }
    let r = radius.ceil() as i32;
    let r2 = (radius + 0.5) * (radius + 0.5);
    let mut offsets = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if (dx * dx + dy * dy) as f32 <= r2 {
                offsets.push((dx, dy));
            }
        }
    }

    let (wi, hi) = (w as i32, h as i32);
    let mut out = vec![0.0f32; mask.len()];
    for y in 0..hi {
        for x in 0..wi {
            let mut best = 0.0f32;
            for &(dx, dy) in &offsets {
                let sx = x + dx;
                let sy = y + dy;
                if sx >= 0 && sx < wi && sy >= 0 && sy < hi {
                    best = best.max(mask[(sy * wi + sx) as usize]);
                    if best >= 1.0 {
                        break;
                    }
                }
            }
            out[(y * wi + x) as usize] = best;
        }
    }
    out
}

/// Gaussian-ish blur of a coverage mask: three separable box passes with
/// sigma = blur / 2. Zero padding outside the mask.
fn blur_mask(mask: &[f32], w: u32, h: u32, blur: f32) -> Vec<f32> {
    let sigma = blur * 0.5;
    if sigma <= 0.0 {
        return mask.to_vec();
    }
    let r = (sigma.ceil() as i32).max(1);
    let mut cur = mask.to_vec();
    for _ in 0..3 {
        cur = box_blur_axis(&cur, w, h, r, true);
        cur = box_blur_axis(&cur, w, h, r, false);
    }
    cur
}

fn box_blur_axis(mask: &[f32], w: u32, h: u32, r: i32, horizontal: bool) -> Vec<f32> {
    let (wi, hi) = (w as i32, h as i32);
    let norm = 1.0 / (2 * r + 1) as f32;
    let mut out = vec![0.0f32; mask.len()];
    let (outer, inner) = if horizontal { (hi, wi) } else { (wi, hi) };
    let at = |o: i32, i: i32| -> usize {
        if horizontal {
            (o * wi + i) as usize
        } else {
            (i * wi + o) as usize
        }
    };
    for o in 0..outer {
        let mut acc = 0.0f32;
        for i in -r..=r {
            if i >= 0 && i < inner {
                acc += mask[at(o, i)];
            }
        }
        for i in 0..inner {
            out[at(o, i)] = acc * norm;
            let leave = i - r;
            let enter = i + r + 1;
            if leave >= 0 {
                acc -= mask[at(o, leave)];
            }
            if enter < inner {
                acc += mask[at(o, enter)];
            }
        }
    }
    out
}

/// Source-over blend of a straight-alpha color onto a pixel.
fn blend_px(dst: &mut image::Rgba<u8>, color: Rgba, src_a: f32) {
    if src_a <= 0.0 {
        return;
    }
    let sa = src_a.min(1.0);
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    let mix = |sc: u8, dc: u8| -> u8 {
        let s = sc as f32 / 255.0;
        let d = dc as f32 / 255.0;
        (((s * sa + d * da * (1.0 - sa)) / out_a) * 255.0).round() as u8
    };
    dst[0] = mix(color.r, dst[0]);
    dst[1] = mix(color.g, dst[1]);
    dst[2] = mix(color.b, dst[2]);
    dst[3] = (out_a * 255.0).round() as u8;
}

fn fill_rect(surface: &mut RgbaImage, x: f32, y: f32, w: f32, h: f32, color: Rgba, alpha: f32) {
    if alpha <= 0.0 || w <= 0.0 || h <= 0.0 {
        return;
    }
    let (sw, sh) = surface.dimensions();
    let x0 = (x.round().max(0.0) as u32).min(sw);
    let y0 = (y.round().max(0.0) as u32).min(sh);
    let x1 = ((x + w).round().max(0.0) as u32).min(sw);
    let y1 = ((y + h).round().max(0.0) as u32).min(sh);
    for py in y0..y1 {
        for px in x0..x1 {
            blend_px(surface.get_pixel_mut(px, py), color, alpha);
        }
    }
}

/// Resample a coverage mask shifted by a sub-pixel amount (0 <= fx, fy
/// < 1), bilinear with zero padding.
fn shift_mask(mask: &[f32], w: u32, h: u32, fx: f32, fy: f32) -> Vec<f32> {
    let (wi, hi) = (w as i32, h as i32);
    let at = |x: i32, y: i32| -> f32 {
        if x < 0 || y < 0 || x >= wi || y >= hi {
            0.0
        } else {
            mask[(y * wi + x) as usize]
        }
    };
    let mut out = vec![0.0f32; mask.len()];
    for y in 0..hi {
        for x in 0..wi {
            let sx = x as f32 - fx;
            let sy = y as f32 - fy;
            let x0 = sx.floor() as i32;
            let y0 = sy.floor() as i32;
            let tx = sx - x0 as f32;
            let ty = sy - y0 as f32;
            out[(y * wi + x) as usize] = (1.0 - tx) * (1.0 - ty) * at(x0, y0)
                + tx * (1.0 - ty) * at(x0 + 1, y0)
                + (1.0 - tx) * ty * at(x0, y0 + 1)
                + tx * ty * at(x0 + 1, y0 + 1);
        }
    }
    out
}

/// Blend a coverage mask onto the surface in the given color, optionally
/// offset (used for shadows). Fractional offsets shift the mask with
/// sub-pixel precision rather than snapping to the nearest pixel.
fn stamp(
    surface: &mut RgbaImage,
    mask: &[f32],
    w: u32,
    h: u32,
    color: Rgba,
    alpha_mul: f32,
    offset_x: f32,
    offset_y: f32,
) {
    let dx = offset_x.floor() as i32;
    let dy = offset_y.floor() as i32;
    let fx = offset_x - dx as f32;
    let fy = offset_y - dy as f32;
    let shifted;
    let mask = if fx > 1e-4 || fy > 1e-4 {
        shifted = shift_mask(mask, w, h, fx, fy);
        &shifted[..]
    } else {
        mask
    };
    let (sw, sh) = surface.dimensions();
    for y in 0..h {
        for x in 0..w {
            let coverage = mask[(y * w + x) as usize];
            if coverage <= 0.0 {
                continue;
            }
            let tx = x as i32 + dx;
            let ty = y as i32 + dy;
            if tx < 0 || ty < 0 || tx as u32 >= sw || ty as u32 >= sh {
                continue;
            }
            let a = coverage * color.alpha_f32() * alpha_mul;
            blend_px(surface.get_pixel_mut(tx as u32, ty as u32), color, a);
        }
    }
}

/// Composite a finished layer surface onto the canvas. The surface's
/// local origin lands at (cx, cy) and the surface is rotated clockwise
/// by `rotation_deg` about that point; canvas pixels inverse-map into
/// the surface with nearest sampling.
fn composite_rotated(
    canvas: &mut RgbaImage,
    surface: &RgbaImage,
    cx: f32,
    cy: f32,
    origin_x: f32,
    origin_y: f32,
    rotation_deg: f32,
) {
    let (cw, ch) = canvas.dimensions();
    let (sw, sh) = surface.dimensions();
    let theta = rotation_deg.to_radians();
    let (sin, cos) = theta.sin_cos();

    // Bound the scan to the rotated surface's AABB.
    let corners = [
        (-origin_x, -origin_y),
        (sw as f32 - origin_x, -origin_y),
        (-origin_x, sh as f32 - origin_y),
        (sw as f32 - origin_x, sh as f32 - origin_y),
    ];
    let mut bx0 = f32::MAX;
    let mut by0 = f32::MAX;
    let mut bx1 = f32::MIN;
    let mut by1 = f32::MIN;
    for (lx, ly) in corners {
        let px = cx + cos * lx - sin * ly;
        let py = cy + sin * lx + cos * ly;
        bx0 = bx0.min(px);
        by0 = by0.min(py);
        bx1 = bx1.max(px);
        by1 = by1.max(py);
    }
    let x0 = bx0.floor().max(0.0) as u32;
    let y0 = by0.floor().max(0.0) as u32;
    let x1 = (bx1.ceil().max(0.0) as u32 + 1).min(cw);
    let y1 = (by1.ceil().max(0.0) as u32 + 1).min(ch);

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let lx = cos * dx + sin * dy + origin_x;
            let ly = -sin * dx + cos * dy + origin_y;
            let sx = lx.floor();
            let sy = ly.floor();
            if sx < 0.0 || sy < 0.0 || sx >= sw as f32 || sy >= sh as f32 {
                continue;
            }
            let p = surface.get_pixel(sx as u32, sy as u32);
            if p[3] == 0 {
                continue;
            }
            blend_px(
                canvas.get_pixel_mut(x, y),
                Rgba::rgb(p[0], p[1], p[2]),
                p[3] as f32 / 255.0,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::{TextAlign, TextLayer};
    use crate::render::test_font_store;
    use std::io::Cursor;

    fn quiet_layer(text: &str, x: f64, y: f64) -> TextLayer {
        // Shadow off, no stroke, no box: just glyph fill.
        TextLayer {
            text: text.to_string(),
            x,
            y,
            shadow_blur: 0.0,
            shadow_offset_x: 0.0,
            shadow_offset_y: 0.0,
            font_family: "TestSans".to_string(),
            ..TextLayer::spawn(0, 0)
        }
    }

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img.clone())
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let fonts = FontStore::new();
        assert!(matches!(
            render(None, &[], 0, 720, &fonts),
            Err(RenderError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            render(None, &[], 1280, 0, &fonts),
            Err(RenderError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_plain_fill_when_no_background() {
        let fonts = FontStore::new();
        let out = render(None, &[], 8, 8, &fonts).unwrap();
        let p = out.get_pixel(0, 0);
        assert_eq!((p[0], p[1], p[2], p[3]), (0x1f, 0x29, 0x37, 0xff));
    }

    #[test]
    fn test_corrupt_background_degrades_to_plain_fill() {
        let fonts = FontStore::new();
        let out = render(Some(b"not an image"), &[], 8, 8, &fonts).unwrap();
        let p = out.get_pixel(4, 4);
        assert_eq!((p[0], p[1], p[2]), (0x1f, 0x29, 0x37));
    }

    #[test]
    fn test_cover_fit_fills_canvas() {
        let fonts = FontStore::new();
        let red = RgbaImage::from_pixel(100, 50, image::Rgba([255, 0, 0, 255]));
        let bytes = png_bytes(&red);
        // 100x50 into 100x100: scale 2, cropped left/right, fully covered.
        let out = render(Some(&bytes), &[], 100, 100, &fonts).unwrap();
        for &(x, y) in &[(0u32, 0u32), (50, 50), (99, 99)] {
            let p = out.get_pixel(x, y);
            assert_eq!((p[0], p[1], p[2]), (255, 0, 0), "pixel ({x},{y})");
        }
    }

    #[test]
    fn test_unresolvable_font_skips_layer_but_not_render() {
        let fonts = FontStore::new(); // empty store: nothing resolves
        let layer = quiet_layer("HELLO", 64.0, 64.0);
        let out = render(None, &[layer], 128, 128, &fonts).unwrap();
        // Canvas is untouched plain fill.
        for p in out.pixels() {
            assert_eq!((p[0], p[1], p[2]), (0x1f, 0x29, 0x37));
        }
    }

    #[test]
    fn test_render_is_deterministic() {
        let fonts = test_font_store().unwrap_or_default();
        let mut layer = quiet_layer("AB\nCD", 100.0, 100.0);
        layer.rotation = 30.0;
        layer.stroke_color = Some(Rgba::BLACK);
        layer.stroke_width = 3.0;
        layer.shadow_blur = 6.0;
        layer.shadow_offset_x = 4.0;
        layer.shadow_offset_y = 4.0;
        layer.background_color = Some(Rgba::rgb(0, 0, 255));

        let a = render(None, &[layer.clone()], 200, 200, &fonts).unwrap();
        let b = render(None, &[layer], 200, 200, &fonts).unwrap();
        assert_eq!(a.as_raw(), b.as_raw());
    }

    #[test]
    fn test_transparent_background_color_draws_no_box() {
        let Some(fonts) = test_font_store() else {
            return; // no system font available
        };
        let mut with_box = quiet_layer("A", 100.0, 100.0);
        with_box.color = Rgba::rgb(255, 0, 0);
        with_box.background_color = Some(Rgba::rgb(0, 0, 255));
        let mut without_box = with_box.clone();
        without_box.background_color = None;

        let blue_count = |img: &RgbaImage| {
            img.pixels()
                .filter(|p| p[2] > 200 && p[0] < 60 && p[1] < 60 && p[2] > p[0])
                .count()
        };

        let boxed = render(None, &[with_box], 200, 200, &fonts).unwrap();
        let plain = render(None, &[without_box], 200, 200, &fonts).unwrap();
        assert!(blue_count(&boxed) > 0, "expected box pixels");
        assert_eq!(blue_count(&plain), 0, "no box expected");
    }

    #[test]
    fn test_box_alpha_composes_multiplicatively() {
        let Some(fonts) = test_font_store() else {
            return;
        };
        let mut layer = quiet_layer("A", 100.0, 100.0);
        layer.opacity = 0.5;
        layer.background_opacity = 0.5;
        layer.background_padding = 30.0;
        layer.background_color = Some(Rgba::rgb(0, 0, 255));

        let out = render(None, &[layer], 200, 200, &fonts).unwrap();
        // Sample inside the box near its top edge, above any glyph:
        // box top = -pitch/2 - padding = -38.4 - 30 relative to center.
        let p = out.get_pixel(100, 100 - 60);
        // Expected: plain fill blended with blue at alpha 0.25.
        let expect = |bg: u8, fg: u8| (bg as f32 * 0.75 + fg as f32 * 0.25).round();
        assert!((p[0] as f32 - expect(0x1f, 0)).abs() <= 3.0, "r = {}", p[0]);
        assert!((p[1] as f32 - expect(0x29, 0)).abs() <= 3.0, "g = {}", p[1]);
        assert!((p[2] as f32 - expect(0x37, 255)).abs() <= 3.0, "b = {}", p[2]);
    }

    #[test]
    fn test_full_rotation_is_a_no_op() {
        let Some(fonts) = test_font_store() else {
            return;
        };
        let layer = quiet_layer("ROT", 100.0, 100.0);
        let mut turned = layer.clone();
        turned.rotation = 360.0;

        let a = render(None, &[layer], 200, 200, &fonts).unwrap();
        let b = render(None, &[turned], 200, 200, &fonts).unwrap();

        let total = a.as_raw().len();
        let close = a
            .as_raw()
            .iter()
            .zip(b.as_raw())
            .filter(|(x, y)| x.abs_diff(**y) <= 1)
            .count();
        assert!(
            close as f64 / total as f64 > 0.99,
            "rotation by 360 deg changed {} of {} bytes",
            total - close,
            total
        );
    }

    #[test]
    fn test_second_line_sits_one_pitch_below() {
        let Some(fonts) = test_font_store() else {
            return;
        };
        let single = quiet_layer("A", 150.0, 100.0);
        let double = quiet_layer("A\nA", 150.0, 100.0);

        let glyph_rows = |img: &RgbaImage| -> Vec<u32> {
            (0..img.height())
                .filter(|&y| (0..img.width()).any(|x| {
                    let p = img.get_pixel(x, y);
                    p[0] > 200 && p[1] > 200 && p[2] > 200
                }))
                .collect()
        };

        let one = render(None, &[single], 300, 300, &fonts).unwrap();
        let two = render(None, &[double], 300, 300, &fonts).unwrap();
        let rows_one = glyph_rows(&one);
        let rows_two = glyph_rows(&two);
        assert!(!rows_one.is_empty() && !rows_two.is_empty());

        // First line unchanged; second line starts 64 * 1.2 px lower.
        let top_one = *rows_one.first().unwrap() as f64;
        let top_two = *rows_two.first().unwrap() as f64;
        let bottom_one = *rows_one.last().unwrap() as f64;
        let bottom_two = *rows_two.last().unwrap() as f64;
        assert!((top_two - top_one).abs() <= 1.0);
        assert!((bottom_two - (bottom_one + 76.8)).abs() <= 2.0);
    }

    #[test]
    fn test_shift_mask_splits_coverage_at_half_pixel() {
        let mut mask = vec![0.0f32; 9];
        mask[4] = 1.0; // center of a 3x3 grid
        let shifted = shift_mask(&mask, 3, 3, 0.5, 0.0);
        assert!((shifted[4] - 0.5).abs() < 1e-6);
        assert!((shifted[5] - 0.5).abs() < 1e-6);
        assert_eq!(shifted[3], 0.0);

        // Whole coverage is preserved for an interior pixel.
        let total: f32 = shifted.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_shadow_offset_is_not_quantized() {
        let Some(fonts) = test_font_store() else {
            return;
        };
        let mut layer = quiet_layer("S", 100.0, 100.0);
        layer.shadow_blur = 0.0;
        layer.shadow_offset_y = 0.0;

        let mut at = |dx: f64| {
            layer.shadow_offset_x = dx;
            render(None, &[layer.clone()], 200, 200, &fonts).unwrap()
        };
        let zero = at(0.0);
        let half = at(0.5);
        let whole = at(1.0);

        // A half-pixel offset must land between the integer offsets, not
        // snap onto either of them.
        assert_ne!(half.as_raw(), zero.as_raw());
        assert_ne!(half.as_raw(), whole.as_raw());
    }

    #[test]
    fn test_box_edge_alignment() {
        let Some(fonts) = test_font_store() else {
            return;
        };
        let pad = 10.0;
        let mut layer = quiet_layer("EDGE", 150.0, 150.0);
        layer.background_color = Some(Rgba::rgb(0, 0, 255));
        layer.background_padding = pad;
        layer.text_align = TextAlign::Right;
        let right = render(None, &[layer.clone()], 300, 300, &fonts).unwrap();
        layer.text_align = TextAlign::Left;
        let left = render(None, &[layer], 300, 300, &fonts).unwrap();

        let box_cols = |img: &RgbaImage| -> Vec<u32> {
            (0..img.width())
                .filter(|&x| (0..img.height()).any(|y| {
                    let p = img.get_pixel(x, y);
                    p[2] > 200 && p[0] < 60 && p[1] < 60
                }))
                .collect()
        };

        // Right-aligned: the box's right edge lands at origin + padding.
        let cols = box_cols(&right);
        assert!((*cols.last().unwrap() as f64 - (150.0 + pad)).abs() <= 2.0);
        // Left-aligned: the box's left edge lands at origin - padding.
        let cols = box_cols(&left);
        assert!((*cols.first().unwrap() as f64 - (150.0 - pad)).abs() <= 2.0);
    }
}
