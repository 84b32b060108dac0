// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Text layout math, kept separate from pixel pushing so it can be
//! verified without a font on hand.
//!
//! All coordinates here are layer-local: the origin sits at the layer's
//! visual center, x grows right, y grows down. Multi-line text stacks
//! downward from the origin at one line pitch per line.

use crate::models::layer::TextAlign;

/// Multiplier from font size to line pitch.
pub const LINE_PITCH_FACTOR: f64 = 1.2;

/// Vertical spacing between stacked lines.
pub fn line_pitch(font_size: f64) -> f64 {
    font_size * LINE_PITCH_FACTOR
}

/// X offset of a line's pen origin for the given alignment: left-aligned
/// lines start at the origin, centered lines are symmetric about it,
/// right-aligned lines end at it.
pub fn align_offset(align: TextAlign, line_width: f64) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -line_width / 2.0,
        TextAlign::Right => -line_width,
    }
}

/// Offset from a line's vertical center to its baseline, using the
/// font's ascent/descent (descent is negative). Centers the em box on
/// the line center, matching middle-baseline text placement.
pub fn middle_baseline_offset(font: &fontdue::Font, px: f32) -> f32 {
    font.horizontal_line_metrics(px)
        .map(|m| (m.ascent + m.descent) / 2.0)
        .unwrap_or(0.0)
}

/// Advance width of one line of text at the given pixel size.
pub fn line_width(font: &fontdue::Font, text: &str, px: f32) -> f32 {
    text.chars().map(|ch| font.metrics(ch, px).advance_width).sum()
}

/// An axis-aligned rectangle in layer-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoxRect {
    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
}

/// Background-box rectangle for a block of text.
///
/// Height subtracts the trailing half-leading `(pitch - font_size)` so a
/// single-line box hugs the glyph height rather than the full line
/// pitch. That correction is an empirical visual-fit constant carried
/// over unchanged; it is not derived from the pitch factor.
pub fn background_box(
    align: TextAlign,
    max_line_width: f64,
    line_count: usize,
    font_size: f64,
    padding: f64,
) -> BoxRect {
    let pitch = line_pitch(font_size);
    BoxRect {
        x: align_offset(align, max_line_width) - padding,
        y: -pitch * 0.5 - padding,
        w: max_line_width + padding * 2.0,
        h: line_count as f64 * pitch + padding * 2.0 - (pitch - font_size),
    }
}

/// Effective alpha of the background-box fill: layer opacity and box
/// opacity compose multiplicatively.
pub fn effective_box_alpha(layer_opacity: f64, background_opacity: f64) -> f64 {
    layer_opacity * background_opacity
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_pitch() {
        assert_eq!(line_pitch(64.0), 76.8);
        assert_eq!(line_pitch(100.0), 120.0);
    }

    #[test]
    fn test_align_offsets() {
        assert_eq!(align_offset(TextAlign::Left, 200.0), 0.0);
        assert_eq!(align_offset(TextAlign::Center, 200.0), -100.0);
        assert_eq!(align_offset(TextAlign::Right, 200.0), -200.0);
    }

    #[test]
    fn test_box_edges_follow_alignment() {
        let pad = 10.0;
        let left = background_box(TextAlign::Left, 300.0, 1, 64.0, pad);
        assert_eq!(left.x, -pad);

        let right = background_box(TextAlign::Right, 300.0, 1, 64.0, pad);
        assert_eq!(right.right(), pad);

        let center = background_box(TextAlign::Center, 300.0, 1, 64.0, pad);
        assert_eq!(center.x, -150.0 - pad);
        assert_eq!(center.right(), 150.0 + pad);
    }

    #[test]
    fn test_single_line_box_hugs_glyph_height() {
        let pad = 10.0;
        let rect = background_box(TextAlign::Center, 300.0, 1, 64.0, pad);
        // pitch + 2*pad - (pitch - size) == size + 2*pad
        assert!((rect.h - (64.0 + 2.0 * pad)).abs() < 1e-9);
    }

    #[test]
    fn test_multi_line_box_height() {
        let pad = 0.0;
        let rect = background_box(TextAlign::Center, 300.0, 3, 64.0, pad);
        let pitch = line_pitch(64.0);
        assert!((rect.h - (3.0 * pitch - (pitch - 64.0))).abs() < 1e-9);
        assert_eq!(rect.y, -pitch * 0.5);
    }

    #[test]
    fn test_effective_box_alpha_is_multiplicative() {
        assert_eq!(effective_box_alpha(0.5, 0.5), 0.25);
        assert_eq!(effective_box_alpha(1.0, 0.3), 0.3);
        assert_eq!(effective_box_alpha(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_line_width_sums_advances() {
        let Some(store) = crate::render::test_font_store() else {
            return; // no system font available
        };
        let font = store
            .resolve("TestSans", crate::models::layer::FontWeight::Regular)
            .unwrap();

        let a = line_width(font, "A", 64.0);
        let bb = line_width(font, "BB", 64.0);
        let b = line_width(font, "B", 64.0);
        assert!(a > 0.0);
        assert!((bb - 2.0 * b).abs() < 1e-3);
    }
}
