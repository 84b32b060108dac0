// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! Coordinate mapping between canvas pixels and the scaled on-screen
//! preview, plus hit testing against rotated layer boxes.

/// Placement of the canvas inside the preview area: uniform scale plus
/// the screen position of the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    pub scale: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl CanvasView {
    /// Fit a canvas into the available area, centered, never upscaled
    /// beyond 1:1.
    pub fn fit(
        canvas_w: u32,
        canvas_h: u32,
        avail_x: f64,
        avail_y: f64,
        avail_w: f64,
        avail_h: f64,
    ) -> Self {
        let scale = (avail_w / canvas_w as f64)
            .min(avail_h / canvas_h as f64)
            .min(1.0);
        let shown_w = canvas_w as f64 * scale;
        let shown_h = canvas_h as f64 * scale;
        Self {
            scale,
            origin_x: avail_x + (avail_w - shown_w) / 2.0,
            origin_y: avail_y + (avail_h - shown_h) / 2.0,
        }
    }

    pub fn canvas_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (self.origin_x + x * self.scale, self.origin_y + y * self.scale)
    }

    pub fn screen_to_canvas(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.scale,
            (y - self.origin_y) / self.scale,
        )
    }
}

/// Test whether a canvas-space point falls inside a w x h box centered
/// at (cx, cy) and rotated clockwise by `rotation_deg`.
pub fn point_in_rotated_rect(
    px: f64,
    py: f64,
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
    rotation_deg: f64,
) -> bool {
    let theta = rotation_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let dx = px - cx;
    let dy = py - cy;
    // Inverse rotation into the box's local frame.
    let lx = cos * dx + sin * dy;
    let ly = -sin * dx + cos * dy;
    lx.abs() <= w / 2.0 && ly.abs() <= h / 2.0
}

/// Corners of a rotated layer box in canvas space, in drawing order.
pub fn rotated_rect_corners(
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
    rotation_deg: f64,
) -> [(f64, f64); 4] {
    let theta = rotation_deg.to_radians();
    let (sin, cos) = theta.sin_cos();
    let place = |lx: f64, ly: f64| (cx + cos * lx - sin * ly, cy + sin * lx + cos * ly);
    [
        place(-w / 2.0, -h / 2.0),
        place(w / 2.0, -h / 2.0),
        place(w / 2.0, h / 2.0),
        place(-w / 2.0, h / 2.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_centers_and_scales_down() {
        let view = CanvasView::fit(1280, 720, 0.0, 0.0, 640.0, 640.0);
        assert!((view.scale - 0.5).abs() < 1e-9);
        assert_eq!(view.origin_x, 0.0);
        assert_eq!(view.origin_y, (640.0 - 360.0) / 2.0);
    }

    #[test]
    fn test_fit_never_upscales() {
        let view = CanvasView::fit(100, 100, 0.0, 0.0, 1000.0, 1000.0);
        assert_eq!(view.scale, 1.0);
    }

    #[test]
    fn test_screen_canvas_round_trip() {
        let view = CanvasView::fit(1280, 720, 40.0, 60.0, 700.0, 500.0);
        let (sx, sy) = view.canvas_to_screen(640.0, 360.0);
        let (cx, cy) = view.screen_to_canvas(sx, sy);
        assert!((cx - 640.0).abs() < 1e-9);
        assert!((cy - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_unrotated() {
        assert!(point_in_rotated_rect(10.0, 10.0, 0.0, 0.0, 30.0, 30.0, 0.0));
        assert!(!point_in_rotated_rect(20.0, 0.0, 0.0, 0.0, 30.0, 30.0, 0.0));
    }

    #[test]
    fn test_hit_test_rotated_quarter_turn() {
        // A 40x10 box rotated 90 degrees occupies 10x40.
        assert!(point_in_rotated_rect(0.0, 18.0, 0.0, 0.0, 40.0, 10.0, 90.0));
        assert!(!point_in_rotated_rect(18.0, 0.0, 0.0, 0.0, 40.0, 10.0, 90.0));
    }

    #[test]
    fn test_corners_of_unrotated_rect() {
        let corners = rotated_rect_corners(100.0, 50.0, 20.0, 10.0, 0.0);
        assert_eq!(corners[0], (90.0, 45.0));
        assert_eq!(corners[2], (110.0, 55.0));
    }
}
