// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Preview canvas.
//!
//! Draws the compositor output fitted to the available space, overlays
//! selection chrome for the active layer, and turns pointer input into
//! actions (select, drag-move, corner-resize). The preview texture is
//! the real render, so what is shown is exactly what exports.

use crate::models::layer::TextLayer;
use crate::util::geometry::{point_in_rotated_rect, rotated_rect_corners, CanvasView};

/// Screen-space pick radius for the resize handle.
const HANDLE_RADIUS: f32 = 7.0;

/// An in-progress pointer drag, held by the app between frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragMode {
    Move(String),
    Resize(String),
}

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Select(String),
    Deselect,
    DragStart(DragMode),
    /// Pointer moved during a drag; delta is in canvas pixels.
    DragDelta { dx: f64, dy: f64 },
    DragEnd,
}

/// Display the preview area and handle pointer interactions.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    canvas_size: (u32, u32),
    layers: &[TextLayer],
    selected: Option<&str>,
    drag: Option<&DragMode>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(24);

    let available = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available);

        let area = ui.min_rect();
        let (cw, ch) = canvas_size;
        let view = CanvasView::fit(
            cw,
            ch,
            area.min.x as f64,
            area.min.y as f64,
            area.width() as f64,
            area.height() as f64,
        );
        let (ox, oy) = view.canvas_to_screen(0.0, 0.0);
        let image_rect = egui::Rect::from_min_size(
            egui::pos2(ox as f32, oy as f32),
            egui::vec2(
                (cw as f64 * view.scale) as f32,
                (ch as f64 * view.scale) as f32,
            ),
        );

        if let Some(texture) = texture {
            ui.painter().image(
                texture.id(),
                image_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        } else {
            ui.painter()
                .rect_filled(image_rect, 0.0, egui::Color32::from_gray(40));
        }

        let response = ui.allocate_rect(image_rect, egui::Sense::click_and_drag());

        // Selection chrome for the active layer.
        if let Some(layer) = selected.and_then(|id| layers.iter().find(|l| l.id == id)) {
            let corners = rotated_rect_corners(
                layer.x,
                layer.y,
                layer.width,
                layer.height,
                layer.rotation,
            );
            let points: Vec<egui::Pos2> = corners
                .iter()
                .map(|&(x, y)| {
                    let (sx, sy) = view.canvas_to_screen(x, y);
                    egui::pos2(sx as f32, sy as f32)
                })
                .collect();
            ui.painter().add(egui::Shape::closed_line(
                points.clone(),
                egui::Stroke::new(1.5, egui::Color32::LIGHT_BLUE),
            ));
            // Resize handle on the bottom-right corner.
            ui.painter().circle_filled(points[2], 5.0, egui::Color32::LIGHT_BLUE);
            ui.painter().circle_stroke(
                points[2],
                5.0,
                egui::Stroke::new(1.0, egui::Color32::BLACK),
            );
        }

        let pointer_canvas = |pos: egui::Pos2| view.screen_to_canvas(pos.x as f64, pos.y as f64);

        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                // Resize handle wins over layer bodies.
                let on_handle = selected
                    .and_then(|id| layers.iter().find(|l| l.id == id))
                    .filter(|layer| {
                        let corner = rotated_rect_corners(
                            layer.x,
                            layer.y,
                            layer.width,
                            layer.height,
                            layer.rotation,
                        )[2];
                        let (sx, sy) = view.canvas_to_screen(corner.0, corner.1);
                        let d = egui::pos2(sx as f32, sy as f32).distance(pos);
                        d <= HANDLE_RADIUS
                    });
                if let Some(layer) = on_handle {
                    action = CanvasAction::DragStart(DragMode::Resize(layer.id.clone()));
                } else {
                    let (cx, cy) = pointer_canvas(pos);
                    // Topmost layer first.
                    let hit = layers.iter().rev().find(|l| {
                        point_in_rotated_rect(cx, cy, l.x, l.y, l.width, l.height, l.rotation)
                    });
                    action = match hit {
                        Some(layer) => {
                            CanvasAction::DragStart(DragMode::Move(layer.id.clone()))
                        }
                        None => CanvasAction::Deselect,
                    };
                }
            }
        } else if response.dragged() && drag.is_some() {
            let delta = response.drag_delta();
            if delta != egui::Vec2::ZERO {
                action = CanvasAction::DragDelta {
                    dx: delta.x as f64 / view.scale,
                    dy: delta.y as f64 / view.scale,
                };
            }
        } else if response.drag_stopped() {
            action = CanvasAction::DragEnd;
        } else if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let (cx, cy) = pointer_canvas(pos);
                let hit = layers.iter().rev().find(|l| {
                    point_in_rotated_rect(cx, cy, l.x, l.y, l.width, l.height, l.rotation)
                });
                action = match hit {
                    Some(layer) => CanvasAction::Select(layer.id.clone()),
                    None => CanvasAction::Deselect,
                };
            }
        }
    });

    // Status line beneath the canvas.
    ui.separator();
    ui.horizontal(|ui| {
        let (cw, ch) = canvas_size;
        ui.label(format!("Canvas: {cw}x{ch}"));
        ui.separator();
        ui.label(format!("{} layer(s)", layers.len()));
    });

    action
}
