// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Layer properties panel.
//!
//! Sidebar editor for the selected text layer: content, typography,
//! colors, shadow, stroke, background box and transform. Edits mutate
//! the layer in place; the returned action tells the app whether the
//! preview needs re-rendering.

use crate::models::color::Rgba;
use crate::models::layer::{TextAlign, TextLayer};
use crate::models::project::{AVAILABLE_FONTS, AVAILABLE_WEIGHTS};

/// Result of properties-panel interaction.
pub enum PropertiesAction {
    None,
    Changed,
    Delete,
}

fn to_egui(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn from_egui(c: egui::Color32) -> Rgba {
    Rgba::rgba(c.r(), c.g(), c.b(), c.a())
}

/// Color picker bound to an `Rgba` field. Returns true when edited.
fn color_field(ui: &mut egui::Ui, label: &str, color: &mut Rgba) -> bool {
    let mut value = to_egui(*color);
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label(label);
        if ui.color_edit_button_srgba(&mut value).changed() {
            *color = from_egui(value);
            changed = true;
        }
    });
    changed
}

/// Checkbox-gated color picker for optional colors (background, stroke).
fn optional_color_field(
    ui: &mut egui::Ui,
    label: &str,
    color: &mut Option<Rgba>,
    default: Rgba,
) -> bool {
    let mut enabled = color.is_some();
    let mut changed = false;
    ui.horizontal(|ui| {
        if ui.checkbox(&mut enabled, label).changed() {
            *color = if enabled { Some(default) } else { None };
            changed = true;
        }
        if let Some(c) = color {
            let mut value = to_egui(*c);
            if ui.color_edit_button_srgba(&mut value).changed() {
                *c = from_egui(value);
                changed = true;
            }
        }
    });
    changed
}

/// Display the properties panel for the selected layer, if any.
pub fn show(ui: &mut egui::Ui, layer: Option<&mut TextLayer>) -> PropertiesAction {
    let Some(layer) = layer else {
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("Select a text layer to edit it")
                    .italics()
                    .weak(),
            );
        });
        return PropertiesAction::None;
    };

    let mut changed = false;
    let mut delete = false;

    egui::ScrollArea::vertical().show(ui, |ui| {
        ui.heading("Text");
        changed |= ui.text_edit_multiline(&mut layer.text).changed();

        ui.add_space(8.0);
        ui.heading("Typography");
        ui.horizontal(|ui| {
            ui.label("Font");
            egui::ComboBox::from_id_source("font_family")
                .selected_text(layer.font_family.clone())
                .show_ui(ui, |ui| {
                    for family in AVAILABLE_FONTS {
                        if ui
                            .selectable_value(&mut layer.font_family, family.to_string(), family)
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });
        });
        ui.horizontal(|ui| {
            ui.label("Size");
            changed |= ui
                .add(egui::Slider::new(&mut layer.font_size, 8.0..=300.0))
                .changed();
        });
        ui.horizontal(|ui| {
            ui.label("Weight");
            egui::ComboBox::from_id_source("font_weight")
                .selected_text(layer.font_weight.label())
                .show_ui(ui, |ui| {
                    for weight in AVAILABLE_WEIGHTS {
                        if ui
                            .selectable_value(&mut layer.font_weight, weight, weight.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });
        });
        ui.horizontal(|ui| {
            ui.label("Align");
            for (align, label) in [
                (TextAlign::Left, "Left"),
                (TextAlign::Center, "Center"),
                (TextAlign::Right, "Right"),
            ] {
                if ui
                    .selectable_label(layer.text_align == align, label)
                    .clicked()
                {
                    layer.text_align = align;
                    changed = true;
                }
            }
        });
        changed |= color_field(ui, "Fill", &mut layer.color);
        ui.horizontal(|ui| {
            ui.label("Opacity");
            changed |= ui
                .add(egui::Slider::new(&mut layer.opacity, 0.0..=1.0))
                .changed();
        });

        ui.add_space(8.0);
        ui.heading("Background");
        changed |= optional_color_field(ui, "Box", &mut layer.background_color, Rgba::BLACK);
        if layer.background_color.is_some() {
            ui.horizontal(|ui| {
                ui.label("Opacity");
                changed |= ui
                    .add(egui::Slider::new(&mut layer.background_opacity, 0.0..=1.0))
                    .changed();
            });
            ui.horizontal(|ui| {
                ui.label("Padding");
                changed |= ui
                    .add(egui::Slider::new(&mut layer.background_padding, 0.0..=60.0))
                    .changed();
            });
        }

        ui.add_space(8.0);
        ui.heading("Stroke");
        changed |= optional_color_field(ui, "Stroke", &mut layer.stroke_color, Rgba::BLACK);
        if layer.stroke_color.is_some() {
            ui.horizontal(|ui| {
                ui.label("Width");
                changed |= ui
                    .add(egui::Slider::new(&mut layer.stroke_width, 0.0..=20.0))
                    .changed();
            });
        }

        ui.add_space(8.0);
        ui.heading("Shadow");
        changed |= color_field(ui, "Color", &mut layer.shadow_color);
        ui.horizontal(|ui| {
            ui.label("Blur");
            changed |= ui
                .add(egui::Slider::new(&mut layer.shadow_blur, 0.0..=50.0))
                .changed();
        });
        ui.horizontal(|ui| {
            ui.label("Offset");
            changed |= ui
                .add(egui::DragValue::new(&mut layer.shadow_offset_x).speed(0.5))
                .changed();
            changed |= ui
                .add(egui::DragValue::new(&mut layer.shadow_offset_y).speed(0.5))
                .changed();
        });

        ui.add_space(8.0);
        ui.heading("Transform");
        ui.horizontal(|ui| {
            ui.label("Rotation");
            changed |= ui
                .add(egui::Slider::new(&mut layer.rotation, -180.0..=180.0).suffix("°"))
                .changed();
        });

        ui.add_space(12.0);
        ui.separator();
        if ui.button("🗑 Delete layer").clicked() {
            delete = true;
        }
    });

    if delete {
        PropertiesAction::Delete
    } else if changed {
        PropertiesAction::Changed
    } else {
        PropertiesAction::None
    }
}
