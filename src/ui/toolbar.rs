// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar: aspect-ratio toggle, layer creation, template menu, export.

use crate::models::project::{AspectRatio, Preset};

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    SetAspect(AspectRatio),
    AddLayer,
    ApplyPreset(Preset),
    ApplyTemplate(String),
    DeleteTemplate(String),
    SaveTemplate,
    LoadTemplateFile,
    Export,
}

/// Display the toolbar row. `template_names` lists the user's saved
/// templates in display order.
pub fn show(
    ui: &mut egui::Ui,
    aspect: AspectRatio,
    template_names: &[String],
) -> ToolbarAction {
    let mut action = ToolbarAction::None;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        ui.label("Canvas:");
        for ratio in [AspectRatio::Landscape, AspectRatio::Portrait] {
            if ui
                .selectable_label(aspect == ratio, ratio.label())
                .on_hover_text(match ratio {
                    AspectRatio::Landscape => "Landscape (1280x720)",
                    AspectRatio::Portrait => "Portrait (720x1280)",
                })
                .clicked()
            {
                action = ToolbarAction::SetAspect(ratio);
            }
        }

        ui.separator();

        if ui.button("+ Add Text").clicked() {
            action = ToolbarAction::AddLayer;
        }

        ui.separator();

        ui.menu_button("Templates", |ui| {
            ui.label(egui::RichText::new("My Templates").small().strong());
            if template_names.is_empty() {
                ui.label(
                    egui::RichText::new("No saved templates yet")
                        .italics()
                        .weak(),
                );
            }
            for name in template_names {
                ui.horizontal(|ui| {
                    if ui.button(name).clicked() {
                        action = ToolbarAction::ApplyTemplate(name.clone());
                        ui.close_menu();
                    }
                    if ui.small_button("🗑").on_hover_text("Delete template").clicked() {
                        action = ToolbarAction::DeleteTemplate(name.clone());
                        ui.close_menu();
                    }
                });
            }
            ui.separator();
            if ui.button("Save current design…").clicked() {
                action = ToolbarAction::SaveTemplate;
                ui.close_menu();
            }
            if ui.button("Load template file…").clicked() {
                action = ToolbarAction::LoadTemplateFile;
                ui.close_menu();
            }

            ui.separator();
            ui.label(egui::RichText::new("Presets").small().strong());
            for preset in Preset::ALL {
                if ui.button(preset.name()).clicked() {
                    action = ToolbarAction::ApplyPreset(preset);
                    ui.close_menu();
                }
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.button("⬇ Export PNG").clicked() {
                action = ToolbarAction::Export;
            }
        });
    });

    action
}
