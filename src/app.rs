// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! `StudioApp` owns every piece of interactive-session state (layers,
//! selection, aspect ratio, background bytes, the font store, saved
//! templates, preview texture) and passes it by reference into the UI
//! modules. The preview texture is rebuilt from the compositor whenever
//! the design changes, so the preview always matches the export
//! pixel-for-pixel.

use crate::io::{media, serialization};
use crate::models::layer::TextLayer;
use crate::models::project::{AspectRatio, Preset, ProjectState, Template};
use crate::render::{self, FontStore, DEFAULT_EXPORT_NAME};
use crate::ui::canvas::{self, CanvasAction, DragMode};
use crate::ui::{properties, toolbar};
use std::collections::BTreeMap;
use std::sync::mpsc::{channel, Receiver};

/// A preset or template application awaiting user confirmation (applying
/// replaces every current layer).
enum PendingApply {
    Preset(Preset),
    Template(String),
}

impl PendingApply {
    fn label(&self) -> String {
        match self {
            PendingApply::Preset(preset) => format!("preset {:?}", preset.name()),
            PendingApply::Template(name) => format!("template {name:?}"),
        }
    }
}

/// Result of background image loading on the worker thread.
struct LoadedBackgroundData {
    bytes: Vec<u8>,
    data_url: String,
    width: u32,
    height: u32,
}

/// Main application state.
pub struct StudioApp {
    /// Z-ordered text layers (later = on top).
    layers: Vec<TextLayer>,

    /// Id of the currently selected layer.
    selected_layer: Option<String>,

    /// Canvas aspect ratio; pixel dimensions derive from it.
    aspect_ratio: AspectRatio,

    /// Raw encoded background image bytes, if any.
    background_bytes: Option<Vec<u8>>,

    /// Data-URL form of the background, kept for project persistence.
    background_data_url: Option<String>,

    /// Font resolution backend for the compositor.
    fonts: FontStore,

    /// Saved templates by name (session registry; template files can be
    /// written and read through the toolbar).
    templates: BTreeMap<String, Template>,

    /// Rendered preview texture and its rebuild flag.
    preview: Option<egui::TextureHandle>,
    preview_dirty: bool,

    /// Pointer drag in progress on the canvas.
    drag: Option<DragMode>,

    /// Receiver for background image loading.
    background_loader: Option<Receiver<Result<LoadedBackgroundData, String>>>,

    /// Loading state message.
    loading_message: Option<String>,

    /// Name entry for the save-template dialog.
    template_name_input: String,
    saving_template: bool,

    /// Preset/template application awaiting replace confirmation.
    pending_apply: Option<PendingApply>,

    /// Last user-facing status line.
    status: Option<String>,
}

impl Default for StudioApp {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioApp {
    /// Create a new ThumbStudio application instance.
    pub fn new() -> Self {
        let mut fonts = FontStore::new();
        fonts.load_system_fonts();
        if fonts.is_empty() {
            log::warn!("no system fonts found; text layers will not render");
        }

        let aspect_ratio = AspectRatio::default();
        let (w, h) = aspect_ratio.dimensions();

        Self {
            layers: vec![TextLayer::spawn(w, h)],
            selected_layer: None,
            aspect_ratio,
            background_bytes: None,
            background_data_url: None,
            fonts,
            templates: BTreeMap::new(),
            preview: None,
            preview_dirty: true,
            drag: None,
            background_loader: None,
            loading_message: None,
            template_name_input: String::new(),
            saving_template: false,
            pending_apply: None,
            status: None,
        }
    }

    fn canvas_size(&self) -> (u32, u32) {
        self.aspect_ratio.dimensions()
    }

    fn mark_dirty(&mut self) {
        self.preview_dirty = true;
    }

    fn layer_mut(&mut self, id: &str) -> Option<&mut TextLayer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Re-run the compositor and upload the result as the preview
    /// texture.
    fn rebuild_preview(&mut self, ctx: &egui::Context) {
        let (w, h) = self.canvas_size();
        match render::render(
            self.background_bytes.as_deref(),
            &self.layers,
            w,
            h,
            &self.fonts,
        ) {
            Ok(raster) => {
                let size = [raster.width() as usize, raster.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, raster.as_raw());
                self.preview =
                    Some(ctx.load_texture("preview", color_image, egui::TextureOptions::LINEAR));
            }
            Err(e) => {
                log::error!("preview render failed: {e}");
            }
        }
        self.preview_dirty = false;
    }

    /// Current state as a persistable snapshot.
    fn project_state(&self) -> ProjectState {
        ProjectState::new(
            self.background_data_url.clone(),
            self.layers.clone(),
            self.aspect_ratio,
        )
    }

    fn load_project_state(&mut self, project: ProjectState) {
        self.aspect_ratio = project.aspect_ratio;
        self.layers = project.layers;
        self.selected_layer = None;
        self.background_bytes = None;
        self.background_data_url = None;
        if let Some(url) = project.background_image {
            match media::decode_data_url(&url) {
                Ok(bytes) => {
                    self.background_bytes = Some(bytes);
                    self.background_data_url = Some(url);
                }
                Err(e) => log::warn!("project background could not be decoded: {e}"),
            }
        }
        self.mark_dirty();
    }

    fn add_layer(&mut self) {
        let (w, h) = self.canvas_size();
        let layer = TextLayer::spawn(w, h);
        self.selected_layer = Some(layer.id.clone());
        self.layers.push(layer);
        self.mark_dirty();
        log::info!("added layer, total: {}", self.layers.len());
    }

    fn delete_layer(&mut self, id: &str) {
        self.layers.retain(|l| l.id != id);
        if self.selected_layer.as_deref() == Some(id) {
            self.selected_layer = None;
        }
        self.mark_dirty();
        log::info!("deleted layer, total: {}", self.layers.len());
    }

    /// Replace the design with freshly instantiated layers.
    fn replace_layers(&mut self, layers: Vec<TextLayer>) {
        self.layers = layers;
        self.selected_layer = None;
        self.drag = None;
        self.mark_dirty();
    }

    /// Apply immediately when the design is empty, otherwise ask first
    /// (applying replaces every current layer).
    fn request_apply(&mut self, pending: PendingApply) {
        if self.layers.is_empty() {
            self.apply(pending);
        } else {
            self.pending_apply = Some(pending);
        }
    }

    fn apply(&mut self, pending: PendingApply) {
        match pending {
            PendingApply::Preset(preset) => {
                let (w, h) = self.canvas_size();
                self.replace_layers(preset.layers(w, h));
                self.status = Some(format!("Applied preset {:?}", preset.name()));
            }
            PendingApply::Template(name) => {
                let Some(template) = self.templates.get(&name) else {
                    return;
                };
                self.aspect_ratio = template.aspect_ratio;
                let layers = template.instantiate();
                self.replace_layers(layers);
                self.status = Some(format!("Applied template {name:?}"));
            }
        }
    }

    /// Pick a background image and load it on a worker thread so the UI
    /// stays responsive.
    fn open_background_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["jpg", "jpeg", "png", "bmp", "webp", "gif"])
            .pick_file()
        else {
            return;
        };

        let (sender, receiver) = channel();
        self.background_loader = Some(receiver);
        self.loading_message = Some("Loading background image...".to_string());

        std::thread::spawn(move || {
            let result = media::load_background(&path)
                .map(|loaded| LoadedBackgroundData {
                    data_url: media::encode_data_url(&loaded.bytes),
                    width: loaded.width,
                    height: loaded.height,
                    bytes: loaded.bytes,
                })
                .map_err(|e| e.to_string());
            let _ = sender.send(result);
        });
    }

    fn export_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG image", &["png"])
            .set_file_name(DEFAULT_EXPORT_NAME)
            .save_file()
        else {
            return;
        };
        let (w, h) = self.canvas_size();
        match render::export_png(
            self.background_bytes.as_deref(),
            &self.layers,
            w,
            h,
            &self.fonts,
            &path,
        ) {
            Ok(()) => self.status = Some(format!("Exported {}", path.display())),
            Err(e) => {
                log::error!("export failed: {e:#}");
                self.status = Some(format!("Export failed: {e}"));
            }
        }
    }

    fn save_project_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Project", &["json", "yaml", "yml"])
            .set_file_name("project.json")
            .save_file()
        else {
            return;
        };
        match serialization::save_project(&self.project_state(), &path) {
            Ok(()) => self.status = Some(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("project save failed: {e:#}");
                self.status = Some(format!("Save failed: {e}"));
            }
        }
    }

    fn load_project_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Project", &["json", "yaml", "yml"])
            .pick_file()
        else {
            return;
        };
        match serialization::load_project(&path) {
            Ok(project) => {
                self.load_project_state(project);
                self.status = Some(format!("Loaded {}", path.display()));
            }
            Err(e) => {
                log::error!("project load failed: {e:#}");
                self.status = Some(format!("Load failed: {e}"));
            }
        }
    }

    fn load_template_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Template", &["json"])
            .pick_file()
        else {
            return;
        };
        match serialization::load_template(&path) {
            Ok(template) => {
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("template")
                    .to_string();
                self.templates.insert(name.clone(), template);
                self.request_apply(PendingApply::Template(name));
            }
            Err(e) => {
                log::error!("template load failed: {e:#}");
                self.status = Some(format!("Template load failed: {e}"));
            }
        }
    }

    /// Store the current design under the entered name and offer to
    /// write it out as a template file.
    fn finish_save_template(&mut self) {
        let name = self.template_name_input.trim().to_string();
        if name.is_empty() {
            return;
        }
        let template = Template::from_design(&self.layers, self.aspect_ratio);
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Template", &["json"])
            .set_file_name(format!("{name}.json"))
            .save_file()
        {
            if let Err(e) = serialization::save_template(&template, &path) {
                log::error!("template save failed: {e:#}");
            }
        }
        self.templates.insert(name.clone(), template);
        self.status = Some(format!("Saved template {name:?}"));
        self.template_name_input.clear();
        self.saving_template = false;
    }

    fn handle_canvas_action(&mut self, action: CanvasAction) {
        match action {
            CanvasAction::Select(id) => {
                self.selected_layer = Some(id);
            }
            CanvasAction::Deselect => {
                self.selected_layer = None;
            }
            CanvasAction::DragStart(mode) => {
                let id = match &mode {
                    DragMode::Move(id) | DragMode::Resize(id) => id.clone(),
                };
                self.selected_layer = Some(id);
                self.drag = Some(mode);
            }
            CanvasAction::DragDelta { dx, dy } => match self.drag.clone() {
                Some(DragMode::Move(id)) => {
                    if let Some(layer) = self.layer_mut(&id) {
                        layer.x += dx;
                        layer.y += dy;
                        self.mark_dirty();
                    }
                }
                Some(DragMode::Resize(id)) => {
                    if let Some(layer) = self.layer_mut(&id) {
                        layer.resize(layer.width + dx, layer.height + dy);
                        self.mark_dirty();
                    }
                }
                None => {}
            },
            CanvasAction::DragEnd => {
                self.drag = None;
            }
            CanvasAction::None => {}
        }
    }

    fn handle_toolbar_action(&mut self, action: toolbar::ToolbarAction) {
        match action {
            toolbar::ToolbarAction::SetAspect(ratio) => {
                if self.aspect_ratio != ratio {
                    self.aspect_ratio = ratio;
                    self.mark_dirty();
                }
            }
            toolbar::ToolbarAction::AddLayer => self.add_layer(),
            toolbar::ToolbarAction::ApplyPreset(preset) => {
                self.request_apply(PendingApply::Preset(preset));
            }
            toolbar::ToolbarAction::ApplyTemplate(name) => {
                self.request_apply(PendingApply::Template(name));
            }
            toolbar::ToolbarAction::DeleteTemplate(name) => {
                self.templates.remove(&name);
                self.status = Some(format!("Deleted template {name:?}"));
            }
            toolbar::ToolbarAction::SaveTemplate => {
                self.saving_template = true;
            }
            toolbar::ToolbarAction::LoadTemplateFile => self.load_template_dialog(),
            toolbar::ToolbarAction::Export => self.export_dialog(),
            toolbar::ToolbarAction::None => {}
        }
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background loading.
        if let Some(ref receiver) = self.background_loader {
            if let Ok(result) = receiver.try_recv() {
                self.background_loader = None;
                self.loading_message = None;
                match result {
                    Ok(loaded) => {
                        log::info!(
                            "background loaded ({}x{}, {} bytes)",
                            loaded.width,
                            loaded.height,
                            loaded.bytes.len()
                        );
                        self.background_bytes = Some(loaded.bytes);
                        self.background_data_url = Some(loaded.data_url);
                        self.mark_dirty();
                    }
                    Err(e) => {
                        log::error!("failed to load background: {e}");
                        self.status = Some(format!("Background load failed: {e}"));
                    }
                }
            }
        }

        if self.loading_message.is_some() {
            ctx.request_repaint();
        }

        if self.preview_dirty {
            self.rebuild_preview(ctx);
        }

        // Top menu bar.
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Background...").clicked() {
                        self.open_background_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Remove Background").clicked() {
                        self.background_bytes = None;
                        self.background_data_url = None;
                        self.mark_dirty();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Load Project...").clicked() {
                        self.load_project_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Save Project...").clicked() {
                        self.save_project_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Export PNG...").clicked() {
                        self.export_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let has_selection = self.selected_layer.is_some();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Delete Selected"))
                        .clicked()
                    {
                        if let Some(id) = self.selected_layer.clone() {
                            self.delete_layer(&id);
                        }
                        ui.close_menu();
                    }
                });

                if let Some(status) = &self.status {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(egui::RichText::new(status).weak());
                    });
                }
            });
        });

        // Toolbar.
        let template_names: Vec<String> = self.templates.keys().cloned().collect();
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::show(ui, self.aspect_ratio, &template_names))
            .inner;
        self.handle_toolbar_action(toolbar_action);

        // Properties panel (right side).
        let selected = self.selected_layer.clone();
        let properties_action = egui::SidePanel::right("properties")
            .default_width(280.0)
            .show(ctx, |ui| {
                let layer = selected
                    .as_deref()
                    .and_then(|id| self.layers.iter_mut().find(|l| l.id == id));
                properties::show(ui, layer)
            })
            .inner;
        match properties_action {
            properties::PropertiesAction::Changed => self.mark_dirty(),
            properties::PropertiesAction::Delete => {
                if let Some(id) = self.selected_layer.clone() {
                    self.delete_layer(&id);
                }
            }
            properties::PropertiesAction::None => {}
        }

        // Keyboard shortcuts (skipped while a text field is focused).
        if !ctx.wants_keyboard_input() {
            if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
                self.selected_layer = None;
            }
            if ctx.input(|i| {
                i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace)
            }) {
                if let Some(id) = self.selected_layer.clone() {
                    self.delete_layer(&id);
                }
            }
        }

        // Main canvas (center).
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                if let Some(ref message) = self.loading_message {
                    ui.centered_and_justified(|ui| {
                        ui.vertical_centered(|ui| {
                            ui.add_space(20.0);
                            ui.spinner();
                            ui.add_space(10.0);
                            ui.label(
                                egui::RichText::new(message)
                                    .size(16.0)
                                    .color(egui::Color32::from_gray(200)),
                            );
                        });
                    });
                    CanvasAction::None
                } else {
                    canvas::show(
                        ui,
                        self.preview.as_ref(),
                        self.canvas_size(),
                        &self.layers,
                        self.selected_layer.as_deref(),
                        self.drag.as_ref(),
                    )
                }
            })
            .inner;
        self.handle_canvas_action(canvas_action);

        // Replace confirmation for presets and templates.
        if let Some(pending) = &self.pending_apply {
            let label = pending.label();
            let mut apply_clicked = false;
            let mut cancel_clicked = false;
            egui::Window::new("Replace Layers")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!(
                        "Apply {label}? This replaces the current {} layer(s).",
                        self.layers.len()
                    ));
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Apply").clicked() {
                            apply_clicked = true;
                        }
                        if ui.button("Cancel").clicked() {
                            cancel_clicked = true;
                        }
                    });
                });
            if apply_clicked {
                if let Some(pending) = self.pending_apply.take() {
                    self.apply(pending);
                }
            } else if cancel_clicked {
                self.pending_apply = None;
            }
        }

        // Save-template dialog.
        if self.saving_template {
            let mut open = true;
            let mut save_clicked = false;
            egui::Window::new("Save Template")
                .collapsible(false)
                .resizable(false)
                .open(&mut open)
                .show(ctx, |ui| {
                    ui.label("Template name:");
                    ui.text_edit_singleline(&mut self.template_name_input);
                    ui.horizontal(|ui| {
                        if ui.button("Save").clicked() {
                            save_clicked = true;
                        }
                        if ui.button("Cancel").clicked() {
                            self.saving_template = false;
                            self.template_name_input.clear();
                        }
                    });
                });
            if save_clicked {
                self.finish_save_template();
            }
            if !open {
                self.saving_template = false;
            }
        }
    }
}
