// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Project state, templates and built-in presets.
//!
//! `ProjectState` is the wholesale-persisted snapshot of an editing
//! session. `Template` is a reusable `{layers, aspectRatio}` snapshot;
//! a legacy wire form (a bare layer array) is still accepted and
//! normalized at load time.

use crate::models::color::Rgba;
use crate::models::layer::{FontWeight, TextLayer};
use serde::{Deserialize, Serialize};

/// Canvas aspect ratio. The tag is authoritative; pixel dimensions are
/// always derived from it where the tag is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "16:9")]
    Landscape,
    #[serde(rename = "9:16")]
    Portrait,
}

impl AspectRatio {
    /// Canvas dimensions in pixels for this ratio.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            AspectRatio::Landscape => (1280, 720),
            AspectRatio::Portrait => (720, 1280),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AspectRatio::Landscape => "16:9",
            AspectRatio::Portrait => "9:16",
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        AspectRatio::Landscape
    }
}

/// Complete project snapshot for serialization. Width/height are
/// persisted redundantly for backward compatibility; on load they are
/// re-derived from the aspect-ratio tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    /// Background image as a data URL, if any.
    pub background_image: Option<String>,
    /// Z-ordered layers: later entries render on top.
    pub layers: Vec<TextLayer>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub aspect_ratio: AspectRatio,
}

impl ProjectState {
    pub fn new(
        background_image: Option<String>,
        layers: Vec<TextLayer>,
        aspect_ratio: AspectRatio,
    ) -> Self {
        let (canvas_width, canvas_height) = aspect_ratio.dimensions();
        Self {
            background_image,
            layers,
            canvas_width,
            canvas_height,
            aspect_ratio,
        }
    }

    /// Re-derive the redundant pixel dimensions from the aspect tag.
    pub fn normalize(&mut self) {
        let (w, h) = self.aspect_ratio.dimensions();
        self.canvas_width = w;
        self.canvas_height = h;
    }
}

/// A named, reusable snapshot of layers plus aspect ratio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub layers: Vec<TextLayer>,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
}

impl Template {
    /// Snapshot the current design. Layer ids are regenerated on save so
    /// a stored template never shares ids with the live document.
    pub fn from_design(layers: &[TextLayer], aspect_ratio: AspectRatio) -> Self {
        Self {
            layers: layers.iter().map(TextLayer::with_fresh_id).collect(),
            aspect_ratio,
        }
    }

    /// Produce live layers from this template. Every layer is deep-cloned
    /// with a fresh id; applying the same template twice yields disjoint
    /// id sets.
    pub fn instantiate(&self) -> Vec<TextLayer> {
        self.layers.iter().map(TextLayer::with_fresh_id).collect()
    }
}

/// Wire form of a template file: either the current tagged object or the
/// legacy bare layer array (which implies 16:9).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TemplateFile {
    Tagged(Template),
    Legacy(Vec<TextLayer>),
}

impl TemplateFile {
    /// Normalize to the current schema.
    pub fn into_template(self) -> Template {
        match self {
            TemplateFile::Tagged(t) => t,
            TemplateFile::Legacy(layers) => Template {
                layers,
                aspect_ratio: AspectRatio::Landscape,
            },
        }
    }
}

/// Built-in, non-deletable layout presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Minimal,
    Gaming,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Minimal, Preset::Gaming];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Minimal => "minimal",
            Preset::Gaming => "gaming",
        }
    }

    /// Build the preset's layers, centered on the given canvas (preset
    /// positions are reset to center so they stay visible on either
    /// aspect ratio) and stamped with fresh ids.
    pub fn layers(self, canvas_width: u32, canvas_height: u32) -> Vec<TextLayer> {
        let centered = |overrides: TextLayer| {
            TextLayer {
                x: canvas_width as f64 / 2.0,
                y: canvas_height as f64 / 2.0,
                ..overrides
            }
            .with_fresh_id()
        };

        match self {
            Preset::Minimal => vec![centered(TextLayer {
                text: "EPIC VLOG".to_string(),
                font_size: 120.0,
                font_family: "Oswald".to_string(),
                color: Rgba::WHITE,
                shadow_blur: 0.0,
                shadow_offset_x: 5.0,
                shadow_offset_y: 5.0,
                shadow_color: Rgba::BLACK,
                ..TextLayer::default()
            })],
            Preset::Gaming => vec![
                centered(TextLayer {
                    text: "GAMEPLAY".to_string(),
                    font_size: 80.0,
                    font_family: "Poppins".to_string(),
                    color: Rgba::rgb(0xfc, 0xd3, 0x4d),
                    stroke_color: Some(Rgba::BLACK),
                    stroke_width: 4.0,
                    shadow_color: Rgba::BLACK,
                    shadow_blur: 20.0,
                    ..TextLayer::default()
                }),
                centered(TextLayer {
                    text: "FULL REVIEW".to_string(),
                    font_size: 100.0,
                    font_family: "Montserrat".to_string(),
                    color: Rgba::WHITE,
                    background_color: Some(Rgba::rgb(0xdc, 0x26, 0x26)),
                    background_padding: 20.0,
                    background_opacity: 1.0,
                    ..TextLayer::default()
                }),
            ],
        }
    }
}

/// Font families offered in the sidebar. Resolution is the font
/// backend's concern; these are just the names the UI lists.
pub const AVAILABLE_FONTS: [&str; 12] = [
    "Inter",
    "Montserrat",
    "Oswald",
    "Poppins",
    "Roboto Slab",
    "Anton",
    "Bangers",
    "Bebas Neue",
    "Permanent Marker",
    "Lobster",
    "Righteous",
    "System",
];

/// Weight options offered in the sidebar.
pub const AVAILABLE_WEIGHTS: [FontWeight; 4] = FontWeight::ALL;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_aspect_ratio_dimensions() {
        assert_eq!(AspectRatio::Landscape.dimensions(), (1280, 720));
        assert_eq!(AspectRatio::Portrait.dimensions(), (720, 1280));
    }

    #[test]
    fn test_project_normalize_rederives_dimensions() {
        let mut project = ProjectState::new(None, Vec::new(), AspectRatio::Portrait);
        project.canvas_width = 999;
        project.canvas_height = 111;
        project.normalize();
        assert_eq!(project.canvas_width, 720);
        assert_eq!(project.canvas_height, 1280);
    }

    #[test]
    fn test_template_instantiate_twice_disjoint_ids() {
        let template = Template::from_design(
            &[TextLayer::spawn(1280, 720), TextLayer::spawn(1280, 720)],
            AspectRatio::Landscape,
        );

        let first = template.instantiate();
        let second = template.instantiate();

        let stored: HashSet<_> = template.layers.iter().map(|l| l.id.clone()).collect();
        let a: HashSet<_> = first.iter().map(|l| l.id.clone()).collect();
        let b: HashSet<_> = second.iter().map(|l| l.id.clone()).collect();

        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        assert!(a.is_disjoint(&b));
        assert!(a.is_disjoint(&stored));
        assert!(b.is_disjoint(&stored));
    }

    #[test]
    fn test_template_from_design_regenerates_ids() {
        let live = vec![TextLayer::spawn(1280, 720)];
        let template = Template::from_design(&live, AspectRatio::Landscape);
        assert_ne!(template.layers[0].id, live[0].id);
    }

    #[test]
    fn test_legacy_template_is_bare_array() {
        let layer = TextLayer::spawn(1280, 720);
        let json = serde_json::to_string(&vec![layer]).unwrap();
        let parsed: TemplateFile = serde_json::from_str(&json).unwrap();
        let template = parsed.into_template();
        assert_eq!(template.aspect_ratio, AspectRatio::Landscape);
        assert_eq!(template.layers.len(), 1);
    }

    #[test]
    fn test_tagged_template_round_trip() {
        let template =
            Template::from_design(&[TextLayer::spawn(720, 1280)], AspectRatio::Portrait);
        let json = serde_json::to_string(&template).unwrap();
        assert!(json.contains(r#""aspectRatio":"9:16""#));
        let parsed: TemplateFile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.into_template().aspect_ratio, AspectRatio::Portrait);
    }

    #[test]
    fn test_preset_layers_are_centered_with_unique_ids() {
        for preset in Preset::ALL {
            let layers = preset.layers(720, 1280);
            assert!(!layers.is_empty());
            let ids: HashSet<_> = layers.iter().map(|l| l.id.clone()).collect();
            assert_eq!(ids.len(), layers.len());
            for layer in &layers {
                assert_eq!(layer.x, 360.0);
                assert_eq!(layer.y, 640.0);
            }
        }
    }
}
