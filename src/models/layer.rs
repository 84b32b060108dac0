// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Text layer data structures.
//!
//! A [`TextLayer`] is one independent overlay: geometry (center position,
//! resize box, rotation), typography, fill/stroke/shadow styling and an
//! optional flat-color background box. Field names on the wire are
//! camelCase for compatibility with previously saved projects.

use crate::models::color::{transparent_sentinel, Rgba};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum width/height enforced on interactive resize.
pub const MIN_LAYER_SIZE: f64 = 20.0;

/// Horizontal alignment of a layer's text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Font weight, restricted to the weights the editor exposes.
/// Serialized as the numeric CSS strings ("400" .. "900").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FontWeight {
    #[serde(rename = "400")]
    Regular,
    #[serde(rename = "600")]
    SemiBold,
    #[serde(rename = "700")]
    Bold,
    #[serde(rename = "900")]
    Black,
}

impl FontWeight {
    pub const ALL: [FontWeight; 4] = [
        FontWeight::Regular,
        FontWeight::SemiBold,
        FontWeight::Bold,
        FontWeight::Black,
    ];

    /// Numeric CSS weight value.
    pub fn numeric(self) -> u16 {
        match self {
            FontWeight::Regular => 400,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::Black => 900,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontWeight::Regular => "Regular",
            FontWeight::SemiBold => "Semi Bold",
            FontWeight::Bold => "Bold",
            FontWeight::Black => "Black",
        }
    }
}

/// One styled, positionable text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLayer {
    /// Opaque unique id, stable for the layer's lifetime.
    pub id: String,
    /// Literal content; may contain `\n` for explicit line breaks.
    pub text: String,
    /// Center position in canvas pixels.
    pub x: f64,
    pub y: f64,
    /// Interactive resize box. The rasterizer does not clip to it.
    pub width: f64,
    pub height: f64,
    /// Pixel font size.
    pub font_size: f64,
    /// Opaque family identifier resolved by the font backend.
    pub font_family: String,
    pub color: Rgba,
    pub font_weight: FontWeight,
    pub text_align: TextAlign,
    pub shadow_color: Rgba,
    pub shadow_blur: f64,
    pub shadow_offset_x: f64,
    pub shadow_offset_y: f64,
    /// `None` disables the stroke, as does `stroke_width == 0`.
    #[serde(with = "transparent_sentinel")]
    pub stroke_color: Option<Rgba>,
    pub stroke_width: f64,
    /// Degrees, clockwise-positive, about the center.
    pub rotation: f64,
    /// `None` disables the background box entirely.
    #[serde(with = "transparent_sentinel")]
    pub background_color: Option<Rgba>,
    /// Multiplied with the layer opacity when filling the box.
    pub background_opacity: f64,
    /// Symmetric padding around the measured text bounds, in pixels.
    pub background_padding: f64,
    /// Uniform 0–1 multiplier over every visual element of the layer.
    pub opacity: f64,
}

impl Default for TextLayer {
    fn default() -> Self {
        Self {
            id: String::new(),
            text: "NEW TEXT".to_string(),
            x: 100.0,
            y: 100.0,
            width: 300.0,
            height: 150.0,
            font_size: 64.0,
            font_family: "Montserrat".to_string(),
            color: Rgba::WHITE,
            font_weight: FontWeight::Black,
            text_align: TextAlign::Center,
            shadow_color: Rgba::BLACK,
            shadow_blur: 10.0,
            shadow_offset_x: 4.0,
            shadow_offset_y: 4.0,
            stroke_color: None,
            stroke_width: 0.0,
            rotation: 0.0,
            background_color: None,
            background_opacity: 1.0,
            background_padding: 10.0,
            opacity: 1.0,
        }
    }
}

impl TextLayer {
    /// Create a default layer with a fresh id, centered on the canvas.
    pub fn spawn(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            id: new_layer_id(),
            x: canvas_width as f64 / 2.0,
            y: canvas_height as f64 / 2.0,
            ..Self::default()
        }
    }

    /// Deep clone with a newly generated id. Used when instantiating
    /// templates and presets so stored ids never leak into the live
    /// document.
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: new_layer_id(),
            ..self.clone()
        }
    }

    /// Apply an interactive resize, clamping to the minimum size.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(MIN_LAYER_SIZE);
        self.height = height.max(MIN_LAYER_SIZE);
    }
}

/// Generate a process-lifetime-unique layer id.
pub fn new_layer_id() -> String {
    Uuid::new_v4().to_string()
}
