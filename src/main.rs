// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! ThumbStudio - thumbnail design studio
//!
//! A cross-platform desktop application for composing video thumbnails:
//! a background image plus styled, draggable text layers, exported as a
//! flattened PNG that matches the preview pixel-for-pixel.

mod app;
mod io;
mod models;
mod render;
mod ui;
mod util;

use anyhow::Result;
use app::StudioApp;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 900.0])
            .with_min_inner_size([960.0, 640.0])
            .with_title("ThumbStudio - Thumbnail Design Studio"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "ThumbStudio",
        options,
        Box::new(|_cc| Ok(Box::new(StudioApp::new()))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
