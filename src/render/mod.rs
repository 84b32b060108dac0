// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Rasterization pipeline: font resolution, layout math, the compositor
//! and PNG export.

pub mod compositor;
pub mod export;
pub mod fonts;
pub mod layout;

pub use compositor::{render, RenderError, PLAIN_FILL};
pub use export::{export_png, DEFAULT_EXPORT_NAME};
pub use fonts::FontStore;

/// Locate a usable TTF on the host for pixel-level tests. Tests that
/// need real glyphs return early when none of the well-known paths
/// exist, so the suite passes on fontless machines.
#[cfg(test)]
pub(crate) fn test_font_bytes() -> Option<Vec<u8>> {
    const CANDIDATES: [&str; 7] = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];
    CANDIDATES
        .iter()
        .find_map(|path| std::fs::read(path).ok())
}

/// A [`FontStore`] with one system font registered as "TestSans", or
/// `None` when the host has no usable font.
#[cfg(test)]
pub(crate) fn test_font_store() -> Option<FontStore> {
    let bytes = test_font_bytes()?;
    let mut store = FontStore::new();
    store
        .register("TestSans", crate::models::layer::FontWeight::Regular, &bytes)
        .ok()?;
    Some(store)
}
