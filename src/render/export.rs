// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! PNG export of the composited canvas.

use crate::models::layer::TextLayer;
use crate::render::compositor;
use crate::render::fonts::FontStore;
use anyhow::{Context, Result};
use std::path::Path;

/// Default file name offered when exporting.
pub const DEFAULT_EXPORT_NAME: &str = "thumbnail.png";

/// Render the design and write it to `path` as a PNG.
pub fn export_png(
    background: Option<&[u8]>,
    layers: &[TextLayer],
    width: u32,
    height: u32,
    fonts: &FontStore,
    path: &Path,
) -> Result<()> {
    let raster = compositor::render(background, layers, width, height, fonts)?;
    raster
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("exported {}x{} PNG to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_writes_decodable_png() {
        let fonts = FontStore::new();
        let path = std::env::temp_dir().join(format!(
            "thumbstudio-export-test-{}.png",
            uuid::Uuid::new_v4()
        ));

        export_png(None, &[], 64, 32, &fonts, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (64, 32));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_export_rejects_zero_dimensions() {
        let fonts = FontStore::new();
        let path = std::env::temp_dir().join("thumbstudio-should-not-exist.png");
        assert!(export_png(None, &[], 0, 32, &fonts, &path).is_err());
        assert!(!path.exists());
    }
}
