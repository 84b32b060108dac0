// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Background image loading and data-URL conversion.
//!
//! Project files carry the background as binary-as-text (a data URL), so
//! loading a background means reading raw bytes, checking they decode,
//! and producing both the bytes (for the compositor) and the data URL
//! (for persistence).

use anyhow::{anyhow, bail, Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::path::Path;

/// A validated background image: raw encoded bytes plus dimensions.
#[derive(Debug, Clone)]
pub struct LoadedBackground {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Read an image file and verify it decodes.
pub fn load_background(path: &Path) -> Result<LoadedBackground> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let img = image::load_from_memory(&bytes)
        .with_context(|| format!("{} is not a decodable image", path.display()))?;
    Ok(LoadedBackground {
        width: img.width(),
        height: img.height(),
        bytes,
    })
}

/// Encode image bytes as a data URL for persistence.
pub fn encode_data_url(bytes: &[u8]) -> String {
    let mime = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::WebP) => "image/webp",
        Ok(image::ImageFormat::Gif) => "image/gif",
        Ok(image::ImageFormat::Bmp) => "image/bmp",
        _ => "application/octet-stream",
    };
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Decode a data URL (or bare base64 payload) back into image bytes.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let payload = match url.strip_prefix("data:") {
        Some(rest) => {
            let (_, payload) = rest
                .split_once(";base64,")
                .ok_or_else(|| anyhow!("data URL is not base64-encoded"))?;
            payload
        }
        None => url,
    };
    let bytes = BASE64
        .decode(payload.trim())
        .context("invalid base64 in background image")?;
    if bytes.is_empty() {
        bail!("empty background image payload");
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 255]));
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_data_url_round_trip() {
        let bytes = tiny_png();
        let url = encode_data_url(&bytes);
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(decode_data_url(&url).unwrap(), bytes);
    }

    #[test]
    fn test_decode_accepts_bare_base64() {
        let bytes = tiny_png();
        let bare = BASE64.encode(&bytes);
        assert_eq!(decode_data_url(&bare).unwrap(), bytes);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_data_url("data:image/png;base64,!!!").is_err());
        assert!(decode_data_url("data:image/png,rawpayload").is_err());
    }

    #[test]
    fn test_load_background_rejects_non_image() {
        let path = std::env::temp_dir().join(format!(
            "thumbstudio-media-test-{}.png",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, b"definitely not a png").unwrap();
        assert!(load_background(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_background_reads_dimensions() {
        let path = std::env::temp_dir().join(format!(
            "thumbstudio-media-test-{}.png",
            uuid::Uuid::new_v4()
        ));
        std::fs::write(&path, tiny_png()).unwrap();
        let loaded = load_background(&path).unwrap();
        assert_eq!((loaded.width, loaded.height), (2, 2));
        let _ = std::fs::remove_file(&path);
    }
}
