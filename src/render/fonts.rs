// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Font resolution backend.
//!
//! Layers carry opaque family names; the [`FontStore`] maps
//! (family, weight) pairs to parsed [`fontdue::Font`]s. Fonts are
//! registered from raw TTF/OTF bytes, either explicitly or through a
//! best-effort scan of the conventional system font directories. The
//! compositor never embeds font data.

use crate::models::layer::FontWeight;
use anyhow::{anyhow, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Directories probed by [`FontStore::load_system_fonts`].
const SYSTEM_FONT_DIRS: [&str; 6] = [
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "/System/Library/Fonts/Supplemental",
    "C:\\Windows\\Fonts",
];

/// Cap on fonts parsed during a system scan.
const MAX_SYSTEM_FONTS: usize = 512;

/// Registry of parsed fonts keyed by (lowercased family, numeric weight).
///
/// A BTreeMap keeps resolution order stable, so fallback picks are
/// deterministic across runs with the same registered set.
#[derive(Default)]
pub struct FontStore {
    fonts: BTreeMap<(String, u16), fontdue::Font>,
    /// Families already reported as substituted, so the log carries one
    /// line per missing family instead of one per frame.
    substituted: Mutex<BTreeSet<String>>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and register a font under an explicit family and weight.
    pub fn register(&mut self, family: &str, weight: FontWeight, bytes: &[u8]) -> Result<()> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| anyhow!("failed to parse font {family:?}: {e}"))?;
        self.fonts
            .insert((family.to_lowercase(), weight.numeric()), font);
        Ok(())
    }

    /// Resolve a family/weight pair. Falls back from the exact weight to
    /// any weight of the family, then to the first registered font, so
    /// text still renders when the requested family is not installed.
    /// Returns `None` only when the store is empty (the measurement
    /// failure case: the caller skips the layer's background box and the
    /// glyph passes degrade to no-ops).
    pub fn resolve(&self, family: &str, weight: FontWeight) -> Option<&fontdue::Font> {
        let key = (family.to_lowercase(), weight.numeric());
        if let Some(font) = self.fonts.get(&key) {
            return Some(font);
        }
        if let Some((_, font)) = self
            .fonts
            .range((key.0.clone(), 0)..(key.0.clone(), u16::MAX))
            .next()
        {
            return Some(font);
        }
        let ((fallback_family, fallback_weight), font) = self.fonts.iter().next()?;
        if let Ok(mut seen) = self.substituted.lock() {
            if seen.insert(key.0) {
                log::debug!(
                    "font family {family:?} not registered; substituting {fallback_family:?} weight {fallback_weight}"
                );
            }
        }
        Some(font)
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Scan the conventional system font directories and register every
    /// readable TTF/OTF, keying family and weight off the file name
    /// (fontdue exposes no name table). Failures are logged and skipped.
    pub fn load_system_fonts(&mut self) {
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let mut dirs: Vec<PathBuf> = SYSTEM_FONT_DIRS.iter().map(PathBuf::from).collect();
        if let Some(home) = home {
            dirs.push(home.join(".local/share/fonts"));
            dirs.push(home.join(".fonts"));
        }

        let mut files = Vec::new();
        for dir in dirs {
            collect_font_files(&dir, &mut files, 0);
        }
        files.sort();
        files.truncate(MAX_SYSTEM_FONTS);

        let mut loaded = 0usize;
        for path in &files {
            let Some((family, weight)) = family_and_weight_from_path(path) else {
                continue;
            };
            match std::fs::read(path) {
                Ok(bytes) => match self.register(&family, weight, &bytes) {
                    Ok(()) => loaded += 1,
                    Err(e) => log::debug!("skipping {}: {e}", path.display()),
                },
                Err(e) => log::debug!("unreadable font {}: {e}", path.display()),
            }
        }
        log::info!("font store: {loaded} system fonts registered");
    }
}

fn collect_font_files(dir: &Path, out: &mut Vec<PathBuf>, depth: usize) {
    if depth > 3 {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_font_files(&path, out, depth + 1);
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("ttf") | Some("otf") | Some("TTF") | Some("OTF")
        ) {
            out.push(path);
        }
    }
}

/// Derive (family, weight) from a font file name, e.g.
/// `Montserrat-Black.ttf` -> ("Montserrat", Black).
fn family_and_weight_from_path(path: &Path) -> Option<(String, FontWeight)> {
    let stem = path.file_stem()?.to_str()?;
    let family = stem.split(['-', '_']).next().unwrap_or(stem).to_string();
    if family.is_empty() {
        return None;
    }
    let lower = stem.to_lowercase();
    let weight = if lower.contains("black") || lower.contains("heavy") {
        FontWeight::Black
    } else if lower.contains("semibold") || lower.contains("demibold") {
        FontWeight::SemiBold
    } else if lower.contains("bold") {
        FontWeight::Bold
    } else {
        FontWeight::Regular
    };
    Some((family, weight))
}
