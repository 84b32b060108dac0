// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! Project and template file (de)serialization.
//!
//! Projects save as JSON or YAML depending on the chosen extension.
//! Template files are JSON; loading accepts both the current tagged
//! schema and the legacy bare-array form.

use crate::models::project::{ProjectState, Template, TemplateFile};
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Save a project, picking the format from the file extension
/// (`.yaml`/`.yml` for YAML, anything else JSON).
pub fn save_project(project: &ProjectState, path: &Path) -> Result<()> {
    let text = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::to_string(project)?,
        _ => serde_json::to_string_pretty(project)?,
    };
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load a project saved by [`save_project`]. Canvas dimensions are
/// re-derived from the aspect-ratio tag.
pub fn load_project(path: &Path) -> Result<ProjectState> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut project: ProjectState = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)?,
        Some("json") => serde_json::from_str(&text)?,
        other => bail!("unsupported project file extension: {other:?}"),
    };
    project.normalize();
    Ok(project)
}

/// Save a template as JSON in the current schema.
pub fn save_template(template: &Template, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(template)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load a template file, accepting the legacy bare-array form and
/// normalizing it to the current schema.
pub fn load_template(path: &Path) -> Result<Template> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: TemplateFile = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid template", path.display()))?;
    Ok(parsed.into_template())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::layer::TextLayer;
    use crate::models::project::AspectRatio;
    use std::path::PathBuf;

    fn temp_path(ext: &str) -> PathBuf {
        std::env::temp_dir().join(format!("thumbstudio-io-test-{}.{ext}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_project_json_round_trip() {
        let project = ProjectState::new(
            Some("data:image/png;base64,AAAA".to_string()),
            vec![TextLayer::spawn(1280, 720)],
            AspectRatio::Landscape,
        );
        let path = temp_path("json");
        save_project(&project, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"backgroundImage\""));
        assert!(text.contains("\"aspectRatio\": \"16:9\""));

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.layers.len(), 1);
        assert_eq!(loaded.canvas_width, 1280);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_project_yaml_round_trip() {
        let project = ProjectState::new(None, vec![TextLayer::spawn(720, 1280)], AspectRatio::Portrait);
        let path = temp_path("yaml");
        save_project(&project, &path).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.aspect_ratio, AspectRatio::Portrait);
        assert_eq!((loaded.canvas_width, loaded.canvas_height), (720, 1280));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_normalizes_stale_dimensions() {
        let mut project = ProjectState::new(None, Vec::new(), AspectRatio::Portrait);
        project.canvas_width = 12345; // stale redundant copy
        let path = temp_path("json");
        std::fs::write(&path, serde_json::to_string(&project).unwrap()).unwrap();
        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.canvas_width, 720);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_legacy_template_file_loads() {
        let layers = vec![TextLayer::spawn(1280, 720)];
        let path = temp_path("json");
        std::fs::write(&path, serde_json::to_string(&layers).unwrap()).unwrap();
        let template = load_template(&path).unwrap();
        assert_eq!(template.aspect_ratio, AspectRatio::Landscape);
        assert_eq!(template.layers.len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_template_round_trip() {
        let template = Template::from_design(&[TextLayer::spawn(720, 1280)], AspectRatio::Portrait);
        let path = temp_path("json");
        save_template(&template, &path).unwrap();
        let loaded = load_template(&path).unwrap();
        assert_eq!(loaded.aspect_ratio, AspectRatio::Portrait);
        let _ = std::fs::remove_file(&path);
    }
}
