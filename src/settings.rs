use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::layout::RenderOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub font_size: u32,
    pub line_spacing: u32,
    pub top_margin: u32,
    pub min_font_size: u32,
    pub keep_going: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            font_size: render.font_size,
            line_spacing: render.line_spacing,
            top_margin: render.top_margin,
            min_font_size: render.min_font_size,
            keep_going: false,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    render: Option<RenderSettings>,
    batch: Option<BatchSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct RenderSettings {
    font_size: Option<u32>,
    line_spacing: Option<u32>,
    top_margin: Option<u32>,
    min_font_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct BatchSettings {
    keep_going: Option<bool>,
}

/// Defaults, overlaid with `path` when given. The file is only read.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    let Some(path) = path else {
        return Ok(settings);
    };
    if !path.exists() {
        return Err(anyhow!("settings file not found: {}", path.display()));
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings: {}", path.display()))?;
    let parsed: SettingsFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse settings: {}", path.display()))?;
    settings.merge(parsed);
    Ok(settings)
}

impl Settings {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            font_size: self.font_size,
            line_spacing: self.line_spacing,
            top_margin: self.top_margin,
            min_font_size: self.min_font_size,
        }
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(render) = incoming.render {
            if let Some(size) = render.font_size {
                if size > 0 {
                    self.font_size = size;
                }
            }
            if let Some(spacing) = render.line_spacing {
                self.line_spacing = spacing;
            }
            if let Some(margin) = render.top_margin {
                self.top_margin = margin;
            }
            if let Some(size) = render.min_font_size {
                if size > 0 {
                    self.min_font_size = size;
                }
            }
        }
        if let Some(batch) = incoming.batch {
            if let Some(keep_going) = batch.keep_going {
                self.keep_going = keep_going;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_reference_flow() {
        let settings = load_settings(None).expect("settings");
        assert_eq!(settings.font_size, 80);
        assert_eq!(settings.line_spacing, 5);
        assert_eq!(settings.top_margin, 50);
        assert_eq!(settings.min_font_size, 10);
        assert!(!settings.keep_going);
    }

    #[test]
    fn file_overrides_only_given_keys() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("captions.toml");
        fs::write(
            &path,
            "[render]\nfont_size = 64\ntop_margin = 0\n\n[batch]\nkeep_going = true\n",
        )
        .expect("write settings");
        let settings = load_settings(Some(&path)).expect("settings");
        assert_eq!(settings.font_size, 64);
        assert_eq!(settings.top_margin, 0);
        assert_eq!(settings.line_spacing, 5);
        assert!(settings.keep_going);
    }

    #[test]
    fn zero_font_sizes_are_ignored() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("captions.toml");
        fs::write(&path, "[render]\nfont_size = 0\nmin_font_size = 0\n").expect("write");
        let settings = load_settings(Some(&path)).expect("settings");
        assert_eq!(settings.font_size, 80);
        assert_eq!(settings.min_font_size, 10);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let err = load_settings(Some(&dir.path().join("nope.toml"))).expect_err("missing");
        assert!(err.to_string().contains("settings file not found"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("captions.toml");
        fs::write(&path, "[render]\nfont_size = \"big\"\n").expect("write");
        assert!(load_settings(Some(&path)).is_err());
    }
}
