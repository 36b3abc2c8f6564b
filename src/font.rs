use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ttf_parser::{Face, GlyphId, name_id};

use crate::error::CaptionError;
use crate::layout::{TextExtent, TextMeasure};

/// A parsed typeface. Sizes are supplied per measurement, so one instance
/// serves every size the fit loop tries.
#[derive(Clone)]
pub struct CaptionFont {
    data: Arc<Vec<u8>>,
    face_index: u32,
    units_per_em: u16,
    ascender: i16,
    family: Option<String>,
}

impl CaptionFont {
    pub fn family(&self) -> Option<&str> {
        self.family.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn face_index(&self) -> u32 {
        self.face_index
    }

    /// Characters in `text` the face has no glyph for. There is no fallback
    /// font, so these draw as `.notdef`.
    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        let Ok(face) = Face::parse(&self.data, self.face_index) else {
            return Vec::new();
        };
        let mut missing = Vec::new();
        for ch in text.chars() {
            if !ch.is_whitespace() && face.glyph_index(ch).is_none() && !missing.contains(&ch) {
                missing.push(ch);
            }
        }
        missing
    }

    /// Distance from the drawing origin to the baseline at `font_size`.
    pub fn ascent_px(&self, font_size: f32) -> f32 {
        self.ascender as f32 * self.scale(font_size)
    }

    fn scale(&self, font_size: f32) -> f32 {
        font_size / self.units_per_em.max(1) as f32
    }
}

impl std::fmt::Debug for CaptionFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptionFont")
            .field("family", &self.family)
            .field("face_index", &self.face_index)
            .field("units_per_em", &self.units_per_em)
            .finish()
    }
}

pub fn load_font(path: &Path) -> Result<CaptionFont> {
    let data =
        fs::read(path).with_context(|| format!("failed to read font: {}", path.display()))?;
    load_font_from_data(data)
        .map_err(|err| anyhow!("failed to parse font: {} ({})", path.display(), err))
}

pub fn load_font_from_data(data: Vec<u8>) -> Result<CaptionFont> {
    let count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
    for index in 0..count {
        let Ok(face) = Face::parse(&data, index) else {
            continue;
        };
        let units_per_em = face.units_per_em().max(1);
        let ascender = face.ascender();
        let family = extract_family_name(&face);
        return Ok(CaptionFont {
            data: Arc::new(data),
            face_index: index,
            units_per_em,
            ascender,
            family,
        });
    }
    Err(anyhow!("failed to parse font data"))
}

/// Picks the font file for a batch: the lexicographically first `.ttf`
/// file name in `dir`.
pub fn discover_font(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list font dir: {}", dir.display()))?;
    let mut candidates = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_ttf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("ttf"))
            .unwrap_or(false);
        if is_ttf {
            candidates.push(path);
        }
    }
    candidates.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    candidates.into_iter().next().ok_or_else(|| {
        CaptionError::NoFont {
            dir: dir.to_path_buf(),
        }
        .into()
    })
}

impl TextMeasure for CaptionFont {
    fn measure(&self, text: &str, font_size: f32) -> TextExtent {
        let Ok(face) = Face::parse(&self.data, self.face_index) else {
            return TextExtent::default();
        };
        let scale = self.scale(font_size);
        let mut advance = 0u32;
        let mut ink_top: Option<i16> = None;
        let mut ink_bottom: Option<i16> = None;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
            let glyph_advance = face.glyph_hor_advance(glyph).unwrap_or(0);
            advance = advance.saturating_add(glyph_advance as u32);
            if let Some(rect) = face.glyph_bounding_box(glyph) {
                ink_top = Some(ink_top.map_or(rect.y_max, |top| top.max(rect.y_max)));
                ink_bottom = Some(ink_bottom.map_or(rect.y_min, |bottom| bottom.min(rect.y_min)));
            }
        }
        let width = (advance as f32 * scale).round() as u32;
        match (ink_top, ink_bottom) {
            (Some(top), Some(bottom)) => {
                let height = ((top as f32 - bottom as f32) * scale).ceil().max(0.0) as u32;
                let offset = ((self.ascender as f32 - top as f32) * scale).round() as i32;
                TextExtent {
                    width,
                    height,
                    top: offset,
                }
            }
            _ => TextExtent {
                width,
                height: 0,
                top: 0,
            },
        }
    }
}

fn extract_family_name(face: &Face<'_>) -> Option<String> {
    let mut fallback = None;
    for name in face.names() {
        if name.name_id == name_id::TYPOGRAPHIC_FAMILY {
            if let Some(value) = name.to_string() {
                return Some(value);
            }
        } else if name.name_id == name_id::FAMILY && fallback.is_none() {
            fallback = name.to_string();
        }
    }
    fallback
}
