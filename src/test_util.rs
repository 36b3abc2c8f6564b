use image::{DynamicImage, Rgb, RgbImage};
use std::path::PathBuf;
use usvg::fontdb;

use crate::font::load_font;
use crate::layout::TextMeasure;

/// An installed `.ttf` font with Latin glyphs, preferring upright regular
/// faces. `None` on machines without fonts.
pub(crate) fn system_font_path() -> Option<PathBuf> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let mut paths: Vec<PathBuf> = db
        .faces()
        .filter_map(|face| match &face.source {
            fontdb::Source::File(path) => Some(path.clone()),
            _ => None,
        })
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("ttf"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort_by_key(|path| (is_styled(path), path.clone()));
    paths.dedup();
    paths.into_iter().find(|path| {
        load_font(path)
            .map(|font| font.measure("Hx", 20.0).height > 0)
            .unwrap_or(false)
    })
}

/// An installed font covering `你好世界`, any format `load_font` reads.
pub(crate) fn cjk_font_path() -> Option<PathBuf> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    let mut paths: Vec<PathBuf> = db
        .faces()
        .filter_map(|face| match &face.source {
            fontdb::Source::File(path) => Some(path.clone()),
            _ => None,
        })
        .collect();
    paths.sort_by_key(|path| (is_styled(path), path.clone()));
    paths.dedup();
    paths.into_iter().find(|path| {
        load_font(path)
            .map(|font| font.missing_glyphs("你好世界").is_empty())
            .unwrap_or(false)
    })
}

fn is_styled(path: &std::path::Path) -> bool {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    ["bold", "italic", "oblique", "light", "condensed", "mono", "black", "thin"]
        .iter()
        .any(|style| name.contains(style))
}

pub(crate) fn solid_image(width: u32, height: u32, color: Rgb<u8>) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
}
