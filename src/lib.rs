use anyhow::Result;
use std::path::PathBuf;

pub mod batch;
pub mod caption;
pub mod color;
pub mod error;
pub mod font;
pub mod layout;
pub mod logging;
pub mod render;
pub mod settings;
#[cfg(test)]
mod test_util;

pub use batch::{BatchFailure, BatchOptions, BatchReport, run_batch};
pub use color::TextColor;
pub use error::CaptionError;
pub use font::{CaptionFont, discover_font, load_font};
pub use layout::{RenderOptions, TextExtent, TextMeasure};
pub use render::{RenderResult, render_caption, render_file};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub image_dir: PathBuf,
    pub caption_file: PathBuf,
    pub font_dir: PathBuf,
    pub output_dir: PathBuf,
    pub settings_path: Option<PathBuf>,
    pub font_size: Option<u32>,
    pub line_spacing: Option<u32>,
    pub top_margin: Option<u32>,
    pub min_font_size: Option<u32>,
    pub keep_going: bool,
}

/// Resolves settings (defaults, then the optional file, then explicit
/// overrides) and runs the batch.
pub fn run(config: Config) -> Result<BatchReport> {
    let options = resolve_options(&config)?;
    run_batch(
        &config.image_dir,
        &config.caption_file,
        &config.font_dir,
        &config.output_dir,
        &options,
    )
}

fn resolve_options(config: &Config) -> Result<BatchOptions> {
    let settings = settings::load_settings(config.settings_path.as_deref())?;
    let mut render = settings.render_options();
    if let Some(size) = config.font_size.filter(|size| *size > 0) {
        render.font_size = size;
    }
    if let Some(spacing) = config.line_spacing {
        render.line_spacing = spacing;
    }
    if let Some(margin) = config.top_margin {
        render.top_margin = margin;
    }
    if let Some(size) = config.min_font_size.filter(|size| *size > 0) {
        render.min_font_size = size;
    }
    Ok(BatchOptions {
        render,
        keep_going: config.keep_going || settings.keep_going,
    })
}
