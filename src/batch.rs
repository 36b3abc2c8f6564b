use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::font::{discover_font, load_font};
use crate::layout::RenderOptions;
use crate::render::render_file;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff"];
const OUTPUT_EXTENSION: &str = "jpeg";
const NANOS_PER_SECOND: i128 = 1_000_000_000;

#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    pub render: RenderOptions,
    /// Record failing pairs and continue instead of aborting the batch.
    pub keep_going: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub processed: usize,
    pub written: Vec<PathBuf>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub image: PathBuf,
    pub caption: String,
    pub error: String,
}

/// Image files in `dir`, sorted by file name.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to list image dir: {}", dir.display()))?;
    let mut images = Vec::new();
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        if path.is_file() && has_image_extension(&path) {
            images.push(path);
        }
    }
    images.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// One caption per line. Blank lines are kept so pairing stays positional.
pub fn read_captions(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read captions: {}", path.display()))?;
    Ok(content.lines().map(|line| line.to_string()).collect())
}

/// A fresh `<seconds>.<nanoseconds>.jpeg` path in `dir`.
pub fn next_output_path(dir: &Path) -> PathBuf {
    let mut stamp = OffsetDateTime::now_utc().unix_timestamp_nanos();
    loop {
        let name = format!(
            "{}.{:09}.{}",
            stamp.div_euclid(NANOS_PER_SECOND),
            stamp.rem_euclid(NANOS_PER_SECOND),
            OUTPUT_EXTENSION
        );
        let path = dir.join(name);
        if !path.exists() {
            return path;
        }
        stamp += 1;
    }
}

/// Captions the first `min(images, captions)` images in `image_dir`, pairing
/// them with caption lines by position.
pub fn run_batch(
    image_dir: &Path,
    caption_file: &Path,
    font_dir: &Path,
    output_dir: &Path,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let images = list_images(image_dir)?;
    let captions = read_captions(caption_file)?;
    let font_path = discover_font(font_dir)?;
    let font = load_font(&font_path)?;
    info!("using font {}", font_path.display());
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let total = images.len().min(captions.len());
    let mut report = BatchReport::default();
    for (index, (image, caption)) in images.iter().zip(captions.iter()).enumerate() {
        let output = next_output_path(output_dir);
        report.processed += 1;
        match render_file(image, caption, &output, &font, &options.render) {
            Ok(_) => report.written.push(output),
            Err(err) if options.keep_going => {
                warn!("skipping {}: {:#}", image.display(), err);
                report.failures.push(BatchFailure {
                    image: image.clone(),
                    caption: caption.clone(),
                    error: format!("{:#}", err),
                });
            }
            Err(err) => return Err(err),
        }
        info!("completed {} of {}", index + 1, total);
    }
    Ok(report)
}
