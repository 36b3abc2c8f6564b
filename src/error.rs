use std::path::PathBuf;

/// Failures raised by the caption pipeline itself.
///
/// I/O and decoding problems travel as `anyhow::Error` with context; these
/// variants are the ones a caller may want to match on.
#[derive(Debug, thiserror::Error)]
pub enum CaptionError {
    #[error("text is too long to fit in the image (bottom {bottom}px > limit {limit}px)")]
    Overflow { bottom: i64, limit: i64 },

    #[error("caption does not fit at font size {size}; shrinking further goes below {min}")]
    FontTooSmall { size: u32, min: u32 },

    #[error("no .ttf font found in {}", dir.display())]
    NoFont { dir: PathBuf },

    #[error("failed to rasterize caption: {0}")]
    Rasterize(String),
}
