use tracing::debug;

use crate::caption::{is_blank, longest_fragment, split_fragments};
use crate::error::CaptionError;

pub const FONT_SIZE_STEP: u32 = 10;
const MAX_WIDTH_RATIO: f64 = 0.75;
const MIN_MARGIN_RATIO: f64 = 0.125;

/// Pixel extent of a rendered single-line string.
///
/// `top` is the offset of the first inked row below the drawing origin
/// (the ascender line); `height` spans from there to the lowest inked row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
    pub top: i32,
}

pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> TextExtent;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub font_size: u32,
    pub line_spacing: u32,
    pub top_margin: u32,
    pub min_font_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_size: 80,
            line_spacing: 5,
            top_margin: 50,
            min_font_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    pub y: i64,
    pub extent: TextExtent,
}

impl PlacedLine {
    /// Inked region as `(left, top, right, bottom)` in image coordinates.
    pub fn ink_box(&self) -> (i64, i64, i64, i64) {
        let left = self.x.floor() as i64;
        let top = self.y + self.extent.top as i64;
        (
            left,
            top,
            left + self.extent.width as i64,
            top + self.extent.height as i64,
        )
    }

    /// The line's extent anchored at the image origin instead of its drawn
    /// position. The background color is read from this region.
    pub fn sample_box(&self) -> (i64, i64, i64, i64) {
        let top = self.extent.top as i64;
        (
            0,
            top,
            self.extent.width as i64,
            top + self.extent.height as i64,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaptionLayout {
    pub font_size: u32,
    pub split: bool,
    pub lines: Vec<PlacedLine>,
    /// Cursor position after the last line, spacing included.
    pub bottom: i64,
}

impl CaptionLayout {
    pub fn check_fits_height(&self, image_height: u32) -> Result<(), CaptionError> {
        let limit = image_height as i64 - self.font_size as i64;
        if self.bottom > limit {
            return Err(CaptionError::Overflow {
                bottom: self.bottom,
                limit,
            });
        }
        Ok(())
    }
}

/// Whether a line `text_width` pixels wide is acceptable on an image
/// `image_width` pixels wide.
pub fn fits_width(text_width: u32, image_width: u32) -> bool {
    let text_width = text_width as f64;
    let image_width = image_width as f64;
    !(text_width > image_width * MAX_WIDTH_RATIO
        || image_width - text_width < image_width * MIN_MARGIN_RATIO)
}

/// Chooses the lines and the font size for `caption`.
///
/// A caption that fits as a whole stays one unsplit line. Otherwise it is
/// split into fragments and the size shrinks in `FONT_SIZE_STEP` steps
/// until the longest fragment fits.
pub fn fit_lines<M: TextMeasure>(
    caption: &str,
    measure: &M,
    image_width: u32,
    options: &RenderOptions,
) -> Result<(Vec<String>, u32, bool), CaptionError> {
    let mut font_size = options.font_size;
    let full = measure.measure(caption, font_size as f32);
    if fits_width(full.width, image_width) {
        return Ok((vec![caption.to_string()], font_size, false));
    }

    let fragments = split_fragments(caption);
    let longest = longest_fragment(&fragments).unwrap_or_default();
    let mut width = measure.measure(longest, font_size as f32).width;
    while !fits_width(width, image_width) {
        let next = font_size.saturating_sub(FONT_SIZE_STEP);
        if font_size < FONT_SIZE_STEP || next == 0 || next < options.min_font_size {
            return Err(CaptionError::FontTooSmall {
                size: font_size,
                min: options.min_font_size,
            });
        }
        font_size = next;
        debug!("font size changed to {}", font_size);
        width = measure.measure(longest, font_size as f32).width;
    }
    Ok((fragments, font_size, true))
}

/// Fits `caption` and stacks its non-blank lines from `top_margin` down,
/// each centered horizontally. The height limit is not checked here.
pub fn layout_caption<M: TextMeasure>(
    caption: &str,
    measure: &M,
    image_width: u32,
    options: &RenderOptions,
) -> Result<CaptionLayout, CaptionError> {
    let (lines, font_size, split) = fit_lines(caption, measure, image_width, options)?;

    let mut cursor = options.top_margin as i64;
    let mut placed = Vec::with_capacity(lines.len());
    for line in lines {
        if is_blank(&line) {
            continue;
        }
        let extent = measure.measure(&line, font_size as f32);
        let x = (image_width as f32 - extent.width as f32) / 2.0;
        placed.push(PlacedLine {
            text: line,
            x,
            y: cursor,
            extent,
        });
        cursor += extent.height as i64 + options.line_spacing as i64;
    }

    Ok(CaptionLayout {
        font_size,
        split,
        lines: placed,
        bottom: cursor,
    })
}
