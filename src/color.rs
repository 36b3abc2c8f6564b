use image::DynamicImage;
use image::imageops::{self, FilterType};

const SAMPLE_GRID: u32 = 32;

/// The two colors a caption can be drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    White,
    Black,
}

impl TextColor {
    /// Light text on dark backgrounds, dark text on light ones.
    pub fn for_brightness(brightness: f32) -> Self {
        if brightness > 0.5 {
            TextColor::Black
        } else {
            TextColor::White
        }
    }

    pub fn svg(self) -> &'static str {
        match self {
            TextColor::White => "#ffffff",
            TextColor::Black => "#000000",
        }
    }
}

/// Average RGB of the region `(left, top, right, bottom)` after resampling
/// it to a small grid. Regions that miss the image entirely average black.
pub fn dominant_color(image: &DynamicImage, region: (i64, i64, i64, i64)) -> [u8; 3] {
    let (width, height) = (image.width() as i64, image.height() as i64);
    let (left, top, right, bottom) = region;
    let left = left.clamp(0, width);
    let right = right.clamp(0, width);
    let top = top.clamp(0, height);
    let bottom = bottom.clamp(0, height);
    if right <= left || bottom <= top {
        return [0, 0, 0];
    }

    let cropped = image
        .crop_imm(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        )
        .to_rgb8();
    let grid = imageops::resize(&cropped, SAMPLE_GRID, SAMPLE_GRID, FilterType::Lanczos3);

    let mut sums = [0u64; 3];
    for pixel in grid.pixels() {
        for (sum, channel) in sums.iter_mut().zip(pixel.0) {
            *sum += channel as u64;
        }
    }
    let count = (SAMPLE_GRID * SAMPLE_GRID) as u64;
    [
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
    ]
}

/// Mean of the normalized channels, in `0.0..=1.0`.
pub fn brightness(color: [u8; 3]) -> f32 {
    color.iter().map(|c| *c as f32 / 255.0).sum::<f32>() / 3.0
}
