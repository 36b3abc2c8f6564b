use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use image::{DynamicImage, ImageFormat, RgbaImage};
use resvg::render;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use tiny_skia::Pixmap;
use tracing::{debug, info, warn};
use usvg::{Options, Tree, fontdb};

use crate::color::{TextColor, brightness, dominant_color};
use crate::error::CaptionError;
use crate::font::CaptionFont;
use crate::layout::{PlacedLine, RenderOptions, layout_caption};

/// A captioned image and the decisions made while drawing it.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub image: DynamicImage,
    pub font_size: u32,
    /// `None` when every line was blank and nothing was sampled.
    pub text_color: Option<TextColor>,
    pub lines: Vec<PlacedLine>,
}

/// Draws `caption` onto `image`.
///
/// The text color is sampled before anything is drawn, from the first
/// non-blank line's extent anchored at the image origin. Fails with
/// [`CaptionError::Overflow`] when the stacked lines run past
/// `height - font_size`. Only `font` is used for drawing; characters it
/// lacks draw as `.notdef`.
pub fn render_caption(
    image: DynamicImage,
    caption: &str,
    font: &CaptionFont,
    options: &RenderOptions,
) -> Result<RenderResult> {
    let (width, height) = (image.width(), image.height());
    let layout = layout_caption(caption, font, width, options)?;
    debug!(
        "caption layout: {} line(s) at font size {}",
        layout.lines.len(),
        layout.font_size
    );

    let text_color = layout.lines.first().map(|line| {
        let sample = dominant_color(&image, line.sample_box());
        let value = brightness(sample);
        let color = TextColor::for_brightness(value);
        debug!("background brightness {:.3} -> {:?} text", value, color);
        color
    });

    layout.check_fits_height(height)?;

    let Some(color) = text_color else {
        return Ok(RenderResult {
            image,
            font_size: layout.font_size,
            text_color: None,
            lines: layout.lines,
        });
    };

    for line in &layout.lines {
        let missing = font.missing_glyphs(&line.text);
        if !missing.is_empty() {
            warn!("font has no glyph for {:?} in {:?}", missing, line.text);
        }
    }

    let (db, family) = caption_fontdb(font)?;
    let ascent = font.ascent_px(layout.font_size as f32);
    let mut svg = String::new();
    push_svg_header(&mut svg, &image)?;
    svg.push_str(&text_elements(
        &layout.lines,
        layout.font_size,
        ascent,
        color,
        &family,
    ));
    svg.push_str("</svg>");

    let drawn = rasterize_svg(&svg, db)?;
    Ok(RenderResult {
        image: DynamicImage::ImageRgba8(drawn),
        font_size: layout.font_size,
        text_color: Some(color),
        lines: layout.lines,
    })
}

/// Opens `image_path`, captions it and writes the result to `output_path`.
/// Nothing is written when rendering fails.
pub fn render_file(
    image_path: &Path,
    caption: &str,
    output_path: &Path,
    font: &CaptionFont,
    options: &RenderOptions,
) -> Result<RenderResult> {
    let image = image::open(image_path)
        .with_context(|| format!("failed to open image: {}", image_path.display()))?;
    let result = render_caption(image, caption, font, options)
        .with_context(|| format!("failed to caption image: {}", image_path.display()))?;
    result
        .image
        .to_rgb8()
        .save(output_path)
        .with_context(|| format!("failed to write image: {}", output_path.display()))?;
    info!(
        "wrote {} (font size {}, {} line(s))",
        output_path.display(),
        result.font_size,
        result.lines.len()
    );
    Ok(result)
}

fn push_svg_header(svg: &mut String, image: &DynamicImage) -> Result<()> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .with_context(|| "failed to encode base image")?;
    let data_uri = format!("data:image/png;base64,{}", BASE64.encode(&png));
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = image.width(),
        h = image.height()
    ));
    svg.push_str(&format!(
        r#"<image href="{uri}" xlink:href="{uri}" x="0" y="0" width="{w}" height="{h}" preserveAspectRatio="none" image-rendering="optimizeSpeed"/>"#,
        uri = data_uri,
        w = image.width(),
        h = image.height()
    ));
    Ok(())
}

fn text_elements(
    lines: &[PlacedLine],
    font_size: u32,
    ascent: f32,
    color: TextColor,
    family: &str,
) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-size="{size}" fill="{color}" font-family="{family}" xml:space="preserve">{text}</text>"#,
            x = line.x,
            y = line.y as f32 + ascent,
            size = font_size,
            color = color.svg(),
            family = escape_xml(family),
            text = escape_xml(&line.text)
        ));
    }
    out
}

/// A font database holding only the caption font, with every generic family
/// pointed at it, and the family name text elements should use.
fn caption_fontdb(font: &CaptionFont) -> Result<(fontdb::Database, String)> {
    let mut db = fontdb::Database::new();
    db.load_font_data(font.data().to_vec());
    let family = db
        .faces()
        .find(|face| face.index == font.face_index())
        .or_else(|| db.faces().next())
        .and_then(|face| face.families.first().map(|(name, _)| name.clone()))
        .or_else(|| font.family().map(str::to_string))
        .ok_or_else(|| CaptionError::Rasterize("caption font has no family name".to_string()))?;
    db.set_serif_family(family.clone());
    db.set_sans_serif_family(family.clone());
    db.set_cursive_family(family.clone());
    db.set_fantasy_family(family.clone());
    db.set_monospace_family(family.clone());
    Ok((db, family))
}

fn rasterize_svg(svg: &str, db: fontdb::Database) -> Result<RgbaImage> {
    let options = Options {
        fontdb: Arc::new(db),
        ..Options::default()
    };
    let tree =
        Tree::from_str(svg, &options).map_err(|err| CaptionError::Rasterize(err.to_string()))?;
    let size = tree.size().to_int_size();
    let mut pixmap = Pixmap::new(size.width(), size.height())
        .ok_or_else(|| CaptionError::Rasterize("empty SVG size".to_string()))?;
    let mut pixmap_mut = pixmap.as_mut();
    render(&tree, tiny_skia::Transform::identity(), &mut pixmap_mut);

    let mut raw = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        raw.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }
    let image = RgbaImage::from_raw(size.width(), size.height(), raw).ok_or_else(|| {
        CaptionError::Rasterize("failed to build image buffer from SVG".to_string())
    })?;
    Ok(image)
}

fn escape_xml(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
