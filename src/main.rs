use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "caption-overlay",
    version,
    about = "Draw text captions onto a directory of images"
)]
struct Cli {
    /// Directory of images (jpg/jpeg/png/gif/bmp/tiff)
    image_dir: PathBuf,

    /// Text file with one caption per line
    caption_file: PathBuf,

    /// Directory holding the .ttf font (first by name is used)
    font_dir: PathBuf,

    /// Directory to write captioned .jpeg files into
    output_dir: PathBuf,

    /// Starting font size in pixels (default: 80)
    #[arg(long = "font-size", value_parser = clap::value_parser!(u32).range(1..))]
    font_size: Option<u32>,

    /// Extra pixels between lines (default: 5)
    #[arg(long = "line-spacing")]
    line_spacing: Option<u32>,

    /// Pixels above the first line (default: 50)
    #[arg(long = "top-margin")]
    top_margin: Option<u32>,

    /// Smallest font size the fit loop may shrink to (default: 10)
    #[arg(long = "min-font-size", value_parser = clap::value_parser!(u32).range(1..))]
    min_font_size: Option<u32>,

    /// Record failing images and continue with the rest
    #[arg(long = "keep-going")]
    keep_going: bool,

    /// Print the batch report as JSON
    #[arg(long = "json")]
    json: bool,

    /// Read render settings from a TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    caption_overlay::logging::init(cli.verbose)?;

    let start = Instant::now();
    let report = caption_overlay::run(caption_overlay::Config {
        image_dir: cli.image_dir,
        caption_file: cli.caption_file,
        font_dir: cli.font_dir,
        output_dir: cli.output_dir,
        settings_path: cli.read_settings,
        font_size: cli.font_size,
        line_spacing: cli.line_spacing,
        top_margin: cli.top_margin,
        min_font_size: cli.min_font_size,
        keep_going: cli.keep_going,
    })?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    for failure in &report.failures {
        eprintln!(
            "warning: {} was not captioned: {}",
            failure.image.display(),
            failure.error
        );
    }
    println!(
        "completed {} of {} in {:.2}s",
        report.written.len(),
        report.processed,
        start.elapsed().as_secs_f64()
    );
    Ok(())
}
