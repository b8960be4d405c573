use crate::config::{ErrorCorrection, FrameStyle, LogoOptions, StyleOptions, load_config};
use crate::preview::render_roundness_preview;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use qrcode::{EcLevel, QrCode};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qrart", version, about = "Styled QR code renderer (editable SVG or PNG)")]
pub struct Args {
    /// Text to encode. Falls back to --input, then stdin
    #[arg(short = 'd', long = "data")]
    pub data: Option<String>,

    /// File holding the text to encode, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "output-format", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Style config file (JSON or JSON5)
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Side of the QR drawing area
    #[arg(short = 's', long = "size")]
    pub size: Option<f32>,

    /// Light margin around the drawing area
    #[arg(short = 'q', long = "quiet-zone")]
    pub quiet_zone: Option<f32>,

    /// Logo: inline SVG, data URI, or file path
    #[arg(long = "logo")]
    pub logo: Option<String>,

    /// Frame label; adds a bottom frame when the config has none
    #[arg(long = "label")]
    pub label: Option<String>,

    /// Render the rect preview with 0-100 continuous roundness instead
    #[arg(long = "preview-roundness")]
    pub preview_roundness: Option<f32>,

    /// PNG pixels per output unit
    #[arg(long = "scale", default_value_t = 1.0)]
    pub scale: f32,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .try_init();

    let args = Args::parse();
    let mut options = load_config(args.config.as_deref())?;
    apply_overrides(&mut options, &args);

    let text = match &args.data {
        Some(data) => data.clone(),
        None => read_input(args.input.as_deref())?,
    };
    if text.is_empty() {
        return Err(anyhow::anyhow!("Nothing to encode"));
    }

    let code = QrCode::with_error_correction_level(
        text.as_bytes(),
        ec_level(options.effective_error_correction()),
    )?;
    tracing::debug!(modules = code.width(), "encoded input");

    let svg = match args.preview_roundness {
        Some(roundness) => render_roundness_preview(&code, &options, roundness),
        None => render_svg(&code, &options),
    };

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, args.scale)?;
        }
    }
    Ok(())
}

fn apply_overrides(options: &mut StyleOptions, args: &Args) {
    if let Some(size) = args.size {
        options.size = size;
    }
    if let Some(quiet_zone) = args.quiet_zone {
        options.quiet_zone = quiet_zone;
    }
    if let Some(url) = &args.logo {
        let mut logo = options.logo.take().unwrap_or_default();
        logo.url = url.clone();
        options.logo = Some(logo);
    }
    if let Some(label) = &args.label {
        options.frame.label = Some(label.clone());
        if options.frame.style == FrameStyle::None {
            options.frame.style = FrameStyle::Bottom;
        }
    }
}

fn ec_level(level: ErrorCorrection) -> EcLevel {
    match level {
        ErrorCorrection::L => EcLevel::L,
        ErrorCorrection::M => EcLevel::M,
        ErrorCorrection::Q => EcLevel::Q,
        ErrorCorrection::H => EcLevel::H,
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    let mut buf = String::new();
    match path {
        Some(path) if path != Path::new("-") => {
            buf = std::fs::read_to_string(path)?;
        }
        _ => {
            io::stdin().read_to_string(&mut buf)?;
        }
    }
    Ok(buf.trim_end_matches(['\r', '\n']).to_string())
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, scale: f32) -> Result<()> {
    crate::render::write_output_png(svg, output, scale)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _scale: f32) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the 'png' feature"))
}
