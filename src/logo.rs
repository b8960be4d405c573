//! Logo compositing: the exclusion zone carved out of the data modules, the
//! clip shape, and embedding the logo itself either as inline vector markup
//! or as a re-encoded raster.
//!
//! Every failure here is recoverable. Callers get a [`LogoError`] and drop
//! the logo; the rest of the document renders as usual.

use crate::config::{LogoOptions, LogoShape};
use crate::frame::escape_xml;
use crate::geometry::{num, num_with_precision};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// Share of the drawing area a logo may actually cover; the rest of its
/// nominal size is left to the modules.
const LOGO_AREA_FACTOR: f32 = 0.8;
/// Corner radius of the `rounded` clip, as a fraction of its side.
const ROUNDED_CLIP_RATIO: f32 = 0.15;
/// Raster logos are encoded at this many pixels per output unit.
const RASTER_DENSITY: f32 = 2.0;

pub const LOGO_CLIP_ID: &str = "logo-clip";

static SVG_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<svg\b([^>]*)>").unwrap());
static VIEWBOX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\bviewBox\s*=\s*["']([^"']+)["']"#).unwrap());
static WIDTH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)width\s*=\s*["']\s*([0-9.]+)"#).unwrap());
static HEIGHT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:^|\s)height\s*=\s*["']\s*([0-9.]+)"#).unwrap());

#[derive(Debug, thiserror::Error)]
pub enum LogoError {
    #[error("logo load timed out after {0:?}")]
    Timeout(Duration),
    #[error("logo could not be loaded: {0}")]
    Load(String),
    #[error("logo could not be decoded: {0}")]
    Decode(String),
    #[error("logo markup could not be parsed: {0}")]
    Parse(String),
    #[error("logo source is empty")]
    Empty,
}

/// Square region, in drawing coordinates, withheld from the data modules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionArea {
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

impl ExclusionArea {
    /// True when the box overlaps the area by any positive amount.
    pub fn overlaps(&self, x: f32, y: f32, width: f32, height: f32) -> bool {
        x < self.x + self.size && x + width > self.x && y < self.y + self.size && y + height > self.y
    }

    /// The logo box: the area shrunk by `margin` on every side.
    pub fn inset(&self, margin: f32) -> ExclusionArea {
        let margin = margin.clamp(0.0, self.size / 2.0);
        ExclusionArea {
            x: self.x + margin,
            y: self.y + margin,
            size: self.size - 2.0 * margin,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.size / 2.0, self.y + self.size / 2.0)
    }
}

/// Exclusion square for a logo covering `logo_size` of a `canvas_size`
/// drawing area, centered and clamped to the drawing area.
pub fn compute_exclusion_area(logo_size: f32, margin: f32, canvas_size: f32) -> Option<ExclusionArea> {
    if logo_size <= 0.0 || canvas_size <= 0.0 {
        return None;
    }
    let side = (logo_size * canvas_size * LOGO_AREA_FACTOR + 2.0 * margin).min(canvas_size);
    let offset = (canvas_size - side) / 2.0;
    Some(ExclusionArea {
        x: offset,
        y: offset,
        size: side,
    })
}

pub fn is_cell_excluded(row: usize, col: usize, cell_size: f32, area: Option<&ExclusionArea>) -> bool {
    let Some(area) = area else {
        return false;
    };
    area.overlaps(col as f32 * cell_size, row as f32 * cell_size, cell_size, cell_size)
}

fn shape_element(shape: LogoShape, area: &ExclusionArea, fill: Option<&str>) -> String {
    let fill = fill
        .map(|f| format!(" fill=\"{}\"", escape_xml(f)))
        .unwrap_or_default();
    match shape {
        LogoShape::Circle => {
            let (cx, cy) = area.center();
            format!(
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{fill}/>",
                num(cx),
                num(cy),
                num(area.size / 2.0)
            )
        }
        LogoShape::Rounded => {
            let r = num(area.size * ROUNDED_CLIP_RATIO);
            format!(
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{r}\" ry=\"{r}\"{fill}/>",
                num(area.x),
                num(area.y),
                num(area.size),
                num(area.size)
            )
        }
        LogoShape::Square => format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{fill}/>",
            num(area.x),
            num(area.y),
            num(area.size),
            num(area.size)
        ),
    }
}

/// `<clipPath>` for the logo box; square logos need none.
pub fn clip_path_def(shape: LogoShape, logo_box: &ExclusionArea, id: &str) -> Option<String> {
    match shape {
        LogoShape::Square => None,
        _ => Some(format!(
            "<clipPath id=\"{id}\">{}</clipPath>",
            shape_element(shape, logo_box, None)
        )),
    }
}

/// Filled backdrop behind the logo, matching its shape over the whole
/// exclusion area.
pub fn backdrop(shape: LogoShape, area: &ExclusionArea, color: &str) -> String {
    shape_element(shape, area, Some(color))
}

/// Where a logo comes from, decided from the configured URL.
#[derive(Debug, Clone, PartialEq)]
pub enum LogoSource {
    Vector(String),
    Raster(String),
}

impl LogoSource {
    pub fn parse(url: &str) -> Result<Self, LogoError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(LogoError::Empty);
        }
        if is_inline_svg(url) {
            return Ok(Self::Vector(url.to_string()));
        }
        if let Some(rest) = url.strip_prefix("data:image/svg+xml") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| LogoError::Parse("data URI without payload".to_string()))?;
            let markup = if header.contains(";base64") {
                let bytes = STANDARD
                    .decode(payload.trim())
                    .map_err(|err| LogoError::Decode(err.to_string()))?;
                String::from_utf8(bytes).map_err(|err| LogoError::Decode(err.to_string()))?
            } else {
                percent_decode_str(payload)
                    .decode_utf8()
                    .map_err(|err| LogoError::Decode(err.to_string()))?
                    .into_owned()
            };
            return Ok(Self::Vector(markup));
        }
        let is_remote = url.starts_with("http://") || url.starts_with("https://");
        if !is_remote && url.to_ascii_lowercase().ends_with(".svg") {
            let markup = std::fs::read_to_string(url)
                .map_err(|err| LogoError::Load(format!("{url}: {err}")))?;
            return Ok(Self::Vector(markup));
        }
        Ok(Self::Raster(url.to_string()))
    }
}

/// True when `text` is SVG markup: an `<svg` root, optionally preceded by
/// an XML declaration, processing instructions, comments or a doctype.
fn is_inline_svg(text: &str) -> bool {
    let mut rest = text.trim_start();
    loop {
        let close = if rest.starts_with("<?") {
            "?>"
        } else if rest.starts_with("<!--") {
            "-->"
        } else if rest.starts_with("<!") {
            ">"
        } else {
            return rest.starts_with("<svg");
        };
        match rest.find(close) {
            Some(end) => rest = rest[end + close.len()..].trim_start(),
            None => return false,
        }
    }
}

/// Inline `markup` (an `<svg>` document) scaled to fit `logo_box`.
pub fn embed_vector_logo(markup: &str, logo_box: &ExclusionArea) -> Result<String, LogoError> {
    let open = SVG_OPEN_RE
        .captures(markup)
        .ok_or_else(|| LogoError::Parse("no <svg> root element".to_string()))?;
    let attrs = open.get(1).map(|m| m.as_str()).unwrap_or_default();
    let open_end = open.get(0).map(|m| m.end()).unwrap_or_default();
    if attrs.trim_end().ends_with('/') {
        return Err(LogoError::Empty);
    }
    let close = markup
        .rfind("</svg>")
        .filter(|&idx| idx >= open_end)
        .ok_or_else(|| LogoError::Parse("unterminated <svg> element".to_string()))?;
    let content = markup[open_end..close].trim();
    if content.is_empty() {
        return Err(LogoError::Empty);
    }

    let (vx, vy, vw, vh) = intrinsic_view_box(attrs)?;
    let scale = (logo_box.size / vw).min(logo_box.size / vh);
    let tx = logo_box.x + (logo_box.size - vw * scale) / 2.0 - vx * scale;
    let ty = logo_box.y + (logo_box.size - vh * scale) / 2.0 - vy * scale;
    Ok(format!(
        "<g transform=\"translate({} {}) scale({})\">{content}</g>",
        num(tx),
        num(ty),
        num_with_precision(scale, 4)
    ))
}


fn intrinsic_view_box(attrs: &str) -> Result<(f32, f32, f32, f32), LogoError> {
    if let Some(caps) = VIEWBOX_RE.captures(attrs) {
        let values: Vec<f32> = caps[1]
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .map_err(|err| LogoError::Parse(format!("viewBox: {err}")))?;
        if let [x, y, w, h] = values[..]
            && w > 0.0
            && h > 0.0
        {
            return Ok((x, y, w, h));
        }
        return Err(LogoError::Parse(format!("bad viewBox '{}'", &caps[1])));
    }
    let dimension = |re: &Regex| -> Option<f32> {
        re.captures(attrs)
            .and_then(|caps| caps[1].parse::<f32>().ok())
            .filter(|v| *v > 0.0)
    };
    match (dimension(&WIDTH_RE), dimension(&HEIGHT_RE)) {
        (Some(w), Some(h)) => Ok((0.0, 0.0, w, h)),
        _ => Err(LogoError::Parse("no viewBox or size on <svg>".to_string())),
    }
}

/// Source of raster logo bytes. Implementations may block; the compositor
/// bounds them with a timeout.
pub trait RasterLoader: Send + Sync {
    fn load(&self, source: &str) -> Result<Vec<u8>, LogoError>;
}

/// Reads local files and base64 `data:` URIs. Remote URLs need a loader of
/// the caller's own.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileRasterLoader;

impl RasterLoader for FileRasterLoader {
    fn load(&self, source: &str) -> Result<Vec<u8>, LogoError> {
        if let Some(rest) = source.strip_prefix("data:") {
            let (header, payload) = rest
                .split_once(',')
                .ok_or_else(|| LogoError::Parse("data URI without payload".to_string()))?;
            if !header.ends_with(";base64") {
                return Err(LogoError::Decode("raster data URIs must be base64".to_string()));
            }
            return STANDARD
                .decode(payload.trim())
                .map_err(|err| LogoError::Decode(err.to_string()));
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return Err(LogoError::Load(format!("{source}: remote sources are not fetched")));
        }
        std::fs::read(Path::new(source)).map_err(|err| LogoError::Load(format!("{source}: {err}")))
    }
}

/// Run `loader` on a worker thread and wait at most `timeout` for it. A
/// result arriving after the deadline is dropped.
pub fn load_raster_with_timeout(
    loader: Arc<dyn RasterLoader>,
    source: &str,
    timeout: Duration,
) -> Result<Vec<u8>, LogoError> {
    let (tx, rx) = mpsc::channel();
    let source = source.to_string();
    thread::Builder::new()
        .name("logo-loader".to_string())
        .spawn(move || {
            let _ = tx.send(loader.load(&source));
        })
        .map_err(|err| LogoError::Load(err.to_string()))?;
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(LogoError::Timeout(timeout)),
        Err(RecvTimeoutError::Disconnected) => {
            Err(LogoError::Load("loader stopped without a result".to_string()))
        }
    }
}

/// Decode raster bytes, fit them into `logo_box`, and embed them as a PNG
/// data URI.
pub fn embed_raster_logo(bytes: &[u8], logo_box: &ExclusionArea) -> Result<String, LogoError> {
    let image = image::load_from_memory(bytes).map_err(|err| LogoError::Decode(err.to_string()))?;
    let target = (logo_box.size * RASTER_DENSITY).round().max(1.0) as u32;
    let fitted = image.resize(target, target, image::imageops::FilterType::Lanczos3);

    let mut png = Vec::new();
    fitted
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|err| LogoError::Decode(err.to_string()))?;

    let width = fitted.width() as f32 / RASTER_DENSITY;
    let height = fitted.height() as f32 / RASTER_DENSITY;
    let x = logo_box.x + (logo_box.size - width) / 2.0;
    let y = logo_box.y + (logo_box.size - height) / 2.0;
    Ok(format!(
        "<image x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid meet\" xlink:href=\"data:image/png;base64,{}\"/>",
        num(x),
        num(y),
        num(width),
        num(height),
        STANDARD.encode(&png)
    ))
}

/// Logo content for `options`, placed inside the box of `area`.
pub fn embed_logo(
    options: &LogoOptions,
    area: &ExclusionArea,
    loader: Arc<dyn RasterLoader>,
) -> Result<String, LogoError> {
    let logo_box = area.inset(options.margin);
    match LogoSource::parse(&options.url)? {
        LogoSource::Vector(markup) => embed_vector_logo(&markup, &logo_box),
        LogoSource::Raster(source) => {
            let timeout = Duration::from_millis(options.timeout_ms);
            let bytes = load_raster_with_timeout(loader, &source, timeout)?;
            embed_raster_logo(&bytes, &logo_box)
        }
    }
}
