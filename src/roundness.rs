//! Continuous corner rounding for rect-based previews.
//!
//! This pass edits an already rendered document: every module `<rect>`
//! gets `rx`/`ry` scaled from 0 to half its short side. It has no neighbor
//! context, so it is coarser than the data-path generator and only meant
//! for live previews.

use crate::config::{CornerDotStyle, CornerSquareStyle, DotStyle};
use crate::geometry::{max_radius, num};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<(svg|rect)\b([^>]*)>").unwrap());
static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub struct RectElement {
    attrs: Vec<(String, String)>,
    self_closing: bool,
}

impl RectElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: String) {
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    fn number(&self, name: &str) -> Option<f32> {
        self.attr(name)?.trim().trim_end_matches("px").parse().ok()
    }

    pub fn width(&self) -> Option<f32> {
        self.number("width")
    }

    pub fn height(&self) -> Option<f32> {
        self.number("height")
    }

    pub fn radius(&self) -> Option<f32> {
        self.number("rx")
    }

    fn to_svg(&self) -> String {
        let mut out = String::from("<rect");
        for (key, value) in &self.attrs {
            out.push_str(&format!(" {key}=\"{value}\""));
        }
        out.push_str(if self.self_closing { "/>" } else { ">" });
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Markup(String),
    Rect(RectElement),
}

/// A rendered SVG document with its `<rect>` elements exposed for editing.
/// Everything else is kept verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct RectDocument {
    segments: Vec<Segment>,
    width: Option<f32>,
    height: Option<f32>,
}

impl RectDocument {
    pub fn parse(svg: &str) -> Self {
        let mut segments = Vec::new();
        let mut width = None;
        let mut height = None;
        let mut last = 0;

        for caps in TAG_RE.captures_iter(svg) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let raw_attrs = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let attrs = parse_attrs(raw_attrs);
            if &caps[1] == "svg" {
                if width.is_none() {
                    (width, height) = root_size(&attrs);
                }
                continue;
            }
            if whole.start() > last {
                segments.push(Segment::Markup(svg[last..whole.start()].to_string()));
            }
            segments.push(Segment::Rect(RectElement {
                attrs,
                self_closing: raw_attrs.trim_end().ends_with('/'),
            }));
            last = whole.end();
        }
        if last < svg.len() {
            segments.push(Segment::Markup(svg[last..].to_string()));
        }

        Self {
            segments,
            width,
            height,
        }
    }

    pub fn rects(&self) -> impl Iterator<Item = &RectElement> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Rect(rect) => Some(rect),
            Segment::Markup(_) => None,
        })
    }

    /// Module rects: every rect except the full-canvas background.
    pub fn module_rects_mut(&mut self) -> impl Iterator<Item = &mut RectElement> {
        let (width, height) = (self.width, self.height);
        self.segments.iter_mut().filter_map(move |segment| match segment {
            Segment::Rect(rect) if !is_background(rect, width, height) => Some(rect),
            _ => None,
        })
    }

    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Markup(text) => out.push_str(text),
                Segment::Rect(rect) => out.push_str(&rect.to_svg()),
            }
        }
        out
    }
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .map(|caps| {
            let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or_default();
            (caps[1].to_string(), value.to_string())
        })
        .collect()
}

fn root_size(attrs: &[(String, String)]) -> (Option<f32>, Option<f32>) {
    let get = |name: &str| {
        attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    };
    if let Some(view_box) = get("viewBox") {
        let parts: Vec<f32> = view_box
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter_map(|part| part.parse().ok())
            .collect();
        if let [_, _, w, h] = parts[..] {
            return (Some(w), Some(h));
        }
    }
    let parse = |name: &str| get(name).and_then(|v| v.trim_end_matches("px").parse::<f32>().ok());
    (parse("width"), parse("height"))
}

fn is_background(rect: &RectElement, width: Option<f32>, height: Option<f32>) -> bool {
    if rect.attr("id") == Some("background") {
        return true;
    }
    if rect.attr("width") == Some("100%") && rect.attr("height") == Some("100%") {
        return true;
    }
    let at_origin = rect.number("x").unwrap_or(0.0) == 0.0 && rect.number("y").unwrap_or(0.0) == 0.0;
    match (width, height, rect.width(), rect.height()) {
        (Some(w), Some(h), Some(rw), Some(rh)) => at_origin && rw >= w && rh >= h,
        _ => false,
    }
}

/// Set every module rect's corner radius to `roundness`% of the largest
/// radius it can take. Values outside 0..=100 are clamped. Returns how many
/// rects were changed.
pub fn apply_roundness(document: &mut RectDocument, roundness: f32) -> usize {
    let factor = roundness.clamp(0.0, 100.0) / 100.0;
    let mut changed = 0;
    for rect in document.module_rects_mut() {
        let (Some(width), Some(height)) = (rect.width(), rect.height()) else {
            continue;
        };
        let radius = num(factor * max_radius(width, height));
        rect.set_attr("rx", radius.clone());
        rect.set_attr("ry", radius);
        changed += 1;
    }
    changed
}

/// Break points, in percent, where the roundness control switches discrete
/// styles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RoundnessThresholds {
    pub rounded: f32,
    pub extra_rounded: f32,
    pub dot: f32,
}

impl Default for RoundnessThresholds {
    fn default() -> Self {
        Self {
            rounded: 25.0,
            extra_rounded: 50.0,
            dot: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternStyles {
    pub dots: DotStyle,
    pub corner_square: CornerSquareStyle,
    pub corner_dot: CornerDotStyle,
}

/// Discrete styles matching a roundness value, for renders that go through
/// the path generator instead of this pass.
pub fn styles_for_roundness(roundness: f32, thresholds: &RoundnessThresholds) -> PatternStyles {
    let value = roundness.clamp(0.0, 100.0);
    if value >= thresholds.dot {
        PatternStyles {
            dots: DotStyle::Dots,
            corner_square: CornerSquareStyle::Dot,
            corner_dot: CornerDotStyle::Dot,
        }
    } else if value >= thresholds.extra_rounded {
        PatternStyles {
            dots: DotStyle::ExtraRounded,
            corner_square: CornerSquareStyle::ExtraRounded,
            corner_dot: CornerDotStyle::Dot,
        }
    } else if value >= thresholds.rounded {
        PatternStyles {
            dots: DotStyle::Rounded,
            corner_square: CornerSquareStyle::ExtraRounded,
            corner_dot: CornerDotStyle::Square,
        }
    } else {
        PatternStyles {
            dots: DotStyle::Square,
            corner_square: CornerSquareStyle::Square,
            corner_dot: CornerDotStyle::Square,
        }
    }
}
