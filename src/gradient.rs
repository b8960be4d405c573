use crate::config::{ColorStop, GradientKind, GradientSpec};
use crate::frame::escape_xml;
use crate::geometry::num;
use std::fmt::Write;

/// Region a gradient spans, in the user space of the elements that fill
/// with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl GradientArea {
    pub fn square(size: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: size,
            height: size,
        }
    }
}

/// `<linearGradient>`/`<radialGradient>` definition for `spec`, addressable
/// as `url(#id)`. Coordinates are absolute over `area` so every element
/// filled with it samples one continuous gradient.
pub fn build_gradient_def(spec: &GradientSpec, id: &str, area: &GradientArea) -> String {
    let mut def = String::new();
    match spec.kind {
        GradientKind::Radial => {
            let _ = write!(
                def,
                "<radialGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" cx=\"{}\" cy=\"{}\" r=\"{}\">",
                num(area.x + area.width / 2.0),
                num(area.y + area.height / 2.0),
                num(area.width.max(area.height) / 2.0)
            );
        }
        GradientKind::Linear => {
            let (x1, y1, x2, y2) = linear_endpoints(spec.rotation);
            let at_x = |pct: f32| num(area.x + pct / 100.0 * area.width);
            let at_y = |pct: f32| num(area.y + pct / 100.0 * area.height);
            let _ = write!(
                def,
                "<linearGradient id=\"{id}\" gradientUnits=\"userSpaceOnUse\" x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\">",
                at_x(x1),
                at_y(y1),
                at_x(x2),
                at_y(y2)
            );
        }
    }
    for stop in sorted_stops(&spec.color_stops) {
        let _ = write!(
            def,
            "<stop offset=\"{}%\" stop-color=\"{}\"/>",
            num(stop.offset.clamp(0.0, 1.0) * 100.0),
            escape_xml(&stop.color)
        );
    }
    def.push_str(match spec.kind {
        GradientKind::Radial => "</radialGradient>",
        GradientKind::Linear => "</linearGradient>",
    });
    def
}

/// Endpoints, in percent of the area, of a linear gradient rotated
/// `degrees` clockwise from left-to-right around the center.
pub fn linear_endpoints(degrees: f32) -> (f32, f32, f32, f32) {
    let theta = degrees.to_radians();
    let (sin, cos) = theta.sin_cos();
    (
        50.0 - cos * 50.0,
        50.0 - sin * 50.0,
        50.0 + cos * 50.0,
        50.0 + sin * 50.0,
    )
}

/// Stops ordered by offset; stops sharing an offset keep their input order.
fn sorted_stops(stops: &[ColorStop]) -> Vec<&ColorStop> {
    let mut sorted: Vec<&ColorStop> = stops.iter().collect();
    sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    sorted
}
