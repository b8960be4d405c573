//! Geometry vocabulary shared by the discrete path generator and the
//! continuous roundness pass: corner radii, clamping, and path data helpers.

use std::fmt::Write;

/// Per-corner radii, clockwise from the top-left.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CornerRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

impl CornerRadii {
    pub fn uniform(radius: f32) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub fn is_square(&self) -> bool {
        self.top_left == 0.0
            && self.top_right == 0.0
            && self.bottom_right == 0.0
            && self.bottom_left == 0.0
    }

    pub fn rounded_count(&self) -> usize {
        [self.top_left, self.top_right, self.bottom_right, self.bottom_left]
            .iter()
            .filter(|r| **r > 0.0)
            .count()
    }
}

/// Largest radius a `width` x `height` box can carry without its arcs
/// crossing each other.
pub fn max_radius(width: f32, height: f32) -> f32 {
    width.min(height) / 2.0
}

pub fn clamp_radius(radius: f32, width: f32, height: f32) -> f32 {
    radius.clamp(0.0, max_radius(width, height).max(0.0))
}

/// Format a coordinate for path data: two decimals, trailing zeros dropped.
pub fn num(value: f32) -> String {
    num_with_precision(value, 2)
}

/// [`num`] with `decimals` places kept before trimming.
pub fn num_with_precision(value: f32, decimals: usize) -> String {
    let mut out = format!("{value:.decimals$}");
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    if out == "-0" {
        out = "0".to_string();
    }
    out
}

/// Closed rectangle path with independently rounded corners.
///
/// Edges are walked clockwise from the top-left; an arc is only emitted for
/// a corner whose (clamped) radius is non-zero, so all-zero radii give a
/// plain rectangle.
pub fn rounded_rect_path(x: f32, y: f32, width: f32, height: f32, radii: CornerRadii) -> String {
    let tl = clamp_radius(radii.top_left, width, height);
    let tr = clamp_radius(radii.top_right, width, height);
    let br = clamp_radius(radii.bottom_right, width, height);
    let bl = clamp_radius(radii.bottom_left, width, height);
    let right = x + width;
    let bottom = y + height;

    let mut d = String::new();
    let _ = write!(d, "M{} {}", num(x + tl), num(y));
    let _ = write!(d, "H{}", num(right - tr));
    if tr > 0.0 {
        push_arc(&mut d, tr, right, y + tr);
    }
    let _ = write!(d, "V{}", num(bottom - br));
    if br > 0.0 {
        push_arc(&mut d, br, right - br, bottom);
    }
    let _ = write!(d, "H{}", num(x + bl));
    if bl > 0.0 {
        push_arc(&mut d, bl, x, bottom - bl);
    }
    let _ = write!(d, "V{}", num(y + tl));
    if tl > 0.0 {
        push_arc(&mut d, tl, x + tl, y);
    }
    d.push('Z');
    d
}

fn push_arc(d: &mut String, radius: f32, end_x: f32, end_y: f32) {
    let r = num(radius);
    let _ = write!(d, "A{r} {r} 0 0 1 {} {}", num(end_x), num(end_y));
}

/// Full circle drawn as two half arcs, so it can live in the same `<path>`
/// as other cell fragments.
pub fn circle_path(cx: f32, cy: f32, radius: f32) -> String {
    let r = num(radius);
    format!(
        "M{} {}A{r} {r} 0 1 0 {} {}A{r} {r} 0 1 0 {} {}Z",
        num(cx - radius),
        num(cy),
        num(cx + radius),
        num(cy),
        num(cx - radius),
        num(cy)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn num_trims_trailing_zeros() {
        assert_eq!(num(12.0), "12");
        assert_eq!(num(12.5), "12.5");
        assert_eq!(num(1.0 / 3.0), "0.33");
        assert_eq!(num(-0.0001), "0");
    }

    #[test]
    fn precision_is_configurable() {
        assert_eq!(num_with_precision(1.0 / 3.0, 4), "0.3333");
        assert_eq!(num_with_precision(0.5, 4), "0.5");
        assert_eq!(num_with_precision(2.0, 0), "2");
        assert_eq!(num_with_precision(-0.00001, 4), "0");
    }

    #[test]
    fn square_corners_emit_no_arcs() {
        let d = rounded_rect_path(0.0, 0.0, 10.0, 10.0, CornerRadii::default());
        assert_eq!(d, "M0 0H10V10H0V0Z");
    }

    #[test]
    fn radii_are_clamped_to_half_the_short_side() {
        let d = rounded_rect_path(0.0, 0.0, 10.0, 4.0, CornerRadii::uniform(50.0));
        assert!(d.contains("A2 2 0 0 1"));
        assert!(!d.contains("A50"));
    }

    #[test]
    fn only_requested_corner_gets_an_arc() {
        let radii = CornerRadii {
            bottom_right: 5.0,
            ..CornerRadii::default()
        };
        let d = rounded_rect_path(0.0, 0.0, 10.0, 10.0, radii);
        assert_eq!(d, "M0 0H10V5A5 5 0 0 1 5 10H0V0Z");
        assert_eq!(radii.rounded_count(), 1);
    }

    #[test]
    fn circle_uses_two_arcs() {
        let d = circle_path(5.0, 5.0, 5.0);
        assert_eq!(d, "M0 5A5 5 0 1 0 10 5A5 5 0 1 0 0 5Z");
    }
}
