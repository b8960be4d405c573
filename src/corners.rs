//! Finder-pattern rendering: a 7x7 ring plus a 3x3 center, each styled on
//! its own.

use crate::config::{CornerDotStyle, CornerSquareStyle};
use crate::geometry::{CornerRadii, circle_path, rounded_rect_path};
use crate::matrix::FINDER_SIZE;

/// Outer corner radius of an `extra-rounded` ring, in modules.
const EXTRA_ROUNDED_OUTER: f32 = 2.5;
/// Radius of the hole punched in an `extra-rounded` ring, in modules.
const EXTRA_ROUNDED_INNER: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CornerPosition {
    TopLeft,
    TopRight,
    BottomLeft,
}

impl CornerPosition {
    pub const ALL: [CornerPosition; 3] = [Self::TopLeft, Self::TopRight, Self::BottomLeft];

    /// Stable element id for the corner group.
    pub fn id(self) -> &'static str {
        match self {
            Self::TopLeft => "corner-top-left",
            Self::TopRight => "corner-top-right",
            Self::BottomLeft => "corner-bottom-left",
        }
    }

    /// Top-left of the pattern in drawing coordinates.
    pub fn origin(self, module_count: usize, cell_size: f32) -> (f32, f32) {
        let far = module_count.saturating_sub(FINDER_SIZE) as f32 * cell_size;
        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopRight => (far, 0.0),
            Self::BottomLeft => (0.0, far),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CornerPattern {
    /// Ring path; relies on the even-odd fill rule for its hole.
    pub outer_path: String,
    pub inner_path: String,
}

/// Finder pattern whose outer ring spans `size` (seven modules) from `(x, y)`.
pub fn generate_corner_pattern(
    square_style: CornerSquareStyle,
    dot_style: CornerDotStyle,
    x: f32,
    y: f32,
    size: f32,
) -> CornerPattern {
    let module = size / FINDER_SIZE as f32;
    let hole = size - 2.0 * module;

    let outer_path = match square_style {
        CornerSquareStyle::Square => {
            let mut d = rounded_rect_path(x, y, size, size, CornerRadii::default());
            d.push_str(&rounded_rect_path(x + module, y + module, hole, hole, CornerRadii::default()));
            d
        }
        CornerSquareStyle::ExtraRounded => {
            let mut d = rounded_rect_path(x, y, size, size, CornerRadii::uniform(module * EXTRA_ROUNDED_OUTER));
            d.push_str(&rounded_rect_path(
                x + module,
                y + module,
                hole,
                hole,
                CornerRadii::uniform(module * EXTRA_ROUNDED_INNER),
            ));
            d
        }
        CornerSquareStyle::Dot => {
            let center = size / 2.0;
            let mut d = circle_path(x + center, y + center, center);
            d.push_str(&circle_path(x + center, y + center, hole / 2.0));
            d
        }
    };

    let dot = 3.0 * module;
    let inner_x = x + 2.0 * module;
    let inner_y = y + 2.0 * module;
    let inner_path = match dot_style {
        CornerDotStyle::Square => rounded_rect_path(inner_x, inner_y, dot, dot, CornerRadii::default()),
        CornerDotStyle::Dot => circle_path(inner_x + dot / 2.0, inner_y + dot / 2.0, dot / 2.0),
    };

    CornerPattern {
        outer_path,
        inner_path,
    }
}

/// The three finder patterns of a grid, in top-left, top-right, bottom-left
/// order. The bottom-right corner never gets one.
pub fn generate_corner_patterns(
    square_style: CornerSquareStyle,
    dot_style: CornerDotStyle,
    module_count: usize,
    cell_size: f32,
) -> Vec<(CornerPosition, CornerPattern)> {
    let size = FINDER_SIZE as f32 * cell_size;
    CornerPosition::ALL
        .iter()
        .map(|&position| {
            let (x, y) = position.origin(module_count, cell_size);
            (position, generate_corner_pattern(square_style, dot_style, x, y, size))
        })
        .collect()
}
