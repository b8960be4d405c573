//! Data-module path generation with neighbor-aware corner rounding.

use crate::config::DotStyle;
use crate::geometry::{CornerRadii, circle_path, rounded_rect_path};
use crate::logo::{ExclusionArea, is_cell_excluded};
use crate::matrix::{QrMatrix, is_finder_cell};

/// Which orthogonal neighbors of a cell are drawn data modules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Neighbors {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl Neighbors {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            top: true,
            right: true,
            bottom: true,
            left: true,
        }
    }
}

/// The set of cells that end up in the data path: dark, outside the finder
/// patterns and outside the logo exclusion zone. Built in one pass per
/// render, and used both to emit cells and to answer neighbor lookups, so
/// the two can never disagree.
#[derive(Debug, Clone)]
pub struct CellMask {
    size: usize,
    drawn: Vec<bool>,
    excluded: usize,
}

impl CellMask {
    pub fn build<M: QrMatrix + ?Sized>(
        matrix: &M,
        cell_size: f32,
        exclusion: Option<&ExclusionArea>,
    ) -> Self {
        let size = matrix.module_count();
        let mut drawn = vec![false; size * size];
        let mut excluded = 0;
        for row in 0..size {
            for col in 0..size {
                if !matrix.is_dark(row, col) || is_finder_cell(size, row, col) {
                    continue;
                }
                if is_cell_excluded(row, col, cell_size, exclusion) {
                    excluded += 1;
                    continue;
                }
                drawn[row * size + col] = true;
            }
        }
        Self {
            size,
            drawn,
            excluded,
        }
    }

    pub fn module_count(&self) -> usize {
        self.size
    }

    /// Dark data cells withheld because of the logo.
    pub fn excluded_count(&self) -> usize {
        self.excluded
    }

    pub fn is_drawn(&self, row: isize, col: isize) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        row < self.size && col < self.size && self.drawn[row * self.size + col]
    }

    pub fn neighbors(&self, row: usize, col: usize) -> Neighbors {
        let (r, c) = (row as isize, col as isize);
        Neighbors {
            top: self.is_drawn(r - 1, c),
            right: self.is_drawn(r, c + 1),
            bottom: self.is_drawn(r + 1, c),
            left: self.is_drawn(r, c - 1),
        }
    }

    pub fn drawn_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.drawn
            .iter()
            .enumerate()
            .filter(|(_, drawn)| **drawn)
            .map(|(idx, _)| (idx / self.size, idx % self.size))
    }
}

/// Corner radii a style gives a cell of side `size` with the given neighbors.
pub fn corner_radii(style: DotStyle, size: f32, neighbors: Neighbors) -> CornerRadii {
    let radius = size / 2.0;
    let Neighbors {
        top,
        right,
        bottom,
        left,
    } = neighbors;
    match style {
        DotStyle::Square | DotStyle::Dots => CornerRadii::default(),
        DotStyle::Rounded | DotStyle::ExtraRounded | DotStyle::ClassyRounded => CornerRadii {
            top_left: if !top && !left { radius } else { 0.0 },
            top_right: if !top && !right { radius } else { 0.0 },
            bottom_right: if !bottom && !right { radius } else { 0.0 },
            bottom_left: if !bottom && !left { radius } else { 0.0 },
        },
        DotStyle::Classy => CornerRadii {
            bottom_right: if !bottom && !right { radius } else { 0.0 },
            ..CornerRadii::default()
        },
    }
}

/// Path fragment for one data cell at `(x, y)`.
pub fn generate_cell_path(style: DotStyle, x: f32, y: f32, size: f32, neighbors: Neighbors) -> String {
    match style {
        DotStyle::Dots => {
            let half = size / 2.0;
            circle_path(x + half, y + half, half)
        }
        _ => rounded_rect_path(x, y, size, size, corner_radii(style, size, neighbors)),
    }
}

/// Path data for every drawn cell of the mask, concatenated.
pub fn generate_dots_path(style: DotStyle, mask: &CellMask, cell_size: f32) -> String {
    let mut d = String::new();
    for (row, col) in mask.drawn_cells() {
        let x = col as f32 * cell_size;
        let y = row as f32 * cell_size;
        d.push_str(&generate_cell_path(style, x, y, cell_size, mask.neighbors(row, col)));
    }
    d
}
