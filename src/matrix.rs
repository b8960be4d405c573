/// Read-only view of an encoded QR grid.
///
/// The grid is square and 0-indexed; callers never ask for a cell outside
/// `0..module_count()`.
pub trait QrMatrix {
    fn module_count(&self) -> usize;
    fn is_dark(&self, row: usize, col: usize) -> bool;
}

/// Side of a finder pattern, in modules.
pub const FINDER_SIZE: usize = 7;

/// True when the cell belongs to one of the three finder patterns
/// (top-left, top-right, bottom-left).
pub fn is_finder_cell(module_count: usize, row: usize, col: usize) -> bool {
    if module_count < FINDER_SIZE {
        return false;
    }
    let far = module_count - FINDER_SIZE;
    let top = row < FINDER_SIZE;
    let left = col < FINDER_SIZE;
    let right = col >= far;
    let bottom = row >= far;
    (top && left) || (top && right) || (bottom && left)
}

/// Owned grid, mostly useful for tests and for callers that already hold
/// decoded module data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    size: usize,
    cells: Vec<bool>,
}

impl BitMatrix {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Build a matrix from text rows where `#` (or `1`) marks a dark module.
    /// Short rows are padded with light modules.
    pub fn from_rows(rows: &[&str]) -> Self {
        let size = rows.len();
        let mut matrix = Self::new(size);
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().take(size).enumerate() {
                if matches!(ch, '#' | '1') {
                    matrix.set(row, col, true);
                }
            }
        }
        matrix
    }

    pub fn set(&mut self, row: usize, col: usize, dark: bool) {
        let idx = row * self.size + col;
        self.cells[idx] = dark;
    }

    /// Paint the three 7x7 finder patterns the way an encoder would.
    pub fn with_finder_patterns(mut self) -> Self {
        if self.size < FINDER_SIZE {
            return self;
        }
        let far = self.size - FINDER_SIZE;
        for (top, left) in [(0, 0), (0, far), (far, 0)] {
            for r in 0..FINDER_SIZE {
                for c in 0..FINDER_SIZE {
                    let ring = r == 0 || c == 0 || r == FINDER_SIZE - 1 || c == FINDER_SIZE - 1;
                    let core = (2..=4).contains(&r) && (2..=4).contains(&c);
                    self.set(top + r, left + c, ring || core);
                }
            }
        }
        self
    }

    pub fn dark_count(&self) -> usize {
        self.cells.iter().filter(|dark| **dark).count()
    }
}

impl QrMatrix for BitMatrix {
    fn module_count(&self) -> usize {
        self.size
    }

    fn is_dark(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.size + col]
    }
}

#[cfg(feature = "encode")]
impl QrMatrix for qrcode::QrCode {
    fn module_count(&self) -> usize {
        self.width()
    }

    fn is_dark(&self, row: usize, col: usize) -> bool {
        self[(col, row)] == qrcode::Color::Dark
    }
}
