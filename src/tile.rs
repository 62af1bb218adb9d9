use serde::{Deserialize, Serialize};

/// A single numbered piece on the board.
///
/// Tiles are immutable value objects: a merge discards both inputs and
/// produces a fresh tile holding the doubled value, so no merge history is
/// carried around. A tile's recorded `(col, row)` always matches the cell
/// holding it; the grid rewrites coordinates whenever a tile relocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    value: u32,
    col: usize,
    row: usize,
}

impl Tile {
    /// Create a tile with `value` at (`col`, `row`).
    ///
    /// `value` must be a positive power of two (2, 4, 8, ...).
    ///
    /// ```
    /// use twenty48_core::Tile;
    /// let t = Tile::new(8, 1, 2);
    /// assert_eq!((t.value(), t.col(), t.row()), (8, 1, 2));
    /// ```
    pub fn new(value: u32, col: usize, row: usize) -> Self {
        debug_assert!(
            value >= 2 && value.is_power_of_two(),
            "tile value {value} is not a power of two >= 2"
        );
        Tile { value, col, row }
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn col(&self) -> usize {
        self.col
    }

    #[inline]
    pub fn row(&self) -> usize {
        self.row
    }

    /// The tile produced by merging two tiles of this value, landing at
    /// (`col`, `row`).
    pub(crate) fn merged(&self, col: usize, row: usize) -> Tile {
        Tile::new(self.value * 2, col, row)
    }

    /// The same tile relocated to (`col`, `row`).
    pub(crate) fn at(&self, col: usize, row: usize) -> Tile {
        Tile {
            value: self.value,
            col,
            row,
        }
    }
}
