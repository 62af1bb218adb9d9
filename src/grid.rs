use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tile::Tile;

/// A direction to tilt the board. `Up` means toward increasing row, with
/// `(0, 0)` at the bottom-left of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(s)
    }
}

/// Map a logical (`col`, `row`) viewed through `dir` to the physical cell it
/// names on a board of side `size`.
///
/// The tilt algorithm always slides tiles toward increasing row; viewing the
/// board through `dir` makes "increasing row" mean that compass direction in
/// physical storage. `Up` is the identity, the rest are pure rotations, so
/// reads and writes through the same direction stay consistent and there is
/// no orientation state to reset afterwards.
fn to_physical(col: usize, row: usize, dir: Direction, size: usize) -> (usize, usize) {
    let last = size - 1;
    match dir {
        Direction::Up => (col, row),
        Direction::Down => (last - col, last - row),
        Direction::Right => (row, last - col),
        Direction::Left => (last - row, col),
    }
}

/// The NxN playing surface. Cells are addressed by (`col`, `row`) with
/// `(0, 0)` at the bottom-left, and hold at most one [`Tile`] each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Tile>>,
}

impl Grid {
    /// An empty grid of side length `size`.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "grid size must be positive");
        Grid {
            size,
            cells: vec![None; size * size],
        }
    }

    /// The number of cells on one side of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    fn index(&self, col: usize, row: usize) -> usize {
        assert!(
            col < self.size && row < self.size,
            "cell ({col}, {row}) out of range for size {}",
            self.size
        );
        row * self.size + col
    }

    /// The tile at physical (`col`, `row`), if any.
    ///
    /// Panics if either coordinate is outside `[0, size)`; callers validate
    /// bounds themselves.
    #[inline]
    pub fn tile(&self, col: usize, row: usize) -> Option<Tile> {
        self.cells[self.index(col, row)]
    }

    /// The tile at logical (`col`, `row`) when viewing the board through
    /// `dir`.
    pub(crate) fn tile_viewed(&self, col: usize, row: usize, dir: Direction) -> Option<Tile> {
        let (c, r) = to_physical(col, row, dir, self.size);
        self.cells[self.index(c, r)]
    }

    /// Place `tile` at its own recorded coordinates.
    ///
    /// Panics if that cell is occupied. Dropping a tile on another is a
    /// caller bug, never a recoverable condition.
    pub fn add_tile(&mut self, tile: Tile) {
        let idx = self.index(tile.col(), tile.row());
        assert!(
            self.cells[idx].is_none(),
            "cell ({}, {}) is already occupied",
            tile.col(),
            tile.row()
        );
        self.cells[idx] = Some(tile);
    }

    /// Relocate `tile` to logical (`col`, `row`) viewed through `dir`.
    ///
    /// An occupied destination means a merge: the occupant is discarded and a
    /// doubled tile takes its place. The tile's recorded coordinates are
    /// rewritten to the physical destination either way.
    pub(crate) fn move_tile(&mut self, col: usize, row: usize, tile: Tile, dir: Direction) {
        let (c, r) = to_physical(col, row, dir, self.size);
        let from = self.index(tile.col(), tile.row());
        let to = self.index(c, r);
        self.cells[from] = None;
        self.cells[to] = match self.cells[to] {
            Some(dest) => {
                debug_assert_eq!(dest.value(), tile.value(), "merging unequal tiles");
                Some(tile.merged(c, r))
            }
            None => Some(tile.at(c, r)),
        };
    }

    /// Remove every tile.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Iterate over the occupied cells, in no particular order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.cells.iter().filter_map(|c| *c)
    }
}
