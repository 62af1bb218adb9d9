use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Direction, Grid};
use crate::tile::Tile;

/// The tile value that ends the game on sight.
pub const MAX_PIECE: u32 = 2048;

/// Rejected input to [`Game::from_values`]. Everything else in the engine is
/// total over well-formed state or a caller-side precondition.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("board has no rows")]
    EmptyBoard,
    #[error("board is not square: {rows} rows but row {row} has {cols} values")]
    NotSquare { rows: usize, row: usize, cols: usize },
    #[error("invalid tile value {value} at ({col}, {row}); expected 0 or a power of two >= 2")]
    InvalidTileValue { value: u32, col: usize, row: usize },
}

/// The full state of one 2048 game: a [`Grid`] plus score, high-water score
/// and the terminal flag.
///
/// Equality is structural over grid contents, score, max score and the over
/// flag; [`fmt::Display`] is a debugging formatter only.
///
/// ```
/// use twenty48_core::{Direction, Game, Tile};
///
/// let mut game = Game::new(4);
/// game.add_tile(Tile::new(2, 0, 0));
/// game.add_tile(Tile::new(2, 0, 1));
/// assert!(game.tilt(Direction::Up));
/// assert_eq!(game.tile(0, 3), Some(4));
/// assert_eq!(game.score(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    grid: Grid,
    score: u64,
    max_score: u64,
    game_over: bool,
}

impl Game {
    /// A fresh game on an empty `size` x `size` board, score 0.
    pub fn new(size: usize) -> Self {
        Game {
            grid: Grid::new(size),
            score: 0,
            max_score: 0,
            game_over: false,
        }
    }

    /// Build a game from raw values, bottom row first, `0` meaning empty.
    ///
    /// Meant for deterministic setup in tests and harnesses:
    ///
    /// ```
    /// use twenty48_core::Game;
    ///
    /// let game = Game::from_values(
    ///     &[
    ///         [2, 0, 0, 0], // bottom row
    ///         [2, 0, 0, 0],
    ///         [0, 0, 0, 0],
    ///         [0, 0, 0, 4],
    ///     ],
    ///     0,
    ///     0,
    ///     false,
    /// )
    /// .unwrap();
    /// assert_eq!(game.tile(0, 1), Some(2));
    /// assert_eq!(game.tile(3, 3), Some(4));
    /// ```
    pub fn from_values<R: AsRef<[u32]>>(
        values: &[R],
        score: u64,
        max_score: u64,
        game_over: bool,
    ) -> Result<Game, GameError> {
        let size = values.len();
        if size == 0 {
            return Err(GameError::EmptyBoard);
        }
        let mut grid = Grid::new(size);
        for (row, row_values) in values.iter().enumerate() {
            let row_values = row_values.as_ref();
            if row_values.len() != size {
                return Err(GameError::NotSquare {
                    rows: size,
                    row,
                    cols: row_values.len(),
                });
            }
            for (col, &value) in row_values.iter().enumerate() {
                if value == 0 {
                    continue;
                }
                if value < 2 || !value.is_power_of_two() {
                    return Err(GameError::InvalidTileValue { value, col, row });
                }
                grid.add_tile(Tile::new(value, col, row));
            }
        }
        Ok(Game {
            grid,
            score,
            max_score,
            game_over,
        })
    }

    /// The value at (`col`, `row`), or `None` for an empty cell.
    ///
    /// Panics if either coordinate is outside `[0, size)`.
    #[inline]
    pub fn tile(&self, col: usize, row: usize) -> Option<u32> {
        self.grid.tile(col, row).map(|t| t.value())
    }

    /// The number of cells on one side of the board.
    #[inline]
    pub fn size(&self) -> usize {
        self.grid.size()
    }

    /// The current score.
    #[inline]
    pub fn score(&self) -> u64 {
        self.score
    }

    /// The best score seen so far; folded in each time the game ends.
    #[inline]
    pub fn max_score(&self) -> u64 {
        self.max_score
    }

    /// Read access to the underlying grid, for predicates and inspection.
    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whether the game is over: a winning tile exists, or no move does.
    ///
    /// Recomputed on every call. When the game is over this also folds the
    /// current score into the high-water mark, which is the only place
    /// `max_score` ever changes.
    pub fn game_over(&mut self) -> bool {
        self.check_game_over();
        if self.game_over {
            self.max_score = self.max_score.max(self.score);
        }
        self.game_over
    }

    /// Empty the board and reset score and the over flag. The high-water
    /// score survives.
    pub fn clear(&mut self) {
        self.score = 0;
        self.game_over = false;
        self.grid.clear();
    }

    /// Place `tile` on the board. The target cell must be empty; dropping a
    /// tile on another is a caller bug and panics.
    pub fn add_tile(&mut self, tile: Tile) {
        self.grid.add_tile(tile);
        self.check_game_over();
    }

    /// Drop a random starter tile (2 with probability 0.9, otherwise 4) on a
    /// uniformly random empty cell. Returns the placed tile, or `None` when
    /// the board is full.
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use twenty48_core::Game;
    ///
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let mut game = Game::new(4);
    /// let t = game.spawn_random_tile(&mut rng).unwrap();
    /// assert!(t.value() == 2 || t.value() == 4);
    /// ```
    pub fn spawn_random_tile<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Tile> {
        let size = self.grid.size();
        let empty: Vec<(usize, usize)> = (0..size)
            .flat_map(|row| (0..size).map(move |col| (col, row)))
            .filter(|&(col, row)| self.grid.tile(col, row).is_none())
            .collect();
        if empty.is_empty() {
            return None;
        }
        let (col, row) = empty[rng.gen_range(0..empty.len())];
        let value = if rng.gen_range(0..10) < 9 { 2 } else { 4 };
        let tile = Tile::new(value, col, row);
        self.add_tile(tile);
        Some(tile)
    }

    /// Tilt the board toward `dir`, sliding and merging every tile as far as
    /// it can go. Returns whether anything moved.
    ///
    /// Columns are independent. Within a column, tiles are settled nearest
    /// the target edge first, and a cell that absorbed a merge cannot absorb
    /// another one during the same tilt, so a run of three equal tiles merges
    /// only the leading pair. Each merge adds twice the moving tile's value
    /// to the score.
    pub fn tilt(&mut self, dir: Direction) -> bool {
        let size = self.grid.size();
        let mut changed = false;

        for col in 0..size {
            // Which rows of this column have absorbed a merge this tilt.
            let mut merged = vec![false; size];
            for row in (0..size - 1).rev() {
                let Some(tile) = self.grid.tile_viewed(col, row, dir) else {
                    continue;
                };
                let mut dest = row;
                while dest < size - 1 {
                    match self.grid.tile_viewed(col, dest + 1, dir) {
                        None => dest += 1,
                        Some(above) if above.value() == tile.value() && !merged[dest + 1] => {
                            dest += 1;
                            merged[dest] = true;
                            self.score += u64::from(tile.value()) * 2;
                            break;
                        }
                        Some(_) => break,
                    }
                }
                if dest != row {
                    self.grid.move_tile(col, dest, tile, dir);
                    changed = true;
                }
            }
        }

        self.check_game_over();
        changed
    }

    fn check_game_over(&mut self) {
        self.game_over = max_tile_exists(&self.grid) || !at_least_one_move_exists(&self.grid);
    }
}

impl fmt::Display for Game {
    /// Rows top first, 4-wide value fields, blank cells empty, then score,
    /// high score and the over marker.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "[")?;
        for row in (0..self.grid.size()).rev() {
            for col in 0..self.grid.size() {
                match self.grid.tile(col, row) {
                    Some(t) => write!(f, "|{:>4}", t.value())?,
                    None => write!(f, "|    ")?,
                }
            }
            writeln!(f, "|")?;
        }
        let over = if self.game_over {
            "game is over"
        } else {
            "game is not over"
        };
        writeln!(f, "] {} (max: {}) ({})", self.score, self.max_score, over)
    }
}

/// True iff any cell holds no tile.
pub fn empty_space_exists(grid: &Grid) -> bool {
    grid.tiles().count() < grid.size() * grid.size()
}

/// True iff any tile has reached the winning value, [`MAX_PIECE`].
pub fn max_tile_exists(grid: &Grid) -> bool {
    grid.tiles().any(|t| t.value() == MAX_PIECE)
}

/// True iff a tilt in some direction would change the board: there is an
/// empty cell, or two orthogonal neighbors share a value.
///
/// Only the right and upward neighbor of each tile are checked, which covers
/// every adjacent pair exactly once.
pub fn at_least_one_move_exists(grid: &Grid) -> bool {
    if empty_space_exists(grid) {
        return true;
    }
    let size = grid.size();
    for row in 0..size {
        for col in 0..size {
            let Some(tile) = grid.tile(col, row) else {
                continue;
            };
            if col + 1 < size {
                if let Some(right) = grid.tile(col + 1, row) {
                    if right.value() == tile.value() {
                        return true;
                    }
                }
            }
            if row + 1 < size {
                if let Some(above) = grid.tile(col, row + 1) {
                    if above.value() == tile.value() {
                        return true;
                    }
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn game(values: &[[u32; 4]; 4]) -> Game {
        Game::from_values(values, 0, 0, false).unwrap()
    }

    // A full board with no adjacent equal pair anywhere.
    const SETTLED: [[u32; 4]; 4] = [
        [2, 4, 2, 4],
        [4, 2, 4, 2],
        [2, 4, 2, 4],
        [4, 2, 4, 2],
    ];

    #[test]
    fn tilt_up_merges_nearest_pair_only() {
        // Column 0, bottom to top: [2, 2, 2, _].
        let mut g = game(&[
            [2, 0, 0, 0],
            [2, 0, 0, 0],
            [2, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        assert!(g.tilt(Direction::Up));
        assert_eq!(g.tile(0, 3), Some(4));
        assert_eq!(g.tile(0, 2), Some(2));
        assert_eq!(g.tile(0, 1), None);
        assert_eq!(g.tile(0, 0), None);
        assert_eq!(g.score(), 4);
    }

    #[test]
    fn four_equal_tiles_merge_into_two_pairs() {
        let mut g = game(&[
            [2, 0, 0, 0],
            [2, 0, 0, 0],
            [2, 0, 0, 0],
            [2, 0, 0, 0],
        ]);
        assert!(g.tilt(Direction::Up));
        assert_eq!(g.tile(0, 3), Some(4));
        assert_eq!(g.tile(0, 2), Some(4));
        assert_eq!(g.tile(0, 1), None);
        assert_eq!(g.score(), 8);
    }

    #[test]
    fn merged_cell_blocks_second_merge() {
        // Bottom to top [4, 2, 2, _]: the 2s merge at the top, and the 4
        // below must not chain into the freshly merged 4.
        let mut g = game(&[
            [4, 0, 0, 0],
            [2, 0, 0, 0],
            [2, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        assert!(g.tilt(Direction::Up));
        assert_eq!(g.tile(0, 3), Some(4));
        assert_eq!(g.tile(0, 2), Some(4));
        assert_eq!(g.tile(0, 1), None);
        assert_eq!(g.score(), 4);
    }

    #[test]
    fn tilt_works_in_all_four_directions() {
        let start = [
            [2, 2, 0, 0], // bottom row holds the only tiles
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ];

        let mut g = game(&start);
        assert!(g.tilt(Direction::Right));
        assert_eq!(g.tile(3, 0), Some(4));
        assert_eq!(g.score(), 4);

        let mut g = game(&start);
        assert!(g.tilt(Direction::Left));
        assert_eq!(g.tile(0, 0), Some(4));

        let mut g = game(&start);
        assert!(g.tilt(Direction::Up));
        assert_eq!(g.tile(0, 3), Some(2));
        assert_eq!(g.tile(1, 3), Some(2));
        assert_eq!(g.score(), 0);

        // Already resting on the bottom edge; nothing to do.
        let mut g = game(&start);
        assert!(!g.tilt(Direction::Down));
        assert_eq!(g.tile(0, 0), Some(2));
        assert_eq!(g.tile(1, 0), Some(2));
    }

    #[test]
    fn columns_do_not_interact() {
        let mut g = game(&[
            [2, 4, 0, 0],
            [2, 4, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        assert!(g.tilt(Direction::Up));
        assert_eq!(g.tile(0, 3), Some(4));
        assert_eq!(g.tile(1, 3), Some(8));
        assert_eq!(g.score(), 12);
    }

    #[test]
    fn settled_board_tilt_is_idempotent() {
        let mut g = game(&SETTLED);
        let before = g.clone();
        for dir in Direction::ALL {
            assert!(!g.tilt(dir), "settled board changed tilting {dir}");
        }
        assert_eq!(g.grid(), before.grid());
        assert!(g.game_over());
    }

    #[test]
    fn tilt_conserves_total_tile_value() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut g = Game::new(4);
        g.spawn_random_tile(&mut rng);
        g.spawn_random_tile(&mut rng);
        let mut last_score = 0;
        for _ in 0..200 {
            if g.game_over() {
                break;
            }
            let mut dirs = Direction::ALL;
            dirs.shuffle(&mut rng);
            let mut moved = false;
            for dir in dirs {
                let sum_before: u64 = g.grid().tiles().map(|t| u64::from(t.value())).sum();
                let count_before = g.grid().tiles().count();
                if g.tilt(dir) {
                    let sum_after: u64 = g.grid().tiles().map(|t| u64::from(t.value())).sum();
                    assert_eq!(sum_before, sum_after, "tilt changed the total tile value");
                    assert!(g.grid().tiles().count() <= count_before);
                    assert!(g.score() >= last_score, "score went backwards");
                    last_score = g.score();
                    moved = true;
                    break;
                }
            }
            if !moved {
                break;
            }
            g.spawn_random_tile(&mut rng);
        }
    }

    #[test]
    fn winning_tile_ends_the_game_despite_moves() {
        let mut g = Game::from_values(
            &[
                [2048, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
            ],
            500,
            0,
            false,
        )
        .unwrap();
        assert!(empty_space_exists(g.grid()));
        assert!(g.game_over());
        assert_eq!(g.max_score(), 500);
    }

    #[test]
    fn full_board_without_merges_is_over() {
        let mut g = game(&SETTLED);
        assert!(!empty_space_exists(g.grid()));
        assert!(!at_least_one_move_exists(g.grid()));
        for dir in Direction::ALL {
            assert!(!g.tilt(dir));
        }
        assert!(g.game_over());
    }

    #[test]
    fn full_board_with_adjacent_pair_is_not_over() {
        let mut values = SETTLED;
        values[0][1] = 2; // bottom row now starts [2, 2, ...]
        let mut g = game(&values);
        assert!(!empty_space_exists(g.grid()));
        assert!(at_least_one_move_exists(g.grid()));
        assert!(!g.game_over());
    }

    #[test]
    fn empty_space_alone_permits_a_move() {
        let g = game(&[
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 0],
        ]);
        assert!(empty_space_exists(g.grid()));
        assert!(at_least_one_move_exists(g.grid()));
    }

    #[test]
    fn new_game_is_not_over() {
        let mut g = Game::new(4);
        assert!(!g.game_over());
        assert_eq!(g.score(), 0);
        assert_eq!(g.max_score(), 0);
        assert_eq!(g.size(), 4);
    }

    #[test]
    fn clear_keeps_the_high_water_mark() {
        let mut g = Game::from_values(
            &[
                [2048, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
                [0, 0, 0, 0],
            ],
            300,
            0,
            false,
        )
        .unwrap();
        assert!(g.game_over());
        assert_eq!(g.max_score(), 300);
        g.clear();
        assert_eq!(g.score(), 0);
        assert_eq!(g.max_score(), 300);
        assert!(!g.game_over());
        assert_eq!(g.grid().tiles().count(), 0);
    }

    #[test]
    fn max_score_only_moves_on_game_over() {
        let mut g = game(&[
            [2, 2, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        g.tilt(Direction::Left);
        assert_eq!(g.score(), 4);
        assert!(!g.game_over());
        assert_eq!(g.max_score(), 0);
    }

    #[test]
    fn from_values_round_trips_every_cell() {
        let values = [
            [2, 0, 4, 0],
            [0, 8, 0, 16],
            [32, 0, 64, 0],
            [0, 128, 0, 256],
        ];
        let g = Game::from_values(&values, 7, 11, false).unwrap();
        for (row, row_values) in values.iter().enumerate() {
            for (col, &value) in row_values.iter().enumerate() {
                let expected = (value != 0).then_some(value);
                assert_eq!(g.tile(col, row), expected, "mismatch at ({col}, {row})");
            }
        }
        assert_eq!(g.score(), 7);
        assert_eq!(g.max_score(), 11);
    }

    #[test]
    fn from_values_rejects_bad_input() {
        assert!(matches!(
            Game::from_values::<[u32; 4]>(&[], 0, 0, false),
            Err(GameError::EmptyBoard)
        ));
        let ragged: [&[u32]; 2] = [&[2, 0], &[2]];
        assert!(matches!(
            Game::from_values(&ragged, 0, 0, false),
            Err(GameError::NotSquare { row: 1, cols: 1, .. })
        ));
        assert!(matches!(
            Game::from_values(&[[3, 0], [0, 0]], 0, 0, false),
            Err(GameError::InvalidTileValue { value: 3, col: 0, row: 0 })
        ));
    }

    #[test]
    fn equality_is_structural() {
        let a = game(&SETTLED);
        let b = game(&SETTLED);
        assert_eq!(a, b);
        let c = Game::from_values(&SETTLED, 10, 0, false).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn display_formats_rows_top_first() {
        let g = Game::from_values(&[[2, 0], [0, 4]], 0, 0, false).unwrap();
        assert_eq!(
            g.to_string(),
            "\n[\n|    |   4|\n|   2|    |\n] 0 (max: 0) (game is not over)\n"
        );
    }

    #[test]
    fn spawn_fills_the_board_then_stops() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut g = Game::new(4);
        for _ in 0..16 {
            let t = g.spawn_random_tile(&mut rng).unwrap();
            assert!(t.value() == 2 || t.value() == 4);
        }
        assert!(!empty_space_exists(g.grid()));
        assert_eq!(g.spawn_random_tile(&mut rng), None);
    }
}
