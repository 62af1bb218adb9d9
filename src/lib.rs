//! twenty48-core: the rule engine of a 2048-style sliding-tile puzzle.
//!
//! This crate provides:
//! - A [`Grid`] of optional [`Tile`]s, addressed by (column, row) with
//!   `(0, 0)` at the bottom-left
//! - A [`Game`] type implementing the tilt/merge algorithm, score tracking
//!   and game-over detection
//! - A [`Direction`] type with the four cardinal tilts
//!
//! Rendering, input handling and persistence are left to the host: it calls
//! [`Game::tilt`] with a direction and reads back the grid, the score and the
//! over flag.
//!
//! Quick start:
//! ```
//! use twenty48_core::{Direction, Game, Tile};
//!
//! let mut game = Game::new(4);
//! game.add_tile(Tile::new(2, 0, 0));
//! game.add_tile(Tile::new(2, 0, 1));
//!
//! // Both tiles slide to the top of the column and merge.
//! assert!(game.tilt(Direction::Up));
//! assert_eq!(game.tile(0, 3), Some(4));
//! assert_eq!(game.score(), 4);
//! assert!(!game.game_over());
//! ```
//!
//! Deterministic self-play with a seeded RNG:
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use twenty48_core::{Direction, Game};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut game = Game::new(4);
//! game.spawn_random_tile(&mut rng);
//! game.spawn_random_tile(&mut rng);
//! let mut moves = 0;
//! while !game.game_over() && moves < 4 {
//!     if Direction::ALL.iter().any(|&dir| game.tilt(dir)) {
//!         game.spawn_random_tile(&mut rng);
//!         moves += 1;
//!     } else {
//!         break;
//!     }
//! }
//! assert!(moves > 0);
//! ```

pub mod game;
pub mod grid;
pub mod tile;

pub use game::{
    at_least_one_move_exists, empty_space_exists, max_tile_exists, Game, GameError, MAX_PIECE,
};
pub use grid::{Direction, Grid};
pub use tile::Tile;
