//! # Labyrinth
//!
//! Deterministic perfect-maze generation for grids of up to `2^28` interior
//! nodes. A maze is a pure function of its requested size and a 32-bit seed:
//! the same `(width, height, seed)` yields the same walls on every run and
//! every platform.
//!
//! Generation builds a random spanning tree of wall segments in two phases.
//! Random links are sampled in batches while that is productive, then every
//! remaining joinable link is swept in shuffled order so even one-cell-wide
//! strips come out fully connected. The finished maze keeps 2 bits per node
//! and answers wall queries in O(1).
//!
//! ```
//! use labyrinth::Maze;
//!
//! let maze = Maze::new(21, 11, 1234567890)?;
//! assert_eq!((maze.pix_width(), maze.pix_height()), (21, 11));
//! assert!(maze.is_free(1, 1));
//! assert!(!maze.is_free(0, 0));
//! # Ok::<(), labyrinth::MazeError>(())
//! ```

#![forbid(unsafe_code)] // let us try
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use builder::MazeBuilder;
pub use config::{GeneratorConfig, MAX_INTERIOR_NODES};
pub use error::MazeError;
pub use generator::GenerationStats;
pub use maze::{Maze, BLOCKED_TOKEN, FREE_TOKEN, MIN_DIMENSION};
pub use rng::{Lcg32, Mt19937, Rng, SeedableRng};

mod builder;
mod config;
#[doc(hidden)]
pub mod error;
mod generator;
mod grid;
pub mod hash;
mod maze;
pub mod prelude;
/// Deterministic random streams (MT19937 and the legacy LCG).
///
/// See the module documentation for usage details.
pub mod rng;
pub mod telemetry;
#[cfg(test)]
pub(crate) mod test_config;
mod walls;

/// A [`Result`] whose error is always [`MazeError`].
pub type MazeResult<T> = Result<T, MazeError>;

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn maze_is_send_and_sync() {
        assert_send_sync::<Maze>();
        assert_send_sync::<GenerationStats>();
        assert_send_sync::<MazeError>();
    }

    #[test]
    fn scenario_small_seeded_maze() {
        let maze = Maze::new(5, 5, 1_234_567_890).unwrap();
        assert!(maze.is_free(1, 1));
        assert!(!maze.is_free(0, 0));
        // 4 cells joined by 3 passages
        let passages = (0..5)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .filter(|&(x, y)| (x + y) % 2 == 1 && maze.is_free(x, y))
            .count();
        assert_eq!(passages, 3);
    }

    #[test]
    fn maze_result_alias() {
        fn build() -> MazeResult<Maze> {
            Maze::new(7, 7, 1)
        }
        assert!(build().is_ok());
    }
}
