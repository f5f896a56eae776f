//! Convenient re-exports for common usage.
//!
//! ```rust
//! use labyrinth::prelude::*;
//!
//! let maze = MazeBuilder::new(31, 31)
//!     .with_seed(5)
//!     .with_config(GeneratorConfig::thorough())
//!     .build()?;
//! assert!(maze.is_free(1, 1));
//! # Ok::<(), MazeError>(())
//! ```
//!
//! # What's Included
//!
//! - **Maze types**: [`Maze`], [`MazeBuilder`], [`GenerationStats`]
//! - **Configuration**: [`GeneratorConfig`]
//! - **Random streams**: [`Mt19937`], [`Lcg32`], [`Rng`], [`SeedableRng`]
//! - **Error handling**: [`MazeError`], [`MazeResult`]

pub use crate::{GenerationStats, GeneratorConfig, Maze, MazeBuilder};

pub use crate::{Lcg32, Mt19937, Rng, SeedableRng};

pub use crate::{MazeError, MazeResult};
