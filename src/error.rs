use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// This enum contains all errors this library can return. Maze construction
/// returns a [`MazeResult<Maze>`].
///
/// [`MazeResult<Maze>`]: crate::MazeResult
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MazeError {
    /// The normalized node grid has too many interior nodes for the dense
    /// generation arena. Choose smaller dimensions.
    GridTooLarge {
        /// Node-grid width after normalization.
        node_width: u64,
        /// Node-grid height after normalization.
        node_height: u64,
        /// `(node_width - 2) * (node_height - 2)`.
        interior_nodes: u64,
        /// The exclusive upper bound on interior nodes that was exceeded.
        limit: u64,
    },
    /// A [`GeneratorConfig`] failed validation.
    ///
    /// [`GeneratorConfig`]: crate::GeneratorConfig
    InvalidConfig {
        /// Further specifies which setting was invalid.
        info: String,
    },
}

impl Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GridTooLarge {
                node_width,
                node_height,
                interior_nodes,
                limit,
            } => {
                write!(
                    f,
                    "Grid of {}x{} nodes is out of range: {} interior nodes, must be below {}",
                    node_width, node_height, interior_nodes, limit
                )
            },
            Self::InvalidConfig { info } => {
                write!(f, "Invalid generator config: {}", info)
            },
        }
    }
}

impl Error for MazeError {}
