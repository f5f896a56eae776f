//! Common test infrastructure shared across integration tests.
//!
//! ```ignore
//! mod common;
//! use common::{assert_perfect, free_pixels};
//! ```

#![allow(dead_code)]

use labyrinth::Maze;

#[path = "../../src/test_config.rs"]
mod test_config;

/// Property-test cases for properties that build one maze per case, shared
/// with the unit tests in `src/`.
pub const MAZE_CASES: u32 = test_config::maze_case_count();

/// Every free pixel of the maze, row-major.
pub fn free_pixels(maze: &Maze) -> Vec<(i32, i32)> {
    let width = maze.pix_width() as i32;
    let height = maze.pix_height() as i32;
    (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .filter(|&(x, y)| maze.is_free(x, y))
        .collect()
}

/// Number of free pixels reachable from `(1, 1)` over orthogonal steps.
pub fn reachable_from_start(maze: &Maze) -> usize {
    let width = maze.pix_width() as usize;
    let height = maze.pix_height() as usize;
    let mut seen = vec![false; width * height];
    let mut stack = vec![(1i32, 1i32)];
    seen[width + 1] = true;
    let mut count = 0;
    while let Some((x, y)) = stack.pop() {
        count += 1;
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = (x + dx, y + dy);
            if maze.is_free(nx, ny) {
                let idx = nx as usize + ny as usize * width;
                if !seen[idx] {
                    seen[idx] = true;
                    stack.push((nx, ny));
                }
            }
        }
    }
    count
}

/// Number of cells (odd/odd pixels).
pub fn cell_count(maze: &Maze) -> usize {
    (maze.node_width() as usize - 1) * (maze.node_height() as usize - 1)
}

/// Asserts that every free pixel is reachable and that the cells form a tree.
pub fn assert_perfect(maze: &Maze) {
    let free = free_pixels(maze).len();
    let cells = cell_count(maze);
    assert_eq!(
        reachable_from_start(maze),
        free,
        "maze {}x{} is not connected",
        maze.pix_width(),
        maze.pix_height()
    );
    // A spanning tree over the cells has exactly cells - 1 passages
    assert_eq!(
        free - cells,
        cells - 1,
        "maze {}x{} contains a cycle",
        maze.pix_width(),
        maze.pix_height()
    );
}

/// Asserts that the outer ring of pixels is entirely wall.
pub fn assert_border_sealed(maze: &Maze) {
    let width = maze.pix_width() as i32;
    let height = maze.pix_height() as i32;
    for x in 0..width {
        assert!(!maze.is_free(x, 0), "top border open at x={x}");
        assert!(!maze.is_free(x, height - 1), "bottom border open at x={x}");
    }
    for y in 0..height {
        assert!(!maze.is_free(0, y), "left border open at y={y}");
        assert!(!maze.is_free(width - 1, y), "right border open at y={y}");
    }
}
