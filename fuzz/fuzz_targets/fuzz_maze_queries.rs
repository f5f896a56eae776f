//! Fuzz target for maze queries.
//!
//! Builds a fixed set of mazes once and checks arbitrary coordinates against
//! them:
//!
//! - No panics for any `i32` coordinate or `usize` node index
//! - Out-of-range pixels are never free and out-of-range nodes are walls
//! - `is_wall_between` agrees with `is_free` on the pixel between two cells

#![no_main]

use arbitrary::Arbitrary;
use labyrinth::Maze;
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

#[derive(Debug, Arbitrary)]
enum Query {
    IsFree { x: i32, y: i32 },
    Walls { index: usize },
    Between { from: (i32, i32), to: (i32, i32) },
}

#[derive(Debug, Arbitrary)]
struct QueryInput {
    maze: u8,
    queries: Vec<Query>,
}

fn mazes() -> &'static [Maze] {
    static MAZES: OnceLock<Vec<Maze>> = OnceLock::new();
    MAZES.get_or_init(|| {
        [(5, 5, 0), (21, 11, 1), (5, 301, 2), (301, 5, 3), (99, 99, 4)]
            .into_iter()
            .map(|(w, h, seed)| Maze::new(w, h, seed).expect("small mazes always build"))
            .collect()
    })
}

fuzz_target!(|input: QueryInput| {
    let mazes = mazes();
    let maze = &mazes[usize::from(input.maze) % mazes.len()];
    let width = maze.pix_width() as i32;
    let height = maze.pix_height() as i32;
    let nodes = (maze.node_width() * maze.node_height()) as usize;

    for query in input.queries {
        match query {
            Query::IsFree { x, y } => {
                let free = maze.is_free(x, y);
                if x < 0 || y < 0 || x >= width || y >= height {
                    assert!(!free);
                }
            },
            Query::Walls { index } => {
                let right = maze.has_right_wall(index);
                let down = maze.has_down_wall(index);
                if index >= nodes {
                    assert!(right && down);
                }
            },
            Query::Between { from, to } => {
                let wall = maze.is_wall_between(from, to);
                let dx = i64::from(to.0) - i64::from(from.0);
                let dy = i64::from(to.1) - i64::from(from.1);
                let adjacent = matches!((dx.abs(), dy.abs()), (2, 0) | (0, 2));
                let cells = maze.is_free(from.0, from.1)
                    && maze.is_free(to.0, to.1)
                    && from.0 % 2 == 1
                    && from.1 % 2 == 1
                    && to.0 % 2 == 1
                    && to.1 % 2 == 1;
                if adjacent && cells {
                    let mid = ((from.0 + to.0) / 2, (from.1 + to.1) / 2);
                    assert_eq!(wall, !maze.is_free(mid.0, mid.1));
                } else {
                    assert!(wall);
                }
            },
        }
    }
});
