//! Invariant tests on finished mazes.

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use crate::common::{assert_border_sealed, assert_perfect, cell_count, free_pixels};
use labyrinth::telemetry::InvariantChecker;
use labyrinth::{Maze, MazeError, MIN_DIMENSION};

#[test]
fn scenario_smallest_seeded_maze_is_perfect() {
    let maze = Maze::new(5, 5, 1_234_567_890).unwrap();
    assert_perfect(&maze);
    assert!(maze.is_free(1, 1));
    assert!(!maze.is_free(0, 0));
}

#[test]
fn size_boundary_smallest_grid() {
    let maze = Maze::new(5, 5, 0).unwrap();
    assert_eq!((maze.node_width(), maze.node_height()), (3, 3));
    assert_eq!((maze.pix_width(), maze.pix_height()), (5, 5));
    assert_eq!(cell_count(&maze), 4);
}

#[test]
fn size_boundary_tiny_requests_clamp() {
    for request in [0, 1, 2, 3, 4] {
        let maze = Maze::new(request, 9, 1).unwrap();
        assert_eq!(maze.pix_width(), MIN_DIMENSION);
        assert_eq!(maze.pix_height(), 9);
        assert_perfect(&maze);
    }
}

#[test]
fn size_boundary_oversized_rejected() {
    assert!(matches!(
        Maze::new(50_000, 50_000, 0),
        Err(MazeError::GridTooLarge { .. })
    ));
}

#[test]
fn size_boundary_thin_strip_at_cap() {
    // 3 x (2^28 + 1) nodes has exactly 2^28 - 1 interior nodes: the largest
    // accepted strip. Only the rejection side is cheap enough to test here.
    let height = ((1u64 << 28) + 1) * 2 - 1;
    let too_tall = u32::try_from(height + 2).unwrap();
    let err = Maze::new(5, too_tall, 0).unwrap_err();
    assert_eq!(
        err,
        MazeError::GridTooLarge {
            node_width: 3,
            node_height: (1 << 28) + 2,
            interior_nodes: 1 << 28,
            limit: 1 << 28,
        }
    );
}

#[test]
fn border_ring_is_wall() {
    for (width, height, seed) in [(5, 5, 0), (9, 31, 4), (61, 7, 12), (99, 99, 99)] {
        let maze = Maze::new(width, height, seed).unwrap();
        assert_border_sealed(&maze);
    }
}

#[test]
fn finished_maze_passes_invariant_check() {
    for seed in 0..20 {
        let maze = Maze::new(37, 23, seed).unwrap();
        maze.check_invariants().unwrap();
    }
}

#[test]
fn queries_are_idempotent() {
    let maze = Maze::new(51, 41, 8).unwrap();
    let first = free_pixels(&maze);
    for _ in 0..3 {
        assert_eq!(free_pixels(&maze), first);
    }
    let clone = maze.clone();
    assert_eq!(free_pixels(&clone), first);
}

#[test]
fn every_cell_is_free_and_every_pillar_blocked() {
    let maze = Maze::new(45, 33, 21).unwrap();
    let width = maze.pix_width() as i32;
    let height = maze.pix_height() as i32;
    for y in 0..height {
        for x in 0..width {
            match (x % 2, y % 2) {
                (1, 1) => assert!(maze.is_free(x, y)),
                (0, 0) => assert!(!maze.is_free(x, y)),
                _ => {},
            }
        }
    }
}

#[test]
fn wall_between_agrees_with_flood_fill_neighbours() {
    let maze = Maze::new(25, 25, 6).unwrap();
    let mut open_pairs = 0;
    for y in (1..25).step_by(2) {
        for x in (1..25).step_by(2) {
            if !maze.is_wall_between((x, y), (x + 2, y)) {
                open_pairs += 1;
            }
            if !maze.is_wall_between((x, y), (x, y + 2)) {
                open_pairs += 1;
            }
        }
    }
    assert_eq!(open_pairs, cell_count(&maze) - 1);
}

#[test]
fn extreme_aspect_ratios_are_perfect() {
    for (width, height) in [(5, 401), (401, 5), (3, 801), (801, 3), (5, 2001)] {
        let maze = Maze::new(width, height, 77).unwrap();
        assert_perfect(&maze);
        assert_border_sealed(&maze);
    }
}

#[test]
fn maze_shared_across_threads() {
    let maze = std::sync::Arc::new(Maze::new(31, 31, 5).unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let maze = maze.clone();
            std::thread::spawn(move || free_pixels(&maze).len())
        })
        .collect();
    let expected = free_pixels(&maze).len();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
