//! Metamorphic tests for maze generation.
//!
//! Instead of checking specific outputs these tests check relationships
//! between related runs:
//!
//! 1. **Normalization Invariance**: requests that normalize to the same node
//!    grid produce the same maze
//! 2. **Stream Equivalence**: the seeded builder and an explicitly passed
//!    stream with the same seed agree
//! 3. **Rendering Consistency**: every text rendering encodes the same walls

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use labyrinth::{Maze, MazeBuilder, Mt19937, SeedableRng, BLOCKED_TOKEN, FREE_TOKEN};
use proptest::prelude::*;

use crate::common::MAZE_CASES;

#[test]
fn even_request_matches_next_lower_odd() {
    for seed in [0, 1, 42, 9000] {
        assert_eq!(
            Maze::new(30, 20, seed).unwrap(),
            Maze::new(29, 19, seed).unwrap()
        );
    }
}

#[test]
fn clamped_requests_match_minimum() {
    let minimum = Maze::new(5, 15, 3).unwrap();
    for width in 0..5 {
        assert_eq!(Maze::new(width, 15, 3).unwrap(), minimum);
    }
}

#[test]
fn rendering_tokens_do_not_change_walls() {
    let maze = Maze::new(33, 21, 14).unwrap();
    let hashes = maze.render("#", ".");
    let blocks = maze.to_string();
    let hash_lines: Vec<&str> = hashes.lines().collect();
    let block_lines: Vec<&str> = blocks.lines().collect();
    assert_eq!(hash_lines.len(), block_lines.len());
    for (hash_line, block_line) in hash_lines.iter().zip(&block_lines) {
        let translated = hash_line.replace('#', BLOCKED_TOKEN).replace('.', FREE_TOKEN);
        assert_eq!(&translated, block_line);
    }
}

#[test]
fn rendering_round_trips_through_is_free() {
    let maze = Maze::new(27, 15, 5).unwrap();
    let text = maze.render("#", " ");
    for (y, line) in text.lines().enumerate() {
        for (x, ch) in line.chars().enumerate() {
            assert_eq!(ch == ' ', maze.is_free(x as i32, y as i32), "pixel ({x}, {y})");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: MAZE_CASES,
        ..ProptestConfig::default()
    })]

    /// Property: normalization is applied before anything depends on the size.
    #[test]
    fn prop_even_and_odd_requests_agree(
        half_width in 3u32..60,
        half_height in 3u32..60,
        seed in any::<u32>(),
    ) {
        let even = Maze::new(half_width * 2, half_height * 2, seed).unwrap();
        let odd = Maze::new(half_width * 2 - 1, half_height * 2 - 1, seed).unwrap();
        prop_assert_eq!(even, odd);
    }

    /// Property: the built-in seeded stream is plain MT19937.
    #[test]
    fn prop_seeded_builder_equals_explicit_stream(
        width in 5u32..120,
        height in 5u32..120,
        seed in any::<u32>(),
    ) {
        let seeded = MazeBuilder::new(width, height).with_seed(seed).build().unwrap();
        let mut rng = Mt19937::seed_from_u32(seed);
        let streamed = MazeBuilder::new(width, height).build_with_rng(&mut rng).unwrap();
        prop_assert_eq!(seeded.fingerprint(), streamed.fingerprint());
    }
}
