//! Property-based tests for maze generation.
//!
//! # Properties Tested
//!
//! - Every generated maze is perfect: all free pixels connected, no cycles
//! - The border ring is always wall
//! - Generation is a pure function of size, seed and config
//! - Both join counters add up to the interior node count

// Allow test-specific patterns that are appropriate for test code
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

use crate::common::{assert_border_sealed, assert_perfect, MAZE_CASES};
use labyrinth::telemetry::{CollectingObserver, ViolationKind};
use labyrinth::{GeneratorConfig, Lcg32, Maze, MazeBuilder};
use proptest::prelude::*;
use std::sync::Arc;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Requested pixel dimensions, including values below the minimum
fn dimension_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![0u32..8, 5u32..80, 100u32..300]
}

fn config_strategy() -> impl Strategy<Value = GeneratorConfig> {
    prop_oneof![
        Just(GeneratorConfig::default()),
        Just(GeneratorConfig::compact()),
        Just(GeneratorConfig::thorough()),
        (1u64..200, 1u64..4, 1u64..60).prop_map(|(min_batch, batch_per_node, stall_divisor)| {
            GeneratorConfig {
                min_batch,
                max_batch: min_batch * 4,
                batch_per_node,
                stall_divisor,
                ..GeneratorConfig::default()
            }
        }),
    ]
}

fn interior_nodes(maze: &Maze) -> u64 {
    u64::from(maze.node_width() - 2) * u64::from(maze.node_height() - 2)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: MAZE_CASES,
        ..ProptestConfig::default()
    })]

    /// Property: every maze is perfect, with or without clamping.
    #[test]
    fn prop_maze_is_perfect(
        width in dimension_strategy(),
        height in dimension_strategy(),
        seed in any::<u32>(),
    ) {
        let maze = Maze::new(width, height, seed).unwrap();
        prop_assert!(maze.pix_width() >= 5 && maze.pix_height() >= 5);
        prop_assert_eq!(maze.pix_width() % 2, 1);
        assert_perfect(&maze);
        assert_border_sealed(&maze);
    }

    /// Property: any valid config still yields a perfect maze and no violation.
    #[test]
    fn prop_any_valid_config_is_perfect(
        width in 5u32..120,
        height in 5u32..120,
        seed in any::<u32>(),
        config in config_strategy(),
    ) {
        let observer = Arc::new(CollectingObserver::new());
        let maze = MazeBuilder::new(width, height)
            .with_seed(seed)
            .with_config(config)
            .with_violation_observer(observer.clone())
            .build()
            .unwrap();
        assert_perfect(&maze);
        prop_assert!(!observer.has_violation(ViolationKind::Connectivity));
        prop_assert!(!observer.has_violation(ViolationKind::Invariant));
        prop_assert_eq!(maze.stats().total_joins(), interior_nodes(&maze));
    }

    /// Property: regenerating gives identical walls.
    #[test]
    fn prop_generation_is_deterministic(
        width in dimension_strategy(),
        height in dimension_strategy(),
        seed in any::<u32>(),
    ) {
        let a = Maze::new(width, height, seed).unwrap();
        let b = Maze::new(width, height, seed).unwrap();
        prop_assert_eq!(a.fingerprint(), b.fingerprint());
        prop_assert_eq!(&a, &b);
    }

    /// Property: the legacy stream drives the same algorithm to a perfect maze.
    #[test]
    fn prop_legacy_stream_is_perfect(
        width in 5u32..100,
        height in 5u32..100,
        seed in any::<u32>(),
    ) {
        let mut rng = Lcg32::new(seed);
        let maze = MazeBuilder::new(width, height).build_with_rng(&mut rng).unwrap();
        assert_perfect(&maze);
        prop_assert_eq!(maze.seed(), None);
    }

    /// Property: sampled plus swept joins equal the interior node count and
    /// the sweep never joins more than it collected.
    #[test]
    fn prop_stats_are_consistent(
        width in 5u32..200,
        height in 5u32..200,
        seed in any::<u32>(),
    ) {
        let maze = Maze::new(width, height, seed).unwrap();
        let stats = maze.stats();
        prop_assert_eq!(stats.total_joins(), interior_nodes(&maze));
        prop_assert!(stats.sweep_joins <= stats.sweep_candidates);
        prop_assert!(stats.batches >= 1);
        prop_assert_eq!(stats.samples, stats.batches * stats.batch_limit);
    }
}
