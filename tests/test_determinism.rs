//! Determinism and reference-value tests.
//!
//! The fingerprints and renderings below pin the exact output of the default
//! generator. Any change to the random stream, the link decoding, the merge
//! or the sweep order shows up here.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]

mod common;

use labyrinth::prelude::*;

#[test]
fn test_same_inputs_same_maze() {
    for (width, height, seed) in [(5, 5, 0), (31, 17, 1), (101, 61, 7), (99, 99, u32::MAX)] {
        let a = Maze::new(width, height, seed).unwrap();
        let b = Maze::new(width, height, seed).unwrap();
        assert_eq!(a, b, "({width}, {height}, {seed})");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.to_string(), b.to_string());
    }
}

#[test]
fn test_different_seeds_differ() {
    let mazes: Vec<Maze> = (0..8).map(|seed| Maze::new(41, 41, seed).unwrap()).collect();
    for i in 0..mazes.len() {
        for j in i + 1..mazes.len() {
            assert_ne!(mazes[i].fingerprint(), mazes[j].fingerprint(), "seeds {i} and {j}");
        }
    }
}

#[test]
fn test_reference_fingerprints() {
    let cases = [
        ((5, 5, 1_234_567_890), 0x4ef0_08b8_f8c2_2b05_u64),
        ((21, 11, 1_234_567_890), 0x64dd_7afa_8ddd_b13c),
        ((41, 41, 10), 0xd50d_7b32_662b_f586),
        ((11, 11, 2024), 0x6808_fa3d_4fe0_bf93),
        ((101, 61, 7), 0x3373_c4dc_04bd_7992),
        ((401, 3, 99), 0x7fbe_220e_1a81_dbc6),
        ((3, 401, 99), 0x8799_1c7e_c5fc_2a58),
    ];
    for ((width, height, seed), expected) in cases {
        let maze = Maze::new(width, height, seed).unwrap();
        assert_eq!(
            maze.fingerprint(),
            expected,
            "fingerprint of ({width}, {height}, {seed})"
        );
    }
}

#[test]
fn test_reference_rendering() {
    let maze = Maze::new(21, 11, 1_234_567_890).unwrap();
    let expected = "\
#####################
# # # #     #     # #
# # # ##### ##### # #
#   # #     #       #
### # ### ### ### ###
#         #     # # #
### # ### # # # # # #
#   #   #   # # #   #
##### ##### # ##### #
#     #     #   #   #
#####################
";
    assert_eq!(maze.render("#", " "), expected);
}

#[test]
fn test_reference_rendering_square() {
    let maze = Maze::new(11, 11, 2024).unwrap();
    let expected = "\
###########
#         #
##### #####
#       # #
# # ##### #
# # #     #
### ### ###
#         #
# ### ### #
# #   #   #
###########
";
    assert_eq!(maze.render("#", ""), expected);
}

#[test]
fn test_reference_stats() {
    let maze = Maze::new(101, 61, 7).unwrap();
    let stats = maze.stats();
    assert_eq!(stats.batch_limit, 3162);
    assert_eq!(stats.stall_threshold, 158);
    assert_eq!(stats.batches, 2);
    assert_eq!(stats.samples, 2 * 3162);
    assert_eq!(stats.sampled_joins, 1421);
    assert_eq!(stats.sweep_candidates, 0);
    assert_eq!(stats.total_joins(), 49 * 29);
}

#[test]
fn test_default_config_reaches_sweep_at_ordinary_size() {
    let maze = Maze::new(201, 101, 99).unwrap();
    let stats = maze.stats();
    assert_eq!(stats.batch_limit, 10302);
    assert_eq!(stats.stall_threshold, 515);
    assert_eq!(stats.batches, 2);
    assert_eq!(stats.sampled_joins, 4850);
    assert_eq!(stats.sweep_candidates, 4);
    assert_eq!(stats.sweep_joins, 1);
    assert_eq!(maze.fingerprint(), 0x1e38_6a0d_f24f_17e5);
    common::assert_perfect(&maze);
}

#[test]
fn test_reference_sweep_with_compact_config() {
    let maze = MazeBuilder::new(201, 201)
        .with_seed(3)
        .with_config(GeneratorConfig::compact())
        .build()
        .unwrap();
    let stats = maze.stats();
    assert_eq!(stats.batches, 3);
    assert_eq!(stats.sampled_joins, 9773);
    assert_eq!(stats.sweep_candidates, 122);
    assert_eq!(stats.sweep_joins, 28);
    assert_eq!(maze.fingerprint(), 0xccfb_3e71_99ae_4abe);
    common::assert_perfect(&maze);
}

#[test]
fn test_single_sample_batches_lean_on_sweep() {
    let config = GeneratorConfig {
        min_batch: 1,
        max_batch: 1,
        ..GeneratorConfig::default()
    };
    let maze = MazeBuilder::new(63, 63)
        .with_seed(31337)
        .with_config(config)
        .build()
        .unwrap();
    let stats = maze.stats();
    assert_eq!(stats.stall_threshold, 1);
    assert_eq!(stats.batches, 12);
    assert_eq!(stats.sweep_candidates, 1848);
    assert_eq!(stats.sweep_joins, 889);
    assert_eq!(maze.fingerprint(), 0x63ec_34c9_0f1b_19d8);
    common::assert_perfect(&maze);
}

#[test]
fn test_config_changes_layout_not_shape() {
    let default = Maze::new(201, 201, 3).unwrap();
    let compact = MazeBuilder::new(201, 201)
        .with_seed(3)
        .with_config(GeneratorConfig::compact())
        .build()
        .unwrap();
    assert_eq!(default.pix_width(), compact.pix_width());
    assert_ne!(default, compact);
    common::assert_perfect(&default);
    common::assert_perfect(&compact);
}

#[test]
fn test_seed_zero_is_a_regular_seed() {
    let zero = Maze::new(61, 61, 0).unwrap();
    let default_seed = Maze::new(61, 61, 5489).unwrap();
    assert_ne!(zero, default_seed);
}

#[test]
fn test_caller_stream_reproduces_seeded_maze() {
    let mut rng = Mt19937::seed_from_u32(99);
    let from_stream = MazeBuilder::new(401, 3).build_with_rng(&mut rng).unwrap();
    assert_eq!(from_stream.fingerprint(), 0x7fbe_220e_1a81_dbc6);
}
