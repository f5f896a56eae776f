//! Fuzz target for maze construction.
//!
//! Verifies for arbitrary requested sizes, seeds and generator configs:
//!
//! 1. **No panics**: construction returns `Ok` or a `MazeError`
//! 2. **Perfect maze**: every `Ok` maze has all cells connected and no cycle
//! 3. **Clean rejection**: invalid configs and oversized grids fail before
//!    anything is generated

#![no_main]

use arbitrary::Arbitrary;
use labyrinth::{GeneratorConfig, MazeBuilder, MazeError};
use libfuzzer_sys::fuzz_target;

/// Upper bound on requested pixel dimensions to keep iterations fast
const MAX_REQUEST: u32 = 400;

#[derive(Debug, Arbitrary)]
struct ConstructionInput {
    width: u32,
    height: u32,
    seed: u32,
    config: Option<FuzzConfig>,
}

#[derive(Debug, Arbitrary)]
struct FuzzConfig {
    min_batch: u16,
    max_batch: u16,
    batch_per_node: u8,
    stall_divisor: u8,
    max_interior_nodes: u32,
}

impl FuzzConfig {
    fn to_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            min_batch: u64::from(self.min_batch),
            max_batch: u64::from(self.max_batch),
            batch_per_node: u64::from(self.batch_per_node),
            stall_divisor: u64::from(self.stall_divisor),
            max_interior_nodes: u64::from(self.max_interior_nodes),
        }
    }
}

fuzz_target!(|input: ConstructionInput| {
    let width = input.width % MAX_REQUEST;
    let height = input.height % MAX_REQUEST;
    let mut builder = MazeBuilder::new(width, height).with_seed(input.seed);
    let config = input.config.as_ref().map(FuzzConfig::to_config);
    if let Some(config) = config {
        builder = builder.with_config(config);
    }

    match builder.build() {
        Ok(maze) => {
            let cells = u64::from(maze.node_width() - 1) * u64::from(maze.node_height() - 1);
            let mut passages = 0u64;
            for y in 0..maze.pix_height() as i32 {
                for x in 0..maze.pix_width() as i32 {
                    if (x + y) % 2 == 1 && maze.is_free(x, y) {
                        passages += 1;
                    }
                }
            }
            assert_eq!(passages, cells - 1, "not a spanning tree");
            assert_eq!(
                maze.stats().total_joins(),
                u64::from(maze.node_width() - 2) * u64::from(maze.node_height() - 2)
            );
        },
        Err(MazeError::InvalidConfig { .. }) => {
            let config = config.expect("default config is always valid");
            assert!(config.validate().is_err());
        },
        Err(MazeError::GridTooLarge {
            interior_nodes,
            limit,
            ..
        }) => {
            assert!(interior_nodes >= limit);
        },
    }
});
