//! Two-phase spanning-tree construction over a [`NodeGrid`].
//!
//! Phase 1 samples random links in fixed-size batches and joins those that
//! connect two different components. Sampling with replacement avoids
//! materializing the full link list, but becomes unproductive once most
//! nodes are joined, so the phase ends after the first batch whose join count
//! falls below the stall threshold.
//!
//! Phase 2 collects every link still joinable, shuffles the list with the
//! same random stream and joins in that order. It always runs and is what
//! guarantees a single component for every grid shape, including strips only
//! one cell wide.

use std::sync::Arc;

use tracing::{debug, trace};
use web_time::{Duration, Instant};

use crate::config::GeneratorConfig;
use crate::grid::{Link, NodeGrid};
use crate::report_violation_to;
use crate::rng::Rng;
use crate::telemetry::{ViolationKind, ViolationObserver, ViolationSeverity};

/// Counters collected while generating a maze.
///
/// All counts refer to links between nodes. The total of both join counters
/// equals the number of interior nodes for every successfully generated maze.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct GenerationStats {
    /// Samples drawn per phase-1 batch.
    pub batch_limit: u64,
    /// Joins per batch below which phase 1 ended.
    pub stall_threshold: u64,
    /// Phase-1 batches run, including the final unproductive one.
    pub batches: u64,
    /// Random links sampled in phase 1.
    pub samples: u64,
    /// Links joined in phase 1.
    pub sampled_joins: u64,
    /// Joinable links collected for the phase-2 sweep.
    pub sweep_candidates: u64,
    /// Links joined in phase 2.
    pub sweep_joins: u64,
    /// Wall-clock time spent in both phases.
    pub elapsed: Duration,
}

impl GenerationStats {
    /// Links joined by both phases.
    #[must_use]
    pub const fn total_joins(&self) -> u64 {
        self.sampled_joins + self.sweep_joins
    }
}

/// Joins every node of `grid` to the border component.
pub(crate) fn generate<R: Rng + ?Sized>(
    grid: &mut NodeGrid,
    rng: &mut R,
    config: &GeneratorConfig,
    observer: &Option<Arc<dyn ViolationObserver>>,
) -> GenerationStats {
    let started = Instant::now();
    let width = grid.width() as u64;
    let height = grid.height() as u64;
    let interior = (width - 2) * (height - 2);

    let mut stats = GenerationStats {
        batch_limit: config.batch_limit(width * height),
        ..GenerationStats::default()
    };
    let full_size = (width - 1) * (height - 1);
    stats.stall_threshold = config.stall_threshold(stats.batch_limit, full_size);
    if stats.stall_threshold == 0 {
        // A zero threshold would keep phase 1 sampling forever
        report_violation_to!(
            observer,
            ViolationSeverity::Warning,
            ViolationKind::Generation,
            { "batch_limit" => stats.batch_limit, "stall_divisor" => config.stall_divisor },
            "stall threshold of batch {} / divisor {} is zero, using 1",
            stats.batch_limit,
            config.stall_divisor
        );
        stats.stall_threshold = 1;
    }

    debug!(
        width,
        height,
        interior,
        batch_limit = stats.batch_limit,
        stall_threshold = stats.stall_threshold,
        "generating maze"
    );

    sample_links(grid, rng, full_size, &mut stats);
    debug!(
        batches = stats.batches,
        samples = stats.samples,
        joins = stats.sampled_joins,
        remaining = interior - stats.sampled_joins,
        "random sampling finished"
    );

    sweep_links(grid, rng, &mut stats);
    stats.elapsed = started.elapsed();
    debug!(
        candidates = stats.sweep_candidates,
        joins = stats.sweep_joins,
        elapsed_us = stats.elapsed.as_micros() as u64,
        "maze generated"
    );

    if stats.total_joins() != interior {
        let detached = grid.detached_nodes();
        report_violation_to!(
            observer,
            ViolationSeverity::Critical,
            ViolationKind::Connectivity,
            { "joins" => stats.total_joins(), "interior" => interior, "detached" => detached },
            "maze is not a spanning tree, {} interior nodes detached",
            detached
        );
    }
    crate::debug_check_invariants!(observer, grid, "after generation");

    stats
}

/// Phase 1: random batches until one joins fewer than the stall threshold.
fn sample_links<R: Rng + ?Sized>(
    grid: &mut NodeGrid,
    rng: &mut R,
    full_size: u64,
    stats: &mut GenerationStats,
) {
    let width = grid.width() as u64;
    let row = width - 1;
    loop {
        let mut joins = 0u64;
        for _ in 0..stats.batch_limit {
            let mut next = rng.below(full_size * 2);
            let right = next >= full_size;
            if right {
                next -= full_size;
            }
            let pos = ((next / row) * width + next % row) as usize;
            let link = if right {
                Link::Right(pos)
            } else {
                Link::Down(pos)
            };
            if grid.try_join(link) {
                joins += 1;
            }
        }
        stats.batches += 1;
        stats.samples += stats.batch_limit;
        stats.sampled_joins += joins;
        trace!(batch = stats.batches, joins, "sampling batch");
        if joins < stats.stall_threshold {
            break;
        }
    }
}

/// Phase 2: join every remaining candidate in shuffled order.
fn sweep_links<R: Rng + ?Sized>(grid: &mut NodeGrid, rng: &mut R, stats: &mut GenerationStats) {
    let mut links = grid.joinable_links();
    stats.sweep_candidates = links.len() as u64;

    for i in (1..links.len()).rev() {
        let j = rng.below(i as u64 + 1) as usize;
        links.swap(i, j);
    }

    for link in links {
        if grid.try_join(link) {
            stats.sweep_joins += 1;
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::rng::{Lcg32, Mt19937};
    use crate::telemetry::CollectingObserver;

    fn run(
        width: usize,
        height: usize,
        seed: u32,
        config: &GeneratorConfig,
    ) -> (NodeGrid, GenerationStats) {
        let mut grid = NodeGrid::new(width, height);
        let mut rng = Mt19937::new(seed);
        let stats = generate(&mut grid, &mut rng, config, &None);
        (grid, stats)
    }

    #[test]
    fn test_generate_joins_every_node() {
        let (grid, stats) = run(21, 13, 99, &GeneratorConfig::default());
        assert_eq!(grid.detached_nodes(), 0);
        assert_eq!(stats.total_joins(), 19 * 11);
        assert!(grid.joinable_links().is_empty());
    }

    #[test]
    fn test_generate_stats_shape() {
        let (_, stats) = run(21, 21, 5, &GeneratorConfig::default());
        // 441 nodes * 2 samples
        assert_eq!(stats.batch_limit, 882);
        assert_eq!(stats.stall_threshold, 44);
        assert!(stats.batches >= 1);
        assert_eq!(stats.samples, stats.batches * stats.batch_limit);
        assert!(stats.sweep_joins <= stats.sweep_candidates);
    }

    #[test]
    fn test_single_interior_node() {
        let (grid, stats) = run(3, 3, 0, &GeneratorConfig::default());
        assert_eq!(grid.detached_nodes(), 0);
        assert_eq!(stats.total_joins(), 1);
    }

    #[test]
    fn test_thin_strip_is_completed_by_sweep() {
        // One interior row; sampling alone rarely finishes it
        let (grid, stats) = run(400, 3, 17, &GeneratorConfig::compact());
        assert_eq!(grid.detached_nodes(), 0);
        assert_eq!(stats.total_joins(), 398);
    }

    #[test]
    fn test_same_seed_same_links() {
        let config = GeneratorConfig::default();
        let (a, _) = run(31, 17, 4242, &config);
        let (b, _) = run(31, 17, 4242, &config);
        assert_eq!(a.into_walls(), b.into_walls());
    }

    #[test]
    fn test_legacy_stream_also_completes() {
        let mut grid = NodeGrid::new(25, 25);
        let mut rng = Lcg32::new(7);
        let stats = generate(&mut grid, &mut rng, &GeneratorConfig::default(), &None);
        assert_eq!(grid.detached_nodes(), 0);
        assert_eq!(stats.total_joins(), 23 * 23);
    }

    #[test]
    fn test_zero_stall_threshold_is_raised() {
        let collecting = Arc::new(CollectingObserver::new());
        let observer: Option<Arc<dyn ViolationObserver>> = Some(collecting.clone());
        let config = GeneratorConfig {
            min_batch: 1,
            max_batch: 1,
            stall_divisor: 50,
            ..GeneratorConfig::default()
        };
        let mut grid = NodeGrid::new(9, 9);
        let mut rng = Mt19937::new(1);
        let stats = generate(&mut grid, &mut rng, &config, &observer);

        assert_eq!(stats.stall_threshold, 1);
        assert_eq!(grid.detached_nodes(), 0);
        assert_eq!(
            collecting.violations_of_kind(ViolationKind::Generation).len(),
            1
        );
        assert!(!collecting.has_violation(ViolationKind::Connectivity));
    }
}
