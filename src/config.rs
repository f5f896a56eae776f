//! Tunables of the two-phase generator.

use crate::{MazeError, MazeResult};

/// Hard upper bound on interior nodes: component ids live in 30 bits of the
/// packed node word, and `width * height` stays below `2^30` for every grid
/// with fewer than `2^28` interior nodes.
pub const MAX_INTERIOR_NODES: u64 = 1 << 28;

/// Configuration of the random-sampling phase and the size cap.
///
/// The phase-1 batch size is `width * height * batch_per_node`, clamped to
/// `[min_batch, max_batch]`. Phase 1 stops after the first batch that joins
/// fewer than `batch / stall_divisor` edges (further reduced by powers of ten
/// for astronomically large edge counts). Everything left over is handled by
/// the exhaustive phase-2 sweep, so every valid configuration still produces
/// a perfect maze; only the layout and the running time change.
///
/// With the [`Default`] values a maze matches the reference game's whenever
/// phase 1 joins every node (`GenerationStats::sweep_joins == 0`). The phase-2
/// shuffle runs from the last candidate down, so mazes that need the sweep
/// differ from the game's.
///
/// # Forward Compatibility
///
/// New fields may be added to this struct in future versions. Use the
/// `..GeneratorConfig::default()` pattern when constructing instances.
///
/// # Example
///
/// ```
/// use labyrinth::{GeneratorConfig, MazeBuilder};
///
/// let config = GeneratorConfig {
///     max_batch: 500_000,
///     ..GeneratorConfig::default()
/// };
/// let maze = MazeBuilder::new(201, 201)
///     .with_seed(3)
///     .with_config(config)
///     .build()
///     .unwrap();
/// assert_eq!(maze.pix_width(), 201);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[must_use = "GeneratorConfig has no effect unless passed to MazeBuilder::with_config()"]
pub struct GeneratorConfig {
    /// Lower clamp of the phase-1 batch size.
    ///
    /// Default: 100
    pub min_batch: u64,

    /// Upper clamp of the phase-1 batch size.
    ///
    /// Default: 2_000_000
    pub max_batch: u64,

    /// Samples per node and batch, before clamping.
    ///
    /// Default: 2
    pub batch_per_node: u64,

    /// A batch joining fewer than `batch / stall_divisor` edges ends phase 1.
    ///
    /// Default: 20
    pub stall_divisor: u64,

    /// Exclusive upper bound on `(node_width - 2) * (node_height - 2)`.
    ///
    /// Default and maximum: `2^28`
    pub max_interior_nodes: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            min_batch: 100,
            max_batch: 2_000_000,
            batch_per_node: 2,
            stall_divisor: 20,
            max_interior_nodes: MAX_INTERIOR_NODES,
        }
    }
}

impl GeneratorConfig {
    /// Creates a new `GeneratorConfig` with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Smaller batches that give up on random sampling early.
    ///
    /// Shifts more of the work to the shuffled sweep, which allocates a
    /// candidate list proportional to the unjoined edges.
    pub fn compact() -> Self {
        Self {
            min_batch: 50,
            max_batch: 250_000,
            batch_per_node: 1,
            stall_divisor: 10,
            ..Self::default()
        }
    }

    /// Larger batches that keep sampling while it is even mildly productive.
    ///
    /// Leaves fewer edges for the sweep at the cost of more wasted draws.
    pub fn thorough() -> Self {
        Self {
            min_batch: 1_000,
            max_batch: 8_000_000,
            batch_per_node: 4,
            stall_divisor: 50,
            ..Self::default()
        }
    }

    /// Checks that the settings can drive a generation run.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::InvalidConfig`] if a batch bound or divisor is
    /// zero, `min_batch > max_batch`, or `max_interior_nodes` is zero or
    /// above [`MAX_INTERIOR_NODES`].
    pub fn validate(&self) -> MazeResult<()> {
        let invalid = |info: String| Err(MazeError::InvalidConfig { info });
        if self.min_batch == 0 {
            return invalid("min_batch must be at least 1".to_owned());
        }
        if self.min_batch > self.max_batch {
            return invalid(format!(
                "min_batch ({}) must not exceed max_batch ({})",
                self.min_batch, self.max_batch
            ));
        }
        if self.batch_per_node == 0 {
            return invalid("batch_per_node must be at least 1".to_owned());
        }
        if self.stall_divisor == 0 {
            return invalid("stall_divisor must be at least 1".to_owned());
        }
        if self.max_interior_nodes == 0 || self.max_interior_nodes > MAX_INTERIOR_NODES {
            return invalid(format!(
                "max_interior_nodes ({}) must be in 1..={}",
                self.max_interior_nodes, MAX_INTERIOR_NODES
            ));
        }
        Ok(())
    }

    /// Phase-1 batch size for a grid of `nodes` nodes.
    #[must_use]
    pub fn batch_limit(&self, nodes: u64) -> u64 {
        nodes
            .saturating_mul(self.batch_per_node)
            .clamp(self.min_batch, self.max_batch)
    }

    /// Minimum joins per batch for phase 1 to keep going.
    ///
    /// `full_size` is the number of candidate edges of one orientation,
    /// `(width - 1) * (height - 1)`.
    #[must_use]
    pub fn stall_threshold(&self, batch_limit: u64, full_size: u64) -> u64 {
        let mut limit = batch_limit;
        if full_size > 1_000_000_000 {
            limit /= 10;
            if full_size > 10_000_000_000 {
                limit /= 10;
                if full_size > 100_000_000_000 {
                    limit /= 10;
                    if full_size > 1_000_000_000_000 {
                        limit /= 10;
                    }
                }
            }
        }
        limit / self.stall_divisor
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

    #[test]
    fn test_default_values() {
        let config = GeneratorConfig::default();
        assert_eq!(config.min_batch, 100);
        assert_eq!(config.max_batch, 2_000_000);
        assert_eq!(config.batch_per_node, 2);
        assert_eq!(config.stall_divisor, 20);
        assert_eq!(config.max_interior_nodes, 1 << 28);
        assert_eq!(GeneratorConfig::new(), config);
    }

    #[test]
    fn test_presets_validate() {
        GeneratorConfig::default().validate().unwrap();
        GeneratorConfig::compact().validate().unwrap();
        GeneratorConfig::thorough().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_zero_min_batch() {
        let config = GeneratorConfig {
            min_batch: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(MazeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_inverted_batch_bounds() {
        let config = GeneratorConfig {
            min_batch: 10,
            max_batch: 5,
            ..GeneratorConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn test_validate_rejects_zero_divisors() {
        let per_node = GeneratorConfig {
            batch_per_node: 0,
            ..GeneratorConfig::default()
        };
        let stall = GeneratorConfig {
            stall_divisor: 0,
            ..GeneratorConfig::default()
        };
        assert!(per_node.validate().is_err());
        assert!(stall.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_interior_cap_above_packing_limit() {
        let config = GeneratorConfig {
            max_interior_nodes: MAX_INTERIOR_NODES + 1,
            ..GeneratorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_batch_limit_clamps() {
        let config = GeneratorConfig::default();
        assert_eq!(config.batch_limit(9), 100);
        assert_eq!(config.batch_limit(10_000), 20_000);
        assert_eq!(config.batch_limit(5_000_000), 2_000_000);
        assert_eq!(config.batch_limit(u64::MAX), 2_000_000);
    }

    #[test]
    fn test_stall_threshold_scaling() {
        let config = GeneratorConfig::default();
        assert_eq!(config.stall_threshold(100, 4), 5);
        assert_eq!(config.stall_threshold(2_000_000, 1_000_000_000), 100_000);
        assert_eq!(config.stall_threshold(2_000_000, 1_000_000_001), 10_000);
        assert_eq!(config.stall_threshold(2_000_000, 10_000_000_001), 1_000);
        assert_eq!(config.stall_threshold(2_000_000, 100_000_000_001), 100);
        assert_eq!(config.stall_threshold(2_000_000, 1_000_000_000_001), 10);
    }

    #[test]
    fn test_serde_roundtrip_through_json() {
        let config = GeneratorConfig::thorough();
        let json = serde_json::to_string(&config).unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
