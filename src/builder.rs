use std::sync::Arc;

use crate::config::GeneratorConfig;
use crate::maze::Maze;
use crate::rng::{Mt19937, Rng, SeedableRng};
use crate::telemetry::ViolationObserver;
use crate::MazeResult;

/// The [`MazeBuilder`] builds every [`Maze`].
///
/// Set the seed and any optional settings, then call [`build`] to generate
/// with the built-in [`Mt19937`] stream, or [`build_with_rng`] to drive
/// generation from a caller-owned random stream.
///
/// # Example
///
/// ```
/// use labyrinth::{GeneratorConfig, MazeBuilder};
///
/// let maze = MazeBuilder::new(61, 31)
///     .with_seed(2024)
///     .with_config(GeneratorConfig::compact())
///     .build()
///     .unwrap();
/// assert_eq!(maze.seed(), Some(2024));
/// ```
///
/// [`build`]: Self::build
/// [`build_with_rng`]: Self::build_with_rng
#[must_use = "MazeBuilder must be consumed by calling build() or build_with_rng()"]
pub struct MazeBuilder {
    /// Requested pixel width.
    width: u32,
    /// Requested pixel height.
    height: u32,
    seed: u32,
    config: GeneratorConfig,
    /// Optional observer for clamped dimensions and generation anomalies.
    violation_observer: Option<Arc<dyn ViolationObserver>>,
}

impl std::fmt::Debug for MazeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Destructure so a new field cannot be silently left out
        let Self {
            width,
            height,
            seed,
            config,
            violation_observer,
        } = self;

        f.debug_struct("MazeBuilder")
            .field("width", width)
            .field("height", height)
            .field("seed", seed)
            .field("config", config)
            .field("has_violation_observer", &violation_observer.is_some())
            .finish()
    }
}

impl MazeBuilder {
    /// Starts a builder for a maze of the requested pixel size, seed `0` and
    /// the default [`GeneratorConfig`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            seed: 0,
            config: GeneratorConfig::default(),
            violation_observer: None,
        }
    }

    /// Seed of the built-in [`Mt19937`] stream. Ignored by [`build_with_rng`].
    ///
    /// [`build_with_rng`]: Self::build_with_rng
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the generator tunables. The config is validated on build.
    ///
    /// A non-default config produces a different maze for the same seed.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets a custom observer for violations.
    ///
    /// Without one, violations are logged through [`TracingObserver`].
    ///
    /// ```
    /// use labyrinth::{telemetry::CollectingObserver, MazeBuilder};
    /// use std::sync::Arc;
    ///
    /// let observer = Arc::new(CollectingObserver::new());
    /// let maze = MazeBuilder::new(3, 9)
    ///     .with_violation_observer(observer.clone())
    ///     .build()
    ///     .unwrap();
    ///
    /// // The width was raised to the minimum of 5
    /// assert_eq!(maze.pix_width(), 5);
    /// assert_eq!(observer.len(), 1);
    /// ```
    ///
    /// [`TracingObserver`]: crate::telemetry::TracingObserver
    pub fn with_violation_observer(mut self, observer: Arc<dyn ViolationObserver>) -> Self {
        self.violation_observer = Some(observer);
        self
    }

    /// Consumes the builder and generates the maze from the seeded [`Mt19937`] stream.
    ///
    /// # Errors
    /// - Returns [`InvalidConfig`] if the [`GeneratorConfig`] fails validation.
    /// - Returns [`GridTooLarge`] if the normalized grid exceeds the interior node cap.
    ///
    /// [`InvalidConfig`]: crate::MazeError::InvalidConfig
    /// [`GridTooLarge`]: crate::MazeError::GridTooLarge
    pub fn build(self) -> MazeResult<Maze> {
        let mut rng = Mt19937::seed_from_u32(self.seed);
        Maze::generate(
            self.width,
            self.height,
            Some(self.seed),
            &self.config,
            &self.violation_observer,
            &mut rng,
        )
    }

    /// Consumes the builder and generates the maze from `rng`.
    ///
    /// The stream is borrowed only for the duration of generation; the
    /// resulting maze reports no seed.
    ///
    /// # Errors
    /// Same as [`build`](Self::build). On error no value has been drawn from `rng`.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> MazeResult<Maze> {
        Maze::generate(
            self.width,
            self.height,
            None,
            &self.config,
            &self.violation_observer,
            rng,
        )
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
    use crate::rng::Lcg32;
    use crate::telemetry::{CollectingObserver, ViolationKind, ViolationSeverity};
    use crate::MazeError;

    #[test]
    fn test_builder_defaults() {
        let builder = MazeBuilder::new(21, 11);
        assert_eq!(builder.seed, 0);
        assert_eq!(builder.config, GeneratorConfig::default());
        assert!(builder.violation_observer.is_none());
    }

    #[test]
    fn test_build_matches_maze_new() {
        let built = MazeBuilder::new(31, 19).with_seed(8).build().unwrap();
        let direct = Maze::new(31, 19, 8).unwrap();
        assert_eq!(built, direct);
        assert_eq!(built.fingerprint(), direct.fingerprint());
    }

    #[test]
    fn test_build_with_rng_matches_seeded_stream() {
        let mut rng = Mt19937::new(8);
        let custom = MazeBuilder::new(31, 19).build_with_rng(&mut rng).unwrap();
        let seeded = MazeBuilder::new(31, 19).with_seed(8).build().unwrap();
        assert_eq!(custom, seeded);
        assert_eq!(custom.seed(), None);
    }

    #[test]
    fn test_build_with_dyn_rng() {
        let mut rng = Lcg32::new(3);
        let rng: &mut dyn Rng = &mut rng;
        let maze = MazeBuilder::new(15, 15).build_with_rng(rng).unwrap();
        assert_eq!(maze.stats().total_joins(), 6 * 6);
    }

    #[test]
    fn test_invalid_config_rejected_before_drawing() {
        let config = GeneratorConfig {
            stall_divisor: 0,
            ..GeneratorConfig::default()
        };
        let mut rng = Mt19937::new(1);
        let untouched = rng.clone();
        let result = MazeBuilder::new(21, 21)
            .with_config(config)
            .build_with_rng(&mut rng);
        assert!(matches!(result, Err(MazeError::InvalidConfig { .. })));
        assert_eq!(rng, untouched);
    }

    #[test]
    fn test_custom_interior_cap() {
        let config = GeneratorConfig {
            max_interior_nodes: 100,
            ..GeneratorConfig::default()
        };
        // 11x11 nodes, 81 interior
        assert!(MazeBuilder::new(21, 21).with_config(config).build().is_ok());
        // 12x12 nodes, 100 interior
        let err = MazeBuilder::new(23, 23)
            .with_config(config)
            .build()
            .unwrap_err();
        assert!(matches!(err, MazeError::GridTooLarge { limit: 100, .. }));
    }

    #[test]
    fn test_clamping_reported_per_axis() {
        let observer = Arc::new(CollectingObserver::new());
        let maze = MazeBuilder::new(0, 2)
            .with_violation_observer(observer.clone())
            .build()
            .unwrap();
        assert_eq!((maze.pix_width(), maze.pix_height()), (5, 5));

        let violations = observer.violations_of_kind(ViolationKind::Configuration);
        assert_eq!(violations.len(), 2);
        assert!(violations
            .iter()
            .all(|v| v.severity == ViolationSeverity::Notice));
        assert!(violations[0].message.contains("width"));
        assert!(violations[1].message.contains("height"));
    }

    #[test]
    fn test_debug_hides_observer() {
        let builder = MazeBuilder::new(5, 5)
            .with_violation_observer(Arc::new(CollectingObserver::new()));
        let debug = format!("{builder:?}");
        assert!(debug.contains("has_violation_observer: true"));
    }
}
