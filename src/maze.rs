//! The finished, immutable maze and its wall queries.
//!
//! # Coordinates
//!
//! Queries use the doubled *pixel* grid of `pix_width() x pix_height()`
//! squares. Node `(a, b)` covers the 2x2 block whose top-left pixel is
//! `(2a, 2b)`:
//!
//! ```text
//!  (2a, 2b)   pillar, always wall      (2a+1, 2b)   right segment of node
//!  (2a, 2b+1) down segment of node     (2a+1, 2b+1) cell, always free
//! ```
//!
//! Cells are the odd/odd pixels. Every pair of cells is joined by exactly one
//! path of free pixels.

use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use crate::builder::MazeBuilder;
use crate::config::GeneratorConfig;
use crate::generator::{self, GenerationStats};
use crate::grid::NodeGrid;
use crate::hash::DeterministicHasher;
use crate::report_violation_to;
use crate::rng::Rng;
use crate::telemetry::{
    InvariantChecker, InvariantViolation, ViolationKind, ViolationObserver, ViolationSeverity,
};
use crate::walls::WallSet;
use crate::{MazeError, MazeResult};

/// Smallest accepted requested dimension; smaller requests are raised to it.
pub const MIN_DIMENSION: u32 = 5;

/// Token [`Maze`]'s `Display` impl prints for wall pixels.
pub const BLOCKED_TOKEN: &str = "██";

/// Token [`Maze`]'s `Display` impl prints for free pixels.
pub const FREE_TOKEN: &str = "  ";

/// A perfect maze.
///
/// Built once from `(width, height, seed)` and immutable afterwards. Two mazes
/// compare equal when their walls are identical, regardless of how they were
/// generated.
///
/// # Example
///
/// ```
/// use labyrinth::Maze;
///
/// let maze = Maze::new(9, 7, 42).unwrap();
/// assert_eq!((maze.pix_width(), maze.pix_height()), (9, 7));
/// assert!(maze.is_free(1, 1));
/// assert!(!maze.is_free(0, 0));
/// print!("{maze}");
/// ```
#[derive(Debug, Clone)]
pub struct Maze {
    walls: WallSet,
    seed: Option<u32>,
    stats: GenerationStats,
}

impl Maze {
    /// Generates the maze for `(width, height, seed)` with the default
    /// [`GeneratorConfig`].
    ///
    /// `width` and `height` are requested pixel dimensions. Values below
    /// [`MIN_DIMENSION`] are raised to it and even values lose one pixel, so
    /// `Maze::new(8, 8, s)` has a pixel size of 7x7.
    ///
    /// # Errors
    ///
    /// Returns [`MazeError::GridTooLarge`] if the normalized grid has
    /// `2^28` or more interior nodes.
    pub fn new(width: u32, height: u32, seed: u32) -> MazeResult<Self> {
        MazeBuilder::new(width, height).with_seed(seed).build()
    }

    pub(crate) fn generate<R: Rng + ?Sized>(
        width: u32,
        height: u32,
        seed: Option<u32>,
        config: &GeneratorConfig,
        observer: &Option<Arc<dyn ViolationObserver>>,
        rng: &mut R,
    ) -> MazeResult<Self> {
        config.validate()?;

        let node_width = node_dimension(width, "width", observer);
        let node_height = node_dimension(height, "height", observer);
        let interior_nodes = (node_width - 2) * (node_height - 2);
        if interior_nodes >= config.max_interior_nodes {
            return Err(MazeError::GridTooLarge {
                node_width,
                node_height,
                interior_nodes,
                limit: config.max_interior_nodes,
            });
        }

        // Under the interior cap both dimensions and their product fit in 30 bits
        let mut grid = NodeGrid::new(node_width as usize, node_height as usize);
        let stats = generator::generate(&mut grid, rng, config, observer);

        let maze = Self {
            walls: grid.into_walls(),
            seed,
            stats,
        };
        crate::debug_check_invariants!(observer, maze, "after construction");
        Ok(maze)
    }

    /// Width of the node grid.
    #[inline]
    #[must_use]
    pub fn node_width(&self) -> u32 {
        self.walls.width() as u32
    }

    /// Height of the node grid.
    #[inline]
    #[must_use]
    pub fn node_height(&self) -> u32 {
        self.walls.height() as u32
    }

    /// Width in pixels, `node_width() * 2 - 1`.
    #[inline]
    #[must_use]
    pub fn pix_width(&self) -> u32 {
        self.node_width() * 2 - 1
    }

    /// Height in pixels, `node_height() * 2 - 1`.
    #[inline]
    #[must_use]
    pub fn pix_height(&self) -> u32 {
        self.node_height() * 2 - 1
    }

    /// Whether a wall segment runs from node `index` to its right neighbour.
    ///
    /// `index` is `x + y * node_width()`. Out-of-range indices read as wall.
    #[inline]
    #[must_use]
    pub fn has_right_wall(&self, index: usize) -> bool {
        self.walls.right(index)
    }

    /// Whether a wall segment runs from node `index` to its bottom neighbour.
    ///
    /// `index` is `x + y * node_width()`. Out-of-range indices read as wall.
    #[inline]
    #[must_use]
    pub fn has_down_wall(&self, index: usize) -> bool {
        self.walls.down(index)
    }

    /// Whether pixel `(x, y)` can be walked on.
    ///
    /// Pixels outside the maze are never free.
    #[must_use]
    pub fn is_free(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.pix_width() || y >= self.pix_height() {
            return false;
        }
        let pos = (x >> 1) as usize + (y >> 1) as usize * self.walls.width();
        match (x & 1 == 1, y & 1 == 1) {
            (false, false) => false,
            (true, true) => true,
            (false, true) => !self.walls.down(pos),
            (true, false) => !self.walls.right(pos),
        }
    }

    /// Whether a wall separates two orthogonally adjacent cells.
    ///
    /// `from` and `to` are cell pixels (both coordinates odd) two pixels apart
    /// in one axis. Any other pair, including cells outside the maze, reports
    /// a wall.
    #[must_use]
    pub fn is_wall_between(&self, from: (i32, i32), to: (i32, i32)) -> bool {
        let is_cell = |(x, y): (i32, i32)| x & 1 == 1 && y & 1 == 1 && self.is_free(x, y);
        if !is_cell(from) || !is_cell(to) {
            return true;
        }
        let dx = i64::from(to.0) - i64::from(from.0);
        let dy = i64::from(to.1) - i64::from(from.1);
        if !matches!((dx.abs(), dy.abs()), (2, 0) | (0, 2)) {
            return true;
        }
        let mid_x = (i64::from(from.0) + dx / 2) as i32;
        let mid_y = (i64::from(from.1) + dy / 2) as i32;
        !self.is_free(mid_x, mid_y)
    }

    /// Renders the maze as text, one line per pixel row.
    ///
    /// `free` is right-padded with spaces to the character count of `blocked`
    /// so rows stay aligned. Every row, including the last, ends in `'\n'`.
    ///
    /// ```
    /// use labyrinth::Maze;
    ///
    /// let maze = Maze::new(5, 5, 0).unwrap();
    /// let text = maze.render("#", ".");
    /// assert_eq!(text.lines().count(), 5);
    /// assert!(text.starts_with("#####\n#."));
    /// ```
    #[must_use]
    pub fn render(&self, blocked: &str, free: &str) -> String {
        let width = self.pix_width() as usize;
        let height = self.pix_height() as usize;
        let token = blocked.len().max(free.len());
        let mut out = String::with_capacity((width * token + 1) * height);
        // Writing into a String cannot fail
        let _ = self.write_rows(&mut out, blocked, free);
        out
    }

    fn write_rows<W: fmt::Write>(&self, out: &mut W, blocked: &str, free: &str) -> fmt::Result {
        let pad = blocked.chars().count().saturating_sub(free.chars().count());
        let height = self.pix_height() as i32;
        let width = self.pix_width() as i32;
        for y in 0..height {
            for x in 0..width {
                if self.is_free(x, y) {
                    out.write_str(free)?;
                    for _ in 0..pad {
                        out.write_char(' ')?;
                    }
                } else {
                    out.write_str(blocked)?;
                }
            }
            out.write_char('\n')?;
        }
        Ok(())
    }

    /// Deterministic FNV-1a hash of the dimensions and every wall segment.
    ///
    /// Stable across runs and platforms, so a level can be verified against a
    /// stored fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DeterministicHasher::new();
        hasher.write_u64(self.walls.width() as u64);
        hasher.write_u64(self.walls.height() as u64);
        for &word in self.walls.words() {
            hasher.write_u64(word);
        }
        hasher.finish()
    }

    /// Counters recorded while generating this maze.
    #[must_use]
    pub fn stats(&self) -> &GenerationStats {
        &self.stats
    }

    /// The seed of the built-in generator, or `None` for mazes built from a
    /// caller-supplied random stream.
    #[must_use]
    pub fn seed(&self) -> Option<u32> {
        self.seed
    }
}

/// Clamps a requested pixel dimension and converts it to a node count.
fn node_dimension(
    requested: u32,
    axis: &'static str,
    observer: &Option<Arc<dyn ViolationObserver>>,
) -> u64 {
    let clamped = if requested < MIN_DIMENSION {
        report_violation_to!(
            observer,
            ViolationSeverity::Notice,
            ViolationKind::Configuration,
            { "axis" => axis, "requested" => requested, "used" => MIN_DIMENSION },
            "requested {} {} is below the minimum of {}, clamped",
            axis,
            requested,
            MIN_DIMENSION
        );
        MIN_DIMENSION
    } else {
        requested
    };
    (u64::from(clamped) + 1) >> 1
}

impl PartialEq for Maze {
    fn eq(&self, other: &Self) -> bool {
        self.walls == other.walls
    }
}

impl Eq for Maze {}

impl fmt::Display for Maze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_rows(f, BLOCKED_TOKEN, FREE_TOKEN)
    }
}

impl InvariantChecker for Maze {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let width = self.walls.width();
        let height = self.walls.height();
        let last_row = (height - 1) * width;

        for x in 0..width - 1 {
            if !self.walls.right(x) || !self.walls.right(x + last_row) {
                return Err(InvariantViolation::new("Maze", "horizontal border open")
                    .with_details(format!("column={x}")));
            }
            if self.walls.down(x + last_row) {
                return Err(InvariantViolation::new("Maze", "segment leaves the bottom edge")
                    .with_details(format!("column={x}")));
            }
        }
        for y in 0..height - 1 {
            if !self.walls.down(y * width) || !self.walls.down(width - 1 + y * width) {
                return Err(InvariantViolation::new("Maze", "vertical border open")
                    .with_details(format!("row={y}")));
            }
            if self.walls.right(width - 1 + y * width) {
                return Err(InvariantViolation::new("Maze", "segment leaves the right edge")
                    .with_details(format!("row={y}")));
            }
        }

        let (w, h) = (width as u64, height as u64);
        let expected = (w - 2) * (h - 2) + 2 * (w - 1) + 2 * (h - 1);
        let actual = self.walls.segment_count();
        if actual != expected {
            return Err(InvariantViolation::new("Maze", "wall count is not a spanning tree")
                .with_details(format!("expected={expected}, actual={actual}")));
        }
        Ok(())
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
    fn test_smallest_maze_dimensions() {
        let maze = Maze::new(5, 5, 0).unwrap();
        assert_eq!(maze.node_width(), 3);
        assert_eq!(maze.node_height(), 3);
        assert_eq!(maze.pix_width(), 5);
        assert_eq!(maze.pix_height(), 5);
        maze.check_invariants().unwrap();
    }

    #[test]
    fn test_even_dimensions_round_down() {
        let maze = Maze::new(8, 10, 1).unwrap();
        assert_eq!(maze.pix_width(), 7);
        assert_eq!(maze.pix_height(), 9);
        assert_eq!(maze, Maze::new(7, 9, 1).unwrap());
    }

    #[test]
    fn test_tiny_requests_clamp() {
        for request in [0, 1, 4] {
            let maze = Maze::new(request, request, 3).unwrap();
            assert_eq!(maze.pix_width(), 5);
            assert_eq!(maze.pix_height(), 5);
        }
    }

    #[test]
    fn test_oversized_grid_rejected() {
        let err = Maze::new(50_000, 50_000, 0).unwrap_err();
        assert_eq!(
            err,
            MazeError::GridTooLarge {
                node_width: 25_000,
                node_height: 25_000,
                interior_nodes: 24_998 * 24_998,
                limit: 1 << 28,
            }
        );
    }

    #[test]
    fn test_largest_requests_rejected_without_overflow() {
        assert!(matches!(
            Maze::new(u32::MAX, u32::MAX, 0),
            Err(MazeError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn test_pixel_parity_rules() {
        let maze = Maze::new(11, 11, 9).unwrap();
        for y in 0..11 {
            for x in 0..11 {
                if x % 2 == 0 && y % 2 == 0 {
                    assert!(!maze.is_free(x, y), "pillar ({x}, {y}) free");
                }
                if x % 2 == 1 && y % 2 == 1 {
                    assert!(maze.is_free(x, y), "cell ({x}, {y}) blocked");
                }
            }
        }
    }

    #[test]
    fn test_mixed_parity_reads_segments() {
        let maze = Maze::new(11, 11, 9).unwrap();
        let width = maze.node_width() as usize;
        for b in 0..5 {
            for a in 0..5 {
                let pos = a + b * width;
                let (x, y) = (2 * a as i32, 2 * b as i32);
                assert_eq!(maze.is_free(x + 1, y), !maze.has_right_wall(pos));
                assert_eq!(maze.is_free(x, y + 1), !maze.has_down_wall(pos));
            }
        }
    }

    #[test]
    fn test_out_of_range_queries() {
        let maze = Maze::new(9, 9, 2).unwrap();
        assert!(!maze.is_free(-1, 1));
        assert!(!maze.is_free(1, -1));
        assert!(!maze.is_free(9, 1));
        assert!(!maze.is_free(1, 9));
        assert!(!maze.is_free(i32::MAX, i32::MAX));
        assert!(!maze.is_free(i32::MIN, 1));
        assert!(maze.has_right_wall(usize::MAX));
        assert!(maze.has_down_wall(25));
    }

    #[test]
    fn test_is_wall_between_matches_is_free() {
        let maze = Maze::new(15, 15, 77).unwrap();
        for y in (1..15).step_by(2) {
            for x in (1..13).step_by(2) {
                assert_eq!(maze.is_wall_between((x, y), (x + 2, y)), !maze.is_free(x + 1, y));
                assert_eq!(maze.is_wall_between((x + 2, y), (x, y)), !maze.is_free(x + 1, y));
            }
        }
        for y in (1..13).step_by(2) {
            for x in (1..15).step_by(2) {
                assert_eq!(maze.is_wall_between((x, y), (x, y + 2)), !maze.is_free(x, y + 1));
            }
        }
    }

    #[test]
    fn test_is_wall_between_rejects_non_neighbours() {
        let maze = Maze::new(15, 15, 77).unwrap();
        assert!(maze.is_wall_between((1, 1), (1, 1)));
        assert!(maze.is_wall_between((1, 1), (3, 3)));
        assert!(maze.is_wall_between((1, 1), (5, 1)));
        assert!(maze.is_wall_between((1, 1), (2, 1)));
        assert!(maze.is_wall_between((13, 1), (15, 1)));
        assert!(maze.is_wall_between((-1, 1), (1, 1)));
        assert!(maze.is_wall_between((i32::MIN, 1), (i32::MAX, 1)));
    }

    #[test]
    fn test_render_pads_free_token() {
        let maze = Maze::new(5, 5, 0).unwrap();
        let text = maze.render("##", "");
        for line in text.lines() {
            assert_eq!(line.chars().count(), 10);
        }
        assert!(text.starts_with("##########\n##  "));
        assert!(text.ends_with("##########\n"));
    }

    #[test]
    fn test_display_uses_block_tokens() {
        let maze = Maze::new(7, 5, 3).unwrap();
        let text = maze.to_string();
        assert_eq!(text, maze.render(BLOCKED_TOKEN, FREE_TOKEN));
        assert_eq!(text.lines().count(), 5);
        assert_eq!(text.lines().next().unwrap(), BLOCKED_TOKEN.repeat(7));
    }

    #[test]
    fn test_fingerprint_tracks_walls() {
        let a = Maze::new(41, 41, 10).unwrap();
        let b = Maze::new(41, 41, 10).unwrap();
        let c = Maze::new(41, 41, 11).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a, c);
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_seed_and_stats_are_kept() {
        let maze = Maze::new(21, 21, 123).unwrap();
        assert_eq!(maze.seed(), Some(123));
        assert_eq!(maze.stats().total_joins(), 9 * 9);
    }

    #[test]
    fn test_check_invariants_detects_open_border() {
        let maze = Maze::new(7, 7, 0).unwrap();
        let mut broken = maze.clone();
        let width = broken.walls.width();
        let height = broken.walls.height();
        broken.walls = WallSet::from_links(
            width,
            height,
            (0..width * height).map(|pos| {
                (
                    pos != 0 && maze.has_right_wall(pos),
                    maze.has_down_wall(pos),
                )
            }),
        );
        let violation = broken.check_invariants().unwrap_err();
        assert_eq!(violation.invariant, "horizontal border open");
    }
}

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing
)]
mod property_tests {
    use super::*;
    use crate::test_config::maze_case_count;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: maze_case_count(),
            ..ProptestConfig::default()
        })]

        /// Property: every generated maze passes its own invariant check.
        #[test]
        fn prop_generated_maze_is_consistent(
            width in 0u32..160,
            height in 0u32..160,
            seed in any::<u32>(),
        ) {
            let maze = Maze::new(width, height, seed).unwrap();
            prop_assert!(maze.check_invariants().is_ok());
            let interior = u64::from(maze.node_width() - 2) * u64::from(maze.node_height() - 2);
            prop_assert_eq!(maze.stats().total_joins(), interior);
        }

        /// Property: queries never panic and outside pixels are never free.
        #[test]
        fn prop_queries_are_total(
            seed in any::<u32>(),
            x in any::<i32>(),
            y in any::<i32>(),
            index in any::<usize>(),
        ) {
            let maze = Maze::new(21, 15, seed).unwrap();
            let inside = (0..21).contains(&x) && (0..15).contains(&y);
            if !inside {
                prop_assert!(!maze.is_free(x, y));
            }
            if index >= 11 * 8 {
                prop_assert!(maze.has_right_wall(index) && maze.has_down_wall(index));
            }
            let _ = maze.is_wall_between((x, y), (y, x));
        }
    }
}
