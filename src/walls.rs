//! Immutable 2-bit-per-node wall storage of a finished maze.

/// Nodes packed into one storage word.
const NODES_PER_WORD: usize = 32;

/// Bit of the right segment within a node's 2-bit slot.
const RIGHT_BIT: u64 = 0b01;

/// Bit of the down segment within a node's 2-bit slot.
const DOWN_BIT: u64 = 0b10;

/// Right and down wall segments of every node, 32 nodes per `u64`.
///
/// Indexing past the last node reads as a wall on both sides.
#[derive(Clone, PartialEq, Eq, Hash)]
pub(crate) struct WallSet {
    width: usize,
    height: usize,
    words: Vec<u64>,
}

impl WallSet {
    /// Builds the set from `(right, down)` pairs in row-major node order.
    pub(crate) fn from_links(
        width: usize,
        height: usize,
        links: impl IntoIterator<Item = (bool, bool)>,
    ) -> Self {
        let len = width * height;
        let mut words = vec![0u64; len.div_ceil(NODES_PER_WORD)];
        for (pos, (right, down)) in links.into_iter().take(len).enumerate() {
            let shift = (pos % NODES_PER_WORD) * 2;
            let mut slot = 0;
            if right {
                slot |= RIGHT_BIT;
            }
            if down {
                slot |= DOWN_BIT;
            }
            if let Some(word) = words.get_mut(pos / NODES_PER_WORD) {
                *word |= slot << shift;
            }
        }
        Self {
            width,
            height,
            words,
        }
    }

    #[inline]
    fn slot(&self, pos: usize) -> Option<u64> {
        if pos >= self.width * self.height {
            return None;
        }
        let word = self.words.get(pos / NODES_PER_WORD)?;
        Some((word >> ((pos % NODES_PER_WORD) * 2)) & (RIGHT_BIT | DOWN_BIT))
    }

    /// Whether a segment joins node `pos` to its right neighbour.
    #[inline]
    pub(crate) fn right(&self, pos: usize) -> bool {
        self.slot(pos).is_none_or(|slot| slot & RIGHT_BIT != 0)
    }

    /// Whether a segment joins node `pos` to its bottom neighbour.
    #[inline]
    pub(crate) fn down(&self, pos: usize) -> bool {
        self.slot(pos).is_none_or(|slot| slot & DOWN_BIT != 0)
    }

    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    /// Raw storage words, for hashing.
    pub(crate) fn words(&self) -> &[u64] {
        &self.words
    }

    /// Total number of set segments.
    pub(crate) fn segment_count(&self) -> u64 {
        self.words
            .iter()
            .map(|word| u64::from(word.count_ones()))
            .sum()
    }
}

impl std::fmt::Debug for WallSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WallSet")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("segments", &self.segment_count())
            .finish_non_exhaustive()
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
    fn test_from_links_reads_back() {
        let links = [(true, false), (false, true), (true, true), (false, false)];
        let walls = WallSet::from_links(2, 2, links);
        assert!(walls.right(0) && !walls.down(0));
        assert!(!walls.right(1) && walls.down(1));
        assert!(walls.right(2) && walls.down(2));
        assert!(!walls.right(3) && !walls.down(3));
        assert_eq!(walls.segment_count(), 4);
    }

    #[test]
    fn test_out_of_range_is_wall() {
        let walls = WallSet::from_links(2, 2, [(false, false); 4]);
        assert!(walls.right(4));
        assert!(walls.down(4));
        assert!(walls.right(usize::MAX));
    }

    #[test]
    fn test_spans_multiple_words() {
        // 7x7 = 49 nodes, two storage words
        let links = (0..49).map(|pos| (pos % 3 == 0, pos % 5 == 0));
        let walls = WallSet::from_links(7, 7, links);
        assert_eq!(walls.words().len(), 2);
        for pos in 0..49 {
            assert_eq!(walls.right(pos), pos % 3 == 0, "right at {pos}");
            assert_eq!(walls.down(pos), pos % 5 == 0, "down at {pos}");
        }
        assert_eq!(walls.width(), 7);
        assert_eq!(walls.height(), 7);
    }

    #[test]
    fn test_debug_summarizes() {
        let walls = WallSet::from_links(2, 2, [(true, true); 4]);
        let debug = format!("{walls:?}");
        assert!(debug.contains("segments: 8"));
        assert!(!debug.contains("words"));
    }
}
