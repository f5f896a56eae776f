//! Generation-time node arena.
//!
//! Every node is one packed `u32`:
//!
//! ```text
//!  31                              2   1      0
//! +---------------------------------+------+-------+
//! |          component id (30)      | down | right |
//! +---------------------------------+------+-------+
//! ```
//!
//! A set `right` / `down` flag is a wall segment joining the node to its
//! right / bottom neighbour. Left and up links are read from the neighbour.
//! Nodes joined by wall segments form a component; the border ring is
//! pre-joined into component [`OUTSIDE`]. Generation only ever joins nodes of
//! different components, so the segments of a component never form a cycle
//! (apart from the sealed border ring itself), and once every node is in
//! [`OUTSIDE`] the cells between the segments form a perfect maze.

use crate::telemetry::{InvariantChecker, InvariantViolation};
use crate::walls::WallSet;

/// Flag bit of the right link.
pub(crate) const RIGHT_LINK: u32 = 1 << 0;

/// Flag bit of the down link.
pub(crate) const DOWN_LINK: u32 = 1 << 1;

/// Both flag bits.
const LINK_MASK: u32 = RIGHT_LINK | DOWN_LINK;

/// Shift of the component id inside a node word.
const ID_SHIFT: u32 = 2;

/// Largest component id a node word can hold.
pub(crate) const MAX_COMPONENT_ID: u32 = u32::MAX >> ID_SHIFT;

/// Component of every border node; the finished maze is all `OUTSIDE`.
pub(crate) const OUTSIDE: u32 = 0;

/// Packs a component id and both link flags into a node word.
///
/// `component` must not exceed [`MAX_COMPONENT_ID`].
#[inline]
#[must_use]
pub(crate) const fn pack(component: u32, right: bool, down: bool) -> u32 {
    let mut word = component << ID_SHIFT;
    if right {
        word |= RIGHT_LINK;
    }
    if down {
        word |= DOWN_LINK;
    }
    word
}

/// Inverse of [`pack`]: `(component, right, down)`.
#[inline]
#[must_use]
pub(crate) const fn unpack(word: u32) -> (u32, bool, bool) {
    (
        word >> ID_SHIFT,
        word & RIGHT_LINK != 0,
        word & DOWN_LINK != 0,
    )
}

/// A candidate link between a node and one of its right/bottom neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Link {
    /// Node `pos` to node `pos + 1`.
    Right(usize),
    /// Node `pos` to node `pos + width`.
    Down(usize),
}

/// Dense node array plus the reusable relabel worklist.
#[derive(Debug)]
pub(crate) struct NodeGrid {
    width: usize,
    height: usize,
    nodes: Vec<u32>,
    worklist: Vec<usize>,
}

impl NodeGrid {
    /// Allocates a `width x height` grid with the border sealed and every
    /// interior node in its own component (its linear index).
    ///
    /// Both dimensions must be at least 3 and `width * height - 1` must fit
    /// in [`MAX_COMPONENT_ID`]; the maze constructor guarantees both.
    pub(crate) fn new(width: usize, height: usize) -> Self {
        debug_assert!(width >= 3 && height >= 3);
        debug_assert!(width * height - 1 <= MAX_COMPONENT_ID as usize);

        let mut nodes = vec![0u32; width * height];

        let last_row = (height - 1) * width;
        for x in 0..width - 1 {
            nodes[x] = pack(OUTSIDE, true, false);
            nodes[x + last_row] = pack(OUTSIDE, true, false);
        }
        for y in 0..height - 1 {
            nodes[y * width] |= DOWN_LINK;
            nodes[width - 1 + y * width] |= DOWN_LINK;
        }
        // Corner word is already OUTSIDE with no links

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let pos = x + y * width;
                nodes[pos] = pack(pos as u32, false, false);
            }
        }

        Self {
            width,
            height,
            nodes,
            worklist: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub(crate) fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub(crate) fn component(&self, pos: usize) -> u32 {
        self.nodes[pos] >> ID_SHIFT
    }

    #[inline]
    fn set_component(&mut self, pos: usize, component: u32) {
        self.nodes[pos] = (self.nodes[pos] & LINK_MASK) | (component << ID_SHIFT);
    }

    #[inline]
    pub(crate) fn has_right_link(&self, pos: usize) -> bool {
        self.nodes[pos] & RIGHT_LINK != 0
    }

    #[inline]
    pub(crate) fn has_down_link(&self, pos: usize) -> bool {
        self.nodes[pos] & DOWN_LINK != 0
    }

    /// Both endpoints of a link.
    #[inline]
    fn endpoints(&self, link: Link) -> (usize, usize) {
        match link {
            Link::Right(pos) => (pos, pos + 1),
            Link::Down(pos) => (pos, pos + self.width),
        }
    }

    /// True if the link is unset and its endpoints are in different components.
    #[inline]
    pub(crate) fn is_joinable(&self, link: Link) -> bool {
        let (a, b) = self.endpoints(link);
        let set = match link {
            Link::Right(pos) => self.has_right_link(pos),
            Link::Down(pos) => self.has_down_link(pos),
        };
        !set && self.component(a) != self.component(b)
    }

    /// Sets the link and merges its endpoint components if [`is_joinable`].
    ///
    /// Returns whether a join happened.
    ///
    /// [`is_joinable`]: Self::is_joinable
    pub(crate) fn try_join(&mut self, link: Link) -> bool {
        if !self.is_joinable(link) {
            return false;
        }
        let (a, b) = self.endpoints(link);
        match link {
            Link::Right(pos) => self.nodes[pos] |= RIGHT_LINK,
            Link::Down(pos) => self.nodes[pos] |= DOWN_LINK,
        }
        self.merge(a, b);
        true
    }

    /// Relabels the component with the larger id to the smaller one.
    ///
    /// Walks linked neighbours with an explicit LIFO worklist starting at the
    /// larger-id endpoint. Border nodes hold the smallest id, so the walk
    /// never enters the border and every neighbour index stays in bounds.
    fn merge(&mut self, a: usize, b: usize) {
        let (keep, repaint) = if self.component(a) > self.component(b) {
            (b, a)
        } else {
            (a, b)
        };
        let fill = self.component(keep);
        let width = self.width;

        let mut worklist = std::mem::take(&mut self.worklist);
        worklist.clear();
        worklist.push(repaint);
        while let Some(pos) = worklist.pop() {
            self.set_component(pos, fill);
            if self.has_right_link(pos - 1) && self.component(pos - 1) != fill {
                worklist.push(pos - 1);
            }
            if self.has_down_link(pos - width) && self.component(pos - width) != fill {
                worklist.push(pos - width);
            }
            if self.has_right_link(pos) && self.component(pos + 1) != fill {
                worklist.push(pos + 1);
            }
            if self.has_down_link(pos) && self.component(pos + width) != fill {
                worklist.push(pos + width);
            }
        }
        self.worklist = worklist;
    }

    /// Every link that is still joinable, right before down per node, in
    /// row-major order.
    pub(crate) fn joinable_links(&self) -> Vec<Link> {
        let mut links = Vec::new();
        for y in 0..self.height - 1 {
            for x in 0..self.width - 1 {
                let pos = x + y * self.width;
                if self.is_joinable(Link::Right(pos)) {
                    links.push(Link::Right(pos));
                }
                if self.is_joinable(Link::Down(pos)) {
                    links.push(Link::Down(pos));
                }
            }
        }
        links
    }

    /// Number of nodes not yet joined to the border.
    pub(crate) fn detached_nodes(&self) -> usize {
        self.nodes
            .iter()
            .filter(|&&word| unpack(word).0 != OUTSIDE)
            .count()
    }

    /// Drops the component ids and keeps the link flags.
    pub(crate) fn into_walls(self) -> WallSet {
        WallSet::from_links(
            self.width,
            self.height,
            self.nodes.iter().map(|&word| {
                let (_, right, down) = unpack(word);
                (right, down)
            }),
        )
    }
}

impl InvariantChecker for NodeGrid {
    fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let (width, height) = (self.width, self.height);
        if self.nodes.len() != width * height {
            return Err(InvariantViolation::new("NodeGrid", "node count mismatch")
                .with_details(format!(
                    "len={}, width={}, height={}",
                    self.nodes.len(),
                    width,
                    height
                )));
        }
        for x in 0..width {
            for pos in [x, x + (height - 1) * width] {
                if self.component(pos) != OUTSIDE {
                    return Err(InvariantViolation::new(
                        "NodeGrid",
                        "border node left the outside component",
                    )
                    .with_details(format!("pos={pos}")));
                }
                if x < width - 1 && !self.has_right_link(pos) {
                    return Err(InvariantViolation::new("NodeGrid", "border row unsealed")
                        .with_details(format!("pos={pos}")));
                }
            }
        }
        for y in 0..height {
            for pos in [y * width, width - 1 + y * width] {
                if self.component(pos) != OUTSIDE {
                    return Err(InvariantViolation::new(
                        "NodeGrid",
                        "border node left the outside component",
                    )
                    .with_details(format!("pos={pos}")));
                }
                if y < height - 1 && !self.has_down_link(pos) {
                    return Err(
                        InvariantViolation::new("NodeGrid", "border column unsealed")
                            .with_details(format!("pos={pos}")),
                    );
                }
            }
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
    fn test_pack_unpack() {
        assert_eq!(unpack(pack(0, false, false)), (0, false, false));
        assert_eq!(unpack(pack(7, true, false)), (7, true, false));
        assert_eq!(unpack(pack(7, false, true)), (7, false, true));
        assert_eq!(
            unpack(pack(MAX_COMPONENT_ID, true, true)),
            (MAX_COMPONENT_ID, true, true)
        );
        assert_eq!(pack(1, true, true), 0b111);
    }

    #[test]
    fn test_new_seals_border() {
        let grid = NodeGrid::new(5, 4);
        grid.check_invariants().unwrap();

        // Interior nodes are singletons with no links
        for y in 1..3 {
            for x in 1..4 {
                let pos = x + y * 5;
                assert_eq!(grid.component(pos), pos as u32);
                assert!(!grid.has_right_link(pos));
                assert!(!grid.has_down_link(pos));
            }
        }

        // The corner carries no links of its own
        let corner = 4 + 3 * 5;
        assert!(!grid.has_right_link(corner));
        assert!(!grid.has_down_link(corner));
        assert_eq!(grid.detached_nodes(), 6);
    }

    #[test]
    fn test_try_join_rejects_same_component() {
        let mut grid = NodeGrid::new(4, 4);
        // Both endpoints on the top border
        assert!(!grid.try_join(Link::Right(0)));
        // Top border to column 0, both outside
        assert!(!grid.try_join(Link::Down(0)));
    }

    #[test]
    fn test_try_join_merges_to_smaller_id() {
        let mut grid = NodeGrid::new(5, 5);
        let a = 1 + 5;
        let b = 2 + 5;
        assert!(grid.try_join(Link::Right(a)));
        assert_eq!(grid.component(a), a as u32);
        assert_eq!(grid.component(b), a as u32);
        assert!(grid.has_right_link(a));

        // Already joined
        assert!(!grid.try_join(Link::Right(a)));
    }

    #[test]
    fn test_merge_relabels_whole_component() {
        let mut grid = NodeGrid::new(6, 3);
        // Chain row 1: nodes 7, 8, 9, 10
        assert!(grid.try_join(Link::Right(8)));
        assert!(grid.try_join(Link::Right(9)));
        assert_eq!(grid.component(10), 8);
        assert!(grid.try_join(Link::Right(7)));
        for pos in 7..=10 {
            assert_eq!(grid.component(pos), 7);
        }
        // Attach the chain to the border through node 10
        assert!(grid.try_join(Link::Right(10)));
        for pos in 7..=10 {
            assert_eq!(grid.component(pos), OUTSIDE);
        }
        assert_eq!(grid.detached_nodes(), 0);
        grid.check_invariants().unwrap();
    }

    #[test]
    fn test_joinable_links_skips_joined_pairs() {
        let mut grid = NodeGrid::new(3, 3);
        // Single interior node 4 can join any of its four border neighbours
        let links = grid.joinable_links();
        assert_eq!(
            links,
            vec![Link::Down(1), Link::Right(3), Link::Right(4), Link::Down(4)]
        );
        assert!(grid.try_join(Link::Down(4)));
        assert!(grid.joinable_links().is_empty());
    }

    #[test]
    fn test_into_walls_keeps_links() {
        let mut grid = NodeGrid::new(3, 3);
        assert!(grid.try_join(Link::Right(3)));
        let walls = grid.into_walls();
        assert!(walls.right(3));
        assert!(walls.down(3));
        assert!(walls.right(0));
        assert!(walls.down(0));
        assert!(!walls.right(4));
        assert!(!walls.down(4));
    }
}
