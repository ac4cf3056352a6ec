//! Working grid of the generator.
//!
//! One `Node` per map tile records which region owns the tile and what the
//! generator has reserved it for. Speculative edits go through a
//! `Transaction`: every mutation is journaled while a transaction is open, and
//! dropping the transaction without committing puts the grid back.

use std::ops::{Deref, DerefMut};

use crate::tilemap::Tilemap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeType {
    Open,
    Border,
    Action,
    Obstacle,
    Connector,
    Path,
    Coast,
}

impl NodeType {
    /// Stable numeric code baked into map metadata.
    pub fn code(self) -> u32 {
        match self {
            NodeType::Open => 0,
            NodeType::Border => 1,
            NodeType::Action => 2,
            NodeType::Obstacle => 3,
            NodeType::Connector => 4,
            NodeType::Path => 5,
            NodeType::Coast => 6,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => NodeType::Open,
            1 => NodeType::Border,
            2 => NodeType::Action,
            3 => NodeType::Obstacle,
            4 => NodeType::Connector,
            5 => NodeType::Path,
            6 => NodeType::Coast,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    pub index: i32,
    pub region: u32,
    pub node_type: NodeType,
}

impl Node {
    pub fn is_valid(&self) -> bool {
        self.index >= 0
    }
}

/// Neighbour directions. The first four are orthogonal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::Right,
        Direction::Bottom,
        Direction::Left,
        Direction::TopLeft,
        Direction::TopRight,
        Direction::BottomRight,
        Direction::BottomLeft,
    ];

    pub const ORTHOGONAL: [Direction; 4] = [Direction::Top, Direction::Right, Direction::Bottom, Direction::Left];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::Right => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::Left => (-1, 0),
            Direction::TopLeft => (-1, -1),
            Direction::TopRight => (1, -1),
            Direction::BottomRight => (1, 1),
            Direction::BottomLeft => (-1, 1),
        }
    }

    pub fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::TopLeft | Direction::TopRight | Direction::BottomRight | Direction::BottomLeft
        )
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Top => Direction::Bottom,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Left => Direction::Right,
            Direction::TopLeft => Direction::BottomRight,
            Direction::TopRight => Direction::BottomLeft,
            Direction::BottomRight => Direction::TopLeft,
            Direction::BottomLeft => Direction::TopRight,
        }
    }
}

const OUT_OF_BOUNDS: Node = Node { index: -1, region: 0, node_type: NodeType::Border };

pub struct NodeGrid {
    size: i32,
    nodes: Tilemap<Node>,
    journal: Vec<(i32, Node)>,
    depth: usize,
}

impl NodeGrid {
    pub fn new(size: usize) -> Self {
        let nodes = Tilemap::from_fn(size, size, |index| Node {
            index: index as i32,
            region: 0,
            node_type: NodeType::Open,
        });

        Self { size: size as i32, nodes, journal: Vec::new(), depth: 0 }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by linear index. An index outside the grid is a caller bug.
    pub fn node(&self, index: i32) -> &Node {
        assert!(
            index >= 0 && (index as usize) < self.nodes.len(),
            "node index {} outside a {}x{} grid",
            index,
            self.size,
            self.size
        );
        self.nodes.at(index as usize)
    }

    /// Node by position. Off-grid positions yield a border node of region 0 with index -1.
    pub fn node_at(&self, x: i32, y: i32) -> &Node {
        match self.nodes.index_of(x, y) {
            Some(index) => self.nodes.at(index),
            None => &OUT_OF_BOUNDS,
        }
    }

    pub fn index_of(&self, x: i32, y: i32) -> Option<i32> {
        self.nodes.index_of(x, y).map(|i| i as i32)
    }

    pub fn coords(&self, index: i32) -> (i32, i32) {
        (index % self.size, index / self.size)
    }

    pub fn neighbor(&self, index: i32, direction: Direction) -> Option<i32> {
        let (x, y) = self.coords(index);
        let (dx, dy) = direction.offset();
        self.index_of(x + dx, y + dy)
    }

    /// Node at `(dx, dy)` from `index`, or the out-of-bounds node.
    pub fn node_offset(&self, index: i32, (dx, dy): (i32, i32)) -> &Node {
        let (x, y) = self.coords(index);
        self.node_at(x + dx, y + dy)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().iter()
    }

    fn record(&mut self, index: i32) {
        if self.depth > 0 {
            let previous = *self.node(index);
            self.journal.push((index, previous));
        }
    }

    pub fn set_type(&mut self, index: i32, node_type: NodeType) {
        self.record(index);
        self.nodes.at_mut(index as usize).node_type = node_type;
    }

    /// Claim a tile for a region and set its type in one journaled step.
    pub fn claim(&mut self, index: i32, region: u32, node_type: NodeType) {
        self.record(index);
        let node = self.nodes.at_mut(index as usize);
        node.region = region;
        node.node_type = node_type;
    }

    /// Open a transaction. Transactions nest; only the outermost commit makes changes final.
    pub fn begin(&mut self) -> Transaction<'_> {
        self.depth += 1;
        let mark = self.journal.len();
        Transaction { grid: self, mark, committed: false }
    }

    fn rollback_to(&mut self, mark: usize) {
        while self.journal.len() > mark {
            if let Some((index, previous)) = self.journal.pop() {
                *self.nodes.at_mut(index as usize) = previous;
            }
        }
    }

    fn close(&mut self, mark: usize, committed: bool) {
        if !committed {
            self.rollback_to(mark);
        }
        self.depth -= 1;
        if self.depth == 0 {
            self.journal.clear();
        }
    }
}

/// A speculative batch of grid edits. Rolls back on drop unless committed.
pub struct Transaction<'a> {
    grid: &'a mut NodeGrid,
    mark: usize,
    committed: bool,
}

impl Transaction<'_> {
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Deref for Transaction<'_> {
    type Target = NodeGrid;

    fn deref(&self) -> &NodeGrid {
        self.grid
    }
}

impl DerefMut for Transaction<'_> {
    fn deref_mut(&mut self) -> &mut NodeGrid {
        self.grid
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.grid.close(self.mark, self.committed);
    }
}
