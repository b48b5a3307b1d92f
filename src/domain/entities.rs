//! Domain entities: the solved game tree

use std::collections::BTreeMap;
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::{instrument, warn};

use crate::domain::error::{DomainError, DomainResult};

/// Board cell, linearized as `row * n + col`.
pub type Position = usize;

/// Largest board edge a solution file may declare.
pub const MAX_DIMENSION: usize = 256;

/// Backed-up game-theoretic value stored with every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Outcome {
    FirstPlayerWins,
    SecondPlayerWins,
    Draw,
}

impl Outcome {
    /// Map a result code from the solution file to its outcome.
    ///
    /// The solver writes `0` for an X win, `1` for an O win and `2` for a draw;
    /// any other code is a data error.
    pub fn from_code(code: i64) -> DomainResult<Self> {
        match code {
            0 => Ok(Outcome::FirstPlayerWins),
            1 => Ok(Outcome::SecondPlayerWins),
            2 => Ok(Outcome::Draw),
            other => Err(DomainError::UnknownOutcome(other)),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Outcome::FirstPlayerWins => 0,
            Outcome::SecondPlayerWins => 1,
            Outcome::Draw => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::FirstPlayerWins => "X wins",
            Outcome::SecondPlayerWins => "O wins",
            Outcome::Draw => "draw",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Board geometry from the first line of a solution file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Board is `dimension x dimension`
    pub dimension: usize,
    /// Number of distinct mark types (`2` for a two-player game)
    pub mark_types: usize,
}

impl Header {
    pub fn new(dimension: usize, mark_types: usize) -> Self {
        Self {
            dimension,
            mark_types,
        }
    }

    /// Number of cells on the board, None when the edge exceeds [`MAX_DIMENSION`].
    pub fn cell_count(&self) -> Option<usize> {
        if self.dimension > MAX_DIMENSION {
            return None;
        }
        self.dimension.checked_mul(self.dimension)
    }
}

/// One game state of the solved tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Raw result code, see [`Outcome::from_code`]
    pub result: i64,
    /// Size annotation of the subtree rooted here
    pub count: u64,
    /// Explored moves from this state, keyed by the cell played
    pub children: BTreeMap<Position, Index>,
}

impl Node {
    pub fn new(result: i64, count: u64) -> Self {
        Self {
            result,
            count,
            children: BTreeMap::new(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn outcome(&self) -> DomainResult<Outcome> {
        Outcome::from_code(self.result)
    }
}

/// Summary figures for a whole solution tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub nodes: usize,
    pub leaves: usize,
    /// Longest root-to-leaf path, in moves
    pub depth: usize,
    /// Number of nodes per raw result code
    pub outcomes: BTreeMap<i64, usize>,
}

/// Arena-backed solution tree.
///
/// Nodes live in a generational arena and refer to their children by index, so
/// the tree can be built and walked without recursion regardless of its depth.
#[derive(Debug)]
pub struct SolutionTree {
    header: Header,
    arena: Arena<Node>,
    root: Index,
}

impl SolutionTree {
    /// Create a tree holding only the root (empty board) node.
    pub fn new(header: Header, root: Node) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(root);
        Self {
            header,
            arena,
            root,
        }
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_node(&self) -> &Node {
        &self.arena[self.root]
    }

    pub fn get(&self, idx: Index) -> Option<&Node> {
        self.arena.get(idx)
    }

    /// Attach `node` below `parent` under the key `position`.
    ///
    /// A second child under the same key replaces the first one; the replaced
    /// subtree stays in the arena but is no longer reachable.
    #[instrument(level = "trace", skip(self, node))]
    pub(crate) fn attach(&mut self, parent: Index, position: Position, node: Node) -> Index {
        let child = self.arena.insert(node);
        if let Some(parent_node) = self.arena.get_mut(parent) {
            if parent_node.children.insert(position, child).is_some() {
                warn!("child position {position} listed twice, keeping the last subtree");
            }
        }
        child
    }

    /// Insert a node at the end of `path`, all of whose prefixes must already exist.
    ///
    /// Meant for assembling trees by hand; no board rule is checked here.
    pub fn insert_path(&mut self, path: &[Position], node: Node) -> DomainResult<Index> {
        let Some((&position, parent_path)) = path.split_last() else {
            return Err(DomainError::integrity(path, "the root node already exists"));
        };
        let parent = self
            .find(parent_path)
            .ok_or_else(|| DomainError::integrity(parent_path, "no node at parent path"))?;
        Ok(self.attach(parent, position, node))
    }

    /// Index of the node reached by playing `path` from the root.
    pub fn find(&self, path: &[Position]) -> Option<Index> {
        path.iter().try_fold(self.root, |idx, position| {
            self.arena.get(idx)?.children.get(position).copied()
        })
    }

    pub fn node_at(&self, path: &[Position]) -> Option<&Node> {
        self.find(path).and_then(|idx| self.get(idx))
    }

    /// Pre-order walk over reachable nodes, children by ascending position.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats::default();
        for visit in self.iter() {
            stats.nodes += 1;
            if visit.node.is_leaf() {
                stats.leaves += 1;
            }
            stats.depth = stats.depth.max(visit.depth);
            *stats.outcomes.entry(visit.node.result).or_default() += 1;
        }
        stats
    }
}

/// A node reached during a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub index: Index,
    pub node: &'a Node,
    /// Number of moves from the root
    pub depth: usize,
    /// Cell played to reach this node, None for the root
    pub position: Option<Position>,
}

pub struct PreOrderIterator<'a> {
    tree: &'a SolutionTree,
    stack: Vec<(Index, usize, Option<Position>)>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(tree: &'a SolutionTree) -> Self {
        Self {
            tree,
            stack: vec![(tree.root, 0, None)],
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = Visit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, depth, position)) = self.stack.pop() {
            if let Some(node) = self.tree.get(index) {
                // Push children in reverse order for ascending traversal
                for (&child_pos, &child) in node.children.iter().rev() {
                    self.stack.push((child, depth + 1, Some(child_pos)));
                }
                return Some(Visit {
                    index,
                    node,
                    depth,
                    position,
                });
            }
        }
        None
    }
}
