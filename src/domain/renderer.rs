//! Bounded-depth rendering of a solution tree as HTML board blocks.

use std::collections::{btree_map, BTreeMap};

use generational_arena::Index;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::domain::board::Board;
use crate::domain::entities::{Node, Position, SolutionTree};
use crate::domain::error::{DomainError, DomainResult};

/// Mark types the parity-based board reconstruction understands.
pub const SUPPORTED_MARK_TYPES: usize = 2;

/// HTML for one visited node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBlock {
    /// Moves played from the root to reach the node
    pub path: Vec<Position>,
    pub html: String,
}

impl RenderedBlock {
    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Renders the nodes of a tree down to a fixed depth.
#[derive(Debug, Clone, Copy)]
pub struct TreeRenderer<'a> {
    tree: &'a SolutionTree,
    max_depth: usize,
}

impl<'a> TreeRenderer<'a> {
    /// Fails with `UnsupportedMarkTypes` unless the tree is a two-player game.
    pub fn new(tree: &'a SolutionTree, max_depth: usize) -> DomainResult<Self> {
        let mark_types = tree.header().mark_types;
        if mark_types != SUPPORTED_MARK_TYPES {
            return Err(DomainError::UnsupportedMarkTypes(mark_types));
        }
        Ok(Self { tree, max_depth })
    }

    /// Fresh lazy sequence of blocks, pre-order with ascending child positions.
    pub fn blocks(&self) -> RenderedBlocks<'a> {
        RenderedBlocks {
            tree: self.tree,
            max_depth: self.max_depth,
            path: Vec::new(),
            stack: Vec::new(),
            started: false,
            failed: false,
        }
    }
}

/// Render every node within `max_depth` moves of the root.
///
/// Nodes at exactly `max_depth` are rendered; their children only appear as
/// count/outcome summaries inside the board cells.
pub fn render(tree: &SolutionTree, max_depth: usize) -> DomainResult<RenderedBlocks<'_>> {
    Ok(TreeRenderer::new(tree, max_depth)?.blocks())
}

/// Lazy pre-order traversal yielding one block per node.
///
/// The move path is the only mutable state: a position is pushed when entering
/// a child and popped when its subtree is done. After the first error the
/// sequence ends.
#[derive(Debug, Clone)]
pub struct RenderedBlocks<'a> {
    tree: &'a SolutionTree,
    max_depth: usize,
    path: Vec<Position>,
    stack: Vec<btree_map::Iter<'a, Position, Index>>,
    started: bool,
    failed: bool,
}

impl<'a> RenderedBlocks<'a> {
    fn enter(&mut self, index: Index) -> DomainResult<RenderedBlock> {
        let tree = self.tree;
        let node = tree
            .get(index)
            .ok_or_else(|| DomainError::integrity(&self.path, "dangling child reference"))?;
        let html = render_block(tree, node, &self.path)?;
        let block = RenderedBlock {
            path: self.path.clone(),
            html,
        };

        if self.path.len() < self.max_depth {
            self.stack.push(node.children.iter());
        } else {
            self.path.pop();
        }
        Ok(block)
    }

    fn advance(&mut self) -> Option<DomainResult<RenderedBlock>> {
        loop {
            let children = self.stack.last_mut()?;
            match children.next() {
                Some((&position, &child)) => {
                    self.path.push(position);
                    return Some(self.enter(child));
                }
                None => {
                    // Path length equals the depth of the frame being left
                    self.stack.pop();
                    self.path.pop();
                }
            }
        }
    }
}

impl Iterator for RenderedBlocks<'_> {
    type Item = DomainResult<RenderedBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = if self.started {
            self.advance()?
        } else {
            self.started = true;
            self.enter(self.tree.root())
        };
        if let Err(e) = &item {
            debug!("rendering stopped: {e}");
            self.failed = true;
        }
        Some(item)
    }
}

/// Anchor id of the block rendered for `path`.
pub fn anchor_id(path: &[Position]) -> String {
    std::iter::once("node".to_string())
        .chain(path.iter().map(ToString::to_string))
        .join("-")
}

/// HTML block for `node`, reached from the root by `path`.
#[instrument(level = "trace", skip(tree, node))]
pub fn render_block(tree: &SolutionTree, node: &Node, path: &[Position]) -> DomainResult<String> {
    let board = Board::from_path(tree.header().dimension, path)?;
    let outcome = node.outcome()?;

    let mut summaries = BTreeMap::new();
    for (&position, &child) in &node.children {
        if !board.contains(position) {
            return Err(DomainError::integrity(
                path,
                format!("child position {position} is outside the board"),
            ));
        }
        if let Some(mark) = board.get(position) {
            return Err(DomainError::integrity(
                path,
                format!("child position {position} is already occupied by {mark}"),
            ));
        }
        let child_node = tree.get(child).ok_or_else(|| {
            DomainError::integrity(path, format!("dangling child at position {position}"))
        })?;
        summaries.insert(position, (child_node.count, child_node.outcome()?));
    }

    let mut child_path = path.to_vec();
    let mut html = format!(
        r#"<p id="{}">Result: {}</p><table class="border board">"#,
        anchor_id(path),
        outcome
    );
    for (row_idx, row) in board.rows().enumerate() {
        html.push_str(r#"<tr class="border">"#);
        for (col_idx, cell) in row.iter().enumerate() {
            let position = row_idx * board.dimension() + col_idx;
            html.push_str(r#"<td class="border cell">"#);
            match (cell, summaries.get(&position)) {
                (Some(mark), _) => html.push_str(mark.symbol()),
                (None, Some((count, child_outcome))) => {
                    child_path.push(position);
                    html.push_str(&format!(
                        r##"<a href="#{}">{count}</a><br>({child_outcome})"##,
                        anchor_id(&child_path)
                    ));
                    child_path.pop();
                }
                (None, None) => html.push_str("&nbsp;"),
            }
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table><br><br>");
    Ok(html)
}
