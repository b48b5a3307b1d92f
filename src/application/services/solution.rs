//! Solution tree service
//!
//! Loads solution files and turns parsed trees into HTML pages, terminal
//! outlines and canonical text.

use std::path::Path;
use std::sync::Arc;

use std::collections::btree_map;

use generational_arena::Index;
use termtree::Tree;
use tracing::{debug, instrument, warn};

use crate::application::page::assemble_page;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::renderer::SUPPORTED_MARK_TYPES;

/// Deepest outline level; deeper requests are clamped.
pub const MAX_OUTLINE_DEPTH: usize = 256;
use crate::domain::{
    read_tree, render, write_tree, DomainError, DomainResult, Mark, Node, Position, SolutionTree,
};
use crate::infrastructure::traits::FileSystem;

/// Service for loading and presenting solution trees.
pub struct SolutionService {
    fs: Arc<dyn FileSystem>,
}

impl SolutionService {
    /// Create a new solution service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read and parse a whole solution file.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<SolutionTree> {
        if !self.fs.exists(path) {
            return Err(ApplicationError::InputNotFound(path.to_path_buf()));
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read solution file", path)?;
        debug!("load: read {} bytes", content.len());

        let tree = read_tree(&content)?;
        debug!("load: header {:?}", tree.header());
        Ok(tree)
    }

    /// Render all nodes up to `max_depth` into one HTML document.
    ///
    /// Every block is rendered before the document is assembled, so an error
    /// never yields a partial page.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn render_page(
        &self,
        tree: &SolutionTree,
        max_depth: usize,
        cell_size: u32,
    ) -> ApplicationResult<String> {
        let blocks = render(tree, max_depth)?.collect::<DomainResult<Vec<_>>>()?;
        debug!("render_page: {} blocks", blocks.len());
        Ok(assemble_page(&blocks, cell_size))
    }

    /// Terminal outline of the tree down to `max_depth`.
    ///
    /// `termtree` prints and drops its trees recursively, so the outline never
    /// goes deeper than [`MAX_OUTLINE_DEPTH`].
    #[instrument(level = "debug", skip(self, tree))]
    pub fn outline(&self, tree: &SolutionTree, max_depth: usize) -> ApplicationResult<Tree<String>> {
        let mark_types = tree.header().mark_types;
        if mark_types != SUPPORTED_MARK_TYPES {
            return Err(DomainError::UnsupportedMarkTypes(mark_types).into());
        }
        if max_depth > MAX_OUTLINE_DEPTH {
            warn!("outline depth {max_depth} clamped to {MAX_OUTLINE_DEPTH}");
        }
        Ok(build_outline(tree, max_depth.min(MAX_OUTLINE_DEPTH))?)
    }

    /// Canonical text of the tree (children in ascending order).
    pub fn canonical_text(&self, tree: &SolutionTree) -> String {
        write_tree(tree)
    }
}

/// Outline node whose children are still being added.
struct OutlineFrame<'a> {
    tree: Tree<String>,
    children: Option<btree_map::Iter<'a, Position, Index>>,
}

impl<'a> OutlineFrame<'a> {
    fn new(label: String, node: &'a Node, expand: bool) -> Self {
        Self {
            tree: Tree::new(label),
            children: expand.then(|| node.children.iter()),
        }
    }
}

/// Builds the outline with an explicit stack of open frames; a frame is
/// attached to its parent once all of its children are done.
fn build_outline(tree: &SolutionTree, max_depth: usize) -> DomainResult<Tree<String>> {
    let dimension = tree.header().dimension;
    let root = tree.root_node();
    let mut path: Vec<Position> = Vec::new();
    let mut stack = vec![OutlineFrame::new(
        outline_label(dimension, root, &path)?,
        root,
        max_depth > 0,
    )];

    while let Some(frame) = stack.last_mut() {
        match frame.children.as_mut().and_then(Iterator::next) {
            Some((&position, &child)) => {
                let node = tree.get(child).ok_or_else(|| {
                    DomainError::integrity(&path, format!("dangling child at position {position}"))
                })?;
                path.push(position);
                let label = outline_label(dimension, node, &path)?;
                stack.push(OutlineFrame::new(label, node, path.len() < max_depth));
            }
            None => {
                let Some(done) = stack.pop() else { break };
                match stack.last_mut() {
                    Some(parent) => {
                        path.pop();
                        parent.tree.push(done.tree);
                    }
                    None => return Ok(done.tree),
                }
            }
        }
    }
    Err(DomainError::integrity(&path, "outline stack emptied before the root"))
}

fn outline_label(dimension: usize, node: &Node, path: &[Position]) -> DomainResult<String> {
    let outcome = node.outcome()?;
    let Some((&position, _)) = path.split_last() else {
        return Ok(format!("root: {outcome} ({})", node.count));
    };
    let mark = Mark::for_ply(path.len() - 1);
    let (row, col) = (position / dimension.max(1), position % dimension.max(1));
    Ok(format!(
        "{mark}@{position} r{row}c{col}: {outcome} ({})",
        node.count
    ))
}
