//! Domain layer: solution tree, reader and renderer
//!
//! This layer is independent of external concerns (no file I/O, no CLI, no config loading).

pub mod board;
pub mod entities;
pub mod error;
pub mod reader;
pub mod renderer;
pub mod writer;

pub use board::{Board, Mark};
pub use entities::{
    Header, Node, Outcome, Position, PreOrderIterator, SolutionTree, TreeStats, Visit,
};
pub use error::{DomainError, DomainResult};
pub use reader::{read_tree, NodeLine, TreeReader};
pub use renderer::{anchor_id, render, RenderedBlock, RenderedBlocks, TreeRenderer};
pub use writer::write_tree;
