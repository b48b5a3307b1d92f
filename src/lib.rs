//! solview: reads a solved game tree and renders its top levels as HTML boards.
//!
//! Layers, innermost first:
//! - [`domain`]: tree model, reader, renderer, writer
//! - [`application`]: services and page assembly
//! - [`infrastructure`]: filesystem boundary and service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{read_tree, render, write_tree, DomainError, DomainResult, SolutionTree};
