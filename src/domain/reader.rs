//! Reader for the line-oriented solution format.
//!
//! ```text
//! <n> <d>
//! <result> <count> <size> :<child_pos>*
//! ```
//!
//! The header is followed by one node line per node in depth-first pre-order:
//! a node's line comes first, then the complete subtree of each listed child,
//! in the order the children are listed.

use std::io::{BufRead, Lines};
use std::str::FromStr;
use std::vec;

use generational_arena::Index;
use regex::Regex;
use tracing::{debug, instrument, warn};

use crate::domain::entities::{Header, Node, Position, SolutionTree, MAX_DIMENSION};
use crate::domain::error::{DomainError, DomainResult};

/// One parsed node line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLine {
    pub result: i64,
    pub count: u64,
    /// Child count declared before the colon
    pub declared: usize,
    /// Child positions, in listed order
    pub children: Vec<Position>,
}

impl NodeLine {
    fn into_node(self) -> (Node, vec::IntoIter<Position>) {
        (Node::new(self.result, self.count), self.children.into_iter())
    }
}

/// Node whose children are still being read.
struct PendingNode {
    index: Index,
    positions: vec::IntoIter<Position>,
}

/// Consumes a solution source strictly front to back, one line per node.
pub struct TreeReader<R> {
    lines: Lines<R>,
    line_no: usize,
    node_regex: Regex,
}

impl<R: BufRead> TreeReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            lines: source.lines(),
            line_no: 0,
            node_regex: Regex::new(r"^\s*(-?\d+)\s+(\d+)\s+(\d+)\s*:(.*)$").unwrap(),
        }
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    fn next_line(&mut self) -> DomainResult<Option<String>> {
        match self.lines.next() {
            None => Ok(None),
            Some(Err(source)) => Err(DomainError::Read {
                line: self.line_no + 1,
                source,
            }),
            Some(Ok(line)) => {
                self.line_no += 1;
                Ok(Some(line))
            }
        }
    }

    /// Read the `n d` header line.
    #[instrument(level = "debug", skip(self))]
    pub fn read_header(&mut self) -> DomainResult<Header> {
        let line = self
            .next_line()?
            .ok_or_else(|| DomainError::format(1, "missing header line"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [dimension, mark_types] = fields.as_slice() else {
            return Err(DomainError::format(
                self.line_no,
                format!(
                    "header must hold exactly two integers 'n d', found {} field(s)",
                    fields.len()
                ),
            ));
        };
        let dimension: usize = parse_field(dimension, "board dimension", self.line_no)?;
        let mark_types: usize = parse_field(mark_types, "mark type count", self.line_no)?;
        if dimension == 0 || mark_types == 0 {
            return Err(DomainError::format(
                self.line_no,
                format!("header values must be positive, got '{dimension} {mark_types}'"),
            ));
        }
        let header = Header::new(dimension, mark_types);
        if header.cell_count().is_none() {
            return Err(DomainError::format(
                self.line_no,
                format!("board dimension {dimension} exceeds the maximum of {MAX_DIMENSION}"),
            ));
        }
        debug!("header: n={dimension} d={mark_types}");
        Ok(header)
    }

    /// Read exactly one node line; its children are not read.
    pub fn read_node(&mut self) -> DomainResult<NodeLine> {
        let line = self
            .next_line()?
            .ok_or_else(|| DomainError::UnexpectedEndOfInput {
                line: self.line_no + 1,
                expected: "a node line".to_string(),
            })?;
        let line_no = self.line_no;
        let caps = self.node_regex.captures(&line).ok_or_else(|| {
            DomainError::format(
                line_no,
                format!("expected 'RESULT COUNT SIZE :CHILD*', got '{}'", line.trim_end()),
            )
        })?;

        let result = parse_field(&caps[1], "result", line_no)?;
        let count = parse_field(&caps[2], "count", line_no)?;
        let declared = parse_field(&caps[3], "child count", line_no)?;
        let children = caps[4]
            .split_whitespace()
            .map(|field| parse_field(field, "child position", line_no))
            .collect::<DomainResult<Vec<Position>>>()?;

        if children.len() != declared {
            return Err(DomainError::format(
                line_no,
                format!(
                    "declared {declared} children but listed {}",
                    children.len()
                ),
            ));
        }

        Ok(NodeLine {
            result,
            count,
            declared,
            children,
        })
    }

    /// Read the header and the whole tree below the root line.
    ///
    /// Children are read through an explicit stack of partially built nodes, so
    /// the depth of the tree is not limited by the call stack.
    #[instrument(level = "debug", skip(self))]
    pub fn read(mut self) -> DomainResult<SolutionTree> {
        let header = self.read_header()?;
        let (root, positions) = self.read_node()?.into_node();
        let mut tree = SolutionTree::new(header, root);
        let mut stack = vec![PendingNode {
            index: tree.root(),
            positions,
        }];

        while let Some(pending) = stack.last_mut() {
            let Some(position) = pending.positions.next() else {
                stack.pop();
                continue;
            };
            let parent = pending.index;
            let (node, positions) = self.read_node()?.into_node();
            let index = tree.attach(parent, position, node);
            stack.push(PendingNode { index, positions });
        }

        debug!("read {} node lines", self.line_no.saturating_sub(1));
        self.warn_on_trailing_content()?;
        Ok(tree)
    }

    fn warn_on_trailing_content(&mut self) -> DomainResult<()> {
        let last_node_line = self.line_no;
        while let Some(line) = self.next_line()? {
            if !line.trim().is_empty() {
                warn!(
                    "ignoring content after line {last_node_line}: tree is complete, found '{}' at line {}",
                    line.trim_end(),
                    self.line_no
                );
                break;
            }
        }
        Ok(())
    }
}

/// Read a solution tree from in-memory text.
pub fn read_tree(text: &str) -> DomainResult<SolutionTree> {
    TreeReader::new(text.as_bytes()).read()
}

fn parse_field<T: FromStr>(field: &str, what: &str, line: usize) -> DomainResult<T> {
    field
        .parse()
        .map_err(|_| DomainError::format(line, format!("invalid {what} '{field}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::testing::init_test_setup;
    use rstest::rstest;

    const TINY: &str = "3 2\n2 4 2 :0 4\n0 1 0 :\n1 1 0 :\n";

    #[test]
    fn given_tiny_solution_when_reading_then_builds_tree() {
        init_test_setup();
        let tree = read_tree(TINY).unwrap();

        assert_eq!(tree.header(), Header::new(3, 2));
        let root = tree.root_node();
        assert_eq!((root.result, root.count), (2, 4));
        assert_eq!(root.children.keys().copied().collect::<Vec<_>>(), vec![0, 4]);
        assert_eq!(tree.node_at(&[0]).map(|n| n.result), Some(0));
        assert_eq!(tree.node_at(&[4]).map(|n| n.result), Some(1));
    }

    #[test]
    fn given_nested_children_when_reading_then_lines_follow_pre_order() {
        // root -> 4 -> (0 -> 8), 2 ; root -> 0
        let text = "3 2\n2 9 2 :4 0\n2 5 2 :0 2\n0 2 1 :8\n0 1 0 :\n1 1 0 :\n2 1 0 :\n";
        let tree = read_tree(text).unwrap();

        assert_eq!(tree.node_at(&[4]).map(|n| n.count), Some(5));
        assert_eq!(tree.node_at(&[4, 0]).map(|n| n.count), Some(2));
        assert_eq!(tree.node_at(&[4, 0, 8]).map(|n| n.result), Some(0));
        assert_eq!(tree.node_at(&[4, 2]).map(|n| n.result), Some(1));
        assert_eq!(tree.node_at(&[0]).map(|n| n.result), Some(2));
        assert_eq!(tree.stats().nodes, 6);
    }

    #[rstest]
    #[case::non_integer("abc\n2 1 0 :\n")]
    #[case::single_field("3\n2 1 0 :\n")]
    #[case::three_fields("3 2 1\n2 1 0 :\n")]
    #[case::zero_dimension("0 2\n2 1 0 :\n")]
    #[case::negative("3 -2\n2 1 0 :\n")]
    #[case::empty_input("")]
    #[case::dimension_too_large("257 2\n2 1 0 :\n")]
    #[case::cell_count_overflows("4294967296 2\n2 1 0 :\n")]
    fn given_malformed_header_when_reading_then_format_error(#[case] text: &str) {
        let result = read_tree(text);
        assert!(
            matches!(result, Err(DomainError::Format { line: 1, .. })),
            "got {result:?}"
        );
    }

    #[rstest]
    #[case::missing_colon("3 2\n2 1 0\n")]
    #[case::text_result("3 2\nx 1 0 :\n")]
    #[case::bad_child("3 2\n2 1 1 :a\n")]
    #[case::negative_child("3 2\n2 1 1 :-1\n")]
    #[case::size_mismatch("3 2\n2 4 2 :0\n0 1 0 :\n")]
    fn given_malformed_node_line_when_reading_then_format_error(#[case] text: &str) {
        let result = read_tree(text);
        assert!(
            matches!(result, Err(DomainError::Format { line: 2, .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn given_truncated_input_when_reading_then_unexpected_end() {
        let result = read_tree("3 2\n2 4 2 :0 4\n0 1 0 :\n");
        assert!(
            matches!(result, Err(DomainError::UnexpectedEndOfInput { line: 4, .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn given_header_only_when_reading_then_unexpected_end() {
        let result = read_tree("3 2\n");
        assert!(matches!(
            result,
            Err(DomainError::UnexpectedEndOfInput { line: 2, .. })
        ));
    }

    #[test]
    fn given_crlf_and_extra_spacing_when_reading_then_accepts() {
        let tree = read_tree("3  2\r\n2 4  1 : 4\r\n0 1 0 :\r\n").unwrap();
        assert_eq!(tree.node_at(&[4]).map(|n| n.count), Some(1));
    }

    #[test]
    fn given_trailing_lines_when_reading_then_ignores_them() {
        let tree = read_tree("3 2\n2 1 0 :\n\n0 1 0 :\n").unwrap();
        assert!(tree.root_node().is_leaf());
    }

    #[test]
    fn given_deep_chain_when_reading_then_does_not_recurse() {
        let depth = 100_000;
        let mut text = String::from("1 2\n");
        for _ in 0..depth {
            text.push_str("2 1 1 :0\n");
        }
        text.push_str("2 1 0 :\n");

        let tree = read_tree(&text).unwrap();
        assert_eq!(tree.stats().depth, depth);
    }

    #[test]
    fn given_node_line_when_read_individually_then_keeps_listed_order() {
        let mut reader = TreeReader::new("2 7 3 :8 1 5\n".as_bytes());
        let line = reader.read_node().unwrap();
        assert_eq!(
            line,
            NodeLine {
                result: 2,
                count: 7,
                declared: 3,
                children: vec![8, 1, 5],
            }
        );
        assert_eq!(reader.line_no(), 1);
    }
}
