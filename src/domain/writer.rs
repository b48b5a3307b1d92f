//! Serializer producing the canonical text form of a solution tree.

use itertools::Itertools;

use crate::domain::entities::SolutionTree;

/// Write `tree` in the format read by [`crate::domain::TreeReader`].
///
/// Node lines are emitted in pre-order with children by ascending position, so
/// reading the output back yields an identical tree.
pub fn write_tree(tree: &SolutionTree) -> String {
    let header = tree.header();
    let mut out = format!("{} {}\n", header.dimension, header.mark_types);
    for visit in tree.iter() {
        let node = visit.node;
        out.push_str(&format!(
            "{} {} {} :{}\n",
            node.result,
            node.count,
            node.children.len(),
            node.children.keys().join(" ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reader::read_tree;

    #[test]
    fn given_canonical_input_when_written_then_reproduces_text() {
        let text = "3 2\n2 9 2 :0 4\n2 1 0 :\n2 5 2 :0 2\n0 2 1 :8\n0 1 0 :\n1 1 0 :\n";
        let tree = read_tree(text).unwrap();
        assert_eq!(write_tree(&tree), text);
    }

    #[test]
    fn given_unsorted_children_when_written_then_children_ascend() {
        let tree = read_tree("3 2\n2 3 2 :8 1\n0 1 0 :\n1 1 0 :\n").unwrap();
        assert_eq!(write_tree(&tree), "3 2\n2 3 2 :1 8\n1 1 0 :\n0 1 0 :\n");
    }
}
