//! Nodes of the in-memory kd tree.
//!
//! Nodes are stored in a flat arena owned by `KdTree`; children are referenced by arena offset
//! rather than by owning pointers.

use std::fmt;

use crate::data::PointIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePointer {
    Node(usize),
    Empty,
}

impl NodePointer {

    pub fn is_empty(&self) -> bool {
        return *self == NodePointer::Empty;
    }
}

impl fmt::Display for NodePointer {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodePointer::Node(offset) => write!(f, "NODE {}", offset),
            NodePointer::Empty => write!(f, "EMPTY"),
        }
    }
}

/// A tree node holding one indexed point. The split axis is not stored; it follows from depth.
#[derive(Debug, PartialEq, Clone)]
pub struct Node {
    pub point: PointIndex,
    pub left: NodePointer,
    pub right: NodePointer,
}

impl Node {

    pub fn leaf(point: PointIndex) -> Self {

        return Self {
            point,
            left: NodePointer::Empty,
            right: NodePointer::Empty,
        };
    }

    pub fn is_leaf(&self) -> bool {
        return self.left.is_empty() && self.right.is_empty();
    }

    pub fn pretty(&self) -> String {

        return format!("P: {} LC: {} RC: {}", self.point, self.left, self.right);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_has_no_children() {

        let node = Node::leaf(4);
        assert!(node.is_leaf());
        assert_eq!(node.pretty(), "P: 4 LC: EMPTY RC: EMPTY");
    }

    #[test]
    fn pointer_display() {

        assert_eq!(NodePointer::Node(7).to_string(), "NODE 7");
        assert!(!NodePointer::Node(0).is_empty());
        assert!(NodePointer::Empty.is_empty());
    }
}
