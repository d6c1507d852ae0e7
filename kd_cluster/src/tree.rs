//! Implementation of kd-tree creation and querying
//!
//! The tree is balanced: it is built once from a static `PointSet` by repeated median selection
//! on alternating axes, using one presorted index permutation per axis so no range is ever
//! re-sorted.
use crate::data::{Distance, Point, PointIndex, PointSet};
use crate::error::Error;
use crate::node::{Node, NodePointer};

use log::debug;
use serde::Serialize;
use std::collections::VecDeque;

/// One query result: the indexed point and its squared distance to the query target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    pub point: PointIndex,
    pub distance: Distance,
}

///struct for keeping N- top closest points
///
///handles distance sorting and truncating to N items
#[derive(Debug)]
pub struct TopHits {
    pub max_length: usize,
    pub hits: Vec<Neighbor>,
}

impl TopHits {

    pub fn new(max_length: usize) -> Self {

        return Self {
            max_length,
            hits: Vec::with_capacity(max_length),
        };
    }

    pub fn len(&self) -> usize {
        return self.hits.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.hits.is_empty();
    }

    pub fn is_full(&self) -> bool {
        return self.hits.len() >= self.max_length;
    }

    ///Public method to be called on every visited point for consideration as a neighbor
    ///
    ///Points with a distance equal to an existing hit are placed after it, so ties keep the order
    ///in which they were encountered. Anything that would land past `max_length` is dropped.
    pub fn try_add(&mut self, distance: Distance, point: PointIndex) {

        let insert_index = self.hits.partition_point(|h| h.distance <= distance);

        if insert_index >= self.max_length {
            return;
        }

        self.hits.insert(insert_index, Neighbor { point, distance });
        self.hits.truncate(self.max_length);
    }

    ///# Returns
    ///
    ///the highest distance of the list once it holds `max_length` hits, `None` while it still has
    ///room (every branch is then worth visiting)
    pub fn worst_distance(&self) -> Option<Distance> {

        match self.is_full() {
            true => self.hits.last().map(|h| h.distance),
            false => None,
        }
    }

    pub fn into_neighbors(self) -> Vec<Neighbor> {
        return self.hits;
    }
}

#[derive(Debug)]
enum Direction {
    Left,
    Right,
}

#[derive(Debug)]
enum NodeAction {
    CheckIgnoredBranch,
    Descend,
}

/// Which side of the current median a point belongs to during construction.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    Left,
    Median,
    Right,
}

/// Scratch state for one build. `sorted[axis]` holds every point index ordered by that axis;
/// within the range being built each permutation holds the same set of points.
struct Builder<'a> {
    points: &'a PointSet,
    sorted: Vec<Vec<PointIndex>>,
    side: Vec<Side>,
    scratch: Vec<PointIndex>,
    nodes: Vec<Node>,
}

impl<'a> Builder<'a> {

    fn new(points: &'a PointSet) -> Self {

        let n = points.len();

        //sort_by_key is stable, so ties keep input order
        let sorted: Vec<Vec<PointIndex>> = (0..points.dim)
            .map(|axis| {
                let mut order: Vec<PointIndex> = (0..n).collect();
                order.sort_by_key(|&i| points.get(i).coords[axis]);
                order
            })
            .collect();

        return Self {
            points,
            sorted,
            side: vec![Side::Median; n],
            scratch: Vec::with_capacity(n),
            nodes: Vec::with_capacity(n),
        };
    }

    fn build_range(&mut self, start: usize, end: usize, depth: usize) -> NodePointer {

        if start >= end {
            return NodePointer::Empty;
        }

        let dim = self.points.dim;
        let axis = depth % dim;
        let mid = start + (end - start) / 2;
        let median = self.sorted[axis][mid];

        for &p in &self.sorted[axis][start..mid] {
            self.side[p] = Side::Left;
        }
        for &p in &self.sorted[axis][mid + 1..end] {
            self.side[p] = Side::Right;
        }
        self.side[median] = Side::Median;

        //stable partition of the other axes so they stay sorted over both halves
        for other in (0..dim).filter(|a| *a != axis) {

            let order = &mut self.sorted[other];
            self.scratch.clear();

            for wanted in [Side::Left, Side::Median, Side::Right] {
                for &p in &order[start..end] {
                    if self.side[p] == wanted {
                        self.scratch.push(p);
                    }
                }
            }

            order[start..end].copy_from_slice(&self.scratch);
        }

        let offset = self.nodes.len();
        self.nodes.push(Node::leaf(median));

        let left = self.build_range(start, mid, depth + 1);
        let right = self.build_range(mid + 1, end, depth + 1);

        self.nodes[offset].left = left;
        self.nodes[offset].right = right;

        return NodePointer::Node(offset);
    }
}

/// Struct to represent the kd-tree
///
/// Owns its nodes in a flat arena. Points are referenced by their index in the `PointSet` the
/// tree was built from, which the tree keeps a copy of.
#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<Node>,
    points: PointSet,
    root: NodePointer,
}

impl KdTree {

    pub fn build(points: &PointSet) -> Self {

        if points.is_empty() {
            return Self {
                nodes: Vec::new(),
                points: points.clone(),
                root: NodePointer::Empty,
            };
        }

        let mut builder = Builder::new(points);
        let root = builder.build_range(0, points.len(), 0);

        debug!("built kd tree with {} nodes over {} points", builder.nodes.len(), points.len());

        return Self {
            nodes: builder.nodes,
            points: points.clone(),
            root,
        };
    }

    pub fn len(&self) -> usize {
        return self.nodes.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.nodes.is_empty();
    }

    pub fn dim(&self) -> usize {
        return self.points.dim;
    }

    pub fn root(&self) -> NodePointer {
        return self.root;
    }

    pub fn node(&self, offset: usize) -> &Node {
        return &self.nodes[offset];
    }

    pub fn points(&self) -> &PointSet {
        return &self.points;
    }

    pub fn point(&self, index: PointIndex) -> &Point {
        return self.points.get(index);
    }

    /// Number of levels from the root to the deepest node, 0 for an empty tree.
    pub fn depth(&self) -> usize {

        let mut deepest = 0;
        let mut nodes_to_check: VecDeque<(NodePointer, usize)> = VecDeque::new();
        nodes_to_check.push_back((self.root, 1));

        while let Some((pointer, level)) = nodes_to_check.pop_back() {
            if let NodePointer::Node(offset) = pointer {
                deepest = deepest.max(level);
                let node = &self.nodes[offset];
                nodes_to_check.push_back((node.left, level + 1));
                nodes_to_check.push_back((node.right, level + 1));
            }
        }

        return deepest;
    }

    ///Returns whether or not the exact provided point is in the tree
    pub fn contains(&self, target: &Point) -> Result<bool, Error> {

        let nn = self.nearest(target, 1)?;
        return Ok(nn.first().map(|h| h.distance == 0).unwrap_or(false));
    }

    ///Returns the `n` nearest neighbors of the provided `target`, closest first
    ///
    ///Performance should worsen as `n` grows larger, as fewer branches of the tree can be pruned
    ///with more distant already-found points
    pub fn nearest(&self, target: &Point, n: usize) -> Result<Vec<Neighbor>, Error> {

        if self.is_empty() || n == 0 {
            return Ok(Vec::new());
        }

        if target.dim() != self.dim() {
            return Err(Error::DimensionMismatch { expected: self.dim(), found: target.dim() });
        }

        let hits = self.get_top_hits(target, n);

        return Ok(hits.into_neighbors());
    }

    fn get_top_hits(&self, target: &Point, n: usize) -> TopHits {

        let mut hits = TopHits::new(n);
        let dim = self.dim();

        let mut num_nodes_visited: usize = 0;

        //used as a stack: the near side is always fully explored before its ignored sibling
        let mut nodes_to_check: VecDeque<(NodePointer, usize, NodeAction, Option<Direction>)> = VecDeque::new();

        nodes_to_check.push_front((self.root, 0, NodeAction::Descend, None));

        while let Some((curr_pointer, depth, action, direction)) = nodes_to_check.pop_front() {

            let offset = match curr_pointer {
                NodePointer::Empty => continue,
                NodePointer::Node(offset) => offset,
            };

            let node = &self.nodes[offset];
            let point = self.points.get(node.point);
            let axis = depth % dim;

            match action {

                NodeAction::Descend => {

                    num_nodes_visited += 1;

                    hits.try_add(target.distance_squared(point), node.point);

                    match target.coords[axis] < point.coords[axis] {
                        true => {
                            nodes_to_check.push_front((curr_pointer, depth, NodeAction::CheckIgnoredBranch, Some(Direction::Right)));
                            nodes_to_check.push_front((node.left, depth + 1, NodeAction::Descend, None));
                        },
                        false => {
                            nodes_to_check.push_front((curr_pointer, depth, NodeAction::CheckIgnoredBranch, Some(Direction::Left)));
                            nodes_to_check.push_front((node.right, depth + 1, NodeAction::Descend, None));
                        },
                    }
                },

                NodeAction::CheckIgnoredBranch => {

                    let ignored = match direction {
                        Some(Direction::Left) => node.left,
                        Some(Direction::Right) => node.right,
                        None => continue,
                    };

                    if ignored.is_empty() {
                        continue;
                    }

                    let visit = match hits.worst_distance() {
                        None => true,
                        Some(threshold) => target.plane_distance_squared(axis, point.coords[axis]) < threshold,
                    };

                    if visit {
                        nodes_to_check.push_front((ignored, depth + 1, NodeAction::Descend, None));
                    }
                },
            }
        }

        debug!("nearest {} query visited {}/{} nodes", n, num_nodes_visited, self.len());

        return hits;
    }
}
