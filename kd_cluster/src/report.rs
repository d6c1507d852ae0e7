//! Runs the full clustering pass over a point set and collects the results.

use log::info;
use serde::Serialize;
use std::time::Instant;

use crate::cluster::{self, DisjointSet, Groups, Partition, PartitionKind, SortedPairs};
use crate::config::SolverConfig;
use crate::data::{Distance, Point, PointIndex, PointSet};
use crate::error::Error;
use crate::tree::KdTree;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastPair {
    pub a: PointIndex,
    pub b: PointIndex,
    pub point_a: Vec<i32>,
    pub point_b: Vec<i32>,
    pub distance: Distance,
    /// Product of the first coordinates of both points.
    pub first_coord_product: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub num_points: usize,
    pub num_nodes: usize,
    pub tree_depth: usize,
    pub ndist: usize,
    pub nbiggest: usize,
    pub biggest_sizes: Vec<usize>,
    pub largest_product: u64,
    pub ngroups: usize,
    pub last_pair: Option<LastPair>,
}

impl Report {

    pub fn pretty(&self) -> String {

        let mut s = String::new();
        s += &format!("indexed {}/{} nodes, depth {}\n", self.num_nodes, self.num_points, self.tree_depth);
        s += &format!("sizes of {} biggest groups after {} steps: {:?}\n", self.nbiggest, self.ndist, self.biggest_sizes);
        s += &format!("product: {}\n", self.largest_product);

        match &self.last_pair {
            Some(pair) => {
                s += &format!("last pair joined to reach {} groups: {} {}\n",
                    self.ngroups, Point::new(pair.point_a.clone()), Point::new(pair.point_b.clone()));
                s += &format!("product of first coordinates: {}\n", pair.first_coord_product);
            },
            None => {
                s += &format!("already at {} groups, no pair joined\n", self.ngroups);
            },
        }

        return s;
    }
}

/// Indexes the points, then runs both clustering passes with the partition kind from `config`.
pub fn solve(points: &PointSet, config: &SolverConfig) -> Result<Report, Error> {

    if points.is_empty() {
        return Err(Error::EmptyInput);
    }

    match config.partition {
        PartitionKind::Sorted => solve_with::<Groups>(points, config),
        PartitionKind::DisjointSet => solve_with::<DisjointSet>(points, config),
    }
}

fn solve_with<P: Partition>(points: &PointSet, config: &SolverConfig) -> Result<Report, Error> {

    let start = Instant::now();
    let tree = KdTree::build(points);
    info!("built tree of {} nodes in {:.6}s", tree.len(), start.elapsed().as_secs_f64());

    let start = Instant::now();
    let pairs = SortedPairs::build(points);
    info!("sorted {} pairs in {:.6}s", pairs.len(), start.elapsed().as_secs_f64());

    let ndist = config.steps_for(points.len(), pairs.len());

    let start = Instant::now();
    let mut partition = P::with_points(points.len());
    cluster::join_closest(&pairs, &mut partition, ndist)?;

    let mut biggest_sizes = partition.sizes();
    biggest_sizes.sort_unstable_by(|a, b| b.cmp(a));
    biggest_sizes.truncate(config.nbiggest);
    let largest_product = partition.largest_product(config.nbiggest)?;
    info!("{} union steps in {:.6}s", ndist, start.elapsed().as_secs_f64());

    let start = Instant::now();
    let mut partition = P::with_points(points.len());
    let reduction = cluster::join_until(&pairs, &mut partition, config.ngroups)?;
    info!("reduced to {} groups in {:.6}s", partition.num_groups(), start.elapsed().as_secs_f64());

    if !reduction.reached {
        return Err(Error::TargetUnreachable { target: config.ngroups, remaining: partition.num_groups() });
    }

    let last_pair = reduction.last_pair.map(|pair| {
        let a = points.get(pair.a);
        let b = points.get(pair.b);
        LastPair {
            a: pair.a,
            b: pair.b,
            point_a: a.coords.clone(),
            point_b: b.coords.clone(),
            distance: pair.distance,
            first_coord_product: i64::from(a.coords[0]) * i64::from(b.coords[0]),
        }
    });

    return Ok(Report {
        num_points: points.len(),
        num_nodes: tree.len(),
        tree_depth: tree.depth(),
        ndist,
        nbiggest: config.nbiggest,
        biggest_sizes,
        largest_product,
        ngroups: config.ngroups,
        last_pair,
    });
}
