//! Greedy clustering over globally sorted pairwise distances.
//!
//! Every unordered pair of points is ranked by squared distance once, then pairs are consumed
//! closest first and the groups holding their two endpoints are merged. Two partition
//! representations implement the same merge contract: `Groups`, which keeps each group as a sorted
//! list of point indices, and `DisjointSet`, a union-find forest for larger inputs.

use log::debug;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::data::{Distance, PointIndex, PointSet};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistancePair {
    pub a: PointIndex,
    pub b: PointIndex,
    pub distance: Distance,
}

/// Every pair `(a, b)` with `a < b`, ascending by squared distance. Equal distances keep the
/// order the pairs were generated in.
#[derive(Debug, Clone)]
pub struct SortedPairs {
    pairs: Vec<DistancePair>,
}

impl SortedPairs {

    pub fn build(points: &PointSet) -> Self {

        let n = points.len();
        let mut pairs: Vec<DistancePair> = Vec::with_capacity(n * n.saturating_sub(1) / 2);

        for a in 0..n {
            let pa = points.get(a);
            for b in (a + 1)..n {
                pairs.push(DistancePair {
                    a,
                    b,
                    distance: pa.distance_squared(points.get(b)),
                });
            }
        }

        pairs.sort_by_key(|p| p.distance);

        debug!("sorted {} pairwise distances", pairs.len());

        return Self { pairs };
    }

    pub fn len(&self) -> usize {
        return self.pairs.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.pairs.is_empty();
    }

    pub fn get(&self, index: usize) -> Option<&DistancePair> {
        return self.pairs.get(index);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DistancePair> {
        return self.pairs.iter();
    }
}

/// A partition of the points `0..n` into disjoint groups that can only be merged.
pub trait Partition {

    /// One singleton group per point.
    fn with_points(n: usize) -> Self where Self: Sized;

    /// Merges the groups holding `a` and `b`.
    ///
    ///# Returns
    ///
    ///`Ok(true)` if two groups were merged, `Ok(false)` if both points already shared a group
    fn join_groups(&mut self, a: PointIndex, b: PointIndex) -> Result<bool, Error>;

    fn num_groups(&self) -> usize;

    /// Every group as a sorted list of point indices, in no particular group order.
    fn groups(&self) -> Vec<Vec<PointIndex>>;

    fn sizes(&self) -> Vec<usize> {
        return self.groups().iter().map(|g| g.len()).collect();
    }

    fn total_points(&self) -> usize {
        return self.sizes().iter().sum();
    }

    /// Groups ordered by their smallest member, for comparing partitions.
    fn canonical_groups(&self) -> Vec<Vec<PointIndex>> {

        let mut groups = self.groups();
        groups.sort();
        return groups;
    }

    /// Product of the sizes of the `nbiggest` largest groups (fewer if there are fewer groups).
    fn largest_product(&self, nbiggest: usize) -> Result<u64, Error> {

        let mut sizes = self.sizes();
        sizes.sort_unstable_by(|a, b| b.cmp(a));

        let mut product: u64 = 1;
        for size in sizes.iter().take(nbiggest) {
            product = product
                .checked_mul(*size as u64)
                .ok_or(Error::ProductOverflow { nbiggest })?;
        }

        return Ok(product);
    }
}

/// Groups kept as sorted index lists. Lookup scans the groups and binary searches within each.
#[derive(Debug, Clone, PartialEq)]
pub struct Groups {
    groups: Vec<Vec<PointIndex>>,
}

impl Groups {

    pub fn new(n: usize) -> Self {
        return Self { groups: (0..n).map(|i| vec![i]).collect() };
    }

    /// Position of the group holding `point`.
    pub fn find(&self, point: PointIndex) -> Option<usize> {
        return self.groups.iter().position(|g| g.binary_search(&point).is_ok());
    }

    pub fn as_slice(&self) -> &[Vec<PointIndex>] {
        return &self.groups;
    }
}

impl Partition for Groups {

    fn with_points(n: usize) -> Self {
        return Self::new(n);
    }

    fn join_groups(&mut self, a: PointIndex, b: PointIndex) -> Result<bool, Error> {

        let ga = self.find(a).ok_or(Error::PointNotGrouped(a))?;
        let gb = self.find(b).ok_or(Error::PointNotGrouped(b))?;

        if ga == gb {
            return Ok(false);
        }

        let (large, small) = match self.groups[ga].len() >= self.groups[gb].len() {
            true => (ga, gb),
            false => (gb, ga),
        };

        let moved = std::mem::take(&mut self.groups[small]);
        let target = &mut self.groups[large];

        for point in moved {
            match target.binary_search(&point) {
                Ok(_) => {},
                Err(pos) => target.insert(pos, point),
            }
        }

        self.groups.remove(small);

        return Ok(true);
    }

    fn num_groups(&self) -> usize {
        return self.groups.len();
    }

    fn groups(&self) -> Vec<Vec<PointIndex>> {
        return self.groups.clone();
    }

    fn sizes(&self) -> Vec<usize> {
        return self.groups.iter().map(|g| g.len()).collect();
    }
}

/// Union-find forest with path compression and union by size.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
    num_groups: usize,
}

impl DisjointSet {

    pub fn new(n: usize) -> Self {

        return Self {
            parent: (0..n).collect(),
            size: vec![1; n],
            num_groups: n,
        };
    }

    /// Root of the tree holding `point`, compressing the path on the way back.
    pub fn find(&mut self, point: PointIndex) -> Option<usize> {

        if point >= self.parent.len() {
            return None;
        }

        let mut root = point;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut curr = point;
        while self.parent[curr] != root {
            let next = self.parent[curr];
            self.parent[curr] = root;
            curr = next;
        }

        return Some(root);
    }
}

impl Partition for DisjointSet {

    fn with_points(n: usize) -> Self {
        return Self::new(n);
    }

    fn join_groups(&mut self, a: PointIndex, b: PointIndex) -> Result<bool, Error> {

        let ra = self.find(a).ok_or(Error::PointNotGrouped(a))?;
        let rb = self.find(b).ok_or(Error::PointNotGrouped(b))?;

        if ra == rb {
            return Ok(false);
        }

        let (large, small) = match self.size[ra] >= self.size[rb] {
            true => (ra, rb),
            false => (rb, ra),
        };

        self.parent[small] = large;
        self.size[large] += self.size[small];
        self.num_groups -= 1;

        return Ok(true);
    }

    fn num_groups(&self) -> usize {
        return self.num_groups;
    }

    fn groups(&self) -> Vec<Vec<PointIndex>> {

        let mut forest = self.clone();
        let mut by_root: Vec<Vec<PointIndex>> = vec![Vec::new(); self.parent.len()];

        for point in 0..self.parent.len() {
            if let Some(root) = forest.find(point) {
                by_root[root].push(point);
            }
        }

        return by_root.into_iter().filter(|g| !g.is_empty()).collect();
    }

    fn sizes(&self) -> Vec<usize> {

        return (0..self.parent.len())
            .filter(|p| self.parent[*p] == *p)
            .map(|root| self.size[root])
            .collect();
    }
}

/// Which partition representation to cluster with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PartitionKind {
    #[default]
    Sorted,
    DisjointSet,
}

impl FromStr for PartitionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sorted" => Ok(PartitionKind::Sorted),
            "disjoint_set" | "disjoint-set" => Ok(PartitionKind::DisjointSet),
            _ => Err(Error::Config(format!("unknown partition kind: {}", s))),
        }
    }
}

/// Performs exactly `ndist` union steps with the closest pairs, counting steps whose endpoints
/// were already grouped together.
pub fn join_closest<P: Partition>(pairs: &SortedPairs, partition: &mut P, ndist: usize) -> Result<(), Error> {

    if ndist > pairs.len() {
        return Err(Error::NotEnoughPairs { requested: ndist, available: pairs.len() });
    }

    let mut merges = 0;
    for pair in pairs.iter().take(ndist) {
        if partition.join_groups(pair.a, pair.b)? {
            merges += 1;
        }
    }

    debug!("{} union steps merged {} times, {} groups remain", ndist, merges, partition.num_groups());

    return Ok(());
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reduction {
    /// Last pair consumed. It may be a no-op union if its endpoints were already grouped.
    pub last_pair: Option<DistancePair>,
    /// Whether the group count got down to the target.
    pub reached: bool,
}

/// Unions pairs in ascending distance order until at most `ngroups` groups remain or the pairs
/// run out.
pub fn join_until<P: Partition>(pairs: &SortedPairs, partition: &mut P, ngroups: usize) -> Result<Reduction, Error> {

    let mut last_pair: Option<DistancePair> = None;

    if partition.num_groups() <= ngroups {
        return Ok(Reduction { last_pair, reached: true });
    }

    for (consumed, pair) in pairs.iter().enumerate() {

        partition.join_groups(pair.a, pair.b)?;
        last_pair = Some(*pair);

        if partition.num_groups() <= ngroups {
            debug!("reached {} groups after {} pairs", partition.num_groups(), consumed + 1);
            return Ok(Reduction { last_pair, reached: true });
        }
    }

    return Ok(Reduction { last_pair, reached: false });
}
