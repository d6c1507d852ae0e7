//! Balanced kd tree over integer points with exact k-nearest-neighbor queries, plus greedy
//! clustering of the same points by globally sorted pairwise distance.
//!
//! Points are loaded from text, one comma-separated tuple per line, and referenced everywhere by
//! their position in the input. The tree is built once by median splitting on alternating axes
//! and stores its nodes in a flat arena. Clustering does not use the tree: it ranks every pair of
//! points by squared distance and merges groups closest pair first.
//!
pub mod error;
pub mod data;
pub mod node;
pub mod tree;
pub mod cluster;
pub mod config;
pub mod report;
