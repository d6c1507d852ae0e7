//! YAML-backed settings for the clustering report.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::cluster::PartitionKind;
use crate::error::Error;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SolverConfig {
    /// How many of the largest groups to multiply after the fixed number of union steps.
    pub nbiggest: usize,
    /// Number of union steps. Defaults to the number of points, capped at the number of pairs.
    pub ndist: Option<usize>,
    /// Group count to reduce to for the last-pair result.
    pub ngroups: usize,
    pub partition: PartitionKind,
}

impl Default for SolverConfig {

    fn default() -> Self {
        return Self {
            nbiggest: 3,
            ndist: None,
            ngroups: 1,
            partition: PartitionKind::Sorted,
        };
    }
}

impl SolverConfig {

    pub fn from_file<P>(filename: P) -> Result<Self, Error>
    where P: AsRef<Path>, {

        let serialized = std::fs::read_to_string(filename)?;

        let deserialized: Self = serde_yaml::from_str(&serialized)?;

        return Ok(deserialized);
    }

    pub fn to_file<P>(&self, filename: P) -> Result<(), Error>
    where P: AsRef<Path>, {

        let serialized = serde_yaml::to_string(&self)?;
        let mut file = File::create(filename)?;

        file.write_all(serialized.as_bytes())?;

        return Ok(());
    }

    /// Union step count for a set of `num_points` points with `num_pairs` pairs.
    pub fn steps_for(&self, num_points: usize, num_pairs: usize) -> usize {

        match self.ndist {
            Some(n) => n,
            None => num_points.min(num_pairs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {

        let config = SolverConfig::default();
        assert_eq!(config.nbiggest, 3);
        assert_eq!(config.ngroups, 1);
        assert_eq!(config.steps_for(20, 190), 20);
        assert_eq!(config.steps_for(3, 3), 3);
        assert_eq!(config.steps_for(1, 0), 0);
    }

    #[test]
    fn load_fixture() {

        let config = SolverConfig::from_file("test_data/solver_config.yaml").unwrap();
        assert_eq!(config.ndist, Some(10));
        assert_eq!(config.partition, PartitionKind::Sorted);
        assert_eq!(config.steps_for(20, 190), 10);
    }

    #[test]
    fn partial_yaml_uses_defaults() {

        let config: SolverConfig = serde_yaml::from_str("partition: disjoint_set\n").unwrap();
        assert_eq!(config.partition, PartitionKind::DisjointSet);
        assert_eq!(config.nbiggest, 3);
        assert_eq!(config.ndist, None);
    }

    #[test]
    fn file_round_trip() {

        let filename = std::env::temp_dir().join("kd_cluster_config_round_trip.yaml");

        let mut config = SolverConfig::default();
        config.ndist = Some(1000);
        config.partition = PartitionKind::DisjointSet;
        config.to_file(&filename).unwrap();

        let loaded = SolverConfig::from_file(&filename).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(&filename);
    }

    #[test]
    fn bad_yaml_is_config_error() {

        let filename = std::env::temp_dir().join("kd_cluster_config_bad.yaml");
        std::fs::write(&filename, "nbiggest: [oops\n").unwrap();

        let err = SolverConfig::from_file(&filename).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let _ = std::fs::remove_file(&filename);
    }
}
