//! Points, point sets and the text format they are loaded from.
//!
//! Input is one comma-separated integer tuple per line. The dimension is taken from the first
//! non-empty line and every following line has to match it.

use rand::Rng;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Error;

/// Position of a point in its input file, starting at 0.
pub type PointIndex = usize;

/// Squared Euclidean distance. Coordinates are `i32`, so one axis contributes less than 2^64 and
/// the sum over any realistic dimension fits.
pub type Distance = u128;

#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub struct Point {
    pub coords: Vec<i32>,
}

impl Point {

    pub fn new(coords: Vec<i32>) -> Self {
        return Self { coords };
    }

    pub fn dim(&self) -> usize {
        return self.coords.len();
    }

    /// Sum of squared per-axis differences. Both points must have the same dimension.
    pub fn distance_squared(&self, other: &Point) -> Distance {

        let mut sum: Distance = 0;
        for (a, b) in self.coords.iter().zip(other.coords.iter()) {
            let d = axis_gap(*a, *b);
            sum += d * d;
        }

        return sum;
    }

    /// Squared distance from this point to the axis-aligned hyperplane `coord[axis] == value`.
    pub fn plane_distance_squared(&self, axis: usize, value: i32) -> Distance {

        let d = axis_gap(self.coords[axis], value);
        return d * d;
    }

    /// Uniformly random point with every coordinate in `low..=high`.
    pub fn random(dim: usize, low: i32, high: i32) -> Self {

        let mut rng = rand::thread_rng();
        let coords: Vec<i32> = (0..dim).map(|_| rng.gen_range(low..=high)).collect();
        return Self { coords };
    }

    /// Parses a single `x,y,z` style tuple. `line` is only used for error reporting.
    ///
    /// Fields outside the `i32` range are rejected like any other malformed field.
    pub fn parse(text: &str, line: usize) -> Result<Self, Error> {

        let mut coords: Vec<i32> = Vec::new();
        for field in text.trim().split(',') {
            let field = field.trim();
            match field.parse::<i32>() {
                Ok(v) => coords.push(v),
                Err(_) => return Err(Error::Parse { line, field: field.to_string() }),
            }
        }

        return Ok(Self { coords });
    }
}

fn axis_gap(a: i32, b: i32) -> Distance {
    return (i64::from(a) - i64::from(b)).unsigned_abs() as Distance;
}

impl fmt::Display for Point {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i != 0 { write!(f, ", ")?; }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<i32>> for Point {
    fn from(coords: Vec<i32>) -> Self {
        Point::new(coords)
    }
}

/// A loaded set of points sharing one dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    pub points: Vec<Point>,
    pub dim: usize,
}

impl PointSet {

    /// Builds a set from already constructed points, checking that they agree on dimension.
    pub fn new(points: Vec<Point>) -> Result<Self, Error> {

        let dim = match points.first() {
            Some(p) => p.dim(),
            None => 0,
        };

        if dim == 0 && !points.is_empty() {
            return Err(Error::DimensionMismatch { expected: 1, found: 0 });
        }

        for p in points.iter() {
            if p.dim() != dim {
                return Err(Error::DimensionMismatch { expected: dim, found: p.dim() });
            }
        }

        return Ok(Self { points, dim });
    }

    pub fn from_file<P>(filename: P) -> Result<Self, Error>
    where P: AsRef<Path>, {

        let contents = fs::read_to_string(filename)?;
        return Self::parse(&contents);
    }

    /// Parses the whole input. Blank lines are skipped, any malformed field fails the load.
    pub fn parse(contents: &str) -> Result<Self, Error> {

        let mut points: Vec<Point> = Vec::new();
        let mut dim: Option<usize> = None;

        for (i, line) in contents.lines().enumerate() {

            if line.trim().is_empty() {
                continue;
            }

            let point = Point::parse(line, i + 1)?;

            match dim {
                None => dim = Some(point.dim()),
                Some(d) if d != point.dim() => {
                    return Err(Error::DimensionMismatch { expected: d, found: point.dim() });
                },
                Some(_) => {},
            }

            points.push(point);
        }

        log::debug!("parsed {} points of dimension {}", points.len(), dim.unwrap_or(0));

        return Ok(Self {
            points,
            dim: dim.unwrap_or(0),
        });
    }

    /// `n` random points, going through the same dimension checks as `new`.
    pub fn random(n: usize, dim: usize, low: i32, high: i32) -> Result<Self, Error> {

        let points = (0..n).map(|_| Point::random(dim, low, high)).collect();
        return Self::new(points);
    }

    pub fn len(&self) -> usize {
        return self.points.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.points.is_empty();
    }

    pub fn get(&self, index: PointIndex) -> &Point {
        return &self.points[index];
    }

    /// Reference answer for the tree query: every point's distance, stably sorted, cut to `n`.
    pub fn nearest_brute_force(&self, target: &Point, n: usize) -> Vec<(PointIndex, Distance)> {

        let mut all: Vec<(PointIndex, Distance)> = self.points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance_squared(target)))
            .collect();

        all.sort_by_key(|x| x.1);
        all.truncate(n);

        return all;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_squared() {

        let a = Point::new(vec![0, 0, 0]);
        let b = Point::new(vec![10, 10, 10]);
        let c = Point::new(vec![1, 1, 1]);

        assert_eq!(a.distance_squared(&b), 300);
        assert_eq!(a.distance_squared(&c), 3);
        assert_eq!(b.distance_squared(&c), 243);
        assert_eq!(c.distance_squared(&b), 243);
        assert_eq!(a.distance_squared(&a), 0);
    }

    #[test]
    fn negative_coordinates() {

        let a = Point::new(vec![-5, 2]);
        let b = Point::new(vec![3, -4]);
        assert_eq!(a.distance_squared(&b), 64 + 36);
        assert_eq!(a.plane_distance_squared(0, 3), 64);
    }

    #[test]
    fn parse_points() {

        let contents = "162,817,812\n57,618,57\n\n906,360,560\n";
        let set = PointSet::parse(contents).unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.dim, 3);
        assert_eq!(set.get(1), &Point::new(vec![57, 618, 57]));
    }

    #[test]
    fn parse_trims_whitespace() {

        let set = PointSet::parse("  1, 2 ,3  \r\n4,5,6").unwrap();
        assert_eq!(set.get(0).coords, vec![1, 2, 3]);
        assert_eq!(set.get(1).coords, vec![4, 5, 6]);
    }

    #[test]
    fn parse_rejects_bad_field() {

        let err = PointSet::parse("1,2,3\n4,x,6\n").unwrap_err();
        match err {
            Error::Parse { line, field } => {
                assert_eq!(line, 2);
                assert_eq!(field, "x");
            },
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn parse_rejects_ragged_rows() {

        let err = PointSet::parse("1,2,3\n4,5\n").unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 3, found: 2 }));
    }

    #[test]
    fn parse_empty() {

        let set = PointSet::parse("\n\n").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.dim, 0);
    }

    #[test]
    fn missing_file_is_io_error() {

        let err = PointSet::from_file("test_data/does_not_exist.txt").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn load_fixture() {

        let set = PointSet::from_file("test_data/junctions.txt").unwrap();
        assert_eq!(set.len(), 20);
        assert_eq!(set.dim, 3);
        assert_eq!(set.get(0), &Point::new(vec![162, 817, 812]));
    }

    #[test]
    fn brute_force_orders_by_distance() {

        let set = PointSet::new(vec![
            Point::new(vec![0, 0, 0]),
            Point::new(vec![5, 0, 0]),
            Point::new(vec![0, 5, 0]),
        ]).unwrap();

        let nn = set.nearest_brute_force(&Point::new(vec![1, 0, 0]), 2);
        assert_eq!(nn, vec![(0, 1), (1, 16)]);
    }

    #[test]
    fn random_points_in_range() {

        let set = PointSet::random(100, 4, -10, 10).unwrap();
        assert_eq!(set.len(), 100);
        for p in set.points.iter() {
            assert_eq!(p.dim(), 4);
            assert!(p.coords.iter().all(|c| *c >= -10 && *c <= 10));
        }
    }

    #[test]
    fn random_rejects_zero_dimension() {

        let err = PointSet::random(5, 0, 0, 10).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { expected: 1, found: 0 }));
    }

    #[test]
    fn parse_rejects_out_of_range_field() {

        let err = PointSet::parse("5000000000,0,0\n0,0,0\n").unwrap_err();
        match err {
            Error::Parse { line, field } => {
                assert_eq!(line, 1);
                assert_eq!(field, "5000000000");
            },
            other => panic!("unexpected error: {}", other),
        }

        assert!(PointSet::parse("9223372036854775807,0\n-1,0\n").is_err());
    }

    #[test]
    fn extreme_coordinates_do_not_overflow() {

        let set = PointSet::parse("2147483647,2147483647,2147483647\n-2147483648,-2147483648,-2147483648\n").unwrap();
        let gap: Distance = 4294967295;

        assert_eq!(set.get(0).distance_squared(set.get(1)), 3 * gap * gap);
        assert_eq!(set.get(1).plane_distance_squared(0, i32::MAX), gap * gap);
    }

    #[test]
    fn display() {
        assert_eq!(Point::new(vec![1, -2, 3]).to_string(), "(1, -2, 3)");
    }
}
