//! Crate-wide error type. Every fallible operation in the library returns `Result<_, Error>`.

use std::fmt;

use crate::data::PointIndex;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Parse { line: usize, field: String },
    DimensionMismatch { expected: usize, found: usize },
    EmptyInput,
    PointNotGrouped(PointIndex),
    NotEnoughPairs { requested: usize, available: usize },
    TargetUnreachable { target: usize, remaining: usize },
    ProductOverflow { nbiggest: usize },
    Config(String),
}

impl fmt::Display for Error {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {}", e),
            Error::Parse { line, field } => {
                write!(f, "line {}: could not parse {:?} as an integer", line, field)
            },
            Error::DimensionMismatch { expected, found } => {
                write!(f, "expected {} coordinates, found {}", expected, found)
            },
            Error::EmptyInput => write!(f, "input contains no points"),
            Error::PointNotGrouped(point) => write!(f, "point {} is not in any group", point),
            Error::NotEnoughPairs { requested, available } => {
                write!(f, "requested {} union steps but only {} pairs exist", requested, available)
            },
            Error::TargetUnreachable { target, remaining } => {
                write!(f, "could not reduce to {} groups, {} groups remain", target, remaining)
            },
            Error::ProductOverflow { nbiggest } => {
                write!(f, "product of the {} biggest group sizes overflows u64", nbiggest)
            },
            Error::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for Error {

    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::convert::From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl std::convert::From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Error {
        Error::Config(e.to_string())
    }
}
