//! Error types for grid index construction and configuration.

use thiserror::Error;

/// Errors raised while building a [`GridIndex`](crate::GridIndex) or loading its configuration.
///
/// Queries never fail: "nothing found" is reported as `None`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridIndexError {
    /// No records were supplied, or none of them has a usable bounding box.
    #[error("cannot build a grid index from an empty record set")]
    EmptyInput,

    /// Grid dimensions or the derived cell size are unusable.
    #[error("invalid grid configuration: {0}")]
    InvalidConfiguration(String),

    /// A record's footprint mapped to a cell outside the grid.
    #[error(
        "record {record} maps to cell ({cell_x}, {cell_y}) outside the {n_cells_x}x{n_cells_y} grid"
    )]
    IndexOutOfRange {
        record: usize,
        cell_x: i64,
        cell_y: i64,
        n_cells_x: usize,
        n_cells_y: usize,
    },

    /// Configuration could not be parsed or serialised.
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GridIndexError>;

impl From<serde_json::Error> for GridIndexError {
    fn from(err: serde_json::Error) -> Self {
        GridIndexError::Config(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for GridIndexError {
    fn from(err: toml::de::Error) -> Self {
        GridIndexError::Config(err.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::ser::Error> for GridIndexError {
    fn from(err: toml::ser::Error) -> Self {
        GridIndexError::Config(err.to_string())
    }
}
