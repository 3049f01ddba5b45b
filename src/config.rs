//! Grid configuration.
//!
//! Grid dimensions are fixed when the index is built. The optional `max_radius`
//! is the ring cap applied to nearest-object queries that do not pass their own.

use crate::error::{GridIndexError, Result};
use serde::{Deserialize, Serialize};

/// Grid index configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    /// Number of cells along the x axis.
    #[serde(default = "GridConfig::default_cells")]
    pub n_cells_x: usize,

    /// Number of cells along the y axis.
    #[serde(default = "GridConfig::default_cells")]
    pub n_cells_y: usize,

    /// Default ring cap for nearest-object queries.
    ///
    /// `None` searches until the whole grid is covered or the result is proven optimal.
    #[serde(default)]
    pub max_radius: Option<usize>,
}

impl GridConfig {
    pub const DEFAULT_CELLS: usize = 100;

    const fn default_cells() -> usize {
        Self::DEFAULT_CELLS
    }

    /// Configuration with the given grid dimensions and no default ring cap.
    pub const fn new(n_cells_x: usize, n_cells_y: usize) -> Self {
        Self {
            n_cells_x,
            n_cells_y,
            max_radius: None,
        }
    }

    pub fn with_cells(mut self, n_cells_x: usize, n_cells_y: usize) -> Self {
        self.n_cells_x = n_cells_x;
        self.n_cells_y = n_cells_y;
        self
    }

    pub fn with_max_radius(mut self, max_radius: usize) -> Self {
        self.max_radius = Some(max_radius);
        self
    }

    /// Total number of cells in the grid.
    pub fn total_cells(&self) -> Option<usize> {
        self.n_cells_x.checked_mul(self.n_cells_y)
    }

    pub fn validate(&self) -> Result<()> {
        if self.n_cells_x == 0 || self.n_cells_y == 0 {
            return Err(GridIndexError::InvalidConfiguration(format!(
                "grid dimensions must be positive, got {}x{}",
                self.n_cells_x, self.n_cells_y
            )));
        }

        // Cell coordinates are tracked as i32 during ring expansion.
        let limit = i32::MAX as usize;
        if self.n_cells_x > limit || self.n_cells_y > limit {
            return Err(GridIndexError::InvalidConfiguration(format!(
                "grid dimensions must not exceed {} cells per axis, got {}x{}",
                limit, self.n_cells_x, self.n_cells_y
            )));
        }

        if self.total_cells().is_none() {
            return Err(GridIndexError::InvalidConfiguration(format!(
                "grid of {}x{} cells overflows the addressable cell count",
                self.n_cells_x, self.n_cells_y
            )));
        }

        if self.n_cells_x.saturating_mul(self.n_cells_y) > 100_000_000 {
            log::warn!(
                "Grid of {}x{} cells is very large and allocates one bucket per cell",
                self.n_cells_x,
                self.n_cells_y
            );
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: GridConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: GridConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CELLS, Self::DEFAULT_CELLS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = GridConfig::default();
        assert_eq!(config.n_cells_x, 100);
        assert_eq!(config.n_cells_y, 100);
        assert!(config.max_radius.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_dimensions() {
        let err = GridConfig::new(0, 10).validate().unwrap_err();
        assert!(matches!(err, GridIndexError::InvalidConfiguration(_)));

        let err = GridConfig::new(10, 0).validate().unwrap_err();
        assert!(matches!(err, GridIndexError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_config_rejects_oversized_axis() {
        let config = GridConfig::new(i32::MAX as usize + 1, 1);
        assert!(matches!(
            config.validate(),
            Err(GridIndexError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = GridConfig::default().with_cells(20, 30).with_max_radius(4);

        let json = config.to_json().unwrap();
        let deserialized = GridConfig::from_json(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_config_json_defaults_and_validation() {
        let config = GridConfig::from_json(r#"{ "n_cells_x": 8 }"#).unwrap();
        assert_eq!(config, GridConfig::new(8, 100));

        assert!(matches!(
            GridConfig::from_json(r#"{ "n_cells_x": 0 }"#),
            Err(GridIndexError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            GridConfig::from_json(r#"{ "cells": 8 }"#),
            Err(GridIndexError::Config(_))
        ));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_config_toml() {
        let config = GridConfig::from_toml("n_cells_x = 16\nn_cells_y = 12\nmax_radius = 3\n").unwrap();
        assert_eq!(config, GridConfig::new(16, 12).with_max_radius(3));

        let text = config.to_toml().unwrap();
        assert_eq!(GridConfig::from_toml(&text).unwrap(), config);
    }
}
