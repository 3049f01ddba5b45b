//! Builder for grid index construction
//!
//! Collects grid settings before the records are handed over. Useful when the
//! configuration is assembled in several places or loaded from a file.

use crate::config::GridConfig;
use crate::error::Result;
use crate::geometry::{Geometry, Identity, Projection};
use crate::index::GridIndex;

/// Builder for [`GridIndex`] settings.
#[derive(Debug, Clone, Default)]
pub struct GridIndexBuilder {
    config: GridConfig,
}

impl GridIndexBuilder {
    /// Create a new builder with the default 100 × 100 grid.
    pub fn new() -> Self {
        Self {
            config: GridConfig::default(),
        }
    }

    /// Set the grid dimensions.
    pub fn cells(mut self, n_cells_x: usize, n_cells_y: usize) -> Self {
        self.config = self.config.with_cells(n_cells_x, n_cells_y);
        self
    }

    /// Set the default ring cap for nearest-object queries.
    pub fn max_radius(mut self, max_radius: usize) -> Self {
        self.config = self.config.with_max_radius(max_radius);
        self
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: GridConfig) -> Self {
        self.config = config;
        self
    }

    /// Build an index whose records are geometries themselves.
    pub fn build<G: Geometry>(self, records: Vec<G>) -> Result<GridIndex<G>> {
        GridIndex::with_config(records, Identity, self.config)
    }

    /// Build an index with a custom projection.
    pub fn build_with<R, P: Projection<R>>(
        self,
        records: Vec<R>,
        projection: P,
    ) -> Result<GridIndex<R, P>> {
        GridIndex::with_config(records, projection, self.config)
    }

    /// Build an index projecting each record through `f`.
    ///
    /// Unlike [`build_with`](Self::build_with), the closure argument type is inferred.
    pub fn build_fn<R, G, F>(self, records: Vec<R>, f: F) -> Result<GridIndex<R, F>>
    where
        F: Fn(&R) -> G,
        G: Geometry,
    {
        GridIndex::with_config(records, f, self.config)
    }
}
