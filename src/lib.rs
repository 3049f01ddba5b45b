//! Uniform-grid spatial index for nearest-object, containment and distance queries.
//!
//! ## Features
//! - **Static grid**: records are bucketed once into a fixed `n_cells_x × n_cells_y` grid
//!   laid over their envelope, by true geometry intersection rather than bounding boxes
//! - **Nearest object**: expanding square-ring search with a provable stopping rule and
//!   an optional ring cap for bounded-cost approximate answers
//! - **Containment**: find the record whose geometry covers a point
//! - **Any record type**: records map to geometry through a [`Projection`]; geometry
//!   primitives come from the `geo` crate
//!
//! ```rust
//! use geo_grid_index::prelude::*;
//!
//! let shapes = vec![
//!     Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }).to_polygon(),
//!     Rect::new(coord! { x: 5.0, y: 5.0 }, coord! { x: 6.0, y: 6.0 }).to_polygon(),
//!     Rect::new(coord! { x: 10.0, y: 10.0 }, coord! { x: 11.0, y: 11.0 }).to_polygon(),
//! ];
//! let index = GridIndexBuilder::new().cells(10, 10).build(shapes)?;
//!
//! let (distance, _) = index.nearest_object(&Point::new(0.5, 0.5), None).unwrap();
//! assert_eq!(distance, 0.0);
//!
//! assert!(index.object_on_point(&Point::new(5.5, 5.5)).is_some());
//! assert!(index.object_on_point(&Point::new(20.0, 20.0)).is_none());
//! # Ok::<(), geo_grid_index::GridIndexError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod geometry;
pub mod index;
pub mod stats;

pub use builder::GridIndexBuilder;
pub use config::GridConfig;
pub use error::{GridIndexError, Result};
pub use geometry::{Geometry, Identity, Projection};
pub use index::{GridIndex, RecordId};
pub use stats::IndexStats;

pub use geo::{Point, Rect};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GridConfig, GridIndex, GridIndexBuilder, GridIndexError, Result};

    pub use crate::{Geometry, Identity, Projection, RecordId};

    pub use geo::{Point, Polygon, Rect, coord};
}
