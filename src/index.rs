//! Uniform-grid spatial index over a fixed set of records.
//!
//! The index covers the envelope of all record geometries with an
//! `n_cells_x × n_cells_y` grid. Every record is listed in each cell its geometry
//! actually intersects, so queries only look at the records filed near the query point.
//!
//! Nearest-object queries expand outward from the query point's cell one square
//! ring at a time and stop as soon as no unvisited ring can hold anything closer.
//!
//! ```rust
//! use geo::{coord, point, Rect};
//! use geo_grid_index::{GridConfig, GridIndex, Identity};
//!
//! let parcels = vec![
//!     Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 }).to_polygon(),
//!     Rect::new(coord! { x: 5.0, y: 5.0 }, coord! { x: 6.0, y: 6.0 }).to_polygon(),
//! ];
//! let index = GridIndex::with_config(parcels, Identity, GridConfig::new(10, 10))?;
//!
//! let (distance, _parcel) = index.nearest_object(&point!(x: 3.0, y: 3.0), None).unwrap();
//! assert!((distance - 8.0_f64.sqrt()).abs() < 1e-9);
//! assert!(index.object_on_point(&point!(x: 5.5, y: 5.5)).is_some());
//! # Ok::<(), geo_grid_index::GridIndexError>(())
//! ```

use crate::config::GridConfig;
use crate::error::{GridIndexError, Result};
use crate::geometry::{Geometry, Identity, Projection};
use crate::stats::IndexStats;
use geo::{Point, Rect, coord};
use std::fmt;
use std::time::Instant;

/// Stable handle of a record inside a [`GridIndex`]: its position in the input sequence.
pub type RecordId = usize;

/// Placement of the grid over the envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GridLayout {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
    cell_width: f64,
    cell_height: f64,
    n_cells_x: usize,
    n_cells_y: usize,
}

impl GridLayout {
    /// Lay the grid over the union of `bounds`, widened by one unit on the high side.
    fn enclosing<'a>(
        bounds: impl IntoIterator<Item = &'a Rect>,
        config: &GridConfig,
    ) -> Result<Self> {
        let mut bounds = bounds.into_iter();
        let first = bounds.next().ok_or(GridIndexError::EmptyInput)?;
        let (mut left, mut bottom) = (first.min().x, first.min().y);
        let (mut max_x, mut max_y) = (first.max().x, first.max().y);
        for rect in bounds {
            left = left.min(rect.min().x);
            bottom = bottom.min(rect.min().y);
            max_x = max_x.max(rect.max().x);
            max_y = max_y.max(rect.max().y);
        }

        let right = max_x + 1.0;
        let top = max_y + 1.0;
        let cell_width = (right - left) / config.n_cells_x as f64;
        let cell_height = (top - bottom) / config.n_cells_y as f64;

        if !(cell_width > 0.0 && cell_width.is_finite())
            || !(cell_height > 0.0 && cell_height.is_finite())
        {
            return Err(GridIndexError::InvalidConfiguration(format!(
                "envelope [{left}, {right}] x [{bottom}, {top}] yields unusable cell size \
                 {cell_width} x {cell_height}"
            )));
        }

        Ok(Self {
            left,
            bottom,
            right,
            top,
            cell_width,
            cell_height,
            n_cells_x: config.n_cells_x,
            n_cells_y: config.n_cells_y,
        })
    }

    /// Floor of the cell coordinate along one axis, saturated to `i32`.
    #[inline]
    fn cell_coord(value: f64, origin: f64, cell_size: f64) -> i32 {
        // `as` saturates out-of-range values; callers reject NaN beforehand.
        ((value - origin) / cell_size).floor() as i32
    }

    /// Grid coordinates of the cell holding `(x, y)`, possibly outside the grid.
    #[inline]
    fn cell_coords(&self, x: f64, y: f64) -> (i64, i64) {
        (
            i64::from(Self::cell_coord(x, self.left, self.cell_width)),
            i64::from(Self::cell_coord(y, self.bottom, self.cell_height)),
        )
    }

    /// Flat bucket index of cell `(i, j)`, or `None` outside the grid.
    #[inline]
    fn flat_index(&self, i: i64, j: i64) -> Option<usize> {
        let i = usize::try_from(i).ok()?;
        let j = usize::try_from(j).ok()?;
        (i < self.n_cells_x && j < self.n_cells_y).then(|| i * self.n_cells_y + j)
    }

    fn cell_rect(&self, i: usize, j: usize) -> Rect {
        let x0 = self.left + i as f64 * self.cell_width;
        let y0 = self.bottom + j as f64 * self.cell_height;
        Rect::new(
            coord! { x: x0, y: y0 },
            coord! { x: x0 + self.cell_width, y: y0 + self.cell_height },
        )
    }

    fn total_cells(&self) -> usize {
        self.n_cells_x * self.n_cells_y
    }
}

/// Running minimum of a nearest-object search. Ties keep the first candidate seen.
#[derive(Debug, Default)]
struct Closest {
    best: Option<(f64, RecordId)>,
}

impl Closest {
    #[inline]
    fn offer(&mut self, distance: f64, id: RecordId) {
        if !distance.is_finite() {
            return;
        }
        if self.best.is_none_or(|(best, _)| distance < best) {
            self.best = Some((distance, id));
        }
    }
}

/// Static spatial index that buckets records into a uniform grid.
///
/// Built once from a non-empty record collection and immutable afterwards.
/// Queries take `&self`, so a built index can be shared across threads as long as
/// the records and projection allow it.
pub struct GridIndex<R, P = Identity> {
    records: Vec<R>,
    projection: P,
    config: GridConfig,
    layout: GridLayout,
    /// `offsets[c]..offsets[c + 1]` is the slice of `entries` filed under cell `c`.
    offsets: Vec<usize>,
    entries: Vec<RecordId>,
    placed_records: usize,
}

impl<R, P> fmt::Debug for GridIndex<R, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridIndex")
            .field("records", &self.records.len())
            .field("n_cells_x", &self.layout.n_cells_x)
            .field("n_cells_y", &self.layout.n_cells_y)
            .field("envelope", &self.envelope())
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

impl<R, P: Projection<R>> GridIndex<R, P> {
    /// Build an index on the default 100 × 100 grid.
    pub fn new(records: Vec<R>, projection: P) -> Result<Self> {
        Self::with_config(records, projection, GridConfig::default())
    }

    /// Build an index with explicit grid settings.
    ///
    /// The projection runs exactly once per record here. Records with no bounding box
    /// or non-finite bounds are kept but filed in no cell.
    ///
    /// # Errors
    ///
    /// - [`GridIndexError::InvalidConfiguration`] for zero grid dimensions or an
    ///   envelope that cannot be divided into cells
    /// - [`GridIndexError::EmptyInput`] if no record has usable bounds
    /// - [`GridIndexError::IndexOutOfRange`] if a record's footprint maps outside the grid
    pub fn with_config(records: Vec<R>, projection: P, config: GridConfig) -> Result<Self> {
        config.validate()?;
        if records.is_empty() {
            return Err(GridIndexError::EmptyInput);
        }

        let start = Instant::now();
        let (layout, buckets) = {
            let shapes: Vec<_> = records
                .iter()
                .map(|record| projection.project(record))
                .collect();
            let bounds: Vec<Option<Rect>> = shapes
                .iter()
                .enumerate()
                .map(|(id, shape)| usable_bounds(id, shape))
                .collect();

            let layout = GridLayout::enclosing(bounds.iter().flatten(), &config)?;
            log::debug!(
                "Grid dimensions: left: {} right: {} top: {} bottom: {}, cell width: {} cell height: {}",
                layout.left,
                layout.right,
                layout.top,
                layout.bottom,
                layout.cell_width,
                layout.cell_height
            );

            let buckets = fill_buckets(&layout, &shapes, &bounds)?;
            (layout, buckets)
        };

        let mut placed = vec![false; records.len()];
        let mut offsets = Vec::with_capacity(buckets.len() + 1);
        let mut entries = Vec::with_capacity(buckets.iter().map(Vec::len).sum());
        offsets.push(0);
        for bucket in buckets {
            for &id in &bucket {
                placed[id] = true;
            }
            entries.extend(bucket);
            offsets.push(entries.len());
        }
        let placed_records = placed.iter().filter(|&&p| p).count();

        log::debug!("Index built in {:?}", start.elapsed());
        log::debug!(
            "Number of records: {}, number of index entries: {}",
            records.len(),
            entries.len()
        );

        Ok(Self {
            records,
            projection,
            config,
            layout,
            offsets,
            entries,
            placed_records,
        })
    }

    /// Nearest record to `point` and its distance.
    ///
    /// Searches the point's cell, then square rings of cells around it in order of
    /// increasing radius. After ring `r` the search stops once the best distance is
    /// below `r` cell widths and `r` cell heights, since nothing outside can be closer.
    ///
    /// `max_radius` caps the number of rings (falling back to the configured
    /// [`GridConfig::max_radius`]). A capped search may miss the true nearest record
    /// or find nothing at all. Without any cap the search ends once every cell has
    /// been visited, so the result matches a brute-force scan.
    ///
    /// Equal distances resolve to the record seen first: home cell, then each ring's
    /// bottom edge left to right, right edge upward, top edge right to left and left
    /// edge downward; within a cell, input order.
    pub fn nearest_object(&self, point: &Point, max_radius: Option<usize>) -> Option<(f64, &R)> {
        self.nearest_id(point, max_radius)
            .map(|(distance, id)| (distance, &self.records[id]))
    }

    /// Same search as [`nearest_object`](Self::nearest_object), returning the record's handle.
    pub fn nearest_id(&self, point: &Point, max_radius: Option<usize>) -> Option<(f64, RecordId)> {
        if !is_finite(point) {
            return None;
        }

        let layout = &self.layout;
        let (ci, cj) = layout.cell_coords(point.x(), point.y());
        let nx = layout.n_cells_x as i64;
        let ny = layout.n_cells_y as i64;
        let mut closest = Closest::default();

        if let Some(cell) = layout.flat_index(ci, cj) {
            self.scan_cell(cell, point, &mut closest);
        }

        // Ring at which the whole grid has been visited, and the first ring that
        // touches the grid when the home cell lies outside it.
        let covering = ci.max(nx - 1 - ci).max(cj).max(ny - 1 - cj);
        let first = 1_i64.max(-ci).max(ci - (nx - 1)).max(-cj).max(cj - (ny - 1));
        let last = match max_radius.or(self.config.max_radius) {
            Some(cap) => i64::try_from(cap).unwrap_or(i64::MAX).min(covering),
            None => covering,
        };

        for radius in first..=last {
            self.scan_ring(ci, cj, radius, point, &mut closest);

            if let Some((distance, _)) = closest.best {
                let reach = radius as f64;
                if distance < reach * layout.cell_width && distance < reach * layout.cell_height {
                    log::trace!(
                        "Nearest search at ({}, {}) settled after ring {}",
                        point.x(),
                        point.y(),
                        radius
                    );
                    break;
                }
            }
        }

        closest.best
    }

    /// Distance from `point` to the nearest record, per [`nearest_object`](Self::nearest_object).
    pub fn min_distance(&self, point: &Point, max_radius: Option<usize>) -> Option<f64> {
        self.nearest_id(point, max_radius)
            .map(|(distance, _)| distance)
    }

    /// First record in the point's cell whose geometry contains `point`.
    ///
    /// Only the home cell is consulted; neighbouring cells are never searched.
    pub fn object_on_point(&self, point: &Point) -> Option<&R> {
        self.object_id_on_point(point).map(|id| &self.records[id])
    }

    /// Handle of the record returned by [`object_on_point`](Self::object_on_point).
    pub fn object_id_on_point(&self, point: &Point) -> Option<RecordId> {
        let cell = self.home_cell(point)?;
        self.cell_entries(cell).iter().copied().find(|&id| {
            self.projection
                .project(&self.records[id])
                .contains_point(point)
        })
    }

    fn scan_cell(&self, cell: usize, point: &Point, closest: &mut Closest) {
        for &id in self.cell_entries(cell) {
            let distance = self.projection.project(&self.records[id]).distance_to(point);
            closest.offer(distance, id);
        }
    }

    /// Visit the in-grid cells at Chebyshev distance `radius` from `(ci, cj)`.
    ///
    /// The ring is walked by offset `x` in `0..2 * radius`. Each offset visits one
    /// cell of the bottom edge (left to right), the right edge (bottom to top), the
    /// top edge (right to left) and the left edge (top to bottom), in that order.
    fn scan_ring(&self, ci: i64, cj: i64, radius: i64, point: &Point, closest: &mut Closest) {
        let nx = self.layout.n_cells_x as i64;
        let ny = self.layout.n_cells_y as i64;
        let edge = |x: i64| {
            [
                (ci - radius + x, cj - radius),
                (ci + radius, cj - radius + x),
                (ci + radius - x, cj + radius),
                (ci - radius, cj + radius - x),
            ]
        };

        // Offsets at which each edge is inside the grid. Only their union is walked,
        // which keeps rings around far-off query points cheap.
        let mut spans = [
            (0..ny).contains(&(cj - radius)).then_some((radius - ci, radius - ci + nx - 1)),
            (0..nx).contains(&(ci + radius)).then_some((radius - cj, radius - cj + ny - 1)),
            (0..ny).contains(&(cj + radius)).then_some((ci + radius - nx + 1, ci + radius)),
            (0..nx).contains(&(ci - radius)).then_some((cj + radius - ny + 1, cj + radius)),
        ]
        .into_iter()
        .flatten()
        .map(|(lo, hi)| (lo.max(0), hi.min(2 * radius - 1)))
        .filter(|(lo, hi)| lo <= hi)
        .collect::<Vec<_>>();
        spans.sort_unstable();

        let mut next = 0;
        for (lo, hi) in spans {
            for x in lo.max(next)..=hi {
                for (i, j) in edge(x) {
                    if let Some(cell) = self.layout.flat_index(i, j) {
                        self.scan_cell(cell, point, closest);
                    }
                }
            }
            next = next.max(hi + 1);
        }
    }
}

impl<R, P> GridIndex<R, P> {
    /// Envelope covered by the grid: `left`/`bottom` are the minimum record bounds,
    /// `right`/`top` the maximum bounds plus one.
    pub fn envelope(&self) -> Rect {
        Rect::new(
            coord! { x: self.layout.left, y: self.layout.bottom },
            coord! { x: self.layout.right, y: self.layout.top },
        )
    }

    /// Cell width and height.
    pub fn cell_size(&self) -> (f64, f64) {
        (self.layout.cell_width, self.layout.cell_height)
    }

    /// Grid dimensions as `(n_cells_x, n_cells_y)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.layout.n_cells_x, self.layout.n_cells_y)
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&R> {
        self.records.get(id)
    }

    /// Grid cell holding `point`, or `None` if it lies outside the grid.
    pub fn cell_of(&self, point: &Point) -> Option<(usize, usize)> {
        let cell = self.home_cell(point)?;
        Some((cell / self.layout.n_cells_y, cell % self.layout.n_cells_y))
    }

    /// Rectangle covered by cell `(i, j)`.
    pub fn cell_rect(&self, i: usize, j: usize) -> Option<Rect> {
        (i < self.layout.n_cells_x && j < self.layout.n_cells_y)
            .then(|| self.layout.cell_rect(i, j))
    }

    /// Handles of the records filed under cell `(i, j)`, in scan order.
    pub fn bucket(&self, i: usize, j: usize) -> Option<&[RecordId]> {
        (i < self.layout.n_cells_x && j < self.layout.n_cells_y)
            .then(|| self.cell_entries(i * self.layout.n_cells_y + j))
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            records: self.records.len(),
            placed_records: self.placed_records,
            entries: self.entries.len(),
            occupied_cells: self.offsets.windows(2).filter(|w| w[1] > w[0]).count(),
            total_cells: self.layout.total_cells(),
        }
    }

    /// Hand the records back, discarding the grid.
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    #[inline]
    fn cell_entries(&self, cell: usize) -> &[RecordId] {
        &self.entries[self.offsets[cell]..self.offsets[cell + 1]]
    }

    fn home_cell(&self, point: &Point) -> Option<usize> {
        if !is_finite(point) {
            return None;
        }
        let (i, j) = self.layout.cell_coords(point.x(), point.y());
        self.layout.flat_index(i, j)
    }
}

#[inline]
fn is_finite(point: &Point) -> bool {
    point.x().is_finite() && point.y().is_finite()
}

/// Bounding box of a record's geometry if it can be placed on the grid.
fn usable_bounds<G: Geometry>(id: RecordId, shape: &G) -> Option<Rect> {
    let bounds = shape.bounds()?;
    let finite = [bounds.min(), bounds.max()]
        .iter()
        .all(|c| c.x.is_finite() && c.y.is_finite());
    if !finite {
        log::warn!("Skipping record {} with non-finite bounds {:?}", id, bounds);
        return None;
    }
    Some(bounds)
}

/// File every record under each cell its geometry intersects.
fn fill_buckets<G: Geometry>(
    layout: &GridLayout,
    shapes: &[G],
    bounds: &[Option<Rect>],
) -> Result<Vec<Vec<RecordId>>> {
    let mut buckets: Vec<Vec<RecordId>> = vec![Vec::new(); layout.total_cells()];

    for (id, (shape, bounds)) in shapes.iter().zip(bounds).enumerate() {
        let Some(bounds) = bounds else {
            continue;
        };
        let (min_i, min_j) = layout.cell_coords(bounds.min().x, bounds.min().y);
        let (max_i, max_j) = layout.cell_coords(bounds.max().x, bounds.max().y);

        for i in min_i..=max_i {
            for j in min_j..=max_j {
                let Some(cell) = layout.flat_index(i, j) else {
                    log::error!(
                        "Record {} bounds {:?} map to cell ({}, {}) outside the {}x{} grid",
                        id,
                        bounds,
                        i,
                        j,
                        layout.n_cells_x,
                        layout.n_cells_y
                    );
                    return Err(GridIndexError::IndexOutOfRange {
                        record: id,
                        cell_x: i,
                        cell_y: j,
                        n_cells_x: layout.n_cells_x,
                        n_cells_y: layout.n_cells_y,
                    });
                };

                // i and j are in range here, so the casts are lossless.
                let rect = layout.cell_rect(i as usize, j as usize);
                if shape.intersects_rect(&rect) {
                    buckets[cell].push(id);
                }
            }
        }
    }

    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon, line_string, point};
    use std::cell::Cell;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 }).to_polygon()
    }

    fn scenario() -> GridIndex<Polygon> {
        let records = vec![
            square(0.0, 0.0, 1.0, 1.0),
            square(5.0, 5.0, 6.0, 6.0),
            square(10.0, 10.0, 11.0, 11.0),
        ];
        GridIndex::with_config(records, Identity, GridConfig::new(10, 10)).unwrap()
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = GridIndex::<Polygon>::new(Vec::new(), Identity).unwrap_err();
        assert_eq!(err, GridIndexError::EmptyInput);
    }

    #[test]
    fn test_only_empty_geometries_is_rejected() {
        let records = vec![LineString::new(vec![]), LineString::new(vec![])];
        let err = GridIndex::new(records, Identity).unwrap_err();
        assert_eq!(err, GridIndexError::EmptyInput);
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        let records = vec![square(0.0, 0.0, 1.0, 1.0)];
        let err = GridIndex::with_config(records, Identity, GridConfig::new(0, 5)).unwrap_err();
        assert!(matches!(err, GridIndexError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_envelope_and_cell_size() {
        let index = scenario();
        let envelope = index.envelope();
        assert_eq!(envelope.min(), coord! { x: 0.0, y: 0.0 });
        assert_eq!(envelope.max(), coord! { x: 12.0, y: 12.0 });
        assert_eq!(index.cell_size(), (1.2, 1.2));
        assert_eq!(index.dimensions(), (10, 10));
    }

    #[test]
    fn test_buckets_follow_geometry() {
        let index = scenario();
        assert_eq!(index.bucket(4, 4), Some(&[1][..]));
        assert_eq!(index.bucket(3, 3), Some(&[][..]));
        assert_eq!(index.bucket(0, 0), Some(&[0][..]));
        assert_eq!(index.bucket(2, 2), Some(&[][..]));
        assert_eq!(index.bucket(10, 0), None);
    }

    #[test]
    fn test_diagonal_line_skips_untouched_cells() {
        let records = vec![line_string![(x: 0.0, y: 0.0), (x: 9.0, y: 9.0)]];
        let index = GridIndex::with_config(records, Identity, GridConfig::new(10, 10)).unwrap();

        // The bounding box covers the full grid, but only the diagonal band is filed.
        assert!(index.bucket(0, 9).unwrap().is_empty());
        assert!(index.bucket(9, 0).unwrap().is_empty());
        assert_eq!(index.bucket(4, 4), Some(&[0][..]));

        let stats = index.stats();
        assert!(stats.entries < 100);
        assert_eq!(stats.placed_records, 1);
    }

    #[test]
    fn test_scenario_queries() {
        let index = scenario();

        let (distance, record) = index.nearest_object(&point!(x: 0.5, y: 0.5), None).unwrap();
        assert_eq!(distance, 0.0);
        assert_eq!(record, &index.records()[0]);

        // (3, 3) is equally far from the first and second squares; the first
        // square's cell comes earlier in ring order.
        let (distance, id) = index.nearest_id(&point!(x: 3.0, y: 3.0), None).unwrap();
        assert!((distance - 8.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(id, 0);

        let (distance, id) = index.nearest_id(&point!(x: 3.2, y: 3.2), None).unwrap();
        assert!((distance - 1.8 * 2.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(id, 1);

        assert_eq!(index.object_id_on_point(&point!(x: 5.5, y: 5.5)), Some(1));
        assert!(index.object_on_point(&point!(x: 20.0, y: 20.0)).is_none());
    }

    #[test]
    fn test_min_distance_matches_nearest() {
        let index = scenario();
        let p = point!(x: 8.0, y: 2.0);
        let (distance, _) = index.nearest_object(&p, None).unwrap();
        assert_eq!(index.min_distance(&p, None), Some(distance));
    }

    #[test]
    fn test_radius_cap_can_miss() {
        let index = scenario();
        // Home cell (2, 2) is empty; ring 1 reaches cells 1..=3, which are empty too.
        let p = point!(x: 3.0, y: 3.0);
        assert!(index.nearest_object(&p, Some(0)).is_none());
        assert!(index.nearest_object(&p, Some(1)).is_none());
        assert_eq!(index.nearest_id(&p, Some(2)).map(|(_, id)| id), Some(0));
    }

    #[test]
    fn test_configured_radius_is_the_default_cap() {
        let records = vec![square(0.0, 0.0, 1.0, 1.0), square(10.0, 10.0, 11.0, 11.0)];
        let config = GridConfig::new(10, 10).with_max_radius(1);
        let index = GridIndex::with_config(records, Identity, config).unwrap();

        let p = point!(x: 6.0, y: 6.0);
        assert!(index.nearest_object(&p, None).is_none());
        assert!(index.nearest_object(&p, Some(10)).is_some());
    }

    #[test]
    fn test_point_outside_grid() {
        let index = scenario();
        let (distance, id) = index.nearest_id(&point!(x: -3.0, y: 0.5), None).unwrap();
        assert!((distance - 3.0).abs() < 1e-12);
        assert_eq!(id, 0);

        let (distance, id) = index.nearest_id(&point!(x: 1e9, y: 1e9), None).unwrap();
        assert_eq!(id, 2);
        assert!(distance > 1e9);

        assert!(index.cell_of(&point!(x: -3.0, y: 0.5)).is_none());
    }

    #[test]
    fn test_non_finite_point() {
        let index = scenario();
        let p = point!(x: f64::NAN, y: 0.5);
        assert!(index.nearest_object(&p, None).is_none());
        assert!(index.object_on_point(&p).is_none());
        assert!(index.cell_of(&p).is_none());
    }

    #[test]
    fn test_ties_resolve_in_scan_order() {
        // Two identical squares: the first in input order wins.
        let records = vec![square(2.0, 2.0, 3.0, 3.0), square(2.0, 2.0, 3.0, 3.0)];
        let index = GridIndex::with_config(records, Identity, GridConfig::new(4, 4)).unwrap();
        let nearest = index.nearest_id(&point!(x: 0.0, y: 0.0), None);
        assert_eq!(nearest.map(|(_, id)| id), Some(0));
    }

    #[test]
    fn test_ring_order_prefers_bottom_edge() {
        // Points straight below and straight above the query, equally far.
        let records = vec![
            point!(x: 5.5, y: 8.5),
            point!(x: 5.5, y: 2.5),
            point!(x: 0.0, y: 0.0),
            point!(x: 10.0, y: 10.0),
        ];
        let index = GridIndex::with_config(records, Identity, GridConfig::new(11, 11)).unwrap();
        let (distance, id) = index.nearest_id(&point!(x: 5.5, y: 5.5), None).unwrap();
        assert_eq!(distance, 3.0);
        assert_eq!(id, 1);
    }

    #[test]
    fn test_ring_walks_edges_by_offset() {
        // Both points are 1.25 from the query. The one in cell (6, 4) sits at offset 0
        // of the right edge and is reached before the one in cell (5, 4), which sits
        // at offset 1 of the bottom edge.
        let records = vec![
            point!(x: 0.0, y: 0.0),
            point!(x: 10.0, y: 10.0),
            point!(x: 5.5, y: 4.25),
            point!(x: 6.25, y: 4.5),
        ];
        let index = GridIndex::with_config(records, Identity, GridConfig::new(11, 11)).unwrap();
        assert_eq!(index.cell_of(&point!(x: 5.5, y: 4.25)), Some((5, 4)));
        assert_eq!(index.cell_of(&point!(x: 6.25, y: 4.5)), Some((6, 4)));

        let (distance, id) = index.nearest_id(&point!(x: 5.5, y: 5.5), None).unwrap();
        assert_eq!(distance, 1.25);
        assert_eq!(id, 3);
    }

    #[test]
    fn test_ring_clipped_far_outside_grid() {
        // A ring around a far-off cell touches the grid on one edge only.
        let records = vec![point!(x: 0.5, y: 0.5), point!(x: 0.5, y: 9.5)];
        let index = GridIndex::with_config(records, Identity, GridConfig::new(10, 10)).unwrap();
        let (_, id) = index.nearest_id(&point!(x: -1e6, y: 9.6), None).unwrap();
        assert_eq!(id, 1);
    }

    #[test]
    fn test_projection_called_once_per_record_on_build() {
        let calls = Cell::new(0usize);
        let records = vec![(0.0, 0.0), (3.0, 4.0), (9.0, 9.0)];
        let projection = |r: &(f64, f64)| {
            calls.set(calls.get() + 1);
            Point::new(r.0, r.1)
        };
        let index = GridIndex::with_config(records, projection, GridConfig::new(5, 5)).unwrap();
        assert_eq!(calls.get(), 3);

        let (_, record) = index.nearest_object(&point!(x: 3.0, y: 3.0), None).unwrap();
        assert_eq!(record, &(3.0, 4.0));
    }

    #[test]
    fn test_non_finite_geometry_is_skipped() {
        let records = vec![point!(x: 1.0, y: 1.0), point!(x: f64::INFINITY, y: 0.0)];
        let index = GridIndex::with_config(records, Identity, GridConfig::new(2, 2)).unwrap();
        let stats = index.stats();
        assert_eq!(stats.records, 2);
        assert_eq!(stats.placed_records, 1);
        assert_eq!(index.envelope().max(), coord! { x: 2.0, y: 2.0 });
    }

    #[test]
    fn test_out_of_range_placement_is_fatal() {
        // A shape wider than the bounds the envelope was computed from.
        let layout = GridLayout::enclosing(
            [Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 })].iter(),
            &GridConfig::new(2, 2),
        )
        .unwrap();
        let oversized = square(0.0, 0.0, 5.0, 5.0);
        let err = fill_buckets(&layout, &[&oversized], &[oversized.bounds()]).unwrap_err();
        assert!(matches!(
            err,
            GridIndexError::IndexOutOfRange {
                record: 0,
                n_cells_x: 2,
                n_cells_y: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_degenerate_envelope_is_rejected() {
        let records = vec![point!(x: 1e20, y: 1e20)];
        let err = GridIndex::new(records, Identity).unwrap_err();
        assert!(matches!(err, GridIndexError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_stats_and_accessors() {
        let index = scenario();
        let stats = index.stats();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.placed_records, 3);
        assert_eq!(stats.total_cells, 100);
        assert_eq!(stats.entries, index.entries.len());
        assert!(stats.occupied_cells >= 3);

        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert!(index.get(3).is_none());
        assert_eq!(index.cell_of(&point!(x: 5.5, y: 5.5)), Some((4, 4)));
        assert_eq!(
            index.cell_rect(0, 0),
            Some(Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.2, y: 1.2 }))
        );
        assert!(index.cell_rect(0, 10).is_none());
        assert_eq!(index.into_records().len(), 3);
    }

    #[test]
    fn test_debug_output() {
        let rendered = format!("{:?}", scenario());
        assert!(rendered.starts_with("GridIndex"));
        assert!(rendered.contains("records: 3"));
    }
}
