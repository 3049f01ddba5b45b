//! Geometry capability consumed by the grid index, backed by the `geo` crate.
//!
//! The index never does geometry math itself. It asks a record's geometry for its
//! bounding box, its planar distance to a point, whether it touches a cell rectangle
//! and whether it contains a point. Everything else is delegated to `geo`.

use geo::{BoundingRect, Contains, Distance, Euclidean, Intersects};
use geo::{
    GeometryCollection, Line, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon, Rect, Triangle,
};

/// Spatial operations the grid index needs from a shape.
///
/// Coordinates are planar; distances are Euclidean in the caller's units.
pub trait Geometry {
    /// Axis-aligned bounding box, or `None` for an empty geometry.
    fn bounds(&self) -> Option<Rect>;

    /// Euclidean distance from the geometry to `point`. Zero when the point is covered.
    fn distance_to(&self, point: &Point) -> f64;

    /// Whether the geometry touches or overlaps `rect`.
    fn intersects_rect(&self, rect: &Rect) -> bool;

    /// Whether the geometry contains `point`.
    fn contains_point(&self, point: &Point) -> bool;
}

macro_rules! impl_geometry_via_geo {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Geometry for $ty {
                #[inline]
                fn bounds(&self) -> Option<Rect> {
                    self.bounding_rect().into()
                }

                #[inline]
                fn distance_to(&self, point: &Point) -> f64 {
                    Euclidean.distance(point, self)
                }

                #[inline]
                fn intersects_rect(&self, rect: &Rect) -> bool {
                    self.intersects(rect)
                }

                #[inline]
                fn contains_point(&self, point: &Point) -> bool {
                    self.contains(point)
                }
            }
        )+
    };
}

impl_geometry_via_geo!(Line, LineString, Polygon);

impl Geometry for Point {
    #[inline]
    fn bounds(&self) -> Option<Rect> {
        Some(self.bounding_rect())
    }

    #[inline]
    fn distance_to(&self, point: &Point) -> f64 {
        Euclidean.distance(*point, *self)
    }

    #[inline]
    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.intersects(rect)
    }

    #[inline]
    fn contains_point(&self, point: &Point) -> bool {
        self.contains(point)
    }
}

// Multi-part geometries answer per member so every operation stays on the
// well-supported single-part paths in `geo`.
macro_rules! impl_geometry_for_multi {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl Geometry for $ty {
                fn bounds(&self) -> Option<Rect> {
                    self.bounding_rect()
                }

                fn distance_to(&self, point: &Point) -> f64 {
                    self.0
                        .iter()
                        .map(|part| part.distance_to(point))
                        .fold(f64::INFINITY, f64::min)
                }

                fn intersects_rect(&self, rect: &Rect) -> bool {
                    self.0.iter().any(|part| part.intersects_rect(rect))
                }

                fn contains_point(&self, point: &Point) -> bool {
                    self.0.iter().any(|part| part.contains_point(point))
                }
            }
        )+
    };
}

impl_geometry_for_multi!(MultiPoint, MultiLineString, MultiPolygon, GeometryCollection);

impl Geometry for Rect {
    fn bounds(&self) -> Option<Rect> {
        Some(*self)
    }

    fn distance_to(&self, point: &Point) -> f64 {
        self.to_polygon().distance_to(point)
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.to_polygon().intersects_rect(rect)
    }

    fn contains_point(&self, point: &Point) -> bool {
        self.to_polygon().contains_point(point)
    }
}

impl Geometry for Triangle {
    fn bounds(&self) -> Option<Rect> {
        Some(self.bounding_rect())
    }

    fn distance_to(&self, point: &Point) -> f64 {
        self.to_polygon().distance_to(point)
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        self.to_polygon().intersects_rect(rect)
    }

    fn contains_point(&self, point: &Point) -> bool {
        self.to_polygon().contains_point(point)
    }
}

impl Geometry for geo::Geometry {
    fn bounds(&self) -> Option<Rect> {
        as_dyn(self).bounds()
    }

    fn distance_to(&self, point: &Point) -> f64 {
        as_dyn(self).distance_to(point)
    }

    fn intersects_rect(&self, rect: &Rect) -> bool {
        as_dyn(self).intersects_rect(rect)
    }

    fn contains_point(&self, point: &Point) -> bool {
        as_dyn(self).contains_point(point)
    }
}

fn as_dyn(geometry: &geo::Geometry) -> &dyn Geometry {
    match geometry {
        geo::Geometry::Point(g) => g,
        geo::Geometry::Line(g) => g,
        geo::Geometry::LineString(g) => g,
        geo::Geometry::Polygon(g) => g,
        geo::Geometry::MultiPoint(g) => g,
        geo::Geometry::MultiLineString(g) => g,
        geo::Geometry::MultiPolygon(g) => g,
        geo::Geometry::GeometryCollection(g) => g,
        geo::Geometry::Rect(g) => g,
        geo::Geometry::Triangle(g) => g,
    }
}

impl<G: Geometry + ?Sized> Geometry for &G {
    #[inline]
    fn bounds(&self) -> Option<Rect> {
        (**self).bounds()
    }

    #[inline]
    fn distance_to(&self, point: &Point) -> f64 {
        (**self).distance_to(point)
    }

    #[inline]
    fn intersects_rect(&self, rect: &Rect) -> bool {
        (**self).intersects_rect(rect)
    }

    #[inline]
    fn contains_point(&self, point: &Point) -> bool {
        (**self).contains_point(point)
    }
}

impl<G: Geometry + ?Sized> Geometry for Box<G> {
    #[inline]
    fn bounds(&self) -> Option<Rect> {
        (**self).bounds()
    }

    #[inline]
    fn distance_to(&self, point: &Point) -> f64 {
        (**self).distance_to(point)
    }

    #[inline]
    fn intersects_rect(&self, rect: &Rect) -> bool {
        (**self).intersects_rect(rect)
    }

    #[inline]
    fn contains_point(&self, point: &Point) -> bool {
        (**self).contains_point(point)
    }
}

/// Maps a stored record to the geometry the index works with.
///
/// The index calls [`project`](Projection::project) once per record while building
/// and once per bucket candidate on every query, so implementations should be cheap
/// or hand out borrowed geometry.
///
/// Any `Fn(&R) -> G` closure is a projection. Annotate the closure argument
/// (`|r: &Parcel| ...`) so the closure is generic over the borrow.
pub trait Projection<R: ?Sized> {
    type Output<'a>: Geometry
    where
        Self: 'a,
        R: 'a;

    fn project<'a>(&'a self, record: &'a R) -> Self::Output<'a>;
}

/// Projection for records that are geometries themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl<R: Geometry> Projection<R> for Identity {
    type Output<'a>
        = &'a R
    where
        Self: 'a,
        R: 'a;

    #[inline]
    fn project<'a>(&'a self, record: &'a R) -> &'a R {
        record
    }
}

impl<R, G, F> Projection<R> for F
where
    F: Fn(&R) -> G,
    G: Geometry,
{
    type Output<'a>
        = G
    where
        Self: 'a,
        R: 'a;

    #[inline]
    fn project<'a>(&'a self, record: &'a R) -> G {
        self(record)
    }
}
