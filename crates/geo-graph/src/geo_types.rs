use ::geo_types::{Coord, Point};

use crate::Coordinate;

/// Earth radius used for edge weights, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Great-circle distance between `a` and `b` in whole meters.
///
/// Rounded so that recomputing the weight of the same pair always yields an
/// identical value.
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat_a = a.lat().to_radians();
    let lat_b = b.lat().to_radians();
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lng = (b.lng() - a.lng()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    (EARTH_RADIUS * c).round()
}

impl From<Coordinate> for Coord<f64> {
    fn from(value: Coordinate) -> Self {
        Coord {
            x: value.lng(),
            y: value.lat(),
        }
    }
}

impl From<Coord<f64>> for Coordinate {
    fn from(value: Coord<f64>) -> Self {
        Coordinate::new(value.y, value.x)
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(value: Coordinate) -> Self {
        Point(value.into())
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(value: Point<f64>) -> Self {
        value.0.into()
    }
}
