// Distance calculation utilities

use geo::GeodesicDistance;

use crate::models::{Coordinate, Distance};

/// Geodesic distance on the WGS84 ellipsoid, in kilometers
///
/// Every edge weight in the engine comes from this function so that all
/// distances share one model.
pub fn geodesic_km(p1: &Coordinate, p2: &Coordinate) -> Distance {
    let a: geo::Point<f64> = (*p1).into();
    let b: geo::Point<f64> = (*p2).into();
    a.geodesic_distance(&b) / 1000.0
}

/// Rounds a distance to two decimals for presentation
pub fn round_km(distance: Distance) -> Distance {
    (distance * 100.0).round() / 100.0
}
