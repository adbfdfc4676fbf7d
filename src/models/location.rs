// Location models: coordinates and named points

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate from latitude and longitude
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Checks that both components are finite and inside their valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        // geo points are (x = longitude, y = latitude)
        geo::Point::new(coordinate.longitude, coordinate.latitude)
    }
}

/// Role of a point inside a location graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    /// The geocoded starting address
    Origin,
    /// A store taken from the registry
    Candidate,
}

/// A named point with its coordinate and display address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Unique name of the point
    pub name: String,

    /// Geographic position
    pub coordinate: Coordinate,

    /// Display address, opaque to the engine
    pub address: String,

    pub kind: PointKind,
}

impl Point {
    /// Creates a candidate point
    pub fn candidate<N: Into<String>, A: Into<String>>(
        name: N,
        coordinate: Coordinate,
        address: A,
    ) -> Self {
        Self {
            name: name.into(),
            coordinate,
            address: address.into(),
            kind: PointKind::Candidate,
        }
    }

    /// Creates the origin point
    pub fn origin<N: Into<String>, A: Into<String>>(
        name: N,
        coordinate: Coordinate,
        address: A,
    ) -> Self {
        Self {
            name: name.into(),
            coordinate,
            address: address.into(),
            kind: PointKind::Origin,
        }
    }

    pub fn is_origin(&self) -> bool {
        self.kind == PointKind::Origin
    }
}
