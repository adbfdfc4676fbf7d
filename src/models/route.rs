// Route models for representing planned visiting routes

use serde::{Deserialize, Serialize};

use crate::models::{Distance, Point};
use crate::utils::distance::round_km;

/// One traversed edge of a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: String,
    pub to: String,

    /// Edge weight rounded to two decimals
    pub distance_km: Distance,

    pub from_address: String,
    pub to_address: String,
}

/// An ordered chain of legs with the total distance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Legs in travel order; `legs[i].to == legs[i + 1].from`
    pub legs: Vec<RouteLeg>,

    /// Sum of the exact leg weights, rounded to two decimals
    pub total_km: Distance,

    #[serde(skip)]
    exact_km: Distance,
}

impl Route {
    /// Creates an empty route
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a leg between two points
    ///
    /// The leg stores the rounded weight while the total keeps accumulating
    /// at full precision.
    pub fn push_leg(&mut self, from: &Point, to: &Point, weight: Distance) {
        debug_assert!(
            self.legs.last().map_or(true, |last| last.to == from.name),
            "route legs must chain"
        );

        self.legs.push(RouteLeg {
            from: from.name.clone(),
            to: to.name.clone(),
            distance_km: round_km(weight),
            from_address: from.address.clone(),
            to_address: to.address.clone(),
        });
        self.exact_km += weight;
        self.total_km = round_km(self.exact_km);
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Total distance before rounding
    pub fn exact_total_km(&self) -> Distance {
        self.exact_km
    }

    /// Names of the visited points in order, including the starting point
    pub fn stops(&self) -> Vec<&str> {
        let mut stops: Vec<&str> = Vec::with_capacity(self.legs.len() + 1);
        if let Some(first) = self.legs.first() {
            stops.push(&first.from);
        }
        stops.extend(self.legs.iter().map(|leg| leg.to.as_str()));
        stops
    }
}

/// Distance from the origin to one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceEntry {
    pub name: String,

    /// Rounded to two decimals
    pub distance_km: Distance,

    pub address: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinate;

    fn point(name: &str) -> Point {
        Point::candidate(name, Coordinate::new(0.0, 0.0), format!("{} street", name))
    }

    #[test]
    fn test_empty_route() {
        let route = Route::new();
        assert!(route.is_empty());
        assert_eq!(route.total_km, 0.0);
        assert!(route.stops().is_empty());
    }

    #[test]
    fn test_total_uses_full_precision() {
        let mut route = Route::new();
        route.push_leg(&point("A"), &point("B"), 1.004);
        route.push_leg(&point("B"), &point("C"), 1.004);

        // Each leg rounds down to 1.00 but the total keeps the extra 0.008
        assert_eq!(route.legs[0].distance_km, 1.0);
        assert_eq!(route.legs[1].distance_km, 1.0);
        assert_eq!(route.total_km, 2.01);
        assert!((route.exact_total_km() - 2.008).abs() < 1e-12);
    }

    #[test]
    fn test_stops_and_addresses() {
        let mut route = Route::new();
        route.push_leg(&point("A"), &point("B"), 2.0);
        route.push_leg(&point("B"), &point("C"), 3.0);

        assert_eq!(route.stops(), vec!["A", "B", "C"]);
        assert_eq!(route.legs[1].from_address, "B street");
        assert_eq!(route.legs[1].to_address, "C street");
    }
}
