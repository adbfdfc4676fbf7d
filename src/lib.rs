// Public modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod planner;
pub mod utils;

// Re-exports for convenience
pub use algorithms::nearest_neighbor::NearestNeighbor;
pub use algorithms::RouteSolver;
pub use error::{BuildError, GraphError, PlanError, RouteError};
pub use models::{Coordinate, DistanceEntry, Point, Registry, Route, RouteLeg};
pub use planner::RoutePlanner;
pub use utils::location_graph::LocationGraph;
