// Models module - exports all model types

mod location;
mod registry;
mod route;

// Re-export model types
pub use self::location::{Coordinate, Point, PointKind};
pub use self::registry::{Registry, RegistryEntry};
pub use self::route::{DistanceEntry, Route, RouteLeg};

// Common type aliases for improved code readability
pub type Distance = f64;
