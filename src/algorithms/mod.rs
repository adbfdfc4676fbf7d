pub mod nearest_neighbor;

// Common algorithm traits
use crate::error::RouteError;
use crate::models::Route;
use crate::utils::location_graph::LocationGraph;

/// Trait for multi-stop route solvers
pub trait RouteSolver {
    /// Plan a route from `start` covering every node in `visits`
    ///
    /// The solver may add edges to the graph it is handed.
    fn solve(
        &self,
        graph: &mut LocationGraph,
        start: &str,
        visits: &[String],
    ) -> Result<Route, RouteError>;
}
