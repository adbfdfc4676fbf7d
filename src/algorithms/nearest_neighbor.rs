//! Nearest-neighbor route optimizer.
//!
//! Completes the candidate mesh, then walks greedily from the start node to
//! the closest remaining visit target (by shortest-path distance) until every
//! target has been reached. The tour never backtracks, so it is a heuristic
//! and not an optimal tour.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::algorithms::RouteSolver;
use crate::error::{GraphError, RouteError};
use crate::models::{Distance, Route};
use crate::utils::distance::geodesic_km;
use crate::utils::location_graph::LocationGraph;

/// Nearest-neighbor solver
///
/// Ties between equally distant targets go to the lexicographically
/// smallest name.
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighbor {
    /// Compute mesh distances on the rayon pool
    pub parallel_mesh: bool,
}

impl Default for NearestNeighbor {
    fn default() -> Self {
        Self {
            parallel_mesh: true,
        }
    }
}

impl NearestNeighbor {
    pub fn new(parallel_mesh: bool) -> Self {
        Self { parallel_mesh }
    }
}

impl RouteSolver for NearestNeighbor {
    fn solve(
        &self,
        graph: &mut LocationGraph,
        start: &str,
        visits: &[String],
    ) -> Result<Route, RouteError> {
        graph.require_point(start)?;
        if let Some(missing) = visits.iter().find(|name| !graph.contains(name)) {
            return Err(RouteError::UnknownVisitTarget(missing.clone()));
        }

        let added = complete_mesh(graph, self.parallel_mesh)?;
        debug!("Mesh completion added {} edges", added);

        let tour = construct_tour(graph, start, visits)?;
        let route = reconstruct_legs(graph, &tour)?;

        info!(
            "Planned route with {} stops and {} legs, total {} km",
            tour.len().saturating_sub(1),
            route.legs.len(),
            route.total_km
        );
        Ok(route)
    }
}

/// Links every pair of non-origin nodes that is not yet connected
///
/// Existing edges keep their weights. All distances are computed before
/// the first insertion. Returns the number of edges added.
pub fn complete_mesh(graph: &mut LocationGraph, parallel: bool) -> Result<usize, GraphError> {
    let candidates: Vec<_> = graph.points().filter(|point| !point.is_origin()).collect();

    // Generate all candidate pairs that still need an edge
    let pairs: Vec<(usize, usize)> = (0..candidates.len())
        .flat_map(|i| ((i + 1)..candidates.len()).map(move |j| (i, j)))
        .filter(|&(i, j)| !graph.has_edge(&candidates[i].name, &candidates[j].name))
        .collect();

    let measure = |&(i, j): &(usize, usize)| -> (String, String, Distance) {
        let (a, b) = (candidates[i], candidates[j]);
        (
            a.name.clone(),
            b.name.clone(),
            geodesic_km(&a.coordinate, &b.coordinate),
        )
    };

    let edges: Vec<(String, String, Distance)> = if parallel {
        pairs.par_iter().map(measure).collect()
    } else {
        pairs.iter().map(measure).collect()
    };

    for (a, b, distance) in &edges {
        graph.add_edge(a, b, *distance)?;
    }
    Ok(edges.len())
}

/// Greedy tour order starting at `start`
///
/// The returned order begins with `start`. A start node listed among the
/// visits is not visited again.
pub fn construct_tour(
    graph: &LocationGraph,
    start: &str,
    visits: &[String],
) -> Result<Vec<String>, RouteError> {
    graph.require_point(start)?;

    let mut remaining: BTreeSet<&str> = BTreeSet::new();
    for name in visits {
        if !graph.contains(name) {
            return Err(RouteError::UnknownVisitTarget(name.clone()));
        }
        if name != start {
            remaining.insert(name);
        }
    }

    let mut tour = vec![start.to_string()];
    let mut current = start.to_string();

    while !remaining.is_empty() {
        let mut nearest: Option<(&str, Distance)> = None;

        // BTreeSet iterates in name order, so the strict `<` keeps the
        // smallest name on ties
        for &candidate in &remaining {
            let distance = match graph.shortest_distance(&current, candidate) {
                Ok(distance) => distance,
                Err(GraphError::NoPath(..)) => continue,
                Err(e) => return Err(e.into()),
            };

            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((candidate, distance));
            }
        }

        let Some((next, distance)) = nearest else {
            return Err(RouteError::UnreachableDestinations(
                remaining.iter().map(|name| name.to_string()).collect(),
            ));
        };

        debug!("Next stop {} at {:.3} km from {}", next, distance, current);
        remaining.remove(next);
        tour.push(next.to_string());
        current = next.to_string();
    }

    Ok(tour)
}

/// Expands consecutive tour stops into edge-by-edge legs
pub fn reconstruct_legs(graph: &LocationGraph, tour: &[String]) -> Result<Route, RouteError> {
    let mut route = Route::new();

    for stop in tour.windows(2) {
        let (path, _) = graph.shortest_path(&stop[0], &stop[1])?;

        for hop in path.windows(2) {
            let weight = graph.edge_weight(&hop[0], &hop[1])?;
            let from = graph.require_point(&hop[0])?;
            let to = graph.require_point(&hop[1])?;
            route.push_leg(from, to, weight);
        }
    }

    Ok(route)
}
