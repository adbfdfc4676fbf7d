// Request-level entry points: one freshly built graph per call

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::algorithms::nearest_neighbor::NearestNeighbor;
use crate::algorithms::RouteSolver;
use crate::error::{BuildError, PlanError};
use crate::models::{Coordinate, DistanceEntry, Registry, Route};
use crate::utils::geocoding::GeocodingGateway;
use crate::utils::init_map::{distance_table, GraphBuilder};
use crate::utils::location_graph::LocationGraph;

/// Distance table for an origin address
#[derive(Debug, Clone, Serialize)]
pub struct NearbyStores {
    pub origin: Coordinate,
    pub distances: Vec<DistanceEntry>,
}

/// Planned route for an origin address
#[derive(Debug, Clone, Serialize)]
pub struct PlannedRoute {
    pub origin: Coordinate,
    pub distances: Vec<DistanceEntry>,
    pub route: Route,
}

/// Plans routes over a fixed candidate registry
///
/// Graphs are never shared between calls, so concurrent requests on the
/// same planner do not interfere.
pub struct RoutePlanner {
    gateway: Arc<dyn GeocodingGateway>,
    registry: Registry,
    builder: GraphBuilder,
    solver: NearestNeighbor,
    plan_timeout: Option<Duration>,
}

impl RoutePlanner {
    pub fn new(gateway: Arc<dyn GeocodingGateway>, registry: Registry, builder: GraphBuilder) -> Self {
        Self {
            gateway,
            registry,
            builder,
            solver: NearestNeighbor::default(),
            plan_timeout: None,
        }
    }

    /// Bounds each whole request, geocoding included
    pub fn with_plan_timeout(mut self, timeout: Duration) -> Self {
        self.plan_timeout = Some(timeout);
        self
    }

    pub fn with_solver(mut self, solver: NearestNeighbor) -> Self {
        self.solver = solver;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn origin_name(&self) -> &str {
        self.builder.origin_name()
    }

    /// Builds the star graph for this request
    pub async fn build_graph(
        &self,
        origin_address: &str,
    ) -> Result<(LocationGraph, Coordinate), BuildError> {
        self.builder
            .build(self.gateway.as_ref(), origin_address, &self.registry)
            .await
    }

    /// Distances from the origin address to every store, nearest first
    pub async fn nearby_stores(&self, origin_address: &str) -> Result<NearbyStores, PlanError> {
        self.bounded(async {
            let (graph, origin) = self.build_graph(origin_address).await?;
            let distances = distance_table(&graph, self.builder.origin_name())
                .map_err(BuildError::from)?;
            Ok::<_, PlanError>(NearbyStores { origin, distances })
        })
        .await
    }

    /// Plans a visiting route
    ///
    /// `start` defaults to the origin. Visit names must exist in the registry.
    pub async fn plan_route(
        &self,
        origin_address: &str,
        start: Option<&str>,
        visits: &[String],
    ) -> Result<PlannedRoute, PlanError> {
        self.bounded(async {
            let (mut graph, origin) = self.build_graph(origin_address).await?;
            let distances = distance_table(&graph, self.builder.origin_name())
                .map_err(BuildError::from)?;

            let start = start.unwrap_or(self.builder.origin_name());
            info!("Planning route from {} over {} targets", start, visits.len());
            let route = self.solver.solve(&mut graph, start, visits)?;

            Ok::<_, PlanError>(PlannedRoute {
                origin,
                distances,
                route,
            })
        })
        .await
    }

    async fn bounded<T, F>(&self, request: F) -> Result<T, PlanError>
    where
        F: Future<Output = Result<T, PlanError>>,
    {
        match self.plan_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| PlanError::Timeout(limit))?,
            None => request.await,
        }
    }
}
