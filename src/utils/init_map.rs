use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{BuildError, GraphError, UnresolvedReason};
use crate::models::{Coordinate, DistanceEntry, Point, Registry};
use crate::utils::distance::{geodesic_km, round_km};
use crate::utils::geocoding::GeocodingGateway;
use crate::utils::location_graph::LocationGraph;

pub const DEFAULT_ORIGIN_NAME: &str = "Buyer";
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the per-request star graph: the origin linked to every candidate
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    origin_name: String,
    geocode_timeout: Duration,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ORIGIN_NAME, DEFAULT_GEOCODE_TIMEOUT)
    }
}

impl GraphBuilder {
    pub fn new<N: Into<String>>(origin_name: N, geocode_timeout: Duration) -> Self {
        Self {
            origin_name: origin_name.into(),
            geocode_timeout,
        }
    }

    pub fn origin_name(&self) -> &str {
        &self.origin_name
    }

    /// Geocodes the origin address and builds the star graph around it
    ///
    /// Returns the graph together with the resolved origin coordinate. Any
    /// geocoding failure, including a timeout, aborts the build.
    pub async fn build(
        &self,
        gateway: &dyn GeocodingGateway,
        origin_address: &str,
        registry: &Registry,
    ) -> Result<(LocationGraph, Coordinate), BuildError> {
        let origin = self.resolve_origin(gateway, origin_address).await?;
        info!(
            "Resolved origin {:?} to ({}, {})",
            origin_address, origin.latitude, origin.longitude
        );

        let graph = self.build_star(origin, origin_address, registry)?;
        Ok((graph, origin))
    }

    async fn resolve_origin(
        &self,
        gateway: &dyn GeocodingGateway,
        address: &str,
    ) -> Result<Coordinate, BuildError> {
        let unresolved = |reason| BuildError::UnresolvedAddress {
            address: address.to_string(),
            reason,
        };

        match tokio::time::timeout(self.geocode_timeout, gateway.resolve(address)).await {
            Ok(Ok(Some(coordinate))) => Ok(coordinate),
            Ok(Ok(None)) => {
                warn!("No geocoding match for {:?}", address);
                Err(unresolved(UnresolvedReason::NotFound))
            }
            Ok(Err(e)) => {
                warn!("Geocoding {:?} failed: {}", address, e);
                Err(unresolved(UnresolvedReason::Gateway(e)))
            }
            Err(_) => {
                warn!(
                    "Geocoding {:?} timed out after {:?}",
                    address, self.geocode_timeout
                );
                Err(unresolved(UnresolvedReason::Timeout(self.geocode_timeout)))
            }
        }
    }

    /// Builds the star graph around an already known origin coordinate
    pub fn build_star(
        &self,
        origin: Coordinate,
        origin_address: &str,
        registry: &Registry,
    ) -> Result<LocationGraph, BuildError> {
        if registry.contains(&self.origin_name) {
            return Err(BuildError::NameCollision(self.origin_name.clone()));
        }

        let mut graph = LocationGraph::new();
        graph.add_node(Point::origin(
            self.origin_name.as_str(),
            origin,
            origin_address,
        ))?;

        for (name, entry) in registry.iter() {
            let coordinate = entry.coordinate();
            let distance = geodesic_km(&origin, &coordinate);

            graph.add_node(Point::candidate(name, coordinate, entry.address.as_str()))?;
            graph.add_edge(&self.origin_name, name, distance)?;
            debug!("{} -> {}: {:.3} km", self.origin_name, name, distance);
        }

        info!(
            "Built star graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }
}

/// Distance from the origin to every candidate, nearest first
///
/// Ties on the rounded distance are ordered by name.
pub fn distance_table(
    graph: &LocationGraph,
    origin_name: &str,
) -> Result<Vec<DistanceEntry>, GraphError> {
    let origin = graph.require_point(origin_name)?;

    let mut table = graph
        .points()
        .filter(|point| !point.is_origin())
        .map(|point| {
            let distance = graph.edge_weight(&origin.name, &point.name)?;
            Ok(DistanceEntry {
                name: point.name.clone(),
                distance_km: round_km(distance),
                address: point.address.clone(),
            })
        })
        .collect::<Result<Vec<_>, GraphError>>()?;

    table.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(table)
}
