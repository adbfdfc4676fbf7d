// Integration tests for building the per-request star graph
use std::time::Duration;

use async_trait::async_trait;
use store_router::error::{BuildError, GeocodeError, UnresolvedReason};
use store_router::models::{Coordinate, Registry};
use store_router::utils::distance::geodesic_km;
use store_router::utils::geocoding::{FixedGateway, GeocodingGateway};
use store_router::utils::init_map::{distance_table, GraphBuilder};

const HOME: &str = "Rua Marechal Deodoro, 500, Centro, Curitiba";

fn home() -> Coordinate {
    Coordinate::new(-25.4297, -49.2711)
}

/// Gateway that answers too late
struct SlowGateway;

#[async_trait]
impl GeocodingGateway for SlowGateway {
    async fn resolve(&self, _address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Some(home()))
    }
}

/// Gateway whose backend is down
struct BrokenGateway;

#[async_trait]
impl GeocodingGateway for BrokenGateway {
    async fn resolve(&self, _address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Err(GeocodeError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

#[tokio::test]
async fn test_star_graph_from_random_registry() {
    let registry = Registry::random(25, home(), 8.0, 11);
    let gateway = FixedGateway::new().with_address(HOME, home());

    let (graph, origin) = GraphBuilder::default()
        .build(&gateway, HOME, &registry)
        .await
        .unwrap();

    assert_eq!(origin, home());
    assert_eq!(graph.node_count(), 26);
    assert_eq!(graph.edge_count(), 25);

    for (name, entry) in registry.iter() {
        let expected = geodesic_km(&origin, &entry.coordinate());
        assert_eq!(graph.edge_weight("Buyer", name), Ok(expected));
        assert_eq!(graph.point(name).unwrap().address, entry.address);
    }

    let table = distance_table(&graph, "Buyer").unwrap();
    assert_eq!(table.len(), 25);
    assert!(table.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

#[tokio::test]
async fn test_no_match_aborts_build() {
    let gateway = FixedGateway::new();
    let err = GraphBuilder::default()
        .build(&gateway, "Nowhere at all", &Registry::default_stores())
        .await
        .unwrap_err();

    match err {
        BuildError::UnresolvedAddress { address, reason } => {
            assert_eq!(address, "Nowhere at all");
            assert!(matches!(reason, UnresolvedReason::NotFound));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_timeout_is_unresolved_and_retryable() {
    let builder = GraphBuilder::new("Buyer", Duration::from_millis(50));
    let err = builder
        .build(&SlowGateway, HOME, &Registry::default_stores())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::UnresolvedAddress {
            reason: UnresolvedReason::Timeout(_),
            ..
        }
    ));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_gateway_failure_is_unresolved() {
    let err = GraphBuilder::default()
        .build(&BrokenGateway, HOME, &Registry::default_stores())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BuildError::UnresolvedAddress {
            reason: UnresolvedReason::Gateway(GeocodeError::Api { status: 503, .. }),
            ..
        }
    ));
    assert!(!err.is_retryable());
}
