// Error types for graph construction and route planning

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Invariant or query violations raised by a location graph
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node `{0}` already exists")]
    DuplicateNode(String),

    #[error("unknown node `{0}`")]
    UnknownNode(String),

    #[error("no edge between `{0}` and `{1}`")]
    NoSuchEdge(String, String),

    #[error("no path from `{0}` to `{1}`")]
    NoPath(String, String),

    #[error("self-loop on `{0}` is not allowed")]
    SelfLoop(String),

    #[error("invalid weight {weight} between `{from}` and `{to}`")]
    InvalidWeight { from: String, to: String, weight: f64 },
}

/// Failures reported by a geocoding gateway
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("invalid geocoder response: {0}")]
    InvalidResponse(String),
}

/// Why an address could not be turned into a coordinate
#[derive(Debug, Error)]
pub enum UnresolvedReason {
    #[error("no match")]
    NotFound,

    #[error("geocoding timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Gateway(#[from] GeocodeError),
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not resolve address `{address}`: {reason}")]
    UnresolvedAddress {
        address: String,
        #[source]
        reason: UnresolvedReason,
    },

    #[error("origin name `{0}` collides with a registry entry")]
    NameCollision(String),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl BuildError {
    /// Only a geocoding timeout is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BuildError::UnresolvedAddress {
                reason: UnresolvedReason::Timeout(_),
                ..
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("visit target `{0}` is not in the graph")]
    UnknownVisitTarget(String),

    #[error("destinations unreachable from the current position: {}", .0.join(", "))]
    UnreachableDestinations(Vec<String>),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Failure of a whole planning request, tagged with the step that failed
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("graph build failed: {0}")]
    Build(#[from] BuildError),

    #[error("route optimization failed: {0}")]
    Route(#[from] RouteError),

    #[error("planning timed out after {0:?}")]
    Timeout(Duration),
}

impl PlanError {
    pub fn is_retryable(&self) -> bool {
        match self {
            PlanError::Build(e) => e.is_retryable(),
            PlanError::Route(_) => false,
            PlanError::Timeout(_) => true,
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to read registry file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse registry: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("registry entry `{name}` has an invalid coordinate ({latitude}, {longitude})")]
    InvalidCoordinate {
        name: String,
        latitude: f64,
        longitude: f64,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value `{value}` for {key}")]
    Invalid { key: &'static str, value: String },
}
