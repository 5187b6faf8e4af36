//! Host-side plumbing for external routing services.
//!
//! [`GeoGraph`] never consults an oracle itself. Hosts that have access to a
//! routing service use [`connect_routed`] to prefer its road distance over
//! the geodesic one.

use std::{error::Error, fmt::Display};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, GraphError, graph::GeoGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Cycling,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteDistance {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OracleError {
    Unavailable(String),
    NoRoute,
}

impl Error for OracleError {}

impl Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "routing service unavailable: {}", reason),
            Self::NoRoute => write!(f, "routing service found no route"),
        }
    }
}

pub trait DistanceOracle {
    fn lookup_route_distance(
        &self,
        a: &Coordinate,
        b: &Coordinate,
        mode: TravelMode,
    ) -> Result<RouteDistance, OracleError>;
}

/// Connects `a` and `b` weighted by the oracle's route distance, falling back
/// to the haversine distance when the oracle fails.
pub fn connect_routed<O>(
    graph: &mut GeoGraph,
    oracle: &O,
    a: &str,
    b: &str,
    mode: TravelMode,
) -> Result<usize, GraphError>
where
    O: DistanceOracle + ?Sized,
{
    let from = *graph
        .coordinate(a)
        .ok_or_else(|| GraphError::UnknownNode(a.to_string()))?;
    let to = *graph
        .coordinate(b)
        .ok_or_else(|| GraphError::UnknownNode(b.to_string()))?;

    let weight = match oracle.lookup_route_distance(&from, &to, mode) {
        Ok(route) => {
            debug!(
                "routed '{}' -> '{}': {} m, {} s",
                a, b, route.distance, route.duration
            );
            Some(route.distance)
        }
        Err(err) => {
            warn!("{err}, using geodesic distance for '{}' -> '{}'", a, b);
            None
        }
    };

    graph.add_undirected_edge(a, b, weight)
}
