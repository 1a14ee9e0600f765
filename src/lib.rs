// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Route computation and proximity dispatch for farm-labour marketplaces.
//!
//! Two entry points, both pure functions over caller-supplied data:
//!
//! - [compute_route] builds a weighted graph over an origin, a destination,
//!   nearby workers and long-haul landmarks, and finds a cost-minimizing path.
//!   Long trips are routed through the nearest landmarks using a precomputed
//!   [LandmarkLink] table. The router always returns a usable [RouteResult],
//!   falling back to a direct segment when no path exists.
//! - [locate_nearest] finds the closest candidates to a point, widening the search
//!   radius in fixed steps until enough are found or a maximum radius is reached.
//!
//! # Example
//!
//! ```
//! use fieldroute::{Node, Point};
//!
//! let origin = Point::new(19.0760, 72.8777);
//! let destination = Point::new(19.2000, 73.0000);
//! let workers = [Node::worker("w1", Point::new(19.0770, 72.8787), "Ravi")];
//!
//! let route = fieldroute::compute_route(origin, destination, &workers, &[], &[])
//!     .expect("coordinates are valid");
//!
//! assert_eq!(route.algorithm_used, fieldroute::Algorithm::Dijkstra);
//! println!("{} km, {} min", route.total_distance_km, route.total_time_min);
//! ```

pub mod c;
mod dijkstra;
mod distance;
mod error;
mod graph;
pub mod locator;
pub mod router;

pub use dijkstra::{find_route, DijkstraError, ShortestPath, DEFAULT_STEP_LIMIT};
pub use distance::{
    earth_distance, edge_weight, edge_weight_for_distance, estimate_time, DEFAULT_SPEED_KMH,
    EARTH_RADIUS_KM, TIME_FACTOR_KM_PER_HOUR,
};
pub use error::Error;
pub use graph::Graph;
pub use locator::{find_covering, locate_nearest, LocatorResult};
pub use router::{compute_route, compute_route_with_options, Algorithm, RouteResult, Waypoint};

/// A WGS-84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `true` if both coordinates are finite and within
    /// `[-90, 90]` latitude and `[-180, 180]` longitude.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }

    /// Returns `Ok(self)` for [valid](Point::is_valid) points,
    /// and [Error::InvalidCoordinate] otherwise.
    pub fn validated(self) -> Result<Self, Error> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(Error::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Role of a [Node] in a route graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    Origin,
    Destination,
    Worker,
    Landmark,
}

/// Represents a routable element of the [Graph].
///
/// Ids must be unique within a single route computation. The ids
/// [router::ORIGIN_ID] and [router::DESTINATION_ID] are reserved.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub id: String,
    pub point: Point,
    pub label: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        point: Point,
        label: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            id: id.into(),
            point,
            label: label.into(),
            kind,
        }
    }

    pub fn worker(id: impl Into<String>, point: Point, label: impl Into<String>) -> Self {
        Self::new(id, point, label, NodeKind::Worker)
    }

    pub fn landmark(id: impl Into<String>, point: Point, label: impl Into<String>) -> Self {
        Self::new(id, point, label, NodeKind::Landmark)
    }
}

/// Represents an outgoing (one-way) connection from a specific [Node].
///
/// `cost` is a routing weight (see [edge_weight]), not a distance,
/// and must not be negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub to: String,
    pub cost: f64,
}

/// A precomputed road distance between two landmarks.
///
/// Links are authoritative over the great-circle distance between their
/// landmarks. At most one link may exist per ordered `(from, to)` pair.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LandmarkLink {
    pub from_landmark_id: String,
    pub to_landmark_id: String,
    pub distance_km: f64,
    pub travel_time_min: u32,
}

impl LandmarkLink {
    pub fn new(
        from_landmark_id: impl Into<String>,
        to_landmark_id: impl Into<String>,
        distance_km: f64,
        travel_time_min: u32,
    ) -> Self {
        Self {
            from_landmark_id: from_landmark_id.into(),
            to_landmark_id: to_landmark_id.into(),
            distance_km,
            travel_time_min,
        }
    }

    /// Routing cost of traversing this link.
    pub fn weight(&self) -> f64 {
        edge_weight(self.distance_km, self.travel_time_min)
    }
}
