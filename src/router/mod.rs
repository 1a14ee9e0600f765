// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Route computation between an origin and a destination over nearby workers
//! and long-haul landmarks.
//!
//! Every request builds its own graph. Short trips run Dijkstra over the whole
//! graph. Long trips (see [Options::shortcut_threshold_km]) first try the landmark
//! shortcut: hop to the landmark nearest the origin, follow precomputed landmark
//! links to the landmark nearest the destination, then hop to the destination.
//! If nothing connects the two points, a direct segment is returned.

mod graph_builder;

use graph_builder::{build_landmark_graph, build_local_graph, nearest_node, Sites};

use crate::{
    earth_distance, edge_weight_for_distance, estimate_time, find_route, Error, Graph,
    LandmarkLink, Node, NodeKind, Point, ShortestPath, DEFAULT_SPEED_KMH, DEFAULT_STEP_LIMIT,
};

/// Id of the origin node in route graphs.
pub const ORIGIN_ID: &str = "origin";

/// Id of the destination node in route graphs.
pub const DESTINATION_ID: &str = "destination";

const ORIGIN_LABEL: &str = "Your location";
const DESTINATION_LABEL: &str = "Destination";
const DIRECT_START_LABEL: &str = "Start";
const DIRECT_END_LABEL: &str = "End";

/// Tunables of [compute_route_with_options].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// Maximum great-circle distance at which two nodes get a direct edge.
    pub connect_radius_km: f64,

    /// Origin-destination distance above which the landmark shortcut is attempted.
    pub shortcut_threshold_km: f64,

    /// Speed used for travel time estimates, both for edge weights and reported times.
    pub avg_speed_kmh: f64,

    /// Maximum number of node expansions of a single Dijkstra search.
    pub step_limit: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            connect_radius_km: 80.0,
            shortcut_threshold_km: 50.0,
            avg_speed_kmh: DEFAULT_SPEED_KMH,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl Options {
    fn validate(&self) -> Result<(), Error> {
        let checks = [
            ("connect radius", self.connect_radius_km, false),
            ("shortcut threshold", self.shortcut_threshold_km, false),
            ("average speed", self.avg_speed_kmh, true),
        ];
        for (name, value, must_be_positive) in checks {
            let in_range = if must_be_positive {
                value > 0.0
            } else {
                value >= 0.0
            };
            if !value.is_finite() || !in_range {
                return Err(Error::InvalidOption { name, value });
            }
        }
        Ok(())
    }
}

/// Which algorithm produced a [RouteResult].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[repr(C)]
pub enum Algorithm {
    Dijkstra = 0,
    LandmarkShortcut = 1,
    Direct = 2,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::LandmarkShortcut => "landmark-shortcut",
            Self::Direct => "direct",
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labelled stop along a route.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub point: Point,
    pub label: String,
}

/// Outcome of [compute_route].
///
/// Totals are physical: the great-circle distance and estimated time
/// summed over consecutive waypoints, not the routing cost.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteResult {
    pub waypoints: Vec<Waypoint>,

    /// Rounded to 2 decimal places.
    pub total_distance_km: f64,

    /// Sum of per-segment estimates, each at least 1 minute.
    pub total_time_min: u32,

    pub algorithm_used: Algorithm,
}

/// Routing strategies, attempted in the order given by [Strategy::plan]
/// until one of them yields a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Origin → nearest landmark → landmark links → nearest landmark → destination.
    LandmarkShortcut,

    /// Dijkstra over the whole graph, workers included.
    FullDijkstra,

    /// A straight segment from origin to destination. Always succeeds.
    Direct,
}

impl Strategy {
    /// Returns the strategies to try, in order, for a trip of `direct_km`
    /// with `landmark_count` usable landmarks.
    pub fn plan(direct_km: f64, landmark_count: usize, options: &Options) -> &'static [Strategy] {
        if direct_km > options.shortcut_threshold_km && landmark_count >= 2 {
            &[Self::LandmarkShortcut, Self::FullDijkstra, Self::Direct]
        } else {
            &[Self::FullDijkstra, Self::Direct]
        }
    }
}

/// Computes a route with default [Options].
///
/// See [compute_route_with_options].
pub fn compute_route(
    origin: Point,
    destination: Point,
    workers: &[Node],
    landmarks: &[Node],
    landmark_links: &[LandmarkLink],
) -> Result<RouteResult, Error> {
    compute_route_with_options(
        origin,
        destination,
        workers,
        landmarks,
        landmark_links,
        &Options::default(),
    )
}

/// Computes a cost-minimizing route from `origin` to `destination`,
/// possibly through `workers` and `landmarks`.
///
/// Fails only on caller errors: an invalid origin or destination coordinate,
/// or invalid `options`. Unreachable destinations degrade to a
/// [Algorithm::Direct] route. Workers and landmarks with invalid coordinates
/// or non-unique ids are skipped, as are landmark links with invalid distances.
///
/// If `origin == destination`, the route has two identical waypoints,
/// a zero distance and the 1 minute floor as its time.
pub fn compute_route_with_options(
    origin: Point,
    destination: Point,
    workers: &[Node],
    landmarks: &[Node],
    landmark_links: &[LandmarkLink],
    options: &Options,
) -> Result<RouteResult, Error> {
    let origin = origin.validated()?;
    let destination = destination.validated()?;
    options.validate()?;

    let sites = Sites::collect(workers, landmarks);
    let origin = Node::new(ORIGIN_ID, origin, ORIGIN_LABEL, NodeKind::Origin);
    let destination = Node::new(
        DESTINATION_ID,
        destination,
        DESTINATION_LABEL,
        NodeKind::Destination,
    );
    let graph = build_local_graph(&origin, &destination, &sites, landmark_links, options);

    let request = Request {
        origin: &origin,
        destination: &destination,
        direct_km: earth_distance(origin.point, destination.point),
        sites: &sites,
        links: landmark_links,
        graph: &graph,
        options,
    };

    let plan = Strategy::plan(request.direct_km, sites.landmarks.len(), options);
    log::debug!(
        "routing {} -> {} ({:.2} km direct), plan {:?}",
        origin.point,
        destination.point,
        request.direct_km,
        plan,
    );

    Ok(plan
        .iter()
        .find_map(|&strategy| request.attempt(strategy))
        .unwrap_or_else(|| request.direct()))
}

/// Everything a [Strategy] needs to produce a route.
struct Request<'a> {
    origin: &'a Node,
    destination: &'a Node,
    direct_km: f64,
    sites: &'a Sites<'a>,
    links: &'a [LandmarkLink],
    graph: &'a Graph,
    options: &'a Options,
}

impl Request<'_> {
    fn attempt(&self, strategy: Strategy) -> Option<RouteResult> {
        let found = match strategy {
            Strategy::LandmarkShortcut => self
                .via_landmarks()
                .map(|path| (path, Algorithm::LandmarkShortcut)),
            Strategy::FullDijkstra => self
                .search(self.graph, ORIGIN_ID, DESTINATION_ID)
                .map(|path| (path, Algorithm::Dijkstra)),
            Strategy::Direct => return Some(self.direct()),
        };

        match found {
            Some((path, algorithm)) => {
                log::debug!("{:?} found a path of cost {:.3}", strategy, path.cost);
                Some(self.expand(&path.nodes, algorithm))
            }
            None => {
                log::debug!("{:?} found no path", strategy);
                None
            }
        }
    }

    /// Runs Dijkstra, treating search errors as "no path".
    fn search(&self, g: &Graph, from_id: &str, to_id: &str) -> Option<ShortestPath> {
        match find_route(g, from_id, to_id, self.options.step_limit) {
            Ok(path) if path.is_found() => Some(path),
            Ok(_) => None,
            Err(e) => {
                log::warn!("search {} -> {} failed: {}", from_id, to_id, e);
                None
            }
        }
    }

    fn via_landmarks(&self) -> Option<ShortestPath> {
        let landmarks = &self.sites.landmarks;
        let (first, to_first_km) = nearest_node(landmarks, self.origin.point)?;
        let (last, from_last_km) = nearest_node(landmarks, self.destination.point)?;
        log::debug!("nearest landmarks: {:?} and {:?}", first.id, last.id);

        let landmark_graph = build_landmark_graph(landmarks, self.links);
        let inner = self.search(&landmark_graph, &first.id, &last.id)?;

        let speed = self.options.avg_speed_kmh;
        let cost = edge_weight_for_distance(to_first_km, speed)
            + inner.cost
            + edge_weight_for_distance(from_last_km, speed);

        let mut nodes = Vec::with_capacity(inner.nodes.len() + 2);
        nodes.push(ORIGIN_ID.to_string());
        nodes.extend(inner.nodes);
        nodes.push(DESTINATION_ID.to_string());

        Some(ShortestPath { nodes, cost })
    }

    /// Converts node ids into waypoints, recomputing physical distance
    /// and time for every consecutive pair.
    fn expand(&self, path: &[String], algorithm: Algorithm) -> RouteResult {
        let nodes: Vec<&Node> = path
            .iter()
            .filter_map(|id| self.graph.get_node(id))
            .collect();

        let mut total_distance_km = 0.0;
        let mut total_time_min = 0;
        for pair in nodes.windows(2) {
            let d = earth_distance(pair[0].point, pair[1].point);
            total_distance_km += d;
            total_time_min += estimate_time(d, self.options.avg_speed_kmh);
        }

        RouteResult {
            waypoints: nodes
                .iter()
                .map(|n| Waypoint {
                    point: n.point,
                    label: n.label.clone(),
                })
                .collect(),
            total_distance_km: round_km(total_distance_km),
            total_time_min,
            algorithm_used: algorithm,
        }
    }

    fn direct(&self) -> RouteResult {
        log::warn!(
            "no path between {} and {}, using a direct segment",
            self.origin.point,
            self.destination.point,
        );
        RouteResult {
            waypoints: vec![
                Waypoint {
                    point: self.origin.point,
                    label: DIRECT_START_LABEL.to_string(),
                },
                Waypoint {
                    point: self.destination.point,
                    label: DIRECT_END_LABEL.to_string(),
                },
            ],
            total_distance_km: round_km(self.direct_km),
            total_time_min: estimate_time(self.direct_km, self.options.avg_speed_kmh),
            algorithm_used: Algorithm::Direct,
        }
    }
}

#[inline]
fn round_km(km: f64) -> f64 {
    (km * 100.0).round() / 100.0
}
