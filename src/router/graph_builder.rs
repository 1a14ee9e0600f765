// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashSet;

use crate::router::{Options, DESTINATION_ID, ORIGIN_ID};
use crate::{earth_distance, edge_weight_for_distance, Graph, LandmarkLink, Node, Point};

/// Worker and landmark nodes accepted into a single route computation.
///
/// Nodes with invalid coordinates, reserved ids, or ids seen before
/// are dropped (first occurrence wins).
#[derive(Debug, Default)]
pub(super) struct Sites<'n> {
    pub workers: Vec<&'n Node>,
    pub landmarks: Vec<&'n Node>,
}

impl<'n> Sites<'n> {
    pub(super) fn collect(workers: &'n [Node], landmarks: &'n [Node]) -> Self {
        let mut seen: HashSet<&str> = HashSet::from([ORIGIN_ID, DESTINATION_ID]);
        Self {
            workers: accept_nodes(workers, &mut seen),
            landmarks: accept_nodes(landmarks, &mut seen),
        }
    }
}

fn accept_nodes<'n>(nodes: &'n [Node], seen: &mut HashSet<&'n str>) -> Vec<&'n Node> {
    let mut accepted = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !node.point.is_valid() {
            log::warn!("skipping node {:?}: invalid coordinate {}", node.id, node.point);
        } else if !seen.insert(node.id.as_str()) {
            log::warn!("skipping node {:?}: duplicate or reserved id", node.id);
        } else {
            accepted.push(node);
        }
    }
    accepted
}

fn link_is_usable(link: &LandmarkLink) -> bool {
    let usable = link.distance_km.is_finite() && link.distance_km >= 0.0;
    if !usable {
        log::warn!(
            "skipping landmark link {:?} -> {:?}: invalid distance {}",
            link.from_landmark_id,
            link.to_landmark_id,
            link.distance_km,
        );
    }
    usable
}

/// Adds landmark-to-landmark edges from the precomputed table, in both directions.
/// Links whose endpoints are not in the graph are ignored. Existing edges
/// between the same nodes are overwritten, as the table reflects road distances.
fn add_landmark_links(g: &mut Graph, links: &[LandmarkLink]) -> usize {
    let mut added = 0;
    for link in links.iter().filter(|l| link_is_usable(l)) {
        if g.contains(&link.from_landmark_id) && g.contains(&link.to_landmark_id) {
            g.connect(&link.from_landmark_id, &link.to_landmark_id, link.weight());
            added += 1;
        }
    }
    added
}

/// Builds the full routing graph: origin, destination, workers and landmarks,
/// with every pair within [Options::connect_radius_km] connected by great-circle
/// edges, plus landmark links from the precomputed table.
pub(super) fn build_local_graph(
    origin: &Node,
    destination: &Node,
    sites: &Sites<'_>,
    links: &[LandmarkLink],
    options: &Options,
) -> Graph {
    let all: Vec<&Node> = [origin, destination]
        .into_iter()
        .chain(sites.workers.iter().copied())
        .chain(sites.landmarks.iter().copied())
        .collect();

    let mut g = Graph::new();
    for &node in &all {
        g.set_node(node.clone());
    }

    for (i, a) in all.iter().enumerate() {
        for b in &all[i + 1..] {
            let d = earth_distance(a.point, b.point);
            if d <= options.connect_radius_km {
                g.connect(&a.id, &b.id, edge_weight_for_distance(d, options.avg_speed_kmh));
            }
        }
    }

    let links_added = add_landmark_links(&mut g, links);

    log::debug!(
        "local graph: {} nodes, {} edges ({} from landmark links)",
        g.len(),
        g.edge_count(),
        links_added,
    );
    g
}

/// Builds a graph of landmarks connected only by the precomputed table.
pub(super) fn build_landmark_graph(landmarks: &[&Node], links: &[LandmarkLink]) -> Graph {
    let mut g = Graph::new();
    for &node in landmarks {
        g.set_node(node.clone());
    }
    add_landmark_links(&mut g, links);
    g
}

/// Finds the node closest to `point` by a linear scan.
/// Ties are resolved in favor of the node encountered first.
pub(super) fn nearest_node<'n>(nodes: &[&'n Node], point: Point) -> Option<(&'n Node, f64)> {
    let mut best: Option<(&'n Node, f64)> = None;
    for &node in nodes {
        let d = earth_distance(point, node.point);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((node, d));
        }
    }
    best
}
