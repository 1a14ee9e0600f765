// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{DijkstraError, Edge, Graph};

/// Result of a [find_route] search: node ids from start to end (inclusive)
/// and the accumulated edge cost.
///
/// An unreachable end is represented by an empty path with an infinite cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    pub nodes: Vec<String>,
    pub cost: f64,
}

impl ShortestPath {
    /// The "no path" result.
    pub fn none() -> Self {
        Self {
            nodes: Vec::new(),
            cost: f64::INFINITY,
        }
    }

    /// Returns `true` if a path was found.
    pub fn is_found(&self) -> bool {
        !self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct QueueItem<'g> {
    at: &'g str,
    cost: f64,
    seq: u64,
}

impl PartialEq for QueueItem<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cost.eq(&other.cost) && self.seq == other.seq
    }
}

impl PartialOrd for QueueItem<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for QueueItem<'_> {}

impl Ord for QueueItem<'_> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison,
        // as lower costs are considered better ("higher"),
        // and Rust's BinaryHeap is a max-heap. Equal costs are popped
        // in insertion order.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

fn reconstruct_path<'a>(came_from: &HashMap<&'a str, &'a str>, mut last: &'a str) -> Vec<String> {
    let mut path = vec![last.to_string()];

    while let Some(&nd) = came_from.get(last) {
        path.push(nd.to_string());
        last = nd;
    }

    path.reverse();
    path
}

/// Uses [Dijkstra's algorithm](https://en.wikipedia.org/wiki/Dijkstra%27s_algorithm)
/// to find the cheapest route between two nodes in the provided graph.
///
/// Edge costs must not be negative. Edges pointing at nodes which don't exist
/// in the graph are ignored. Returns [ShortestPath::none] if there is no route
/// between the two nodes; if `from_id == to_id`, the path is just that node.
///
/// `step_limit` limits how many nodes may be expanded during the search
/// before returning [DijkstraError::StepLimitExceeded]. The recommended value is
/// [DEFAULT_STEP_LIMIT](crate::DEFAULT_STEP_LIMIT).
pub fn find_route(
    g: &Graph,
    from_id: &str,
    to_id: &str,
    step_limit: usize,
) -> Result<ShortestPath, DijkstraError> {
    let from = g
        .get_node(from_id)
        .ok_or_else(|| DijkstraError::InvalidReference(from_id.to_string()))?;
    let to = g
        .get_node(to_id)
        .ok_or_else(|| DijkstraError::InvalidReference(to_id.to_string()))?;

    let mut queue: BinaryHeap<QueueItem<'_>> = BinaryHeap::default();
    let mut came_from: HashMap<&str, &str> = HashMap::default();
    let mut known_costs: HashMap<&str, f64> = HashMap::default();
    let mut steps: usize = 0;
    let mut seq: u64 = 0;

    queue.push(QueueItem {
        at: from.id.as_str(),
        cost: 0.0,
        seq,
    });
    known_costs.insert(from.id.as_str(), 0.0);

    while let Some(item) = queue.pop() {
        if item.at == to.id {
            return Ok(ShortestPath {
                nodes: reconstruct_path(&came_from, item.at),
                cost: item.cost,
            });
        }

        // We might keep multiple items in the queue for the same node; skip stale ones.
        if item.cost > known_costs.get(item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(DijkstraError::StepLimitExceeded);
        }

        for Edge {
            to: neighbor_id,
            cost: edge_cost,
        } in g.get_edges(item.at)
        {
            // Check if the referred node exists
            let Some(neighbor) = g.get_node(neighbor_id) else {
                continue;
            };

            // Check if this is the cheapest way to the neighbor
            let neighbor_cost = item.cost + edge_cost;
            let known = known_costs
                .get(neighbor.id.as_str())
                .copied()
                .unwrap_or(f64::INFINITY);
            if neighbor_cost >= known {
                continue;
            }

            // Push the new item into the queue
            seq += 1;
            came_from.insert(neighbor.id.as_str(), item.at);
            known_costs.insert(neighbor.id.as_str(), neighbor_cost);
            queue.push(QueueItem {
                at: neighbor.id.as_str(),
                cost: neighbor_cost,
                seq,
            });
        }
    }

    Ok(ShortestPath::none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Node, Point, DEFAULT_STEP_LIMIT};

    fn node(id: &str) -> Node {
        Node::worker(id, Point::new(0.0, 0.0), id)
    }

    /// ```text
    ///   a ──1── b ──1── c
    ///   │               │
    ///   └──────5────────┘    d (isolated)
    /// ```
    fn simple_graph() -> Graph {
        let mut g = Graph::new();
        for id in ["a", "b", "c", "d"] {
            g.set_node(node(id));
        }
        g.connect("a", "b", 1.0);
        g.connect("b", "c", 1.0);
        g.connect("a", "c", 5.0);
        g
    }

    #[test]
    fn finds_cheapest_path() {
        let g = simple_graph();
        let r = find_route(&g, "a", "c", DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(r.nodes, vec!["a", "b", "c"]);
        assert_eq!(r.cost, 2.0);
        assert!(r.is_found());
    }

    #[test]
    fn unreachable_end_returns_none() {
        let g = simple_graph();
        let r = find_route(&g, "a", "d", DEFAULT_STEP_LIMIT).unwrap();
        assert!(!r.is_found());
        assert!(r.nodes.is_empty());
        assert!(r.cost.is_infinite());
    }

    #[test]
    fn start_equal_to_end() {
        let g = simple_graph();
        let r = find_route(&g, "b", "b", DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(r.nodes, vec!["b"]);
        assert_eq!(r.cost, 0.0);
    }

    #[test]
    fn invalid_reference() {
        let g = simple_graph();
        assert_eq!(
            find_route(&g, "x", "a", DEFAULT_STEP_LIMIT),
            Err(DijkstraError::InvalidReference("x".to_string()))
        );
        assert_eq!(
            find_route(&g, "a", "y", DEFAULT_STEP_LIMIT),
            Err(DijkstraError::InvalidReference("y".to_string()))
        );
    }

    #[test]
    fn step_limit_exceeded() {
        let g = simple_graph();
        assert_eq!(
            find_route(&g, "a", "c", 1),
            Err(DijkstraError::StepLimitExceeded)
        );
    }

    #[test]
    fn dangling_edges_are_ignored() {
        let mut g = simple_graph();
        g.set_edge(
            "a",
            Edge {
                to: "ghost".to_string(),
                cost: 0.0,
            },
        );
        let r = find_route(&g, "a", "c", DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(r.nodes, vec!["a", "b", "c"]);
    }

    #[test]
    fn directed_edges_are_respected() {
        let mut g = Graph::new();
        g.set_node(node("a"));
        g.set_node(node("b"));
        g.set_edge(
            "a",
            Edge {
                to: "b".to_string(),
                cost: 1.0,
            },
        );
        assert!(find_route(&g, "a", "b", DEFAULT_STEP_LIMIT).unwrap().is_found());
        assert!(!find_route(&g, "b", "a", DEFAULT_STEP_LIMIT).unwrap().is_found());
    }
}
