// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Recommended number of allowed node expansions in [find_route](crate::find_route)
/// before [DijkstraError::StepLimitExceeded] is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Error conditions which may occur during [find_route](crate::find_route).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DijkstraError {
    /// The start or end nodes don't exist in a graph.
    InvalidReference(String),

    /// Route search has exceeded its limit of steps.
    ///
    /// Graphs built for a single request are small, but the caller decides
    /// how many nodes go in. The step limit bounds the work of one search.
    StepLimitExceeded,
}

impl std::fmt::Display for DijkstraError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidReference(node_id) => write!(f, "invalid node: {}", node_id),
            Self::StepLimitExceeded => write!(f, "step limit exceeded"),
        }
    }
}

impl std::error::Error for DijkstraError {}
