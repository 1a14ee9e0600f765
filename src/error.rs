// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Caller errors rejected by [compute_route](crate::compute_route),
/// [locate_nearest](crate::locate_nearest) and [find_covering](crate::find_covering).
///
/// Missing paths or insufficient candidates are not errors;
/// they are reported through the returned results.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// A coordinate is not finite or outside of the valid latitude/longitude range.
    #[error("invalid coordinate: ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// At least one candidate must be requested.
    #[error("required count must be at least 1")]
    InvalidRequiredCount,

    /// A radius, threshold or speed option is not finite, or out of its allowed range.
    #[error("invalid {name}: {value}")]
    InvalidOption { name: &'static str, value: f64 },
}
