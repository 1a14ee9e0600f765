// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Point;

/// Radius of the spherical Earth model, in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average travel speed on rural roads, in km/h.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// How many km-equivalents of cost one hour of travel adds to an edge.
pub const TIME_FACTOR_KM_PER_HOUR: f64 = 0.5;

/// Calculates the great-circle distance between two positions on Earth
/// using the [haversine formula](https://en.wikipedia.org/wiki/Haversine_formula).
/// Returns the result in kilometers.
///
/// Positions are not range-checked; see [Point::is_valid].
pub fn earth_distance(a: Point, b: Point) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let sin_dlat_half = ((b.lat - a.lat).to_radians() * 0.5).sin();
    let sin_dlon_half = ((b.lon - a.lon).to_radians() * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Estimates travel time in whole minutes over `distance_km` at `avg_speed_kmh`.
///
/// Halves are rounded to even. The result is never below 1 minute,
/// even for a zero distance.
pub fn estimate_time(distance_km: f64, avg_speed_kmh: f64) -> u32 {
    let minutes = (distance_km / avg_speed_kmh * 60.0).round_ties_even();
    minutes.max(1.0) as u32
}

/// Routing cost of an edge: its distance plus [TIME_FACTOR_KM_PER_HOUR]
/// km-equivalents per hour of travel.
///
/// This is a cost for path search only; it is not a physical distance.
pub fn edge_weight(distance_km: f64, travel_time_min: u32) -> f64 {
    distance_km + (travel_time_min as f64 / 60.0) * TIME_FACTOR_KM_PER_HOUR
}

/// [edge_weight] with the travel time derived by [estimate_time].
pub fn edge_weight_for_distance(distance_km: f64, avg_speed_kmh: f64) -> f64 {
    edge_weight(distance_km, estimate_time(distance_km, avg_speed_kmh))
}
