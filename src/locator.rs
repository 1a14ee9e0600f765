// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Proximity search over candidate pools.
//!
//! [locate_nearest] widens a search radius around a point until enough
//! candidates are found; [find_covering] answers the inverse question of
//! which areas (each with its own radius) cover a point.

use crate::{earth_distance, Error, Point};

/// Tunables of [locate_nearest].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Options {
    /// How much the radius grows after an insufficient search.
    pub radius_step_km: f64,

    /// The largest radius ever searched.
    pub max_radius_km: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            radius_step_km: 5.0,
            max_radius_km: 50.0,
        }
    }
}

/// An entry of a candidate pool. Candidates without a position never match.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub id: String,
    pub point: Option<Point>,
}

impl Candidate {
    pub fn new(id: impl Into<String>, point: Point) -> Self {
        Self {
            id: id.into(),
            point: Some(point),
        }
    }

    pub fn unlocated(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            point: None,
        }
    }
}

/// A circular area, such as a job site with its own search radius.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoverageArea {
    pub id: String,
    pub point: Point,
    pub radius_km: f64,
}

/// A candidate found within a search radius.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    pub candidate_id: String,
    pub distance_km: f64,
}

/// Outcome of [locate_nearest].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocatorResult {
    /// Matches sorted by ascending distance.
    pub matches: Vec<Match>,

    /// The radius of the last search, which callers may store as the
    /// effective search radius of their request.
    pub radius_used_km: f64,
}

impl LocatorResult {
    /// Returns `true` if fewer than `required_count` candidates were found.
    pub fn is_short_of(&self, required_count: usize) -> bool {
        self.matches.len() < required_count
    }
}

/// Computes the distance to every located candidate, sorted ascending.
/// Equal distances keep the pool order.
fn sorted_by_distance(center: Point, pool: &[Candidate]) -> Vec<Match> {
    let mut matches: Vec<Match> = pool
        .iter()
        .filter_map(|c| match c.point {
            Some(p) if p.is_valid() => Some(Match {
                candidate_id: c.id.clone(),
                distance_km: earth_distance(center, p),
            }),
            Some(p) => {
                log::warn!("skipping candidate {:?}: invalid coordinate {}", c.id, p);
                None
            }
            None => None,
        })
        .collect();
    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    matches
}

fn check_option(name: &'static str, value: f64, allow_zero: bool) -> Result<(), Error> {
    let in_range = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if value.is_finite() && in_range {
        Ok(())
    } else {
        Err(Error::InvalidOption { name, value })
    }
}

/// Returns the first radius of the schedule `start + i * step` (clamped to
/// [Options::max_radius_km]) which reaches `target_km`.
///
/// `target_km` is the distance of the last required candidate, so every
/// earlier radius of the schedule holds too few candidates.
fn schedule_radius(start: f64, target_km: f64, options: &Options) -> f64 {
    if target_km <= start {
        return start;
    }
    if target_km >= options.max_radius_km {
        return options.max_radius_km;
    }

    let step = options.radius_step_km;
    let mut i = ((target_km - start) / step).ceil();
    if i > 1.0 && start + (i - 1.0) * step >= target_km {
        i -= 1.0;
    }
    let mut radius = start + i * step;
    if radius < target_km {
        radius = start + (i + 1.0) * step;
    }
    if !radius.is_finite() {
        // step too small to be represented
        radius = target_km;
    }
    radius.min(options.max_radius_km)
}

/// Finds the `required_count` candidates closest to `center`, searching
/// within `start_radius_km` first and widening the radius by
/// [Options::radius_step_km] until enough candidates match.
///
/// Radii are clamped to [Options::max_radius_km], which is always the last
/// radius searched. If even that radius yields fewer than `required_count`
/// candidates, all of its matches are returned; callers should treat a short
/// result as insufficient supply.
pub fn locate_nearest(
    center: Point,
    pool: &[Candidate],
    required_count: usize,
    start_radius_km: f64,
    options: &Options,
) -> Result<LocatorResult, Error> {
    let center = center.validated()?;
    if required_count == 0 {
        return Err(Error::InvalidRequiredCount);
    }
    check_option("start radius", start_radius_km, true)?;
    check_option("radius step", options.radius_step_km, false)?;
    check_option("max radius", options.max_radius_km, true)?;

    let sorted = sorted_by_distance(center, pool);
    let start = start_radius_km.min(options.max_radius_km);
    let radius = match sorted.get(required_count - 1) {
        Some(kth) => schedule_radius(start, kth.distance_km, options),
        None => options.max_radius_km,
    };
    let found = sorted
        .partition_point(|m| m.distance_km <= radius)
        .min(required_count);
    log::debug!("{} candidates within {} km of {}", found, radius, center);

    if found < required_count {
        log::debug!(
            "only {} of {} candidates found within {} km",
            found,
            required_count,
            radius,
        );
    }

    let mut matches = sorted;
    matches.truncate(found);
    Ok(LocatorResult {
        matches,
        radius_used_km: radius,
    })
}

/// Returns the areas whose own radius covers `point`, sorted by ascending
/// distance. Areas with invalid positions or radii never match.
pub fn find_covering(point: Point, areas: &[CoverageArea]) -> Result<Vec<Match>, Error> {
    let point = point.validated()?;
    let mut matches: Vec<Match> = areas
        .iter()
        .filter(|a| a.point.is_valid() && a.radius_km >= 0.0)
        .filter_map(|a| {
            let d = earth_distance(point, a.point);
            (d <= a.radius_km).then(|| Match {
                candidate_id: a.id.clone(),
                distance_km: d,
            })
        })
        .collect();
    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: Point = Point::new(19.0, 73.0);

    /// A point `km` kilometers north of [CENTER].
    fn north_of_center(km: f64) -> Point {
        Point::new(CENTER.lat + (km / crate::EARTH_RADIUS_KM).to_degrees(), CENTER.lon)
    }

    fn pool_2_8_40() -> Vec<Candidate> {
        vec![
            Candidate::new("far", north_of_center(40.0)),
            Candidate::new("near", north_of_center(2.0)),
            Candidate::new("mid", north_of_center(8.0)),
        ]
    }

    fn ids(r: &[Match]) -> Vec<&str> {
        r.iter().map(|m| m.candidate_id.as_str()).collect()
    }

    #[test]
    fn expands_until_enough_candidates() {
        let r = locate_nearest(CENTER, &pool_2_8_40(), 2, 5.0, &Options::default()).unwrap();
        assert_eq!(ids(&r.matches), vec!["near", "mid"]);
        assert_eq!(r.radius_used_km, 10.0);
        assert!(!r.is_short_of(2));
    }

    #[test]
    fn returns_closest_first_and_truncates() {
        let r = locate_nearest(CENTER, &pool_2_8_40(), 1, 50.0, &Options::default()).unwrap();
        assert_eq!(ids(&r.matches), vec!["near"]);
        assert_eq!(r.radius_used_km, 50.0);
        assert!((r.matches[0].distance_km - 2.0).abs() < 1e-9);
    }

    #[test]
    fn empty_pool_reaches_max_radius() {
        let r = locate_nearest(CENTER, &[], 3, 5.0, &Options::default()).unwrap();
        assert!(r.matches.is_empty());
        assert_eq!(r.radius_used_km, 50.0);
        assert!(r.is_short_of(3));
    }

    #[test]
    fn insufficient_supply_returns_partial_matches() {
        let r = locate_nearest(CENTER, &pool_2_8_40(), 5, 5.0, &Options::default()).unwrap();
        assert_eq!(ids(&r.matches), vec!["near", "mid", "far"]);
        assert_eq!(r.radius_used_km, 50.0);
        assert!(r.is_short_of(5));
    }

    #[test]
    fn max_radius_is_always_searched() {
        let options = Options {
            radius_step_km: 5.0,
            max_radius_km: 42.0,
        };
        let r = locate_nearest(CENTER, &pool_2_8_40(), 3, 7.0, &options).unwrap();
        assert_eq!(r.matches.len(), 3);
        assert_eq!(r.radius_used_km, 42.0);
    }

    #[test]
    fn start_above_max_is_clamped() {
        let r = locate_nearest(CENTER, &pool_2_8_40(), 3, 80.0, &Options::default()).unwrap();
        assert_eq!(r.radius_used_km, 50.0);
        assert_eq!(r.matches.len(), 3);
    }

    #[test]
    fn unlocated_candidates_never_match() {
        let pool = vec![
            Candidate::unlocated("ghost"),
            Candidate::new("bad", Point::new(f64::NAN, 73.0)),
            Candidate::new("near", north_of_center(2.0)),
        ];
        let r = locate_nearest(CENTER, &pool, 3, 5.0, &Options::default()).unwrap();
        assert_eq!(ids(&r.matches), vec!["near"]);
        assert_eq!(r.radius_used_km, 50.0);
    }

    #[test]
    fn tiny_steps_finish_immediately() {
        let tiny = Options {
            radius_step_km: 1e-12,
            max_radius_km: 50.0,
        };
        let r = locate_nearest(CENTER, &[], 1, 0.0, &tiny).unwrap();
        assert!(r.matches.is_empty());
        assert_eq!(r.radius_used_km, 50.0);

        let r = locate_nearest(CENTER, &pool_2_8_40(), 2, 0.0, &tiny).unwrap();
        assert_eq!(ids(&r.matches), vec!["near", "mid"]);
        assert!(r.radius_used_km >= r.matches[1].distance_km);
        assert!(r.radius_used_km < 8.0 + 1e-6, "radius {}", r.radius_used_km);

        let subnormal = Options {
            radius_step_km: f64::MIN_POSITIVE / 4.0,
            max_radius_km: 50.0,
        };
        let r = locate_nearest(CENTER, &pool_2_8_40(), 2, 0.0, &subnormal).unwrap();
        assert_eq!(ids(&r.matches), vec!["near", "mid"]);
        assert!(r.radius_used_km >= r.matches[1].distance_km);
        assert!(r.radius_used_km < 8.0 + 1e-6, "radius {}", r.radius_used_km);
    }

    #[test]
    fn radius_lands_on_the_schedule() {
        let options = Options {
            radius_step_km: 3.0,
            max_radius_km: 50.0,
        };
        // 1, 4, 7, 10: the first radius holding the 8 km candidate is 10
        let r = locate_nearest(CENTER, &pool_2_8_40(), 2, 1.0, &options).unwrap();
        assert_eq!(r.radius_used_km, 10.0);
        // 2, 5, .., 38, 41
        let r = locate_nearest(CENTER, &pool_2_8_40(), 3, 2.0, &options).unwrap();
        assert_eq!(r.radius_used_km, 41.0);
    }

    #[test]
    fn ties_keep_pool_order() {
        let pool = vec![
            Candidate::new("b", north_of_center(3.0)),
            Candidate::new("a", north_of_center(3.0)),
        ];
        let r = locate_nearest(CENTER, &pool, 2, 5.0, &Options::default()).unwrap();
        assert_eq!(ids(&r.matches), vec!["b", "a"]);
    }

    #[test]
    fn larger_required_count_never_shrinks_radius() {
        let pool = pool_2_8_40();
        let mut last = 0.0;
        for k in 1..=5 {
            let r = locate_nearest(CENTER, &pool, k, 5.0, &Options::default()).unwrap();
            assert!(r.radius_used_km >= last, "k={} radius {} < {}", k, r.radius_used_km, last);
            last = r.radius_used_km;
        }
    }

    #[test]
    fn rejects_caller_errors() {
        let pool = pool_2_8_40();
        let options = Options::default();
        assert_eq!(
            locate_nearest(CENTER, &pool, 0, 5.0, &options),
            Err(Error::InvalidRequiredCount)
        );
        assert_eq!(
            locate_nearest(Point::new(95.0, 0.0), &pool, 1, 5.0, &options),
            Err(Error::InvalidCoordinate { lat: 95.0, lon: 0.0 })
        );
        assert_eq!(
            locate_nearest(CENTER, &pool, 1, -1.0, &options),
            Err(Error::InvalidOption {
                name: "start radius",
                value: -1.0
            })
        );
        let no_step = Options {
            radius_step_km: 0.0,
            ..options
        };
        assert_eq!(
            locate_nearest(CENTER, &pool, 1, 5.0, &no_step),
            Err(Error::InvalidOption {
                name: "radius step",
                value: 0.0
            })
        );
    }

    #[test]
    fn covering_uses_each_area_radius() {
        let areas = vec![
            CoverageArea {
                id: "small-far".to_string(),
                point: north_of_center(8.0),
                radius_km: 5.0,
            },
            CoverageArea {
                id: "large-far".to_string(),
                point: north_of_center(8.0),
                radius_km: 10.0,
            },
            CoverageArea {
                id: "close".to_string(),
                point: north_of_center(1.0),
                radius_km: 5.0,
            },
        ];
        let matches = find_covering(CENTER, &areas).unwrap();
        assert_eq!(ids(&matches), vec!["close", "large-far"]);
    }
}
