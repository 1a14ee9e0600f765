// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! C bindings for [compute_route] and [locate_nearest].
//!
//! All strings are NUL-terminated UTF-8 (invalid sequences are replaced).
//! NULL pointers are treated as empty strings or empty arrays. Results own
//! their memory and must be released with the matching `_delete` function.

use super::*;

use std::borrow::Cow;
use std::ffi::{c_char, CStr, CString};
use std::mem::forget;
use std::ptr::null_mut;
use std::slice;

#[repr(C)]
pub struct CNode {
    pub id: *const c_char,
    pub label: *const c_char,
    pub point: Point,
}

#[repr(C)]
pub struct CLandmarkLink {
    pub from_landmark_id: *const c_char,
    pub to_landmark_id: *const c_char,
    pub distance_km: f64,
    pub travel_time_min: u32,
}

#[repr(C)]
pub struct CCandidate {
    pub id: *const c_char,
    pub has_point: bool,
    pub point: Point,
}

#[repr(C)]
pub struct CWaypoint {
    pub point: Point,
    pub label: *mut c_char,
}

#[repr(C)]
pub struct CRouteResult {
    pub waypoints: *mut CWaypoint,
    pub len: u32,
    pub capacity: u32,
    pub total_distance_km: f64,
    pub total_time_min: u32,
    pub algorithm_used: Algorithm,

    /// `false` if the request was rejected; all other fields are then empty.
    pub ok: bool,
}

#[repr(C)]
pub struct CMatch {
    pub candidate_id: *mut c_char,
    pub distance_km: f64,
}

#[repr(C)]
pub struct CLocatorResult {
    pub matches: *mut CMatch,
    pub len: u32,
    pub capacity: u32,
    pub radius_used_km: f64,

    /// `false` if the request was rejected; all other fields are then empty.
    pub ok: bool,
}

unsafe fn str_from_c<'a>(ptr: *const c_char) -> Cow<'a, str> {
    if ptr.is_null() {
        Cow::Borrowed("")
    } else {
        CStr::from_ptr(ptr).to_string_lossy()
    }
}

unsafe fn slice_from_c<'a, T>(ptr: *const T, len: usize) -> &'a [T] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        slice::from_raw_parts(ptr, len)
    }
}

fn string_into_c(s: String) -> *mut c_char {
    // Interior NULs can't be represented; cut the string at the first one
    let s = match CString::new(s) {
        Ok(s) => s,
        Err(e) => {
            let nul = e.nul_position();
            let mut bytes = e.into_vec();
            bytes.truncate(nul);
            CString::new(bytes).unwrap_or_default()
        }
    };
    s.into_raw()
}

unsafe fn string_delete(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

/// Moves a vector to the C side as `(ptr, len, capacity)`.
fn vec_into_c<T>(mut v: Vec<T>) -> (*mut T, u32, u32) {
    let ptr = v.as_mut_ptr();
    let len = v.len().try_into().expect("result length overflow");
    let capacity = v.capacity().try_into().expect("result capacity overflow");
    forget(v);
    (ptr, len, capacity)
}

unsafe fn nodes_from_c(nodes: *const CNode, len: usize, kind: NodeKind) -> Vec<Node> {
    slice_from_c(nodes, len)
        .iter()
        .map(|n| Node::new(str_from_c(n.id), n.point, str_from_c(n.label), kind))
        .collect()
}

impl CRouteResult {
    fn ok(r: RouteResult) -> Self {
        let waypoints = r
            .waypoints
            .into_iter()
            .map(|w| CWaypoint {
                point: w.point,
                label: string_into_c(w.label),
            })
            .collect::<Vec<_>>();
        let (waypoints, len, capacity) = vec_into_c(waypoints);

        CRouteResult {
            waypoints,
            len,
            capacity,
            total_distance_km: r.total_distance_km,
            total_time_min: r.total_time_min,
            algorithm_used: r.algorithm_used,
            ok: true,
        }
    }

    fn rejected() -> Self {
        CRouteResult {
            waypoints: null_mut(),
            len: 0,
            capacity: 0,
            total_distance_km: 0.0,
            total_time_min: 0,
            algorithm_used: Algorithm::Direct,
            ok: false,
        }
    }
}

impl CLocatorResult {
    fn ok(r: LocatorResult) -> Self {
        let matches = r
            .matches
            .into_iter()
            .map(|m| CMatch {
                candidate_id: string_into_c(m.candidate_id),
                distance_km: m.distance_km,
            })
            .collect::<Vec<_>>();
        let (matches, len, capacity) = vec_into_c(matches);

        CLocatorResult {
            matches,
            len,
            capacity,
            radius_used_km: r.radius_used_km,
            ok: true,
        }
    }

    fn rejected() -> Self {
        CLocatorResult {
            matches: null_mut(),
            len: 0,
            capacity: 0,
            radius_used_km: 0.0,
            ok: false,
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fieldroute_compute_route(
    origin: Point,
    destination: Point,
    workers: *const CNode,
    workers_len: usize,
    landmarks: *const CNode,
    landmarks_len: usize,
    links: *const CLandmarkLink,
    links_len: usize,
) -> CRouteResult {
    let workers = nodes_from_c(workers, workers_len, NodeKind::Worker);
    let landmarks = nodes_from_c(landmarks, landmarks_len, NodeKind::Landmark);
    let links = slice_from_c(links, links_len)
        .iter()
        .map(|l| {
            LandmarkLink::new(
                str_from_c(l.from_landmark_id),
                str_from_c(l.to_landmark_id),
                l.distance_km,
                l.travel_time_min,
            )
        })
        .collect::<Vec<_>>();

    match compute_route(origin, destination, &workers, &landmarks, &links) {
        Ok(r) => CRouteResult::ok(r),
        Err(e) => {
            log::warn!("route request rejected: {}", e);
            CRouteResult::rejected()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fieldroute_route_result_delete(result: CRouteResult) {
    if !result.waypoints.is_null() {
        let waypoints = Vec::from_raw_parts(
            result.waypoints,
            result.len as usize,
            result.capacity as usize,
        );
        for w in waypoints {
            string_delete(w.label);
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fieldroute_locate_nearest(
    center: Point,
    pool: *const CCandidate,
    pool_len: usize,
    required_count: usize,
    start_radius_km: f64,
    radius_step_km: f64,
    max_radius_km: f64,
) -> CLocatorResult {
    let pool = slice_from_c(pool, pool_len)
        .iter()
        .map(|c| locator::Candidate {
            id: str_from_c(c.id).into_owned(),
            point: c.has_point.then_some(c.point),
        })
        .collect::<Vec<_>>();
    let options = locator::Options {
        radius_step_km,
        max_radius_km,
    };

    match locate_nearest(center, &pool, required_count, start_radius_km, &options) {
        Ok(r) => CLocatorResult::ok(r),
        Err(e) => {
            log::warn!("locate request rejected: {}", e);
            CLocatorResult::rejected()
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fieldroute_locator_result_delete(result: CLocatorResult) {
    if !result.matches.is_null() {
        let matches = Vec::from_raw_parts(
            result.matches,
            result.len as usize,
            result.capacity as usize,
        );
        for m in matches {
            string_delete(m.candidate_id);
        }
    }
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fieldroute_earth_distance(a: Point, b: Point) -> f64 {
    earth_distance(a, b)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fieldroute_estimate_time(distance_km: f64, avg_speed_kmh: f64) -> u32 {
    estimate_time(distance_km, avg_speed_kmh)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn fieldroute_edge_weight(distance_km: f64, travel_time_min: u32) -> f64 {
    edge_weight(distance_km, travel_time_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe fn labels(r: &CRouteResult) -> Vec<String> {
        slice_from_c(r.waypoints, r.len as usize)
            .iter()
            .map(|w| str_from_c(w.label).into_owned())
            .collect()
    }

    #[test]
    fn compute_route_via_landmarks() {
        let west = CString::new("west").unwrap();
        let east = CString::new("east").unwrap();
        let west_label = CString::new("West Mandi").unwrap();
        let landmarks = [
            CNode {
                id: west.as_ptr(),
                label: west_label.as_ptr(),
                point: Point::new(19.0, 73.3),
            },
            CNode {
                id: east.as_ptr(),
                label: std::ptr::null(),
                point: Point::new(19.0, 75.55),
            },
        ];
        let links = [CLandmarkLink {
            from_landmark_id: west.as_ptr(),
            to_landmark_id: east.as_ptr(),
            distance_km: 240.0,
            travel_time_min: 300,
        }];

        unsafe {
            let r = fieldroute_compute_route(
                Point::new(19.0, 73.0),
                Point::new(19.0, 75.85),
                std::ptr::null(),
                0,
                landmarks.as_ptr(),
                landmarks.len(),
                links.as_ptr(),
                links.len(),
            );
            assert!(r.ok);
            assert_eq!(r.algorithm_used, Algorithm::LandmarkShortcut);
            assert_eq!(r.len, 4);
            assert_eq!(
                labels(&r),
                vec!["Your location", "West Mandi", "", "Destination"]
            );
            assert!(r.total_distance_km > 290.0);
            fieldroute_route_result_delete(r);
        }
    }

    #[test]
    fn compute_route_rejects_invalid_origin() {
        unsafe {
            let r = fieldroute_compute_route(
                Point::new(f64::NAN, 0.0),
                Point::new(19.0, 73.0),
                std::ptr::null(),
                0,
                std::ptr::null(),
                0,
                std::ptr::null(),
                0,
            );
            assert!(!r.ok);
            assert!(r.waypoints.is_null());
            fieldroute_route_result_delete(r);
        }
    }

    #[test]
    fn locate_nearest_round_trip() {
        let near = CString::new("near").unwrap();
        let ghost = CString::new("ghost").unwrap();
        let pool = [
            CCandidate {
                id: ghost.as_ptr(),
                has_point: false,
                point: Point::default(),
            },
            CCandidate {
                id: near.as_ptr(),
                has_point: true,
                point: Point::new(19.01, 73.0),
            },
        ];

        unsafe {
            let r = fieldroute_locate_nearest(
                Point::new(19.0, 73.0),
                pool.as_ptr(),
                pool.len(),
                1,
                5.0,
                5.0,
                50.0,
            );
            assert!(r.ok);
            assert_eq!(r.len, 1);
            assert_eq!(r.radius_used_km, 5.0);
            let m = &*r.matches;
            assert_eq!(str_from_c(m.candidate_id), "near");
            assert!(m.distance_km > 1.0 && m.distance_km < 1.2);
            fieldroute_locator_result_delete(r);
        }
    }

    #[test]
    fn locate_nearest_rejects_zero_count() {
        unsafe {
            let r = fieldroute_locate_nearest(
                Point::new(19.0, 73.0),
                std::ptr::null(),
                0,
                0,
                5.0,
                5.0,
                50.0,
            );
            assert!(!r.ok);
            fieldroute_locator_result_delete(r);
        }
    }

    #[test]
    fn interior_nul_is_truncated() {
        unsafe {
            let ptr = string_into_c("abc\0def".to_string());
            assert_eq!(str_from_c(ptr), "abc");
            string_delete(ptr);
        }
    }

    #[test]
    fn geo_helpers() {
        unsafe {
            let a = Point::new(19.0760, 72.8777);
            let b = Point::new(18.5204, 73.8567);
            assert_eq!(fieldroute_earth_distance(a, b), earth_distance(a, b));
            assert_eq!(fieldroute_estimate_time(0.0, 30.0), 1);
            assert_eq!(fieldroute_edge_weight(10.0, 60), 10.5);
        }
    }
}
