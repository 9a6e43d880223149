//! Geodesic helpers over `geo::Point<f64>`
//!
//! Coordinates are (longitude, latitude) in degrees, matching the wire
//! order used by the route and terrain collaborators. All distances are
//! meters on the haversine sphere.

use geo::{HaversineBearing, HaversineDestination, HaversineDistance, Point};

/// Great-circle distance in meters.
pub fn distance_m(a: Point<f64>, b: Point<f64>) -> f64 {
    a.haversine_distance(&b)
}

/// Initial bearing from `a` to `b` in degrees (-180..180, 0 = north).
pub fn bearing_deg(a: Point<f64>, b: Point<f64>) -> f64 {
    a.haversine_bearing(b)
}

/// Point `distance_m` meters from `origin` along `bearing_deg`.
pub fn destination(origin: Point<f64>, bearing_deg: f64, distance_m: f64) -> Point<f64> {
    origin.haversine_destination(bearing_deg, distance_m)
}

/// Arithmetic centroid of a non-empty point set.
///
/// Coordinate-mean is adequate at battalion scales (a few kilometers);
/// collections never straddle the antimeridian in practice.
pub fn centroid(points: &[Point<f64>]) -> Option<Point<f64>> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x(), sy + p.y()));
    Some(Point::new(sx / n, sy / n))
}

/// Total length of a polyline in meters.
pub fn path_length_m(path: &[Point<f64>]) -> f64 {
    path.windows(2).map(|w| distance_m(w[0], w[1])).sum()
}

/// Point `along_m` meters along a polyline from its start.
///
/// Clamps to the final vertex when the polyline is shorter than `along_m`.
pub fn point_along(path: &[Point<f64>], along_m: f64) -> Option<Point<f64>> {
    let (&first, rest) = path.split_first()?;
    if along_m <= 0.0 || rest.is_empty() {
        return Some(first);
    }
    let mut remaining = along_m;
    let mut cursor = first;
    for &next in rest {
        let seg = distance_m(cursor, next);
        if seg >= remaining && seg > 0.0 {
            let bearing = bearing_deg(cursor, next);
            return Some(destination(cursor, bearing, remaining));
        }
        remaining -= seg;
        cursor = next;
    }
    Some(cursor)
}

/// Sample points every `interval_m` meters along a polyline, always
/// including both endpoints.
pub fn points_every(path: &[Point<f64>], interval_m: f64) -> Vec<Point<f64>> {
    let total = path_length_m(path);
    if path.is_empty() {
        return Vec::new();
    }
    if total == 0.0 || interval_m <= 0.0 {
        return vec![path[0], *path.last().unwrap_or(&path[0])];
    }
    let mut out = Vec::new();
    let mut along = 0.0;
    while along < total {
        if let Some(p) = point_along(path, along) {
            out.push(p);
        }
        along += interval_m;
    }
    if let Some(&last) = path.last() {
        out.push(last);
    }
    out
}
