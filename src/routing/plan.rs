//! Route selection and terrain annotation
//!
//! Produces the `RoutePlan` a collection navigates: the chosen coordinate
//! sequence plus grade/cover segments sampled along it. Routes that detour
//! absurdly relative to the direct distance fall back to a pedestrian
//! profile and then to a straight line, the latter only when the terrain
//! along it is traversable for the requesting unit.

use std::time::Duration;

use geo::Point;

use crate::core::constants::{
    MIN_GRADE_SAMPLE_M, ROUTE_INEFFICIENCY_FACTOR, TERRAIN_SAMPLE_INTERVAL_M,
};
use crate::core::error::{Result, RouterError, TerrainError};
use crate::core::types::{LandCover, MovementClass};
use crate::routing::service::NavRequest;
use crate::routing::{Router, TerrainSample, TerrainSampler};
use crate::spatial;

/// One annotated stretch of a routed path: the grade and cover apply from
/// `start` until the next segment's start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSegment {
    pub start: Point<f64>,
    /// Slope as rise/run; 0 for segments too short to measure.
    pub grade: f64,
    pub cover: LandCover,
}

/// A completed navigation calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    /// Ordered path coordinates, start through destination.
    pub points: Vec<Point<f64>>,
    /// Terrain annotation sampled along `points`.
    pub segments: Vec<TerrainSegment>,
}

/// Grade between two consecutive samples.
///
/// Short baselines (including duplicate sample points with zero run)
/// return exactly 0: the elevation data is too coarse to divide by a small
/// run without amplifying noise into absurd slopes.
pub fn grade_between(a: &TerrainSample, b: &TerrainSample) -> f64 {
    let run = spatial::distance_m(a.location, b.location);
    if run < MIN_GRADE_SAMPLE_M {
        return 0.0;
    }
    (b.elevation_m - a.elevation_m) / run
}

fn segments_from(samples: &[TerrainSample]) -> Vec<TerrainSegment> {
    samples
        .iter()
        .enumerate()
        .map(|(i, sample)| TerrainSegment {
            start: sample.location,
            grade: match samples.get(i + 1) {
                Some(next) => grade_between(sample, next),
                None => 0.0,
            },
            cover: sample.cover,
        })
        .collect()
}

/// Request a route, retrying rate-limits forever at a fixed cadence.
async fn route_with_retry<R: Router>(
    router: &R,
    start: Point<f64>,
    end: Point<f64>,
    class: MovementClass,
    retry_delay: Duration,
) -> Result<Vec<Point<f64>>> {
    loop {
        match router.route(start, end, class).await {
            Ok(mut points) => {
                if points.len() < 2 {
                    return Err(
                        RouterError::Failed("route returned fewer than two points".into()).into()
                    );
                }
                // Upstream simplification can drop the exact requested
                // destination; re-append it.
                if points.last().map_or(true, |p| spatial::distance_m(*p, end) > 1.0) {
                    points.push(end);
                }
                return Ok(points);
            }
            Err(RouterError::RateLimited) => {
                tracing::warn!("route service rate-limited, retrying in {:?}", retry_delay);
                tokio::time::sleep(retry_delay).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Compute the full navigation plan for a request.
pub async fn compute_route_plan<R, S>(
    router: &R,
    sampler: &S,
    request: &NavRequest,
    retry_delay: Duration,
) -> Result<RoutePlan>
where
    R: Router,
    S: TerrainSampler,
{
    let direct_m = spatial::distance_m(request.start, request.end);
    let mut points = route_with_retry(
        router,
        request.start,
        request.end,
        request.movement_class,
        retry_delay,
    )
    .await?;

    if direct_m > 0.0 && spatial::path_length_m(&points) > ROUTE_INEFFICIENCY_FACTOR * direct_m {
        // Vehicle routing on a sparse road net can detour wildly; a
        // pedestrian profile often cuts the corner.
        let walking = route_with_retry(
            router,
            request.start,
            request.end,
            MovementClass::Walking,
            retry_delay,
        )
        .await?;
        if spatial::path_length_m(&walking) <= ROUTE_INEFFICIENCY_FACTOR * direct_m {
            points = walking;
        } else {
            let direct_line = vec![request.start, request.end];
            let samples = sampler
                .sample_along(direct_line.clone(), TERRAIN_SAMPLE_INTERVAL_M)
                .await?;
            let traversable = samples
                .windows(2)
                .all(|pair| grade_between(&pair[0], &pair[1]).abs() <= request.max_climb);
            if traversable {
                points = direct_line;
            }
            // Otherwise the long route stands: the straight line crosses
            // ground the unit cannot climb.
        }
    }

    let samples = sampler
        .sample_along(points.clone(), TERRAIN_SAMPLE_INTERVAL_M)
        .await?;
    if samples.is_empty() {
        return Err(TerrainError::Malformed("sampler returned no samples".into()).into());
    }
    Ok(RoutePlan {
        points,
        segments: segments_from(&samples),
    })
}
