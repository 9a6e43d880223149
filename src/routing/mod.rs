//! Route and terrain collaborators
//!
//! The core consumes two external services through narrow async traits: a
//! router producing an ordered coordinate sequence for a movement class,
//! and a terrain sampler reporting elevation and land cover along a path.
//! Their implementations (HTTP proxies, tile decoding, caching) live
//! outside this crate; `offline` provides deterministic stand-ins.

pub mod offline;
pub mod plan;
pub mod service;

use std::future::Future;

use geo::Point;

use crate::core::error::{RouterError, TerrainError};
use crate::core::types::{LandCover, MovementClass};

pub use offline::{GreatCircleRouter, RollingTerrain};
pub use plan::{compute_route_plan, grade_between, RoutePlan, TerrainSegment};
pub use service::{NavBackend, NavRequest, NavigationService};

/// Route lookup collaborator.
///
/// Contract: the returned sequence contains at least the two endpoints.
/// `RateLimited` is retried by the caller with a fixed delay and no retry
/// ceiling; any other failure surfaces.
pub trait Router: Send + Sync + 'static {
    fn route(
        &self,
        start: Point<f64>,
        end: Point<f64>,
        class: MovementClass,
    ) -> impl Future<Output = Result<Vec<Point<f64>>, RouterError>> + Send;
}

/// One terrain sample along a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainSample {
    pub location: Point<f64>,
    pub elevation_m: f64,
    pub cover: LandCover,
}

/// Terrain lookup collaborator: samples elevation and land cover at fixed
/// intervals along a path.
pub trait TerrainSampler: Send + Sync + 'static {
    fn sample_along(
        &self,
        path: Vec<Point<f64>>,
        interval_m: f64,
    ) -> impl Future<Output = Result<Vec<TerrainSample>, TerrainError>> + Send;
}
