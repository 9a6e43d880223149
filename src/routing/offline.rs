//! Deterministic offline collaborators
//!
//! Stand-ins for the external route/terrain services: a great-circle
//! router with a slight dog-leg (so routed paths differ measurably from
//! direct lines) and a synthetic rolling-terrain sampler. Used by the demo
//! binary and tests; real deployments wire HTTP-backed implementors of
//! the same traits.

use geo::Point;

use crate::core::error::{RouterError, TerrainError};
use crate::core::types::{LandCover, MovementClass};
use crate::routing::{Router, TerrainSample, TerrainSampler};
use crate::spatial;

/// Routes along the great circle with one midpoint pushed sideways.
#[derive(Debug, Clone)]
pub struct GreatCircleRouter {
    /// Sideways midpoint offset as a fraction of the direct distance.
    /// Driving routes dog-leg this much; walking routes half of it.
    pub dogleg: f64,
}

impl Default for GreatCircleRouter {
    fn default() -> Self {
        Self { dogleg: 0.15 }
    }
}

impl Router for GreatCircleRouter {
    async fn route(
        &self,
        start: Point<f64>,
        end: Point<f64>,
        class: MovementClass,
    ) -> Result<Vec<Point<f64>>, RouterError> {
        let direct = spatial::distance_m(start, end);
        if direct == 0.0 {
            return Ok(vec![start, end]);
        }
        let fraction = match class {
            MovementClass::Driving => self.dogleg,
            MovementClass::Walking => self.dogleg / 2.0,
        };
        let bearing = spatial::bearing_deg(start, end);
        let midpoint = spatial::destination(start, bearing, direct / 2.0);
        let offset = spatial::destination(midpoint, bearing + 90.0, direct * fraction);
        Ok(vec![start, offset, end])
    }
}

/// Synthetic rolling terrain: sinusoidal elevation, cover banded by
/// elevation.
#[derive(Debug, Clone)]
pub struct RollingTerrain {
    /// Peak-to-valley elevation swing in meters.
    pub amplitude_m: f64,
    /// Horizontal wavelength of the rolling in meters.
    pub wavelength_m: f64,
}

impl Default for RollingTerrain {
    fn default() -> Self {
        Self {
            amplitude_m: 120.0,
            wavelength_m: 8_000.0,
        }
    }
}

impl RollingTerrain {
    fn elevation_at(&self, p: Point<f64>) -> f64 {
        // Approximate meters-per-degree projection; adequate for a
        // synthetic landscape.
        let x = p.x() * 111_000.0 / self.wavelength_m;
        let y = p.y() * 111_000.0 / self.wavelength_m;
        self.amplitude_m * (x.sin() + (y * 1.3).cos()) / 2.0
    }

    fn cover_at(&self, elevation_m: f64) -> LandCover {
        // Valley floors are settled and farmed; ridges are wooded.
        let t = elevation_m / self.amplitude_m;
        if t < -0.6 {
            LandCover::Urban
        } else if t < -0.2 {
            LandCover::Crop
        } else if t < 0.2 {
            LandCover::Grass
        } else if t < 0.6 {
            LandCover::Scrub
        } else {
            LandCover::Wood
        }
    }
}

impl TerrainSampler for RollingTerrain {
    async fn sample_along(
        &self,
        path: Vec<Point<f64>>,
        interval_m: f64,
    ) -> Result<Vec<TerrainSample>, TerrainError> {
        if path.is_empty() {
            return Err(TerrainError::Malformed("empty path".into()));
        }
        Ok(spatial::points_every(&path, interval_m)
            .into_iter()
            .map(|location| {
                let elevation_m = self.elevation_at(location);
                TerrainSample {
                    location,
                    elevation_m,
                    cover: self.cover_at(elevation_m),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;

    fn block_on<F: Future>(future: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    #[test]
    fn test_router_returns_endpoints() {
        let start = Point::new(44.0, 42.0);
        let end = Point::new(44.2, 42.1);
        let route = block_on(GreatCircleRouter::default().route(
            start,
            end,
            MovementClass::Driving,
        ))
        .unwrap();
        assert!(spatial::distance_m(route[0], start) < 1.0);
        assert!(spatial::distance_m(*route.last().unwrap(), end) < 1.0);
    }

    #[test]
    fn test_driving_route_longer_than_walking() {
        let start = Point::new(44.0, 42.0);
        let end = Point::new(44.2, 42.1);
        let router = GreatCircleRouter::default();
        let driving =
            block_on(router.route(start, end, MovementClass::Driving)).unwrap();
        let walking =
            block_on(router.route(start, end, MovementClass::Walking)).unwrap();
        assert!(spatial::path_length_m(&driving) > spatial::path_length_m(&walking));
    }

    #[test]
    fn test_terrain_samples_cover_path() {
        let path = vec![Point::new(44.0, 42.0), Point::new(44.1, 42.0)];
        let samples = block_on(
            RollingTerrain::default().sample_along(path.clone(), 1_000.0),
        )
        .unwrap();
        assert!(samples.len() >= 2);
        assert!(spatial::distance_m(samples[0].location, path[0]) < 1.0);
    }

    #[test]
    fn test_terrain_deterministic() {
        let sampler = RollingTerrain::default();
        let p = Point::new(44.05, 42.02);
        assert_eq!(sampler.elevation_at(p), sampler.elevation_at(p));
    }
}
