//! Navigation service: cooperative route/terrain tasks
//!
//! Navigation is the only suspension point in the simulation. The tick
//! loop stays synchronous; each collection's route calculation runs as a
//! spawned task whose result comes back over a oneshot channel, polled on
//! later ticks. One request may be in flight per collection, and every
//! request carries the collection's navigation generation: a result that
//! arrives after its triggering context changed (new target, new waypoint)
//! is stale and gets discarded rather than applied.

use std::sync::Arc;
use std::time::Duration;

use ahash::AHashMap;
use geo::Point;
use tokio::sync::oneshot;

use crate::core::error::{Result, RouterError};
use crate::core::types::MovementClass;
use crate::routing::plan::{compute_route_plan, RoutePlan};
use crate::routing::{Router, TerrainSampler};

/// What a collection needs routed.
#[derive(Debug, Clone, Copy)]
pub struct NavRequest {
    pub start: Point<f64>,
    pub end: Point<f64>,
    pub movement_class: MovementClass,
    /// Steepest grade the requesting collection can traverse; gates the
    /// straight-line fallback.
    pub max_climb: f64,
}

/// Dispatch/poll interface the tick loop drives.
///
/// Object-safe so the world doesn't carry the router/sampler type
/// parameters; tests substitute synchronous fakes.
pub trait NavBackend {
    /// Start a route calculation for a collection. A no-op while that
    /// collection already has a request in flight.
    fn dispatch(&mut self, collection: usize, generation: u64, request: NavRequest);

    /// Take the completed result for a collection, if any, tagged with the
    /// generation it was dispatched under.
    fn poll(&mut self, collection: usize) -> Option<(u64, Result<RoutePlan>)>;
}

struct Pending {
    generation: u64,
    rx: oneshot::Receiver<Result<RoutePlan>>,
}

/// Tokio-backed `NavBackend` over real collaborators.
pub struct NavigationService<R, S> {
    router: Arc<R>,
    sampler: Arc<S>,
    handle: tokio::runtime::Handle,
    retry_delay: Duration,
    in_flight: AHashMap<usize, Pending>,
}

impl<R, S> NavigationService<R, S>
where
    R: Router,
    S: TerrainSampler,
{
    pub fn new(router: R, sampler: S, handle: tokio::runtime::Handle, retry_delay: Duration) -> Self {
        Self {
            router: Arc::new(router),
            sampler: Arc::new(sampler),
            handle,
            retry_delay,
            in_flight: AHashMap::new(),
        }
    }

    /// Number of requests currently in flight.
    pub fn outstanding(&self) -> usize {
        self.in_flight.len()
    }
}

impl<R, S> NavBackend for NavigationService<R, S>
where
    R: Router,
    S: TerrainSampler,
{
    fn dispatch(&mut self, collection: usize, generation: u64, request: NavRequest) {
        if self.in_flight.contains_key(&collection) {
            return;
        }
        let (tx, rx) = oneshot::channel();
        let router = Arc::clone(&self.router);
        let sampler = Arc::clone(&self.sampler);
        let retry_delay = self.retry_delay;
        self.handle.spawn(async move {
            let result =
                compute_route_plan(router.as_ref(), sampler.as_ref(), &request, retry_delay).await;
            // The receiver may be gone if the world was dropped mid-run.
            let _ = tx.send(result);
        });
        self.in_flight.insert(collection, Pending { generation, rx });
    }

    fn poll(&mut self, collection: usize) -> Option<(u64, Result<RoutePlan>)> {
        let pending = self.in_flight.get_mut(&collection)?;
        match pending.rx.try_recv() {
            Ok(result) => {
                let generation = pending.generation;
                self.in_flight.remove(&collection);
                Some((generation, result))
            }
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => {
                let generation = pending.generation;
                self.in_flight.remove(&collection);
                Some((
                    generation,
                    Err(RouterError::Failed("navigation task dropped".into()).into()),
                ))
            }
        }
    }
}
