//! Navigation lifecycle against real (offline) route and terrain
//! collaborators, and staleness handling for in-flight requests.

use std::time::Duration;

use geo::Point;

use salient::collection::{Collection, NavState, Waypoint};
use salient::core::config::SimulationConfig;
use salient::core::error::Result;
use salient::core::types::Team;
use salient::routing::plan::{RoutePlan, TerrainSegment};
use salient::routing::service::{NavBackend, NavRequest};
use salient::routing::{GreatCircleRouter, NavigationService, RollingTerrain};
use salient::spatial;
use salient::unit::{Unit, UnitArchetype};
use salient::viz::NullSink;
use salient::world::SimulationWorld;

fn column_world(destination_m: f64) -> (SimulationWorld, Point<f64>) {
    let origin = Point::new(44.0, 42.0);
    let destination = spatial::destination(origin, 90.0, destination_m);
    let mut world = SimulationWorld::new(SimulationConfig::default());
    let units = vec![Unit::new(UnitArchetype::MountedInfantry, origin)];
    world.spawn(Collection::new(
        "column",
        Team(0),
        UnitArchetype::MountedInfantry,
        units,
        origin,
        vec![Waypoint::objective(destination)],
    ));
    (world, destination)
}

#[test]
fn test_full_navigation_cycle_reaches_waypoint() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (mut world, destination) = column_world(2_000.0);
    let mut nav = NavigationService::new(
        GreatCircleRouter::default(),
        RollingTerrain::default(),
        rt.handle().clone(),
        Duration::from_millis(1),
    );
    let mut viz = NullSink;

    let mut reached = false;
    for _ in 0..2_000 {
        world.tick(&mut nav, &mut viz).unwrap();
        if world.collections[0].waypoints.is_empty() {
            reached = true;
            break;
        }
        // Give the spawned route task a moment to complete.
        std::thread::sleep(Duration::from_millis(1));
    }
    assert!(reached, "column never reached its waypoint");
    assert_eq!(world.collections[0].nav, NavState::Idle);
    let final_distance = spatial::distance_m(world.collections[0].location(), destination);
    // Arrival threshold plus post-arrival fuzz.
    assert!(final_distance < 100.0, "stopped {final_distance:.0} m short");
}

#[test]
fn test_column_makes_forward_progress_while_navigating() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (mut world, destination) = column_world(50_000.0);
    let origin_distance = spatial::distance_m(world.collections[0].location(), destination);
    let mut nav = NavigationService::new(
        GreatCircleRouter::default(),
        RollingTerrain::default(),
        rt.handle().clone(),
        Duration::from_millis(1),
    );
    let mut viz = NullSink;

    for _ in 0..200 {
        world.tick(&mut nav, &mut viz).unwrap();
        std::thread::sleep(Duration::from_millis(1));
    }
    let now = spatial::distance_m(world.collections[0].location(), destination);
    assert!(now < origin_distance, "no progress after 200 ticks");
    assert_eq!(world.collections[0].nav, NavState::Navigating);
}

/// Hand-driven backend: the test scripts exactly which result (and which
/// generation tag) the next poll returns.
#[derive(Default)]
struct ScriptedNav {
    dispatched: Vec<(usize, u64)>,
    next: Option<(u64, Result<RoutePlan>)>,
}

impl NavBackend for ScriptedNav {
    fn dispatch(&mut self, collection: usize, generation: u64, _request: NavRequest) {
        self.dispatched.push((collection, generation));
    }

    fn poll(&mut self, _collection: usize) -> Option<(u64, Result<RoutePlan>)> {
        self.next.take()
    }
}

fn straight_plan(from: Point<f64>, to: Point<f64>) -> RoutePlan {
    RoutePlan {
        points: vec![from, to],
        segments: vec![TerrainSegment {
            start: from,
            grade: 0.0,
            cover: salient::core::types::LandCover::Grass,
        }],
    }
}

#[test]
fn test_stale_route_result_is_discarded() {
    let (mut world, destination) = column_world(2_000.0);
    let origin = world.collections[0].location();
    let mut nav = ScriptedNav::default();
    let mut viz = NullSink;

    // Tick 1: request dispatched under generation 1.
    world.tick(&mut nav, &mut viz).unwrap();
    assert_eq!(nav.dispatched, vec![(0, 1)]);
    assert_eq!(world.collections[0].nav, NavState::Calculating);

    // Context changes mid-flight (new maneuver planned).
    world.collections[0].reset_navigation();

    // Tick 2: re-dispatch bumps the generation.
    world.tick(&mut nav, &mut viz).unwrap();
    assert_eq!(nav.dispatched.last(), Some(&(0, 2)));

    // The generation-1 result finally lands: it must be thrown away.
    nav.next = Some((1, Ok(straight_plan(origin, destination))));
    world.tick(&mut nav, &mut viz).unwrap();
    assert!(world.collections[0].route().is_empty());
    assert_ne!(world.collections[0].nav, NavState::Navigating);

    // Next tick re-dispatches under a fresh generation...
    world.tick(&mut nav, &mut viz).unwrap();
    assert_eq!(world.collections[0].nav, NavState::Calculating);

    // ...and a result for the current generation is applied.
    let generation = world.collections[0].nav_generation;
    nav.next = Some((generation, Ok(straight_plan(origin, destination))));
    world.tick(&mut nav, &mut viz).unwrap();
    assert_eq!(world.collections[0].nav, NavState::Navigating);
    assert!(!world.collections[0].route().is_empty());
}

#[test]
fn test_route_failure_surfaces_from_tick() {
    let (mut world, _) = column_world(2_000.0);
    let mut nav = ScriptedNav::default();
    let mut viz = NullSink;

    world.tick(&mut nav, &mut viz).unwrap();
    let generation = world.collections[0].nav_generation;
    nav.next = Some((
        generation,
        Err(salient::core::error::RouterError::Failed("boom".into()).into()),
    ));
    assert!(world.tick(&mut nav, &mut viz).is_err());
}
