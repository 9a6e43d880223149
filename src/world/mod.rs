//! Simulation world: the arena of collections, team hostility rules,
//! shared intel, and the fixed-step tick driver.

use ahash::{AHashMap, AHashSet};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::collection::{prepare_combat, run_combat, Collection, NavState};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{CollectionHandle, Team, Tick};
use crate::routing::service::{NavBackend, NavRequest};
use crate::spatial;
use crate::viz::{CollectionFrame, VisualizationSink};

/// Explicit pairwise hostility between teams. Nothing is hostile by
/// default; declarations may be one-way.
#[derive(Debug, Default, Clone)]
pub struct HostilityMatrix {
    pairs: AHashSet<(u8, u8)>,
}

impl HostilityMatrix {
    pub fn declare(&mut self, a: Team, b: Team, mutual: bool) {
        self.pairs.insert((a.0, b.0));
        if mutual {
            self.pairs.insert((b.0, a.0));
        }
    }

    pub fn hostile(&self, observer: Team, candidate: Team) -> bool {
        self.pairs.contains(&(observer.0, candidate.0))
    }
}

/// Team-wide sighting pool. Merge-only within a tick; allied collections
/// read each other's detections from here on their own tick.
#[derive(Debug, Default)]
pub struct TeamIntel {
    sightings: AHashMap<u8, AHashSet<CollectionHandle>>,
}

impl TeamIntel {
    pub fn merge(&mut self, team: Team, detections: impl IntoIterator<Item = CollectionHandle>) {
        self.sightings.entry(team.0).or_default().extend(detections);
    }

    pub fn sightings(&self, team: Team) -> Vec<CollectionHandle> {
        self.sightings
            .get(&team.0)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Drop sightings of collections that no longer exist as threats.
    /// Called between ticks, never during one.
    pub fn forget_eliminated(&mut self, collections: &[Collection]) {
        for set in self.sightings.values_mut() {
            set.retain(|handle| {
                collections
                    .get(handle.index())
                    .map_or(false, |c| !c.eliminated)
            });
        }
    }
}

/// Simulated time. One tick advances a fixed number of seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimClock {
    pub tick: Tick,
    pub elapsed_secs: f64,
}

impl SimClock {
    pub fn advance(&mut self, seconds: f64) {
        self.tick += 1;
        self.elapsed_secs += seconds;
    }
}

/// Mutable access to two distinct collections at once.
pub fn pair_mut(collections: &mut [Collection], a: usize, b: usize) -> (&mut Collection, &mut Collection) {
    assert_ne!(a, b, "pair_mut requires distinct indices");
    if a < b {
        let (left, right) = collections.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = collections.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

/// Owns every collection for the simulation's lifetime. Collections are
/// spawned at scenario load and only ever marked eliminated, so arena
/// indices stay valid as weak references.
pub struct SimulationWorld {
    pub collections: Vec<Collection>,
    pub hostility: HostilityMatrix,
    pub intel: TeamIntel,
    pub clock: SimClock,
    pub config: SimulationConfig,
    pub rng: ChaCha8Rng,
}

impl SimulationWorld {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            collections: Vec::new(),
            hostility: HostilityMatrix::default(),
            intel: TeamIntel::default(),
            clock: SimClock::default(),
            config,
            rng,
        }
    }

    pub fn spawn(&mut self, collection: Collection) -> CollectionHandle {
        let handle = CollectionHandle(self.collections.len() as u32);
        debug!(name = %collection.name, team = collection.team.0, "spawning collection");
        self.collections.push(collection);
        handle
    }

    /// Live (non-eliminated) collection count.
    pub fn live_count(&self) -> usize {
        self.collections.iter().filter(|c| !c.eliminated).count()
    }

    /// Advance the simulation one fixed step, ticking every live
    /// collection in arena order.
    pub fn tick(&mut self, nav: &mut dyn NavBackend, viz: &mut dyn VisualizationSink) -> Result<()> {
        let seconds = self.config.tick_seconds;
        self.clock.advance(seconds);
        for idx in 0..self.collections.len() {
            self.tick_collection(idx, seconds, nav, viz)?;
        }
        self.intel.forget_eliminated(&self.collections);
        Ok(())
    }

    fn tick_collection(
        &mut self,
        idx: usize,
        seconds: f64,
        nav: &mut dyn NavBackend,
        viz: &mut dyn VisualizationSink,
    ) -> Result<()> {
        if self.collections[idx].eliminated {
            return Ok(());
        }
        if self.collections[idx].units.is_empty() {
            info!(name = %self.collections[idx].name, "collection eliminated");
            self.collections[idx].mark_eliminated();
            viz.publish(&CollectionFrame::capture(&self.collections[idx], self.clock.tick));
            return Ok(());
        }

        // Arrival pops the head waypoint; engagements hold position.
        {
            let me = &mut self.collections[idx];
            if me.nav == NavState::Navigating && me.arrived() && me.engaging.is_none() {
                me.waypoints.pop_front();
                if me.waypoints.is_empty() {
                    me.stop_navigation();
                } else {
                    me.reset_navigation();
                }
            }
        }

        self.drive_navigation(idx, nav)?;

        // Terrain, then unit movement.
        self.collections[idx].propagate_terrain();
        {
            let Self {
                collections, rng, ..
            } = self;
            let me = &mut collections[idx];
            if me.nav == NavState::Navigating {
                for unit in &mut me.units {
                    unit.navigate(seconds, rng);
                }
            }
        }

        self.collections[idx].refresh_visibility();
        prepare_combat(self, idx);
        run_combat(self, idx, seconds);

        viz.publish(&CollectionFrame::capture(&self.collections[idx], self.clock.tick));
        Ok(())
    }

    /// Navigation state machine for one collection.
    ///
    /// Pending dispatches a route request tagged with a fresh generation;
    /// Calculating polls for the result and discards it when the
    /// generation no longer matches (the context changed mid-flight).
    fn drive_navigation(&mut self, idx: usize, nav: &mut dyn NavBackend) -> Result<()> {
        let me = &mut self.collections[idx];
        match me.nav {
            NavState::Idle => {
                if !me.waypoints.is_empty() {
                    me.nav = NavState::Pending;
                    self.drive_navigation(idx, nav)?;
                }
            }
            NavState::Pending => {
                let Some(waypoint) = me.waypoints.front() else {
                    me.nav = NavState::Idle;
                    return Ok(());
                };
                let request = NavRequest {
                    start: me.location(),
                    end: waypoint.location,
                    movement_class: me.movement_class(),
                    max_climb: me.max_climb(),
                };
                me.nav_generation += 1;
                nav.dispatch(idx, me.nav_generation, request);
                me.nav = NavState::Calculating;
            }
            NavState::Calculating => {
                if let Some((generation, result)) = nav.poll(idx) {
                    if generation != me.nav_generation {
                        debug!(name = %me.name, generation, "discarding stale route result");
                        me.nav = NavState::Pending;
                        return Ok(());
                    }
                    let plan = result?;
                    me.apply_route_plan(plan);
                }
            }
            NavState::Navigating => {}
        }
        Ok(())
    }

    /// Apply incoming damage to a collection, crediting the source.
    ///
    /// The target switches its engagement to the damage source when it was
    /// not already fighting back, or when the new source is closer than
    /// its current target. Returns whether the target was eliminated.
    pub fn deal_damage(&mut self, target_idx: usize, source_idx: usize, amount: f64) -> bool {
        let source_handle = CollectionHandle(source_idx as u32);
        let source_loc = self.collections[source_idx].location();
        let target_loc = self.collections[target_idx].location();

        let switch = {
            let target = &self.collections[target_idx];
            match target.engaging {
                _ if !target.engaging_because_damaged => true,
                Some(current) if current.index() != source_idx => {
                    let current_loc = self.collections[current.index()].location();
                    spatial::distance_m(target_loc, source_loc)
                        < spatial::distance_m(target_loc, current_loc)
                }
                _ => false,
            }
        };

        let Self {
            collections, rng, ..
        } = self;
        let target = &mut collections[target_idx];
        if switch {
            target.engage_target(source_handle);
            target.engaging_because_damaged = true;
            target.detected.insert(source_handle);
        }
        let eliminated = target.apply_damage(amount, rng);
        if eliminated {
            info!(name = %target.name, "collection destroyed in combat");
        }
        eliminated
    }
}
