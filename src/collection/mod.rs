//! Collection: the battalion-level simulated entity
//!
//! A collection owns its units and drives their navigation, detection,
//! engagement, and attrition. Cross-collection references (detections,
//! engagement targets) are arena handles, never ownership edges: a
//! collection is created once at scenario load and only ever marked
//! eliminated.

pub mod combat;
pub mod detection;

use std::collections::VecDeque;

use ahash::AHashSet;
use geo::Point;
use rand::Rng;

use crate::core::constants::{DAMAGE_INCREMENT, ENGAGE_STANDOFF_M, SPREAD_ARC_DEG};
use crate::core::types::{CollectionHandle, CollectionId, MovementClass, TargetClass, Team};
use crate::routing::plan::{RoutePlan, TerrainSegment};
use crate::spatial;
use crate::unit::{Unit, UnitArchetype};

pub use combat::run_combat;
pub use detection::{bad_odds, prepare_combat};

/// A queued destination. Temporary waypoints are tactical detours
/// (engagement approaches, retreat back-offs) discarded once superseded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    pub location: Point<f64>,
    pub temporary: bool,
}

impl Waypoint {
    pub fn objective(location: Point<f64>) -> Self {
        Self { location, temporary: false }
    }

    pub fn tactical(location: Point<f64>) -> Self {
        Self { location, temporary: true }
    }
}

/// Navigation lifecycle. `Calculating` doubles as the in-flight guard:
/// no new route request is dispatched while one is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Idle,
    Pending,
    Calculating,
    Navigating,
}

/// Spread-formation bookkeeping for an engagement approach: units fan
/// across an arc around the target->collection bearing at stand-off range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadFormation {
    pub anchor: Point<f64>,
    pub base_bearing: f64,
}

impl SpreadFormation {
    /// Destination for unit `index` of `count`, fanned across the arc.
    pub fn unit_destination(&self, index: usize, count: usize) -> Point<f64> {
        let offset = if count <= 1 {
            0.0
        } else {
            SPREAD_ARC_DEG * (2.0 * index as f64 / (count - 1) as f64 - 1.0)
        };
        spatial::destination(self.anchor, self.base_bearing + offset, ENGAGE_STANDOFF_M)
    }
}

/// Battalion-level aggregate of units.
#[derive(Debug)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub team: Team,
    pub archetype: UnitArchetype,
    pub units: Vec<Unit>,
    pub waypoints: VecDeque<Waypoint>,

    pub nav: NavState,
    /// Bumped on every route dispatch; results tagged with an older
    /// generation are stale and discarded.
    pub nav_generation: u64,
    route: Vec<Point<f64>>,
    terrain: Vec<TerrainSegment>,
    terrain_cursor: usize,
    pub spread: Option<SpreadFormation>,

    pub max_visibility_range_m: f64,
    pub detected: AHashSet<CollectionHandle>,
    pub engaging: Option<CollectionHandle>,
    pub retreating: bool,
    pub engaging_because_damaged: bool,
    pub eliminated: bool,

    /// Where the collection reports itself once no units remain.
    default_location: Point<f64>,
}

impl Collection {
    pub fn new(
        name: impl Into<String>,
        team: Team,
        archetype: UnitArchetype,
        units: Vec<Unit>,
        location: Point<f64>,
        waypoints: impl IntoIterator<Item = Waypoint>,
    ) -> Self {
        let max_visibility_range_m = archetype.stats().visibility_range_m;
        Self {
            id: CollectionId::new(),
            name: name.into(),
            team,
            archetype,
            units,
            waypoints: waypoints.into_iter().collect(),
            nav: NavState::Idle,
            nav_generation: 0,
            route: Vec::new(),
            terrain: Vec::new(),
            terrain_cursor: 0,
            spread: None,
            max_visibility_range_m,
            detected: AHashSet::new(),
            engaging: None,
            retreating: false,
            engaging_because_damaged: false,
            eliminated: false,
            default_location: location,
        }
    }

    /// Centroid of live units; the stored default once none remain.
    pub fn location(&self) -> Point<f64> {
        let points: Vec<Point<f64>> = self.units.iter().map(|u| u.location).collect();
        spatial::centroid(&points).unwrap_or(self.default_location)
    }

    /// Mean health of live units; 0 when the roster is empty.
    pub fn health(&self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        self.units.iter().map(|u| u.health).sum::<f64>() / self.units.len() as f64
    }

    /// Real combatant count: aggregated units weigh as the agents they
    /// stand for.
    pub fn strength(&self) -> u32 {
        self.units.iter().map(|u| u.acting_as).sum()
    }

    /// What this collection presents as; mounted infantry flips to
    /// `Infantry` once fighting.
    pub fn classification(&self) -> TargetClass {
        let fighting = self.engaging.is_some() || self.units.iter().any(|u| u.is_engaging);
        self.archetype.target_class(fighting)
    }

    /// Route profile for navigation requests; dismounted mounted infantry
    /// walks.
    pub fn movement_class(&self) -> MovementClass {
        if self.archetype == UnitArchetype::MountedInfantry && self.engaging.is_some() {
            MovementClass::Walking
        } else {
            self.archetype.stats().movement_class
        }
    }

    pub fn max_climb(&self) -> f64 {
        self.archetype.stats().max_climb_ability
    }

    /// All units report arrival at their current destination.
    pub fn arrived(&self) -> bool {
        self.units.iter().all(|u| u.arrived())
    }

    /// The routed path currently being navigated (empty while idle).
    pub fn route(&self) -> &[Point<f64>] {
        &self.route
    }

    /// Begin engaging a target: sets the engagement reference and flags
    /// every unit as engaging (throttling movement).
    pub fn engage_target(&mut self, target: CollectionHandle) {
        self.engaging = Some(target);
        for unit in &mut self.units {
            unit.is_engaging = true;
        }
    }

    /// The single reset point for engagement state.
    ///
    /// Clearing the target, the retreat and damaged flags, the spread
    /// formation, and every unit's engaging flag is one transition; a
    /// detection pass must never observe a half-cleared collection.
    pub fn disengage(&mut self) {
        self.engaging = None;
        self.retreating = false;
        self.engaging_because_damaged = false;
        self.spread = None;
        for unit in &mut self.units {
            unit.is_engaging = false;
        }
    }

    /// Terminal state: no units remain. Clears all movement intent.
    pub fn mark_eliminated(&mut self) {
        self.eliminated = true;
        self.waypoints.clear();
        self.route.clear();
        self.terrain.clear();
        self.disengage();
    }

    /// Apply `amount` damage in fixed increments, each against a uniformly
    /// random live unit. Units are removed at zero health (clamped);
    /// emptying the roster eliminates the collection. Returns the
    /// eliminated flag.
    pub fn apply_damage<R: Rng>(&mut self, amount: f64, rng: &mut R) -> bool {
        let mut remaining = amount;
        while remaining > 0.0 && !self.units.is_empty() {
            let step = remaining.min(DAMAGE_INCREMENT);
            let victim = rng.gen_range(0..self.units.len());
            let unit = &mut self.units[victim];
            unit.health -= step;
            if unit.health <= 0.0 {
                unit.health = 0.0;
                self.units.remove(victim);
            }
            remaining -= step;
        }
        if self.units.is_empty() && !self.eliminated {
            self.mark_eliminated();
        }
        self.eliminated
    }

    /// Install a completed route plan and push the path to every unit,
    /// applying spread-formation destinations while engaging.
    pub fn apply_route_plan(&mut self, plan: RoutePlan) {
        let Some(destination) = self.waypoints.front().map(|w| w.location) else {
            self.nav = NavState::Idle;
            return;
        };
        self.route = plan.points;
        self.terrain = plan.segments;
        self.terrain_cursor = 0;

        // Interior vertices only: update_path re-adds the unit's own
        // location at the head and the destination at the tail.
        let interior: Vec<Point<f64>> = if self.route.len() > 2 {
            self.route[1..self.route.len() - 1].to_vec()
        } else {
            Vec::new()
        };
        let count = self.units.len();
        for (index, unit) in self.units.iter_mut().enumerate() {
            let unit_destination = match &self.spread {
                Some(spread) => spread.unit_destination(index, count),
                None => destination,
            };
            unit.update_path(&interior, unit_destination);
        }
        self.nav = NavState::Navigating;
    }

    /// Push the current terrain segment's grade/cover to every unit,
    /// advancing the cursor as the collection passes sampled points.
    pub fn propagate_terrain(&mut self) {
        if self.terrain.is_empty() {
            return;
        }
        let here = self.location();
        while self.terrain_cursor + 1 < self.terrain.len()
            && spatial::distance_m(here, self.terrain[self.terrain_cursor + 1].start)
                < spatial::distance_m(here, self.terrain[self.terrain_cursor].start)
        {
            self.terrain_cursor += 1;
        }
        let segment = self.terrain[self.terrain_cursor];
        for unit in &mut self.units {
            unit.set_speed_for_terrain(segment.grade, segment.cover);
        }
    }

    /// Recompute the visibility radius from live units.
    pub fn refresh_visibility(&mut self) {
        self.max_visibility_range_m = self
            .units
            .iter()
            .map(|u| u.archetype.stats().visibility_range_m)
            .fold(0.0, f64::max);
    }

    /// Clear current routing and force recomputation on the next tick.
    /// Any in-flight request becomes stale through the generation check.
    pub fn reset_navigation(&mut self) {
        self.route.clear();
        self.terrain.clear();
        self.terrain_cursor = 0;
        self.nav = NavState::Pending;
    }

    /// Clear current routing and go idle (waypoint queue exhausted).
    pub fn stop_navigation(&mut self) {
        self.route.clear();
        self.terrain.clear();
        self.terrain_cursor = 0;
        self.nav = NavState::Idle;
    }

    /// Discard tactical detours at the head of the queue; they are
    /// superseded whenever a new maneuver is planned.
    pub fn drop_leading_temporary_waypoints(&mut self) {
        while self.waypoints.front().map_or(false, |w| w.temporary) {
            self.waypoints.pop_front();
        }
    }

    /// Does the current route already end near this point?
    pub fn route_converges_near(&self, point: Point<f64>) -> bool {
        self.route
            .last()
            .map_or(false, |end| spatial::distance_m(*end, point) <= ENGAGE_STANDOFF_M * 2.0)
    }
}
