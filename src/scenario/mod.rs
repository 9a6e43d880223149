//! Scenario loading: TOML rosters consumed once at simulation start.

use std::path::Path;

use geo::Point;
use serde::Deserialize;
use tracing::info;

use crate::collection::{Collection, Waypoint};
use crate::core::config::SimulationConfig;
use crate::core::error::{Result, SimError};
use crate::core::types::Team;
use crate::unit::{Unit, UnitArchetype};
use crate::world::SimulationWorld;

/// Optional overrides for the run configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SimulationDef {
    pub tick_seconds: Option<f64>,
    pub seed: Option<u64>,
    pub router_retry_delay_secs: Option<f64>,
}

/// One hostility declaration between two teams.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostilityDef {
    pub a: u8,
    pub b: u8,
    #[serde(default = "default_true")]
    pub mutual: bool,
}

fn default_true() -> bool {
    true
}

/// One battalion roster entry. Coordinates are `[lon, lat]`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionDef {
    pub name: String,
    pub team: u8,
    pub archetype: UnitArchetype,
    /// Real combatant count this collection represents.
    pub units: u32,
    /// Collapse the roster into one simulated unit with multiplied
    /// stats instead of simulating every combatant.
    #[serde(default)]
    pub aggregated: bool,
    pub location: [f64; 2],
    #[serde(default)]
    pub waypoints: Vec<[f64; 2]>,
}

/// A parsed scenario, not yet instantiated.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub simulation: SimulationDef,
    #[serde(default)]
    pub hostilities: Vec<HostilityDef>,
    pub collections: Vec<CollectionDef>,
}

impl Scenario {
    pub fn from_toml(text: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.collections.is_empty() {
            return Err(SimError::ScenarioError("no collections defined".into()));
        }
        for def in &self.collections {
            if def.units == 0 {
                return Err(SimError::ScenarioError(format!(
                    "collection '{}' has zero units",
                    def.name
                )));
            }
        }
        Ok(())
    }

    /// Resolved run configuration: defaults plus any overrides.
    pub fn config(&self) -> SimulationConfig {
        let mut config = SimulationConfig::default();
        if let Some(tick_seconds) = self.simulation.tick_seconds {
            config.tick_seconds = tick_seconds;
        }
        if let Some(seed) = self.simulation.seed {
            config.seed = seed;
        }
        if let Some(delay) = self.simulation.router_retry_delay_secs {
            config.router_retry_delay_secs = delay;
        }
        config
    }
}

fn point(coords: [f64; 2]) -> Point<f64> {
    Point::new(coords[0], coords[1])
}

/// Instantiate a world from a parsed scenario.
pub fn build_world(scenario: &Scenario) -> SimulationWorld {
    let mut world = SimulationWorld::new(scenario.config());
    for def in &scenario.hostilities {
        world.hostility.declare(Team(def.a), Team(def.b), def.mutual);
    }
    for def in &scenario.collections {
        let at = point(def.location);
        let units: Vec<Unit> = if def.aggregated {
            vec![Unit::aggregated(def.archetype, at, def.units)]
        } else {
            (0..def.units).map(|_| Unit::new(def.archetype, at)).collect()
        };
        let waypoints = def.waypoints.iter().map(|w| Waypoint::objective(point(*w)));
        world.spawn(Collection::new(
            def.name.clone(),
            Team(def.team),
            def.archetype,
            units,
            at,
            waypoints,
        ));
    }
    info!(
        collections = world.collections.len(),
        hostilities = scenario.hostilities.len(),
        "scenario loaded"
    );
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str = r#"
        [simulation]
        tick_seconds = 2.0
        seed = 7

        [[hostilities]]
        a = 0
        b = 1

        [[collections]]
        name = "1st Motor Rifle"
        team = 0
        archetype = "mounted_infantry"
        units = 30
        aggregated = true
        location = [44.0, 42.0]
        waypoints = [[44.1, 42.05]]

        [[collections]]
        name = "Tank Company"
        team = 1
        archetype = "main_battle_tank"
        units = 4
        location = [44.2, 42.1]
    "#;

    #[test]
    fn test_parse_and_build() {
        let scenario = Scenario::from_toml(SCENARIO).unwrap();
        assert_eq!(scenario.collections.len(), 2);
        let config = scenario.config();
        assert_eq!(config.seed, 7);
        assert!((config.tick_seconds - 2.0).abs() < 1e-9);

        let world = build_world(&scenario);
        assert_eq!(world.collections.len(), 2);
        assert!(world.hostility.hostile(Team(0), Team(1)));
        assert!(world.hostility.hostile(Team(1), Team(0)));

        let rifles = &world.collections[0];
        assert_eq!(rifles.units.len(), 1);
        assert_eq!(rifles.strength(), 30);
        assert_eq!(rifles.waypoints.len(), 1);

        let tanks = &world.collections[1];
        assert_eq!(tanks.units.len(), 4);
        assert!(tanks.waypoints.is_empty());
    }

    #[test]
    fn test_empty_roster_rejected() {
        let result = Scenario::from_toml("collections = []");
        assert!(matches!(result, Err(SimError::ScenarioError(_))));
    }

    #[test]
    fn test_zero_unit_collection_rejected() {
        let text = r#"
            [[collections]]
            name = "ghost"
            team = 0
            archetype = "infantry_squad"
            units = 0
            location = [0.0, 0.0]
        "#;
        assert!(Scenario::from_toml(text).is_err());
    }
}
