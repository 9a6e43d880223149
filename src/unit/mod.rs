//! Individual/aggregated agent: movement along a routed path, terrain-
//! adjusted speed, weapon selection and fire
//!
//! A `Unit` may stand for many real soldiers or vehicles via `acting_as`;
//! health and ammunition pools are pre-multiplied so a battalion can be
//! simulated as a single unit without per-soldier bookkeeping.

pub mod archetype;

use std::collections::VecDeque;

use geo::Point;
use rand::Rng;

use crate::core::constants::{
    ARRIVAL_FUZZ_MAX_M, ENGAGING_SPEED_FACTOR, NAVIGATION_THRESHOLD_M, PATH_PRUNE_TOLERANCE_M,
};
use crate::core::types::{LandCover, TargetClass};
use crate::spatial;
use crate::weapons::WeaponKind;

pub use archetype::{ArchetypeStats, LoadoutEntry, UnitArchetype, DISMOUNTED_SPEED_MPS};

/// Ammunition state for one weapon slot.
///
/// `magazine` is the ready capacity, `total` the remaining pool. Firing
/// consumes `total`; `magazine` and `can_resupply` exist for logistics
/// layers above this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmoState {
    pub magazine: u32,
    pub total: u32,
    pub can_resupply: bool,
}

/// A weapon carried by a unit, with its ammunition.
#[derive(Debug, Clone)]
pub struct WeaponMount {
    pub kind: WeaponKind,
    pub ammo: AmmoState,
}

/// An individual or count-aggregated agent.
#[derive(Debug, Clone)]
pub struct Unit {
    pub archetype: UnitArchetype,
    pub location: Point<f64>,
    pub health: f64,
    pub max_health: f64,
    /// Current terrain-adjusted speed (m/s); see `set_speed_for_terrain`.
    pub speed_mps: f64,
    pub weapons: Vec<WeaponMount>,
    /// Under fire / firing: throttles movement and (for mounted infantry)
    /// flips classification and speed profile.
    pub is_engaging: bool,
    /// This unit stands for `acting_as` real agents (>= 1).
    pub acting_as: u32,

    path: VecDeque<Point<f64>>,
    destination: Option<Point<f64>>,
    arrived: bool,
}

impl Unit {
    pub fn new(archetype: UnitArchetype, location: Point<f64>) -> Self {
        Self::aggregated(archetype, location, 1)
    }

    /// Build a unit standing for `acting_as` real agents: health and
    /// ammunition pools are multiplied up front.
    pub fn aggregated(archetype: UnitArchetype, location: Point<f64>, acting_as: u32) -> Self {
        let acting_as = acting_as.max(1);
        let stats = archetype.stats();
        let weapons = stats
            .loadout
            .iter()
            .map(|entry| WeaponMount {
                kind: entry.kind,
                ammo: AmmoState {
                    magazine: entry.magazine * acting_as,
                    total: entry.total * acting_as,
                    can_resupply: entry.can_resupply,
                },
            })
            .collect();
        Self {
            archetype,
            location,
            health: stats.max_health * acting_as as f64,
            max_health: stats.max_health * acting_as as f64,
            speed_mps: stats.max_speed_mps,
            weapons,
            is_engaging: false,
            acting_as,
            path: VecDeque::new(),
            destination: None,
            arrived: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn arrived(&self) -> bool {
        self.arrived
    }

    pub fn destination(&self) -> Option<Point<f64>> {
        self.destination
    }

    /// Remaining path, head first. The head vertex tracks the unit's
    /// current location while navigating.
    pub fn path(&self) -> impl Iterator<Item = Point<f64>> + '_ {
        self.path.iter().copied()
    }

    /// Replace the unit's path with a polyline from its current location
    /// through `nav_points`, ending at `destination`. Side effect only.
    pub fn update_path(&mut self, nav_points: &[Point<f64>], destination: Point<f64>) {
        self.path.clear();
        self.path.push_back(self.location);
        self.path.extend(nav_points.iter().copied());
        self.path.push_back(destination);
        self.destination = Some(destination);
        self.arrived = false;
    }

    /// Advance along the stored path for `seconds` of travel.
    ///
    /// Returns true once the unit is within the navigation threshold of its
    /// destination (and on every later call until a new path is set).
    pub fn navigate<R: Rng>(&mut self, seconds: f64, rng: &mut R) -> bool {
        if self.arrived {
            return true;
        }
        let Some(dest) = self.destination else {
            self.arrived = true;
            return true;
        };

        let health_factor = (self.health / self.max_health).clamp(0.0, 1.0);
        let engage_factor = if self.is_engaging { ENGAGING_SPEED_FACTOR } else { 1.0 };
        let travel = self.speed_mps * health_factor * engage_factor * seconds;

        if travel > 0.0 && !self.path.is_empty() {
            let polyline: Vec<Point<f64>> = self.path.iter().copied().collect();
            if let Some(next) = spatial::point_along(&polyline, travel) {
                self.location = next;
            }
            self.prune_consumed_path();
        }

        if spatial::distance_m(self.location, dest) < NAVIGATION_THRESHOLD_M {
            self.arrived = true;
            // Scatter arrivals so co-located units don't stack exactly.
            let bearing = rng.gen_range(0.0..360.0);
            let fuzz = rng.gen_range(0.0..ARRIVAL_FUZZ_MAX_M);
            self.location = spatial::destination(self.location, bearing, fuzz);
            self.path.clear();
            return true;
        }
        false
    }

    /// Drop path vertices the unit has passed.
    ///
    /// O(path) approximation: a vertex is consumed when the location no
    /// longer sits (within tolerance) on the segment it heads. Avoids a
    /// full geometric line-slice every tick.
    fn prune_consumed_path(&mut self) {
        while self.path.len() >= 2 {
            let direct = spatial::distance_m(self.path[0], self.path[1]);
            let via = spatial::distance_m(self.location, self.path[0])
                + spatial::distance_m(self.location, self.path[1]);
            if (via - direct).abs() > PATH_PRUNE_TOLERANCE_M {
                self.path.pop_front();
            } else {
                self.path[0] = self.location;
                break;
            }
        }
    }

    /// Adjust current speed for the terrain segment the unit is crossing.
    ///
    /// `speed = max_speed * exp(coefficient * grade) * cover_multiplier`,
    /// forced to 0 when the grade exceeds the unit's climb ability.
    pub fn set_speed_for_terrain(&mut self, grade: f64, cover: LandCover) {
        let stats = self.archetype.stats();
        if grade > stats.max_climb_ability {
            self.speed_mps = 0.0;
            return;
        }
        let multiplier = match cover {
            LandCover::Urban => stats.urban_multiplier,
            LandCover::Crop | LandCover::Grass => stats.steppe_multiplier,
            LandCover::Scrub | LandCover::Wood => stats.forest_multiplier,
        };
        let max_speed = self.archetype.max_speed(self.is_engaging);
        self.speed_mps = max_speed * (stats.grade_coefficient * grade).exp() * multiplier;
    }

    /// Fire on a target collection for a `seconds` window.
    ///
    /// Selects the carried weapon with the highest expected damage in the
    /// window among those in range with ammunition, fires a discrete number
    /// of shots (ammo spent per shot, hit or miss), and returns the total
    /// damage landed. `None` means no weapon qualified: the documented
    /// signal that counter-fire is impossible.
    pub fn fire_at<R: Rng>(
        &mut self,
        target: TargetClass,
        distance_m: f64,
        seconds: f64,
        rng: &mut R,
    ) -> Option<f64> {
        let mut best: Option<(usize, f64)> = None;
        for (i, mount) in self.weapons.iter().enumerate() {
            let weapon = mount.kind.stats();
            if distance_m > weapon.range_m || mount.ammo.total == 0 {
                continue;
            }
            let supply = (mount.ammo.total as f64 / weapon.fire_rate_rpm).min(1.0);
            let expected =
                weapon.efficacy(target) * weapon.rounds_per_second() * seconds * supply;
            if best.map_or(true, |(_, e)| expected > e) {
                best = Some((i, expected));
            }
        }
        let (index, _) = best?;

        let mount = &mut self.weapons[index];
        let weapon = mount.kind.stats();

        // Expected shots in the window; the fractional remainder becomes an
        // extra shot probabilistically so slow weapons (launchers, tank
        // guns) still fire at their nominal rate across short ticks.
        let expected_shots = weapon.rounds_per_second() * seconds * self.acting_as as f64;
        let mut shots = expected_shots.floor() as u64;
        if rng.gen::<f64>() < expected_shots.fract() {
            shots += 1;
        }
        let shots = shots.min(mount.ammo.total as u64) as u32;

        // Linear falloff to half effect at maximum range.
        let falloff = (weapon.range_m - distance_m / 2.0) / weapon.range_m;
        let per_hit = weapon.efficacy(target) * falloff;

        let mut damage = 0.0;
        for _ in 0..shots {
            if rng.gen::<f64>() < weapon.accuracy {
                damage += per_hit;
            }
        }
        mount.ammo.total -= shots;
        Some(damage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    fn infantry_at(lon: f64, lat: f64) -> Unit {
        Unit::new(UnitArchetype::InfantrySquad, Point::new(lon, lat))
    }

    #[test]
    fn test_aggregated_multiplies_health_and_ammo() {
        let single = infantry_at(44.0, 42.0);
        let squad = Unit::aggregated(UnitArchetype::InfantrySquad, Point::new(44.0, 42.0), 10);
        assert_eq!(squad.max_health, single.max_health * 10.0);
        assert_eq!(squad.weapons[0].ammo.total, single.weapons[0].ammo.total * 10);
        assert_eq!(squad.acting_as, 10);
    }

    #[test]
    fn test_navigate_noop_when_arrived() {
        let mut unit = infantry_at(44.0, 42.0);
        assert!(unit.arrived());
        assert!(unit.navigate(10.0, &mut rng()));
    }

    #[test]
    fn test_navigate_does_not_arrive_early() {
        let mut unit = infantry_at(44.0, 42.0);
        let dest = spatial::destination(unit.location, 0.0, 5_000.0);
        unit.update_path(&[], dest);
        // 60 s at 1.5 m/s covers 90 m of a 5 km leg.
        assert!(!unit.navigate(60.0, &mut rng()));
        assert!(spatial::distance_m(unit.location, dest) >= NAVIGATION_THRESHOLD_M);
    }

    #[test]
    fn test_navigate_arrives_within_threshold() {
        let mut unit = infantry_at(44.0, 42.0);
        let dest = spatial::destination(unit.location, 90.0, 100.0);
        unit.update_path(&[], dest);
        let mut r = rng();
        let mut arrived = false;
        for _ in 0..200 {
            if unit.navigate(10.0, &mut r) {
                arrived = true;
                break;
            }
        }
        assert!(arrived);
        // Arrival fuzz keeps the unit near, but not necessarily on, the
        // destination.
        assert!(
            spatial::distance_m(unit.location, dest)
                < NAVIGATION_THRESHOLD_M + ARRIVAL_FUZZ_MAX_M + 1.0
        );
    }

    #[test]
    fn test_navigate_prunes_consumed_vertices() {
        let mut unit = infantry_at(44.0, 42.0);
        let mid = spatial::destination(unit.location, 0.0, 30.0);
        let dest = spatial::destination(unit.location, 0.0, 5_000.0);
        unit.update_path(&[mid], dest);
        assert_eq!(unit.path().count(), 3);
        // 100 s at 1.5 m/s carries the unit 150 m, past the 30 m vertex.
        unit.navigate(100.0, &mut rng());
        assert_eq!(unit.path().count(), 2);
    }

    #[test]
    fn test_engaging_throttles_movement() {
        let mut fast = infantry_at(44.0, 42.0);
        let mut slow = infantry_at(44.0, 42.0);
        slow.is_engaging = true;
        let dest = spatial::destination(fast.location, 0.0, 10_000.0);
        fast.update_path(&[], dest);
        slow.update_path(&[], dest);
        let mut r = rng();
        fast.navigate(600.0, &mut r);
        slow.navigate(600.0, &mut r);
        let fast_gone = spatial::distance_m(Point::new(44.0, 42.0), fast.location);
        let slow_gone = spatial::distance_m(Point::new(44.0, 42.0), slow.location);
        assert!((slow_gone - fast_gone * ENGAGING_SPEED_FACTOR).abs() < 1.0);
    }

    #[test]
    fn test_wounded_unit_slows_down() {
        let mut unit = infantry_at(44.0, 42.0);
        unit.health = unit.max_health / 2.0;
        let dest = spatial::destination(unit.location, 0.0, 10_000.0);
        unit.update_path(&[], dest);
        unit.navigate(600.0, &mut rng());
        let gone = spatial::distance_m(Point::new(44.0, 42.0), unit.location);
        // Half health = half speed: 600 s at 0.75 m/s.
        assert!((gone - 450.0).abs() < 1.0);
    }

    #[test]
    fn test_terrain_speed_flat_grass() {
        let mut unit = infantry_at(44.0, 42.0);
        unit.set_speed_for_terrain(0.0, LandCover::Grass);
        assert!((unit.speed_mps - unit.archetype.stats().max_speed_mps).abs() < 1e-9);
    }

    #[test]
    fn test_terrain_speed_uphill_slower() {
        let mut flat = infantry_at(44.0, 42.0);
        let mut hill = infantry_at(44.0, 42.0);
        flat.set_speed_for_terrain(0.0, LandCover::Grass);
        hill.set_speed_for_terrain(0.2, LandCover::Grass);
        assert!(hill.speed_mps < flat.speed_mps);
        assert!(hill.speed_mps > 0.0);
    }

    #[test]
    fn test_terrain_impassable_above_climb_ability() {
        let mut tank = Unit::new(UnitArchetype::MainBattleTank, Point::new(44.0, 42.0));
        let limit = tank.archetype.stats().max_climb_ability;
        tank.set_speed_for_terrain(limit + 0.01, LandCover::Grass);
        assert_eq!(tank.speed_mps, 0.0);
    }

    #[test]
    fn test_fire_at_none_when_out_of_range() {
        let mut unit = infantry_at(44.0, 42.0);
        // Farther than every infantry weapon reaches.
        assert!(unit
            .fire_at(TargetClass::Infantry, 5_000.0, 60.0, &mut rng())
            .is_none());
    }

    #[test]
    fn test_fire_at_none_without_ammo() {
        let mut unit = infantry_at(44.0, 42.0);
        for mount in &mut unit.weapons {
            mount.ammo.total = 0;
        }
        assert!(unit
            .fire_at(TargetClass::Infantry, 100.0, 60.0, &mut rng())
            .is_none());
    }

    #[test]
    fn test_fire_at_spends_ammo_and_lands_damage() {
        let mut unit = infantry_at(44.0, 42.0);
        let before: u32 = unit.weapons.iter().map(|m| m.ammo.total).sum();
        let damage = unit
            .fire_at(TargetClass::Infantry, 200.0, 60.0, &mut rng())
            .unwrap();
        let after: u32 = unit.weapons.iter().map(|m| m.ammo.total).sum();
        assert!(after < before);
        assert!(damage > 0.0);
    }

    #[test]
    fn test_fire_at_prefers_at_weapon_against_armor() {
        let mut unit = infantry_at(44.0, 42.0);
        // Within RPG range; the launcher has the only meaningful efficacy
        // against heavy armor, so only its pool should shrink.
        let rifle_before = unit.weapons[0].ammo.total;
        let rpg_before = unit.weapons[2].ammo.total;
        unit.fire_at(TargetClass::HeavyArmor, 250.0, 120.0, &mut rng());
        assert_eq!(unit.weapons[0].ammo.total, rifle_before);
        assert!(unit.weapons[2].ammo.total < rpg_before);
    }

    #[test]
    fn test_fire_at_damage_halves_at_max_range() {
        // Deterministic check of the falloff term itself.
        let w = WeaponKind::Ak74.stats();
        let at_zero = (w.range_m - 0.0 / 2.0) / w.range_m;
        let at_max = (w.range_m - w.range_m / 2.0) / w.range_m;
        assert!((at_zero - 1.0).abs() < 1e-9);
        assert!((at_max - 0.5).abs() < 1e-9);
    }
}
