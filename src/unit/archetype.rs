//! Unit archetypes and their stat records
//!
//! One struct parameterized by data, not a subtype per vehicle: every
//! archetype differs only in constants. The single behavioral special case
//! is mounted infantry, which rides as an unarmored vehicle and fights as
//! infantry (see `UnitArchetype::target_class`).

use serde::{Deserialize, Serialize};

use crate::core::types::{MovementClass, TargetClass};
use crate::weapons::WeaponKind;

/// Walking pace used by mounted infantry once dismounted (m/s).
pub const DISMOUNTED_SPEED_MPS: f64 = 1.5;

/// Kind of simulated agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitArchetype {
    /// Foot infantry squad with organic AT capability
    InfantrySquad,
    /// Infantry riding soft transport; dismounts to fight
    MountedInfantry,
    /// Main battle tank
    MainBattleTank,
    /// Infantry fighting vehicle (autocannon, light armor)
    FightingVehicle,
    /// Soft-skin vehicle with a heavy machine gun
    GunTruck,
    /// Truck-mounted area rocket artillery
    RocketArtillery,
}

/// One weapon slot in an archetype's default loadout.
#[derive(Debug, Clone, Copy)]
pub struct LoadoutEntry {
    pub kind: WeaponKind,
    /// Magazine/ready-rack capacity (rounds).
    pub magazine: u32,
    /// Total rounds carried.
    pub total: u32,
    /// Whether logistics can refill this weapon's pool.
    pub can_resupply: bool,
}

/// Static stats for an archetype
#[derive(Debug, Clone)]
pub struct ArchetypeStats {
    /// Nominal top speed on flat open ground (m/s).
    pub max_speed_mps: f64,
    pub max_health: f64,
    /// Speed multipliers per terrain category.
    pub steppe_multiplier: f64,
    pub forest_multiplier: f64,
    pub urban_multiplier: f64,
    /// Exponent coefficient for grade penalty: speed scales by
    /// `exp(coefficient * grade)`. More negative = steeper falloff;
    /// tracked/wheeled vehicles suffer more than infantry.
    pub grade_coefficient: f64,
    /// Steepest traversable grade (rise/run). Above this, speed is 0.
    pub max_climb_ability: f64,
    /// How far this unit can spot other collections (meters).
    pub visibility_range_m: f64,
    pub movement_class: MovementClass,
    pub loadout: &'static [LoadoutEntry],
}

// Loadouts are squad/vehicle-level pools; `acting_as` aggregation
// multiplies the totals at unit construction.
static INFANTRY_SQUAD_LOADOUT: [LoadoutEntry; 3] = [
    LoadoutEntry { kind: WeaponKind::Ak74, magazine: 30, total: 900, can_resupply: true },
    LoadoutEntry { kind: WeaponKind::Pkm, magazine: 100, total: 500, can_resupply: true },
    LoadoutEntry { kind: WeaponKind::Rpg7, magazine: 1, total: 6, can_resupply: false },
];

static MOUNTED_INFANTRY_LOADOUT: [LoadoutEntry; 3] = [
    LoadoutEntry { kind: WeaponKind::Ak74, magazine: 30, total: 900, can_resupply: true },
    LoadoutEntry { kind: WeaponKind::Pkm, magazine: 100, total: 500, can_resupply: true },
    LoadoutEntry { kind: WeaponKind::Dshk, magazine: 50, total: 600, can_resupply: true },
];

static TANK_LOADOUT: [LoadoutEntry; 2] = [
    LoadoutEntry { kind: WeaponKind::Smoothbore125, magazine: 22, total: 40, can_resupply: false },
    LoadoutEntry { kind: WeaponKind::Pkm, magazine: 250, total: 1500, can_resupply: false },
];

static FIGHTING_VEHICLE_LOADOUT: [LoadoutEntry; 2] = [
    LoadoutEntry { kind: WeaponKind::Autocannon30, magazine: 160, total: 500, can_resupply: false },
    LoadoutEntry { kind: WeaponKind::Pkm, magazine: 250, total: 2000, can_resupply: false },
];

static GUN_TRUCK_LOADOUT: [LoadoutEntry; 1] =
    [LoadoutEntry { kind: WeaponKind::Dshk, magazine: 50, total: 1200, can_resupply: true }];

static ROCKET_ARTILLERY_LOADOUT: [LoadoutEntry; 1] =
    [LoadoutEntry { kind: WeaponKind::GradRocket, magazine: 40, total: 80, can_resupply: true }];

impl UnitArchetype {
    /// Static stats record for this archetype.
    pub fn stats(self) -> ArchetypeStats {
        match self {
            UnitArchetype::InfantrySquad => ArchetypeStats {
                max_speed_mps: 1.5, // ~5 km/h sustained march
                max_health: 100.0,
                steppe_multiplier: 1.0,
                forest_multiplier: 0.8,
                urban_multiplier: 0.9,
                grade_coefficient: -3.5,
                max_climb_ability: 0.6,
                visibility_range_m: 2_000.0,
                movement_class: MovementClass::Walking,
                loadout: &INFANTRY_SQUAD_LOADOUT,
            },
            UnitArchetype::MountedInfantry => ArchetypeStats {
                max_speed_mps: 12.0, // ~43 km/h convoy speed
                max_health: 100.0,
                steppe_multiplier: 1.0,
                forest_multiplier: 0.5,
                urban_multiplier: 0.7,
                grade_coefficient: -6.0,
                max_climb_ability: 0.35,
                visibility_range_m: 2_000.0,
                movement_class: MovementClass::Driving,
                loadout: &MOUNTED_INFANTRY_LOADOUT,
            },
            UnitArchetype::MainBattleTank => ArchetypeStats {
                max_speed_mps: 9.0, // ~32 km/h cross-country
                max_health: 250.0,
                steppe_multiplier: 0.9,
                forest_multiplier: 0.3,
                urban_multiplier: 0.5,
                grade_coefficient: -8.0,
                max_climb_ability: 0.3,
                visibility_range_m: 1_500.0,
                movement_class: MovementClass::Driving,
                loadout: &TANK_LOADOUT,
            },
            UnitArchetype::FightingVehicle => ArchetypeStats {
                max_speed_mps: 10.0,
                max_health: 150.0,
                steppe_multiplier: 0.95,
                forest_multiplier: 0.35,
                urban_multiplier: 0.55,
                grade_coefficient: -7.0,
                max_climb_ability: 0.35,
                visibility_range_m: 1_800.0,
                movement_class: MovementClass::Driving,
                loadout: &FIGHTING_VEHICLE_LOADOUT,
            },
            UnitArchetype::GunTruck => ArchetypeStats {
                max_speed_mps: 14.0,
                max_health: 80.0,
                steppe_multiplier: 0.9,
                forest_multiplier: 0.25,
                urban_multiplier: 0.8,
                grade_coefficient: -7.5,
                max_climb_ability: 0.4,
                visibility_range_m: 1_600.0,
                movement_class: MovementClass::Driving,
                loadout: &GUN_TRUCK_LOADOUT,
            },
            UnitArchetype::RocketArtillery => ArchetypeStats {
                max_speed_mps: 12.0,
                max_health: 90.0,
                steppe_multiplier: 0.85,
                forest_multiplier: 0.2,
                urban_multiplier: 0.6,
                grade_coefficient: -8.0,
                max_climb_ability: 0.25,
                visibility_range_m: 1_200.0,
                movement_class: MovementClass::Driving,
                loadout: &ROCKET_ARTILLERY_LOADOUT,
            },
        }
    }

    /// What this unit presents as to weapons and the bad-odds rule.
    ///
    /// Mounted infantry is a vehicle column while riding and infantry once
    /// it is fighting; everything else is fixed.
    pub fn target_class(self, is_engaging: bool) -> TargetClass {
        match self {
            UnitArchetype::InfantrySquad => TargetClass::Infantry,
            UnitArchetype::MountedInfantry => {
                if is_engaging {
                    TargetClass::Infantry
                } else {
                    TargetClass::UnarmoredVehicle
                }
            }
            UnitArchetype::MainBattleTank => TargetClass::HeavyArmor,
            UnitArchetype::FightingVehicle => TargetClass::LightArmor,
            UnitArchetype::GunTruck | UnitArchetype::RocketArtillery => {
                TargetClass::UnarmoredVehicle
            }
        }
    }

    /// Top speed given combat state; mounted infantry drops to a walking
    /// pace once dismounted.
    pub fn max_speed(self, is_engaging: bool) -> f64 {
        if self == UnitArchetype::MountedInfantry && is_engaging {
            DISMOUNTED_SPEED_MPS
        } else {
            self.stats().max_speed_mps
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicles_fall_off_steeper_than_infantry() {
        let infantry = UnitArchetype::InfantrySquad.stats();
        let tank = UnitArchetype::MainBattleTank.stats();
        assert!(tank.grade_coefficient < infantry.grade_coefficient);
    }

    #[test]
    fn test_infantry_climbs_best() {
        let infantry = UnitArchetype::InfantrySquad.stats();
        for a in [
            UnitArchetype::MountedInfantry,
            UnitArchetype::MainBattleTank,
            UnitArchetype::FightingVehicle,
            UnitArchetype::GunTruck,
            UnitArchetype::RocketArtillery,
        ] {
            assert!(a.stats().max_climb_ability < infantry.max_climb_ability);
        }
    }

    #[test]
    fn test_mounted_infantry_classification_flips() {
        let a = UnitArchetype::MountedInfantry;
        assert_eq!(a.target_class(false), TargetClass::UnarmoredVehicle);
        assert_eq!(a.target_class(true), TargetClass::Infantry);
    }

    #[test]
    fn test_mounted_infantry_dismount_speed() {
        let a = UnitArchetype::MountedInfantry;
        assert!(a.max_speed(true) < a.max_speed(false));
        assert_eq!(a.max_speed(true), DISMOUNTED_SPEED_MPS);
    }

    #[test]
    fn test_tank_classification_fixed() {
        let a = UnitArchetype::MainBattleTank;
        assert_eq!(a.target_class(false), TargetClass::HeavyArmor);
        assert_eq!(a.target_class(true), TargetClass::HeavyArmor);
    }
}
