//! Weapon catalog - static data table of range/accuracy/fire-rate/efficacy
//!
//! Weapons are immutable shared records; units hold a `WeaponKind` plus
//! their own ammunition state. Efficacy is damage per landed hit against
//! each target class. Stats are coarse battalion-scale abstractions, not
//! ballistics.

use serde::{Deserialize, Serialize};

use crate::core::types::TargetClass;

/// Immutable weapon stats, shared by every unit carrying the weapon.
#[derive(Debug, Clone, PartialEq)]
pub struct Weapon {
    pub name: &'static str,
    /// Maximum effective range in meters.
    pub range_m: f64,
    /// Rounds per minute.
    pub fire_rate_rpm: f64,
    /// Per-shot hit probability, 0..1.
    pub accuracy: f64,
    /// Area-damage radius in meters; 0 = point weapon.
    pub terminal_effect_m: f64,
    /// Damage per hit, indexed by `TargetClass::table_index()`:
    /// [infantry, heavy armor, light armor, unarmored vehicle].
    efficacy: [f64; 4],
}

impl Weapon {
    /// Damage one landed hit deals to the given target class.
    pub fn efficacy(&self, class: TargetClass) -> f64 {
        self.efficacy[class.table_index()]
    }

    /// Rounds fired per second.
    pub fn rounds_per_second(&self) -> f64 {
        self.fire_rate_rpm / 60.0
    }
}

/// Catalog key resolving to a static `Weapon` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// 5.45 mm assault rifle (standard infantry arm)
    Ak74,
    /// 7.62 mm general-purpose machine gun
    Pkm,
    /// Shoulder-fired HEAT launcher
    Rpg7,
    /// 12.7 mm heavy machine gun (vehicle mount)
    Dshk,
    /// 30 mm autocannon (IFV main gun)
    Autocannon30,
    /// 125 mm smoothbore tank gun
    Smoothbore125,
    /// 122 mm area-saturation artillery rocket
    GradRocket,
}

// Effective ranges follow published figures; fire rates are sustained
// (not cyclic) rates; efficacy folds penetration and behind-armor effect
// into a single damage number against a 100-health unit.
static AK74: Weapon = Weapon {
    name: "AK-74",
    range_m: 500.0,
    fire_rate_rpm: 100.0,
    accuracy: 0.25,
    terminal_effect_m: 0.0,
    efficacy: [8.0, 0.0, 0.5, 4.0],
};

static PKM: Weapon = Weapon {
    name: "PKM",
    range_m: 1_000.0,
    fire_rate_rpm: 250.0,
    accuracy: 0.15,
    terminal_effect_m: 0.0,
    efficacy: [8.0, 0.0, 1.0, 5.0],
};

static RPG7: Weapon = Weapon {
    name: "RPG-7",
    range_m: 300.0,
    fire_rate_rpm: 4.0,
    accuracy: 0.5,
    terminal_effect_m: 4.0,
    efficacy: [30.0, 45.0, 70.0, 90.0],
};

static DSHK: Weapon = Weapon {
    name: "DShK",
    range_m: 1_500.0,
    fire_rate_rpm: 150.0,
    accuracy: 0.2,
    terminal_effect_m: 0.0,
    efficacy: [12.0, 0.5, 6.0, 15.0],
};

static AUTOCANNON30: Weapon = Weapon {
    name: "2A42 30mm",
    range_m: 2_000.0,
    fire_rate_rpm: 200.0,
    accuracy: 0.3,
    terminal_effect_m: 2.0,
    efficacy: [15.0, 3.0, 25.0, 40.0],
};

static SMOOTHBORE125: Weapon = Weapon {
    name: "2A46 125mm",
    range_m: 2_500.0,
    fire_rate_rpm: 6.0,
    accuracy: 0.6,
    terminal_effect_m: 8.0,
    efficacy: [40.0, 60.0, 85.0, 100.0],
};

static GRAD_ROCKET: Weapon = Weapon {
    name: "BM-21 Grad",
    range_m: 20_000.0,
    fire_rate_rpm: 40.0,
    accuracy: 0.05,
    terminal_effect_m: 25.0,
    efficacy: [35.0, 10.0, 30.0, 45.0],
};

impl WeaponKind {
    /// Resolve the catalog record for this kind.
    pub fn stats(self) -> &'static Weapon {
        match self {
            WeaponKind::Ak74 => &AK74,
            WeaponKind::Pkm => &PKM,
            WeaponKind::Rpg7 => &RPG7,
            WeaponKind::Dshk => &DSHK,
            WeaponKind::Autocannon30 => &AUTOCANNON30,
            WeaponKind::Smoothbore125 => &SMOOTHBORE125,
            WeaponKind::GradRocket => &GRAD_ROCKET,
        }
    }
}
