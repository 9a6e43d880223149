//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for collections (display/logging identity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionId(pub Uuid);

impl CollectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CollectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CollectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Arena index of a collection in the simulation world.
///
/// Collections are created once at scenario load and never removed, so a
/// plain index is a stable weak reference: holding a handle never keeps a
/// collection "alive", and a handle to an eliminated collection is valid to
/// look up (it just resolves to an inert collection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionHandle(pub u32);

impl CollectionHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Team identifier. Hostility between teams is an explicit pairwise
/// predicate on the world, not derived from team inequality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Team(pub u8);

/// What a collection presents as to weapon efficacy tables and the
/// bad-odds rule. May be computed dynamically: mounted infantry reports
/// `Infantry` only while dismounted and fighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetClass {
    Infantry,
    HeavyArmor,
    LightArmor,
    UnarmoredVehicle,
}

impl TargetClass {
    /// Index into per-class efficacy tables.
    pub fn table_index(self) -> usize {
        match self {
            TargetClass::Infantry => 0,
            TargetClass::HeavyArmor => 1,
            TargetClass::LightArmor => 2,
            TargetClass::UnarmoredVehicle => 3,
        }
    }

    /// Soft targets for the asymmetric bad-odds rule.
    pub fn is_soft(self) -> bool {
        matches!(self, TargetClass::Infantry | TargetClass::UnarmoredVehicle)
    }
}

/// Route profile requested from the router collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementClass {
    Driving,
    Walking,
}

/// Land cover class reported by the terrain collaborator.
///
/// Ordered by precedence: when several cover polygons overlap a sample the
/// highest-ranked one wins (urban lowest, wood highest).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum LandCover {
    #[default]
    Urban,
    Crop,
    Grass,
    Scrub,
    Wood,
}

/// Simulation tick counter
pub type Tick = u64;
