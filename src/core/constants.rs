//! Simulation constants - all fixed tuning values in one place

// Navigation
/// A unit counts as arrived once within this distance of its destination.
pub const NAVIGATION_THRESHOLD_M: f64 = 10.0;
/// Arrival scatter: units land 0..=50 m from the exact destination on a
/// random bearing, so co-located units don't stack on one point.
pub const ARRIVAL_FUZZ_MAX_M: f64 = 50.0;
/// Path-pruning tolerance for the consumed-segment walk (meters).
pub const PATH_PRUNE_TOLERANCE_M: f64 = 1.0;
/// A routed path longer than this multiple of the direct distance is
/// considered inefficient and triggers the fallback chain.
pub const ROUTE_INEFFICIENCY_FACTOR: f64 = 2.5;
/// Spacing of terrain samples along a routed path.
pub const TERRAIN_SAMPLE_INTERVAL_M: f64 = 500.0;
/// Grade is forced to 0 for samples shorter than this: elevation data is
/// too coarse for short baselines and would amplify noise.
pub const MIN_GRADE_SAMPLE_M: f64 = 50.0;

// Movement
/// Speed multiplier while a unit is engaging (suppressed movement).
pub const ENGAGING_SPEED_FACTOR: f64 = 0.2;

// Detection
/// The detection roll `rng * (visibility_range / distance)` must exceed
/// this to register a contact.
pub const DETECTION_THRESHOLD: f64 = 0.7;
/// Infantry/unarmored collections need this unit-count advantage to
/// register heavy armor as a viable contact.
pub const BAD_ODDS_SOFT_VS_ARMOR: u32 = 3;
/// Heavy armor ignores soft collections unless outnumbered by this factor.
pub const BAD_ODDS_ARMOR_VS_SOFT: u32 = 2;

// Engagement maneuver
/// Stand-off distance of the approach waypoint from the target (meters).
pub const ENGAGE_STANDOFF_M: f64 = 300.0;
/// Half-width of the approach/spread arc around the target->self bearing.
pub const SPREAD_ARC_DEG: f64 = 60.0;
/// Extra distance past the enemy visibility boundary for retreat
/// destinations and remapped waypoints.
pub const RETREAT_MARGIN_M: f64 = 100.0;

// Combat
/// Damage is applied to random live units in increments of this many
/// health points, so losses spread across a roster.
pub const DAMAGE_INCREMENT: f64 = 1.0;

// Time
/// Default simulated seconds per tick.
pub const DEFAULT_TICK_SECONDS: f64 = 5.0;

// Collaborators
/// Fixed delay before retrying a rate-limited route request. Matches the
/// upstream service's observed cool-down.
pub const ROUTER_RETRY_DELAY_SECS: f64 = 15.0;
