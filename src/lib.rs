//! Salient - Two-Level Military Engagement Simulator
//!
//! Battalion-scale "collections" of aggregated units advance through real
//! geographic space: navigation against a route/terrain service, mutual
//! probabilistic detection, engagement target selection, combat attrition,
//! and retreat, under a fixed-step tick scheduler.

pub mod collection;
pub mod core;
pub mod routing;
pub mod scenario;
pub mod spatial;
pub mod unit;
pub mod viz;
pub mod weapons;
pub mod world;
