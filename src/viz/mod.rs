//! Push-only visualization interface.
//!
//! The simulation publishes one frame per collection per tick; sinks
//! consume them however they like (discard, stream as JSON lines). No
//! return value flows back into the simulation.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::collection::Collection;
use crate::core::types::Tick;

/// Snapshot of a unit for display: position and health fraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitFrame {
    pub location: [f64; 2],
    pub health: f64,
    pub max_health: f64,
}

/// One collection's state for one tick. Coordinates are `[lon, lat]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionFrame {
    pub id: String,
    pub name: String,
    pub team: u8,
    pub tick: Tick,
    pub location: [f64; 2],
    pub health: f64,
    pub eliminated: bool,
    pub visibility_m: f64,
    pub path: Vec<[f64; 2]>,
    pub waypoints: Vec<[f64; 2]>,
    pub units: Vec<UnitFrame>,
}

impl CollectionFrame {
    pub fn capture(collection: &Collection, tick: Tick) -> Self {
        let location = collection.location();
        Self {
            id: collection.id.to_string(),
            name: collection.name.clone(),
            team: collection.team.0,
            tick,
            location: [location.x(), location.y()],
            health: collection.health(),
            eliminated: collection.eliminated,
            visibility_m: collection.max_visibility_range_m,
            path: collection.route().iter().map(|p| [p.x(), p.y()]).collect(),
            waypoints: collection
                .waypoints
                .iter()
                .map(|w| [w.location.x(), w.location.y()])
                .collect(),
            units: collection
                .units
                .iter()
                .map(|u| UnitFrame {
                    location: [u.location.x(), u.location.y()],
                    health: u.health,
                    max_health: u.max_health,
                })
                .collect(),
        }
    }
}

pub trait VisualizationSink {
    fn publish(&mut self, frame: &CollectionFrame);
}

/// Discards every frame. Used by headless runs and tests.
#[derive(Debug, Default)]
pub struct NullSink;

impl VisualizationSink for NullSink {
    fn publish(&mut self, _frame: &CollectionFrame) {}
}

/// Streams frames as JSON lines to any writer.
pub struct JsonlSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonlSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> VisualizationSink for JsonlSink<W> {
    fn publish(&mut self, frame: &CollectionFrame) {
        match serde_json::to_string(frame) {
            Ok(line) => {
                if let Err(err) = writeln!(self.writer, "{line}") {
                    tracing::warn!(error = %err, "failed to write visualization frame");
                }
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize visualization frame"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Team;
    use crate::unit::{Unit, UnitArchetype};
    use geo::Point;

    #[test]
    fn test_frame_capture_round_trips_through_json() {
        let at = Point::new(44.1, 42.2);
        let units = vec![Unit::new(UnitArchetype::InfantrySquad, at)];
        let collection = Collection::new(
            "alpha",
            Team(1),
            UnitArchetype::InfantrySquad,
            units,
            at,
            [],
        );
        let frame = CollectionFrame::capture(&collection, 3);
        let json = serde_json::to_string(&frame).unwrap();
        let back: CollectionFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "alpha");
        assert_eq!(back.tick, 3);
        assert_eq!(back.units.len(), 1);
        assert!((back.location[0] - 44.1).abs() < 1e-9);
    }

    #[test]
    fn test_jsonl_sink_writes_one_line_per_frame() {
        let at = Point::new(44.0, 42.0);
        let collection = Collection::new(
            "bravo",
            Team(0),
            UnitArchetype::MainBattleTank,
            vec![Unit::new(UnitArchetype::MainBattleTank, at)],
            at,
            [],
        );
        let frame = CollectionFrame::capture(&collection, 0);
        let mut buffer = Vec::new();
        {
            let mut sink = JsonlSink::new(&mut buffer);
            sink.publish(&frame);
            sink.publish(&frame);
        }
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text.lines().count(), 2);
    }
}
