//! Per-tick detection and engagement-candidate selection.
//!
//! Detection is probabilistic and mutual-blind: each collection rolls
//! against every hostile candidate inside its own visibility circle.
//! Detections feed a team-wide intel pool (merge-only) and the nearest
//! known hostile becomes the engagement target.

use geo::Point;
use rand::Rng;

use crate::core::constants::DETECTION_THRESHOLD;
use crate::core::types::{CollectionHandle, TargetClass};
use crate::spatial;
use crate::world::SimulationWorld;

use super::{SpreadFormation, Waypoint};

/// Asymmetric numerical-superiority check between mismatched classes.
///
/// Soft targets (infantry, unarmored vehicles) will not take on heavy
/// armor below 3:1 superiority; heavy armor does not bother with soft
/// targets unless outnumbered at least 2:1. Matched classes never flag
/// bad odds.
pub fn bad_odds(
    mine: TargetClass,
    my_strength: u32,
    theirs: TargetClass,
    their_strength: u32,
) -> bool {
    use crate::core::constants::{BAD_ODDS_ARMOR_VS_SOFT, BAD_ODDS_SOFT_VS_ARMOR};
    if mine.is_soft() && theirs == TargetClass::HeavyArmor {
        return my_strength < their_strength * BAD_ODDS_SOFT_VS_ARMOR;
    }
    if mine == TargetClass::HeavyArmor && theirs.is_soft() {
        return their_strength < my_strength * BAD_ODDS_ARMOR_VS_SOFT;
    }
    false
}

/// Read-only snapshot of a candidate, taken before any mutation of the
/// observing collection.
struct CandidateView {
    handle: CollectionHandle,
    location: Point<f64>,
    distance: f64,
    visibility_m: f64,
    classification: TargetClass,
    strength: u32,
    eliminated: bool,
    hostile: bool,
}

/// Detection phase for `collections[idx]`.
///
/// Rolls detection against hostile candidates in visibility, prunes the
/// detected set, merges into team intel, and selects or refreshes the
/// engagement target, inserting a stand-off approach waypoint when the
/// current route does not already converge on the target.
pub fn prepare_combat(world: &mut SimulationWorld, idx: usize) {
    let SimulationWorld {
        collections,
        hostility,
        intel,
        rng,
        ..
    } = world;

    let (me_loc, me_class, me_strength, me_vis, me_team) = {
        let me = &collections[idx];
        (
            me.location(),
            me.classification(),
            me.strength(),
            me.max_visibility_range_m,
            me.team,
        )
    };

    // Phase 1: read every other collection before touching our own state.
    let views: Vec<CandidateView> = collections
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != idx)
        .map(|(j, other)| {
            let location = other.location();
            CandidateView {
                handle: CollectionHandle(j as u32),
                location,
                distance: spatial::distance_m(me_loc, location),
                visibility_m: other.max_visibility_range_m,
                classification: other.classification(),
                strength: other.strength(),
                eliminated: other.eliminated,
                hostile: hostility.hostile(me_team, other.team),
            }
        })
        .collect();

    // Phase 2: roll new detections and prune stale ones.
    let mut fresh: Vec<CollectionHandle> = Vec::new();
    for view in &views {
        if view.eliminated || !view.hostile {
            continue;
        }
        let me = &collections[idx];
        if me.detected.contains(&view.handle) {
            continue;
        }
        if view.distance > me_vis {
            continue;
        }
        if bad_odds(me_class, me_strength, view.classification, view.strength) {
            continue;
        }
        // A co-located hostile is point-blank, not invisible.
        let distance = view.distance.max(1.0);
        if rng.gen::<f64>() * (me_vis / distance) > DETECTION_THRESHOLD {
            fresh.push(view.handle);
        }
    }

    {
        let me = &mut collections[idx];
        for handle in fresh {
            me.detected.insert(handle);
        }
        let sticky = me.engaging.filter(|_| me.engaging_because_damaged);
        me.detected.retain(|handle| {
            let Some(view) = views.iter().find(|v| v.handle == *handle) else {
                return false;
            };
            if view.eliminated {
                return false;
            }
            if view.distance <= me_vis {
                return true;
            }
            // A target that hurt us stays tracked until we are clear of
            // its own visibility circle, not just ours.
            sticky == Some(*handle) && view.distance <= view.visibility_m
        });
    }

    // Phase 3: share with the team and pull allied sightings.
    intel.merge(me_team, collections[idx].detected.iter().copied());
    let shared = intel.sightings(me_team);

    // Phase 4: pick the engagement target.
    let me = &collections[idx];
    let known = |handle: &CollectionHandle| -> Option<&CandidateView> {
        views
            .iter()
            .find(|v| v.handle == *handle && v.hostile && !v.eliminated)
    };

    let target = if me.engaging_because_damaged {
        // Sticky: keep shooting back at whoever hurt us while tracking
        // holds. The retain rule above drops them once we are clear of
        // their visibility circle, and that lapse ends the engagement.
        me.engaging
            .filter(|h| known(h).is_some() && me.detected.contains(h))
    } else {
        me.detected
            .iter()
            .chain(shared.iter())
            .filter_map(known)
            // Soft collections never volunteer against heavy armor at bad
            // odds; they only shoot back while damaged.
            .filter(|v| {
                !(me_class.is_soft()
                    && v.classification == TargetClass::HeavyArmor
                    && bad_odds(me_class, me_strength, v.classification, v.strength))
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|v| v.handle)
    };

    let Some(target) = target else {
        if collections[idx].engaging.is_some() {
            collections[idx].disengage();
        }
        return;
    };

    let Some(view) = views.iter().find(|v| v.handle == target) else {
        return;
    };
    let target_loc = view.location;
    let approach_bearing = spatial::bearing_deg(target_loc, me_loc);

    let me = &mut collections[idx];
    let retarget = me.engaging != Some(target);
    // Re-plan the approach on a target change, or when an already routed
    // path no longer converges on the target. A route still being
    // calculated is left alone, and a withdrawing collection keeps its
    // back-off route rather than turning toward the attacker.
    let replan = !me.retreating
        && (retarget
            || (me.nav == super::NavState::Navigating && !me.route_converges_near(target_loc)));
    if replan {
        me.spread = Some(SpreadFormation {
            anchor: target_loc,
            base_bearing: approach_bearing,
        });
        let standoff =
            spatial::destination(target_loc, approach_bearing, crate::core::constants::ENGAGE_STANDOFF_M);
        me.drop_leading_temporary_waypoints();
        me.waypoints.push_front(Waypoint::tactical(standoff));
        me.reset_navigation();
    }
    if retarget {
        me.engage_target(target);
    }
}
