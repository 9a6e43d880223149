//! Combat resolution: per-unit fire against the engaged target, and the
//! retreat maneuver when the fight turns unwinnable.

use crate::core::constants::RETREAT_MARGIN_M;
use crate::core::types::TargetClass;
use crate::spatial;
use crate::world::{pair_mut, SimulationWorld};

use super::{Collection, Waypoint};

/// Combat phase for `collections[idx]`.
///
/// While an engagement target lives, every unit fires its best qualifying
/// weapon. Bad odds against heavy armor, or a tick where no unit could
/// return fire while under attack, turns the engagement into a retreat.
pub fn run_combat(world: &mut SimulationWorld, idx: usize, seconds: f64) {
    let Some(target_handle) = world.collections[idx].engaging else {
        return;
    };
    let t = target_handle.index();
    if t >= world.collections.len() || t == idx {
        world.collections[idx].disengage();
        return;
    }
    if world.collections[t].eliminated || world.collections[t].health() <= 0.0 {
        world.collections[idx].disengage();
        return;
    }

    let (total_damage, all_fire_failed) = {
        let SimulationWorld {
            collections, rng, ..
        } = world;
        let (me, target) = pair_mut(collections, idx, t);

        // Only the soft side breaks off on bad odds here: armor facing
        // massed infantry still defends itself once committed.
        let my_class = me.classification();
        let their_class = target.classification();
        if !me.retreating
            && my_class.is_soft()
            && their_class == TargetClass::HeavyArmor
            && super::bad_odds(my_class, me.strength(), their_class, target.strength())
        {
            begin_retreat(me, target);
            return;
        }
        if me.retreating {
            return;
        }

        let target_loc = target.location();
        let mut total = 0.0;
        let mut any_fired = false;
        for unit in &mut me.units {
            let distance = spatial::distance_m(unit.location, target_loc);
            if let Some(damage) = unit.fire_at(their_class, distance, seconds, rng) {
                any_fired = true;
                total += damage;
            }
        }
        (total, !any_fired)
    };

    if all_fire_failed && world.collections[idx].engaging_because_damaged {
        // Under fire with nothing to answer with: break contact.
        let SimulationWorld { collections, .. } = world;
        let (me, target) = pair_mut(collections, idx, t);
        begin_retreat(me, target);
        return;
    }

    if total_damage > 0.0 {
        let eliminated = world.deal_damage(t, idx, total_damage);
        if eliminated {
            world.collections[idx].detected.remove(&target_handle);
            world.collections[idx].disengage();
        }
    }
}

/// Begin falling back out of the enemy's visibility circle.
///
/// The back-off point sits on the enemy-to-us bearing just past their
/// visibility range; queued waypoints inside their circle are remapped to
/// the circle's edge so the withdrawal does not route straight back in.
pub fn begin_retreat(me: &mut Collection, enemy: &Collection) {
    let enemy_loc = enemy.location();
    let enemy_vis = enemy.max_visibility_range_m;
    let clear_radius = enemy_vis + RETREAT_MARGIN_M;

    let away = spatial::bearing_deg(enemy_loc, me.location());
    let backoff = spatial::destination(enemy_loc, away, clear_radius);

    me.drop_leading_temporary_waypoints();
    for waypoint in me.waypoints.iter_mut() {
        if spatial::distance_m(waypoint.location, enemy_loc) < enemy_vis {
            let bearing = spatial::bearing_deg(enemy_loc, waypoint.location);
            waypoint.location = spatial::destination(enemy_loc, bearing, clear_radius);
        }
    }
    me.waypoints.push_front(Waypoint::tactical(backoff));

    me.retreating = true;
    me.spread = None;
    me.reset_navigation();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Team;
    use crate::unit::{Unit, UnitArchetype};
    use geo::Point;

    fn collection_at(archetype: UnitArchetype, team: u8, at: Point<f64>) -> Collection {
        let units = vec![Unit::new(archetype, at)];
        Collection::new("test", Team(team), archetype, units, at, [])
    }

    #[test]
    fn test_begin_retreat_backoff_outside_enemy_visibility() {
        let me_loc = Point::new(44.0, 42.0);
        let enemy_loc = spatial::destination(me_loc, 90.0, 400.0);
        let mut me = collection_at(UnitArchetype::InfantrySquad, 0, me_loc);
        let enemy = collection_at(UnitArchetype::MainBattleTank, 1, enemy_loc);

        begin_retreat(&mut me, &enemy);
        assert!(me.retreating);
        let backoff = me.waypoints.front().expect("backoff waypoint queued");
        assert!(backoff.temporary);
        assert!(
            spatial::distance_m(backoff.location, enemy.location())
                > enemy.max_visibility_range_m
        );
        // The fallback stays on our side of the enemy.
        assert!(
            spatial::distance_m(backoff.location, me.location())
                < spatial::distance_m(backoff.location, enemy.location())
        );
    }

    #[test]
    fn test_begin_retreat_remaps_waypoints_inside_enemy_circle() {
        let me_loc = Point::new(44.0, 42.0);
        let enemy_loc = spatial::destination(me_loc, 90.0, 500.0);
        let mut me = collection_at(UnitArchetype::InfantrySquad, 0, me_loc);
        let enemy = collection_at(UnitArchetype::MainBattleTank, 1, enemy_loc);

        // Objective deep inside the enemy's visibility circle.
        let near_enemy = spatial::destination(enemy_loc, 45.0, 100.0);
        me.waypoints.push_back(Waypoint::objective(near_enemy));
        begin_retreat(&mut me, &enemy);

        for waypoint in me.waypoints.iter() {
            assert!(
                spatial::distance_m(waypoint.location, enemy.location())
                    >= enemy.max_visibility_range_m
            );
        }
    }
}
