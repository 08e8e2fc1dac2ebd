//! The fixed-timestep simulation tick.

use physics::{first_hazard_hit, Aabb, ColliderKind, StaticCollider};

use crate::flight::{self, FlightInputs};
use crate::pickups::PowerupKind;
use crate::state::SimState;

/// Everything the tick reads from the keyboard, sampled once per tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInputs {
    pub flight: FlightInputs,
    /// R key, level-triggered. Only honored after a crash.
    pub reset: bool,
}

/// Extent of the ground collision slab.
const GROUND_EXTENT: f32 = 10000.0;

/// Advance the simulation one fixed tick.
///
/// While flying: stream the city, integrate flight, check for crashes, and
/// collect pickups. After a crash everything freezes until R respawns the
/// session. The day/night phase always advances.
pub fn fixed_tick(sim: &mut SimState, inputs: &TickInputs) {
    if !sim.crashed {
        sim.city.refresh(sim.player.transform.position);
        flight::integrate(&mut sim.player, &inputs.flight);

        let player_box = sim.player.aabb();
        let colliders = collect_colliders(sim);
        if let Some(hit) = first_hazard_hit(&player_box, &colliders) {
            sim.crashed = true;
            sim.player.speed = 0.0;
            log::info!(
                "crashed into {:?} at {:.1?}, final score {}",
                hit.kind,
                sim.player.transform.position,
                sim.score
            );
        } else {
            let gained = sim.pickups.resolve(&player_box, &mut sim.rng);
            if gained > 0 {
                sim.score += gained;
                log::debug!("collected pickup(s): +{} -> {}", gained, sim.score);
            }
            if let Some(PowerupKind::SpeedBoost) = sim.pickups.tick_powerup() {
                sim.player.speed = flight::MAX_SPEED;
            }
        }
    } else if inputs.reset {
        sim.reset();
    }

    // Day/night keeps moving even on the crash screen.
    sim.environment.advance_phase();
}

fn collect_colliders(sim: &SimState) -> Vec<StaticCollider> {
    let mut colliders = Vec::with_capacity(sim.city.populated_count() + 2);
    colliders.push(StaticCollider::ground(GROUND_EXTENT));
    colliders.push(StaticCollider::runway());
    colliders.extend(sim.city.buildings().map(|b| StaticCollider {
        kind: ColliderKind::Building,
        aabb: Aabb::from_center_size(b.position, b.size),
    }));
    colliders
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn sim() -> SimState {
        SimState::new(42)
    }

    #[test]
    fn grounded_plane_on_runway_does_not_crash() {
        let mut sim = sim();
        for _ in 0..120 {
            fixed_tick(&mut sim, &TickInputs::default());
        }
        assert!(!sim.crashed);
        assert_eq!(sim.player.transform.position.y, flight::MIN_ALTITUDE);
    }

    #[test]
    fn flying_into_a_building_crashes_and_stops() {
        let mut sim = sim();
        sim.city.refresh(Vec3::ZERO);
        let building = *sim.city.buildings().next().expect("city has buildings");

        sim.player.transform.position = building.position;
        sim.player.speed = 0.15;
        fixed_tick(&mut sim, &TickInputs::default());

        assert!(sim.crashed);
        assert_eq!(sim.player.speed, 0.0);
    }

    #[test]
    fn crashed_plane_is_frozen_until_reset() {
        let mut sim = sim();
        sim.crashed = true;
        sim.player.transform.position = Vec3::new(10.0, 30.0, 10.0);

        let throttle = TickInputs {
            flight: FlightInputs {
                throttle_up: true,
                ..Default::default()
            },
            ..Default::default()
        };
        fixed_tick(&mut sim, &throttle);
        assert_eq!(sim.player.transform.position, Vec3::new(10.0, 30.0, 10.0));
        assert_eq!(sim.player.speed, 0.0);
    }

    #[test]
    fn reset_only_works_after_a_crash() {
        let mut sim = sim();
        sim.score = 50;
        fixed_tick(
            &mut sim,
            &TickInputs {
                reset: true,
                ..Default::default()
            },
        );
        assert_eq!(sim.score, 50, "reset ignored while flying");

        sim.crashed = true;
        fixed_tick(
            &mut sim,
            &TickInputs {
                reset: true,
                ..Default::default()
            },
        );
        assert!(!sim.crashed);
        assert_eq!(sim.score, 0);
        assert_eq!(sim.player.transform.position, flight::SPAWN_POSITION);
    }

    #[test]
    fn reset_after_crash_discards_the_powerup() {
        let mut sim = sim();
        let target = sim.pickups.pickups()[0].position;
        let reach = Aabb::from_center_half_extents(target, crate::state::PLAYER_HALF_EXTENTS);
        sim.pickups.resolve(&reach, &mut sim.rng);
        assert!(sim.pickups.active_powerup().is_some());

        sim.crashed = true;
        fixed_tick(
            &mut sim,
            &TickInputs {
                reset: true,
                ..Default::default()
            },
        );
        assert!(sim.pickups.active_powerup().is_none());

        // Without the boost the respawned plane stays parked.
        fixed_tick(&mut sim, &TickInputs::default());
        assert_eq!(sim.player.speed, 0.0);
    }

    #[test]
    fn day_night_phase_advances_while_crashed() {
        let mut sim = sim();
        sim.crashed = true;
        let before = sim.environment.time_of_day;
        fixed_tick(&mut sim, &TickInputs::default());
        assert!(sim.environment.time_of_day > before);
    }
}
