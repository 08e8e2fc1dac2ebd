//! Simulation state: the player and the full session.

use engine_core::transform::Transform;
use glam::Vec3;
use physics::Aabb;
use procgen::{CityConfig, CityGrid};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::environment::EnvironmentState;
use crate::flight;
use crate::pickups::PickupManager;

/// Collision half-extents of the plane, world units.
pub const PLAYER_HALF_EXTENTS: Vec3 = Vec3::new(2.0, 1.0, 2.5);

#[derive(Debug, Clone)]
pub struct PlayerState {
    pub transform: Transform,
    pub speed: f32,
}

impl PlayerState {
    /// Parked at the start of the runway, level, engine off.
    pub fn spawn() -> Self {
        Self {
            transform: Transform::from_position(flight::SPAWN_POSITION),
            speed: 0.0,
        }
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.transform.position, PLAYER_HALF_EXTENTS)
    }
}

/// Everything the fixed-tick simulation reads and writes.
pub struct SimState {
    pub player: PlayerState,
    pub score: u32,
    pub crashed: bool,
    pub city: CityGrid,
    pub pickups: PickupManager,
    pub environment: EnvironmentState,
    pub rng: StdRng,
}

impl SimState {
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pickups = PickupManager::new();
        pickups.respawn(&mut rng);
        Self {
            player: PlayerState::spawn(),
            score: 0,
            crashed: false,
            city: CityGrid::new(CityConfig {
                seed,
                ..Default::default()
            }),
            pickups,
            environment: EnvironmentState::new(),
            rng,
        }
    }

    /// Restart after a crash. The streamed city and day/night phase persist;
    /// the player, score, pickups, and powerup start over.
    pub fn reset(&mut self) {
        self.player = PlayerState::spawn();
        self.score = 0;
        self.crashed = false;
        self.pickups.clear_powerup();
        self.pickups.respawn(&mut self.rng);
        log::info!("session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_restores_spawn_but_keeps_city() {
        let mut sim = SimState::new(7);
        sim.city.refresh(Vec3::ZERO);
        let populated = sim.city.populated_count();
        assert!(populated > 0);

        sim.player.transform.position = Vec3::new(100.0, 30.0, -200.0);
        sim.player.speed = 0.15;
        sim.score = 90;
        sim.crashed = true;

        sim.reset();
        assert_eq!(sim.player.transform.position, flight::SPAWN_POSITION);
        assert_eq!(sim.player.speed, 0.0);
        assert_eq!(sim.score, 0);
        assert!(!sim.crashed);
        assert_eq!(sim.city.populated_count(), populated);
        assert_eq!(sim.pickups.pickups().len(), crate::pickups::PICKUP_COUNT);
        assert!(sim.pickups.active_powerup().is_none());
    }

    #[test]
    fn reset_clears_active_powerup() {
        let mut sim = SimState::new(11);

        // Earn a powerup through the public path: collect a pickup.
        let target = sim.pickups.pickups()[0].position;
        let player_box = Aabb::from_center_half_extents(target, PLAYER_HALF_EXTENTS);
        sim.pickups.resolve(&player_box, &mut sim.rng);
        assert!(sim.pickups.active_powerup().is_some());

        sim.crashed = true;
        sim.reset();
        assert!(
            sim.pickups.active_powerup().is_none(),
            "a powerup must not survive the reset"
        );
    }
}
