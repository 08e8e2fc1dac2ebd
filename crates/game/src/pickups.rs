//! Floating pickups and the powerups they grant.

use glam::Vec3;
use physics::Aabb;
use rand::Rng;

/// Pickups alive after a (re)spawn.
pub const PICKUP_COUNT: usize = 20;
/// Points per pickup without a multiplier.
pub const BASE_POINTS: u32 = 10;
/// Powerup lifetime in fixed ticks (5 seconds at 60 Hz).
pub const POWERUP_DURATION: u32 = 300;
/// Pickups are small cubes with this edge length.
pub const PICKUP_SIZE: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerupKind {
    /// Pins speed to maximum every tick while active.
    SpeedBoost,
    /// Pickups award double points while active.
    DoublePoints,
}

impl PowerupKind {
    fn random(rng: &mut impl Rng) -> Self {
        if rng.gen::<f32>() < 0.5 {
            PowerupKind::SpeedBoost
        } else {
            PowerupKind::DoublePoints
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActivePowerup {
    pub kind: PowerupKind,
    /// Ticks until expiry.
    pub remaining: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct Pickup {
    pub position: Vec3,
}

impl Pickup {
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_size(self.position, Vec3::splat(PICKUP_SIZE))
    }
}

/// Owns the pickup field and the single active powerup slot.
#[derive(Debug, Default)]
pub struct PickupManager {
    pickups: Vec<Pickup>,
    active: Option<ActivePowerup>,
}

impl PickupManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn active_powerup(&self) -> Option<&ActivePowerup> {
        self.active.as_ref()
    }

    /// Discard all pickups and scatter a fresh field around the origin.
    pub fn respawn(&mut self, rng: &mut impl Rng) {
        self.pickups.clear();
        for _ in 0..PICKUP_COUNT {
            self.pickups.push(Pickup {
                position: Vec3::new(
                    rng.gen_range(-500.0..500.0),
                    rng.gen_range(5.0..35.0),
                    rng.gen_range(-500.0..500.0),
                ),
            });
        }
    }

    pub fn clear_powerup(&mut self) {
        self.active = None;
    }

    /// Collect every pickup overlapping the player, returning points gained.
    ///
    /// Each collection awards points under the powerup active at that moment,
    /// then draws a fresh powerup that overwrites the slot. Collecting with a
    /// powerup already running discards its remaining time.
    pub fn resolve(&mut self, player: &Aabb, rng: &mut impl Rng) -> u32 {
        let mut collected = 0;
        self.pickups.retain(|pickup| {
            if player.intersects(&pickup.aabb()) {
                collected += 1;
                false
            } else {
                true
            }
        });

        let mut gained = 0;
        for _ in 0..collected {
            let double = matches!(
                self.active,
                Some(ActivePowerup {
                    kind: PowerupKind::DoublePoints,
                    ..
                })
            );
            gained += if double { BASE_POINTS * 2 } else { BASE_POINTS };
            self.active = Some(ActivePowerup {
                kind: PowerupKind::random(rng),
                remaining: POWERUP_DURATION,
            });
        }
        gained
    }

    /// Count down the active powerup. Returns the kind still in effect this
    /// tick, or `None` once it expires.
    pub fn tick_powerup(&mut self) -> Option<PowerupKind> {
        let active = self.active.as_mut()?;
        active.remaining -= 1;
        if active.remaining == 0 {
            self.active = None;
            return None;
        }
        Some(active.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player_box_at(pos: Vec3) -> Aabb {
        Aabb::from_center_half_extents(pos, Vec3::new(2.0, 1.0, 2.5))
    }

    fn manager_with_pickup_at(pos: Vec3) -> PickupManager {
        let mut manager = PickupManager::new();
        manager.pickups.push(Pickup { position: pos });
        manager
    }

    #[test]
    fn respawn_replaces_the_field() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut manager = manager_with_pickup_at(Vec3::ZERO);
        manager.respawn(&mut rng);
        assert_eq!(manager.pickups().len(), PICKUP_COUNT);
        for pickup in manager.pickups() {
            assert!(pickup.position.x >= -500.0 && pickup.position.x < 500.0);
            assert!(pickup.position.y >= 5.0 && pickup.position.y < 35.0);
            assert!(pickup.position.z >= -500.0 && pickup.position.z < 500.0);
        }
    }

    #[test]
    fn collection_awards_base_points_and_grants_powerup() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut manager = manager_with_pickup_at(Vec3::ZERO);
        let gained = manager.resolve(&player_box_at(Vec3::ZERO), &mut rng);
        assert_eq!(gained, BASE_POINTS);
        assert!(manager.pickups().is_empty());
        let active = manager.active_powerup().expect("powerup granted");
        assert_eq!(active.remaining, POWERUP_DURATION);
    }

    #[test]
    fn double_points_doubles_the_award() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut manager = manager_with_pickup_at(Vec3::ZERO);
        manager.active = Some(ActivePowerup {
            kind: PowerupKind::DoublePoints,
            remaining: 100,
        });
        let gained = manager.resolve(&player_box_at(Vec3::ZERO), &mut rng);
        assert_eq!(gained, BASE_POINTS * 2);
    }

    #[test]
    fn collection_overwrites_running_powerup_timer() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut manager = manager_with_pickup_at(Vec3::ZERO);
        manager.active = Some(ActivePowerup {
            kind: PowerupKind::SpeedBoost,
            remaining: 7,
        });
        manager.resolve(&player_box_at(Vec3::ZERO), &mut rng);
        let active = manager.active_powerup().expect("powerup still present");
        assert_eq!(active.remaining, POWERUP_DURATION);
    }

    #[test]
    fn powerup_expires_after_duration() {
        let mut manager = PickupManager::new();
        manager.active = Some(ActivePowerup {
            kind: PowerupKind::SpeedBoost,
            remaining: POWERUP_DURATION,
        });
        for _ in 0..POWERUP_DURATION - 1 {
            assert!(manager.tick_powerup().is_some());
        }
        // The expiry tick itself grants no effect.
        assert!(manager.tick_powerup().is_none());
        assert!(manager.active_powerup().is_none());
    }

    #[test]
    fn distant_pickup_is_not_collected() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut manager = manager_with_pickup_at(Vec3::new(100.0, 20.0, 100.0));
        let gained = manager.resolve(&player_box_at(Vec3::ZERO), &mut rng);
        assert_eq!(gained, 0);
        assert_eq!(manager.pickups().len(), 1);
    }
}
