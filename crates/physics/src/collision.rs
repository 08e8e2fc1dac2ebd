//! Static collider classification for the flight world.

use crate::aabb::Aabb;
use glam::Vec3;

/// What a static collider represents. Ground and runway are support
/// surfaces the aircraft may coincide with; buildings are crash hazards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderKind {
    /// The ground slab. Keeps the craft from falling through, never crashes.
    Ground,
    /// The runway strip. Same contact rules as ground.
    Runway,
    /// A streamed building. Intersection is a crash.
    Building,
}

impl ColliderKind {
    /// Whether touching this collider ends the flight.
    pub fn is_hazard(&self) -> bool {
        matches!(self, ColliderKind::Building)
    }
}

/// A static world collider: classification plus bounding volume.
#[derive(Debug, Clone, Copy)]
pub struct StaticCollider {
    pub kind: ColliderKind,
    pub aabb: Aabb,
}

impl StaticCollider {
    pub fn new(kind: ColliderKind, aabb: Aabb) -> Self {
        Self { kind, aabb }
    }

    /// The ground collision slab used by the flight world (thin box just
    /// below y = 0 spanning the playable area).
    pub fn ground(extent: f32) -> Self {
        Self::new(
            ColliderKind::Ground,
            Aabb::from_center_size(
                Vec3::new(0.0, -0.5, 0.0),
                Vec3::new(extent, 1.0, extent),
            ),
        )
    }

    /// The runway volume: a 10 x 100 strip lying on the ground at the origin.
    pub fn runway() -> Self {
        Self::new(
            ColliderKind::Runway,
            Aabb::from_center_size(Vec3::new(0.0, 0.05, 0.0), Vec3::new(10.0, 0.1, 100.0)),
        )
    }
}

/// Test the player volume against a set of static colliders and report the
/// first hazard hit. Support surfaces (ground, runway) never register.
pub fn first_hazard_hit<'a, I>(player: &Aabb, colliders: I) -> Option<&'a StaticCollider>
where
    I: IntoIterator<Item = &'a StaticCollider>,
{
    colliders
        .into_iter()
        .find(|c| c.kind.is_hazard() && player.intersects(&c.aabb))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_box_at(pos: Vec3) -> Aabb {
        Aabb::from_center_half_extents(pos, Vec3::new(2.0, 1.0, 2.5))
    }

    #[test]
    fn ground_contact_is_not_a_crash() {
        let player = player_box_at(Vec3::new(0.0, 0.9, 40.0));
        let colliders = [StaticCollider::ground(10000.0), StaticCollider::runway()];
        assert!(player.intersects(&colliders[0].aabb));
        assert!(first_hazard_hit(&player, &colliders).is_none());
    }

    #[test]
    fn building_overlap_is_a_crash() {
        let player = player_box_at(Vec3::new(30.0, 10.0, 30.0));
        let building = StaticCollider::new(
            ColliderKind::Building,
            Aabb::from_center_size(Vec3::new(30.0, 25.0, 30.0), Vec3::new(10.0, 50.0, 8.0)),
        );
        let colliders = [StaticCollider::ground(10000.0), building];
        let hit = first_hazard_hit(&player, &colliders).expect("should hit the building");
        assert_eq!(hit.kind, ColliderKind::Building);
    }

    #[test]
    fn distant_building_does_not_register() {
        let player = player_box_at(Vec3::new(0.0, 20.0, 0.0));
        let building = StaticCollider::new(
            ColliderKind::Building,
            Aabb::from_center_size(Vec3::new(300.0, 25.0, 300.0), Vec3::new(10.0, 50.0, 8.0)),
        );
        assert!(first_hazard_hit(&player, [&building]).is_none());
    }
}
