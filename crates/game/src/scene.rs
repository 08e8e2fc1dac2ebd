//! Per-frame scene assembly: simulation state to renderer instances.
//!
//! Nothing here owns GPU resources. Buildings, decorations, and pickups are
//! re-emitted as instance data every frame, so evicting a building is just
//! not emitting it anymore.

use glam::{Mat4, Quat, Vec3};
use procgen::{DecorKind, Decoration};
use renderer::{Camera, InstanceData};

use crate::pickups::PICKUP_SIZE;
use crate::state::SimState;

pub const GROUND_COLOR: [f32; 4] = [0.004, 0.686, 0.063, 1.0]; // 0x01af10
pub const RUNWAY_COLOR: [f32; 4] = [0.667, 0.667, 0.667, 1.0];
pub const RUNWAY_LINE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const PICKUP_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
pub const FALLBACK_PLANE_COLOR: [f32; 4] = [0.85, 0.85, 0.9, 1.0];

pub const SKY_DOME_RADIUS: f32 = 9000.0;
pub const CLOUD_SCALE: Vec3 = Vec3::new(80.0, 50.0, 1.0);
pub const CLOUD_COUNT: usize = 30;

/// glTF plane models are exported facing +Z at unit scale; the sim flies -Z.
const PLANE_MODEL_SCALE: f32 = 40.0;

/// Instance lists grouped by mesh and render pass.
#[derive(Default)]
pub struct SceneInstances {
    /// Opaque boxes: buildings, decoration blocks, roads, runway, pickups.
    pub cubes: Vec<InstanceData>,
    /// Opaque planes: the ground sheet and the runway center line.
    pub planes: Vec<InstanceData>,
    /// Opaque spheres: hills.
    pub spheres: Vec<InstanceData>,
    /// The player, drawn with the loaded model or the fallback cube.
    pub player_model: Vec<InstanceData>,
    pub player_fallback: Vec<InstanceData>,
    /// Transparent boxes: water patches.
    pub water: Vec<InstanceData>,
    /// Transparent camera-facing quads.
    pub clouds: Vec<InstanceData>,
    /// The sky dome, present only at night.
    pub sky: Vec<InstanceData>,
}

fn place(position: Vec3, scale: Vec3, color: [f32; 4]) -> InstanceData {
    let model = Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, position);
    InstanceData::new(model.to_cols_array_2d(), color)
}

/// Build every instance list for the current frame.
pub fn assemble(
    sim: &SimState,
    decorations: &[Decoration],
    cloud_positions: &[Vec3],
    camera: &Camera,
) -> SceneInstances {
    let mut scene = SceneInstances::default();

    // Ground sheet and runway.
    scene.planes.push(place(
        Vec3::ZERO,
        Vec3::new(10000.0, 1.0, 10000.0),
        GROUND_COLOR,
    ));
    scene.cubes.push(place(
        Vec3::new(0.0, 0.05, 0.0),
        Vec3::new(10.0, 0.1, 100.0),
        RUNWAY_COLOR,
    ));
    scene.planes.push(place(
        Vec3::new(0.0, 0.11, 0.0),
        Vec3::new(0.2, 1.0, 90.0),
        RUNWAY_LINE_COLOR,
    ));

    // Streamed buildings.
    for building in sim.city.buildings() {
        scene
            .cubes
            .push(place(building.position, building.size, building.color));
    }

    // Fixed decoration field.
    for decoration in decorations {
        let inst = place(decoration.position, decoration.scale, decoration.color);
        match decoration.kind {
            DecorKind::Block | DecorKind::Road => scene.cubes.push(inst),
            DecorKind::Hill => scene.spheres.push(inst),
            DecorKind::Water => scene.water.push(inst),
        }
    }

    // Pickups.
    for pickup in sim.pickups.pickups() {
        scene
            .cubes
            .push(place(pickup.position, Vec3::splat(PICKUP_SIZE), PICKUP_COLOR));
    }

    // Player: loaded model flies nose toward -Z after a half-turn.
    let player = &sim.player.transform;
    let model = player.to_matrix()
        * Mat4::from_rotation_y(std::f32::consts::PI)
        * Mat4::from_scale(Vec3::splat(PLANE_MODEL_SCALE));
    scene
        .player_model
        .push(InstanceData::new(model.to_cols_array_2d(), [1.0; 4]));
    let fallback = player.to_matrix() * Mat4::from_scale(Vec3::new(4.0, 2.0, 5.0));
    scene.player_fallback.push(InstanceData::new(
        fallback.to_cols_array_2d(),
        FALLBACK_PLANE_COLOR,
    ));

    // Clouds billboard toward the camera.
    let billboard = camera.transform.rotation;
    for &position in cloud_positions {
        let model = Mat4::from_scale_rotation_translation(CLOUD_SCALE, billboard, position);
        scene
            .clouds
            .push(InstanceData::new(model.to_cols_array_2d(), [1.0; 4]));
    }

    // Star dome, visible only at night.
    if !sim.environment.is_day {
        scene.sky.push(place(
            Vec3::ZERO,
            Vec3::splat(SKY_DOME_RADIUS),
            [1.0; 4],
        ));
    }

    scene
}

/// Scatter the cloud layer. Done once at startup.
pub fn scatter_clouds(rng: &mut impl rand::Rng) -> Vec<Vec3> {
    (0..CLOUD_COUNT)
        .map(|_| {
            Vec3::new(
                rng.gen_range(-1000.0..1000.0),
                rng.gen_range(20.0..50.0),
                rng.gen_range(-1000.0..1000.0),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn assembled(is_day: bool) -> SceneInstances {
        let mut sim = SimState::new(9);
        sim.city.refresh(Vec3::ZERO);
        sim.environment.is_day = is_day;
        let decorations = procgen::populate_environment(9);
        let mut rng = StdRng::seed_from_u64(9);
        let clouds = scatter_clouds(&mut rng);
        let camera = Camera::new(1.0);
        assemble(&sim, &decorations, &clouds, &camera)
    }

    #[test]
    fn sky_dome_only_at_night() {
        assert!(assembled(true).sky.is_empty());
        assert_eq!(assembled(false).sky.len(), 1);
    }

    #[test]
    fn buildings_and_scenery_are_emitted() {
        let scene = assembled(true);
        // Runway box + buildings + blocks/roads + pickups.
        assert!(scene.cubes.len() > 100);
        assert_eq!(scene.clouds.len(), CLOUD_COUNT);
        assert_eq!(scene.planes.len(), 2);
        assert_eq!(scene.player_model.len(), 1);
    }
}
