//! Day/night cycle, lighting presets, and the camera rig.

use engine_core::transform::Transform;
use glam::Vec3;
use renderer::{Camera, LightingParams};

/// Phase advance per fixed tick. A full day lasts 2*pi/0.001 ticks,
/// roughly 105 seconds at 60 Hz.
pub const PHASE_STEP: f32 = 0.001;

pub const DAY_SKY: [f32; 3] = [0.529, 0.808, 0.922]; // 0x87CEEB
pub const NIGHT_SKY: [f32; 3] = [0.0, 0.0, 0.0];
pub const FOG_COLOR: [f32; 3] = [0.8, 0.8, 0.8]; // 0xcccccc
pub const FOG_NEAR: f32 = 40.0;
pub const FOG_FAR: f32 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    /// Chase camera above and behind the right wing.
    ThirdPersonNear,
    /// Cockpit: camera adopts the player pose exactly.
    FirstPerson,
    /// Chase camera further back, lower.
    ThirdPersonFar,
}

impl CameraMode {
    pub fn next(self) -> Self {
        match self {
            CameraMode::ThirdPersonNear => CameraMode::FirstPerson,
            CameraMode::FirstPerson => CameraMode::ThirdPersonFar,
            CameraMode::ThirdPersonFar => CameraMode::ThirdPersonNear,
        }
    }

    /// Offset from the player in the player's local frame, for the chase
    /// modes.
    fn offset(self) -> Option<Vec3> {
        match self {
            CameraMode::ThirdPersonNear => Some(Vec3::new(4.0, 5.0, 10.0)),
            CameraMode::FirstPerson => None,
            CameraMode::ThirdPersonFar => Some(Vec3::new(0.0, 2.0, 15.0)),
        }
    }
}

/// Day/night phase and camera mode. Advances every tick, crashed or not.
#[derive(Debug, Clone)]
pub struct EnvironmentState {
    /// Accumulated phase; `sin(time_of_day) > 0` means daytime.
    pub time_of_day: f32,
    pub is_day: bool,
    pub camera_mode: CameraMode,
}

impl Default for EnvironmentState {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentState {
    pub fn new() -> Self {
        Self {
            time_of_day: 0.0,
            is_day: true,
            camera_mode: CameraMode::ThirdPersonNear,
        }
    }

    /// Advance the phase one tick and flip day/night on a sign crossing.
    /// The phase advances before the sign is evaluated, so the very first
    /// tick stays in daylight. Returns true if the state flipped.
    pub fn advance_phase(&mut self) -> bool {
        self.time_of_day += PHASE_STEP;
        let cycle = self.time_of_day.sin();
        if cycle > 0.0 && !self.is_day {
            self.is_day = true;
            true
        } else if cycle <= 0.0 && self.is_day {
            self.is_day = false;
            true
        } else {
            false
        }
    }

    /// Manual day/night override. Applied after the natural crossing each
    /// frame, so the key always wins until the next crossing.
    pub fn toggle_day_night(&mut self) {
        self.is_day = !self.is_day;
        log::debug!("day/night toggled: is_day={}", self.is_day);
    }

    pub fn cycle_camera(&mut self) {
        self.camera_mode = self.camera_mode.next();
        log::debug!("camera mode: {:?}", self.camera_mode);
    }

    /// Lighting and atmosphere for the current state of day. Fog is constant.
    pub fn lighting(&self) -> LightingParams {
        let (sun, ambient, sky) = if self.is_day {
            (1.0, 0.7, DAY_SKY)
        } else {
            (0.3, 0.2, NIGHT_SKY)
        };
        LightingParams {
            sun_direction: Vec3::new(1.0, 1.0, 1.0).normalize(),
            sun_intensity: sun,
            ambient_intensity: ambient,
            sky_color: sky,
            fog_color: FOG_COLOR,
            fog_near: FOG_NEAR,
            fog_far: FOG_FAR,
        }
    }

    /// Position and orient the camera for the current mode.
    pub fn apply_camera(&self, player: &Transform, camera: &mut Camera) {
        match self.camera_mode.offset() {
            Some(local_offset) => {
                let offset = player.rotation * local_offset;
                camera.transform.position = player.position + offset;
                camera.look_at(player.position);
            }
            None => {
                camera.transform.position = player.position;
                camera.transform.rotation = player.rotation;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_stays_day() {
        let mut env = EnvironmentState::new();
        assert!(!env.advance_phase());
        assert!(env.is_day);
    }

    #[test]
    fn phase_crossings_flip_day_and_night() {
        let mut env = EnvironmentState::new();
        for _ in 0..1000 {
            env.advance_phase();
        }
        assert!(env.is_day, "sin(1.0) > 0");
        for _ in 0..3000 {
            env.advance_phase();
        }
        assert!(!env.is_day, "sin(4.0) < 0");
        for _ in 0..3000 {
            env.advance_phase();
        }
        assert!(env.is_day, "sin(7.0) > 0");
    }

    #[test]
    fn manual_toggle_wins_until_next_crossing() {
        let mut env = EnvironmentState::new();
        env.toggle_day_night();
        assert!(!env.is_day);

        // Still mid-daytime: the very next tick naturally flips back.
        assert!(env.advance_phase());
        assert!(env.is_day);
    }

    #[test]
    fn camera_modes_cycle_and_wrap() {
        let mut env = EnvironmentState::new();
        assert_eq!(env.camera_mode, CameraMode::ThirdPersonNear);
        env.cycle_camera();
        assert_eq!(env.camera_mode, CameraMode::FirstPerson);
        env.cycle_camera();
        assert_eq!(env.camera_mode, CameraMode::ThirdPersonFar);
        env.cycle_camera();
        assert_eq!(env.camera_mode, CameraMode::ThirdPersonNear);
    }

    #[test]
    fn first_person_adopts_player_pose() {
        let env = EnvironmentState {
            camera_mode: CameraMode::FirstPerson,
            ..EnvironmentState::new()
        };
        let mut player = Transform::from_position(Vec3::new(3.0, 20.0, -7.0));
        player.rotate_local_y(0.5);
        let mut camera = Camera::new(1.0);
        env.apply_camera(&player, &mut camera);
        assert_eq!(camera.transform.position, player.position);
        assert_eq!(camera.transform.rotation, player.rotation);
    }

    #[test]
    fn chase_camera_sits_behind_player() {
        let env = EnvironmentState::new();
        let player = Transform::from_position(Vec3::new(0.0, 10.0, 0.0));
        let mut camera = Camera::new(1.0);
        env.apply_camera(&player, &mut camera);
        // Identity rotation: offset is world-space (4, 5, 10), behind +Z.
        assert_eq!(camera.transform.position, Vec3::new(4.0, 15.0, 10.0));
        // Camera faces the player.
        let to_player = (player.position - camera.transform.position).normalize();
        assert!(camera.transform.forward().dot(to_player) > 0.999);
    }
}
