//! Flight model: per-tick rotation, throttle, and gravity integration.

use glam::Vec3;
use input::InputState;

use crate::state::PlayerState;

/// Radians of rotation per fixed tick while a turn key is held.
pub const TURN_RATE: f32 = 0.01;
/// Speed change per fixed tick while a throttle key is held.
pub const THROTTLE_STEP: f32 = 0.001;
pub const MIN_SPEED: f32 = 0.0;
pub const MAX_SPEED: f32 = 0.2;
/// Constant altitude loss per fixed tick, world units.
pub const GRAVITY_PER_TICK: f32 = 0.01;
/// The plane never sinks below this altitude (resting on its landing gear).
pub const MIN_ALTITUDE: f32 = 0.9;
/// Start of the runway, facing down it.
pub const SPAWN_POSITION: Vec3 = Vec3::new(0.0, MIN_ALTITUDE, 40.0);

/// Control axes sampled once per tick. Axes are -1, 0, or +1.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlightInputs {
    pub roll: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub throttle_up: bool,
    pub throttle_down: bool,
}

impl FlightInputs {
    pub fn sample(input: &InputState) -> Self {
        Self {
            roll: input.roll_input(),
            pitch: input.pitch_input(),
            yaw: input.yaw_input(),
            throttle_up: input.throttle_up_held(),
            throttle_down: input.throttle_down_held(),
        }
    }
}

/// Advance the player one fixed tick.
///
/// Order matters: rotate, adjust throttle, translate along the new forward
/// vector, apply gravity, clamp to the floor. Unheld axes leave rotation and
/// speed untouched (zero-order hold).
pub fn integrate(player: &mut PlayerState, inputs: &FlightInputs) {
    if inputs.roll != 0.0 {
        player.transform.rotate_local_z(inputs.roll * TURN_RATE);
    }
    if inputs.pitch != 0.0 {
        player.transform.rotate_local_x(inputs.pitch * TURN_RATE);
    }
    if inputs.yaw != 0.0 {
        player.transform.rotate_local_y(inputs.yaw * TURN_RATE);
    }

    if inputs.throttle_up {
        player.speed = (player.speed + THROTTLE_STEP).min(MAX_SPEED);
    }
    if inputs.throttle_down {
        player.speed = (player.speed - THROTTLE_STEP).max(MIN_SPEED);
    }

    let forward = player.transform.forward();
    player.transform.position += forward * player.speed;
    player.transform.position.y -= GRAVITY_PER_TICK;
    if player.transform.position.y < MIN_ALTITUDE {
        player.transform.position.y = MIN_ALTITUDE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_player() -> PlayerState {
        PlayerState::spawn()
    }

    #[test]
    fn throttle_clamps_at_max() {
        let mut player = grounded_player();
        let inputs = FlightInputs {
            throttle_up: true,
            ..Default::default()
        };
        for _ in 0..500 {
            integrate(&mut player, &inputs);
        }
        assert_eq!(player.speed, MAX_SPEED);
    }

    #[test]
    fn throttle_clamps_at_zero() {
        let mut player = grounded_player();
        let inputs = FlightInputs {
            throttle_down: true,
            ..Default::default()
        };
        integrate(&mut player, &inputs);
        assert_eq!(player.speed, MIN_SPEED);
    }

    #[test]
    fn floor_clamp_holds_grounded_plane() {
        let mut player = grounded_player();
        let idle = FlightInputs::default();
        for _ in 0..100 {
            integrate(&mut player, &idle);
        }
        assert_eq!(player.transform.position.y, MIN_ALTITUDE);
    }

    #[test]
    fn gravity_sinks_airborne_plane() {
        let mut player = grounded_player();
        player.transform.position.y = 50.0;
        let idle = FlightInputs::default();
        integrate(&mut player, &idle);
        assert!((player.transform.position.y - (50.0 - GRAVITY_PER_TICK)).abs() < 1e-6);
    }

    #[test]
    fn speed_holds_when_no_throttle_input() {
        let mut player = grounded_player();
        player.speed = 0.1;
        player.transform.position.y = 50.0;
        let idle = FlightInputs::default();
        integrate(&mut player, &idle);
        assert_eq!(player.speed, 0.1);
    }

    #[test]
    fn forward_motion_follows_heading() {
        let mut player = grounded_player();
        player.speed = MAX_SPEED;
        player.transform.position.y = 50.0;
        let idle = FlightInputs::default();
        integrate(&mut player, &idle);
        // Default heading is -Z.
        assert!(player.transform.position.z < SPAWN_POSITION.z);
        assert_eq!(player.transform.position.x, 0.0);
    }

    #[test]
    fn roll_rotates_around_local_forward() {
        let mut player = grounded_player();
        let inputs = FlightInputs {
            roll: 1.0,
            ..Default::default()
        };
        let forward_before = player.transform.forward();
        integrate(&mut player, &inputs);
        let forward_after = player.transform.forward();
        assert!(forward_before.dot(forward_after) > 0.999);
    }
}
