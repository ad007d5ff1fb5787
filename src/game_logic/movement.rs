use bevy::prelude::*;
use std::f32::consts::{PI, TAU};

// Plane convention: angle 0 faces +y and positive angles rotate towards -x.

/// Unit vector a body with the given angle is facing
pub fn facing_vector(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}

/// Angle a body at `from` must have to face `to`
pub fn bearing(from: Vec2, to: Vec2) -> f32 {
    let delta = to - from;
    (-delta.x).atan2(delta.y)
}

/// Difference of two angles after reducing both to `[0, 2π)`; lies in `(-2π, 2π)`
pub fn periodic_difference(angle: f32, other: f32) -> f32 {
    angle.rem_euclid(TAU) - other.rem_euclid(TAU)
}

/// Shorter turning direction for a difference produced by [`periodic_difference`]
pub fn should_turn_left(difference: f32) -> bool {
    (difference > 0.0 && difference < PI) || (difference > -TAU && difference < -PI)
}

/// Absolute angular gap, always in `[0, π]`
pub fn angular_gap(difference: f32) -> f32 {
    let gap = difference.abs().rem_euclid(TAU);
    gap.min(TAU - gap)
}

/// Maps an angle from the arena plane onto a rotation about the world up axis
pub fn plane_rotation(angle: f32) -> Quat {
    Quat::from_rotation_y(-angle)
}

/// Inverse of [`plane_rotation`]
pub fn plane_angle(rotation: Quat) -> f32 {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    -yaw
}

/// Arena plane `(x, y)` to world `(x, height, y)`
pub fn plane_to_world(position: Vec2, height: f32) -> Vec3 {
    Vec3::new(position.x, height, position.y)
}

pub fn world_to_plane(position: Vec3) -> Vec2 {
    Vec2::new(position.x, position.z)
}

/// Tank drive parameters, per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorStats {
    pub acceleration: f32,
    pub max_speed: f32,
    pub rotation_speed: f32,
    pub max_turn_rate: f32,
}

impl Default for MotorStats {
    fn default() -> Self {
        Self {
            acceleration: 0.4,
            max_speed: 2.0,
            rotation_speed: 3.0,
            max_turn_rate: 2.0,
        }
    }
}

/// Throttle and steering requested for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotorInput {
    /// 1 forward, -1 backward, 0 coast
    pub throttle: f32,
    /// -1 left, 1 right, 0 none
    pub steer: f32,
}

/// Result of one motor update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotorOutput {
    pub velocity: Vec2,
    pub angular_velocity: f32,
}

/// Apply one tick of throttle and steering to the current body velocities
///
/// Turning left decreases the angle. Both speeds are clamped to the stats.
pub fn integrate_motor(
    velocity: Vec2,
    angular_velocity: f32,
    angle: f32,
    input: MotorInput,
    stats: MotorStats,
) -> MotorOutput {
    let pushed = velocity + facing_vector(angle) * stats.acceleration * 2.0 * input.throttle;
    let spun = angular_velocity + stats.rotation_speed * stats.acceleration * input.steer;

    MotorOutput {
        velocity: pushed.clamp_length_max(stats.max_speed),
        angular_velocity: spun.clamp(-stats.max_turn_rate, stats.max_turn_rate),
    }
}
