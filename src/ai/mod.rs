//! Autonomous tank controller: path following, target acquisition and the
//! per-tick orchestration tying them to the arena grid.
//!
//! The controller never touches the physics world directly. It reads the body
//! pose and issues actuation through [`TankBody`], and sees the world through
//! [`Raycaster`]. The Bevy adapters live in `plugins::ai`.

use crate::components::ArenaObject;
use bevy::prelude::*;

pub mod agent;
pub mod steering;
pub mod targeting;

pub use agent::*;
pub use steering::*;
pub use targeting::*;

/// Position and heading of a body in the arena plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

/// Actuation primitives of a controlled tank
pub trait TankBody {
    fn pose(&self) -> Pose;
    fn accelerate(&mut self);
    fn decelerate(&mut self);
    fn turn_left(&mut self);
    fn turn_right(&mut self);
    /// Zero velocity and throttle
    fn stop_moving(&mut self);
    /// Zero angular velocity and steering
    fn stop_turning(&mut self);
    fn snap_angle(&mut self, angle: f32);
    /// Spawn a projectile; the caller has already checked the cooldown
    fn fire(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    pub object: ArenaObject,
    pub distance: f32,
}

/// Thick segment query against the arena
pub trait Raycaster {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        thickness: f32,
    ) -> Option<RaycastHit>;
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::game_logic::movement::{integrate_motor, MotorInput, MotorStats};

    /// Point-mass tank integrated with the same motor as the arena
    #[derive(Debug, Clone)]
    pub struct SimBody {
        pub pose: Pose,
        pub velocity: Vec2,
        pub angular_velocity: f32,
        pub input: MotorInput,
        pub stats: MotorStats,
        pub delta: f32,
        pub shots: u32,
        /// Pinned in place as if wedged against something
        pub blocked: bool,
    }

    impl SimBody {
        pub fn at(position: Vec2, angle: f32) -> Self {
            Self {
                pose: Pose { position, angle },
                velocity: Vec2::ZERO,
                angular_velocity: 0.0,
                input: MotorInput::default(),
                stats: MotorStats::default(),
                delta: 1.0 / 50.0,
                shots: 0,
                blocked: false,
            }
        }

        /// One physics tick
        pub fn advance(&mut self) {
            if self.blocked {
                self.velocity = Vec2::ZERO;
                self.angular_velocity = 0.0;
                return;
            }
            let output = integrate_motor(
                self.velocity,
                self.angular_velocity,
                self.pose.angle,
                self.input,
                self.stats,
            );
            self.velocity = output.velocity;
            self.angular_velocity = output.angular_velocity;
            self.pose.position += self.velocity * self.delta;
            self.pose.angle += self.angular_velocity * self.delta;
        }
    }

    impl TankBody for SimBody {
        fn pose(&self) -> Pose {
            self.pose
        }

        fn accelerate(&mut self) {
            self.input.throttle = 1.0;
        }

        fn decelerate(&mut self) {
            self.input.throttle = -1.0;
        }

        fn turn_left(&mut self) {
            self.input.steer = -1.0;
        }

        fn turn_right(&mut self) {
            self.input.steer = 1.0;
        }

        fn stop_moving(&mut self) {
            self.input.throttle = 0.0;
            self.velocity = Vec2::ZERO;
        }

        fn stop_turning(&mut self) {
            self.input.steer = 0.0;
            self.angular_velocity = 0.0;
        }

        fn snap_angle(&mut self, angle: f32) {
            self.pose.angle = angle;
        }

        fn fire(&mut self) {
            self.shots += 1;
        }
    }

    /// Returns the same hit for every query
    #[derive(Debug, Clone, Copy, Default)]
    pub struct FixedRaycaster {
        pub hit: Option<RaycastHit>,
    }

    impl FixedRaycaster {
        pub fn seeing(object: ArenaObject) -> Self {
            Self {
                hit: Some(RaycastHit {
                    object,
                    distance: 3.0,
                }),
            }
        }
    }

    impl Raycaster for FixedRaycaster {
        fn raycast(&self, _: Vec2, _: Vec2, max_distance: f32, _: f32) -> Option<RaycastHit> {
            self.hit.filter(|hit| hit.distance <= max_distance)
        }
    }
}
