use super::TankBody;
use crate::game_logic::movement::{angular_gap, bearing, periodic_difference, should_turn_left};
use crate::pathfinding::TileCoord;
use bevy::prelude::*;
use std::collections::VecDeque;

/// Smallest improvement in distance (tiles) or heading gap (radians) that
/// counts as progress
const MIN_PROGRESS: f32 = 0.01;

/// Thresholds for the path follower, tuned to the tick rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteeringConfig {
    /// Radians; slightly more than one tick of turning
    pub min_angle_difference: f32,
    /// Tiles
    pub arrival_distance: f32,
    /// Ticks without progress before the body counts as stuck
    pub stall_ticks: u32,
    /// Ticks spent reversing out of a stall
    pub backoff_ticks: u32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            min_angle_difference: 3.0_f32.to_radians(),
            arrival_distance: 0.25,
            stall_ticks: 30,
            backoff_ticks: 12,
        }
    }
}

/// Best measurement seen while closing in on a target and how many ticks
/// ago it last improved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    best: f32,
    stale_ticks: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            best: f32::INFINITY,
            stale_ticks: 0,
        }
    }
}

impl Progress {
    fn observe(&mut self, value: f32) {
        if value < self.best - MIN_PROGRESS {
            self.best = value;
            self.stale_ticks = 0;
        } else {
            self.stale_ticks += 1;
        }
    }

    fn is_stalled(&self, limit: u32) -> bool {
        self.stale_ticks >= limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SteeringState {
    Idle,
    Aligning {
        target: Vec2,
        angle: f32,
        progress: Progress,
    },
    Translating {
        target: Vec2,
        ticks: u32,
        /// Distance samples, taken every other tick
        previous_sample: Option<f32>,
        latest_sample: Option<f32>,
        progress: Progress,
    },
    /// Backing away from whatever blocked the last waypoint
    Reversing { ticks_left: u32 },
    /// Gave up on the path; holds until the next `reset`
    Stalled,
    Arrived,
}

/// Drives a body along tile waypoints: turn in place, then drive to the
/// tile centre, one evaluation per tick
#[derive(Debug, Clone)]
pub struct Steering {
    state: SteeringState,
    waypoints: VecDeque<TileCoord>,
    config: SteeringConfig,
}

impl Steering {
    pub fn new(config: SteeringConfig) -> Self {
        Self {
            state: SteeringState::Idle,
            waypoints: VecDeque::new(),
            config,
        }
    }

    pub fn state(&self) -> SteeringState {
        self.state
    }

    pub fn waypoints(&self) -> &VecDeque<TileCoord> {
        &self.waypoints
    }

    /// Replace the path and drop any in-flight alignment or translation
    pub fn reset(&mut self, path: impl IntoIterator<Item = TileCoord>) {
        self.waypoints = path.into_iter().collect();
        self.state = SteeringState::Idle;
    }

    /// True once the last waypoint has been reached
    pub fn is_finished(&self) -> bool {
        self.waypoints.is_empty() && matches!(self.state, SteeringState::Arrived)
    }

    pub fn is_stalled(&self) -> bool {
        matches!(self.state, SteeringState::Stalled)
    }

    fn next_waypoint(&mut self, position: Vec2) -> Option<SteeringState> {
        self.waypoints.pop_front().map(|tile| {
            let target = tile.center();
            SteeringState::Aligning {
                target,
                angle: bearing(position, target),
                progress: Progress::default(),
            }
        })
    }

    fn start_reversing<B: TankBody + ?Sized>(&self, body: &mut B) -> SteeringState {
        body.stop_turning();
        body.decelerate();
        SteeringState::Reversing {
            ticks_left: self.config.backoff_ticks,
        }
    }

    /// Evaluate the current state once
    pub fn step<B: TankBody + ?Sized>(&mut self, body: &mut B) -> SteeringState {
        let pose = body.pose();

        self.state = match self.state {
            SteeringState::Idle => match self.next_waypoint(pose.position) {
                Some(aligning) => {
                    // turning happens in place
                    body.stop_moving();
                    aligning
                }
                None => {
                    body.stop_moving();
                    body.stop_turning();
                    SteeringState::Idle
                }
            },
            SteeringState::Aligning {
                target,
                angle,
                mut progress,
            } => {
                let difference = periodic_difference(pose.angle, angle);
                let gap = angular_gap(difference);
                progress.observe(gap);

                if gap < self.config.min_angle_difference {
                    body.stop_turning();
                    body.snap_angle(angle);
                    SteeringState::Translating {
                        target,
                        ticks: 0,
                        previous_sample: None,
                        latest_sample: None,
                        progress: Progress::default(),
                    }
                } else if progress.is_stalled(self.config.stall_ticks) {
                    debug!("Turn towards {target:?} blocked, backing off");
                    self.start_reversing(body)
                } else {
                    if should_turn_left(difference) {
                        body.turn_left();
                    } else {
                        body.turn_right();
                    }
                    SteeringState::Aligning {
                        target,
                        angle,
                        progress,
                    }
                }
            }
            SteeringState::Translating {
                target,
                ticks,
                mut previous_sample,
                mut latest_sample,
                mut progress,
            } => {
                let distance = pose.position.distance(target);
                progress.observe(distance);

                if ticks % 2 == 0 {
                    previous_sample = latest_sample;
                    latest_sample = Some(distance);
                }

                let arrived = match (previous_sample, latest_sample) {
                    (Some(previous), Some(latest)) if ticks % 2 == 0 => {
                        // close enough and no longer closing in
                        latest < self.config.arrival_distance && latest >= previous
                    }
                    _ => false,
                };

                if arrived {
                    body.stop_moving();
                    SteeringState::Arrived
                } else if progress.is_stalled(self.config.stall_ticks) {
                    debug!("Stuck {distance:.2} tiles short of {target:?}, backing off");
                    self.start_reversing(body)
                } else {
                    body.accelerate();
                    SteeringState::Translating {
                        target,
                        ticks: ticks + 1,
                        previous_sample,
                        latest_sample,
                        progress,
                    }
                }
            }
            SteeringState::Reversing { ticks_left } => {
                if ticks_left <= 1 {
                    body.stop_moving();
                    self.waypoints.clear();
                    SteeringState::Stalled
                } else {
                    body.decelerate();
                    SteeringState::Reversing {
                        ticks_left: ticks_left - 1,
                    }
                }
            }
            SteeringState::Stalled => {
                body.stop_moving();
                body.stop_turning();
                SteeringState::Stalled
            }
            SteeringState::Arrived => self
                .next_waypoint(pose.position)
                .unwrap_or(SteeringState::Arrived),
        };

        self.state
    }
}
