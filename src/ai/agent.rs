use super::steering::{Steering, SteeringConfig};
use super::targeting::{maybe_fire, TargetingConfig};
use super::{Raycaster, TankBody};
use crate::game_logic::damage::FireCooldown;
use crate::pathfinding::{plan_with_fallback, ArenaGrid, PassabilityPolicy, TileCoord};
use crate::resources::MatchSession;
use bevy::prelude::*;

/// Positions that decide where an agent is heading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Objective {
    pub flag_position: Vec2,
    pub home_position: Vec2,
    pub carrying_flag: bool,
}

impl Objective {
    /// Home while carrying the flag, the flag otherwise
    pub fn goal_tile(&self) -> TileCoord {
        if self.carrying_flag {
            TileCoord::from_position(self.home_position)
        } else {
            TileCoord::from_position(self.flag_position)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentConfig {
    pub steering: SteeringConfig,
    pub targeting: TargetingConfig,
    pub tick_rate: f32,
    pub fire_rate: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            steering: SteeringConfig::default(),
            targeting: TargetingConfig::default(),
            tick_rate: 50.0,
            fire_rate: 2.0,
        }
    }
}

impl AgentConfig {
    pub fn from_session(session: &MatchSession) -> Self {
        let settings = &session.settings;
        Self {
            steering: SteeringConfig {
                min_angle_difference: settings.ai_min_angle_difference.radians(),
                arrival_distance: settings.ai_arrival_distance.get(),
                stall_ticks: settings.ai_stall_ticks,
                backoff_ticks: settings.ai_backoff_ticks,
            },
            targeting: TargetingConfig {
                muzzle_offset: settings.muzzle_offset.get(),
                ray_length: session.ray_length(),
                ray_thickness: settings.ray_thickness.get(),
            },
            tick_rate: settings.tick_rate.get(),
            fire_rate: settings.fire_rate.get(),
        }
    }
}

/// What one `decide` call did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    pub replanned: bool,
    pub path_found: bool,
    pub fired: bool,
}

/// Per-tank controller: plans on goal changes, follows the path and shoots
/// whatever hostile is straight ahead
#[derive(Debug, Clone)]
pub struct Agent {
    player: usize,
    config: AgentConfig,
    steering: Steering,
    last_goal: Option<TileCoord>,
    policy: PassabilityPolicy,
    plan_failed: bool,
    failure_streak: u32,
    cooldown: FireCooldown,
}

impl Agent {
    pub fn new(player: usize, config: AgentConfig) -> Self {
        // tanks jammed against each other must not retry in lockstep
        let mut steering = config.steering;
        steering.backoff_ticks = steering.backoff_ticks.saturating_mul(player as u32 + 1);

        Self {
            player,
            config,
            steering: Steering::new(steering),
            last_goal: None,
            policy: PassabilityPolicy::Strict,
            plan_failed: false,
            failure_streak: 0,
            cooldown: FireCooldown::new(config.tick_rate, config.fire_rate),
        }
    }

    pub fn steering(&self) -> &Steering {
        &self.steering
    }

    pub fn last_goal(&self) -> Option<TileCoord> {
        self.last_goal
    }

    /// Policy of the latest plan; relaxed until a strict plan succeeds again
    pub fn policy(&self) -> PassabilityPolicy {
        self.policy
    }

    /// Run one tick of the controller
    pub fn decide<B, R>(
        &mut self,
        grid: &ArenaGrid,
        objective: &Objective,
        body: &mut B,
        raycaster: &R,
    ) -> TickReport
    where
        B: TankBody + ?Sized,
        R: Raycaster + ?Sized,
    {
        self.cooldown.tick();

        let goal = objective.goal_tile();
        let stalled = self.steering.is_stalled();
        if stalled {
            debug!("Tank {}: stuck on the way to {:?}, replanning", self.player, goal);
        }
        let replanned = self.last_goal != Some(goal) || self.plan_failed || stalled;
        if replanned {
            self.replan(grid, body.pose().position, goal);
        }

        if self.plan_failed {
            body.stop_moving();
            body.stop_turning();
        } else {
            self.steering.step(body);
        }

        let fired = maybe_fire(
            body,
            raycaster,
            &mut self.cooldown,
            &self.config.targeting,
            self.player,
        );
        if fired {
            debug!("Tank {} fired", self.player);
        }

        TickReport {
            replanned,
            path_found: !self.plan_failed,
            fired,
        }
    }

    fn replan(&mut self, grid: &ArenaGrid, position: Vec2, goal: TileCoord) {
        let start = TileCoord::from_position(position);
        let outcome = plan_with_fallback(grid, start, goal);
        self.last_goal = Some(goal);
        self.policy = outcome.policy;

        if !outcome.found() {
            if self.failure_streak == 0 {
                warn!(
                    "Tank {}: no path from {:?} to {:?}, holding position",
                    self.player, start, goal
                );
            }
            self.failure_streak += 1;
            self.plan_failed = true;
            self.steering.reset([]);
            return;
        }

        if self.failure_streak > 0 {
            info!(
                "Tank {}: path found after {} failed attempts",
                self.player, self.failure_streak
            );
        }
        self.failure_streak = 0;
        self.plan_failed = false;

        // the start tile is only worth visiting when we are well off its centre
        let off_centre = position.distance(start.center()) > self.config.steering.arrival_distance;
        let skip = usize::from(outcome.path.len() > 1 && !off_centre);
        debug!(
            "Tank {}: planned {} tiles to {:?} ({:?})",
            self.player,
            outcome.path.len(),
            goal,
            outcome.policy
        );
        self.steering.reset(outcome.path.into_iter().skip(skip));
    }
}
