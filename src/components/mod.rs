use crate::ai::Agent;
use crate::game_logic::damage::{FireCooldown, HitOutcome};
use crate::game_logic::movement::MotorStats;
use crate::map::CellType;
use crate::resources::GameSettings;
use bevy::prelude::*;
use derive_more::{Add, Display, From};

/// Hit points of a tank or a wooden box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Add, Display, From)]
pub struct Damage(pub u32);

impl Health {
    pub fn new_full(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_depleted(self) -> bool {
        self.current == 0
    }

    pub fn restore_full(&mut self) {
        self.current = self.max;
    }

    /// Store the remaining hit points of a resolved hit
    pub fn apply(&mut self, outcome: HitOutcome) {
        match outcome {
            HitOutcome::Absorbed => {}
            HitOutcome::Damaged { remaining } => self.current = remaining.min(self.max),
            HitOutcome::Destroyed => self.current = 0,
        }
    }
}

impl std::fmt::Display for Health {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleMaterial {
    /// Static, indestructible
    Rock,
    /// Movable, destructible
    Wood,
    /// Movable, indestructible
    Metal,
}

impl ObstacleMaterial {
    pub fn from_cell(cell: CellType) -> Option<Self> {
        match cell {
            CellType::Open => None,
            CellType::Wall => Some(ObstacleMaterial::Rock),
            CellType::Destructible => Some(ObstacleMaterial::Wood),
            CellType::Pushable => Some(ObstacleMaterial::Metal),
        }
    }

    pub fn is_movable(self) -> bool {
        !matches!(self, ObstacleMaterial::Rock)
    }
}

/// Tag carried by every collider in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub enum ArenaObject {
    Tank { player: usize },
    Obstacle { material: ObstacleMaterial },
    Bullet { shooter: usize },
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Tank {
    pub player: usize,
    /// Start position, also the home base
    pub home: Vec2,
    pub home_angle: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct TankStats {
    pub motor: MotorStats,
    pub flag_speed_factor: f32,
    pub bullet_speed: f32,
    pub damage: Damage,
}

impl TankStats {
    pub fn from_settings(settings: &GameSettings) -> Self {
        Self {
            motor: MotorStats {
                acceleration: settings.tank_acceleration.get(),
                max_speed: settings.tank_max_speed.get(),
                rotation_speed: settings.tank_rotation_speed,
                max_turn_rate: settings.tank_turn_rate.get(),
            },
            flag_speed_factor: settings.tank_flag_speed_factor,
            bullet_speed: settings.bullet_speed.get(),
            damage: Damage(settings.tank_weapon_damage.get()),
        }
    }

    /// Motor limits, slower while hauling the flag
    pub fn motor_for(&self, carrying_flag: bool) -> MotorStats {
        MotorStats {
            max_speed: crate::game_logic::carrier_max_speed(
                self.motor.max_speed,
                self.flag_speed_factor,
                carrying_flag,
            ),
            ..self.motor
        }
    }
}

/// Actuation requested for the next motor update
#[derive(Debug, Clone, Copy, PartialEq, Default, Component)]
pub struct TankControls {
    pub throttle: f32,
    pub steer: f32,
    /// Zero the linear velocity before applying throttle
    pub halt_movement: bool,
    /// Zero the angular velocity before applying steering
    pub halt_turning: bool,
    pub snap_angle: Option<f32>,
    pub fire: bool,
}

impl TankControls {
    pub fn accelerate(&mut self) {
        self.throttle = 1.0;
    }

    pub fn decelerate(&mut self) {
        self.throttle = -1.0;
    }

    pub fn turn_left(&mut self) {
        self.steer = -1.0;
    }

    pub fn turn_right(&mut self) {
        self.steer = 1.0;
    }

    pub fn stop_moving(&mut self) {
        self.throttle = 0.0;
        self.halt_movement = true;
    }

    pub fn stop_turning(&mut self) {
        self.steer = 0.0;
        self.halt_turning = true;
    }

    /// Clear the one-shot requests once the motor has consumed them
    pub fn clear_impulses(&mut self) {
        self.halt_movement = false;
        self.halt_turning = false;
        self.snap_angle = None;
        self.fire = false;
    }
}

/// Ticks since the tank (re)spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Component)]
pub struct SpawnProtection {
    pub ticks_alive: u32,
}

/// Marks the tank currently hauling the flag
#[derive(Debug, Clone, Copy, Component)]
pub struct CarryingFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Component)]
pub struct Flag {
    pub carrier: Option<Entity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct HomeBase {
    pub player: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Bullet {
    pub shooter: usize,
    pub damage: Damage,
}

/// Tank driven by the autonomous agent
#[derive(Debug, Component)]
pub struct AiController {
    pub agent: Agent,
}

/// Tank driven by `TankCommand` events
#[derive(Debug, Clone, Copy, Component)]
pub struct ManualControl {
    pub cooldown: FireCooldown,
}

/// Despawned when a round ends
#[derive(Debug, Clone, Copy, Component)]
pub struct RoundEntity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_applies_outcomes() {
        let mut health = Health::new_full(4);
        health.apply(HitOutcome::Damaged { remaining: 3 });
        assert_eq!(health.current, 3);
        health.apply(HitOutcome::Absorbed);
        assert_eq!(health.current, 3);
        health.apply(HitOutcome::Destroyed);
        assert!(health.is_depleted());
        health.restore_full();
        assert_eq!(health.to_string(), "4/4");
    }

    #[test]
    fn test_material_from_cell() {
        assert_eq!(ObstacleMaterial::from_cell(CellType::Open), None);
        assert_eq!(
            ObstacleMaterial::from_cell(CellType::Wall),
            Some(ObstacleMaterial::Rock)
        );
        assert!(!ObstacleMaterial::Rock.is_movable());
        assert!(ObstacleMaterial::Wood.is_movable());
        assert!(ObstacleMaterial::Metal.is_movable());
    }

    #[test]
    fn test_stats_from_settings() {
        let stats = TankStats::from_settings(&GameSettings::default());
        assert_eq!(stats.motor.max_speed, 2.0);
        assert_eq!(stats.motor_for(true).max_speed, 1.0);
        assert_eq!(stats.motor_for(false).acceleration, 0.4);
        assert_eq!(stats.damage, Damage(1));
    }

    #[test]
    fn test_controls_impulses() {
        let mut controls = TankControls::default();
        controls.accelerate();
        controls.turn_left();
        controls.stop_moving();
        assert_eq!(controls.throttle, 0.0);
        assert_eq!(controls.steer, -1.0);
        assert!(controls.halt_movement);

        controls.clear_impulses();
        assert!(!controls.halt_movement);
        assert_eq!(controls.steer, -1.0);
    }
}
