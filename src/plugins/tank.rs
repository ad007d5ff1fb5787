use super::arena::{BODY_HEIGHT, BULLET_RADIUS};
use super::MatchSet;
use crate::ai::targeting::muzzle_position;
use crate::ai::Pose;
use crate::components::*;
use crate::game_logic::movement::*;
use crate::resources::{MatchSession, TickCounter};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Actuation primitives a manual tank accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TankAction {
    Accelerate,
    Decelerate,
    TurnLeft,
    TurnRight,
    StopMoving,
    StopTurning,
    Fire,
}

/// Drives a tank carrying `ManualControl`; ignored for AI tanks
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankCommand {
    pub player: usize,
    pub action: TankAction,
}

pub struct TankPlugin;

impl Plugin for TankPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TankCommand>()
            .add_systems(
                FixedUpdate,
                (count_ticks, tick_spawn_protection).before(MatchSet::Decide),
            )
            .add_systems(FixedUpdate, apply_tank_commands.in_set(MatchSet::Decide))
            .add_systems(
                FixedUpdate,
                (fire_weapons, apply_tank_motor)
                    .chain()
                    .in_set(MatchSet::Actuate),
            );
    }
}

pub fn tank_pose(transform: &Transform) -> Pose {
    Pose {
        position: world_to_plane(transform.translation),
        angle: plane_angle(transform.rotation),
    }
}

/// Pose a shot leaves from; a snap requested this tick applies before the shot
fn firing_pose(transform: &Transform, controls: &TankControls) -> Pose {
    let pose = tank_pose(transform);
    Pose {
        angle: controls.snap_angle.unwrap_or(pose.angle),
        ..pose
    }
}

fn count_ticks(mut ticks: ResMut<TickCounter>) {
    ticks.0 += 1;
}

fn tick_spawn_protection(mut tanks: Query<&mut SpawnProtection>) {
    for mut protection in tanks.iter_mut() {
        protection.ticks_alive = protection.ticks_alive.saturating_add(1);
    }
}

fn apply_tank_commands(
    mut commands_in: EventReader<TankCommand>,
    mut tanks: Query<(&Tank, &mut TankControls, &mut ManualControl)>,
) {
    for (_, _, mut manual) in tanks.iter_mut() {
        manual.cooldown.tick();
    }

    for command in commands_in.read() {
        let Some((_, mut controls, mut manual)) = tanks
            .iter_mut()
            .find(|(tank, _, _)| tank.player == command.player)
        else {
            debug!("Ignoring {:?} for non-manual tank {}", command.action, command.player);
            continue;
        };

        match command.action {
            TankAction::Accelerate => controls.accelerate(),
            TankAction::Decelerate => controls.decelerate(),
            TankAction::TurnLeft => controls.turn_left(),
            TankAction::TurnRight => controls.turn_right(),
            TankAction::StopMoving => controls.stop_moving(),
            TankAction::StopTurning => controls.stop_turning(),
            TankAction::Fire => {
                if manual.cooldown.try_fire() {
                    controls.fire = true;
                }
            }
        }
    }
}

fn fire_weapons(
    mut commands: Commands,
    session: Res<MatchSession>,
    tanks: Query<(&Tank, &TankStats, &TankControls, &Transform)>,
) {
    let muzzle_offset = session.settings.muzzle_offset.get();

    for (tank, stats, controls, transform) in tanks.iter() {
        if !controls.fire {
            continue;
        }

        let pose = firing_pose(transform, controls);
        let muzzle = muzzle_position(pose, muzzle_offset);
        let velocity = facing_vector(pose.angle) * stats.bullet_speed;

        commands.spawn((
            RoundEntity,
            Bullet {
                shooter: tank.player,
                damage: stats.damage,
            },
            ArenaObject::Bullet {
                shooter: tank.player,
            },
            RigidBody::KinematicVelocityBased,
            Collider::ball(BULLET_RADIUS),
            Sensor,
            ActiveEvents::COLLISION_EVENTS,
            ActiveCollisionTypes::default()
                | ActiveCollisionTypes::KINEMATIC_STATIC
                | ActiveCollisionTypes::KINEMATIC_KINEMATIC,
            Velocity::linear(plane_to_world(velocity, 0.0)),
            Transform::from_translation(plane_to_world(muzzle, BODY_HEIGHT))
                .with_rotation(plane_rotation(pose.angle)),
        ));
        debug!("Tank {} shot from {:?}", tank.player, muzzle);
    }
}

fn apply_tank_motor(
    mut tanks: Query<(
        &mut TankControls,
        &TankStats,
        &mut Transform,
        &mut Velocity,
        Has<CarryingFlag>,
    )>,
) {
    for (mut controls, stats, mut transform, mut velocity, carrying_flag) in tanks.iter_mut() {
        if let Some(angle) = controls.snap_angle {
            transform.rotation = plane_rotation(angle);
        }

        let linear = if controls.halt_movement {
            Vec2::ZERO
        } else {
            world_to_plane(velocity.linvel)
        };
        let angular = if controls.halt_turning {
            0.0
        } else {
            -velocity.angvel.y
        };

        let output = integrate_motor(
            linear,
            angular,
            plane_angle(transform.rotation),
            MotorInput {
                throttle: controls.throttle,
                steer: controls.steer,
            },
            stats.motor_for(carrying_flag),
        );

        velocity.linvel = plane_to_world(output.velocity, 0.0);
        velocity.angvel = Vec3::new(0.0, -output.angular_velocity, 0.0);
        controls.clear_impulses();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_shot_follows_snapped_heading() {
        let transform = Transform::from_translation(plane_to_world(Vec2::new(1.5, 1.5), BODY_HEIGHT))
            .with_rotation(plane_rotation(FRAC_PI_2 - 0.04));
        let controls = TankControls {
            snap_angle: Some(FRAC_PI_2),
            fire: true,
            ..default()
        };

        let pose = firing_pose(&transform, &controls);
        assert_eq!(pose.angle, FRAC_PI_2);
        assert!(pose.position.distance(Vec2::new(1.5, 1.5)) < 1e-5);
        let muzzle = muzzle_position(pose, 0.4);
        assert!(muzzle.distance(Vec2::new(1.1, 1.5)) < 1e-5);
    }

    #[test]
    fn test_shot_without_snap_uses_body_heading() {
        let transform = Transform::default().with_rotation(plane_rotation(0.3));
        let pose = firing_pose(&transform, &TankControls::default());
        assert!((pose.angle - 0.3).abs() < 1e-5);
    }
}
