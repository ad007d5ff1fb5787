use crate::ai::{Agent, AgentConfig};
use crate::components::*;
use crate::game_logic::damage::FireCooldown;
use crate::game_logic::movement::{plane_rotation, plane_to_world};
use crate::pathfinding::TileCoord;
use crate::resources::MatchSession;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Height of every body centre above the ground plane
pub const BODY_HEIGHT: f32 = 0.5;
pub const TANK_HALF_EXTENT: f32 = 0.25;
pub const BULLET_RADIUS: f32 = 0.05;
const BOUNDARY_THICKNESS: f32 = 0.5;

pub struct ArenaPlugin;

impl Plugin for ArenaPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, start_match);
    }
}

fn start_match(mut commands: Commands, session: Res<MatchSession>) {
    info!(
        "Starting match on {} ({}x{}, {} tanks, {} manual)",
        session.map.name,
        session.map.width,
        session.map.height,
        session.map.start_positions.len(),
        session.settings.manual_tanks.min(session.map.start_positions.len())
    );
    spawn_round(&mut commands, &session);
}

/// Despawn everything from the current round and lay out a fresh one
pub fn restart_round(
    commands: &mut Commands,
    session: &MatchSession,
    round_entities: impl IntoIterator<Item = Entity>,
) {
    for entity in round_entities {
        commands.entity(entity).despawn();
    }
    spawn_round(commands, session);
}

/// Spawn boundary, boxes, tanks, home bases and the flag
pub fn spawn_round(commands: &mut Commands, session: &MatchSession) {
    let map = &session.map;
    let settings = &session.settings;

    spawn_boundary(commands, map.width as f32, map.height as f32);

    let mut box_count = 0;
    for (tile, cell) in map.obstacles() {
        if let Some(material) = ObstacleMaterial::from_cell(cell) {
            spawn_obstacle(commands, tile, material, settings.box_hit_points.get());
            box_count += 1;
        }
    }

    let stats = TankStats::from_settings(settings);
    let agent_config = AgentConfig::from_session(session);
    for (player, spawn) in map.start_positions.iter().enumerate() {
        commands.spawn((
            RoundEntity,
            HomeBase { player },
            Transform::from_translation(plane_to_world(spawn.position(), 0.0)),
        ));

        let mut tank = commands.spawn((
            RoundEntity,
            Tank {
                player,
                home: spawn.position(),
                home_angle: spawn.angle(),
            },
            stats,
            TankControls::default(),
            Health::new_full(settings.tank_hit_points.get()),
            SpawnProtection::default(),
            ArenaObject::Tank { player },
            tank_physics(settings.linear_damping.get()),
            Transform::from_translation(plane_to_world(spawn.position(), BODY_HEIGHT))
                .with_rotation(plane_rotation(spawn.angle())),
        ));

        if session.is_manual(player) {
            tank.insert(ManualControl {
                cooldown: FireCooldown::new(settings.tick_rate.get(), settings.fire_rate.get()),
            });
        } else {
            tank.insert(AiController {
                agent: Agent::new(player, agent_config),
            });
        }
    }

    commands.spawn((
        RoundEntity,
        Flag::default(),
        Transform::from_translation(plane_to_world(map.flag_position(), BODY_HEIGHT)),
    ));

    debug!(
        "Spawned round: {box_count} boxes, {} tanks",
        map.start_positions.len()
    );
}

fn tank_physics(linear_damping: f32) -> impl Bundle {
    (
        RigidBody::Dynamic,
        Collider::cuboid(TANK_HALF_EXTENT, TANK_HALF_EXTENT, TANK_HALF_EXTENT),
        LockedAxes::ROTATION_LOCKED_X | LockedAxes::ROTATION_LOCKED_Z | LockedAxes::TRANSLATION_LOCKED_Y,
        GravityScale(0.0),
        Damping {
            linear_damping,
            angular_damping: linear_damping,
        },
        Velocity::zero(),
    )
}

fn spawn_obstacle(commands: &mut Commands, tile: TileCoord, material: ObstacleMaterial, hit_points: u32) {
    let transform = Transform::from_translation(plane_to_world(tile.center(), BODY_HEIGHT));
    let mut entity = commands.spawn((
        RoundEntity,
        ArenaObject::Obstacle { material },
        Collider::cuboid(0.5, 0.5, 0.5),
        transform,
    ));

    if material.is_movable() {
        // metal is heavier and harder to shove
        let density = if material == ObstacleMaterial::Metal { 4.0 } else { 1.0 };
        entity.insert((
            RigidBody::Dynamic,
            ColliderMassProperties::Density(density),
            LockedAxes::ROTATION_LOCKED | LockedAxes::TRANSLATION_LOCKED_Y,
            GravityScale(0.0),
            Damping {
                linear_damping: 5.0,
                angular_damping: 5.0,
            },
            Velocity::zero(),
        ));
    } else {
        entity.insert(RigidBody::Fixed);
    }

    if material == ObstacleMaterial::Wood {
        entity.insert(Health::new_full(hit_points));
    }
}

fn spawn_boundary(commands: &mut Commands, width: f32, height: f32) {
    let half = BOUNDARY_THICKNESS / 2.0;
    let walls = [
        // left and right
        (Vec2::new(-half, height / 2.0), Vec2::new(half, height / 2.0 + BOUNDARY_THICKNESS)),
        (Vec2::new(width + half, height / 2.0), Vec2::new(half, height / 2.0 + BOUNDARY_THICKNESS)),
        // bottom and top
        (Vec2::new(width / 2.0, -half), Vec2::new(width / 2.0 + BOUNDARY_THICKNESS, half)),
        (Vec2::new(width / 2.0, height + half), Vec2::new(width / 2.0 + BOUNDARY_THICKNESS, half)),
    ];

    for (center, half_extents) in walls {
        commands.spawn((
            RoundEntity,
            ArenaObject::Boundary,
            RigidBody::Fixed,
            Collider::cuboid(half_extents.x, BODY_HEIGHT, half_extents.y),
            Transform::from_translation(plane_to_world(center, BODY_HEIGHT)),
        ));
    }
}
