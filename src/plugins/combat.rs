use super::MatchSet;
use crate::ai::{Agent, AgentConfig};
use crate::components::*;
use crate::game_logic::damage::*;
use crate::game_logic::movement::{plane_rotation, plane_to_world, world_to_plane};
use crate::plugins::arena::BODY_HEIGHT;
use crate::resources::MatchSession;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use std::collections::HashSet;

/// A tank ran out of hit points this tick
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankEliminated {
    pub entity: Entity,
    pub player: usize,
}

pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TankEliminated>().add_systems(
            FixedPostUpdate,
            (resolve_bullet_hits, cull_stray_bullets, reset_eliminated_tanks)
                .chain()
                .in_set(MatchSet::Combat),
        );
    }
}

fn resolve_bullet_hits(
    mut commands: Commands,
    session: Res<MatchSession>,
    mut collisions: EventReader<CollisionEvent>,
    bullets: Query<&Bullet>,
    objects: Query<&ArenaObject>,
    mut targets: Query<(&mut Health, Option<&SpawnProtection>)>,
    mut eliminated: EventWriter<TankEliminated>,
) {
    let protection = session.settings.spawn_protection_ticks;
    let mut spent = HashSet::new();

    for collision in collisions.read() {
        let CollisionEvent::Started(first, second, _) = *collision else {
            continue;
        };

        for (bullet_entity, other) in [(first, second), (second, first)] {
            if spent.contains(&bullet_entity) {
                continue;
            }
            let Ok(bullet) = bullets.get(bullet_entity) else {
                continue;
            };
            let Ok(target) = objects.get(other) else {
                continue;
            };

            match bullet_impact(*target, bullet.shooter) {
                ImpactEffect::PassThrough => continue,
                ImpactEffect::StopBullet => {}
                ImpactEffect::DestroyBoth => {
                    if spent.insert(other) {
                        commands.entity(other).despawn();
                    }
                }
                effect @ (ImpactEffect::DamageTank { .. } | ImpactEffect::DamageBox) => {
                    if spent.contains(&other) {
                        continue;
                    }
                    let Ok((mut health, spawn)) = targets.get_mut(other) else {
                        continue;
                    };
                    let protected = spawn
                        .is_some_and(|spawn| is_spawn_protected(spawn.ticks_alive, protection));
                    let outcome = resolve_hit(health.current, bullet.damage.0, protected);
                    health.apply(outcome);

                    match (effect, outcome) {
                        (ImpactEffect::DamageTank { player }, HitOutcome::Destroyed) => {
                            info!("Tank {player} destroyed by tank {}", bullet.shooter);
                            eliminated.write(TankEliminated {
                                entity: other,
                                player,
                            });
                        }
                        (ImpactEffect::DamageBox, HitOutcome::Destroyed) => {
                            debug!("Wooden box destroyed by tank {}", bullet.shooter);
                            spent.insert(other);
                            commands.entity(other).despawn();
                        }
                        (_, HitOutcome::Absorbed) => {
                            debug!("Hit on spawn-protected tank absorbed");
                        }
                        _ => trace!("Hit for {}, {} left", bullet.damage, *health),
                    }
                }
            }

            spent.insert(bullet_entity);
            commands.entity(bullet_entity).despawn();
        }
    }
}

/// Bullets that slipped past the boundary
fn cull_stray_bullets(
    mut commands: Commands,
    session: Res<MatchSession>,
    bullets: Query<(Entity, &Transform), With<Bullet>>,
) {
    let limit = Vec2::new(session.map.width as f32, session.map.height as f32) + 1.0;
    for (entity, transform) in bullets.iter() {
        let position = world_to_plane(transform.translation);
        if position.cmplt(Vec2::splat(-1.0)).any() || position.cmpgt(limit).any() {
            commands.entity(entity).despawn();
        }
    }
}

/// Drop the flag where the tank died and send it home with fresh state
fn reset_eliminated_tanks(
    mut commands: Commands,
    session: Res<MatchSession>,
    mut events: EventReader<TankEliminated>,
    mut flags: Query<(&mut Flag, &mut Transform), Without<Tank>>,
    mut tanks: Query<(
        &Tank,
        &mut Transform,
        &mut Velocity,
        &mut Health,
        &mut SpawnProtection,
        &mut TankControls,
        Option<&mut AiController>,
        Has<CarryingFlag>,
    )>,
) {
    for event in events.read() {
        let Ok((
            tank,
            mut transform,
            mut velocity,
            mut health,
            mut spawn,
            mut controls,
            controller,
            carrying_flag,
        )) = tanks.get_mut(event.entity)
        else {
            continue;
        };
        if !health.is_depleted() {
            continue;
        }

        if carrying_flag {
            let dropped_at = world_to_plane(transform.translation);
            for (mut flag, mut flag_transform) in flags.iter_mut() {
                flag.carrier = None;
                flag_transform.translation = plane_to_world(dropped_at, BODY_HEIGHT);
            }
            commands.entity(event.entity).remove::<CarryingFlag>();
            info!("Tank {} dropped the flag at {:?}", tank.player, dropped_at);
        }

        transform.translation = plane_to_world(tank.home, BODY_HEIGHT);
        transform.rotation = plane_rotation(tank.home_angle);
        *velocity = Velocity::zero();
        health.restore_full();
        *spawn = SpawnProtection::default();
        *controls = TankControls::default();
        if let Some(mut controller) = controller {
            controller.agent = Agent::new(tank.player, AgentConfig::from_session(&session));
        }
    }
}
