use super::arena::BODY_HEIGHT;
use super::tank::tank_pose;
use super::MatchSet;
use crate::ai::{Objective, Pose, RaycastHit, Raycaster, TankBody};
use crate::components::*;
use crate::game_logic::movement::plane_to_world;
use crate::resources::MatchSession;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub struct AiPlugin;

impl Plugin for AiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, drive_ai_tanks.in_set(MatchSet::Decide));
    }
}

/// Agent view of a tank: pose from the last physics step, actuation queued
/// into `TankControls`
pub struct ArenaTankBody<'a> {
    pub pose: Pose,
    pub controls: &'a mut TankControls,
}

impl TankBody for ArenaTankBody<'_> {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn accelerate(&mut self) {
        self.controls.accelerate();
    }

    fn decelerate(&mut self) {
        self.controls.decelerate();
    }

    fn turn_left(&mut self) {
        self.controls.turn_left();
    }

    fn turn_right(&mut self) {
        self.controls.turn_right();
    }

    fn stop_moving(&mut self) {
        self.controls.stop_moving();
    }

    fn stop_turning(&mut self) {
        self.controls.stop_turning();
    }

    fn snap_angle(&mut self, angle: f32) {
        self.controls.snap_angle = Some(angle);
        self.pose.angle = angle;
    }

    fn fire(&mut self) {
        self.controls.fire = true;
    }
}

/// Thick ray built from three parallel Rapier rays, ignoring the caster
pub struct RapierRaycaster<'a, 'c, F> {
    pub context: &'a RapierContext<'c>,
    pub tag_of: F,
    pub exclude: Entity,
}

impl<F> Raycaster for RapierRaycaster<'_, '_, F>
where
    F: Fn(Entity) -> Option<ArenaObject>,
{
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        thickness: f32,
    ) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }
        let lateral = direction.perp() * thickness;

        [Vec2::ZERO, lateral, -lateral]
            .into_iter()
            .filter_map(|offset| {
                self.context.cast_ray(
                    plane_to_world(origin + offset, BODY_HEIGHT),
                    plane_to_world(direction, 0.0),
                    max_distance,
                    true,
                    QueryFilter::new().exclude_rigid_body(self.exclude),
                )
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .and_then(|(entity, distance)| {
                (self.tag_of)(entity).map(|object| RaycastHit { object, distance })
            })
    }
}

fn drive_ai_tanks(
    session: Res<MatchSession>,
    rapier: ReadRapierContext,
    objects: Query<&ArenaObject>,
    flags: Query<&Transform, (With<Flag>, Without<Tank>)>,
    mut tanks: Query<(
        Entity,
        &Tank,
        &Transform,
        &mut TankControls,
        &mut AiController,
        Has<CarryingFlag>,
    )>,
) {
    let Ok(context) = rapier.single() else {
        return;
    };
    let Some(flag_position) = flags
        .iter()
        .next()
        .map(|transform| tank_pose(transform).position)
    else {
        return;
    };

    // fixed evaluation order keeps matches reproducible
    let mut order: Vec<(usize, Entity)> = tanks
        .iter()
        .map(|(entity, tank, ..)| (tank.player, entity))
        .collect();
    order.sort_unstable();

    for (_, entity) in order {
        let Ok((entity, tank, transform, mut controls, mut controller, carrying_flag)) =
            tanks.get_mut(entity)
        else {
            continue;
        };

        let objective = Objective {
            flag_position,
            home_position: tank.home,
            carrying_flag,
        };
        let raycaster = RapierRaycaster {
            context: &context,
            tag_of: |hit: Entity| objects.get(hit).ok().copied(),
            exclude: entity,
        };
        let mut body = ArenaTankBody {
            pose: tank_pose(transform),
            controls: &mut *controls,
        };

        let report = controller
            .agent
            .decide(&session.grid, &objective, &mut body, &raycaster);
        if report.replanned {
            trace!("Tank {} replanned: {:?}", tank.player, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_body_queues_actuation() {
        let mut controls = TankControls::default();
        let mut body = ArenaTankBody {
            pose: Pose::default(),
            controls: &mut controls,
        };

        body.accelerate();
        body.turn_right();
        body.fire();
        assert_eq!(controls.throttle, 1.0);
        assert_eq!(controls.steer, 1.0);
        assert!(controls.fire);
    }

    #[test]
    fn test_body_stops_and_snaps() {
        let mut controls = TankControls {
            throttle: 1.0,
            steer: -1.0,
            ..default()
        };
        let mut body = ArenaTankBody {
            pose: Pose::default(),
            controls: &mut controls,
        };

        body.stop_moving();
        body.stop_turning();
        body.snap_angle(FRAC_PI_2);
        assert_eq!(body.pose().angle, FRAC_PI_2);
        assert_eq!(controls.throttle, 0.0);
        assert_eq!(controls.steer, 0.0);
        assert!(controls.halt_movement && controls.halt_turning);
        assert_eq!(controls.snap_angle, Some(FRAC_PI_2));
    }

    #[test]
    fn test_tank_pose_reads_plane_frame() {
        let transform = Transform::from_translation(plane_to_world(Vec2::new(2.5, 3.5), BODY_HEIGHT))
            .with_rotation(crate::game_logic::movement::plane_rotation(FRAC_PI_2));
        let pose = tank_pose(&transform);
        assert!(pose.position.distance(Vec2::new(2.5, 3.5)) < 1e-5);
        assert!((pose.angle - FRAC_PI_2).abs() < 1e-5);
    }
}
