use super::arena::{restart_round, BODY_HEIGHT};
use super::tank::tank_pose;
use super::MatchSet;
use crate::components::*;
use crate::game_logic::flag::{can_grab_flag, has_won};
use crate::game_logic::movement::plane_to_world;
use crate::resources::{MatchSession, Scoreboard};
use bevy::app::AppExit;
use bevy::prelude::*;

/// A tank brought the flag home
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundWon {
    pub player: usize,
}

pub struct FlagPlugin;

impl Plugin for FlagPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RoundWon>().add_systems(
            FixedPostUpdate,
            (carry_flag, grab_flag, check_capture)
                .chain()
                .in_set(MatchSet::Flag),
        );
    }
}

/// Keep a carried flag on top of its carrier
fn carry_flag(
    mut flags: Query<(&mut Flag, &mut Transform), Without<Tank>>,
    tanks: Query<&Transform, (With<Tank>, With<CarryingFlag>)>,
) {
    for (mut flag, mut transform) in flags.iter_mut() {
        let Some(carrier) = flag.carrier else {
            continue;
        };
        match tanks.get(carrier) {
            Ok(tank_transform) => {
                let position = tank_pose(tank_transform).position;
                transform.translation = plane_to_world(position, BODY_HEIGHT);
            }
            // carrier was reset this tick
            Err(_) => flag.carrier = None,
        }
    }
}

fn grab_flag(
    mut commands: Commands,
    session: Res<MatchSession>,
    mut flags: Query<(&mut Flag, &Transform), Without<Tank>>,
    tanks: Query<(Entity, &Tank, &Transform)>,
) {
    let grab_distance = session.settings.flag_grab_distance.get();

    for (mut flag, flag_transform) in flags.iter_mut() {
        let flag_position = tank_pose(flag_transform).position;

        let mut contenders: Vec<_> = tanks
            .iter()
            .filter(|(_, _, transform)| {
                can_grab_flag(
                    flag_position,
                    tank_pose(transform).position,
                    grab_distance,
                    flag.carrier.is_some(),
                )
            })
            .map(|(entity, tank, _)| (tank.player, entity))
            .collect();
        contenders.sort_unstable();

        if let Some(&(player, entity)) = contenders.first() {
            flag.carrier = Some(entity);
            commands.entity(entity).insert(CarryingFlag);
            info!("Tank {player} grabbed the flag");
        }
    }
}

fn check_capture(
    mut commands: Commands,
    session: Res<MatchSession>,
    mut scoreboard: ResMut<Scoreboard>,
    tanks: Query<(&Tank, &Transform), With<CarryingFlag>>,
    round_entities: Query<Entity, With<RoundEntity>>,
    mut won: EventWriter<RoundWon>,
    mut exit: EventWriter<AppExit>,
) {
    let reach = session.settings.home_reach_distance.get();

    let Some(winner) = tanks
        .iter()
        .filter(|(tank, transform)| has_won(true, tank.home, tank_pose(transform).position, reach))
        .map(|(tank, _)| tank.player)
        .min()
    else {
        return;
    };

    scoreboard.record_win(winner);
    won.write(RoundWon { player: winner });
    info!(
        "Tank {winner} captured the flag, round {} over, scores {:?}",
        scoreboard.rounds_played, scoreboard.scores
    );

    restart_round(&mut commands, &session, round_entities.iter());

    let limit = session.settings.round_limit;
    if limit > 0 && scoreboard.rounds_played >= limit {
        info!("Round limit {limit} reached");
        exit.write(AppExit::Success);
    }
}
