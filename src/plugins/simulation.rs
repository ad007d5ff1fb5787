use super::{AiPlugin, ArenaPlugin, CombatPlugin, FlagPlugin, MatchSet, TankPlugin};
use crate::resources::{MatchSession, Scoreboard, TickCounter};
use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::*;
use std::time::Duration;

/// Everything a match needs on top of a headless Bevy app
pub struct MatchPlugin {
    pub session: MatchSession,
}

impl Plugin for MatchPlugin {
    fn build(&self, app: &mut App) {
        let tick_rate = self.session.settings.tick_rate;
        let players = self.session.map.start_positions.len();

        app.insert_resource(self.session.clone())
            .insert_resource(Scoreboard::with_players(players))
            .init_resource::<TickCounter>()
            .insert_resource(Time::<Fixed>::from_hz(f64::from(tick_rate.get())))
            .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
            // one physics step per tick, never the variable clamp
            .insert_resource(TimestepMode::Fixed {
                dt: tick_rate.delta(),
                substeps: 1,
            })
            .configure_sets(FixedUpdate, (MatchSet::Decide, MatchSet::Actuate).chain())
            .configure_sets(
                FixedPostUpdate,
                (MatchSet::Combat, MatchSet::Flag)
                    .chain()
                    .after(PhysicsSet::Writeback),
            )
            .add_plugins((ArenaPlugin, TankPlugin, AiPlugin, CombatPlugin, FlagPlugin));
    }
}

/// Build a windowless app where every `update` advances exactly one tick
pub fn create_headless_app(session: MatchSession, with_logging: bool) -> App {
    let tick = Duration::from_secs_f64(1.0 / f64::from(session.settings.tick_rate.get()));
    let log_filter = session.settings.log_filter.clone();

    let mut app = App::new();
    app.add_plugins((MinimalPlugins, TransformPlugin));
    if with_logging {
        app.add_plugins(LogPlugin {
            filter: log_filter,
            ..default()
        });
    }
    app.insert_resource(TimeUpdateStrategy::ManualDuration(tick))
        .add_plugins(MatchPlugin { session });

    app.finish();
    app.cleanup();
    app
}

/// Step the app up to `max_ticks` times; stops early once the round limit
/// asks the app to exit
pub fn run_ticks(app: &mut App, max_ticks: u64) -> Option<AppExit> {
    for _ in 0..max_ticks {
        app.update();
        if let Some(exit) = app.should_exit() {
            return Some(exit);
        }
    }
    None
}
