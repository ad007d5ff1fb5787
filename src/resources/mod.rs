use crate::config::range_types::*;
use crate::map::MapDefinition;
use crate::pathfinding::ArenaGrid;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Resource, Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct GameConfig {
    pub settings: GameSettings,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
// NOTE: When adding new fields, keep `Default` in sync so older config files still load
pub struct GameSettings {
    // Simulation settings
    pub tick_rate: TickRate,
    pub linear_damping: DampingValue,
    pub log_filter: String,

    // Match settings
    pub map_name: String,
    pub map_file: Option<String>,
    /// The first `manual_tanks` start positions are left to `TankCommand` events
    pub manual_tanks: usize,
    /// Stop after this many rounds; zero keeps playing until the tick limit
    pub round_limit: u32,

    // Tank settings
    pub tank_acceleration: AccelerationValue,
    pub tank_max_speed: SpeedValue,
    pub tank_flag_speed_factor: f32,
    pub tank_turn_rate: TurnRate,
    pub tank_rotation_speed: f32,
    pub tank_hit_points: HitPoints,
    pub tank_weapon_damage: HitPoints,
    pub fire_rate: FireRate,
    pub bullet_speed: BulletSpeed,
    pub box_hit_points: HitPoints,
    pub spawn_protection_ticks: u32,

    // Flag settings
    pub flag_grab_distance: TileDistance,
    pub home_reach_distance: TileDistance,

    // AI settings
    pub ai_min_angle_difference: AngleDegrees,
    pub ai_arrival_distance: TileDistance,
    /// Ticks without progress before a tank backs off and replans
    pub ai_stall_ticks: u32,
    /// Reversing time after a stall, multiplied by `player + 1`
    pub ai_backoff_ticks: u32,
    pub muzzle_offset: TileDistance,
    pub ray_thickness: TileDistance,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            // Simulation settings
            tick_rate: TickRate::new(50.0),
            linear_damping: DampingValue::default(),
            log_filter: "info,tankctf=debug".to_string(),

            // Match settings
            map_name: "map0".to_string(),
            map_file: None,
            manual_tanks: 0,
            round_limit: 0,

            // Tank settings
            tank_acceleration: AccelerationValue::new(0.4),
            tank_max_speed: SpeedValue::new(2.0),
            tank_flag_speed_factor: 0.5,
            tank_turn_rate: TurnRate::new(2.0),
            tank_rotation_speed: 3.0,
            tank_hit_points: HitPoints::new(4),
            tank_weapon_damage: HitPoints::new(1),
            fire_rate: FireRate::new(2.0),
            bullet_speed: BulletSpeed::new(5.0),
            box_hit_points: HitPoints::new(2),
            spawn_protection_ticks: 100, // two seconds at 50 Hz

            // Flag settings
            flag_grab_distance: TileDistance::new(0.5),
            home_reach_distance: TileDistance::new(0.2),

            // AI settings
            ai_min_angle_difference: AngleDegrees::new(3.0), // a bit more than one tick of turning
            ai_arrival_distance: TileDistance::new(0.25),
            ai_stall_ticks: 30,
            ai_backoff_ticks: 12,
            muzzle_offset: TileDistance::new(0.4),
            ray_thickness: TileDistance::new(0.1),
        }
    }
}

/// Everything one match needs, built once before the app starts
#[derive(Resource, Debug, Clone)]
pub struct MatchSession {
    pub map: MapDefinition,
    pub grid: ArenaGrid,
    pub settings: GameSettings,
}

impl MatchSession {
    pub fn new(map: MapDefinition, settings: GameSettings) -> Self {
        let grid = ArenaGrid::from_map(&map);
        Self { map, grid, settings }
    }

    /// Ray length reaching the far edge of the map from anywhere inside it
    pub fn ray_length(&self) -> f32 {
        self.map.width.max(self.map.height) as f32
    }

    pub fn is_manual(&self, player: usize) -> bool {
        player < self.settings.manual_tanks
    }
}

/// In-memory scores for the running match
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub scores: Vec<u32>,
    pub rounds_played: u32,
}

impl Scoreboard {
    pub fn with_players(count: usize) -> Self {
        Self {
            scores: vec![0; count],
            rounds_played: 0,
        }
    }

    pub fn record_win(&mut self, player: usize) {
        if let Some(score) = self.scores.get_mut(player) {
            *score += 1;
        }
        self.rounds_played += 1;
    }

    pub fn leader(&self) -> Option<usize> {
        self.scores
            .iter()
            .enumerate()
            .max_by_key(|(index, score)| (**score, std::cmp::Reverse(*index)))
            .filter(|(_, score)| **score > 0)
            .map(|(index, _)| index)
    }
}

/// Ticks elapsed since the match started
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct TickCounter(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard_records_wins() {
        let mut board = Scoreboard::with_players(3);
        assert_eq!(board.leader(), None);

        board.record_win(2);
        board.record_win(1);
        board.record_win(2);

        assert_eq!(board.scores, vec![0, 1, 2]);
        assert_eq!(board.rounds_played, 3);
        assert_eq!(board.leader(), Some(2));
    }

    #[test]
    fn test_scoreboard_tie_prefers_lower_index() {
        let mut board = Scoreboard::with_players(2);
        board.record_win(1);
        board.record_win(0);
        assert_eq!(board.leader(), Some(0));
    }

    #[test]
    fn test_settings_round_trip_through_toml() {
        let config = GameConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: GameConfig = toml::from_str(&text).unwrap();

        assert_eq!(parsed.settings.map_name, "map0");
        assert_eq!(parsed.settings.tick_rate.get(), 50.0);
        assert_eq!(parsed.settings.ai_arrival_distance.get(), 0.25);
    }

    #[test]
    fn test_partial_settings_fall_back_to_defaults() {
        let parsed: GameConfig = toml::from_str("[settings]\nmap_name = \"map2\"\n").unwrap();
        assert_eq!(parsed.settings.map_name, "map2");
        assert_eq!(parsed.settings.fire_rate.get(), 2.0);
    }

    #[test]
    fn test_session_ray_length_and_manual_slots() {
        let map = MapDefinition::builtin("map2").unwrap();
        let settings = GameSettings {
            manual_tanks: 1,
            ..GameSettings::default()
        };
        let session = MatchSession::new(map, settings);

        assert_eq!(session.ray_length(), 10.0);
        assert!(session.is_manual(0));
        assert!(!session.is_manual(1));
    }
}
