pub mod ai;
pub mod components;
pub mod config;
pub mod game_logic;
pub mod map;
pub mod pathfinding;
pub mod plugins;
pub mod resources;

// Selective re-exports for external consumers

// Plugins - main.rs and the integration tests drive matches through these
pub use plugins::*;

pub use game_logic::errors::{CtfError, CtfResult};

pub use map::{ArenaGeneratorConfig, CellType, MapDefinition, SpawnPoint};

pub use resources::{GameConfig, GameSettings, MatchSession, Scoreboard};
