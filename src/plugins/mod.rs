pub mod ai;
pub mod arena;
pub mod combat;
pub mod flag;
pub mod simulation;
pub mod tank;

pub use ai::*;
pub use arena::*;
pub use combat::*;
pub use flag::*;
pub use simulation::*;
pub use tank::*;

use bevy::prelude::*;

/// Per-tick ordering of the match systems
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSet {
    /// Agents and manual commands fill `TankControls` (FixedUpdate)
    Decide,
    /// Weapons and motor consume `TankControls` (FixedUpdate)
    Actuate,
    /// Bullet hits, after the physics step (FixedPostUpdate)
    Combat,
    /// Flag pickup and capture (FixedPostUpdate)
    Flag,
}
