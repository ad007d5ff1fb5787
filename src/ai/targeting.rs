use super::{Pose, RaycastHit, Raycaster, TankBody};
use crate::components::{ArenaObject, ObstacleMaterial};
use crate::game_logic::damage::FireCooldown;
use crate::game_logic::movement::facing_vector;
use bevy::prelude::*;

/// What the forward ray ran into, from one tank's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Hostile,
    Destructible,
    Other,
}

impl TargetKind {
    pub fn is_shootable(self) -> bool {
        !matches!(self, TargetKind::Other)
    }
}

pub fn classify_target(object: ArenaObject, own_player: usize) -> TargetKind {
    match object {
        ArenaObject::Tank { player } if player != own_player => TargetKind::Hostile,
        ArenaObject::Obstacle {
            material: ObstacleMaterial::Wood,
        } => TargetKind::Destructible,
        _ => TargetKind::Other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetingConfig {
    /// Distance ahead of the body centre where rays and bullets start
    pub muzzle_offset: f32,
    /// Long enough to reach the far edge of the map
    pub ray_length: f32,
    pub ray_thickness: f32,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            muzzle_offset: 0.4,
            ray_length: 9.0,
            ray_thickness: 0.1,
        }
    }
}

pub fn muzzle_position(pose: Pose, muzzle_offset: f32) -> Vec2 {
    pose.position + facing_vector(pose.angle) * muzzle_offset
}

/// First thing straight ahead, if it is worth a bullet
pub fn acquire_target<R: Raycaster + ?Sized>(
    pose: Pose,
    raycaster: &R,
    config: &TargetingConfig,
    own_player: usize,
) -> Option<RaycastHit> {
    raycaster
        .raycast(
            muzzle_position(pose, config.muzzle_offset),
            facing_vector(pose.angle),
            config.ray_length,
            config.ray_thickness,
        )
        .filter(|hit| classify_target(hit.object, own_player).is_shootable())
}

/// Fire at a shootable target when the cooldown allows; returns whether a
/// shot was issued
pub fn maybe_fire<B, R>(
    body: &mut B,
    raycaster: &R,
    cooldown: &mut FireCooldown,
    config: &TargetingConfig,
    own_player: usize,
) -> bool
where
    B: TankBody + ?Sized,
    R: Raycaster + ?Sized,
{
    if acquire_target(body.pose(), raycaster, config, own_player).is_none() {
        return false;
    }
    if !cooldown.try_fire() {
        return false;
    }
    body.fire();
    true
}
