use crate::components::{ArenaObject, ObstacleMaterial};

/// Ticks-based weapon cooldown; a fresh cooldown is ready to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FireCooldown {
    ticks_since_shot: u32,
    period: u32,
}

impl FireCooldown {
    /// Cooldown of `tick_rate / fire_rate` ticks, at least one
    pub fn new(tick_rate: f32, fire_rate: f32) -> Self {
        let period = (tick_rate / fire_rate).round().max(1.0) as u32;
        Self {
            ticks_since_shot: period,
            period,
        }
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn tick(&mut self) {
        self.ticks_since_shot = self.ticks_since_shot.saturating_add(1);
    }

    pub fn ready(&self) -> bool {
        self.ticks_since_shot >= self.period
    }

    /// Consume the cooldown if it has elapsed
    pub fn try_fire(&mut self) -> bool {
        if !self.ready() {
            return false;
        }
        self.ticks_since_shot = 0;
        true
    }
}

pub fn is_spawn_protected(ticks_since_spawn: u32, protection_ticks: u32) -> bool {
    ticks_since_spawn < protection_ticks
}

/// What happened to a target after a hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Spawn protection swallowed the hit
    Absorbed,
    Damaged { remaining: u32 },
    Destroyed,
}

pub fn resolve_hit(current: u32, damage: u32, protected: bool) -> HitOutcome {
    if protected {
        return HitOutcome::Absorbed;
    }
    match current.saturating_sub(damage) {
        0 => HitOutcome::Destroyed,
        remaining => HitOutcome::Damaged { remaining },
    }
}

/// How a bullet interacts with the shape it touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactEffect {
    /// Bullet is removed and the tank takes damage
    DamageTank { player: usize },
    /// Bullet is removed and the wooden box takes damage
    DamageBox,
    /// Bullet is removed, the target is unaffected
    StopBullet,
    /// Both bullets are removed
    DestroyBoth,
    /// Bullet keeps flying (its own shooter)
    PassThrough,
}

pub fn bullet_impact(target: ArenaObject, shooter: usize) -> ImpactEffect {
    match target {
        ArenaObject::Tank { player } if player == shooter => ImpactEffect::PassThrough,
        ArenaObject::Tank { player } => ImpactEffect::DamageTank { player },
        ArenaObject::Obstacle {
            material: ObstacleMaterial::Wood,
        } => ImpactEffect::DamageBox,
        ArenaObject::Obstacle { .. } | ArenaObject::Boundary => ImpactEffect::StopBullet,
        ArenaObject::Bullet { .. } => ImpactEffect::DestroyBoth,
    }
}
