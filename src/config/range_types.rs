use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A simulation tick rate (ticks per second) constrained to [10.0, 240.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct TickRate(f32);

impl TickRate {
    const MIN: f32 = 10.0;
    const MAX: f32 = 240.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Duration of one tick in seconds
    pub fn delta(self) -> f32 {
        1.0 / self.0
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::new(50.0)
    }
}

/// A linear speed in tiles per second constrained to [0.1, 20.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct SpeedValue(f32);

impl SpeedValue {
    const MIN: f32 = 0.1;
    const MAX: f32 = 20.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for SpeedValue {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// A per-tick acceleration step constrained to [0.05, 5.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct AccelerationValue(f32);

impl AccelerationValue {
    const MIN: f32 = 0.05;
    const MAX: f32 = 5.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for AccelerationValue {
    fn default() -> Self {
        Self::new(0.4)
    }
}

/// An angular speed in radians per second constrained to [0.1, 10.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct TurnRate(f32);

impl TurnRate {
    const MIN: f32 = 0.1;
    const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TurnRate {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// Shots per second constrained to [0.1, 20.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct FireRate(f32);

impl FireRate {
    const MIN: f32 = 0.1;
    const MAX: f32 = 20.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for FireRate {
    fn default() -> Self {
        Self::new(2.0)
    }
}

/// A bullet speed in tiles per second constrained to [1.0, 50.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct BulletSpeed(f32);

impl BulletSpeed {
    const MIN: f32 = 1.0;
    const MAX: f32 = 50.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for BulletSpeed {
    fn default() -> Self {
        Self::new(5.0)
    }
}

/// Hit points constrained to [1, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(from = "u32")]
pub struct HitPoints(u32);

impl HitPoints {
    const MIN: u32 = 1;
    const MAX: u32 = 100;

    pub fn new(value: u32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for HitPoints {
    fn default() -> Self {
        Self::new(4)
    }
}

/// An angle in degrees constrained to [0.5, 45.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct AngleDegrees(f32);

impl AngleDegrees {
    const MIN: f32 = 0.5;
    const MAX: f32 = 45.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn radians(self) -> f32 {
        self.0.to_radians()
    }
}

impl Default for AngleDegrees {
    fn default() -> Self {
        Self::new(3.0)
    }
}

/// A distance in tiles constrained to [0.01, 5.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct TileDistance(f32);

impl TileDistance {
    const MIN: f32 = 0.01;
    const MAX: f32 = 5.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for TileDistance {
    fn default() -> Self {
        Self::new(0.25)
    }
}

/// A linear damping coefficient constrained to [0.0, 10.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Display, Serialize, Deserialize)]
#[serde(from = "f32")]
pub struct DampingValue(f32);

impl DampingValue {
    const MIN: f32 = 0.0;
    const MAX: f32 = 10.0;

    pub fn new(value: f32) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

impl Default for DampingValue {
    fn default() -> Self {
        // Retains 10% of velocity per second
        Self::new(2.3)
    }
}

/// Raw values, including deserialized ones, always pass through `new`
macro_rules! clamped_from {
    ($($name:ident($raw:ty)),* $(,)?) => {
        $(
            impl From<$raw> for $name {
                fn from(value: $raw) -> Self {
                    Self::new(value)
                }
            }
        )*
    };
}

clamped_from!(
    TickRate(f32),
    SpeedValue(f32),
    AccelerationValue(f32),
    TurnRate(f32),
    FireRate(f32),
    BulletSpeed(f32),
    HitPoints(u32),
    AngleDegrees(f32),
    TileDistance(f32),
    DampingValue(f32),
);
