use crate::game_logic::errors::{CtfError, CtfResult};
use crate::pathfinding::{plan_path, PassabilityPolicy, TileCoord};
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// Classification of a single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CellType {
    /// Grass, nothing in the way
    Open,
    /// Rock: immovable and indestructible
    Wall,
    /// Wood: can be shot to pieces
    Destructible,
    /// Metal: heavy, can be pushed but not destroyed
    Pushable,
}

impl TryFrom<u8> for CellType {
    type Error = CtfError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CellType::Open),
            1 => Ok(CellType::Wall),
            2 => Ok(CellType::Destructible),
            3 => Ok(CellType::Pushable),
            other => Err(CtfError::InvalidMapData {
                reason: format!("unknown cell code {other}"),
            }),
        }
    }
}

impl From<CellType> for u8 {
    fn from(cell: CellType) -> Self {
        match cell {
            CellType::Open => 0,
            CellType::Wall => 1,
            CellType::Destructible => 2,
            CellType::Pushable => 3,
        }
    }
}

/// Where a tank starts (and where its home base sits)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: f32,
    pub y: f32,
    /// Degrees, 0 faces +y
    pub orientation: f32,
}

impl SpawnPoint {
    pub const fn new(x: f32, y: f32, orientation: f32) -> Self {
        Self { x, y, orientation }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn angle(&self) -> f32 {
        self.orientation.to_radians()
    }
}

/// Blueprint of an arena: layout, tank spawns and the flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_layout"))]
pub struct MapDefinition {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(range(min = 1, max = 256))]
    pub width: u32,
    #[validate(range(min = 1, max = 256))]
    pub height: u32,
    /// Row-major: `cells[y][x]`
    pub cells: Vec<Vec<CellType>>,
    pub flag_position: [f32; 2],
    #[validate(length(min = 1, max = 16))]
    pub start_positions: Vec<SpawnPoint>,
}

fn layout_error(message: String) -> ValidationError {
    let mut error = ValidationError::new("layout");
    error.message = Some(message.into());
    error
}

fn validate_layout(map: &MapDefinition) -> Result<(), ValidationError> {
    if map.cells.len() != map.height as usize {
        return Err(layout_error(format!(
            "expected {} rows, found {}",
            map.height,
            map.cells.len()
        )));
    }

    if let Some((y, row)) = map
        .cells
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != map.width as usize)
    {
        return Err(layout_error(format!(
            "row {y} has {} cells, expected {}",
            row.len(),
            map.width
        )));
    }

    for (index, spawn) in map.start_positions.iter().enumerate() {
        let tile = TileCoord::from_position(spawn.position());
        match map.cell(tile) {
            Some(CellType::Open) => {}
            Some(other) => {
                return Err(layout_error(format!(
                    "start position {index} sits on a {other:?} cell"
                )));
            }
            None => {
                return Err(layout_error(format!(
                    "start position {index} at ({}, {}) is outside the map",
                    spawn.x, spawn.y
                )));
            }
        }
    }

    let flag_tile = TileCoord::from_position(map.flag_position());
    if map.cell(flag_tile) != Some(CellType::Open) {
        return Err(layout_error(format!(
            "flag at ({}, {}) must be on an open cell",
            map.flag_position[0], map.flag_position[1]
        )));
    }

    Ok(())
}

impl MapDefinition {
    /// Create a new map definition with validation
    pub fn new(
        name: impl Into<String>,
        cells: Vec<Vec<CellType>>,
        start_positions: Vec<SpawnPoint>,
        flag_position: [f32; 2],
    ) -> CtfResult<Self> {
        let height = cells.len() as u32;
        let width = cells.first().map_or(0, |row| row.len()) as u32;
        let map = Self {
            name: name.into(),
            width,
            height,
            cells,
            flag_position,
            start_positions,
        };
        map.check()?;
        Ok(map)
    }

    fn from_codes(
        name: &str,
        rows: &[&[u8]],
        start_positions: &[SpawnPoint],
        flag_position: [f32; 2],
    ) -> CtfResult<Self> {
        let cells = rows
            .iter()
            .map(|row| row.iter().map(|&code| CellType::try_from(code)).collect())
            .collect::<CtfResult<Vec<Vec<CellType>>>>()?;
        Self::new(name, cells, start_positions.to_vec(), flag_position)
    }

    /// Run the declarative and layout validation rules
    pub fn check(&self) -> CtfResult<()> {
        self.validate()
            .map_err(|errors| CtfError::MapValidationFailed {
                reason: errors.to_string(),
            })
    }

    /// Names accepted by [`MapDefinition::builtin`]
    pub fn builtin_names() -> &'static [&'static str] {
        &["map0", "map1", "map2", "map3"]
    }

    /// The arenas shipped with the game
    pub fn builtin(name: &str) -> CtfResult<Self> {
        match name {
            "map0" => Self::from_codes(
                "map0",
                &[
                    &[0, 1, 0, 0, 0, 0, 0, 1, 0],
                    &[0, 1, 0, 2, 0, 2, 0, 1, 0],
                    &[0, 2, 0, 1, 0, 1, 0, 2, 0],
                    &[0, 0, 0, 1, 0, 1, 0, 0, 0],
                    &[1, 1, 0, 3, 0, 3, 0, 1, 1],
                    &[0, 0, 0, 1, 0, 1, 0, 0, 0],
                    &[0, 2, 0, 1, 0, 1, 0, 2, 0],
                    &[0, 1, 0, 2, 0, 2, 0, 1, 0],
                    &[0, 1, 0, 0, 0, 0, 0, 1, 0],
                ],
                &[
                    SpawnPoint::new(0.5, 0.5, 0.0),
                    SpawnPoint::new(8.5, 0.5, 0.0),
                    SpawnPoint::new(0.5, 8.5, 180.0),
                    SpawnPoint::new(8.5, 8.5, 180.0),
                ],
                [4.5, 4.5],
            ),
            "map1" => Self::from_codes(
                "map1",
                &[
                    &[0, 2, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 2, 0],
                    &[0, 1, 1, 0, 0, 1, 1, 1, 1, 1, 0, 0, 1, 1, 0],
                    &[0, 1, 0, 3, 1, 1, 0, 0, 0, 1, 1, 3, 0, 1, 0],
                    &[0, 2, 0, 0, 3, 0, 0, 2, 0, 0, 3, 0, 0, 2, 0],
                    &[2, 1, 0, 1, 1, 0, 1, 3, 1, 0, 1, 1, 0, 1, 2],
                    &[1, 1, 3, 0, 3, 2, 3, 0, 3, 2, 3, 0, 3, 1, 1],
                    &[2, 1, 0, 1, 1, 0, 1, 3, 1, 0, 1, 1, 0, 1, 2],
                    &[0, 2, 0, 0, 3, 0, 0, 2, 0, 0, 3, 0, 0, 2, 0],
                    &[0, 1, 0, 3, 1, 1, 0, 0, 0, 1, 1, 3, 0, 1, 0],
                    &[0, 1, 1, 0, 0, 1, 1, 1, 1, 1, 0, 0, 1, 1, 0],
                    &[0, 2, 0, 0, 0, 2, 0, 0, 0, 2, 0, 0, 0, 2, 0],
                ],
                &[
                    SpawnPoint::new(0.5, 0.5, 0.0),
                    SpawnPoint::new(14.5, 0.5, 0.0),
                    SpawnPoint::new(0.5, 10.5, 180.0),
                    SpawnPoint::new(14.5, 10.5, 180.0),
                    SpawnPoint::new(7.5, 0.5, 0.0),
                    SpawnPoint::new(7.5, 10.5, 180.0),
                ],
                [7.5, 5.5],
            ),
            "map2" => Self::from_codes(
                "map2",
                &[
                    &[0, 2, 0, 2, 0, 0, 2, 0, 2, 0],
                    &[0, 3, 0, 1, 3, 3, 1, 0, 3, 0],
                    &[0, 1, 0, 1, 0, 0, 1, 0, 1, 0],
                    &[0, 3, 0, 1, 3, 3, 1, 0, 3, 0],
                    &[0, 2, 0, 2, 0, 0, 2, 0, 2, 0],
                ],
                &[
                    SpawnPoint::new(0.5, 2.5, 270.0),
                    SpawnPoint::new(9.5, 2.5, 90.0),
                ],
                [5.0, 2.5],
            ),
            "map3" => {
                let cells = vec![vec![CellType::Open; 15]; 15];
                Self::new(
                    "map3",
                    cells,
                    vec![
                        SpawnPoint::new(0.5, 0.5, 0.0),
                        SpawnPoint::new(14.5, 0.5, 0.0),
                        SpawnPoint::new(0.5, 14.5, 180.0),
                        SpawnPoint::new(14.5, 14.5, 180.0),
                    ],
                    [7.5, 7.5],
                )
            }
            other => Err(CtfError::UnknownMap {
                name: other.to_string(),
            }),
        }
    }

    /// Parse and validate a TOML map
    pub fn from_toml_str(text: &str) -> CtfResult<Self> {
        let map: MapDefinition = toml::from_str(text)?;
        map.check()?;
        Ok(map)
    }

    pub fn to_toml_string(&self) -> CtfResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load a map from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CtfResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CtfError::MapFileNotFound {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Save the map as TOML, creating parent directories as needed
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CtfResult<()> {
        self.check()?;
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Cell at a tile, `None` outside the map
    pub fn cell(&self, tile: TileCoord) -> Option<CellType> {
        if tile.x < 0 || tile.y < 0 {
            return None;
        }
        self.cells
            .get(tile.y as usize)
            .and_then(|row| row.get(tile.x as usize))
            .copied()
    }

    pub fn flag_position(&self) -> Vec2 {
        Vec2::new(self.flag_position[0], self.flag_position[1])
    }

    /// Iterate over every non-open cell
    pub fn obstacles(&self) -> impl Iterator<Item = (TileCoord, CellType)> + '_ {
        self.cells.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, cell)| **cell != CellType::Open)
                .map(move |(x, cell)| (TileCoord::new(x as i32, y as i32), *cell))
        })
    }
}

/// Parameters for [`generate_random_arena`]
#[derive(Debug, Clone, Copy)]
pub struct ArenaGeneratorConfig {
    pub width: u32,
    pub height: u32,
    /// Share of cells that receive a box, 0.0..=0.8
    pub density: f32,
    pub seed: u64,
}

impl Default for ArenaGeneratorConfig {
    fn default() -> Self {
        Self {
            width: 11,
            height: 11,
            density: 0.3,
            seed: 0,
        }
    }
}

const GENERATOR_ATTEMPTS: u32 = 32;

/// Build a random four-player arena where the flag is reachable from every
/// start without pushing anything
pub fn generate_random_arena(config: ArenaGeneratorConfig) -> CtfResult<MapDefinition> {
    if config.width < 3 || config.height < 3 {
        return Err(CtfError::InvalidArgument {
            reason: format!(
                "arena must be at least 3x3, got {}x{}",
                config.width, config.height
            ),
        });
    }

    let (width, height) = (config.width as i32, config.height as i32);
    let density = config.density.clamp(0.0, 0.8);
    let mut rng = Pcg64::seed_from_u64(config.seed);

    let starts = vec![
        SpawnPoint::new(0.5, 0.5, 0.0),
        SpawnPoint::new(width as f32 - 0.5, 0.5, 0.0),
        SpawnPoint::new(0.5, height as f32 - 0.5, 180.0),
        SpawnPoint::new(width as f32 - 0.5, height as f32 - 0.5, 180.0),
    ];
    let flag_tile = TileCoord::new(width / 2, height / 2);
    let reserved: Vec<TileCoord> = starts
        .iter()
        .map(|spawn| TileCoord::from_position(spawn.position()))
        .chain(std::iter::once(flag_tile))
        .collect();

    for attempt in 0..GENERATOR_ATTEMPTS {
        let cells: Vec<Vec<CellType>> = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if reserved.contains(&TileCoord::new(x, y)) || !rng.gen_bool(density as f64) {
                            return CellType::Open;
                        }
                        match rng.gen_range(0..10) {
                            0..=4 => CellType::Wall,
                            5..=7 => CellType::Destructible,
                            _ => CellType::Pushable,
                        }
                    })
                    .collect()
            })
            .collect();

        let candidate = MapDefinition::new(
            format!("random-{}", config.seed),
            cells,
            starts.clone(),
            [flag_tile.x as f32 + 0.5, flag_tile.y as f32 + 0.5],
        )?;

        let grid = crate::pathfinding::ArenaGrid::from_map(&candidate);
        let all_reachable = reserved[..starts.len()]
            .iter()
            .all(|start| !plan_path(&grid, *start, flag_tile, PassabilityPolicy::Strict).is_empty());

        if all_reachable {
            debug!(
                "Generated arena {}x{} (seed {}) after {} attempt(s)",
                width,
                height,
                config.seed,
                attempt + 1
            );
            return Ok(candidate);
        }
    }

    warn!(
        "No connected layout after {GENERATOR_ATTEMPTS} attempts for seed {}, using an open arena",
        config.seed
    );
    MapDefinition::new(
        format!("random-{}", config.seed),
        vec![vec![CellType::Open; width as usize]; height as usize],
        starts,
        [flag_tile.x as f32 + 0.5, flag_tile.y as f32 + 0.5],
    )
}
