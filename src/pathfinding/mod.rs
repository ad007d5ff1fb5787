use crate::map::{CellType, MapDefinition};
use bevy::prelude::*;
use ::pathfinding::prelude::bfs;

/// A single tile of the arena, addressed by integer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile containing a plane position
    pub fn from_position(position: Vec2) -> Self {
        Self::new(position.x.floor() as i32, position.y.floor() as i32)
    }

    /// Geometric centre of the tile, the point steering aims at
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }

    /// The four axis-aligned neighbours in planning order: +y, +x, -x, -y
    pub fn neighbors(self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x, self.y + 1),
            TileCoord::new(self.x + 1, self.y),
            TileCoord::new(self.x - 1, self.y),
            TileCoord::new(self.x, self.y - 1),
        ]
    }

    pub fn manhattan_distance(self, other: TileCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Whether heavy (pushable) obstacles may be planned through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PassabilityPolicy {
    #[default]
    Strict,
    /// Fallback used after a strict plan came back empty
    AllowPushable,
}

impl PassabilityPolicy {
    pub fn allows_pushable(self) -> bool {
        matches!(self, PassabilityPolicy::AllowPushable)
    }
}

/// Read-only occupancy view of the arena for one round
///
/// Box destruction only changes the physics world; passability is always
/// derived from the declared cell type plus a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaGrid {
    width: u32,
    height: u32,
    cells: Vec<CellType>,
}

impl ArenaGrid {
    pub fn from_map(map: &MapDefinition) -> Self {
        let grid = Self::from_rows(&map.cells);
        let blocked = grid.cells.iter().filter(|cell| **cell == CellType::Wall).count();
        debug!(
            "Arena grid for {}: {}x{}, {blocked} wall cells",
            map.name, grid.width, grid.height
        );
        grid
    }

    /// Build from row-major cells; short rows are padded with walls
    pub fn from_rows(rows: &[Vec<CellType>]) -> Self {
        let height = rows.len() as u32;
        let width = rows.iter().map(Vec::len).max().unwrap_or(0) as u32;
        let mut cells = Vec::with_capacity((width * height) as usize);
        for row in rows {
            cells.extend(row.iter().copied());
            cells.extend(std::iter::repeat_n(CellType::Wall, width as usize - row.len()));
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn in_bounds(&self, tile: TileCoord) -> bool {
        tile.x >= 0 && tile.y >= 0 && (tile.x as u32) < self.width && (tile.y as u32) < self.height
    }

    /// Declared cell type, `None` outside the arena
    pub fn cell(&self, tile: TileCoord) -> Option<CellType> {
        if !self.in_bounds(tile) {
            return None;
        }
        let index = (tile.y as u32 * self.width + tile.x as u32) as usize;
        self.cells.get(index).copied()
    }

    pub fn is_passable(&self, tile: TileCoord, policy: PassabilityPolicy) -> bool {
        match self.cell(tile) {
            Some(CellType::Open | CellType::Destructible) => true,
            Some(CellType::Pushable) => policy.allows_pushable(),
            Some(CellType::Wall) | None => false,
        }
    }

    /// Passable neighbours in planning order
    pub fn passable_neighbors(&self, tile: TileCoord, policy: PassabilityPolicy) -> Vec<TileCoord> {
        tile.neighbors()
            .into_iter()
            .filter(|neighbor| self.is_passable(*neighbor, policy))
            .collect()
    }
}

/// Breadth-first shortest path from `start` to `goal`, both inclusive
///
/// Returns `[start]` when already there and an empty path when the goal
/// cannot be reached. The start tile itself is not required to be passable.
pub fn plan_path(
    grid: &ArenaGrid,
    start: TileCoord,
    goal: TileCoord,
    policy: PassabilityPolicy,
) -> Vec<TileCoord> {
    bfs(
        &start,
        |tile| grid.passable_neighbors(*tile, policy),
        |tile| *tile == goal,
    )
    .unwrap_or_default()
}

/// Result of a plan that may have fallen back to the relaxed policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub path: Vec<TileCoord>,
    pub policy: PassabilityPolicy,
}

impl PlanOutcome {
    pub fn found(&self) -> bool {
        !self.path.is_empty()
    }
}

/// Plan strictly first, then once more with pushables allowed
pub fn plan_with_fallback(grid: &ArenaGrid, start: TileCoord, goal: TileCoord) -> PlanOutcome {
    let path = plan_path(grid, start, goal, PassabilityPolicy::Strict);
    if !path.is_empty() {
        return PlanOutcome {
            path,
            policy: PassabilityPolicy::Strict,
        };
    }

    let path = plan_path(grid, start, goal, PassabilityPolicy::AllowPushable);
    if !path.is_empty() {
        debug!(
            "Strict plan {:?} -> {:?} failed, pushables allowed ({} tiles)",
            start,
            goal,
            path.len()
        );
    }
    PlanOutcome {
        path,
        policy: PassabilityPolicy::AllowPushable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::pathfinding::prelude::astar;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64;

    use CellType::{Destructible as D, Open as O, Pushable as P, Wall as W};

    fn grid(rows: &[&[CellType]]) -> ArenaGrid {
        let rows: Vec<Vec<CellType>> = rows.iter().map(|row| row.to_vec()).collect();
        ArenaGrid::from_rows(&rows)
    }

    fn corridor() -> Vec<Vec<CellType>> {
        (0..9)
            .map(|_| {
                let mut row = vec![W; 9];
                row[0] = O;
                row
            })
            .collect()
    }

    fn assert_adjacent(path: &[TileCoord]) {
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1, "{path:?}");
        }
    }

    fn reference_distance(
        grid: &ArenaGrid,
        start: TileCoord,
        goal: TileCoord,
        policy: PassabilityPolicy,
    ) -> Option<usize> {
        astar(
            &start,
            |tile| {
                grid.passable_neighbors(*tile, policy)
                    .into_iter()
                    .map(|neighbor| (neighbor, 1usize))
                    .collect::<Vec<_>>()
            },
            |tile| tile.manhattan_distance(goal) as usize,
            |tile| *tile == goal,
        )
        .map(|(_, cost)| cost)
    }

    fn random_grid(rng: &mut Pcg64, width: usize, height: usize) -> ArenaGrid {
        let rows: Vec<Vec<CellType>> = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| match rng.gen_range(0..10) {
                        0..=5 => O,
                        6 | 7 => W,
                        8 => D,
                        _ => P,
                    })
                    .collect()
            })
            .collect();
        ArenaGrid::from_rows(&rows)
    }

    #[test]
    fn test_passability_rules() {
        let grid = grid(&[&[O, W, D, P]]);
        for policy in [PassabilityPolicy::Strict, PassabilityPolicy::AllowPushable] {
            assert!(grid.is_passable(TileCoord::new(0, 0), policy));
            assert!(!grid.is_passable(TileCoord::new(1, 0), policy));
            assert!(grid.is_passable(TileCoord::new(2, 0), policy));
        }
        assert!(!grid.is_passable(TileCoord::new(3, 0), PassabilityPolicy::Strict));
        assert!(grid.is_passable(TileCoord::new(3, 0), PassabilityPolicy::AllowPushable));
    }

    #[test]
    fn test_out_of_bounds_is_not_passable() {
        let grid = grid(&[&[O, O], &[O, O]]);
        for tile in [
            TileCoord::new(-1, 0),
            TileCoord::new(0, -1),
            TileCoord::new(2, 0),
            TileCoord::new(0, 2),
        ] {
            assert!(!grid.is_passable(tile, PassabilityPolicy::AllowPushable));
            assert_eq!(grid.cell(tile), None);
        }
    }

    #[test]
    fn test_neighbor_order() {
        let grid = grid(&[&[O, O, O], &[O, O, O], &[O, O, O]]);
        let neighbors = grid.passable_neighbors(TileCoord::new(1, 1), PassabilityPolicy::Strict);
        assert_eq!(
            neighbors,
            vec![
                TileCoord::new(1, 2),
                TileCoord::new(2, 1),
                TileCoord::new(0, 1),
                TileCoord::new(1, 0),
            ]
        );

        let corner = grid.passable_neighbors(TileCoord::new(0, 0), PassabilityPolicy::Strict);
        assert_eq!(corner, vec![TileCoord::new(0, 1), TileCoord::new(1, 0)]);
    }

    #[test]
    fn test_ragged_rows_are_padded_with_walls() {
        let grid = ArenaGrid::from_rows(&[vec![O, O, O], vec![O]]);
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.cell(TileCoord::new(2, 1)), Some(W));
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = grid(&[&[O, O]]);
        let tile = TileCoord::new(1, 0);
        assert_eq!(plan_path(&grid, tile, tile, PassabilityPolicy::Strict), vec![tile]);
    }

    #[test]
    fn test_tie_break_follows_neighbor_order() {
        let grid = grid(&[&[O, O], &[O, O]]);
        let path = plan_path(
            &grid,
            TileCoord::new(0, 0),
            TileCoord::new(1, 1),
            PassabilityPolicy::Strict,
        );
        // +y is explored before +x
        assert_eq!(
            path,
            vec![TileCoord::new(0, 0), TileCoord::new(0, 1), TileCoord::new(1, 1)]
        );
    }

    #[test]
    fn test_corridor_scenario() {
        let rows = corridor();
        let open = ArenaGrid::from_rows(&rows);
        let path = plan_path(
            &open,
            TileCoord::new(0, 0),
            TileCoord::new(0, 8),
            PassabilityPolicy::Strict,
        );
        let expected: Vec<TileCoord> = (0..9).map(|y| TileCoord::new(0, y)).collect();
        assert_eq!(path, expected);

        let mut blocked_rows = rows;
        blocked_rows[4][0] = W;
        let blocked = ArenaGrid::from_rows(&blocked_rows);
        for policy in [PassabilityPolicy::Strict, PassabilityPolicy::AllowPushable] {
            assert!(plan_path(&blocked, TileCoord::new(0, 0), TileCoord::new(0, 8), policy).is_empty());
        }
    }

    #[test]
    fn test_enclosed_goal() {
        let walled = grid(&[&[O, O, O], &[O, W, O], &[W, O, W], &[O, W, O]]);
        let goal = TileCoord::new(1, 2);
        assert!(plan_path(&walled, TileCoord::new(0, 0), goal, PassabilityPolicy::Strict).is_empty());
        assert!(
            plan_path(&walled, TileCoord::new(0, 0), goal, PassabilityPolicy::AllowPushable).is_empty()
        );

        let pushable = grid(&[&[O, O, O], &[O, P, O], &[P, O, P], &[O, P, O]]);
        assert!(plan_path(&pushable, TileCoord::new(0, 0), goal, PassabilityPolicy::Strict).is_empty());
        let path = plan_path(&pushable, TileCoord::new(0, 0), goal, PassabilityPolicy::AllowPushable);
        assert_eq!(path.len(), 4);
        assert_eq!(path.last(), Some(&goal));
        assert_adjacent(&path);
    }

    #[test]
    fn test_fallback_reports_policy() {
        let pushable = grid(&[&[O, P, O]]);
        let outcome = plan_with_fallback(&pushable, TileCoord::new(0, 0), TileCoord::new(2, 0));
        assert!(outcome.found());
        assert_eq!(outcome.policy, PassabilityPolicy::AllowPushable);

        let open = grid(&[&[O, D, O]]);
        let outcome = plan_with_fallback(&open, TileCoord::new(0, 0), TileCoord::new(2, 0));
        assert_eq!(outcome.policy, PassabilityPolicy::Strict);
        assert_eq!(outcome.path.len(), 3);

        let walled = grid(&[&[O, W, O]]);
        let outcome = plan_with_fallback(&walled, TileCoord::new(0, 0), TileCoord::new(2, 0));
        assert!(!outcome.found());
    }

    #[test]
    fn test_planner_is_deterministic() {
        let mut rng = Pcg64::seed_from_u64(11);
        let grid = random_grid(&mut rng, 12, 12);
        let start = TileCoord::new(0, 0);
        let goal = TileCoord::new(11, 11);
        let first = plan_path(&grid, start, goal, PassabilityPolicy::AllowPushable);
        for _ in 0..5 {
            assert_eq!(plan_path(&grid, start, goal, PassabilityPolicy::AllowPushable), first);
        }
    }

    #[test]
    fn test_paths_are_shortest_on_random_grids() {
        let mut rng = Pcg64::seed_from_u64(2024);
        for _ in 0..40 {
            let grid = random_grid(&mut rng, 10, 8);
            let start = TileCoord::new(rng.gen_range(0..10), rng.gen_range(0..8));
            let goal = TileCoord::new(rng.gen_range(0..10), rng.gen_range(0..8));
            for policy in [PassabilityPolicy::Strict, PassabilityPolicy::AllowPushable] {
                let path = plan_path(&grid, start, goal, policy);
                match reference_distance(&grid, start, goal, policy) {
                    Some(distance) => {
                        assert_eq!(path.len(), distance + 1);
                        assert_eq!(path.first(), Some(&start));
                        assert_eq!(path.last(), Some(&goal));
                        assert_adjacent(&path);
                        assert!(path[1..].iter().all(|tile| grid.is_passable(*tile, policy)));
                    }
                    None => assert!(path.is_empty()),
                }
            }
        }
    }

    #[test]
    fn test_builtin_maps_all_pairs_shortest() {
        for name in ["map0", "map2"] {
            let map = MapDefinition::builtin(name).unwrap();
            let grid = ArenaGrid::from_map(&map);
            let tiles: Vec<TileCoord> = (0..grid.height() as i32)
                .flat_map(|y| (0..grid.width() as i32).map(move |x| TileCoord::new(x, y)))
                .filter(|tile| grid.is_passable(*tile, PassabilityPolicy::Strict))
                .collect();
            for &start in &tiles {
                for &goal in &tiles {
                    let path = plan_path(&grid, start, goal, PassabilityPolicy::Strict);
                    let expected = reference_distance(&grid, start, goal, PassabilityPolicy::Strict);
                    assert_eq!(path.len().checked_sub(1), expected, "{name}: {start:?} -> {goal:?}");
                }
            }
        }
    }

    #[test]
    fn test_flag_reachable_on_builtin_maps() {
        for name in MapDefinition::builtin_names() {
            let map = MapDefinition::builtin(name).unwrap();
            let grid = ArenaGrid::from_map(&map);
            let flag = TileCoord::from_position(map.flag_position());
            for spawn in &map.start_positions {
                let start = TileCoord::from_position(spawn.position());
                let outcome = plan_with_fallback(&grid, start, flag);
                assert!(outcome.found(), "{name}: no route from {start:?}");
            }
        }
    }

    #[test]
    fn test_tile_geometry() {
        let tile = TileCoord::from_position(Vec2::new(3.7, 0.2));
        assert_eq!(tile, TileCoord::new(3, 0));
        assert_eq!(tile.center(), Vec2::new(3.5, 0.5));
        assert_eq!(TileCoord::from_position(Vec2::new(-0.1, 0.0)), TileCoord::new(-1, 0));
    }
}
