//! Tile map model
//!
//! A map document is a rectangular grid of integer cell codes plus optional
//! goal and boss-battle markers. `MapDefinition` is the validated form;
//! `LevelLayout` is what the simulation consumes: static colliders, spawn
//! descriptors and trigger zones in world units.
//!
//! Bad input never reaches the simulation. Anything that fails validation is
//! replaced by the built-in default level.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::COFFEE_DURATION_MS;
use crate::persistence::{self, PersistError};
use crate::sim::rect::Rect;
use crate::sim::state::{EnemyKind, ItemKind};

/// Grid content of one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TileCode {
    #[default]
    Empty = 0,
    Block = 1,
    ItemBlock = 2,
    StrongEnemy = 3,
    WeakEnemy = 4,
    Boss = 5,
    /// Invincibility power item (coffee)
    Coffee = 6,
    /// Generic power item
    Item = 7,
    Pipe = 8,
}

impl TileCode {
    pub fn code(self) -> i64 {
        self as u8 as i64
    }
}

impl TryFrom<i64> for TileCode {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => TileCode::Empty,
            1 => TileCode::Block,
            2 => TileCode::ItemBlock,
            3 => TileCode::StrongEnemy,
            4 => TileCode::WeakEnemy,
            5 => TileCode::Boss,
            6 => TileCode::Coffee,
            7 => TileCode::Item,
            8 => TileCode::Pipe,
            other => return Err(other),
        })
    }
}

/// Reasons a map cannot be used as-is
#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error("map document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("map grid is empty")]
    EmptyGrid,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown tile code {code} at ({x}, {y})")]
    UnknownTile { code: i64, x: usize, y: usize },

    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },
}

/// Rectangular grid of tile codes, stored row-major (y * width + x)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<TileCode>,
}

impl TileGrid {
    /// An all-empty grid (the editor's starting canvas)
    pub fn blank(width: usize, height: usize) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::EmptyGrid);
        }
        Ok(Self::filled(width, height, TileCode::Empty))
    }

    fn filled(width: usize, height: usize, tile: TileCode) -> Self {
        Self {
            width,
            height,
            cells: vec![tile; width * height],
        }
    }

    /// Validate raw rows: non-empty, rectangular, known codes only
    pub fn from_rows(rows: &[Vec<i64>]) -> Result<Self, MapError> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if width == 0 {
            return Err(MapError::EmptyGrid);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MapError::Ragged {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &code) in row.iter().enumerate() {
                let tile =
                    TileCode::try_from(code).map_err(|code| MapError::UnknownTile { code, x, y })?;
                cells.push(tile);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Cell at (x, y); `None` outside the grid
    pub fn get(&self, x: usize, y: usize) -> Option<TileCode> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    pub fn set(&mut self, x: usize, y: usize, tile: TileCode) -> Result<(), MapError> {
        if x >= self.width || y >= self.height {
            return Err(MapError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        self.cells[y * self.width + x] = tile;
        Ok(())
    }

    /// All cells with their coordinates, row by row
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, TileCode)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, &tile)| (i % self.width, i / self.width, tile))
    }

    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        self.cells
            .chunks(self.width)
            .map(|row| row.iter().map(|t| t.code()).collect())
            .collect()
    }
}

/// A cell coordinate as written in map documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// One-cell rectangle in world units
    pub fn to_rect(self, tile_size: f32) -> Rect {
        Rect::new(
            self.x as f32 * tile_size,
            self.y as f32 * tile_size,
            tile_size,
            tile_size,
        )
    }
}

/// Boss-battle block of a map document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BossBattleFile {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub switch: Option<GridPoint>,
}

/// On-disk map document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapFile {
    pub map: Vec<Vec<i64>>,
    /// Goal cell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_form: Option<GridPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boss_battle: Option<BossBattleFile>,
}

/// Boss encounter declared by a map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossBattle {
    /// Cell that defeats the boss when touched
    pub switch: Option<GridPoint>,
}

/// A validated map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MapFile", into = "MapFile")]
pub struct MapDefinition {
    pub grid: TileGrid,
    pub goal: Option<GridPoint>,
    pub boss_battle: Option<BossBattle>,
}

impl TryFrom<MapFile> for MapDefinition {
    type Error = MapError;

    fn try_from(file: MapFile) -> Result<Self, Self::Error> {
        let grid = TileGrid::from_rows(&file.map)?;
        let boss_battle = file
            .boss_battle
            .filter(|b| b.enabled)
            .map(|b| BossBattle { switch: b.switch });
        Ok(Self {
            grid,
            goal: file.application_form,
            boss_battle,
        })
    }
}

impl From<MapDefinition> for MapFile {
    fn from(def: MapDefinition) -> Self {
        MapFile {
            map: def.grid.to_rows(),
            application_form: def.goal,
            boss_battle: def.boss_battle.map(|b| BossBattleFile {
                enabled: true,
                switch: b.switch,
            }),
        }
    }
}

/// Default level dimensions
pub const DEFAULT_LEVEL_WIDTH: usize = 20;
pub const DEFAULT_LEVEL_HEIGHT: usize = 15;

impl MapDefinition {
    /// Built-in test level used whenever a map cannot be loaded
    pub fn default_level() -> Self {
        let mut grid = TileGrid::filled(DEFAULT_LEVEL_WIDTH, DEFAULT_LEVEL_HEIGHT, TileCode::Empty);
        let mut put = |x: usize, y: usize, tile: TileCode| {
            // Coordinates are fixed and inside the grid
            let _ = grid.set(x, y, tile);
        };

        // Floor
        for x in 0..DEFAULT_LEVEL_WIDTH {
            put(x, 10, TileCode::Block);
        }

        // Platforms
        for (x, y) in [(5, 8), (6, 8), (12, 8), (13, 8)] {
            put(x, y, TileCode::Block);
        }
        put(5, 7, TileCode::ItemBlock);
        put(12, 7, TileCode::ItemBlock);

        // Enemies
        put(8, 9, TileCode::WeakEnemy);
        put(15, 9, TileCode::StrongEnemy);

        put(10, 6, TileCode::Coffee);

        // Pipe
        put(18, 9, TileCode::Pipe);
        put(18, 8, TileCode::Pipe);

        Self {
            grid,
            goal: Some(GridPoint::new(18, 7)),
            boss_battle: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let file: MapFile = serde_json::from_str(json)?;
        Self::try_from(file)
    }

    pub fn from_json_or_default(json: &str) -> Self {
        Self::from_json(json).unwrap_or_else(|e| {
            log::warn!("Invalid map ({e}), using default level");
            Self::default_level()
        })
    }

    pub fn load(path: &Path) -> Result<Self, MapError> {
        let file: MapFile = persistence::load_json(path)?;
        let def = Self::try_from(file)?;
        log::info!(
            "Loaded map {} ({}x{})",
            path.display(),
            def.grid.width(),
            def.grid.height()
        );
        Ok(def)
    }

    /// Load a map, substituting the default level on any failure
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            log::warn!("Could not load {}: {e}; using default level", path.display());
            Self::default_level()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        persistence::save_json(path, &MapFile::from(self.clone()))?;
        log::info!("Map saved to {}", path.display());
        Ok(())
    }
}

/// Static colliders by block type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Colliders {
    pub normal: Vec<Rect>,
    pub item: Vec<Rect>,
    /// Pipe triggers (two cells tall, not solid)
    pub pipe: Vec<Rect>,
}

impl Colliders {
    /// Everything a body can stand on or bump into
    pub fn solids(&self) -> impl Iterator<Item = &Rect> {
        self.normal.iter().chain(self.item.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub kind: EnemyKind,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSpawn {
    pub kind: ItemKind,
    pub pos: Vec2,
}

/// Player spawn when the grid has no usable floor
pub const FALLBACK_SPAWN: Vec2 = Vec2::new(100.0, 0.0);

/// Everything the simulation needs from a map, in world units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelLayout {
    pub tile_size: f32,
    pub colliders: Colliders,
    pub enemy_spawns: Vec<EnemySpawn>,
    pub item_spawns: Vec<ItemSpawn>,
    pub goal: Option<Rect>,
    pub boss_battle: bool,
    pub boss_switch: Option<Rect>,
    pub player_spawn: Vec2,
    pub world_width: f32,
    pub world_height: f32,
}

impl LevelLayout {
    pub fn build(def: &MapDefinition, tile_size: f32) -> Self {
        let mut colliders = Colliders::default();
        let mut enemy_spawns = Vec::new();
        let mut item_spawns = Vec::new();

        for (x, y, tile) in def.grid.cells() {
            let pos = Vec2::new(x as f32 * tile_size, y as f32 * tile_size);
            let cell = Rect::new(pos.x, pos.y, tile_size, tile_size);
            match tile {
                TileCode::Empty => {}
                TileCode::Block => colliders.normal.push(cell),
                TileCode::ItemBlock => colliders.item.push(cell),
                TileCode::Pipe => colliders
                    .pipe
                    .push(Rect::new(pos.x, pos.y, tile_size, tile_size * 2.0)),
                TileCode::StrongEnemy => enemy_spawns.push(EnemySpawn {
                    kind: EnemyKind::Strong,
                    pos,
                }),
                TileCode::WeakEnemy => enemy_spawns.push(EnemySpawn {
                    kind: EnemyKind::Weak,
                    pos,
                }),
                TileCode::Boss => enemy_spawns.push(EnemySpawn {
                    kind: EnemyKind::Boss,
                    pos,
                }),
                TileCode::Coffee => item_spawns.push(ItemSpawn {
                    kind: ItemKind::Invincibility {
                        duration_ms: COFFEE_DURATION_MS,
                    },
                    pos,
                }),
                TileCode::Item => item_spawns.push(ItemSpawn {
                    kind: ItemKind::Generic,
                    pos,
                }),
            }
        }

        log::debug!(
            "Layout: normal={}, item={}, pipe={}, enemies={}, items={}",
            colliders.normal.len(),
            colliders.item.len(),
            colliders.pipe.len(),
            enemy_spawns.len(),
            item_spawns.len()
        );

        Self {
            tile_size,
            colliders,
            enemy_spawns,
            item_spawns,
            goal: def.goal.map(|g| g.to_rect(tile_size)),
            boss_battle: def.boss_battle.is_some(),
            boss_switch: def
                .boss_battle
                .and_then(|b| b.switch)
                .map(|s| s.to_rect(tile_size)),
            player_spawn: find_player_spawn(&def.grid, tile_size),
            world_width: def.grid.width() as f32 * tile_size,
            world_height: def.grid.height() as f32 * tile_size,
        }
    }
}

/// First block (top-down, left-to-right) with open space above it
fn find_player_spawn(grid: &TileGrid, tile_size: f32) -> Vec2 {
    for y in 1..grid.height() {
        for x in 0..grid.width() {
            if grid.get(x, y) == Some(TileCode::Block)
                && grid.get(x, y - 1) == Some(TileCode::Empty)
            {
                return Vec2::new(x as f32 * tile_size, (y - 1) as f32 * tile_size);
            }
        }
    }
    FALLBACK_SPAWN
}

/// A selectable map file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub path: PathBuf,
}

/// Map files in `dir`, sorted by name; a lone `level1` entry when there are none
pub fn list_stages(dir: &Path) -> Vec<Stage> {
    let mut stages: Vec<Stage> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .filter_map(|path| {
                let name = path.file_stem()?.to_string_lossy().into_owned();
                Some(Stage { name, path })
            })
            .collect(),
        Err(e) => {
            log::debug!("No stage directory {}: {e}", dir.display());
            Vec::new()
        }
    };

    if stages.is_empty() {
        stages.push(Stage {
            name: "level1".to_string(),
            path: dir.join("level1.json"),
        });
    }

    stages.sort_by(|a, b| a.name.cmp(&b.name));
    stages
}
