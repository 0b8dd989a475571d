//! Tile grid - the static level geometry.
//!
//! The level is a fixed-size grid of tile codes stored row-major. Tile `(x, y)`
//! covers the world rectangle `[x * size, (x + 1) * size) × [y * size, (y + 1) * size)`
//! with y growing downward.

use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Edge length of one tile in world units.
pub const TILE_SIZE: f32 = 16.0;

/// Tile type at a grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tile {
    /// Passable from every side.
    #[default]
    Empty = 0,
    /// Solid from every side.
    Ground = 1,
    /// Solid from every side.
    Brick = 2,
    /// Solid from below only; entities pass through it from above and the sides.
    QuestionBlock = 3,
}

impl Tile {
    /// Whether the tile blocks movement from every direction.
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Ground | Tile::Brick)
    }

    /// Whether the tile stops an entity moving upward into it.
    pub fn blocks_from_below(self) -> bool {
        self.is_solid() || self == Tile::QuestionBlock
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Ground),
            2 => Some(Tile::Brick),
            3 => Some(Tile::QuestionBlock),
            _ => None,
        }
    }

    /// Layout glyph: `.` or space, `#`, `B`, `?`.
    pub fn from_glyph(glyph: char) -> Option<Tile> {
        match glyph {
            '.' | ' ' => Some(Tile::Empty),
            '#' => Some(Tile::Ground),
            'B' => Some(Tile::Brick),
            '?' => Some(Tile::QuestionBlock),
            _ => None,
        }
    }
}

/// Grid of tiles. Stored as an ECS resource so systems can query it.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: f32,
    /// Row-major tiles.
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Create an all-empty grid with the default tile size.
    pub fn new(width: usize, height: usize) -> SimResult<Self> {
        Self::with_tile_size(width, height, TILE_SIZE)
    }

    /// Create an all-empty grid with a custom tile size.
    pub fn with_tile_size(width: usize, height: usize, tile_size: f32) -> SimResult<Self> {
        if width == 0 || height == 0 {
            return Err(SimError::invalid(format!(
                "grid dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(SimError::invalid("grid dimensions exceed i32 range"));
        }
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(SimError::invalid(format!(
                "tile size must be positive and finite, got {tile_size}"
            )));
        }

        Ok(Self {
            width,
            height,
            tile_size,
            tiles: vec![Tile::Empty; width * height],
        })
    }

    /// Build a grid from ASCII rows, top row first.
    pub fn from_rows(rows: &[&str]) -> SimResult<Self> {
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        let mut grid = Self::new(width, rows.len())?;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(SimError::invalid(format!(
                    "layout row {y} has {} tiles, expected {width}",
                    row.chars().count()
                )));
            }
            for (x, glyph) in row.chars().enumerate() {
                let tile = Tile::from_glyph(glyph).ok_or_else(|| {
                    SimError::invalid(format!("unknown tile glyph {glyph:?} at ({x}, {y})"))
                })?;
                grid.tiles[y * width + x] = tile;
            }
        }

        Ok(grid)
    }

    fn index(&self, x: i32, y: i32) -> SimResult<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(SimError::OutOfBounds { x, y });
        }
        Ok(y as usize * self.width + x as usize)
    }

    /// Tile at grid coordinates.
    pub fn get(&self, x: i32, y: i32) -> SimResult<Tile> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    /// Overwrite the tile at grid coordinates.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> SimResult<()> {
        let i = self.index(x, y)?;
        self.tiles[i] = tile;
        Ok(())
    }

    /// Fill a `w × h` rectangle whose top-left tile is `(x, y)`.
    /// Nothing is written unless the whole rectangle is in bounds.
    pub fn fill(&mut self, x: i32, y: i32, w: i32, h: i32, tile: Tile) -> SimResult<()> {
        if w <= 0 || h <= 0 {
            return Ok(());
        }
        self.index(x, y)?;
        // Saturated corners are past any grid, so overflow reports out of bounds.
        self.index(x.saturating_add(w - 1), y.saturating_add(h - 1))?;
        for ty in y..y + h {
            for tx in x..x + w {
                self.set(tx, ty, tile)?;
            }
        }
        Ok(())
    }

    /// Ground or Brick. Out-of-bounds cells are not solid.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map(Tile::is_solid).unwrap_or(false)
    }

    /// Ground, Brick or QuestionBlock. Out-of-bounds cells do not block.
    pub fn blocks_from_below(&self, x: i32, y: i32) -> bool {
        self.get(x, y).map(Tile::blocks_from_below).unwrap_or(false)
    }

    pub fn contains_column(&self, x: i32) -> bool {
        x >= 0 && (x as usize) < self.width
    }

    /// Tile cell containing a world point (may be out of bounds).
    pub fn world_to_tile(&self, world_x: f32, world_y: f32) -> (i32, i32) {
        (
            (world_x / self.tile_size).floor() as i32,
            (world_y / self.tile_size).floor() as i32,
        )
    }

    /// World position of a tile's top-left corner.
    pub fn tile_origin(&self, x: i32, y: i32) -> (f32, f32) {
        (x as f32 * self.tile_size, y as f32 * self.tile_size)
    }

    /// First and last cell index covered by the half-open world interval `[min, max)`.
    /// An empty interval yields `last < first`.
    pub fn cell_span(&self, min: f32, max: f32) -> (i32, i32) {
        let first = (min / self.tile_size).floor() as i32;
        let last = ((max / self.tile_size).ceil() as i32).saturating_sub(1);
        (first, last)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn world_width(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn world_height(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

/// Snapshot of the grid for renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
    /// Flattened row-major tile codes (see `Tile::code`).
    pub tiles: Vec<u8>,
}

impl TileSnapshot {
    pub fn from_grid(grid: &TileGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            tile_size: grid.tile_size,
            tiles: grid.tiles.iter().map(|t| t.code()).collect(),
        }
    }
}
