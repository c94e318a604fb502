use std::fmt::{self, Display, Formatter};

use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::config::FieldConfig;

/// Column and row of a cell, (0, 0) being the top-left block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Offsets the position, or `None` when it would leave the positive quadrant.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }
}

impl Display for GridPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Geometry of the tile grid in world space.
///
/// Grid rows grow downward while world y grows upward, so row 0 is the top of the grid.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Grid {
    pub blocks_on_x: u32,
    pub blocks_on_y: u32,
    pub block_size: f32,
    /// Share of a block covered by its tile.
    pub block_scale: f32,
    /// World position of the grid's top-left corner.
    pub origin: Vec2,
}

impl Grid {
    /// A grid centred on the world origin.
    pub fn new(blocks_on_x: u32, blocks_on_y: u32, block_size: f32, block_scale: f32) -> Self {
        let mut grid = Self {
            blocks_on_x,
            blocks_on_y,
            block_size,
            block_scale,
            origin: Vec2::ZERO,
        };
        grid.origin = Vec2::new(-grid.width() / 2.0, grid.height() / 2.0);
        grid
    }

    pub fn from_config(config: &FieldConfig) -> Self {
        Self::new(
            config.blocks_on_x,
            config.blocks_on_y,
            config.block_size,
            config.block_scale,
        )
    }

    pub fn width(&self) -> f32 {
        self.blocks_on_x as f32 * self.block_size
    }

    pub fn height(&self) -> f32 {
        self.blocks_on_y as f32 * self.block_size
    }

    pub fn tile_size(&self) -> f32 {
        self.block_size * self.block_scale
    }

    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x < self.blocks_on_x && pos.y < self.blocks_on_y
    }

    /// Every cell, row by row.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + use<> {
        let (w, h) = (self.blocks_on_x, self.blocks_on_y);
        (0..h).flat_map(move |y| (0..w).map(move |x| GridPos::new(x, y)))
    }

    /// World position of the centre of a cell.
    pub fn world_position(&self, pos: GridPos) -> Vec2 {
        Vec2::new(
            (pos.x as f32 + 0.5).mul_add(self.block_size, self.origin.x),
            (pos.y as f32 + 0.5).mul_add(-self.block_size, self.origin.y),
        )
    }

    /// The cell under a world position, if any.
    pub fn grid_position(&self, world: Vec2) -> Option<GridPos> {
        let local = Vec2::new(world.x - self.origin.x, self.origin.y - world.y);
        if local.x < 0.0 || local.y < 0.0 || self.block_size <= 0.0 {
            return None;
        }
        let pos = GridPos::new(
            (local.x / self.block_size) as u32,
            (local.y / self.block_size) as u32,
        );
        self.contains(pos).then_some(pos)
    }

    /// Like [`Self::grid_position`], but only close to the cell centre.
    ///
    /// `snap_radius` is measured in blocks. Keeping it under half a block leaves a dead zone
    /// between cells so a drag crossing a corner does not pick up the diagonal cells.
    pub fn snapped_position(&self, world: Vec2, snap_radius: f32) -> Option<GridPos> {
        let pos = self.grid_position(world)?;
        let distance = world.distance(self.world_position(pos));
        (distance <= snap_radius * self.block_size).then_some(pos)
    }

    /// Fits the grid to a viewport of the given size, in logical pixels.
    pub fn resize(&mut self, viewport: Vec2, share_of_vmin: f32, vertical_divisor: f32) {
        if self.blocks_on_x == 0 {
            return;
        }
        let vmin = viewport.x.min(viewport.y);
        self.block_size = vmin * share_of_vmin / self.blocks_on_x as f32;

        // Screen space has its origin at the top-left and y pointing down.
        let screen_top = viewport.y / vertical_divisor - self.height() / 2.0;
        self.origin = Vec2::new(-self.width() / 2.0, viewport.y / 2.0 - screen_top);
    }
}

/// Which tile entity sits in which cell.
#[derive(Resource, Debug, Default)]
pub struct GridTiles(HashMap<GridPos, Entity>);

impl GridTiles {
    pub fn get(&self, pos: GridPos) -> Option<Entity> {
        self.0.get(&pos).copied()
    }

    pub fn insert(&mut self, pos: GridPos, entity: Entity) -> Option<Entity> {
        self.0.insert(pos, entity)
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Entity> {
        self.0.remove(&pos)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
