use bevy::prelude::*;
use strum::IntoEnumIterator;

use crate::config::FieldConfig;
use crate::grid::{Grid, GridPos};
use crate::path_checker::{PathChecker, PatternTile};
use crate::tile::{Tile, TileIcon, TileShape};

const MAX_GENERATION_ATTEMPTS: usize = 32;

/// Picks shapes and icons for the grid.
#[derive(Resource)]
pub struct LevelGenerator {
    rng: fastrand::Rng,
    shapes: Vec<TileShape>,
    icons: Vec<TileIcon>,
}

impl LevelGenerator {
    pub fn new(config: &FieldConfig) -> Self {
        let rng = config
            .seed
            .map_or_else(fastrand::Rng::new, fastrand::Rng::with_seed);
        Self {
            rng,
            shapes: TileShape::iter().take(config.shape_count.max(1)).collect(),
            icons: TileIcon::iter().take(config.icon_count.max(1)).collect(),
        }
    }

    pub fn random_tile(&mut self) -> (TileShape, TileIcon) {
        let shape = self
            .rng
            .choice(self.shapes.iter().copied())
            .unwrap_or(TileShape::Circle);
        let icon = self
            .rng
            .choice(self.icons.iter().copied())
            .unwrap_or(TileIcon::Ruby);
        (shape, icon)
    }

    /// Calls `factory` once per cell, row by row, with a random shape and icon.
    pub fn generate_grid<T>(
        &mut self,
        grid: &Grid,
        mut factory: impl FnMut(GridPos, TileShape, TileIcon) -> T,
    ) -> Vec<T> {
        grid.positions()
            .map(|pos| {
                let (shape, icon) = self.random_tile();
                factory(pos, shape, icon)
            })
            .collect()
    }

    /// Generates grids until one has at least one valid path of `min_len` tiles.
    ///
    /// Gives up after a bounded number of attempts and returns the last grid.
    pub fn generate_playable<T: PatternTile>(
        &mut self,
        grid: &Grid,
        checker: &PathChecker,
        min_len: usize,
        mut factory: impl FnMut(GridPos, TileShape, TileIcon) -> T,
    ) -> Vec<T> {
        let mut tiles = self.generate_grid(grid, &mut factory);
        for attempt in 1..MAX_GENERATION_ATTEMPTS {
            if checker.has_possible_path(&tiles, min_len) {
                debug!("Generated a playable grid in {attempt} attempt(s)");
                return tiles;
            }
            tiles = self.generate_grid(grid, &mut factory);
        }
        if !checker.has_possible_path(&tiles, min_len) {
            warn!(
                "No playable grid after {MAX_GENERATION_ATTEMPTS} attempts, keeping the last one"
            );
        }
        tiles
    }
}
