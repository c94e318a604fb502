use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use strum::EnumCount;
use thiserror::Error;

use crate::tile::{TileIcon, TileShape};

/// Which cells count as neighbours when extending a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Adjacency {
    /// Up, down, left and right.
    #[default]
    Orthogonal,
    /// Orthogonal cells plus the four diagonals.
    Diagonal,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Grid must have at least one block on each axis, got {x}x{y}")]
    EmptyGrid { x: u32, y: u32 },

    #[error("Block size must be positive, got {0}")]
    BlockSize(f32),

    #[error("Block scale must be in (0, 1], got {0}")]
    BlockScale(f32),

    #[error("A match needs at least 2 tiles, got {0}")]
    MatchLength(usize),

    #[error("Grid share of the window must be in (0, 1], got {0}")]
    GridShare(f32),

    #[error("Grid vertical divisor must be positive, got {0}")]
    VerticalDivisor(f32),

    #[error("Snap radius must be in (0, 0.5], got {0}")]
    SnapRadius(f32),

    #[error("Shape count must be in 1..={max}, got {count}")]
    ShapeCount { count: usize, max: usize },

    #[error("Icon count must be in 1..={max}, got {count}")]
    IconCount { count: usize, max: usize },
}

/// Tunables of the game field.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConfig {
    pub blocks_on_x: u32,
    pub blocks_on_y: u32,
    /// Block size before the first resize.
    pub block_size: f32,
    /// Share of a block covered by its tile.
    pub block_scale: f32,
    pub min_match_length: usize,
    /// Width of the grid relative to the smallest window side.
    pub grid_share_of_vmin: f32,
    /// The grid centre sits at `height / grid_vertical_divisor` from the top of the window.
    pub grid_vertical_divisor: f32,
    /// Distance from a tile centre, in blocks, inside which a drag snaps onto the tile.
    pub snap_radius: f32,
    pub adjacency: Adjacency,
    pub shape_count: usize,
    pub icon_count: usize,
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            blocks_on_x: 6,
            blocks_on_y: 6,
            block_size: 90.0,
            block_scale: 0.9,
            min_match_length: 3,
            grid_share_of_vmin: 0.7,
            grid_vertical_divisor: 1.6,
            snap_radius: 0.4,
            adjacency: Adjacency::Orthogonal,
            shape_count: 4,
            icon_count: 4,
            seed: None,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blocks_on_x == 0 || self.blocks_on_y == 0 {
            return Err(ConfigError::EmptyGrid {
                x: self.blocks_on_x,
                y: self.blocks_on_y,
            });
        }
        if self.block_size.is_nan() || self.block_size <= 0.0 {
            return Err(ConfigError::BlockSize(self.block_size));
        }
        if !(self.block_scale > 0.0 && self.block_scale <= 1.0) {
            return Err(ConfigError::BlockScale(self.block_scale));
        }
        if self.min_match_length < 2 {
            return Err(ConfigError::MatchLength(self.min_match_length));
        }
        if !(self.grid_share_of_vmin > 0.0 && self.grid_share_of_vmin <= 1.0) {
            return Err(ConfigError::GridShare(self.grid_share_of_vmin));
        }
        if !(self.grid_vertical_divisor > 0.0 && self.grid_vertical_divisor.is_finite()) {
            return Err(ConfigError::VerticalDivisor(self.grid_vertical_divisor));
        }
        if !(self.snap_radius > 0.0 && self.snap_radius <= 0.5) {
            return Err(ConfigError::SnapRadius(self.snap_radius));
        }
        if self.shape_count == 0 || self.shape_count > TileShape::COUNT {
            return Err(ConfigError::ShapeCount {
                count: self.shape_count,
                max: TileShape::COUNT,
            });
        }
        if self.icon_count == 0 || self.icon_count > TileIcon::COUNT {
            return Err(ConfigError::IconCount {
                count: self.icon_count,
                max: TileIcon::COUNT,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(FieldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_grid() {
        let config = FieldConfig {
            blocks_on_y: 0,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGrid { x: 6, y: 0 })
        );
    }

    #[test]
    fn rejects_out_of_range_values() {
        let scale = FieldConfig {
            block_scale: 1.5,
            ..FieldConfig::default()
        };
        assert_eq!(scale.validate(), Err(ConfigError::BlockScale(1.5)));

        let length = FieldConfig {
            min_match_length: 1,
            ..FieldConfig::default()
        };
        assert_eq!(length.validate(), Err(ConfigError::MatchLength(1)));

        let shapes = FieldConfig {
            shape_count: TileShape::COUNT + 1,
            ..FieldConfig::default()
        };
        assert!(matches!(
            shapes.validate(),
            Err(ConfigError::ShapeCount { .. })
        ));
    }

    #[test]
    fn rejects_layout_that_cannot_be_placed() {
        let divisor = FieldConfig {
            grid_vertical_divisor: 0.0,
            ..FieldConfig::default()
        };
        assert_eq!(divisor.validate(), Err(ConfigError::VerticalDivisor(0.0)));

        let share = FieldConfig {
            grid_share_of_vmin: -0.5,
            ..FieldConfig::default()
        };
        assert_eq!(share.validate(), Err(ConfigError::GridShare(-0.5)));

        let snap = FieldConfig {
            snap_radius: 0.0,
            ..FieldConfig::default()
        };
        assert_eq!(snap.validate(), Err(ConfigError::SnapRadius(0.0)));

        let nan = FieldConfig {
            snap_radius: f32::NAN,
            ..FieldConfig::default()
        };
        assert!(matches!(nan.validate(), Err(ConfigError::SnapRadius(_))));
    }
}
