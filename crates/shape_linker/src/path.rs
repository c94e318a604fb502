use bevy::prelude::*;
use thiserror::Error;

use crate::grid::GridPos;
use crate::path_checker::PathChecker;
use crate::tile::{Tile, TileIcon, TileShape};

/// A tile as it was when it joined the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTile {
    pub entity: Entity,
    pub pos: GridPos,
    pub shape: TileShape,
    pub icon: TileIcon,
}

impl PathTile {
    pub const fn new(entity: Entity, tile: &Tile) -> Self {
        Self {
            entity,
            pos: tile.pos,
            shape: tile.shape,
            icon: tile.icon,
        }
    }
}

/// Why a tile could not extend the path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRejection {
    #[error("Tile at {0} is already in the path")]
    AlreadyInPath(GridPos),

    #[error("Tile at {next} is not a neighbour of {last}")]
    NotNeighbour { last: GridPos, next: GridPos },

    #[error("Tile at {0} does not fit the path pattern")]
    PatternImpossible(GridPos),
}

/// The path being drawn.
///
/// Entries are unique, every entry is a neighbour of the previous one and the whole path is
/// pattern-possible. Every mutation keeps those invariants.
#[derive(Resource, Debug, Default)]
pub struct CurrentPath {
    tiles: Vec<PathTile>,
}

impl CurrentPath {
    pub fn tiles(&self) -> &[PathTile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn last(&self) -> Option<&PathTile> {
        self.tiles.last()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.tiles.iter().any(|tile| tile.entity == entity)
    }

    /// Appends `tile`, or leaves the path untouched and says why not.
    pub fn try_push(&mut self, tile: PathTile, checker: &PathChecker) -> Result<(), PathRejection> {
        if self.contains(tile.entity) {
            return Err(PathRejection::AlreadyInPath(tile.pos));
        }

        let Some(previous) = self.tiles.last().copied() else {
            self.tiles.push(tile);
            return Ok(());
        };
        self.tiles.push(tile);

        let rejection = if !checker.is_pattern_possible(&self.tiles) {
            Some(PathRejection::PatternImpossible(tile.pos))
        } else if !checker.is_neighbour(previous.pos, tile.pos) {
            Some(PathRejection::NotNeighbour {
                last: previous.pos,
                next: tile.pos,
            })
        } else {
            None
        };

        match rejection {
            Some(rejection) => {
                self.tiles.pop();
                Err(rejection)
            }
            None => Ok(()),
        }
    }

    /// Dragging back onto the second-to-last tile undoes the last step.
    ///
    /// Returns the removed tile.
    pub fn backtrack_to(&mut self, entity: Entity) -> Option<PathTile> {
        let [.., previous, _] = self.tiles.as_slice() else {
            return None;
        };
        if previous.entity != entity {
            return None;
        }
        self.tiles.pop()
    }

    /// Empties the path and hands over its tiles.
    pub fn take(&mut self) -> Vec<PathTile> {
        core::mem::take(&mut self.tiles)
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
    }
}
