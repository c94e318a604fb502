use bevy::prelude::*;
use bevy::utils::{HashMap, HashSet};

use crate::config::Adjacency;
use crate::grid::GridPos;
use crate::path::PathTile;
use crate::tile::{Tile, TileIcon, TileShape};

/// Anything that can take part in a path pattern.
pub trait PatternTile {
    fn pos(&self) -> GridPos;
    fn shape(&self) -> TileShape;
    fn icon(&self) -> TileIcon;
}

impl<T: PatternTile> PatternTile for &T {
    fn pos(&self) -> GridPos {
        (**self).pos()
    }

    fn shape(&self) -> TileShape {
        (**self).shape()
    }

    fn icon(&self) -> TileIcon {
        (**self).icon()
    }
}

impl PatternTile for Tile {
    fn pos(&self) -> GridPos {
        self.pos
    }

    fn shape(&self) -> TileShape {
        self.shape
    }

    fn icon(&self) -> TileIcon {
        self.icon
    }
}

impl PatternTile for PathTile {
    fn pos(&self) -> GridPos {
        self.pos
    }

    fn shape(&self) -> TileShape {
        self.shape
    }

    fn icon(&self) -> TileIcon {
        self.icon
    }
}

#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathChecker {
    pub adjacency: Adjacency,
}

impl PathChecker {
    pub const fn new(adjacency: Adjacency) -> Self {
        Self { adjacency }
    }

    pub const fn is_neighbour(&self, a: GridPos, b: GridPos) -> bool {
        let dx = a.x.abs_diff(b.x);
        let dy = a.y.abs_diff(b.y);
        match self.adjacency {
            Adjacency::Orthogonal => dx + dy == 1,
            Adjacency::Diagonal => dx <= 1 && dy <= 1 && dx + dy > 0,
        }
    }

    /// A path is possible while all its tiles share one shape or one icon.
    pub fn is_pattern_possible<T: PatternTile>(&self, path: &[T]) -> bool {
        let Some((first, rest)) = path.split_first() else {
            return true;
        };
        rest.iter().all(|tile| tile.shape() == first.shape())
            || rest.iter().all(|tile| tile.icon() == first.icon())
    }

    /// Whether the board holds at least one valid path of `min_len` tiles.
    pub fn has_possible_path<T: PatternTile>(&self, tiles: &[T], min_len: usize) -> bool {
        if min_len <= 1 {
            return !tiles.is_empty();
        }
        let board: HashMap<GridPos, &T> = tiles.iter().map(|tile| (tile.pos(), tile)).collect();

        tiles.iter().any(|start| {
            let mut path = vec![start];
            let mut visited = HashSet::default();
            visited.insert(start.pos());
            self.extend_path(&board, &mut path, &mut visited, min_len)
        })
    }

    fn extend_path<'a, T: PatternTile>(
        &self,
        board: &HashMap<GridPos, &'a T>,
        path: &mut Vec<&'a T>,
        visited: &mut HashSet<GridPos>,
        min_len: usize,
    ) -> bool {
        if path.len() >= min_len {
            return true;
        }
        let Some(last) = path.last().map(|tile| tile.pos()) else {
            return false;
        };

        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(next_pos) = last.offset(dx, dy) else {
                    continue;
                };
                if visited.contains(&next_pos) || !self.is_neighbour(last, next_pos) {
                    continue;
                }
                let Some(next) = board.get(&next_pos).copied() else {
                    continue;
                };

                path.push(next);
                if self.is_pattern_possible(path) {
                    visited.insert(next_pos);
                    if self.extend_path(board, path, visited, min_len) {
                        return true;
                    }
                    visited.remove(&next_pos);
                }
                path.pop();
            }
        }
        false
    }
}
