use bevy::prelude::*;

use crate::grid::Grid;
use crate::path::CurrentPath;

const LINE_WIDTH: f32 = 8.0;
/// Radius of the dot drawn on every tile of the path, in blocks.
const NODE_RADIUS: f32 = 0.12;

pub struct LineDrawerPlugin;

impl Plugin for LineDrawerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, configure_line_width)
            .add_systems(PostUpdate, draw_path);
    }
}

fn configure_line_width(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line_width = LINE_WIDTH;
}

/// Centres of the path's tiles, in path order.
pub fn path_points(path: &CurrentPath, grid: &Grid) -> Vec<Vec2> {
    path.tiles()
        .iter()
        .map(|tile| grid.world_position(tile.pos))
        .collect()
}

/// Redraws the path every frame; an empty path draws nothing.
fn draw_path(path: Res<CurrentPath>, grid: Res<Grid>, mut gizmos: Gizmos) {
    let Some(first) = path.tiles().first() else {
        return;
    };
    let color = first.icon.color();
    let points = path_points(&path, &grid);

    if points.len() > 1 {
        gizmos.linestrip_2d(points.iter().copied(), color);
    }
    for point in points {
        gizmos.circle_2d(point, NODE_RADIUS * grid.block_size, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPos;
    use crate::path::PathTile;
    use crate::path_checker::PathChecker;
    use crate::tile::{Tile, TileIcon, TileShape};

    #[test]
    fn points_follow_the_path() {
        let grid = Grid::new(6, 6, 90.0, 0.9);
        let checker = PathChecker::default();
        let mut path = CurrentPath::default();
        assert!(path_points(&path, &grid).is_empty());

        for (index, x) in [0_u32, 1, 2].into_iter().enumerate() {
            let tile = Tile::new(GridPos::new(x, 0), TileShape::Square, TileIcon::Topaz);
            path.try_push(PathTile::new(Entity::from_raw(index as u32), &tile), &checker)
                .ok();
        }

        let points = path_points(&path, &grid);
        assert_eq!(
            points,
            vec![
                Vec2::new(-225.0, 225.0),
                Vec2::new(-135.0, 225.0),
                Vec2::new(-45.0, 225.0),
            ]
        );
    }
}
