use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bits_helpers::input::{is_just_released, pressed_world_position};

use crate::config::FieldConfig;
use crate::grid::{Grid, GridTiles};
use crate::tile::TileState;
use crate::{GameState, MainCamera};

/// The pointer, held down, moved onto a tile.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDragSnap(pub Entity);

/// The pointer was released.
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputUp;

/// Tile the pointer last snapped onto during the current drag.
#[derive(Resource, Debug, Default)]
pub struct DragState {
    pub last_snapped: Option<Entity>,
}

impl DragState {
    /// Records the tile under the pointer and returns it when the drag just reached it.
    pub fn snap_onto(&mut self, entity: Entity) -> Option<Entity> {
        if self.last_snapped == Some(entity) {
            return None;
        }
        self.last_snapped = Some(entity);
        Some(entity)
    }

    pub fn release(&mut self) {
        self.last_snapped = None;
    }
}

/// The tile whose snap area holds `world_position`, unless it is already leaving.
pub fn tile_under_pointer(
    world_position: Vec2,
    grid: &Grid,
    snap_radius: f32,
    grid_tiles: &GridTiles,
    is_leaving: impl Fn(Entity) -> bool,
) -> Option<Entity> {
    let pos = grid.snapped_position(world_position, snap_radius)?;
    grid_tiles.get(pos).filter(|entity| !is_leaving(*entity))
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, SystemSet)]
pub struct GridInputSet;

pub struct GridInputPlugin;

impl Plugin for GridInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DragState>()
            .add_event::<TileDragSnap>()
            .add_event::<InputUp>()
            .add_systems(
                Update,
                check_input_on_tiles
                    .in_set(GridInputSet)
                    .run_if(in_state(GameState::Playing)),
            );
    }
}

pub fn check_input_on_tiles(
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    grid: Res<Grid>,
    config: Res<FieldConfig>,
    grid_tiles: Res<GridTiles>,
    tile_states: Query<&TileState>,
    mut drag: ResMut<DragState>,
    mut drag_snap: EventWriter<TileDragSnap>,
    mut input_up: EventWriter<InputUp>,
) {
    if is_just_released(&mouse_button_input, &touch_input) {
        drag.release();
        input_up.send(InputUp);
        return;
    }

    let Ok(window) = windows.get_single() else {
        return;
    };
    let Ok((camera, camera_transform)) = camera.get_single() else {
        return;
    };
    let Some(world_position) = pressed_world_position(
        &mouse_button_input,
        &touch_input,
        window,
        camera,
        camera_transform,
    ) else {
        return;
    };

    let Some(entity) = tile_under_pointer(
        world_position,
        &grid,
        config.snap_radius,
        &grid_tiles,
        |entity| matches!(tile_states.get(entity), Ok(TileState::Leaving)),
    ) else {
        return;
    };
    if let Some(entity) = drag.snap_onto(entity) {
        drag_snap.send(TileDragSnap(entity));
    }
}
