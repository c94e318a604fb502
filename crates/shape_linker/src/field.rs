use bevy::color::palettes::css::YELLOW;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bits_helpers::FONT;
use bits_helpers::floating_score::spawn_floating_score;
use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::grid::{Grid, GridTiles};
use crate::input::{DragState, GridInputSet, InputUp, TileDragSnap};
use crate::level::LevelGenerator;
use crate::path::{CurrentPath, PathTile};
use crate::path_checker::PathChecker;
use crate::tile::{
    FieldEntity, Tile, TileAssets, TileCleared, TileState, animate_leaving_tiles, animate_out,
    place_tiles, setup_tile_assets, spawn_tile,
};
use crate::{GameState, MainCamera};

#[derive(Resource, Default, Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScoreInfo {
    pub current_score: u32,
    pub high_score: u32,
}

impl ScoreInfo {
    pub fn add(&mut self, points: u32) {
        self.current_score += points;
        self.high_score = self.high_score.max(self.current_score);
    }
}

/// A path was released long enough to count as a match.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PathMatched {
    pub length: usize,
    pub points: u32,
    /// Where the path ended, in world space.
    pub at: Vec2,
}

/// Set when cells were refilled and the board may have run out of paths.
#[derive(Resource, Debug, Default)]
pub struct BoardDirty(pub bool);

#[derive(Component)]
struct ScoreText;

/// Longer paths are worth more than the sum of their tiles.
pub fn match_points(length: usize, min_match_length: usize) -> u32 {
    if length < min_match_length {
        return 0;
    }
    (length * (length + 1 - min_match_length)) as u32
}

pub struct GameFieldPlugin;

impl Plugin for GameFieldPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<FieldConfig>()
            .cloned()
            .unwrap_or_default();

        app.init_state::<GameState>()
            .enable_state_scoped_entities::<GameState>()
            .insert_resource(Grid::from_config(&config))
            .insert_resource(PathChecker::new(config.adjacency))
            .insert_resource(LevelGenerator::new(&config))
            .insert_resource(config)
            .init_resource::<GridTiles>()
            .init_resource::<CurrentPath>()
            .init_resource::<ScoreInfo>()
            .init_resource::<BoardDirty>()
            .add_event::<TileCleared>()
            .add_event::<PathMatched>()
            .add_systems(Startup, (setup_camera, setup_tile_assets, start_playing))
            .add_systems(OnEnter(GameState::Playing), setup_grid)
            .add_systems(OnExit(GameState::Playing), destroy_field)
            .add_systems(OnEnter(GameState::Restarting), start_playing)
            .add_systems(OnEnter(GameState::GameOver), show_game_over)
            .add_systems(
                Update,
                (
                    add_new_tile,
                    input_release,
                    animate_leaving_tiles,
                    refill_cleared_tiles,
                    reshuffle_if_stuck,
                )
                    .chain()
                    .after(GridInputSet)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (resize_field, place_tiles, show_match_score, update_score_text).chain(),
            );
    }
}

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d).insert(MainCamera);
}

fn start_playing(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::Playing);
}

/// Generates the level and spawns a tile entity per cell.
fn setup_grid(
    mut commands: Commands,
    config: Res<FieldConfig>,
    checker: Res<PathChecker>,
    assets: Res<TileAssets>,
    windows: Query<&Window, With<PrimaryWindow>>,
    asset_server: Res<AssetServer>,
    mut generator: ResMut<LevelGenerator>,
    mut grid_tiles: ResMut<GridTiles>,
    mut grid: ResMut<Grid>,
) {
    *grid = Grid::from_config(&config);
    if let Ok(window) = windows.get_single() {
        grid.resize(
            Vec2::new(window.width(), window.height()),
            config.grid_share_of_vmin,
            config.grid_vertical_divisor,
        );
    }

    let tiles = generator.generate_playable(&grid, &checker, config.min_match_length, Tile::new);
    for tile in tiles {
        let entity = spawn_tile(&mut commands, &assets, &grid, tile);
        grid_tiles.insert(tile.pos, entity);
    }
    info!(
        "Spawned a {}x{} grid",
        grid.blocks_on_x, grid.blocks_on_y
    );

    commands.spawn((
        Text::new("Score: 0"),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 32.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(16.0),
            left: Val::Px(16.0),
            ..default()
        },
        ScoreText,
        FieldEntity,
    ));
}

/// A drag reached a new tile: extend the path, step back, or ignore the tile.
fn add_new_tile(
    mut drag_snap: EventReader<TileDragSnap>,
    mut path: ResMut<CurrentPath>,
    checker: Res<PathChecker>,
    mut tiles: Query<(&Tile, &mut TileState)>,
) {
    for TileDragSnap(entity) in drag_snap.read() {
        let Ok((tile, state)) = tiles.get(*entity).map(|(tile, state)| (*tile, *state)) else {
            warn!("Snapped onto {entity:?}, which is not a tile");
            continue;
        };
        if state == TileState::Leaving {
            continue;
        }
        let candidate = PathTile::new(*entity, &tile);

        if let Some(removed) = path.backtrack_to(*entity) {
            if let Ok((_, mut removed_state)) = tiles.get_mut(removed.entity) {
                *removed_state = TileState::Idle;
            }
            debug!("Stepped back from {}", removed.pos);
            continue;
        }

        match path.try_push(candidate, &checker) {
            Ok(()) => {
                if let Ok((_, mut state)) = tiles.get_mut(*entity) {
                    *state = TileState::Selected;
                }
                debug!("Path now has {} tile(s)", path.len());
            }
            Err(rejection) => debug!("Discarded tile: {rejection}"),
        }
    }
}

/// The pointer was released: a long enough path is a match, anything else is dropped.
fn input_release(
    mut commands: Commands,
    mut input_up: EventReader<InputUp>,
    mut path: ResMut<CurrentPath>,
    config: Res<FieldConfig>,
    grid: Res<Grid>,
    mut score: ResMut<ScoreInfo>,
    mut matched: EventWriter<PathMatched>,
    mut tile_states: Query<&mut TileState>,
) {
    if input_up.is_empty() {
        return;
    }
    input_up.clear();

    let tiles = cancel_path(&mut path, &mut tile_states);
    let Some(last) = tiles.last() else {
        return;
    };
    if tiles.len() < config.min_match_length {
        return;
    }

    for tile in &tiles {
        animate_out(&mut commands, tile.entity);
    }
    let points = match_points(tiles.len(), config.min_match_length);
    score.add(points);
    matched.send(PathMatched {
        length: tiles.len(),
        points,
        at: grid.world_position(last.pos),
    });
    info!("Matched {} tiles for {points} points", tiles.len());
}

/// Clears the path, returning its tiles to idle, and hands over what it held.
fn cancel_path(path: &mut CurrentPath, tile_states: &mut Query<&mut TileState>) -> Vec<PathTile> {
    let tiles = path.take();
    for tile in &tiles {
        if let Ok(mut state) = tile_states.get_mut(tile.entity) {
            *state = TileState::Idle;
        }
    }
    tiles
}

/// Puts a fresh tile in every cell emptied by a match.
fn refill_cleared_tiles(
    mut commands: Commands,
    mut cleared: EventReader<TileCleared>,
    mut generator: ResMut<LevelGenerator>,
    mut grid_tiles: ResMut<GridTiles>,
    mut dirty: ResMut<BoardDirty>,
    assets: Res<TileAssets>,
    grid: Res<Grid>,
) {
    for TileCleared { pos } in cleared.read() {
        let (shape, icon) = generator.random_tile();
        let entity = spawn_tile(&mut commands, &assets, &grid, Tile::new(*pos, shape, icon));
        grid_tiles.insert(*pos, entity);
        dirty.0 = true;
    }
}

/// Once the board has settled after a refill, reshuffles it if no path is left.
///
/// Waits for the current drag to end, since the path holds the tiles as they were picked.
fn reshuffle_if_stuck(
    mut dirty: ResMut<BoardDirty>,
    path: Res<CurrentPath>,
    mut generator: ResMut<LevelGenerator>,
    config: Res<FieldConfig>,
    checker: Res<PathChecker>,
    grid: Res<Grid>,
    assets: Res<TileAssets>,
    mut tiles: Query<(
        &mut Tile,
        &TileState,
        &mut Mesh2d,
        &mut MeshMaterial2d<ColorMaterial>,
    )>,
) {
    if !dirty.0
        || !path.is_empty()
        || tiles
            .iter()
            .any(|(_, state, _, _)| *state == TileState::Leaving)
    {
        return;
    }
    dirty.0 = false;

    let board: Vec<Tile> = tiles.iter().map(|(tile, _, _, _)| *tile).collect();
    if checker.has_possible_path(&board, config.min_match_length) {
        return;
    }

    info!("No path left, reshuffling the board");
    let fresh = generator.generate_playable(&grid, &checker, config.min_match_length, Tile::new);
    for (mut tile, _, mut mesh, mut material) in &mut tiles {
        let Some(replacement) = fresh.iter().find(|fresh| fresh.pos == tile.pos) else {
            continue;
        };
        *tile = *replacement;
        mesh.0 = assets.mesh(replacement.shape);
        material.0 = assets.material(replacement.icon);
    }
}

fn resize_field(
    mut resized: EventReader<WindowResized>,
    config: Res<FieldConfig>,
    mut grid: ResMut<Grid>,
) {
    let Some(event) = resized.read().last() else {
        return;
    };
    grid.resize(
        Vec2::new(event.width, event.height),
        config.grid_share_of_vmin,
        config.grid_vertical_divisor,
    );
    debug!("Resized grid, block size is now {}", grid.block_size);
}

fn show_match_score(
    mut commands: Commands,
    mut matched: EventReader<PathMatched>,
    asset_server: Res<AssetServer>,
) {
    for event in matched.read() {
        spawn_floating_score(
            &mut commands,
            event.at,
            &format!("+{}", event.points),
            YELLOW,
            &asset_server,
        );
    }
}

fn update_score_text(score: Res<ScoreInfo>, mut texts: Query<&mut Text, With<ScoreText>>) {
    if !score.is_changed() {
        return;
    }
    for mut text in &mut texts {
        text.0 = format!("Score: {}", score.current_score);
    }
}

/// Tears the field down: tiles, score text and the path in progress.
fn destroy_field(
    mut commands: Commands,
    entities: Query<Entity, With<FieldEntity>>,
    mut grid_tiles: ResMut<GridTiles>,
    mut path: ResMut<CurrentPath>,
    mut drag: ResMut<DragState>,
    mut dirty: ResMut<BoardDirty>,
    mut cleared: ResMut<Events<TileCleared>>,
) {
    for entity in &entities {
        commands.entity(entity).despawn_recursive();
    }
    // Cells emptied before the teardown must not be refilled on the next field.
    cleared.clear();
    grid_tiles.clear();
    path.clear();
    drag.last_snapped = None;
    dirty.0 = false;
}

fn show_game_over(mut commands: Commands, score: Res<ScoreInfo>, asset_server: Res<AssetServer>) {
    commands.spawn((
        Text::new(format!(
            "Game Over\nScore: {}\nBest: {}",
            score.current_score, score.high_score
        )),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 40.0,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(40.0),
            width: Val::Percent(100.0),
            ..default()
        },
        StateScoped(GameState::GameOver),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPos;
    use crate::tile::{TileIcon, TileShape};

    fn test_app() -> App {
        let mut app = App::new();
        let config = FieldConfig {
            seed: Some(5),
            ..FieldConfig::default()
        };
        app.insert_resource(Grid::from_config(&config))
            .insert_resource(PathChecker::new(config.adjacency))
            .insert_resource(LevelGenerator::new(&config))
            .insert_resource(config)
            .init_resource::<GridTiles>()
            .init_resource::<CurrentPath>()
            .init_resource::<ScoreInfo>()
            .init_resource::<BoardDirty>()
            .init_resource::<TileAssets>()
            .add_event::<TileDragSnap>()
            .add_event::<InputUp>()
            .add_event::<TileCleared>()
            .add_event::<PathMatched>()
            .add_systems(
                Update,
                (add_new_tile, input_release, refill_cleared_tiles, reshuffle_if_stuck).chain(),
            );
        app
    }

    fn spawn(app: &mut App, x: u32, y: u32, shape: TileShape, icon: TileIcon) -> Entity {
        let tile = Tile::new(GridPos::new(x, y), shape, icon);
        let entity = app.world_mut().spawn((tile, TileState::Idle)).id();
        app.world_mut().resource_mut::<GridTiles>().insert(tile.pos, entity);
        entity
    }

    fn drag(app: &mut App, entities: &[Entity]) {
        for entity in entities {
            app.world_mut().send_event(TileDragSnap(*entity));
            app.update();
        }
    }

    fn state(app: &App, entity: Entity) -> Option<TileState> {
        app.world().get::<TileState>(entity).copied()
    }

    #[test]
    fn points_grow_with_length() {
        assert_eq!(match_points(2, 3), 0);
        assert_eq!(match_points(3, 3), 3);
        assert_eq!(match_points(4, 3), 8);
        assert_eq!(match_points(5, 3), 15);
    }

    #[test]
    fn dragging_builds_and_selects_the_path() {
        let mut app = test_app();
        let a = spawn(&mut app, 0, 0, TileShape::Circle, TileIcon::Ruby);
        let b = spawn(&mut app, 1, 0, TileShape::Circle, TileIcon::Topaz);
        let far = spawn(&mut app, 3, 0, TileShape::Circle, TileIcon::Ruby);
        let odd = spawn(&mut app, 1, 1, TileShape::Square, TileIcon::Sapphire);

        drag(&mut app, &[a, b, far, odd]);

        let path: Vec<_> = app
            .world()
            .resource::<CurrentPath>()
            .tiles()
            .iter()
            .map(|tile| tile.entity)
            .collect();
        assert_eq!(path, vec![a, b]);
        assert_eq!(state(&app, a), Some(TileState::Selected));
        assert_eq!(state(&app, b), Some(TileState::Selected));
        assert_eq!(state(&app, far), Some(TileState::Idle));
        assert_eq!(state(&app, odd), Some(TileState::Idle));
    }

    #[test]
    fn dragging_back_undoes_the_last_step() {
        let mut app = test_app();
        let a = spawn(&mut app, 0, 0, TileShape::Circle, TileIcon::Ruby);
        let b = spawn(&mut app, 1, 0, TileShape::Circle, TileIcon::Ruby);

        drag(&mut app, &[a, b, a]);

        assert_eq!(app.world().resource::<CurrentPath>().len(), 1);
        assert_eq!(state(&app, a), Some(TileState::Selected));
        assert_eq!(state(&app, b), Some(TileState::Idle));
    }

    #[test]
    fn short_path_is_cancelled_on_release() {
        let mut app = test_app();
        let a = spawn(&mut app, 0, 0, TileShape::Circle, TileIcon::Ruby);
        let b = spawn(&mut app, 0, 1, TileShape::Circle, TileIcon::Ruby);

        drag(&mut app, &[a, b]);
        app.world_mut().send_event(InputUp);
        app.update();

        assert!(app.world().resource::<CurrentPath>().is_empty());
        assert_eq!(state(&app, a), Some(TileState::Idle));
        assert_eq!(state(&app, b), Some(TileState::Idle));
        assert_eq!(app.world().resource::<ScoreInfo>().current_score, 0);
    }

    #[test]
    fn long_path_is_matched_on_release() {
        let mut app = test_app();
        let tiles = [
            spawn(&mut app, 0, 0, TileShape::Hexagon, TileIcon::Emerald),
            spawn(&mut app, 1, 0, TileShape::Hexagon, TileIcon::Ruby),
            spawn(&mut app, 2, 0, TileShape::Hexagon, TileIcon::Topaz),
        ];

        drag(&mut app, &tiles);
        app.world_mut().send_event(InputUp);
        app.update();

        assert!(app.world().resource::<CurrentPath>().is_empty());
        for entity in tiles {
            assert_eq!(state(&app, entity), Some(TileState::Leaving));
        }
        let score = *app.world().resource::<ScoreInfo>();
        assert_eq!(score.current_score, 3);
        assert_eq!(score.high_score, 3);

        let matched: Vec<_> = app
            .world()
            .resource::<Events<PathMatched>>()
            .iter_current_update_events()
            .map(|event| (event.length, event.points))
            .collect();
        assert_eq!(matched, vec![(3, 3)]);
    }

    #[test]
    fn cleared_cells_are_refilled() {
        let mut app = test_app();
        let pos = GridPos::new(4, 4);

        app.world_mut().send_event(TileCleared { pos });
        app.update();

        let entity = app.world().resource::<GridTiles>().get(pos);
        let tile = entity.and_then(|entity| app.world().get::<Tile>(entity).copied());
        assert_eq!(tile.map(|tile| tile.pos), Some(pos));
    }

    /// Fills the board so that no two neighbours share a shape or an icon.
    fn spawn_stuck_board(app: &mut App) -> Vec<Entity> {
        let grid = app.world().resource::<Grid>().clone();
        grid.positions()
            .map(|pos| {
                let (shape, icon) = if (pos.x + pos.y) % 2 == 0 {
                    (TileShape::Circle, TileIcon::Ruby)
                } else {
                    (TileShape::Square, TileIcon::Sapphire)
                };
                let tile = Tile::new(pos, shape, icon);
                let entity = app
                    .world_mut()
                    .spawn((
                        tile,
                        TileState::Idle,
                        Mesh2d(Handle::default()),
                        MeshMaterial2d(Handle::<ColorMaterial>::default()),
                    ))
                    .id();
                app.world_mut().resource_mut::<GridTiles>().insert(pos, entity);
                entity
            })
            .collect()
    }

    fn board(app: &mut App) -> Vec<Tile> {
        let mut query = app.world_mut().query::<&Tile>();
        query.iter(app.world()).copied().collect()
    }

    #[test]
    fn stuck_board_is_reshuffled() {
        let mut app = test_app();
        spawn_stuck_board(&mut app);
        app.world_mut().resource_mut::<BoardDirty>().0 = true;
        app.update();

        assert!(!app.world().resource::<BoardDirty>().0);
        let board = board(&mut app);
        assert_eq!(board.len(), 36);
        let checker = *app.world().resource::<PathChecker>();
        assert!(checker.has_possible_path(&board, 3));
    }

    #[test]
    fn reshuffle_waits_for_the_drag_to_end() {
        let mut app = test_app();
        let entities = spawn_stuck_board(&mut app);
        let Some(&first) = entities.first() else {
            panic!("board has no tiles");
        };
        let before = board(&mut app);

        drag(&mut app, &[first]);
        app.world_mut().resource_mut::<BoardDirty>().0 = true;
        app.update();

        assert!(app.world().resource::<BoardDirty>().0);
        assert_eq!(board(&mut app), before);
        let picked = app.world().resource::<CurrentPath>().last().copied();
        let tile = app.world().get::<Tile>(first).copied();
        assert_eq!(
            picked.map(|picked| (picked.shape, picked.icon)),
            tile.map(|tile| (tile.shape, tile.icon))
        );

        app.world_mut().send_event(InputUp);
        app.update();

        assert!(app.world().resource::<CurrentPath>().is_empty());
        assert!(!app.world().resource::<BoardDirty>().0);
        let checker = *app.world().resource::<PathChecker>();
        assert!(checker.has_possible_path(&board(&mut app), 3));
    }

    #[test]
    fn teardown_drops_pending_refills() {
        let mut app = test_app();
        app.init_resource::<DragState>()
            .add_systems(Startup, destroy_field);
        let pos = GridPos::new(1, 1);

        app.world_mut().send_event(TileCleared { pos });
        app.update();

        assert!(app.world().resource::<GridTiles>().is_empty());
        assert!(board(&mut app).is_empty());
    }
}
