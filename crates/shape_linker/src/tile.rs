use bevy::color::palettes::css::{BLUE, LIME, MAGENTA, RED, YELLOW};
use bevy::math::primitives::{Circle, Rectangle, RegularPolygon, Rhombus};
use bevy::prelude::*;
use bevy::utils::HashMap;
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

use crate::grid::{Grid, GridPos};

/// How long a matched tile takes to shrink away.
pub const LEAVE_SECONDS: f32 = 0.3;
/// Scale applied on top of the block size while a tile is part of the path.
pub const SELECTED_SCALE: f32 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum TileShape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Hexagon,
}

impl TileShape {
    /// Mesh fitting in a 1x1 box, scaled up to the block size by the tile's transform.
    pub fn mesh(self) -> Mesh {
        match self {
            Self::Circle => Mesh::from(Circle::new(0.5)),
            Self::Square => Mesh::from(Rectangle::new(0.85, 0.85)),
            Self::Triangle => Mesh::from(RegularPolygon::new(0.55, 3)),
            Self::Diamond => Mesh::from(Rhombus::new(0.9, 1.0)),
            Self::Hexagon => Mesh::from(RegularPolygon::new(0.5, 6)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumCount)]
pub enum TileIcon {
    Ruby,
    Sapphire,
    Emerald,
    Topaz,
    Amethyst,
}

impl TileIcon {
    pub const fn color(self) -> Color {
        match self {
            Self::Ruby => Color::Srgba(RED),
            Self::Sapphire => Color::Srgba(BLUE),
            Self::Emerald => Color::Srgba(LIME),
            Self::Topaz => Color::Srgba(YELLOW),
            Self::Amethyst => Color::Srgba(MAGENTA),
        }
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub pos: GridPos,
    pub shape: TileShape,
    pub icon: TileIcon,
}

impl Tile {
    pub const fn new(pos: GridPos, shape: TileShape, icon: TileIcon) -> Self {
        Self { pos, shape, icon }
    }
}

#[derive(Component, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    #[default]
    Idle,
    Selected,
    /// Matched and shrinking away; cannot be picked again.
    Leaving,
}

#[derive(Component)]
pub struct TileLeaving(Timer);

/// Sent once a leaving tile has fully disappeared and its cell is empty.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCleared {
    pub pos: GridPos,
}

/// Marks everything spawned by the game field, despawned with it.
#[derive(Component)]
pub struct FieldEntity;

/// Shared mesh and material handles, one per shape and one per icon.
#[derive(Resource, Default)]
pub struct TileAssets {
    meshes: HashMap<TileShape, Handle<Mesh>>,
    materials: HashMap<TileIcon, Handle<ColorMaterial>>,
}

impl TileAssets {
    pub fn mesh(&self, shape: TileShape) -> Handle<Mesh> {
        self.meshes.get(&shape).cloned().unwrap_or_default()
    }

    pub fn material(&self, icon: TileIcon) -> Handle<ColorMaterial> {
        self.materials.get(&icon).cloned().unwrap_or_default()
    }
}

pub fn setup_tile_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let assets = TileAssets {
        meshes: TileShape::iter()
            .map(|shape| (shape, meshes.add(shape.mesh())))
            .collect(),
        materials: TileIcon::iter()
            .map(|icon| (icon, materials.add(ColorMaterial::from(icon.color()))))
            .collect(),
    };
    commands.insert_resource(assets);
}

pub fn spawn_tile(commands: &mut Commands, assets: &TileAssets, grid: &Grid, tile: Tile) -> Entity {
    commands
        .spawn((
            tile,
            TileState::Idle,
            Mesh2d(assets.mesh(tile.shape)),
            MeshMaterial2d(assets.material(tile.icon)),
            Transform::from_translation(grid.world_position(tile.pos).extend(0.0))
                .with_scale(Vec3::splat(grid.tile_size())),
            Name::new(format!("Tile {}", tile.pos)),
            FieldEntity,
        ))
        .id()
}

/// Starts the leave animation of a matched tile.
pub fn animate_out(commands: &mut Commands, entity: Entity) {
    commands.entity(entity).insert((
        TileState::Leaving,
        TileLeaving(Timer::from_seconds(LEAVE_SECONDS, TimerMode::Once)),
    ));
}

pub fn animate_leaving_tiles(
    mut commands: Commands,
    time: Res<Time>,
    mut leaving: Query<(Entity, &Tile, &mut TileLeaving)>,
    mut cleared: EventWriter<TileCleared>,
) {
    for (entity, tile, mut timer) in &mut leaving {
        timer.0.tick(time.delta());
        if timer.0.finished() {
            commands.entity(entity).despawn_recursive();
            cleared.send(TileCleared { pos: tile.pos });
        }
    }
}

/// Keeps every tile at its cell centre and sized to the current block size.
pub fn place_tiles(
    grid: Res<Grid>,
    mut tiles: Query<(&Tile, &TileState, Option<&TileLeaving>, &mut Transform)>,
) {
    let tile_size = grid.tile_size();
    for (tile, state, leaving, mut transform) in &mut tiles {
        let factor = match state {
            TileState::Idle => 1.0,
            TileState::Selected => SELECTED_SCALE,
            TileState::Leaving => leaving.map_or(0.0, |timer| 1.0 - timer.0.fraction()),
        };
        transform.translation = grid.world_position(tile.pos).extend(0.0);
        transform.scale = Vec3::splat(tile_size * factor);
    }
}
