mod config;
mod field;
mod grid;
mod input;
mod level;
mod line_drawer;
mod path;
mod path_checker;
mod ribbit;
mod tile;

use bevy::prelude::*;
use bits_helpers::floating_score::FloatingScorePlugin;
pub use config::{Adjacency, FieldConfig};
use ribbit::ShapeLinker;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
    Restarting,
    GameOver,
}

#[derive(Component)]
struct MainCamera;

pub fn run() {
    run_with(FieldConfig::default());
}

pub fn run_with(config: FieldConfig) {
    let mut app = bits_helpers::get_default_app::<ShapeLinker>(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
    );

    // Logging only exists once the default app has added its `LogPlugin`.
    app.insert_resource(validated_or_default(config))
        .add_plugins(input::GridInputPlugin)
        .add_plugins(field::GameFieldPlugin)
        .add_plugins(line_drawer::LineDrawerPlugin)
        .add_plugins(FloatingScorePlugin)
        .run();
}

fn validated_or_default(config: FieldConfig) -> FieldConfig {
    match config.validate() {
        Ok(()) => config,
        Err(err) => {
            error!("Invalid field config, using defaults: {err}");
            FieldConfig::default()
        }
    }
}
