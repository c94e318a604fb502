use bevy::log::info;
use bevy::prelude::*;
use bits_helpers::RibbitMessageHandler;
use ribbit_bits::{BitDuration, BitResult};

use crate::GameState;
use crate::field::ScoreInfo;

#[derive(Default, Clone, Copy)]
pub struct ShapeLinker;

impl RibbitMessageHandler for ShapeLinker {
    fn restart(world: &mut World) {
        info!("Restarting ShapeLinker");

        let high_score = world.resource::<ScoreInfo>().high_score;
        world.insert_resource(ScoreInfo {
            current_score: 0,
            high_score,
        });

        let mut next_state = world.resource_mut::<NextState<GameState>>();
        next_state.set(GameState::Restarting);
    }

    fn end(world: &mut World) -> BitResult {
        info!("Ending ShapeLinker");

        let mut next_state = world.resource_mut::<NextState<GameState>>();
        next_state.set(GameState::GameOver);

        let score = world.resource::<ScoreInfo>();
        BitResult::HighestScore(score.current_score.into())
    }

    fn duration(_world: &mut World) -> BitDuration {
        BitDuration::max_duration()
    }
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;

    fn app_with_score(current_score: u32) -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<GameState>()
            .insert_resource(ScoreInfo {
                current_score,
                high_score: 12,
            });
        app
    }

    #[test]
    fn restart_keeps_the_high_score() {
        let mut app = app_with_score(7);

        ShapeLinker::restart(app.world_mut());
        app.update();

        assert_eq!(
            *app.world().resource::<ScoreInfo>(),
            ScoreInfo {
                current_score: 0,
                high_score: 12
            }
        );
        assert_eq!(
            app.world().resource::<State<GameState>>().get(),
            &GameState::Restarting
        );
    }

    #[test]
    fn end_moves_to_game_over() {
        let mut app = app_with_score(9);

        ShapeLinker::end(app.world_mut());
        app.update();

        assert_eq!(
            app.world().resource::<State<GameState>>().get(),
            &GameState::GameOver
        );
    }
}
