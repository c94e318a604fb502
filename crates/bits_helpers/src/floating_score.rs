use core::time::Duration;

use bevy::prelude::*;

use crate::FONT;

const RISE_DISTANCE: f32 = 50.0;
const FLOATING_SCORE_Z: f32 = 10.0;

/// World-space text that rises and fades out, then despawns itself.
#[derive(Component)]
pub struct FloatingScore {
    timer: Timer,
    origin: Vec2,
}

impl FloatingScore {
    pub fn new(origin: Vec2, lifetime: Duration) -> Self {
        Self {
            timer: Timer::new(lifetime, TimerMode::Once),
            origin,
        }
    }
}

pub struct FloatingScorePlugin;

impl Plugin for FloatingScorePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, animate_floating_scores);
    }
}

pub fn spawn_floating_score(
    commands: &mut Commands,
    position: Vec2,
    text: &str,
    color: Srgba,
    asset_server: &AssetServer,
) -> Entity {
    commands
        .spawn((
            Text2d::new(text),
            TextFont {
                font: asset_server.load(FONT),
                font_size: 24.0,
                ..default()
            },
            TextColor(Color::Srgba(color)),
            Transform::from_translation(position.extend(FLOATING_SCORE_Z)),
            FloatingScore::new(position, Duration::from_secs(1)),
        ))
        .id()
}

pub fn animate_floating_scores(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut TextColor, &mut FloatingScore)>,
) {
    for (entity, mut transform, mut color, mut floating_score) in &mut query {
        floating_score.timer.tick(time.delta());
        let progress = floating_score.timer.fraction();

        transform.translation.y = RISE_DISTANCE.mul_add(progress, floating_score.origin.y);
        color.0.set_alpha(1.0 - progress);

        if floating_score.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
