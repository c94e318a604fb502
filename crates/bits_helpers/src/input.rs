use bevy::prelude::*;

/// Screen position of the pointer while the left mouse button or a finger is held down.
///
/// The mouse wins over touches when both are active.
pub fn pressed_screen_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    window: &Window,
) -> Option<Vec2> {
    if button_input.pressed(MouseButton::Left) {
        window.cursor_position()
    } else {
        touch_input.iter().next().map(|touch| touch.position())
    }
}

pub fn pressed_world_position(
    button_input: &ButtonInput<MouseButton>,
    touch_input: &Touches,
    window: &Window,
    camera: &Camera,
    camera_transform: &GlobalTransform,
) -> Option<Vec2> {
    let position = pressed_screen_position(button_input, touch_input, window)?;
    screen_to_world(position, camera, camera_transform)
}

pub fn screen_to_world(
    position: Vec2,
    camera: &Camera,
    camera_transform: &GlobalTransform,
) -> Option<Vec2> {
    camera.viewport_to_world_2d(camera_transform, position).ok()
}

/// True on the frame the left mouse button or the last finger on the screen is lifted.
///
/// Does not need a cursor position, so releasing outside the window still counts.
pub fn is_just_released(button_input: &ButtonInput<MouseButton>, touch_input: &Touches) -> bool {
    button_input.just_released(MouseButton::Left)
        || (touch_input.any_just_released() && touch_input.iter().next().is_none())
}
