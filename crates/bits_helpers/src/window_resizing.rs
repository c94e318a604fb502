// wgpu refuses surfaces larger than the maximum texture size:
// "`Surface` width and height must be within the maximum supported texture size."
#[cfg(target_arch = "wasm32")]
const MAX_SURFACE_SIZE: f32 = 2048.0;

/// Follows the browser's inner size, clamped to what the GPU surface accepts.
#[cfg(target_arch = "wasm32")]
pub fn handle_browser_resize(
    mut primary_query: bevy::ecs::system::Query<
        &mut bevy::window::Window,
        bevy::ecs::query::With<bevy::window::PrimaryWindow>,
    >,
) {
    let Some((target_width, target_height)) = browser_inner_size() else {
        return;
    };

    for mut window in &mut primary_query {
        if (window.resolution.width() - target_width).abs() > f32::EPSILON
            || (window.resolution.height() - target_height).abs() > f32::EPSILON
        {
            window.resolution.set(
                target_width.min(MAX_SURFACE_SIZE),
                target_height.min(MAX_SURFACE_SIZE),
            );
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_inner_size() -> Option<(f32, f32)> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some((width as f32, height as f32))
}
