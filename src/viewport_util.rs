use bevy::{prelude::*, window::WindowResized};

/// Logical size of the render surface that pointer coordinates are relative to.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ViewportSize {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

impl ViewportSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Convert a surface-relative pointer position (origin top-left, y down)
    /// into normalized device coordinates in `[-1, 1]²` (y up).
    pub fn pointer_to_ndc(&self, pointer: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * pointer.x / self.width - 1.0,
            1.0 - 2.0 * pointer.y / self.height,
        )
    }
}

/// Track window resizes. A minimised window reports zero size and is ignored so
/// NDC conversion never divides by zero.
pub(crate) fn track_viewport_size(
    mut resized: MessageReader<WindowResized>,
    mut viewport: ResMut<ViewportSize>,
) {
    for event in resized.read() {
        if event.width <= 0.0 || event.height <= 0.0 {
            debug!("Ignoring resize to {}x{}", event.width, event.height);
            continue;
        }
        *viewport = ViewportSize::new(event.width, event.height);
        debug!("Viewport resized to {}x{}", event.width, event.height);
    }
}

/// Seed the viewport size from the primary window before the first resize
/// notification arrives.
pub(crate) fn init_viewport_size(windows: Query<&Window>, mut viewport: ResMut<ViewportSize>) {
    let Ok(window) = windows.single() else {
        return;
    };
    if window.width() > 0.0 && window.height() > 0.0 {
        *viewport = ViewportSize::new(window.width(), window.height());
    }
}
