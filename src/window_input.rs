use bevy::{
    input::{
        ButtonState,
        keyboard::KeyboardInput,
        mouse::{MouseButtonInput, MouseScrollUnit, MouseWheel},
    },
    picking::hover::HoverMap,
    prelude::*,
    window::{WindowEvent, WindowFocused},
};

use crate::{
    FrameSet,
    input_mode::{self, InputState, PointerButton, PointerInput},
    keyboard::{self, KeyId, KeyInput},
    panel::PanelNode,
};

/// Pixel-unit wheel events are scaled to lines by this factor.
const PIXELS_PER_LINE: f32 = 100.0;

/// Feeds window input into the session as [`PointerInput`] and [`KeyInput`].
pub(crate) struct WindowInputPlugin;

impl Plugin for WindowInputPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<WindowEvent>()
            .add_message::<WindowFocused>()
            .init_resource::<HoverMap>()
            .add_systems(
                Update,
                (
                    adapt_window_input.before(input_mode::dispatch_pointer_input),
                    release_keys_on_focus_loss.after(keyboard::track_held_keys),
                )
                    .in_set(FrameSet::Input),
            );
    }
}

#[derive(Debug, PartialEq)]
enum Adapted {
    Pointer(PointerInput),
    Key(KeyInput),
}

/// Translate one window event. `cursor` is the last cursor position seen in
/// the stream and is updated by cursor motion.
fn adapt_event(event: &WindowEvent, cursor: &mut Option<Vec2>, over_panel: bool) -> Option<Adapted> {
    match event {
        WindowEvent::CursorMoved(moved) => {
            *cursor = Some(moved.position);
            Some(Adapted::Pointer(PointerInput::Move {
                position: moved.position,
            }))
        }
        WindowEvent::MouseButtonInput(MouseButtonInput { button, state, .. }) => {
            let button = match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Right => PointerButton::Secondary,
                _ => return None,
            };
            let input = match state {
                ButtonState::Pressed => PointerInput::Down {
                    button,
                    position: (*cursor)?,
                    on_surface: !over_panel,
                },
                ButtonState::Released => PointerInput::Up { button },
            };
            Some(Adapted::Pointer(input))
        }
        WindowEvent::MouseWheel(MouseWheel { unit, y, .. }) => {
            if over_panel {
                return None;
            }
            let lines = match unit {
                MouseScrollUnit::Line => *y,
                MouseScrollUnit::Pixel => *y / PIXELS_PER_LINE,
            };
            Some(Adapted::Pointer(PointerInput::Wheel { lines }))
        }
        // Auto-repeat carries no new information; the held set already has it.
        WindowEvent::KeyboardInput(KeyboardInput { repeat: true, .. }) => None,
        WindowEvent::KeyboardInput(key) => Some(Adapted::Key(KeyInput {
            key: KeyId::from_logical(&key.logical_key),
            pressed: key.state == ButtonState::Pressed,
        })),
        _ => None,
    }
}

/// Translate window events into session messages in arrival order, across
/// pointer and keyboard alike.
pub(crate) fn adapt_window_input(
    mut events: MessageReader<WindowEvent>,
    mut cursor: Local<Option<Vec2>>,
    windows: Query<&Window>,
    hover_map: Res<HoverMap>,
    panel_nodes: Query<(), With<PanelNode>>,
    mut pointer_out: MessageWriter<PointerInput>,
    mut key_out: MessageWriter<KeyInput>,
) {
    let over_panel = hover_map
        .values()
        .any(|hits| hits.keys().any(|&entity| panel_nodes.contains(entity)));
    if cursor.is_none() {
        *cursor = windows.single().ok().and_then(Window::cursor_position);
    }

    for event in events.read() {
        match adapt_event(event, &mut cursor, over_panel) {
            Some(Adapted::Pointer(input)) => {
                pointer_out.write(input);
            }
            Some(Adapted::Key(input)) => {
                key_out.write(input);
            }
            None => {}
        }
    }
}

/// Release every held key when the window loses focus; the matching key-up
/// events never arrive.
pub(crate) fn release_keys_on_focus_loss(
    mut focus: MessageReader<WindowFocused>,
    mut input: ResMut<InputState>,
) {
    for event in focus.read() {
        if !event.focused && !input.held_keys.is_empty() {
            debug!("Window lost focus, releasing held keys");
            input.held_keys.release_all();
        }
    }
}
