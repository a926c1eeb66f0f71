use bevy::prelude::*;
use sandbox_camera::{OrbitCamera, OrbitControl, OrbitInput};

use crate::{
    keyboard::HeldKeys,
    picking::{CameraPose, PickingRayResolver},
    transform_store::TransformStore,
    viewport_util::ViewportSize,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Pointer activity delivered to the session, in arrival order. Positions are
/// logical pixels relative to the render surface, origin top-left.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub enum PointerInput {
    Down {
        button: PointerButton,
        position: Vec2,
        /// False when the press landed on the control panel.
        on_surface: bool,
    },
    Up {
        button: PointerButton,
    },
    Move {
        position: Vec2,
    },
    Wheel {
        lines: f32,
    },
}

/// Who owns pointer motion right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    /// Pointer motion goes to the orbit camera.
    #[default]
    Idle,
    /// Pointer motion drags the object; the orbit camera is switched off.
    Dragging,
}

/// Where a pointer move is delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRoute {
    Picking,
    Orbit,
}

impl InputMode {
    pub fn dragging_active(self) -> bool {
        self == InputMode::Dragging
    }

    pub fn orbit_enabled(self) -> bool {
        self == InputMode::Idle
    }

    pub fn route_move(self) -> MoveRoute {
        match self {
            InputMode::Idle => MoveRoute::Orbit,
            InputMode::Dragging => MoveRoute::Picking,
        }
    }

    /// Primary press on the render surface. Returns true on `Idle -> Dragging`,
    /// the only case in which `set_orbit_enabled(false)` is called.
    pub fn pointer_down(&mut self, mut set_orbit_enabled: impl FnMut(bool)) -> bool {
        if *self == InputMode::Dragging {
            return false;
        }
        *self = InputMode::Dragging;
        set_orbit_enabled(false);
        true
    }

    /// Primary release anywhere. Returns true on `Dragging -> Idle`, the only
    /// case in which `set_orbit_enabled(true)` is called.
    pub fn pointer_up(&mut self, mut set_orbit_enabled: impl FnMut(bool)) -> bool {
        if *self == InputMode::Idle {
            return false;
        }
        *self = InputMode::Idle;
        set_orbit_enabled(true);
        true
    }
}

/// Session input state. Drag and orbit flags are both derived from `mode`,
/// so they cannot disagree.
#[derive(Resource, Debug, Default)]
pub struct InputState {
    pub mode: InputMode,
    pub held_keys: HeldKeys,
    last_pointer: Option<Vec2>,
}

impl InputState {
    pub fn dragging_active(&self) -> bool {
        self.mode.dragging_active()
    }

    pub fn orbit_enabled(&self) -> bool {
        self.mode.orbit_enabled()
    }
}

/// Picking settings for the live session.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct DragSettings {
    pub resolver: PickingRayResolver,
}

fn set_orbit_enabled(cameras: &mut Query<&mut OrbitCamera>, enabled: bool) {
    for mut camera in cameras {
        camera.set_enabled(enabled);
    }
}

/// Route pointer input in arrival order: primary press/release switch modes,
/// motion goes to picking while dragging and to the orbit camera otherwise.
pub(crate) fn dispatch_pointer_input(
    mut pointer: MessageReader<PointerInput>,
    mut input: ResMut<InputState>,
    mut store: ResMut<TransformStore>,
    mut orbit_out: MessageWriter<OrbitInput>,
    mut cameras: Query<&mut OrbitCamera>,
    settings: Res<DragSettings>,
    pose: Res<CameraPose>,
    viewport: Res<ViewportSize>,
) {
    for event in pointer.read() {
        match *event {
            PointerInput::Down {
                button: PointerButton::Primary,
                position,
                on_surface,
            } => {
                input.last_pointer = Some(position);
                if on_surface
                    && input
                        .mode
                        .pointer_down(|enabled| set_orbit_enabled(&mut cameras, enabled))
                {
                    debug!("Drag started at {position}");
                }
            }
            PointerInput::Down {
                button: PointerButton::Secondary,
                position,
                on_surface,
            } => {
                input.last_pointer = Some(position);
                if on_surface && input.orbit_enabled() {
                    orbit_out.write(OrbitInput::Grab(true));
                }
            }
            PointerInput::Up {
                button: PointerButton::Primary,
            } => {
                if input
                    .mode
                    .pointer_up(|enabled| set_orbit_enabled(&mut cameras, enabled))
                {
                    debug!("Drag finished");
                }
            }
            PointerInput::Up {
                button: PointerButton::Secondary,
            } => {
                if input.orbit_enabled() {
                    orbit_out.write(OrbitInput::Grab(false));
                }
            }
            PointerInput::Move { position } => {
                let previous = input.last_pointer.replace(position);
                match input.mode.route_move() {
                    MoveRoute::Picking => {
                        let ndc = viewport.pointer_to_ndc(position);
                        settings.resolver.resolve(
                            input.dragging_active(),
                            ndc,
                            &pose,
                            &mut store,
                        );
                    }
                    MoveRoute::Orbit => {
                        if let Some(previous) = previous {
                            orbit_out.write(OrbitInput::Motion(position - previous));
                        }
                    }
                }
            }
            PointerInput::Wheel { lines } => {
                if input.orbit_enabled() {
                    orbit_out.write(OrbitInput::Zoom(lines));
                }
            }
        }
    }
}
