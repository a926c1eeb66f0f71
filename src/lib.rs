pub mod config;
pub mod input_mode;
pub mod keyboard;
pub mod panel;
pub mod picking;
pub mod scene;
pub mod transform_store;
pub mod viewport_util;
mod window_input;

use bevy::prelude::*;
use sandbox_camera::{OrbitCameraPlugin, OrbitCameraSystems};
use sandbox_widgets::{SandboxWidgetsPlugins, WidgetSystems};

use config::SandboxConfig;
use input_mode::{DragSettings, InputState, PointerInput};
use keyboard::{KeyBindings, KeyInput, KeyboardDeltaAccumulator};
use panel::{PanelBinding, PanelBindingPlugin, PanelLayoutPlugin};
use picking::{CameraPose, PickingRayResolver};
use scene::{MaterialColor, ScenePlugin, SelectedShape};
use transform_store::{TransformStore, TransformStorePlugin};
use viewport_util::ViewportSize;

/// Entities the sandbox spawns for itself (camera, lights, grid, panel).
#[derive(Component, Default)]
pub struct SandboxEntity;

/// Per-frame phases, run in this order every `Update`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Window input, pointer routing, held keys, widget interaction.
    Input,
    /// Held keys applied to the transform store.
    Keyboard,
    /// Orbit camera damping.
    Orbit,
    /// Store values pushed into the panel.
    Panel,
    /// Store mirrored onto the mesh, widget text, colour and shape.
    Render,
}

/// Session logic without windowing, rendering or UI. Drive it by writing
/// [`PointerInput`] and [`KeyInput`] messages.
#[derive(Default)]
pub struct SandboxCorePlugin {
    pub config: SandboxConfig,
}

impl Plugin for SandboxCorePlugin {
    fn build(&self, app: &mut App) {
        let config = &self.config;
        let color = config.color().unwrap_or_else(|err| {
            warn!("{err:#}, using red");
            Srgba::RED
        });

        app.configure_sets(
            Update,
            (
                FrameSet::Input,
                FrameSet::Keyboard,
                FrameSet::Orbit,
                FrameSet::Panel,
                FrameSet::Render,
            )
                .chain(),
        )
        .configure_sets(Update, OrbitCameraSystems.in_set(FrameSet::Orbit))
        .add_plugins((OrbitCameraPlugin, TransformStorePlugin, PanelBindingPlugin))
        .add_message::<PointerInput>()
        .add_message::<KeyInput>()
        .insert_resource(config.clone())
        .init_resource::<InputState>()
        .init_resource::<CameraPose>()
        .init_resource::<ViewportSize>()
        .insert_resource(DragSettings {
            resolver: PickingRayResolver {
                standoff_distance: config.standoff_distance,
            },
        })
        .insert_resource(KeyboardDeltaAccumulator {
            bindings: KeyBindings::for_scheme(config.control_scheme),
            move_speed: config.move_speed,
            rotation_speed: config.rotation_speed,
        })
        .insert_resource(MaterialColor(color))
        .insert_resource(SelectedShape(config.initial_shape))
        .add_systems(
            Update,
            (
                (input_mode::dispatch_pointer_input, keyboard::track_held_keys)
                    .chain()
                    .in_set(FrameSet::Input),
                keyboard::apply_keyboard_deltas.in_set(FrameSet::Keyboard),
            ),
        );

        let binding = PanelBinding::from_specs(
            &config.panel_fields,
            app.world().resource::<TransformStore>(),
            color,
            config.initial_shape,
        );
        app.insert_resource(binding);

        info!(
            "Sandbox session ready ({:?} controls, standoff {})",
            config.control_scheme, config.standoff_distance
        );
    }
}

/// The full interactive sandbox: session core plus scene, window input and
/// the control panel. Add it next to `DefaultPlugins`.
pub struct SandboxPlugin {
    pub config: SandboxConfig,
}

impl SandboxPlugin {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }
}

impl Default for SandboxPlugin {
    fn default() -> Self {
        Self::new(SandboxConfig::load_or_default())
    }
}

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            SandboxCorePlugin {
                config: self.config.clone(),
            },
            SandboxWidgetsPlugins,
            ScenePlugin,
            PanelLayoutPlugin,
            window_input::WindowInputPlugin,
        ))
        .configure_sets(
            Update,
            (
                WidgetSystems::Interaction.in_set(FrameSet::Input),
                WidgetSystems::Display.in_set(FrameSet::Render),
            ),
        )
        .add_systems(Startup, viewport_util::init_viewport_size)
        .add_systems(
            Update,
            (viewport_util::track_viewport_size, picking::capture_camera_pose)
                .before(input_mode::dispatch_pointer_input)
                .in_set(FrameSet::Input),
        );
    }
}
