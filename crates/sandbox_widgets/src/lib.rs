pub mod choice_input;
pub mod numeric_input;

use bevy::app::{PluginGroup, PluginGroupBuilder};
use bevy::prelude::*;

/// Widget systems, split so the host can order edits and display refreshes
/// independently.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetSystems {
    /// Pointer interaction that produces user edits.
    Interaction,
    /// Re-render widget text from widget values. Never emits change events.
    Display,
}

pub struct SandboxWidgetsPlugins;

impl PluginGroup for SandboxWidgetsPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(numeric_input::NumericInputPlugin)
            .add(choice_input::ChoiceInputPlugin)
    }
}
