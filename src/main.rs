use bevy::prelude::*;
use orbit_sandbox::SandboxPlugin;

fn main() -> AppExit {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Orbit Sandbox".into(),
                ..default()
            }),
            ..default()
        }))
        // Built after `DefaultPlugins` so config loading is logged.
        .add_plugins(SandboxPlugin::default())
        .run()
}
