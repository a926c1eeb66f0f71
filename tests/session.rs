use bevy::prelude::*;
use orbit_sandbox::{
    SandboxCorePlugin,
    config::SandboxConfig,
    input_mode::{InputMode, InputState, PointerButton, PointerInput},
    keyboard::{ControlScheme, KeyId, KeyInput},
    panel::{FieldEdited, PanelBinding, PanelValue},
    picking::{CameraPose, PickingRayResolver},
    scene::{SelectedShape, ShapeKind},
    transform_store::TransformStore,
};
use sandbox_camera::{OrbitCamera, OrbitControl};
use sandbox_widgets::numeric_input::{ActiveDrag, NumericDragState};

fn session(config: SandboxConfig) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, SandboxCorePlugin { config }));
    app.world_mut().spawn((
        OrbitCamera::looking_from(Vec3::new(0.0, 5.0, 15.0), Vec3::ZERO),
        Transform::default(),
    ));
    app.update();
    app
}

fn send(app: &mut App, input: PointerInput) {
    app.world_mut().write_message(input);
    app.update();
}

fn press_key(app: &mut App, key: &str, pressed: bool) {
    app.world_mut().write_message(KeyInput {
        key: KeyId::new(key),
        pressed,
    });
}

fn orbit(app: &mut App) -> OrbitCamera {
    let mut cameras = app.world_mut().query::<&OrbitCamera>();
    cameras.single(app.world()).unwrap().clone()
}

fn store(app: &App) -> &TransformStore {
    app.world().resource::<TransformStore>()
}

fn displayed(app: &App, name: &str) -> PanelValue {
    let binding = app.world().resource::<PanelBinding>();
    binding
        .displayed(binding.handle(name).unwrap())
        .unwrap()
        .clone()
}

#[test]
fn drag_takes_the_pointer_away_from_the_orbit_camera() {
    let mut app = session(SandboxConfig::default());

    // Orbiting works while idle.
    send(
        &mut app,
        PointerInput::Down {
            button: PointerButton::Secondary,
            position: Vec2::new(300.0, 300.0),
            on_surface: true,
        },
    );
    send(&mut app, PointerInput::Move { position: Vec2::new(340.0, 300.0) });
    send(&mut app, PointerInput::Up { button: PointerButton::Secondary });
    let yaw_after_orbit = orbit(&mut app).target_yaw;
    assert_ne!(yaw_after_orbit, OrbitCamera::default().target_yaw);

    send(
        &mut app,
        PointerInput::Down {
            button: PointerButton::Primary,
            position: Vec2::new(100.0, 100.0),
            on_surface: true,
        },
    );
    let input = app.world().resource::<InputState>();
    assert_eq!(input.mode, InputMode::Dragging);
    assert!(input.dragging_active());
    assert!(!input.orbit_enabled());
    assert!(!orbit(&mut app).is_enabled());

    // Orbit gestures are ignored for the whole drag.
    send(
        &mut app,
        PointerInput::Down {
            button: PointerButton::Secondary,
            position: Vec2::new(100.0, 100.0),
            on_surface: true,
        },
    );
    send(&mut app, PointerInput::Move { position: Vec2::new(640.0, 360.0) });
    send(&mut app, PointerInput::Wheel { lines: 3.0 });
    let camera = orbit(&mut app);
    assert_eq!(camera.target_yaw, yaw_after_orbit);
    assert!(!camera.is_grabbed());

    let expected = PickingRayResolver::default().target(Vec2::ZERO, &CameraPose::default());
    assert!(store(&app).get().position.distance(expected) < 1e-4);

    send(&mut app, PointerInput::Up { button: PointerButton::Primary });
    let input = app.world().resource::<InputState>();
    assert_eq!(input.mode, InputMode::Idle);
    assert!(input.orbit_enabled());
    assert!(orbit(&mut app).is_enabled());

    let parked = store(&app).get().position;
    send(&mut app, PointerInput::Move { position: Vec2::new(100.0, 100.0) });
    assert_eq!(store(&app).get().position, parked);
}

#[test]
fn press_on_the_panel_does_not_start_a_drag() {
    let mut app = session(SandboxConfig::default());
    send(
        &mut app,
        PointerInput::Down {
            button: PointerButton::Primary,
            position: Vec2::new(1200.0, 40.0),
            on_surface: false,
        },
    );
    assert_eq!(app.world().resource::<InputState>().mode, InputMode::Idle);
    assert!(orbit(&mut app).is_enabled());
}

#[test]
fn drag_shows_up_in_the_panel_the_same_frame() {
    let mut app = session(SandboxConfig::default());
    app.world_mut().write_message(PointerInput::Down {
        button: PointerButton::Primary,
        position: Vec2::new(640.0, 360.0),
        on_surface: true,
    });
    app.world_mut().write_message(PointerInput::Move {
        position: Vec2::new(900.0, 200.0),
    });
    app.update();

    let position = store(&app).get().position;
    assert_eq!(displayed(&app, "position_x"), PanelValue::Number(position.x));
    assert_eq!(displayed(&app, "position_y"), PanelValue::Number(position.y));
    assert_eq!(displayed(&app, "position_z"), PanelValue::Number(position.z));
}

#[test]
fn held_keys_move_once_per_frame() {
    let mut app = session(SandboxConfig {
        control_scheme: ControlScheme::Translate,
        ..default()
    });

    press_key(&mut app, "ArrowRight", true);
    press_key(&mut app, "d", true);
    app.update();
    assert!((store(&app).get().position.x - 0.1).abs() < 1e-6);
    assert_eq!(
        displayed(&app, "position_x"),
        PanelValue::Number(store(&app).get().position.x)
    );

    app.update();
    assert!((store(&app).get().position.x - 0.2).abs() < 1e-6);

    press_key(&mut app, "arrowright", false);
    press_key(&mut app, "D", false);
    app.update();
    app.update();
    assert!((store(&app).get().position.x - 0.2).abs() < 1e-6);
}

#[test]
fn rotation_keys_turn_the_object() {
    let mut app = session(SandboxConfig::default());
    press_key(&mut app, "e", true);
    app.update();
    app.update();
    assert!((store(&app).get().orientation.z - 0.1).abs() < 1e-6);
    assert_eq!(store(&app).get().position, Vec3::ZERO);
}

#[test]
fn panel_edits_land_before_the_next_frame() {
    let mut app = session(SandboxConfig::default());
    let binding = app.world().resource::<PanelBinding>();
    let position_y = binding.handle("position_y").unwrap();
    let geometry = binding.handle("geometry").unwrap();

    app.world_mut().trigger(FieldEdited {
        handle: position_y,
        value: PanelValue::Number(2.5),
    });
    assert_eq!(store(&app).get().position.y, 2.5);

    app.update();
    assert_eq!(displayed(&app, "position_y"), PanelValue::Number(2.5));

    app.world_mut().trigger(FieldEdited {
        handle: geometry,
        value: PanelValue::Choice("Box".into()),
    });
    assert_eq!(app.world().resource::<SelectedShape>().0, ShapeKind::Box);
    assert_eq!(store(&app).get().position, Vec3::new(0.0, 2.5, 0.0));
}

#[test]
fn held_keys_wait_while_a_panel_number_is_dragged() {
    let mut app = session(SandboxConfig::default());
    app.insert_resource(NumericDragState {
        active: Some(ActiveDrag {
            entity: Entity::PLACEHOLDER,
            last_screen_x: 0.0,
            raw_value: 0.0,
        }),
    });
    let before = store(&app).get();

    press_key(&mut app, "shift", true);
    app.update();
    app.update();
    assert_eq!(store(&app).get(), before);

    app.world_mut().resource_mut::<NumericDragState>().active = None;
    app.update();
    assert!(store(&app).get().position.y < before.position.y);
}
