use bevy::{asset::AssetPlugin, prelude::*};
use orbit_sandbox::{
    SandboxCorePlugin,
    config::SandboxConfig,
    keyboard::{ControlScheme, KeyId, KeyInput},
    panel::{FieldEdited, PanelBinding, PanelValue},
    scene::{ObjectMeshPlugin, ShapeKind},
    transform_store::{ManipulatedObject, TransformStore},
};

fn session(config: SandboxConfig) -> (App, Entity) {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins,
        AssetPlugin::default(),
        SandboxCorePlugin { config },
        ObjectMeshPlugin,
    ))
    .init_asset::<Mesh>()
    .init_asset::<StandardMaterial>();

    let mesh = app
        .world_mut()
        .resource_mut::<Assets<Mesh>>()
        .add(ShapeKind::Sphere.mesh());
    let material = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>()
        .add(StandardMaterial::default());
    let object = app
        .world_mut()
        .spawn((
            ManipulatedObject,
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_scale(Vec3::splat(2.0)),
        ))
        .id();
    app.update();
    (app, object)
}

fn edit(app: &mut App, name: &str, value: PanelValue) {
    let handle = app
        .world()
        .resource::<PanelBinding>()
        .handle(name)
        .unwrap();
    app.world_mut().trigger(FieldEdited { handle, value });
}

fn displayed(app: &App, name: &str) -> PanelValue {
    let binding = app.world().resource::<PanelBinding>();
    binding
        .displayed(binding.handle(name).unwrap())
        .unwrap()
        .clone()
}

fn transform(app: &App, object: Entity) -> Transform {
    *app.world().get::<Transform>(object).unwrap()
}

#[test]
fn panel_edit_moves_the_mesh_within_one_frame() {
    let (mut app, object) = session(SandboxConfig::default());

    edit(&mut app, "position_x", PanelValue::Number(3.0));
    app.update();

    assert_eq!(transform(&app, object).translation, Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(displayed(&app, "position_x"), PanelValue::Number(3.0));
    assert_eq!(transform(&app, object).scale, Vec3::splat(2.0));
}

#[test]
fn keyboard_frame_agrees_across_store_mesh_and_panel() {
    let (mut app, object) = session(SandboxConfig {
        control_scheme: ControlScheme::Translate,
        ..default()
    });

    app.world_mut().write_message(KeyInput {
        key: KeyId::new("arrowright"),
        pressed: true,
    });
    app.update();

    let position = app.world().resource::<TransformStore>().get().position;
    assert!((position.x - 0.1).abs() < 1e-6);
    assert_eq!(transform(&app, object).translation, position);
    assert_eq!(displayed(&app, "position_x"), PanelValue::Number(position.x));
}

#[test]
fn geometry_swap_replaces_the_mesh_and_keeps_the_pose() {
    let (mut app, object) = session(SandboxConfig::default());
    edit(&mut app, "position_y", PanelValue::Number(1.5));
    app.update();

    let before = transform(&app, object);
    let old_mesh = app.world().get::<Mesh3d>(object).unwrap().0.id();

    edit(&mut app, "geometry", PanelValue::Choice("Box".into()));
    app.update();

    let new_mesh = app.world().get::<Mesh3d>(object).unwrap().0.id();
    assert_ne!(new_mesh, old_mesh);
    let meshes = app.world().resource::<Assets<Mesh>>();
    assert!(meshes.get(old_mesh).is_none());
    assert!(meshes.get(new_mesh).is_some());
    assert_eq!(transform(&app, object), before);
}

#[test]
fn colour_edit_recolours_the_material() {
    let (mut app, object) = session(SandboxConfig::default());
    let blue = Srgba::rgb(0.0, 0.5, 1.0);

    edit(&mut app, "color", PanelValue::Color(blue));
    app.update();

    let handle = &app
        .world()
        .get::<MeshMaterial3d<StandardMaterial>>(object)
        .unwrap()
        .0;
    let materials = app.world().resource::<Assets<StandardMaterial>>();
    assert_eq!(materials.get(handle).unwrap().base_color, Color::from(blue));
}

#[test]
fn unchanged_shape_keeps_the_mesh() {
    let (mut app, object) = session(SandboxConfig::default());
    let mesh = app.world().get::<Mesh3d>(object).unwrap().0.id();

    edit(&mut app, "geometry", PanelValue::Choice("Sphere".into()));
    app.update();
    app.update();

    assert_eq!(app.world().get::<Mesh3d>(object).unwrap().0.id(), mesh);
}
