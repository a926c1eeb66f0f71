use std::{fmt, str::FromStr};

use anyhow::bail;
use bevy::prelude::*;
use bevy_infinite_grid::{InfiniteGrid, InfiniteGridPlugin};
use sandbox_camera::OrbitCamera;
use serde::{Deserialize, Serialize};

use crate::{
    FrameSet, SandboxEntity,
    config::SandboxConfig,
    picking::PickingCamera,
    transform_store::{ManipulatedObject, TransformStore},
};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((InfiniteGridPlugin, ObjectMeshPlugin))
            .insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, setup_scene);
    }
}

/// Keeps the manipulated object's mesh and material in step with
/// [`SelectedShape`] and [`MaterialColor`]. Needs only the mesh and material
/// asset stores, not a renderer.
pub struct ObjectMeshPlugin;

impl Plugin for ObjectMeshPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (swap_geometry, apply_material_color).in_set(FrameSet::Render),
        );
    }
}

/// Shapes the manipulated object can take.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    #[default]
    Sphere,
    Box,
    Cone,
    Cylinder,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Sphere,
        ShapeKind::Box,
        ShapeKind::Cone,
        ShapeKind::Cylinder,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Sphere => "Sphere",
            ShapeKind::Box => "Box",
            ShapeKind::Cone => "Cone",
            ShapeKind::Cylinder => "Cylinder",
        }
    }

    pub fn mesh(self) -> Mesh {
        match self {
            ShapeKind::Sphere => Sphere::new(0.5).mesh().uv(32, 32),
            ShapeKind::Box => Mesh::from(Cuboid::new(1.0, 1.0, 1.0)),
            ShapeKind::Cone => Cone::new(0.5, 1.0).mesh().resolution(32).build(),
            ShapeKind::Cylinder => Cylinder::new(0.5, 1.0).mesh().resolution(32).build(),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShapeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ShapeKind::ALL.into_iter().find(|shape| shape.name() == s) {
            Some(shape) => Ok(shape),
            None => bail!("unknown shape '{s}'"),
        }
    }
}

/// Shape currently shown. Changing it swaps the mesh and leaves the
/// transform alone.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectedShape(pub ShapeKind);

/// Base colour of the manipulated object's material. Only the panel writes it.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct MaterialColor(pub Srgba);

impl Default for MaterialColor {
    fn default() -> Self {
        Self(Srgba::RED)
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<SandboxConfig>,
    store: Res<TransformStore>,
    shape: Res<SelectedShape>,
    color: Res<MaterialColor>,
) {
    let camera = &config.camera;
    let eye = Vec3::from_array(camera.position);
    commands.spawn((
        Name::new("Sandbox Camera"),
        SandboxEntity,
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: camera.fov_degrees.to_radians(),
            near: camera.near,
            far: camera.far,
            ..default()
        }),
        Transform::from_translation(eye).looking_at(Vec3::ZERO, Vec3::Y),
        OrbitCamera::looking_from(eye, Vec3::ZERO).with_damping(camera.damping),
        PickingCamera,
    ));

    commands.spawn((
        Name::new("Key Light"),
        SandboxEntity,
        PointLight {
            intensity: 2_000_000.0,
            range: 100.0,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0),
    ));
    commands.spawn((
        Name::new("Fill Light"),
        SandboxEntity,
        DirectionalLight {
            illuminance: 3_000.0,
            ..default()
        },
        Transform::from_xyz(-3.0, 6.0, 5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((Name::new("Ground Grid"), SandboxEntity, InfiniteGrid));

    commands.spawn((
        Name::new("Manipulated Object"),
        ManipulatedObject,
        Mesh3d(meshes.add(shape.0.mesh())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: color.0.into(),
            ..default()
        })),
        store.get().to_transform(),
    ));

    info!("Scene ready with a {}", shape.0);
}

fn swap_geometry(
    shape: Res<SelectedShape>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut objects: Query<&mut Mesh3d, With<ManipulatedObject>>,
) {
    if !shape.is_changed() || shape.is_added() {
        return;
    }
    for mut mesh in &mut objects {
        let previous = std::mem::replace(&mut mesh.0, meshes.add(shape.0.mesh()));
        meshes.remove(&previous);
    }
    info!("Geometry swapped to {}", shape.0);
}

fn apply_material_color(
    color: Res<MaterialColor>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    objects: Query<&MeshMaterial3d<StandardMaterial>, With<ManipulatedObject>>,
) {
    if !color.is_changed() || color.is_added() {
        return;
    }
    for material in &objects {
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = color.0.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_names_parse_back() {
        for shape in ShapeKind::ALL {
            assert_eq!(shape.name().parse::<ShapeKind>().ok(), Some(shape));
        }
        assert!("Torus".parse::<ShapeKind>().is_err());
    }
}
