use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::FrameSet;

pub struct TransformStorePlugin;

impl Plugin for TransformStorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransformStore>()
            .add_systems(Update, mirror_store_to_object.in_set(FrameSet::Render));
    }
}

/// Marker on the one mesh the session manipulates.
#[derive(Component, Default)]
pub struct ManipulatedObject;

/// Position and XYZ Euler orientation (radians) of the manipulated object.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObjectTransform {
    pub position: Vec3,
    pub orientation: Vec3,
}

impl ObjectTransform {
    pub fn to_transform(self) -> Transform {
        Transform::from_translation(self.position).with_rotation(Quat::from_euler(
            EulerRot::XYZ,
            self.orientation.x,
            self.orientation.y,
            self.orientation.z,
        ))
    }
}

/// One scalar component of [`ObjectTransform`] that can be addressed by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformField {
    PositionX,
    PositionY,
    PositionZ,
    RotationX,
    RotationY,
    RotationZ,
}

impl TransformField {
    pub const ALL: [TransformField; 6] = [
        TransformField::PositionX,
        TransformField::PositionY,
        TransformField::PositionZ,
        TransformField::RotationX,
        TransformField::RotationY,
        TransformField::RotationZ,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TransformField::PositionX => "position_x",
            TransformField::PositionY => "position_y",
            TransformField::PositionZ => "position_z",
            TransformField::RotationX => "rotation_x",
            TransformField::RotationY => "rotation_y",
            TransformField::RotationZ => "rotation_z",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    pub fn get(self, transform: &ObjectTransform) -> f32 {
        match self {
            TransformField::PositionX => transform.position.x,
            TransformField::PositionY => transform.position.y,
            TransformField::PositionZ => transform.position.z,
            TransformField::RotationX => transform.orientation.x,
            TransformField::RotationY => transform.orientation.y,
            TransformField::RotationZ => transform.orientation.z,
        }
    }

    pub fn set(self, transform: &mut ObjectTransform, value: f32) {
        match self {
            TransformField::PositionX => transform.position.x = value,
            TransformField::PositionY => transform.position.y = value,
            TransformField::PositionZ => transform.position.z = value,
            TransformField::RotationX => transform.orientation.x = value,
            TransformField::RotationY => transform.orientation.y = value,
            TransformField::RotationZ => transform.orientation.z = value,
        }
    }
}

/// Single source of truth for the manipulated object's transform.
///
/// Pointer drags, keyboard deltas and panel edits all write through here; the
/// mesh's `Transform` is only ever a mirror of it. Writes are last-writer-wins.
#[derive(Resource, Debug, Default)]
pub struct TransformStore {
    current: ObjectTransform,
    revision: u64,
}

impl TransformStore {
    pub fn new(initial: ObjectTransform) -> Self {
        Self {
            current: initial,
            revision: 0,
        }
    }

    pub fn get(&self) -> ObjectTransform {
        self.current
    }

    /// Bumped on every write, so readers can tell whether anything landed.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.current.position = position;
        self.revision += 1;
    }

    pub fn set_orientation(&mut self, orientation: Vec3) {
        self.current.orientation = orientation;
        self.revision += 1;
    }

    pub fn set_field(&mut self, field: TransformField, value: f32) {
        field.set(&mut self.current, value);
        self.revision += 1;
    }

    /// Add a delta to position and orientation in one write.
    pub fn translate_and_rotate(&mut self, translation: Vec3, rotation: Vec3) {
        if translation == Vec3::ZERO && rotation == Vec3::ZERO {
            return;
        }
        self.current.position += translation;
        self.current.orientation += rotation;
        self.revision += 1;
    }
}

fn mirror_store_to_object(
    store: Res<TransformStore>,
    mut objects: Query<&mut Transform, With<ManipulatedObject>>,
) {
    let target = store.get().to_transform();
    for mut transform in &mut objects {
        // Keep scale untouched; the store does not own it.
        transform.translation = target.translation;
        transform.rotation = target.rotation;
    }
}
