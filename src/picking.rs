use bevy::prelude::*;

use crate::transform_store::TransformStore;

/// Snapshot of the camera used to unproject pointer positions.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub world_from_view: Mat4,
    pub clip_from_view: Mat4,
}

impl Default for CameraPose {
    fn default() -> Self {
        let eye = Transform::from_xyz(0.0, 5.0, 15.0).looking_at(Vec3::ZERO, Vec3::Y);
        Self {
            world_from_view: Mat4::from_rotation_translation(eye.rotation, eye.translation),
            clip_from_view: Mat4::perspective_infinite_reverse_rh(
                75.0_f32.to_radians(),
                16.0 / 9.0,
                1.0,
            ),
        }
    }
}

impl CameraPose {
    pub fn from_camera(camera: &Camera, transform: &GlobalTransform) -> Self {
        Self {
            world_from_view: Mat4::from(transform.affine()),
            clip_from_view: camera.clip_from_view(),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.world_from_view.w_axis.truncate()
    }

    pub fn forward(&self) -> Vec3 {
        (-self.world_from_view.z_axis.truncate()).normalize_or_zero()
    }

    /// World-space ray from the camera through an NDC point.
    ///
    /// The origin is the camera position. Any NDC depth in front of the
    /// camera gives the same direction for a perspective projection.
    pub fn ray_through(&self, ndc: Vec2) -> Ray3d {
        let origin = self.position();
        let world_from_clip = self.world_from_view * self.clip_from_view.inverse();
        let through = world_from_clip.project_point3(ndc.extend(0.5));
        let direction = Dir3::new(through - origin)
            .or_else(|_| Dir3::new(self.forward()))
            .unwrap_or(Dir3::NEG_Z);
        Ray3d { origin, direction }
    }
}

/// Places a dragged object on a sphere of fixed radius around the camera.
/// No geometry is hit-tested.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickingRayResolver {
    pub standoff_distance: f32,
}

impl Default for PickingRayResolver {
    fn default() -> Self {
        Self {
            standoff_distance: 5.0,
        }
    }
}

impl PickingRayResolver {
    pub fn target(&self, ndc: Vec2, pose: &CameraPose) -> Vec3 {
        pose.ray_through(ndc).get_point(self.standoff_distance)
    }

    /// Move the object to the drag target. Does nothing unless a drag is active.
    pub fn resolve(
        &self,
        dragging_active: bool,
        ndc: Vec2,
        pose: &CameraPose,
        store: &mut TransformStore,
    ) -> Option<Vec3> {
        if !dragging_active {
            return None;
        }
        let target = self.target(ndc, pose);
        store.set_position(target);
        Some(target)
    }
}

/// Marker on the camera whose pose drives picking.
#[derive(Component, Default)]
pub struct PickingCamera;

pub(crate) fn capture_camera_pose(
    cameras: Query<(&Camera, &GlobalTransform), With<PickingCamera>>,
    mut pose: ResMut<CameraPose>,
) {
    let Ok((camera, transform)) = cameras.single() else {
        return;
    };
    let captured = CameraPose::from_camera(camera, transform);
    // Only perspective projections unproject correctly here. This also skips
    // the identity a camera reports before its first layout.
    if captured.clip_from_view.w_axis.w != 0.0 {
        return;
    }
    if *pose != captured {
        *pose = captured;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_center_lands_on_forward_axis() {
        let pose = CameraPose::default();
        let resolver = PickingRayResolver::default();
        let target = resolver.target(Vec2::ZERO, &pose);

        assert!((target.distance(pose.position()) - 5.0).abs() < 1e-4);
        let along = (target - pose.position()).normalize();
        assert!(along.dot(pose.forward()) > 0.99999);
    }

    #[test]
    fn target_does_not_depend_on_history() {
        let pose = CameraPose::default();
        let resolver = PickingRayResolver::default();
        let first = resolver.target(Vec2::ZERO, &pose);
        let _ = resolver.target(Vec2::new(0.7, -0.3), &pose);
        assert_eq!(resolver.target(Vec2::ZERO, &pose), first);
    }

    #[test]
    fn right_edge_moves_target_right_of_camera() {
        let pose = CameraPose::default();
        let resolver = PickingRayResolver::default();
        let center = resolver.target(Vec2::ZERO, &pose);
        let right = resolver.target(Vec2::new(1.0, 0.0), &pose);
        let camera_right = pose.world_from_view.x_axis.truncate();
        assert!((right - center).dot(camera_right) > 0.0);
        assert!((right.distance(pose.position()) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn resolve_is_a_no_op_when_idle() {
        let pose = CameraPose::default();
        let resolver = PickingRayResolver::default();
        let mut store = TransformStore::default();
        assert_eq!(resolver.resolve(false, Vec2::ZERO, &pose, &mut store), None);
        assert_eq!(store.revision(), 0);

        let target = resolver.resolve(true, Vec2::ZERO, &pose, &mut store);
        assert_eq!(target, Some(store.get().position));
    }
}
