use bevy::prelude::*;

pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<OrbitInput>().add_systems(
            Update,
            (orbit_input_system, orbit_update_system)
                .chain()
                .in_set(OrbitCameraSystems),
        );
    }
}

/// System set containing the orbit camera's input and damping systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrbitCameraSystems;

/// Pointer gestures routed to the orbit camera.
///
/// The camera never reads window input itself. Whoever owns the pointer decides
/// which gestures reach it.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum OrbitInput {
    /// The orbit button was pressed (`true`) or released (`false`).
    Grab(bool),
    /// Pointer moved by this many logical pixels.
    Motion(Vec2),
    /// Wheel scrolled by this many lines. Positive zooms in.
    Zoom(f32),
}

/// Camera-orbit surface used by whoever arbitrates pointer ownership.
pub trait OrbitControl {
    fn set_enabled(&mut self, enabled: bool);
    fn is_enabled(&self) -> bool;
    /// Advance damping by `dt` seconds.
    fn update(&mut self, dt: f32);
}

/// Orbit camera placed on the camera entity.
///
/// Controls (while enabled):
/// - Orbit button + drag: rotate around `focus` (yaw/pitch)
/// - Wheel: dolly toward / away from `focus`
///
/// Input moves the target angles; `update` eases the current angles toward
/// them, so the camera keeps drifting briefly after the gesture ends.
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    pub target_yaw: f32,
    pub target_pitch: f32,
    pub target_radius: f32,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub damping: f32,
    /// Radians per pixel.
    pub sensitivity: f32,
    /// Fraction of the radius per wheel line.
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    enabled: bool,
    grabbed: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::looking_from(Vec3::new(0.0, 5.0, 15.0), Vec3::ZERO)
    }
}

impl OrbitCamera {
    /// Build an orbit whose current and target pose put the camera at `eye`.
    pub fn looking_from(eye: Vec3, focus: Vec3) -> Self {
        let offset = eye - focus;
        let radius = offset.length().max(f32::EPSILON);
        let yaw = offset.x.atan2(offset.z);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        Self {
            focus,
            yaw,
            pitch,
            radius,
            target_yaw: yaw,
            target_pitch: pitch,
            target_radius: radius,
            damping: 0.05,
            sensitivity: 0.005,
            zoom_speed: 0.1,
            min_radius: 1.5,
            max_radius: 500.0,
            enabled: true,
            grabbed: false,
        }
    }

    pub fn with_damping(mut self, damping: f32) -> Self {
        self.damping = damping.clamp(0.0, 1.0);
        self
    }

    pub fn is_grabbed(&self) -> bool {
        self.grabbed
    }

    /// Apply a routed gesture. Ignored while disabled.
    pub fn handle(&mut self, input: OrbitInput) {
        if !self.enabled {
            return;
        }
        match input {
            OrbitInput::Grab(pressed) => self.grabbed = pressed,
            OrbitInput::Motion(delta) => {
                if !self.grabbed {
                    return;
                }
                self.target_yaw -= delta.x * self.sensitivity;
                self.target_pitch = (self.target_pitch + delta.y * self.sensitivity).clamp(
                    -std::f32::consts::FRAC_PI_2 + 0.01,
                    std::f32::consts::FRAC_PI_2 - 0.01,
                );
            }
            OrbitInput::Zoom(lines) => {
                self.target_radius = (self.target_radius * (1.0 - lines * self.zoom_speed))
                    .clamp(self.min_radius, self.max_radius);
            }
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus
            + Vec3::new(
                self.radius * cos_pitch * sin_yaw,
                self.radius * sin_pitch,
                self.radius * cos_pitch * cos_yaw,
            )
    }

    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus, Vec3::Y)
    }
}

impl OrbitControl for OrbitCamera {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.grabbed = false;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn update(&mut self, dt: f32) {
        // Frame-rate independent version of "cover `damping` of the gap each frame".
        let t = if self.damping >= 1.0 {
            1.0
        } else {
            1.0 - (1.0 - self.damping).powf(dt * 60.0)
        };
        self.yaw += (self.target_yaw - self.yaw) * t;
        self.pitch += (self.target_pitch - self.pitch) * t;
        self.radius += (self.target_radius - self.radius) * t;
    }
}

fn orbit_input_system(mut inputs: MessageReader<OrbitInput>, mut cameras: Query<&mut OrbitCamera>) {
    for input in inputs.read() {
        for mut camera in &mut cameras {
            camera.handle(*input);
        }
    }
}

fn orbit_update_system(time: Res<Time>, mut cameras: Query<(&mut OrbitCamera, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut camera, mut transform) in &mut cameras {
        camera.update(dt);
        *transform = camera.to_transform();
    }
}
