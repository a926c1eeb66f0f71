use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, ensure};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{keyboard::ControlScheme, panel::FieldSpec, scene::ShapeKind};

/// Environment variable naming the config file to load.
pub const CONFIG_ENV_VAR: &str = "ORBIT_SANDBOX_CONFIG";
/// Config file looked up in the working directory when the variable is unset.
pub const DEFAULT_CONFIG_FILE: &str = "sandbox.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    /// Fraction of the remaining distance to the orbit target covered per
    /// 60 Hz frame.
    pub damping: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 1.0,
            far: 2000.0,
            position: [0.0, 5.0, 15.0],
            damping: 0.05,
        }
    }
}

/// Session settings, read once at start-up.
#[derive(Resource, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub control_scheme: ControlScheme,
    /// World units per frame.
    pub move_speed: f32,
    /// Radians per frame.
    pub rotation_speed: f32,
    /// Distance from the camera at which a dragged object is held.
    pub standoff_distance: f32,
    pub camera: CameraConfig,
    pub initial_shape: ShapeKind,
    /// `#rrggbb` hex.
    pub initial_color: String,
    pub panel_fields: Vec<FieldSpec>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            control_scheme: ControlScheme::default(),
            move_speed: 0.1,
            rotation_speed: 0.05,
            standoff_distance: 5.0,
            camera: CameraConfig::default(),
            initial_shape: ShapeKind::default(),
            initial_color: "#ff0000".to_string(),
            panel_fields: FieldSpec::default_table(),
        }
    }
}

impl SandboxConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))
    }

    /// Load from [`CONFIG_ENV_VAR`] or [`DEFAULT_CONFIG_FILE`], falling back
    /// to defaults when the file is missing or unusable.
    pub fn load_or_default() -> Self {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from_or_default(&path)
    }

    pub fn load_from_or_default(path: &Path) -> Self {
        if let Err(err) = fs::metadata(path)
            && err.kind() == ErrorKind::NotFound
        {
            info!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("Ignoring config {}: {err:#}", path.display());
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("move_speed", self.move_speed),
            ("rotation_speed", self.rotation_speed),
            ("standoff_distance", self.standoff_distance),
        ] {
            ensure!(
                value.is_finite() && value > 0.0,
                "{name} must be positive, got {value}"
            );
        }

        let camera = &self.camera;
        ensure!(
            camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0,
            "camera.fov_degrees must be between 0 and 180, got {}",
            camera.fov_degrees
        );
        ensure!(
            camera.near > 0.0 && camera.near < camera.far,
            "camera.near must be positive and below camera.far ({} vs {})",
            camera.near,
            camera.far
        );
        ensure!(
            (0.0..=1.0).contains(&camera.damping) && camera.damping > 0.0,
            "camera.damping must be in (0, 1], got {}",
            camera.damping
        );

        self.color()?;
        for field in &self.panel_fields {
            field
                .constraints
                .validate()
                .with_context(|| format!("panel field '{}'", field.name))?;
        }
        Ok(())
    }

    pub fn color(&self) -> anyhow::Result<Srgba> {
        Srgba::hex(&self.initial_color)
            .with_context(|| format!("initial_color '{}' is not a hex colour", self.initial_color))
    }
}
