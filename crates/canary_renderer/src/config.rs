use std::{
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use canary_core::{FlyCamera, Projection};
use canary_shader::{ShaderBackend, ShaderError, ShaderProgram};
use glam::Vec3;
use log::info;
use thiserror::Error;

use crate::light::{Light, LightKind, LightManager};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read render config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid render config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Startup settings for a scene, read from JSON. Missing fields fall back to
/// the defaults below.
#[derive(serde::Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct RenderConfig {
    pub viewport: ViewportConfig,
    pub shaders: ShaderPaths,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub lights: Vec<LightConfig>,
}

#[derive(serde::Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

#[derive(serde::Deserialize, Clone, Debug)]
#[serde(default)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: PathBuf::from("shaders/vertex.vert"),
            fragment: PathBuf::from("shaders/fragment.frag"),
        }
    }
}

#[derive(serde::Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
        }
    }
}

#[derive(serde::Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct ProjectionConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

#[derive(serde::Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct LightConfig {
    pub kind: LightKind,
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    pub radius: f32,
    pub direction: [f32; 3],
    pub cutoff_degrees: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            kind: LightKind::Point,
            position: [0.0; 3],
            color: [1.0; 3],
            intensity: 1.0,
            radius: 10.0,
            direction: [0.0, -1.0, 0.0],
            cutoff_degrees: 12.5,
        }
    }
}

impl From<&LightConfig> for Light {
    fn from(config: &LightConfig) -> Self {
        Light {
            position: Vec3::from(config.position),
            color: Vec3::from(config.color),
            intensity: config.intensity,
            kind: config.kind,
            radius: config.radius,
            direction: Vec3::from(config.direction).normalize_or_zero(),
            cutoff: config.cutoff_degrees.to_radians().cos(),
        }
    }
}

impl RenderConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded render config from {}", path.display());
        Ok(config)
    }

    pub fn camera(&self) -> FlyCamera {
        let c = &self.camera;
        let mut camera = FlyCamera::with_orientation(Vec3::from(c.position), Vec3::Y, c.yaw, c.pitch);
        camera.movement_speed = c.speed;
        camera.mouse_sensitivity = c.sensitivity;
        camera
    }

    pub fn projection(&self) -> Projection {
        let mut projection = Projection {
            fov_y: self.projection.fov_degrees.to_radians(),
            near: self.projection.near,
            far: self.projection.far,
            ..Default::default()
        };
        projection.set_viewport(self.viewport.width, self.viewport.height);
        projection
    }

    /// Lights past the manager's cap are dropped with a warning.
    pub fn light_manager(&self) -> LightManager {
        let mut manager = LightManager::new();
        for light in &self.lights {
            manager.add_light(Light::from(light));
        }
        manager
    }

    /// Builds the configured shader pair. Unreadable files are logged and
    /// show up as compile diagnostics, not as an error here.
    pub fn load_program<B: ShaderBackend>(&self, context: &Rc<B>) -> Result<ShaderProgram<B>, ShaderError> {
        ShaderProgram::from_files(context, &self.shaders.vertex, &self.shaders.fragment)
    }
}
