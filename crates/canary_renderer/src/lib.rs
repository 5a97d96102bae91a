//! Scene-side users of [`canary_shader::ShaderProgram`]: lights, camera and
//! model matrices, material samplers and the JSON render config.

pub mod config;
pub mod light;
pub mod material;
pub mod scene;

#[cfg(test)]
mod test_shaders;

pub use config::{ConfigError, RenderConfig};
pub use light::{Light, LightKind, LightManager, MAX_LIGHTS};
pub use material::{SamplerBinding, TextureKind, bind_samplers, sampler_bindings};
pub use scene::SceneUniforms;
