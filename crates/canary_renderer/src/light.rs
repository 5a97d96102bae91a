use canary_shader::{BoundProgram, ShaderBackend};
use glam::Vec3;
use log::{trace, warn};

/// Upper bound on lights uploaded to a program. Shaders size their
/// `lights[]` array to match.
pub const MAX_LIGHTS: usize = 100;

/// Encoded as the `LightType` int the shaders branch on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Directional = 0,
    #[default]
    Point = 1,
    Spot = 2,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
    pub radius: f32,
    pub direction: Vec3,
    /// Cosine of the spot cone half-angle.
    pub cutoff: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            color: Vec3::ONE,
            intensity: 1.0,
            kind: LightKind::Point,
            radius: 10.0,
            direction: Vec3::NEG_Y,
            cutoff: 12.5f32.to_radians().cos(),
        }
    }
}

impl Light {
    pub fn point(position: Vec3, color: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            radius,
            ..Default::default()
        }
    }

    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Directional,
            direction: direction.normalize_or_zero(),
            color,
            intensity,
            ..Default::default()
        }
    }

    pub fn spot(position: Vec3, direction: Vec3, cutoff_degrees: f32, color: Vec3, intensity: f32) -> Self {
        Self {
            kind: LightKind::Spot,
            position,
            direction: direction.normalize_or_zero(),
            cutoff: cutoff_degrees.to_radians().cos(),
            color,
            intensity,
            ..Default::default()
        }
    }
}

/// Collects scene lights and pushes them into the `lights[]` uniform array.
#[derive(Clone, Debug, Default)]
pub struct LightManager {
    lights: Vec<Light>,
}

impl LightManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false, and drops the light, once [`MAX_LIGHTS`] are present.
    pub fn add_light(&mut self, light: Light) -> bool {
        if self.lights.len() >= MAX_LIGHTS {
            warn!("Light limit of {MAX_LIGHTS} reached, ignoring {:?} light", light.kind);
            return false;
        }
        self.lights.push(light);
        true
    }

    pub fn active_lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    /// Uploads `numLights` and every light's fields to the bound program.
    pub fn update_lights<B: ShaderBackend>(&self, shader: &BoundProgram<'_, B>) {
        shader.set_int("numLights", self.lights.len() as i32);

        for (i, light) in self.lights.iter().enumerate() {
            let base = format!("lights[{i}]");
            shader.set_vec3(&format!("{base}.LightPosition"), light.position);
            shader.set_vec3(&format!("{base}.LightColor"), light.color);
            shader.set_float(&format!("{base}.Intensity"), light.intensity);
            shader.set_int(&format!("{base}.LightType"), light.kind as i32);
            shader.set_float(&format!("{base}.LightRadius"), light.radius);
            shader.set_vec3(&format!("{base}.LightDirection"), light.direction);
            shader.set_float(&format!("{base}.LightCutOff"), light.cutoff);
        }

        trace!("Uploaded {} lights", self.lights.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_shaders::{context, lit_program};
    use canary_shader::UniformValue;

    #[test]
    fn lights_past_the_cap_are_dropped() {
        let mut manager = LightManager::new();
        for i in 0..MAX_LIGHTS {
            assert!(manager.add_light(Light::point(Vec3::splat(i as f32), Vec3::ONE, 1.0, 5.0)));
        }

        assert!(!manager.add_light(Light::default()));
        assert_eq!(manager.active_lights().len(), MAX_LIGHTS);
        assert_eq!(manager.active_lights()[MAX_LIGHTS - 1].position, Vec3::splat(99.0));

        manager.clear();
        assert!(manager.active_lights().is_empty());
    }

    #[test]
    fn update_writes_count_and_fields() {
        let ctx = context();
        let program = lit_program(&ctx);

        let mut manager = LightManager::new();
        manager.add_light(Light::point(Vec3::new(1.0, 2.0, 3.0), Vec3::new(1.0, 0.5, 0.0), 2.0, 7.5));
        manager.add_light(Light::spot(Vec3::Y, Vec3::NEG_Y, 60.0, Vec3::ONE, 0.5));

        manager.update_lights(&program.use_program());

        let read = |name: &str| ctx.uniform_value(program.handle(), name);
        assert_eq!(read("numLights"), Some(UniformValue::Int(2)));
        assert_eq!(read("lights[0].LightPosition"), Some(UniformValue::Vec3([1.0, 2.0, 3.0])));
        assert_eq!(read("lights[0].LightColor"), Some(UniformValue::Vec3([1.0, 0.5, 0.0])));
        assert_eq!(read("lights[0].Intensity"), Some(UniformValue::Float(2.0)));
        assert_eq!(read("lights[0].LightType"), Some(UniformValue::Int(1)));
        assert_eq!(read("lights[0].LightRadius"), Some(UniformValue::Float(7.5)));
        assert_eq!(read("lights[1].LightType"), Some(UniformValue::Int(2)));
        assert_eq!(read("lights[1].LightDirection"), Some(UniformValue::Vec3([0.0, -1.0, 0.0])));

        let Some(UniformValue::Float(cutoff)) = read("lights[1].LightCutOff") else {
            panic!("LightCutOff is not a float slot");
        };
        assert!((cutoff - 0.5).abs() < 1e-5);

        // Untouched slots keep their link-time zero
        assert_eq!(read("lights[2].Intensity"), Some(UniformValue::Float(0.0)));
        assert_eq!(ctx.ignored_writes(), 0);
    }

    #[test]
    fn update_against_a_program_without_lights_is_harmless() {
        let ctx = context();
        let program = crate::test_shaders::unlit_program(&ctx);

        let mut manager = LightManager::new();
        manager.add_light(Light::directional(Vec3::NEG_Y, Vec3::ONE, 1.0));
        manager.update_lights(&program.use_program());

        assert_eq!(ctx.ignored_writes(), 0);
        assert_eq!(ctx.uniform_value(program.handle(), "numLights"), None);
    }
}
