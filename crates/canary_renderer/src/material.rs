use std::fmt;

use canary_shader::{BoundProgram, ShaderBackend};

/// Role of a texture in a mesh material. Decides the sampler name prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

impl TextureKind {
    pub fn prefix(self) -> &'static str {
        match self {
            TextureKind::Diffuse => "texture_diffuse",
            TextureKind::Specular => "texture_specular",
        }
    }
}

impl fmt::Display for TextureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One sampler uniform and the texture unit it reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplerBinding {
    pub kind: TextureKind,
    pub uniform: String,
    pub unit: u32,
}

/// Names the samplers for a mesh's textures in order: each kind counts from
/// 1 (`texture_diffuse1`, `texture_diffuse2`, `texture_specular1`) and the
/// i-th texture takes unit `i`.
pub fn sampler_bindings(kinds: &[TextureKind]) -> Vec<SamplerBinding> {
    let mut diffuse = 0;
    let mut specular = 0;

    kinds
        .iter()
        .enumerate()
        .map(|(unit, &kind)| {
            let counter = match kind {
                TextureKind::Diffuse => &mut diffuse,
                TextureKind::Specular => &mut specular,
            };
            *counter += 1;
            SamplerBinding {
                kind,
                uniform: format!("{kind}{counter}"),
                unit: unit as u32,
            }
        })
        .collect()
}

/// Points every sampler at its unit. The caller binds the textures to the
/// returned units before drawing.
pub fn bind_samplers<B: ShaderBackend>(shader: &BoundProgram<'_, B>, kinds: &[TextureKind]) -> Vec<SamplerBinding> {
    let bindings = sampler_bindings(kinds);
    for binding in &bindings {
        shader.set_int(&binding.uniform, binding.unit as i32);
    }
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_shaders::{context, lit_program};
    use canary_shader::UniformValue;

    #[test]
    fn kinds_are_numbered_independently() {
        let bindings = sampler_bindings(&[TextureKind::Diffuse, TextureKind::Specular, TextureKind::Diffuse]);
        let names: Vec<_> = bindings.iter().map(|b| (b.uniform.as_str(), b.unit)).collect();
        assert_eq!(names, [("texture_diffuse1", 0), ("texture_specular1", 1), ("texture_diffuse2", 2)]);

        assert!(sampler_bindings(&[]).is_empty());
    }

    #[test]
    fn samplers_are_set_to_their_units() {
        let ctx = context();
        let program = lit_program(&ctx);

        let bindings = bind_samplers(
            &program.use_program(),
            &[TextureKind::Specular, TextureKind::Diffuse, TextureKind::Diffuse],
        );

        assert_eq!(bindings.len(), 3);
        let read = |name: &str| ctx.uniform_value(program.handle(), name);
        assert_eq!(read("texture_specular1"), Some(UniformValue::Int(0)));
        assert_eq!(read("texture_diffuse1"), Some(UniformValue::Int(1)));
        assert_eq!(read("texture_diffuse2"), Some(UniformValue::Int(2)));
    }
}
