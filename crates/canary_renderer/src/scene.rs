use canary_core::{FlyCamera, Projection, Transform};
use canary_shader::{BoundProgram, ShaderBackend};

/// Uniform names shared by every scene shader.
pub struct SceneUniforms;

impl SceneUniforms {
    pub const PROJECTION: &'static str = "ProjectionMatrix";
    pub const VIEW: &'static str = "ViewMatrix";
    pub const MODEL: &'static str = "ModelMatrix";
    pub const VIEW_POSITION: &'static str = "viewPos";

    /// Per-frame camera state: projection, view and the eye position used
    /// for specular terms.
    pub fn apply_camera<B: ShaderBackend>(shader: &BoundProgram<'_, B>, camera: &FlyCamera, projection: &Projection) {
        shader.set_mat4(Self::PROJECTION, &projection.matrix());
        shader.set_mat4(Self::VIEW, &camera.view_matrix());
        shader.set_vec3(Self::VIEW_POSITION, camera.position());
    }

    pub fn apply_model<B: ShaderBackend>(shader: &BoundProgram<'_, B>, transform: &Transform) {
        shader.set_mat4(Self::MODEL, &transform.compute_matrix());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_shaders::{context, lit_program, unlit_program};
    use canary_shader::UniformValue;
    use glam::{Mat4, Vec3};

    #[test]
    fn camera_and_model_reach_the_shader() {
        let ctx = context();
        let program = lit_program(&ctx);
        let camera = FlyCamera::new(Vec3::new(0.0, 1.0, 3.0));
        let projection = Projection::default();
        let transform = Transform::from_xyz(2.0, 0.0, -1.0).with_scale(Vec3::splat(0.5));

        let bound = program.use_program();
        SceneUniforms::apply_camera(&bound, &camera, &projection);
        SceneUniforms::apply_model(&bound, &transform);

        let read = |name: &str| ctx.uniform_value(program.handle(), name);
        assert_eq!(read("ProjectionMatrix"), Some(UniformValue::Mat4(projection.matrix().to_cols_array())));
        assert_eq!(read("ViewMatrix"), Some(UniformValue::Mat4(camera.view_matrix().to_cols_array())));
        assert_eq!(read("viewPos"), Some(UniformValue::Vec3([0.0, 1.0, 3.0])));

        let Some(UniformValue::Mat4(model)) = read("ModelMatrix") else {
            panic!("ModelMatrix is not a mat4 slot");
        };
        // Translation lives in the fourth column
        assert_eq!(&model[12..15], &[2.0, 0.0, -1.0]);
        assert_eq!(model[0], 0.5);
    }

    #[test]
    fn shaders_without_view_position_still_get_matrices() {
        let ctx = context();
        let program = unlit_program(&ctx);
        let bound = program.use_program();

        SceneUniforms::apply_camera(&bound, &FlyCamera::default(), &Projection::default());
        SceneUniforms::apply_model(&bound, &Transform::default());

        assert_eq!(
            ctx.uniform_value(program.handle(), "ModelMatrix"),
            Some(UniformValue::Mat4(Mat4::IDENTITY.to_cols_array()))
        );
        assert_eq!(ctx.uniform_value(program.handle(), "viewPos"), None);
        assert_eq!(ctx.ignored_writes(), 0);
    }
}
