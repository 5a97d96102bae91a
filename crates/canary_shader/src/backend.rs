use std::fmt::Debug;

/// The two programmable stages a program is linked from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

/// A value for one uniform slot, in the shape the API uploads it.
/// Matrices are column-major and never transposed on upload.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

/// The slice of a GL-style graphics API that shader programs need.
///
/// Methods mirror the GL entry points one to one and take `&self`: the
/// context is a state machine owned by one thread, and the only state
/// shared between programs is the "currently bound program" slot.
pub trait ShaderBackend {
    type Shader: Copy + Debug;
    type Program: Copy + Debug + PartialEq;
    type UniformLocation: Debug;

    fn create_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);

    /// Binds `program` (or nothing) as the target of uniform writes and draws.
    fn use_program(&self, program: Option<Self::Program>);

    /// `None` when the name is unknown or was stripped as unused.
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;

    /// Writes to the *currently bound* program. `None` is silently ignored.
    fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: UniformValue);
}
