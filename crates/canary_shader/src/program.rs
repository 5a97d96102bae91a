use std::{fmt, ops::Deref, path::Path, rc::Rc};

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};
use log::{debug, error};

use crate::{
    backend::{ShaderBackend, ShaderKind, UniformValue},
    error::{ShaderDiagnostic, ShaderError, Stage},
    source::ShaderSources,
};

const DIAGNOSTIC_RULE: &str = " -- --------------------------------------------------- -- ";

/// A linked GPU program plus the context it lives in.
///
/// Uniform setters resolve the location against *this* program but write
/// into whichever program is currently bound, exactly like the API beneath.
/// Bind with [`ShaderProgram::use_program`] first. The GPU object is released
/// on drop.
pub struct ShaderProgram<B: ShaderBackend> {
    context: Rc<B>,
    handle: B::Program,
}

/// Outcome of a build: the program handle, usable or not, and everything the
/// compiler and linker complained about.
#[must_use]
pub struct Compilation<B: ShaderBackend> {
    program: ShaderProgram<B>,
    diagnostics: Vec<ShaderDiagnostic>,
}

/// Marks the region in which `program` is the bound one.
///
/// The real binding lives in the context, so another `use_program` call on a
/// different instance silently ends this region even while the guard exists.
pub struct BoundProgram<'a, B: ShaderBackend> {
    program: &'a ShaderProgram<B>,
}

enum BuildObject<B: ShaderBackend> {
    Shader(B::Shader),
    Program(B::Program),
}

impl<B: ShaderBackend> ShaderProgram<B> {
    /// Compiles both stages, links them and releases the stage objects.
    ///
    /// Compile and link failures never stop the build: they end up in
    /// [`Compilation::diagnostics`] and the handle is kept either way. The
    /// only hard error is a context that cannot create a program object.
    pub fn compile(context: &Rc<B>, vertex: &str, fragment: &str) -> Result<Compilation<B>, ShaderError> {
        let mut diagnostics = Vec::new();

        let stages = [
            compile_stage(context.as_ref(), ShaderKind::Vertex, vertex, &mut diagnostics),
            compile_stage(context.as_ref(), ShaderKind::Fragment, fragment, &mut diagnostics),
        ];

        let handle = match context.create_program() {
            Ok(handle) => handle,
            Err(message) => {
                for shader in stages.into_iter().flatten() {
                    context.delete_shader(shader);
                }
                // Nothing to hand back, so stage failures go to the log here
                for diagnostic in &diagnostics {
                    error!("{diagnostic}\n{DIAGNOSTIC_RULE}");
                }
                return Err(ShaderError::CreateProgram(message));
            }
        };

        for shader in stages.iter().flatten() {
            context.attach_shader(handle, *shader);
        }
        context.link_program(handle);
        diagnostics.extend(diagnose(context.as_ref(), Stage::Program, BuildObject::Program(handle)));

        // Linked (or abandoned), the stage objects are no longer needed
        for shader in stages.into_iter().flatten() {
            context.delete_shader(shader);
        }

        debug!("Built shader program {handle:?} ({} diagnostics)", diagnostics.len());

        Ok(Compilation {
            program: ShaderProgram {
                context: Rc::clone(context),
                handle,
            },
            diagnostics,
        })
    }

    /// Builds the program and logs any compile/link failure instead of
    /// returning it. The program may be unusable for rendering afterwards.
    pub fn new(context: &Rc<B>, vertex: &str, fragment: &str) -> Result<Self, ShaderError> {
        Ok(Self::compile(context, vertex, fragment)?.log_and_continue())
    }

    /// Builds the program and fails on any compile/link diagnostic.
    pub fn try_new(context: &Rc<B>, vertex: &str, fragment: &str) -> Result<Self, ShaderError> {
        Self::compile(context, vertex, fragment)?.into_result()
    }

    pub fn from_sources(context: &Rc<B>, sources: &ShaderSources) -> Result<Self, ShaderError> {
        Self::new(context, &sources.vertex, &sources.fragment)
    }

    /// Reads both files and builds with [`ShaderProgram::new`]. An unreadable
    /// file is logged and compiled as empty text.
    pub fn from_files(
        context: &Rc<B>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        Self::from_sources(context, &ShaderSources::load_lossy(vertex_path, fragment_path))
    }

    /// Strict counterpart of [`ShaderProgram::from_files`]: unreadable files
    /// and build diagnostics are both errors.
    pub fn try_from_files(
        context: &Rc<B>,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<Self, ShaderError> {
        let sources = ShaderSources::load(vertex_path, fragment_path)?;
        Self::try_new(context, &sources.vertex, &sources.fragment)
    }

    pub fn handle(&self) -> B::Program {
        self.handle
    }

    pub fn context(&self) -> &Rc<B> {
        &self.context
    }

    /// Makes this the active program for subsequent draws and uniform writes.
    pub fn use_program(&self) -> BoundProgram<'_, B> {
        self.context.use_program(Some(self.handle));
        BoundProgram { program: self }
    }

    /// Resolves `name` against this program. `None` for unknown or stripped names.
    pub fn uniform_location(&self, name: &str) -> Option<B::UniformLocation> {
        self.context.uniform_location(self.handle, name)
    }

    fn set(&self, name: &str, value: UniformValue) {
        let location = self.uniform_location(name);
        self.context.set_uniform(location.as_ref(), value);
    }

    pub fn set_bool(&self, name: &str, value: bool) {
        self.set(name, UniformValue::Int(value as i32));
    }

    pub fn set_int(&self, name: &str, value: i32) {
        self.set(name, UniformValue::Int(value));
    }

    pub fn set_float(&self, name: &str, value: f32) {
        self.set(name, UniformValue::Float(value));
    }

    pub fn set_vec2(&self, name: &str, value: impl Into<Vec2>) {
        self.set(name, UniformValue::Vec2(value.into().to_array()));
    }

    pub fn set_vec2_xy(&self, name: &str, x: f32, y: f32) {
        self.set(name, UniformValue::Vec2([x, y]));
    }

    pub fn set_vec3(&self, name: &str, value: impl Into<Vec3>) {
        self.set(name, UniformValue::Vec3(value.into().to_array()));
    }

    pub fn set_vec3_xyz(&self, name: &str, x: f32, y: f32, z: f32) {
        self.set(name, UniformValue::Vec3([x, y, z]));
    }

    pub fn set_vec4(&self, name: &str, value: impl Into<Vec4>) {
        self.set(name, UniformValue::Vec4(value.into().to_array()));
    }

    pub fn set_vec4_xyzw(&self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        self.set(name, UniformValue::Vec4([x, y, z, w]));
    }

    pub fn set_mat2(&self, name: &str, value: &Mat2) {
        self.set(name, UniformValue::Mat2(value.to_cols_array()));
    }

    pub fn set_mat3(&self, name: &str, value: &Mat3) {
        self.set(name, UniformValue::Mat3(value.to_cols_array()));
    }

    pub fn set_mat4(&self, name: &str, value: &Mat4) {
        self.set(name, UniformValue::Mat4(value.to_cols_array()));
    }
}

impl<B: ShaderBackend> Drop for ShaderProgram<B> {
    fn drop(&mut self) {
        debug!("Releasing shader program {:?}", self.handle);
        self.context.delete_program(self.handle);
    }
}

impl<B: ShaderBackend> fmt::Debug for ShaderProgram<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram").field("handle", &self.handle).finish()
    }
}

impl<B: ShaderBackend> Compilation<B> {
    pub fn program(&self) -> &ShaderProgram<B> {
        &self.program
    }

    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        &self.diagnostics
    }

    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_parts(self) -> (ShaderProgram<B>, Vec<ShaderDiagnostic>) {
        (self.program, self.diagnostics)
    }

    /// A program with any diagnostic is released and turned into an error.
    pub fn into_result(self) -> Result<ShaderProgram<B>, ShaderError> {
        if self.diagnostics.is_empty() {
            Ok(self.program)
        } else {
            Err(ShaderError::Build(self.diagnostics))
        }
    }

    /// Writes every diagnostic to the log and hands the program back anyway.
    pub fn log_and_continue(self) -> ShaderProgram<B> {
        for diagnostic in &self.diagnostics {
            error!("{diagnostic}\n{DIAGNOSTIC_RULE}");
        }
        self.program
    }
}

impl<B: ShaderBackend> fmt::Debug for Compilation<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compilation")
            .field("program", &self.program)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl<'a, B: ShaderBackend> BoundProgram<'a, B> {
    pub fn program(&self) -> &'a ShaderProgram<B> {
        self.program
    }
}

impl<B: ShaderBackend> Deref for BoundProgram<'_, B> {
    type Target = ShaderProgram<B>;

    fn deref(&self) -> &Self::Target {
        self.program
    }
}

fn compile_stage<B: ShaderBackend>(
    context: &B,
    kind: ShaderKind,
    source: &str,
    diagnostics: &mut Vec<ShaderDiagnostic>,
) -> Option<B::Shader> {
    let stage = Stage::from(kind);
    let shader = match context.create_shader(kind) {
        Ok(shader) => shader,
        Err(message) => {
            diagnostics.push(ShaderDiagnostic { stage, message });
            return None;
        }
    };

    context.shader_source(shader, source);
    context.compile_shader(shader);
    diagnostics.extend(diagnose(context, stage, BuildObject::Shader(shader)));
    Some(shader)
}

/// Compile status/log for stages, link status/log for the program.
fn diagnose<B: ShaderBackend>(context: &B, stage: Stage, object: BuildObject<B>) -> Option<ShaderDiagnostic> {
    let failure = match object {
        BuildObject::Shader(shader) => {
            (!context.shader_compile_status(shader)).then(|| context.shader_info_log(shader))
        }
        BuildObject::Program(program) => {
            (!context.program_link_status(program)).then(|| context.program_info_log(program))
        }
    };
    failure.map(|message| ShaderDiagnostic { stage, message })
}
