//! Vertex + fragment shader programs on top of a GL-style context.
//!
//! [`ShaderProgram`] is generic over [`ShaderBackend`]. `glow::Context`
//! drives a real driver, [`HeadlessContext`] runs the same object model on
//! the CPU.

pub mod backend;
pub mod error;
mod gl;
pub mod headless;
pub mod program;
pub mod source;

#[cfg(test)]
mod test_log;

pub use backend::{ShaderBackend, ShaderKind, UniformValue};
pub use error::{ShaderDiagnostic, ShaderError, Stage};
pub use headless::HeadlessContext;
pub use program::{BoundProgram, Compilation, ShaderProgram};
pub use source::{ShaderSources, SourceError, read_source};
