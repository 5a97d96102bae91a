use std::fmt;

use thiserror::Error;

use crate::{backend::ShaderKind, source::SourceError};

/// Which step of a program build a diagnostic comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
    Program,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Vertex => "VERTEX",
            Stage::Fragment => "FRAGMENT",
            Stage::Program => "PROGRAM",
        }
    }

    /// Fixed token that starts every diagnostic line for this stage.
    pub fn marker(self) -> &'static str {
        match self {
            Stage::Vertex | Stage::Fragment => "ERROR::SHADER_COMPILATION_ERROR",
            Stage::Program => "ERROR::PROGRAM_LINKING_ERROR",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<ShaderKind> for Stage {
    fn from(kind: ShaderKind) -> Self {
        match kind {
            ShaderKind::Vertex => Stage::Vertex,
            ShaderKind::Fragment => Stage::Fragment,
        }
    }
}

/// A compile or link failure, with the driver's own log.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{} of type: {}\n{}", .stage.marker(), .stage, .message)]
pub struct ShaderDiagnostic {
    pub stage: Stage,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("graphics context could not create a program object: {0}")]
    CreateProgram(String),

    #[error("shader program failed to build: {}", summarize(.0))]
    Build(Vec<ShaderDiagnostic>),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ShaderError {
    /// Diagnostics carried by a build failure, empty for other errors.
    pub fn diagnostics(&self) -> &[ShaderDiagnostic] {
        match self {
            ShaderError::Build(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

fn summarize(diagnostics: &[ShaderDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("{}: {}", d.stage, d.message.lines().next().unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_carries_marker_and_label() {
        let diagnostic = ShaderDiagnostic {
            stage: Stage::Fragment,
            message: "0:3: error: unknown type 'floot'".into(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "ERROR::SHADER_COMPILATION_ERROR of type: FRAGMENT\n0:3: error: unknown type 'floot'"
        );

        let link = ShaderDiagnostic {
            stage: Stage::Program,
            message: "error: vertex shader lacks `main'".into(),
        };
        assert!(link.to_string().starts_with("ERROR::PROGRAM_LINKING_ERROR of type: PROGRAM"));
    }

    #[test]
    fn build_error_summarizes_first_lines() {
        let error = ShaderError::Build(vec![
            ShaderDiagnostic { stage: Stage::Vertex, message: "first\nsecond".into() },
            ShaderDiagnostic { stage: Stage::Program, message: "link".into() },
        ]);
        assert_eq!(error.to_string(), "shader program failed to build: VERTEX: first; PROGRAM: link");
        assert_eq!(error.diagnostics().len(), 2);
    }
}
