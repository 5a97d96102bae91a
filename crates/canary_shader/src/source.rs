use std::{
    fs,
    path::{Path, PathBuf},
};

use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read shader source {}: {source}", .path.display())]
    Read { path: PathBuf, source: std::io::Error },
}

/// Vertex and fragment text for one program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderSources {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderSources {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    pub fn load(vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self {
            vertex: read_source(vertex_path.as_ref())?,
            fragment: read_source(fragment_path.as_ref())?,
        })
    }

    /// Like [`ShaderSources::load`], but an unreadable file is logged and
    /// replaced by empty text. The empty stage then fails to compile and is
    /// reported like any other broken shader.
    pub fn load_lossy(vertex_path: impl AsRef<Path>, fragment_path: impl AsRef<Path>) -> Self {
        let read = |path: &Path| {
            read_source(path).unwrap_or_else(|e| {
                error!("ERROR::SHADER::FILE_NOT_SUCCESSFULLY_READ: {e}");
                String::new()
            })
        };
        Self {
            vertex: read(vertex_path.as_ref()),
            fragment: read(fragment_path.as_ref()),
        }
    }
}

pub fn read_source(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_owned(),
        source,
    })
}
