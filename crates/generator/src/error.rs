use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("Cannot highlight {}: {message}", .path.display())]
    Highlight { path: PathBuf, message: String },
    #[error("{} is outside the source directory", .0.display())]
    OutsideSource(PathBuf),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error(transparent)]
    Config(#[from] mvw_core::Error),
}

impl GenerateError {
    /// Attach the offending path to an IO error, for use with `map_err`.
    pub(crate) fn io(path: impl AsRef<Path>) -> impl FnOnce(io::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        move |source| GenerateError::Io { path, source }
    }
}

pub type Result<T> = std::result::Result<T, GenerateError>;
