//! File-backed raster sources.

use std::path::{Path, PathBuf};

/// A raster file and, when one exists, its pre-built mesh cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
    mesh_cache: Option<PathBuf>,
}

impl FileSource {
    /// Records `path` and looks for a sibling with the same base name and
    /// `extension`.
    ///
    /// A sibling that does not exist, is not a regular file, or is the raster
    /// itself is ignored.
    #[must_use]
    pub fn locate(path: impl Into<PathBuf>, extension: &str) -> Self {
        let path = path.into();
        let candidate = path.with_extension(extension);
        let mesh_cache = (candidate != path && candidate.is_file()).then_some(candidate);
        Self { path, mesh_cache }
    }

    /// Raster path as the host reported it.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mesh cache beside the raster.
    #[must_use]
    pub fn mesh_cache(&self) -> Option<&Path> {
        self.mesh_cache.as_deref()
    }

    /// File the renderer should load: the mesh cache when present,
    /// otherwise the raster.
    #[must_use]
    pub fn load_path(&self) -> &Path {
        self.mesh_cache().unwrap_or(&self.path)
    }
}
