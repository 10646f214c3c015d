//! Where geometries and their CFD results come from.

use std::path::{Path, PathBuf};

use vesselshot_mesh::SurfaceMesh;
use vesselshot_stl::read_stl;

use crate::cfd::CfdTable;
use crate::config::{CFD_DIR, GEOMETRY_DIR};
use crate::{PipelineError, Result};

/// A collection of geometries addressed by identifier.
pub trait GeometrySource {
    /// All identifiers, sorted.
    fn identifiers(&self) -> Result<Vec<String>>;

    /// Loads a fresh copy of the mesh for `id`.
    fn load_mesh(&self, id: &str) -> Result<SurfaceMesh>;

    /// Loads the per-point CFD results for `id`.
    fn load_cfd(&self, id: &str) -> Result<CfdTable>;
}

/// Geometries stored as `<root>/Geometry/<id>.stl` with CFD results in
/// `<root>/CFD/<id>.csv`.
#[derive(Debug, Clone)]
pub struct GeometryRepository {
    root: PathBuf,
}

impl GeometryRepository {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn mesh_path(&self, id: &str) -> PathBuf {
        self.root.join(GEOMETRY_DIR).join(format!("{}.stl", id))
    }

    pub fn cfd_path(&self, id: &str) -> PathBuf {
        self.root.join(CFD_DIR).join(format!("{}.csv", id))
    }
}

fn is_stl(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("stl"))
}

impl GeometrySource for GeometryRepository {
    fn identifiers(&self) -> Result<Vec<String>> {
        let dir = self.root.join(GEOMETRY_DIR);
        let entries = std::fs::read_dir(&dir).map_err(|e| PipelineError::io(&dir, e))?;
        let mut ids = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| PipelineError::io(&dir, e))?.path();
            if !path.is_file() || !is_stl(&path) {
                log::warn!("skipping {}: not an STL file", path.display());
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => ids.push(stem.to_string()),
                None => log::warn!("skipping {}: name is not valid UTF-8", path.display()),
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load_mesh(&self, id: &str) -> Result<SurfaceMesh> {
        // Identifiers listed from disk may carry an upper case extension.
        let mut path = self.mesh_path(id);
        if !path.exists() {
            path.set_extension("STL");
        }
        let mesh: SurfaceMesh = read_stl(&path).map_err(|source| PipelineError::MeshRead {
            path: self.mesh_path(id),
            source,
        })?;
        log::debug!(
            "loaded {}: {} points, {} facets",
            id,
            mesh.point_count(),
            mesh.facets.len()
        );
        Ok(mesh)
    }

    fn load_cfd(&self, id: &str) -> Result<CfdTable> {
        CfdTable::read(self.cfd_path(id))
    }
}
