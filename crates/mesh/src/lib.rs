mod curvature;
mod error;
mod geometry;
mod point_data;
mod surface;

pub use curvature::*;
pub use error::*;
pub use geometry::*;
pub use point_data::*;
pub use surface::*;

/// A reasonable default mesh to select for unopinionated consumers.
pub type DefaultMesh = SurfaceMesh;

pub trait TriangleMesh: Sized {
    /// Creates a TriangleMesh from a list of triangles.
    ///
    /// # Arguments
    ///
    /// * `triangles` - A vector of the triangles of the mesh, in file order.
    fn from_triangles(triangles: Vec<Triangle>) -> Self;

    /// Returns the number of triangles that comprises this mesh.
    fn triangle_count(&self) -> usize;

    /// Iterates the triangles of the mesh with their corner coordinates resolved.
    fn triangles(&self) -> impl Iterator<Item = Triangle> + '_;
}
