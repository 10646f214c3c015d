use std::collections::HashMap;

use cgmath::{InnerSpace, Zero};
use ordered_float::OrderedFloat;

use crate::{Axis, Bounds, MeshError, PointData, Triangle, TriangleMesh, Vector3};

/// A facet stored as indices into the point list of its mesh.
///
/// Per-point fields (curvature, wall shear stress, ...) are only meaningful
/// once corners that coincide share a single point, so facets never own their
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Facet {
    pub p0: u32,
    pub p1: u32,
    pub p2: u32,
}

impl Facet {
    pub fn indices(&self) -> [usize; 3] {
        [self.p0 as usize, self.p1 as usize, self.p2 as usize]
    }

    /// The three edges in winding order.
    pub fn edges(&self) -> [(u32, u32); 3] {
        [(self.p0, self.p1), (self.p1, self.p2), (self.p2, self.p0)]
    }

    /// True when two corners were welded into the same point.
    pub fn is_collapsed(&self) -> bool {
        self.p0 == self.p1 || self.p1 == self.p2 || self.p2 == self.p0
    }

    /// The corner that is not on the edge `(a, b)`.
    pub fn opposite(&self, a: u32, b: u32) -> Option<u32> {
        [self.p0, self.p1, self.p2]
            .into_iter()
            .find(|&p| p != a && p != b)
    }
}

/// Triangulated surface with welded points and per-point scalar fields.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub points: Vec<Vector3>,
    pub facets: Vec<Facet>,
    point_data: PointData,
}

impl SurfaceMesh {
    pub fn new(points: Vec<Vector3>, facets: Vec<Facet>) -> Self {
        Self {
            points,
            facets,
            point_data: PointData::default(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point_data(&self) -> &PointData {
        &self.point_data
    }

    /// Stores `values` as the point field `name`, replacing any field of the
    /// same name.
    pub fn add_field(&mut self, name: &str, values: Vec<f32>) -> Result<(), MeshError> {
        if values.len() != self.points.len() {
            return Err(MeshError::FieldLength {
                name: name.to_string(),
                expected: self.points.len(),
                actual: values.len(),
            });
        }
        self.point_data.insert(name.to_string(), values);
        Ok(())
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Vec<f32>> {
        self.point_data.remove(name)
    }

    /// Marks the field `name` as the active scalar, or clears it with `None`.
    pub fn set_active_scalars(&mut self, name: Option<&str>) -> Result<(), MeshError> {
        if let Some(name) = name {
            if !self.point_data.contains(name) {
                return Err(MeshError::UnknownField(name.to_string()));
            }
        }
        self.point_data.set_active(name.map(str::to_string));
        Ok(())
    }

    pub fn active_scalars(&self) -> Option<&[f32]> {
        self.point_data.active()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    /// Rotates every point in place about `axis` through the origin.
    pub fn rotate(&mut self, axis: Axis, degrees: f32) {
        let m = axis.rotation(degrees);
        for p in self.points.iter_mut() {
            *p = m * *p;
        }
    }

    pub fn triangle(&self, facet: &Facet) -> Triangle {
        let [a, b, c] = facet.indices();
        Triangle {
            p0: self.points[a],
            p1: self.points[b],
            p2: self.points[c],
        }
    }

    /// Area weighted vertex normals. Points without a non-degenerate facet get
    /// a zero vector.
    pub fn vertex_normals(&self) -> Vec<Vector3> {
        let mut normals = vec![Vector3::zero(); self.points.len()];
        for facet in &self.facets {
            let n = self.triangle(facet).scaled_normal();
            for i in facet.indices() {
                normals[i] += n;
            }
        }
        for n in normals.iter_mut() {
            let len = n.magnitude();
            if len > 0.0 {
                *n /= len;
            }
        }
        normals
    }
}

impl TriangleMesh for SurfaceMesh {
    /// Welds bit-identical corners into shared points. Points are numbered in
    /// the order they are first seen so per-point tables exported alongside
    /// the mesh keep lining up.
    fn from_triangles(triangles: Vec<Triangle>) -> Self {
        let mut index: HashMap<[OrderedFloat<f32>; 3], u32> = HashMap::new();
        let mut points = Vec::new();
        let mut weld = |p: Vector3| -> u32 {
            *index
                .entry([p.x.into(), p.y.into(), p.z.into()])
                .or_insert_with(|| {
                    points.push(p);
                    (points.len() - 1) as u32
                })
        };
        let facets = triangles
            .iter()
            .map(|t| Facet {
                p0: weld(t.p0),
                p1: weld(t.p1),
                p2: weld(t.p2),
            })
            .collect();
        SurfaceMesh::new(points, facets)
    }

    fn triangle_count(&self) -> usize {
        self.facets.len()
    }

    fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.facets.iter().map(|f| self.triangle(f))
    }
}
