use std::collections::BTreeMap;

use cgmath::InnerSpace;

use crate::{MeshError, SurfaceMesh};

/// Per-point mean curvature of a consistently oriented surface.
///
/// Every interior edge contributes its length times the signed dihedral
/// angle between its two facets to both of its end points; the sum is then
/// normalised by the area of the facets around the point. The sign is
/// positive where the surface is convex with respect to the facet normals,
/// so the outer wall of a vessel with outward normals reads positive.
///
/// Boundary edges (open inlets and outlets) contribute nothing. Collapsed
/// and zero-area facets are ignored.
pub fn mean_curvature(mesh: &SurfaceMesh) -> Result<Vec<f32>, MeshError> {
    if mesh.is_empty() {
        return Err(MeshError::Empty);
    }

    let normals: Vec<_> = mesh
        .facets
        .iter()
        .map(|f| mesh.triangle(f).normal())
        .collect();

    // BTreeMap keeps the accumulation order, and therefore the rounding,
    // identical between runs.
    let mut edges: BTreeMap<(u32, u32), Vec<usize>> = BTreeMap::new();
    for (i, facet) in mesh.facets.iter().enumerate() {
        if facet.is_collapsed() || normals[i].is_none() {
            continue;
        }
        for (a, b) in facet.edges() {
            edges.entry((a.min(b), a.max(b))).or_default().push(i);
        }
    }

    let mut area = vec![0.0f32; mesh.point_count()];
    for (i, facet) in mesh.facets.iter().enumerate() {
        if normals[i].is_none() {
            continue;
        }
        let facet_area = mesh.triangle(facet).area();
        for p in facet.indices() {
            area[p] += facet_area;
        }
    }

    let mut bending = vec![0.0f32; mesh.point_count()];
    for (&(a, b), facets) in &edges {
        let (f0, f1) = match facets.as_slice() {
            [_] => continue,
            [f0, f1] => (*f0, *f1),
            _ => {
                return Err(MeshError::NonManifoldEdge {
                    a,
                    b,
                    facets: facets.len(),
                })
            }
        };
        let (Some(n0), Some(n1)) = (normals[f0], normals[f1]) else {
            continue;
        };
        let Some(far) = mesh.facets[f1].opposite(a, b) else {
            continue;
        };

        // atan2 keeps precision for the nearly flat edges that dominate a
        // finely tessellated surface, where acos of the dot product does not.
        let angle = n0.cross(n1).magnitude().atan2(n0.dot(n1));
        let pa = mesh.points[a as usize];
        let concave = (mesh.points[far as usize] - pa).dot(n0) > 0.0;
        let length = (mesh.points[b as usize] - pa).magnitude();
        let signed = if concave { -angle } else { angle };
        let contribution = signed * length;
        bending[a as usize] += contribution;
        bending[b as usize] += contribution;
    }

    Ok(bending
        .into_iter()
        .zip(area)
        .map(|(h, a)| if a > 0.0 { 0.75 * h / a } else { 0.0 })
        .collect())
}
