//! Attaching per-point scalar fields to meshes.

use vesselshot_mesh::{mean_curvature, SurfaceMesh};

use crate::cfd::CfdTable;
use crate::transformation::CURVATURE_FLOOR;
use crate::{PipelineError, Result, Transformation};

/// Raises every value below [`CURVATURE_FLOOR`] to the floor.
pub fn clamp_curvature(values: &mut [f32]) {
    for v in values.iter_mut() {
        if *v < CURVATURE_FLOOR {
            *v = CURVATURE_FLOOR;
        }
    }
}

fn natural_log(column: &str, values: &[f32]) -> Result<Vec<f32>> {
    values
        .iter()
        .enumerate()
        .map(|(row, &value)| {
            if value > 0.0 {
                Ok(value.ln())
            } else {
                Err(PipelineError::NonPositiveLogInput {
                    column: column.to_string(),
                    row,
                    value,
                })
            }
        })
        .collect()
}

fn cfd_field(transformation: Transformation, pattern: &str, cfd: Option<&CfdTable>) -> Result<Vec<f32>> {
    let missing = || PipelineError::MissingColumn {
        pattern: pattern.to_string(),
        available: cfd.map(|t| t.headers().to_vec()).unwrap_or_default(),
    };
    let (column, values) = cfd.and_then(|t| t.column_matching(pattern)).ok_or_else(missing)?;
    if transformation.log_scaled() {
        natural_log(column, values)
    } else {
        Ok(values.to_vec())
    }
}

/// Computes or loads the field `transformation` visualises and makes it the
/// active scalar of `mesh`. `Raw` clears the active scalar instead.
///
/// `cfd` is only consulted by transformations with a CFD column.
pub fn attach(
    mesh: &mut SurfaceMesh,
    transformation: Transformation,
    cfd: Option<&CfdTable>,
) -> Result<()> {
    if transformation == Transformation::Raw {
        mesh.set_active_scalars(None)?;
        return Ok(());
    }
    let values = match transformation.cfd_column() {
        Some(pattern) => cfd_field(transformation, pattern, cfd)?,
        None => {
            let mut values = mean_curvature(mesh)?;
            clamp_curvature(&mut values);
            values
        }
    };
    let name = transformation.name();
    mesh.add_field(name, values)?;
    mesh.set_active_scalars(Some(name))?;
    Ok(())
}
