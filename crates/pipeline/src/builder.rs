//! Drives a full dataset build: every transformation, every geometry, every
//! planned view.

use std::path::Path;

use vesselshot_mesh::Axis;

use crate::config::{AugmentationPolicy, DatasetConfig};
use crate::error::BuildError;
use crate::field;
use crate::repository::GeometrySource;
use crate::snapshot::{SnapshotRenderer, SnapshotRequest};
use crate::split::{Split, SplitKind};
use crate::{PipelineError, Result, Transformation};

/// One sweep of a geometry: an axis and an optional frame limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    pub axis: Axis,
    pub frames: Option<u32>,
}

impl View {
    const fn sweep(axis: Axis) -> Self {
        View { axis, frames: None }
    }

    const fn single(axis: Axis) -> Self {
        View {
            axis,
            frames: Some(1),
        }
    }
}

/// Views rendered for a geometry on the `kind` side of the split. The z sweep
/// comes last; test geometries only ever get the z sweep.
pub fn view_plan(kind: SplitKind, policy: AugmentationPolicy) -> &'static [View] {
    const Z_ONLY: &[View] = &[View::sweep(Axis::Z)];
    const FULL: &[View] = &[
        View::sweep(Axis::X),
        View::sweep(Axis::Y),
        View::sweep(Axis::Z),
    ];
    const SINGLE: &[View] = &[
        View::single(Axis::X),
        View::single(Axis::Y),
        View::sweep(Axis::Z),
    ];
    match (kind, policy) {
        (SplitKind::Test, _) | (SplitKind::Train, AugmentationPolicy::None) => Z_ONLY,
        (SplitKind::Train, AugmentationPolicy::FullSweep) => FULL,
        (SplitKind::Train, AugmentationPolicy::SingleFrame) => SINGLE,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Geometry passes completed, counted once per transformation.
    pub geometries: usize,
    pub images: usize,
}

/// Removes `dir` and everything below it, then creates it empty.
pub(crate) fn reset_dir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => (),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (),
        Err(e) => return Err(PipelineError::io(dir, e)),
    }
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

pub struct DatasetBuilder<S> {
    source: S,
    config: DatasetConfig,
    renderer: SnapshotRenderer,
}

impl<S: GeometrySource> DatasetBuilder<S> {
    pub fn new(source: S, config: DatasetConfig) -> Self {
        let renderer = SnapshotRenderer::new(config.render.clone());
        Self {
            source,
            config,
            renderer,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Renders every geometry of `split` for each of `transformations`.
    ///
    /// The configuration is validated before anything is deleted. Output
    /// directories of a transformation are then emptied before its first
    /// geometry is loaded. The first failure aborts the build.
    pub fn build(
        &self,
        transformations: &[Transformation],
        split: &Split,
    ) -> std::result::Result<BuildReport, BuildError> {
        self.config
            .validate()
            .map_err(|source| BuildError::Config { source })?;
        let mut report = BuildReport::default();
        for &transformation in transformations {
            for kind in SplitKind::ALL {
                reset_dir(&self.config.images_dir(kind, transformation)).map_err(|source| {
                    BuildError::Prepare {
                        transformation,
                        source,
                    }
                })?;
            }

            let total = split.len();
            let mut done = 0;
            let mut images = 0;
            for kind in SplitKind::ALL {
                for id in split.ids(kind) {
                    done += 1;
                    log::info!("[{}/{}] {} {} ({})", done, total, transformation, id, kind);
                    images += self
                        .render_geometry(id, kind, transformation)
                        .map_err(|source| BuildError::Geometry {
                            geometry: id.clone(),
                            transformation,
                            source,
                        })?;
                }
            }
            log::info!(
                "{}: {} images from {} geometries",
                transformation,
                images,
                total
            );
            report.geometries += total;
            report.images += images;
        }
        Ok(report)
    }

    fn render_geometry(
        &self,
        id: &str,
        kind: SplitKind,
        transformation: Transformation,
    ) -> Result<usize> {
        let mut mesh = self.source.load_mesh(id)?;
        let cfd = match transformation.cfd_column() {
            Some(_) => Some(self.source.load_cfd(id)?),
            None => None,
        };
        field::attach(&mut mesh, transformation, cfd.as_ref())?;

        let prefix = self.config.images_dir(kind, transformation).join(id);
        let mut written = 0;
        for view in view_plan(kind, self.config.augmentation) {
            let request = SnapshotRequest {
                axis: view.axis,
                step: self.config.rotation_step,
                frames: view.frames,
                clim: transformation.clim(),
                ambient: transformation.ambient(),
                prefix: &prefix,
            };
            written += self.renderer.render(&mut mesh.clone(), &request)?;
        }
        Ok(written)
    }
}
