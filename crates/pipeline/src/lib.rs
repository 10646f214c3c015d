//! Renders vascular geometries and their CFD results into an image dataset
//! for image-to-image training.
//!
//! Geometries are listed from a [`GeometrySource`], partitioned with a seeded
//! [`Split`], colored by a [`Transformation`] and rendered in rotation sweeps
//! to `<root>/Images/<Split>/<Transformation>/<id>_<axis>_<frame>.png`.

mod builder;
mod cfd;
mod colormap;
mod config;
mod error;
mod field;
mod pairing;
mod raster;
mod repository;
mod snapshot;
mod split;
mod transformation;

pub use builder::{view_plan, BuildReport, DatasetBuilder, View};
pub use cfd::CfdTable;
pub use colormap::{ColorMap, PaletteKind};
pub use config::{
    AugmentationPolicy, ColorMode, DatasetConfig, RenderOptions, CFD_DIR, GEOMETRY_DIR,
    IMAGES_DIR, PAIRED_DIR,
};
pub use error::{BuildError, PipelineError, Result};
pub use field::{attach, clamp_curvature};
pub use pairing::{pair_dataset, pair_images};
pub use raster::{Camera, RenderContext, SurfaceStyle};
pub use repository::{GeometryRepository, GeometrySource};
pub use snapshot::{frame_count, frame_path, SnapshotRenderer, SnapshotRequest};
pub use split::{assign, assign_stratified, Split, SplitKind};
pub use transformation::{Transformation, CURVATURE_FLOOR};

pub use vesselshot_mesh::Axis;
