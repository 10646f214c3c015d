//! Error types for the dataset pipeline.

use std::path::PathBuf;

use thiserror::Error;
use vesselshot_mesh::MeshError;

use crate::Transformation;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The mesh file is missing, unreadable or not a valid STL.
    #[error("failed to read mesh {}: {source}", path.display())]
    MeshRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The mesh loaded but its topology cannot carry the requested field.
    #[error("mesh topology: {0}")]
    MeshTopology(#[from] MeshError),

    #[error("failed to read CFD table {}: {source}", path.display())]
    CfdRead { path: PathBuf, source: csv::Error },

    #[error("CFD table {}: row {row}, column '{column}': '{value}' is not a number", path.display())]
    InvalidCfdValue {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("no CFD column matching '{pattern}' (available: {})", available.join(", "))]
    MissingColumn {
        pattern: String,
        available: Vec<String>,
    },

    #[error("cannot take the log of {value} in column '{column}' at row {row}")]
    NonPositiveLogInput {
        column: String,
        row: usize,
        value: f32,
    },

    #[error("rotation step {0} does not evenly divide 360 degrees")]
    InvalidRotationStep(u32),

    #[error("cannot render {requested} frames, a full sweep has {max}")]
    InvalidFrameCount { requested: u32, max: u32 },

    #[error("render to {}: {reason}", path.display())]
    Render { path: PathBuf, reason: String },

    #[error("failed to encode {}: {source}", path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no partner for {} in {}", name, dir.display())]
    MissingPair { name: String, dir: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// A pipeline failure tagged with what the driver was working on, so a failed
/// batch points at the input to fix.
#[derive(Error, Debug)]
pub enum BuildError {
    /// Rejected before any output directory was touched.
    #[error("invalid build configuration: {source}")]
    Config { source: PipelineError },

    #[error("preparing {transformation} output directories: {source}")]
    Prepare {
        transformation: Transformation,
        source: PipelineError,
    },

    #[error("geometry '{geometry}' ({transformation}): {source}")]
    Geometry {
        geometry: String,
        transformation: Transformation,
        source: PipelineError,
    },
}

impl BuildError {
    pub fn pipeline_error(&self) -> &PipelineError {
        match self {
            BuildError::Config { source }
            | BuildError::Prepare { source, .. }
            | BuildError::Geometry { source, .. } => source,
        }
    }
}
