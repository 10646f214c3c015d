use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("mesh has no points")]
    Empty,

    /// An edge is shared by more than two facets.
    #[error("non-manifold edge ({a}, {b}) shared by {facets} facets")]
    NonManifoldEdge { a: u32, b: u32, facets: usize },

    #[error("field '{name}' has {actual} values but the mesh has {expected} points")]
    FieldLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("no point field named '{0}'")]
    UnknownField(String),
}
