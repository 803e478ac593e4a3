use thiserror::Error;

/// Failures of the planar computational-geometry engine or of the
/// conversion into its object model.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The variant has no planar-engine representation (curved and
    /// surface types must be linearized before engine operations).
    #[error("{0} geometries are not supported by the planar engine")]
    Unsupported(&'static str),
    #[error("planar engine failure: {0}")]
    Failure(String),
}

/// Failures of the clustering engine. Clustering produces either a full
/// result or one of these; never a partial result.
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The pairwise distance computation produced a non-finite value.
    #[error("distance computation failed between geometries {0} and {1}")]
    Distance(usize, usize),
    #[error("operation cancelled")]
    Cancelled,
}
