//! Error types for scene operations

use thiserror::Error;

/// Errors reported by scene operations.
///
/// Returned by the fallible `try_*`/`*_by_name` operations and the JSON
/// loaders. The convenience forms (`Scene::add`, the setters) log and
/// return `Option`/`bool` instead.
#[derive(Debug, Error)]
pub enum SceneError {
    /// No source with this name could be resolved
    #[error("source '{0}' not found")]
    SourceNotFound(String),

    /// The source has already been removed and can't be added to a scene
    #[error("source '{0}' has been removed")]
    RemovedSource(String),

    /// The source is the scene itself or already shows it further down
    #[error("adding '{child}' to scene '{scene}' would make the scene contain itself")]
    RecursiveAdd { scene: String, child: String },

    /// Serialized scene data couldn't be decoded
    #[error("invalid scene data: {0}")]
    InvalidData(#[from] serde_json::Error),
}
