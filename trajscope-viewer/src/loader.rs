//! Model data loaders
//!
//! A loader fetches the two tensors of a model: trajectories first, then the
//! basis. [`DataLoader::load`] only returns a pair when both arrived and agree on
//! the feature dimension, so callers can swap state in one step.
//!
//! - **Filesystem** (`FsLoader`): `<root>/<model_id>/trajectories.json` and
//!   `<root>/<model_id>/singular_vectors.json`, each `{"shape": [..], "data": [..]}`
//! - **Memory** (`MemoryLoader`): preloaded tensors for tests and embedding

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use trajscope_core::{ModelData, Tensor3, TensorError};

pub const TRAJECTORIES_FILE: &str = "trajectories.json";
pub const BASIS_FILE: &str = "singular_vectors.json";

/// Errors that can occur while loading model tensors
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid tensor data: {0}")]
    Tensor(#[from] TensorError),

    #[error("no data for model '{0}'")]
    NotFound(String),
}

/// Source of model tensors.
#[async_trait]
pub trait DataLoader: Send + Sync {
    /// Load the `[feature_dim, step_count, trajectory_count]` tensor.
    async fn load_trajectories(&self, model_id: &str) -> Result<Tensor3, LoadError>;

    /// Load the `[feature_dim, basis_count, time_step_count]` tensor.
    async fn load_basis(&self, model_id: &str) -> Result<Tensor3, LoadError>;

    /// Load both tensors sequentially and pair them.
    async fn load(&self, model_id: &str) -> Result<ModelData, LoadError> {
        let trajectories = self.load_trajectories(model_id).await?;
        let basis = self.load_basis(model_id).await?;
        Ok(ModelData::new(trajectories, basis)?)
    }
}

/// Loads JSON tensor documents from a directory tree.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of `file` for `model_id`.
    pub fn model_path(&self, model_id: &str, file: &str) -> PathBuf {
        self.root.join(model_id).join(file)
    }

    async fn read_tensor(&self, path: PathBuf) -> Result<Tensor3, LoadError> {
        let bytes = tokio::fs::read(&path).await.map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let tensor: Tensor3 =
            serde_json::from_slice(&bytes).map_err(|source| LoadError::Decode {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), shape = ?tensor.shape(), "Tensor loaded");
        Ok(tensor)
    }
}

#[async_trait]
impl DataLoader for FsLoader {
    async fn load_trajectories(&self, model_id: &str) -> Result<Tensor3, LoadError> {
        self.read_tensor(self.model_path(model_id, TRAJECTORIES_FILE))
            .await
    }

    async fn load_basis(&self, model_id: &str) -> Result<Tensor3, LoadError> {
        self.read_tensor(self.model_path(model_id, BASIS_FILE)).await
    }
}

/// In-memory loader.
///
/// Useful for unit tests and for hosts that already hold the tensors.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    models: HashMap<String, (Tensor3, Tensor3)>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
        }
    }

    /// Register tensors for `model_id`, replacing any previous pair.
    pub fn with_model(
        mut self,
        model_id: impl Into<String>,
        trajectories: Tensor3,
        basis: Tensor3,
    ) -> Self {
        self.models.insert(model_id.into(), (trajectories, basis));
        self
    }

    fn entry(&self, model_id: &str) -> Result<&(Tensor3, Tensor3), LoadError> {
        self.models
            .get(model_id)
            .ok_or_else(|| LoadError::NotFound(model_id.to_string()))
    }
}

#[async_trait]
impl DataLoader for MemoryLoader {
    async fn load_trajectories(&self, model_id: &str) -> Result<Tensor3, LoadError> {
        Ok(self.entry(model_id)?.0.clone())
    }

    async fn load_basis(&self, model_id: &str) -> Result<Tensor3, LoadError> {
        Ok(self.entry(model_id)?.1.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tensor(shape: [usize; 3]) -> Tensor3 {
        Tensor3::new(shape, vec![0.5; shape.iter().product()]).unwrap()
    }

    #[tokio::test]
    async fn test_memory_loader_pairs_tensors() {
        let loader = MemoryLoader::new().with_model("m", tensor([3, 2, 4]), tensor([3, 3, 5]));
        let model = loader.load("m").await.unwrap();
        assert_eq!(model.trajectory_count(), 4);
        assert_eq!(model.time_step_count(), 5);
    }

    #[tokio::test]
    async fn test_memory_loader_unknown_model() {
        let loader = MemoryLoader::new();
        let err = loader.load("missing").await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_load_rejects_dimension_mismatch() {
        let loader = MemoryLoader::new().with_model("m", tensor([3, 2, 4]), tensor([2, 2, 1]));
        let err = loader.load("m").await.unwrap_err();
        assert!(matches!(
            err,
            LoadError::Tensor(TensorError::DimensionMismatch {
                trajectories: 3,
                basis: 2
            })
        ));
    }

    #[test]
    fn test_model_paths() {
        let loader = FsLoader::new("/assets");
        assert_eq!(
            loader.model_path("llama-3.2-1B", BASIS_FILE),
            PathBuf::from("/assets/llama-3.2-1B/singular_vectors.json")
        );
    }
}
