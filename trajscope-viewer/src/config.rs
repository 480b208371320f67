//! Viewer configuration and the model registry

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A selectable model: `id` addresses the data loader, `name` is for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
}

impl ModelDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Viewer configuration, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Root directory holding one sub-directory of tensors per model
    pub data_dir: PathBuf,
    /// Models offered for selection, in display order
    pub models: Vec<ModelDescriptor>,
    /// Basis selection text shown before the user edits it (default: "1,2,3")
    pub default_selection: String,
    /// Time slice plotted by a one-shot (non-interactive) run
    pub default_time_index: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("assets"),
            models: vec![ModelDescriptor::new("llama-3.2-1B", "llama-3.2-1B")],
            default_selection: "1,2,3".to_string(),
            default_time_index: 0,
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        let config: ViewerConfig = serde_json::from_str(&text)?;
        Ok(config)
    }

    /// Build the model registry, rejecting an empty list or duplicate ids.
    pub fn registry(&self) -> Result<ModelRegistry> {
        ModelRegistry::new(self.models.clone())
    }
}

/// Static ordered list of selectable models
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistry {
    models: Vec<ModelDescriptor>,
}

impl ModelRegistry {
    pub fn new(models: Vec<ModelDescriptor>) -> Result<Self> {
        if models.is_empty() {
            return Err(Error::Config("model list is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for model in &models {
            if !seen.insert(model.id.as_str()) {
                return Err(Error::Config(format!("duplicate model id '{}'", model.id)));
            }
        }

        Ok(Self { models })
    }

    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.id == id)
    }

    /// The model loaded at startup.
    pub fn default_model(&self) -> &ModelDescriptor {
        &self.models[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelDescriptor> {
        self.models.iter()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ViewerConfig::default();
        assert_eq!(config.default_selection, "1,2,3");
        assert_eq!(config.default_time_index, 0);
        let registry = config.registry().unwrap();
        assert_eq!(registry.default_model().id, "llama-3.2-1B");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"data_dir": "/data", "models": [{{"id": "a", "name": "Model A"}}, {{"id": "b", "name": "Model B"}}]}}"#
        )
        .unwrap();

        let config = ViewerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/data"));
        assert_eq!(config.default_selection, "1,2,3");

        let registry = config.registry().unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("b").map(|m| m.name.as_str()), Some("Model B"));
        assert!(registry.get("c").is_none());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = ViewerConfig::from_file(Path::new("/nonexistent/trajscope.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_registry_rejects_empty_and_duplicates() {
        assert!(ModelRegistry::new(vec![]).is_err());
        let dup = vec![ModelDescriptor::new("a", "A"), ModelDescriptor::new("a", "A2")];
        assert!(ModelRegistry::new(dup).is_err());
    }
}
