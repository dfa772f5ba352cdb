//! Model catalog for autocomplete
//!
//! Purely advisory: a profile's `default_model` is never checked against it.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors loading a catalog file
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error for {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("JSON parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

impl CatalogError {
    /// Get the error code for CLI/API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Parse { .. } => "PARSE_ERROR",
        }
    }
}

/// A named group of model identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCategory {
    pub name: String,
    #[serde(default)]
    pub models: Vec<String>,
}

/// Categorized model identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub categories: Vec<ModelCategory>,
}

impl ModelCatalog {
    /// The list shipped with the binary
    #[must_use]
    pub fn builtin() -> Self {
        fn category(name: &str, models: &[&str]) -> ModelCategory {
            ModelCategory {
                name: name.to_string(),
                models: models.iter().map(|m| (*m).to_string()).collect(),
            }
        }

        Self {
            categories: vec![
                category(
                    "Claude",
                    &[
                        "claude-sonnet-4-20250514",
                        "claude-3-5-sonnet-20241022",
                        "claude-3-5-haiku-20241022",
                        "claude-3-haiku-20240307",
                        "claude-3-opus-20240229",
                    ],
                ),
                category("Claude aliases", &["claude-sonnet", "claude-haiku", "claude-opus"]),
                category(
                    "Claude thinking",
                    &["claude-sonnet-think", "claude-haiku-think", "claude-opus-think"],
                ),
                category("Zhipu GLM", &["glm-4.5", "glm-4", "glm-3-turbo"]),
            ],
        }
    }

    /// Load a catalog file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the catalog file, falling back to the built-in list
    #[must_use]
    pub fn load_or_builtin(path: &Path) -> Self {
        if !path.exists() {
            return Self::builtin();
        }
        match Self::load(path) {
            Ok(catalog) if !catalog.is_empty() => catalog,
            Ok(_) => Self::builtin(),
            Err(e) => {
                warn!(error = %e, "ignoring model catalog, using built-in list");
                Self::builtin()
            }
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.iter().all(|c| c.models.is_empty())
    }

    /// Every model in catalog order, without duplicates
    #[must_use]
    pub fn models(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for model in self.categories.iter().flat_map(|c| &c.models) {
            if !seen.contains(&model.as_str()) {
                seen.push(model.as_str());
            }
        }
        seen
    }

    /// Models starting with `prefix` (case-insensitive)
    #[must_use]
    pub fn suggest(&self, prefix: &str) -> Vec<&str> {
        let prefix = prefix.to_lowercase();
        self.models()
            .into_iter()
            .filter(|m| m.to_lowercase().starts_with(&prefix))
            .collect()
    }
}
