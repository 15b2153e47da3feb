//! # Model Registry
//!
//! Discovers scoring models by scanning a directory for artifact files.
//! A file named `{model-name}.{extension}` registers one model; the model
//! name is everything before the first `.` of the file name and becomes the
//! name of the prediction column.

use std::collections::btree_map::{self, BTreeMap};
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

/// Artifact extension scanned for when none is configured
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "safetensors";

/// Errors that can occur while discovering models
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The model directory could not be listed
    #[error("Cannot read model directory {}: {source}", .path.display())]
    Unreadable {
        /// Directory that was scanned
        path: PathBuf,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// Two artifacts map to the same model name
    #[error("Model '{name}' is provided by both {} and {}", .first.display(), .second.display())]
    DuplicateModel {
        /// Shared model name
        name: String,
        /// Artifact registered first
        first: PathBuf,
        /// Conflicting artifact
        second: PathBuf,
    },
}

/// One discovered model: its name and the location of its trained artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Model identifier, used as the prediction column name
    pub name: String,
    /// Path of the trained artifact
    pub path: PathBuf,
}

/// Immutable name → artifact mapping, iterated in name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelRegistry {
    models: BTreeMap<String, PathBuf>,
}

impl ModelRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `dir` for `*.safetensors` artifacts
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self, RegistryError> {
        Self::discover_with_extension(dir, DEFAULT_ARTIFACT_EXTENSION)
    }

    /// Scan `dir` (non-recursively) for files ending in `.{extension}`
    ///
    /// The extension match ignores ASCII case. An empty directory yields an
    /// empty registry.
    pub fn discover_with_extension<P: AsRef<Path>>(
        dir: P,
        extension: &str,
    ) -> Result<Self, RegistryError> {
        let dir = dir.as_ref();
        let unreadable = |source| RegistryError::Unreadable {
            path: dir.to_path_buf(),
            source,
        };
        let extension = extension.trim_start_matches('.');

        let mut registry = Self::new();
        for entry in fs::read_dir(dir).map_err(unreadable)? {
            let path = entry.map_err(unreadable)?.path();
            if !path.is_file() {
                continue;
            }
            let matches_extension = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false);
            if !matches_extension {
                continue;
            }
            let Some(name) = model_name(&path) else {
                debug!("Skipping artifact without a usable name: {}", path.display());
                continue;
            };
            registry.insert(name, path)?;
        }

        info!(
            "Discovered {} model(s) in {}",
            registry.len(),
            dir.display()
        );
        Ok(registry)
    }

    /// Register one artifact under `name`
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        let path = path.into();
        match self.models.entry(name) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(path);
                Ok(())
            }
            btree_map::Entry::Occupied(existing) => Err(RegistryError::DuplicateModel {
                name: existing.key().clone(),
                first: existing.get().clone(),
                second: path,
            }),
        }
    }

    /// Artifact path for a model name
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.models.get(name).map(PathBuf::as_path)
    }

    /// Number of registered models
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models were found
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model names in iteration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Descriptors in iteration order
    pub fn iter(&self) -> impl Iterator<Item = ModelDescriptor> + '_ {
        self.models.iter().map(|(name, path)| ModelDescriptor {
            name: name.clone(),
            path: path.clone(),
        })
    }
}

/// File name up to the first `.`
fn model_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.split('.').next()?;
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_discover_models() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("herg.safetensors"), "{}").unwrap();
        fs::write(dir.path().join("cyp3a4.SafeTensors"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.safetensors")).unwrap();

        let registry = ModelRegistry::discover(dir.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["cyp3a4", "herg"]);
        assert_eq!(registry.get("herg"), Some(dir.path().join("herg.safetensors").as_path()));
    }

    #[test]
    fn test_custom_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("m1.h5"), "").unwrap();
        fs::write(dir.path().join("m2.safetensors"), "").unwrap();

        let registry = ModelRegistry::discover_with_extension(dir.path(), ".h5").unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["m1"]);
    }

    #[test]
    fn test_name_stops_at_first_dot() {
        assert_eq!(model_name(Path::new("/m/5ht2b.v1.safetensors")).as_deref(), Some("5ht2b"));
        assert_eq!(model_name(Path::new("/m/.hidden.safetensors")), None);
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempdir().unwrap();
        let registry = ModelRegistry::discover(dir.path()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_missing_directory_is_unreadable() {
        let dir = tempdir().unwrap();
        let err = ModelRegistry::discover(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, RegistryError::Unreadable { .. }));
    }

    #[test]
    fn test_duplicate_model_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("herg.safetensors"), "{}").unwrap();
        fs::write(dir.path().join("herg.v2.safetensors"), "{}").unwrap();

        let err = ModelRegistry::discover(dir.path()).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateModel { ref name, .. } if name == "herg"));
    }
}
