//! User metadata persistence.
//!
//! The metadata file holds user-specific state separate from the base
//! catalog: the display name and any personal items the user has defined.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::Item;

/// Persisted user-specific state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Display name collected on first run.
    #[serde(default)]
    pub username: String,
    /// User-defined items, appended over time and never removed here.
    #[serde(default)]
    pub personal_items: Vec<Item>,
}

/// Errors raised by metadata persistence.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The metadata file could not be read or written.
    #[error("failed to access metadata {path}")]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The metadata file exists but does not parse.
    ///
    /// Deliberately not recovered by falling back to defaults: a default
    /// would overwrite the user's personal items on the next save.
    #[error("failed to parse metadata {path}")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },
}

/// Store reading and writing the metadata file at a fixed path.
///
/// Saves are whole-file overwrites. Partial-write corruption is an accepted
/// risk for a single-user, infrequent-write tool.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// New store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load metadata, returning empty defaults when the file is absent
    /// (first run).
    pub fn load(&self) -> Result<Metadata, MetadataError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No metadata file; using defaults");
            return Ok(Metadata::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| MetadataError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| MetadataError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Persist metadata, overwriting the whole file. Parent directories are
    /// created as needed.
    pub fn save(&self, metadata: &Metadata) -> Result<(), MetadataError> {
        let io_err = |source| MetadataError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let serialized = serde_json::to_vec_pretty(metadata).map_err(|source| {
            MetadataError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, serialized).map_err(io_err)
    }

    /// Record the username and persist immediately.
    pub fn set_username(&self, metadata: &mut Metadata, username: &str) -> Result<(), MetadataError> {
        metadata.username = username.trim().to_string();
        self.save(metadata)
    }

    /// Append a personal item and persist immediately.
    pub fn add_personal_item(
        &self,
        metadata: &mut Metadata,
        item: Item,
    ) -> Result<(), MetadataError> {
        metadata.personal_items.push(item);
        self.save(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use tempfile::tempdir;

    #[test]
    fn absent_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata.json"));
        let metadata = store.load().unwrap();
        assert_eq!(metadata, Metadata::default());
        assert!(metadata.username.is_empty());
        assert!(metadata.personal_items.is_empty());
    }

    #[test]
    fn round_trip_preserves_username_and_items() {
        let dir = tempdir().unwrap();
        let store = MetadataStore::new(dir.path().join("metadata.json"));

        let mut metadata = Metadata::default();
        store.set_username(&mut metadata, "  Brother Aldric  ").unwrap();
        assert_eq!(metadata.username, "Brother Aldric");

        let mut charm = Item::new("Lucky Charm", Category::Utility, 1);
        charm.description = Some("Never leaves the belt".to_string());
        store.add_personal_item(&mut metadata, charm.clone()).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.username, "Brother Aldric");
        assert_eq!(loaded.personal_items, vec![charm]);
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, "{not json").unwrap();
        let err = MetadataStore::new(&path).load().unwrap_err();
        assert!(matches!(err, MetadataError::Parse { .. }));
    }

    #[test]
    fn legacy_file_shape_loads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(
            &path,
            r#"{
  "username": "Player",
  "personal_items": [
    { "Name": "Frag", "Category": "Grenade", "Points": 3, "Description": "" }
  ]
}"#,
        )
        .unwrap();
        let metadata = MetadataStore::new(&path).load().unwrap();
        assert_eq!(metadata.username, "Player");
        assert_eq!(metadata.personal_items[0].category, Category::Grenade);
    }
}
