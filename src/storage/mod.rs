//! Repository storage naming.
//!
//! # Responsibilities
//! - Name the directory a repository is cloned into
//! - Create the storage root before serving
//!
//! # Design Decisions
//! - Naming is a pure function of (VCS type, clone URL, layout)
//! - Cloning and fetching happen elsewhere; this module only names paths

pub mod layout;

use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

pub use layout::{flat_repository_path, hashed_repository_path, PathLayout};

/// Errors from storage setup.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("error creating directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The storage root and the layout repositories use under it.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
    layout: PathLayout,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>, layout: PathLayout) -> Self {
        Self {
            root: root.into(),
            layout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> PathLayout {
        self.layout
    }

    /// Absolute directory of a repository.
    pub fn repository_dir(&self, vcs_type: &str, clone_url: &Url) -> PathBuf {
        self.root.join(self.layout.repository_path(vcs_type, clone_url))
    }

    /// Returns true if the repository directory exists.
    pub fn is_cloned(&self, vcs_type: &str, clone_url: &Url) -> bool {
        self.repository_dir(vcs_type, clone_url).is_dir()
    }

    /// Creates the storage root (owner-only on Unix).
    pub fn ensure_root(&self) -> Result<(), StorageError> {
        let mut builder = std::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder
            .create(&self.root)
            .map_err(|source| StorageError::CreateDir {
                path: self.root.clone(),
                source,
            })?;

        tracing::debug!(root = %self.root.display(), layout = %self.layout, "Storage root ready");
        Ok(())
    }
}
