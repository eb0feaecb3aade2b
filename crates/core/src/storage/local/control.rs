//! Local storage control.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::STORAGE_CLAIM_KIND;
use crate::storage::claim::{
    ClaimParams, StorageClaim, StorageClaimRequest, generate_identity, validate_identity,
};
use crate::storage::config::LocalStorageOptions;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::StorageControl;
use crate::storage::transfer::is_regular_file;

/// Allocates claims as files under a filesystem root.
#[derive(Debug, Clone)]
pub struct LocalStorageControl {
    root: PathBuf,
}

impl LocalStorageControl {
    /// Create a control rooted at `options.root`.
    ///
    /// A relative root is resolved against the current directory. The root
    /// itself is created lazily on first allocation.
    pub fn new(options: LocalStorageOptions) -> StorageResult<Self> {
        let root = std::path::absolute(&options.root).map_err(|e| {
            StorageError::configuration(format!(
                "resolving storage root {}: {e}",
                options.root.display()
            ))
        })?;
        Ok(Self { root })
    }

    /// Absolute storage root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, identity: &str) -> StorageResult<PathBuf> {
        validate_identity(identity)?;
        Ok(self.root.join(identity))
    }

    fn claim(identity: impl Into<String>, path: PathBuf) -> StorageClaim {
        StorageClaim::new(identity, STORAGE_CLAIM_KIND, ClaimParams::Local { path })
    }

    /// Remove directories left empty by a purge, stopping at the root or at
    /// the first directory that still has entries.
    async fn prune_empty_parents(&self, path: &Path) -> StorageResult<()> {
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            match fs::remove_dir(current).await {
                Ok(()) => dir = current.parent(),
                Err(e) if ends_pruning(&e) => break,
                Err(e) => return Err(StorageError::io("removing storage claim directory", e)),
            }
        }
        Ok(())
    }
}

/// A directory still in use, or already removed by a concurrent purge.
fn ends_pruning(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::DirectoryNotEmpty | io::ErrorKind::NotFound
    )
}

#[async_trait]
impl StorageControl for LocalStorageControl {
    fn kind(&self) -> &'static str {
        STORAGE_CLAIM_KIND
    }

    async fn allocate_storage_claim(
        &self,
        req: &StorageClaimRequest,
    ) -> StorageResult<StorageClaim> {
        let identity = generate_identity(req)?;
        let path = self.resolve(&identity)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io("creating directory for storage claim", e))?;
        }

        fs::File::create(&path)
            .await
            .map_err(|e| StorageError::io("creating file for storage claim", e))?;

        debug!(identity = %identity, path = %path.display(), "allocated local storage claim");
        Ok(Self::claim(identity, path))
    }

    async fn get_storage_claim(&self, identity: &str) -> StorageResult<StorageClaim> {
        let path = self.resolve(identity)?;

        if !is_regular_file(&path).await? {
            return Err(StorageError::not_found(format!(
                "missing local file for claim '{identity}'"
            )));
        }

        Ok(Self::claim(identity, path))
    }

    async fn purge_storage_claim(&self, identity: &str) -> StorageResult<()> {
        let path = self.resolve(identity)?;

        if !is_regular_file(&path).await? {
            return Err(StorageError::not_found(format!(
                "missing local file for claim '{identity}'"
            )));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::io("removing storage claim file", e))?;
        self.prune_empty_parents(&path).await?;

        debug!(identity = %identity, "purged local storage claim");
        Ok(())
    }
}
