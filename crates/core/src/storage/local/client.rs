//! Local storage client.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::{File, OpenOptions};
use tracing::debug;

use crate::storage::claim::StorageClaim;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::traits::StorageClient;
use crate::storage::transfer::{TransferContext, copy_with_progress, is_regular_file};

/// Copies bytes between a local file and a local claim's backing file.
///
/// Stateless; a single instance can serve any number of concurrent calls.
/// A failed copy leaves the destination partially written.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageClient;

impl LocalStorageClient {
    /// Create a client.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageClient for LocalStorageClient {
    async fn download(
        &self,
        claim: &StorageClaim,
        destination: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()> {
        ctx.ensure_active()?;

        let backing = claim.local_path().ok_or_else(|| {
            StorageError::unable_to_download(format!(
                "claim '{}' has no local path",
                claim.identity()
            ))
        })?;

        let mut writer = File::create(destination)
            .await
            .map_err(|e| StorageError::io("creating & truncating file for download", e))?;

        if !is_regular_file(backing).await? {
            return Err(StorageError::not_found(format!(
                "missing local file for claim '{}'",
                claim.identity()
            )));
        }

        let mut reader = File::open(backing)
            .await
            .map_err(|e| StorageError::io("opening storage claim file to read", e))?;
        let total = reader
            .metadata()
            .await
            .map_err(|e| StorageError::io("reading storage claim file metadata", e))?
            .len();

        let copied = copy_with_progress(&mut reader, &mut writer, Some(total), ctx).await?;

        debug!(identity = %claim.identity(), bytes = copied, "downloaded local storage claim");
        Ok(())
    }

    async fn upload(
        &self,
        claim: &StorageClaim,
        source: &Path,
        ctx: &TransferContext,
    ) -> StorageResult<()> {
        ctx.ensure_active()?;

        if !is_regular_file(source).await? {
            return Err(StorageError::unable_to_upload(format!(
                "unable to find file to upload: {}",
                source.display()
            )));
        }

        let backing = claim.local_path().ok_or_else(|| {
            StorageError::unable_to_upload(format!(
                "claim '{}' has no local path",
                claim.identity()
            ))
        })?;

        if !is_regular_file(backing).await? {
            return Err(StorageError::not_found(format!(
                "missing local file for claim '{}'",
                claim.identity()
            )));
        }

        let mut reader = File::open(source)
            .await
            .map_err(|e| StorageError::io("opening file to upload", e))?;
        let total = reader
            .metadata()
            .await
            .map_err(|e| StorageError::io("reading upload file metadata", e))?
            .len();

        // Never create the backing file here: it must come from allocation.
        let mut writer = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(backing)
            .await
            .map_err(|e| StorageError::io("opening storage claim file to write", e))?;

        let copied = copy_with_progress(&mut reader, &mut writer, Some(total), ctx).await?;

        debug!(identity = %claim.identity(), bytes = copied, "uploaded local storage claim");
        Ok(())
    }
}
